//! Core logic for hexport
//!
//! This crate contains:
//! - Encoder (bytes to uppercase hex chunks and back)
//! - Identifier resolution (registry, prior output, derived fallback)
//! - Render engine (deterministic static file import script)
//! - Export pipeline tying the above to the filesystem

pub mod encode;
pub mod error;
pub mod export;
pub mod mime;
pub mod render;
pub mod resolve;

pub use encode::{DEFAULT_CHUNK_SIZE, decode, encode};
pub use error::{Error, Result};
pub use export::{Asset, ExportRequest, ExportSummary, export};
pub use mime::mime_type_for;
pub use render::{RenderContext, prompt_label, render, validate_logical_name};
pub use resolve::{FallbackPolicy, IdRegistry, IdSource, ResolvedId, derive_id, resolve_id};
