//! Render engine - deterministic static file import script
//!
//! The output must be byte-identical for identical inputs so regenerated
//! exports diff cleanly. Nothing here reads clocks, environment or files.
//!
//! Quoting policy: the logical name is validated against a restricted
//! character set and spliced verbatim. Every other string literal goes
//! through [`quote_literal`].

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Environment constants of the target application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderContext {
    /// Export format version (`p_version_yyyy_mm_dd`)
    #[serde(default = "default_version")]
    pub version: String,

    /// Platform release the export targets
    #[serde(default = "default_release")]
    pub release: String,

    #[serde(default = "default_workspace_id")]
    pub workspace_id: u64,

    #[serde(default = "default_application_id")]
    pub application_id: u64,

    /// Parsing schema owning the application
    #[serde(default = "default_owner")]
    pub owner: String,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self {
            version: default_version(),
            release: default_release(),
            workspace_id: default_workspace_id(),
            application_id: default_application_id(),
            owner: default_owner(),
        }
    }
}

fn default_version() -> String {
    "2024.11.30".to_string()
}

fn default_release() -> String {
    "24.2.13".to_string()
}

fn default_workspace_id() -> u64 {
    13_027_568_242_155_993
}

fn default_application_id() -> u64 {
    102
}

fn default_owner() -> String {
    "USCIS_APP".to_string()
}

/// Reject logical names that could break out of the quoted literal
pub fn validate_logical_name(logical_name: &str) -> Result<()> {
    let allowed = |b: u8| b.is_ascii_alphanumeric() || matches!(b, b'/' | b'_' | b'.' | b'-');

    if logical_name.is_empty() || !logical_name.bytes().all(allowed) {
        return Err(Error::InvalidLogicalName(logical_name.to_string()));
    }
    Ok(())
}

/// Label used in the `prompt` line (`css/app-styles.css` -> `css_app_styles_css`)
pub fn prompt_label(logical_name: &str) -> String {
    logical_name.replace(['/', '.', '-'], "_")
}

fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Render the import script for one static file.
///
/// Chunks are assigned to the varchar2 table starting at index 1, in order.
pub fn render(
    chunks: &[String],
    logical_name: &str,
    mime_type: &str,
    object_id: u64,
    context: &RenderContext,
) -> Result<String> {
    validate_logical_name(logical_name)?;

    let mut lines = Vec::with_capacity(chunks.len() + 24);

    lines.push(format!(
        "prompt --application/shared_components/files/{}",
        prompt_label(logical_name)
    ));
    lines.push("begin".to_string());
    lines.push("--   Manifest".to_string());
    lines.push(format!("--     APP STATIC FILES: {}", context.application_id));
    lines.push("--   Manifest End".to_string());
    lines.push("wwv_flow_imp.component_begin (".to_string());
    lines.push(format!(" p_version_yyyy_mm_dd=>{}", quote_literal(&context.version)));
    lines.push(format!(",p_release=>{}", quote_literal(&context.release)));
    lines.push(format!(",p_default_workspace_id=>{}", context.workspace_id));
    lines.push(format!(",p_default_application_id=>{}", context.application_id));
    lines.push(",p_default_id_offset=>0".to_string());
    lines.push(format!(",p_default_owner=>{}", quote_literal(&context.owner)));
    lines.push(");".to_string());
    lines.push("wwv_flow_imp.g_varchar2_table := wwv_flow_imp.empty_varchar2_table;".to_string());

    for (i, chunk) in chunks.iter().enumerate() {
        lines.push(format!(
            "wwv_flow_imp.g_varchar2_table({}) := {};",
            i + 1,
            quote_literal(chunk)
        ));
    }

    lines.push("wwv_flow_imp_shared.create_app_static_file(".to_string());
    lines.push(format!(" p_id=>wwv_flow_imp.id({})", object_id));
    lines.push(format!(",p_file_name=>'{}'", logical_name));
    lines.push(format!(",p_mime_type=>{}", quote_literal(mime_type)));
    lines.push(",p_file_charset=>'utf-8'".to_string());
    lines.push(
        ",p_file_content => wwv_flow_imp.varchar2_to_blob(wwv_flow_imp.g_varchar2_table)"
            .to_string(),
    );
    lines.push(");".to_string());
    lines.push("wwv_flow_imp.component_end;".to_string());
    lines.push("end;".to_string());
    lines.push("/".to_string());
    lines.push(String::new());

    Ok(lines.join("\n"))
}
