//! Object identifier resolution
//!
//! An identifier comes from the first source that yields one:
//! 1. the registry of known ids
//! 2. a previous export at the output path for the same logical name
//! 3. a SHA-256 derived fallback
//!
//! The same logical name and registry always resolve to the same id, so
//! re-imports replace the existing file instead of registering a duplicate.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::BuildHasher;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{Error, Result};

/// Known logical name to object id mappings
pub trait IdRegistry {
    fn lookup(&self, logical_name: &str) -> Option<u64>;
}

impl<S: BuildHasher> IdRegistry for HashMap<String, u64, S> {
    fn lookup(&self, logical_name: &str) -> Option<u64> {
        self.get(logical_name).copied()
    }
}

impl IdRegistry for BTreeMap<String, u64> {
    fn lookup(&self, logical_name: &str) -> Option<u64> {
        self.get(logical_name).copied()
    }
}

/// How derived ids are computed from the name digest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackPolicy {
    /// Leading hex digits of the digest to keep (1..=16)
    #[serde(default = "default_prefix_hex_digits")]
    pub prefix_hex_digits: usize,

    /// Optional upper bound (exclusive) for derived ids
    #[serde(default)]
    pub modulus: Option<u64>,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self {
            prefix_hex_digits: default_prefix_hex_digits(),
            modulus: None,
        }
    }
}

fn default_prefix_hex_digits() -> usize {
    15
}

impl FallbackPolicy {
    pub fn validate(&self) -> Result<()> {
        if !(1..=16).contains(&self.prefix_hex_digits) {
            return Err(Error::InvalidFallbackPolicy(format!(
                "prefix_hex_digits must be between 1 and 16, got {}",
                self.prefix_hex_digits
            )));
        }
        if self.modulus == Some(0) {
            return Err(Error::InvalidFallbackPolicy(
                "modulus must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdSource {
    Registry,
    PriorOutput,
    Derived,
}

impl fmt::Display for IdSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IdSource::Registry => "registry",
            IdSource::PriorOutput => "prior output",
            IdSource::Derived => "derived",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedId {
    pub id: u64,
    pub source: IdSource,
}

// Matches both the plain export and the variant carrying p_flow_id
static STATIC_FILE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"create_app_static_file\s*\(\s*p_id=>wwv_flow_imp\.id\((\d+)\)\s*(?:,p_flow_id=>wwv_flow_imp\.id\(\d+\)\s*)?,p_file_name=>'((?:[^']|'')*)'",
    )
    .expect("static file block pattern is valid")
});

/// Resolve the object id for `logical_name`.
pub fn resolve_id<R: IdRegistry + ?Sized>(
    logical_name: &str,
    registry: &R,
    existing_output: &Path,
    policy: &FallbackPolicy,
) -> Result<ResolvedId> {
    if let Some(id) = registry.lookup(logical_name) {
        tracing::debug!(logical_name, id, "id found in registry");
        return Ok(ResolvedId {
            id,
            source: IdSource::Registry,
        });
    }

    if let Some(id) = recover_id(existing_output, logical_name) {
        tracing::debug!(logical_name, id, path = %existing_output.display(), "id recovered from prior output");
        return Ok(ResolvedId {
            id,
            source: IdSource::PriorOutput,
        });
    }

    let id = derive_id(logical_name, policy)?;
    tracing::warn!(
        logical_name,
        id,
        "'{}' is not in the id registry, using derived id {}. Add it to [files] for a stable, conflict-free mapping.",
        logical_name,
        id
    );

    Ok(ResolvedId {
        id,
        source: IdSource::Derived,
    })
}

/// Best-effort scan of a previous export. Any failure yields `None`.
fn recover_id(path: &Path, logical_name: &str) -> Option<u64> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "no readable prior output");
            return None;
        }
    };

    find_id_in_script(&content, logical_name)
}

fn find_id_in_script(script: &str, logical_name: &str) -> Option<u64> {
    for caps in STATIC_FILE_BLOCK.captures_iter(script) {
        if caps[2].replace("''", "'") != logical_name {
            continue;
        }
        match caps[1].parse::<u64>() {
            Ok(id) => return Some(id),
            Err(e) => tracing::debug!(raw = &caps[1], error = %e, "unparseable p_id in prior output"),
        }
    }
    None
}

/// Deterministic id from the SHA-256 digest of the logical name
pub fn derive_id(logical_name: &str, policy: &FallbackPolicy) -> Result<u64> {
    policy.validate()?;

    let digest = hex::encode(Sha256::digest(logical_name.as_bytes()));
    let prefix = &digest[..policy.prefix_hex_digits];
    // At most 16 hex digits, always fits in u64
    let value = u64::from_str_radix(prefix, 16)
        .map_err(|e| Error::InvalidFallbackPolicy(e.to_string()))?;

    Ok(match policy.modulus {
        Some(m) => value % m,
        None => value,
    })
}
