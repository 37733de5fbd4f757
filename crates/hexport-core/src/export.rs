//! Export pipeline: load, encode, resolve, render, write

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::resolve::{FallbackPolicy, IdRegistry, IdSource, resolve_id};
use crate::{Error, RenderContext, Result, encode, mime_type_for, render};

/// A static file read from disk
#[derive(Debug, Clone)]
pub struct Asset {
    pub logical_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl Asset {
    pub fn new(logical_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let logical_name = logical_name.into();
        let mime_type = mime_type_for(&logical_name);
        Self {
            logical_name,
            mime_type,
            bytes,
        }
    }

    pub fn load(path: &Path, logical_name: impl Into<String>) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(logical_name, bytes))
    }
}

/// One source file to turn into an import script
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub source: PathBuf,
    pub output: PathBuf,
    pub logical_name: String,
    pub chunk_size: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    pub source: PathBuf,
    pub output: PathBuf,
    pub logical_name: String,
    pub mime_type: String,
    pub size_bytes: usize,
    pub chunks: usize,
    pub object_id: u64,
    pub id_source: IdSource,
}

/// Run the export and overwrite `request.output` with the rendered script.
///
/// Nothing is written unless rendering succeeds.
pub fn export<R: IdRegistry + ?Sized>(
    request: &ExportRequest,
    registry: &R,
    context: &RenderContext,
    policy: &FallbackPolicy,
) -> Result<ExportSummary> {
    let asset = Asset::load(&request.source, request.logical_name.as_str())?;
    let chunks = encode(&asset.bytes, request.chunk_size)?;

    let resolved = resolve_id(&asset.logical_name, registry, &request.output, policy)?;

    let script = render(
        &chunks,
        &asset.logical_name,
        asset.mime_type,
        resolved.id,
        context,
    )?;

    write_script(&request.output, &script)?;
    tracing::debug!(
        output = %request.output.display(),
        chunks = chunks.len(),
        "import script written"
    );

    Ok(ExportSummary {
        source: request.source.clone(),
        output: request.output.clone(),
        logical_name: asset.logical_name,
        mime_type: asset.mime_type.to_string(),
        size_bytes: asset.bytes.len(),
        chunks: chunks.len(),
        object_id: resolved.id,
        id_source: resolved.source,
    })
}

fn write_script(path: &Path, script: &str) -> Result<()> {
    let write_err = |source: std::io::Error| Error::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    std::fs::write(path, script).map_err(write_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn request(dir: &TempDir, name: &str, data: &[u8]) -> ExportRequest {
        let source = dir.path().join("source.bin");
        std::fs::write(&source, data).unwrap();
        ExportRequest {
            source,
            output: dir.path().join("out/nested/file.sql"),
            logical_name: name.to_string(),
            chunk_size: 100,
        }
    }

    #[test]
    fn test_asset_mime_type() {
        let asset = Asset::new("css/app-styles.css", b"a{}".to_vec());
        assert_eq!(asset.mime_type, "text/css");
        assert_eq!(asset.bytes, b"a{}");
    }

    #[test]
    fn test_export_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let req = request(&dir, "app-styles.css", &[7u8; 250]);
        let registry: HashMap<String, u64> =
            HashMap::from([("app-styles.css".to_string(), 13063284063853025)]);

        let summary = export(
            &req,
            &registry,
            &RenderContext::default(),
            &FallbackPolicy::default(),
        )
        .unwrap();

        assert_eq!(summary.chunks, 3);
        assert_eq!(summary.size_bytes, 250);
        assert_eq!(summary.id_source, IdSource::Registry);

        let script = std::fs::read_to_string(&req.output).unwrap();
        assert!(script.contains("wwv_flow_imp.id(13063284063853025)"));
    }

    #[test]
    fn test_export_is_deterministic() {
        let dir = TempDir::new().unwrap();
        let registry: HashMap<String, u64> = HashMap::new();

        let first_dir = TempDir::new().unwrap();
        let mut req = request(&dir, "js/app.js", b"console.log('hi');");
        req.output = first_dir.path().join("a.sql");
        export(&req, &registry, &RenderContext::default(), &FallbackPolicy::default()).unwrap();
        let first = std::fs::read(&req.output).unwrap();

        let second_dir = TempDir::new().unwrap();
        req.output = second_dir.path().join("a.sql");
        let summary =
            export(&req, &registry, &RenderContext::default(), &FallbackPolicy::default())
                .unwrap();
        let second = std::fs::read(&req.output).unwrap();

        assert_eq!(summary.id_source, IdSource::Derived);
        assert_eq!(first, second);
    }

    #[test]
    fn test_rerun_reuses_prior_id() {
        let dir = TempDir::new().unwrap();
        let req = request(&dir, "app.css", b"a{}");
        let policy = FallbackPolicy::default();

        let seeded: HashMap<String, u64> = HashMap::from([("app.css".to_string(), 555)]);
        export(&req, &seeded, &RenderContext::default(), &policy).unwrap();

        let empty: HashMap<String, u64> = HashMap::new();
        let summary = export(&req, &empty, &RenderContext::default(), &policy).unwrap();
        assert_eq!(summary.object_id, 555);
        assert_eq!(summary.id_source, IdSource::PriorOutput);
    }

    #[test]
    fn test_invalid_name_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let req = request(&dir, "bad name.css", b"a{}");
        let registry: HashMap<String, u64> = HashMap::new();

        let err = export(&req, &registry, &RenderContext::default(), &FallbackPolicy::default())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidLogicalName(_)));
        assert!(!req.output.exists());
    }

    #[test]
    fn test_missing_source() {
        let dir = TempDir::new().unwrap();
        let req = ExportRequest {
            source: dir.path().join("missing.css"),
            output: dir.path().join("out.sql"),
            logical_name: "missing.css".to_string(),
            chunk_size: 100,
        };
        let registry: HashMap<String, u64> = HashMap::new();

        let err = export(&req, &registry, &RenderContext::default(), &FallbackPolicy::default())
            .unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
        assert!(err.to_string().contains("missing.css"));
        assert!(!req.output.exists());
    }
}
