use anyhow::Context;
use hexport_core::{DEFAULT_CHUNK_SIZE, FallbackPolicy, RenderContext};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Project config file name, looked up from the current directory upwards
pub const PROJECT_CONFIG_FILE: &str = "hexport.toml";

/// Configuration for hexport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Source bytes per hex chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default)]
    pub context: RenderContext,

    #[serde(default)]
    pub fallback: FallbackPolicy,

    /// Known object ids by logical name
    #[serde(default = "default_files")]
    pub files: BTreeMap<String, u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            context: RenderContext::default(),
            fallback: FallbackPolicy::default(),
            files: default_files(),
        }
    }
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_files() -> BTreeMap<String, u64> {
    BTreeMap::from([
        ("app-styles.css".to_string(), 13_063_284_063_853_025),
        ("css/app-styles.css".to_string(), 13_223_867_759_128_839),
    ])
}

impl Config {
    /// Load config from the first location that has one:
    /// explicit path, `hexport.toml` in the current or a parent directory,
    /// the user config file. Falls back to defaults.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let current = std::env::current_dir()?;
        Self::load_from(explicit, &current, Self::user_config_path().as_deref())
    }

    /// Same as [`Config::load`] with the search start and user config injected
    pub fn load_from(
        explicit: Option<&Path>,
        start: &Path,
        user_config: Option<&Path>,
    ) -> anyhow::Result<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::find_project_config_from(start)
                .or_else(|| user_config.filter(|p| p.is_file()).map(Path::to_path_buf)),
        };

        let config = match path {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading config");
                Self::load_file(&path)?
            }
            None => Config::default(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse a single config file
    pub fn load_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    /// Find hexport.toml by walking up from given directory
    pub fn find_project_config_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            let candidate = current.join(PROJECT_CONFIG_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Get user config file path
    pub fn user_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "hexport", "hexport")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.chunk_size == 0 {
            anyhow::bail!("chunk_size must be greater than zero");
        }
        self.fallback.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.chunk_size, 100);
        assert_eq!(config.context.application_id, 102);
        assert_eq!(config.fallback.prefix_hex_digits, 15);
        assert_eq!(config.files["app-styles.css"], 13063284063853025);
        assert_eq!(config.files["css/app-styles.css"], 13223867759128839);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.chunk_size, config.chunk_size);
        assert_eq!(parsed.context, config.context);
        assert_eq!(parsed.files, config.files);
    }

    #[test]
    fn test_partial_config_parse() {
        let toml_str = r#"
chunk_size = 50

[context]
application_id = 200
owner = "APP_OWNER"

[fallback]
prefix_hex_digits = 12
modulus = 1000000000000

[files]
"js/app.js" = 42
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.chunk_size, 50);
        assert_eq!(config.context.application_id, 200);
        assert_eq!(config.context.owner, "APP_OWNER");
        assert_eq!(config.context.release, "24.2.13");
        assert_eq!(config.fallback.modulus, Some(1_000_000_000_000));

        // An explicit [files] table replaces the built-in registry
        assert_eq!(config.files.len(), 1);
        assert_eq!(config.files["js/app.js"], 42);
    }

    #[test]
    fn test_empty_files_table() {
        let config: Config = toml::from_str("[files]\n").unwrap();
        assert!(config.files.is_empty());
    }

    #[test]
    fn test_find_project_config_walks_up() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a/b/c");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(PROJECT_CONFIG_FILE), "chunk_size = 10\n").unwrap();

        let found = Config::find_project_config_from(&nested).unwrap();
        assert_eq!(found, dir.path().join(PROJECT_CONFIG_FILE));

        let config = Config::load_from(None, &nested, None).unwrap();
        assert_eq!(config.chunk_size, 10);
    }

    #[test]
    fn test_explicit_path_wins() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(PROJECT_CONFIG_FILE), "chunk_size = 10\n").unwrap();
        let explicit = dir.path().join("other.toml");
        std::fs::write(&explicit, "chunk_size = 20\n").unwrap();

        let config = Config::load_from(Some(&explicit), dir.path(), None).unwrap();
        assert_eq!(config.chunk_size, 20);
    }

    #[test]
    fn test_user_config_used_without_project_config() {
        let project = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();
        let user_config = user.path().join("config.toml");
        std::fs::write(&user_config, "[context]\nworkspace_id = 7\n").unwrap();

        let config = Config::load_from(None, project.path(), Some(&user_config)).unwrap();
        assert_eq!(config.context.workspace_id, 7);
    }

    #[test]
    fn test_missing_explicit_path_is_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = Config::load_from(Some(&missing), dir.path(), None).unwrap_err();
        assert!(err.to_string().contains("nope.toml"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(PROJECT_CONFIG_FILE);

        std::fs::write(&path, "chunk_size = 0\n").unwrap();
        assert!(Config::load_from(None, dir.path(), None).is_err());

        std::fs::write(&path, "[fallback]\nprefix_hex_digits = 20\n").unwrap();
        assert!(Config::load_from(None, dir.path(), None).is_err());
    }
}
