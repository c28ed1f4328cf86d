use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub parsing: Option<ParsingSection>,
    pub classification: Option<ClassificationSection>,
    pub export: Option<ExportSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsingSection {
    /// Largest bare bracket number the gap filler will consider.
    pub max_citation_number: Option<u32>,
    /// Minimum non-whitespace characters for a synthesized headline.
    pub min_headline_chars: Option<usize>,
    pub placeholder_headline: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassificationSection {
    /// Extra SQL source URLs.
    pub sql_urls: Option<Vec<String>>,
    /// When true, `sql_urls` replaces the built-in list instead of extending it.
    pub replace_defaults: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportSection {
    /// `csv`, `json` or `markdown`.
    pub format: Option<String>,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Platform config directory path: `<config_dir>/citescan/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("citescan").join("config.toml"))
}

/// Load config by cascading CWD `.citescan.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".citescan.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    match read_config(path) {
        Ok(config) => Some(config),
        Err(ConfigError::Io { .. }) => None,
        Err(e) => {
            tracing::warn!(error = %e, "ignoring unparsable config file");
            None
        }
    }
}

/// Read a config that the user named explicitly; errors are surfaced.
pub fn read_config(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let bp = base.parsing.unwrap_or_default();
    let op = overlay.parsing.unwrap_or_default();
    let bc = base.classification.unwrap_or_default();
    let oc = overlay.classification.unwrap_or_default();
    let be = base.export.unwrap_or_default();
    let oe = overlay.export.unwrap_or_default();

    ConfigFile {
        parsing: Some(ParsingSection {
            max_citation_number: op.max_citation_number.or(bp.max_citation_number),
            min_headline_chars: op.min_headline_chars.or(bp.min_headline_chars),
            placeholder_headline: op.placeholder_headline.or(bp.placeholder_headline),
        }),
        classification: Some(ClassificationSection {
            sql_urls: oc.sql_urls.or(bc.sql_urls),
            replace_defaults: oc.replace_defaults.or(bc.replace_defaults),
        }),
        export: Some(ExportSection {
            format: oe.format.or(be.format),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_toml() {
        let config: ConfigFile = toml::from_str(
            r#"
            [classification]
            sql_urls = ["https://stats.example.org/table"]
            "#,
        )
        .unwrap();
        assert!(config.parsing.is_none());
        assert_eq!(
            config.classification.unwrap().sql_urls.unwrap(),
            vec!["https://stats.example.org/table".to_string()]
        );
    }

    #[test]
    fn merge_overlay_wins() {
        let base = ConfigFile {
            parsing: Some(ParsingSection {
                max_citation_number: Some(50),
                min_headline_chars: Some(5),
                placeholder_headline: None,
            }),
            ..Default::default()
        };
        let overlay = ConfigFile {
            parsing: Some(ParsingSection {
                max_citation_number: Some(200),
                ..Default::default()
            }),
            export: Some(ExportSection {
                format: Some("json".to_string()),
            }),
            ..Default::default()
        };
        let merged = merge(base, overlay);
        let parsing = merged.parsing.unwrap();
        assert_eq!(parsing.max_citation_number, Some(200));
        assert_eq!(parsing.min_headline_chars, Some(5));
        assert_eq!(merged.export.unwrap().format.as_deref(), Some("json"));
    }

    #[test]
    fn read_config_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[parsing\nmax_citation_number = 3").unwrap();
        assert!(matches!(read_config(&path), Err(ConfigError::Parse { .. })));
        assert!(load_from_path(&path).is_none());
    }

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_from_path(&dir.path().join("absent.toml")).is_none());
    }
}
