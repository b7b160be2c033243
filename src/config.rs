// src/config.rs

//! Configuration loading utilities.

use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::{Config, SourceFile};

/// Load and validate application config and source descriptors.
///
/// A missing or broken config file degrades to defaults with a logged
/// warning; the source file is required, since a poller with no sources
/// has nothing to do. Validation failures here are the only fatal
/// errors in the process.
pub fn load_all(config_path: &Path, sources_path: &Path) -> Result<(Config, SourceFile)> {
    let config = Config::load_or_default(config_path);
    config.validate()?;

    let sources = SourceFile::load(sources_path).map_err(|e| {
        AppError::config(format!(
            "Failed to load sources from {}: {e}",
            sources_path.display()
        ))
    })?;
    sources.validate()?;

    log::info!(
        "Loaded {} source(s) ({} enabled), {} sink(s)",
        sources.sources.len(),
        sources.enabled_count(),
        config.sinks.len()
    );

    Ok((config, sources))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    const SOURCES: &str = r#"
        [[sources]]
        id = "sw_notice"
        name = "SW Notice"
        kind = "rss"
        url = "https://example.ac.kr/rss.xml"
    "#;

    #[test]
    fn loads_defaults_when_config_is_missing() {
        let dir = tempfile::TempDir::new().unwrap();
        let sources_path = write_file(&dir, "sources.toml", SOURCES);

        let (config, sources) = load_all(&dir.path().join("nope.toml"), &sources_path).unwrap();
        assert_eq!(config.scheduler.interval_secs, 300);
        assert_eq!(sources.enabled_count(), 1);
    }

    #[test]
    fn missing_sources_file_is_fatal() {
        let dir = tempfile::TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");
        assert!(load_all(&config_path, &dir.path().join("nope.toml")).is_err());
    }

    #[test]
    fn all_disabled_sources_is_fatal() {
        let dir = tempfile::TempDir::new().unwrap();
        let sources_path = write_file(
            &dir,
            "sources.toml",
            r#"
                [[sources]]
                id = "sw_notice"
                name = "SW Notice"
                kind = "rss"
                url = "https://example.ac.kr/rss.xml"
                enabled = false
            "#,
        );
        assert!(load_all(&dir.path().join("config.toml"), &sources_path).is_err());
    }
}
