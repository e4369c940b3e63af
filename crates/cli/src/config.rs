use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use applysmart_core::analysis::Analyzers;
use applysmart_core::EngineConfig;

/// Which analysis backends the engine is wired with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzerMode {
    Pixel,
    Simulated,
}

impl AnalyzerMode {
    pub fn analyzers(self) -> Analyzers {
        match self {
            Self::Pixel => Analyzers::pixel(),
            Self::Simulated => Analyzers::simulated(),
        }
    }
}

/// CLI configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub engine: EngineConfig,
    pub analyzers: AnalyzerMode,
    /// Extra rule sets merged over the bundled catalog.
    pub catalog_path: Option<PathBuf>,
    /// Where the client session is persisted, if anywhere.
    pub session_path: Option<PathBuf>,
    /// Write the `_corrected` copy next to the input after validation.
    pub write_corrected: bool,
}

impl CliConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                          | Default  |
    /// |----------------------------------|----------|
    /// | `APPLYSMART_INITIAL_DELAY_MS`    | `1500`   |
    /// | `APPLYSMART_RULE_DELAY_MS`       | `300`    |
    /// | `APPLYSMART_CORRECTION_DELAY_MS` | `1000`   |
    /// | `APPLYSMART_ANALYZERS`           | `pixel`  |
    /// | `APPLYSMART_CATALOG_PATH`        | unset    |
    /// | `APPLYSMART_SESSION_PATH`        | unset    |
    /// | `APPLYSMART_WRITE_CORRECTED`     | `false`  |
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which returns the value of a
    /// variable if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = EngineConfig::default();
        let millis = |key: &str, default: Duration| -> anyhow::Result<Duration> {
            match lookup(key) {
                Some(raw) => {
                    let ms: u64 = raw
                        .trim()
                        .parse()
                        .with_context(|| format!("{key} must be a whole number of milliseconds"))?;
                    Ok(Duration::from_millis(ms))
                }
                None => Ok(default),
            }
        };

        let engine = EngineConfig {
            initial_delay: millis("APPLYSMART_INITIAL_DELAY_MS", defaults.initial_delay)?,
            rule_delay: millis("APPLYSMART_RULE_DELAY_MS", defaults.rule_delay)?,
            correction_delay: millis("APPLYSMART_CORRECTION_DELAY_MS", defaults.correction_delay)?,
            ..defaults
        };

        let analyzers = match lookup("APPLYSMART_ANALYZERS").as_deref().map(str::trim) {
            None | Some("") | Some("pixel") => AnalyzerMode::Pixel,
            Some("simulated") => AnalyzerMode::Simulated,
            Some(other) => bail!("APPLYSMART_ANALYZERS must be 'pixel' or 'simulated', got '{other}'"),
        };

        let write_corrected = match lookup("APPLYSMART_WRITE_CORRECTED")
            .map(|v| v.trim().to_ascii_lowercase())
            .as_deref()
        {
            None | Some("") | Some("0") | Some("false") | Some("no") => false,
            Some("1") | Some("true") | Some("yes") => true,
            Some(other) => bail!("APPLYSMART_WRITE_CORRECTED must be a boolean, got '{other}'"),
        };

        let path = |key: &str| lookup(key).filter(|v| !v.trim().is_empty()).map(PathBuf::from);

        Ok(Self {
            engine,
            analyzers,
            catalog_path: path("APPLYSMART_CATALOG_PATH"),
            session_path: path("APPLYSMART_SESSION_PATH"),
            write_corrected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<CliConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        CliConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_env() {
        let config = load(&[]).unwrap();
        assert_eq!(config.engine, EngineConfig::default());
        assert_eq!(config.analyzers, AnalyzerMode::Pixel);
        assert!(config.catalog_path.is_none());
        assert!(!config.write_corrected);
    }

    #[test]
    fn overrides_are_applied() {
        let config = load(&[
            ("APPLYSMART_RULE_DELAY_MS", "0"),
            ("APPLYSMART_ANALYZERS", "simulated"),
            ("APPLYSMART_WRITE_CORRECTED", "true"),
            ("APPLYSMART_SESSION_PATH", "/tmp/session.json"),
        ])
        .unwrap();
        assert!(config.engine.rule_delay.is_zero());
        assert_eq!(config.engine.initial_delay, Duration::from_millis(1500));
        assert_eq!(config.analyzers, AnalyzerMode::Simulated);
        assert!(config.write_corrected);
        assert_eq!(config.session_path, Some(PathBuf::from("/tmp/session.json")));
    }

    #[test]
    fn bad_values_are_errors() {
        assert!(load(&[("APPLYSMART_RULE_DELAY_MS", "fast")]).is_err());
        assert!(load(&[("APPLYSMART_ANALYZERS", "opencv")]).is_err());
        assert!(load(&[("APPLYSMART_WRITE_CORRECTED", "maybe")]).is_err());
    }
}
