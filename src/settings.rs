use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::utils::encoding::HexStyle;

/// Environment variable naming a directory with an overriding `Settings.toml`
pub const CONFIG_DIR_ENV: &str = "PASSKEY_INSPECT_CONFIG_DIR";

const SETTINGS_FILE: &str = "Settings.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct InspectSettings {
    pub output: OutputSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Spaces per indentation level of the printed report
    pub json_indent: usize,
    /// Prefix hex strings with `0x`
    pub hex_prefix: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            json_indent: 2,
            hex_prefix: true,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl OutputSettings {
    #[must_use]
    pub const fn hex_style(&self) -> HexStyle {
        HexStyle::from_prefix_flag(self.hex_prefix)
    }
}

impl InspectSettings {
    /// Load settings from configuration files and environment variables,
    /// then initialize logging at the configured level
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Settings file cannot be read or parsed
    /// - Logger initialization fails
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config_dir = std::env::var_os(CONFIG_DIR_ENV).map(PathBuf::from);
        let (settings, sources) = Self::load_from(Path::new("."), config_dir.as_deref())?;

        Self::initialize_environment(&settings.logging)?;
        for source in &sources {
            log::debug!("Loaded settings from {}", source.display());
        }
        Ok(settings)
    }

    /// Resolve settings without touching the logger
    ///
    /// Priority, highest first:
    /// 1. Environment variables
    /// 2. `Settings.toml` in `config_dir` (if given and present)
    /// 3. `Settings.toml` in `working_dir` (if present)
    /// 4. Default settings
    ///
    /// Returns the settings together with the files that were read.
    ///
    /// # Errors
    ///
    /// Returns an error if a settings file exists but cannot be read or parsed.
    pub fn load_from(
        working_dir: &Path,
        config_dir: Option<&Path>,
    ) -> Result<(Self, Vec<PathBuf>), Box<dyn std::error::Error>> {
        let (mut settings, sources) = Self::load_base_settings(working_dir, config_dir)?;
        Self::apply_env_overrides(&mut settings);
        Ok((settings, sources))
    }

    fn load_base_settings(
        working_dir: &Path,
        config_dir: Option<&Path>,
    ) -> Result<(Self, Vec<PathBuf>), Box<dyn std::error::Error>> {
        let mut settings = Self::default();
        let mut sources = Vec::new();

        let candidates = std::iter::once(working_dir.join(SETTINGS_FILE))
            .chain(config_dir.map(|dir| dir.join(SETTINGS_FILE)));
        for path in candidates {
            if path.exists() {
                let toml_content = fs::read_to_string(&path)?;
                settings = basic_toml::from_str(&toml_content)?;
                sources.push(path);
            }
        }

        Ok((settings, sources))
    }

    /// Initialize `env_logger`; `RUST_LOG` takes precedence over the configured level
    ///
    /// # Errors
    ///
    /// Returns an error if a global logger is already installed
    fn initialize_environment(logging: &LoggingSettings) -> Result<(), Box<dyn std::error::Error>> {
        let env = env_logger::Env::default().default_filter_or(logging.level.as_str());
        env_logger::Builder::from_env(env).try_init()?;
        Ok(())
    }

    fn apply_env_overrides(settings: &mut Self) {
        Self::apply_output_env_overrides(&mut settings.output);
        Self::apply_logging_env_overrides(&mut settings.logging);
    }

    pub fn apply_output_env_overrides(output_settings: &mut OutputSettings) {
        if let Ok(value) = std::env::var("JSON_INDENT") {
            if let Ok(indent) = value.parse::<usize>() {
                output_settings.json_indent = indent;
            }
        }
        if let Ok(value) = std::env::var("HEX_PREFIX") {
            if let Ok(prefix) = value.parse::<bool>() {
                output_settings.hex_prefix = prefix;
            }
        }
    }

    pub fn apply_logging_env_overrides(logging_settings: &mut LoggingSettings) {
        if let Ok(log_level) = std::env::var("LOG_LEVEL") {
            logging_settings.level = log_level;
        }
    }
}
