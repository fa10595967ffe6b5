//! Tessera Configuration
//!
//! Shared configuration crate for Tessera components.
//!
//! Handles loading configuration from:
//! 1. TESSERA_CONFIG env var (explicit path)
//! 2. ./tessera.toml (current directory)
//! 3. ~/.tessera/config.toml (user home)
//!
//! Environment variables take precedence over TOML config.
//!
//! The sharing core never reads this crate: callers turn the loaded values
//! into an explicit [`SplitOptions`] with [`SharingConfig::split_options`].

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::{env, fs};

use tessera_sharing::prime::DEFAULT_PRIMALITY_ROUNDS;
use tessera_sharing::secrets::DEFAULT_MAX_CHUNK_BYTES;
use tessera_sharing::{FormatVersion, SplitOptions};

/// Global config instance for convenience access
pub static GLOBAL_CONFIG: OnceLock<TesseraConfig> = OnceLock::new();

const CONFIG_FILE_NAME: &str = "tessera.toml";
const HOME_CONFIG_FILE_NAME: &str = "config.toml";
const CONFIG_DIR_NAME: &str = ".tessera";

// ============================================================================
// Config Structs
// ============================================================================

/// Root configuration structure (matches TOML layout)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TesseraConfig {
    #[serde(default)]
    pub sharing: SharingConfig,
}

/// Secret sharing configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharingConfig {
    /// Format version stamped on newly split parts
    #[serde(default = "default_format_version")]
    pub format_version: u32,
    /// Widest chunk, in bytes, a generated prime must hold
    #[serde(default = "default_max_chunk_bytes")]
    pub max_chunk_bytes: usize,
    /// Miller-Rabin rounds for prime generation
    #[serde(default = "default_primality_rounds")]
    pub primality_rounds: usize,
}

impl Default for SharingConfig {
    fn default() -> Self {
        Self {
            format_version: default_format_version(),
            max_chunk_bytes: DEFAULT_MAX_CHUNK_BYTES,
            primality_rounds: DEFAULT_PRIMALITY_ROUNDS,
        }
    }
}

fn default_format_version() -> u32 {
    FormatVersion::CURRENT.number()
}
fn default_max_chunk_bytes() -> usize {
    DEFAULT_MAX_CHUNK_BYTES
}
fn default_primality_rounds() -> usize {
    DEFAULT_PRIMALITY_ROUNDS
}

impl SharingConfig {
    /// Validate and convert into options for a split.
    pub fn split_options(&self) -> Result<SplitOptions> {
        let version = FormatVersion::from_number(self.format_version)
            .with_context(|| format!("Invalid format_version in config: {}", self.format_version))?;
        if self.max_chunk_bytes == 0 {
            bail!("max_chunk_bytes must be at least 1");
        }
        if self.primality_rounds == 0 {
            bail!("primality_rounds must be at least 1");
        }

        Ok(SplitOptions::default()
            .with_version(version)
            .with_max_chunk_bytes(self.max_chunk_bytes)
            .with_primality_rounds(self.primality_rounds))
    }
}

// ============================================================================
// Override Helpers
// ============================================================================

/// Set field from a variable if present and parseable
fn override_parse<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    field: &mut T,
) {
    if let Some(v) = lookup(key) {
        match v.parse() {
            Ok(parsed) => *field = parsed,
            Err(_) => log::warn!("Ignoring unparseable {key}={v}"),
        }
    }
}

// ============================================================================
// Implementation
// ============================================================================

impl TesseraConfig {
    /// Load configuration from config file with env var overrides
    pub fn load() -> Result<Self> {
        let mut config = match Self::find_config_file() {
            Some(path) => {
                log::info!("Loading config from: {}", path.display());
                Self::read_file(&path)?
            }
            None => {
                log::info!("No config file found, using defaults and environment variables");
                Self::default()
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific file path
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::read_file(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from TOML text, without env overrides
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Failed to parse config")
    }

    fn read_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Find the config file path
    fn find_config_file() -> Option<PathBuf> {
        // 1. Check TESSERA_CONFIG env var
        if let Ok(path) = env::var("TESSERA_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
            log::warn!("TESSERA_CONFIG points at missing file: {}", path.display());
        }

        // 2. Check ./tessera.toml (current directory)
        let local_path = PathBuf::from(CONFIG_FILE_NAME);
        if local_path.exists() {
            return Some(local_path);
        }

        // 3. Check ~/.tessera/config.toml
        Self::default_config_path().filter(|p| p.exists())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// Apply overrides from any key/value source
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        override_parse(
            &lookup,
            "TESSERA_FORMAT_VERSION",
            &mut self.sharing.format_version,
        );
        override_parse(
            &lookup,
            "TESSERA_MAX_CHUNK_BYTES",
            &mut self.sharing.max_chunk_bytes,
        );
        override_parse(
            &lookup,
            "TESSERA_PRIMALITY_ROUNDS",
            &mut self.sharing.primality_rounds,
        );
    }

    /// Get the default config file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(CONFIG_DIR_NAME).join(HOME_CONFIG_FILE_NAME))
    }

    /// Generate a sample config file
    pub fn generate_sample() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }

    /// Get the global config instance, initializing it if necessary.
    ///
    /// Falls back to defaults if loading fails.
    pub fn global() -> &'static TesseraConfig {
        GLOBAL_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                log::warn!("Failed to load config: {}, using defaults", e);
                Self::default()
            })
        })
    }

    /// Try to get the global config instance.
    ///
    /// Returns `None` if config hasn't been initialized yet.
    pub fn try_global() -> Option<&'static TesseraConfig> {
        GLOBAL_CONFIG.get()
    }

    /// Initialize the global config with a specific instance.
    ///
    /// Returns `Err(config)` if already initialized.
    pub fn set_global(config: TesseraConfig) -> Result<(), TesseraConfig> {
        GLOBAL_CONFIG.set(config)
    }
}
