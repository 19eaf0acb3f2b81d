use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{SitepassError, SitepassResult};
use crate::types::{Charset, DEFAULT_LENGTH, MAX_LENGTH};

/// Top-level configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SitepassConfig {
    pub kdf: KdfConfig,
    pub generate: GenerateConfig,
    pub reveal: RevealConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KdfAlgorithm {
    #[default]
    Scrypt,
    Argon2id,
}

impl std::fmt::Display for KdfAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KdfAlgorithm::Scrypt => f.write_str("scrypt"),
            KdfAlgorithm::Argon2id => f.write_str("argon2id"),
        }
    }
}

/// Key derivation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KdfConfig {
    /// "scrypt" (default, compatible with existing passwords) or "argon2id"
    pub algorithm: KdfAlgorithm,
    /// scrypt CPU/memory cost as log2(N) (default: 18)
    pub scrypt_log_n: u8,
    /// scrypt block size (default: 8)
    pub scrypt_r: u32,
    /// scrypt parallelism (default: 1)
    pub scrypt_p: u32,
    /// Argon2id memory cost in KiB (default: 65536 = 64 MiB)
    pub argon2_mem_cost_kib: u32,
    /// Argon2id time cost (iterations, default: 3)
    pub argon2_time_cost: u32,
    /// Argon2id parallelism (default: 4)
    pub argon2_parallelism: u32,
    /// Minimum derived buffer length in bytes (default: 128)
    pub output_len: usize,
}

impl Default for KdfConfig {
    fn default() -> Self {
        Self {
            algorithm: KdfAlgorithm::Scrypt,
            scrypt_log_n: 18,
            scrypt_r: 8,
            scrypt_p: 1,
            argon2_mem_cost_kib: 65536,
            argon2_time_cost: 3,
            argon2_parallelism: 4,
            output_len: 128,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    /// Preset used when no alphabet is given on the command line
    pub charset: Charset,
    /// Password length in symbols (default: 16)
    pub length: usize,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            charset: Charset::default(),
            length: DEFAULT_LENGTH,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    /// Ticks a password stays visible (default: 20)
    pub seconds: u32,
    /// Tick period in milliseconds (default: 1000)
    pub tick_ms: u64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            seconds: crate::reveal::DEFAULT_REVEAL_SECS,
            tick_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level (default: info)
    pub level: String,
    /// Log format: "text" or "json"
    pub format: LogFormat,
    /// Log file; required for the TUI to log at all
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Text,
            file: None,
        }
    }
}

impl SitepassConfig {
    /// Read and validate a config file. A missing file yields defaults.
    pub fn load(path: &Path) -> SitepassResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| SitepassError::Config(format!("reading {}: {e}", path.display())))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| SitepassError::Config(format!("parsing {}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> SitepassResult<()> {
        if self.reveal.seconds == 0 {
            return Err(SitepassError::Config("reveal.seconds must be at least 1".into()));
        }
        if self.reveal.tick_ms == 0 {
            return Err(SitepassError::Config("reveal.tick_ms must be at least 1".into()));
        }
        if self.generate.length == 0 {
            return Err(SitepassError::Config("generate.length must be at least 1".into()));
        }
        if self.generate.length > MAX_LENGTH {
            return Err(SitepassError::Config(format!(
                "generate.length must be at most {MAX_LENGTH}, got {}",
                self.generate.length
            )));
        }
        if self.kdf.output_len < 8 {
            return Err(SitepassError::Config(format!(
                "kdf.output_len must be at least 8 bytes, got {}",
                self.kdf.output_len
            )));
        }
        Ok(())
    }
}

/// `~/.config/sitepass/config.toml`
pub fn default_config_path() -> PathBuf {
    expand_tilde(Path::new("~/.config/sitepass/config.toml"))
}

/// Expand `~` in path to the user's home directory
pub fn expand_tilde(path: &Path) -> PathBuf {
    let s = path.to_string_lossy();
    if let Some(rest) = s.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_default();
        PathBuf::from(format!("{home}/{rest}"))
    } else {
        path.to_path_buf()
    }
}
