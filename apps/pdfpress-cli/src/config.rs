//! Configuration for the `pdfpress` command
//!
//! Settings come from an optional TOML file, then `PDFPRESS_*` environment
//! variables, then command line flags (applied by the commands themselves).

use anyhow::{bail, Context};
use pdfpress_core::geometry::{DEFAULT_DPI, MAX_DPI};
use pdfpress_core::{ImageEncoding, ImageOptions, LockOptions, PermissionSet};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "PDFPRESS_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub merge: MergeConfig,
    #[serde(default)]
    pub lock: LockConfig,
}

impl Config {
    /// Locate and read the config file, then apply environment overrides.
    ///
    /// An explicitly named file (flag or `PDFPRESS_CONFIG`) must exist; the
    /// per-user file is optional.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let mut config = match explicit.map(Path::to_path_buf).or(from_env) {
            Some(path) => Self::from_file(&path)?,
            None => match user_config_path().filter(|p| p.is_file()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn parse(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("Failed to parse TOML configuration")
    }

    /// Apply `PDFPRESS_*` overrides looked up through `var`
    pub fn apply_env<F>(&mut self, var: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = var("PDFPRESS_OUTPUT_DIR") {
            self.merge.output_dir = Some(PathBuf::from(dir));
        }
        if let Some(dpi) = var("PDFPRESS_DPI") {
            self.merge.dpi = dpi
                .trim()
                .parse()
                .with_context(|| format!("PDFPRESS_DPI is not a number: {}", dpi))?;
        }
        if let Some(password) = var("PDFPRESS_OWNER_PASSWORD") {
            self.lock.owner_password = password;
        }
        if let Some(password) = var("PDFPRESS_USER_PASSWORD") {
            self.lock.user_password = password;
        }
        Ok(())
    }
}

/// `<config_dir>/pdfpress/config.toml`
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pdfpress").join("config.toml"))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EncodingName {
    #[default]
    Jpeg,
    Flate,
}

/// Settings for `merge` and `project run`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergeConfig {
    /// Where the output goes when no `--output` is given (default: Desktop)
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default = "default_output_name")]
    pub output_name: String,
    #[serde(default = "default_dpi")]
    pub dpi: u32,
    #[serde(default)]
    pub image_encoding: EncodingName,
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    /// Abort on the first unreadable input
    #[serde(default)]
    pub strict: bool,
}

fn default_output_name() -> String {
    "resultado_a4_scaled.pdf".to_string()
}

fn default_dpi() -> u32 {
    DEFAULT_DPI
}

fn default_jpeg_quality() -> u8 {
    90
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            output_name: default_output_name(),
            dpi: default_dpi(),
            image_encoding: EncodingName::default(),
            jpeg_quality: default_jpeg_quality(),
            strict: false,
        }
    }
}

impl MergeConfig {
    /// Configured directory, else Desktop, else home, else the working directory
    pub fn resolved_output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .or_else(dirs::desktop_dir)
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn image_options(&self) -> anyhow::Result<ImageOptions> {
        if !(1..=MAX_DPI).contains(&self.dpi) {
            bail!("dpi must be between 1 and {}, got {}", MAX_DPI, self.dpi);
        }
        let encoding = match self.image_encoding {
            EncodingName::Jpeg => {
                if !(1..=100).contains(&self.jpeg_quality) {
                    bail!("jpeg_quality must be between 1 and 100, got {}", self.jpeg_quality);
                }
                ImageEncoding::Jpeg {
                    quality: self.jpeg_quality,
                }
            }
            EncodingName::Flate => ImageEncoding::Flate,
        };
        Ok(ImageOptions {
            dpi: self.dpi,
            encoding,
        })
    }
}

/// Settings for `lock`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LockConfig {
    #[serde(default)]
    pub owner_password: String,
    #[serde(default)]
    pub user_password: String,
    /// Permissions left allowed; everything else is blocked
    #[serde(default)]
    pub allow: Vec<String>,
}

impl LockConfig {
    pub fn lock_options(&self) -> anyhow::Result<LockOptions> {
        let permissions = PermissionSet::allowing(&self.allow)
            .context("Invalid permission in [lock] allow")?;
        Ok(LockOptions {
            permissions,
            owner_password: self.owner_password.clone(),
            user_password: self.user_password.clone(),
        })
    }
}
