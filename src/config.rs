use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

const DEFAULT_PLACEHOLDER: &str = "What did you get done?";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub server: ServerConfig,
  /// Text shown in the empty snippet input
  #[serde(default = "default_placeholder")]
  pub placeholder: String,
  /// Token sent as `v` with every add (overridable via SNIP_VERIFICATION_TOKEN)
  #[serde(default)]
  pub verification: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  pub url: String,
  #[serde(default = "default_fetch_path")]
  pub fetch_path: String,
  #[serde(default = "default_add_path")]
  pub add_path: String,
}

fn default_placeholder() -> String {
  DEFAULT_PLACEHOLDER.to_string()
}

fn default_fetch_path() -> String {
  "/json".to_string()
}

fn default_add_path() -> String {
  "/add".to_string()
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./snip.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/snip/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/snip/config.yaml\n\
                 with at least `server: {{ url: https://your-snipper-host }}`."
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("snip.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("snip").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  /// Parse and validate a YAML document.
  pub fn from_yaml(contents: &str) -> Result<Self> {
    let config: Config = serde_yaml::from_str(contents).map_err(|e| eyre!("{}", e))?;

    // Fail early on unusable URLs rather than on the first request
    config.fetch_url()?;
    config.add_url()?;

    Ok(config)
  }

  fn base_url(&self) -> Result<Url> {
    Url::parse(&self.server.url).map_err(|e| eyre!("Invalid server url {}: {}", self.server.url, e))
  }

  pub fn fetch_url(&self) -> Result<Url> {
    self
      .base_url()?
      .join(&self.server.fetch_path)
      .map_err(|e| eyre!("Invalid fetch path {}: {}", self.server.fetch_path, e))
  }

  pub fn add_url(&self) -> Result<Url> {
    self
      .base_url()?
      .join(&self.server.add_path)
      .map_err(|e| eyre!("Invalid add path {}: {}", self.server.add_path, e))
  }

  /// Verification token, preferring SNIP_VERIFICATION_TOKEN over the file.
  pub fn verification_token(&self) -> String {
    std::env::var("SNIP_VERIFICATION_TOKEN").unwrap_or_else(|_| self.verification.clone())
  }
}
