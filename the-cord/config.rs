use serde::Deserialize;

use crate::{
  error::ConfigError,
  file::LAZY_THRESHOLD,
};

/// Tunables for [`from_file_with`](crate::from_file_with).
///
/// ```toml
/// lazy-threshold = 65536
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileCordConfig {
  /// Files of at least this many bytes are read lazily; shorter files are
  /// loaded eagerly.
  pub lazy_threshold: u64,
}

impl Default for FileCordConfig {
  fn default() -> Self {
    Self {
      lazy_threshold: LAZY_THRESHOLD,
    }
  }
}

impl FileCordConfig {
  pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
    Ok(toml::from_str(source)?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_document_uses_defaults() {
    let config = FileCordConfig::from_toml("").unwrap();
    assert_eq!(config, FileCordConfig::default());
    assert_eq!(config.lazy_threshold, 16 * 1024 + 1);
  }

  #[test]
  fn threshold_is_configurable() {
    let config = FileCordConfig::from_toml("lazy-threshold = 10").unwrap();
    assert_eq!(config.lazy_threshold, 10);
  }

  #[test]
  fn unknown_keys_are_rejected() {
    assert!(FileCordConfig::from_toml("cache-size = 3").is_err());
  }
}
