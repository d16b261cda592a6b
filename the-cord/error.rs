use std::io;

use thiserror::Error;

/// Result type for building cords from files.
pub type Result<T> = std::result::Result<T, FileCordError>;

/// Errors that can occur while turning an open file into a cord.
#[derive(Debug, Error)]
pub enum FileCordError {
  #[error("file is not seekable: {0}")]
  Seek(#[source] io::Error),
  #[error("failed to read file: {0}")]
  Read(#[source] io::Error),
  #[error("file length {len} does not fit in memory addressing")]
  TooLarge { len: u64 },
}

/// Errors that can occur while loading a [`FileCordConfig`](crate::FileCordConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to parse cord configuration: {0}")]
  Parse(#[from] toml::de::Error),
}
