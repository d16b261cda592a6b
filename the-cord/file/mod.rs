//! Cords over the contents of a file.
//!
//! Short files are read into memory up front. Longer ones are paged in on
//! demand through a [`lazy::LazyFileState`], which keeps the file open until
//! the last cord referring to it is dropped. The file must not change while
//! such a cord is alive.

pub mod eager;
pub mod lazy;

use std::{
  fs::File,
  io::{
    Read,
    Seek,
    SeekFrom,
  },
};

pub use eager::from_reader_eager;

use crate::{
  config::FileCordConfig,
  cord::Cord,
  error::{
    FileCordError,
    Result,
  },
  fatal::fatal,
  file::lazy::LazyFileState,
};

/// Files shorter than this are loaded eagerly by [`from_file`].
pub const LAZY_THRESHOLD: u64 = 16 * 1024 + 1;

/// Length of `file`, leaving its position at the start.
pub fn file_len<F: Seek>(file: &mut F) -> Result<u64> {
  let len = file.seek(SeekFrom::End(0)).map_err(FileCordError::Seek)?;
  file.rewind().map_err(FileCordError::Seek)?;
  Ok(len)
}

fn addressable(len: u64) -> Result<usize> {
  usize::try_from(len).map_err(|_| FileCordError::TooLarge { len })
}

/// Read the rest of `file` into memory.
pub fn try_from_file_eager<F: Read>(file: F) -> Result<Cord> {
  from_reader_eager(file)
}

/// Wrap `file` in a lazily filled cache.
pub fn try_from_file_lazy<F>(mut file: F) -> Result<Cord>
where
  F: Read + Seek + Send + 'static,
{
  let len = addressable(file_len(&mut file)?)?;
  Ok(LazyFileState::new(file, len).into_cord())
}

/// Choose between eager and lazy loading based on the file's length.
pub fn try_from_file_with<F>(mut file: F, config: &FileCordConfig) -> Result<Cord>
where
  F: Read + Seek + Send + 'static,
{
  let len = file_len(&mut file)?;
  let lazy = len >= config.lazy_threshold;
  tracing::debug!(len, lazy, threshold = config.lazy_threshold, "opening file cord");
  if !lazy {
    return from_reader_eager(file);
  }
  let len = addressable(len)?;
  Ok(LazyFileState::new(file, len).into_cord())
}

pub fn try_from_file<F>(file: F) -> Result<Cord>
where
  F: Read + Seek + Send + 'static,
{
  try_from_file_with(file, &FileCordConfig::default())
}

fn or_fatal(result: Result<Cord>) -> Cord {
  match result {
    Ok(cord) => cord,
    Err(err) => fatal(err),
  }
}

/// Like [`try_from_file_eager`], treating failure as fatal.
pub fn from_file_eager(file: File) -> Cord {
  or_fatal(try_from_file_eager(file))
}

/// Like [`try_from_file_lazy`], treating failure as fatal.
pub fn from_file_lazy(file: File) -> Cord {
  or_fatal(try_from_file_lazy(file))
}

/// A cord with the contents of `file`, which is owned by the result.
///
/// Failure to measure or read the file is fatal.
pub fn from_file(file: File) -> Cord {
  or_fatal(try_from_file(file))
}

pub fn from_file_with(file: File, config: &FileCordConfig) -> Cord {
  or_fatal(try_from_file_with(file, config))
}
