//! Demand-paged access to a file.
//!
//! A [`LazyFileState`] owns an open file and a direct-mapped cache of 128
//! lines of 128 bytes each, covering a 16 KiB window of the file. Byte `i`
//! can only live in slot `(i / LINE_SZ) % CACHE_LINES`, tagged with
//! `i / LINE_SZ`.
//!
//! # Concurrency
//!
//! Lines are never modified after they are installed; a miss reads a fresh
//! line and swaps it into its slot with a single atomic store. A reader that
//! hits therefore sees either the old complete line or the new complete
//! line, and never takes a lock. Misses are serialized by the mutex that
//! guards the file handle, which also keeps the tracked file position
//! consistent and lets concurrent misses on the same line share one read.
//!
//! The file is closed when the state is dropped, which for a lazy cord
//! happens once the cord and every clone of it are gone.

use std::{
  fmt,
  io::{
    self,
    ErrorKind,
    Read,
    Seek,
    SeekFrom,
  },
  sync::{
    Arc,
    atomic::{
      AtomicU64,
      Ordering,
    },
  },
};

use arc_swap::ArcSwapOption;
use parking_lot::Mutex;

use crate::{
  cord::Cord,
  fatal::{
    alloc_bytes,
    fatal,
  },
};

pub const LOG_LINE_SZ: u32 = 7;
pub const LINE_SZ: usize = 1 << LOG_LINE_SZ;
pub const LOG_CACHE_SZ: u32 = 14;
pub const CACHE_SZ: usize = 1 << LOG_CACHE_SZ;
pub const CACHE_LINES: usize = CACHE_SZ / LINE_SZ;

/// Tracked position while the real one is not known.
const UNKNOWN_POSITION: u64 = u64::MAX;

struct CacheLine {
  tag:  usize,
  /// `data[i % LINE_SZ]` is byte `i` of the file when `tag == i / LINE_SZ`.
  data: Box<[u8]>,
}

/// A pending miss: the byte wanted and the buffer its line is read into.
struct Refill {
  file_pos: usize,
  data:     Box<[u8]>,
}

struct FileCursor<F> {
  file:    F,
  /// Offset the next read from `file` starts at, or `UNKNOWN_POSITION`.
  current: u64,
}

/// Cache counters, see [`LazyFileState::stats`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
  /// Lines read from the file.
  pub refills: u64,
  /// Seeks issued before a read.
  pub seeks:   u64,
}

pub struct LazyFileState<F> {
  cursor:  Mutex<FileCursor<F>>,
  lines:   [ArcSwapOption<CacheLine>; CACHE_LINES],
  len:     usize,
  refills: AtomicU64,
  seeks:   AtomicU64,
}

#[inline]
fn slot_of(i: usize) -> usize {
  (i % CACHE_SZ) >> LOG_LINE_SZ
}

impl<F> LazyFileState<F>
where
  F: Read + Seek + Send + 'static,
{
  /// Wrap `file`, whose contents are `len` bytes long and whose read
  /// position is at the start.
  pub fn new(file: F, len: usize) -> Arc<Self> {
    tracing::debug!(len, "opening lazily read file");
    Arc::new(Self {
      cursor: Mutex::new(FileCursor { file, current: 0 }),
      lines: std::array::from_fn(|_| ArcSwapOption::empty()),
      len,
      refills: AtomicU64::new(0),
      seeks: AtomicU64::new(0),
    })
  }

  pub fn len(&self) -> usize {
    self.len
  }

  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  pub fn stats(&self) -> CacheStats {
    CacheStats {
      refills: self.refills.load(Ordering::Relaxed),
      seeks:   self.seeks.load(Ordering::Relaxed),
    }
  }

  /// Byte `i` of the file.
  pub fn byte_at(&self, i: usize) -> u8 {
    if i >= self.len {
      fatal(format_args!(
        "lazy file cord: index {i} is past the end of a {} byte file",
        self.len
      ));
    }
    if let Some(line) = &*self.lines[slot_of(i)].load()
      && line.tag == i >> LOG_LINE_SZ
    {
      return line.data[i % LINE_SZ];
    }

    let mut data = alloc_bytes(LINE_SZ);
    data.resize(LINE_SZ, 0);
    self.refill(Refill {
      file_pos: i,
      data:     data.into_boxed_slice(),
    })
  }

  fn refill(&self, request: Refill) -> u8 {
    let Refill { file_pos, mut data } = request;
    let tag = file_pos >> LOG_LINE_SZ;
    let offset = file_pos % LINE_SZ;
    let slot = &self.lines[slot_of(file_pos)];

    let mut cursor = self.cursor.lock();
    // Another miss on the same line may have been served while we waited.
    if let Some(line) = &*slot.load()
      && line.tag == tag
    {
      return line.data[offset];
    }

    let line_start = (tag * LINE_SZ) as u64;
    let seeked = cursor.current != line_start;
    // Unknown until the read below succeeds, so a failed refill forces the
    // next one to seek.
    cursor.current = UNKNOWN_POSITION;
    if seeked {
      if let Err(err) = cursor.file.seek(SeekFrom::Start(line_start)) {
        fatal(format_args!(
          "lazy file cord: seek to {line_start} failed: {err}"
        ));
      }
      self.seeks.fetch_add(1, Ordering::Relaxed);
    }

    let filled = match read_line(&mut cursor.file, &mut data) {
      Ok(filled) if filled > offset => filled,
      Ok(filled) => {
        fatal(format_args!(
          "lazy file cord: read of line {tag} returned {filled} bytes, byte {file_pos} missing"
        ))
      },
      Err(err) => {
        fatal(format_args!(
          "lazy file cord: read of line {tag} failed: {err}"
        ))
      },
    };

    let byte = data[offset];
    slot.store(Some(Arc::new(CacheLine { tag, data })));
    cursor.current = line_start + filled as u64;
    self.refills.fetch_add(1, Ordering::Relaxed);
    tracing::trace!(line = tag, seeked, filled, "refilled lazy file cache line");
    byte
  }

  /// A cord over the whole file, backed by this state.
  pub fn into_cord(self: Arc<Self>) -> Cord {
    let len = self.len;
    Cord::from_fn(len, move |i| self.byte_at(i))
  }
}

/// Read until `buf` is full or the file ends.
fn read_line<R: Read>(file: &mut R, buf: &mut [u8]) -> io::Result<usize> {
  let mut filled = 0;
  while filled < buf.len() {
    match file.read(&mut buf[filled..]) {
      Ok(0) => break,
      Ok(n) => filled += n,
      Err(err) if err.kind() == ErrorKind::Interrupted => {},
      Err(err) => return Err(err),
    }
  }
  Ok(filled)
}

impl<F> fmt::Debug for LazyFileState<F> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("LazyFileState")
      .field("len", &self.len)
      .field("refills", &self.refills.load(Ordering::Relaxed))
      .field("seeks", &self.seeks.load(Ordering::Relaxed))
      .finish_non_exhaustive()
  }
}

impl<F> Drop for LazyFileState<F> {
  fn drop(&mut self) {
    tracing::debug!(
      len = self.len,
      refills = self.refills.load(Ordering::Relaxed),
      seeks = self.seeks.load(Ordering::Relaxed),
      "closing lazily read file"
    );
  }
}
