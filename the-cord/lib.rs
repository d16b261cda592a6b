//! Generic algorithms over immutable, structurally shared byte sequences.
//!
//! A [`Cord`] is a cheap-to-clone byte sequence built from flat slices,
//! concatenations and generator functions. On top of that representation
//! this crate provides comparison, windowed extraction, byte and substring
//! search, flattening and streaming output, and two ways of exposing a file
//! as a cord: eagerly loaded, or lazily paged in through a small
//! direct-mapped cache that is safe to read from many threads at once.
//!
//! ```
//! use the_cord::{Cord, search};
//!
//! let x = Cord::from("{}").concat(&Cord::from("abc"));
//! assert_eq!(search::chr(&x, 0, b'b'), Some(3));
//! ```

pub mod builder;
pub mod compare;
pub mod config;
pub mod cord;
pub mod error;
pub mod fatal;
pub mod file;
pub mod fill;
pub mod flatten;
pub mod iter;
pub mod search;

pub use builder::CordBuilder;
pub use compare::{
  compare,
  compare_nullable,
  compare_range,
};
pub use config::FileCordConfig;
pub use cord::Cord;
pub use error::{
  FileCordError,
  Result,
};
pub use fatal::{
  OomFn,
  oom_fn,
  set_oom_fn,
};
pub use file::{
  LAZY_THRESHOLD,
  from_file,
  from_file_eager,
  from_file_lazy,
  from_file_with,
  from_reader_eager,
  lazy::{
    CacheStats,
    LazyFileState,
  },
  try_from_file,
  try_from_file_with,
};
pub use iter::{
  CordPos,
  CordVisitor,
};
