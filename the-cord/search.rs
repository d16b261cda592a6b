//! Byte and substring search within a cord.
//!
//! All searches report "not found" as `None`; a found position is always an
//! index into the cord.
//!
//! ```
//! use the_cord::{Cord, search::{chr, rchr}};
//!
//! let x = Cord::from("{}abc");
//! assert_eq!(chr(&x, 0, b'b'), Some(3));
//! assert_eq!(rchr(&x, 4, b'}'), Some(1));
//! ```

use std::ops::ControlFlow;

use crate::{
  cord::Cord,
  fill::fill_buf,
  iter::{
    CordVisitor,
    iter_from,
    riter_from,
  },
};

struct ChrData {
  pos:    usize,
  target: u8,
}

impl CordVisitor for ChrData {
  fn visit_byte(&mut self, byte: u8) -> ControlFlow<()> {
    if byte == self.target {
      return ControlFlow::Break(());
    }
    self.pos += 1;
    ControlFlow::Continue(())
  }

  fn visit_run(&mut self, run: &[u8]) -> ControlFlow<()> {
    match run.iter().position(|&byte| byte == self.target) {
      Some(offset) => {
        self.pos += offset;
        ControlFlow::Break(())
      },
      None => {
        self.pos += run.len();
        ControlFlow::Continue(())
      },
    }
  }
}

/// Index of the first `target` at or after `start`.
pub fn chr(cord: &Cord, start: usize, target: u8) -> Option<usize> {
  if start >= cord.len() {
    return None;
  }
  let mut data = ChrData { pos: start, target };
  iter_from(cord, start, &mut data)
    .is_break()
    .then_some(data.pos)
}

/// Index of the last `target` at or before `start`. A `start` past the end
/// searches the whole cord.
pub fn rchr(cord: &Cord, start: usize, target: u8) -> Option<usize> {
  let len = cord.len();
  if len == 0 {
    return None;
  }
  let mut pos = start.min(len - 1);
  riter_from(cord, pos, |byte| {
    if byte == target {
      return ControlFlow::Break(());
    }
    pos = pos.wrapping_sub(1);
    ControlFlow::Continue(())
  })
  .is_break()
  .then_some(pos)
}

/// Index of the first occurrence of `needle` at or after `start`.
///
/// An empty needle matches at `start` as long as `start` is within the cord
/// or at its end.
pub fn find(cord: &Cord, start: usize, needle: &[u8]) -> Option<usize> {
  let len = cord.len();
  let Some(&first) = needle.first() else {
    return (start <= len).then_some(start);
  };

  let mut from = start;
  while from < len && needle.len() <= len - from {
    let candidate = chr(cord, from, first)?;
    if needle.len() > len - candidate {
      return None;
    }
    if matches_at(cord, candidate, needle) {
      return Some(candidate);
    }
    from = candidate + 1;
  }
  None
}

fn matches_at(cord: &Cord, at: usize, needle: &[u8]) -> bool {
  let mut buf = [0u8; 64];
  needle
    .chunks(buf.len())
    .enumerate()
    .all(|(i, chunk)| {
      let n = chunk.len();
      fill_buf(cord, at + i * 64, n, n, &mut buf[..n]);
      &buf[..n] == chunk
    })
}
