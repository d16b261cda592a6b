//! Lexicographic ordering of cords.
//!
//! Most comparisons are decided within the first few bytes, so [`compare`]
//! first samples a short prefix of each side and only falls back to
//! streaming both cords block by block when the prefixes agree.

use std::cmp::Ordering;

use crate::{
  cord::Cord,
  fill::fill_buf,
  iter::CordPos,
};

/// Longest prefix sampled before streaming.
const SAMPLE_LEN: usize = 30;
/// Fewest bytes a prefix sample is allowed to stop at.
const MIN_SAMPLE_LEN: usize = 5;
/// Block size for the streaming comparison.
const BLOCK_LEN: usize = 2048;

/// Compare two cords byte-wise. The empty cord sorts before any other.
pub fn compare(x: &Cord, y: &Cord) -> Ordering {
  match (x.is_empty(), y.is_empty()) {
    (true, true) => return Ordering::Equal,
    (true, false) => return Ordering::Less,
    (false, true) => return Ordering::Greater,
    (false, false) => {},
  }
  if let (Some(a), Some(b)) = (x.as_flat(), y.as_flat()) {
    return a.cmp(b);
  }

  let xlen = x.len();
  let ylen = y.len();
  let mut xbuf = [0u8; SAMPLE_LEN];
  let mut ybuf = [0u8; SAMPLE_LEN];

  let shorter = xlen.min(ylen);
  if shorter <= SAMPLE_LEN {
    // The sample covers the shorter cord entirely.
    fill_buf(x, 0, shorter, shorter, &mut xbuf);
    fill_buf(y, 0, shorter, shorter, &mut ybuf);
    return xbuf[..shorter]
      .cmp(&ybuf[..shorter])
      .then(xlen.cmp(&ylen));
  }

  let xn = fill_buf(x, 0, MIN_SAMPLE_LEN, SAMPLE_LEN, &mut xbuf);
  let yn = fill_buf(y, 0, MIN_SAMPLE_LEN, SAMPLE_LEN, &mut ybuf);
  let n = xn.min(yn);
  match xbuf[..n].cmp(&ybuf[..n]) {
    Ordering::Equal => compare_blocks(x, xlen, y, ylen),
    order => order,
  }
}

/// Stream both cords in lock-step blocks until they differ or one ends.
fn compare_blocks(x: &Cord, mut xlen: usize, y: &Cord, mut ylen: usize) -> Ordering {
  let mut xbuf = [0u8; BLOCK_LEN];
  let mut ybuf = [0u8; BLOCK_LEN];
  let mut pos = 0;

  loop {
    let n = BLOCK_LEN.min(xlen).min(ylen);
    fill_buf(x, pos, n, n, &mut xbuf);
    fill_buf(y, pos, n, n, &mut ybuf);
    match xbuf[..n].cmp(&ybuf[..n]) {
      Ordering::Equal => {},
      order => return order,
    }
    pos += n;
    xlen -= n;
    ylen -= n;
    if xlen == 0 || ylen == 0 {
      return xlen.cmp(&ylen);
    }
  }
}

/// Compare two possibly absent cords. An absent cord sorts before every
/// cord, including the empty one.
pub fn compare_nullable(x: Option<&Cord>, y: Option<&Cord>) -> Ordering {
  match (x, y) {
    (None, None) => Ordering::Equal,
    (None, Some(_)) => Ordering::Less,
    (Some(_), None) => Ordering::Greater,
    (Some(x), Some(y)) => compare(x, y),
  }
}

/// Compare at most `len` bytes of `x` starting at `x_start` with at most
/// `len` bytes of `y` starting at `y_start`.
///
/// A side that runs out of bytes before `len` sorts first, as a prefix of the
/// other.
pub fn compare_range(x: &Cord, x_start: usize, y: &Cord, y_start: usize, len: usize) -> Ordering {
  let mut xpos = CordPos::new(x.clone(), x_start);
  let mut ypos = CordPos::new(y.clone(), y_start);

  for _ in 0..len {
    match (xpos.is_valid(), ypos.is_valid()) {
      (false, false) => return Ordering::Equal,
      (false, true) => return Ordering::Less,
      (true, false) => return Ordering::Greater,
      (true, true) => {},
    }
    match xpos.fetch().cmp(&ypos.fetch()) {
      Ordering::Equal => {},
      order => return order,
    }
    xpos.advance();
    ypos.advance();
  }
  Ordering::Equal
}

impl PartialEq for Cord {
  fn eq(&self, other: &Self) -> bool {
    self.len() == other.len() && compare(self, other) == Ordering::Equal
  }
}

impl Eq for Cord {}

impl PartialOrd for Cord {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for Cord {
  fn cmp(&self, other: &Self) -> Ordering {
    compare(self, other)
  }
}
