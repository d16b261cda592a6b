//! Traversal of cords.
//!
//! Forward traversal offers every byte to a [`CordVisitor`]. Flat leaves are
//! handed over as whole runs through [`CordVisitor::visit_run`], which lets
//! visitors that can work on slices (copying, searching, writing) skip the
//! per-byte path; generator leaves have no contiguous form and always go byte
//! by byte. Returning [`ControlFlow::Break`] from either method stops the
//! traversal, and the break is reported to the caller.
//!
//! For resumable scans there is [`CordPos`], a cursor that caches the leaf it
//! currently points into.

use std::ops::ControlFlow;

use crate::{
  cord::{
    Cord,
    Node,
  },
  fatal::fatal,
};

pub trait CordVisitor {
  fn visit_byte(&mut self, byte: u8) -> ControlFlow<()>;

  /// Visit a contiguous run of bytes. The default falls back to
  /// [`visit_byte`](Self::visit_byte).
  fn visit_run(&mut self, run: &[u8]) -> ControlFlow<()> {
    for &byte in run {
      self.visit_byte(byte)?;
    }
    ControlFlow::Continue(())
  }
}

impl<F: FnMut(u8) -> ControlFlow<()>> CordVisitor for F {
  fn visit_byte(&mut self, byte: u8) -> ControlFlow<()> {
    (*self)(byte)
  }
}

/// Visit the bytes of `cord` from index `start` to the end.
pub fn iter_from<V>(cord: &Cord, start: usize, visitor: &mut V) -> ControlFlow<()>
where
  V: CordVisitor + ?Sized,
{
  match cord.node() {
    None => ControlFlow::Continue(()),
    Some(Node::Flat(flat)) => {
      match flat.bytes().get(start..) {
        Some(run) if !run.is_empty() => visitor.visit_run(run),
        _ => ControlFlow::Continue(()),
      }
    },
    Some(Node::Function(func)) => {
      for i in start..func.len() {
        visitor.visit_byte(func.get(i))?;
      }
      ControlFlow::Continue(())
    },
    Some(Node::Concat(concat)) => {
      let left_len = concat.left.len();
      if start < left_len {
        iter_from(&concat.left, start, visitor)?;
        iter_from(&concat.right, 0, visitor)
      } else {
        iter_from(&concat.right, start - left_len, visitor)
      }
    },
  }
}

/// Visit the bytes of `cord` from index `start` down to index 0.
///
/// A `start` past the end begins at the last byte.
pub fn riter_from<F>(cord: &Cord, start: usize, mut f: F) -> ControlFlow<()>
where
  F: FnMut(u8) -> ControlFlow<()>,
{
  let len = cord.len();
  if len == 0 {
    return ControlFlow::Continue(());
  }
  riter_node(cord, start.min(len - 1), &mut f)
}

fn riter_node<F>(cord: &Cord, i: usize, f: &mut F) -> ControlFlow<()>
where
  F: FnMut(u8) -> ControlFlow<()>,
{
  match cord.node() {
    None => ControlFlow::Continue(()),
    Some(Node::Flat(flat)) => {
      for &byte in flat.bytes()[..=i].iter().rev() {
        f(byte)?;
      }
      ControlFlow::Continue(())
    },
    Some(Node::Function(func)) => {
      for j in (0..=i).rev() {
        f(func.get(j))?;
      }
      ControlFlow::Continue(())
    },
    Some(Node::Concat(concat)) => {
      let left_len = concat.left.len();
      if i >= left_len {
        riter_node(&concat.right, i - left_len, f)?;
        riter_node(&concat.left, left_len - 1, f)
      } else {
        riter_node(&concat.left, i, f)
      }
    },
  }
}

/// A position inside a cord.
///
/// Moving past either end makes the position invalid; moving back in makes
/// it valid again.
#[derive(Clone)]
pub struct CordPos {
  cord:  Cord,
  index: usize,
  /// Leaf containing `index` and the index of its first byte.
  leaf:  Option<(Cord, usize)>,
}

impl CordPos {
  pub fn new(cord: Cord, index: usize) -> Self {
    let leaf = cord.leaf_at(index);
    Self { cord, index, leaf }
  }

  pub fn cord(&self) -> &Cord {
    &self.cord
  }

  pub fn index(&self) -> usize {
    self.index
  }

  #[inline]
  pub fn is_valid(&self) -> bool {
    self.index < self.cord.len()
  }

  /// The byte at the current position.
  pub fn fetch(&self) -> u8 {
    let Some((leaf, base)) = &self.leaf else {
      fatal(format_args!(
        "cord position {} is outside a cord of length {}",
        self.index,
        self.cord.len()
      ));
    };
    let offset = self.index - base;
    match leaf.node() {
      Some(Node::Flat(flat)) => flat.bytes()[offset],
      Some(Node::Function(func)) => func.get(offset),
      _ => unreachable!("leaf_at only returns leaves"),
    }
  }

  pub fn advance(&mut self) {
    self.seek(self.index.wrapping_add(1));
  }

  pub fn retreat(&mut self) {
    self.seek(self.index.wrapping_sub(1));
  }

  fn seek(&mut self, index: usize) {
    self.index = index;
    if let Some((leaf, base)) = &self.leaf
      && index >= *base
      && index - base < leaf.len()
    {
      return;
    }
    self.leaf = self.cord.leaf_at(index);
  }
}

/// Iterator over the bytes of a cord, see [`Cord::bytes`].
#[derive(Clone)]
pub struct Bytes {
  pos: CordPos,
}

impl Iterator for Bytes {
  type Item = u8;

  fn next(&mut self) -> Option<u8> {
    if !self.pos.is_valid() {
      return None;
    }
    let byte = self.pos.fetch();
    self.pos.advance();
    Some(byte)
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    let remaining = self.pos.cord.len().saturating_sub(self.pos.index);
    (remaining, Some(remaining))
  }
}

impl ExactSizeIterator for Bytes {}

impl Cord {
  pub fn bytes(&self) -> Bytes {
    self.bytes_from(0)
  }

  pub fn bytes_from(&self, start: usize) -> Bytes {
    Bytes {
      pos: CordPos::new(self.clone(), start),
    }
  }
}
