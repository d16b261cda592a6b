//! The cord value type.
//!
//! A [`Cord`] is an immutable byte sequence represented as a binary tree of
//! shared nodes:
//!
//! - **Flat** - a window into a shared byte buffer
//! - **Concat** - the concatenation of two non-empty cords
//! - **Function** - `len` bytes produced on demand by `Fn(usize) -> u8`
//!
//! Cloning a cord only bumps a reference count, and no operation ever
//! modifies a node after it has been built, so cords can be shared freely
//! between threads.
//!
//! The tree is kept shallow: concatenating two short flats copies them into
//! one flat, and a concatenation that would exceed [`MAX_DEPTH`] is
//! rebalanced on the spot.

use std::{
  fmt,
  sync::Arc,
};

/// Flats whose combined length is at most this are merged on concatenation.
pub(crate) const SHORT_LIMIT: usize = 64;

/// Deepest concatenation tree kept without rebalancing.
pub const MAX_DEPTH: usize = 48;

/// Generator backing a function node.
pub type GenFn = dyn Fn(usize) -> u8 + Send + Sync;

#[derive(Clone, Default)]
pub struct Cord {
  root: Option<Arc<Node>>,
}

pub(crate) enum Node {
  Flat(Flat),
  Concat(Concat),
  Function(Function),
}

pub(crate) struct Flat {
  data:  Arc<[u8]>,
  start: usize,
  len:   usize,
}

impl Flat {
  #[inline]
  pub(crate) fn bytes(&self) -> &[u8] {
    &self.data[self.start..self.start + self.len]
  }
}

pub(crate) struct Concat {
  pub(crate) left:  Cord,
  pub(crate) right: Cord,
  len:              usize,
  depth:            usize,
}

pub(crate) struct Function {
  f:   Arc<GenFn>,
  len: usize,
}

impl Function {
  #[inline]
  pub(crate) fn get(&self, i: usize) -> u8 {
    (self.f)(i)
  }

  #[inline]
  pub(crate) fn len(&self) -> usize {
    self.len
  }
}

impl Node {
  fn len(&self) -> usize {
    match self {
      Node::Flat(flat) => flat.len,
      Node::Concat(concat) => concat.len,
      Node::Function(func) => func.len,
    }
  }
}

impl Cord {
  /// The empty cord.
  pub const fn empty() -> Self {
    Self { root: None }
  }

  fn from_node(node: Node) -> Self {
    Self {
      root: Some(Arc::new(node)),
    }
  }

  fn from_shared(data: Arc<[u8]>) -> Self {
    if data.is_empty() {
      return Self::empty();
    }
    let len = data.len();
    Self::from_node(Node::Flat(Flat {
      data,
      start: 0,
      len,
    }))
  }

  /// A cord of `len` bytes whose byte `i` is `f(i)`.
  ///
  /// `f` is called lazily, possibly many times for the same index and from
  /// several threads, so it must be pure.
  pub fn from_fn<F>(len: usize, f: F) -> Self
  where
    F: Fn(usize) -> u8 + Send + Sync + 'static,
  {
    if len == 0 {
      return Self::empty();
    }
    Self::from_node(Node::Function(Function { f: Arc::new(f), len }))
  }

  /// `n` zero bytes, stored in constant space.
  pub fn nul(n: usize) -> Self {
    Self::from_fn(n, |_| 0)
  }

  #[inline]
  pub(crate) fn node(&self) -> Option<&Node> {
    self.root.as_deref()
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.root.as_ref().map_or(0, |node| node.len())
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.root.is_none()
  }

  /// Height of the concatenation tree; leaves have depth 0.
  pub fn depth(&self) -> usize {
    match self.node() {
      Some(Node::Concat(concat)) => concat.depth,
      _ => 0,
    }
  }

  /// The contents as one contiguous slice, if the cord is a single flat
  /// node (or empty).
  pub fn as_flat(&self) -> Option<&[u8]> {
    match self.node() {
      None => Some(&[]),
      Some(Node::Flat(flat)) => Some(flat.bytes()),
      Some(_) => None,
    }
  }

  pub fn concat(&self, other: &Cord) -> Cord {
    let (Some(left), Some(right)) = (self.node(), other.node()) else {
      return if self.is_empty() {
        other.clone()
      } else {
        self.clone()
      };
    };

    if let (Node::Flat(a), Node::Flat(b)) = (left, right)
      && a.len + b.len <= SHORT_LIMIT
    {
      return Self::from(join_bytes(a.bytes(), b.bytes()));
    }

    // Appending a short flat to a tree that ends in a short flat: rebuild
    // only the right edge.
    if let (Node::Concat(concat), Node::Flat(b)) = (left, right)
      && let Some(Node::Flat(a)) = concat.right.node()
      && a.len + b.len <= SHORT_LIMIT
    {
      let merged = Self::from(join_bytes(a.bytes(), b.bytes()));
      return concat.left.concat(&merged);
    }

    let depth = self.depth().max(other.depth()) + 1;
    let result = Self::from_node(Node::Concat(Concat {
      left: self.clone(),
      right: other.clone(),
      len: left.len() + right.len(),
      depth,
    }));

    if depth > MAX_DEPTH {
      result.balance()
    } else {
      result
    }
  }

  /// Concatenate every cord yielded by `cords`, left to right.
  pub fn concat_all<I>(cords: I) -> Cord
  where
    I: IntoIterator<Item = Cord>,
  {
    cords
      .into_iter()
      .fold(Cord::empty(), |acc, cord| acc.concat(&cord))
  }

  /// The `n` bytes starting at `start`, or fewer if the cord ends first.
  pub fn substr(&self, start: usize, n: usize) -> Cord {
    let len = self.len();
    if start >= len || n == 0 {
      return Cord::empty();
    }
    let n = n.min(len - start);
    if start == 0 && n == len {
      return self.clone();
    }

    match self.node() {
      None => Cord::empty(),
      Some(Node::Flat(flat)) => {
        Self::from_node(Node::Flat(Flat {
          data:  flat.data.clone(),
          start: flat.start + start,
          len:   n,
        }))
      },
      Some(_) if n <= SHORT_LIMIT => {
        let mut buf = vec![0; n];
        crate::fill::fill_buf(self, start, n, n, &mut buf);
        Self::from(buf)
      },
      Some(Node::Function(func)) => {
        let f = func.f.clone();
        Self::from_fn(n, move |i| f(start + i))
      },
      Some(Node::Concat(concat)) => {
        let left_len = concat.left.len();
        if start + n <= left_len {
          concat.left.substr(start, n)
        } else if start >= left_len {
          concat.right.substr(start - left_len, n)
        } else {
          let head = left_len - start;
          concat
            .left
            .substr(start, head)
            .concat(&concat.right.substr(0, n - head))
        }
      },
    }
  }

  /// Rebuild the concatenation tree with logarithmic depth.
  ///
  /// The contents are unchanged; leaves are shared with `self`.
  pub fn balance(&self) -> Cord {
    if self.depth() <= 1 {
      return self.clone();
    }
    let mut leaves = Vec::new();
    self.collect_leaves(&mut leaves);
    build_balanced(&leaves)
  }

  fn collect_leaves(&self, out: &mut Vec<Cord>) {
    match self.node() {
      None => {},
      Some(Node::Concat(concat)) => {
        concat.left.collect_leaves(out);
        concat.right.collect_leaves(out);
      },
      Some(_) => out.push(self.clone()),
    }
  }

  /// The leaf holding byte `i`, together with the index of the leaf's first
  /// byte in `self`.
  pub(crate) fn leaf_at(&self, mut i: usize) -> Option<(Cord, usize)> {
    if i >= self.len() {
      return None;
    }
    let mut cord = self;
    let mut base = 0;
    loop {
      match cord.node()? {
        Node::Concat(concat) => {
          let left_len = concat.left.len();
          if i < left_len {
            cord = &concat.left;
          } else {
            i -= left_len;
            base += left_len;
            cord = &concat.right;
          }
        },
        _ => return Some((cord.clone(), base)),
      }
    }
  }
}

fn join_bytes(a: &[u8], b: &[u8]) -> Vec<u8> {
  let mut bytes = Vec::with_capacity(a.len() + b.len());
  bytes.extend_from_slice(a);
  bytes.extend_from_slice(b);
  bytes
}

fn build_balanced(leaves: &[Cord]) -> Cord {
  match leaves {
    [] => Cord::empty(),
    [leaf] => leaf.clone(),
    _ => {
      let (left, right) = leaves.split_at(leaves.len() / 2);
      build_balanced(left).concat(&build_balanced(right))
    },
  }
}

impl From<&[u8]> for Cord {
  fn from(bytes: &[u8]) -> Self {
    Self::from_shared(Arc::from(bytes))
  }
}

impl<const N: usize> From<&[u8; N]> for Cord {
  fn from(bytes: &[u8; N]) -> Self {
    Self::from(&bytes[..])
  }
}

impl From<Vec<u8>> for Cord {
  fn from(bytes: Vec<u8>) -> Self {
    Self::from_shared(Arc::from(bytes))
  }
}

impl From<&str> for Cord {
  fn from(text: &str) -> Self {
    Self::from(text.as_bytes())
  }
}

impl From<String> for Cord {
  fn from(text: String) -> Self {
    Self::from(text.into_bytes())
  }
}

impl fmt::Debug for Cord {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let head: String = crate::flatten::to_vec(&self.substr(0, 32))
      .into_iter()
      .flat_map(std::ascii::escape_default)
      .map(char::from)
      .collect();
    f.debug_struct("Cord")
      .field("len", &self.len())
      .field("depth", &self.depth())
      .field("head", &head)
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::flatten::to_vec;

  #[test]
  fn empty_cord() {
    let empty = Cord::empty();
    assert!(empty.is_empty());
    assert_eq!(empty.len(), 0);
    assert_eq!(empty.as_flat(), Some(&[][..]));
    assert!(Cord::from("").is_empty());
    assert!(Cord::from_fn(0, |_| b'x').is_empty());
  }

  #[test]
  fn short_concat_stays_flat() {
    let ab = Cord::from("ab");
    let abab = ab.concat(&ab);
    assert_eq!(abab.as_flat(), Some(&b"abab"[..]));
    assert_eq!(abab.depth(), 0);
  }

  #[test]
  fn long_concat_builds_tree() {
    let mut x = Cord::from("ab");
    for _ in 1..16 {
      x = x.concat(&x);
    }
    x = x.concat(&Cord::from("c"));
    assert_eq!(x.len(), 64 * 1024 + 1);
    assert!(x.as_flat().is_none());
    assert!(x.depth() <= MAX_DEPTH);
    assert_eq!(crate::fill::fetch(&x, x.len() - 1), b'c');
    assert_eq!(crate::fill::fetch(&x, x.len() - 2), b'b');
  }

  #[test]
  fn depth_is_bounded() {
    let chunk = Cord::from(vec![b'q'; 100]);
    let mut x = Cord::empty();
    for _ in 0..500 {
      x = x.concat(&chunk);
    }
    assert_eq!(x.len(), 50_000);
    assert!(x.depth() <= MAX_DEPTH);
  }

  #[test]
  fn function_nodes() {
    let ids = Cord::from_fn(13, |i| i as u8);
    assert_eq!(ids.len(), 13);
    assert_eq!(to_vec(&ids), (0..13).collect::<Vec<u8>>());
    assert_eq!(to_vec(&Cord::nul(4)), vec![0, 0, 0, 0]);
  }

  #[test]
  fn substr_cases() {
    let mut x = Cord::from("ab");
    for _ in 1..16 {
      x = x.concat(&x);
    }
    x = x.concat(&Cord::from("c"));

    let y = x.substr(1023, 5);
    assert_eq!(y.as_flat(), Some(&b"babab"[..]));
    assert_eq!(to_vec(&x.substr(1024, 8)), b"abababab");
    assert_eq!(to_vec(&x.substr(2 * 32 * 1024 - 1, 8)), b"bc");
    assert!(x.substr(x.len(), 3).is_empty());

    let ids = Cord::from_fn(1000, |i| (i % 251) as u8);
    let tail = ids.substr(500, 400);
    assert_eq!(tail.len(), 400);
    assert_eq!(crate::fill::fetch(&tail, 0), (500 % 251) as u8);
  }

  #[test]
  fn substr_of_flat_shares_buffer() {
    let flat = Cord::from(vec![7u8; 1000]);
    let part = flat.substr(100, 500);
    assert_eq!(part.as_flat().map(<[u8]>::len), Some(500));
  }

  #[test]
  fn balance_preserves_contents() {
    let y = Cord::from("abcdefghijklmnopqrstuvwxyz0123456789");
    let mut x = Cord::from("{}");
    for _ in 1..100 {
      x = x.concat(&y);
    }
    let z = x.balance();
    assert_eq!(z.len(), x.len());
    assert!(z.depth() < x.depth());
    assert_eq!(to_vec(&z), to_vec(&x));
  }

  #[test]
  fn concat_all_joins_in_order() {
    let y = Cord::from("xyz");
    let joined = Cord::concat_all([y.clone(), y.clone(), y.clone()]);
    assert_eq!(to_vec(&joined), b"xyzxyzxyz");
  }

  #[test]
  fn debug_shows_escaped_head() {
    let x = Cord::from(b"a\0b");
    let debug = format!("{x:?}");
    assert!(debug.contains("len: 3"));
    assert!(debug.contains("a\\\\x00b"));
  }
}
