use crate::cord::Cord;

/// Pending bytes are flushed into a flat leaf once this many accumulate.
const BUF_SZ: usize = 128;

/// Append-only cord builder.
///
/// Single bytes are collected in a small buffer and turned into flat leaves
/// in bulk, so pushing one byte at a time stays cheap.
#[derive(Debug, Default)]
pub struct CordBuilder {
  cord: Cord,
  buf:  Vec<u8>,
}

impl CordBuilder {
  pub fn new() -> Self {
    Self {
      cord: Cord::empty(),
      buf:  Vec::with_capacity(BUF_SZ),
    }
  }

  /// Total bytes appended so far, flushed or not.
  pub fn len(&self) -> usize {
    self.cord.len() + self.buf.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn push(&mut self, byte: u8) {
    if self.buf.len() == BUF_SZ {
      self.flush();
    }
    self.buf.push(byte);
  }

  pub fn extend_from_slice(&mut self, mut bytes: &[u8]) {
    while !bytes.is_empty() {
      if self.buf.len() == BUF_SZ {
        self.flush();
      }
      let take = bytes.len().min(BUF_SZ - self.buf.len());
      self.buf.extend_from_slice(&bytes[..take]);
      bytes = &bytes[take..];
    }
  }

  /// Append a whole cord, after everything pushed so far.
  pub fn push_cord(&mut self, cord: &Cord) {
    self.flush();
    self.cord = self.cord.concat(cord);
  }

  /// Move buffered bytes into the cord.
  pub fn flush(&mut self) {
    if self.buf.is_empty() {
      return;
    }
    let leaf = Cord::from(&self.buf[..]);
    self.buf.clear();
    self.cord = self.cord.concat(&leaf);
  }

  pub fn finish(mut self) -> Cord {
    self.flush();
    self.cord
  }
}

impl Extend<u8> for CordBuilder {
  fn extend<I: IntoIterator<Item = u8>>(&mut self, iter: I) {
    for byte in iter {
      self.push(byte);
    }
  }
}
