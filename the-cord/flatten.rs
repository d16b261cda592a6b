//! Materializing and streaming cords.

use std::{
  borrow::Cow,
  io::{
    self,
    Write,
  },
  ops::ControlFlow,
};

use crate::{
  cord::Cord,
  fatal::{
    alloc_bytes,
    fatal,
  },
  fill::fill_buf,
  iter::{
    CordVisitor,
    iter_from,
  },
};

static EMPTY_C_BYTES: [u8; 1] = [0];

/// The contents of `cord` followed by a single 0 terminator.
///
/// Exactly `len + 1` bytes are allocated; the empty cord maps to a shared
/// static terminator.
pub fn to_c_bytes(cord: &Cord) -> Cow<'static, [u8]> {
  if cord.is_empty() {
    return Cow::Borrowed(&EMPTY_C_BYTES);
  }
  let len = cord.len();
  let mut bytes = alloc_bytes(len + 1);
  bytes.resize(len + 1, 0);
  if fill_buf(cord, 0, len, len, &mut bytes[..len]) != len {
    fatal("to_c_bytes: cord shorter than its length");
  }
  Cow::Owned(bytes)
}

/// The contents of `cord` as an owned vector of exactly `len` bytes.
pub fn to_vec(cord: &Cord) -> Vec<u8> {
  let len = cord.len();
  let mut bytes = alloc_bytes(len);
  bytes.resize(len, 0);
  fill_buf(cord, 0, len, len, &mut bytes);
  bytes
}

/// Generator bytes are gathered into chunks of this size before writing.
const PUT_CHUNK: usize = 512;

struct PutData<'a, W: ?Sized> {
  sink:    &'a mut W,
  pending: Vec<u8>,
  error:   Option<io::Error>,
}

impl<W: Write + ?Sized> PutData<'_, W> {
  fn write(&mut self, bytes: &[u8]) -> ControlFlow<()> {
    let result = self.sink.write_all(bytes);
    self.check(result)
  }

  fn flush_pending(&mut self) -> ControlFlow<()> {
    if self.pending.is_empty() {
      return ControlFlow::Continue(());
    }
    let result = self.sink.write_all(&self.pending);
    self.pending.clear();
    self.check(result)
  }

  fn check(&mut self, result: io::Result<()>) -> ControlFlow<()> {
    match result {
      Ok(()) => ControlFlow::Continue(()),
      Err(err) => {
        self.error = Some(err);
        ControlFlow::Break(())
      },
    }
  }
}

impl<W: Write + ?Sized> CordVisitor for PutData<'_, W> {
  fn visit_byte(&mut self, byte: u8) -> ControlFlow<()> {
    self.pending.push(byte);
    if self.pending.len() == PUT_CHUNK {
      return self.flush_pending();
    }
    ControlFlow::Continue(())
  }

  fn visit_run(&mut self, run: &[u8]) -> ControlFlow<()> {
    self.flush_pending()?;
    self.write(run)
  }
}

/// Write the contents of `cord` to `sink`.
///
/// A failing sink is not fatal: the first write error stops the stream and
/// is returned as is.
pub fn put<W: Write + ?Sized>(cord: &Cord, sink: &mut W) -> io::Result<()> {
  let mut data = PutData {
    sink,
    pending: Vec::new(),
    error: None,
  };
  if iter_from(cord, 0, &mut data).is_continue() {
    let _ = data.flush_pending();
  }
  match data.error {
    Some(err) => Err(err),
    None => Ok(()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn c_bytes_are_terminated() {
    let x = Cord::from(vec![b'h'; 70]).concat(&Cord::from_fn(3, |_| b'!'));
    let bytes = to_c_bytes(&x);
    assert_eq!(bytes.len(), 74);
    assert_eq!(&bytes[70..], b"!!!\0");
  }

  #[test]
  fn empty_c_bytes_do_not_allocate() {
    let bytes = to_c_bytes(&Cord::empty());
    assert!(matches!(bytes, Cow::Borrowed(_)));
    assert_eq!(&*bytes, b"\0");
  }

  #[test]
  fn flatten_matches_fetch() {
    let x = Cord::from(vec![b'a'; 100])
      .concat(&Cord::nul(30))
      .concat(&Cord::from_fn(100, |i| i as u8));
    let flat = to_vec(&x);
    assert_eq!(flat.len(), x.len());
    for (i, &byte) in flat.iter().enumerate() {
      assert_eq!(byte, crate::fill::fetch(&x, i));
    }
  }

  #[test]
  fn put_streams_everything() {
    let x = Cord::from(vec![b'a'; 100])
      .concat(&Cord::from_fn(1500, |i| b'a' + (i % 26) as u8))
      .concat(&Cord::from("end"));
    let mut out = Vec::new();
    put(&x, &mut out).unwrap();
    assert_eq!(out, to_vec(&x));
  }

  struct FullSink {
    room: usize,
  }

  impl Write for FullSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
      if self.room == 0 {
        return Err(io::Error::new(io::ErrorKind::StorageFull, "sink is full"));
      }
      let n = buf.len().min(self.room);
      self.room -= n;
      Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
      Ok(())
    }
  }

  #[test]
  fn put_reports_sink_failure() {
    let x = Cord::from(vec![b'z'; 100]).concat(&Cord::nul(1000));
    let err = put(&x, &mut FullSink { room: 150 }).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::StorageFull);

    let mut roomy = FullSink { room: 1100 };
    assert!(put(&x, &mut roomy).is_ok());
    assert_eq!(roomy.room, 0);
  }
}
