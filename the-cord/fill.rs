//! Copying windows of a cord into caller buffers.

use std::ops::ControlFlow;

use crate::{
  cord::Cord,
  fatal::fatal,
  iter::{
    CordVisitor,
    iter_from,
  },
};

struct FillData<'a> {
  min:   usize,
  max:   usize,
  count: usize,
  buf:   &'a mut [u8],
}

impl FillData<'_> {
  fn done(&self) -> ControlFlow<()> {
    if self.count >= self.min {
      ControlFlow::Break(())
    } else {
      ControlFlow::Continue(())
    }
  }
}

impl CordVisitor for FillData<'_> {
  fn visit_byte(&mut self, byte: u8) -> ControlFlow<()> {
    self.buf[self.count] = byte;
    self.count += 1;
    self.done()
  }

  fn visit_run(&mut self, run: &[u8]) -> ControlFlow<()> {
    let take = run.len().min(self.max - self.count);
    self.buf[self.count..self.count + take].copy_from_slice(&run[..take]);
    self.count += take;
    self.done()
  }
}

/// Copy between `min` and `max` bytes of `cord`, starting at `start`, into
/// `buf`. Returns the number of bytes copied.
///
/// At least `min` bytes must exist from `start`, and `buf` must hold `max`
/// bytes; anything else is a fatal error.
pub fn fill_buf(cord: &Cord, start: usize, min: usize, max: usize, buf: &mut [u8]) -> usize {
  if min > max || max > buf.len() {
    fatal(format_args!(
      "fill_buf: invalid window min={min} max={max} for a buffer of {}",
      buf.len()
    ));
  }
  if start.checked_add(min).is_none_or(|end| end > cord.len()) {
    fatal(format_args!(
      "fill_buf: {min} bytes requested at {start} from a cord of length {}",
      cord.len()
    ));
  }
  if max == 0 || start >= cord.len() {
    return 0;
  }

  let mut data = FillData {
    min: min.max(1),
    max,
    count: 0,
    buf,
  };
  let _ = iter_from(cord, start, &mut data);
  data.count
}

/// The byte at index `i`. An index without a byte is a fatal error.
pub fn fetch(cord: &Cord, i: usize) -> u8 {
  let mut byte = None;
  let flow = iter_from(cord, i, &mut |b: u8| {
    byte = Some(b);
    ControlFlow::Break(())
  });
  match (flow, byte) {
    (ControlFlow::Break(()), Some(byte)) => byte,
    _ => {
      fatal(format_args!(
        "fetch: bad index {i} for a cord of length {}",
        cord.len()
      ))
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn mixed() -> Cord {
    Cord::from(vec![b'a'; 90])
      .concat(&Cord::from_fn(40, |i| b'0' + (i % 10) as u8))
      .concat(&Cord::from("tail-of-the-cord-with-some-length-to-it--------------------"))
  }

  #[test]
  fn exact_window_across_leaves() {
    let x = mixed();
    let mut buf = [0u8; 20];
    assert_eq!(fill_buf(&x, 85, 20, 20, &mut buf), 20);
    assert_eq!(&buf, b"aaaaa012345678901234");
  }

  #[test]
  fn runs_fill_up_to_max() {
    let x = Cord::from(vec![b'r'; 100]);
    let mut buf = [0u8; 30];
    // A single run may satisfy more than `min`.
    assert_eq!(fill_buf(&x, 0, 5, 30, &mut buf), 30);
    assert_eq!(buf, [b'r'; 30]);
  }

  #[test]
  fn generator_bytes_stop_at_min() {
    let x = Cord::from_fn(100, |_| b'g');
    let mut buf = [0u8; 30];
    assert_eq!(fill_buf(&x, 10, 5, 30, &mut buf), 5);
  }

  #[test]
  fn fetch_every_byte() {
    let x = mixed();
    let flat = crate::flatten::to_vec(&x);
    for (i, &byte) in flat.iter().enumerate() {
      assert_eq!(fetch(&x, i), byte);
    }
  }

  #[test]
  #[should_panic(expected = "bad index")]
  fn fetch_out_of_range_is_fatal() {
    fetch(&Cord::from("abc"), 3);
  }

  #[test]
  #[should_panic(expected = "requested")]
  fn underfilled_window_is_fatal() {
    let mut buf = [0u8; 10];
    fill_buf(&Cord::from("abc"), 1, 5, 10, &mut buf);
  }

  quickcheck::quickcheck! {
    fn fill_matches_fetches(data: Vec<u8>, split: usize, start: usize, n: usize) -> bool {
      if data.is_empty() {
        return true;
      }
      let split = split % data.len();
      let x = Cord::from(&data[..split]).concat(&{
        let tail = data[split..].to_vec();
        Cord::from_fn(tail.len(), move |i| tail[i])
      });
      let start = start % data.len();
      let n = n % (data.len() - start + 1);
      let mut buf = vec![0u8; n];
      let count = fill_buf(&x, start, n, n, &mut buf);
      count == n && (0..n).all(|k| buf[k] == fetch(&x, start + k))
    }
  }
}
