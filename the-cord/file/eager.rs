use std::io::{
  BufRead,
  BufReader,
  ErrorKind,
  Read,
};

use crate::{
  builder::CordBuilder,
  cord::Cord,
  error::{
    FileCordError,
    Result,
  },
};

/// Read all of `reader` into a balanced cord.
///
/// Each run of NUL bytes becomes a single generator leaf, so a file that is
/// mostly zeros costs memory only for its other bytes. `reader` is dropped
/// once the end is reached.
pub fn from_reader_eager<R: Read>(reader: R) -> Result<Cord> {
  let mut reader = BufReader::new(reader);
  let mut builder = CordBuilder::new();
  let mut nul_run = 0;
  let mut nul_runs = 0;

  loop {
    let buf = match reader.fill_buf() {
      Ok(buf) => buf,
      Err(err) if err.kind() == ErrorKind::Interrupted => continue,
      Err(err) => return Err(FileCordError::Read(err)),
    };
    if buf.is_empty() {
      break;
    }
    let consumed = buf.len();

    let mut rest = buf;
    while let Some(&first) = rest.first() {
      if first == 0 {
        let zeros = rest.iter().take_while(|&&byte| byte == 0).count();
        nul_run += zeros;
        rest = &rest[zeros..];
        continue;
      }
      if nul_run > 0 {
        builder.push_cord(&Cord::nul(nul_run));
        nul_run = 0;
        nul_runs += 1;
      }
      let text = rest.iter().position(|&byte| byte == 0).unwrap_or(rest.len());
      builder.extend_from_slice(&rest[..text]);
      rest = &rest[text..];
    }

    reader.consume(consumed);
  }

  if nul_run > 0 {
    builder.push_cord(&Cord::nul(nul_run));
    nul_runs += 1;
  }
  drop(reader);

  let cord = builder.finish().balance();
  tracing::debug!(len = cord.len(), nul_runs, "loaded file eagerly");
  Ok(cord)
}

#[cfg(test)]
mod tests {
  use std::io::{
    self,
    Cursor,
  };

  use super::*;
  use crate::{
    cord::Node,
    flatten::to_vec,
  };

  fn count_function_leaves(cord: &Cord) -> usize {
    match cord.node() {
      None | Some(Node::Flat(_)) => 0,
      Some(Node::Function(_)) => 1,
      Some(Node::Concat(concat)) => {
        count_function_leaves(&concat.left) + count_function_leaves(&concat.right)
      },
    }
  }

  #[test]
  fn plain_bytes() {
    let data = b"hello, cord".repeat(100);
    let cord = from_reader_eager(Cursor::new(data.clone())).unwrap();
    assert_eq!(to_vec(&cord), data);
  }

  #[test]
  fn nul_runs_are_compressed() {
    let mut data = b"head".to_vec();
    data.extend(std::iter::repeat_n(0u8, 1_000_000));
    data.extend_from_slice(b"middle");
    data.push(0);
    data.extend_from_slice(b"tail");
    data.extend(std::iter::repeat_n(0u8, 3));

    let cord = from_reader_eager(Cursor::new(data.clone())).unwrap();
    assert_eq!(cord.len(), data.len());
    assert_eq!(to_vec(&cord), data);
    assert_eq!(count_function_leaves(&cord), 3);
  }

  #[test]
  fn only_nuls() {
    let cord = from_reader_eager(Cursor::new(vec![0u8; 70_000])).unwrap();
    assert_eq!(cord.len(), 70_000);
    assert_eq!(count_function_leaves(&cord), 1);
    assert_eq!(cord, Cord::nul(70_000));
  }

  #[test]
  fn empty_input() {
    assert!(from_reader_eager(io::empty()).unwrap().is_empty());
  }

  struct Broken;

  impl Read for Broken {
    fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
      Err(io::Error::other("device gone"))
    }
  }

  #[test]
  fn read_errors_are_reported() {
    assert!(matches!(from_reader_eager(Broken), Err(FileCordError::Read(_))));
  }
}
