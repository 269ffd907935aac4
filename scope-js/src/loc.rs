use serde::Deserialize;
use serde::Serialize;
use std::cmp::max;
use std::cmp::min;

/// A half-open range of UTF-8 byte offsets into a module's source text.
///
/// Nodes built without source text (e.g. synthesized in tests) usually carry `Loc(0, 0)`.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Loc(pub usize, pub usize);

impl Loc {
  pub fn len(&self) -> usize {
    self.1.saturating_sub(self.0)
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Smallest range covering both.
  pub fn extend(self, other: Loc) -> Loc {
    Loc(min(self.0, other.0), max(self.1, other.1))
  }
}

/// A point in source text. `line` is 1-based, `column` is a 0-based byte column.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Position {
  pub line: usize,
  pub column: usize,
  pub index: usize,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct SourceRange {
  pub start: Position,
  pub end: Position,
}

/// Converts byte offsets into line/column positions.
#[derive(Clone, Debug)]
pub struct LineIndex {
  // Byte offset of the first character of every line; always starts with 0.
  line_starts: Vec<usize>,
}

impl Default for LineIndex {
  fn default() -> Self {
    LineIndex::new("")
  }
}

impl LineIndex {
  pub fn new(source: &str) -> LineIndex {
    let mut line_starts = vec![0];
    let bytes = source.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
      match bytes[i] {
        b'\n' => line_starts.push(i + 1),
        b'\r' => {
          if bytes.get(i + 1) == Some(&b'\n') {
            i += 1;
          };
          line_starts.push(i + 1);
        }
        _ => {}
      };
      i += 1;
    }
    LineIndex { line_starts }
  }

  pub fn line_count(&self) -> usize {
    self.line_starts.len()
  }

  pub fn position(&self, offset: usize) -> Position {
    let line = match self.line_starts.binary_search(&offset) {
      Ok(exact) => exact,
      Err(next) => next - 1,
    };
    Position {
      line: line + 1,
      column: offset - self.line_starts[line],
      index: offset,
    }
  }

  pub fn range(&self, loc: Loc) -> SourceRange {
    SourceRange {
      start: self.position(loc.0),
      end: self.position(loc.1),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::LineIndex;
  use super::Loc;

  #[test]
  fn test_positions_across_line_endings() {
    let index = LineIndex::new("ab\ncd\r\nef\rg");
    assert_eq!(index.line_count(), 4);
    let p = index.position(0);
    assert_eq!((p.line, p.column), (1, 0));
    let p = index.position(4);
    assert_eq!((p.line, p.column), (2, 1));
    let p = index.position(7);
    assert_eq!((p.line, p.column), (3, 0));
    let p = index.position(10);
    assert_eq!((p.line, p.column), (4, 0));
  }

  #[test]
  fn test_empty_source_is_one_line() {
    let index = LineIndex::default();
    let range = index.range(Loc(0, 0));
    assert_eq!(range.start.line, 1);
    assert_eq!(range.end.column, 0);
  }

  #[test]
  fn test_extend() {
    assert_eq!(Loc(4, 6).extend(Loc(1, 5)), Loc(1, 6));
    assert!(Loc(3, 3).is_empty());
  }
}
