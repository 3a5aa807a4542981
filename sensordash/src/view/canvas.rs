use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    Plain,
    Reverse,
}

/// A character grid the dashboard draws on. Rows and columns are zero
/// based; text is expected to fit, callers truncate.
pub trait Canvas {
    /// Current size as `(cols, rows)`.
    fn size(&self) -> io::Result<(u16, u16)>;
    fn clear(&mut self) -> io::Result<()>;
    fn put(&mut self, row: u16, col: u16, text: &str, highlight: Highlight) -> io::Result<()>;
    /// Makes everything drawn since the last `clear` visible.
    fn present(&mut self) -> io::Result<()>;
}
