use std::io;

use sensordash::view::{Canvas, Highlight};
use unicode_width::UnicodeWidthChar;

// Right half of a double-width character.
const CONTINUATION: char = '\0';

/// In-memory grid that records what the dashboard drew, one terminal cell
/// per slot.
pub struct MemoryCanvas {
    pub cols: u16,
    pub rows: u16,
    pub cells: Vec<Vec<char>>,
    pub reversed: Vec<(u16, u16, String)>,
    pub frames: usize,
}

impl MemoryCanvas {
    pub fn new(cols: u16, rows: u16) -> MemoryCanvas {
        MemoryCanvas {
            cols,
            rows,
            cells: vec![vec![' '; usize::from(cols)]; usize::from(rows)],
            reversed: Vec::new(),
            frames: 0,
        }
    }

    pub fn row(&self, row: usize) -> String {
        self.cells[row]
            .iter()
            .filter(|&&c| c != CONTINUATION)
            .collect::<String>()
            .trim_end()
            .to_string()
    }
}

impl Canvas for MemoryCanvas {
    fn size(&self) -> io::Result<(u16, u16)> {
        Ok((self.cols, self.rows))
    }

    fn clear(&mut self) -> io::Result<()> {
        for row in &mut self.cells {
            row.iter_mut().for_each(|c| *c = ' ');
        }
        self.reversed.clear();
        Ok(())
    }

    fn put(&mut self, row: u16, col: u16, text: &str, highlight: Highlight) -> io::Result<()> {
        let r = usize::from(row);
        assert!(r < self.cells.len(), "row {row} outside a {}-row grid", self.rows);
        let mut c = usize::from(col);
        for ch in text.chars() {
            let width = UnicodeWidthChar::width(ch).unwrap_or(0);
            if width == 0 {
                continue;
            }
            assert!(c + width <= self.cells[r].len(), "text overflows at row {row}: {text:?}");
            self.cells[r][c] = ch;
            for cell in &mut self.cells[r][c + 1..c + width] {
                *cell = CONTINUATION;
            }
            c += width;
        }
        if highlight == Highlight::Reverse {
            self.reversed.push((row, col, text.to_string()));
        }
        Ok(())
    }

    fn present(&mut self) -> io::Result<()> {
        self.frames += 1;
        Ok(())
    }
}
