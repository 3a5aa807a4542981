use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Screen geometry for the two-pane dashboard.
///
/// Row 0 carries the headers, row 1 the separator, panes start at row 2.
/// The left pane takes `cols / 2` columns, the right pane the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub cols: u16,
    pub rows: u16,
}

pub const PANE_TOP: u16 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pane {
    pub col: u16,
    pub width: u16,
}

impl Pane {
    /// Characters available for text; the last column stays blank.
    pub fn text_width(&self) -> usize {
        usize::from(self.width).saturating_sub(1)
    }
}

impl Layout {
    pub fn new(cols: u16, rows: u16) -> Layout {
        Layout { cols, rows }
    }

    pub fn mid(&self) -> u16 {
        self.cols / 2
    }

    pub fn sent_pane(&self) -> Pane {
        Pane {
            col: 0,
            width: self.mid(),
        }
    }

    pub fn received_pane(&self) -> Pane {
        Pane {
            col: self.mid(),
            width: self.cols - self.mid(),
        }
    }

    pub fn pane_height(&self) -> usize {
        usize::from(self.rows.saturating_sub(PANE_TOP))
    }

    /// History length kept per pane.
    pub fn max_visible_lines(&self) -> usize {
        usize::from(self.rows.saturating_sub(3))
    }
}

/// Cuts `text` to at most `width` terminal cells. A wide character that
/// would straddle the limit is dropped whole.
pub fn truncate(text: &str, width: usize) -> &str {
    let mut used = 0;
    for (idx, ch) in text.char_indices() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > width {
            return &text[..idx];
        }
        used += w;
    }
    text
}

/// Centers `text` in `width` cells, cutting it if it does not fit.
pub fn center(text: &str, width: usize) -> String {
    let text = truncate(text, width);
    let pad = width - text.width();
    let left = pad / 2;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(pad - left))
}

/// Left-justifies `text` in `width` cells, cutting it if it does not fit.
pub fn ljust(text: &str, width: usize) -> String {
    let text = truncate(text, width);
    let pad = width - text.width();
    format!("{}{}", text, " ".repeat(pad))
}
