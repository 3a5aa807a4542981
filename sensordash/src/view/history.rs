use std::collections::VecDeque;

/// Display lines for one pane, oldest first, never longer than `capacity`.
#[derive(Debug, Clone, Default)]
pub struct LineHistory {
    lines: VecDeque<String>,
    capacity: usize,
}

impl LineHistory {
    pub fn new(capacity: usize) -> LineHistory {
        LineHistory {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, line: String) {
        self.lines.push_back(line);
        self.trim();
    }

    /// Shrinking drops the oldest lines.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.trim();
    }

    fn trim(&mut self) {
        while self.lines.len() > self.capacity {
            self.lines.pop_front();
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator {
        self.lines.iter().map(String::as_str)
    }

    /// The newest `n` lines, oldest first.
    pub fn tail(&self, n: usize) -> impl Iterator<Item = &str> {
        self.iter().skip(self.lines.len().saturating_sub(n))
    }
}
