use chrono::{DateTime, Local};

/// Which way a message travelled relative to this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Outbound,
    Inbound,
}

impl Direction {
    pub fn arrow(self) -> &'static str {
        match self {
            Direction::Outbound => "->",
            Direction::Inbound => "<-",
        }
    }
}

/// A single published or received message, stamped when it was created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub topic: String,
    pub payload: String,
    pub observed_at: DateTime<Local>,
}

impl Event {
    pub fn new(topic: impl Into<String>, payload: impl Into<String>) -> Event {
        Event::at(topic, payload, Local::now())
    }

    pub fn at(
        topic: impl Into<String>,
        payload: impl Into<String>,
        observed_at: DateTime<Local>,
    ) -> Event {
        Event {
            topic: topic.into(),
            payload: payload.into(),
            observed_at,
        }
    }

    /// Display line, e.g. `12:00:01 -> users/1/devices/2/temp: 23.45`.
    /// Control characters in topic or payload show up as `?`.
    pub fn display_line(&self, direction: Direction) -> String {
        format!(
            "{} {} {}: {}",
            self.observed_at.format("%H:%M:%S"),
            direction.arrow(),
            printable(&self.topic),
            printable(&self.payload)
        )
    }
}

fn printable(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { '?' } else { c })
        .collect()
}
