use super::canvas::{Canvas, Highlight};
use super::history::LineHistory;
use super::layout::{self, Layout, Pane, PANE_TOP};
use crate::relay::{Direction, Event, EventReceiver};
use crate::status::StatusIndicator;

use std::io;

/// What a single drain pass took from the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Drained {
    pub sent: bool,
    pub received: bool,
}

impl Drained {
    pub fn any(&self) -> bool {
        self.sent || self.received
    }
}

/// Presentation state of the render loop: both histories, the status
/// indicator and the relay receivers feeding them.
pub struct Dashboard {
    outbound: EventReceiver,
    inbound: EventReceiver,
    sent: LineHistory,
    received: LineHistory,
    status: StatusIndicator,
    layout: Layout,
}

impl Dashboard {
    pub fn new(outbound: EventReceiver, inbound: EventReceiver, cols: u16, rows: u16) -> Dashboard {
        let layout = Layout::new(cols, rows);
        Dashboard {
            outbound,
            inbound,
            sent: LineHistory::new(layout.max_visible_lines()),
            received: LineHistory::new(layout.max_visible_lines()),
            status: StatusIndicator::Unknown,
            layout,
        }
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.layout = Layout::new(cols, rows);
        self.sent.set_capacity(self.layout.max_visible_lines());
        self.received.set_capacity(self.layout.max_visible_lines());
    }

    /// Takes at most one event from each direction. One per tick keeps a
    /// busy direction from starving the other.
    pub fn drain(&mut self) -> Drained {
        let mut drained = Drained::default();
        if let Ok(event) = self.outbound.try_recv() {
            self.record_sent(&event);
            drained.sent = true;
        }
        if let Ok(event) = self.inbound.try_recv() {
            self.record_received(&event);
            drained.received = true;
        }
        drained
    }

    fn record_sent(&mut self, event: &Event) {
        self.sent.push(event.display_line(Direction::Outbound));
    }

    fn record_received(&mut self, event: &Event) {
        self.received.push(event.display_line(Direction::Inbound));
        let next = self.status.apply(&event.payload);
        if next != self.status {
            tracing::info!(from = ?self.status, to = ?next, "status changed");
            self.status = next;
        }
    }

    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) -> io::Result<()> {
        let layout = self.layout;
        canvas.clear()?;

        if layout.rows > 0 && layout.cols > 0 {
            let sent = layout.sent_pane();
            let received = layout.received_pane();
            if sent.width > 0 {
                let label = layout::center("Sent", usize::from(sent.width));
                canvas.put(0, sent.col, &label, Highlight::Reverse)?;
            }
            let label = format!("Received {}", self.status.glyph());
            let label = layout::ljust(&label, usize::from(received.width));
            canvas.put(0, received.col, &label, Highlight::Reverse)?;
        }
        if layout.rows > 1 && layout.cols > 0 {
            let rule = "─".repeat(usize::from(layout.cols));
            canvas.put(1, 0, &rule, Highlight::Plain)?;
        }

        draw_pane(canvas, &layout, layout.sent_pane(), &self.sent)?;
        draw_pane(canvas, &layout, layout.received_pane(), &self.received)?;

        canvas.present()
    }

    /// One render tick: drain, then redraw.
    pub fn tick<C: Canvas + ?Sized>(&mut self, canvas: &mut C) -> io::Result<Drained> {
        let drained = self.drain();
        self.draw(canvas)?;
        Ok(drained)
    }

    pub fn status(&self) -> StatusIndicator {
        self.status
    }

    pub fn sent(&self) -> &LineHistory {
        &self.sent
    }

    pub fn received(&self) -> &LineHistory {
        &self.received
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }
}

fn draw_pane<C: Canvas + ?Sized>(
    canvas: &mut C,
    layout: &Layout,
    pane: Pane,
    history: &LineHistory,
) -> io::Result<()> {
    let width = pane.text_width();
    if width == 0 {
        return Ok(());
    }
    for (row, line) in (PANE_TOP..).zip(history.tail(layout.pane_height())) {
        canvas.put(row, pane.col, layout::truncate(line, width), Highlight::Plain)?;
    }
    Ok(())
}
