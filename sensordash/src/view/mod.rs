//! View
//!
//! The render loop: drains the relay at a fixed tick, keeps the sent and
//! received histories and the status indicator, and redraws a two-pane
//! screen through a [`Canvas`].

mod canvas;
mod dashboard;
mod history;
pub mod layout;

pub use canvas::{Canvas, Highlight};
pub use dashboard::{Dashboard, Drained};
pub use history::LineHistory;
pub use layout::Layout;

use crate::cancel::CancelToken;

use std::io;
use std::time::Duration;

use crossbeam::channel;

/// Requests from the input side of the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Resize(u16, u16),
    Quit,
}

/// Runs the render loop until `cancel` fires or a `Control::Quit` arrives
/// (which cancels the token for everyone else). Drawing errors end the loop.
pub fn run<C: Canvas + ?Sized>(
    dashboard: &mut Dashboard,
    canvas: &mut C,
    cancel: &CancelToken,
    control: &channel::Receiver<Control>,
    tick: Duration,
) -> io::Result<()> {
    let ticker = channel::tick(tick);
    dashboard.draw(canvas)?;

    while !cancel.is_cancelled() {
        crossbeam::select! {
            recv(ticker) -> _ => {
                dashboard.tick(canvas)?;
            }
            recv(control) -> msg => match msg {
                Ok(Control::Resize(cols, rows)) => {
                    tracing::debug!(cols, rows, "terminal resized");
                    dashboard.resize(cols, rows);
                    dashboard.draw(canvas)?;
                }
                Ok(Control::Quit) => {
                    tracing::info!("quit requested");
                    cancel.cancel();
                }
                // Input thread gone; keep rendering until cancelled.
                Err(_) => return wait_for_cancel(dashboard, canvas, cancel, &ticker),
            },
            recv(cancel.receiver()) -> _ => {}
        }
    }
    Ok(())
}

fn wait_for_cancel<C: Canvas + ?Sized>(
    dashboard: &mut Dashboard,
    canvas: &mut C,
    cancel: &CancelToken,
    ticker: &channel::Receiver<std::time::Instant>,
) -> io::Result<()> {
    while !cancel.is_cancelled() {
        crossbeam::select! {
            recv(ticker) -> _ => {
                dashboard.tick(canvas)?;
            }
            recv(cancel.receiver()) -> _ => {}
        }
    }
    Ok(())
}
