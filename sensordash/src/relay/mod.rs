//! Relay
//!
//! Hands events from the producers (sensor emulator, transport callback)
//! to the render loop. There is one channel per direction; each is FIFO on
//! its own, with no ordering between the two.

mod event;
mod queue;

pub use event::{Direction, Event};
pub use queue::{channel, Capacity, EventReceiver, EventSender, RecvError, SendError};
