pub mod cancel;
pub mod config;
pub mod emulator;
pub mod relay;
pub mod status;
pub mod topics;
pub mod transport;
pub mod view;

pub use cancel::CancelToken;
pub use config::DashConfig;
pub use relay::{Event, EventReceiver, EventSender};
pub use status::StatusIndicator;
pub use topics::TopicSet;
