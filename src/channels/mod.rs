//! Channel abstraction for message I/O.

pub mod telegram;
pub mod transport;

pub use telegram::TelegramChannel;
pub use transport::{Event, EventKind, EventStream, Transport};
