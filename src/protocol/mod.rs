//! Server wire protocol: line framing, classification, and the event type.

pub mod classifier;
pub mod event;
pub mod framing;

pub use classifier::classify;
pub use event::Event;
pub use framing::LineBuffer;
