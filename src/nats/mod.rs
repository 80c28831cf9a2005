pub mod client;
pub mod messages;

pub use client::NatsTransport;
pub use messages::{ChatWireMessage, PresenceKind, PresenceMessage};
