pub mod backend;

pub use backend::{
    ConnectionStatus, JoinOptions, MediaTransport, Participant, TrackHandle, TrackKind,
    TransportEvent,
};
