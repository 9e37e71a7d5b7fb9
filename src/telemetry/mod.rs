//! Live submission telemetry
//!
//! Streams per-container judge output and keeps the connection alive across
//! network drops. The transport state machine lives in [`transport`]; the
//! connector seam (WebSocket in production, scripted streams in tests) in
//! [`connector`]; the wire record shape in [`event`].

pub mod connector;
pub mod event;
pub mod transport;

pub use connector::{LogEndpoint, LogStreamConnector, TransportError, WsConnector};
pub use event::{LogEvent, LogStream};
pub use transport::{ConnectionState, DisconnectHook, LogTransport};
