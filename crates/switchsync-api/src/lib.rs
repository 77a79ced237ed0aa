// switchsync-api: Async Rust client for the switchsync device-automation gateway

pub mod error;
pub mod gateway;
pub mod transport;

pub use error::{DeviceErrorKind, Error};
pub use gateway::GatewayClient;
pub use gateway::models::OpenSessionRequest;
pub use transport::{TlsMode, TransportConfig};
