// Gateway client modules
//
// Hand-written client for the device-automation gateway that owns the
// SSH/NETCONF sessions to switches. All responses use the
// `{ meta: { rc, msg, kind }, data: [...] }` envelope.

pub mod client;
pub mod models;
pub mod sessions;

pub use client::GatewayClient;
