//! Client layer: transport seam and the registry fetch protocol.

pub mod client;
pub mod transport;

pub use client::{ClientError, EntityType, ParseEntityError, RegistryClient, next_cursor};
pub use transport::{HttpResponse, ReqwestTransport, Transport, TransportError};
