//! Request services: transport, cache and the per-endpoint request handler

pub mod endpoint;
pub mod request_cache;
pub mod request_handler;
pub mod transport;

pub use endpoint::{Endpoint, Query};
pub use request_cache::RequestCache;
pub use request_handler::{RequestHandler, RequestOptions, RequestOutcome, Response};
pub use transport::{HttpTransport, Transport};
