mod error;
mod hyper_transport;
mod response;
mod throttled;
mod transport;

pub use error::{ClientError, ErrorOrigin, Rejection, TransportError, TransportFailure};
pub use hyper_transport::{encode_query, resolve_url, HyperTransport};
pub use response::TransportResponse;
pub use throttled::ThrottledClient;
pub use transport::Transport;
