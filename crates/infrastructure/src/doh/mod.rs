pub mod decoder;
pub mod encoder;
pub mod endpoint;
pub mod provider;
pub mod transport;

pub use encoder::EncodedRequest;
pub use endpoint::EndpointResolver;
pub use provider::DohClient;
pub use transport::{DohTransport, HttpsTransport};
