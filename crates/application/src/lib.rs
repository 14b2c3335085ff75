//! doh-relay application layer
pub mod ports;

pub use ports::{DohProvider, UpstreamAnswer};
