mod doh_provider;

pub use doh_provider::{DohProvider, UpstreamAnswer};

// Re-export for convenience
pub use doh_relay_domain::InboundQuery;
