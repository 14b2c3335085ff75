//! One-shot plain-DNS client, used only to bootstrap the DoH endpoint's own
//! address before any HTTPS exchange can happen.

mod client;
mod message_builder;
mod response_parser;

pub use client::query_addresses;
pub use message_builder::MessageBuilder;
pub use response_parser::extract_addresses;
