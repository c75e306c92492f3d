pub mod record;
pub mod client;
pub mod options;
pub mod processor;
pub mod single;
pub mod bulk;

#[cfg(feature = "http")]
pub mod http;

pub mod worker;
pub mod memory;
