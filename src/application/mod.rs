pub mod identity_resolver;
pub mod stats;
pub mod stream;
