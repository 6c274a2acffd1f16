//! Poll record store access.

pub mod api;

pub use api::PollClient;
