//! Store traits (ports) consumed by the relay

mod store;

pub use store::{MessageStore, RepoResult, UserDirectory};
