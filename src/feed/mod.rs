// src/feed/mod.rs

pub mod filter;
pub mod paginator;
pub mod store;
pub mod sync;

pub use filter::FilterState;
pub use paginator::{FeedPaginator, LoadOutcome, LoadTicket};
pub use store::FeedStore;
pub use sync::{Mutation, MutationOutcome, apply_mutation};
