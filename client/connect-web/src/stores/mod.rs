//! Remote-backed stores
//!
//! No optimistic updates: each mutation is followed by a re-fetch, and a
//! response is applied only when it answers the latest request for its
//! resource.

pub mod comments;
pub mod posts;

pub use comments::CommentStore;
pub use posts::PostStore;
