//! Per-resource request sequencing
//!
//! Responses for the same resource can arrive out of order when a re-fetch
//! follows a mutation. Each request takes a ticket; only the holder of the
//! latest ticket may apply its response.

use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    PostList,
    PostDetail,
    Comments,
    Mentors,
    Mentee,
    User,
}

const RESOURCE_COUNT: usize = 6;

impl Resource {
    fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::PostList => "post_list",
            Resource::PostDetail => "post_detail",
            Resource::Comments => "comments",
            Resource::Mentors => "mentors",
            Resource::Mentee => "mentee",
            Resource::User => "user",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    resource: Resource,
    seq: u64,
}

impl Ticket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Default)]
pub struct RequestSequencer {
    counters: [AtomicU64; RESOURCE_COUNT],
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatches a new request for `resource`, superseding earlier ones.
    pub fn begin(&self, resource: Resource) -> Ticket {
        let seq = self.counters[resource.index()].fetch_add(1, Ordering::SeqCst) + 1;
        Ticket { resource, seq }
    }

    pub fn is_latest(&self, ticket: Ticket) -> bool {
        let latest = self.counters[ticket.resource.index()].load(Ordering::SeqCst);
        if latest != ticket.seq {
            trace!(
                resource = ticket.resource.as_str(),
                seq = ticket.seq,
                latest,
                "ticket superseded"
            );
            return false;
        }
        true
    }

    /// Supersedes whatever is in flight for `resource` without a new request.
    pub fn invalidate(&self, resource: Resource) {
        self.counters[resource.index()].fetch_add(1, Ordering::SeqCst);
    }
}
