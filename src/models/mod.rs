pub mod post;
pub mod vote;

pub use post::{NewPost, Post, PostKind, PostRecord};
pub use vote::{CounterDelta, VoteKind, VoteOutcome, VoteRecord, VoteState};
