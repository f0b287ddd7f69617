//! Vote ledger.
//!
//! One row per `(post_id, user_id)` in [`tables::VOTES`], mirrored by the
//! `upvotes`/`downvotes` counters on the post record. Every function that
//! writes takes the enclosing [`WriteTransaction`] so the vote row and the
//! counters commit together or not at all. redb admits a single writer, which
//! serializes all read-modify-write cycles on a post.

use chrono::{DateTime, Utc};
use redb::{ReadTransaction, ReadableDatabase, ReadableTable, WriteTransaction};

use crate::db::{self, Db, tables};
use crate::error::{AppError, Result};
use crate::models::{PostRecord, VoteKind, VoteOutcome, VoteRecord, VoteState};

/// Apply `kind` from `user_id` to `post_id` inside an open write transaction
pub fn apply_vote(
    txn: &WriteTransaction,
    user_id: &str,
    post_id: &str,
    kind: VoteKind,
    now: DateTime<Utc>,
) -> Result<VoteOutcome> {
    let mut posts = txn.open_table(tables::POSTS)?;
    let mut post: PostRecord = match posts.get(post_id)? {
        Some(bytes) => db::decode(bytes.value())?,
        None => return Err(AppError::PostNotFound),
    };

    let mut votes = txn.open_table(tables::VOTES)?;
    let existing: Option<VoteRecord> = match votes.get((post_id, user_id))? {
        Some(bytes) => Some(db::decode(bytes.value())?),
        None => None,
    };

    let current = VoteState::from(existing.map(|r| r.kind));
    let (next, delta) = current.transition(kind);

    match next.kind() {
        Some(held) => {
            let record = VoteRecord {
                kind: held,
                updated_at: now.timestamp_millis(),
            };
            let bytes = db::encode(&record)?;
            let replaced = votes.insert((post_id, user_id), bytes.as_slice())?.is_some();
            if current == VoteState::NoVote && replaced {
                return Err(AppError::Conflict(format!(
                    "second vote row for user {user_id} on post {post_id}"
                )));
            }
        }
        None => {
            if votes.remove((post_id, user_id))?.is_none() {
                return Err(AppError::Conflict(format!(
                    "vote row for user {user_id} on post {post_id} vanished mid-transaction"
                )));
            }
        }
    }

    post.apply_delta(delta)?;
    let bytes = db::encode(&post)?;
    posts.insert(post_id, bytes.as_slice())?;

    Ok(VoteOutcome {
        post_id: post_id.to_string(),
        upvotes: post.upvotes,
        downvotes: post.downvotes,
        user_vote: next.kind(),
    })
}

/// Delete every vote row referencing `post_id`
///
/// Counters are left alone; the caller is deleting the post in the same
/// transaction. Returns the number of rows removed.
pub fn remove_votes_for_post(txn: &WriteTransaction, post_id: &str) -> Result<u64> {
    let mut votes = txn.open_table(tables::VOTES)?;

    let mut voters = Vec::new();
    for entry in votes.range((post_id, "")..)? {
        let (key, _) = entry?;
        let (owner, user_id) = key.value();
        if owner != post_id {
            break;
        }
        voters.push(user_id.to_string());
    }

    for user_id in &voters {
        votes.remove((post_id, user_id.as_str()))?;
    }

    Ok(voters.len() as u64)
}

/// The caller's vote on each of `post_ids`, in the same order
pub fn votes_of(
    txn: &ReadTransaction,
    user_id: &str,
    post_ids: &[&str],
) -> Result<Vec<Option<VoteKind>>> {
    let votes = txn.open_table(tables::VOTES)?;
    post_ids
        .iter()
        .map(|post_id| -> Result<Option<VoteKind>> {
            votes
                .get((*post_id, user_id))?
                .map(|bytes| db::decode::<VoteRecord>(bytes.value()).map(|r| r.kind))
                .transpose()
        })
        .collect()
}

/// Handle for ledger operations that own their transaction
#[derive(Clone)]
pub struct VoteLedger {
    db: Db,
}

impl VoteLedger {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Cast, switch or withdraw a vote and commit
    pub fn cast_vote(
        &self,
        user_id: &str,
        post_id: &str,
        kind: VoteKind,
        now: DateTime<Utc>,
    ) -> Result<VoteOutcome> {
        let write_txn = self.db.begin_write()?;
        let outcome = apply_vote(&write_txn, user_id, post_id, kind, now)?;
        write_txn.commit()?;

        tracing::debug!(
            post_id,
            user_id,
            requested = %kind,
            upvotes = outcome.upvotes,
            downvotes = outcome.downvotes,
            "Vote applied"
        );

        Ok(outcome)
    }

    /// Remove all votes for a post and commit
    ///
    /// If the post row still exists its counters are zeroed in the same
    /// transaction, so they keep matching the (now empty) ledger.
    pub fn remove_votes_for_post(&self, post_id: &str) -> Result<u64> {
        let write_txn = self.db.begin_write()?;
        let removed = remove_votes_for_post(&write_txn, post_id)?;
        {
            let mut posts = write_txn.open_table(tables::POSTS)?;
            let existing: Option<PostRecord> = match posts.get(post_id)? {
                Some(bytes) => Some(db::decode(bytes.value())?),
                None => None,
            };
            if let Some(mut post) = existing {
                post.upvotes = 0;
                post.downvotes = 0;
                let bytes = db::encode(&post)?;
                posts.insert(post_id, bytes.as_slice())?;
            }
        }
        write_txn.commit()?;

        tracing::debug!(post_id, removed, "Votes removed");
        Ok(removed)
    }

    /// The user's current vote on a post
    pub fn vote_of(&self, user_id: &str, post_id: &str) -> Result<Option<VoteKind>> {
        let read_txn = self.db.begin_read()?;
        Ok(votes_of(&read_txn, user_id, &[post_id])?
            .pop()
            .flatten())
    }

    /// Recount `(up, down)` rows for a post straight from the ledger
    pub fn tally(&self, post_id: &str) -> Result<(u64, u64)> {
        let read_txn = self.db.begin_read()?;
        let votes = read_txn.open_table(tables::VOTES)?;

        let (mut up, mut down) = (0, 0);
        for entry in votes.range((post_id, "")..)? {
            let (key, value) = entry?;
            if key.value().0 != post_id {
                break;
            }
            match db::decode::<VoteRecord>(value.value())?.kind {
                VoteKind::Up => up += 1,
                VoteKind::Down => down += 1,
            }
        }

        Ok((up, down))
    }
}
