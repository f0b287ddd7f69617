use axum::{Json, extract::State};
use serde::Deserialize;

use crate::AppState;
use crate::constants::{ERR_INVALID_POST_ID, ERR_INVALID_VOTE_TYPE};
use crate::error::{AppError, Result};
use crate::extractors::{ApiJson, AuthUser};
use crate::models::{VoteKind, VoteOutcome, post::validate_id};

#[derive(Debug, Deserialize)]
pub struct CastVoteRequest {
    #[serde(rename = "postId")]
    pub post_id: String,
    #[serde(rename = "voteType")]
    pub vote_type: Option<String>,
}

/// Cast, switch or withdraw a vote
///
/// POST /api/votes `{ "postId": "...", "voteType": "up" | "down" }`
///
/// Voting the kind already held removes the vote. The user id comes from the
/// bearer token, never from the body.
pub async fn cast_vote(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(payload): ApiJson<CastVoteRequest>,
) -> Result<Json<VoteOutcome>> {
    let kind: VoteKind = payload
        .vote_type
        .as_deref()
        .ok_or_else(|| AppError::Validation(ERR_INVALID_VOTE_TYPE.to_string()))?
        .parse()?;

    if !validate_id(&payload.post_id) {
        return Err(AppError::Validation(ERR_INVALID_POST_ID.to_string()));
    }

    let ledger = state.ledger();
    let now = state.clock.now();
    let post_id = payload.post_id.clone();
    let voter = user_id.clone();

    let outcome =
        tokio::task::spawn_blocking(move || ledger.cast_vote(&voter, &post_id, kind, now))
            .await??;

    tracing::info!(
        "Vote {} by user {} on post {}: now {}/{}",
        kind,
        user_id,
        payload.post_id,
        outcome.upvotes,
        outcome.downvotes
    );

    Ok(Json(outcome))
}
