use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;
use crate::constants::*;
use crate::db::{decode, encode, tables};
use crate::error::{AppError, Result};
use crate::extractors::{ApiJson, ApiQuery, AuthUser, MaybeAuthUser};
use crate::ledger;
use crate::models::{NewPost, Post, PostRecord, VoteKind, VoteOutcome, post::validate_id};
use crate::ranking::{SortStrategy, rank};

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    #[serde(rename = "communityId")]
    pub community_id: String,
    pub kind: String,
    pub title: String,
    pub content: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FeedParams {
    pub sort: Option<String>,
    #[serde(rename = "communityId")]
    pub community_id: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub sort: &'static str,
    pub posts: Vec<Post>,
}

#[derive(Debug, Serialize)]
pub struct DeletePostResponse {
    pub success: bool,
    #[serde(rename = "removedVotes")]
    pub removed_votes: u64,
}

/// Create a post
///
/// The author's own upvote is recorded in the ledger in the same transaction,
/// so a new post starts at `upvotes = 1`.
pub async fn create_post(
    State(state): State<AppState>,
    AuthUser(author_id): AuthUser,
    ApiJson(payload): ApiJson<CreatePostRequest>,
) -> Result<(StatusCode, Json<Post>)> {
    let new_post = NewPost::parse(
        &payload.community_id,
        &payload.kind,
        &payload.title,
        payload.content.as_deref(),
        payload.url.as_deref(),
    )?;

    let db = state.db.clone();
    let now = state.clock.now();
    let post_id = Uuid::now_v7().to_string();

    let mut record = PostRecord {
        author_id: author_id.clone(),
        community_id: new_post.community_id,
        kind: new_post.kind,
        title: new_post.title,
        content: new_post.content,
        url: new_post.url,
        upvotes: 0,
        downvotes: 0,
        created_at: now.timestamp_millis(),
    };

    let id = post_id.clone();
    let stored = record.clone();
    let outcome = tokio::task::spawn_blocking(move || -> Result<VoteOutcome> {
        let write_txn = db.begin_write()?;
        let outcome = {
            let mut posts = write_txn.open_table(tables::POSTS)?;
            if posts.get(id.as_str())?.is_some() {
                return Err(AppError::Conflict(format!("post id {id} already taken")));
            }
            let bytes = encode(&stored)?;
            posts.insert(id.as_str(), bytes.as_slice())?;
            drop(posts);

            ledger::apply_vote(&write_txn, &stored.author_id, &id, VoteKind::Up, now)?
        };
        write_txn.commit()?;
        Ok(outcome)
    })
    .await??;

    record.upvotes = outcome.upvotes;
    record.downvotes = outcome.downvotes;

    tracing::info!(
        "Post {} created by {} in community {}",
        post_id,
        author_id,
        record.community_id
    );

    let mut post = Post::from_record(post_id, record);
    post.user_vote = Some(outcome.user_vote);

    Ok((StatusCode::CREATED, Json(post)))
}

/// Ranked feed
///
/// GET /api/posts?sort=new|top|hot&communityId=<id>&limit=<n>
///
/// Unknown or missing `sort` falls back to `hot`. Scores are computed against
/// the clock at request time, so positions drift as posts age.
///
/// Every request decodes the whole `posts` table before filtering by
/// community and truncating to `limit`; there is no community index.
pub async fn list_posts(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    ApiQuery(params): ApiQuery<FeedParams>,
) -> Result<Json<FeedResponse>> {
    let strategy = SortStrategy::from_param(params.sort.as_deref());
    let limit = params
        .limit
        .unwrap_or(DEFAULT_FEED_LIMIT)
        .clamp(1, MAX_FEED_LIMIT);

    let community = params.community_id;
    if let Some(community_id) = &community
        && !validate_id(community_id)
    {
        return Err(AppError::Validation(ERR_INVALID_COMMUNITY_ID.to_string()));
    }

    let db = state.db.clone();
    let now = state.clock.now();

    let posts = tokio::task::spawn_blocking(move || -> Result<Vec<Post>> {
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(tables::POSTS)?;

        let mut posts = Vec::new();
        for entry in table.iter()? {
            let (key, value) = entry?;
            let record: PostRecord = decode(value.value())?;
            if let Some(community_id) = &community
                && record.community_id != *community_id
            {
                continue;
            }
            posts.push(Post::from_record(key.value().to_string(), record));
        }

        let mut page: Vec<Post> = rank(posts, strategy, now).into_iter().take(limit).collect();

        if let Some(user_id) = viewer {
            let ids: Vec<&str> = page.iter().map(|p| p.id.as_str()).collect();
            let votes = ledger::votes_of(&read_txn, &user_id, &ids)?;
            for (post, vote) in page.iter_mut().zip(votes) {
                post.user_vote = Some(vote);
            }
        }

        Ok(page)
    })
    .await??;

    tracing::debug!("Feed served: sort={} posts={}", strategy.as_str(), posts.len());

    Ok(Json(FeedResponse {
        sort: strategy.as_str(),
        posts,
    }))
}

/// Fetch a single post
pub async fn get_post(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(post_id): Path<String>,
) -> Result<Json<Post>> {
    if !validate_id(&post_id) {
        return Err(AppError::Validation(ERR_INVALID_POST_ID.to_string()));
    }

    let db = state.db.clone();

    let post = tokio::task::spawn_blocking(move || -> Result<Post> {
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(tables::POSTS)?;

        let record: PostRecord = table
            .get(post_id.as_str())?
            .map(|b| decode(b.value()))
            .transpose()?
            .ok_or(AppError::PostNotFound)?;

        let mut post = Post::from_record(post_id, record);
        if let Some(user_id) = viewer {
            let vote = ledger::votes_of(&read_txn, &user_id, &[post.id.as_str()])?
                .pop()
                .flatten();
            post.user_vote = Some(vote);
        }

        Ok(post)
    })
    .await??;

    Ok(Json(post))
}

/// Delete a post and every vote on it
///
/// Only the author may delete. The ledger rows and the post row are removed
/// in one transaction.
pub async fn delete_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(post_id): Path<String>,
) -> Result<Json<DeletePostResponse>> {
    if !validate_id(&post_id) {
        return Err(AppError::Validation(ERR_INVALID_POST_ID.to_string()));
    }

    let db = state.db.clone();
    let id = post_id.clone();
    let requester = user_id.clone();

    let removed_votes = tokio::task::spawn_blocking(move || -> Result<u64> {
        let write_txn = db.begin_write()?;
        let removed = {
            let mut posts = write_txn.open_table(tables::POSTS)?;
            let record: PostRecord = posts
                .get(id.as_str())?
                .map(|b| decode(b.value()))
                .transpose()?
                .ok_or(AppError::PostNotFound)?;

            if record.author_id != requester {
                tracing::warn!(
                    "User {} attempted to delete post {} they do not own",
                    requester,
                    id
                );
                return Err(AppError::Forbidden);
            }

            let removed = ledger::remove_votes_for_post(&write_txn, &id)?;
            posts.remove(id.as_str())?;
            removed
        };
        write_txn.commit()?;
        Ok(removed)
    })
    .await??;

    tracing::info!(
        "Post {} deleted by {} ({} votes removed)",
        post_id,
        user_id,
        removed_votes
    );

    Ok(Json(DeletePostResponse {
        success: true,
        removed_votes,
    }))
}
