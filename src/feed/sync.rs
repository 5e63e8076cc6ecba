//! Single-post mutations reconciled from the server's canonical post.
//!
//! Nothing local changes until the server answers. The answer replaces the
//! rendered post wholesale; a pin additionally asks the caller for a reset
//! reload because only the server knows the order among pinned posts.

use tracing::{info, warn};
use validator::Validate;

use super::store::FeedStore;
use crate::{
    api::BulletinApi,
    error::AppError,
    models::{comment::CreateCommentRequest, post::Post},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Like,
    Comment(String),
    Pin(bool),
}

impl Mutation {
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::Like => "like",
            Mutation::Comment(_) => "comment",
            Mutation::Pin(_) => "pin",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    /// The canonical post replaced the rendered one (`in_feed` is false when
    /// the post was no longer in the list, e.g. after a concurrent reset).
    Replaced { post: Post, in_feed: bool },
    /// Global order may have changed; run `load(reset=true)`.
    ReloadRequired(Post),
}

/// Sends the request for `mutation` and returns the canonical post.
pub async fn send_mutation(
    api: &dyn BulletinApi,
    post_id: &str,
    mutation: &Mutation,
) -> Result<Post, AppError> {
    match mutation {
        Mutation::Like => api.like(post_id).await,
        Mutation::Comment(text) => {
            let request = CreateCommentRequest::new(text);
            request.validate()?;
            api.comment(post_id, &request.text).await
        }
        Mutation::Pin(pinned) => api.pin(post_id, *pinned).await,
    }
}

/// Writes the canonical post into the store.
pub fn reconcile(store: &mut FeedStore, canonical: Post, mutation: &Mutation) -> MutationOutcome {
    let in_feed = store.replace_by_id(canonical.clone());
    match mutation {
        Mutation::Pin(_) => MutationOutcome::ReloadRequired(canonical),
        _ => MutationOutcome::Replaced {
            post: canonical,
            in_feed,
        },
    }
}

pub async fn apply_mutation(
    api: &dyn BulletinApi,
    store: &mut FeedStore,
    post_id: &str,
    mutation: &Mutation,
) -> Result<MutationOutcome, AppError> {
    let canonical = send_mutation(api, post_id, mutation)
        .await
        .inspect_err(|e| warn!(post_id, action = mutation.name(), "mutation failed: {}", e))?;

    if canonical.id != post_id {
        warn!(
            post_id,
            canonical_id = %canonical.id,
            "server returned a different post than the one mutated"
        );
    }

    info!(
        post_id,
        action = mutation.name(),
        likes = canonical.likes.len(),
        comments = canonical.comments.len(),
        pinned = canonical.pinned,
        "mutation reconciled"
    );
    Ok(reconcile(store, canonical, mutation))
}
