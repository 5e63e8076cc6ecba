use std::collections::HashSet;

use tracing::debug;

use crate::models::post::Post;

/// Ordered, de-duplicated list of rendered posts.
///
/// Order is exactly the order pages arrived in; the store never sorts.
#[derive(Debug, Clone, Default)]
pub struct FeedStore {
    posts: Vec<Post>,
    ids: HashSet<String>,
}

impl FeedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.posts.clear();
        self.ids.clear();
    }

    /// Appends in the given order, skipping ids already present.
    /// Returns how many posts were actually added.
    pub fn append(&mut self, items: Vec<Post>) -> usize {
        let before = self.posts.len();
        for post in items {
            if self.ids.insert(post.id.clone()) {
                self.posts.push(post);
            } else {
                debug!(post_id = %post.id, "skipping duplicate post");
            }
        }
        self.posts.len() - before
    }

    /// Replaces the post with the same id by `canonical`, keeping its position.
    /// Returns false when the post is not in the list.
    pub fn replace_by_id(&mut self, canonical: Post) -> bool {
        match self.posts.iter_mut().find(|p| p.id == canonical.id) {
            Some(slot) => {
                *slot = canonical;
                true
            }
            None => false,
        }
    }

    pub fn remove_by_id(&mut self, post_id: &str) -> Option<Post> {
        let index = self.posts.iter().position(|p| p.id == post_id)?;
        self.ids.remove(post_id);
        Some(self.posts.remove(index))
    }

    pub fn get(&self, post_id: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == post_id)
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}
