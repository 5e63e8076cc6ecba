// src/view.rs

//! Pure projection of canonical posts into what a bulletin card renders.
//! No I/O and no DOM; rendering layers consume `PostView` as-is.

use crate::{
    calendar::effective_span,
    models::{
        comment::Comment,
        post::{Post, PostKind},
    },
    utils::{
        dates::iso_day,
        html::clean_html,
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostView {
    pub id: String,
    pub author: String,
    pub kind: PostKind,
    pub category_label: String,
    pub title: String,
    /// Sanitised HTML. Every other string field is plain text.
    pub body_html: String,
    pub image_url: Option<String>,
    pub created_label: Option<String>,
    pub pinned: bool,
    pub like_count: usize,
    pub liked_by_viewer: bool,
    pub comment_count: usize,
    pub comments: Vec<CommentView>,
    pub event: Option<EventView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentView {
    pub author: String,
    pub text: String,
    pub created_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventView {
    /// `2025-10-15` or `2025-10-30 - 2025-11-02`; None when no date is readable.
    pub span_label: Option<String>,
    pub location: Option<String>,
}

impl PostView {
    pub fn project(post: &Post, viewer_id: Option<&str>) -> Self {
        Self {
            id: post.id.clone(),
            author: post.author.display_name().to_string(),
            kind: post.kind,
            category_label: category_label(&post.category),
            title: post.title.clone(),
            body_html: clean_html(&post.body),
            image_url: post.image_url.clone().filter(|u| !u.is_empty()),
            created_label: post.created_at.map(|t| t.format("%Y-%m-%d %H:%M").to_string()),
            pinned: post.pinned,
            like_count: post.likes.len(),
            liked_by_viewer: viewer_id.is_some_and(|id| post.likes.contains(id)),
            comment_count: post.comments.len(),
            comments: post.comments.iter().map(CommentView::project).collect(),
            event: post.is_event().then(|| EventView::project(post)),
        }
    }
}

impl CommentView {
    fn project(comment: &Comment) -> Self {
        Self {
            author: comment.author.display_name().to_string(),
            text: comment.text.clone(),
            created_label: comment
                .created_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string()),
        }
    }
}

impl EventView {
    fn project(post: &Post) -> Self {
        let span_label = effective_span(post).map(|(start, end)| {
            if start == end {
                iso_day(start)
            } else {
                format!("{} - {}", iso_day(start), iso_day(end))
            }
        });
        let location = post
            .event
            .as_ref()
            .and_then(|e| e.location.as_deref())
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string);

        Self {
            span_label,
            location,
        }
    }
}

pub fn project_all(posts: &[Post], viewer_id: Option<&str>) -> Vec<PostView> {
    posts.iter().map(|p| PostView::project(p, viewer_id)).collect()
}

fn category_label(category: &str) -> String {
    let category = category.trim();
    let mut chars = category.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "General".to_string(),
    }
}
