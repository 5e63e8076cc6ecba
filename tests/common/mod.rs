// tests/common/mod.rs
#![allow(dead_code)]

//! In-memory bulletin backend for integration tests.
//!
//! Orders the feed pinned-first (most recently pinned first), then newest
//! first. Cursors are stringified offsets. The bearer token is the user id.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use bulletin::{
    calendar::{CalendarMonth, effective_span},
    models::{
        comment::Comment,
        post::{EventInfo, Post, PostKind},
        user::Author,
    },
    utils::dates::parse_day,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;

#[derive(Default)]
pub struct Backend {
    pub posts: Vec<Post>,
    pin_seq: HashMap<String, u64>,
    next_pin: u64,
    next_minute: i64,
}

pub type Shared = Arc<Mutex<Backend>>;

impl Backend {
    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 1, 8, 0, 0)
            .single()
            .expect("valid base time")
    }

    /// Every inserted post is one minute newer than the previous one.
    fn tick(&mut self) -> DateTime<Utc> {
        self.next_minute += 1;
        Self::base_time() + Duration::minutes(self.next_minute)
    }

    pub fn insert(&mut self, mut post: Post) -> Post {
        if post.id.is_empty() {
            post.id = uuid::Uuid::new_v4().to_string();
        }
        if post.created_at.is_none() {
            post.created_at = Some(self.tick());
        }
        self.posts.push(post.clone());
        post
    }

    fn ordered(&self) -> Vec<&Post> {
        let mut posts: Vec<&Post> = self.posts.iter().collect();
        let seq = |p: &Post| self.pin_seq.get(&p.id).copied().unwrap_or(0);
        posts.sort_by(|a, b| match (a.pinned, b.pinned) {
            (true, false) => std::cmp::Ordering::Less,
            (false, true) => std::cmp::Ordering::Greater,
            (true, true) => seq(b).cmp(&seq(a)),
            (false, false) => b.created_at.cmp(&a.created_at),
        });
        posts
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut Post> {
        self.posts.iter_mut().find(|p| p.id == id)
    }
}

pub fn seed_post(db: &Shared, title: &str, category: &str) -> Post {
    db.lock().unwrap().insert(Post {
        author: Author::new("Clerk"),
        kind: PostKind::Post,
        category: category.to_string(),
        title: title.to_string(),
        body: format!("<p>{}</p>", title),
        ..Default::default()
    })
}

pub fn seed_event(db: &Shared, title: &str, start: &str, end: Option<&str>) -> Post {
    db.lock().unwrap().insert(Post {
        author: Author::new("Clerk"),
        kind: PostKind::Event,
        category: "events".to_string(),
        title: title.to_string(),
        event: Some(EventInfo {
            start_date: Some(start.to_string()),
            end_date: end.map(str::to_string),
            location: Some("Town hall".to_string()),
        }),
        ..Default::default()
    })
}

fn failure(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "ok": false, "message": message }))).into_response()
}

fn item(post: &Post) -> Response {
    Json(json!({ "ok": true, "item": post })).into_response()
}

fn viewer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

#[derive(Debug, Deserialize)]
struct ListParams {
    q: Option<String>,
    category: Option<String>,
    on: Option<String>,
    cursor: Option<String>,
    limit: Option<usize>,
}

async fn list_posts(State(db): State<Shared>, Query(params): Query<ListParams>) -> Response {
    let offset = match params.cursor.as_deref().filter(|c| !c.is_empty()) {
        Some(raw) => match raw.parse::<usize>() {
            Ok(offset) => offset,
            Err(_) => return failure(StatusCode::BAD_REQUEST, "Invalid cursor"),
        },
        None => 0,
    };
    let limit = params.limit.unwrap_or(10).max(1);
    let text = params.q.unwrap_or_default().to_lowercase();
    let category = params.category.unwrap_or_default();
    let on = params.on.as_deref().and_then(parse_day);

    let db = db.lock().unwrap();
    let matching: Vec<&Post> = db
        .ordered()
        .into_iter()
        .filter(|p| text.is_empty() || p.title.to_lowercase().contains(&text) || p.body.to_lowercase().contains(&text))
        .filter(|p| category.is_empty() || p.category == category)
        .filter(|p| match on {
            Some(day) => effective_span(p).is_some_and(|(s, e)| s <= day && day <= e),
            None => true,
        })
        .collect();

    let items: Vec<&Post> = matching.iter().skip(offset).take(limit).copied().collect();
    let next = offset + items.len();
    let next_cursor = if next < matching.len() {
        next.to_string()
    } else {
        String::new()
    };

    Json(json!({ "items": items, "nextCursor": next_cursor })).into_response()
}

#[derive(Debug, Deserialize)]
struct CalendarParams {
    year: i32,
    month: u32,
}

/// Month-scoped but deliberately unclamped, like the real backend.
async fn calendar(State(db): State<Shared>, Query(params): Query<CalendarParams>) -> Response {
    let Some(month) = params
        .month
        .checked_sub(1)
        .and_then(|m0| CalendarMonth::new(params.year, m0))
    else {
        return failure(StatusCode::BAD_REQUEST, "Invalid month");
    };

    let db = db.lock().unwrap();
    let items: Vec<&Post> = db
        .posts
        .iter()
        .filter(|p| p.is_event())
        .filter(|p| {
            effective_span(p)
                .is_some_and(|(s, e)| s <= month.last_day() && e >= month.first_day())
        })
        .collect();
    Json(json!({ "items": items })).into_response()
}

#[derive(Debug, Deserialize)]
struct EventsParams {
    limit: Option<usize>,
}

async fn upcoming(State(db): State<Shared>, Query(params): Query<EventsParams>) -> Response {
    let db = db.lock().unwrap();
    let mut events: Vec<&Post> = db.posts.iter().filter(|p| p.is_event()).collect();
    events.sort_by_key(|p| effective_span(p).map(|(s, _)| s));
    events.truncate(params.limit.unwrap_or(5));
    Json(json!({ "items": events })).into_response()
}

async fn create_post(
    State(db): State<Shared>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let Some(user) = viewer(&headers) else {
        return failure(StatusCode::UNAUTHORIZED, "Login required");
    };

    let mut fields: HashMap<String, String> = HashMap::new();
    let mut upload: Option<String> = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            upload = field.file_name().map(str::to_string);
            let _ = field.bytes().await;
            continue;
        }
        let value = field.text().await.unwrap_or_default();
        fields.insert(name, value);
    }

    let title = fields.get("title").cloned().unwrap_or_default();
    if title.trim().is_empty() {
        return failure(StatusCode::BAD_REQUEST, "Title is required");
    }

    let kind = match fields.get("type").map(String::as_str) {
        Some("event") => PostKind::Event,
        _ => PostKind::Post,
    };
    let event = (kind == PostKind::Event).then(|| EventInfo {
        start_date: fields.get("startDate").cloned(),
        end_date: fields.get("endDate").cloned(),
        location: fields.get("location").cloned(),
    });
    let image_url = upload
        .map(|name| format!("/uploads/{}", name))
        .or_else(|| fields.get("imageUrl").cloned());

    let created = db.lock().unwrap().insert(Post {
        author: Author::new(user),
        kind,
        category: fields.get("category").cloned().unwrap_or_default(),
        title,
        body: fields.get("body").cloned().unwrap_or_default(),
        image_url,
        event,
        ..Default::default()
    });
    (StatusCode::CREATED, Json(json!({ "ok": true, "item": created }))).into_response()
}

async fn toggle_like(
    State(db): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let Some(user) = viewer(&headers) else {
        return failure(StatusCode::UNAUTHORIZED, "Login required");
    };
    let mut db = db.lock().unwrap();
    let Some(post) = db.find_mut(&id) else {
        return failure(StatusCode::NOT_FOUND, "Post not found");
    };
    if !post.likes.remove(&user) {
        post.likes.insert(user);
    }
    item(post)
}

#[derive(Debug, Deserialize)]
struct CommentBody {
    text: String,
}

async fn add_comment(
    State(db): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<CommentBody>,
) -> Response {
    let Some(user) = viewer(&headers) else {
        return failure(StatusCode::UNAUTHORIZED, "Login required");
    };
    let mut db = db.lock().unwrap();
    let created_at = db.tick();
    let Some(post) = db.find_mut(&id) else {
        return failure(StatusCode::NOT_FOUND, "Post not found");
    };
    post.comments.push(Comment {
        author: Author::new(user),
        text: body.text,
        created_at: Some(created_at),
    });
    item(post)
}

#[derive(Debug, Deserialize)]
struct PinBody {
    pinned: bool,
}

async fn set_pin(
    State(db): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<PinBody>,
) -> Response {
    let mut db = db.lock().unwrap();
    db.next_pin += 1;
    let seq = db.next_pin;
    if body.pinned {
        db.pin_seq.insert(id.clone(), seq);
    } else {
        db.pin_seq.remove(&id);
    }
    let Some(post) = db.find_mut(&id) else {
        return failure(StatusCode::NOT_FOUND, "Post not found");
    };
    post.pinned = body.pinned;
    item(post)
}

async fn delete_post(State(db): State<Shared>, Path(id): Path<String>) -> Response {
    let mut db = db.lock().unwrap();
    let before = db.posts.len();
    db.posts.retain(|p| p.id != id);
    if db.posts.len() == before {
        return failure(StatusCode::NOT_FOUND, "Post not found");
    }
    Json(json!({ "ok": true })).into_response()
}

pub fn router(db: Shared) -> Router {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/{id}", delete(delete_post))
        .route("/calendar", get(calendar))
        .route("/events", get(upcoming))
        .route("/like/{id}", post(toggle_like))
        .route("/comment/{id}", post(add_comment))
        .route("/pin/{id}", post(set_pin))
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

/// Serves `app` on a random port and returns its base URL.
pub async fn spawn_router(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://127.0.0.1:{}", port)
}

/// Spawns the in-memory backend. Returns the base URL and its state.
pub async fn spawn_app() -> (String, Shared) {
    let db: Shared = Arc::new(Mutex::new(Backend::default()));
    let address = spawn_router(router(db.clone())).await;
    (address, db)
}
