// src/main.rs

use std::sync::Arc;

use bulletin::{
    Board, CalendarMonth, HttpApi, MonthGrid, config::Config, error::AppError, view::PostView,
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), AppError> {
    // Load configuration from environment (and .env, if present)
    let config = Config::from_env()?;

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "bulletin.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    let api = HttpApi::new(&config)?;
    let today = chrono::Local::now().date_naive();
    let mut board = Board::new(Arc::new(api), &config, CalendarMonth::containing(today));

    tracing::info!(api = %config.api_url, "loading community bulletin");
    board.load(true).await;
    board.refresh_upcoming().await;
    board.refresh_calendar().await;

    if let Some(notice) = board.notice() {
        tracing::warn!(action = notice.action, "{}", notice.message);
    }

    println!("== Feed ==");
    for view in board.views() {
        print_post(&view);
    }
    if board.has_more() {
        println!("(more posts available)");
    }

    println!();
    println!("== Upcoming events ==");
    for view in bulletin::view::project_all(board.upcoming(), config.viewer_id.as_deref()) {
        let span = view
            .event
            .as_ref()
            .and_then(|e| e.span_label.clone())
            .unwrap_or_default();
        println!("{:<23} {}", span, view.title);
    }

    println!();
    print_grid(&board.grid());
    Ok(())
}

fn print_post(view: &PostView) {
    let pin = if view.pinned { "[pinned] " } else { "" };
    println!(
        "{}{} | {} | {} ({} likes, {} comments)",
        pin, view.category_label, view.author, view.title, view.like_count, view.comment_count
    );
    if let Some(event) = &view.event {
        println!(
            "    when: {}  where: {}",
            event.span_label.as_deref().unwrap_or("?"),
            event.location.as_deref().unwrap_or("-")
        );
    }
}

fn print_grid(grid: &MonthGrid) {
    println!("== {} ==", grid.month.label());
    println!(" Mo  Tu  We  Th  Fr  Sa  Su");
    for week in grid.weeks() {
        let line: String = week
            .iter()
            .map(|cell| match cell {
                Some(day) if day.marked => format!("{:>3}*", day.day),
                Some(day) => format!("{:>3} ", day.day),
                None => "    ".to_string(),
            })
            .collect();
        println!("{}", line.trim_end());
    }
}
