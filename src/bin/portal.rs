use feedback_portal::data::{CourseDbExt, StatsDbExt, UserDbExt};
use serde_json::json;
use tracing::Level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    #[cfg(debug_assertions)]
    let level = Some(Level::DEBUG);
    #[cfg(not(debug_assertions))]
    let level = Some(Level::INFO);

    let store = feedback_portal::create(level).await?;

    let stats = store.dashboard_stats().await?;
    tracing::info!(
        "{} students, {} courses, {} feedback entries",
        stats.student_count,
        stats.course_count,
        stats.feedback_count
    );

    let ratings = store.course_ratings().await?;
    for rating in &ratings {
        tracing::info!("{}: {:.2}", rating.course_name, rating.average_rating);
    }

    let users = store.list_users(store.config().page_state(1)?).await?;
    let courses = store.list_courses().await?;

    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "stats": stats,
            "courseRatings": ratings,
            "courses": courses,
            "users": users,
        }))?
    );

    store.shutdown().await;
    Ok(())
}
