//! Demo records loaded into a fresh store.

use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use crate::data::course::Course;
use crate::data::feedback::{Feedback, Rating};
use crate::data::store::Store;
use crate::data::user::User;
use crate::error::{StoreError, StoreResult};
use crate::role::Role;

struct SeedUser {
    name: &'static str,
    email: &'static str,
    password: &'static str,
    role: Role,
}

static USERS: &[SeedUser] = &[
    SeedUser {
        name: "Admin",
        email: "admin@portal.local",
        password: "admin123",
        role: Role::Admin,
    },
    SeedUser {
        name: "Alice Johnson",
        email: "alice@portal.local",
        password: "alice123",
        role: Role::Student,
    },
    SeedUser {
        name: "Bob Smith",
        email: "bob@portal.local",
        password: "bob123",
        role: Role::Student,
    },
    SeedUser {
        name: "Charlie Brown",
        email: "charlie@portal.local",
        password: "charlie123",
        role: Role::Student,
    },
];

static COURSES: &[(&str, &str)] = &[
    (
        "Introduction to Programming",
        "Variables, control flow and functions from first principles.",
    ),
    (
        "Data Structures",
        "Lists, trees, hash maps and when to reach for each.",
    ),
    (
        "Web Development",
        "Building and deploying small web applications.",
    ),
];

/// (student email, course index, rating, message, days after epoch)
static FEEDBACK: &[(&str, usize, u8, &str, i64)] = &[
    ("alice@portal.local", 0, 5, "Clear explanations and good pacing.", 1),
    ("bob@portal.local", 0, 4, "Exercises could be harder.", 2),
    ("alice@portal.local", 1, 4, "Tree chapter was excellent.", 3),
    ("charlie@portal.local", 1, 3, "Too much theory for me.", 4),
    ("bob@portal.local", 2, 5, "Loved the final project.", 5),
    ("charlie@portal.local", 2, 2, "Setup instructions were outdated.", 6),
];

/// Stable id so seeded records keep their ids across restarts.
fn seed_id(key: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes())
}

fn seed_epoch() -> StoreResult<DateTime<Utc>> {
    Utc.with_ymd_and_hms(2024, 1, 8, 9, 0, 0)
        .single()
        .ok_or_else(|| StoreError::validation("seed", "invalid seed timestamp"))
}

/// Fills an empty store with demo users, courses and feedback. A store that
/// already holds records is left untouched.
pub async fn seed(store: &Store) -> StoreResult<()> {
    if !store.is_empty().await {
        tracing::info!("Store already has records, skipping seed.");
        return Ok(());
    }

    let epoch = seed_epoch()?;

    let mut users: Vec<User> = Vec::with_capacity(USERS.len());
    for it in USERS {
        let mut user = User::new(
            seed_id(it.email),
            it.name,
            it.email,
            store.hash_password(it.password).await?,
            it.role,
        );
        user.created_at = epoch;
        users.push(user);
    }

    let courses: Vec<Course> = COURSES
        .iter()
        .map(|(name, description)| Course {
            id: seed_id(name),
            name: name.to_string(),
            description: description.to_string(),
            link: None,
            thumbnail: None,
            created_at: epoch,
        })
        .collect();

    let mut feedback = Vec::with_capacity(FEEDBACK.len());
    for (email, course, rating, message, days) in FEEDBACK {
        let student = users
            .iter()
            .find(|it| it.email == *email)
            .ok_or_else(|| StoreError::validation("seed", format!("unknown student {}", email)))?;
        let course = courses
            .get(*course)
            .ok_or_else(|| StoreError::validation("seed", "unknown course"))?;

        feedback.push(Feedback {
            id: seed_id(&format!("{}/{}", email, course.name)),
            student_id: student.id,
            student_name: student.name.clone(),
            course_id: course.id,
            rating: Rating::new(*rating)?,
            message: message.to_string(),
            created_at: epoch + Duration::days(*days),
        });
    }

    let mut tables = store.write().await;
    let (user_count, course_count, feedback_count) = (users.len(), courses.len(), feedback.len());
    for user in users {
        tables.users.push_back(user);
    }
    for course in courses {
        tables.courses.push_back(course);
    }
    for entry in feedback {
        tables.feedback.push_front(entry);
    }
    tracing::info!(
        "Seeded {} users, {} courses and {} feedback entries.",
        user_count,
        course_count,
        feedback_count
    );

    Ok(())
}
