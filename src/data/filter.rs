use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::feedback::{Feedback, Rating};
use super::user::User;

/// Exact, case-sensitive email match.
pub fn by_email(email: &str) -> impl Fn(&User) -> bool + '_ {
    move |user| user.email == email
}

pub fn by_student(student_id: Uuid) -> impl Fn(&Feedback) -> bool {
    move |feedback| feedback.student_id == student_id
}

/// Optional feedback conditions. Present conditions are AND-ed; an empty
/// filter matches everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackFilter {
    #[serde(default)]
    pub course_id: Option<Uuid>,
    #[serde(default)]
    pub rating: Option<Rating>,
}

impl FeedbackFilter {
    pub fn course(course_id: Uuid) -> FeedbackFilter {
        FeedbackFilter {
            course_id: Some(course_id),
            rating: None,
        }
    }

    pub fn rating(rating: Rating) -> FeedbackFilter {
        FeedbackFilter {
            course_id: None,
            rating: Some(rating),
        }
    }

    pub fn with_rating(mut self, rating: Rating) -> FeedbackFilter {
        self.rating = Some(rating);
        self
    }

    pub fn matches(&self, feedback: &Feedback) -> bool {
        self.course_id.map_or(true, |id| feedback.course_id == id)
            && self.rating.map_or(true, |rating| feedback.rating == rating)
    }
}

/// Newest first. Stable, so equal timestamps keep their stored order.
pub fn newest_first(feedback: &mut [Feedback]) {
    feedback.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Name order that ignores case first and falls back to exact order, so the
/// result is total and stable across runs.
pub fn by_name(users: &mut [User]) {
    users.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });
}
