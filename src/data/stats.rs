use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::data::store::Store;
use crate::error::StoreResult;
use crate::util;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Admins aren't counted.
    pub student_count: usize,
    pub feedback_count: usize,
    pub course_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRating {
    pub course_id: Uuid,
    pub course_name: String,
    /// Mean rating rounded to two decimals; 0.0 without feedback.
    pub average_rating: f64,
}

pub trait StatsDbExt {
    async fn dashboard_stats(&self) -> StoreResult<DashboardStats>;

    /// Average rating of every course, best rated first.
    async fn course_ratings(&self) -> StoreResult<Vec<CourseRating>>;
}

impl StatsDbExt for Store {
    #[tracing::instrument(skip(self))]
    async fn dashboard_stats(&self) -> StoreResult<DashboardStats> {
        self.settle().await;

        let tables = self.read().await;
        Ok(DashboardStats {
            student_count: tables.users.iter().filter(|it| it.is_student()).count(),
            feedback_count: tables.feedback.len(),
            course_count: tables.courses.len(),
        })
    }

    #[tracing::instrument(skip(self))]
    async fn course_ratings(&self) -> StoreResult<Vec<CourseRating>> {
        self.settle().await;

        let tables = self.read().await;
        let mut sums: HashMap<Uuid, (u32, u32)> = HashMap::new();
        for feedback in tables.feedback.iter() {
            let (total, count) = sums.entry(feedback.course_id).or_default();
            *total += u32::from(feedback.rating.get());
            *count += 1;
        }

        let mut ratings: Vec<CourseRating> = tables
            .courses
            .iter()
            .map(|course| {
                let (total, count) = sums.get(&course.id).copied().unwrap_or_default();
                // An unrated course divides by 1, giving 0.0.
                let average = f64::from(total) / f64::from(count.max(1));
                CourseRating {
                    course_id: course.id,
                    course_name: course.name.clone(),
                    average_rating: util::round2(average),
                }
            })
            .collect();
        ratings.sort_by(|a, b| b.average_rating.total_cmp(&a.average_rating));

        Ok(ratings)
    }
}
