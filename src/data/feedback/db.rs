use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::{Feedback, Rating};
use crate::data::filter::{self, FeedbackFilter};
use crate::data::paging::{paginate, PageState, Paged};
use crate::data::store::Store;
use crate::error::StoreResult;

pub mod problem {
    use crate::error::StoreError;
    use uuid::Uuid;

    #[inline]
    pub fn not_found(id: Uuid) -> StoreError {
        StoreError::NotFound {
            entity: "feedback",
            id,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackCreateData {
    pub student_id: Uuid,
    /// Snapshot of the author's current name.
    pub student_name: String,
    pub course_id: Uuid,
    pub rating: Rating,
    #[serde(default)]
    pub message: String,
}

/// Author fields (`student_id`, `student_name`) can't be changed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackUpdate {
    #[serde(default)]
    pub course_id: Option<Uuid>,
    #[serde(default)]
    pub rating: Option<Rating>,
    #[serde(default)]
    pub message: Option<String>,
}

pub trait FeedbackDbExt {
    /// Stores new feedback in front of all existing entries.
    async fn create_feedback(&self, feedback: FeedbackCreateData) -> StoreResult<Feedback>;
    async fn update_feedback(&self, id: Uuid, update: FeedbackUpdate) -> StoreResult<Feedback>;
    async fn delete_feedback(&self, id: Uuid) -> StoreResult<()>;

    async fn get_feedback(&self, id: Uuid) -> StoreResult<Option<Feedback>>;
    /// Entries in stored order, without sorting or filtering.
    async fn raw_feedback(&self) -> StoreResult<Vec<Feedback>>;

    /// A student's feedback, newest first.
    async fn list_feedback_by_student(
        &self,
        student_id: Uuid,
        page: PageState,
    ) -> StoreResult<Paged<Feedback>>;
    /// Feedback matching `criteria`, newest first.
    async fn list_all_feedback(
        &self,
        page: PageState,
        criteria: FeedbackFilter,
    ) -> StoreResult<Paged<Feedback>>;
}

impl FeedbackDbExt for Store {
    #[tracing::instrument(skip(self))]
    async fn create_feedback(&self, feedback: FeedbackCreateData) -> StoreResult<Feedback> {
        self.settle().await;

        let feedback = Feedback {
            id: Uuid::new_v4(),
            student_id: feedback.student_id,
            student_name: feedback.student_name,
            course_id: feedback.course_id,
            rating: feedback.rating,
            message: feedback.message,
            created_at: Utc::now(),
        };
        self.write().await.feedback.push_front(feedback.clone());
        tracing::info!("Created feedback {}", feedback.id);

        Ok(feedback)
    }

    #[tracing::instrument(skip(self))]
    async fn update_feedback(&self, id: Uuid, update: FeedbackUpdate) -> StoreResult<Feedback> {
        self.settle().await;

        let mut tables = self.write().await;
        let feedback = tables
            .feedback
            .get_mut(id)
            .ok_or_else(|| problem::not_found(id))?;

        if let Some(course_id) = update.course_id {
            feedback.course_id = course_id;
        }
        if let Some(rating) = update.rating {
            feedback.rating = rating;
        }
        if let Some(message) = update.message {
            feedback.message = message;
        }

        Ok(feedback.clone())
    }

    #[tracing::instrument(skip(self))]
    async fn delete_feedback(&self, id: Uuid) -> StoreResult<()> {
        self.settle().await;
        if self.write().await.feedback.remove(id).is_some() {
            tracing::info!("Deleted feedback {}", id);
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn get_feedback(&self, id: Uuid) -> StoreResult<Option<Feedback>> {
        self.settle().await;
        Ok(self.read().await.feedback.get(id).cloned())
    }

    #[tracing::instrument(skip(self))]
    async fn raw_feedback(&self) -> StoreResult<Vec<Feedback>> {
        self.settle().await;
        Ok(self.read().await.feedback.iter().cloned().collect())
    }

    #[tracing::instrument(skip(self))]
    async fn list_feedback_by_student(
        &self,
        student_id: Uuid,
        page: PageState,
    ) -> StoreResult<Paged<Feedback>> {
        self.settle().await;

        let by_student = filter::by_student(student_id);
        let mut feedback: Vec<Feedback> = self
            .read()
            .await
            .feedback
            .iter()
            .filter(|&it| by_student(it))
            .cloned()
            .collect();
        filter::newest_first(&mut feedback);

        Ok(paginate(feedback, page))
    }

    #[tracing::instrument(skip(self))]
    async fn list_all_feedback(
        &self,
        page: PageState,
        criteria: FeedbackFilter,
    ) -> StoreResult<Paged<Feedback>> {
        self.settle().await;

        let mut feedback: Vec<Feedback> = self
            .read()
            .await
            .feedback
            .iter()
            .filter(|&it| criteria.matches(it))
            .cloned()
            .collect();
        filter::newest_first(&mut feedback);

        Ok(paginate(feedback, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::store::test_util::test_store;
    use crate::data::user::db::{UserDbExt, UserSignupData, UserUpdate};
    use chrono::{Duration, TimeZone};

    fn rating(value: u8) -> Rating {
        Rating::new(value).expect("valid rating")
    }

    fn entry(student_id: Uuid, course_id: Uuid, stars: u8) -> FeedbackCreateData {
        FeedbackCreateData {
            student_id,
            student_name: "Student".to_string(),
            course_id,
            rating: rating(stars),
            message: format!("{} stars", stars),
        }
    }

    #[tokio::test]
    async fn new_feedback_goes_first_in_raw_order() {
        let store = test_store();
        let student = Uuid::new_v4();
        let course = Uuid::new_v4();

        let mut ids = Vec::new();
        for stars in [1, 2, 3] {
            ids.push(
                store
                    .create_feedback(entry(student, course, stars))
                    .await
                    .expect("created")
                    .id,
            );
        }

        let raw: Vec<Uuid> = store
            .raw_feedback()
            .await
            .expect("raw")
            .into_iter()
            .map(|it| it.id)
            .collect();
        ids.reverse();
        assert_eq!(raw, ids);
    }

    #[tokio::test]
    async fn student_listing_resorts_by_creation_time() {
        let store = test_store();
        let student = Uuid::new_v4();
        let course = Uuid::new_v4();
        let base = Utc
            .with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp");

        // Stored order deliberately disagrees with creation time.
        {
            let mut tables = store.write().await;
            for (offset, stars) in [(2, 3), (0, 1), (3, 4), (1, 2)] {
                tables.feedback.push_back(Feedback {
                    id: Uuid::new_v4(),
                    student_id: student,
                    student_name: "Student".to_string(),
                    course_id: course,
                    rating: rating(stars),
                    message: String::new(),
                    created_at: base + Duration::days(offset),
                });
            }
        }

        let listed = store
            .list_feedback_by_student(student, PageState::new(1, 10).expect("page"))
            .await
            .expect("listed");
        let stars: Vec<u8> = listed.items.iter().map(|it| it.rating.get()).collect();
        assert_eq!(stars, vec![4, 3, 2, 1]);
    }

    #[tokio::test]
    async fn student_feedback_pages() {
        let store = test_store();
        let student = Uuid::new_v4();
        let someone_else = Uuid::new_v4();
        let course = Uuid::new_v4();

        for _ in 0..22 {
            store
                .create_feedback(entry(student, course, 3))
                .await
                .expect("created");
        }
        store
            .create_feedback(entry(someone_else, course, 3))
            .await
            .expect("created");

        let page = |n| PageState::new(n, 5).expect("page");
        let first = store
            .list_feedback_by_student(student, page(1))
            .await
            .expect("listed");
        assert_eq!(first.items.len(), 5);
        assert_eq!(first.total, 22);
        assert_eq!(first.total_pages, 5);

        let fifth = store
            .list_feedback_by_student(student, page(5))
            .await
            .expect("listed");
        assert_eq!(fifth.items.len(), 2);

        let sixth = store
            .list_feedback_by_student(student, page(6))
            .await
            .expect("listed");
        assert!(sixth.items.is_empty());
        assert_eq!(sixth.total_pages, 5);
    }

    #[tokio::test]
    async fn filters_are_combined() {
        let store = test_store();
        let student = Uuid::new_v4();
        let rust = Uuid::new_v4();
        let web = Uuid::new_v4();

        for (course, stars) in [(rust, 5), (rust, 3), (web, 5), (rust, 5), (web, 1)] {
            store
                .create_feedback(entry(student, course, stars))
                .await
                .expect("created");
        }

        let all = PageState::unbounded();
        let count = |paged: Paged<Feedback>| paged.total;

        let listed = store.list_all_feedback(all, FeedbackFilter::default()).await;
        assert_eq!(listed.map(count), Ok(5));
        let listed = store.list_all_feedback(all, FeedbackFilter::course(rust)).await;
        assert_eq!(listed.map(count), Ok(3));
        let listed = store
            .list_all_feedback(all, FeedbackFilter::rating(rating(5)))
            .await;
        assert_eq!(listed.map(count), Ok(3));

        let both = store
            .list_all_feedback(all, FeedbackFilter::course(rust).with_rating(rating(5)))
            .await
            .expect("listed");
        assert_eq!(both.total, 2);
        assert!(both
            .items
            .iter()
            .all(|it| it.course_id == rust && it.rating.get() == 5));
        assert_eq!(both.total_pages, 1);
    }

    #[tokio::test]
    async fn filtered_listing_is_newest_first() {
        let store = test_store();
        let student = Uuid::new_v4();
        let rust = Uuid::new_v4();
        let web = Uuid::new_v4();
        let base = Utc
            .with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp");

        {
            let mut tables = store.write().await;
            let rows = [
                (4, rust, 1),
                (0, rust, 2),
                (5, web, 5),
                (2, rust, 3),
                (1, rust, 4),
                (3, rust, 5),
            ];
            for (offset, course, stars) in rows {
                tables.feedback.push_back(Feedback {
                    id: Uuid::new_v4(),
                    student_id: student,
                    student_name: "Student".to_string(),
                    course_id: course,
                    rating: rating(stars),
                    message: String::new(),
                    created_at: base + Duration::days(offset),
                });
            }
        }

        let second = store
            .list_all_feedback(
                PageState::new(2, 2).expect("page"),
                FeedbackFilter::course(rust),
            )
            .await
            .expect("listed");
        let stars: Vec<u8> = second.items.iter().map(|it| it.rating.get()).collect();
        assert_eq!(stars, vec![3, 4]);
        assert_eq!(second.total, 5);
        assert_eq!(second.total_pages, 3);
    }

    #[tokio::test]
    async fn update_and_delete_feedback() {
        let store = test_store();
        let created = store
            .create_feedback(entry(Uuid::new_v4(), Uuid::new_v4(), 2))
            .await
            .expect("created");

        let updated = store
            .update_feedback(
                created.id,
                FeedbackUpdate {
                    rating: Some(rating(4)),
                    ..Default::default()
                },
            )
            .await
            .expect("updated");
        assert_eq!(updated.rating.get(), 4);
        assert_eq!(updated.message, created.message);
        assert_eq!(updated.created_at, created.created_at);

        store.delete_feedback(created.id).await.expect("deleted");
        assert_eq!(store.get_feedback(created.id).await.expect("lookup"), None);
        store.delete_feedback(created.id).await.expect("deleting twice is fine");

        assert_eq!(
            store
                .update_feedback(created.id, FeedbackUpdate::default())
                .await,
            Err(problem::not_found(created.id))
        );
    }

    #[tokio::test]
    async fn student_name_is_a_snapshot_not_live() {
        let store = test_store();
        let student = store
            .register(UserSignupData::new("Grace", "grace@example.com", "pw"))
            .await
            .expect("registered");

        let created = store
            .create_feedback(FeedbackCreateData {
                student_name: student.name.clone(),
                ..entry(student.id, Uuid::new_v4(), 5)
            })
            .await
            .expect("created");

        store
            .update_user(
                student.id,
                UserUpdate {
                    name: Some("Grace Hopper".to_string()),
                    ..Default::default()
                },
            )
            .await
            .expect("renamed");

        let stored = store
            .get_feedback(created.id)
            .await
            .expect("lookup")
            .expect("feedback exists");
        assert_eq!(stored.student_name, "Grace");
    }
}
