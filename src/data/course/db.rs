use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::Course;
use crate::data::paging::{paginate, PageState, Paged};
use crate::data::store::Store;
use crate::error::StoreResult;

pub mod problem {
    use crate::error::StoreError;
    use uuid::Uuid;

    #[inline]
    pub fn not_found(id: Uuid) -> StoreError {
        StoreError::NotFound {
            entity: "course",
            id,
        }
    }

    #[inline]
    pub fn bad_name(detail: impl ToString) -> StoreError {
        StoreError::validation("name", detail)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourseCreateData {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

impl CourseCreateData {
    pub fn validate(&self) -> StoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(problem::bad_name("Course name can't be empty."));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourseUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

impl CourseUpdate {
    pub fn name(name: impl ToString) -> CourseUpdate {
        CourseUpdate {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> StoreResult<()> {
        match &self.name {
            Some(name) if name.trim().is_empty() => {
                Err(problem::bad_name("Course name can't be empty."))
            }
            _ => Ok(()),
        }
    }
}

pub trait CourseDbExt {
    /// Every course in creation order.
    async fn list_courses(&self) -> StoreResult<Vec<Course>>;
    async fn list_courses_paged(&self, page: PageState) -> StoreResult<Paged<Course>>;

    async fn get_course(&self, id: Uuid) -> StoreResult<Option<Course>>;
    /// Display name for a course id; `None` when the course was deleted.
    async fn course_name(&self, id: Uuid) -> StoreResult<Option<String>>;

    async fn create_course(&self, course: CourseCreateData) -> StoreResult<Course>;
    async fn update_course(&self, id: Uuid, update: CourseUpdate) -> StoreResult<Course>;
    /// Feedback pointing at the course is left in place.
    async fn delete_course(&self, id: Uuid) -> StoreResult<()>;
}

impl CourseDbExt for Store {
    #[tracing::instrument(skip(self))]
    async fn list_courses(&self) -> StoreResult<Vec<Course>> {
        self.settle().await;
        Ok(self.read().await.courses.iter().cloned().collect())
    }

    #[tracing::instrument(skip(self))]
    async fn list_courses_paged(&self, page: PageState) -> StoreResult<Paged<Course>> {
        self.settle().await;
        let courses = self.read().await.courses.iter().cloned().collect();
        Ok(paginate(courses, page))
    }

    #[tracing::instrument(skip(self))]
    async fn get_course(&self, id: Uuid) -> StoreResult<Option<Course>> {
        self.settle().await;
        Ok(self.read().await.courses.get(id).cloned())
    }

    #[tracing::instrument(skip(self))]
    async fn course_name(&self, id: Uuid) -> StoreResult<Option<String>> {
        self.settle().await;
        Ok(self
            .read()
            .await
            .courses
            .get(id)
            .map(|course| course.name.clone()))
    }

    #[tracing::instrument(skip(self))]
    async fn create_course(&self, course: CourseCreateData) -> StoreResult<Course> {
        self.settle().await;
        course.validate()?;

        let course = Course {
            id: Uuid::new_v4(),
            name: course.name,
            description: course.description,
            link: course.link,
            thumbnail: course.thumbnail,
            created_at: Utc::now(),
        };
        self.write().await.courses.push_back(course.clone());
        tracing::info!("Created course {}", course.id);

        Ok(course)
    }

    #[tracing::instrument(skip(self))]
    async fn update_course(&self, id: Uuid, update: CourseUpdate) -> StoreResult<Course> {
        self.settle().await;
        update.validate()?;

        let mut tables = self.write().await;
        let course = tables
            .courses
            .get_mut(id)
            .ok_or_else(|| problem::not_found(id))?;

        if let Some(name) = update.name {
            course.name = name;
        }
        if let Some(description) = update.description {
            course.description = description;
        }
        if let Some(link) = update.link {
            course.link = Some(link);
        }
        if let Some(thumbnail) = update.thumbnail {
            course.thumbnail = Some(thumbnail);
        }

        Ok(course.clone())
    }

    #[tracing::instrument(skip(self))]
    async fn delete_course(&self, id: Uuid) -> StoreResult<()> {
        self.settle().await;
        if self.write().await.courses.remove(id).is_some() {
            tracing::info!("Deleted course {}", id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::feedback::db::{FeedbackCreateData, FeedbackDbExt};
    use crate::data::feedback::Rating;
    use crate::data::filter::FeedbackFilter;
    use crate::data::store::test_util::test_store;
    use crate::error::StoreError;

    fn course(name: &str) -> CourseCreateData {
        CourseCreateData {
            name: name.to_string(),
            description: format!("All about {}", name),
            link: Some(format!("https://courses.example.com/{}", name)),
            thumbnail: None,
        }
    }

    #[tokio::test]
    async fn update_then_fetch_changes_only_name() {
        let store = test_store();
        let created = store.create_course(course("rust")).await.expect("created");

        store
            .update_course(created.id, CourseUpdate::name("X"))
            .await
            .expect("updated");

        let fetched = store
            .get_course(created.id)
            .await
            .expect("lookup")
            .expect("course exists");
        assert_eq!(fetched.name, "X");
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.description, created.description);
        assert_eq!(fetched.link, created.link);
        assert_eq!(fetched.thumbnail, created.thumbnail);
        assert_eq!(fetched.created_at, created.created_at);
    }

    #[tokio::test]
    async fn courses_keep_creation_order() {
        let store = test_store();
        for name in ["c", "a", "b"] {
            store.create_course(course(name)).await.expect("created");
        }

        let names: Vec<String> = store
            .list_courses()
            .await
            .expect("listed")
            .into_iter()
            .map(|it| it.name)
            .collect();
        assert_eq!(names, vec!["c", "a", "b"]);

        let paged = store
            .list_courses_paged(PageState::new(2, 2).expect("page"))
            .await
            .expect("listed");
        assert_eq!(paged.total_pages, 2);
        assert_eq!(paged.items.len(), 1);
        assert_eq!(paged.items[0].name, "b");
    }

    #[tokio::test]
    async fn update_missing_course_fails() {
        let store = test_store();
        let id = Uuid::new_v4();
        assert_eq!(
            store.update_course(id, CourseUpdate::name("X")).await,
            Err(problem::not_found(id))
        );
    }

    #[tokio::test]
    async fn empty_name_is_rejected() {
        let store = test_store();
        assert!(matches!(
            store.create_course(course("  ")).await,
            Err(StoreError::Validation { field: "name", .. })
        ));
        assert!(store.list_courses().await.expect("listed").is_empty());
    }

    #[tokio::test]
    async fn delete_leaves_feedback_dangling() {
        let store = test_store();
        let created = store.create_course(course("rust")).await.expect("created");
        store
            .create_feedback(FeedbackCreateData {
                student_id: Uuid::new_v4(),
                student_name: "Alice".to_string(),
                course_id: created.id,
                rating: Rating::new(5).expect("valid rating"),
                message: "great".to_string(),
            })
            .await
            .expect("feedback created");

        store.delete_course(created.id).await.expect("deleted");
        store.delete_course(created.id).await.expect("deleting twice is fine");

        assert_eq!(store.course_name(created.id).await.expect("lookup"), None);
        let orphaned = store
            .list_all_feedback(PageState::unbounded(), FeedbackFilter::course(created.id))
            .await
            .expect("listed");
        assert_eq!(orphaned.total, 1);
    }
}
