use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod db;

use crate::data::store::Record;
use crate::error::{StoreError, StoreResult};

/// Whole-star rating, 1 through 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> StoreResult<Rating> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Rating(value))
        } else {
            Err(StoreError::validation(
                "rating",
                format!("{} isn't between {} and {}", value, Self::MIN, Self::MAX),
            ))
        }
    }

    #[inline]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = StoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Rating::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: Uuid,
    pub student_id: Uuid,
    /// Name of the student when the feedback was written. Later renames
    /// aren't reflected here.
    pub student_name: String,
    pub course_id: Uuid,
    pub rating: Rating,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Record for Feedback {
    fn id(&self) -> Uuid {
        self.id
    }
}
