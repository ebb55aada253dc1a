pub mod course;
pub mod feedback;
pub mod filter;
pub mod paging;
pub mod seed;
pub mod stats;
pub mod store;
pub mod user;

pub use course::db::CourseDbExt;
pub use feedback::db::FeedbackDbExt;
pub use stats::StatsDbExt;
pub use store::Store;
pub use user::db::UserDbExt;
