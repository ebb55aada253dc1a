use serde::Deserialize;
use uuid::Uuid;

use crate::data::filter;
use crate::data::paging::{paginate, PageState, Paged};
use crate::data::store::Store;
use crate::error::{StoreError, StoreResult};
use crate::role::Role;
use crate::util;

use super::profile::ProfileUpdate;
use super::User;

pub mod problem {
    use crate::error::StoreError;
    use uuid::Uuid;

    #[inline]
    pub fn not_found(id: Uuid) -> StoreError {
        StoreError::NotFound { entity: "user", id }
    }

    #[inline]
    pub fn email_exists(email: impl ToString) -> StoreError {
        StoreError::EmailExists(email.to_string())
    }

    #[inline]
    pub fn bad_email(detail: impl ToString) -> StoreError {
        StoreError::validation("email", detail)
    }

    #[inline]
    pub fn bad_name(detail: impl ToString) -> StoreError {
        StoreError::validation("name", detail)
    }

    #[inline]
    pub fn bad_password(detail: impl ToString) -> StoreError {
        StoreError::validation("password", detail)
    }
}

#[derive(Clone, Deserialize)]
pub struct UserSignupData {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for UserSignupData {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "UserSignupData:{}", self.email)
    }
}

impl UserSignupData {
    pub fn new(name: impl ToString, email: impl ToString, password: impl ToString) -> Self {
        UserSignupData {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    pub fn validate(&self) -> StoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(problem::bad_name("Name can't be empty."));
        }

        if !util::is_valid_email(&self.email) {
            return Err(problem::bad_email("Not a valid e-mail address."));
        }

        validate_password(&self.password)
    }
}

fn validate_password(password: &str) -> StoreResult<()> {
    if password.is_empty() {
        return Err(problem::bad_password("Password can't be empty."));
    }

    if password.len() > 1024 {
        return Err(problem::bad_password(
            "Passwords longer than 1024 characters aren't supported.",
        ));
    }

    Ok(())
}

/// Fields a user may change about themselves. Identity (`id`) and `role`
/// aren't reachable from here; neither are password and block state, which
/// have their own operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(flatten)]
    pub profile: ProfileUpdate,
}

impl UserUpdate {
    pub fn validate(&self) -> StoreResult<()> {
        if matches!(&self.name, Some(name) if name.trim().is_empty()) {
            return Err(problem::bad_name("Name can't be empty."));
        }
        if matches!(&self.email, Some(email) if !util::is_valid_email(email)) {
            return Err(problem::bad_email("Not a valid e-mail address."));
        }
        Ok(())
    }
}

pub trait UserDbExt {
    /// Returns the user whose email and password both match.
    async fn authenticate(&self, email: &str, password: &str) -> StoreResult<User>;

    /// Creates a new, unblocked student.
    async fn register(&self, signup: UserSignupData) -> StoreResult<User>;

    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn update_user(&self, id: Uuid, update: UserUpdate) -> StoreResult<User>;
    async fn change_password(
        &self,
        id: Uuid,
        old_password: &str,
        new_password: &str,
    ) -> StoreResult<()>;
    async fn set_user_blocked(&self, id: Uuid, blocked: bool) -> StoreResult<User>;

    /// Removes the user and every feedback they wrote. Absent ids are a no-op.
    async fn delete_user(&self, id: Uuid) -> StoreResult<()>;

    /// Users ordered by name.
    async fn list_users(&self, page: PageState) -> StoreResult<Paged<User>>;
}

impl UserDbExt for Store {
    #[tracing::instrument(skip(self, password))]
    async fn authenticate(&self, email: &str, password: &str) -> StoreResult<User> {
        self.settle().await;
        let pw_hash = self.hash_password(password).await?;

        let tables = self.read().await;
        let user = tables
            .users
            .find(filter::by_email(email))
            .filter(|user| user.pw_hash == pw_hash)
            .ok_or(StoreError::InvalidCredentials)?;

        if user.is_blocked {
            tracing::info!("Rejected login of blocked user {}", user.id);
            return Err(StoreError::AccountBlocked);
        }

        Ok(user.clone())
    }

    #[tracing::instrument(skip(self))]
    async fn register(&self, signup: UserSignupData) -> StoreResult<User> {
        self.settle().await;
        signup.validate()?;
        let pw_hash = self.hash_password(&signup.password).await?;

        let mut tables = self.write().await;
        if tables.users.find(filter::by_email(&signup.email)).is_some() {
            return Err(problem::email_exists(&signup.email));
        }

        let user = User::new(
            Uuid::new_v4(),
            signup.name,
            signup.email,
            pw_hash,
            Role::Student,
        );
        tables.users.push_back(user.clone());
        tracing::info!("Registered user {}", user.id);

        Ok(user)
    }

    #[tracing::instrument(skip(self))]
    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        self.settle().await;
        Ok(self.read().await.users.get(id).cloned())
    }

    #[tracing::instrument(skip(self))]
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.settle().await;
        Ok(self
            .read()
            .await
            .users
            .find(filter::by_email(email))
            .cloned())
    }

    #[tracing::instrument(skip(self))]
    async fn update_user(&self, id: Uuid, update: UserUpdate) -> StoreResult<User> {
        self.settle().await;
        update.validate()?;

        let mut tables = self.write().await;
        if !tables.users.contains(id) {
            return Err(problem::not_found(id));
        }
        if let Some(email) = &update.email {
            let taken = tables
                .users
                .find(filter::by_email(email))
                .is_some_and(|other| other.id != id);
            if taken {
                return Err(problem::email_exists(email));
            }
        }

        let user = tables.users.get_mut(id).ok_or_else(|| problem::not_found(id))?;
        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(email) = update.email {
            user.email = email;
        }
        user.profile.merge(update.profile);

        Ok(user.clone())
    }

    #[tracing::instrument(skip(self, old_password, new_password))]
    async fn change_password(
        &self,
        id: Uuid,
        old_password: &str,
        new_password: &str,
    ) -> StoreResult<()> {
        self.settle().await;
        validate_password(new_password)?;
        let old_hash = self.hash_password(old_password).await?;
        let new_hash = self.hash_password(new_password).await?;

        let mut tables = self.write().await;
        let user = tables.users.get_mut(id).ok_or_else(|| problem::not_found(id))?;
        if user.pw_hash != old_hash {
            return Err(StoreError::WrongOldPassword);
        }
        user.pw_hash = new_hash;
        tracing::info!("Changed password of user {}", id);

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn set_user_blocked(&self, id: Uuid, blocked: bool) -> StoreResult<User> {
        self.settle().await;

        let mut tables = self.write().await;
        let user = tables.users.get_mut(id).ok_or_else(|| problem::not_found(id))?;
        user.is_blocked = blocked;

        Ok(user.clone())
    }

    #[tracing::instrument(skip(self))]
    async fn delete_user(&self, id: Uuid) -> StoreResult<()> {
        self.settle().await;

        let mut tables = self.write().await;
        let user = tables.users.remove(id);
        let removed = tables.feedback.retain(|it| !filter::by_student(id)(it));
        match user {
            Some(_) => tracing::info!("Deleted user {} and {} feedback entries", id, removed),
            None => tracing::debug!(
                "User {} already absent, dropped {} feedback entries",
                id,
                removed
            ),
        }

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn list_users(&self, page: PageState) -> StoreResult<Paged<User>> {
        self.settle().await;

        let mut users: Vec<User> = self.read().await.users.iter().cloned().collect();
        filter::by_name(&mut users);

        Ok(paginate(users, page))
    }
}
