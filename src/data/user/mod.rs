use chrono::{DateTime, Utc};
use crypto::bcrypt::bcrypt;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

pub mod db;
pub mod profile;

use crate::data::store::Record;
use crate::role::Role;
use crate::security::Security;
use profile::Profile;

/// One-way password digest: bcrypt over the SHA-256 of the password.
#[derive(Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct PasswordHash([u8; 24]);

impl PasswordHash {
    pub fn new(password: impl AsRef<str>, security: &Security) -> PasswordHash {
        let mut pw_hash: [u8; 24] = [0; 24];

        let mut sha = Sha256::new();
        sha2::Digest::update(&mut sha, password.as_ref().as_bytes());

        bcrypt(
            security.password_cost,
            &security.salt,
            sha.finalize().as_slice(),
            &mut pw_hash,
        );

        PasswordHash(pw_hash)
    }
}

impl std::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub pw_hash: PasswordHash,
    pub role: Role,
    #[serde(default)]
    pub is_blocked: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub profile: Profile,
}

impl Record for User {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl User {
    pub fn new(
        id: Uuid,
        name: impl ToString,
        email: impl ToString,
        pw_hash: PasswordHash,
        role: Role,
    ) -> User {
        tracing::debug!("Creating a new {} with UUID: {}", role, id);

        User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            pw_hash,
            role,
            is_blocked: false,
            created_at: Utc::now(),
            profile: Profile::default(),
        }
    }

    pub fn is_student(&self) -> bool {
        self.role == Role::Student
    }
}
