use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Optional contact details a user may fill in after signup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Shallow profile merge: only fields that are `Some` are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub address: Option<String>,
}

impl Profile {
    pub fn merge(&mut self, update: ProfileUpdate) {
        if let Some(picture) = update.profile_picture {
            self.profile_picture = Some(picture);
        }
        if let Some(phone) = update.phone_number {
            self.phone_number = Some(phone);
        }
        if let Some(date) = update.date_of_birth {
            self.date_of_birth = Some(date);
        }
        if let Some(address) = update.address {
            self.address = Some(address);
        }
    }
}
