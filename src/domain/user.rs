use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::actor_framework::Resource;
use crate::allocator::IdRange;
use crate::error::UserError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserStatus {
    type Err = UserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(UserStatus::Active),
            "inactive" => Ok(UserStatus::Inactive),
            other => Err(UserError::ValidationError(format!(
                "unknown user status: {other}"
            ))),
        }
    }
}

/// A user record as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "super::id_format::deserialize")]
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub status: UserStatus,
}

/// Payload for creating or replacing a user.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub location: String,
    pub status: UserStatus,
}

/// Partial update for an existing user.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub status: Option<UserStatus>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.username.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.phone.is_none()
            && self.location.is_none()
            && self.status.is_none()
    }
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Applies `patch` on top of this user, producing a full replacement payload.
    pub fn patched(&self, patch: UserPatch) -> UserDraft {
        UserDraft {
            id: Some(self.id.clone()),
            first_name: patch.first_name.unwrap_or_else(|| self.first_name.clone()),
            last_name: patch.last_name.unwrap_or_else(|| self.last_name.clone()),
            username: patch.username.unwrap_or_else(|| self.username.clone()),
            email: patch.email.unwrap_or_else(|| self.email.clone()),
            password: patch.password.unwrap_or_else(|| self.password.clone()),
            phone: patch.phone.unwrap_or_else(|| self.phone.clone()),
            location: patch.location.unwrap_or_else(|| self.location.clone()),
            status: patch.status.unwrap_or(self.status),
        }
    }
}

impl UserDraft {
    /// Checks that every required field is filled in.
    ///
    /// # Errors
    /// Returns [`UserError::MissingFields`] naming all blank required fields.
    pub fn validate(&self) -> Result<(), UserError> {
        let required = [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("username", &self.username),
            ("email", &self.email),
            ("password", &self.password),
        ];
        let missing: Vec<&'static str> = required
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(UserError::MissingFields(missing))
        }
    }
}

impl Resource for User {
    type Payload = UserDraft;

    const COLLECTION: &'static str = "users";
    const ID_RANGE: IdRange = IdRange::USERS;

    fn id(&self) -> &str {
        &self.id
    }

    fn proposed_id(payload: &UserDraft) -> Option<&str> {
        payload.id.as_deref()
    }

    fn with_proposed_id(mut payload: UserDraft, id: String) -> UserDraft {
        payload.id = Some(id);
        payload
    }

    fn from_payload(id: String, payload: UserDraft) -> Self {
        Self {
            id,
            first_name: payload.first_name,
            last_name: payload.last_name,
            username: payload.username,
            email: payload.email,
            password: payload.password,
            phone: payload.phone,
            location: payload.location,
            status: payload.status,
        }
    }
}
