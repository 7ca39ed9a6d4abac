//! Identities used for provenance attribution

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Valid,
    Pending,
    Invalid,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Pending => "pending",
            Self::Invalid => "invalid",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "valid" => Some(Self::Valid),
            "pending" => Some(Self::Pending),
            "invalid" => Some(Self::Invalid),
            _ => None,
        }
    }
}

/// A user that can contribute or validate contexts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: String,
    pub status: UserStatus,
}

/// The identity stamped as contributor and validator on ingested records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionActor {
    pub user_id: String,
    pub username: String,
}

impl From<&User> for IngestionActor {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            username: user.username.clone(),
        }
    }
}

/// Lookup of identities by username
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    /// Find a user by exact username
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Return the user with this username, creating an administrator if missing
    async fn ensure_user(&self, username: &str) -> Result<User>;

    /// Count users
    async fn count_users(&self) -> Result<u64>;
}
