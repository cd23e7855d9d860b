use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        // The API emits integer keys; they are kept as opaque strings client-side.
        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                match RawId::deserialize(deserializer)? {
                    RawId::Text(id) => Ok(Self(id)),
                    RawId::Number(id) => Ok(Self(id.to_string())),
                }
            }
        }

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

id_newtype!(UserId);
id_newtype!(ProfileId);
id_newtype!(CleaningId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleaningType {
    DustUp,
    #[default]
    SpotClean,
    FullClean,
}

impl CleaningType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DustUp => "dust_up",
            Self::SpotClean => "spot_clean",
            Self::FullClean => "full_clean",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "dust_up" => Some(Self::DustUp),
            "spot_clean" => Some(Self::SpotClean),
            "full_clean" => Some(Self::FullClean),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    Accepted,
    Rejected,
    #[default]
    Pending,
    Cancelled,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProfileId>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    pub user_id: UserId,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Public user record as returned by `/users/me/` and embedded in other resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
}

fn default_true() -> bool {
    true
}

/// Cleaning owners come back either as a bare id or as an embedded public user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Owner {
    User(Box<User>),
    Id(UserId),
}

impl Owner {
    pub fn id(&self) -> &UserId {
        match self {
            Self::User(user) => &user.id,
            Self::Id(id) => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningJob {
    pub id: CleaningId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub cleaning_type: CleaningType,
    pub owner: Owner,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub user_id: UserId,
    pub cleaning_id: CleaningId,
    #[serde(default)]
    pub status: OfferStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleaning: Option<CleaningJob>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    Cleaning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedEventType {
    IsCreate,
    IsUpdate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningFeedItem {
    #[serde(flatten)]
    pub cleaning: CleaningJob,
    #[serde(default)]
    pub row_number: Option<i64>,
    pub event_type: FeedEventType,
    pub event_timestamp: DateTime<Utc>,
}

impl CleaningFeedItem {
    /// A cleaning shows up once per event type in the feed.
    pub fn feed_key(&self) -> (CleaningId, FeedEventType) {
        (self.cleaning.id.clone(), self.event_type)
    }
}
