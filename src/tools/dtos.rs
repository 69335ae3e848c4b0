//! Data Transfer Objects (DTOs)

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------
// Auth
// ---------------------------------------------------------------

/// Sign-in credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Sign-in response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
}

/// Access/refresh token pair.
pub type AuthTokens = LoginResponse;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenResponse {
    pub access_token: String,
}

/// The signed-in administrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_version: Option<i64>,
}

// ---------------------------------------------------------------
// Gifticons
// ---------------------------------------------------------------

/// Gifticon grade, ordered by value tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Grade {
    Basic,
    Standard,
    Elite,
}

impl Grade {
    pub const ALL: [Grade; 3] = [Grade::Basic, Grade::Standard, Grade::Elite];

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::Basic => "BASIC",
            Grade::Standard => "STANDARD",
            Grade::Elite => "ELITE",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Grade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BASIC" => Ok(Grade::Basic),
            "STANDARD" => Ok(Grade::Standard),
            "ELITE" => Ok(Grade::Elite),
            other => Err(format!("unknown grade: {}", other)),
        }
    }
}

/// A gifticon record as listed by the admin collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gifticon {
    pub id: i64,
    pub code: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub expiration_date: DateTime<Utc>,
    pub grade: Grade,
    #[serde(default)]
    pub is_sent: bool,
    #[serde(default)]
    pub is_used: bool,
}

/// Body of the save-gifticon call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GifticonRequest {
    pub code: String,
    /// `YYYYMMDD`
    pub expiration_date_str: String,
    pub grade: Grade,
}

/// Body of the delete-gifticons call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GifticonDeleteRequest {
    pub ids: Vec<i64>,
}

/// Parses the timestamp formats the backend emits for expiration dates.
///
/// Accepts RFC 3339, a naive date-time (taken as UTC) or a bare date
/// (UTC midnight).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
}

// ---------------------------------------------------------------
// Dashboard, teams and users
// ---------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: u64,
    pub total_teams: u64,
    pub active_users: u64,
    pub new_users_this_month: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

/// A member account as listed in the users collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberModel {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: String,
    #[serde(default)]
    pub last_login: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamModel {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub members: Vec<MemberModel>,
    pub created_at: String,
    pub updated_at: String,
}
