//! Admin settings
//!
//! Operator preferences, persisted in the `[settings]` table of the config
//! file and edited by dotted path (`system.theme`, `notifications.email`).

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

const PROFILE_VISIBILITIES: &[&str] = &["public", "private", "friends"];
const LANGUAGES: &[&str] = &["ko", "en", "ja"];
const TIMEZONES: &[&str] = &["Asia/Seoul", "UTC", "America/New_York"];
const THEMES: &[&str] = &["light", "dark", "auto"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub email: bool,
    pub push: bool,
    pub sms: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email: true,
            push: false,
            sms: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivacySettings {
    pub profile_visibility: String,
    pub data_sharing: bool,
}

impl Default for PrivacySettings {
    fn default() -> Self {
        Self {
            profile_visibility: "public".to_string(),
            data_sharing: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemSettings {
    pub language: String,
    pub timezone: String,
    pub theme: String,
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            language: "ko".to_string(),
            timezone: "Asia/Seoul".to_string(),
            theme: "light".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminSettings {
    pub notifications: NotificationSettings,
    pub privacy: PrivacySettings,
    pub system: SystemSettings,
}

impl AdminSettings {
    /// Every settable path, in display order.
    pub const PATHS: [&'static str; 8] = [
        "notifications.email",
        "notifications.push",
        "notifications.sms",
        "privacy.profile_visibility",
        "privacy.data_sharing",
        "system.language",
        "system.timezone",
        "system.theme",
    ];

    /// Returns the value at `path` rendered as text.
    pub fn get(&self, path: &str) -> Result<String> {
        let value = match normalize(path)?.as_str() {
            "notifications.email" => self.notifications.email.to_string(),
            "notifications.push" => self.notifications.push.to_string(),
            "notifications.sms" => self.notifications.sms.to_string(),
            "privacy.profile_visibility" => self.privacy.profile_visibility.clone(),
            "privacy.data_sharing" => self.privacy.data_sharing.to_string(),
            "system.language" => self.system.language.clone(),
            "system.timezone" => self.system.timezone.clone(),
            "system.theme" => self.system.theme.clone(),
            other => return Err(unknown(other)),
        };
        Ok(value)
    }

    /// Sets the value at `path`. Unknown paths and values outside the
    /// accepted set are rejected without changing anything.
    pub fn set(&mut self, path: &str, value: &str) -> Result<()> {
        let path = normalize(path)?;
        let value = value.trim();

        match path.as_str() {
            "notifications.email" => self.notifications.email = parse_bool(&path, value)?,
            "notifications.push" => self.notifications.push = parse_bool(&path, value)?,
            "notifications.sms" => self.notifications.sms = parse_bool(&path, value)?,
            "privacy.profile_visibility" => {
                self.privacy.profile_visibility = one_of(&path, value, PROFILE_VISIBILITIES)?
            }
            "privacy.data_sharing" => self.privacy.data_sharing = parse_bool(&path, value)?,
            "system.language" => self.system.language = one_of(&path, value, LANGUAGES)?,
            "system.timezone" => self.system.timezone = one_of(&path, value, TIMEZONES)?,
            "system.theme" => self.system.theme = one_of(&path, value, THEMES)?,
            other => return Err(unknown(other)),
        }

        tracing::debug!("Setting {} = {}", path, value);
        Ok(())
    }
}

impl fmt::Display for AdminSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for path in Self::PATHS {
            if let Ok(value) = self.get(path) {
                writeln!(f, "{:<28} {}", path, value)?;
            }
        }
        Ok(())
    }
}

/// Maps `privacy.profileVisibility` and friends onto the snake_case path.
fn normalize(path: &str) -> Result<String> {
    let mut normalized = String::with_capacity(path.len());
    for c in path.trim().chars() {
        if c.is_ascii_uppercase() {
            normalized.push('_');
            normalized.push(c.to_ascii_lowercase());
        } else {
            normalized.push(c);
        }
    }

    if AdminSettings::PATHS.contains(&normalized.as_str()) {
        Ok(normalized)
    } else {
        Err(unknown(path))
    }
}

fn unknown(path: &str) -> Error {
    Error::Validation(format!("unknown setting: {}", path))
}

fn parse_bool(path: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(Error::Validation(format!(
            "{} expects true or false, got {:?}",
            path, value
        ))),
    }
}

fn one_of(path: &str, value: &str, allowed: &[&str]) -> Result<String> {
    allowed
        .iter()
        .find(|candidate| candidate.eq_ignore_ascii_case(value))
        .map(|candidate| candidate.to_string())
        .ok_or_else(|| {
            Error::Validation(format!(
                "{} must be one of {}, got {:?}",
                path,
                allowed.join(", "),
                value
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = AdminSettings::default();
        assert!(settings.notifications.email);
        assert!(!settings.notifications.push);
        assert_eq!(settings.privacy.profile_visibility, "public");
        assert_eq!(settings.system.language, "ko");
        assert_eq!(settings.system.timezone, "Asia/Seoul");
        assert_eq!(settings.system.theme, "light");
    }

    #[test]
    fn test_set_by_path() {
        let mut settings = AdminSettings::default();
        settings.set("system.theme", "Dark").unwrap();
        settings.set("notifications.push", "on").unwrap();
        settings.set("privacy.profileVisibility", "friends").unwrap();
        settings.set("system.timezone", "utc").unwrap();

        assert_eq!(settings.system.theme, "dark");
        assert!(settings.notifications.push);
        assert_eq!(settings.get("privacy.profile_visibility").unwrap(), "friends");
        assert_eq!(settings.system.timezone, "UTC");
    }

    #[test]
    fn test_set_rejects_invalid_input() {
        let mut settings = AdminSettings::default();
        assert!(matches!(settings.set("system.font", "x"), Err(Error::Validation(_))));
        assert!(matches!(settings.set("system.theme", "neon"), Err(Error::Validation(_))));
        assert!(matches!(
            settings.set("notifications.sms", "maybe"),
            Err(Error::Validation(_))
        ));
        assert_eq!(settings, AdminSettings::default());
    }

    #[test]
    fn test_every_path_round_trips_through_get() {
        let settings = AdminSettings::default();
        assert_eq!(settings.get("system.theme").unwrap(), "light");
        assert_eq!(settings.get("system.timezone").unwrap(), "Asia/Seoul");
        for path in AdminSettings::PATHS {
            assert!(settings.get(path).is_ok(), "{}", path);
        }
        assert!(matches!(settings.get("system"), Err(Error::Validation(_))));
    }

    #[test]
    fn test_display_lists_every_path() {
        let rendered = AdminSettings::default().to_string();
        assert_eq!(rendered.lines().count(), AdminSettings::PATHS.len());
        assert!(rendered.contains("system.theme"));
    }
}
