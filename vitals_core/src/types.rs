//! Core domain types for the Vitals system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Profile attributes (gender, activity level, calorie goal)
//! - Daily health records and the unvalidated entries they are built from
//! - BMI snapshots
//! - User accounts as persisted in the user database

use crate::config::Limits;
use crate::history::BmiHistory;
use crate::records::RecordStore;
use crate::{Error, Result};
use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Timestamp layout used throughout the user database
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local time truncated to whole seconds
pub fn now_local() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

// ============================================================================
// Profile Attributes
// ============================================================================

/// Gender as used by the Mifflin-St Jeor formula
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    #[default]
    Male,
    /// Older databases may store "other", which takes the female constant
    #[serde(alias = "other")]
    Female,
}

impl FromStr for Gender {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            other => Err(Error::validation(format!(
                "Unknown gender '{}' (expected male or female)",
                other
            ))),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "male"),
            Gender::Female => write!(f, "female"),
        }
    }
}

/// Physical activity level with its TDEE multiplier
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    #[default]
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::Light,
        ActivityLevel::Moderate,
        ActivityLevel::Active,
        ActivityLevel::VeryActive,
    ];

    /// Multiplier applied to BMR to get TDEE
    pub fn multiplier(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Active => "active",
            ActivityLevel::VeryActive => "very_active",
        }
    }
}

impl FromStr for ActivityLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        ActivityLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == normalized)
            .ok_or_else(|| {
                Error::validation(format!(
                    "Unknown activity level '{}' (expected sedentary, light, moderate, active or very_active)",
                    s
                ))
            })
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weight goal driving the calorie target
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    Lose,
    #[default]
    Maintain,
    Gain,
}

impl Goal {
    /// Daily calorie adjustment relative to TDEE
    pub fn adjustment(self) -> f64 {
        match self {
            Goal::Lose => -500.0,
            Goal::Maintain => 0.0,
            Goal::Gain => 500.0,
        }
    }

    pub fn tips(self) -> &'static [&'static str] {
        match self {
            Goal::Lose => &[
                "Create a 500-calorie deficit daily",
                "Aim for 0.5-1kg weight loss per week",
                "Combine diet with exercise",
            ],
            Goal::Maintain => &[
                "Maintain current calorie intake",
                "Focus on nutrient balance",
                "Regular exercise for health",
            ],
            Goal::Gain => &[
                "Create a 500-calorie surplus daily",
                "Focus on protein-rich foods",
                "Include strength training",
            ],
        }
    }
}

impl FromStr for Goal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "lose" => Ok(Goal::Lose),
            "maintain" => Ok(Goal::Maintain),
            "gain" => Ok(Goal::Gain),
            other => Err(Error::validation(format!(
                "Unknown goal '{}' (expected lose, maintain or gain)",
                other
            ))),
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Goal::Lose => write!(f, "lose"),
            Goal::Maintain => write!(f, "maintain"),
            Goal::Gain => write!(f, "gain"),
        }
    }
}

// ============================================================================
// Daily Records
// ============================================================================

/// Unvalidated daily log input as collected by the presentation layer
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DailyEntry {
    pub sleep: f64,
    pub water: f64,
    pub mood: u8,
    pub meals: String,
    pub reflection: String,
}

/// One day's health record
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DailyRecord {
    /// Hours slept
    pub sleep: f64,
    /// Cups of water
    pub water: f64,
    /// Mood on a 1-5 scale
    pub mood: u8,
    #[serde(default)]
    pub meals: String,
    #[serde(default)]
    pub reflection: String,
    /// Time of the last write
    #[serde(with = "timestamp")]
    pub timestamp: NaiveDateTime,
}

impl DailyRecord {
    /// Validate an entry against `limits` and stamp it with `now`
    pub fn from_entry(entry: DailyEntry, limits: &Limits, now: NaiveDateTime) -> Result<Self> {
        let sleep = limits.sleep_hours.check("Sleep hours", entry.sleep, "")?;
        let water = limits.water_cups.check("Water intake", entry.water, " cups")?;
        limits.mood.check("Mood", f64::from(entry.mood), "")?;

        Ok(Self {
            sleep,
            water,
            mood: entry.mood,
            meals: entry.meals.trim().to_string(),
            reflection: entry.reflection.trim().to_string(),
            timestamp: now,
        })
    }
}

// ============================================================================
// BMI Snapshots
// ============================================================================

/// A saved BMI measurement
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BmiSnapshot {
    pub bmi: f64,
    pub height: f64,
    pub weight: f64,
    #[serde(rename = "date", with = "timestamp")]
    pub taken_at: NaiveDateTime,
}

// ============================================================================
// Accounts
// ============================================================================

/// Profile attributes of an account
///
/// Numeric fields are optional because accounts may be registered without
/// them; older databases stored unset values as empty strings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, with = "lenient")]
    pub age: Option<u32>,
    #[serde(default, with = "lenient")]
    pub height: Option<f64>,
    #[serde(default, with = "lenient")]
    pub weight: Option<f64>,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default = "now_local", with = "timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(default, with = "opt_timestamp")]
    pub last_login: Option<NaiveDateTime>,
}

impl Profile {
    pub fn new(created_at: NaiveDateTime) -> Self {
        Self {
            name: None,
            email: None,
            age: None,
            height: None,
            weight: None,
            gender: Gender::default(),
            created_at,
            last_login: None,
        }
    }
}

/// Everything stored for one user
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserAccount {
    #[serde(default)]
    pub username: String,
    pub password_hash: String,
    #[serde(default)]
    pub email: String,
    pub profile: Profile,
    #[serde(default)]
    pub health_data: RecordStore,
    #[serde(default)]
    pub bmi_history: BmiHistory,
}

impl UserAccount {
    pub fn new(username: &str, password_hash: String, created_at: NaiveDateTime) -> Self {
        Self {
            username: username.to_string(),
            password_hash,
            email: String::new(),
            profile: Profile::new(created_at),
            health_data: RecordStore::new(),
            bmi_history: BmiHistory::new(),
        }
    }
}

// ============================================================================
// Serde helpers
// ============================================================================

/// `NaiveDateTime` as `"YYYY-MM-DD HH:MM:SS"`
pub(crate) mod timestamp {
    use super::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&value.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT).map_err(de::Error::custom)
    }
}

/// Optional timestamp where an empty string means "never"
pub(crate) mod opt_timestamp {
    use super::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDateTime>,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => s.collect_str(&ts.format(TIMESTAMP_FORMAT)),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        let raw = Option::<String>::deserialize(d)?.unwrap_or_default();
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
            .map(Some)
            .map_err(de::Error::custom)
    }
}

/// Optional number that may also be written as a numeric or empty string
pub(crate) mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
    use std::fmt::Display;
    use std::str::FromStr;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw<T> {
        Value(T),
        Text(String),
    }

    pub fn serialize<S, T>(value: &Option<T>, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        value.serialize(s)
    }

    pub fn deserialize<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + FromStr,
        T::Err: Display,
    {
        match Option::<Raw<T>>::deserialize(d)? {
            None => Ok(None),
            Some(Raw::Value(v)) => Ok(Some(v)),
            Some(Raw::Text(text)) if text.trim().is_empty() => Ok(None),
            Some(Raw::Text(text)) => text.trim().parse().map(Some).map_err(de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn entry(sleep: f64, water: f64, mood: u8) -> DailyEntry {
        DailyEntry {
            sleep,
            water,
            mood,
            meals: "  oats, salad  ".into(),
            reflection: String::new(),
        }
    }

    #[test]
    fn test_daily_record_validation() {
        let limits = Limits::default();

        let record = DailyRecord::from_entry(entry(7.5, 8.0, 4), &limits, at(9)).unwrap();
        assert_eq!(record.sleep, 7.5);
        assert_eq!(record.meals, "oats, salad");
        assert_eq!(record.timestamp, at(9));

        assert!(matches!(
            DailyRecord::from_entry(entry(25.0, 8.0, 4), &limits, at(9)),
            Err(Error::Validation(_))
        ));
        assert!(DailyRecord::from_entry(entry(8.0, 51.0, 4), &limits, at(9)).is_err());
        assert!(DailyRecord::from_entry(entry(8.0, -1.0, 4), &limits, at(9)).is_err());
        assert!(DailyRecord::from_entry(entry(8.0, 8.0, 0), &limits, at(9)).is_err());
        assert!(DailyRecord::from_entry(entry(8.0, 8.0, 6), &limits, at(9)).is_err());
        // Boundaries are inclusive
        assert!(DailyRecord::from_entry(entry(0.0, 50.0, 1), &limits, at(9)).is_ok());
        assert!(DailyRecord::from_entry(entry(24.0, 0.0, 5), &limits, at(9)).is_ok());
    }

    #[test]
    fn test_record_json_shape() {
        let record = DailyRecord::from_entry(entry(8.0, 6.0, 3), &Limits::default(), at(21))
            .unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["sleep"], 8.0);
        assert_eq!(json["mood"], 3);
        assert_eq!(json["timestamp"], "2024-03-01 21:00:00");
    }

    #[test]
    fn test_legacy_profile_with_empty_strings() {
        let json = r#"{
            "age": "",
            "height": "172.5",
            "weight": 70,
            "gender": "female",
            "created_at": "2024-01-05 10:11:12",
            "last_login": ""
        }"#;
        let profile: Profile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.age, None);
        assert_eq!(profile.height, Some(172.5));
        assert_eq!(profile.weight, Some(70.0));
        assert_eq!(profile.gender, Gender::Female);
        assert_eq!(profile.last_login, None);
    }

    #[test]
    fn test_profile_rejects_garbage_number() {
        let json = r#"{"age": "thirty", "created_at": "2024-01-05 10:11:12"}"#;
        assert!(serde_json::from_str::<Profile>(json).is_err());
    }

    #[test]
    fn test_bmi_snapshot_uses_date_field() {
        let snapshot = BmiSnapshot {
            bmi: 24.2,
            height: 170.0,
            weight: 70.0,
            taken_at: at(8),
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["date"], "2024-03-01 08:00:00");

        // Older snapshots also carry a "timestamp" key, which is ignored
        let legacy = r#"{"bmi": 22.0, "height": 180, "weight": 71.3,
            "date": "2024-02-01 08:00:00", "timestamp": "2024-02-01 08:00:01"}"#;
        let parsed: BmiSnapshot = serde_json::from_str(legacy).unwrap();
        assert_eq!(parsed.height, 180.0);
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!("Female".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!(
            "very active".parse::<ActivityLevel>().unwrap(),
            ActivityLevel::VeryActive
        );
        assert_eq!("gain".parse::<Goal>().unwrap(), Goal::Gain);
        assert!("other".parse::<Gender>().is_err());
        assert!("extreme".parse::<ActivityLevel>().is_err());
    }

    #[test]
    fn test_activity_multipliers() {
        let multipliers: Vec<f64> = ActivityLevel::ALL.iter().map(|a| a.multiplier()).collect();
        assert_eq!(multipliers, vec![1.2, 1.375, 1.55, 1.725, 1.9]);
    }
}
