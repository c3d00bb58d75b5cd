//! Public intake submissions: the waitlist form and the start-story form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::validate::{optional_str, required_str, validate_email, ValidationError};

/// Request envelope metadata stored alongside a submission, sourced from
/// headers rather than the body. Absent values are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMeta {
    pub user_agent: String,
    pub ip: String,
}

/// A validated waitlist form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitlistSubmission {
    pub email: String,
    pub name: String,
}

impl WaitlistSubmission {
    pub const REQUIRED: &'static str = "email";

    /// Validate a request body into a submission: presence first, email
    /// syntax second.
    pub fn parse(body: &Map<String, Value>) -> Result<Self, ValidationError> {
        let email = required_str(body, "email", Self::REQUIRED)?;
        validate_email(&email)?;
        Ok(Self {
            email,
            name: optional_str(body, "name"),
        })
    }

    /// Build the stored record. The timestamp is the server's, never the
    /// client's.
    pub fn into_record(self, meta: RequestMeta, now: DateTime<Utc>) -> WaitlistEntry {
        WaitlistEntry {
            email: self.email,
            name: self.name,
            timestamp: now,
            user_agent: meta.user_agent,
            ip: meta.ip,
        }
    }
}

/// Stored shape of a waitlist signup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitlistEntry {
    pub email: String,
    pub name: String,
    pub timestamp: DateTime<Utc>,
    pub user_agent: String,
    pub ip: String,
}

/// A validated start-story form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryIntake {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub age: String,
    pub motivation: String,
    pub timeline: String,
}

impl StoryIntake {
    pub const REQUIRED: &'static str = "firstName, lastName, email";

    pub fn parse(body: &Map<String, Value>) -> Result<Self, ValidationError> {
        let first_name = required_str(body, "firstName", Self::REQUIRED)?;
        let last_name = required_str(body, "lastName", Self::REQUIRED)?;
        let email = required_str(body, "email", Self::REQUIRED)?;
        validate_email(&email)?;
        Ok(Self {
            first_name,
            last_name,
            email,
            phone: optional_str(body, "phone"),
            age: optional_str(body, "age"),
            motivation: optional_str(body, "motivation"),
            timeline: optional_str(body, "timeline"),
        })
    }

    pub fn into_record(self, meta: RequestMeta, now: DateTime<Utc>) -> StoryIntakeRecord {
        StoryIntakeRecord {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            age: self.age,
            motivation: self.motivation,
            timeline: self.timeline,
            timestamp: now,
            user_agent: meta.user_agent,
            ip: meta.ip,
            status: IntakeStatus::Pending,
        }
    }
}

/// Stored shape of a start-story submission. Written once, triaged by a
/// human afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryIntakeRecord {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub age: String,
    pub motivation: String,
    pub timeline: String,
    pub timestamp: DateTime<Utc>,
    pub user_agent: String,
    pub ip: String,
    pub status: IntakeStatus,
}

/// Intake records always start out pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntakeStatus {
    Pending,
}
