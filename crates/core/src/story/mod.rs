//! Curated customer stories managed through the admin surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::validate::{required_str, validate_email, ValidationError};

/// Lifecycle of a story: created in progress, completed once answers are
/// recorded. The modeled flow never reverts a completed story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoryStatus {
    InProgress,
    Completed,
}

/// One interview item on a story.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryQuestion {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
}

/// Stored shape of a customer story. `updatedBy`/`updatedByUid` only
/// appear once answers have been recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerStory {
    pub name: String,
    pub email: String,
    pub questions: Vec<StoryQuestion>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: String,
    pub created_by_uid: String,
    pub status: StoryStatus,
}

/// A validated create-story request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStory {
    pub name: String,
    pub email: String,
    pub questions: Vec<StoryQuestion>,
}

impl NewStory {
    pub const REQUIRED: &'static str = "name, email";

    pub fn parse(body: &Map<String, Value>) -> Result<Self, ValidationError> {
        let name = required_str(body, "name", Self::REQUIRED)?;
        let email = required_str(body, "email", Self::REQUIRED)?;
        validate_email(&email)?;
        let questions = match body.get("questions") {
            None | Some(Value::Null) => Vec::new(),
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|_| ValidationError::InvalidField("questions"))?,
        };
        Ok(Self {
            name,
            email,
            questions,
        })
    }

    /// Materialize the story a create writes. Both timestamps start at
    /// the same server-observed instant; the verified caller becomes the
    /// audit identity.
    pub fn into_story(self, created_by: &str, created_by_uid: &str, now: DateTime<Utc>) -> CustomerStory {
        CustomerStory {
            name: self.name,
            email: self.email,
            questions: self.questions,
            created_at: now,
            updated_at: now,
            created_by: created_by.to_string(),
            created_by_uid: created_by_uid.to_string(),
            status: StoryStatus::InProgress,
        }
    }
}

/// A validated update-answers request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryAnswers {
    pub story_id: String,
    pub answers: Vec<StoryQuestion>,
}

impl StoryAnswers {
    pub const REQUIRED: &'static str = "storyId, answers";

    pub fn parse(body: &Map<String, Value>) -> Result<Self, ValidationError> {
        let story_id = required_str(body, "storyId", Self::REQUIRED)?;
        let answers = match body.get("answers") {
            None | Some(Value::Null) => {
                return Err(ValidationError::MissingRequired(Self::REQUIRED));
            }
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|_| ValidationError::InvalidField("answers"))?,
        };
        Ok(Self { story_id, answers })
    }

    /// The change set an answer update applies: answers overwrite
    /// `questions`, the update is stamped and attributed, and the story
    /// completes.
    pub fn into_changes(
        self,
        updated_by: &str,
        updated_by_uid: &str,
        now: DateTime<Utc>,
    ) -> StoryCompletion {
        StoryCompletion {
            questions: self.answers,
            updated_at: now,
            updated_by: updated_by.to_string(),
            updated_by_uid: updated_by_uid.to_string(),
            status: StoryStatus::Completed,
        }
    }
}

/// Field changes merged into a story when its answers are recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryCompletion {
    pub questions: Vec<StoryQuestion>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
    pub updated_by_uid: String,
    pub status: StoryStatus,
}
