use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::EntityId;

#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: EntityId,
    pub name: String,
    pub description: String,
}

impl Category {
    pub fn new(name: String, description: String) -> Self {
        Self {
            id: EntityId::generate(),
            name,
            description,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelSet {
    pub id: EntityId,
    pub category_id: Option<EntityId>,
    pub title: String,
    pub description: String,
    pub timer_hours: u32,
    pub timer_minutes: u32,
    pub timer_seconds: u32,
    pub file_url: Option<String>,
    pub interactive_url: Option<String>,
}

impl ModelSet {
    /// Time allowed for one attempt, in seconds.
    pub fn time_limit_seconds(&self) -> u64 {
        u64::from(self.timer_hours) * 3600
            + u64::from(self.timer_minutes) * 60
            + u64::from(self.timer_seconds)
    }
}

choice_enum! {
    /// Option letter of a multiple-choice question.
    Choice {
        A = "A" ("A"),
        B = "B" ("B"),
        C = "C" ("C"),
        D = "D" ("D"),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerOptions {
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelSetQuestion {
    pub id: EntityId,
    pub model_set_id: EntityId,
    pub question_text: String,
    #[serde(flatten)]
    pub options: AnswerOptions,
    pub correct_option: Choice,
    pub explanation: String,
}

impl ModelSetQuestion {
    pub fn new(
        model_set_id: EntityId,
        question_text: String,
        options: AnswerOptions,
        correct_option: Choice,
        explanation: String,
    ) -> Self {
        Self {
            id: EntityId::generate(),
            model_set_id,
            question_text,
            options,
            correct_option,
            explanation,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Quiz {
    pub id: EntityId,
    pub title: String,
    pub topic: String,
    pub level: String,
}

/// One sitting of a model-set test, from the moment the questions were
/// handed out until the answers came back.
#[derive(Debug, Clone, Serialize)]
pub struct Attempt {
    pub id: EntityId,
    pub model_set_id: EntityId,
    pub started_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
}

impl Attempt {
    pub fn start(model_set_id: EntityId, now: DateTime<Utc>) -> Self {
        Self {
            id: EntityId::generate(),
            model_set_id,
            started_at: now,
            submitted_at: None,
        }
    }

    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        (now - self.started_at).max(Duration::zero())
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted_at.is_some()
    }
}
