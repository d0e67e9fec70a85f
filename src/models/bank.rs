use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{AnswerOptions, Choice, EntityId};

#[derive(Debug, Clone, Serialize)]
pub struct ObjectiveSubject {
    pub id: EntityId,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ObjectiveSubject {
    pub fn new(name: String, description: String) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::generate(),
            name,
            description,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ObjectiveSet {
    pub id: EntityId,
    pub subject_id: EntityId,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ObjectiveSet {
    pub fn new(subject_id: EntityId, title: String, description: String) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::generate(),
            subject_id,
            title,
            description,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ObjectiveMcq {
    pub id: EntityId,
    pub set_id: EntityId,
    pub question: String,
    #[serde(flatten)]
    pub options: AnswerOptions,
    pub correct_answer: Choice,
    pub explanation: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ObjectiveMcq {
    pub fn new(
        set_id: EntityId,
        question: String,
        options: AnswerOptions,
        correct_answer: Choice,
        explanation: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::generate(),
            set_id,
            question,
            options,
            correct_answer,
            explanation,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubjectiveSubject {
    pub id: EntityId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl SubjectiveSubject {
    pub fn new(name: String) -> Self {
        Self {
            id: EntityId::generate(),
            name,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubjectiveChapter {
    pub id: EntityId,
    pub subject_id: EntityId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl SubjectiveChapter {
    pub fn new(subject_id: EntityId, name: String) -> Self {
        Self {
            id: EntityId::generate(),
            subject_id,
            name,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubjectiveQa {
    pub id: EntityId,
    pub chapter_id: EntityId,
    pub question: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}

impl SubjectiveQa {
    pub fn new(chapter_id: EntityId, question: String, answer: String) -> Self {
        Self {
            id: EntityId::generate(),
            chapter_id,
            question,
            answer,
            created_at: Utc::now(),
        }
    }
}
