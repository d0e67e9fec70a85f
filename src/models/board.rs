use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::EntityId;

choice_enum! {
    JobType {
        Job = "job" ("Job"),
        Internship = "internship" ("Internship"),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Job {
    pub id: EntityId,
    pub title: String,
    pub position: String,
    pub vacancies: u32,
    pub opening_date: NaiveDate,
    pub application_deadline: NaiveDate,
    pub more_details: Option<String>,
    pub job_type: JobType,
    pub location: String,
    pub posted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactMessage {
    pub id: EntityId,
    pub name: String,
    pub email: String,
    pub message: String,
    pub sent_at: DateTime<Utc>,
    pub reply: Option<String>,
}

impl ContactMessage {
    pub fn new(name: String, email: String, message: String) -> Self {
        Self {
            id: EntityId::generate(),
            name,
            email,
            message,
            sent_at: Utc::now(),
            reply: None,
        }
    }
}
