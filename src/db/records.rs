use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::Row;

use crate::models::{
    AnswerOptions, Article, Attempt, Bookmark, Category, ContactMessage, CurrentEvent, EntityId,
    GalleryImage, GkEntry, GkQuestion, Job, ModelSet, ModelSetQuestion, Note, ObjectiveMcq,
    ObjectiveSet, ObjectiveSubject, Pradesh, PradeshQa, Province, Quiz, SubjectiveChapter,
    SubjectiveQa, SubjectiveSubject, TemplateResource, User,
};

/// Rows of `table` whose `foreign_key` points at a record being deleted.
/// Deleted depth-first, before the record itself.
#[derive(Debug, Clone, Copy)]
pub struct Cascade {
    pub table: &'static str,
    pub foreign_key: &'static str,
    pub children: &'static [Cascade],
}

/// Table a record's parent must exist in before the record is written.
#[derive(Debug, Clone, Copy)]
pub struct ParentRef {
    pub table: &'static str,
    pub label: &'static str,
}

impl ParentRef {
    pub const fn of<T: Record>() -> Self {
        Self {
            table: T::TABLE,
            label: T::LABEL,
        }
    }
}

/// A struct persisted as one row of `TABLE`. Column 0 is always `id`,
/// followed by `COLUMNS` in order.
pub trait Record: Sized + Send + 'static {
    const TABLE: &'static str;
    const LABEL: &'static str;
    const COLUMNS: &'static [&'static str];
    const CHILDREN: &'static [Cascade] = &[];

    fn id(&self) -> EntityId;

    fn parent(&self) -> Option<(ParentRef, EntityId)> {
        None
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    fn values(&self) -> Vec<Value>;
}

const BOOKMARKS: Cascade = Cascade {
    table: "bookmarks",
    foreign_key: "user_id",
    children: &[],
};

const GK_QUESTIONS: Cascade = Cascade {
    table: "gk_questions",
    foreign_key: "entry_id",
    children: &[],
};

const PRADESH_QAS: Cascade = Cascade {
    table: "pradesh_qas",
    foreign_key: "pradesh_id",
    children: &[],
};

const MODEL_SET_QUESTIONS: Cascade = Cascade {
    table: "model_set_questions",
    foreign_key: "model_set_id",
    children: &[],
};

const ATTEMPTS: Cascade = Cascade {
    table: "attempts",
    foreign_key: "model_set_id",
    children: &[],
};

const MODEL_SETS: Cascade = Cascade {
    table: "model_sets",
    foreign_key: "category_id",
    children: &[MODEL_SET_QUESTIONS, ATTEMPTS],
};

const OBJECTIVE_MCQS: Cascade = Cascade {
    table: "objective_mcqs",
    foreign_key: "set_id",
    children: &[],
};

const OBJECTIVE_SETS: Cascade = Cascade {
    table: "objective_sets",
    foreign_key: "subject_id",
    children: &[OBJECTIVE_MCQS],
};

const SUBJECTIVE_QAS: Cascade = Cascade {
    table: "subjective_qas",
    foreign_key: "chapter_id",
    children: &[],
};

const SUBJECTIVE_CHAPTERS: Cascade = Cascade {
    table: "subjective_chapters",
    foreign_key: "subject_id",
    children: &[SUBJECTIVE_QAS],
};

// Value helpers

pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // SQLite datetime('now') format, e.g. "2026-01-11 12:34:56"
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    None
}

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

fn optional_text(s: &Option<String>) -> Value {
    s.clone().map(Value::Text).unwrap_or(Value::Null)
}

fn integer(n: u32) -> Value {
    Value::Integer(i64::from(n))
}

fn timestamp_value(dt: &DateTime<Utc>) -> Value {
    Value::Text(format_timestamp(dt))
}

fn conversion_error(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, message.into())
}

fn timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_datetime(&raw).ok_or_else(|| conversion_error(idx, format!("invalid timestamp `{raw}`")))
}

fn optional_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    match row.get::<_, Option<String>>(idx)? {
        Some(raw) => parse_datetime(&raw)
            .map(Some)
            .ok_or_else(|| conversion_error(idx, format!("invalid timestamp `{raw}`"))),
        None => Ok(None),
    }
}

fn date(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .map_err(|e| conversion_error(idx, format!("invalid date `{raw}`: {e}")))
}

fn options_from_row(row: &Row<'_>, first: usize) -> rusqlite::Result<AnswerOptions> {
    Ok(AnswerOptions {
        option_a: row.get(first)?,
        option_b: row.get(first + 1)?,
        option_c: row.get(first + 2)?,
        option_d: row.get(first + 3)?,
    })
}

fn options_values(options: &AnswerOptions) -> [Value; 4] {
    [
        text(&options.option_a),
        text(&options.option_b),
        text(&options.option_c),
        text(&options.option_d),
    ]
}

// Users

impl Record for User {
    const TABLE: &'static str = "users";
    const LABEL: &'static str = "User";
    const COLUMNS: &'static [&'static str] = &[
        "username",
        "email",
        "first_name",
        "last_name",
        "role",
        "phone",
        "bio",
        "date_joined",
    ];
    const CHILDREN: &'static [Cascade] = &[BOOKMARKS];

    fn id(&self) -> EntityId {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(User {
            id: row.get(0)?,
            username: row.get(1)?,
            email: row.get(2)?,
            first_name: row.get(3)?,
            last_name: row.get(4)?,
            role: row.get(5)?,
            phone: row.get(6)?,
            bio: row.get(7)?,
            date_joined: timestamp(row, 8)?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.username),
            text(&self.email),
            text(&self.first_name),
            text(&self.last_name),
            self.role.into(),
            text(&self.phone),
            text(&self.bio),
            timestamp_value(&self.date_joined),
        ]
    }
}

impl Record for Bookmark {
    const TABLE: &'static str = "bookmarks";
    const LABEL: &'static str = "Bookmark";
    const COLUMNS: &'static [&'static str] = &["user_id", "kind", "target_id", "created_at"];

    fn id(&self) -> EntityId {
        self.id
    }

    fn parent(&self) -> Option<(ParentRef, EntityId)> {
        Some((ParentRef::of::<User>(), self.user_id))
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Bookmark {
            id: row.get(0)?,
            user_id: row.get(1)?,
            kind: row.get(2)?,
            target_id: row.get(3)?,
            created_at: timestamp(row, 4)?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.user_id.into(),
            self.kind.into(),
            self.target_id.into(),
            timestamp_value(&self.created_at),
        ]
    }
}

// Content

impl Record for Note {
    const TABLE: &'static str = "notes";
    const LABEL: &'static str = "Note";
    const COLUMNS: &'static [&'static str] = &["title", "file_url", "uploaded_at"];

    fn id(&self) -> EntityId {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Note {
            id: row.get(0)?,
            title: row.get(1)?,
            file_url: row.get(2)?,
            uploaded_at: timestamp(row, 3)?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.title),
            text(&self.file_url),
            timestamp_value(&self.uploaded_at),
        ]
    }
}

impl Record for GkEntry {
    const TABLE: &'static str = "gk_entries";
    const LABEL: &'static str = "GK entry";
    const COLUMNS: &'static [&'static str] = &["kind", "title", "document_url", "created_at"];
    const CHILDREN: &'static [Cascade] = &[GK_QUESTIONS];

    fn id(&self) -> EntityId {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(GkEntry {
            id: row.get(0)?,
            kind: row.get(1)?,
            title: row.get(2)?,
            document_url: row.get(3)?,
            created_at: timestamp(row, 4)?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.kind.into(),
            text(&self.title),
            optional_text(&self.document_url),
            timestamp_value(&self.created_at),
        ]
    }
}

impl Record for GkQuestion {
    const TABLE: &'static str = "gk_questions";
    const LABEL: &'static str = "GK question";
    const COLUMNS: &'static [&'static str] = &["entry_id", "question", "answer"];

    fn id(&self) -> EntityId {
        self.id
    }

    fn parent(&self) -> Option<(ParentRef, EntityId)> {
        Some((ParentRef::of::<GkEntry>(), self.entry_id))
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(GkQuestion {
            id: row.get(0)?,
            entry_id: row.get(1)?,
            question: row.get(2)?,
            answer: row.get(3)?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.entry_id.into(),
            text(&self.question),
            text(&self.answer),
        ]
    }
}

impl Record for Article {
    const TABLE: &'static str = "articles";
    const LABEL: &'static str = "Blog post";
    const COLUMNS: &'static [&'static str] =
        &["title", "content", "category", "image_url", "created_at"];

    fn id(&self) -> EntityId {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Article {
            id: row.get(0)?,
            title: row.get(1)?,
            content: row.get(2)?,
            category: row.get(3)?,
            image_url: row.get(4)?,
            created_at: timestamp(row, 5)?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.title),
            text(&self.content),
            self.category.into(),
            optional_text(&self.image_url),
            timestamp_value(&self.created_at),
        ]
    }
}

impl Record for Pradesh {
    const TABLE: &'static str = "pradesh";
    const LABEL: &'static str = "Province entry";
    const COLUMNS: &'static [&'static str] = &["province", "title", "document_url", "created_at"];
    const CHILDREN: &'static [Cascade] = &[PRADESH_QAS];

    fn id(&self) -> EntityId {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let province: Province = row.get(1)?;
        Ok(Pradesh {
            id: row.get(0)?,
            province,
            province_name: province.name(),
            title: row.get(2)?,
            document_url: row.get(3)?,
            created_at: timestamp(row, 4)?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.province.into(),
            text(&self.title),
            optional_text(&self.document_url),
            timestamp_value(&self.created_at),
        ]
    }
}

impl Record for PradeshQa {
    const TABLE: &'static str = "pradesh_qas";
    const LABEL: &'static str = "Province Q&A";
    const COLUMNS: &'static [&'static str] = &["pradesh_id", "question", "answer"];

    fn id(&self) -> EntityId {
        self.id
    }

    fn parent(&self) -> Option<(ParentRef, EntityId)> {
        Some((ParentRef::of::<Pradesh>(), self.pradesh_id))
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(PradeshQa {
            id: row.get(0)?,
            pradesh_id: row.get(1)?,
            question: row.get(2)?,
            answer: row.get(3)?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.pradesh_id.into(),
            text(&self.question),
            text(&self.answer),
        ]
    }
}

impl Record for TemplateResource {
    const TABLE: &'static str = "template_resources";
    const LABEL: &'static str = "Template";
    const COLUMNS: &'static [&'static str] = &["title", "description", "image_url", "file_url"];

    fn id(&self) -> EntityId {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(TemplateResource {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            image_url: row.get(3)?,
            file_url: row.get(4)?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.title),
            text(&self.description),
            optional_text(&self.image_url),
            optional_text(&self.file_url),
        ]
    }
}

impl Record for GalleryImage {
    const TABLE: &'static str = "gallery_images";
    const LABEL: &'static str = "Gallery image";
    const COLUMNS: &'static [&'static str] = &["title", "file_url", "description", "caption"];

    fn id(&self) -> EntityId {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(GalleryImage {
            id: row.get(0)?,
            title: row.get(1)?,
            file_url: row.get(2)?,
            description: row.get(3)?,
            caption: row.get(4)?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.title),
            optional_text(&self.file_url),
            text(&self.description),
            text(&self.caption),
        ]
    }
}

impl Record for CurrentEvent {
    const TABLE: &'static str = "current_events";
    const LABEL: &'static str = "Current event";
    const COLUMNS: &'static [&'static str] = &[
        "title",
        "description",
        "image_url",
        "document_url",
        "created_at",
    ];

    fn id(&self) -> EntityId {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(CurrentEvent {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            image_url: row.get(3)?,
            document_url: row.get(4)?,
            created_at: timestamp(row, 5)?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.title),
            text(&self.description),
            optional_text(&self.image_url),
            optional_text(&self.document_url),
            timestamp_value(&self.created_at),
        ]
    }
}

// Model sets and quizzes

impl Record for Category {
    const TABLE: &'static str = "categories";
    const LABEL: &'static str = "Category";
    const COLUMNS: &'static [&'static str] = &["name", "description"];
    const CHILDREN: &'static [Cascade] = &[MODEL_SETS];

    fn id(&self) -> EntityId {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Category {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![text(&self.name), text(&self.description)]
    }
}

impl Record for ModelSet {
    const TABLE: &'static str = "model_sets";
    const LABEL: &'static str = "Model Set";
    const COLUMNS: &'static [&'static str] = &[
        "category_id",
        "title",
        "description",
        "timer_hours",
        "timer_minutes",
        "timer_seconds",
        "file_url",
        "interactive_url",
    ];
    const CHILDREN: &'static [Cascade] = &[MODEL_SET_QUESTIONS, ATTEMPTS];

    fn id(&self) -> EntityId {
        self.id
    }

    fn parent(&self) -> Option<(ParentRef, EntityId)> {
        self.category_id
            .map(|category_id| (ParentRef::of::<Category>(), category_id))
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(ModelSet {
            id: row.get(0)?,
            category_id: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            timer_hours: row.get(4)?,
            timer_minutes: row.get(5)?,
            timer_seconds: row.get(6)?,
            file_url: row.get(7)?,
            interactive_url: row.get(8)?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.category_id.map(Value::from).unwrap_or(Value::Null),
            text(&self.title),
            text(&self.description),
            integer(self.timer_hours),
            integer(self.timer_minutes),
            integer(self.timer_seconds),
            optional_text(&self.file_url),
            optional_text(&self.interactive_url),
        ]
    }
}

impl Record for ModelSetQuestion {
    const TABLE: &'static str = "model_set_questions";
    const LABEL: &'static str = "Question";
    const COLUMNS: &'static [&'static str] = &[
        "model_set_id",
        "question_text",
        "option_a",
        "option_b",
        "option_c",
        "option_d",
        "correct_option",
        "explanation",
    ];

    fn id(&self) -> EntityId {
        self.id
    }

    fn parent(&self) -> Option<(ParentRef, EntityId)> {
        Some((ParentRef::of::<ModelSet>(), self.model_set_id))
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(ModelSetQuestion {
            id: row.get(0)?,
            model_set_id: row.get(1)?,
            question_text: row.get(2)?,
            options: options_from_row(row, 3)?,
            correct_option: row.get(7)?,
            explanation: row.get(8)?,
        })
    }

    fn values(&self) -> Vec<Value> {
        let mut values = vec![self.model_set_id.into(), text(&self.question_text)];
        values.extend(options_values(&self.options));
        values.push(self.correct_option.into());
        values.push(text(&self.explanation));
        values
    }
}

impl Record for Attempt {
    const TABLE: &'static str = "attempts";
    const LABEL: &'static str = "Attempt";
    const COLUMNS: &'static [&'static str] = &["model_set_id", "started_at", "submitted_at"];

    fn id(&self) -> EntityId {
        self.id
    }

    fn parent(&self) -> Option<(ParentRef, EntityId)> {
        Some((ParentRef::of::<ModelSet>(), self.model_set_id))
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Attempt {
            id: row.get(0)?,
            model_set_id: row.get(1)?,
            started_at: timestamp(row, 2)?,
            submitted_at: optional_timestamp(row, 3)?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.model_set_id.into(),
            timestamp_value(&self.started_at),
            self.submitted_at
                .as_ref()
                .map(timestamp_value)
                .unwrap_or(Value::Null),
        ]
    }
}

impl Record for Quiz {
    const TABLE: &'static str = "quizzes";
    const LABEL: &'static str = "Quiz";
    const COLUMNS: &'static [&'static str] = &["title", "topic", "level"];

    fn id(&self) -> EntityId {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Quiz {
            id: row.get(0)?,
            title: row.get(1)?,
            topic: row.get(2)?,
            level: row.get(3)?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![text(&self.title), text(&self.topic), text(&self.level)]
    }
}

// Board

impl Record for Job {
    const TABLE: &'static str = "jobs";
    const LABEL: &'static str = "Job";
    const COLUMNS: &'static [&'static str] = &[
        "title",
        "position",
        "vacancies",
        "opening_date",
        "application_deadline",
        "more_details",
        "job_type",
        "location",
        "posted_at",
    ];

    fn id(&self) -> EntityId {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Job {
            id: row.get(0)?,
            title: row.get(1)?,
            position: row.get(2)?,
            vacancies: row.get(3)?,
            opening_date: date(row, 4)?,
            application_deadline: date(row, 5)?,
            more_details: row.get(6)?,
            job_type: row.get(7)?,
            location: row.get(8)?,
            posted_at: timestamp(row, 9)?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.title),
            text(&self.position),
            integer(self.vacancies),
            Value::Text(self.opening_date.to_string()),
            Value::Text(self.application_deadline.to_string()),
            optional_text(&self.more_details),
            self.job_type.into(),
            text(&self.location),
            timestamp_value(&self.posted_at),
        ]
    }
}

impl Record for ContactMessage {
    const TABLE: &'static str = "contact_messages";
    const LABEL: &'static str = "Message";
    const COLUMNS: &'static [&'static str] = &["name", "email", "message", "sent_at", "reply"];

    fn id(&self) -> EntityId {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(ContactMessage {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            message: row.get(3)?,
            sent_at: timestamp(row, 4)?,
            reply: row.get(5)?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.name),
            text(&self.email),
            text(&self.message),
            timestamp_value(&self.sent_at),
            optional_text(&self.reply),
        ]
    }
}

// Objective bank

impl Record for ObjectiveSubject {
    const TABLE: &'static str = "objective_subjects";
    const LABEL: &'static str = "Subject";
    const COLUMNS: &'static [&'static str] = &["name", "description", "created_at", "updated_at"];
    const CHILDREN: &'static [Cascade] = &[OBJECTIVE_SETS];

    fn id(&self) -> EntityId {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(ObjectiveSubject {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            created_at: timestamp(row, 3)?,
            updated_at: timestamp(row, 4)?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.name),
            text(&self.description),
            timestamp_value(&self.created_at),
            timestamp_value(&self.updated_at),
        ]
    }
}

impl Record for ObjectiveSet {
    const TABLE: &'static str = "objective_sets";
    const LABEL: &'static str = "Set";
    const COLUMNS: &'static [&'static str] = &[
        "subject_id",
        "title",
        "description",
        "created_at",
        "updated_at",
    ];
    const CHILDREN: &'static [Cascade] = &[OBJECTIVE_MCQS];

    fn id(&self) -> EntityId {
        self.id
    }

    fn parent(&self) -> Option<(ParentRef, EntityId)> {
        Some((ParentRef::of::<ObjectiveSubject>(), self.subject_id))
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(ObjectiveSet {
            id: row.get(0)?,
            subject_id: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            created_at: timestamp(row, 4)?,
            updated_at: timestamp(row, 5)?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.subject_id.into(),
            text(&self.title),
            text(&self.description),
            timestamp_value(&self.created_at),
            timestamp_value(&self.updated_at),
        ]
    }
}

impl Record for ObjectiveMcq {
    const TABLE: &'static str = "objective_mcqs";
    const LABEL: &'static str = "MCQ";
    const COLUMNS: &'static [&'static str] = &[
        "set_id",
        "question",
        "option_a",
        "option_b",
        "option_c",
        "option_d",
        "correct_answer",
        "explanation",
        "created_at",
        "updated_at",
    ];

    fn id(&self) -> EntityId {
        self.id
    }

    fn parent(&self) -> Option<(ParentRef, EntityId)> {
        Some((ParentRef::of::<ObjectiveSet>(), self.set_id))
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(ObjectiveMcq {
            id: row.get(0)?,
            set_id: row.get(1)?,
            question: row.get(2)?,
            options: options_from_row(row, 3)?,
            correct_answer: row.get(7)?,
            explanation: row.get(8)?,
            created_at: timestamp(row, 9)?,
            updated_at: timestamp(row, 10)?,
        })
    }

    fn values(&self) -> Vec<Value> {
        let mut values = vec![self.set_id.into(), text(&self.question)];
        values.extend(options_values(&self.options));
        values.extend([
            self.correct_answer.into(),
            text(&self.explanation),
            timestamp_value(&self.created_at),
            timestamp_value(&self.updated_at),
        ]);
        values
    }
}

// Subjective bank

impl Record for SubjectiveSubject {
    const TABLE: &'static str = "subjective_subjects";
    const LABEL: &'static str = "Subject";
    const COLUMNS: &'static [&'static str] = &["name", "created_at"];
    const CHILDREN: &'static [Cascade] = &[SUBJECTIVE_CHAPTERS];

    fn id(&self) -> EntityId {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(SubjectiveSubject {
            id: row.get(0)?,
            name: row.get(1)?,
            created_at: timestamp(row, 2)?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![text(&self.name), timestamp_value(&self.created_at)]
    }
}

impl Record for SubjectiveChapter {
    const TABLE: &'static str = "subjective_chapters";
    const LABEL: &'static str = "Chapter";
    const COLUMNS: &'static [&'static str] = &["subject_id", "name", "created_at"];
    const CHILDREN: &'static [Cascade] = &[SUBJECTIVE_QAS];

    fn id(&self) -> EntityId {
        self.id
    }

    fn parent(&self) -> Option<(ParentRef, EntityId)> {
        Some((ParentRef::of::<SubjectiveSubject>(), self.subject_id))
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(SubjectiveChapter {
            id: row.get(0)?,
            subject_id: row.get(1)?,
            name: row.get(2)?,
            created_at: timestamp(row, 3)?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.subject_id.into(),
            text(&self.name),
            timestamp_value(&self.created_at),
        ]
    }
}

impl Record for SubjectiveQa {
    const TABLE: &'static str = "subjective_qas";
    const LABEL: &'static str = "Q&A";
    const COLUMNS: &'static [&'static str] = &["chapter_id", "question", "answer", "created_at"];

    fn id(&self) -> EntityId {
        self.id
    }

    fn parent(&self) -> Option<(ParentRef, EntityId)> {
        Some((ParentRef::of::<SubjectiveChapter>(), self.chapter_id))
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(SubjectiveQa {
            id: row.get(0)?,
            chapter_id: row.get(1)?,
            question: row.get(2)?,
            answer: row.get(3)?,
            created_at: timestamp(row, 4)?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.chapter_id.into(),
            text(&self.question),
            text(&self.answer),
            timestamp_value(&self.created_at),
        ]
    }
}
