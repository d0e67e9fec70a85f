use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Value, ValueRef};
use serde::{Deserialize, Serialize};

use super::EntityId;

#[derive(Debug, Clone, Serialize)]
pub struct Note {
    pub id: EntityId,
    pub title: String,
    pub file_url: String,
    pub uploaded_at: DateTime<Utc>,
}

impl Note {
    pub fn new(title: String, file_url: String) -> Self {
        Self {
            id: EntityId::generate(),
            title,
            file_url,
            uploaded_at: Utc::now(),
        }
    }
}

choice_enum! {
    GkKind {
        Nepal = "nepal" ("Nepali GK"),
        World = "world" ("World GK"),
        Technical = "technical" ("Technical GK"),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GkEntry {
    pub id: EntityId,
    pub kind: GkKind,
    pub title: String,
    pub document_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl GkEntry {
    pub fn new(kind: GkKind, title: String, document_url: Option<String>) -> Self {
        Self {
            id: EntityId::generate(),
            kind,
            title,
            document_url,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GkQuestion {
    pub id: EntityId,
    pub entry_id: EntityId,
    pub question: String,
    pub answer: String,
}

impl GkQuestion {
    pub fn new(entry_id: EntityId, question: String, answer: String) -> Self {
        Self {
            id: EntityId::generate(),
            entry_id,
            question,
            answer,
        }
    }
}

choice_enum! {
    ArticleCategory {
        Nepal = "nepal" ("Nepal GK"),
        World = "world" ("World GK"),
        Technical = "technical" ("Technical GK"),
        Blog = "blog" ("Blog"),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Article {
    pub id: EntityId,
    pub title: String,
    pub content: String,
    pub category: ArticleCategory,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Article {
    pub fn blog_post(title: String, content: String, image_url: Option<String>) -> Self {
        Self {
            id: EntityId::generate(),
            title,
            content,
            category: ArticleCategory::Blog,
            image_url,
            created_at: Utc::now(),
        }
    }
}

/// The seven provinces, stored by number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Province {
    Koshi = 1,
    Madhesh = 2,
    Bagmati = 3,
    Gandaki = 4,
    Lumbini = 5,
    Karnali = 6,
    Sudurpashchim = 7,
}

impl Province {
    pub const ALL: [Province; 7] = [
        Province::Koshi,
        Province::Madhesh,
        Province::Bagmati,
        Province::Gandaki,
        Province::Lumbini,
        Province::Karnali,
        Province::Sudurpashchim,
    ];

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Province::Koshi => "Koshi",
            Province::Madhesh => "Madhesh",
            Province::Bagmati => "Bagmati",
            Province::Gandaki => "Gandaki",
            Province::Lumbini => "Lumbini",
            Province::Karnali => "Karnali",
            Province::Sudurpashchim => "Sudurpashchim",
        }
    }
}

impl From<Province> for u8 {
    fn from(province: Province) -> Self {
        province.number()
    }
}

impl TryFrom<u8> for Province {
    type Error = String;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        Province::ALL
            .into_iter()
            .find(|p| p.number() == number)
            .ok_or_else(|| format!("Unknown province {number}"))
    }
}

impl ToSql for Province {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(i64::from(self.number())))
    }
}

impl FromSql for Province {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let number = value.as_i64()?;
        u8::try_from(number)
            .map_err(|_| FromSqlError::OutOfRange(number))
            .and_then(|n| Province::try_from(n).map_err(|_| FromSqlError::OutOfRange(number)))
    }
}

impl From<Province> for Value {
    fn from(province: Province) -> Self {
        Value::Integer(i64::from(province.number()))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Pradesh {
    pub id: EntityId,
    pub province: Province,
    pub province_name: &'static str,
    pub title: String,
    pub document_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Pradesh {
    pub fn new(province: Province, title: String, document_url: Option<String>) -> Self {
        Self {
            id: EntityId::generate(),
            province,
            province_name: province.name(),
            title,
            document_url,
            created_at: Utc::now(),
        }
    }

    pub fn set_province(&mut self, province: Province) {
        self.province = province;
        self.province_name = province.name();
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PradeshQa {
    pub id: EntityId,
    pub pradesh_id: EntityId,
    pub question: String,
    pub answer: String,
}

impl PradeshQa {
    pub fn new(pradesh_id: EntityId, question: String, answer: String) -> Self {
        Self {
            id: EntityId::generate(),
            pradesh_id,
            question,
            answer,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateResource {
    pub id: EntityId,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub file_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GalleryImage {
    pub id: EntityId,
    pub title: String,
    pub file_url: Option<String>,
    pub description: String,
    pub caption: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CurrentEvent {
    pub id: EntityId,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub document_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provinces_round_trip_through_numbers() {
        assert_eq!(Province::try_from(3).unwrap(), Province::Bagmati);
        assert_eq!(Province::Sudurpashchim.number(), 7);
        assert!(Province::try_from(0).is_err());
        assert!(Province::try_from(8).is_err());
    }

    #[test]
    fn gk_kind_parses_stored_values() {
        assert_eq!("world".parse::<GkKind>().unwrap(), GkKind::World);
        assert!("World".parse::<GkKind>().is_err());
        assert_eq!(GkKind::Technical.label(), "Technical GK");
    }
}
