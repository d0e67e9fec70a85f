use std::fmt;
use std::str::FromStr;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Value, ValueRef};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Primary key of every persisted entity. Assigned once at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(Uuid);

impl EntityId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses an identifier taken from a URL or form field. Anything that is
    /// not a well-formed id is reported as the entity being absent.
    pub fn parse(raw: &str, label: &'static str) -> Result<Self> {
        raw.trim().parse().map_err(|_| AppError::NotFound(label))
    }
}

impl FromStr for EntityId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl ToSql for EntityId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_string()))
    }
}

impl FromSql for EntityId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: uuid::Error| FromSqlError::Other(Box::new(e)))
    }
}

impl From<EntityId> for Value {
    fn from(id: EntityId) -> Self {
        Value::Text(id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_generated_ids() {
        let id = EntityId::generate();
        let parsed = EntityId::parse(&id.to_string(), "Note").unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn malformed_ids_are_not_found() {
        for raw in ["", "42", "not-an-id", "65a1f0c2e4b0a1b2c3d4e5f6"] {
            match EntityId::parse(raw, "Note") {
                Err(AppError::NotFound(label)) => assert_eq!(label, "Note"),
                other => panic!("expected not found for {raw:?}, got {other:?}"),
            }
        }
    }
}
