use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Article, CurrentEvent, EntityId, GkEntry, ModelSet, Note, Quiz};
use crate::error::{AppError, Result};

choice_enum! {
    BookmarkKind {
        Note = "note" ("Note"),
        Article = "article" ("Article"),
        Quiz = "quiz" ("Quiz"),
        ModelSet = "modelset" ("Model set"),
        GkEntry = "gkentry" ("GK entry"),
        CurrentEvent = "currentevent" ("Current event"),
    }
}

/// Reference to something a user can bookmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookmarkTarget {
    Note(EntityId),
    Article(EntityId),
    Quiz(EntityId),
    ModelSet(EntityId),
    GkEntry(EntityId),
    CurrentEvent(EntityId),
}

impl BookmarkTarget {
    pub fn new(kind: BookmarkKind, id: EntityId) -> Self {
        match kind {
            BookmarkKind::Note => BookmarkTarget::Note(id),
            BookmarkKind::Article => BookmarkTarget::Article(id),
            BookmarkKind::Quiz => BookmarkTarget::Quiz(id),
            BookmarkKind::ModelSet => BookmarkTarget::ModelSet(id),
            BookmarkKind::GkEntry => BookmarkTarget::GkEntry(id),
            BookmarkKind::CurrentEvent => BookmarkTarget::CurrentEvent(id),
        }
    }

    pub fn parse(kind: &str, id: &str) -> Result<Self> {
        let kind: BookmarkKind = kind
            .parse()
            .map_err(|_| AppError::NotFound("Bookmark target"))?;
        let id = EntityId::parse(id, kind.label())?;
        Ok(Self::new(kind, id))
    }

    pub fn kind(&self) -> BookmarkKind {
        match self {
            BookmarkTarget::Note(_) => BookmarkKind::Note,
            BookmarkTarget::Article(_) => BookmarkKind::Article,
            BookmarkTarget::Quiz(_) => BookmarkKind::Quiz,
            BookmarkTarget::ModelSet(_) => BookmarkKind::ModelSet,
            BookmarkTarget::GkEntry(_) => BookmarkKind::GkEntry,
            BookmarkTarget::CurrentEvent(_) => BookmarkKind::CurrentEvent,
        }
    }

    pub fn id(&self) -> EntityId {
        match *self {
            BookmarkTarget::Note(id)
            | BookmarkTarget::Article(id)
            | BookmarkTarget::Quiz(id)
            | BookmarkTarget::ModelSet(id)
            | BookmarkTarget::GkEntry(id)
            | BookmarkTarget::CurrentEvent(id) => id,
        }
    }
}

/// A bookmark target after lookup.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "item", rename_all = "lowercase")]
pub enum BookmarkedItem {
    Note(Note),
    Article(Article),
    Quiz(Quiz),
    ModelSet(ModelSet),
    GkEntry(GkEntry),
    CurrentEvent(CurrentEvent),
}

#[derive(Debug, Clone, Serialize)]
pub struct Bookmark {
    pub id: EntityId,
    pub user_id: EntityId,
    pub kind: BookmarkKind,
    pub target_id: EntityId,
    pub created_at: DateTime<Utc>,
}

impl Bookmark {
    pub fn new(user_id: EntityId, target: BookmarkTarget) -> Self {
        Self {
            id: EntityId::generate(),
            user_id,
            kind: target.kind(),
            target_id: target.id(),
            created_at: Utc::now(),
        }
    }

    pub fn target(&self) -> BookmarkTarget {
        BookmarkTarget::new(self.kind, self.target_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BookmarkStatus {
    Added,
    Removed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_builds_the_matching_variant() {
        let id = EntityId::generate();
        let target = BookmarkTarget::parse("modelset", &id.to_string()).unwrap();
        assert_eq!(target, BookmarkTarget::ModelSet(id));
        assert_eq!(target.kind(), BookmarkKind::ModelSet);
        assert_eq!(target.id(), id);
    }

    #[test]
    fn unknown_kinds_are_not_bookmarkable() {
        let id = EntityId::generate().to_string();
        assert!(matches!(
            BookmarkTarget::parse("user", &id),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            BookmarkTarget::parse("note", "bogus"),
            Err(AppError::NotFound("Note"))
        ));
    }
}
