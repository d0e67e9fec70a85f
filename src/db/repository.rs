use chrono::{DateTime, Utc};
use regex::RegexBuilder;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension};
use tokio_rusqlite::Connection;

use crate::error::{AppError, Result};
use crate::models::{
    Article, Attempt, Bookmark, BookmarkKind, BookmarkStatus, BookmarkTarget, BookmarkedItem,
    CurrentEvent, EntityId, GkEntry, ModelSet, Note, Quiz, User,
};

use super::records::{format_timestamp, Cascade, ParentRef, Record};
use super::schema::SCHEMA;

pub struct Repository {
    conn: Connection,
}

impl Repository {
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).await?;
        Self::init(conn).await
    }

    pub async fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().await?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self> {
        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    // Generic record operations

    /// Persists a new record. Fails with the parent's not-found error when
    /// the record references a missing parent.
    pub async fn insert<T: Record>(&self, record: T) -> Result<T> {
        self.conn
            .call(move |conn| {
                let parent = record.parent();
                if !parent_exists(conn, parent)? {
                    return Ok(Err(missing_parent(parent)));
                }
                conn.execute(&insert_sql::<T>(), params_from_iter(row_values(&record)))?;
                Ok(Ok(record))
            })
            .await?
    }

    /// Persists all records or none of them.
    pub async fn insert_many<T: Record>(&self, records: Vec<T>) -> Result<usize> {
        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                let sql = insert_sql::<T>();
                for record in &records {
                    let parent = record.parent();
                    if !parent_exists(&tx, parent)? {
                        return Ok(Err(missing_parent(parent)));
                    }
                    tx.execute(&sql, params_from_iter(row_values(record)))?;
                }
                tx.commit()?;
                Ok(Ok(records.len()))
            })
            .await?
    }

    /// All records of a kind, in insertion order.
    pub async fn list<T: Record>(&self) -> Result<Vec<T>> {
        self.list_filtered(Vec::new()).await
    }

    pub async fn list_by<T: Record>(
        &self,
        column: &'static str,
        value: impl Into<Value>,
    ) -> Result<Vec<T>> {
        self.list_filtered(vec![(column, value.into())]).await
    }

    /// Records matching every `column = value` pair, in insertion order.
    pub async fn list_filtered<T: Record>(
        &self,
        filters: Vec<(&'static str, Value)>,
    ) -> Result<Vec<T>> {
        debug_assert!(filters
            .iter()
            .all(|(column, _)| T::COLUMNS.contains(column)));

        let mut sql = select_sql::<T>();
        if !filters.is_empty() {
            let clauses = filters
                .iter()
                .enumerate()
                .map(|(i, (column, _))| format!("{column} = ?{}", i + 1))
                .collect::<Vec<_>>()
                .join(" AND ");
            sql.push_str(" WHERE ");
            sql.push_str(&clauses);
        }
        sql.push_str(" ORDER BY rowid");
        let values: Vec<Value> = filters.into_iter().map(|(_, value)| value).collect();

        let records = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql)?;
                let records = stmt
                    .query_map(params_from_iter(values), T::from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(records)
            })
            .await?;
        Ok(records)
    }

    pub async fn find<T: Record>(&self, id: EntityId) -> Result<Option<T>> {
        let sql = format!("{} WHERE id = ?1", select_sql::<T>());
        let record = self
            .conn
            .call(move |conn| {
                let record = conn.query_row(&sql, params![id], T::from_row).optional()?;
                Ok(record)
            })
            .await?;
        Ok(record)
    }

    pub async fn get<T: Record>(&self, id: EntityId) -> Result<T> {
        self.find(id).await?.ok_or(AppError::NotFound(T::LABEL))
    }

    pub async fn exists<T: Record>(&self, id: EntityId) -> Result<bool> {
        let exists = self
            .conn
            .call(move |conn| Ok(row_exists(conn, T::TABLE, id)?))
            .await?;
        Ok(exists)
    }

    /// Overwrites every column of an existing record.
    pub async fn update<T: Record>(&self, record: T) -> Result<T> {
        self.conn
            .call(move |conn| Ok(update_record(conn, record)?))
            .await?
    }

    /// Updates `parent` and swaps the rows of `C` that reference it for
    /// `children`, atomically.
    pub async fn replace_children<P: Record, C: Record>(
        &self,
        parent: P,
        foreign_key: &'static str,
        children: Vec<C>,
    ) -> Result<P> {
        debug_assert!(C::COLUMNS.contains(&foreign_key));

        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                let parent = match update_record(&tx, parent)? {
                    Ok(parent) => parent,
                    Err(e) => return Ok(Err(e)),
                };
                let removed = tx.execute(
                    &format!("DELETE FROM {} WHERE {foreign_key} = ?1", C::TABLE),
                    params![parent.id()],
                )?;
                let sql = insert_sql::<C>();
                for child in &children {
                    tx.execute(&sql, params_from_iter(row_values(child)))?;
                }
                tx.commit()?;
                tracing::debug!(
                    "Replaced {} {} row(s) with {}",
                    removed,
                    C::TABLE,
                    children.len()
                );
                Ok(Ok(parent))
            })
            .await?
    }

    /// Deletes a record, its descendants (children first) and any bookmarks
    /// pointing at them, in one transaction.
    pub async fn delete<T: Record>(&self, id: EntityId) -> Result<()> {
        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                if !row_exists(&tx, T::TABLE, id)? {
                    return Ok(Err(AppError::NotFound(T::LABEL)));
                }
                let descendants = delete_descendants(&tx, T::CHILDREN, id)?;
                delete_row(&tx, T::TABLE, id)?;
                tx.commit()?;
                tracing::debug!(
                    "Deleted {} {} with {} descendant(s)",
                    T::LABEL,
                    id,
                    descendants
                );
                Ok(Ok(()))
            })
            .await?
    }

    pub async fn count<T: Record>(&self) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", T::TABLE);
        let count = self
            .conn
            .call(move |conn| Ok(conn.query_row(&sql, [], |row| row.get::<_, i64>(0))?))
            .await?;
        Ok(count)
    }

    /// Distinct non-empty values of one text column, sorted.
    pub async fn distinct<T: Record>(&self, column: &'static str) -> Result<Vec<String>> {
        debug_assert!(T::COLUMNS.contains(&column));

        let sql = format!(
            "SELECT DISTINCT {column} FROM {} WHERE {column} <> '' ORDER BY {column}",
            T::TABLE
        );
        let values = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql)?;
                let values = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<std::result::Result<Vec<String>, _>>()?;
                Ok(values)
            })
            .await?;
        Ok(values)
    }

    // Notes

    /// Notes whose title contains `query`, ignoring case.
    pub async fn search_notes(&self, query: &str) -> Result<Vec<Note>> {
        let pattern = RegexBuilder::new(&regex::escape(query))
            .case_insensitive(true)
            .build()
            .map_err(|_| AppError::validation("Search query is too long"))?;

        let notes = self.list::<Note>().await?;
        Ok(notes
            .into_iter()
            .filter(|note| pattern.is_match(&note.title))
            .collect())
    }

    // Users

    pub async fn find_user(&self, username: &str) -> Result<Option<User>> {
        let users = self
            .list_by::<User>("username", username.to_string())
            .await?;
        Ok(users.into_iter().next())
    }

    pub async fn create_user(&self, user: User) -> Result<User> {
        if self.find_user(&user.username).await?.is_some() {
            return Err(AppError::Validation(format!(
                "A user named `{}` already exists",
                user.username
            )));
        }
        self.insert(user).await
    }

    // Attempts

    pub async fn start_attempt(
        &self,
        model_set_id: EntityId,
        now: DateTime<Utc>,
        ttl: chrono::Duration,
    ) -> Result<Attempt> {
        let purged = self.purge_stale_attempts(now - ttl).await?;
        if purged > 0 {
            tracing::info!("Purged {} abandoned attempt(s)", purged);
        }
        self.insert(Attempt::start(model_set_id, now)).await
    }

    /// Drops unsubmitted attempts started before `cutoff`.
    pub async fn purge_stale_attempts(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let cutoff = format_timestamp(&cutoff);
        let purged = self
            .conn
            .call(move |conn| {
                Ok(conn.execute(
                    "DELETE FROM attempts WHERE submitted_at IS NULL AND started_at < ?1",
                    params![cutoff],
                )?)
            })
            .await?;
        Ok(purged)
    }

    /// Marks an attempt submitted. Returns false when it was already
    /// submitted (or no longer exists), so each attempt closes once.
    pub async fn close_attempt(&self, id: EntityId, at: DateTime<Utc>) -> Result<bool> {
        let at = format_timestamp(&at);
        let changed = self
            .conn
            .call(move |conn| {
                Ok(conn.execute(
                    "UPDATE attempts SET submitted_at = ?2 WHERE id = ?1 AND submitted_at IS NULL",
                    params![id, at],
                )?)
            })
            .await?;
        Ok(changed == 1)
    }

    // Bookmarks

    /// Removes the user's bookmark on `target` if there is one, otherwise
    /// adds it.
    pub async fn toggle_bookmark(
        &self,
        user_id: EntityId,
        target: BookmarkTarget,
    ) -> Result<BookmarkStatus> {
        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                if !row_exists(&tx, User::TABLE, user_id)? {
                    return Ok(Err(AppError::NotFound(User::LABEL)));
                }
                let (table, label) = target_table(target.kind());
                if !row_exists(&tx, table, target.id())? {
                    return Ok(Err(AppError::NotFound(label)));
                }

                let removed = tx.execute(
                    "DELETE FROM bookmarks WHERE user_id = ?1 AND kind = ?2 AND target_id = ?3",
                    params![user_id, target.kind(), target.id()],
                )?;
                let status = if removed > 0 {
                    BookmarkStatus::Removed
                } else {
                    let bookmark = Bookmark::new(user_id, target);
                    tx.execute(
                        &insert_sql::<Bookmark>(),
                        params_from_iter(row_values(&bookmark)),
                    )?;
                    BookmarkStatus::Added
                };
                tx.commit()?;
                Ok(Ok(status))
            })
            .await?
    }

    pub async fn resolve_bookmark(&self, target: BookmarkTarget) -> Result<Option<BookmarkedItem>> {
        let item = match target {
            BookmarkTarget::Note(id) => self.find::<Note>(id).await?.map(BookmarkedItem::Note),
            BookmarkTarget::Article(id) => {
                self.find::<Article>(id).await?.map(BookmarkedItem::Article)
            }
            BookmarkTarget::Quiz(id) => self.find::<Quiz>(id).await?.map(BookmarkedItem::Quiz),
            BookmarkTarget::ModelSet(id) => {
                self.find::<ModelSet>(id).await?.map(BookmarkedItem::ModelSet)
            }
            BookmarkTarget::GkEntry(id) => {
                self.find::<GkEntry>(id).await?.map(BookmarkedItem::GkEntry)
            }
            BookmarkTarget::CurrentEvent(id) => self
                .find::<CurrentEvent>(id)
                .await?
                .map(BookmarkedItem::CurrentEvent),
        };
        Ok(item)
    }

    /// A user's bookmarks with their targets, skipping any whose target is
    /// gone.
    pub async fn bookmarks_for(&self, user_id: EntityId) -> Result<Vec<(Bookmark, BookmarkedItem)>> {
        let bookmarks = self.list_by::<Bookmark>("user_id", user_id).await?;
        let mut resolved = Vec::with_capacity(bookmarks.len());
        for bookmark in bookmarks {
            if let Some(item) = self.resolve_bookmark(bookmark.target()).await? {
                resolved.push((bookmark, item));
            }
        }
        Ok(resolved)
    }
}

fn select_sql<T: Record>() -> String {
    format!("SELECT id, {} FROM {}", T::COLUMNS.join(", "), T::TABLE)
}

fn insert_sql<T: Record>() -> String {
    let placeholders = (1..=T::COLUMNS.len() + 1)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {} (id, {}) VALUES ({placeholders})",
        T::TABLE,
        T::COLUMNS.join(", ")
    )
}

fn update_sql<T: Record>() -> String {
    let assignments = T::COLUMNS
        .iter()
        .enumerate()
        .map(|(i, column)| format!("{column} = ?{}", i + 2))
        .collect::<Vec<_>>()
        .join(", ");
    format!("UPDATE {} SET {assignments} WHERE id = ?1", T::TABLE)
}

/// The id followed by the record's column values.
fn row_values<T: Record>(record: &T) -> Vec<Value> {
    let mut values = vec![Value::from(record.id())];
    values.extend(record.values());
    values
}

fn row_exists(conn: &rusqlite::Connection, table: &str, id: EntityId) -> rusqlite::Result<bool> {
    conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1)"),
        params![id],
        |row| row.get(0),
    )
}

fn parent_exists(
    conn: &rusqlite::Connection,
    parent: Option<(ParentRef, EntityId)>,
) -> rusqlite::Result<bool> {
    match parent {
        Some((parent, id)) => row_exists(conn, parent.table, id),
        None => Ok(true),
    }
}

fn missing_parent(parent: Option<(ParentRef, EntityId)>) -> AppError {
    AppError::NotFound(parent.map_or("Parent", |(parent, _)| parent.label))
}

fn update_record<T: Record>(
    conn: &rusqlite::Connection,
    record: T,
) -> rusqlite::Result<Result<T>> {
    let parent = record.parent();
    if !parent_exists(conn, parent)? {
        return Ok(Err(missing_parent(parent)));
    }
    let changed = conn.execute(&update_sql::<T>(), params_from_iter(row_values(&record)))?;
    if changed == 0 {
        return Ok(Err(AppError::NotFound(T::LABEL)));
    }
    Ok(Ok(record))
}

fn delete_row(conn: &rusqlite::Connection, table: &str, id: EntityId) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM bookmarks WHERE target_id = ?1", params![id])?;
    conn.execute(&format!("DELETE FROM {table} WHERE id = ?1"), params![id])
}

/// Depth-first delete of everything below `parent_id`. Returns the number
/// of rows removed.
fn delete_descendants(
    conn: &rusqlite::Connection,
    cascades: &[Cascade],
    parent_id: EntityId,
) -> rusqlite::Result<usize> {
    let mut removed = 0;
    for cascade in cascades {
        let ids = {
            let mut stmt = conn.prepare(&format!(
                "SELECT id FROM {} WHERE {} = ?1",
                cascade.table, cascade.foreign_key
            ))?;
            let ids = stmt
                .query_map(params![parent_id], |row| row.get::<_, EntityId>(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            ids
        };
        for id in ids {
            removed += delete_descendants(conn, cascade.children, id)?;
            removed += delete_row(conn, cascade.table, id)?;
        }
    }
    Ok(removed)
}

fn target_table(kind: BookmarkKind) -> (&'static str, &'static str) {
    match kind {
        BookmarkKind::Note => (Note::TABLE, Note::LABEL),
        BookmarkKind::Article => (Article::TABLE, Article::LABEL),
        BookmarkKind::Quiz => (Quiz::TABLE, Quiz::LABEL),
        BookmarkKind::ModelSet => (ModelSet::TABLE, ModelSet::LABEL),
        BookmarkKind::GkEntry => (GkEntry::TABLE, GkEntry::LABEL),
        BookmarkKind::CurrentEvent => (CurrentEvent::TABLE, CurrentEvent::LABEL),
    }
}
