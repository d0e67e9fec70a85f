/// Declares a closed set of string choices stored as TEXT.
macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident = $value:literal ($label:literal)),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(#[serde(rename = $value)] $variant),+
        }

        impl $name {
            #[allow(dead_code)]
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value),+
                }
            }

            #[allow(dead_code)]
            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s {
                    $($value => Ok($name::$variant),)+
                    other => Err(format!("Unknown {} `{}`", stringify!($name), other)),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl rusqlite::types::ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
                Ok(rusqlite::types::ToSqlOutput::from(self.as_str()))
            }
        }

        impl rusqlite::types::FromSql for $name {
            fn column_result(
                value: rusqlite::types::ValueRef<'_>,
            ) -> rusqlite::types::FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e: String| rusqlite::types::FromSqlError::Other(e.into()))
            }
        }

        impl From<$name> for rusqlite::types::Value {
            fn from(choice: $name) -> Self {
                rusqlite::types::Value::Text(choice.as_str().to_string())
            }
        }
    };
}

mod bank;
mod board;
mod bookmark;
mod content;
mod exam;
mod id;
mod user;

pub use bank::{
    ObjectiveMcq, ObjectiveSet, ObjectiveSubject, SubjectiveChapter, SubjectiveQa,
    SubjectiveSubject,
};
pub use board::{ContactMessage, Job, JobType};
pub use bookmark::{Bookmark, BookmarkKind, BookmarkStatus, BookmarkTarget, BookmarkedItem};
pub use content::{
    Article, ArticleCategory, CurrentEvent, GalleryImage, GkEntry, GkKind, GkQuestion, Note,
    Pradesh, PradeshQa, Province, TemplateResource,
};
pub use exam::{AnswerOptions, Attempt, Category, Choice, ModelSet, ModelSetQuestion, Quiz};
pub use id::EntityId;
pub use user::{Role, User};
