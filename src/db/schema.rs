pub const SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;

-- users table
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL,
    first_name TEXT NOT NULL DEFAULT '',
    last_name TEXT NOT NULL DEFAULT '',
    role TEXT NOT NULL DEFAULT 'user',
    phone TEXT NOT NULL DEFAULT '',
    bio TEXT NOT NULL DEFAULT '',
    date_joined TEXT NOT NULL
);

-- notes table
CREATE TABLE IF NOT EXISTS notes (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    file_url TEXT NOT NULL,
    uploaded_at TEXT NOT NULL
);

-- gk tables
CREATE TABLE IF NOT EXISTS gk_entries (
    id TEXT PRIMARY KEY,
    kind TEXT NOT NULL,
    title TEXT NOT NULL,
    document_url TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_gk_entries_kind ON gk_entries(kind);

CREATE TABLE IF NOT EXISTS gk_questions (
    id TEXT PRIMARY KEY,
    entry_id TEXT NOT NULL REFERENCES gk_entries(id),
    question TEXT NOT NULL,
    answer TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS idx_gk_questions_entry_id ON gk_questions(entry_id);

-- articles table (blog posts and GK articles)
CREATE TABLE IF NOT EXISTS articles (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    category TEXT NOT NULL,
    image_url TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_articles_category ON articles(category);

-- province tables
CREATE TABLE IF NOT EXISTS pradesh (
    id TEXT PRIMARY KEY,
    province INTEGER NOT NULL CHECK (province BETWEEN 1 AND 7),
    title TEXT NOT NULL,
    document_url TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS pradesh_qas (
    id TEXT PRIMARY KEY,
    pradesh_id TEXT NOT NULL REFERENCES pradesh(id),
    question TEXT NOT NULL,
    answer TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS idx_pradesh_qas_pradesh_id ON pradesh_qas(pradesh_id);

-- model set tables
CREATE TABLE IF NOT EXISTS categories (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS model_sets (
    id TEXT PRIMARY KEY,
    category_id TEXT REFERENCES categories(id),
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    timer_hours INTEGER NOT NULL DEFAULT 0,
    timer_minutes INTEGER NOT NULL DEFAULT 0,
    timer_seconds INTEGER NOT NULL DEFAULT 0,
    file_url TEXT,
    interactive_url TEXT
);

CREATE INDEX IF NOT EXISTS idx_model_sets_category_id ON model_sets(category_id);

CREATE TABLE IF NOT EXISTS model_set_questions (
    id TEXT PRIMARY KEY,
    model_set_id TEXT NOT NULL REFERENCES model_sets(id),
    question_text TEXT NOT NULL,
    option_a TEXT NOT NULL,
    option_b TEXT NOT NULL,
    option_c TEXT NOT NULL,
    option_d TEXT NOT NULL,
    correct_option TEXT NOT NULL CHECK (correct_option IN ('A', 'B', 'C', 'D')),
    explanation TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS idx_model_set_questions_set_id ON model_set_questions(model_set_id);

-- attempts table (one row per started model set test)
CREATE TABLE IF NOT EXISTS attempts (
    id TEXT PRIMARY KEY,
    model_set_id TEXT NOT NULL REFERENCES model_sets(id),
    started_at TEXT NOT NULL,
    submitted_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_attempts_started_at ON attempts(started_at);

CREATE TABLE IF NOT EXISTS quizzes (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    topic TEXT NOT NULL,
    level TEXT NOT NULL
);

-- resource tables
CREATE TABLE IF NOT EXISTS template_resources (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    image_url TEXT,
    file_url TEXT
);

CREATE TABLE IF NOT EXISTS gallery_images (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    file_url TEXT,
    description TEXT NOT NULL DEFAULT '',
    caption TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS current_events (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    image_url TEXT,
    document_url TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS contact_messages (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    message TEXT NOT NULL,
    sent_at TEXT NOT NULL,
    reply TEXT
);

CREATE INDEX IF NOT EXISTS idx_contact_messages_email ON contact_messages(email);

CREATE TABLE IF NOT EXISTS jobs (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    position TEXT NOT NULL,
    vacancies INTEGER NOT NULL DEFAULT 1,
    opening_date TEXT NOT NULL,
    application_deadline TEXT NOT NULL,
    more_details TEXT,
    job_type TEXT NOT NULL,
    location TEXT NOT NULL,
    posted_at TEXT NOT NULL
);

-- bookmarks table (target_id points into the table named by kind)
CREATE TABLE IF NOT EXISTS bookmarks (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id),
    kind TEXT NOT NULL,
    target_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE(user_id, kind, target_id)
);

CREATE INDEX IF NOT EXISTS idx_bookmarks_target_id ON bookmarks(target_id);

-- objective question bank
CREATE TABLE IF NOT EXISTS objective_subjects (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS objective_sets (
    id TEXT PRIMARY KEY,
    subject_id TEXT NOT NULL REFERENCES objective_subjects(id),
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_objective_sets_subject_id ON objective_sets(subject_id);

CREATE TABLE IF NOT EXISTS objective_mcqs (
    id TEXT PRIMARY KEY,
    set_id TEXT NOT NULL REFERENCES objective_sets(id),
    question TEXT NOT NULL,
    option_a TEXT NOT NULL,
    option_b TEXT NOT NULL,
    option_c TEXT NOT NULL,
    option_d TEXT NOT NULL,
    correct_answer TEXT NOT NULL CHECK (correct_answer IN ('A', 'B', 'C', 'D')),
    explanation TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_objective_mcqs_set_id ON objective_mcqs(set_id);

-- subjective question bank
CREATE TABLE IF NOT EXISTS subjective_subjects (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS subjective_chapters (
    id TEXT PRIMARY KEY,
    subject_id TEXT NOT NULL REFERENCES subjective_subjects(id),
    name TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_subjective_chapters_subject_id ON subjective_chapters(subject_id);

CREATE TABLE IF NOT EXISTS subjective_qas (
    id TEXT PRIMARY KEY,
    chapter_id TEXT NOT NULL REFERENCES subjective_chapters(id),
    question TEXT NOT NULL,
    answer TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_subjective_qas_chapter_id ON subjective_qas(chapter_id);
"#;
