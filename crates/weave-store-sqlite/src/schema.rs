//! SQL schema for the Weave SQLite store.
//!
//! Executed once at connection startup. Catalog rows (actions, emotion tags,
//! badges) are seeded with `INSERT OR IGNORE`, so re-running is harmless.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS user_progress (
    user_id              INTEGER PRIMARY KEY,
    xp                   INTEGER NOT NULL DEFAULT 0 CHECK (xp >= 0),
    level                INTEGER NOT NULL DEFAULT 1 CHECK (level BETWEEN 1 AND 10),
    daily_xp             INTEGER NOT NULL DEFAULT 0 CHECK (daily_xp BETWEEN 0 AND 150),
    daily_xp_date        TEXT,            -- YYYY-MM-DD
    last_mood_xp_date    TEXT,
    last_journal_xp_date TEXT,
    streak_days          INTEGER NOT NULL DEFAULT 0,
    last_checkin_date    TEXT,
    total_actions        INTEGER NOT NULL DEFAULT 0,
    total_journals       INTEGER NOT NULL DEFAULT 0,
    plan                 TEXT NOT NULL DEFAULT 'free',  -- 'free' | 'premium'
    updated_at           TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS actions (
    action_id    INTEGER PRIMARY KEY,
    title        TEXT NOT NULL,
    description  TEXT,
    kind         TEXT NOT NULL,
    duration_min INTEGER NOT NULL DEFAULT 1,
    difficulty   INTEGER NOT NULL DEFAULT 1,
    is_premium   INTEGER NOT NULL DEFAULT 0,
    is_active    INTEGER NOT NULL DEFAULT 1
);

-- Append-only. No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS action_logs (
    log_id       INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id      INTEGER NOT NULL,
    action_id    INTEGER NOT NULL,
    started_at   TEXT NOT NULL,       -- RFC 3339 UTC, fixed precision
    completed_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS journal_entries (
    journal_id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id    INTEGER NOT NULL,
    content    TEXT NOT NULL,
    date       TEXT NOT NULL,
    kind       TEXT NOT NULL DEFAULT 'free',
    created_at TEXT NOT NULL
);

-- One record per user and day; later submissions update in place.
CREATE TABLE IF NOT EXISTS moods (
    mood_id      INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id      INTEGER NOT NULL,
    date         TEXT NOT NULL,
    recorded_at  TEXT NOT NULL,
    main_valence INTEGER NOT NULL CHECK (main_valence BETWEEN -2 AND 2),
    energy       INTEGER NOT NULL CHECK (energy BETWEEN 1 AND 5),
    trigger_type TEXT,
    note         TEXT,
    UNIQUE (user_id, date)
);

CREATE TABLE IF NOT EXISTS emotion_tags (
    tag_id INTEGER PRIMARY KEY,
    code   TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS mood_emotion_tags (
    mood_id INTEGER NOT NULL REFERENCES moods(mood_id) ON DELETE CASCADE,
    tag_id  INTEGER NOT NULL REFERENCES emotion_tags(tag_id),
    PRIMARY KEY (mood_id, tag_id)
);

CREATE TABLE IF NOT EXISTS badges (
    badge_id INTEGER PRIMARY KEY,
    code     TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS user_badges (
    user_id   INTEGER NOT NULL,
    badge_id  INTEGER NOT NULL REFERENCES badges(badge_id),
    earned_at TEXT NOT NULL,
    UNIQUE (user_id, badge_id)
);

CREATE INDEX IF NOT EXISTS action_logs_user_action_idx ON action_logs(user_id, action_id, completed_at);
CREATE INDEX IF NOT EXISTS journal_entries_user_date_idx ON journal_entries(user_id, date);
CREATE INDEX IF NOT EXISTS moods_user_date_idx ON moods(user_id, date);

INSERT OR IGNORE INTO actions (action_id, title, description, kind, duration_min, difficulty, is_premium, is_active)
VALUES (1, 'Take 3 deep breaths', 'Slow your breathing and relax your body.', 'breathing', 1, 1, 0, 1);

INSERT OR IGNORE INTO emotion_tags (tag_id, code) VALUES
    (1, 'joy'),
    (2, 'calm'),
    (3, 'grateful'),
    (4, 'excited'),
    (5, 'tired'),
    (6, 'sad'),
    (7, 'anxious'),
    (8, 'angry'),
    (9, 'lonely'),
    (10, 'stressed');

INSERT OR IGNORE INTO badges (badge_id, code) VALUES
    (1, 'calmdown_rookie'),
    (2, 'journal_starter'),
    (3, 'streak_7');

PRAGMA user_version = 1;
";
