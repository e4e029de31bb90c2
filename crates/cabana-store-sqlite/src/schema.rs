//! SQL schema for the Cabana SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Single-row pool configuration. A missing row means defaults.
CREATE TABLE IF NOT EXISTS pool_config (
    config_id           INTEGER PRIMARY KEY CHECK (config_id = 1),
    max_capacity        INTEGER NOT NULL CHECK (max_capacity >= 1),
    max_hours_per_visit INTEGER NOT NULL CHECK (max_hours_per_visit BETWEEN 1 AND 12),
    opening_time        TEXT    NOT NULL,   -- HH:MM
    closing_time        TEXT    NOT NULL,   -- HH:MM
    is_active           INTEGER NOT NULL,   -- 0 | 1
    updated_at          TEXT                -- RFC 3339 UTC or NULL
);

CREATE TABLE IF NOT EXISTS registrations (
    registration_id TEXT PRIMARY KEY,
    first_name      TEXT NOT NULL,
    last_name       TEXT NOT NULL,
    document_number TEXT,              -- not unique: departments may share
    guest_type      TEXT NOT NULL,     -- 'resident' | 'friend' | 'tenant' | 'airbnb'
    department_code TEXT NOT NULL,
    registered_by   TEXT NOT NULL,
    created_at      TEXT NOT NULL
);

-- Access records outlive the roster entry they reference, so person_id
-- carries no foreign key.
CREATE TABLE IF NOT EXISTS accesses (
    access_id          TEXT PRIMARY KEY,
    person_kind        TEXT    NOT NULL,   -- 'owner' | 'guest'
    person_id          TEXT    NOT NULL,
    guest_type         TEXT,               -- NULL for owners
    person_name        TEXT,
    department_code    TEXT    NOT NULL,
    entry_time         TEXT    NOT NULL,
    estimated_hours    INTEGER NOT NULL CHECK (estimated_hours >= 1),
    expected_exit_time TEXT    NOT NULL,
    actual_exit_time   TEXT,
    status             TEXT    NOT NULL,   -- 'active' | 'completed'
    CHECK ((status = 'active') = (actual_exit_time IS NULL)),
    CHECK (actual_exit_time IS NULL OR actual_exit_time >= entry_time)
);

-- At most one active access per person.
CREATE UNIQUE INDEX IF NOT EXISTS accesses_active_person_idx
    ON accesses(person_id) WHERE status = 'active';

CREATE INDEX IF NOT EXISTS accesses_status_idx      ON accesses(status);
CREATE INDEX IF NOT EXISTS accesses_department_idx  ON accesses(department_code);
CREATE INDEX IF NOT EXISTS accesses_entry_idx       ON accesses(entry_time);
CREATE INDEX IF NOT EXISTS registrations_dept_idx   ON registrations(department_code);

PRAGMA user_version = 1;
";
