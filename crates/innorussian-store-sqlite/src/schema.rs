//! SQL schema for the InnoRussian SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.
//!
//! Link and favourite rows reference their parents without `ON DELETE
//! CASCADE`; the store removes dependants itself before deleting a parent.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS categories (
    category_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE,
    picture     TEXT NOT NULL       -- path relative to the media root
);

CREATE TABLE IF NOT EXISTS subcategories (
    subcategory_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name           TEXT NOT NULL UNIQUE,
    picture        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS category_subcategories (
    category_id    INTEGER NOT NULL REFERENCES categories(category_id),
    subcategory_id INTEGER NOT NULL REFERENCES subcategories(subcategory_id),
    PRIMARY KEY (category_id, subcategory_id)
);

CREATE TABLE IF NOT EXISTS cards (
    card_id         INTEGER PRIMARY KEY AUTOINCREMENT,
    content         TEXT NOT NULL,
    kind            TEXT NOT NULL DEFAULT 'W' CHECK (kind IN ('W', 'D', 'S')),
    pronunciation   TEXT,            -- path of the .mp3, if any
    transliteration TEXT
);

CREATE TABLE IF NOT EXISTS card_subcategories (
    card_id        INTEGER NOT NULL REFERENCES cards(card_id),
    subcategory_id INTEGER NOT NULL REFERENCES subcategories(subcategory_id),
    PRIMARY KEY (card_id, subcategory_id)
);

CREATE TABLE IF NOT EXISTS users (
    user_id       INTEGER PRIMARY KEY AUTOINCREMENT,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,     -- argon2 PHC string
    is_staff      INTEGER NOT NULL DEFAULT 0,
    is_active     INTEGER NOT NULL DEFAULT 1,
    joined_at     TEXT NOT NULL      -- RFC 3339 UTC
);

-- One bookmark per (card, owner).
CREATE TABLE IF NOT EXISTS favourites (
    favourite_id INTEGER PRIMARY KEY AUTOINCREMENT,
    card_id      INTEGER NOT NULL REFERENCES cards(card_id),
    owner_id     INTEGER NOT NULL REFERENCES users(user_id),
    added_at     TEXT NOT NULL,
    UNIQUE (card_id, owner_id)
);

CREATE INDEX IF NOT EXISTS card_subcategories_sub_idx ON card_subcategories(subcategory_id);
CREATE INDEX IF NOT EXISTS category_subcategories_sub_idx ON category_subcategories(subcategory_id);
CREATE INDEX IF NOT EXISTS favourites_owner_idx ON favourites(owner_id, added_at);

PRAGMA user_version = 1;
";
