use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<(), String> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS store_meta (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            tier TEXT NOT NULL,
            expiration_secs INTEGER NOT NULL,
            saved_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS identities (
            key TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            last_seen TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS vectors (
            position INTEGER PRIMARY KEY,
            key TEXT NOT NULL
        );
        "
    ).map_err(|e| format!("Migration failed: {e}"))
}
