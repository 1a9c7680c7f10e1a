use crate::config::StoreLocation;
use rusqlite::{Connection, Result};

pub mod storage;

pub use storage::SqliteStorage;

/// Open the store database and bring its schema up to date. A file location
/// gets its parent directory created first.
pub fn open(location: &StoreLocation) -> Result<Connection> {
    let conn = match location {
        StoreLocation::Memory => Connection::open_in_memory()?,
        StoreLocation::File(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).ok();
            }
            Connection::open(path)?
        }
    };

    run_migrations(&conn)?;

    Ok(conn)
}

fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS session_storage (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at INTEGER NOT NULL
        )",
        [],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_create_table() {
        let temp_dir = tempfile::tempdir().unwrap();
        let conn = Connection::open(temp_dir.path().join("test.db")).unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"session_storage".to_string()));
    }

    #[test]
    fn test_open_file_creates_parent_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("quiz.db");
        let location = StoreLocation::File(path.clone());
        open(&location).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_open_memory() {
        let conn = open(&StoreLocation::Memory).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM session_storage", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
