use crate::error::{Error, Result};
use crate::model::Student;
use rusqlite::{Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const DB_FILE: &str = "transcripts.sqlite3";
/// Collection key the student list has always been stored under.
pub const STUDENTS_KEY: &str = "transcript-students";

pub fn open_db(workspace: &Path) -> Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE);
    let conn = Connection::open(&db_path).map_err(|source| Error::DatabaseOpen {
        path: db_path.clone(),
        source,
    })?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS collections(
            name TEXT PRIMARY KEY,
            payload TEXT NOT NULL,
            updated_at TEXT
        )",
        [],
    )?;
    ensure_collections_updated_at(&conn)?;

    Ok(conn)
}

fn ensure_collections_updated_at(conn: &Connection) -> Result<()> {
    if table_has_column(conn, "collections", "updated_at")? {
        return Ok(());
    }
    conn.execute("ALTER TABLE collections ADD COLUMN updated_at TEXT", [])?;
    Ok(())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let sql = format!("PRAGMA table_info({})", table);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Student collection persisted as one JSON document under [`STUDENTS_KEY`].
///
/// Opened when a workspace is selected and dropped when it is closed. Each
/// mutation rewrites the whole collection in its own transaction, so the
/// file always reflects the last completed write.
#[derive(Debug)]
pub struct StudentStore {
    workspace: PathBuf,
    conn: Connection,
}

impl StudentStore {
    pub fn open(workspace: &Path) -> Result<Self> {
        let conn = open_db(workspace)?;
        info!(workspace = %workspace.display(), "student store opened");
        Ok(Self {
            workspace: workspace.to_path_buf(),
            conn,
        })
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    pub fn read_all(&self) -> Result<Vec<Student>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM collections WHERE name = ?",
                [STUDENTS_KEY],
                |r| r.get(0),
            )
            .optional()?;
        let Some(payload) = payload else {
            debug!("no saved students");
            return Ok(Vec::new());
        };

        let value: serde_json::Value = match serde_json::from_str(&payload) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "stored collection is not valid JSON; reading as empty");
                return Ok(Vec::new());
            }
        };
        if !value.is_array() {
            warn!("stored collection is not an array; reading as empty");
            return Ok(Vec::new());
        }
        let students: Vec<Student> = serde_json::from_value(value)?;
        debug!(count = students.len(), "read students");
        Ok(students)
    }

    pub fn write_all(&self, students: &[Student]) -> Result<()> {
        let payload = serde_json::to_string_pretty(students)?;
        let now = chrono::Utc::now().to_rfc3339();
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO collections(name, payload, updated_at)
             VALUES(?, ?, ?)
             ON CONFLICT(name) DO UPDATE SET
               payload = excluded.payload,
               updated_at = excluded.updated_at",
            (STUDENTS_KEY, &payload, &now),
        )?;
        tx.commit()?;
        info!(count = students.len(), "wrote students");
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<Option<Student>> {
        Ok(self.read_all()?.into_iter().find(|s| s.id == id))
    }

    /// Adds the student, or replaces the stored record with the same id in
    /// place. Returns `true` when the record was new.
    pub fn save(&self, student: &Student) -> Result<bool> {
        let mut students = self.read_all()?;
        let created = match students.iter().position(|s| s.id == student.id) {
            Some(i) => {
                students[i] = student.clone();
                false
            }
            None => {
                students.push(student.clone());
                true
            }
        };
        self.write_all(&students)?;
        if created {
            info!(id = %student.id, name = %student.name, "added student");
        } else {
            info!(id = %student.id, name = %student.name, "updated student");
        }
        Ok(created)
    }

    /// Returns `false` when no record has the id; nothing is written then.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let students = self.read_all()?;
        let before = students.len();
        let kept: Vec<Student> = students.into_iter().filter(|s| s.id != id).collect();
        if kept.len() == before {
            debug!(id, "student not found for deletion");
            return Ok(false);
        }
        self.write_all(&kept)?;
        info!(id, "deleted student");
        Ok(true)
    }

    pub fn clear(&self) -> Result<()> {
        self.conn
            .execute("DELETE FROM collections WHERE name = ?", [STUDENTS_KEY])?;
        info!("cleared all student data");
        Ok(())
    }
}
