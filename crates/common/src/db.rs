//! SQLite persistence for scenarios and execution history

use crate::types::{ExecutionResult, Scenario, ScenarioStatus};
use crate::{Error, Result};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Database wrapper for scenario and execution persistence.
///
/// The execution engine treats this as a record store keyed by scenario id;
/// execution results are append-only history grouped by batch id.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path.as_ref())?;

        // Enable WAL mode for better concurrency
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.init_schema()?;

        info!("Opened database at {:?}", path.as_ref());
        Ok(db)
    }

    /// Open in-memory database (for testing)
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            r#"
            -- Scenario definitions
            CREATE TABLE IF NOT EXISTS scenarios (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                definition TEXT NOT NULL,
                status TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_scenarios_status ON scenarios(status);

            -- Execution history (append-only)
            CREATE TABLE IF NOT EXISTS executions (
                id TEXT PRIMARY KEY,
                scenario_id TEXT NOT NULL,
                batch_id TEXT NOT NULL,
                result TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_executions_scenario ON executions(scenario_id);
            CREATE INDEX IF NOT EXISTS idx_executions_batch ON executions(batch_id);
            "#,
        )?;

        debug!("Database schema initialized");
        Ok(())
    }

    // ========================================================================
    // Scenarios
    // ========================================================================

    /// Insert a scenario definition
    pub fn insert_scenario(&self, scenario: &Scenario) -> Result<()> {
        let conn = self.conn.lock();
        let now = chrono::Utc::now().timestamp();

        let inserted = conn.execute(
            "INSERT OR IGNORE INTO scenarios (id, title, definition, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                scenario.id,
                scenario.title,
                serde_json::to_string(scenario)?,
                scenario.status.to_string(),
                now,
                now,
            ],
        )?;

        if inserted == 0 {
            return Err(Error::AlreadyExists {
                kind: "scenario".to_string(),
                id: scenario.id.clone(),
            });
        }

        debug!("Inserted scenario {}", scenario.id);
        Ok(())
    }

    /// Get a scenario by id
    pub fn get_scenario(&self, id: &str) -> Result<Option<Scenario>> {
        let conn = self.conn.lock();

        let definition: Option<String> = conn
            .query_row(
                "SELECT definition FROM scenarios WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;

        match definition {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// List all scenarios, newest first
    pub fn list_scenarios(&self) -> Result<Vec<Scenario>> {
        let conn = self.conn.lock();

        let mut stmt =
            conn.prepare("SELECT definition FROM scenarios ORDER BY created_at DESC, id DESC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut scenarios = Vec::new();
        for row in rows {
            scenarios.push(serde_json::from_str(&row?)?);
        }

        Ok(scenarios)
    }

    /// Record a scenario's post-run outcome: status plus observed results
    pub fn record_outcome(
        &self,
        id: &str,
        status: ScenarioStatus,
        actual_results: Option<&str>,
    ) -> Result<()> {
        let mut scenario = self.get_scenario(id)?.ok_or_else(|| Error::NotFound {
            kind: "scenario".to_string(),
            id: id.to_string(),
        })?;

        scenario.status = status;
        scenario.actual_results = actual_results.map(String::from);

        let conn = self.conn.lock();
        let now = chrono::Utc::now().timestamp();

        conn.execute(
            "UPDATE scenarios SET definition = ?1, status = ?2, updated_at = ?3 WHERE id = ?4",
            params![
                serde_json::to_string(&scenario)?,
                status.to_string(),
                now,
                id
            ],
        )?;

        debug!("Recorded outcome {} for scenario {}", status, id);
        Ok(())
    }

    /// Delete a scenario
    pub fn delete_scenario(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let rows = conn.execute("DELETE FROM scenarios WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // ========================================================================
    // Executions
    // ========================================================================

    /// Append one execution result under a batch id
    pub fn insert_execution(&self, batch_id: &str, result: &ExecutionResult) -> Result<()> {
        let conn = self.conn.lock();
        let now = chrono::Utc::now().timestamp();

        conn.execute(
            "INSERT INTO executions (id, scenario_id, batch_id, result, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                uuid::Uuid::new_v4().to_string(),
                result.scenario_id,
                batch_id,
                serde_json::to_string(result)?,
                now,
            ],
        )?;

        Ok(())
    }

    /// All results of one batch, in insertion order.
    /// The report is regenerable from this sequence at any time.
    pub fn executions_for_batch(&self, batch_id: &str) -> Result<Vec<ExecutionResult>> {
        let conn = self.conn.lock();

        let mut stmt = conn
            .prepare("SELECT result FROM executions WHERE batch_id = ?1 ORDER BY rowid ASC")?;
        let rows = stmt.query_map(params![batch_id], |row| row.get::<_, String>(0))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(serde_json::from_str(&row?)?);
        }

        Ok(results)
    }

    /// Execution history for one scenario, newest first
    pub fn executions_for_scenario(&self, scenario_id: &str) -> Result<Vec<ExecutionResult>> {
        let conn = self.conn.lock();

        let mut stmt = conn.prepare(
            "SELECT result FROM executions WHERE scenario_id = ?1 ORDER BY rowid DESC",
        )?;
        let rows = stmt.query_map(params![scenario_id], |row| row.get::<_, String>(0))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(serde_json::from_str(&row?)?);
        }

        Ok(results)
    }

    /// The most recently written batch id, if any
    pub fn latest_batch_id(&self) -> Result<Option<String>> {
        let conn = self.conn.lock();

        let id = conn
            .query_row(
                "SELECT batch_id FROM executions ORDER BY rowid DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RunStatus;

    fn sample_scenario(id: &str) -> Scenario {
        let mut s = Scenario::new("Login flow", vec!["Click \"Login\"".to_string()]);
        s.id = id.to_string();
        s
    }

    #[test]
    fn test_scenario_crud() {
        let db = Database::open_memory().unwrap();

        let scenario = sample_scenario("s1");
        db.insert_scenario(&scenario).unwrap();

        let loaded = db.get_scenario("s1").unwrap().unwrap();
        assert_eq!(loaded.title, "Login flow");
        assert_eq!(loaded.status, ScenarioStatus::Pending);

        assert_eq!(db.list_scenarios().unwrap().len(), 1);

        assert!(db.delete_scenario("s1").unwrap());
        assert!(db.get_scenario("s1").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let db = Database::open_memory().unwrap();
        db.insert_scenario(&sample_scenario("s1")).unwrap();

        let err = db.insert_scenario(&sample_scenario("s1")).unwrap_err();
        assert!(matches!(err, Error::AlreadyExists { .. }));
    }

    #[test]
    fn test_record_outcome_updates_definition() {
        let db = Database::open_memory().unwrap();
        db.insert_scenario(&sample_scenario("s1")).unwrap();

        db.record_outcome("s1", ScenarioStatus::Passed, Some("Page title: Home"))
            .unwrap();

        let loaded = db.get_scenario("s1").unwrap().unwrap();
        assert_eq!(loaded.status, ScenarioStatus::Passed);
        assert_eq!(loaded.actual_results.as_deref(), Some("Page title: Home"));
    }

    #[test]
    fn test_record_outcome_missing_scenario() {
        let db = Database::open_memory().unwrap();
        let err = db
            .record_outcome("nope", ScenarioStatus::Failed, None)
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn test_execution_history_per_batch() {
        let db = Database::open_memory().unwrap();

        let r1 = ExecutionResult {
            scenario_id: "s1".to_string(),
            status: RunStatus::Passed,
            duration_ms: 42,
            screenshots: vec!["screenshot_s1_initial.png".to_string()],
            error: None,
            actual_results: None,
            steps: vec![],
        };
        let r2 = ExecutionResult::failed("s2", "element not found");

        db.insert_execution("batch-1", &r1).unwrap();
        db.insert_execution("batch-1", &r2).unwrap();
        db.insert_execution("batch-2", &ExecutionResult::skipped("s3"))
            .unwrap();

        let batch1 = db.executions_for_batch("batch-1").unwrap();
        assert_eq!(batch1.len(), 2);
        assert_eq!(batch1[0].scenario_id, "s1");
        assert_eq!(batch1[1].status, RunStatus::Failed);

        assert_eq!(db.executions_for_scenario("s2").unwrap().len(), 1);
        assert_eq!(db.latest_batch_id().unwrap().as_deref(), Some("batch-2"));
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.db");
        let db = Database::open(&path).unwrap();
        db.insert_scenario(&sample_scenario("s1")).unwrap();
        assert!(path.exists());
    }
}
