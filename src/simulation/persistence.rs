use crate::simulation::events::SimEvent;
use crate::simulation::water::WaterParams;
use crate::simulation::TankSnapshot;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use thiserror::Error;

const SCHEMA_VERSION: i64 = 1;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to encode tank state: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("failed to decode tank state: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    #[error("failed to encode event payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("save file has schema version {found}, expected {expected}")]
    SchemaMismatch { found: i64, expected: i64 },
}

pub type Result<T> = std::result::Result<T, PersistenceError>;

pub fn open_db(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY);
        INSERT OR IGNORE INTO schema_version VALUES (1);

        CREATE TABLE IF NOT EXISTS tank_state (
            id INTEGER PRIMARY KEY DEFAULT 1,
            tick INTEGER NOT NULL,
            money REAL NOT NULL,
            gems INTEGER NOT NULL,
            fish_count INTEGER NOT NULL,
            state BLOB NOT NULL,
            saved_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            tick INTEGER NOT NULL,
            event_type TEXT NOT NULL,
            subject_fish_id INTEGER,
            description TEXT NOT NULL,
            payload TEXT NOT NULL,
            timestamp TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_events_tick ON events(tick);

        CREATE TABLE IF NOT EXISTS water_readings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            tick INTEGER NOT NULL,
            ph REAL NOT NULL,
            temperature REAL NOT NULL,
            ammonia REAL NOT NULL,
            algae REAL NOT NULL,
            timestamp TEXT NOT NULL
        );
        ",
    )?;

    let found: i64 = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    if found != SCHEMA_VERSION {
        return Err(PersistenceError::SchemaMismatch { found, expected: SCHEMA_VERSION });
    }
    Ok(())
}

/// Overwrite the single saved tank.
pub fn save_state(conn: &Connection, snapshot: &TankSnapshot) -> Result<()> {
    let blob = rmp_serde::to_vec_named(snapshot)?;
    conn.execute(
        "INSERT OR REPLACE INTO tank_state (id, tick, money, gems, fish_count, state, saved_at)
         VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            snapshot.tick as i64,
            snapshot.money,
            snapshot.gems,
            snapshot.agents.len() as i64,
            blob,
            Utc::now().to_rfc3339(),
        ],
    )?;
    log::debug!("Saved tank at tick {} ({} fish)", snapshot.tick, snapshot.agents.len());
    Ok(())
}

pub fn load_state(conn: &Connection) -> Result<Option<TankSnapshot>> {
    let blob: Option<Vec<u8>> = conn
        .query_row("SELECT state FROM tank_state WHERE id = 1", [], |row| row.get(0))
        .optional()?;
    match blob {
        Some(bytes) => Ok(Some(rmp_serde::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

/// Append events to the log. Runs in one transaction.
pub fn record_events(conn: &mut Connection, tick: u64, events: &[SimEvent]) -> Result<()> {
    if events.is_empty() {
        return Ok(());
    }
    let now = Utc::now().to_rfc3339();
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO events (tick, event_type, subject_fish_id, description, payload, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for e in events {
            let payload = serde_json::to_string(e)?;
            stmt.execute(params![tick as i64, e.kind(), e.subject_fish(), e.description(), payload, now])?;
        }
    }
    tx.commit()?;
    Ok(())
}

pub fn record_water(conn: &Connection, tick: u64, water: &WaterParams) -> Result<()> {
    conn.execute(
        "INSERT INTO water_readings (tick, ph, temperature, ammonia, algae, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            tick as i64,
            water.ph as f64,
            water.temperature as f64,
            water.ammonia as f64,
            water.algae as f64,
            Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// Most recent events, newest first: (tick, kind, description).
pub fn recent_events(conn: &Connection, limit: u32) -> Result<Vec<(u64, String, String)>> {
    let mut stmt = conn.prepare("SELECT tick, event_type, description FROM events ORDER BY id DESC LIMIT ?1")?;
    let rows = stmt.query_map([limit], |row| {
        Ok((row.get::<_, i64>(0)? as u64, row.get::<_, String>(1)?, row.get::<_, String>(2)?))
    })?;
    let mut results = Vec::new();
    for r in rows {
        results.push(r?);
    }
    Ok(results)
}

pub fn default_db_path() -> PathBuf {
    let mut path = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("FishTank");
    if let Err(e) = std::fs::create_dir_all(&path) {
        log::warn!("Could not create {}: {}", path.display(), e);
    }
    path.push("fishtank.db");
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::catalog::Catalog;
    use crate::simulation::config::SimulationConfig;
    use crate::simulation::events::DeathCause;
    use crate::simulation::Tank;

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().expect("in-memory db");
        init_schema(&conn).expect("schema");
        conn
    }

    #[test]
    fn empty_database_has_no_state() {
        let conn = memory_db();
        assert!(load_state(&conn).expect("load").is_none());
    }

    #[test]
    fn schema_init_is_idempotent() {
        let conn = memory_db();
        init_schema(&conn).expect("second init");
    }

    #[test]
    fn state_survives_save_and_load() {
        let conn = memory_db();
        let mut tank = Tank::with_seed(SimulationConfig::default(), Catalog::default(), 42);
        tank.money = 1234.0;
        tank.clean_tank();
        tank.step(1.0 / 60.0);

        save_state(&conn, &tank.snapshot()).expect("save");
        let loaded = load_state(&conn).expect("load").expect("saved state");
        assert_eq!(loaded.money, 1234.0);
        assert_eq!(loaded.agents.len(), tank.agents.len());
        assert_eq!(loaded.stats.tanks_cleaned, 1);
        assert_eq!(loaded.quests.quests.len(), tank.quests.quests.len());

        tank.money = 99.0;
        save_state(&conn, &tank.snapshot()).expect("overwrite");
        let rows: i64 = conn.query_row("SELECT COUNT(*) FROM tank_state", [], |r| r.get(0)).expect("count");
        assert_eq!(rows, 1);
        assert_eq!(load_state(&conn).expect("load").expect("state").money, 99.0);
    }

    #[test]
    fn corrupt_blob_is_a_decode_error() {
        let conn = memory_db();
        conn.execute(
            "INSERT INTO tank_state (id, tick, money, gems, fish_count, state, saved_at) VALUES (1, 0, 0, 0, 0, ?1, 'now')",
            params![vec![0xc1_u8, 0x00]],
        )
        .expect("insert");
        assert!(matches!(load_state(&conn), Err(PersistenceError::Decode(_))));
    }

    #[test]
    fn events_are_logged_in_order() {
        let mut conn = memory_db();
        let events = vec![
            SimEvent::TankCleaned,
            SimEvent::Death { fish_id: 7, species_id: "guppy".into(), cause: DeathCause::PoorWater },
        ];
        record_events(&mut conn, 12, &events).expect("record");
        record_events(&mut conn, 13, &[]).expect("nothing to record");

        let recent = recent_events(&conn, 10).expect("query");
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].1, "death");
        assert_eq!(recent[1], (12, "tank_cleaned".to_string(), "Tank cleaned".to_string()));

        let payload: String = conn
            .query_row("SELECT payload FROM events WHERE event_type = 'death'", [], |r| r.get(0))
            .expect("payload");
        let decoded: SimEvent = serde_json::from_str(&payload).expect("payload is the event as JSON");
        assert_eq!(decoded, events[1]);

        let subject: Option<i64> = conn
            .query_row("SELECT subject_fish_id FROM events WHERE event_type = 'death'", [], |r| r.get(0))
            .expect("row");
        assert_eq!(subject, Some(7));
    }

    #[test]
    fn water_readings_are_appended() {
        let conn = memory_db();
        record_water(&conn, 1, &WaterParams::default()).expect("first");
        record_water(&conn, 2, &WaterParams { ammonia: 2.5, ..WaterParams::default() }).expect("second");
        let ammonia: f64 = conn
            .query_row("SELECT ammonia FROM water_readings ORDER BY tick DESC LIMIT 1", [], |r| r.get(0))
            .expect("row");
        assert_eq!(ammonia, 2.5);
    }
}
