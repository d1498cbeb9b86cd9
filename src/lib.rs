pub mod simulation;

use anyhow::{Context, Result};
use rusqlite::Connection;
use simulation::catalog::Catalog;
use simulation::config::SimulationConfig;
use simulation::persistence;
use simulation::{FrameUpdate, Tank};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Settings for the headless driver.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub config_path: Option<PathBuf>,
    pub catalog_path: Option<PathBuf>,
    /// Defaults to a file under the user's data directory
    pub db_path: Option<PathBuf>,
    /// Ignore any saved tank and start over
    pub fresh: bool,
    pub fps: f32,
    /// Step with a fixed `1/fps` delta as fast as possible instead of real time
    pub fast: bool,
    /// Stop after this much simulated time
    pub seconds: Option<f32>,
    pub autosave_secs: f32,
    /// Collect coins and feed hungry fish automatically
    pub autoplay: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            config_path: None,
            catalog_path: None,
            db_path: None,
            fresh: false,
            fps: 60.0,
            fast: false,
            seconds: None,
            autosave_secs: 30.0,
            autoplay: false,
        }
    }
}

fn read_to_string(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

pub fn load_config(path: Option<&Path>) -> Result<SimulationConfig> {
    match path {
        Some(p) => {
            let json = read_to_string(p)?;
            SimulationConfig::from_json(&json).with_context(|| format!("invalid config {}", p.display()))
        }
        None => Ok(SimulationConfig::default()),
    }
}

pub fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    match path {
        Some(p) => {
            let json = read_to_string(p)?;
            Catalog::from_json(&json).with_context(|| format!("invalid catalog {}", p.display()))
        }
        None => Ok(Catalog::default()),
    }
}

fn open_store(path: &Path) -> Option<Connection> {
    let conn = match persistence::open_db(path) {
        Ok(c) => c,
        Err(e) => {
            log::warn!("Could not open {}: {}. Running without saves", path.display(), e);
            return None;
        }
    };
    if let Err(e) = persistence::init_schema(&conn) {
        log::warn!("Could not initialise {}: {}. Running without saves", path.display(), e);
        return None;
    }
    Some(conn)
}

fn restore_or_create(conn: Option<&Connection>, fresh: bool, config: SimulationConfig, catalog: Catalog) -> Tank {
    let saved = match conn {
        Some(c) if !fresh => match persistence::load_state(c) {
            Ok(s) => s,
            Err(e) => {
                log::warn!("Saved tank is unreadable ({}), starting fresh", e);
                None
            }
        },
        _ => None,
    };
    match saved {
        Some(snapshot) => {
            log::info!("Loaded saved tank: tick={}, fish={}", snapshot.tick, snapshot.agents.len());
            Tank::from_snapshot(snapshot, config, catalog)
        }
        None => {
            log::info!("No saved tank, starting fresh");
            Tank::new(config, catalog)
        }
    }
}

const HISTORY_ON_START: u32 = 5;

/// Replay the tail of the event log so a restart shows what happened last.
fn log_recent_history(conn: &Connection) {
    match persistence::recent_events(conn, HISTORY_ON_START) {
        Ok(events) => {
            for (tick, kind, description) in events.iter().rev() {
                log::info!("Previously (tick {}) [{}] {}", tick, kind, description);
            }
        }
        Err(e) => log::warn!("Could not read event history: {}", e),
    }
}

fn save(conn: Option<&Connection>, tank: &Tank) {
    if let Some(c) = conn {
        if let Err(e) = persistence::save_state(c, &tank.snapshot()) {
            log::error!("Auto-save failed: {}", e);
        }
    }
}

/// Stand-in for a player: sweep up coins, and drop a pellet over the hungriest fish.
fn autoplay(tank: &mut Tank) {
    let coins: Vec<(f32, f32)> = tank.economy.coins.iter().map(|c| (c.x, c.y)).collect();
    for (x, y) in coins {
        tank.collect_at(x, y);
    }
    if !tank.economy.food.is_empty() {
        return;
    }
    let hungriest = tank
        .agents
        .iter()
        .filter(|f| f.hunger < tank.config.food_hunger_threshold)
        .min_by(|a, b| a.hunger.total_cmp(&b.hunger))
        .map(|f| f.x);
    if let Some(x) = hungriest {
        tank.click_at(x, tank.config.food_drop_height);
    }
}

fn report(conn: Option<&mut Connection>, frame: &FrameUpdate) {
    for e in &frame.events {
        log::info!("[{}] {}", e.kind(), e.description());
    }
    let Some(conn) = conn else { return };
    if let Err(e) = persistence::record_events(conn, frame.tick, &frame.events) {
        log::warn!("Could not record events: {}", e);
    }
    if let Some(water) = &frame.water {
        log::debug!(
            "Water: pH {:.2}, {:.1}°C, ammonia {:.2}, algae {:.1}",
            water.ph,
            water.temperature,
            water.ammonia,
            water.algae
        );
        if let Err(e) = persistence::record_water(conn, frame.tick, water) {
            log::warn!("Could not record water reading: {}", e);
        }
    }
}

/// Run the tank headless until `seconds` of simulated time have passed, or forever.
pub fn run(opts: RunOptions) -> Result<()> {
    anyhow::ensure!(opts.fps > 0.0, "fps must be positive, got {}", opts.fps);

    let config = load_config(opts.config_path.as_deref())?;
    let catalog = load_catalog(opts.catalog_path.as_deref())?;

    let db_path = opts.db_path.clone().unwrap_or_else(persistence::default_db_path);
    log::info!("Database path: {}", db_path.display());
    let mut conn = open_store(&db_path);

    let mut tank = restore_or_create(conn.as_ref(), opts.fresh, config, catalog);
    if let Some(c) = conn.as_ref() {
        log_recent_history(c);
    }

    let tick_duration = Duration::from_secs_f32(1.0 / opts.fps);
    let autoplay_every = 1.0_f32;
    let mut last = Instant::now();
    let mut simulated = 0.0_f32;
    let mut since_save = 0.0_f32;
    let mut since_autoplay = 0.0_f32;

    log::info!("FishTank running at {} fps{}", opts.fps, if opts.fast { " (fast)" } else { "" });

    loop {
        let start = Instant::now();
        let dt = if opts.fast { tick_duration.as_secs_f32() } else { start.duration_since(last).as_secs_f32() };
        last = start;

        let frame = tank.step(dt);
        report(conn.as_mut(), &frame);

        simulated += dt;
        since_save += dt;
        since_autoplay += dt;

        if opts.autoplay && since_autoplay >= autoplay_every {
            since_autoplay = 0.0;
            autoplay(&mut tank);
        }
        if since_save >= opts.autosave_secs {
            since_save = 0.0;
            save(conn.as_ref(), &tank);
        }
        if opts.seconds.is_some_and(|limit| simulated >= limit) {
            break;
        }

        if !opts.fast {
            let elapsed = start.elapsed();
            if elapsed < tick_duration {
                std::thread::sleep(tick_duration - elapsed);
            }
        }
    }

    save(conn.as_ref(), &tank);
    log::info!(
        "Stopped after {:.1}s simulated: {} fish, {:.0} coins, {} gems",
        simulated,
        tank.agents.len(),
        tank.money,
        tank.gems
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_file_is_an_error() {
        let err = load_config(Some(Path::new("/definitely/not/here.json"))).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read"));
    }

    #[test]
    fn defaults_load_without_files() {
        assert!(load_config(None).is_ok());
        assert!(load_catalog(None).expect("catalog").species("goldfish").is_some());
    }

    #[test]
    fn fast_run_saves_the_tank() {
        let dir = std::env::temp_dir().join(format!("fishtank-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let db = dir.join("tank.db");
        let _ = std::fs::remove_file(&db);

        let opts = RunOptions {
            db_path: Some(db.clone()),
            fast: true,
            seconds: Some(2.0),
            autoplay: true,
            ..RunOptions::default()
        };
        run(opts).expect("run");

        let conn = persistence::open_db(&db).expect("open");
        let snapshot = persistence::load_state(&conn).expect("load").expect("saved");
        assert!(snapshot.tick >= 120);
        let readings: i64 = conn.query_row("SELECT COUNT(*) FROM water_readings", [], |r| r.get(0)).expect("count");
        assert!(readings >= 1);
        drop(conn);

        let again = RunOptions { db_path: Some(db.clone()), fast: true, seconds: Some(0.1), ..RunOptions::default() };
        run(again).expect("restart with history");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn autoplay_feeds_hungry_fish() {
        let config = SimulationConfig { starting_fish: 1, ..SimulationConfig::default() };
        let mut tank = Tank::with_seed(config, Catalog::default(), 42);
        tank.agents[0].hunger = 10.0;
        autoplay(&mut tank);
        assert_eq!(tank.economy.food.len(), 1);
        autoplay(&mut tank);
        assert_eq!(tank.economy.food.len(), 1, "no second pellet while one is sinking");
    }
}
