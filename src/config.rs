use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Runtime tunables. The gameplay constants (spawn cadence, hit
/// tolerance, pop duration) are configuration, not behavior contracts;
/// the defaults match the values the experience was tuned with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Game tick interval in milliseconds.
    pub tick_ms: u64,
    /// Arcade session length in seconds.
    pub session_secs: u32,
    /// Minimum time between bird spawns, milliseconds.
    pub spawn_interval_ms: f64,
    /// Vertical margin kept clear of spawns, playfield pixels.
    pub spawn_margin: f64,
    /// Horizontal bird speed, pixels per tick.
    pub bird_speed: f64,
    /// Random vertical drift range (±), pixels per tick.
    pub bird_drift: f64,
    pub bird_radius: f64,
    /// Extra hit-test slack beyond the bird radius, pixels.
    pub hit_tolerance: f64,
    /// How long a score pop stays visible, milliseconds.
    pub pop_duration_ms: f64,
    pub playfield_width: f64,
    pub playfield_height: f64,
    /// External hand-landmark tracker command; None runs the keyboard
    /// simulator instead.
    pub tracker_cmd: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_ms: 30,
            session_secs: 60,
            spawn_interval_ms: 1200.0,
            spawn_margin: 20.0,
            bird_speed: 3.0,
            bird_drift: 1.0,
            bird_radius: 28.0,
            hit_tolerance: 18.0,
            pop_duration_ms: 700.0,
            playfield_width: 320.0,
            playfield_height: 240.0,
            tracker_cmd: None,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "fingerpaint") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("fingerpaint_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(cfg) = serde_json::from_slice::<Config>(&bytes) {
                return cfg;
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
