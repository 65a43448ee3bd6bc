//! Runtime configuration from environment variables.

use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub snapshot_path: PathBuf,
    pub groups_csv: PathBuf,
    pub schedule_csv: PathBuf,
    pub knockout_csv: PathBuf,
    /// JSON slot table for the Round of 16; the six-group table when unset.
    pub pairing_table: Option<PathBuf>,
    pub export_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            snapshot_path: PathBuf::from("data/tournament.json"),
            groups_csv: PathBuf::from("data/groups.csv"),
            schedule_csv: PathBuf::from("data/schedule.csv"),
            knockout_csv: PathBuf::from("data/knockout.csv"),
            pairing_table: None,
            export_dir: PathBuf::from("data/exports"),
        }
    }
}

impl Config {
    /// HOST, PORT, SNAPSHOT_PATH, GROUPS_CSV, SCHEDULE_CSV, KNOCKOUT_CSV, PAIRING_TABLE, EXPORT_DIR.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or invalid values keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let path = |key: &str, default: PathBuf| lookup(key).map(PathBuf::from).unwrap_or(default);
        let port = match lookup("PORT") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                log::warn!("Invalid PORT '{}', using {}", raw, defaults.port);
                defaults.port
            }),
            None => defaults.port,
        };
        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            snapshot_path: path("SNAPSHOT_PATH", defaults.snapshot_path),
            groups_csv: path("GROUPS_CSV", defaults.groups_csv),
            schedule_csv: path("SCHEDULE_CSV", defaults.schedule_csv),
            knockout_csv: path("KNOCKOUT_CSV", defaults.knockout_csv),
            pairing_table: lookup("PAIRING_TABLE").map(PathBuf::from),
            export_dir: path("EXPORT_DIR", defaults.export_dir),
        }
    }
}
