//! Durable tournament snapshot: one JSON document, replaced atomically on every save.

use crate::models::{Tournament, TournamentError};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Write the snapshot to a temporary file next to the target, sync it, then rename
    /// it over the previous snapshot. A failed write leaves the previous snapshot intact.
    pub fn save(&self, tournament: &Tournament) -> Result<(), TournamentError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let tmp = self.temp_path();
        let json = serde_json::to_vec_pretty(tournament)?;
        let written = File::create(&tmp).and_then(|mut f| {
            f.write_all(&json)?;
            f.sync_all()
        });
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        fs::rename(&tmp, &self.path)?;
        log::debug!("Snapshot written to {}", self.path.display());
        Ok(())
    }

    /// Load the snapshot. `Ok(None)` when none has been written yet.
    /// Snapshots with matches referencing unknown teams are rejected.
    pub fn load(&self) -> Result<Option<Tournament>, TournamentError> {
        let bytes = match fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let tournament: Tournament = serde_json::from_slice(&bytes)?;
        tournament.validate_references()?;
        log::info!(
            "Loaded tournament {} ({} teams, {} matches)",
            tournament.id,
            tournament.teams.len(),
            tournament.matches.len()
        );
        Ok(Some(tournament))
    }
}
