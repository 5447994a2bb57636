use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::model::Team;

const CACHE_DIR: &str = "football_eswatini";
const CACHE_FILE: &str = "standings.json";
const CACHE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct SnapshotFile {
    version: u32,
    competitions: HashMap<String, StandingsSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct StandingsSnapshot {
    table: Vec<Team>,
    #[serde(default)]
    saved_at: Option<u64>,
}

/// Last table shown for a competition, used as the "previous" ranking.
/// Missing, unreadable or outdated files all mean "no snapshot".
pub fn load_previous(path: &Path, competition_id: &str) -> Vec<Team> {
    let Some(file) = load_snapshot_file(path) else {
        return Vec::new();
    };
    if file.version != CACHE_VERSION {
        debug!("snapshot version {} ignored", file.version);
        return Vec::new();
    }
    file.competitions
        .get(competition_key(competition_id))
        .map(|snap| snap.table.clone())
        .unwrap_or_default()
}

pub fn save_table(path: &Path, competition_id: &str, table: &[Team]) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).context("create snapshot dir")?;
    }

    let mut file = load_snapshot_file(path)
        .filter(|f| f.version == CACHE_VERSION)
        .unwrap_or_else(|| SnapshotFile {
            version: CACHE_VERSION,
            competitions: HashMap::new(),
        });

    let table = table
        .iter()
        .map(|team| Team {
            position_change: None,
            ..team.clone()
        })
        .collect();
    file.competitions.insert(
        competition_key(competition_id).to_string(),
        StandingsSnapshot {
            table,
            saved_at: system_time_to_secs(SystemTime::now()),
        },
    );

    let json = serde_json::to_string(&file).context("serialize standings snapshot")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).context("write standings snapshot")?;
    fs::rename(&tmp, path).context("swap standings snapshot")?;
    Ok(())
}

fn load_snapshot_file(path: &Path) -> Option<SnapshotFile> {
    let raw = fs::read_to_string(path).ok()?;
    match serde_json::from_str::<SnapshotFile>(&raw) {
        Ok(file) => Some(file),
        Err(err) => {
            debug!("snapshot at {} unreadable: {err}", path.display());
            None
        }
    }
}

/// `override_dir`, else `$XDG_CACHE_HOME`, else `~/.cache`.
pub fn snapshot_path(override_dir: Option<&Path>) -> Option<PathBuf> {
    if let Some(dir) = override_dir {
        return Some(dir.join(CACHE_FILE));
    }
    if let Ok(base) = std::env::var("XDG_CACHE_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(CACHE_DIR).join(CACHE_FILE));
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".cache")
            .join(CACHE_DIR)
            .join(CACHE_FILE),
    )
}

fn competition_key(competition_id: &str) -> &str {
    let trimmed = competition_id.trim();
    if trimmed.is_empty() { "default" } else { trimmed }
}

fn system_time_to_secs(time: SystemTime) -> Option<u64> {
    time.duration_since(UNIX_EPOCH).ok().map(|d| d.as_secs())
}
