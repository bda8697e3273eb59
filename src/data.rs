use crate::error::DataSource;
use crate::model::{Learnsets, LevelUpLearnsets, MoveDataset, Pokedex};
use anyhow::Context;
use log::{info, warn};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

pub const POKEDEX_FILE: &str = "pokedex.json";
pub const LEARNSETS_FILE: &str = "learnsets.json";
pub const LEVEL_UP_FILE: &str = "gen3.json";
pub const MOVES_FILE: &str = "moves.json";

pub fn load_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read dataset at {}", path.display()))?;
    let parsed: T = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse JSON from {}", path.display()))?;
    Ok(parsed)
}

/// The raw datasets of one session. A `None` slot is an unavailable source.
#[derive(Debug, Clone, Default)]
pub struct Datasets {
    pub pokedex: Option<Arc<Pokedex>>,
    pub learnsets: Option<Arc<Learnsets>>,
    pub level_up: Option<Arc<LevelUpLearnsets>>,
    pub moves: Option<Arc<MoveDataset>>,
}

impl Datasets {
    /// Loads every dataset found in `dir`. A file that is missing or does not
    /// parse is logged and left unavailable.
    pub fn load_dir(dir: &Path) -> Self {
        let datasets = Datasets {
            pokedex: load_optional(dir, POKEDEX_FILE, DataSource::Pokedex),
            learnsets: load_optional(dir, LEARNSETS_FILE, DataSource::Learnsets),
            level_up: load_optional(dir, LEVEL_UP_FILE, DataSource::LevelUp),
            moves: load_optional(dir, MOVES_FILE, DataSource::Moves),
        };
        info!(
            "loaded datasets from {}: pokedex={} learnsets={} level-up={} moves={}",
            dir.display(),
            datasets.pokedex.as_ref().map_or(0, |d| d.len()),
            datasets.learnsets.as_ref().map_or(0, |d| d.len()),
            datasets.level_up.as_ref().map_or(0, |d| d.len()),
            datasets.moves.as_ref().map_or(0, |d| d.len()),
        );
        datasets
    }

    pub fn with_pokedex(mut self, pokedex: Pokedex) -> Self {
        self.pokedex = Some(Arc::new(pokedex));
        self
    }

    pub fn with_learnsets(mut self, learnsets: Learnsets) -> Self {
        self.learnsets = Some(Arc::new(learnsets));
        self
    }

    pub fn with_level_up(mut self, level_up: LevelUpLearnsets) -> Self {
        self.level_up = Some(Arc::new(level_up));
        self
    }

    pub fn with_moves(mut self, moves: MoveDataset) -> Self {
        self.moves = Some(Arc::new(moves));
        self
    }

    pub fn is_available(&self, source: DataSource) -> bool {
        match source {
            DataSource::Pokedex => self.pokedex.is_some(),
            DataSource::Learnsets => self.learnsets.is_some(),
            DataSource::LevelUp => self.level_up.is_some(),
            DataSource::Moves => self.moves.is_some(),
        }
    }
}

fn load_optional<T: DeserializeOwned>(dir: &Path, file: &str, source: DataSource) -> Option<Arc<T>> {
    match load_json(&dir.join(file)) {
        Ok(parsed) => Some(Arc::new(parsed)),
        Err(e) => {
            warn!("{source} dataset unavailable: {e:#}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_directory_leaves_every_source_unavailable() {
        let datasets = Datasets::load_dir(Path::new("/nonexistent/pokemon-learnset-core"));
        for source in [
            DataSource::Pokedex,
            DataSource::Learnsets,
            DataSource::LevelUp,
            DataSource::Moves,
        ] {
            assert!(!datasets.is_available(source));
        }
    }

    #[test]
    fn load_json_reports_path_on_failure() {
        let err = load_json::<Pokedex>(Path::new("/nonexistent/pokedex.json")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/pokedex.json"));
    }
}
