pub mod catalog;
pub mod data;
pub mod error;
pub mod learnset;
pub mod logger;
pub mod matchup;
pub mod model;
pub mod session;
pub mod species;
pub mod types;

use crate::data::Datasets;
pub use crate::error::{DataError, DataSource, Resolved};
pub use crate::learnset::moves_as_of_level as last_four_moves_by_level;
pub use crate::matchup::{rank_candidates, score_defense, score_matchup, score_offense, Combatant, Matchup};
use crate::model::MoveInput;
pub use crate::model::{LevelMap, MoveRecord, TypedMove};
pub use crate::session::Session;
pub use crate::species::DexScope;
pub use crate::types::{get_mult, TypePair};
use log::info;
use serde::Serialize;
use std::path::PathBuf;

/// One side of a `matchup` request.
#[derive(Debug, Clone)]
pub struct CombatantSpec {
    pub species: String,
    pub level: u32,
    pub moves: Vec<MoveInput>,
}

#[derive(Debug, Clone)]
pub enum Command {
    Learnset { species: String },
    Legal { species: String },
    Prefill { species: String, level: u32 },
    Evos { species: String },
    Allowed,
    Matchup { mine: CombatantSpec, theirs: CombatantSpec },
}

#[derive(Debug, Clone)]
pub struct CliOptions {
    pub data_dir: PathBuf,
    pub dex_scope: DexScope,
    pub verbose: bool,
    pub command: Command,
}

/// Parses `Name` or `Name:Type` entries separated by commas.
pub fn parse_move_list(raw: &str) -> Vec<MoveInput> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|entry| match entry.split_once(':') {
            Some((name, move_type)) => MoveInput::from((name.trim(), move_type.trim())),
            None => MoveInput::from(entry),
        })
        .collect()
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Surfaces an unavailable answer as a command failure.
fn require<T>(resolved: Resolved<T>) -> anyhow::Result<T> {
    match resolved {
        Resolved::Found(value) => Ok(value),
        Resolved::Unavailable(e) => Err(e.into()),
    }
}

pub fn run(opts: CliOptions) -> anyhow::Result<()> {
    let datasets = Datasets::load_dir(&opts.data_dir);
    let mut session = Session::new(datasets, opts.dex_scope);
    info!("dex scope {}", session.scope());

    match opts.command {
        Command::Learnset { species } => {
            let map = require(session.rebuild_learnset_for(&species))?;
            print_json(&map)
        }
        Command::Legal { species } => {
            let moves = require(session.legal_moves_for_species_chain(&species))?;
            print_json(&moves)
        }
        Command::Prefill { species, level } => {
            let moves = require(session.prefill_moves(&species, level))?;
            print_json(&moves)
        }
        Command::Evos { species } => {
            let options = require(session.evolution_options(&species))?;
            print_json(&options)
        }
        Command::Allowed => {
            let moves = require(session.allowed_moves())?;
            print_json(&moves)
        }
        Command::Matchup { mine, theirs } => {
            let me = require(session.combatant(&mine.species, mine.level, &mine.moves))?;
            let opponent = require(session.combatant(&theirs.species, theirs.level, &theirs.moves))?;
            let matchup = score_matchup(&me, &opponent);
            print_json(&matchup)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_lists_accept_optional_types() {
        let moves = parse_move_list("Surf:Water, Tackle,,  Hidden Power : Grass ");
        assert_eq!(
            moves,
            vec![
                MoveInput::from(("Surf", "Water")),
                MoveInput::from("Tackle"),
                MoveInput::from(("Hidden Power", "Grass")),
            ]
        );
    }
}
