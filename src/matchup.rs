use crate::catalog::normalize_id;
use crate::model::TypedMove;
use crate::types::{get_mult, is_immune, TypePair};
use phf::phf_set;
use serde::Serialize;

/// Fixed-damage and one-hit-KO moves: type matchups only matter for immunity.
static IMMUNITY_ONLY_MOVES: phf::Set<&'static str> = phf_set! {
    "seismictoss",
    "nightshade",
    "dragonrage",
    "sonicboom",
    "psywave",
    "superfang",
    "endeavor",
    "fissure",
    "guillotine",
    "horndrill",
    "sheercold",
};

pub fn is_immunity_only(move_name: &str) -> bool {
    IMMUNITY_ONLY_MOVES.contains(normalize_id(move_name).as_str())
}

/// Multiplier of a named move, honoring the immunity-only set.
pub fn effective_multiplier(move_name: &str, move_type: &str, defender: &TypePair) -> f32 {
    if is_immunity_only(move_name) {
        return if is_immune(move_type, defender) { 0.0 } else { 1.0 };
    }
    get_mult(move_type, defender)
}

pub fn score_offense(mult: f32) -> i32 {
    match mult {
        m if m == 4.0 => 4,
        m if m == 2.0 => 2,
        m if m == 0.5 => -2,
        m if m == 0.25 => -4,
        m if m == 0.0 => -5,
        _ => 0,
    }
}

pub fn score_defense(mult: f32) -> i32 {
    match mult {
        m if m == 4.0 => -4,
        m if m == 2.0 => -2,
        m if m == 0.5 => 2,
        m if m == 0.25 => 4,
        m if m == 0.0 => 5,
        _ => 0,
    }
}

/// One move evaluated against one defender.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveScore {
    pub name: String,
    pub move_type: String,
    pub multiplier: f32,
    pub score: i32,
}

/// The deciding move of one side: `None` when there were no moves.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pick {
    pub score: i32,
    pub name: Option<String>,
    pub multiplier: f32,
}

impl Default for Pick {
    fn default() -> Self {
        Pick {
            score: 0,
            name: None,
            multiplier: 1.0,
        }
    }
}

fn score_moves(moves: &[TypedMove], defender: &TypePair, table: fn(f32) -> i32) -> Vec<MoveScore> {
    moves
        .iter()
        .map(|mv| {
            let multiplier = effective_multiplier(&mv.name, &mv.move_type, defender);
            MoveScore {
                name: mv.name.clone(),
                move_type: mv.move_type.clone(),
                multiplier,
                score: table(multiplier),
            }
        })
        .collect()
}

/// Our best move against the opponent. Ties keep the earliest move.
pub fn best_offense(my_moves: &[TypedMove], opp_types: &TypePair) -> (Pick, Vec<MoveScore>) {
    let rows = score_moves(my_moves, opp_types, score_offense);
    let mut best: Option<&MoveScore> = None;
    for row in &rows {
        if best.map_or(true, |b| row.score > b.score) {
            best = Some(row);
        }
    }
    let pick = best.map(to_pick).unwrap_or_default();
    (pick, rows)
}

/// The opponent's most dangerous move against us. Ties keep the earliest move.
pub fn worst_defense(opp_moves: &[TypedMove], my_types: &TypePair) -> (Pick, Vec<MoveScore>) {
    let rows = score_moves(opp_moves, my_types, score_defense);
    let mut worst: Option<&MoveScore> = None;
    for row in &rows {
        if worst.map_or(true, |w| row.score < w.score) {
            worst = Some(row);
        }
    }
    let pick = worst.map(to_pick).unwrap_or_default();
    (pick, rows)
}

fn to_pick(row: &MoveScore) -> Pick {
    Pick {
        score: row.score,
        name: Some(row.name.clone()),
        multiplier: row.multiplier,
    }
}

/// A battler on either side of a matchup.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Combatant {
    pub species: String,
    pub level: u32,
    pub types: TypePair,
    pub moves: Vec<TypedMove>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Matchup {
    pub offense: Pick,
    pub defense: Pick,
    pub offense_rows: Vec<MoveScore>,
    pub defense_rows: Vec<MoveScore>,
    pub total: i32,
}

pub fn score_matchup(mine: &Combatant, opponent: &Combatant) -> Matchup {
    let (offense, offense_rows) = best_offense(&mine.moves, &opponent.types);
    let (defense, defense_rows) = worst_defense(&opponent.moves, &mine.types);
    Matchup {
        total: offense.score + defense.score,
        offense,
        defense,
        offense_rows,
        defense_rows,
    }
}

/// Scores every candidate against one opponent, best total first.
/// Equal totals keep their input order.
pub fn rank_candidates<'c>(
    candidates: &'c [Combatant],
    opponent: &Combatant,
) -> Vec<(&'c Combatant, Matchup)> {
    let mut ranked: Vec<(&Combatant, Matchup)> = candidates
        .iter()
        .map(|c| (c, score_matchup(c, opponent)))
        .collect();
    ranked.sort_by(|a, b| b.1.total.cmp(&a.1.total));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_tables_mirror_each_other() {
        for mult in [0.0, 0.25, 0.5, 1.0, 2.0, 4.0] {
            let off = score_offense(mult);
            let def = score_defense(mult);
            assert_eq!(off, -def, "mult {mult}");
        }
        assert_eq!(score_offense(1.5), 0);
    }

    #[test]
    fn immunity_only_names_normalize() {
        assert!(is_immunity_only("Seismic Toss"));
        assert!(is_immunity_only("SonicBoom"));
        assert!(is_immunity_only("Sonic Boom"));
        assert!(!is_immunity_only("Surf"));
    }

    #[test]
    fn empty_offense_is_neutral() {
        let (pick, rows) = best_offense(&[], &TypePair::single("Fire"));
        assert_eq!(pick, Pick::default());
        assert!(rows.is_empty());
    }
}
