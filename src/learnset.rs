//! Learnset resolution: level-up maps merged from two datasets, family-wide
//! legal move lists, and "last four moves" prefill.

use crate::catalog::{sort_dedup_case_insensitive, MoveCatalog};
use crate::error::{DataError, DataSource, Resolved};
use crate::model::{parse_level_key, Learnsets, LevelMap, LevelUpLearnsets};
use crate::species::{species_key, SpeciesGraph};
use log::debug;
use once_cell::sync::Lazy;
use phf::phf_map;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};

/// Level-up tag for the target generation, e.g. `3L12`.
static LEVEL_UP_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^3L(\d+)$").expect("valid regex"));
const LEVEL_UP_PREFIX: &str = "3L";
const MACHINE_TAG: &str = "3M";
const TUTOR_TAG: &str = "3T";

/// Inherited moves that upstream data lists but this ruleset never teaches.
static REMOVED_MOVES: phf::Map<&'static str, &'static str> = phf_map! {
    "charmander" => "Rage",
    "charmeleon" => "Rage",
    "charizard" => "Rage",
};

/// Moves the legendary birds always know at level 1.
static LEVEL_ONE_MOVES: phf::Map<&'static str, [&'static str; 2]> = phf_map! {
    "articuno" => ["Gust", "Powder Snow"],
    "zapdos" => ["Peck", "Thundershock"],
    "moltres" => ["Ember", "Wing Attack"],
};

/// Looks a species up by normalized key, falling back to a scan of all keys.
fn find_species_entry<'m, V>(map: &'m BTreeMap<String, V>, name: &str) -> Option<&'m V> {
    let sid = species_key(name);
    if let Some(entry) = map.get(&sid) {
        return Some(entry);
    }
    let found = map
        .iter()
        .find(|(key, _)| species_key(key) == sid)
        .map(|(_, entry)| entry);
    if found.is_some() {
        debug!("species `{name}` matched by key scan");
    }
    found
}

fn level_up_levels<'t>(tags: impl Iterator<Item = &'t str>) -> Vec<u32> {
    tags.filter_map(|tag| LEVEL_UP_TAG.captures(tag))
        .filter_map(|caps| caps.get(1)?.as_str().parse().ok())
        .collect()
}

fn is_learnable_tag(tag: &str) -> bool {
    tag.starts_with(LEVEL_UP_PREFIX) || tag == MACHINE_TAG || tag == TUTOR_TAG
}

/// Applies the per-species removal and level-1 tables. Running it twice
/// leaves the map unchanged.
pub fn apply_corrections(catalog: &MoveCatalog, species_name: &str, map: &mut LevelMap) {
    let sid = species_key(species_name);
    if let Some(removed) = REMOVED_MOVES.get(sid.as_str()) {
        map.remove_move(&catalog.canonical_name(removed));
    }
    if let Some(moves) = LEVEL_ONE_MOVES.get(sid.as_str()) {
        for name in moves {
            map.insert(1, &catalog.canonical_name(name));
        }
    }
    map.drop_empty();
}

/// The last four distinct moves learned at or below `level`, oldest first.
///
/// A move keeps its earliest level; listing it again later does not make it
/// more recent.
pub fn moves_as_of_level(map: &LevelMap, level: u32) -> Vec<String> {
    let mut entries: Vec<(u32, usize, &str)> = map
        .levels()
        .flat_map(|(lv, moves)| moves.iter().map(move |m| (lv, m.as_str())))
        .enumerate()
        .map(|(idx, (lv, name))| (lv, idx, name))
        .filter(|(lv, _, _)| *lv <= level)
        .collect();
    entries.sort_by_key(|(lv, idx, _)| (*lv, *idx));

    let mut seen: HashSet<&str> = HashSet::new();
    let ordered: Vec<&str> = entries
        .into_iter()
        .filter(|(_, _, name)| seen.insert(name))
        .map(|(_, _, name)| name)
        .collect();
    let start = ordered.len().saturating_sub(4);
    ordered[start..].iter().map(|s| s.to_string()).collect()
}

/// Borrowed view over the catalogs one resolution needs.
pub struct LearnsetResolver<'a> {
    catalog: &'a MoveCatalog,
    graph: &'a SpeciesGraph,
    learnsets: Option<&'a Learnsets>,
    level_up: Option<&'a LevelUpLearnsets>,
}

impl<'a> LearnsetResolver<'a> {
    pub fn new(
        catalog: &'a MoveCatalog,
        graph: &'a SpeciesGraph,
        learnsets: Option<&'a Learnsets>,
        level_up: Option<&'a LevelUpLearnsets>,
    ) -> Self {
        LearnsetResolver {
            catalog,
            graph,
            learnsets,
            level_up,
        }
    }

    fn merge_damaging(&self, map: &mut LevelMap, level: u32, token: &str) {
        let name = self.catalog.canonical_name(token);
        if !name.is_empty() && self.catalog.is_damaging(&name) {
            map.insert(level, &name);
        }
    }

    /// Level-up moves of one species: union of both datasets, then corrections.
    pub fn rebuild_learnset(&self, species_name: &str) -> Resolved<LevelMap> {
        if self.level_up.is_none() && self.learnsets.is_none() {
            return Resolved::Unavailable(DataError::SourceUnavailable(DataSource::LevelUp));
        }
        let mut map = LevelMap::new();
        let mut located = false;

        if let Some(entry) = self.level_up.and_then(|ds| find_species_entry(ds, species_name)) {
            located = true;
            for (key, tokens) in &entry.level {
                let Some(level) = parse_level_key(key) else {
                    debug!("skipping level key `{key}` for {species_name}");
                    continue;
                };
                for token in tokens.iter() {
                    self.merge_damaging(&mut map, level, token);
                }
            }
        }

        if let Some(entry) = self.learnsets.and_then(|ds| find_species_entry(ds, species_name)) {
            located = true;
            for (move_id, tags) in &entry.learnset {
                let levels = level_up_levels(tags.iter());
                for level in levels {
                    self.merge_damaging(&mut map, level, move_id);
                }
            }
        }

        if !located {
            let dataset = if self.level_up.is_some() {
                DataSource::LevelUp
            } else {
                DataSource::Learnsets
            };
            return Resolved::Unavailable(DataError::SpeciesNotFound {
                name: species_name.to_string(),
                dataset,
            });
        }

        apply_corrections(self.catalog, species_name, &mut map);
        Resolved::Found(map)
    }

    /// Every damaging move any member of the species' family can learn by
    /// level-up, machine or tutor, sorted case-insensitively.
    pub fn legal_moves_for_family(&self, species_name: &str) -> Resolved<Vec<String>> {
        let Some(learnsets) = self.learnsets else {
            return Resolved::Unavailable(DataError::SourceUnavailable(DataSource::Learnsets));
        };
        let family = match self.graph.family_of(species_name) {
            Ok(family) => family,
            Err(e) => return Resolved::Unavailable(e),
        };

        let mut seen: HashSet<String> = HashSet::new();
        let mut out: Vec<String> = Vec::new();
        for member in family {
            let Some(entry) = find_species_entry(learnsets, &member.name) else {
                debug!("no learnset entry for family member {}", member.name);
                continue;
            };
            for (move_id, tags) in &entry.learnset {
                if !tags.iter().any(is_learnable_tag) {
                    continue;
                }
                let name = self.catalog.canonical_name(move_id);
                if name.is_empty() || !self.catalog.is_damaging(&name) {
                    continue;
                }
                if seen.insert(name.to_lowercase()) {
                    out.push(name);
                }
            }
        }
        sort_dedup_case_insensitive(&mut out);
        Resolved::Found(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_of(levels: &[(u32, &[&str])]) -> LevelMap {
        let mut map = LevelMap::new();
        for (lv, moves) in levels {
            for m in *moves {
                map.insert(*lv, m);
            }
        }
        map
    }

    #[test]
    fn recency_keeps_first_occurrence() {
        let map = map_of(&[(5, &["Tackle"]), (10, &["Tackle", "Growl"]), (12, &["Ember"])]);
        assert_eq!(moves_as_of_level(&map, 10), vec!["Tackle", "Growl"]);
        assert_eq!(moves_as_of_level(&map, 12), vec!["Tackle", "Growl", "Ember"]);
        assert!(moves_as_of_level(&map, 4).is_empty());
    }

    #[test]
    fn only_last_four_are_returned() {
        let map = map_of(&[
            (1, &["Scratch"]),
            (7, &["Ember"]),
            (13, &["Metal Claw"]),
            (19, &["Rage"]),
            (25, &["Slash", "Flamethrower"]),
        ]);
        assert_eq!(
            moves_as_of_level(&map, 30),
            vec!["Metal Claw", "Rage", "Slash", "Flamethrower"]
        );
    }

    #[test]
    fn corrections_are_idempotent() {
        let catalog = MoveCatalog::new();
        let mut map = map_of(&[(1, &["Scratch"]), (24, &["Rage"])]);
        apply_corrections(&catalog, "Charmeleon", &mut map);
        assert!(!map.contains("Rage"));
        assert_eq!(map.len(), 1);
        let once = map.clone();
        apply_corrections(&catalog, "Charmeleon", &mut map);
        assert_eq!(map, once);

        let mut birds = LevelMap::new();
        apply_corrections(&catalog, "Moltres", &mut birds);
        apply_corrections(&catalog, "Moltres", &mut birds);
        assert_eq!(birds.moves_at(1), ["Ember".to_string(), "Wing Attack".to_string()]);
    }

    #[test]
    fn tag_parsing_only_accepts_target_generation() {
        let tags = ["3L12", "4L15", "3M", "3L", "x3L9"];
        assert_eq!(level_up_levels(tags.iter().copied()), vec![12]);
        assert!(is_learnable_tag("3T"));
        assert!(is_learnable_tag("3L40"));
        assert!(!is_learnable_tag("4M"));
        assert!(!is_learnable_tag("3E"));
    }
}
