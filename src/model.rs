use crate::types::TypePair;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A dataset value that is sometimes a bare string and sometimes a list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            OneOrMany::One(s) => std::slice::from_ref(s),
            OneOrMany::Many(v) => v.as_slice(),
        };
        slice.iter().map(String::as_str)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BaseStats {
    pub hp: u32,
    pub atk: u32,
    pub def: u32,
    pub spa: u32,
    pub spd: u32,
    pub spe: u32,
}

impl BaseStats {
    pub fn total(&self) -> u32 {
        self.hp + self.atk + self.def + self.spa + self.spd + self.spe
    }
}

/// One species entry of the Showdown-style pokedex.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DexEntry {
    #[serde(default)]
    pub num: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub base_stats: Option<BaseStats>,
    #[serde(default)]
    pub forme: Option<String>,
    #[serde(default)]
    pub prevo: Option<String>,
    #[serde(default)]
    pub evos: Vec<String>,
    #[serde(default)]
    pub evo_level: Option<u32>,
    #[serde(default)]
    pub evo_type: Option<String>,
    #[serde(default)]
    pub evo_item: Option<String>,
    #[serde(flatten, default)]
    pub extras: HashMap<String, serde_json::Value>,
}

impl DexEntry {
    pub fn is_alternate_form(&self) -> bool {
        self.forme.as_deref().map_or(false, |f| !f.is_empty())
    }

    pub fn in_scope(&self, max_num: u16) -> bool {
        matches!(self.num, Some(n) if n >= 1 && n <= i64::from(max_num))
    }

    pub fn base_stat_total(&self) -> u32 {
        self.base_stats.as_ref().map_or(0, BaseStats::total)
    }
}

/// Secondary learnset entry: move id -> acquisition tags such as `3L12`, `3M`, `3T`.
/// Moves stay in source order; it breaks ties between moves learned at one level.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LearnsetEntry {
    #[serde(default)]
    pub learnset: IndexMap<String, OneOrMany>,
    #[serde(flatten, default)]
    pub extras: HashMap<String, serde_json::Value>,
}

/// Primary level-up entry: level -> move token(s).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LevelUpEntry {
    #[serde(default)]
    pub level: IndexMap<String, OneOrMany>,
    #[serde(flatten, default)]
    pub extras: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub move_type: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub base_power: Option<f64>,
    #[serde(default)]
    pub damage: Option<serde_json::Value>,
    #[serde(default)]
    pub ohko: Option<serde_json::Value>,
    #[serde(flatten, default)]
    pub extras: HashMap<String, serde_json::Value>,
}

impl MoveEntry {
    /// Status moves only count when they still deal damage (fixed damage, OHKO, power).
    pub fn is_damaging(&self) -> bool {
        !self.category.eq_ignore_ascii_case("status")
            || self.base_power.map_or(false, |bp| bp > 0.0)
            || self.damage.as_ref().map_or(false, |v| !v.is_null())
            || self.ohko.as_ref().map_or(false, |v| !v.is_null())
    }
}

pub type Pokedex = BTreeMap<String, DexEntry>;
pub type Learnsets = BTreeMap<String, LearnsetEntry>;
pub type LevelUpLearnsets = BTreeMap<String, LevelUpEntry>;
pub type MoveDataset = BTreeMap<String, MoveEntry>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub move_type: String,
    pub is_damaging: bool,
}

/// A move name paired with its resolved type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypedMove {
    pub name: String,
    #[serde(rename = "type")]
    pub move_type: String,
}

impl TypedMove {
    pub fn new(name: &str, move_type: &str) -> Self {
        TypedMove {
            name: name.to_string(),
            move_type: move_type.to_string(),
        }
    }
}

/// Move as supplied by a caller: a name, optionally with a type the caller insists on.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MoveInput {
    pub name: String,
    #[serde(default)]
    pub explicit_type: Option<String>,
}

impl From<&str> for MoveInput {
    fn from(name: &str) -> Self {
        MoveInput {
            name: name.to_string(),
            explicit_type: None,
        }
    }
}

impl From<(&str, &str)> for MoveInput {
    fn from((name, move_type): (&str, &str)) -> Self {
        MoveInput {
            name: name.to_string(),
            explicit_type: Some(move_type.to_string()).filter(|t| !t.trim().is_empty()),
        }
    }
}

/// Level -> move names learned at that level. Names are unique per level;
/// insertion order within a level is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelMap(BTreeMap<u32, Vec<String>>);

impl LevelMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses dataset-shaped level keys, keeping only their digits.
    /// Keys without any digit land on level 0.
    pub fn from_raw<'a, I, M>(raw: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, M)>,
        M: IntoIterator<Item = &'a str>,
    {
        let mut map = LevelMap::new();
        for (key, moves) in raw {
            let Some(level) = parse_level_key(key) else {
                continue;
            };
            for name in moves {
                map.insert(level, name);
            }
        }
        map
    }

    pub fn insert(&mut self, level: u32, name: &str) -> bool {
        let bucket = self.0.entry(level).or_default();
        if bucket.iter().any(|m| m == name) {
            return false;
        }
        bucket.push(name.to_string());
        true
    }

    /// Removes `name` from every level, dropping levels left empty.
    pub fn remove_move(&mut self, name: &str) {
        for bucket in self.0.values_mut() {
            bucket.retain(|m| m != name);
        }
        self.drop_empty();
    }

    pub fn drop_empty(&mut self) {
        self.0.retain(|_, bucket| !bucket.is_empty());
    }

    pub fn moves_at(&self, level: u32) -> &[String] {
        self.0.get(&level).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn levels(&self) -> impl Iterator<Item = (u32, &[String])> {
        self.0.iter().map(|(lv, moves)| (*lv, moves.as_slice()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.values().any(|bucket| bucket.iter().any(|m| m == name))
    }

    /// All `(level, move)` pairs, sorted by level then name.
    pub fn flattened(&self) -> Vec<(u32, String)> {
        let mut out: Vec<(u32, String)> = self
            .0
            .iter()
            .flat_map(|(lv, moves)| moves.iter().map(move |m| (*lv, m.clone())))
            .collect();
        out.sort();
        out
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Digits of a level key as a number; a key without digits is level 0.
/// `None` only when the digits overflow.
pub(crate) fn parse_level_key(key: &str) -> Option<u32> {
    let digits: String = key.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Some(0);
    }
    digits.parse().ok()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeciesRecord {
    pub name: String,
    pub num: i64,
    pub types: TypePair,
    pub base_stat_total: u32,
    pub learnset: LevelMap,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_map_dedupes_within_a_level() {
        let mut map = LevelMap::new();
        assert!(map.insert(5, "Tackle"));
        assert!(!map.insert(5, "Tackle"));
        assert!(map.insert(10, "Tackle"));
        assert_eq!(map.moves_at(5), ["Tackle".to_string()]);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn level_map_serializes_with_string_keys() {
        let mut map = LevelMap::new();
        map.insert(1, "Gust");
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"1":["Gust"]}"#);
        let back: LevelMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn raw_level_keys_keep_digits_only() {
        let map = LevelMap::from_raw(vec![
            ("Lv. 7", vec!["Ember"]),
            ("start", vec!["Scratch"]),
        ]);
        assert_eq!(map.moves_at(7), ["Ember".to_string()]);
        assert_eq!(map.moves_at(0), ["Scratch".to_string()]);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn learnset_entries_keep_source_move_order() {
        let entry: LearnsetEntry = serde_json::from_str(
            r#"{"learnset": {"zapcannon": ["3L1"], "tackle": ["3L1"], "absorb": "3L1"}}"#,
        )
        .unwrap();
        let ids: Vec<&str> = entry.learnset.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["zapcannon", "tackle", "absorb"]);

        let entry: LevelUpEntry =
            serde_json::from_str(r#"{"level": {"10": "Vine Whip", "1": ["Tackle"]}}"#).unwrap();
        let keys: Vec<&str> = entry.level.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["10", "1"]);
    }

    #[test]
    fn status_move_with_fixed_damage_counts_as_damaging() {
        let entry: MoveEntry = serde_json::from_str(
            r#"{"name":"Seismic Toss","type":"Fighting","category":"Physical","basePower":0,"damage":"level"}"#,
        )
        .unwrap();
        assert!(entry.is_damaging());
        let growl: MoveEntry = serde_json::from_str(
            r#"{"name":"Growl","type":"Normal","category":"Status","basePower":0}"#,
        )
        .unwrap();
        assert!(!growl.is_damaging());
    }
}
