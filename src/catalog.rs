//! Move lookup tolerant of cosmetic name variants.
//!
//! `"Thunder Punch"`, `"thunderpunch"` and `"ThunderPunch (Elemental)"` all
//! resolve to the same record.

use crate::model::{MoveDataset, MoveRecord, TypedMove};
use crate::types::normalize_type;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static PARENTHETICAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(.*?\)").expect("valid regex"));
static FORMAT_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\u{200B}-\u{200F}\u{202A}-\u{202E}]").expect("valid regex"));
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Lowercases and keeps ASCII letters and digits only.
pub fn normalize_id(token: &str) -> String {
    token
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Trimmed, lowercased display-name key.
pub fn name_key(token: &str) -> String {
    token.trim().to_lowercase()
}

/// Replaces look-alike spaces and dashes and strips invisible format characters.
pub fn clean_invisibles(raw: &str) -> String {
    let replaced: String = raw
        .chars()
        .map(|c| match c {
            '\u{00A0}' | '\u{202F}' | '\u{2009}' => ' ',
            '\u{2013}' | '\u{2014}' => '-',
            other => other,
        })
        .collect();
    let stripped = FORMAT_CHARS.replace_all(&replaced, "");
    WHITESPACE_RUN.replace_all(&stripped, " ").into_owned()
}

/// Repairs a user- or dataset-supplied move token before lookup.
pub fn clean_move_token(raw: &str) -> String {
    let cleaned = clean_invisibles(raw.trim());
    PARENTHETICAL.replace_all(&cleaned, "").trim().to_string()
}

#[derive(Debug, Clone, Default)]
pub struct MoveCatalog {
    records: Vec<MoveRecord>,
    by_id: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
    // Session-local name -> type for moves the dataset does not know.
    overrides: HashMap<String, TypedMove>,
}

impl MoveCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_dataset(moves: &MoveDataset) -> Self {
        let mut catalog = MoveCatalog::new();
        for (key, entry) in moves {
            let name = entry.name.clone().unwrap_or_else(|| key.clone());
            let record = MoveRecord {
                move_type: normalize_type(&entry.move_type).unwrap_or_default(),
                is_damaging: entry.is_damaging(),
                name,
            };
            let source_id = entry.id.as_deref().unwrap_or(key);
            catalog.insert(record, source_id);
        }
        catalog
    }

    /// Registers a record under its display name and its source identifier.
    /// Later registrations win for colliding keys.
    pub fn insert(&mut self, record: MoveRecord, source_id: &str) {
        let idx = self.records.len();
        self.by_name.insert(name_key(&record.name), idx);
        self.by_id.insert(normalize_id(&record.name), idx);
        let source = normalize_id(source_id);
        if !source.is_empty() {
            self.by_id.insert(source, idx);
        }
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn lookup(&self, token: &str) -> Option<&MoveRecord> {
        if token.trim().is_empty() {
            return None;
        }
        let cleaned = clean_move_token(token);
        self.by_id
            .get(&normalize_id(&cleaned))
            .or_else(|| self.by_name.get(&name_key(&cleaned)))
            .map(|&idx| &self.records[idx])
    }

    /// Unknown moves count as damaging.
    pub fn is_damaging(&self, name: &str) -> bool {
        match self.lookup(name) {
            Some(record) => record.is_damaging,
            None => {
                debug!("move `{name}` not in catalog, assuming damaging");
                true
            }
        }
    }

    /// Canonical display name for a token: the catalog's name when known,
    /// otherwise the repaired token itself.
    pub fn canonical_name(&self, token: &str) -> String {
        match self.lookup(token) {
            Some(record) => record.name.clone(),
            None => clean_move_token(token),
        }
    }

    /// Records a type for a move the dataset lacks. Existing overrides and
    /// known catalog moves are left untouched.
    pub fn add_override(&mut self, name: &str, move_type: &str) {
        let cleaned = clean_move_token(name);
        let key = name_key(&cleaned);
        if key.is_empty() || self.overrides.contains_key(&key) {
            return;
        }
        let resolved_type = self
            .lookup(&cleaned)
            .map(|r| r.move_type.clone())
            .filter(|t| !t.is_empty())
            .or_else(|| normalize_type(move_type))
            .unwrap_or_default();
        self.overrides
            .insert(key, TypedMove::new(&cleaned, &resolved_type));
    }

    pub fn override_type(&self, name: &str) -> Option<&str> {
        self.overrides
            .get(&name_key(&clean_move_token(name)))
            .map(|m| m.move_type.as_str())
            .filter(|t| !t.is_empty())
    }

    /// `(canonical name, type)` for a move, consulting overrides when the
    /// catalog has no type. `None` for blanks, `"(none)"` and untyped moves.
    pub fn canonical_typed(&self, name: &str) -> Option<TypedMove> {
        if name.trim() == "(none)" {
            return None;
        }
        let cleaned = clean_move_token(name);
        if cleaned.is_empty() {
            return None;
        }
        if let Some(record) = self.lookup(&cleaned) {
            let move_type = Some(record.move_type.clone())
                .filter(|t| !t.is_empty())
                .or_else(|| self.override_type(&cleaned).map(str::to_string))?;
            return Some(TypedMove::new(&record.name, &move_type));
        }
        self.overrides
            .get(&name_key(&cleaned))
            .filter(|m| !m.move_type.is_empty())
            .cloned()
    }

    /// Every damaging move name in the catalog, deduplicated and sorted
    /// case-insensitively.
    pub fn all_damaging_sorted(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .records
            .iter()
            .filter(|r| r.is_damaging)
            .map(|r| r.name.clone())
            .collect();
        sort_dedup_case_insensitive(&mut names);
        names
    }
}

pub(crate) fn sort_dedup_case_insensitive(names: &mut Vec<String>) {
    names.sort_by(|a, b| {
        a.to_lowercase()
            .cmp(&b.to_lowercase())
            .then_with(|| a.cmp(b))
    });
    names.dedup_by(|a, b| a.eq_ignore_ascii_case(b));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MoveEntry;

    fn catalog() -> MoveCatalog {
        let raw = r#"{
            "thunderpunch": {"name": "Thunder Punch", "type": "Electric", "category": "Physical", "basePower": 75},
            "hiddenpower": {"name": "Hidden Power", "type": "Normal", "category": "Special", "basePower": 60},
            "growl": {"name": "Growl", "type": "Normal", "category": "Status", "basePower": 0},
            "charm": {"name": "Charm", "type": "Fairy", "category": "Status", "basePower": 0}
        }"#;
        let dataset: MoveDataset = serde_json::from_str(raw).unwrap();
        MoveCatalog::from_dataset(&dataset)
    }

    #[test]
    fn ids_collapse_spacing_and_case() {
        assert_eq!(normalize_id("Thunder Punch"), "thunderpunch");
        assert_eq!(normalize_id("U-turn"), "uturn");
        let cat = catalog();
        let a = cat.lookup("Thunder Punch").unwrap();
        let b = cat.lookup("thunderpunch").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.move_type, "Electric");
    }

    #[test]
    fn parentheticals_and_invisibles_are_repaired() {
        assert_eq!(clean_move_token(" Hidden Power (Dark) "), "Hidden Power");
        assert_eq!(clean_invisibles("Thunder\u{00A0}\u{200B}Punch"), "Thunder Punch");
        assert_eq!(clean_invisibles("Double\u{2013}Edge"), "Double-Edge");
        let cat = catalog();
        assert_eq!(cat.lookup("Hidden Power (Dark)").unwrap().name, "Hidden Power");
    }

    #[test]
    fn unknown_moves_fail_open_as_damaging() {
        let cat = catalog();
        assert!(cat.is_damaging("Some Homebrew Move"));
        assert!(!cat.is_damaging("Growl"));
        assert!(cat.is_damaging("Thunder Punch"));
    }

    #[test]
    fn fairy_moves_are_typed_normal() {
        let cat = catalog();
        assert_eq!(cat.lookup("Charm").unwrap().move_type, "Normal");
    }

    #[test]
    fn overrides_are_a_fallback_only() {
        let mut cat = catalog();
        cat.add_override("Shadow Rush", "dark");
        cat.add_override("Thunder Punch", "Fire");
        assert_eq!(
            cat.canonical_typed("shadow rush"),
            Some(TypedMove::new("Shadow Rush", "Dark"))
        );
        assert_eq!(
            cat.canonical_typed("thunderpunch"),
            Some(TypedMove::new("Thunder Punch", "Electric"))
        );
        assert_eq!(cat.canonical_typed("(none)"), None);
        assert_eq!(cat.canonical_typed("Mystery"), None);
    }

    #[test]
    fn damaging_listing_is_sorted_case_insensitively() {
        let cat = catalog();
        assert_eq!(cat.all_damaging_sorted(), vec!["Hidden Power", "Thunder Punch"]);
        let entry: MoveEntry =
            serde_json::from_str(r#"{"name":"Fissure","type":"Ground","category":"Physical","ohko":true}"#)
                .unwrap();
        assert!(entry.is_damaging());
    }
}
