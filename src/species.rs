use crate::error::{DataError, DataSource};
use crate::model::{DexEntry, Pokedex};
use log::debug;
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Highest national dex number the active ruleset admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DexScope {
    #[default]
    Kanto,
    National,
}

impl DexScope {
    pub fn max_num(self) -> u16 {
        match self {
            DexScope::Kanto => 151,
            DexScope::National => 386,
        }
    }
}

impl fmt::Display for DexScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.max_num())
    }
}

impl FromStr for DexScope {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "151" => Ok(DexScope::Kanto),
            "386" => Ok(DexScope::National),
            other => anyhow::bail!("dex scope must be 151 or 386, got {other}"),
        }
    }
}

/// Species id: lowercase ASCII letters and digits, with the gender marks
/// spelled out (`Nidoran♀` -> `nidoranf`).
pub fn species_key(name: &str) -> String {
    name.to_lowercase()
        .replace('♀', "f")
        .replace('♂', "m")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "method", content = "detail", rename_all = "camelCase")]
pub enum EvolutionMethod {
    Level(u32),
    Item(Option<String>),
    Trade,
    LevelMove,
    Other(String),
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvolutionOption {
    pub to: String,
    pub method: EvolutionMethod,
}

/// Pokedex view restricted to one dex scope, excluding alternate forms.
#[derive(Debug, Clone)]
pub struct SpeciesGraph {
    pokedex: Option<Arc<Pokedex>>,
    scope: DexScope,
}

impl SpeciesGraph {
    pub fn new(pokedex: Option<Arc<Pokedex>>, scope: DexScope) -> Self {
        SpeciesGraph { pokedex, scope }
    }

    pub fn scope(&self) -> DexScope {
        self.scope
    }

    pub fn is_available(&self) -> bool {
        self.pokedex.is_some()
    }

    fn dex(&self) -> Result<&Pokedex, DataError> {
        self.pokedex
            .as_deref()
            .ok_or(DataError::SourceUnavailable(DataSource::Pokedex))
    }

    fn admits(&self, entry: &DexEntry) -> bool {
        !entry.is_alternate_form() && entry.in_scope(self.scope.max_num())
    }

    /// Resolves a species by key, then by scanning every entry for a matching
    /// normalized name.
    pub fn find(&self, name: &str) -> Result<&DexEntry, DataError> {
        let dex = self.dex()?;
        let sid = species_key(name);
        let direct = dex.get(&sid);
        if let Some(entry) = direct.filter(|e| self.admits(e)) {
            return Ok(entry);
        }
        debug!("species `{name}` missed direct lookup, scanning pokedex");
        if let Some(entry) = dex
            .values()
            .find(|e| self.admits(e) && species_key(&e.name) == sid)
        {
            return Ok(entry);
        }
        match direct {
            Some(entry) if !entry.is_alternate_form() => Err(DataError::OutOfScope {
                name: entry.name.clone(),
                num: entry.num.unwrap_or(0),
                scope: self.scope.max_num(),
            }),
            _ => Err(DataError::SpeciesNotFound {
                name: name.to_string(),
                dataset: DataSource::Pokedex,
            }),
        }
    }

    pub fn base_record(&self, name: &str) -> Option<&DexEntry> {
        self.find(name).ok()
    }

    /// Walks `prevo` links back to the earliest in-scope ancestor.
    pub fn family_root(&self, name: &str) -> Result<&DexEntry, DataError> {
        let mut root = self.find(name)?;
        let mut visited: HashSet<String> = HashSet::new();
        while let Some(prevo) = root.prevo.as_deref() {
            if !visited.insert(species_key(&root.name)) {
                break;
            }
            match self.find(prevo) {
                Ok(prev) => root = prev,
                Err(_) => break,
            }
        }
        Ok(root)
    }

    /// Every in-scope member of the species' evolutionary family, in
    /// breadth-first order from the root.
    pub fn family_of(&self, name: &str) -> Result<Vec<&DexEntry>, DataError> {
        let root = self.family_root(name)?;
        let mut family = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut queue = VecDeque::from([root]);
        while let Some(current) = queue.pop_front() {
            if !seen.insert(species_key(&current.name)) {
                continue;
            }
            family.push(current);
            for evo in &current.evos {
                if let Ok(next) = self.find(evo) {
                    if !seen.contains(&species_key(&next.name)) {
                        queue.push_back(next);
                    }
                }
            }
        }
        Ok(family)
    }

    /// Key of the family root, or the species' own key when it is unknown.
    pub fn base_key_for(&self, name: &str) -> String {
        match self.family_root(name) {
            Ok(root) => species_key(&root.name),
            Err(_) => species_key(name),
        }
    }

    /// True for in-scope species with no in-scope predecessor.
    pub fn is_base_for_scope(&self, entry: &DexEntry) -> bool {
        if !self.admits(entry) {
            return false;
        }
        let Some(prevo) = entry.prevo.as_deref() else {
            return true;
        };
        let Ok(dex) = self.dex() else {
            return true;
        };
        match dex.get(&species_key(prevo)) {
            Some(pre) => !pre.in_scope(self.scope.max_num()),
            None => true,
        }
    }

    /// Base species of the scope, ordered by dex number.
    pub fn base_species(&self) -> Result<Vec<&DexEntry>, DataError> {
        let dex = self.dex()?;
        let mut bases: Vec<&DexEntry> = dex.values().filter(|e| self.is_base_for_scope(e)).collect();
        bases.sort_by(|a, b| a.num.cmp(&b.num).then_with(|| a.name.cmp(&b.name)));
        Ok(bases)
    }

    pub fn evolution_options(&self, name: &str) -> Result<Vec<EvolutionOption>, DataError> {
        let me = self.find(name)?;
        let my_key = species_key(&me.name);
        let mut options = Vec::new();
        for evo in &me.evos {
            let Ok(target) = self.find(evo) else {
                continue;
            };
            let direct_child = target
                .prevo
                .as_deref()
                .map_or(false, |p| species_key(p) == my_key);
            let method = if !direct_child {
                EvolutionMethod::Unknown
            } else if let Some(level) = target.evo_level {
                EvolutionMethod::Level(level)
            } else {
                match target.evo_type.as_deref() {
                    Some("useItem") => EvolutionMethod::Item(target.evo_item.clone()),
                    Some("trade") => EvolutionMethod::Trade,
                    Some("levelMove") => EvolutionMethod::LevelMove,
                    Some(other) => EvolutionMethod::Other(other.to_string()),
                    None => EvolutionMethod::Unknown,
                }
            };
            options.push(EvolutionOption {
                to: target.name.clone(),
                method,
            });
        }
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(scope: DexScope) -> SpeciesGraph {
        let raw = r#"{
            "nidoranf": {"num": 29, "name": "Nidoran-F", "types": ["Poison"], "evos": ["Nidorina"]},
            "nidorina": {"num": 30, "name": "Nidorina", "types": ["Poison"], "prevo": "Nidoran-F", "evoLevel": 16, "evos": ["Nidoqueen"]},
            "nidoqueen": {"num": 31, "name": "Nidoqueen", "types": ["Poison", "Ground"], "prevo": "Nidorina", "evoType": "useItem", "evoItem": "Moon Stone"},
            "pichu": {"num": 172, "name": "Pichu", "types": ["Electric"], "evos": ["Pikachu"]},
            "pikachu": {"num": 25, "name": "Pikachu", "types": ["Electric"], "prevo": "Pichu", "evos": ["Raichu", "Raichu-Alola"]},
            "raichu": {"num": 26, "name": "Raichu", "types": ["Electric"], "prevo": "Pikachu", "evoType": "useItem", "evoItem": "Thunder Stone"},
            "raichualola": {"num": 26, "name": "Raichu-Alola", "forme": "Alola", "types": ["Electric", "Psychic"], "prevo": "Pikachu"}
        }"#;
        let dex: Pokedex = serde_json::from_str(raw).unwrap();
        SpeciesGraph::new(Some(Arc::new(dex)), scope)
    }

    #[test]
    fn gender_marks_are_transliterated() {
        assert_eq!(species_key("Nidoran♀"), "nidoranf");
        assert_eq!(species_key("Nidoran♂"), "nidoranm");
        assert_eq!(species_key("Mr. Mime"), "mrmime");
        let g = graph(DexScope::Kanto);
        assert_eq!(g.find("Nidoran♀").unwrap().name, "Nidoran-F");
    }

    #[test]
    fn prevo_outside_scope_is_the_root() {
        let g = graph(DexScope::Kanto);
        let fam: Vec<&str> = g.family_of("Raichu").unwrap().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(fam, vec!["Pikachu", "Raichu"]);
        let g = graph(DexScope::National);
        let fam: Vec<&str> = g.family_of("Raichu").unwrap().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(fam, vec!["Pichu", "Pikachu", "Raichu"]);
    }

    #[test]
    fn out_of_scope_lookup_reports_scope() {
        let g = graph(DexScope::Kanto);
        assert!(matches!(g.find("Pichu"), Err(DataError::OutOfScope { num: 172, .. })));
        assert!(matches!(g.find("Missingno"), Err(DataError::SpeciesNotFound { .. })));
    }

    #[test]
    fn base_species_skip_evolved_and_forms() {
        let g = graph(DexScope::Kanto);
        let names: Vec<&str> = g.base_species().unwrap().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Pikachu", "Nidoran-F"]);
        assert_eq!(g.base_key_for("Nidoqueen"), "nidoranf");
    }

    #[test]
    fn evolution_methods_come_from_the_target() {
        let g = graph(DexScope::Kanto);
        let opts = g.evolution_options("Nidorina").unwrap();
        assert_eq!(
            opts,
            vec![EvolutionOption {
                to: "Nidoqueen".to_string(),
                method: EvolutionMethod::Item(Some("Moon Stone".to_string())),
            }]
        );
        let opts = g.evolution_options("Pikachu").unwrap();
        assert_eq!(opts.len(), 1);
        assert_eq!(opts[0].to, "Raichu");
    }

    #[test]
    fn cyclic_links_end_the_walk() {
        let raw = r#"{
            "aaa": {"num": 1, "name": "Aaa", "types": ["Normal"], "prevo": "Bbb", "evos": ["Bbb"]},
            "bbb": {"num": 2, "name": "Bbb", "types": ["Normal"], "prevo": "Aaa", "evos": ["Aaa"]}
        }"#;
        let dex: Pokedex = serde_json::from_str(raw).unwrap();
        let g = SpeciesGraph::new(Some(Arc::new(dex)), DexScope::Kanto);
        let fam: Vec<&str> = g.family_of("Aaa").unwrap().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(fam, vec!["Aaa", "Bbb"]);
        let fam: Vec<&str> = g.family_of("Bbb").unwrap().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(fam, vec!["Bbb", "Aaa"]);
        assert_eq!(g.base_key_for("Bbb"), "bbb");
    }

    #[test]
    fn missing_pokedex_is_unavailable() {
        let g = SpeciesGraph::new(None, DexScope::Kanto);
        assert_eq!(
            g.family_of("Pikachu").unwrap_err(),
            DataError::SourceUnavailable(DataSource::Pokedex)
        );
    }
}
