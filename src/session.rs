//! One dex scope's worth of catalogs and memoized answers.
//!
//! Callers build a [`Session`] from loaded [`Datasets`] and route every
//! resolver and scorer call through it. Switching the dex scope drops all
//! scope-dependent state.

use crate::catalog::{clean_move_token, name_key, sort_dedup_case_insensitive, MoveCatalog};
use crate::data::Datasets;
use crate::error::{DataError, DataSource, Resolved};
use crate::learnset::{moves_as_of_level, LearnsetResolver};
use crate::matchup::Combatant;
use crate::model::{DexEntry, LevelMap, MoveInput, MoveRecord, SpeciesRecord, TypedMove};
use crate::species::{species_key, DexScope, EvolutionOption, SpeciesGraph};
use crate::types::{normalize_type, title_case, TypePair};
use log::{debug, info};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};

pub const MAX_MOVES: usize = 4;

pub struct Session {
    datasets: Datasets,
    catalog: MoveCatalog,
    graph: SpeciesGraph,
    species_db: HashMap<String, SpeciesRecord>,
    legal_cache: HashMap<String, Vec<String>>,
    allowed_cache: Option<Vec<String>>,
}

impl Session {
    pub fn new(datasets: Datasets, scope: DexScope) -> Self {
        let catalog = datasets
            .moves
            .as_deref()
            .map(MoveCatalog::from_dataset)
            .unwrap_or_default();
        let graph = SpeciesGraph::new(datasets.pokedex.clone(), scope);
        Session {
            datasets,
            catalog,
            graph,
            species_db: HashMap::new(),
            legal_cache: HashMap::new(),
            allowed_cache: None,
        }
    }

    pub fn scope(&self) -> DexScope {
        self.graph.scope()
    }

    /// Rebuilds the species graph for `scope` and forgets every cached
    /// species record and move list. Move overrides survive.
    pub fn set_dex_scope(&mut self, scope: DexScope) {
        if scope == self.scope() {
            return;
        }
        info!("dex scope {} -> {}", self.scope(), scope);
        self.graph = SpeciesGraph::new(self.datasets.pokedex.clone(), scope);
        self.species_db.clear();
        self.legal_cache.clear();
        self.allowed_cache = None;
    }

    pub fn catalog(&self) -> &MoveCatalog {
        &self.catalog
    }

    pub fn graph(&self) -> &SpeciesGraph {
        &self.graph
    }

    fn resolver(&self) -> LearnsetResolver<'_> {
        LearnsetResolver::new(
            &self.catalog,
            &self.graph,
            self.datasets.learnsets.as_deref(),
            self.datasets.level_up.as_deref(),
        )
    }

    pub fn lookup_move(&self, token: &str) -> Option<&MoveRecord> {
        self.catalog.lookup(token)
    }

    pub fn move_is_damaging(&self, name: &str) -> bool {
        self.catalog.is_damaging(name)
    }

    pub fn add_move_override(&mut self, name: &str, move_type: &str) {
        self.catalog.add_override(name, move_type);
    }

    pub fn canonical_typed(&self, name: &str) -> Option<TypedMove> {
        self.catalog.canonical_typed(name)
    }

    pub fn rebuild_learnset_for(&self, species_name: &str) -> Resolved<LevelMap> {
        self.resolver().rebuild_learnset(species_name)
    }

    /// Family-wide legal damaging moves, memoized per species for this scope.
    pub fn legal_moves_for_species_chain(&mut self, species_name: &str) -> Resolved<Vec<String>> {
        let key = species_key(species_name);
        if let Some(cached) = self.legal_cache.get(&key) {
            return Resolved::Found(cached.clone());
        }
        let resolved = self.resolver().legal_moves_for_family(species_name);
        if let Resolved::Found(moves) = &resolved {
            self.legal_cache.insert(key, moves.clone());
        }
        resolved
    }

    fn make_record(&self, entry: &DexEntry) -> SpeciesRecord {
        let learnset = match self.resolver().rebuild_learnset(&entry.name) {
            Resolved::Found(map) => map,
            Resolved::Unavailable(e) => {
                debug!("empty learnset for {}: {e}", entry.name);
                LevelMap::new()
            }
        };
        SpeciesRecord {
            name: entry.name.clone(),
            num: entry.num.unwrap_or(0),
            types: TypePair::from_raw(&entry.types),
            base_stat_total: entry.base_stat_total(),
            learnset,
        }
    }

    /// The cached record for a species, built on first use.
    pub fn ensure_species(&mut self, name: &str) -> Resolved<&SpeciesRecord> {
        let entry = match self.graph.find(name) {
            Ok(entry) => entry,
            Err(e) => return Resolved::Unavailable(e),
        };
        let key = species_key(&entry.name);
        if !self.species_db.contains_key(&key) {
            let record = self.make_record(entry);
            self.species_db.insert(key.clone(), record);
        }
        match self.species_db.get(&key) {
            Some(record) => Resolved::Found(record),
            None => Resolved::Unavailable(DataError::SpeciesNotFound {
                name: name.to_string(),
                dataset: DataSource::Pokedex,
            }),
        }
    }

    /// Builds records for every base species of the scope. Returns how many
    /// records the session now holds.
    pub fn build_catalog(&mut self) -> Resolved<usize> {
        let records: Vec<SpeciesRecord> = {
            let bases = match self.graph.base_species() {
                Ok(bases) => bases,
                Err(e) => return Resolved::Unavailable(e),
            };
            bases.par_iter().map(|entry| self.make_record(entry)).collect()
        };
        for record in records {
            self.species_db.insert(species_key(&record.name), record);
        }
        info!(
            "species catalog for scope {} holds {} records",
            self.scope(),
            self.species_db.len()
        );
        Resolved::Found(self.species_db.len())
    }

    /// Cached records sorted by dex number.
    pub fn species_records(&self) -> Vec<&SpeciesRecord> {
        let mut records: Vec<&SpeciesRecord> = self.species_db.values().collect();
        records.sort_by(|a, b| a.num.cmp(&b.num).then_with(|| a.name.cmp(&b.name)));
        records
    }

    /// Union of the family-wide legal moves of every base species, memoized
    /// for the scope.
    pub fn allowed_moves(&mut self) -> Resolved<Vec<String>> {
        if let Some(cached) = &self.allowed_cache {
            return Resolved::Found(cached.clone());
        }
        let resolved: Vec<(String, Resolved<Vec<String>>)> = {
            let bases = match self.graph.base_species() {
                Ok(bases) => bases,
                Err(e) => return Resolved::Unavailable(e),
            };
            let resolver = self.resolver();
            bases
                .par_iter()
                .map(|entry| (species_key(&entry.name), resolver.legal_moves_for_family(&entry.name)))
                .collect()
        };

        let mut allowed: Vec<String> = Vec::new();
        for (key, result) in resolved {
            match result {
                Resolved::Found(moves) => {
                    allowed.extend(moves.iter().cloned());
                    self.legal_cache.insert(key, moves);
                }
                Resolved::Unavailable(DataError::SourceUnavailable(source)) => {
                    return Resolved::Unavailable(DataError::SourceUnavailable(source));
                }
                Resolved::Unavailable(e) => debug!("skipping {key} in allowed moves: {e}"),
            }
        }
        sort_dedup_case_insensitive(&mut allowed);
        self.allowed_cache = Some(allowed.clone());
        Resolved::Found(allowed)
    }

    /// The four most recent damaging moves a species knows at `level`,
    /// each paired with its type.
    pub fn prefill_moves(&mut self, species_name: &str, level: u32) -> Resolved<Vec<TypedMove>> {
        let learned = match self.ensure_species(species_name) {
            Resolved::Found(record) => moves_as_of_level(&record.learnset, level),
            Resolved::Unavailable(e) => return Resolved::Unavailable(e),
        };
        let typed = learned
            .iter()
            .filter(|name| self.catalog.is_damaging(name))
            .filter_map(|name| self.catalog.canonical_typed(name))
            .collect();
        Resolved::Found(typed)
    }

    /// Canonicalizes caller-supplied moves: known names take the catalog's
    /// spelling, explicit types win over catalog types, duplicates collapse,
    /// and at most four survive.
    pub fn normalize_moves(&self, inputs: &[MoveInput]) -> Vec<TypedMove> {
        let mut seen: HashSet<(String, String)> = HashSet::new();
        let mut out = Vec::new();
        for input in inputs {
            if input.name.trim() == "(none)" {
                continue;
            }
            let cleaned = clean_move_token(&input.name);
            if cleaned.is_empty() {
                continue;
            }
            let record = self.catalog.lookup(&cleaned);
            let name = match record {
                Some(record) => record.name.clone(),
                None => title_case(&cleaned),
            };
            let move_type = input
                .explicit_type
                .as_deref()
                .and_then(normalize_type)
                .or_else(|| record.map(|r| r.move_type.clone()).filter(|t| !t.is_empty()))
                .or_else(|| self.catalog.override_type(&cleaned).map(str::to_string))
                .unwrap_or_default();
            if seen.insert((name_key(&name), move_type.clone())) {
                out.push(TypedMove { name, move_type });
            }
            if out.len() == MAX_MOVES {
                break;
            }
        }
        out
    }

    /// A scoring-ready battler. With no usable moves supplied, the species'
    /// level-up prefill stands in.
    pub fn combatant(&mut self, species_name: &str, level: u32, moves: &[MoveInput]) -> Resolved<Combatant> {
        let mut typed = self.normalize_moves(moves);
        let (species, types) = match self.ensure_species(species_name) {
            Resolved::Found(record) => (record.name.clone(), record.types.clone()),
            Resolved::Unavailable(e) => return Resolved::Unavailable(e),
        };
        if typed.is_empty() {
            typed = self.prefill_moves(&species, level).into_value();
        }
        Resolved::Found(Combatant {
            species,
            level,
            types,
            moves: typed,
        })
    }

    pub fn evolution_options(&self, species_name: &str) -> Resolved<Vec<EvolutionOption>> {
        self.graph.evolution_options(species_name).into()
    }
}
