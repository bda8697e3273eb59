use std::fmt;
use thiserror::Error;

/// The four external datasets the resolver reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataSource {
    Pokedex,
    Learnsets,
    LevelUp,
    Moves,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataSource::Pokedex => "pokedex",
            DataSource::Learnsets => "learnsets",
            DataSource::LevelUp => "level-up",
            DataSource::Moves => "moves",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    #[error("{0} dataset is not loaded")]
    SourceUnavailable(DataSource),
    #[error("species `{name}` not found in {dataset}")]
    SpeciesNotFound { name: String, dataset: DataSource },
    #[error("species `{name}` (#{num}) is outside dex scope 1..={scope}")]
    OutOfScope { name: String, num: i64, scope: u16 },
}

/// Outcome of a resolver call.
///
/// `Found` carries a real answer, which may legitimately be empty.
/// `Unavailable` means the answer could not be computed at all.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<T> {
    Found(T),
    Unavailable(DataError),
}

impl<T> Resolved<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Resolved::Found(_))
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Resolved::Unavailable(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Resolved::Found(v) => Some(v),
            Resolved::Unavailable(_) => None,
        }
    }

    pub fn error(&self) -> Option<&DataError> {
        match self {
            Resolved::Found(_) => None,
            Resolved::Unavailable(e) => Some(e),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resolved<U> {
        match self {
            Resolved::Found(v) => Resolved::Found(f(v)),
            Resolved::Unavailable(e) => Resolved::Unavailable(e),
        }
    }
}

impl<T: Default> Resolved<T> {
    /// Collapses to the fail-open value: the answer, or `T::default()`.
    pub fn into_value(self) -> T {
        match self {
            Resolved::Found(v) => v,
            Resolved::Unavailable(_) => T::default(),
        }
    }
}

impl<T> From<Result<T, DataError>> for Resolved<T> {
    fn from(result: Result<T, DataError>) -> Self {
        match result {
            Ok(v) => Resolved::Found(v),
            Err(e) => Resolved::Unavailable(e),
        }
    }
}
