use serde::{Deserialize, Serialize};
use std::fmt;

/// The seventeen types of the Generation 3 chart, in display order.
pub const TYPES: [&str; 17] = [
    "Normal", "Fire", "Water", "Electric", "Grass", "Ice", "Fighting", "Poison", "Ground",
    "Flying", "Psychic", "Bug", "Rock", "Ghost", "Dragon", "Dark", "Steel",
];

/// Title-cases a type name and folds `Fairy` into `Normal`.
///
/// Returns `None` for empty input.
pub fn normalize_type(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let titled = title_case(trimmed);
    if titled == "Fairy" {
        return Some("Normal".to_string());
    }
    Some(titled)
}

pub(crate) fn title_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut at_word_start = true;
    for c in raw.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// A defender's typing. The secondary slot is empty for single-typed species.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypePair {
    pub primary: String,
    pub secondary: Option<String>,
}

impl TypePair {
    pub fn new(primary: &str, secondary: Option<&str>) -> Self {
        TypePair {
            primary: normalize_type(primary).unwrap_or_else(|| "Normal".to_string()),
            secondary: secondary.and_then(normalize_type),
        }
    }

    pub fn single(primary: &str) -> Self {
        Self::new(primary, None)
    }

    /// Builds a pair from raw dataset types. `Fairy` entries are dropped
    /// outright rather than folded, duplicates collapse, and an empty result
    /// falls back to `Normal`.
    pub fn from_raw<S: AsRef<str>>(raw: &[S]) -> Self {
        let mut kept: Vec<String> = Vec::with_capacity(2);
        for t in raw.iter().take(2) {
            let trimmed = t.as_ref().trim();
            if trimmed.is_empty() {
                continue;
            }
            let titled = title_case(trimmed);
            if titled == "Fairy" || kept.contains(&titled) {
                continue;
            }
            kept.push(titled);
        }
        let mut iter = kept.into_iter();
        let primary = iter.next().unwrap_or_else(|| "Normal".to_string());
        TypePair {
            primary,
            secondary: iter.next(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary.as_str()).chain(self.secondary.as_deref())
    }
}

impl fmt::Display for TypePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.secondary {
            Some(second) => write!(f, "{}/{}", self.primary, second),
            None => write!(f, "{}", self.primary),
        }
    }
}

/// Type multiplier of `move_type` against `defender`, snapped to the
/// canonical set `{0, 0.25, 0.5, 1, 2, 4}`.
pub fn get_mult(move_type: &str, defender: &TypePair) -> f32 {
    let Some(attacking) = normalize_type(move_type) else {
        return 1.0;
    };
    let mut product = 1.0f32;
    for defending in defender.iter() {
        let defending = normalize_type(defending).unwrap_or_else(|| "Normal".to_string());
        product *= single_type_effectiveness(&attacking, &defending);
    }
    snap_multiplier(product)
}

/// True when any of the defender's types is immune to `move_type`.
pub fn is_immune(move_type: &str, defender: &TypePair) -> bool {
    let Some(attacking) = normalize_type(move_type) else {
        return false;
    };
    defender.iter().any(|defending| {
        let defending = normalize_type(defending).unwrap_or_else(|| "Normal".to_string());
        single_type_effectiveness(&attacking, &defending) == 0.0
    })
}

pub fn snap_multiplier(product: f32) -> f32 {
    if product <= 0.0 {
        return 0.0;
    }
    if product >= 3.0 {
        4.0
    } else if product >= 1.5 {
        2.0
    } else if product <= 0.375 {
        0.25
    } else if product <= 0.75 {
        0.5
    } else {
        1.0
    }
}

// Gen 3 chart: no Fairy, Steel still resists Ghost and Dark.
fn single_type_effectiveness(attacking: &str, defending: &str) -> f32 {
    let atk = attacking.to_ascii_lowercase();
    let def = defending.to_ascii_lowercase();
    match atk.as_str() {
        "normal" => match def.as_str() {
            "rock" | "steel" => 0.5,
            "ghost" => 0.0,
            _ => 1.0,
        },
        "fire" => match def.as_str() {
            "fire" | "water" | "rock" | "dragon" => 0.5,
            "grass" | "ice" | "bug" | "steel" => 2.0,
            _ => 1.0,
        },
        "water" => match def.as_str() {
            "water" | "grass" | "dragon" => 0.5,
            "fire" | "ground" | "rock" => 2.0,
            _ => 1.0,
        },
        "electric" => match def.as_str() {
            "electric" | "grass" | "dragon" => 0.5,
            "water" | "flying" => 2.0,
            "ground" => 0.0,
            _ => 1.0,
        },
        "grass" => match def.as_str() {
            "fire" | "grass" | "poison" | "flying" | "bug" | "dragon" | "steel" => 0.5,
            "water" | "ground" | "rock" => 2.0,
            _ => 1.0,
        },
        "ice" => match def.as_str() {
            "fire" | "water" | "ice" | "steel" => 0.5,
            "grass" | "ground" | "flying" | "dragon" => 2.0,
            _ => 1.0,
        },
        "fighting" => match def.as_str() {
            "normal" | "ice" | "rock" | "dark" | "steel" => 2.0,
            "poison" | "flying" | "psychic" | "bug" => 0.5,
            "ghost" => 0.0,
            _ => 1.0,
        },
        "poison" => match def.as_str() {
            "grass" => 2.0,
            "poison" | "ground" | "rock" | "ghost" => 0.5,
            "steel" => 0.0,
            _ => 1.0,
        },
        "ground" => match def.as_str() {
            "fire" | "electric" | "poison" | "rock" | "steel" => 2.0,
            "grass" | "bug" => 0.5,
            "flying" => 0.0,
            _ => 1.0,
        },
        "flying" => match def.as_str() {
            "grass" | "fighting" | "bug" => 2.0,
            "electric" | "rock" | "steel" => 0.5,
            _ => 1.0,
        },
        "psychic" => match def.as_str() {
            "fighting" | "poison" => 2.0,
            "psychic" | "steel" => 0.5,
            "dark" => 0.0,
            _ => 1.0,
        },
        "bug" => match def.as_str() {
            "grass" | "psychic" | "dark" => 2.0,
            "fire" | "fighting" | "poison" | "flying" | "ghost" | "steel" => 0.5,
            _ => 1.0,
        },
        "rock" => match def.as_str() {
            "fire" | "ice" | "flying" | "bug" => 2.0,
            "fighting" | "ground" | "steel" => 0.5,
            _ => 1.0,
        },
        "ghost" => match def.as_str() {
            "ghost" | "psychic" => 2.0,
            "dark" | "steel" => 0.5,
            "normal" => 0.0,
            _ => 1.0,
        },
        "dragon" => match def.as_str() {
            "dragon" => 2.0,
            "steel" => 0.5,
            _ => 1.0,
        },
        "dark" => match def.as_str() {
            "psychic" | "ghost" => 2.0,
            "fighting" | "dark" | "steel" => 0.5,
            _ => 1.0,
        },
        "steel" => match def.as_str() {
            "rock" | "ice" => 2.0,
            "fire" | "water" | "electric" | "steel" => 0.5,
            _ => 1.0,
        },
        _ => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fairy_folds_to_normal() {
        assert_eq!(normalize_type("fairy").as_deref(), Some("Normal"));
        assert_eq!(normalize_type("  "), None);
        assert_eq!(normalize_type("dragon").as_deref(), Some("Dragon"));
    }

    #[test]
    fn from_raw_drops_fairy_and_duplicates() {
        let pair = TypePair::from_raw(&["Fairy"]);
        assert_eq!(pair, TypePair::single("Normal"));
        let pair = TypePair::from_raw(&["normal", "Fairy"]);
        assert_eq!(pair, TypePair::single("Normal"));
        let pair = TypePair::from_raw(&["Grass", "grass"]);
        assert_eq!(pair.secondary, None);
        let pair = TypePair::from_raw(&["Bug", "Flying"]);
        assert_eq!(pair.to_string(), "Bug/Flying");
    }

    #[test]
    fn double_resist_snaps_to_quarter() {
        let pair = TypePair::new("Water", Some("Dragon"));
        assert_eq!(get_mult("Fire", &pair), 0.25);
        assert_eq!(snap_multiplier(0.2500001), 0.25);
        assert_eq!(snap_multiplier(3.9999), 4.0);
    }

    #[test]
    fn immunity_wins_over_weakness() {
        let pair = TypePair::new("Ground", Some("Water"));
        assert_eq!(get_mult("Electric", &pair), 0.0);
        assert!(is_immune("Electric", &pair));
        assert!(!is_immune("Grass", &pair));
    }

    #[test]
    fn steel_resists_ghost_and_dark() {
        let steel = TypePair::single("Steel");
        assert_eq!(get_mult("Ghost", &steel), 0.5);
        assert_eq!(get_mult("Dark", &steel), 0.5);
        assert_eq!(get_mult("Ghost", &TypePair::new("Steel", Some("Rock"))), 0.5);
        assert_eq!(get_mult("Ghost", &TypePair::new("Steel", Some("Psychic"))), 1.0);
    }

    #[test]
    fn unknown_or_missing_move_type_is_neutral() {
        let pair = TypePair::single("Fire");
        assert_eq!(get_mult("", &pair), 1.0);
        assert_eq!(get_mult("Shadow", &pair), 1.0);
    }
}
