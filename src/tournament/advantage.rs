//! Type advantage table and the per-battle damage multiplier derived from it.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::tournament::contestant::Contestant;

/// Factor applied once for every attacker/defender tag pair with an advantage.
pub const ADVANTAGE_FACTOR: f64 = 1.5;

/// Damage relations of one category as delivered by the data layer.
/// `double_damage_to` is `None` when the upstream record had no relation list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRelations {
    pub name: String,
    #[serde(default)]
    pub double_damage_to: Option<Vec<String>>,
}

impl CategoryRelations {
    pub fn new(name: impl Into<String>, strong_against: &[&str]) -> Self {
        Self {
            name: name.into(),
            double_damage_to: Some(strong_against.iter().map(|s| s.to_string()).collect()),
        }
    }
}

/// Read-only mapping from a category tag to the tags it deals double damage to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeAdvantageTable {
    strong_against: HashMap<String, HashSet<String>>,
}

impl TypeAdvantageTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the table from raw category data.
    ///
    /// Entries without a name or without a relation list are left out, so the
    /// tag simply has no advantages. A later entry for the same name replaces
    /// an earlier one.
    pub fn build(category_data: &[CategoryRelations]) -> Self {
        let mut strong_against = HashMap::with_capacity(category_data.len());
        for entry in category_data {
            let name = entry.name.trim();
            if name.is_empty() {
                tracing::debug!("skipping category entry without a name");
                continue;
            }
            let Some(targets) = entry.double_damage_to.as_ref() else {
                tracing::debug!(category = name, "skipping category without damage relations");
                continue;
            };
            strong_against.insert(name.to_string(), targets.iter().cloned().collect());
        }
        Self { strong_against }
    }

    /// Insert or replace one entry. Only used while assembling a table.
    pub fn insert<I, S>(&mut self, category: impl Into<String>, targets: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.strong_against
            .insert(category.into(), targets.into_iter().map(Into::into).collect());
    }

    pub fn strong_against(&self, category: &str) -> Option<&HashSet<String>> {
        self.strong_against.get(category)
    }

    pub fn is_strong_against(&self, attacker_type: &str, defender_type: &str) -> bool {
        self.strong_against
            .get(attacker_type)
            .is_some_and(|targets| targets.contains(defender_type))
    }

    pub fn len(&self) -> usize {
        self.strong_against.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strong_against.is_empty()
    }
}

impl<K, I, S> FromIterator<(K, I)> for TypeAdvantageTable
where
    K: Into<String>,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, I)>>(iter: T) -> Self {
        let mut table = Self::new();
        for (category, targets) in iter {
            table.insert(category, targets);
        }
        table
    }
}

/// Multiplier the attacker applies against the defender.
///
/// Starts at 1.0 and is multiplied by [`ADVANTAGE_FACTOR`] for every
/// (attacker tag, defender tag) pair where the attacker tag is strong against
/// the defender tag. Not symmetric: the reverse direction is a separate call.
pub fn multiplier(attacker: &Contestant, defender: &Contestant, table: &TypeAdvantageTable) -> f64 {
    let mut multiplier = 1.0;
    for attacker_type in &attacker.types {
        let Some(targets) = table.strong_against(attacker_type) else {
            continue;
        };
        for defender_type in &defender.types {
            if targets.contains(defender_type) {
                multiplier *= ADVANTAGE_FACTOR;
            }
        }
    }
    multiplier
}
