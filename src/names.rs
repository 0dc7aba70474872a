//! Country-name normalization shared by the chart and map paths.

use std::collections::HashMap;

/// Geometry names (Natural Earth) that the case feed spells differently.
const BUILTIN_ALIASES: &[(&str, &str)] = &[
    ("UNITED STATES OF AMERICA", "US"),
    ("SOUTH KOREA", "KOREA, SOUTH"),
    ("TAIWAN", "TAIWAN*"),
    ("MYANMAR", "BURMA"),
    ("DEM. REP. CONGO", "CONGO (KINSHASA)"),
    ("CONGO", "CONGO (BRAZZAVILLE)"),
    ("CÔTE D'IVOIRE", "COTE D'IVOIRE"),
    ("CENTRAL AFRICAN REP.", "CENTRAL AFRICAN REPUBLIC"),
    ("DOMINICAN REP.", "DOMINICAN REPUBLIC"),
    ("BOSNIA AND HERZ.", "BOSNIA AND HERZEGOVINA"),
    ("EQ. GUINEA", "EQUATORIAL GUINEA"),
    ("S. SUDAN", "SOUTH SUDAN"),
    ("MACEDONIA", "NORTH MACEDONIA"),
    ("SOLOMON IS.", "SOLOMON ISLANDS"),
    ("W. SAHARA", "WESTERN SAHARA"),
];

/// Uppercase lookup key for a country name.
pub fn normalize_key(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Static geometry-name → feed-name table. Keys and values are stored
/// normalized.
#[derive(Debug, Clone)]
pub struct AliasTable {
    entries: HashMap<String, String>,
}

impl AliasTable {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn builtin() -> Self {
        let mut table = Self::empty();
        for (geometry, feed) in BUILTIN_ALIASES {
            table.insert(geometry, feed);
        }
        table
    }

    /// Add or replace an alias
    pub fn insert(&mut self, geometry_name: &str, feed_name: &str) {
        self.entries
            .insert(normalize_key(geometry_name), normalize_key(feed_name));
    }

    pub fn extend<'a>(&mut self, pairs: impl IntoIterator<Item = (&'a String, &'a String)>) {
        for (geometry, feed) in pairs {
            self.insert(geometry, feed);
        }
    }

    /// Snapshot key for a geometry name: the aliased feed name when one
    /// exists, else the normalized name itself.
    pub fn resolve_key(&self, geometry_name: &str) -> String {
        let key = normalize_key(geometry_name);
        match self.entries.get(&key) {
            Some(alias) => alias.clone(),
            None => key,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key(" France "), "FRANCE");
        assert_eq!(normalize_key("Côte d'Ivoire"), "CÔTE D'IVOIRE");
    }

    #[test]
    fn test_alias_wins_over_plain_name() {
        let table = AliasTable::builtin();
        assert_eq!(table.resolve_key("United States of America"), "US");
        assert_eq!(table.resolve_key("Germany"), "GERMANY");
    }

    #[test]
    fn test_custom_alias_is_normalized() {
        let mut table = AliasTable::empty();
        table.insert("Czech Rep.", "Czechia");
        assert_eq!(table.resolve_key("CZECH REP."), "CZECHIA");
        assert_eq!(table.len(), 1);
    }
}
