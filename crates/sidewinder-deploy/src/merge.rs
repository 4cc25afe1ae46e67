//! Combines base properties with the operator's advanced overrides.

use std::collections::BTreeMap;

/// Property set written to `<service>.properties`.
///
/// Backed by a sorted map so the rendered file is identical across runs for
/// the same input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedProperties(BTreeMap<String, String>);

impl MergedProperties {
    /// Value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no properties are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in sorted key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Underlying sorted map.
    #[must_use]
    pub const fn as_map(&self) -> &BTreeMap<String, String> {
        &self.0
    }
}

impl From<BTreeMap<String, String>> for MergedProperties {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

/// Copies `base`, then inserts or overwrites every entry of `advanced`.
#[must_use]
pub fn merge_properties(
    base: &BTreeMap<String, String>,
    advanced: &BTreeMap<String, String>,
) -> MergedProperties {
    let mut merged = base.clone();
    merged.extend(
        advanced
            .iter()
            .map(|(key, value)| (key.clone(), value.clone())),
    );
    MergedProperties(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect()
    }

    #[test]
    fn advanced_values_win() {
        let merged = merge_properties(&map(&[("a", "1"), ("b", "2")]), &map(&[("b", "9"), ("c", "3")]));
        assert_eq!(merged.as_map(), &map(&[("a", "1"), ("b", "9"), ("c", "3")]));
    }

    #[test]
    fn merging_twice_is_idempotent() {
        let base = map(&[("a", "1"), ("b", "2"), ("data.dir", "/data1")]);
        let advanced = map(&[("b", "9"), ("c", "3")]);
        let once = merge_properties(&base, &advanced);
        let twice = merge_properties(once.as_map(), &advanced);
        assert_eq!(once, twice);
    }

    #[test]
    fn base_keys_survive_unless_shadowed() {
        let base = map(&[("a", "1"), ("b", "2")]);
        let merged = merge_properties(&base, &BTreeMap::new());
        assert_eq!(merged.as_map(), &base);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn iterates_in_sorted_order() {
        let merged = merge_properties(&map(&[("z", "1"), ("a", "2")]), &map(&[("m", "3")]));
        let keys: Vec<&str> = merged.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["a", "m", "z"]);
    }
}
