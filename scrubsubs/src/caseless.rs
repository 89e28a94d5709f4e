//! A map with case-insensitive keys which still remembers how each key was
//! spelled.

use std::collections::HashMap;
use std::fmt;
use std::iter::FromIterator;

/// An insertion-ordered map whose keys are compared case-insensitively.
///
/// Lookups, containment checks and overwrites all ignore case, but
/// [`CaselessMap::keys`] and [`CaselessMap::iter`] return keys spelled the
/// way they were most recently inserted.
///
/// ```
/// use scrubsubs::caseless::CaselessMap;
///
/// let mut map = CaselessMap::new();
/// map.insert("Damn", 1);
/// assert_eq!(Some(&1), map.get("DAMN"));
/// map.insert("DaMn", 2);
/// assert_eq!(vec!["DaMn"], map.keys().collect::<Vec<_>>());
/// assert_eq!(Some(&2), map.get("damn"));
/// ```
#[derive(Clone)]
pub struct CaselessMap<V> {
    /// `(original_key, value)` pairs, in insertion order.
    entries: Vec<(String, V)>,
    /// Maps normalized keys to positions in `entries`.
    positions: HashMap<String, usize>,
}

/// Normalize a key for comparison.
fn normalize(key: &str) -> String {
    key.to_lowercase()
}

impl<V> CaselessMap<V> {
    /// Create an empty map.
    pub fn new() -> CaselessMap<V> {
        CaselessMap {
            entries: vec![],
            positions: HashMap::new(),
        }
    }

    /// Insert `value` under `key`. If a key differing only in case is
    /// already present, it keeps its position, but its spelling and value are
    /// replaced and the old value is returned.
    pub fn insert<K: Into<String>>(&mut self, key: K, value: V) -> Option<V> {
        let key = key.into();
        let normalized = normalize(&key);
        match self.positions.get(&normalized).copied() {
            Some(pos) => {
                let (old_key, old_value) = &mut self.entries[pos];
                *old_key = key;
                Some(std::mem::replace(old_value, value))
            }
            None => {
                self.positions.insert(normalized, self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Look up `key`, ignoring case.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.positions
            .get(&normalize(key))
            .map(|&pos| &self.entries[pos].1)
    }

    /// Is `key` present, ignoring case?
    pub fn contains_key(&self, key: &str) -> bool {
        self.positions.contains_key(&normalize(key))
    }

    /// The number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Is this map empty?
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys as most recently spelled, in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Values, in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Key-value pairs, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<V> Default for CaselessMap<V> {
    fn default() -> Self {
        CaselessMap::new()
    }
}

impl<V: fmt::Debug> fmt::Debug for CaselessMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Into<String>, V> Extend<(K, V)> for CaselessMap<V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for CaselessMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = CaselessMap::new();
        map.extend(iter);
        map
    }
}

#[cfg(test)]
mod test {
    use super::CaselessMap;

    #[test]
    fn lookups_ignore_case() {
        let map: CaselessMap<&str> = vec![("Heck", "h*ck")].into_iter().collect();
        assert!(map.contains_key("heck"));
        assert!(map.contains_key("HECK"));
        assert_eq!(Some(&"h*ck"), map.get("hEcK"));
        assert_eq!(None, map.get("hecks"));
    }

    #[test]
    fn overwrite_keeps_position_and_updates_spelling() {
        let mut map = CaselessMap::new();
        assert_eq!(None, map.insert("alpha", 1));
        assert_eq!(None, map.insert("beta", 2));
        assert_eq!(Some(1), map.insert("ALPHA", 3));
        assert_eq!(2, map.len());
        let items: Vec<_> = map.iter().collect();
        assert_eq!(vec![("ALPHA", &3), ("beta", &2)], items);
    }

    #[test]
    fn non_ascii_keys() {
        let mut map = CaselessMap::new();
        map.insert("ÉCOLE", "x");
        assert_eq!(Some(&"x"), map.get("école"));
        assert_eq!(vec!["ÉCOLE"], map.keys().collect::<Vec<_>>());
    }

    #[test]
    fn instances_do_not_share_state() {
        let mut a = CaselessMap::new();
        a.insert("one", 1);
        let b: CaselessMap<i32> = CaselessMap::default();
        assert!(b.is_empty());
        assert_eq!(1, a.len());
    }
}
