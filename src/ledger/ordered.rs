//! String-keyed map that iterates in first-insertion order.

use std::collections::HashMap;

/// Overwriting a key keeps its original position.
#[derive(Debug, Clone)]
pub struct InsertionOrdered<V> {
    index: HashMap<String, usize>,
    entries: Vec<(String, V)>,
}

impl<V> Default for InsertionOrdered<V> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }
}

impl<V> InsertionOrdered<V> {
    /// Store `value` under `key`, replacing any previous value in place.
    pub fn insert(&mut self, key: &str, value: V) -> &V {
        let slot = match self.index.get(key) {
            Some(&slot) => {
                self.entries[slot].1 = value;
                slot
            }
            None => self.push(key, value),
        };
        &self.entries[slot].1
    }

    /// The value under `key`, created with `make` if absent.
    pub fn get_or_insert_with(&mut self, key: &str, make: impl FnOnce() -> V) -> &mut V {
        let slot = match self.index.get(key) {
            Some(&slot) => slot,
            None => self.push(key, make()),
        };
        &mut self.entries[slot].1
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.index.get(key).map(|&slot| &self.entries[slot].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, key: &str, value: V) -> usize {
        self.entries.push((key.to_string(), value));
        let slot = self.entries.len() - 1;
        self.index.insert(key.to_string(), slot);
        slot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iterates_in_first_insertion_order() {
        let mut map = InsertionOrdered::default();
        map.insert("settings", 1);
        map.insert("checkout", 2);
        map.insert("settings", 3);

        let entries: Vec<_> = map.iter().collect();
        assert_eq!(entries, vec![("settings", &3), ("checkout", &2)]);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_get_or_insert_with_creates_once() {
        let mut map: InsertionOrdered<Vec<u8>> = InsertionOrdered::default();
        map.get_or_insert_with("a", Vec::new).push(1);
        map.get_or_insert_with("a", || vec![9]).push(2);
        assert_eq!(map.get("a"), Some(&vec![1, 2]));
        assert!(map.get("b").is_none());
    }
}
