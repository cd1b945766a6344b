//! Ordered per-class containers

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Insertion-ordered mapping from class name to a value
///
/// Class order is significant: it fixes the row/column order of the linear
/// system, so lookups never reorder entries.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMap<V> {
    entries: Vec<(String, V)>,
}

/// Per-class experience deficit (cap minus current experience)
pub type ClassDeficits = ClassMap<f64>;

/// Per-class current experience
pub type ClassExperience = ClassMap<f64>;

impl<V> Default for ClassMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> ClassMap<V> {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the value for `class`, keeping its original position
    pub fn insert(&mut self, class: impl Into<String>, value: V) -> Option<V> {
        let class = class.into();
        match self.entries.iter_mut().find(|(name, _)| *name == class) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((class, value));
                None
            }
        }
    }

    /// Value for `class`, if present
    pub fn get(&self, class: &str) -> Option<&V> {
        self.entries
            .iter()
            .find(|(name, _)| name == class)
            .map(|(_, v)| v)
    }

    /// Whether `class` has an entry
    pub fn contains(&self, class: &str) -> bool {
        self.get(class).is_some()
    }

    /// Number of classes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Class names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(name, v)| (name.as_str(), v))
    }
}

impl<S: Into<String>, V> FromIterator<(S, V)> for ClassMap<V> {
    fn from_iter<I: IntoIterator<Item = (S, V)>>(iter: I) -> Self {
        let mut map = ClassMap::new();
        for (class, value) in iter {
            map.insert(class, value);
        }
        map
    }
}

impl<V: Serialize> Serialize for ClassMap<V> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Runs needed per class, labelled in the order the classes were given
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunsResult {
    runs: ClassMap<i64>,
}

impl RunsResult {
    pub(crate) fn from_map(runs: ClassMap<i64>) -> Self {
        Self { runs }
    }

    /// Runs for `class`, if the class was estimated
    pub fn get(&self, class: &str) -> Option<i64> {
        self.runs.get(class).copied()
    }

    /// Entries in class order
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.runs.iter().map(|(name, runs)| (name, *runs))
    }

    /// Number of estimated classes
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    /// Whether no class was estimated
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Total runs: sum of the non-negative per-class counts
    ///
    /// `None` if the sum overflows an `i64`.
    pub fn total(&self) -> Option<i64> {
        self.runs
            .iter()
            .map(|(_, r)| *r)
            .filter(|r| *r >= 0)
            .try_fold(0_i64, |acc, r| acc.checked_add(r))
    }

    /// Per-class counts as an ordered map
    pub fn as_map(&self) -> &ClassMap<i64> {
        &self.runs
    }
}

impl Serialize for RunsResult {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        self.runs.serialize(serializer)
    }
}
