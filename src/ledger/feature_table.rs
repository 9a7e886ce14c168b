//! Latest-wins feature snapshots.

use super::ordered::InsertionOrdered;
use super::types::FeatureSnapshot;

/// Feature snapshots keyed by feature name. Writes never merge with the
/// previous snapshot; callers resupply the full lists each time. Listing
/// order is the order features were first reported.
#[derive(Debug, Clone, Default)]
pub struct FeatureTable {
    features: InsertionOrdered<FeatureSnapshot>,
}

impl FeatureTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&mut self, feature_name: &str, snapshot: FeatureSnapshot) -> &FeatureSnapshot {
        self.features.insert(feature_name, snapshot)
    }

    pub fn get(&self, feature_name: &str) -> Option<&FeatureSnapshot> {
        self.features.get(feature_name)
    }

    /// Feature names, in order of first report.
    pub fn names(&self) -> Vec<String> {
        self.features.keys().map(str::to_string).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureSnapshot)> {
        self.features.iter()
    }
}
