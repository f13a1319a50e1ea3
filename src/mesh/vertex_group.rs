use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

/// Per-bone weight assignment for one destination mesh.
///
/// Repeated [`add`](Self::add) calls for the same vertex accumulate.
/// Weights are never renormalized, so a vertex may sum to more than 1.0
/// across groups when the source data does.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexGroup {
    name: String,
    weights: BTreeMap<u32, f32>,
}

impl VertexGroup {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weights: BTreeMap::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds `weight` to the vertex's current weight (0.0 if absent).
    pub fn add(&mut self, vertex: u32, weight: f32) {
        *self.weights.entry(vertex).or_insert(0.0) += weight;
    }

    #[must_use]
    pub fn weight(&self, vertex: u32) -> Option<f32> {
        self.weights.get(&vertex).copied()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Entries in ascending vertex order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, f32)> + '_ {
        self.weights.iter().map(|(&v, &w)| (v, w))
    }
}

/// Named vertex groups of one mesh, in creation order.
#[derive(Debug, Clone, Default)]
pub struct VertexGroupSet {
    groups: Vec<VertexGroup>,
    lookup: FxHashMap<String, usize>,
}

impl VertexGroupSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find_or_create(&mut self, name: &str) -> &mut VertexGroup {
        let index = match self.lookup.get(name) {
            Some(&index) => index,
            None => {
                self.groups.push(VertexGroup::new(name));
                let index = self.groups.len() - 1;
                self.lookup.insert(name.to_string(), index);
                index
            }
        };
        &mut self.groups[index]
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&VertexGroup> {
        self.lookup.get(name).map(|&i| &self.groups[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &VertexGroup> {
        self.groups.iter()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Groups that hold an entry for `vertex`.
    pub fn groups_of(&self, vertex: u32) -> impl Iterator<Item = &VertexGroup> {
        self.groups.iter().filter(move |g| g.weight(vertex).is_some())
    }

    /// Sum of a vertex's weights over all groups.
    #[must_use]
    pub fn total_weight(&self, vertex: u32) -> f32 {
        self.groups.iter().filter_map(|g| g.weight(vertex)).sum()
    }
}
