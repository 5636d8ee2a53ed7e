//! Immutable `(frequency, resolved parameters)` bundle passed to components.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Immutable, hashable `{freq, params}` value. Constructed once per sweep
/// point and passed by reference to component `ymatrix` callbacks, which may
/// not mutate it. Params are stored as a sorted array for O(log n) lookup and
/// a stable hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericContext {
    freq: f64,
    params: Vec<(String, f64)>,
}

impl NumericContext {
    /// Builds a context from a frequency and an unordered parameter map,
    /// sorting the entries once up front.
    pub fn new(freq: f64, params: impl IntoIterator<Item = (String, f64)>) -> Self {
        let mut params: Vec<(String, f64)> = params.into_iter().collect();
        params.sort_by(|a, b| a.0.cmp(&b.0));
        Self { freq, params }
    }

    pub fn freq(&self) -> f64 {
        self.freq
    }

    /// O(log n) lookup by name.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.params
            .binary_search_by(|(n, _)| n.as_str().cmp(name))
            .ok()
            .map(|i| self.params[i].1)
    }

    pub fn params(&self) -> &[(String, f64)] {
        &self.params
    }
}

impl PartialEq for NumericContext {
    fn eq(&self, other: &Self) -> bool {
        self.freq.to_bits() == other.freq.to_bits() && self.params == other.params
    }
}
impl Eq for NumericContext {}

impl Hash for NumericContext {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.freq.to_bits().hash(state);
        for (name, value) in &self.params {
            name.hash(state);
            value.to_bits().hash(state);
        }
    }
}
