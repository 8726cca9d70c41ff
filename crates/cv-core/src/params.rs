//! Population parameters consumed when a store is initialized.
//!
//! Only the fields the population engine itself reads live here.  Disease
//! parameters belong to the simulation driver and never reach this crate.

use indexmap::IndexMap;

use crate::{PopError, PopResult};

/// Parameters for building a population and its contact layers.
///
/// `beta_layer` is the authoritative, ordered list of declared contact layers:
/// its key order is the order of [`contact_keys`](Self::contact_keys) and of
/// numbered layer access.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Parameters {
    /// Number of people.
    pub pop_size: usize,

    /// Seed recorded for the driver's RNG streams.
    pub rand_seed: u64,

    /// Simulated days; the driver's concern, kept for the flattened export.
    pub n_days: u32,

    /// Default transmission weight per contact layer.
    pub beta_layer: IndexMap<String, f32>,

    /// Mean number of contacts per person per layer.
    pub contacts: IndexMap<String, f32>,

    /// Layers regenerated every step and discarded by
    /// `remove_dynamic_contacts`.
    pub dynamic_layers: Vec<String>,
}

impl Default for Parameters {
    /// A single well-mixed layer `a`.
    fn default() -> Self {
        Self {
            pop_size:       20_000,
            rand_seed:      1,
            n_days:         60,
            beta_layer:     IndexMap::from([("a".to_owned(), 1.0)]),
            contacts:       IndexMap::from([("a".to_owned(), 20.0)]),
            dynamic_layers: Vec::new(),
        }
    }
}

impl Parameters {
    /// Household / school / work / community layers, community dynamic.
    pub fn hybrid() -> Self {
        let layers = [("h", 2.0, 4.0), ("s", 0.6, 20.0), ("w", 0.6, 20.0), ("c", 0.3, 20.0)];
        Self {
            beta_layer:     layers.iter().map(|&(k, b, _)| (k.to_owned(), b)).collect(),
            contacts:       layers.iter().map(|&(k, _, n)| (k.to_owned(), n)).collect(),
            dynamic_layers: vec!["c".to_owned()],
            ..Self::default()
        }
    }

    /// Same parameters with a different population size.
    pub fn with_pop_size(mut self, pop_size: usize) -> Self {
        self.pop_size = pop_size;
        self
    }

    /// Declared contact-layer keys, in configuration order.
    pub fn contact_keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.beta_layer.keys().map(String::as_str)
    }

    /// Check internal consistency.
    pub fn validate(&self) -> PopResult<()> {
        for (key, &beta) in &self.beta_layer {
            if !beta.is_finite() || beta < 0.0 {
                return Err(PopError::Config(format!(
                    "beta for layer \"{key}\" must be a finite non-negative number, got {beta}"
                )));
            }
        }
        if let Some(key) = self.contacts.keys().find(|k| !self.beta_layer.contains_key(*k)) {
            return Err(PopError::Config(format!(
                "contacts declared for layer \"{key}\" which has no beta"
            )));
        }
        if let Some(key) = self.dynamic_layers.iter().find(|k| !self.beta_layer.contains_key(*k)) {
            return Err(PopError::Config(format!(
                "dynamic layer \"{key}\" is not a declared layer"
            )));
        }
        Ok(())
    }

    /// Flattened `(key, value)` view for tabular export.  Nested maps are
    /// expanded as `<field><sep><layer>`; lists are comma-joined.
    pub fn flatten(&self, sep: &str) -> Vec<(String, String)> {
        let mut out = vec![
            ("pop_size".to_owned(), self.pop_size.to_string()),
            ("rand_seed".to_owned(), self.rand_seed.to_string()),
            ("n_days".to_owned(), self.n_days.to_string()),
        ];
        for (k, v) in &self.beta_layer {
            out.push((format!("beta_layer{sep}{k}"), v.to_string()));
        }
        for (k, v) in &self.contacts {
            out.push((format!("contacts{sep}{k}"), v.to_string()));
        }
        out.push(("dynamic_layers".to_owned(), self.dynamic_layers.join(",")));
        out
    }
}
