//! The layered contact graph: layer key → [`Layer`].
//!
//! # Declared vs. live keys
//!
//! A graph remembers two key lists:
//!
//! - **declared** keys come from configuration (`Parameters::beta_layer`),
//!   together with each layer's default transmission weight.  They are what
//!   [`ContactGraph::layer_names`] reports and they never change after
//!   construction except by [`ContactGraph::absorb`].
//! - **live** keys are the layers currently materialized.  Dynamic layers are
//!   removed and rebuilt every step, so a declared key may be temporarily
//!   absent, and an undeclared key may be live if edges were added under it.
//!
//! Both lists keep insertion order.  Numbered lookup in
//! [`ContactGraph::get`] uses the live order.

use std::sync::Arc;

use indexmap::IndexMap;

use cv_core::{AttributeSchema, Parameters, PersonId, PopError, PopResult};

use crate::{ContactInput, EdgeBatch, Layer, LayerKey, PersonContacts};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContactGraph {
    declared: IndexMap<LayerKey, f32>,
    layers:   IndexMap<LayerKey, Layer>,
    schema:   Arc<AttributeSchema>,
}

impl Default for ContactGraph {
    fn default() -> Self {
        Self::new(std::iter::empty::<(&str, f32)>(), Arc::new(AttributeSchema::empty()))
    }
}

impl ContactGraph {
    /// Graph with one empty layer per declared `(key, default_beta)`.
    pub fn new<'a, I>(declared: I, schema: Arc<AttributeSchema>) -> Self
    where
        I: IntoIterator<Item = (&'a str, f32)>,
    {
        let declared: IndexMap<LayerKey, f32> =
            declared.into_iter().map(|(k, b)| (LayerKey::new(k), b)).collect();
        let layers = declared
            .keys()
            .map(|k| (k.clone(), Layer::new(schema.clone())))
            .collect();
        Self { declared, layers, schema }
    }

    /// Graph declared by `pars.beta_layer`, with extra edge columns from
    /// `schema`.
    pub fn from_parameters(pars: &Parameters, schema: Arc<AttributeSchema>) -> Self {
        Self::new(pars.beta_layer.iter().map(|(k, &b)| (k.as_str(), b)), schema)
    }

    // ── Keys ──────────────────────────────────────────────────────────────

    /// Declared layer keys, in configuration order.
    pub fn layer_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.declared.keys().map(LayerKey::as_str)
    }

    /// Currently materialized layer keys, in insertion order.
    pub fn live_keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.layers.keys().map(LayerKey::as_str)
    }

    /// Configured default weight of layer `key`.
    pub fn default_beta(&self, key: &str) -> PopResult<f32> {
        self.declared
            .get(key)
            .copied()
            .ok_or_else(|| PopError::LayerNotFound(key.to_owned()))
    }

    /// Edge-extra schema shared by every layer of this graph.
    pub fn schema(&self) -> &Arc<AttributeSchema> {
        &self.schema
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    /// Layer by name; failing that, `key` is read as a position in live order.
    pub fn get(&self, key: &str) -> PopResult<&Layer> {
        if let Some(layer) = self.layers.get(key) {
            return Ok(layer);
        }
        key.parse::<usize>()
            .ok()
            .and_then(|i| self.layers.get_index(i))
            .map(|(_, layer)| layer)
            .ok_or_else(|| PopError::LayerNotFound(key.to_owned()))
    }

    /// Mutable counterpart of [`get`](Self::get).
    pub fn get_mut(&mut self, key: &str) -> PopResult<&mut Layer> {
        let index = match self.layers.get_index_of(key) {
            Some(i) => Some(i),
            None => key.parse::<usize>().ok().filter(|&i| i < self.layers.len()),
        };
        index
            .and_then(|i| self.layers.get_index_mut(i))
            .map(|(_, layer)| layer)
            .ok_or_else(|| PopError::LayerNotFound(key.to_owned()))
    }

    /// Layer at position `i` in live order.
    pub fn get_index(&self, i: usize) -> PopResult<(&LayerKey, &Layer)> {
        self.layers
            .get_index(i)
            .ok_or_else(|| PopError::LayerNotFound(i.to_string()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.layers.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LayerKey, &Layer)> + '_ {
        self.layers.iter()
    }

    /// Number of live layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Sum of edge counts over live layers.
    pub fn total_edges(&self) -> usize {
        self.layers.values().map(Layer::edge_count).sum()
    }

    // ── Adding edges ──────────────────────────────────────────────────────

    /// Add edges from any supported representation; returns edges added.
    ///
    /// `key` defaults to the first declared layer and is ignored for
    /// adjacency input, whose entries name their own layers.  `beta`
    /// defaults to the target layer's configured weight and only applies to
    /// edges that carry no weight of their own.
    pub fn add_edges(
        &mut self,
        input: ContactInput,
        key: Option<&str>,
        beta: Option<f32>,
    ) -> PopResult<usize> {
        match input {
            ContactInput::Layer(layer) => self.add_layer(layer, key, beta),
            ContactInput::Batch(batch) => self.add_batch(batch, key, beta),
            ContactInput::Columns(cols) => self.add_batch(EdgeBatch::from_columns(cols)?, key, beta),
            ContactInput::Rows(rows) => self.add_batch(EdgeBatch::from_rows(&rows)?, key, beta),
            ContactInput::Adjacency(adj) => self.add_adjacency(&adj, beta),
        }
    }

    /// Append a columnar batch into layer `key`, creating it if absent.
    pub fn add_batch(
        &mut self,
        batch: EdgeBatch,
        key: Option<&str>,
        beta: Option<f32>,
    ) -> PopResult<usize> {
        let key = self.resolve_key(key)?;
        let default_beta = match beta {
            Some(b) => b,
            // The batch brings its own weights; the default is never read.
            None if batch.beta.is_some() => 0.0,
            None => self.default_beta(key.as_str())?,
        };
        let n = batch.len();
        let schema = &self.schema;
        let layer = self
            .layers
            .entry(key.clone())
            .or_insert_with(|| Layer::new(schema.clone()));
        layer.append(batch, &key, default_beta)?;
        tracing::trace!(layer = %key, added = n, total = layer.edge_count(), "appended edges");
        Ok(n)
    }

    /// Append every edge of `layer` into layer `key`.
    pub fn add_layer(&mut self, layer: Layer, key: Option<&str>, beta: Option<f32>) -> PopResult<usize> {
        self.add_batch(EdgeBatch::from_layer(layer), key, beta)
    }

    /// Convert per-person adjacency with [`from_adjacency`](Self::from_adjacency)
    /// and append each resulting batch into its own layer.
    ///
    /// Every touched layer is staged first and committed only once all of
    /// them have accepted their batch; on error the graph is unchanged.
    pub fn add_adjacency(&mut self, per_person: &[PersonContacts], beta: Option<f32>) -> PopResult<usize> {
        let batches = Self::from_adjacency(per_person)?;
        let mut staged = Vec::with_capacity(batches.len());
        let mut added = 0;
        for (key, batch) in batches {
            let default_beta = match beta {
                Some(b) => b,
                None => self.default_beta(key.as_str())?,
            };
            let mut layer = self
                .layers
                .get(&key)
                .cloned()
                .unwrap_or_else(|| Layer::new(self.schema.clone()));
            added += batch.len();
            layer.append(batch, &key, default_beta)?;
            staged.push((key, layer));
        }
        for (key, layer) in staged {
            tracing::trace!(layer = %key, total = layer.edge_count(), "appended adjacency edges");
            self.layers.insert(key, layer);
        }
        Ok(added)
    }

    /// Turn per-person adjacency into one edge batch per layer.
    ///
    /// For person `p` with neighbors `[q0, q1, …]` under layer `L`, emits
    /// `(p, q0), (p, q1), …` tagged `L`.  Mirror edges are kept; call
    /// [`Layer::deduplicate`] to collapse them.
    pub fn from_adjacency(per_person: &[PersonContacts]) -> PopResult<IndexMap<LayerKey, EdgeBatch>> {
        let mut batches: IndexMap<LayerKey, EdgeBatch> = IndexMap::new();
        for (p, contacts) in per_person.iter().enumerate() {
            let p = PersonId::try_from(p).map_err(|_| {
                PopError::UnsupportedContactFormat(format!("adjacency entry {p} exceeds u32 indices"))
            })?;
            for (key, neighbors) in contacts {
                let batch = batches.entry(key.clone()).or_insert_with(|| EdgeBatch {
                    layer: Some(Vec::new()),
                    ..EdgeBatch::default()
                });
                batch.p1.extend(std::iter::repeat_n(p, neighbors.len()));
                batch.p2.extend_from_slice(neighbors);
                if let Some(tags) = batch.layer.as_mut() {
                    tags.extend(std::iter::repeat_n(key.clone(), neighbors.len()));
                }
            }
        }
        Ok(batches)
    }

    // ── Layer lifecycle ───────────────────────────────────────────────────

    /// Replace `layer` under `key`, returning the previous one.
    pub fn insert(&mut self, key: &str, layer: Layer) -> Option<Layer> {
        self.layers.insert(LayerKey::new(key), layer)
    }

    /// Delete the named layers; keys that are not live are skipped.
    /// Returns the number of layers removed.  Declared keys are unaffected.
    pub fn remove(&mut self, keys: &[&str]) -> usize {
        let mut removed = 0;
        for key in keys {
            if let Some(layer) = self.layers.shift_remove(*key) {
                tracing::debug!(layer = %key, edges = layer.edge_count(), "removed layer");
                removed += 1;
            }
        }
        removed
    }

    /// Replace the named layers (all declared layers if `None`) with empty ones.
    pub fn reset(&mut self, keys: Option<&[&str]>) {
        let keys: Vec<LayerKey> = match keys {
            Some(keys) => keys.iter().map(|&k| LayerKey::new(k)).collect(),
            None => self.declared.keys().cloned().collect(),
        };
        for key in keys {
            self.layers.insert(key, Layer::new(self.schema.clone()));
        }
    }

    /// Deduplicate every live layer; returns the total remaining edges.
    pub fn deduplicate_all(&mut self) -> usize {
        self.layers.values_mut().map(Layer::deduplicate).sum()
    }

    /// Append `other`'s layers with every endpoint shifted by `offset`.
    ///
    /// Layers are matched by key; keys `other` declares that `self` does not
    /// become declared here too.
    pub fn absorb(&mut self, other: ContactGraph, offset: u32) -> PopResult<()> {
        for (key, beta) in other.declared {
            self.declared.entry(key).or_insert(beta);
        }
        for (key, mut layer) in other.layers {
            layer.offset(offset);
            self.add_layer(layer, Some(key.as_str()), None)?;
        }
        Ok(())
    }

    /// First dangling endpoint in any live layer, as an error.
    pub fn check_indices(&self, pop_size: usize) -> PopResult<()> {
        self.layers.values().try_for_each(|l| l.check_indices(pop_size))
    }

    /// Drop edges referencing people `>= pop_size` from every layer.
    pub fn retain_within(&mut self, pop_size: usize) -> usize {
        let dropped: usize = self
            .layers
            .values_mut()
            .map(|l| l.retain_within(pop_size))
            .sum();
        if dropped > 0 {
            tracing::debug!(dropped, pop_size, "pruned dangling edges");
        }
        dropped
    }

    fn resolve_key(&self, key: Option<&str>) -> PopResult<LayerKey> {
        match key {
            Some(k) => Ok(LayerKey::new(k)),
            None => self
                .declared
                .keys()
                .next()
                .cloned()
                .ok_or_else(|| PopError::LayerNotFound("<no declared layers>".to_owned())),
        }
    }
}
