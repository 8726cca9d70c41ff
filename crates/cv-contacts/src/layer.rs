//! A single contact layer stored as parallel edge columns.
//!
//! # Data layout
//!
//! Edge `i` of a layer is the tuple
//!
//! ```text
//! (p1[i], p2[i], beta[i], layer[i], extra_0[i], extra_1[i], …)
//! ```
//!
//! All columns have the same length, the edge count.  `p1`/`p2`/`beta`/`layer`
//! are `pub` for direct indexed access in the transmission loop; callers that
//! write to them directly must call [`Layer::validate`] afterwards.  Extra
//! columns are declared by the layer's edge schema and reached by name.
//!
//! After [`Layer::deduplicate`] the edges are sorted by `(p1, p2)` with
//! `p1 < p2` on every row.

use std::sync::Arc;

use cv_core::{AttributeSchema, Column, Element, PersonId, PopError, PopResult};

use crate::{EdgeBatch, LayerKey};

/// One typed edge table.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Layer {
    /// First endpoint of each edge.
    pub p1: Vec<PersonId>,

    /// Second endpoint of each edge.
    pub p2: Vec<PersonId>,

    /// Transmission weight of each edge.
    pub beta: Vec<f32>,

    /// Key of the layer each edge originated in.
    pub layer: Vec<LayerKey>,

    /// Extra columns, one per attribute of `schema`, in schema order.
    extras: Vec<Column>,

    schema: Arc<AttributeSchema>,
}

impl Default for Layer {
    fn default() -> Self {
        Self::new(Arc::new(AttributeSchema::empty()))
    }
}

impl Layer {
    /// Empty layer with one zero-length column per declared extra.
    pub fn new(schema: Arc<AttributeSchema>) -> Self {
        let extras = schema.iter().map(|(_, _, kind)| Column::zeros(kind, 0)).collect();
        Self {
            p1: Vec::new(),
            p2: Vec::new(),
            beta: Vec::new(),
            layer: Vec::new(),
            extras,
            schema,
        }
    }

    /// Number of edges: the length of `p1`.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.p1.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.p1.is_empty()
    }

    /// The edge-extra schema this layer was created with.
    pub fn schema(&self) -> &Arc<AttributeSchema> {
        &self.schema
    }

    /// Extra column `name`.
    pub fn extra(&self, name: &str) -> PopResult<&Column> {
        let id = self.schema.id(name)?;
        Ok(&self.extras[id.index()])
    }

    /// Fixed-length mutable view of extra column `name`.
    pub fn extra_mut<T: Element>(&mut self, name: &str) -> PopResult<&mut [T]> {
        let id = self.schema.id(name)?;
        let actual = self.schema.kind(id);
        T::slice_mut(&mut self.extras[id.index()]).ok_or_else(|| PopError::KindMismatch {
            name: name.to_owned(),
            requested: T::KIND,
            actual,
        })
    }

    /// `(p1, p2, beta)` for every edge, in storage order.
    pub fn edges(&self) -> impl Iterator<Item = (PersonId, PersonId, f32)> + '_ {
        self.p1
            .iter()
            .zip(&self.p2)
            .zip(&self.beta)
            .map(|((&a, &b), &w)| (a, b, w))
    }

    // ── Integrity ─────────────────────────────────────────────────────────

    /// Check that every column has the declared kind and `edge_count()` rows.
    ///
    /// Read-only.  Fails with [`PopError::LayerIntegrity`] naming the first
    /// offending column.
    pub fn validate(&self) -> PopResult<()> {
        let n = self.edge_count();
        let fixed = [("p2", self.p2.len()), ("beta", self.beta.len()), ("layer", self.layer.len())];
        for (column, len) in fixed {
            if len != n {
                return Err(integrity(column, format!("{len} rows, expected {n}")));
            }
        }
        if self.extras.len() != self.schema.len() {
            return Err(integrity(
                "<extras>",
                format!("{} columns, schema declares {}", self.extras.len(), self.schema.len()),
            ));
        }
        for ((_, name, kind), col) in self.schema.iter().zip(&self.extras) {
            if col.kind() != kind {
                return Err(integrity(name, format!("holds {:?}, declared {kind:?}", col.kind())));
            }
            if col.len() != n {
                return Err(integrity(name, format!("{} rows, expected {n}", col.len())));
            }
        }
        Ok(())
    }

    /// First edge endpoint outside `[0, pop_size)`, as an error.
    ///
    /// Resizing a population does not touch its layers; run this (or
    /// [`retain_within`](Self::retain_within)) afterwards.
    pub fn check_indices(&self, pop_size: usize) -> PopResult<()> {
        match self.p1.iter().chain(&self.p2).find(|p| p.index() >= pop_size) {
            Some(p) => Err(PopError::IndexOutOfRange { index: p.index(), len: pop_size }),
            None => Ok(()),
        }
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Append a batch of edges and return the new edge count.
    ///
    /// A missing `layer` column is filled with `default_tag` and a missing
    /// `beta` column with `default_beta`.  Declared extras the batch does not
    /// supply are zero-filled.  The batch is checked before anything is
    /// written, so a failed append leaves the layer unchanged.
    pub fn append(
        &mut self,
        batch: EdgeBatch,
        default_tag: &LayerKey,
        default_beta: f32,
    ) -> PopResult<usize> {
        batch.check_shape()?;
        let mut supplied: Vec<Option<Column>> = vec![None; self.schema.len()];
        for (name, col) in batch.extras {
            let id = self
                .schema
                .id(&name)
                .map_err(|_| PopError::ColumnMismatch(name.clone()))?;
            supplied[id.index()] = Some(col);
        }

        let n = batch.p1.len();
        let total = self.edge_count() + n;
        self.p1.extend(batch.p1);
        self.p2.extend(batch.p2);
        match batch.beta {
            Some(beta) => self.beta.extend(beta),
            None => self.beta.resize(total, default_beta),
        }
        match batch.layer {
            Some(tags) => self.layer.extend(tags),
            None => self.layer.resize(total, default_tag.clone()),
        }
        for (col, new) in self.extras.iter_mut().zip(supplied) {
            match new {
                Some(new) => col.extend_from(&new),
                None => col.resize(total),
            }
        }

        self.validate()?;
        Ok(total)
    }

    /// Canonicalize, sort and deduplicate the edges; return the new count.
    ///
    /// Each edge is rewritten so `p1 <= p2`, the edges are stably sorted by
    /// `(p1, p2)`, and of each run of equal pairs only the first is kept.
    /// Self-pairs are dropped.  Applying this twice is the same as once.
    pub fn deduplicate(&mut self) -> usize {
        for (a, b) in self.p1.iter_mut().zip(self.p2.iter_mut()) {
            if *a > *b {
                std::mem::swap(a, b);
            }
        }

        let mut order: Vec<usize> = (0..self.edge_count()).collect();
        order.sort_by_key(|&i| (self.p1[i], self.p2[i]));

        let mut keep = Vec::with_capacity(order.len());
        let mut last = None;
        for i in order {
            let pair = (self.p1[i], self.p2[i]);
            if pair.0 != pair.1 && last != Some(pair) {
                keep.push(i);
            }
            last = Some(pair);
        }

        let removed = self.edge_count() - keep.len();
        self.gather(&keep);
        tracing::trace!(removed, remaining = keep.len(), "deduplicated layer");
        keep.len()
    }

    /// Shift every endpoint up by `by` (used when populations are combined).
    pub fn offset(&mut self, by: u32) {
        for p in self.p1.iter_mut().chain(self.p2.iter_mut()) {
            p.0 += by;
        }
    }

    /// Drop every edge with an endpoint `>= pop_size`; return how many were
    /// dropped.
    pub fn retain_within(&mut self, pop_size: usize) -> usize {
        let keep: Vec<usize> = (0..self.edge_count())
            .filter(|&i| self.p1[i].index() < pop_size && self.p2[i].index() < pop_size)
            .collect();
        let dropped = self.edge_count() - keep.len();
        if dropped > 0 {
            self.gather(&keep);
        }
        dropped
    }

    /// Decompose into `(p1, p2, beta, layer, named extras)`.
    pub(crate) fn into_parts(
        self,
    ) -> (Vec<PersonId>, Vec<PersonId>, Vec<f32>, Vec<LayerKey>, Vec<(String, Column)>) {
        let extras = self
            .schema
            .all_attribute_names()
            .map(str::to_owned)
            .zip(self.extras)
            .collect();
        (self.p1, self.p2, self.beta, self.layer, extras)
    }

    /// Keep only the rows at `rows`, in that order.
    fn gather(&mut self, rows: &[usize]) {
        self.p1 = rows.iter().map(|&i| self.p1[i]).collect();
        self.p2 = rows.iter().map(|&i| self.p2[i]).collect();
        self.beta = rows.iter().map(|&i| self.beta[i]).collect();
        self.layer = rows.iter().map(|&i| self.layer[i].clone()).collect();
        for col in &mut self.extras {
            *col = col.gather(rows);
        }
    }
}

fn integrity(column: &str, detail: String) -> PopError {
    PopError::LayerIntegrity { column: column.to_owned(), detail }
}
