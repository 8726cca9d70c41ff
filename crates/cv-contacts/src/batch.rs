//! Incoming edges before they are appended to a [`Layer`].
//!
//! An [`EdgeBatch`] is the one columnar shape every other contact
//! representation is normalized into.  The `layer` and `beta` columns are
//! optional: [`Layer::append`] fills the missing ones with the target layer's
//! key and default weight.

use indexmap::IndexMap;

use cv_core::{Column, Element, PersonId, PopError, PopResult};

use crate::{Layer, LayerKey};

/// Per-person adjacency: layer key → that person's neighbors in the layer.
pub type PersonContacts = IndexMap<LayerKey, Vec<PersonId>>;

// ── EdgeBatch ─────────────────────────────────────────────────────────────────

/// A batch of new edge rows in columnar form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EdgeBatch {
    pub p1:     Vec<PersonId>,
    pub p2:     Vec<PersonId>,
    pub beta:   Option<Vec<f32>>,
    pub layer:  Option<Vec<LayerKey>>,
    /// Extra columns by name; each must be declared by the layer's schema.
    pub extras: Vec<(String, Column)>,
}

impl EdgeBatch {
    pub fn new(p1: Vec<PersonId>, p2: Vec<PersonId>) -> Self {
        Self { p1, p2, ..Self::default() }
    }

    /// Batch from `(p1, p2)` index pairs.
    pub fn from_pairs<I: IntoIterator<Item = (u32, u32)>>(pairs: I) -> Self {
        let (p1, p2) = pairs
            .into_iter()
            .map(|(a, b)| (PersonId(a), PersonId(b)))
            .unzip();
        Self::new(p1, p2)
    }

    pub fn with_beta(mut self, beta: Vec<f32>) -> Self {
        self.beta = Some(beta);
        self
    }

    pub fn with_layer(mut self, layer: Vec<LayerKey>) -> Self {
        self.layer = Some(layer);
        self
    }

    pub fn with_extra(mut self, name: &str, column: Column) -> Self {
        self.extras.push((name.to_owned(), column));
        self
    }

    /// Number of edge rows (length of `p1`).
    pub fn len(&self) -> usize {
        self.p1.len()
    }

    pub fn is_empty(&self) -> bool {
        self.p1.is_empty()
    }

    /// Every supplied column has the same length as `p1`.
    pub fn check_shape(&self) -> PopResult<()> {
        let n = self.len();
        let lens = [
            ("p2", Some(self.p2.len())),
            ("beta", self.beta.as_ref().map(Vec::len)),
            ("layer", self.layer.as_ref().map(Vec::len)),
        ];
        for (name, len) in lens {
            if let Some(len) = len {
                column_len(name, n, len)?;
            }
        }
        for (name, col) in &self.extras {
            column_len(name, n, col.len())?;
        }
        Ok(())
    }

    /// Batch from named columns (the mapping form).
    ///
    /// `p1` and `p2` are required and must be non-negative `I32` columns;
    /// `beta` is coerced to `f32`; every other column becomes an extra.
    pub fn from_columns(mut columns: IndexMap<String, Column>) -> PopResult<Self> {
        let p1 = take_indices(&mut columns, "p1")?;
        let p2 = take_indices(&mut columns, "p2")?;
        let beta = columns.shift_remove("beta").map(|c| match c {
            Column::F32(v) => v,
            other => other.values().map(f32::from_value).collect(),
        });
        Ok(Self {
            p1,
            p2,
            beta,
            layer: None,
            extras: columns.into_iter().collect(),
        })
    }

    /// Batch from a row matrix: every row is `[p1, p2]` or `[p1, p2, beta]`.
    pub fn from_rows(rows: &[Vec<f64>]) -> PopResult<Self> {
        let width = rows.first().map_or(2, Vec::len);
        if !(2..=3).contains(&width) {
            return Err(PopError::UnsupportedContactFormat(format!(
                "rows must have 2 or 3 columns (p1, p2[, beta]), got {width}"
            )));
        }
        let mut batch = Self::default();
        let mut beta = Vec::new();
        for (r, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(PopError::UnsupportedContactFormat(format!(
                    "row {r} has {} columns, expected {width}",
                    row.len()
                )));
            }
            batch.p1.push(row_index(r, row[0])?);
            batch.p2.push(row_index(r, row[1])?);
            if width == 3 {
                beta.push(row[2] as f32);
            }
        }
        if width == 3 {
            batch.beta = Some(beta);
        }
        Ok(batch)
    }

    /// Take over every column of an existing layer.
    pub fn from_layer(layer: Layer) -> Self {
        let (p1, p2, beta, tags, extras) = layer.into_parts();
        Self {
            p1,
            p2,
            beta: Some(beta),
            layer: Some(tags),
            extras,
        }
    }
}

fn column_len(name: &str, expected: usize, got: usize) -> PopResult<()> {
    if expected == got {
        Ok(())
    } else {
        Err(PopError::LayerIntegrity {
            column: name.to_owned(),
            detail: format!("{got} rows, expected {expected}"),
        })
    }
}

fn take_indices(columns: &mut IndexMap<String, Column>, name: &str) -> PopResult<Vec<PersonId>> {
    let col = columns.shift_remove(name).ok_or_else(|| {
        PopError::UnsupportedContactFormat(format!("missing required column \"{name}\""))
    })?;
    let kind = col.kind();
    let Column::I32(values) = col else {
        return Err(PopError::UnsupportedContactFormat(format!(
            "column \"{name}\" must hold integer person indices, not {kind:?}"
        )));
    };
    values
        .into_iter()
        .map(|v| {
            u32::try_from(v).map(PersonId).map_err(|_| {
                PopError::UnsupportedContactFormat(format!("negative index {v} in \"{name}\""))
            })
        })
        .collect()
}

fn row_index(row: usize, v: f64) -> PopResult<PersonId> {
    if v.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(&v) {
        Ok(PersonId(v as u32))
    } else {
        Err(PopError::UnsupportedContactFormat(format!(
            "row {row}: {v} is not a valid person index"
        )))
    }
}

// ── ContactInput ──────────────────────────────────────────────────────────────

/// The closed set of contact representations accepted by
/// [`ContactGraph::add_edges`](crate::ContactGraph::add_edges).
#[derive(Clone, Debug)]
pub enum ContactInput {
    /// A whole layer, appended into the target key.
    Layer(Layer),
    /// A prepared columnar batch.
    Batch(EdgeBatch),
    /// Named columns; see [`EdgeBatch::from_columns`].
    Columns(IndexMap<String, Column>),
    /// Row matrix; see [`EdgeBatch::from_rows`].
    Rows(Vec<Vec<f64>>),
    /// One entry per person, indexed by `PersonId`.
    Adjacency(Vec<PersonContacts>),
}

impl From<EdgeBatch> for ContactInput {
    fn from(b: EdgeBatch) -> Self {
        ContactInput::Batch(b)
    }
}

impl From<Layer> for ContactInput {
    fn from(l: Layer) -> Self {
        ContactInput::Layer(l)
    }
}

impl From<Vec<PersonContacts>> for ContactInput {
    fn from(a: Vec<PersonContacts>) -> Self {
        ContactInput::Adjacency(a)
    }
}
