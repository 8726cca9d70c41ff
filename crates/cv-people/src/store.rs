//! `PopulationStore`: structure-of-arrays person registry plus the contact
//! graph and transmission ledger that belong to the same population.
//!
//! # Layout
//!
//! One [`Column`] per attribute of the store's [`AttributeSchema`], all of
//! length [`len`](PopulationStore::len).  The [`PersonId`] value is the
//! index into every one of them.  Name lookups go through the schema; the
//! tick loop should resolve names once and then index typed slices:
//!
//! ```rust
//! use cv_core::Parameters;
//! use cv_people::PopulationStore;
//!
//! let mut people = PopulationStore::initialize(Parameters::default(), Some(100)).unwrap();
//! let infectious = people.slice_mut::<bool>("infectious").unwrap();
//! infectious[7] = true;
//! assert_eq!(people.count("infectious").unwrap(), 1);
//! ```
//!
//! # States
//!
//! A store is either *initialized* or *invalid*.  A strict
//! [`validate`](PopulationStore::validate) that finds a length mismatch marks
//! the store invalid; until a later `validate` succeeds, operations that read
//! whole rows (`combine`, `materialize_one`, `to_people`, `to_array`,
//! `rebuild_from_snapshots`) fail with [`PopError::InvalidState`].  `set`,
//! `resize` and `validate` stay available so the caller can repair it.

use std::ops::Add;
use std::sync::Arc;

use cv_contacts::{ContactGraph, ContactInput};
use cv_core::{
    AttrId, AttrKind, AttributeSchema, Column, Element, Parameters, PersonId, PopError, PopResult,
    Value, check_index,
};

use crate::{PersonSnapshot, TransmissionLedger};

/// Lifecycle state of a [`PopulationStore`].
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StoreState {
    Initialized,
    /// A strict `validate` failed and no later `validate` has succeeded.
    Invalid,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PopulationStore {
    pars:      Parameters,
    pop_size:  usize,
    schema:    Arc<AttributeSchema>,
    columns:   Vec<Column>,
    contacts:  ContactGraph,
    transtree: TransmissionLedger,
    state:     StoreState,
}

impl PopulationStore {
    /// Population of `pop_size` people (default `pars.pop_size`) with the
    /// standard person schema and no extra edge columns.
    pub fn initialize(pars: Parameters, pop_size: Option<usize>) -> PopResult<Self> {
        let mut builder = crate::PopulationBuilder::new(pars);
        if let Some(n) = pop_size {
            builder = builder.pop_size(n);
        }
        builder.build()
    }

    pub(crate) fn new(
        pars: Parameters,
        pop_size: usize,
        schema: Arc<AttributeSchema>,
        edge_schema: Arc<AttributeSchema>,
    ) -> Self {
        let columns = schema
            .iter()
            .map(|(_, _, kind)| Column::zeros(kind, pop_size))
            .collect();
        let contacts = ContactGraph::from_parameters(&pars, edge_schema);
        Self {
            pars,
            pop_size,
            schema,
            columns,
            contacts,
            transtree: TransmissionLedger::new(pop_size),
            state: StoreState::Initialized,
        }
    }

    // ── Size and metadata ─────────────────────────────────────────────────

    /// Number of people.
    #[inline]
    pub fn len(&self) -> usize {
        self.pop_size
    }

    pub fn is_empty(&self) -> bool {
        self.pop_size == 0
    }

    /// Every `PersonId` in ascending order.
    pub fn indices(&self) -> impl Iterator<Item = PersonId> + '_ {
        (0..self.pop_size).map_while(|i| PersonId::try_from(i).ok())
    }

    pub fn state(&self) -> StoreState {
        self.state
    }

    pub fn schema(&self) -> &Arc<AttributeSchema> {
        &self.schema
    }

    pub fn pars(&self) -> &Parameters {
        &self.pars
    }

    /// Attribute names: all of them, or those of one schema group.
    pub fn keys(&self, group: Option<&str>) -> PopResult<Vec<&str>> {
        match group {
            None => Ok(self.schema.all_attribute_names().collect()),
            Some(g) => self.schema.group(g),
        }
    }

    /// Declared contact-layer keys, from the parameters.
    pub fn contact_keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.pars.contact_keys()
    }

    // ── Attribute access ──────────────────────────────────────────────────

    pub fn get(&self, name: &str) -> PopResult<&Column> {
        let id = self.schema.id(name)?;
        Ok(&self.columns[id.index()])
    }

    /// Column by pre-resolved id.  Panics if `id` came from another schema.
    #[inline]
    pub fn column(&self, id: AttrId) -> &Column {
        &self.columns[id.index()]
    }

    /// Typed read-only view of attribute `name`.
    pub fn slice<T: Element>(&self, name: &str) -> PopResult<&[T]> {
        let id = self.schema.id(name)?;
        T::slice(&self.columns[id.index()]).ok_or_else(|| kind_mismatch::<T>(&self.schema, id))
    }

    /// Typed fixed-length mutable view of attribute `name`.
    pub fn slice_mut<T: Element>(&mut self, name: &str) -> PopResult<&mut [T]> {
        let id = self.schema.id(name)?;
        let schema = &self.schema;
        T::slice_mut(&mut self.columns[id.index()]).ok_or_else(|| kind_mismatch::<T>(schema, id))
    }

    /// Replace attribute `name`.  `values` is coerced to the declared kind
    /// and must have exactly [`len`](Self::len) elements.
    pub fn set(&mut self, name: &str, values: impl Into<Column>) -> PopResult<()> {
        let values = values.into();
        if values.len() != self.pop_size {
            return Err(PopError::LengthMismatch {
                what:     name.to_owned(),
                expected: self.pop_size,
                got:      values.len(),
            });
        }
        self.set_allow_mismatch(name, values)
    }

    /// [`set`](Self::set) without the length check.  The store is
    /// inconsistent until the next [`validate`](Self::validate) or
    /// [`resize`](Self::resize).
    pub fn set_allow_mismatch(&mut self, name: &str, values: impl Into<Column>) -> PopResult<()> {
        let id = self.schema.id(name)?;
        self.columns[id.index()] = values.into().cast(self.schema.kind(id));
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Ascending indices where `name` is nonzero / `true`.
    pub fn select_true(&self, name: &str) -> PopResult<Vec<PersonId>> {
        Ok(positions(self.get(name)?, true))
    }

    /// Ascending indices where `name` is zero / `false`.
    pub fn select_false(&self, name: &str) -> PopResult<Vec<PersonId>> {
        Ok(positions(self.get(name)?, false))
    }

    /// Number of entries of `name` that are `> 0`.
    pub fn count(&self, name: &str) -> PopResult<usize> {
        let col = self.get(name)?;

        #[cfg(not(feature = "parallel"))]
        {
            Ok(col.count_positive())
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            Ok((0..col.len())
                .into_par_iter()
                .filter(|&i| col.get(i).is_some_and(|v| v.as_f64() > 0.0))
                .count())
        }
    }

    // ── Consistency ───────────────────────────────────────────────────────

    /// Check that every attribute has [`len`](Self::len) elements.
    ///
    /// Strict: the first mismatch fails with [`PopError::LengthMismatch`] and
    /// marks the store [`StoreState::Invalid`].  Non-strict: mismatched
    /// attributes are truncated or zero-padded.  Either way, success leaves
    /// the store [`StoreState::Initialized`].
    pub fn validate(&mut self, strict: bool) -> PopResult<()> {
        for ((_, name, _), col) in self.schema.iter().zip(self.columns.iter_mut()) {
            let got = col.len();
            if got == self.pop_size {
                continue;
            }
            if strict {
                self.state = StoreState::Invalid;
                return Err(PopError::LengthMismatch {
                    what:     name.to_owned(),
                    expected: self.pop_size,
                    got,
                });
            }
            tracing::debug!(attribute = name, from = got, to = self.pop_size, "resizing attribute");
            col.resize(self.pop_size);
        }
        self.state = StoreState::Initialized;
        Ok(())
    }

    /// Truncate or zero-extend the named attributes (all if `None`) to
    /// `new_size`, and set the population size to `new_size`.
    ///
    /// Contact layers are not touched; edges to removed people dangle until
    /// the caller runs `ContactGraph::retain_within` or
    /// `ContactGraph::check_indices`.  Ledger history of removed people is
    /// kept while they are out of range and cleared if the population grows
    /// back over them.
    pub fn resize(&mut self, new_size: usize, names: Option<&[&str]>) -> PopResult<()> {
        person_bound(new_size)?;
        let ids: Vec<AttrId> = match names {
            None => self.schema.iter().map(|(id, _, _)| id).collect(),
            Some(names) => names.iter().map(|n| self.schema.id(n)).collect::<PopResult<_>>()?,
        };
        tracing::debug!(from = self.pop_size, to = new_size, attributes = ids.len(), "resizing population");
        for id in ids {
            self.columns[id.index()].resize(new_size);
        }
        if new_size > self.pop_size {
            self.transtree.forget_from(self.pop_size);
        }
        self.pop_size = new_size;
        self.transtree.grow_to(new_size);
        Ok(())
    }

    // ── Combining ─────────────────────────────────────────────────────────

    /// New store holding `self`'s people followed by `other`'s.
    ///
    /// Both stores must declare identical attributes.  Attribute arrays are
    /// concatenated, `uid` (if declared) is renumbered `0..n`, `other`'s
    /// contact edges and ledger entries are shifted by `self.len()`.  Edges
    /// past either population (left by a shrinking `resize`) fail with
    /// [`PopError::IndexOutOfRange`]; prune them with
    /// `ContactGraph::retain_within` first.
    pub fn combine(&self, other: &PopulationStore) -> PopResult<PopulationStore> {
        self.ensure_valid()?;
        other.ensure_valid()?;
        if !self.schema.same_attributes(&other.schema) {
            return Err(PopError::SchemaMismatch(schema_difference(&self.schema, &other.schema)));
        }
        let offset = person_bound(self.pop_size)?;
        let pop_size = self.pop_size + other.pop_size;
        person_bound(pop_size)?;
        // Dangling edges would alias the other population after the shift.
        self.contacts.check_indices(self.pop_size)?;
        other.contacts.check_indices(other.pop_size)?;

        let mut columns = self.columns.clone();
        for (col, theirs) in columns.iter_mut().zip(&other.columns) {
            col.extend_from(theirs);
        }

        let mut contacts = self.contacts.clone();
        contacts.absorb(other.contacts.clone(), offset)?;

        let mut transtree = self.transtree.restricted_to(self.pop_size);
        transtree.absorb(other.transtree.restricted_to(other.pop_size), offset);

        let mut combined = PopulationStore {
            pars: self.pars.clone(),
            pop_size,
            schema: self.schema.clone(),
            columns,
            contacts,
            transtree,
            state: StoreState::Initialized,
        };
        combined.validate(true)?;
        if let Ok(id) = self.schema.id("uid") {
            let uid: Vec<i32> = (0..pop_size as i32).collect();
            combined.columns[id.index()] = Column::from(uid).cast(self.schema.kind(id));
        }
        tracing::debug!(left = self.pop_size, right = other.pop_size, "combined populations");
        Ok(combined)
    }

    // ── Row views (slow paths) ────────────────────────────────────────────

    /// Independent copy of person `index`'s attribute values.
    pub fn materialize_one(&self, index: PersonId) -> PopResult<PersonSnapshot> {
        self.ensure_valid()?;
        check_index(index.index(), self.pop_size)?;
        self.snapshot(index)
    }

    /// Every person as a snapshot.
    pub fn to_people(&self) -> PopResult<Vec<PersonSnapshot>> {
        self.ensure_valid()?;
        self.indices().map(|p| self.snapshot(p)).collect()
    }

    /// Row-major `f32` matrix, one row per person and one column per
    /// attribute.  The `uid` column holds the row index.
    pub fn to_array(&self) -> PopResult<Vec<Vec<f32>>> {
        self.ensure_valid()?;
        let uid = self.schema.id("uid").ok();
        let mut rows = vec![Vec::with_capacity(self.columns.len()); self.pop_size];
        for (i, row) in rows.iter_mut().enumerate() {
            for (id, _, _) in self.schema.iter() {
                let v = if Some(id) == uid {
                    i as f32
                } else {
                    self.columns[id.index()]
                        .get_f32(i)
                        .ok_or_else(|| self.short_column(id))?
                };
                row.push(v);
            }
        }
        Ok(rows)
    }

    /// Overwrite the store row by row from `snapshots`.
    ///
    /// With `resize`, the population is first resized to the number of
    /// snapshots.  This writes one scalar at a time; prefer [`set`](Self::set)
    /// for anything performance-sensitive.
    pub fn rebuild_from_snapshots(&mut self, snapshots: &[PersonSnapshot], resize: bool) -> PopResult<()> {
        self.ensure_valid()?;
        if let Some(bad) = snapshots.iter().find(|s| !s.schema().same_attributes(&self.schema)) {
            return Err(PopError::SchemaMismatch(schema_difference(&self.schema, bad.schema())));
        }
        if resize {
            self.resize(snapshots.len(), None)?;
        } else if snapshots.len() > self.pop_size {
            return Err(PopError::IndexOutOfRange { index: self.pop_size, len: self.pop_size });
        }

        tracing::debug!(people = snapshots.len(), "rebuilding population from snapshots");
        for (p, snap) in snapshots.iter().enumerate() {
            for (col, &v) in self.columns.iter_mut().zip(snap.values()) {
                if !col.set(p, v) {
                    return Err(PopError::IndexOutOfRange { index: p, len: col.len() });
                }
            }
        }
        Ok(())
    }

    // ── Contacts ──────────────────────────────────────────────────────────

    pub fn contacts(&self) -> &ContactGraph {
        &self.contacts
    }

    pub fn contacts_mut(&mut self) -> &mut ContactGraph {
        &mut self.contacts
    }

    /// Add edges to the contact graph; see `ContactGraph::add_edges`.
    pub fn add_contacts(
        &mut self,
        input: impl Into<ContactInput>,
        key: Option<&str>,
        beta: Option<f32>,
    ) -> PopResult<usize> {
        self.contacts.add_edges(input.into(), key, beta)
    }

    /// Replace the named layers (all declared layers if `None`) with empty
    /// ones.
    pub fn init_contacts(&mut self, keys: Option<&[&str]>) {
        self.contacts.reset(keys);
    }

    /// Drop every configured dynamic layer that is also a configured contact
    /// layer.  Returns the number of layers removed.
    pub fn remove_dynamic_contacts(&mut self) -> usize {
        let keys: Vec<&str> = self
            .pars
            .dynamic_layers
            .iter()
            .map(String::as_str)
            .filter(|k| self.pars.contacts.contains_key(*k))
            .collect();
        let removed = self.contacts.remove(&keys);
        tracing::debug!(removed, "removed dynamic contact layers");
        removed
    }

    // ── Transmission ledger ───────────────────────────────────────────────

    pub fn transtree(&self) -> &TransmissionLedger {
        &self.transtree
    }

    /// Record an infection.  Both people must be `< len()`.
    pub fn record_infection(&mut self, target: PersonId, source: Option<PersonId>) -> PopResult<()> {
        check_index(target.index(), self.pop_size)?;
        if let Some(s) = source {
            check_index(s.index(), self.pop_size)?;
        }
        self.transtree.record_infection(target, source)
    }

    pub fn infected_by(&self, target: PersonId) -> PopResult<Option<PersonId>> {
        check_index(target.index(), self.pop_size)?;
        self.transtree.infected_by(target)
    }

    pub fn infected_targets_of(&self, source: PersonId) -> PopResult<&[PersonId]> {
        check_index(source.index(), self.pop_size)?;
        self.transtree.infected_targets_of(source)
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn ensure_valid(&self) -> PopResult<()> {
        match self.state {
            StoreState::Initialized => Ok(()),
            StoreState::Invalid => Err(PopError::InvalidState),
        }
    }

    fn snapshot(&self, index: PersonId) -> PopResult<PersonSnapshot> {
        let i = index.index();
        let values = self
            .schema
            .iter()
            .map(|(id, _, _)| self.columns[id.index()].get(i).ok_or_else(|| self.short_column(id)))
            .collect::<PopResult<Vec<Value>>>()?;
        PersonSnapshot::new(index, self.schema.clone(), values)
    }

    /// Error for a row read past the end of a column shortened by
    /// `set_allow_mismatch`.
    fn short_column(&self, id: AttrId) -> PopError {
        PopError::LengthMismatch {
            what:     self.schema.name(id).to_owned(),
            expected: self.pop_size,
            got:      self.columns[id.index()].len(),
        }
    }
}

impl Add for &PopulationStore {
    type Output = PopResult<PopulationStore>;

    /// `&a + &b` is [`a.combine(&b)`](PopulationStore::combine).
    fn add(self, rhs: Self) -> Self::Output {
        self.combine(rhs)
    }
}

/// Ascending positions where `col` is (`want == true`) or is not nonzero.
fn positions(col: &Column, want: bool) -> Vec<PersonId> {
    #[cfg(not(feature = "parallel"))]
    {
        let idx = if want { col.nonzero_indices() } else { col.zero_indices() };
        idx.into_iter().filter_map(|i| PersonId::try_from(i).ok()).collect()
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        (0..col.len())
            .into_par_iter()
            .filter(|&i| col.get(i).is_some_and(|v| v.is_nonzero() == want))
            .filter_map(|i| PersonId::try_from(i).ok())
            .collect()
    }
}

/// `n` as a `u32` person count, or an error if people past `u32::MAX`
/// could not be addressed by a [`PersonId`].
pub(crate) fn person_bound(n: usize) -> PopResult<u32> {
    u32::try_from(n).map_err(|_| PopError::Config(format!("population of {n} exceeds u32 indices")))
}

fn kind_mismatch<T: Element>(schema: &AttributeSchema, id: AttrId) -> PopError {
    PopError::KindMismatch {
        name:      schema.name(id).to_owned(),
        requested: T::KIND,
        actual:    schema.kind(id),
    }
}

/// Human-readable first difference between two attribute lists.
fn schema_difference(a: &AttributeSchema, b: &AttributeSchema) -> String {
    let left: Vec<(&str, AttrKind)> = a.iter().map(|(_, n, k)| (n, k)).collect();
    let right: Vec<(&str, AttrKind)> = b.iter().map(|(_, n, k)| (n, k)).collect();
    match left.iter().zip(&right).position(|(l, r)| l != r) {
        Some(i) => format!("attribute {i} is {:?} on the left, {:?} on the right", left[i], right[i]),
        None => format!("{} attributes on the left, {} on the right", left.len(), right.len()),
    }
}
