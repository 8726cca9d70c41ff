//! Single-person snapshots.
//!
//! A [`PersonSnapshot`] is an independent copy of one row of a
//! [`PopulationStore`](crate::PopulationStore).  It is used for export and
//! debugging views and as input to the slow
//! [`rebuild_from_snapshots`](crate::PopulationStore::rebuild_from_snapshots)
//! path; nothing in the simulation loop should touch it.

use std::sync::Arc;

use cv_core::{AttributeSchema, PersonId, PopError, PopResult, Value};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PersonSnapshot {
    index:  PersonId,
    schema: Arc<AttributeSchema>,
    values: Vec<Value>,
}

impl PersonSnapshot {
    /// Snapshot with one value per schema attribute, in schema order.
    ///
    /// Each value is coerced to its attribute's kind.
    pub fn new(index: PersonId, schema: Arc<AttributeSchema>, values: Vec<Value>) -> PopResult<Self> {
        if values.len() != schema.len() {
            return Err(PopError::LengthMismatch {
                what:     format!("snapshot of {index}"),
                expected: schema.len(),
                got:      values.len(),
            });
        }
        let values = schema
            .iter()
            .zip(values)
            .map(|((_, _, kind), v)| v.cast(kind))
            .collect();
        Ok(Self { index, schema, values })
    }

    /// Row the snapshot was taken from.
    pub fn index(&self) -> PersonId {
        self.index
    }

    pub fn schema(&self) -> &Arc<AttributeSchema> {
        &self.schema
    }

    pub fn get(&self, name: &str) -> PopResult<Value> {
        let id = self.schema.id(name)?;
        Ok(self.values[id.index()])
    }

    /// Overwrite `name`, coercing `value` to the attribute's kind.
    pub fn set(&mut self, name: &str, value: Value) -> PopResult<()> {
        let id = self.schema.id(name)?;
        self.values[id.index()] = value.cast(self.schema.kind(id));
        Ok(())
    }

    /// Values in schema order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// `(name, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Value)> + '_ {
        self.schema.all_attribute_names().zip(self.values.iter().copied())
    }
}
