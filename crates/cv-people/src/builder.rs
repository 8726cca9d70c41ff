//! Fluent builder for [`PopulationStore`].
//!
//! # Usage
//!
//! ```rust
//! use cv_core::{AttrKind, AttributeSchema, Parameters};
//! use cv_people::PopulationBuilder;
//!
//! let edge_schema = AttributeSchema::builder()
//!     .group("contacts", [("duration", AttrKind::F32)])
//!     .build()
//!     .unwrap();
//!
//! let people = PopulationBuilder::new(Parameters::hybrid())
//!     .pop_size(1_000)
//!     .edge_schema(edge_schema)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(people.len(), 1_000);
//! assert_eq!(people.contacts().layer_names().count(), 4);
//! ```

use std::sync::Arc;

use cv_core::{AttributeSchema, Parameters, PopResult};

use crate::PopulationStore;

/// Fluent builder for [`PopulationStore`].
///
/// Every attribute array is allocated zero-filled at full length, so later
/// writes are indexed assignments, not pushes.
pub struct PopulationBuilder {
    pars:        Parameters,
    pop_size:    Option<usize>,
    schema:      AttributeSchema,
    edge_schema: AttributeSchema,
}

impl PopulationBuilder {
    /// Builder for the standard person schema, sized by `pars.pop_size`.
    pub fn new(pars: Parameters) -> Self {
        Self {
            pars,
            pop_size: None,
            schema: AttributeSchema::people(),
            edge_schema: AttributeSchema::empty(),
        }
    }

    /// Override `pars.pop_size`.
    pub fn pop_size(mut self, n: usize) -> Self {
        self.pop_size = Some(n);
        self
    }

    /// Replace the person attribute schema.
    pub fn schema(mut self, schema: AttributeSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Extra per-edge columns carried by every contact layer.
    pub fn edge_schema(mut self, schema: AttributeSchema) -> Self {
        self.edge_schema = schema;
        self
    }

    /// Check the parameters and allocate the store.
    pub fn build(self) -> PopResult<PopulationStore> {
        self.pars.validate()?;
        let pop_size = self.pop_size.unwrap_or(self.pars.pop_size);
        crate::store::person_bound(pop_size)?;
        tracing::debug!(
            pop_size,
            attributes = self.schema.len(),
            layers = self.pars.beta_layer.len(),
            "initializing population"
        );
        Ok(PopulationStore::new(
            self.pars,
            pop_size,
            Arc::new(self.schema),
            Arc::new(self.edge_schema),
        ))
    }
}
