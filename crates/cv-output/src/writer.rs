//! The `OutputWriter` trait implemented by export backends.

use cv_contacts::ContactGraph;
use cv_core::Parameters;
use cv_people::PopulationStore;

use crate::OutputResult;

/// Tabular export of a population.
pub trait OutputWriter {
    /// One row per person, one column per attribute.
    fn write_people(&mut self, people: &PopulationStore) -> OutputResult<()>;

    /// One row per edge across every live layer.
    fn write_contacts(&mut self, contacts: &ContactGraph) -> OutputResult<()>;

    /// The flattened key-value view of the parameters.
    fn write_parameters(&mut self, pars: &Parameters) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;

    /// Write people, contacts and parameters, then finish.
    fn write_store(&mut self, people: &PopulationStore) -> OutputResult<()> {
        self.write_people(people)?;
        self.write_contacts(people.contacts())?;
        self.write_parameters(people.pars())?;
        self.finish()
    }
}
