//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `people.csv`: header is the attribute names; `bool` values are `0`/`1`
//! - `contacts.csv`: `layer_key, p1, p2, beta, layer`, then edge extras
//! - `parameters.csv`: `key, value`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use cv_contacts::ContactGraph;
use cv_core::Parameters;
use cv_people::PopulationStore;

use crate::OutputResult;
use crate::writer::OutputWriter;

/// Separator between a parameter field and its layer key.
const PARAM_SEP: &str = ".";

/// Writes a population to three CSV files.
pub struct CsvWriter {
    people:         Writer<File>,
    contacts:       Writer<File>,
    parameters:     Writer<File>,
    people_header:  bool,
    contact_header: bool,
    finished:       bool,
}

impl CsvWriter {
    /// Open (or create) the three CSV files in `dir`.
    ///
    /// `people.csv` and `contacts.csv` get their header on the first write,
    /// since it depends on the schemas being written.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let people = Writer::from_path(dir.join("people.csv"))?;
        let contacts = Writer::from_path(dir.join("contacts.csv"))?;

        let mut parameters = Writer::from_path(dir.join("parameters.csv"))?;
        parameters.write_record(["key", "value"])?;

        Ok(Self {
            people,
            contacts,
            parameters,
            people_header: false,
            contact_header: false,
            finished: false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_people(&mut self, people: &PopulationStore) -> OutputResult<()> {
        let schema = people.schema();
        if !self.people_header {
            self.people.write_record(schema.all_attribute_names())?;
            self.people_header = true;
        }

        let columns: Vec<_> = schema.iter().map(|(id, _, _)| people.column(id)).collect();
        for i in 0..people.len() {
            self.people.write_record(
                columns
                    .iter()
                    .map(|c| c.get(i).map(|v| v.to_string()).unwrap_or_default()),
            )?;
        }
        tracing::debug!(rows = people.len(), "wrote people.csv");
        Ok(())
    }

    fn write_contacts(&mut self, contacts: &ContactGraph) -> OutputResult<()> {
        let extras: Vec<&str> = contacts.schema().all_attribute_names().collect();
        if !self.contact_header {
            let mut header = vec!["layer_key", "p1", "p2", "beta", "layer"];
            header.extend(&extras);
            self.contacts.write_record(&header)?;
            self.contact_header = true;
        }

        for (key, layer) in contacts.iter() {
            let extra_cols = extras
                .iter()
                .map(|name| layer.extra(name))
                .collect::<Result<Vec<_>, _>>()?;
            for i in 0..layer.edge_count() {
                let mut record = vec![
                    key.to_string(),
                    layer.p1[i].0.to_string(),
                    layer.p2[i].0.to_string(),
                    layer.beta[i].to_string(),
                    layer.layer[i].to_string(),
                ];
                record.extend(
                    extra_cols
                        .iter()
                        .map(|c| c.get(i).map(|v| v.to_string()).unwrap_or_default()),
                );
                self.contacts.write_record(&record)?;
            }
        }
        tracing::debug!(edges = contacts.total_edges(), "wrote contacts.csv");
        Ok(())
    }

    fn write_parameters(&mut self, pars: &Parameters) -> OutputResult<()> {
        for (key, value) in pars.flatten(PARAM_SEP) {
            self.parameters.write_record([key, value])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.people.flush()?;
        self.contacts.flush()?;
        self.parameters.flush()?;
        Ok(())
    }
}
