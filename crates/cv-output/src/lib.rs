//! `cv-output`: export, persistence and configuration loading for the
//! `cvpop` population engine.
//!
//! | Module       | Contents                                                     |
//! |--------------|--------------------------------------------------------------|
//! | [`writer`]   | `OutputWriter` trait                                         |
//! | [`csv`]      | `CsvWriter`: `people.csv`, `contacts.csv`, `parameters.csv`  |
//! | [`snapshot`] | Versioned bincode snapshots of a whole `PopulationStore`     |
//! | [`config`]   | `Parameters` from JSON                                       |
//!
//! # Usage
//!
//! ```rust,ignore
//! use cv_output::{CsvWriter, OutputWriter, snapshot};
//!
//! let mut writer = CsvWriter::new(Path::new("./output"))?;
//! writer.write_store(&people)?;
//! snapshot::save_snapshot(&people, Path::new("./output/people.bin"))?;
//! ```

pub mod config;
pub mod csv;
pub mod error;
pub mod snapshot;
pub mod writer;


pub use config::{load_parameters_json, parameters_from_reader};
pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use snapshot::{SNAPSHOT_VERSION, from_bytes, load_snapshot, save_snapshot, to_bytes};
pub use writer::OutputWriter;
