//! Loading [`Parameters`] from JSON.
//!
//! Every field is optional; missing fields take their
//! [`Parameters::default`] value.  Layer maps keep the order they appear in
//! the file.
//!
//! ```json
//! {
//!     "pop_size": 5000,
//!     "beta_layer": { "h": 2.0, "c": 0.3 },
//!     "contacts": { "h": 4, "c": 20 },
//!     "dynamic_layers": ["c"]
//! }
//! ```

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use cv_core::Parameters;

use crate::OutputResult;

/// Parse and validate parameters from any reader.
pub fn parameters_from_reader<R: Read>(reader: R) -> OutputResult<Parameters> {
    let pars: Parameters = serde_json::from_reader(reader)?;
    pars.validate()?;
    Ok(pars)
}

/// Parse and validate parameters from a JSON file.
pub fn load_parameters_json(path: &Path) -> OutputResult<Parameters> {
    let file = File::open(path)?;
    let pars = parameters_from_reader(BufReader::new(file))?;
    tracing::debug!(path = %path.display(), layers = pars.beta_layer.len(), "loaded parameters");
    Ok(pars)
}
