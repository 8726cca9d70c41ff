//! `cv-contacts`: typed contact layers for the `cvpop` population engine.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                   |
//! |-------------|------------------------------------------------------------|
//! | [`key`]     | `LayerKey` (shared layer name)                             |
//! | [`batch`]   | `EdgeBatch`, `ContactInput`, `PersonContacts`              |
//! | [`layer`]   | `Layer` (parallel edge columns, validate, deduplicate)     |
//! | [`graph`]   | `ContactGraph` (ordered layer map, add / remove / absorb)  |
//!
//! # Example
//!
//! ```rust
//! use cv_contacts::{ContactGraph, EdgeBatch};
//! use cv_core::{AttributeSchema, Parameters};
//! use std::sync::Arc;
//!
//! let pars = Parameters::hybrid();
//! let mut graph = ContactGraph::from_parameters(&pars, Arc::new(AttributeSchema::empty()));
//! graph.add_batch(EdgeBatch::from_pairs([(0, 1), (1, 2)]), Some("h"), None).unwrap();
//! assert_eq!(graph.get("h").unwrap().edge_count(), 2);
//! assert_eq!(graph.get("h").unwrap().beta, [2.0, 2.0]);
//! ```
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on layers and graphs.    |

pub mod batch;
pub mod graph;
pub mod key;
pub mod layer;


pub use batch::{ContactInput, EdgeBatch, PersonContacts};
pub use graph::ContactGraph;
pub use key::LayerKey;
pub use layer::Layer;
