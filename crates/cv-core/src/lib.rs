//! `cv-core`: foundational types for the `cvpop` population engine.
//!
//! This crate is a dependency of every other `cv-*` crate and has no `cv-*`
//! dependencies of its own.
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `PersonId`, `AttrId`                                  |
//! | [`column`]      | `AttrKind`, `Value`, `Column`, `Element`              |
//! | [`schema`]      | `AttributeSchema`, `SchemaBuilder`                    |
//! | [`params`]      | `Parameters`                                          |
//! | [`error`]       | `PopError`, `PopResult`                               |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | `Serialize`/`Deserialize` on all public types (snapshots). |

pub mod column;
pub mod error;
pub mod ids;
pub mod params;
pub mod schema;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use column::{AttrKind, Column, Element, Value};
pub use error::{PopError, PopResult, check_index};
pub use ids::{AttrId, PersonId};
pub use params::Parameters;
pub use schema::{AttributeSchema, SchemaBuilder};
