//! `cv-people`: structure-of-arrays population storage for the `cvpop`
//! population engine.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`store`]       | `PopulationStore` (attribute arrays, contacts, ledger)    |
//! | [`builder`]     | `PopulationBuilder` (fluent construction)                 |
//! | [`person`]      | `PersonSnapshot` (one detached row)                       |
//! | [`transtree`]   | `TransmissionLedger` (who infected whom)                  |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                     |
//! |------------|------------------------------------------------------------|
//! | `parallel` | `select_true` / `select_false` / `count` run on Rayon.     |
//! | `serde`    | Derives `Serialize`/`Deserialize` on all public types.     |

pub mod builder;
pub mod person;
pub mod store;
pub mod transtree;

#[cfg(test)]
mod tests;

pub use builder::PopulationBuilder;
pub use person::PersonSnapshot;
pub use store::{PopulationStore, StoreState};
pub use transtree::TransmissionLedger;
