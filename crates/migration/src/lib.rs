//! Legacy class identifier migration.
//!
//! When a subject joins, [`MigrationEngine::on_trigger`] looks its class
//! identifier up in a fixed [`ClassMigrationTable`] and, on a hit, rewrites
//! it once through the subject's compare-and-set accessor. Subjects already
//! holding a current identifier miss the table, so repeated triggers are
//! no-ops.

#![cfg_attr(test, allow(unused_crate_dependencies))]

pub mod engine;
pub mod error;
pub mod table;

pub use engine::{MigrationEngine, MigrationEvent};
pub use error::MigrationError;
pub use table::{ClassMigrationTable, VANILLA_CLASSES};
