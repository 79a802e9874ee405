//! Command implementations and collaborator wiring.

mod run;
mod status;

pub use run::{run, RunArgs};
pub use status::status;
