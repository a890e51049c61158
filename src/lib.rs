//! Quest authoring engine: turns incrementally edited quest state into
//! validated quest definitions, or a list of reasons it cannot yet.

pub mod config;
pub mod quest;
