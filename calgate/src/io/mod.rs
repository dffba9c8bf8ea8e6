//! Side-effecting collaborators: header snapshots, reference lookup, config, reports.

pub mod config;
pub mod header;
pub mod reference;
pub mod report;
