// Lineage: repost lineage and content mutation tracking.
//
// The core (lineage, diff, scoring, layout, detail) is pure and synchronous:
// it takes an incident snapshot and derives read-only structures from it.
// The shell (source, output, config) fetches snapshots and shows results.

pub mod config;
pub mod detail;
pub mod diff;
pub mod layout;
pub mod lineage;
pub mod models;
pub mod output;
pub mod scoring;
pub mod source;
