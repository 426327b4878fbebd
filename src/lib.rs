//! bompricer: consolidate KiCad BOMs into one ordering-ready list
//!
//! Part lists from several boards are classified, matched against a local
//! SQLite component catalog, merged by part identity and ordered for
//! purchasing.

pub mod cli;
pub mod core;
pub mod input;
pub mod logging;
pub mod output;
