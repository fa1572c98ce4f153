//! Report renderers for discovery results.
//!
//! - [`terminal`] — colored summary table; respects `--quiet`.
//!
//! JSON output is a direct `serde_json` dump of the result and lives in `main`.

pub mod terminal;
