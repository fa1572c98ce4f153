//! License name normalization and license text classification.
//!
//! - [`similarity`] — token-sort similarity scoring shared by both matchers.
//! - [`resolver`] — maps free-form names ("Apache License 2.0") to corpus
//!   records and SPDX identifiers.
//! - [`classifier`] — nearest-neighbour match of raw license text against the
//!   corpus reference texts, with an acceptance threshold.

pub mod classifier;
pub mod resolver;
pub mod similarity;
