//! `license-discovery` — locate and classify the license governing a project.
//!
//! # Pieces
//! - [`corpus`] — read-only reference corpus of license records and texts.
//! - [`license`] — name normalization ([`license::resolver`]) and text
//!   classification ([`license::classifier`]).
//! - [`discovery`] — the fallback chain: local folder scan, host API, clone.
//! - [`config`] — optional TOML configuration.
//!
//! ```no_run
//! # async fn run() -> license_discovery::Result<()> {
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use license_discovery::{Corpus, DiscoveryConfig, LicenseDiscovery};
//!
//! let discovery = LicenseDiscovery::new(Arc::new(Corpus::bundled()?), DiscoveryConfig::default())?;
//! let found = discovery
//!     .search_license_file(Path::new("pkg"), Some("https://github.com/org/repo"), None, Some("MIT License"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod corpus;
pub mod discovery;
pub mod error;
pub mod license;
pub mod models;

pub use config::{load_config, DiscoveryConfig};
pub use corpus::Corpus;
pub use discovery::LicenseDiscovery;
pub use error::{DiscoveryError, Result};
pub use license::classifier::{classify_license_text, ACCEPTANCE_THRESHOLD};
pub use license::resolver::{resolve_license_name, short_license_id};
pub use models::{LicenseRecord, ShortLicense};
