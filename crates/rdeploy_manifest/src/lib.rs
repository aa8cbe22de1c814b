//! # rdeploy_manifest
//!
//! Deployment manifest parsing and stack validation for rancher-deploy.
//!
//! A manifest names a Rancher server, a target environment and an ordered
//! list of stacks. Each stack points at a directory (or remote base URL)
//! holding a `docker-compose.yml` and an optional `rancher-compose.yml`.
//! Reading a manifest:
//!
//! - Deserializes the manifest into a typed schema
//! - Resolves compose files locally or fetches them over HTTP
//! - Scans each compose document for the template variables it references
//! - Verifies every referenced variable is supplied by the stack's `vars`
//!
//! ## Example
//!
//! ```rust,no_run
//! use rdeploy_manifest::{HttpFetcher, ManifestReader, TempFiles};
//!
//! let fetcher = HttpFetcher::new();
//! let mut temp_files = TempFiles::new();
//!
//! let manifest = ManifestReader::new(&fetcher)
//!     .read("deploy/production.yml", &mut temp_files)
//!     .unwrap();
//!
//! for stack in &manifest.stacks {
//!     println!("{}: {:?}", stack.name, stack.services);
//! }
//! ```

pub mod error;
pub mod model;
pub mod parser;
pub mod reader;
pub mod scanner;
pub mod source;

pub use error::{ManifestError, ManifestResult, MissingVariables};
pub use model::{ComposeDocument, ManifestSpec, ResolvedManifest, ResolvedStack, StackSpec};
pub use parser::{StackParser, COMPOSE_FILE, RANCHER_COMPOSE_FILE};
pub use reader::ManifestReader;
pub use scanner::{scan_variables, strip_template_blocks};
pub use source::{HttpFetcher, RemoteFetcher, ResolvedSource, SourceResolver, TempFiles};
