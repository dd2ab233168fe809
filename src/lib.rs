//! Route Patcher: lazy route generation for Angular workspaces
//!
//! Generates a lazily loaded feature module and registers it in the routing
//! module next to the closest `NgModule`, by splicing an import and a route
//! entry into the existing source without disturbing any other text.
//!
//! # Architecture
//!
//! Every source change compiles down to a single primitive: [`Insertion`], a
//! pure insertion at a byte offset of the original text. Intelligence lives
//! in offset acquisition (tree-sitter anchors and queries), not in the
//! application logic.
//!
//! - [`ts`] parses TypeScript and locates the registration anchor
//! - [`plan`] turns an anchor into insertions
//! - [`edit`] splices insertions into text
//! - [`tree`] stages updates and new files until [`StagedTree::flush`]
//! - [`rule`] ties the steps together
//!
//! # Safety
//!
//! - Updates verify the file is unchanged since they were planned
//! - Patched sources are re-parsed before they are staged
//! - Nothing reaches disk unless every step succeeded
//! - Atomic file writes (tempfile + fsync + rename)
//! - Workspace boundary enforcement
//!
//! # Example
//!
//! ```no_run
//! use route_patcher::{generate, load_settings, load_workspace, GenerateOptions, StagedTree, WorkspaceGuard};
//! use std::path::Path;
//!
//! let root = Path::new("my-app");
//! let settings = load_settings(root)?;
//! let workspace = load_workspace(root)?;
//!
//! let mut tree = StagedTree::new(root);
//! let options = GenerateOptions {
//!     project: Some("my-app".into()),
//!     ..GenerateOptions::new("orders", &settings)
//! };
//! let report = generate(&mut tree, &workspace, &settings, &options)?;
//! println!("selector: {}", report.selector);
//!
//! tree.flush(&WorkspaceGuard::new(root)?)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod edit;
pub mod module;
pub mod naming;
pub mod paths;
pub mod plan;
pub mod pool;
pub mod rule;
pub mod safety;
pub mod template;
pub mod tree;
pub mod ts;

// Re-exports
pub use config::{load_settings, load_workspace, ConfigError, PatcherConfig, WorkspaceFile};
pub use edit::{apply_insertions, EditError, EditVerification, Insertion};
pub use plan::{ImportBinding, RouteEntry};
pub use rule::{generate, GenerateError, GenerateOptions, GenerationReport};
pub use safety::{SafetyError, WorkspaceGuard};
pub use tree::{StagedTree, TreeError, UpdateRecorder};
pub use ts::{
    Anchor, AnchorLocator, QueryEngine, QueryMatch, RegistrationMethods, SourceDocument,
    TreeSitterError,
};
