pub mod loader;
pub mod schema;
pub mod workspace;

pub use loader::{
    load_from_path, load_from_str, load_settings, load_workspace, load_workspace_from_str,
    ConfigError, CONFIG_FILE_NAME, WORKSPACE_FILE_NAME,
};
pub use schema::{Defaults, PatcherConfig, Registration, ValidationError, ValidationIssue};
pub use workspace::{Project, ProjectType, WorkspaceFile};
