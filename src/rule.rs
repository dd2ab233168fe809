//! The lazy-route generation rule.
//!
//! A request is resolved against the workspace, the routing module next to
//! the closest module is patched to load the new unit lazily, and the unit's
//! files are rendered. Everything lands in a [`StagedTree`]; a failing step
//! leaves nothing to flush.

use crate::config::{PatcherConfig, WorkspaceFile};
use crate::edit::{EditError, Insertion};
use crate::module::{find_module_from_options, ModuleError, ModuleQuery};
use crate::naming::{self, classify, dasherize, ValidationError};
use crate::paths;
use crate::plan::{self, ImportBinding, RouteEntry};
use crate::template::{self, TemplateContext};
use crate::tree::{StagedTree, TreeError};
use crate::ts::{validate_patch, AnchorLocator, SourceDocument, TreeSitterError};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("{0}")]
    Configuration(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Module(#[from] ModuleError),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    TreeSitter(#[from] TreeSitterError),

    #[error(transparent)]
    Edit(#[from] EditError),
}

/// One generation request.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub name: String,
    pub project: Option<String>,
    /// Directory the unit goes in; the project's default path when absent
    pub path: Option<String>,
    /// Module to register in; discovered when absent
    pub module: Option<String>,
    pub route: bool,
    pub flat: bool,
    pub prefix: Option<String>,
    pub style: String,
    pub spec: bool,
    pub inline_style: bool,
    pub inline_template: bool,
    pub skip_import: bool,
}

impl GenerateOptions {
    /// A request for `name` with flags taken from the settings file.
    pub fn new(name: impl Into<String>, settings: &PatcherConfig) -> Self {
        let defaults = &settings.defaults;
        Self {
            name: name.into(),
            project: None,
            path: None,
            module: None,
            route: true,
            flat: defaults.flat,
            prefix: None,
            style: defaults.style.clone(),
            spec: defaults.spec,
            inline_style: defaults.inline_style,
            inline_template: defaults.inline_template,
            skip_import: false,
        }
    }
}

/// The routing module patch that was staged.
#[derive(Debug, Clone, Serialize)]
pub struct RoutePatch {
    pub file: String,
    pub insertions: Vec<Insertion>,
}

/// What a successful generation staged.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub name: String,
    pub selector: String,
    pub route: Option<RoutePatch>,
    pub created: Vec<String>,
}

/// Run the rule against `tree`.
///
/// On error the tree is restored to what was staged before the call.
pub fn generate(
    tree: &mut StagedTree,
    workspace: &WorkspaceFile,
    settings: &PatcherConfig,
    options: &GenerateOptions,
) -> Result<GenerationReport, GenerateError> {
    let checkpoint = tree.checkpoint();
    let result = stage(tree, workspace, settings, options);
    if result.is_err() {
        tree.restore(checkpoint);
    }
    result
}

fn stage(
    tree: &mut StagedTree,
    workspace: &WorkspaceFile,
    settings: &PatcherConfig,
    options: &GenerateOptions,
) -> Result<GenerationReport, GenerateError> {
    let project_name = options
        .project
        .as_deref()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| GenerateError::Configuration("Option (project) is required.".into()))?;
    let project = workspace.project(project_name).ok_or_else(|| {
        GenerateError::Configuration(format!("Project '{project_name}' does not exist."))
    })?;

    let path = match options.path.as_deref() {
        Some(path) if paths::escapes_root(path) => {
            return Err(GenerateError::Configuration(format!(
                "Path '{path}' points outside the workspace."
            )));
        }
        Some(path) => paths::normalize(path),
        None => project.default_path(),
    };
    if paths::escapes_root(&format!("{path}/{}", options.name)) {
        return Err(GenerateError::Configuration(format!(
            "Name '{}' points outside the workspace.",
            options.name
        )));
    }
    let location = naming::parse_name(&path, &options.name);
    naming::validate_name(&location.name)?;

    let module = if options.route {
        find_module_from_options(
            tree,
            &ModuleQuery {
                name: &location.name,
                path: &location.path,
                module: options.module.as_deref(),
                flat: options.flat,
                skip_import: options.skip_import,
            },
        )?
    } else {
        None
    };

    let selector = naming::build_selector(
        &location.name,
        options.prefix.as_deref(),
        project.prefix.as_deref(),
    );
    naming::validate_html_selector(&selector)?;

    let route = match module {
        Some(module) => Some(add_route(tree, settings, &module, &location, options.flat)?),
        None => None,
    };

    let created = template::merge_into(
        tree,
        &location.path,
        &TemplateContext {
            name: location.name.clone(),
            selector: selector.clone(),
            style: options.style.clone(),
            spec: options.spec,
            flat: options.flat,
            inline_style: options.inline_style,
            inline_template: options.inline_template,
        },
    )?;

    tracing::info!(
        name = %location.name,
        selector = %selector,
        files = created.len(),
        "generated lazy route"
    );

    Ok(GenerationReport {
        name: location.name,
        selector,
        route,
        created,
    })
}

/// Register the unit in the routing module next to `module`.
fn add_route(
    tree: &mut StagedTree,
    settings: &PatcherConfig,
    module: &str,
    location: &naming::Location,
    flat: bool,
) -> Result<RoutePatch, GenerateError> {
    if !naming::has_routing_sibling(module) {
        return Err(GenerateError::Configuration(format!(
            "Module path '{module}' has no `<name>.module.ts` shape to derive a routing module from."
        )));
    }
    let routing_path = naming::routing_sibling_path(module);

    let mut recorder = tree.begin_update(&routing_path)?;
    let document = SourceDocument::parse(&routing_path, recorder.original())?;
    let anchor = AnchorLocator::new(settings.registration_methods()).locate(&document)?;

    let dashed = dasherize(&location.name);
    let unit_dir = if flat {
        location.path.clone()
    } else {
        paths::join(&location.path, &dashed)
    };
    let class_name = classify(&format!("{}Module", location.name));
    let binding = ImportBinding {
        symbol: class_name.clone(),
        module_path: paths::join(&unit_dir, &format!("{dashed}.module")),
        source_file: routing_path.clone(),
    };
    let entry = RouteEntry::new(dashed, &binding.specifier(), &class_name);

    let insertions = plan::plan(&document, &anchor, &binding, &entry)?;
    for insertion in &insertions {
        recorder.insert_left(insertion.offset, insertion.text.clone());
    }

    let patched = recorder.preview()?;
    validate_patch(document.path(), document.text(), &patched)?;
    tree.commit_update(recorder)?;

    Ok(RoutePatch {
        file: routing_path,
        insertions,
    })
}
