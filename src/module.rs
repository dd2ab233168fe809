//! Locating the module a generated unit is registered in.

use crate::naming::dasherize;
use crate::paths;
use crate::tree::StagedTree;
use thiserror::Error;

const MODULE_SUFFIX: &str = ".module.ts";
const ROUTING_MODULE_SUFFIX: &str = "-routing.module.ts";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModuleError {
    #[error(
        "Could not find a module above '{dir}'. Use the skip-import option to skip registering the route."
    )]
    NotFound { dir: String },

    #[error(
        "More than one module matches in '{dir}': {}. Use the skip-import option or name the module explicitly.",
        .candidates.join(", ")
    )]
    Ambiguous { dir: String, candidates: Vec<String> },

    #[error("Specified module does not exist: {module}")]
    SpecifiedMissing { module: String },
}

/// The fields of a generation request that decide which module is used.
#[derive(Debug, Clone, Copy)]
pub struct ModuleQuery<'a> {
    pub name: &'a str,
    pub path: &'a str,
    pub module: Option<&'a str>,
    pub flat: bool,
    pub skip_import: bool,
}

/// Resolve the module to register in, or `None` when importing is skipped.
///
/// An explicit module is tried as given, then with `.ts`, then with
/// `.module.ts`, then as a directory holding `<base>.module.ts`. Without
/// one, the closest module above the unit's directory is used.
pub fn find_module_from_options(
    tree: &StagedTree,
    query: &ModuleQuery<'_>,
) -> Result<Option<String>, ModuleError> {
    if query.skip_import {
        return Ok(None);
    }

    let Some(module) = query.module else {
        let start = if query.flat {
            paths::normalize(query.path)
        } else {
            paths::join(query.path, &dasherize(query.name))
        };
        return find_module(tree, &start).map(Some);
    };

    let module_path = paths::join(query.path, module);
    let base = paths::basename(&module_path);
    let candidates = [
        module_path.clone(),
        format!("{module_path}.ts"),
        format!("{module_path}{MODULE_SUFFIX}"),
        paths::join(&module_path, &format!("{base}{MODULE_SUFFIX}")),
    ];

    candidates
        .into_iter()
        .find(|candidate| tree.exists(candidate))
        .map(Some)
        .ok_or(ModuleError::SpecifiedMissing {
            module: module_path,
        })
}

/// Walk up from `dir` to the first directory holding exactly one
/// non-routing `*.module.ts` file.
pub fn find_module(tree: &StagedTree, dir: &str) -> Result<String, ModuleError> {
    let start = paths::normalize(dir);
    let mut current = start.clone();

    loop {
        let candidates: Vec<String> = tree
            .list_files(&current)
            .into_iter()
            .filter(|file| file.ends_with(MODULE_SUFFIX) && !file.ends_with(ROUTING_MODULE_SUFFIX))
            .collect();

        match candidates.as_slice() {
            [only] => {
                let found = paths::join(&current, only);
                tracing::debug!(module = %found, from = %start, "found module");
                return Ok(found);
            }
            [] => {}
            _ => {
                return Err(ModuleError::Ambiguous {
                    dir: current,
                    candidates,
                })
            }
        }

        if current.is_empty() {
            return Err(ModuleError::NotFound { dir: start });
        }
        current = paths::dirname(&current);
    }
}
