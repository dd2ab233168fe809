//! The subset of `angular.json` the generator reads.

use crate::paths;
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceFile {
    #[serde(default)]
    pub projects: BTreeMap<String, Project>,
    #[serde(default)]
    pub default_project: Option<String>,
}

impl WorkspaceFile {
    pub fn project(&self, name: &str) -> Option<&Project> {
        self.projects.get(name)
    }

    /// The explicit `defaultProject`, or the only project if there is one.
    pub fn default_project_name(&self) -> Option<&str> {
        if let Some(name) = self.default_project.as_deref() {
            return Some(name);
        }
        match self.projects.keys().collect::<Vec<_>>().as_slice() {
            [only] => Some(only.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub root: String,
    #[serde(default)]
    pub source_root: Option<String>,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub project_type: Option<ProjectType>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ProjectType {
    Application,
    Library,
}

impl Project {
    /// Where generated units go when no path is given: `<sourceRoot>/app`
    /// for applications, `<sourceRoot>/lib` for libraries, with
    /// `<root>/src` standing in for a missing source root.
    pub fn default_path(&self) -> String {
        let source_root = match self.source_root.as_deref() {
            Some(source_root) => paths::normalize(source_root),
            None => paths::join(&self.root, "src"),
        };
        let dir = match self.project_type {
            Some(ProjectType::Library) => "lib",
            _ => "app",
        };
        paths::join(&source_root, dir)
    }
}
