//! Embedded feature-module templates.
//!
//! Each template has a path and a body containing `__token__` placeholders.
//! Rendering filters out files the request does not want, substitutes the
//! tokens, and relocates the result under the unit's directory.

use crate::naming::{classify, dasherize};
use crate::paths;
use crate::tree::{StagedTree, TreeError};

struct Template {
    path: &'static str,
    body: &'static str,
}

const LAZY_ROUTE: &[Template] = &[
    Template {
        path: "__name__.module.ts",
        body: include_str!("../templates/lazy-route/module.ts.tpl"),
    },
    Template {
        path: "__name__-routing.module.ts",
        body: include_str!("../templates/lazy-route/routing.module.ts.tpl"),
    },
    Template {
        path: "__name__.component.ts",
        body: include_str!("../templates/lazy-route/component.ts.tpl"),
    },
    Template {
        path: "__name__.component.html",
        body: include_str!("../templates/lazy-route/component.html.tpl"),
    },
    Template {
        path: "__name__.component.__style__",
        body: include_str!("../templates/lazy-route/component.style.tpl"),
    },
    Template {
        path: "__name__.component.spec.ts",
        body: include_str!("../templates/lazy-route/component.spec.ts.tpl"),
    },
];

const INLINE_TEMPLATE: &str = "  template: `\n    <p>\n      __name__ works!\n    </p>\n  `,";
const TEMPLATE_URL: &str = "  templateUrl: './__name__.component.html',";
const INLINE_STYLES: &str = "  styles: []";
const STYLE_URLS: &str = "  styleUrls: ['./__name__.component.__style__']";

/// Everything the templates are parameterized over.
#[derive(Debug, Clone)]
pub struct TemplateContext {
    pub name: String,
    pub selector: String,
    pub style: String,
    pub spec: bool,
    pub flat: bool,
    pub inline_style: bool,
    pub inline_template: bool,
}

impl TemplateContext {
    fn keeps(&self, template_path: &str) -> bool {
        if !self.spec && template_path.ends_with(".spec.ts") {
            return false;
        }
        if self.inline_style && template_path.ends_with(".__style__") {
            return false;
        }
        if self.inline_template && template_path.ends_with(".html") {
            return false;
        }
        true
    }

    /// Substitutions in application order; the declaration tokens expand
    /// to text that still contains name tokens, so they go first.
    fn substitutions(&self) -> Vec<(&'static str, String)> {
        let template_decl = if self.inline_template {
            INLINE_TEMPLATE
        } else {
            TEMPLATE_URL
        };
        let style_decl = if self.inline_style {
            INLINE_STYLES
        } else {
            STYLE_URLS
        };

        vec![
            ("__templateDecl__", template_decl.to_string()),
            ("__styleDecl__", style_decl.to_string()),
            ("__selector__", self.selector.clone()),
            ("__style__", self.style.clone()),
            ("__Name__", classify(&self.name)),
            ("__name__", dasherize(&self.name)),
        ]
    }
}

fn substitute(text: &str, substitutions: &[(&str, String)]) -> String {
    substitutions
        .iter()
        .fold(text.to_string(), |acc, (token, value)| acc.replace(token, value))
}

/// A rendered file, relative to the directory it is moved into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub path: String,
    pub content: String,
}

/// Render the lazy-route templates for `context`.
pub fn render(context: &TemplateContext) -> Vec<RenderedFile> {
    let substitutions = context.substitutions();
    let unit_dir = if context.flat {
        String::new()
    } else {
        dasherize(&context.name)
    };

    LAZY_ROUTE
        .iter()
        .filter(|template| context.keeps(template.path))
        .map(|template| RenderedFile {
            path: paths::join(&unit_dir, &substitute(template.path, &substitutions)),
            content: substitute(template.body, &substitutions),
        })
        .collect()
}

/// Render and stage the templates under `base_path`, returning the
/// created paths. Fails on the first file that already exists.
pub fn merge_into(
    tree: &mut StagedTree,
    base_path: &str,
    context: &TemplateContext,
) -> Result<Vec<String>, TreeError> {
    let mut created = Vec::new();
    for file in render(context) {
        let path = paths::join(base_path, &file.path);
        tree.create(&path, file.content)?;
        created.push(path);
    }
    Ok(created)
}
