use super::{read, snapshot, workspace_with_routing, write};
use route_patcher::config::{load_settings, load_workspace, PatcherConfig};
use route_patcher::naming::ValidationError;
use route_patcher::rule::{generate, GenerateError, GenerateOptions, GenerationReport};
use route_patcher::tree::{StagedTree, TreeError};
use route_patcher::ts::{AnchorMiss, TreeSitterError};
use route_patcher::WorkspaceGuard;
use std::path::Path;

const EMPTY_ROUTING: &str = r#"import { NgModule } from '@angular/core';
import { RouterModule } from '@angular/router';

@NgModule({
  imports: [RouterModule.forChild([])],
  exports: [RouterModule]
})
export class AppRoutingModule { }
"#;

fn options(name: &str) -> GenerateOptions {
    GenerateOptions {
        project: Some("shop".to_string()),
        ..GenerateOptions::new(name, &PatcherConfig::default())
    }
}

/// Generate and flush, the way the CLI does.
fn run(root: &Path, options: &GenerateOptions) -> Result<GenerationReport, GenerateError> {
    let settings = load_settings(root).unwrap();
    let workspace = load_workspace(root).unwrap();

    let mut tree = StagedTree::new(root);
    let report = generate(&mut tree, &workspace, &settings, options)?;
    tree.flush(&WorkspaceGuard::new(root).unwrap()).unwrap();
    Ok(report)
}

#[test]
fn empty_route_array_end_to_end() {
    let dir = workspace_with_routing(EMPTY_ROUTING);

    let report = run(dir.path(), &options("foo")).unwrap();

    assert_eq!(report.selector, "app-foo");
    assert_eq!(
        read(dir.path(), "src/app/app-routing.module.ts"),
        r#"import { NgModule } from '@angular/core';
import { RouterModule } from '@angular/router';
import { FooModule } from './foo/foo.module';

@NgModule({
  imports: [RouterModule.forChild([{ path: 'foo', loadChildren: './foo/foo.module#FooModule' }])],
  exports: [RouterModule]
})
export class AppRoutingModule { }
"#
    );

    for file in [
        "foo.module.ts",
        "foo-routing.module.ts",
        "foo.component.ts",
        "foo.component.html",
        "foo.component.css",
        "foo.component.spec.ts",
    ] {
        assert!(
            dir.path().join("src/app/foo").join(file).is_file(),
            "missing {file}"
        );
    }
    assert!(read(dir.path(), "src/app/foo/foo.component.ts").contains("selector: 'app-foo'"));
}

#[test]
fn second_feature_is_comma_separated() {
    let dir = workspace_with_routing(EMPTY_ROUTING);

    run(dir.path(), &options("foo")).unwrap();
    run(dir.path(), &options("bar")).unwrap();

    let routing = read(dir.path(), "src/app/app-routing.module.ts");
    assert!(routing.contains(
        "forChild([{ path: 'foo', loadChildren: './foo/foo.module#FooModule' }, { path: 'bar', loadChildren: './bar/bar.module#BarModule' }])"
    ));
    assert!(routing.contains(
        "import { FooModule } from './foo/foo.module';\nimport { BarModule } from './bar/bar.module';\n"
    ));
}

#[test]
fn existing_import_is_reused() {
    let routing = EMPTY_ROUTING.replace(
        "import { RouterModule } from '@angular/router';\n",
        "import { RouterModule } from '@angular/router';\nimport { FooModule } from './foo/foo.module';\n",
    );
    let dir = workspace_with_routing(&routing);

    let report = run(dir.path(), &options("foo")).unwrap();

    let patched = read(dir.path(), "src/app/app-routing.module.ts");
    assert_eq!(patched.matches("import { FooModule }").count(), 1);
    assert_eq!(report.route.unwrap().insertions.len(), 1);
}

#[test]
fn nested_name_gets_relative_specifier() {
    let dir = workspace_with_routing(EMPTY_ROUTING);

    let report = run(dir.path(), &options("admin/userList")).unwrap();

    assert_eq!(report.name, "userList");
    assert_eq!(report.selector, "app-user-list");
    let routing = read(dir.path(), "src/app/app-routing.module.ts");
    assert!(routing.contains("import { UserListModule } from './admin/user-list/user-list.module';"));
    assert!(routing.contains(
        "{ path: 'user-list', loadChildren: './admin/user-list/user-list.module#UserListModule' }"
    ));
    assert!(dir
        .path()
        .join("src/app/admin/user-list/user-list.module.ts")
        .is_file());
}

#[test]
fn feature_module_routing_with_trailing_comma() {
    let dir = workspace_with_routing(EMPTY_ROUTING);
    write(
        dir.path(),
        "src/app/admin/admin.module.ts",
        "export class AdminModule { }\n",
    );
    write(
        dir.path(),
        "src/app/admin/admin-routing.module.ts",
        r#"import { NgModule } from '@angular/core';
import { Routes, RouterModule } from '@angular/router';
import { AdminComponent } from './admin.component';

const routes: Routes = [
  { path: '', component: AdminComponent },
];

@NgModule({
  imports: [RouterModule.forChild(routes)],
  exports: [RouterModule]
})
export class AdminRoutingModule { }
"#,
    );

    let mut opts = options("reports");
    opts.path = Some("src/app/admin".to_string());
    let report = run(dir.path(), &opts).unwrap();

    assert_eq!(
        report.route.unwrap().file,
        "src/app/admin/admin-routing.module.ts"
    );
    let routing = read(dir.path(), "src/app/admin/admin-routing.module.ts");
    assert!(routing.contains(
        "  { path: '', component: AdminComponent },\n { path: 'reports', loadChildren: './reports/reports.module#ReportsModule' }];"
    ));
    assert!(routing.contains(
        "import { AdminComponent } from './admin.component';\nimport { ReportsModule } from './reports/reports.module';\n"
    ));
    assert_eq!(read(dir.path(), "src/app/app-routing.module.ts"), EMPTY_ROUTING);
}

#[test]
fn flat_layout_imports_sibling() {
    let dir = workspace_with_routing(EMPTY_ROUTING);
    let mut opts = options("foo");
    opts.flat = true;

    run(dir.path(), &opts).unwrap();

    let routing = read(dir.path(), "src/app/app-routing.module.ts");
    assert!(routing.contains("import { FooModule } from './foo.module';"));
    assert!(routing.contains("loadChildren: './foo.module#FooModule'"));
    assert!(dir.path().join("src/app/foo.module.ts").is_file());
}

#[test]
fn configured_registration_method() {
    let dir = workspace_with_routing(
        "import { withRoutes } from './with-routes';\n\nRouterModule.forRoot([]);\nexport const routes = withRoutes([]);\n",
    );
    write(
        dir.path(),
        "route-patcher.toml",
        "[registration]\nmethods = [\"withRoutes\"]\n",
    );

    run(dir.path(), &options("foo")).unwrap();

    let routing = read(dir.path(), "src/app/app-routing.module.ts");
    assert!(routing.contains("RouterModule.forRoot([]);"));
    assert!(routing.contains(
        "withRoutes([{ path: 'foo', loadChildren: './foo/foo.module#FooModule' }])"
    ));
}

#[test]
fn missing_anchor_writes_nothing() {
    let dir = workspace_with_routing("export const routes = [];\n");
    let before = snapshot(dir.path());

    let error = run(dir.path(), &options("foo")).unwrap_err();

    match error {
        GenerateError::TreeSitter(TreeSitterError::AnchorNotFound {
            path,
            methods,
            miss,
            ..
        }) => {
            assert!(path.ends_with("app-routing.module.ts"));
            assert_eq!(methods, vec!["forChild".to_string(), "forRoot".to_string()]);
            assert_eq!(miss, AnchorMiss::NoRegistrationCall);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(snapshot(dir.path()), before);
}

#[test]
fn malformed_routing_module_writes_nothing() {
    let dir = workspace_with_routing("RouterModule.forChild([);\n");
    let before = snapshot(dir.path());

    let error = run(dir.path(), &options("foo")).unwrap_err();

    assert!(matches!(
        error,
        GenerateError::TreeSitter(TreeSitterError::SyntaxError { .. })
    ));
    assert_eq!(snapshot(dir.path()), before);
}

#[test]
fn missing_routing_module_writes_nothing() {
    let dir = workspace_with_routing(EMPTY_ROUTING);
    std::fs::remove_file(dir.path().join("src/app/app-routing.module.ts")).unwrap();
    let before = snapshot(dir.path());

    let error = run(dir.path(), &options("foo")).unwrap_err();

    match error {
        GenerateError::Tree(TreeError::FileNotFound(path)) => {
            assert_eq!(path, "src/app/app-routing.module.ts");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(snapshot(dir.path()), before);
}

#[test]
fn invalid_name_writes_nothing() {
    let dir = workspace_with_routing(EMPTY_ROUTING);
    let before = snapshot(dir.path());

    let error = run(dir.path(), &options("1foo")).unwrap_err();

    assert!(matches!(
        error,
        GenerateError::Validation(ValidationError::LeadingDigit { .. })
    ));
    assert_eq!(snapshot(dir.path()), before);
}

#[test]
fn existing_unit_file_leaves_tree_clean() {
    let dir = workspace_with_routing(EMPTY_ROUTING);
    write(dir.path(), "src/app/foo/foo.component.html", "<p>mine</p>\n");
    let before = snapshot(dir.path());
    let settings = load_settings(dir.path()).unwrap();
    let workspace = load_workspace(dir.path()).unwrap();
    let mut tree = StagedTree::new(dir.path());

    let error = generate(&mut tree, &workspace, &settings, &options("foo")).unwrap_err();

    match error {
        GenerateError::Tree(TreeError::AlreadyExists(path)) => {
            assert_eq!(path, "src/app/foo/foo.component.html");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(tree.is_clean());
    tree.flush(&WorkspaceGuard::new(dir.path()).unwrap()).unwrap();
    assert_eq!(snapshot(dir.path()), before);
}

#[test]
fn path_outside_workspace_writes_nothing() {
    let dir = workspace_with_routing(EMPTY_ROUTING);
    let before = snapshot(dir.path());
    let mut opts = options("foo");
    opts.path = Some("../other".to_string());

    let error = run(dir.path(), &opts).unwrap_err();

    assert!(matches!(error, GenerateError::Configuration(_)));
    assert_eq!(snapshot(dir.path()), before);
}

#[test]
fn report_serializes_to_json() {
    let dir = workspace_with_routing(EMPTY_ROUTING);
    let report = run(dir.path(), &options("foo")).unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["selector"], "app-foo");
    assert_eq!(json["route"]["file"], "src/app/app-routing.module.ts");
    assert_eq!(json["route"]["insertions"].as_array().unwrap().len(), 2);
}
