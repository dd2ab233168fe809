use route_patcher::plan::{plan, plan_import, ImportBinding, RouteEntry};
use route_patcher::ts::{AnchorLocator, AnchorMiss, RegistrationMethods, SourceDocument, TreeSitterError};
use route_patcher::{apply_insertions, Insertion};

const FILE: &str = "src/app/app-routing.module.ts";

fn locate_and_patch(source: &str) -> String {
    let document = SourceDocument::parse(FILE, source).unwrap();
    let anchor = AnchorLocator::default().locate(&document).unwrap();
    let binding = ImportBinding {
        symbol: "FooModule".to_string(),
        module_path: "src/app/foo/foo.module.ts".to_string(),
        source_file: FILE.to_string(),
    };
    let entry = RouteEntry::new("foo", &binding.specifier(), "FooModule");
    let edits = plan(&document, &anchor, &binding, &entry).unwrap();
    apply_insertions(source, &edits).unwrap()
}

#[test]
fn last_registration_call_wins() {
    let source = "import { RouterModule } from '@angular/router';\n\nexport const root = RouterModule.forRoot([]);\nexport const child = RouterModule.forChild([{ path: 'x' }]);\n";

    let patched = locate_and_patch(source);

    assert!(patched.contains("RouterModule.forRoot([]);"));
    assert!(patched.contains(
        "forChild([{ path: 'x' }, { path: 'foo', loadChildren: './foo/foo.module#FooModule' }])"
    ));
}

#[test]
fn unrelated_text_is_untouched() {
    let source = "// keep me\nimport { RouterModule } from '@angular/router';\n/* and me */\nconst routes = [\n  // comment only\n];\n\nRouterModule.forChild(routes);\n";

    let patched = locate_and_patch(source);

    assert_eq!(
        patched,
        "// keep me\nimport { RouterModule } from '@angular/router';\nimport { FooModule } from './foo/foo.module';\n/* and me */\nconst routes = [\n  // comment only\n{ path: 'foo', loadChildren: './foo/foo.module#FooModule' }];\n\nRouterModule.forChild(routes);\n"
    );
}

#[test]
fn as_const_array_is_unwrapped() {
    let source = "const routes = [{ path: 'a' }] as const;\nRouterModule.forRoot(routes);\n";
    let patched = locate_and_patch(source);
    assert!(patched.contains("[{ path: 'a' }, { path: 'foo'"));
}

#[test]
fn computed_routes_are_not_an_anchor() {
    let source = "const routes = buildRoutes();\nRouterModule.forRoot(routes);\n";
    let document = SourceDocument::parse(FILE, source).unwrap();

    let error = AnchorLocator::default().locate(&document).unwrap_err();

    match error {
        TreeSitterError::AnchorNotFound { miss, .. } => {
            assert_eq!(
                miss,
                AnchorMiss::NotAnArray {
                    kind: "call_expression".to_string()
                }
            );
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unresolved_binding_is_reported() {
    let source = "import { routes } from './routes';\nRouterModule.forRoot(routes);\n";
    let document = SourceDocument::parse(FILE, source).unwrap();

    let error = AnchorLocator::default().locate(&document).unwrap_err();

    assert!(matches!(
        error,
        TreeSitterError::AnchorNotFound {
            miss: AnchorMiss::UnresolvedBinding { ref name },
            ..
        } if name == "routes"
    ));
    assert!(error.to_string().contains("searched for forChild, forRoot"));
}

#[test]
fn misspelled_method_gets_a_hint() {
    let source = "RouterModule.forchild([]);\n";
    let document = SourceDocument::parse(FILE, source).unwrap();

    let error = AnchorLocator::default().locate(&document).unwrap_err();

    assert!(error.to_string().contains("did you mean 'forchild'?"));
}

#[test]
fn custom_method_set_ignores_defaults() {
    let source = "RouterModule.forRoot([]);\nprovide([]);\n";
    let document = SourceDocument::parse(FILE, source).unwrap();
    let locator = AnchorLocator::new(RegistrationMethods::new(["provide"]));

    let anchor = locator.locate(&document).unwrap();

    assert_eq!(document.node_text(anchor.call), "provide([])");
}

#[test]
fn import_planning_is_idempotent() {
    let source = "import { FooModule } from './foo/foo.module';\nRouterModule.forChild([]);\n";
    let document = SourceDocument::parse(FILE, source).unwrap();
    let binding = ImportBinding {
        symbol: "FooModule".to_string(),
        module_path: "src/app/foo/foo.module.ts".to_string(),
        source_file: FILE.to_string(),
    };

    assert_eq!(plan_import(&document, &binding).unwrap(), None);
}

#[test]
fn multiple_insertions_use_original_offsets() {
    let original = "abcdef";
    let edits = [
        Insertion::new(4, "Y"),
        Insertion::new(1, "X"),
        Insertion::new(4, "Z"),
    ];

    assert_eq!(apply_insertions(original, &edits).unwrap(), "aXbcdYZef");
}
