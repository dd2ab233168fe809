//! End-to-end generation against on-disk Angular workspaces.

mod anchors;
mod lazy_route;

use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub const ANGULAR_JSON: &str = r#"{
  "version": 1,
  "projects": {
    "shop": {
      "root": "",
      "sourceRoot": "src",
      "projectType": "application",
      "prefix": "app"
    }
  },
  "defaultProject": "shop"
}"#;

pub const APP_MODULE: &str = r#"import { NgModule } from '@angular/core';
import { BrowserModule } from '@angular/platform-browser';

import { AppRoutingModule } from './app-routing.module';
import { AppComponent } from './app.component';

@NgModule({
  declarations: [AppComponent],
  imports: [BrowserModule, AppRoutingModule],
  bootstrap: [AppComponent]
})
export class AppModule { }
"#;

/// A workspace with `src/app/app.module.ts` and the given routing module.
pub fn workspace_with_routing(routing: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "angular.json", ANGULAR_JSON);
    write(dir.path(), "src/app/app.module.ts", APP_MODULE);
    write(dir.path(), "src/app/app-routing.module.ts", routing);
    dir
}

pub fn write(root: &Path, path: &str, content: &str) {
    let full = root.join(path);
    fs::create_dir_all(full.parent().unwrap()).unwrap();
    fs::write(full, content).unwrap();
}

pub fn read(root: &Path, path: &str) -> String {
    fs::read_to_string(root.join(path)).unwrap()
}

/// Every file under `root`, relative and sorted, with its content.
pub fn snapshot(root: &Path) -> Vec<(String, String)> {
    let mut files: Vec<(String, String)> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let relative = entry
                .path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/");
            (relative, fs::read_to_string(entry.path()).unwrap())
        })
        .collect();
    files.sort();
    files
}
