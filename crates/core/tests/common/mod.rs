#![allow(dead_code)]

use gnodriver_core::GnoRoot;
use gnodriver_plugin::LanguageCaps;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub fn caps() -> LanguageCaps {
    gnodriver_gno::gno_caps().expect("Failed to create Gno caps")
}

/// Temporary source tree with helpers to lay out packages.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn root(&self) -> PathBuf {
        gnodriver_core::util::clean_path(self.dir.path())
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.path(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Create `rel` with a manifest for `module` and the given files.
    pub fn package<S: AsRef<str>>(&self, rel: &str, module: &str, files: &[(&str, S)]) -> PathBuf {
        self.write(&format!("{rel}/gno.mod"), &format!("module {module}\n"));
        for (name, content) in files {
            self.write(&format!("{rel}/{name}"), content.as_ref());
        }
        self.path(rel)
    }

    pub fn gno_root(&self, rel: &str) -> Option<GnoRoot> {
        GnoRoot::new(self.path(rel))
    }

    /// `<root>/<rel>/...`, or `<root>/...` for an empty `rel`.
    pub fn recursive(&self, rel: &str) -> String {
        if rel.is_empty() {
            format!("{}/...", self.root().display())
        } else {
            format!("{}/...", self.path(rel).display())
        }
    }

    pub fn file_pattern(&self, rel: &str) -> String {
        format!("file={}", self.path(rel).display())
    }
}

/// Source of a file declaring `name` and importing `imports`.
pub fn source(name: &str, imports: &[&str]) -> String {
    let mut src = format!("package {name}\n");
    if !imports.is_empty() {
        src.push_str("\nimport (\n");
        for import in imports {
            src.push_str(&format!("\t\"{import}\"\n"));
        }
        src.push_str(")\n");
    }
    src.push_str("\nfunc Hello() string { return \"hello\" }\n");
    src
}

pub fn id_of(dir: &Path) -> String {
    dir.display().to_string()
}
