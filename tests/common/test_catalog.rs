//! TestCatalog builder for CLI integration testing
//!
//! Collects catalog repositories, writes them as a JSON catalog file inside a
//! temporary directory and runs the compiled binary against it.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde::Serialize;
use tempfile::TempDir;

use semfora_search::{CatalogFile, CatalogRepo, CatalogSymbol, RepoState};

#[derive(Serialize)]
struct Document<'a> {
    index_offline: bool,
    repos: &'a [CatalogRepo],
}

/// Builder for catalog files used by CLI tests
pub struct TestCatalog {
    dir: TempDir,
    repos: Vec<CatalogRepo>,
    index_offline: bool,
}

impl TestCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
            repos: Vec::new(),
            index_offline: false,
        }
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Add a ready repository whose default branch resolves to `c<id>`
    pub fn add_repo(&mut self, id: i32, name: &str) -> &mut Self {
        let mut revisions = BTreeMap::new();
        revisions.insert(String::new(), format!("c{}", id));
        self.repos.push(CatalogRepo {
            id,
            name: name.to_string(),
            indexed: true,
            revisions,
            ..Default::default()
        });
        self
    }

    /// Add a repository in a non-ready state
    pub fn add_repo_in_state(&mut self, id: i32, name: &str, state: RepoState) -> &mut Self {
        self.add_repo(id, name);
        self.last().state = state;
        self
    }

    /// Map `rev` to `commit` on the most recently added repository
    pub fn with_revision(&mut self, rev: &str, commit: &str) -> &mut Self {
        self.last()
            .revisions
            .insert(rev.to_string(), commit.to_string());
        self
    }

    /// Add a Go file declaring one function per name to the most recent repository
    pub fn with_go_file(&mut self, path: &str, functions: &[&str]) -> &mut Self {
        let mut content = String::from("package main\n\n");
        let mut symbols = Vec::new();
        for name in functions {
            content.push_str(&format!("func {}() {{\n}}\n\n", name));
            let line = u32::try_from(content.lines().count()).unwrap() - 2;
            symbols.push(CatalogSymbol {
                name: name.to_string(),
                line,
                kind: "func".into(),
                pattern: format!("/^func {}() {{$/", name),
                ..Default::default()
            });
        }
        self.last().files.push(CatalogFile {
            path: path.to_string(),
            language: "Go".into(),
            content,
            symbols,
        });
        self
    }

    pub fn with_index_offline(&mut self) -> &mut Self {
        self.index_offline = true;
        self
    }

    fn last(&mut self) -> &mut CatalogRepo {
        self.repos.last_mut().expect("add a repository first")
    }

    /// Write the catalog and return its path
    pub fn write(&self) -> PathBuf {
        let path = self.dir.path().join("catalog.json");
        let doc = Document {
            index_offline: self.index_offline,
            repos: &self.repos,
        };
        fs::write(&path, serde_json::to_string_pretty(&doc).unwrap())
            .expect("Failed to write catalog");
        path
    }

    /// Write an arbitrary file next to the catalog
    pub fn add_file(&self, relative_path: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(relative_path);
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Run the semfora-search binary with `args` (the catalog is written first)
    pub fn run_cli(&self, args: &[&str]) -> Output {
        self.write();
        Command::new(env!("CARGO_BIN_EXE_semfora-search"))
            .current_dir(self.dir.path())
            .env("RUST_LOG", "warn")
            .env_remove("SEMFORA_SEARCH_CONFIG")
            .env_remove("SEMFORA_SEARCH_CATALOG")
            .args(args)
            .output()
            .expect("Failed to run CLI")
    }

    /// Run CLI and expect success, return stdout
    pub fn run_cli_success(&self, args: &[&str]) -> String {
        let output = self.run_cli(args);
        assert!(
            output.status.success(),
            "CLI command {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    /// Run CLI and expect failure, return (stdout, stderr, exit code)
    pub fn run_cli_failure(&self, args: &[&str]) -> (String, String, Option<i32>) {
        let output = self.run_cli(args);
        assert!(
            !output.status.success(),
            "CLI command {:?} should have failed",
            args
        );
        (
            String::from_utf8_lossy(&output.stdout).to_string(),
            String::from_utf8_lossy(&output.stderr).to_string(),
            output.status.code(),
        )
    }
}
