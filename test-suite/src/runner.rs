use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::case::Case;
use crate::{TestFailure, TestResults};

pub struct TestRunner {
    cases_dir: PathBuf,
}

impl TestRunner {
    pub fn new(cases_dir: impl Into<PathBuf>) -> Self {
        Self {
            cases_dir: cases_dir.into(),
        }
    }

    /// Discover and run all test cases
    pub fn run_all(&self) -> Result<TestResults> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .context("Failed to start the async runtime")?;
        let mut results = TestResults::new();

        for test_file in self.discover_test_files()? {
            match Case::load(&test_file) {
                Ok(case) => runtime.block_on(self.run_case(&case, &mut results)),
                Err(e) => results.add_failure(TestFailure::new(
                    test_file.display().to_string(),
                    format!("{e:#}"),
                )),
            }
        }

        Ok(results)
    }

    /// Discover all .json case files
    fn discover_test_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        self.walk_directory(&self.cases_dir, &mut files)?;
        files.sort();
        Ok(files)
    }

    fn walk_directory(&self, dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
        if !dir.exists() {
            return Ok(());
        }

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.is_dir() {
                self.walk_directory(&path, files)?;
            } else if path.extension().and_then(|s| s.to_str()) == Some("json") {
                files.push(path);
            }
        }

        Ok(())
    }

    /// Run every scenario of a case against its own engine.
    async fn run_case(&self, case: &Case, results: &mut TestResults) {
        let engine = case.engine();
        let scenarios = case.scenarios();
        if scenarios.is_empty() {
            results.add_failure(TestFailure::new(case.name(), "Case has no expectations"));
            return;
        }
        for scenario in &scenarios {
            let name = format!("{} ({})", case.name(), scenario.name());
            match scenario.run(&engine).await {
                Ok(()) => results.add_pass(),
                Err(e) => results.add_failure(TestFailure::new(name, e.to_string())),
            }
        }
    }
}
