//! Module BOM extraction
//!
//! Runs `cyclonedx-bom -o bom.json` in the application directory, turns the
//! report into BOM entries and removes the report afterwards so it does not
//! end up in the built image.

use crate::bom::report::CycloneDxReport;
use crate::bom::BomEntry;
use crate::error::{BomError, BomResult};
use crate::process::{Executable, Execution, ExecutionEnv};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info};

/// Produces BOM entries for the modules of an application
#[async_trait]
pub trait ModuleBomGenerator: Send + Sync {
    async fn generate(&self, working_dir: &Path, env: &ExecutionEnv) -> BomResult<Vec<BomEntry>>;
}

/// Generator backed by the `cyclonedx-bom` executable
pub struct ModuleBom {
    executable: Arc<dyn Executable>,
    report_file: String,
}

impl ModuleBom {
    pub fn new(executable: Arc<dyn Executable>, report_file: impl Into<String>) -> Self {
        Self {
            executable,
            report_file: report_file.into(),
        }
    }

    fn args(&self) -> Vec<String> {
        vec!["-o".to_string(), self.report_file.clone()]
    }
}

#[async_trait]
impl ModuleBomGenerator for ModuleBom {
    async fn generate(&self, working_dir: &Path, env: &ExecutionEnv) -> BomResult<Vec<BomEntry>> {
        let args = self.args();
        info!("    Running '{} {}'", self.executable.name(), args.join(" "));

        let output = self
            .executable
            .execute(&Execution {
                args,
                dir: working_dir.to_path_buf(),
                env: env.clone(),
            })
            .await?;
        debug!("{} produced {} output lines", self.executable.name(), output.lines.len());

        let report_path = working_dir.join(&self.report_file);
        let bytes = fs::read(&report_path)
            .await
            .map_err(|source| BomError::ReportNotFound {
                path: report_path.clone(),
                source,
            })?;

        let report =
            CycloneDxReport::from_slice(&bytes).map_err(|source| BomError::ReportFormat {
                path: report_path.clone(),
                source,
            })?;
        let entries = report.into_entries();

        fs::remove_file(&report_path)
            .await
            .map_err(|source| BomError::Cleanup {
                path: report_path.clone(),
                source,
            })?;

        debug!("Recorded {} module entries", entries.len());
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::ExecOutput;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Writes a canned report into the working directory, or fails
    struct FakeTool {
        report: Option<&'static str>,
        fail: bool,
        calls: Mutex<Vec<Execution>>,
    }

    impl FakeTool {
        fn writing(report: &'static str) -> Self {
            Self {
                report: Some(report),
                fail: false,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn silent() -> Self {
            Self {
                report: None,
                fail: false,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                report: None,
                fail: true,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Executable for FakeTool {
        async fn execute(&self, execution: &Execution) -> BomResult<ExecOutput> {
            self.calls.lock().unwrap().push(execution.clone());
            if self.fail {
                return Err(BomError::tool_execution("cyclonedx-bom -o bom.json", "exit status: 1"));
            }
            if let Some(report) = self.report {
                std::fs::write(execution.dir.join("bom.json"), report).unwrap();
            }
            Ok(ExecOutput {
                lines: vec!["done".to_string()],
            })
        }

        fn name(&self) -> &str {
            "cyclonedx-bom"
        }
    }

    const LEFTPAD: &str = r#"{"components":[{"name":"leftpad","version":"1.0","purl":"pkg:npm/leftpad@1.0","licenses":[{"license":{"id":"MIT"}}]}]}"#;

    #[tokio::test]
    async fn generates_entries_and_removes_report() {
        let work = TempDir::new().unwrap();
        let tool = Arc::new(FakeTool::writing(LEFTPAD));
        let module_bom = ModuleBom::new(tool.clone(), "bom.json");

        let mut env = ExecutionEnv::default();
        env.append_path("/layers/cyclonedx-node-module/bin");

        let entries = module_bom.generate(work.path(), &env).await.unwrap();

        assert_eq!(
            entries,
            vec![BomEntry::new("leftpad")
                .with("version", "1.0")
                .with("purl", "pkg:npm/leftpad@1.0")
                .with("licenses", vec!["MIT"])]
        );
        assert!(!work.path().join("bom.json").exists());

        let calls = tool.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].args, vec!["-o", "bom.json"]);
        assert_eq!(calls[0].dir, work.path());
        assert_eq!(calls[0].env, env);
    }

    #[tokio::test]
    async fn empty_report_yields_no_entries() {
        let work = TempDir::new().unwrap();
        let module_bom = ModuleBom::new(
            Arc::new(FakeTool::writing(r#"{"components":[]}"#)),
            "bom.json",
        );

        let entries = module_bom
            .generate(work.path(), &ExecutionEnv::default())
            .await
            .unwrap();

        assert!(entries.is_empty());
        assert!(!work.path().join("bom.json").exists());
    }

    #[tokio::test]
    async fn tool_failure_propagates() {
        let work = TempDir::new().unwrap();
        let module_bom = ModuleBom::new(Arc::new(FakeTool::failing()), "bom.json");

        let err = module_bom
            .generate(work.path(), &ExecutionEnv::default())
            .await
            .unwrap_err();

        assert!(matches!(err, BomError::ToolExecution { .. }));
    }

    #[tokio::test]
    async fn missing_report_is_not_found() {
        let work = TempDir::new().unwrap();
        let module_bom = ModuleBom::new(Arc::new(FakeTool::silent()), "bom.json");

        let err = module_bom
            .generate(work.path(), &ExecutionEnv::default())
            .await
            .unwrap_err();

        match err {
            BomError::ReportNotFound { path, .. } => assert_eq!(path, work.path().join("bom.json")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_report_is_format_error() {
        let work = TempDir::new().unwrap();
        let module_bom = ModuleBom::new(Arc::new(FakeTool::writing("%%%")), "bom.json");

        let err = module_bom
            .generate(work.path(), &ExecutionEnv::default())
            .await
            .unwrap_err();

        assert!(matches!(err, BomError::ReportFormat { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn undeletable_report_is_cleanup_error() {
        use std::os::unix::fs::PermissionsExt;

        /// Makes the working directory read-only once the report is written
        struct LockingTool(FakeTool);

        #[async_trait]
        impl Executable for LockingTool {
            async fn execute(&self, execution: &Execution) -> BomResult<ExecOutput> {
                let output = self.0.execute(execution).await?;
                std::fs::set_permissions(&execution.dir, std::fs::Permissions::from_mode(0o555))
                    .unwrap();
                Ok(output)
            }

            fn name(&self) -> &str {
                self.0.name()
            }
        }

        let work = TempDir::new().unwrap();
        let module_bom = ModuleBom::new(
            Arc::new(LockingTool(FakeTool::writing(LEFTPAD))),
            "bom.json",
        );
        let result = module_bom.generate(work.path(), &ExecutionEnv::default()).await;

        // Root ignores directory permissions
        let marker = work.path().join("writable");
        let privileged = std::fs::write(&marker, "").is_ok();
        std::fs::set_permissions(work.path(), std::fs::Permissions::from_mode(0o755)).unwrap();

        if privileged {
            assert!(result.is_ok());
        } else {
            assert!(matches!(result, Err(BomError::Cleanup { .. })));
            assert!(work.path().join("bom.json").exists());
        }
    }
}
