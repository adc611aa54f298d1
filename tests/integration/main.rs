//! Integration tests for module-bom

/// Shared fixtures: a buildpack directory whose catalog points at a local
/// tarball holding a fake `cyclonedx-bom`, and an application directory.
#[cfg(unix)]
mod fixtures {
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use sha2::{Digest, Sha256};
    use std::path::{Path, PathBuf};

    pub const REPORT: &str = r#"{"components":[{"name":"leftpad","version":"1.0","purl":"pkg:npm/leftpad@1.0","licenses":[{"license":{"id":"MIT"}}]},{"name":"rightpad","version":"2.0","purl":"pkg:npm/rightpad@2.0","licenses":[]}]}"#;

    pub struct Project {
        pub buildpack: PathBuf,
        pub layers: PathBuf,
        pub platform: PathBuf,
        pub app: PathBuf,
        pub sha256: String,
    }

    /// Lay out buildpack, layers, platform and app directories under `root`
    pub fn project(root: &Path) -> Project {
        let buildpack = root.join("buildpack");
        std::fs::create_dir_all(&buildpack).unwrap();

        let tool = format!(
            "#!/bin/sh\n[ \"$1\" = \"-o\" ] || exit 2\necho scanning node_modules\ncat > \"$2\" <<'JSON'\n{}\nJSON\n",
            REPORT
        );
        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
        let mut header = tar::Header::new_gnu();
        header.set_size(tool.len() as u64);
        header.set_mode(0o755);
        builder
            .append_data(&mut header, "bin/cyclonedx-bom", tool.as_bytes())
            .unwrap();
        let bytes = builder.into_inner().unwrap().finish().unwrap();

        std::fs::write(buildpack.join("cyclonedx.tgz"), &bytes).unwrap();
        let sha256 = hex::encode(Sha256::digest(&bytes));

        std::fs::write(
            buildpack.join("buildpack.toml"),
            format!(
                r#"
[buildpack]
id = "example/node-module-bom"
name = "Node Module BOM"
version = "0.0.1"

[[metadata.dependencies]]
id = "cyclonedx-node-module"
name = "CycloneDX Node.js Module"
version = "3.0.0"
sha256 = "{}"
uri = "file://cyclonedx.tgz"
stacks = ["some-stack"]
"#,
                sha256
            ),
        )
        .unwrap();

        let app = root.join("app");
        std::fs::create_dir_all(&app).unwrap();
        std::fs::write(app.join("package.json"), "{}").unwrap();

        let layers = root.join("layers");
        let platform = root.join("platform");
        std::fs::create_dir_all(&layers).unwrap();
        std::fs::create_dir_all(&platform).unwrap();

        Project {
            buildpack,
            layers,
            platform,
            app,
            sha256,
        }
    }
}

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    fn module_bom() -> Command {
        let mut cmd = cargo_bin_cmd!("module-bom");
        cmd.env_remove("MODULE_BOM_CONFIG");
        cmd
    }

    #[test]
    fn help_displays() {
        module_bom()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("bill of materials"));
    }

    #[test]
    fn version_displays() {
        module_bom()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("module-bom"));
    }

    #[test]
    fn detect_passes_with_package_json() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("package.json"), "{}").unwrap();

        module_bom()
            .args(["detect", "--working-dir"])
            .arg(dir.path())
            .assert()
            .success();
    }

    #[test]
    fn detect_fails_without_package_json() {
        let dir = TempDir::new().unwrap();

        module_bom()
            .args(["detect", "--working-dir"])
            .arg(dir.path())
            .assert()
            .code(100);
    }

    #[test]
    fn build_without_catalog_fails() {
        let dir = TempDir::new().unwrap();

        module_bom()
            .arg("build")
            .arg("--layers")
            .arg(dir.path().join("layers"))
            .arg("--buildpack-dir")
            .arg(dir.path())
            .args(["--stack", "some-stack"])
            .arg("--working-dir")
            .arg(dir.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to resolve dependency"))
            .stderr(predicate::str::contains("buildpack.toml"));
    }

    #[test]
    fn build_with_invalid_config_fails() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("module-bom.toml");
        std::fs::write(&config, "[tool\n").unwrap();

        module_bom()
            .arg("--config")
            .arg(&config)
            .arg("build")
            .arg("--layers")
            .arg(dir.path())
            .arg("--buildpack-dir")
            .arg(dir.path())
            .args(["--stack", "some-stack"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }

    #[cfg(unix)]
    #[test]
    fn build_records_boms_and_reuses_layer() {
        let dir = TempDir::new().unwrap();
        let project = super::fixtures::project(dir.path());

        let run = || {
            module_bom()
                .arg("build")
                .arg("--layers")
                .arg(&project.layers)
                .arg("--platform")
                .arg(&project.platform)
                .arg("--buildpack-dir")
                .arg(&project.buildpack)
                .args(["--stack", "some-stack"])
                .arg("--working-dir")
                .arg(&project.app)
                .assert()
                .success()
        };

        run().stdout(predicate::str::contains("Installing CycloneDX Node.js Module 3.0.0"));

        let layer_toml_path = project.layers.join("cyclonedx-node-module.toml");
        let layer_toml = std::fs::read_to_string(&layer_toml_path).unwrap();
        assert!(layer_toml.contains(&format!("dependency-sha = \"{}\"", project.sha256)));
        assert!(layer_toml.contains("cache = true"));
        assert!(project
            .layers
            .join("cyclonedx-node-module")
            .join("bin")
            .join("cyclonedx-bom")
            .exists());

        let launch: toml::Table =
            toml::from_str(&std::fs::read_to_string(project.layers.join("launch.toml")).unwrap())
                .unwrap();
        let launch_names: Vec<_> = launch["bom"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(launch_names, vec!["leftpad", "rightpad"]);

        let build: toml::Table =
            toml::from_str(&std::fs::read_to_string(project.layers.join("build.toml")).unwrap())
                .unwrap();
        let build_names: Vec<_> = build["bom"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            build_names,
            vec!["cyclonedx-node-module", "leftpad", "rightpad"]
        );

        assert!(!project.app.join("bom.json").exists());

        run().stdout(predicate::str::contains("Reusing cached layer"));
        assert_eq!(std::fs::read_to_string(&layer_toml_path).unwrap(), layer_toml);
    }
}

#[cfg(unix)]
mod build_tests {
    use module_bom::bom::ModuleBom;
    use module_bom::build::{Build, BuildContext};
    use module_bom::clock::SystemClock;
    use module_bom::config::ToolConfig;
    use module_bom::dependency::{BuildpackToml, DependencyService};
    use module_bom::layer::Layers;
    use module_bom::process::ProcessExecutable;
    use module_bom::BomError;
    use std::sync::Arc;
    use tempfile::TempDir;

    async fn context(project: &super::fixtures::Project, stack: &str) -> BuildContext {
        let catalog = BuildpackToml::load(&project.buildpack.join("buildpack.toml"))
            .await
            .unwrap();
        BuildContext {
            buildpack: catalog.buildpack,
            cnb_path: project.buildpack.clone(),
            platform_path: project.platform.clone(),
            layers: Layers::new(&project.layers),
            stack: stack.to_string(),
            working_dir: project.app.clone(),
        }
    }

    fn build() -> Build {
        Build::new(
            Arc::new(DependencyService::new()),
            Arc::new(ModuleBom::new(
                Arc::new(ProcessExecutable::new("cyclonedx-bom")),
                "bom.json",
            )),
            Arc::new(SystemClock),
            ToolConfig::default(),
        )
    }

    #[tokio::test]
    async fn build_does_not_touch_process_path() {
        let dir = TempDir::new().unwrap();
        let project = super::fixtures::project(dir.path());
        let before = std::env::var_os("PATH");

        let result = build().run(&context(&project, "some-stack").await).await.unwrap();

        assert_eq!(std::env::var_os("PATH"), before);
        assert_eq!(result.launch_bom.len(), 2);
        assert_eq!(result.launch_bom[0].licenses(), vec!["MIT"]);
        assert!(result.launch_bom[1].licenses().is_empty());
        assert_eq!(result.build_bom[0].name, "cyclonedx-node-module");
        assert_eq!(&result.build_bom[1..], result.launch_bom.as_slice());
    }

    #[tokio::test]
    async fn unsupported_stack_fails_resolution() {
        let dir = TempDir::new().unwrap();
        let project = super::fixtures::project(dir.path());

        let err = build()
            .run(&context(&project, "other-stack").await)
            .await
            .unwrap_err();

        assert!(matches!(err, BomError::Resolution { .. }));
        assert!(!project.layers.join("cyclonedx-node-module").exists());
    }
}
