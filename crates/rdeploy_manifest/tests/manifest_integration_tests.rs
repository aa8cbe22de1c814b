//! Integration tests for manifest reading and stack validation.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use mockall::mock;
use rdeploy_manifest::{
    ManifestError, ManifestReader, ManifestResult, RemoteFetcher, TempFiles,
};
use tempfile::tempdir;

mock! {
    pub Fetcher {}

    impl RemoteFetcher for Fetcher {
        fn fetch(&self, url: &str) -> ManifestResult<Option<String>>;
    }
}

fn offline() -> MockFetcher {
    let mut fetcher = MockFetcher::new();
    fetcher.expect_fetch().never();
    fetcher
}

fn write_file(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_single_stack_end_to_end() {
    let temp = tempdir().unwrap();
    write_file(
        temp.path(),
        "web/docker-compose.yml",
        "services:\n  app:\n    image: ${TAG}\n",
    );
    let manifest_path = write_file(
        temp.path(),
        "deploy.yml",
        r#"
rancher-url: https://rancher.example.com
environment: production
stacks:
  - name: web
    compose: ./web
    vars:
      TAG: "1.0"
"#,
    );

    let fetcher = offline();
    let mut temp_files = TempFiles::new();
    let manifest = ManifestReader::new(&fetcher)
        .read(&manifest_path, &mut temp_files)
        .unwrap();

    assert_eq!(manifest.rancher_url, "https://rancher.example.com");
    assert_eq!(manifest.environment, "production");
    assert_eq!(manifest.stacks.len(), 1);

    let web = manifest.stack("web").unwrap();
    assert_eq!(web.services, set(&["app"]));
    assert_eq!(web.vars.get("TAG").map(String::as_str), Some("1.0"));
    assert_eq!(web.compose_file, temp.path().join("web/docker-compose.yml"));
    assert!(web.rancher_compose_file.is_none());
    assert!(temp_files.is_empty());
}

#[test]
fn test_stacks_keep_manifest_order() {
    let temp = tempdir().unwrap();
    for name in ["zeta", "alpha", "mid"] {
        write_file(
            temp.path(),
            &format!("stacks/{}/docker-compose.yml", name),
            &format!("services:\n  {}:\n    image: busybox\n", name),
        );
    }
    write_file(
        temp.path(),
        "stacks/alpha/rancher-compose.yml",
        "services:\n  alpha:\n    scale: 2\n",
    );
    let manifest_path = write_file(
        temp.path(),
        "deploy/prod.yml",
        r#"
rancher-url: https://rancher.example.com
environment: production
stacks:
  - name: zeta
    compose: ../stacks/zeta
  - name: alpha
    compose: ../stacks/alpha
  - name: mid
    compose: ../stacks/mid
"#,
    );

    let fetcher = offline();
    let mut temp_files = TempFiles::new();
    let manifest = ManifestReader::new(&fetcher)
        .read(&manifest_path, &mut temp_files)
        .unwrap();

    let names: Vec<&str> = manifest.stacks.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    assert_eq!(
        manifest.stacks[1].rancher_compose_file,
        Some(temp.path().join("stacks/alpha/rancher-compose.yml"))
    );
    assert!(manifest.stacks[0].rancher_compose_file.is_none());
}

#[test]
fn test_missing_top_level_key_aborts_before_fetch() {
    let temp = tempdir().unwrap();
    for (file, body) in [
        ("no-url.yml", "environment: dev\nstacks:\n  - name: web\n    compose: http://a/web\n"),
        ("no-env.yml", "rancher-url: http://r\nstacks:\n  - name: web\n    compose: http://a/web\n"),
        ("no-stacks.yml", "rancher-url: http://r\nenvironment: dev\n"),
    ] {
        let manifest_path = write_file(temp.path(), file, body);
        let fetcher = offline();
        let mut temp_files = TempFiles::new();

        let err = ManifestReader::new(&fetcher)
            .read(&manifest_path, &mut temp_files)
            .unwrap_err();

        match err {
            ManifestError::InvalidDocument { source_label, message } => {
                assert!(source_label.ends_with(file));
                assert!(message.contains("missing field"), "{}", message);
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}

#[test]
fn test_remote_compose_not_found() {
    let temp = tempdir().unwrap();
    let manifest_path = write_file(
        temp.path(),
        "deploy.yml",
        "rancher-url: http://r\nenvironment: dev\nstacks:\n  - name: web\n    compose: https://artifacts.example.com/web\n",
    );

    let mut fetcher = MockFetcher::new();
    fetcher.expect_fetch().times(1).returning(|url| {
        assert_eq!(url, "https://artifacts.example.com/web/docker-compose.yml");
        Ok(None)
    });

    let mut temp_files = TempFiles::new();
    let err = ManifestReader::new(&fetcher)
        .read(&manifest_path, &mut temp_files)
        .unwrap_err();

    match err {
        ManifestError::ComposeNotFound { stack, location } => {
            assert_eq!(stack, "web");
            assert_eq!(location, "https://artifacts.example.com/web/docker-compose.yml");
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(temp_files.is_empty());
}

#[test]
fn test_remote_compose_stored_until_close() {
    let temp = tempdir().unwrap();
    let manifest_path = write_file(
        temp.path(),
        "deploy.yml",
        r#"
rancher-url: http://r
environment: dev
stacks:
  - name: api
    compose: https://artifacts.example.com/api/
    vars:
      IMAGE: api:2
"#,
    );

    let mut fetcher = MockFetcher::new();
    fetcher
        .expect_fetch()
        .times(2)
        .returning(|url| match url {
            "https://artifacts.example.com/api/docker-compose.yml" => {
                Ok(Some("services:\n  api:\n    image: $IMAGE\n".to_string()))
            }
            "https://artifacts.example.com/api/rancher-compose.yml" => {
                Ok(Some("services:\n  api:\n    scale: 3\n".to_string()))
            }
            other => panic!("unexpected url {}", other),
        });

    let mut temp_files = TempFiles::new();
    let manifest = ManifestReader::new(&fetcher)
        .read(&manifest_path, &mut temp_files)
        .unwrap();

    let api = manifest.stack("api").unwrap();
    assert_eq!(api.services, set(&["api"]));
    assert!(api.compose_file.exists());
    assert!(api.rancher_compose_file.as_ref().unwrap().exists());
    assert_eq!(temp_files.len(), 2);

    let stored = temp_files.paths();
    temp_files.close();
    assert!(stored.iter().all(|p| !p.exists()));
}

#[test]
fn test_missing_variables_reported_for_all_stacks() {
    let temp = tempdir().unwrap();
    write_file(
        temp.path(),
        "web/docker-compose.yml",
        "services:\n  app:\n    image: nginx:${TAG}\n    environment:\n      HOST: $HOST\n",
    );
    write_file(
        temp.path(),
        "cache/docker-compose.yml",
        "services:\n  redis:\n    image: redis\n",
    );
    write_file(
        temp.path(),
        "db/docker-compose.yml",
        "services:\n  db:\n    image: postgres\n    environment:\n      POSTGRES_PASSWORD: ${DB_PASSWORD}\n",
    );
    let manifest_path = write_file(
        temp.path(),
        "deploy.yml",
        r#"
rancher-url: http://r
environment: dev
stacks:
  - name: web
    compose: ./web
    vars:
      HOST: example.com
  - name: cache
    compose: ./cache
  - name: db
    compose: ./db
"#,
    );

    let fetcher = offline();
    let mut temp_files = TempFiles::new();
    let err = ManifestReader::new(&fetcher)
        .read(&manifest_path, &mut temp_files)
        .unwrap_err();

    let ManifestError::MissingVariables(report) = &err else {
        panic!("unexpected error: {}", err);
    };
    assert_eq!(report.count(), 2);
    assert_eq!(report.for_stack("web"), Some(&set(&["TAG"])));
    assert_eq!(report.for_stack("db"), Some(&set(&["DB_PASSWORD"])));
    assert!(report.for_stack("cache").is_none());

    let message = err.to_string();
    assert!(message.contains("web"));
    assert!(message.contains("db"));
}

#[test]
fn test_conditional_variable_required_but_stripped_for_parsing() {
    let temp = tempdir().unwrap();
    write_file(
        temp.path(),
        "web/docker-compose.yml",
        "services:\n  app:\n    image: nginx\n{{- if .Values.WITH_SIDECAR }}\n  sidecar:\n    image: envoy\n{{- end }}\n",
    );
    let without = write_file(
        temp.path(),
        "without.yml",
        "rancher-url: http://r\nenvironment: dev\nstacks:\n  - name: web\n    compose: ./web\n",
    );
    let with = write_file(
        temp.path(),
        "with.yml",
        "rancher-url: http://r\nenvironment: dev\nstacks:\n  - name: web\n    compose: ./web\n    vars:\n      WITH_SIDECAR: \"true\"\n",
    );

    let fetcher = offline();
    let mut temp_files = TempFiles::new();
    let reader = ManifestReader::new(&fetcher);

    let err = reader.read(&without, &mut temp_files).unwrap_err();
    assert!(matches!(err, ManifestError::MissingVariables(_)));

    let manifest = reader.read(&with, &mut temp_files).unwrap();
    assert_eq!(manifest.stacks[0].services, set(&["app", "sidecar"]));
}

#[test]
fn test_local_compose_not_found() {
    let temp = tempdir().unwrap();
    let manifest_path = write_file(
        temp.path(),
        "deploy.yml",
        "rancher-url: http://r\nenvironment: dev\nstacks:\n  - name: web\n    compose: ./missing\n",
    );

    let fetcher = offline();
    let mut temp_files = TempFiles::new();
    let err = ManifestReader::new(&fetcher)
        .read(&manifest_path, &mut temp_files)
        .unwrap_err();

    match err {
        ManifestError::ComposeNotFound { stack, location } => {
            assert_eq!(stack, "web");
            assert!(location.ends_with("missing/docker-compose.yml"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_compose_without_services_is_invalid() {
    let temp = tempdir().unwrap();
    write_file(temp.path(), "web/docker-compose.yml", "version: '2'\nvolumes: {}\n");
    let manifest_path = write_file(
        temp.path(),
        "deploy.yml",
        "rancher-url: http://r\nenvironment: dev\nstacks:\n  - name: web\n    compose: ./web\n",
    );

    let fetcher = offline();
    let mut temp_files = TempFiles::new();
    let err = ManifestReader::new(&fetcher)
        .read(&manifest_path, &mut temp_files)
        .unwrap_err();

    match err {
        ManifestError::InvalidDocument { source_label, message } => {
            assert!(source_label.ends_with("web/docker-compose.yml"));
            assert!(message.contains("services"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_duplicate_stack_names_rejected() {
    let temp = tempdir().unwrap();
    let manifest_path = write_file(
        temp.path(),
        "deploy.yml",
        "rancher-url: http://r\nenvironment: dev\nstacks:\n  - name: web\n    compose: ./a\n  - name: web\n    compose: ./b\n",
    );

    let fetcher = offline();
    let mut temp_files = TempFiles::new();
    let err = ManifestReader::new(&fetcher)
        .read(&manifest_path, &mut temp_files)
        .unwrap_err();

    assert!(matches!(err, ManifestError::DuplicateStack { ref name, .. } if name == "web"));
}

#[test]
fn test_unreadable_manifest() {
    let err = ManifestReader::load("/nonexistent/deploy.yml").unwrap_err();
    assert!(matches!(err, ManifestError::Io { .. }));
}
