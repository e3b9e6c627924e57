//! Unit tests for the orchestrator
//!
//! Image requests are served by a local mock server; the download root is a
//! temporary directory per test.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use tempfile::TempDir;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::app::client::ClientConfig;
use crate::app::naming::{KeywordClassifier, NoClassifier};
use crate::errors::DownloadError;

use super::*;

const IDENTIFIER: &str = "355857";
const TITLE: &str = "Metrikų knyga";
const FOLDER: &str = "355857_Metrikų knyga 1850";

/// Create test orchestrator configuration
///
/// Short retry delay and a small retry budget keep failure tests fast.
fn create_test_config(root: &Path) -> OrchestratorConfig {
    OrchestratorConfig::default()
        .with_download_root(root)
        .with_max_concurrent_downloads(2)
        .with_max_retry_count(2)
        .with_retry_delay(Duration::from_millis(5))
}

fn create_orchestrator(server: &MockServer, config: OrchestratorConfig) -> Orchestrator {
    let client_config = ClientConfig::default().with_base_url(&server.uri());
    let client = ArchiveClient::new(&client_config).unwrap();
    Orchestrator::new(config, &client, Box::new(NoClassifier)).unwrap()
}

fn part(name: &str) -> Part {
    Part {
        name: name.to_string(),
        resource_uri: format!("res-{}", name),
    }
}

fn image_path(name: &str) -> String {
    format!("/iiif/2/res-{}/full/max/0/default.jpg", name)
}

async fn mount_image(server: &MockServer, name: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(image_path(name)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

async fn run(orchestrator: &Orchestrator, parts: &[Part]) -> DownloadResult<RunOutcome> {
    orchestrator
        .run_parts(IDENTIFIER, TITLE, Some("1850"), None, parts)
        .await
}

fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Two parts succeed: the final folder holds both images and no staging folder remains
#[tokio::test]
async fn test_successful_run_promotes_folder() {
    let server = MockServer::start().await;
    mount_image(&server, "001", b"first").await;
    mount_image(&server, "002", b"second").await;

    let root = TempDir::new().unwrap();
    let orchestrator = create_orchestrator(&server, create_test_config(root.path()));

    let outcome = run(&orchestrator, &[part("001"), part("002")]).await.unwrap();

    let final_dir = root.path().join(FOLDER);
    match &outcome {
        RunOutcome::Completed {
            folder,
            files,
            stats,
        } => {
            assert_eq!(folder, &final_dir);
            assert_eq!(*files, 2);
            assert_eq!(stats.downloaded, 2);
            assert_eq!(stats.failed, 0);
        }
        other => panic!("expected completion, got {:?}", other),
    }
    assert!(outcome.is_success());
    assert_eq!(dir_entries(&final_dir), vec!["001.jpg", "002.jpg"]);
    assert_eq!(std::fs::read(final_dir.join("002.jpg")).unwrap(), b"second");
    assert_eq!(dir_entries(root.path()), vec![FOLDER]);
}

/// One of three parts fails every attempt: staging keeps two files, no final folder
#[tokio::test]
async fn test_partial_failure_keeps_staging() {
    let server = MockServer::start().await;
    mount_image(&server, "001", b"a").await;
    mount_image(&server, "003", b"c").await;
    Mock::given(method("GET"))
        .and(path(image_path("002")))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let root = TempDir::new().unwrap();
    let orchestrator = create_orchestrator(&server, create_test_config(root.path()));

    let outcome = run(&orchestrator, &[part("001"), part("002"), part("003")])
        .await
        .unwrap();

    let staging_dir = root.path().join(format!("{}~tmp", FOLDER));
    match &outcome {
        RunOutcome::PartialFailure {
            staging,
            missing,
            stats,
        } => {
            assert_eq!(staging, &staging_dir);
            assert_eq!(missing, &vec!["002".to_string()]);
            assert_eq!(stats.downloaded, 2);
            assert_eq!(stats.failed, 1);
        }
        other => panic!("expected partial failure, got {:?}", other),
    }
    assert!(!outcome.is_success());
    assert!(!root.path().join(FOLDER).exists());
    assert_eq!(dir_entries(&staging_dir), vec!["001.jpg", "003.jpg"]);
}

/// An existing final folder short-circuits the run with no image requests
#[tokio::test]
async fn test_existing_final_folder_is_skipped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex("^/iiif/2/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let root = TempDir::new().unwrap();
    std::fs::create_dir_all(root.path().join(FOLDER)).unwrap();
    let orchestrator = create_orchestrator(&server, create_test_config(root.path()));

    let outcome = run(&orchestrator, &[part("001")]).await.unwrap();

    assert_eq!(
        outcome,
        RunOutcome::AlreadyExists {
            folder: root.path().join(FOLDER)
        }
    );
    assert_eq!(dir_entries(root.path()), vec![FOLDER]);
}

/// No parts means no folders at all
#[tokio::test]
async fn test_empty_parts_creates_nothing() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();
    let orchestrator = create_orchestrator(&server, create_test_config(root.path()));

    let outcome = run(&orchestrator, &[]).await.unwrap();

    assert_eq!(outcome, RunOutcome::NoParts);
    assert!(outcome.is_success());
    assert!(dir_entries(root.path()).is_empty());
}

/// Simultaneous downloads never exceed the configured cap
#[tokio::test]
async fn test_concurrency_cap_is_respected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex("^/iiif/2/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"img".to_vec())
                .set_delay(Duration::from_millis(50)),
        )
        .expect(6)
        .mount(&server)
        .await;

    let root = TempDir::new().unwrap();
    let orchestrator = create_orchestrator(&server, create_test_config(root.path()));
    let parts: Vec<Part> = (1..=6).map(|i| part(&format!("{:03}", i))).collect();

    let outcome = run(&orchestrator, &parts).await.unwrap();

    let stats = outcome.stats().unwrap();
    assert!(stats.peak_in_flight <= 2, "peak was {}", stats.peak_in_flight);
    assert!(stats.peak_in_flight >= 1);
    assert_eq!(stats.downloaded, 6);
}

/// A staging folder left by an earlier run is reused and completed
#[tokio::test]
async fn test_leftover_staging_folder_is_reused() {
    let server = MockServer::start().await;
    mount_image(&server, "001", b"fresh").await;
    mount_image(&server, "002", b"fresh").await;

    let root = TempDir::new().unwrap();
    let staging_dir = root.path().join(format!("{}~tmp", FOLDER));
    std::fs::create_dir_all(&staging_dir).unwrap();
    std::fs::write(staging_dir.join("001.jpg"), b"old").unwrap();
    std::fs::write(staging_dir.join("002.jpg.tmp"), b"half").unwrap();

    let orchestrator = create_orchestrator(&server, create_test_config(root.path()));
    let outcome = run(&orchestrator, &[part("001"), part("002")]).await.unwrap();

    assert!(matches!(outcome, RunOutcome::Completed { files: 2, .. }));
    let final_dir = root.path().join(FOLDER);
    assert_eq!(dir_entries(&final_dir), vec!["001.jpg", "002.jpg"]);
    assert_eq!(std::fs::read(final_dir.join("001.jpg")).unwrap(), b"fresh");
    assert!(!staging_dir.exists());
}

/// Observer that records every event
#[derive(Default)]
struct RecordingObserver {
    events: Mutex<Vec<String>>,
    // Creates this folder when the run finishes, racing the promotion
    create_on_finish: Option<PathBuf>,
}

impl ProgressObserver for RecordingObserver {
    fn on_start(&self, identifier: &str, total: usize) {
        self.events
            .lock()
            .unwrap()
            .push(format!("start {} {}", identifier, total));
    }

    fn on_file_completed(&self, name: &str, _completed: usize) {
        self.events.lock().unwrap().push(format!("done {}", name));
    }

    fn on_file_failed(&self, name: &str) {
        self.events.lock().unwrap().push(format!("failed {}", name));
    }

    fn on_finish(&self) {
        if let Some(dir) = &self.create_on_finish {
            std::fs::create_dir_all(dir).unwrap();
        }
        self.events.lock().unwrap().push("finish".to_string());
    }
}

#[tokio::test]
async fn test_observer_receives_events() {
    let server = MockServer::start().await;
    mount_image(&server, "001", b"a").await;
    Mock::given(method("GET"))
        .and(path(image_path("002")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let root = TempDir::new().unwrap();
    let observer = Arc::new(RecordingObserver::default());
    let orchestrator = create_orchestrator(&server, create_test_config(root.path()))
        .with_observer(observer.clone());

    run(&orchestrator, &[part("001"), part("002")]).await.unwrap();

    let events = observer.events.lock().unwrap().clone();
    assert_eq!(events.first().unwrap(), "start 355857 2");
    assert_eq!(events.last().unwrap(), "finish");
    assert!(events.contains(&"done 001".to_string()));
    assert!(events.contains(&"failed 002".to_string()));
}

/// A final folder appearing after the join barrier is a fatal conflict
#[tokio::test]
async fn test_final_folder_conflict_is_an_error() {
    let server = MockServer::start().await;
    mount_image(&server, "001", b"a").await;

    let root = TempDir::new().unwrap();
    let observer = Arc::new(RecordingObserver {
        create_on_finish: Some(root.path().join(FOLDER)),
        ..Default::default()
    });
    let orchestrator = create_orchestrator(&server, create_test_config(root.path()))
        .with_observer(observer);

    let err = run(&orchestrator, &[part("001")]).await.unwrap_err();

    assert!(matches!(err, DownloadError::FinalFolderConflict { .. }));
    assert!(root.path().join(format!("{}~tmp", FOLDER)).join("001.jpg").exists());
}

#[tokio::test]
async fn test_classifier_suffix_in_folder_name() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();
    let client_config = ClientConfig::default().with_base_url(&server.uri());
    let client = ArchiveClient::new(&client_config).unwrap();
    let orchestrator = Orchestrator::new(
        create_test_config(root.path()),
        &client,
        Box::new(KeywordClassifier::default()),
    )
    .unwrap();

    let name = orchestrator.folder_name(
        "12",
        "Gimimo metrikų knyga",
        Some("1850-01-01"),
        Some("1860"),
    );
    assert_eq!(name, "12_Gimimo metrikų knyga 1850--1860 g");
}

/// A record dated only by its range notes keeps the notes in the folder name
#[tokio::test]
async fn test_range_notes_name_the_folder() {
    let server = MockServer::start().await;
    mount_image(&server, "001", b"x").await;

    let root = TempDir::new().unwrap();
    let orchestrator = create_orchestrator(&server, create_test_config(root.path()));
    let record = InventoryRecord {
        identifier: "1".to_string(),
        title: "Knyga".to_string(),
        chron_from: None,
        chron_to: None,
        chron_range_notes: Some("1850-1852".to_string()),
        parts: vec![part("001")],
    };

    assert_eq!(orchestrator.record_folder_name(&record), "1_Knyga 1850-1852");

    let outcome = orchestrator.run(&record).await.unwrap();
    assert!(matches!(outcome, RunOutcome::Completed { files: 1, .. }));
    assert!(root.path().join("1_Knyga 1850-1852").join("001.jpg").is_file());
}

/// With the default retry budget a failing part is tried exactly that many times
#[tokio::test]
async fn test_default_retry_budget_is_exhausted() {
    let server = MockServer::start().await;
    mount_image(&server, "001", b"a").await;
    mount_image(&server, "003", b"c").await;
    Mock::given(method("GET"))
        .and(path(image_path("002")))
        .respond_with(ResponseTemplate::new(503))
        .expect(u64::from(crate::constants::MAX_RETRY_COUNT))
        .mount(&server)
        .await;

    let root = TempDir::new().unwrap();
    let config = OrchestratorConfig::default()
        .with_download_root(root.path())
        .with_retry_delay(Duration::from_millis(1));
    assert_eq!(config.max_retry_count, crate::constants::MAX_RETRY_COUNT);
    let orchestrator = create_orchestrator(&server, config);

    let outcome = run(&orchestrator, &[part("001"), part("002"), part("003")])
        .await
        .unwrap();

    match outcome {
        RunOutcome::PartialFailure { missing, stats, .. } => {
            assert_eq!(missing, vec!["002".to_string()]);
            assert_eq!(stats.downloaded, 2);
            assert_eq!(stats.failed, 1);
        }
        other => panic!("expected partial failure, got {:?}", other),
    }
    assert!(!root.path().join(FOLDER).exists());
}

#[test]
fn test_invalid_config_is_rejected() {
    let client = ArchiveClient::new(&ClientConfig::default()).unwrap();
    let config = OrchestratorConfig::default().with_max_concurrent_downloads(0);

    let result = Orchestrator::new(config, &client, Box::new(NoClassifier));
    assert!(matches!(result, Err(DownloadError::ConfigurationError(_))));
}
