//! Integration tests for the fetch-and-download pipeline.
//!
//! These drive DownloadEngine end-to-end against a mock HTTP server and a
//! temporary storage directory: scrape, download, sidecar persistence,
//! progress ordering, and the failure-tolerance contracts.

use std::path::Path;

use lectern_core::{
    DownloadEngine, FetchOutcome, FetchRequest, HttpClient, ItemType, PageFetcher, ProgressEvent,
    build_listing, read_record,
};
use tempfile::TempDir;
use tokio::sync::mpsc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A lecture-listing page with table-row anchors for the given hrefs.
fn lecture_page(hrefs: &[&str]) -> String {
    let rows: String = hrefs
        .iter()
        .map(|href| format!(r#"<tr><td><a href="{href}">{href}</a></td></tr>"#))
        .collect();
    format!("<html><body><table>{rows}</table></body></html>")
}

/// Mounts the listing page at `/lectures.php`.
async fn mount_page(server: &MockServer, hrefs: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/lectures.php"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(lecture_page(hrefs), "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

/// Mounts a PDF body at the given path.
async fn mount_pdf(server: &MockServer, pdf_path: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(pdf_path))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

fn request(server: &MockServer, storage: &Path) -> FetchRequest {
    FetchRequest {
        base_url: server.uri(),
        page_url: format!("{}/lectures.php", server.uri()),
        storage_root: storage.to_path_buf(),
    }
}

fn engine() -> DownloadEngine {
    DownloadEngine::new(PageFetcher::new(), HttpClient::new())
}

/// Runs the engine and collects all progress events.
async fn run_collecting(
    engine: &DownloadEngine,
    req: &FetchRequest,
) -> (FetchOutcome, Vec<ProgressEvent>) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let outcome = engine.run(req, &tx).await;
    drop(tx);
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    (outcome, events)
}

// ==================== Happy Path ====================

#[tokio::test]
async fn test_full_pipeline_downloads_and_records() {
    let server = MockServer::start().await;
    mount_page(&server, &["pdf/L01.pdf", "pdf/L02.pdf"]).await;
    mount_pdf(&server, "/pdf/L01.pdf", b"lecture one").await;
    mount_pdf(&server, "/pdf/L02.pdf", b"lecture two").await;

    let storage = TempDir::new().unwrap();
    let req = request(&server, storage.path());
    let (outcome, events) = run_collecting(&engine(), &req).await;

    assert_eq!(
        outcome,
        FetchOutcome::Complete {
            storage_root: storage.path().to_path_buf(),
            completed: 2,
            failed: 0,
            skipped: 0,
        }
    );
    assert_eq!(events.len(), 2);

    // Artifacts on disk with the filenames derived from the hrefs.
    assert_eq!(
        std::fs::read(storage.path().join("L01.pdf")).unwrap(),
        b"lecture one"
    );
    assert_eq!(
        std::fs::read(storage.path().join("L02.pdf")).unwrap(),
        b"lecture two"
    );

    // Sidecars decode to the records the engine wrote.
    let record = read_record(&storage.path().join("L01.pdf")).unwrap();
    assert_eq!(record.display_name, "L01.pdf");
    assert_eq!(record.item_type, ItemType::Pdf);
    assert_eq!(record.remote_url, format!("{}/pdf/L01.pdf", server.uri()));
    assert_eq!(
        record.local_path,
        storage.path().join("L01.pdf").to_string_lossy()
    );
}

#[tokio::test]
async fn test_pipeline_feeds_listing_reconstruction() {
    let server = MockServer::start().await;
    mount_page(&server, &["pdf/L01.pdf"]).await;
    mount_pdf(&server, "/pdf/L01.pdf", b"pdf").await;

    let storage = TempDir::new().unwrap();
    let req = request(&server, storage.path());
    let (outcome, _) = run_collecting(&engine(), &req).await;
    assert!(matches!(outcome, FetchOutcome::Complete { .. }));

    let items = build_listing(storage.path()).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].record.display_name, "L01.pdf");
    assert!(!items[0].navigable);
}

// ==================== Empty Short-Circuit ====================

#[tokio::test]
async fn test_empty_page_short_circuits_without_writes() {
    let server = MockServer::start().await;
    mount_page(&server, &[]).await;

    let storage = TempDir::new().unwrap();
    let target = storage.path().join("lec");
    let req = FetchRequest {
        base_url: server.uri(),
        page_url: format!("{}/lectures.php", server.uri()),
        storage_root: target.clone(),
    };
    let (outcome, events) = run_collecting(&engine(), &req).await;

    assert_eq!(outcome, FetchOutcome::Empty);
    assert!(events.is_empty(), "no progress for an empty page");
    assert!(!target.exists(), "empty result must perform zero writes");
}

#[tokio::test]
async fn test_scrape_failure_degrades_to_empty() {
    let server = MockServer::start().await;
    // No mock for /lectures.php: wiremock answers 404.
    let storage = TempDir::new().unwrap();
    let target = storage.path().join("lec");
    let req = FetchRequest {
        base_url: server.uri(),
        page_url: format!("{}/lectures.php", server.uri()),
        storage_root: target.clone(),
    };
    let (outcome, events) = run_collecting(&engine(), &req).await;

    assert_eq!(outcome, FetchOutcome::Empty);
    assert!(events.is_empty());
    assert!(!target.exists());
}

// ==================== Partial Failure ====================

#[tokio::test]
async fn test_one_failed_item_does_not_abort_batch() {
    let server = MockServer::start().await;
    mount_page(&server, &["pdf/L01.pdf", "pdf/L02.pdf", "pdf/L03.pdf"]).await;
    mount_pdf(&server, "/pdf/L01.pdf", b"one").await;
    // L02 is missing on the server: per-item 404.
    mount_pdf(&server, "/pdf/L03.pdf", b"three").await;

    let storage = TempDir::new().unwrap();
    let req = request(&server, storage.path());
    let (outcome, events) = run_collecting(&engine(), &req).await;

    assert_eq!(
        outcome,
        FetchOutcome::Complete {
            storage_root: storage.path().to_path_buf(),
            completed: 2,
            failed: 1,
            skipped: 0,
        }
    );
    assert_eq!(events.len(), 3, "exactly N progress events");

    assert!(storage.path().join("L01.pdf").exists());
    assert!(storage.path().join("L03.pdf").exists());
    assert!(!storage.path().join("L02.pdf").exists());
    assert!(
        !storage.path().join("L02.pdf.meta").exists(),
        "no sidecar for a failed item"
    );
    assert!(read_record(&storage.path().join("L03.pdf")).is_ok());
}

#[tokio::test]
async fn test_blank_href_skipped_not_failed() {
    let server = MockServer::start().await;
    mount_page(&server, &["pdf/L01.pdf", "  ", "pdf/L02.pdf"]).await;
    mount_pdf(&server, "/pdf/L01.pdf", b"one").await;
    mount_pdf(&server, "/pdf/L02.pdf", b"two").await;

    let storage = TempDir::new().unwrap();
    let req = request(&server, storage.path());
    let (outcome, events) = run_collecting(&engine(), &req).await;

    assert_eq!(
        outcome,
        FetchOutcome::Complete {
            storage_root: storage.path().to_path_buf(),
            completed: 2,
            failed: 0,
            skipped: 1,
        }
    );
    // Skipped items still count toward the progress stream.
    assert_eq!(events.len(), 3);
}

// ==================== Progress Ordering ====================

#[tokio::test]
async fn test_progress_events_in_page_order_with_raw_indices() {
    let server = MockServer::start().await;
    let hrefs = ["pdf/L01.pdf", "pdf/L02.pdf", "pdf/L03.pdf", "pdf/L04.pdf"];
    mount_page(&server, &hrefs).await;
    for href in &hrefs {
        mount_pdf(&server, &format!("/{href}"), b"x").await;
    }

    let storage = TempDir::new().unwrap();
    let req = request(&server, storage.path());
    let (_, events) = run_collecting(&engine(), &req).await;

    let expected: Vec<ProgressEvent> = (0..4)
        .map(|index| ProgressEvent::Item { index, total: 4 })
        .collect();
    assert_eq!(events, expected, "sequential, in-order, raw-index progress");
}

// ==================== Cancellation ====================

#[tokio::test]
async fn test_dropped_receiver_cancels_silently_after_item_completes() {
    let server = MockServer::start().await;
    mount_page(&server, &["pdf/L01.pdf", "pdf/L02.pdf", "pdf/L03.pdf"]).await;
    for p in ["/pdf/L01.pdf", "/pdf/L02.pdf", "/pdf/L03.pdf"] {
        mount_pdf(&server, p, b"x").await;
    }

    let storage = TempDir::new().unwrap();
    let req = request(&server, storage.path());

    let (tx, rx) = mpsc::unbounded_channel();
    drop(rx); // consumer is gone before the run even starts

    let outcome = engine().run(&req, &tx).await;
    assert_eq!(outcome, FetchOutcome::Cancelled { processed: 1 });

    // The in-flight item completed atomically: artifact and sidecar exist.
    assert!(storage.path().join("L01.pdf").exists());
    assert!(read_record(&storage.path().join("L01.pdf")).is_ok());
    // Work after the cancellation point never happened.
    assert!(!storage.path().join("L02.pdf").exists());
    assert!(!storage.path().join("L03.pdf").exists());
}
