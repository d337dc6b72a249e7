//! CLI entry point for the lectern tool.
//!
//! This binary is the pipeline's UI collaborator: it renders listings and
//! progress, and triggers the core operations. All pipeline logic lives in
//! `lectern_core`.

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use lectern_core::{
    DownloadEngine, FetchOutcome, FetchRequest, HttpClient, IconRef, ItemType, PageFetcher,
    ProgressEvent, build_listing, lecture_page_url, scrape_catalog,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

mod cli;

use cli::{Args, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (warn)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    match args.command {
        Command::Fetch {
            base,
            page,
            storage,
        } => {
            let page = page.unwrap_or_else(|| lecture_page_url(&base));
            run_fetch(&base, &page, storage.as_path()).await;
        }
        Command::List { dir, json } => run_list(&dir, json)?,
        Command::Courses {
            catalog_url,
            course_host,
            json,
        } => run_courses(&catalog_url, &course_host, json).await?,
    }

    Ok(())
}

/// Runs the fetch pipeline with a determinate progress bar consuming the
/// engine's event channel.
async fn run_fetch(base: &str, page: &str, storage: &Path) {
    info!(base, page, storage = %storage.display(), "starting fetch");

    let engine = DownloadEngine::new(PageFetcher::new(), HttpClient::new());
    let request = FetchRequest {
        base_url: base.to_string(),
        page_url: page.to_string(),
        storage_root: storage.to_path_buf(),
    };

    let (tx, mut rx) = mpsc::unbounded_channel::<ProgressEvent>();

    // One-way channel: the engine only produces; this consumer owns the bar.
    // Dropping the receiver would silently cancel the run.
    let consumer = tokio::spawn(async move {
        let bar = ProgressBar::hidden();
        bar.set_style(
            ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        let mut started = false;
        while let Some(ProgressEvent::Item { index, total }) = rx.recv().await {
            if !started {
                bar.set_length(total as u64);
                bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
                started = true;
            }
            bar.set_position((index + 1) as u64);
        }
        bar.finish_and_clear();
    });

    let outcome = engine.run(&request, &tx).await;
    drop(tx);
    let _ = consumer.await;

    match outcome {
        FetchOutcome::Empty => {
            println!("No PDFs found on {page} - maybe the course isn't running this semester.");
        }
        FetchOutcome::Complete {
            storage_root,
            completed,
            failed,
            skipped,
        } => {
            println!(
                "Downloaded {completed} file(s) to {} ({failed} failed, {skipped} skipped)",
                storage_root.display()
            );
        }
        FetchOutcome::Cancelled { processed } => {
            // Only reachable if the consumer dies early; report what we know.
            warn!(processed, "fetch stopped early");
        }
    }
}

/// Prints the reconstructed listing for a storage directory.
fn run_list(dir: &Path, json: bool) -> Result<()> {
    let items = build_listing(dir)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if items.is_empty() {
        println!("Nothing here yet - run `lectern fetch` first.");
        return Ok(());
    }
    for item in items {
        let marker = match item.record.item_type {
            ItemType::Folder => "dir ",
            ItemType::Pdf => "pdf ",
            ItemType::Marks => "mark",
            ItemType::Other => "    ",
        };
        println!("{marker}  {}", item.record.display_name);
    }
    Ok(())
}

/// Scrapes and prints the course catalog.
async fn run_courses(catalog_url: &str, course_host: &str, json: bool) -> Result<()> {
    let fetcher = PageFetcher::new();
    let courses = match scrape_catalog(&fetcher, catalog_url, course_host).await {
        Ok(courses) => courses,
        Err(e) => {
            // Scrape failures degrade to an empty catalog, same policy as
            // the download pipeline.
            warn!(error = %e, "catalog scrape failed");
            Vec::new()
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&courses)?);
        return Ok(());
    }

    if courses.is_empty() {
        println!("No courses found.");
        return Ok(());
    }
    for course in courses {
        let icon = match course.icon {
            IconRef::Folder => "+",
            IconRef::Document => "-",
        };
        println!("{icon} {:8}  {}  ({})", course.course_code, course.display_name, course.course_url);
    }
    Ok(())
}
