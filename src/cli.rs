//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Default course catalog page.
pub const DEFAULT_CATALOG_URL: &str =
    "https://www.otago.ac.nz/computer-science/study/otago673578.html";

/// Default host that course sites live under.
pub const DEFAULT_COURSE_HOST: &str = "https://cs.otago.ac.nz";

/// Fetch university lecture PDFs and rebuild browsable course listings.
///
/// Lectern scrapes a course's lecture-listing page, downloads every linked
/// PDF into local storage with a metadata sidecar per file, and can later
/// rebuild the listing from those sidecars.
#[derive(Parser, Debug)]
#[command(name = "lectern")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download all PDFs linked from a lecture-listing page
    Fetch {
        /// Course root URL that page hrefs are joined onto
        #[arg(long)]
        base: String,

        /// Lecture-listing page URL (defaults to {base}/lectures.php)
        #[arg(long)]
        page: Option<String>,

        /// Directory to store artifacts and sidecars in
        storage: PathBuf,
    },

    /// Rebuild and print the listing for a downloaded directory
    List {
        /// The storage directory to list
        dir: PathBuf,

        /// Emit the listing as JSON
        #[arg(long)]
        json: bool,
    },

    /// Scrape the course catalog and print the available courses
    Courses {
        /// Catalog page URL
        #[arg(long, default_value = DEFAULT_CATALOG_URL)]
        catalog_url: String,

        /// Host course sites live under
        #[arg(long, default_value = DEFAULT_COURSE_HOST)]
        course_host: String,

        /// Emit the course list as JSON
        #[arg(long)]
        json: bool,
    },
}
