//! # ytmux-rs
//!
//! A minimalistic YouTube downloader. It fetches a watch page, slices the
//! embedded player configuration out of the HTML, picks the adaptive video
//! stream with the greatest height and the adaptive audio stream with the
//! greatest average bitrate, downloads both and muxes them into a single
//! `.mkv` with ffmpeg.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ytmux_rs::{util, worker};
//!
//! #[tokio::main]
//! async fn main() {
//!     // Create HttpClient, a wrapper around reqwest::Client but includes a
//!     // middleware for retrying transient errors
//!     let client = util::HttpClient::new().unwrap();
//!
//!     // Fetch the video page
//!     let html = client.fetch_text("https://www.youtube.com/watch?v=...").await.unwrap();
//!
//!     // Extract, select, download and mux
//!     let workdir = std::path::Path::new(".");
//!     let output = worker::run(&client, html.as_str(), workdir).await.unwrap();
//!     println!("wrote {}", output.display());
//! }
//! ```
//!
//! The extraction pipeline is usable on its own: `worker::DownloadPlan`
//! turns page text into the two chosen stream descriptors and the output
//! file stem without touching the network.

#[forbid(unsafe_code)]
#[macro_use]
extern crate log;

pub mod ffmpeg;
pub mod filename;
pub mod player_config;
pub mod select;
pub mod unescape;
pub mod util;
pub mod worker;
