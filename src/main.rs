use clap::Parser;
use ytmux_rs::{util, worker};

/// Minimalistic youtube downloader; the download filename is deduced from
/// the video title.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Url of the video page to download
    url: String,

    /// Print debugging statements
    #[arg(short, long)]
    debug: bool,

    /// Be verbose
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Log level is fixed at startup, -d wins over -v
    let level = if cli.debug {
        log::LevelFilter::Debug
    } else if cli.verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new().filter_level(level).init();

    // Create HttpClient
    let client = util::HttpClient::new().expect("Could not create HttpClient");

    // Fetch the URL
    println!("Fetching {}", cli.url);
    let html = client
        .fetch_text(&cli.url)
        .await
        .expect("Could not fetch URL");

    // Extract, select, download, mux
    let workdir = std::path::Path::new(".");
    match worker::run(&client, html.as_str(), workdir).await {
        Ok(output) => println!("Done: {}", output.display()),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
