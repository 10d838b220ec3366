use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

use quicksearch::api;
use quicksearch::client::{HttpSearchApi, SearchBox, TerminalView, input_events};
use quicksearch::config::CONFIG;
use quicksearch::query_engine::QueryEngine;

const TERMINAL_WIDTH: usize = 100;

#[derive(Parser, Debug)]
#[command(version, about = "Fuzzy entity search with a stale-response-safe client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build an index from an entity file and serve the search API.
    Serve {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        port: Option<u16>,
        #[arg(long)]
        use_synonyms: bool,
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
    /// Read queries from stdin and show the answer to the latest one.
    Search {
        #[arg(long)]
        api_url: Option<String>,
        /// Submit every prefix of each line, as if it were being typed.
        #[arg(long)]
        incremental: bool,
    },
    /// Query an entity file locally, without a server.
    Lookup {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        use_synonyms: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber (also forwards log crate records).
    // Logs go to stderr; stdout carries the search results.
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Serve {
            file,
            port,
            use_synonyms,
            static_dir,
        } => serve(file, port, use_synonyms, static_dir).await,
        Command::Search {
            api_url,
            incremental,
        } => search(api_url, incremental).await,
        Command::Lookup { file, use_synonyms } => lookup(file, use_synonyms).await,
    }
}

async fn serve(
    file: PathBuf,
    port: Option<u16>,
    use_synonyms: bool,
    static_dir: Option<PathBuf>,
) -> Result<()> {
    let engine = tokio::task::spawn_blocking(move || {
        QueryEngine::from_file(&file, use_synonyms, CONFIG.top_k)
    })
    .await??;

    let static_dir = static_dir.unwrap_or_else(|| PathBuf::from(&CONFIG.static_dir));
    let router = api::create_router(Arc::new(engine), static_dir);

    let port = port.unwrap_or(CONFIG.port);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind port {port}"))?;

    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received Ctrl-C, shutting down");
        }
        trigger.cancel();
    });

    api::serve(listener, router, shutdown).await
}

async fn search(api_url: Option<String>, incremental: bool) -> Result<()> {
    let url = api_url.unwrap_or_else(|| CONFIG.api_url.clone());
    let api = HttpSearchApi::new(url, CONFIG.request_timeout)?;
    let search_box = SearchBox::new(api, TerminalView::new(std::io::stdout(), TERMINAL_WIDTH));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending = Vec::new();
    while let Some(line) = lines.next_line().await? {
        for query in input_events(&line, incremental) {
            pending.push(search_box.submit(query));
        }
    }

    for outcome in futures::future::join_all(pending.into_iter().map(|h| h.outcome())).await {
        outcome?;
    }
    Ok(())
}

async fn lookup(file: PathBuf, use_synonyms: bool) -> Result<()> {
    println!("Reading from file '{}'.", file.display());
    let start = Instant::now();
    let engine = tokio::task::spawn_blocking(move || {
        QueryEngine::from_file(&file, use_synonyms, CONFIG.top_k)
    })
    .await??;
    println!("Done, took {} ms.", start.elapsed().as_millis());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("\nYour keyword query: ");
        std::io::stdout().flush()?;
        let Some(query) = lines.next_line().await? else {
            break;
        };

        let outcome = engine.search(&query);
        let stats = &outcome.stats;
        println!(
            "Got {} result(s), merged {} lists with tot. {} elements ({:.3} ms), \
             {}/{} ped calculations ({:.3} ms), took \x1b[1m{:.3} ms\x1b[0m total.",
            outcome.total_matches,
            stats.lists_merged,
            stats.elements_merged,
            stats.merge_time_ms,
            stats.ped_calcs,
            stats.candidates,
            stats.ped_time_ms,
            outcome.took_ms
        );
        for entity in &outcome.top {
            println!(
                "\n\x1b[1m{}\x1b[0m (score={}, ped={}, via '{}'):\n{}",
                entity.name, entity.score, entity.ped, entity.via, entity.description
            );
        }
    }
    Ok(())
}
