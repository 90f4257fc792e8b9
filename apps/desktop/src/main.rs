use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{CardCollectionClient, HttpCardRemote, TrackedCard, ViewQuery};
use shared::domain::Playlist;

#[derive(Parser, Debug)]
struct Args {
    #[arg(long)]
    server_url: String,
    /// Path to a playlist JSON file, as produced by the playlist service.
    #[arg(long)]
    playlist: PathBuf,
    /// Substring filter applied to card questions.
    #[arg(long, default_value = "")]
    filter: String,
    #[arg(long)]
    question: Option<String>,
    #[arg(long)]
    answer: Option<String>,
}

fn print_view(label: &str, view: &[TrackedCard]) {
    println!("{label} ({} cards):", view.len());
    for tracked in view {
        println!(
            "  [{}] {} / {}",
            tracked.card.created_at.format("%Y-%m-%d"),
            tracked.card.question,
            tracked.card.answer
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let raw = std::fs::read_to_string(&args.playlist)
        .with_context(|| format!("failed to read playlist file {}", args.playlist.display()))?;
    let playlist: Playlist = serde_json::from_str(&raw).context("invalid playlist JSON")?;
    println!("Loaded playlist \"{}\"", playlist.name);

    let client = CardCollectionClient::new(Arc::new(HttpCardRemote::new(args.server_url)));
    client.load_playlist(playlist).await;

    let query = ViewQuery {
        filter: args.filter,
        ..ViewQuery::default()
    };
    print_view("Current view", &client.view(&query).await);

    if let (Some(question), Some(answer)) = (args.question, args.answer) {
        match client.create(&question, &answer).await {
            Ok(card) => println!("Created card id={}", card.id),
            Err(err) => eprintln!("{err}"),
        }
        print_view("View after create", &client.view(&query).await);
    }

    Ok(())
}
