use anyhow::Result;
use chrono::{TimeZone, Utc};
use clap::Parser;
use tokio::sync::mpsc;

use matchcast::{
    pick_embed_url, sidebar_cards, ApiError, CardAction, Listings, MatchCard, MatchId,
    MatchesClient, RenderSession, SessionCommand, SessionEvent,
};

#[derive(clap::Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Alternate aggregator API base URL
    #[arg(long)]
    api_base: Option<String>,

    /// Open a match page by id: resolve its stream and list the other live matches
    #[arg(short, long)]
    open: Option<String>,

    /// Keep running, re-rendering on the background refresh interval
    #[arg(short, long)]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let client = match &args.api_base {
        Some(base) => MatchesClient::with_base(base.clone()),
        None => MatchesClient::new(),
    };

    if let Some(id) = args.open {
        return open_match_page(&client, &MatchId::from_text(&id)).await;
    }

    if args.watch {
        watch_loop(client).await;
        return Ok(());
    }

    let listings = client
        .fetch_listings(Utc::now().timestamp_millis())
        .await?;
    print_listings(&listings);
    Ok(())
}

/// Watch-page flow: look the match up in the live listing, resolve its
/// first stream source to a playable embed URL, then show the sidebar of
/// other live football matches.
async fn open_match_page(client: &MatchesClient, id: &MatchId) -> Result<()> {
    let record = match client.find_live_match(id).await {
        Ok(record) => record,
        Err(ApiError::MatchNotFound(_)) => {
            println!("Match not found.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!("{}", record.display_title());
    println!("{}", kickoff_str(record.kickoff_ms()));

    if record.sources.is_empty() {
        println!("No stream available for this match.");
    } else {
        if record.sources.len() > 1 {
            let names: Vec<String> = record
                .sources
                .iter()
                .map(|s| s.source.to_uppercase())
                .collect();
            println!("Sources: {}", names.join(" | "));
        }
        let first = &record.sources[0];
        let links = client.fetch_stream_links(&first.source, &first.id).await?;
        match pick_embed_url(&links) {
            Some(url) => println!("Stream: {url}"),
            None => println!("No stream available for this match."),
        }
    }

    let raw = client.fetch_live().await?;
    print_cards(
        "OTHER LIVE FOOTBALL",
        &sidebar_cards(&raw, id),
        "No other live football matches.",
    );
    Ok(())
}

/// Run the render session until Ctrl-C, printing each event as it lands.
async fn watch_loop(client: MatchesClient) {
    let (event_tx, mut event_rx) = mpsc::channel(32);
    let (cmd_tx, cmd_rx) = mpsc::channel(8);
    let session = RenderSession::new(client, event_tx);
    let session_task = tokio::spawn(session.run(cmd_rx));

    loop {
        tokio::select! {
            event = event_rx.recv() => match event {
                Some(SessionEvent::Live(cards)) => {
                    print_cards("LIVE MATCHES", &cards, "No football matches available.")
                }
                Some(SessionEvent::Upcoming(cards)) => {
                    print_cards("UPCOMING MATCHES", &cards, "No upcoming football matches.")
                }
                Some(SessionEvent::Popular(cards)) => {
                    print_cards("POPULAR MATCHES", &cards, "No football matches available.")
                }
                Some(SessionEvent::Sidebar(cards)) => {
                    print_cards("OTHER LIVE FOOTBALL", &cards, "No other live football matches.")
                }
                Some(SessionEvent::CountdownTick(text)) => println!("{text}"),
                Some(SessionEvent::CountdownFinished) => println!("Match Started!"),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                let _ = cmd_tx.send(SessionCommand::Shutdown).await;
                break;
            }
        }
    }

    let _ = session_task.await;
}

fn print_listings(listings: &Listings) {
    print_cards(
        "LIVE MATCHES",
        &listings.live,
        "No football matches available.",
    );
    print_cards(
        "UPCOMING MATCHES",
        &listings.upcoming,
        "No upcoming football matches.",
    );
    print_cards(
        "POPULAR MATCHES",
        &listings.popular,
        "No football matches available.",
    );
}

fn print_cards(heading: &str, cards: &[MatchCard], empty: &str) {
    println!("\n== {heading} ==");
    if cards.is_empty() {
        println!("{empty}");
        return;
    }
    for card in cards {
        let title = card.record.display_title();
        let category = card.record.category.as_deref().unwrap_or("Sports");
        match &card.action {
            CardAction::Watch(id) => {
                println!("  [LIVE] {title} ({category}) -> watch.html?id={id}")
            }
            CardAction::Countdown(kickoff) => {
                println!("  {title} ({category}) - kicks off {}", kickoff_str(*kickoff))
            }
            CardAction::Unavailable => {
                println!("  [LIVE] {title} ({category}) - no stream id")
            }
        }
    }
}

fn kickoff_str(ms: i64) -> String {
    match Utc.timestamp_millis_opt(ms).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M UTC").to_string(),
        None => "unknown time".to_string(),
    }
}
