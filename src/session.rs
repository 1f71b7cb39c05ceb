use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::interval;

use crate::api::MatchesClient;
use crate::config::{COUNTDOWN_TICK, REFRESH_INTERVAL};
use crate::match_id::MatchId;
use crate::reconcile::{self, MatchCard};

/// Instructions from the UI layer.
#[derive(Debug, Clone)]
pub enum SessionCommand {
    /// A match page was opened; background refresh narrows to the sidebar
    /// so the active stream is left alone.
    OpenMatch(MatchId),
    /// Back to the listings page.
    CloseMatch,
    /// Start counting down to a kickoff (unix ms). Replaces any countdown
    /// already running.
    StartCountdown(i64),
    CancelCountdown,
    /// Refresh now instead of waiting for the next tick.
    Refresh,
    Shutdown,
}

/// Render-ready output. One event per list, so an endpoint that failed this
/// cycle simply produces no event and the renderer keeps its stale content.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Live(Vec<MatchCard>),
    Upcoming(Vec<MatchCard>),
    Popular(Vec<MatchCard>),
    Sidebar(Vec<MatchCard>),
    CountdownTick(String),
    CountdownFinished,
}

/// Countdown line for a kickoff `diff_ms` in the future (or not).
pub fn countdown_text(diff_ms: i64) -> String {
    if diff_ms <= 0 {
        return "Match Started!".to_string();
    }
    let hours = diff_ms / 3_600_000;
    let minutes = (diff_ms % 3_600_000) / 60_000;
    let seconds = (diff_ms % 60_000) / 1_000;
    format!("Match starts in: {hours}h {minutes}m {seconds}s")
}

/// Owns the per-session mutable state the pages share: which match is open
/// and the single countdown ticker. At most one countdown is ever alive;
/// starting a new one aborts the previous.
pub struct RenderSession {
    client: MatchesClient,
    events: mpsc::Sender<SessionEvent>,
    current_match: Option<MatchId>,
    countdown: Option<JoinHandle<()>>,
    refresh_interval: Duration,
}

impl RenderSession {
    pub fn new(client: MatchesClient, events: mpsc::Sender<SessionEvent>) -> Self {
        Self {
            client,
            events,
            current_match: None,
            countdown: None,
            refresh_interval: REFRESH_INTERVAL,
        }
    }

    /// Shorten the refresh cadence (tests).
    pub fn with_refresh_interval(mut self, refresh_interval: Duration) -> Self {
        self.refresh_interval = refresh_interval;
        self
    }

    pub fn current_match(&self) -> Option<&MatchId> {
        self.current_match.as_ref()
    }

    pub fn open_match(&mut self, id: MatchId) {
        self.current_match = Some(id);
    }

    pub fn close_match(&mut self) {
        self.current_match = None;
    }

    pub fn start_countdown(&mut self, kickoff_ms: i64) {
        self.cancel_countdown();
        let events = self.events.clone();
        self.countdown = Some(tokio::spawn(async move {
            let mut tick = interval(COUNTDOWN_TICK);
            loop {
                tick.tick().await;
                let diff = kickoff_ms - Utc::now().timestamp_millis();
                if diff <= 0 {
                    let _ = events.send(SessionEvent::CountdownFinished).await;
                    return;
                }
                let _ = events.send(SessionEvent::CountdownTick(countdown_text(diff))).await;
            }
        }));
    }

    pub fn cancel_countdown(&mut self) {
        if let Some(handle) = self.countdown.take() {
            handle.abort();
        }
    }

    pub fn countdown_running(&self) -> bool {
        self.countdown
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// One refresh cycle. With a match open only the sidebar is re-derived;
    /// otherwise all three listings are. Endpoint failures are logged and
    /// the affected list skipped; the loop itself never dies and nothing is
    /// retried.
    pub async fn refresh(&self) {
        match &self.current_match {
            Some(current) => match self.client.fetch_live().await {
                Ok(raw) => {
                    let cards = reconcile::sidebar_cards(&raw, current);
                    let _ = self.events.send(SessionEvent::Sidebar(cards)).await;
                }
                Err(e) => log::warn!("sidebar refresh failed: {e}"),
            },
            None => self.refresh_listings().await,
        }
    }

    async fn refresh_listings(&self) {
        let now_ms = Utc::now().timestamp_millis();
        let (live, all, popular) = tokio::join!(
            self.client.fetch_live(),
            self.client.fetch_football(),
            self.client.fetch_popular()
        );

        // Everything downstream needs the live-identifier set, so a dead
        // live endpoint skips the whole cycle; the other two lists degrade
        // independently.
        let live_raw = match live {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("live listing fetch failed: {e}");
                return;
            }
        };
        let live_records = reconcile::normalize_listing(&live_raw);
        let live_ids = reconcile::live_id_set(&live_records);
        let _ = self
            .events
            .send(SessionEvent::Live(reconcile::live_cards(
                live_records,
                &live_ids,
            )))
            .await;

        match all {
            Ok(raw) => {
                let cards = reconcile::upcoming_cards(&raw, &live_ids, now_ms);
                let _ = self.events.send(SessionEvent::Upcoming(cards)).await;
            }
            Err(e) => log::warn!("football listing fetch failed: {e}"),
        }

        match popular {
            Ok(raw) => {
                let cards = reconcile::popular_cards(&raw, &live_ids);
                let _ = self.events.send(SessionEvent::Popular(cards)).await;
            }
            Err(e) => log::warn!("popular listing fetch failed: {e}"),
        }
    }

    /// Drive the session: an immediate refresh, then one per interval tick,
    /// interleaved with commands. Runs until `Shutdown` or the command
    /// channel closes.
    pub async fn run(mut self, mut commands: mpsc::Receiver<SessionCommand>) {
        self.refresh().await;

        let mut ticker = interval(self.refresh_interval);
        ticker.tick().await; // the immediate tick; the refresh above covered it

        loop {
            tokio::select! {
                _ = ticker.tick() => self.refresh().await,
                cmd = commands.recv() => match cmd {
                    Some(SessionCommand::OpenMatch(id)) => self.open_match(id),
                    Some(SessionCommand::CloseMatch) => self.close_match(),
                    Some(SessionCommand::StartCountdown(kickoff)) => self.start_countdown(kickoff),
                    Some(SessionCommand::CancelCountdown) => self.cancel_countdown(),
                    Some(SessionCommand::Refresh) => self.refresh().await,
                    Some(SessionCommand::Shutdown) | None => break,
                },
            }
        }

        self.cancel_countdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_text_formats_components() {
        assert_eq!(
            countdown_text(3_600_000 + 2 * 60_000 + 3_000),
            "Match starts in: 1h 2m 3s"
        );
        assert_eq!(countdown_text(999), "Match starts in: 0h 0m 0s");
    }

    #[test]
    fn countdown_text_at_or_past_kickoff() {
        assert_eq!(countdown_text(0), "Match Started!");
        assert_eq!(countdown_text(-5_000), "Match Started!");
    }
}
