//! Front-end core for a football streaming aggregator.
//!
//! Fetches match listings (live, upcoming, popular) from the streamed.pk
//! API, resolves card artwork and live state, and exposes render-ready
//! lists plus a background-refresh session. Actual rendering is the
//! caller's concern.

pub mod api;
pub mod config;
pub mod errors;
pub mod images;
pub mod match_id;
pub mod reconcile;
pub mod session;

pub use api::{pick_embed_url, MatchRecord, MatchesClient, StreamLink, StreamSource};
pub use errors::ApiError;
pub use images::{match_image, ImageInfo};
pub use match_id::MatchId;
pub use reconcile::{
    normalize_listing, reconcile, sidebar_cards, CardAction, Listings, MatchCard,
};
pub use session::{countdown_text, RenderSession, SessionCommand, SessionEvent};
