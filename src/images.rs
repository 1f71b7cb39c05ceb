use once_cell::sync::Lazy;
use regex::Regex;

use crate::api::MatchRecord;
use crate::config::FALLBACK_IMAGE;

const IMAGE_BASE: &str = "https://streamed.pk/api/images";
const DEFAULT_ALT: &str = "Match Image";

static IMAGE_EXT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(png|jpe?g|gif|webp|svg)$").unwrap());

/// Display image for a match card. Recomputed per render, no identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub src: String,
    pub alt: String,
    pub is_external: bool,
}

fn is_full_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

fn has_image_extension(s: &str) -> bool {
    IMAGE_EXT_RE.is_match(s)
}

/// Badge and poster tokens sometimes arrive with leading path separators.
fn normalize_token(s: &str) -> &str {
    s.trim_start_matches('/')
}

/// A single path segment under the image endpoints: normalized token plus
/// the default extension when none is recognized.
fn image_segment(token: &str) -> String {
    let t = normalize_token(token);
    if has_image_extension(t) {
        t.to_string()
    } else {
        format!("{t}.webp")
    }
}

/// Token under a fixed endpoint, unless it is already a full URL, in which
/// case it is used verbatim (no double-prefixing).
fn endpoint_url(endpoint: &str, token: &str) -> String {
    let t = normalize_token(token);
    if is_full_url(t) {
        t.to_string()
    } else {
        format!("{IMAGE_BASE}/{endpoint}/{}", image_segment(t))
    }
}

/// Resolve the display image for a match.
///
/// Priority chain, first hit wins:
/// 1. both team badges → composed poster-pair URL
/// 2. poster token → proxy URL (or verbatim if already a full URL)
/// 3. home badge alone → badge URL
/// 4. away badge alone → badge URL
/// 5. local fallback asset
///
/// Never fails; a card whose URL turns out dead substitutes the local
/// fallback at render time.
pub fn match_image(record: &MatchRecord) -> ImageInfo {
    let alt = record
        .title
        .as_deref()
        .or(record.name.as_deref())
        .unwrap_or(DEFAULT_ALT)
        .to_string();

    let home = record.home_badge();
    let away = record.away_badge();

    if let (Some(home), Some(away)) = (home, away) {
        return ImageInfo {
            src: format!(
                "{IMAGE_BASE}/poster/{}/{}",
                image_segment(home),
                image_segment(away)
            ),
            alt,
            is_external: true,
        };
    }

    if let Some(poster) = record.poster.as_deref() {
        return ImageInfo {
            src: endpoint_url("proxy", poster),
            alt,
            is_external: true,
        };
    }

    if let Some(badge) = home.or(away) {
        return ImageInfo {
            src: endpoint_url("badge", badge),
            alt,
            is_external: true,
        };
    }

    ImageInfo {
        src: FALLBACK_IMAGE.to_string(),
        alt,
        is_external: false,
    }
}
