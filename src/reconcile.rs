use std::collections::HashSet;

use serde_json::Value;

use crate::api::MatchRecord;
use crate::images::{match_image, ImageInfo};
use crate::match_id::MatchId;

/// What a card does when activated. The rendering collaborator turns this
/// into a link or a countdown modal; deriving the branch is our job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardAction {
    /// Navigate straight to the watch page.
    Watch(String),
    /// Show a countdown to kickoff (unix ms).
    Countdown(i64),
    /// Live but carrying no identifier at all, so nothing to link to.
    Unavailable,
}

/// A display-ready match: record plus resolved live flag, artwork and action.
#[derive(Debug, Clone)]
pub struct MatchCard {
    pub record: MatchRecord,
    pub is_live: bool,
    pub image: ImageInfo,
    pub action: CardAction,
}

impl MatchCard {
    fn new(record: MatchRecord, is_live: bool) -> Self {
        let image = match_image(&record);
        let action = if is_live {
            match record.effective_id().canonical() {
                Some(id) => CardAction::Watch(id),
                None => CardAction::Unavailable,
            }
        } else {
            CardAction::Countdown(record.kickoff_ms())
        };
        Self {
            record,
            is_live,
            image,
            action,
        }
    }
}

/// The three disjoint render lists of a full refresh cycle.
#[derive(Debug, Clone, Default)]
pub struct Listings {
    pub live: Vec<MatchCard>,
    pub upcoming: Vec<MatchCard>,
    pub popular: Vec<MatchCard>,
}

/// Flatten an API response envelope into match records.
///
/// Accepts a bare array, or an object whose `data` or `matches` field (or,
/// failing those, first array-valued field) holds the array. Anything else
/// yields an empty list. Elements that don't deserialize are skipped
/// individually rather than poisoning the whole listing.
pub fn normalize_listing(raw: &Value) -> Vec<MatchRecord> {
    let items = match raw {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => {
            let preferred = ["data", "matches"]
                .iter()
                .find_map(|k| map.get(*k).and_then(Value::as_array));
            match preferred.or_else(|| map.values().find_map(Value::as_array)) {
                Some(items) => items.as_slice(),
                None => return Vec::new(),
            }
        }
        _ => return Vec::new(),
    };

    items
        .iter()
        .filter_map(|item| match serde_json::from_value(item.clone()) {
            Ok(record) => Some(record),
            Err(e) => {
                log::debug!("skipping malformed match record: {e}");
                None
            }
        })
        .collect()
}

/// Identifiers currently reported live. Built from the whole live response,
/// before the football filter, so a live id always reclassifies records on
/// the other endpoints. Records with no identifier contribute nothing.
pub fn live_id_set(live: &[MatchRecord]) -> HashSet<MatchId> {
    live.iter()
        .map(MatchRecord::effective_id)
        .filter(|id| !id.is_missing())
        .collect()
}

/// A record is live if it says so itself or its id is in the live set.
pub fn resolve_is_live(record: &MatchRecord, live_ids: &HashSet<MatchId>) -> bool {
    record.marked_live() || live_ids.contains(&record.effective_id())
}

/// Cards for the live listing itself.
pub fn live_cards(live: Vec<MatchRecord>, live_ids: &HashSet<MatchId>) -> Vec<MatchCard> {
    live.into_iter()
        .filter(MatchRecord::is_football)
        .map(|r| {
            let is_live = resolve_is_live(&r, live_ids);
            MatchCard::new(r, is_live)
        })
        .collect()
}

/// Upcoming cards from the all-football response: everything not already
/// live, kicking off after `now_ms`, ascending by kickoff. A missing date
/// collapses to the epoch and therefore never qualifies.
pub fn upcoming_cards(
    all_raw: &Value,
    live_ids: &HashSet<MatchId>,
    now_ms: i64,
) -> Vec<MatchCard> {
    let mut upcoming: Vec<MatchRecord> = normalize_listing(all_raw)
        .into_iter()
        .filter(|r| !live_ids.contains(&r.effective_id()))
        .filter(MatchRecord::is_football)
        .filter(|r| r.kickoff_ms() > now_ms)
        .collect();
    upcoming.sort_by_key(MatchRecord::kickoff_ms);
    upcoming
        .into_iter()
        .map(|r| MatchCard::new(r, false))
        .collect()
}

/// Popular cards with the live flag recomputed against the live set. The
/// flag decides whether a card navigates or counts down; that branch lives
/// in [`MatchCard::new`].
pub fn popular_cards(popular_raw: &Value, live_ids: &HashSet<MatchId>) -> Vec<MatchCard> {
    normalize_listing(popular_raw)
        .into_iter()
        .filter(MatchRecord::is_football)
        .map(|r| {
            let is_live = resolve_is_live(&r, live_ids);
            MatchCard::new(r, is_live)
        })
        .collect()
}

/// Derive the three render lists from the raw endpoint responses.
///
/// Step order matters: the live-identifier set comes first, and the
/// upcoming list excludes its members before the date filter, which is what
/// keeps the live and upcoming lists disjoint.
pub fn reconcile(live_raw: &Value, all_raw: &Value, popular_raw: &Value, now_ms: i64) -> Listings {
    let live_records = normalize_listing(live_raw);
    let live_ids = live_id_set(&live_records);

    Listings {
        live: live_cards(live_records, &live_ids),
        upcoming: upcoming_cards(all_raw, &live_ids, now_ms),
        popular: popular_cards(popular_raw, &live_ids),
    }
}

/// Watch-page sidebar: the other live football matches, excluding the one
/// currently open.
pub fn sidebar_cards(live_raw: &Value, current: &MatchId) -> Vec<MatchCard> {
    normalize_listing(live_raw)
        .into_iter()
        .filter(MatchRecord::is_football)
        .filter(|r| r.effective_id() != *current)
        .map(|r| MatchCard::new(r, true))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalize_accepts_bare_array() {
        let raw = json!([{"id": 1}, {"id": 2}]);
        assert_eq!(normalize_listing(&raw).len(), 2);
    }

    #[test]
    fn normalize_unwraps_data_field() {
        let raw = json!({"data": [{"id": 1}]});
        assert_eq!(normalize_listing(&raw).len(), 1);
    }

    #[test]
    fn normalize_unwraps_matches_field() {
        let raw = json!({"matches": [{"id": 1}]});
        assert_eq!(normalize_listing(&raw).len(), 1);
    }

    #[test]
    fn normalize_falls_back_to_any_array_field() {
        let raw = json!({"count": 1, "other": [{"id": 7}]});
        let records = normalize_listing(&raw);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, crate::match_id::MatchId::Number(7));
    }

    #[test]
    fn normalize_prefers_data_over_other_arrays() {
        let raw = json!({"aaa": [{"id": 9}], "data": [{"id": 1}, {"id": 2}]});
        let records = normalize_listing(&raw);
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn normalize_yields_empty_for_null_and_empty_object() {
        assert!(normalize_listing(&Value::Null).is_empty());
        assert!(normalize_listing(&json!({})).is_empty());
        assert!(normalize_listing(&json!({"total": 3})).is_empty());
    }

    #[test]
    fn live_set_skips_missing_ids_and_uses_source_fallback() {
        let records = normalize_listing(&json!([
            {"id": 1},
            {"sources": [{"source": "alpha", "id": "xyz"}]},
            {"title": "no id at all"},
        ]));
        let ids = live_id_set(&records);
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&MatchId::Number(1)));
        assert!(ids.contains(&MatchId::Text("xyz".into())));
    }

    #[test]
    fn status_live_is_case_insensitive() {
        let records = normalize_listing(&json!([
            {"id": 1, "status": "LIVE"},
            {"id": 2, "status": "ended"},
        ]));
        let empty = HashSet::new();
        assert!(resolve_is_live(&records[0], &empty));
        assert!(!resolve_is_live(&records[1], &empty));
    }

    #[test]
    fn live_record_never_appears_upcoming() {
        let live_raw = json!([{"id": 1, "category": "football", "status": "live"}]);
        let all_raw = json!([
            {"id": 1, "category": "football", "date": 4102444800000_i64},
            {"id": 2, "category": "football", "date": 4102444800000_i64},
        ]);
        let listings = reconcile(&live_raw, &all_raw, &Value::Null, 1_000);
        assert_eq!(listings.live.len(), 1);
        assert_eq!(listings.upcoming.len(), 1);
        assert_eq!(listings.upcoming[0].record.id, MatchId::Number(2));
    }

    #[test]
    fn live_exclusion_survives_string_number_disagreement() {
        let live_raw = json!([{"id": "1", "category": "football"}]);
        let all_raw = json!([{"id": 1, "category": "football", "date": 4102444800000_i64}]);
        let listings = reconcile(&live_raw, &all_raw, &Value::Null, 1_000);
        assert!(listings.upcoming.is_empty());
    }

    #[test]
    fn upcoming_sorted_ascending_and_past_excluded() {
        let now = 1_000_000;
        let all_raw = json!([
            {"id": 1, "category": "football", "date": now + 500},
            {"id": 2, "category": "football", "date": now - 500},
            {"id": 3, "category": "football", "date": now + 100},
            {"id": 4, "category": "football"},
        ]);
        let cards = upcoming_cards(&all_raw, &HashSet::new(), now);
        let ids: Vec<_> = cards.iter().map(|c| c.record.id.clone()).collect();
        assert_eq!(ids, vec![MatchId::Number(3), MatchId::Number(1)]);
    }

    #[test]
    fn non_football_filtered_from_every_list() {
        let live_raw = json!([
            {"id": 1, "category": "football"},
            {"id": 2, "category": "basketball"},
        ]);
        let popular_raw = json!([{"id": 3, "category": "Tennis"}]);
        let listings = reconcile(&live_raw, &Value::Null, &popular_raw, 0);
        assert_eq!(listings.live.len(), 1);
        assert!(listings.popular.is_empty());
    }

    #[test]
    fn football_category_match_is_case_insensitive() {
        let live_raw = json!([{"id": 1, "category": "Football"}]);
        let listings = reconcile(&live_raw, &Value::Null, &Value::Null, 0);
        assert_eq!(listings.live.len(), 1);
    }

    #[test]
    fn popular_cards_branch_on_recomputed_flag() {
        let live_raw = json!([{"id": 1, "category": "football"}]);
        let popular_raw = json!([
            {"id": 1, "category": "football", "date": 9_000},
            {"id": 2, "category": "football", "date": 9_000},
        ]);
        let listings = reconcile(&live_raw, &Value::Null, &popular_raw, 0);
        assert!(listings.popular[0].is_live);
        assert_eq!(listings.popular[0].action, CardAction::Watch("1".into()));
        assert!(!listings.popular[1].is_live);
        assert_eq!(listings.popular[1].action, CardAction::Countdown(9_000));
    }

    #[test]
    fn live_card_without_any_id_is_unavailable() {
        let live_raw = json!([{"category": "football", "status": "live"}]);
        let listings = reconcile(&live_raw, &Value::Null, &Value::Null, 0);
        assert_eq!(listings.live[0].action, CardAction::Unavailable);
    }

    #[test]
    fn live_card_falls_back_to_source_id_for_watch_action() {
        let live_raw = json!([{
            "category": "football",
            "status": "live",
            "sources": [{"source": "alpha", "id": "abc"}],
        }]);
        let listings = reconcile(&live_raw, &Value::Null, &Value::Null, 0);
        assert_eq!(listings.live[0].action, CardAction::Watch("abc".into()));
    }

    #[test]
    fn sidebar_excludes_current_match() {
        let live_raw = json!([
            {"id": 1, "category": "football"},
            {"id": 2, "category": "football"},
            {"id": 3, "category": "darts"},
        ]);
        let cards = sidebar_cards(&live_raw, &MatchId::Number(1));
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].record.id, MatchId::Number(2));
        assert!(cards[0].is_live);
    }

    #[test]
    fn full_scenario_from_three_endpoints() {
        let future = 4_102_444_800_000_i64;
        let live_raw = json!([{"id": 1, "category": "football", "status": "live"}]);
        let all_raw = json!([
            {"id": 1, "category": "football", "date": future},
            {"id": 2, "category": "football", "date": future},
        ]);
        let popular_raw = json!([{"id": 2, "category": "football", "date": future}]);

        let listings = reconcile(&live_raw, &all_raw, &popular_raw, 1_000);

        assert_eq!(listings.live.len(), 1);
        assert_eq!(listings.live[0].record.id, MatchId::Number(1));
        assert!(listings.live[0].is_live);

        assert_eq!(listings.upcoming.len(), 1);
        assert_eq!(listings.upcoming[0].record.id, MatchId::Number(2));

        assert_eq!(listings.popular.len(), 1);
        assert_eq!(listings.popular[0].record.id, MatchId::Number(2));
        assert!(!listings.popular[0].is_live);
    }
}
