//! `GET /payments-summary` — totals per processor over a time window.

use crate::state::AppState;
use axum::Json;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use payrelay_core::store::ScoreRange;
use payrelay_core::utils::timestamp::parse_time_bound;
use serde::Deserialize;

/// Query bounds, each optional. Accepted as ISO-8601 (zone-less input is
/// taken as UTC) or a millisecond-epoch integer.
#[derive(Debug, Default, Deserialize)]
pub struct SummaryWindow {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl SummaryWindow {
    /// Missing or unparseable bounds widen to an open end.
    fn to_range(&self) -> ScoreRange {
        ScoreRange::new(
            self.from.as_deref().and_then(parse_time_bound),
            self.to.as_deref().and_then(parse_time_bound),
        )
    }
}

pub async fn payments_summary(
    State(state): State<AppState>,
    Query(window): Query<SummaryWindow>,
) -> impl IntoResponse {
    Json(state.summary.summarize(window.to_range()).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(from: Option<&str>, to: Option<&str>) -> SummaryWindow {
        SummaryWindow {
            from: from.map(str::to_string),
            to: to.map(str::to_string),
        }
    }

    #[test]
    fn missing_bounds_stay_open() {
        assert_eq!(window(None, None).to_range(), ScoreRange::default());
    }

    #[test]
    fn unparseable_bounds_widen_to_open() {
        let range = window(Some("not-a-date"), Some("1700000000000")).to_range();
        assert_eq!(range.min, None);
        assert_eq!(range.max, Some(1_700_000_000.0));
    }

    #[test]
    fn both_bound_styles_are_accepted() {
        let range = window(Some("2025-07-01T12:00:00"), Some("1751371500000")).to_range();
        assert_eq!(range.min, Some(1_751_371_200.0));
        assert_eq!(range.max, Some(1_751_371_500.0));
    }
}
