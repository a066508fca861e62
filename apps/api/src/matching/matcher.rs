//! Voice-answer matching: maps a finalized speech transcript onto one of a
//! question's options.
//!
//! Policy, evaluated over the options in list order:
//! 1. the lowercased transcript contains the lowercased option, or
//! 2. `similarity(transcript, option) > SIMILARITY_THRESHOLD`.
//!
//! The first option satisfying either rule wins. Scores are not compared
//! across options, so with overlapping options the result depends on their
//! order. `NoMatch` is an ordinary outcome, not an error.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::matching::similarity::similarity;

/// Minimum similarity (exclusive) for a near-miss transcription to count.
pub const SIMILARITY_THRESHOLD: f64 = 0.6;

/// Which rule selected the option.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// The option text appears inside the transcript ("I'd say full time").
    Contains,
    /// The transcript is a close edit-distance neighbour of the option.
    Similarity,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum MatchResult {
    Matched {
        option: String,
        index: usize,
        score: f64,
        kind: MatchKind,
    },
    NoMatch,
}

impl MatchResult {
    pub fn option(&self) -> Option<&str> {
        match self {
            MatchResult::Matched { option, .. } => Some(option),
            MatchResult::NoMatch => None,
        }
    }
}

/// Selects the first option the transcript refers to.
///
/// The reported `score` is always `similarity(query, option)`, including for
/// containment hits where it is usually well below the threshold.
pub fn match_best<S: AsRef<str>>(query: &str, options: &[S]) -> MatchResult {
    let query_lower = query.to_lowercase();

    for (index, option) in options.iter().enumerate() {
        let option = option.as_ref();
        let score = similarity(&query_lower, option);

        let kind = if query_lower.contains(&option.to_lowercase()) {
            MatchKind::Contains
        } else if score > SIMILARITY_THRESHOLD {
            MatchKind::Similarity
        } else {
            continue;
        };

        debug!(option, index, score, ?kind, "voice transcript matched option");
        return MatchResult::Matched {
            option: option.to_string(),
            index,
            score,
            kind,
        };
    }

    debug!(
        query,
        option_count = options.len(),
        "voice transcript matched no option"
    );
    MatchResult::NoMatch
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPLOYMENT: [&str; 2] = ["Full Time", "Part Time"];

    #[test]
    fn test_containment_is_case_insensitive() {
        let result = match_best("I choose full time", &EMPLOYMENT);
        match result {
            MatchResult::Matched {
                option,
                index,
                kind,
                ..
            } => {
                assert_eq!(option, "Full Time");
                assert_eq!(index, 0);
                assert_eq!(kind, MatchKind::Contains);
            }
            MatchResult::NoMatch => panic!("expected a match"),
        }
    }

    #[test]
    fn test_near_miss_crosses_threshold() {
        // 7/9 ≈ 0.778 > 0.6
        let result = match_best("fuul tyme", &EMPLOYMENT);
        match result {
            MatchResult::Matched {
                option,
                score,
                kind,
                ..
            } => {
                assert_eq!(option, "Full Time");
                assert_eq!(kind, MatchKind::Similarity);
                assert!((score - 7.0 / 9.0).abs() < 1e-9, "Score was {score}");
            }
            MatchResult::NoMatch => panic!("expected a match"),
        }
    }

    #[test]
    fn test_unrelated_transcript_is_no_match() {
        assert_eq!(match_best("banana", &EMPLOYMENT), MatchResult::NoMatch);
    }

    #[test]
    fn test_empty_options_is_no_match() {
        let options: [&str; 0] = [];
        assert_eq!(match_best("full time", &options), MatchResult::NoMatch);
        assert_eq!(match_best("", &options), MatchResult::NoMatch);
    }

    #[test]
    fn test_empty_query_is_no_match() {
        assert_eq!(match_best("", &EMPLOYMENT), MatchResult::NoMatch);
    }

    #[test]
    fn test_empty_query_matches_empty_option() {
        let result = match_best("", &["Full Time", ""]);
        assert_eq!(result.option(), Some(""));
    }

    #[test]
    fn test_first_match_wins_over_higher_score() {
        // "drivr" vs "Drive": 4/5 = 0.8, vs "Driver": 5/6 ≈ 0.833
        let options = ["Drive", "Driver"];
        assert!(similarity("drivr", "Driver") > similarity("drivr", "Drive"));

        let result = match_best("drivr", &options);
        assert_eq!(result.option(), Some("Drive"));

        let reversed = ["Driver", "Drive"];
        assert_eq!(match_best("drivr", &reversed).option(), Some("Driver"));
    }

    #[test]
    fn test_threshold_is_exclusive() {
        // "abcde" vs "abcxy": 3/5 = 0.6 exactly
        assert_eq!(similarity("abcde", "abcxy"), 0.6);
        assert_eq!(match_best("abcde", &["abcxy"]), MatchResult::NoMatch);
        assert_eq!(match_best("abcde", &["abcdx"]).option(), Some("abcdx"));
    }

    #[test]
    fn test_spelled_out_number_matches_digit_option() {
        let options = [
            "Less than 1 year",
            "1 to 3 years",
            "3 to 5 years",
            "More than 5 years",
        ];
        match match_best("more than five years", &options) {
            MatchResult::Matched {
                option, index, kind, ..
            } => {
                assert_eq!(option, "More than 5 years");
                assert_eq!(index, 3);
                assert_eq!(kind, MatchKind::Similarity);
            }
            MatchResult::NoMatch => panic!("expected a match"),
        }
    }

    #[test]
    fn test_accepts_owned_options() {
        let options = vec!["Yes".to_string(), "No".to_string()];
        assert_eq!(match_best("no thanks", &options).option(), Some("No"));
    }

    #[test]
    fn test_serializes_with_result_tag() {
        let json = serde_json::to_value(match_best("part time please", &EMPLOYMENT)).unwrap();
        assert_eq!(json["result"], "matched");
        assert_eq!(json["option"], "Part Time");
        assert_eq!(json["kind"], "contains");

        let json = serde_json::to_value(MatchResult::NoMatch).unwrap();
        assert_eq!(json, serde_json::json!({ "result": "no_match" }));
    }
}
