//! Reconciliation of model answers against the caller's queries
//!
//! The model may drop, reorder or rephrase entries. The output always has one
//! entry per input query, in input order.

use std::collections::HashMap;

use crate::request::QueryResponse;

/// Answer substituted when the model gave nothing usable for a query
pub const NO_ANSWER_PLACEHOLDER: &str = "No answer found for this query.";

/// Align model answers with the input queries
///
/// For each input position `i`:
/// 1. the model's entry at position `i`, if present with a non-empty
///    answer, is used as-is
/// 2. otherwise an entry whose query text matches exactly
/// 3. otherwise the fixed placeholder
///
/// # Examples
///
/// ```
/// use pdflens_domain::{reconcile_answers, QueryResponse, NO_ANSWER_PLACEHOLDER};
///
/// let queries = vec!["a?".to_string(), "b?".to_string()];
/// let replies = vec![QueryResponse::new("a?", "yes")];
///
/// let reconciled = reconcile_answers(&queries, &replies);
/// assert_eq!(reconciled.len(), 2);
/// assert_eq!(reconciled[1].answer, NO_ANSWER_PLACEHOLDER);
/// ```
pub fn reconcile_answers(queries: &[String], replies: &[QueryResponse]) -> Vec<QueryResponse> {
    let by_query: HashMap<&str, &str> = replies
        .iter()
        .map(|r| (r.query.as_str(), r.answer.as_str()))
        .collect();

    queries
        .iter()
        .enumerate()
        .map(|(i, query)| {
            if let Some(existing) = replies.get(i).filter(|r| !r.answer.is_empty()) {
                return existing.clone();
            }
            let answer = by_query
                .get(query.as_str())
                .copied()
                .filter(|a| !a.is_empty())
                .unwrap_or(NO_ANSWER_PLACEHOLDER);
            QueryResponse::new(query.clone(), answer)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queries(items: &[&str]) -> Vec<String> {
        items.iter().map(|q| q.to_string()).collect()
    }

    #[test]
    fn test_complete_reply_passes_through() {
        let qs = queries(&["q1", "q2"]);
        let replies = vec![QueryResponse::new("q1", "a1"), QueryResponse::new("q2", "a2")];
        assert_eq!(reconcile_answers(&qs, &replies), replies);
    }

    #[test]
    fn test_missing_third_answer_gets_placeholder() {
        let qs = queries(&["q1", "q2", "q3"]);
        let replies = vec![QueryResponse::new("q1", "a1"), QueryResponse::new("q2", "a2")];

        let reconciled = reconcile_answers(&qs, &replies);
        assert_eq!(reconciled.len(), 3);
        assert_eq!(reconciled[2].query, "q3");
        assert_eq!(reconciled[2].answer, NO_ANSWER_PLACEHOLDER);
    }

    #[test]
    fn test_positional_entry_wins_over_text_match() {
        let qs = queries(&["q1", "q2"]);
        let replies = vec![QueryResponse::new("q2", "a2")];

        let reconciled = reconcile_answers(&qs, &replies);
        assert_eq!(reconciled[0], QueryResponse::new("q2", "a2"));
        assert_eq!(reconciled[1], QueryResponse::new("q2", "a2"));
    }

    #[test]
    fn test_empty_answer_by_text_becomes_placeholder() {
        let qs = queries(&["q1", "q2"]);
        let replies = vec![QueryResponse::new("q2", "")];

        let reconciled = reconcile_answers(&qs, &replies);
        assert_eq!(reconciled[1].answer, NO_ANSWER_PLACEHOLDER);
    }

    #[test]
    fn test_empty_positional_answer_is_absent() {
        let qs = queries(&["Q?"]);
        let replies = vec![QueryResponse::new("Q?", "")];

        let reconciled = reconcile_answers(&qs, &replies);
        assert_eq!(reconciled, vec![QueryResponse::new("Q?", NO_ANSWER_PLACEHOLDER)]);
    }

    #[test]
    fn test_empty_positional_answer_falls_back_to_text_match() {
        let qs = queries(&["q1", "q2"]);
        let replies = vec![QueryResponse::new("q1", ""), QueryResponse::new("q1", "a1")];

        let reconciled = reconcile_answers(&qs, &replies);
        assert_eq!(reconciled[0], QueryResponse::new("q1", "a1"));
        assert_eq!(reconciled[1], QueryResponse::new("q1", "a1"));
    }

    #[test]
    fn test_no_replies() {
        let qs = queries(&["q1", "q2"]);
        let reconciled = reconcile_answers(&qs, &[]);
        assert!(reconciled.iter().all(|r| r.answer == NO_ANSWER_PLACEHOLDER));
        assert_eq!(reconciled[0].query, "q1");
        assert_eq!(reconciled[1].query, "q2");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn scenario() -> impl Strategy<Value = (Vec<String>, Vec<QueryResponse>)> {
        (1usize..8).prop_flat_map(|n| {
            let qs: Vec<String> = (0..n).map(|i| format!("question {}", i)).collect();
            (Just(qs), 0..=n, any::<u64>())
        })
        .prop_map(|(qs, k, seed)| {
            let mut replies: Vec<QueryResponse> = qs
                .iter()
                .take(k)
                .map(|q| QueryResponse::new(q.clone(), format!("answer to {}", q)))
                .collect();
            if !replies.is_empty() {
                let len = replies.len();
                replies.rotate_left((seed as usize) % len);
            }
            (qs, replies)
        })
    }

    proptest! {
        #[test]
        fn prop_length_and_order_preserved((qs, replies) in scenario()) {
            let reconciled = reconcile_answers(&qs, &replies);
            prop_assert_eq!(reconciled.len(), qs.len());

            for (i, entry) in reconciled.iter().enumerate() {
                if i < replies.len() {
                    prop_assert_eq!(entry, &replies[i]);
                } else {
                    prop_assert_eq!(&entry.query, &qs[i]);
                    let genuine = replies.iter().any(|r| r.query == qs[i] && r.answer == entry.answer);
                    prop_assert!(genuine || entry.answer == NO_ANSWER_PLACEHOLDER);
                }
            }
        }
    }
}
