//! Decrypted ballots and their aggregation per question.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::configuration::ElementId;

mod count;
mod export;

pub use count::{count_rank, count_select, count_text, percentage, RankCount, SelectCount, TextCount};
pub use export::{CandidateResult, DirectorySink, ExportSink, QuestionResults, ResultExport};

/// One decrypted ballot, as returned by the backend. Each pair lists the
/// question identifiers and, at the same index, that question's answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Results {
    #[serde(rename = "SelectResultIDs")]
    pub select_result_ids: Option<Vec<ElementId>>,
    #[serde(rename = "SelectResult")]
    pub select_result: Option<Vec<Vec<bool>>>,
    #[serde(rename = "RankResultIDs")]
    pub rank_result_ids: Option<Vec<ElementId>>,
    #[serde(rename = "RankResult")]
    pub rank_result: Option<Vec<Vec<i64>>>,
    #[serde(rename = "TextResultIDs")]
    pub text_result_ids: Option<Vec<ElementId>>,
    #[serde(rename = "TextResult")]
    pub text_result: Option<Vec<Vec<String>>>,
}

impl Results {
    /// Ballots the backend could not decode come back without identifiers.
    fn is_complete(&self) -> bool {
        self.select_result_ids.is_some()
            && self.rank_result_ids.is_some()
            && self.text_result_ids.is_some()
    }
}

/// Per-question answers of every ballot, in ballot arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedResults {
    /// Select answers as 0/1 so they can be summed.
    pub select: HashMap<ElementId, Vec<Vec<u32>>>,
    pub rank: HashMap<ElementId, Vec<Vec<i64>>>,
    pub text: HashMap<ElementId, Vec<Vec<String>>>,
}

impl GroupedResults {
    /// Group a list of ballots by question identifier.
    pub fn from_results(results: &[Results]) -> Self {
        let mut grouped = Self::default();
        for (index, ballot) in results.iter().enumerate() {
            if !ballot.is_complete() {
                warn!("Skipping incomplete ballot #{index}");
                continue;
            }
            group_by_id(
                &mut grouped.select,
                ballot.select_result_ids.as_deref(),
                ballot.select_result.as_deref(),
                |answer: &Vec<bool>| answer.iter().map(|&s| u32::from(s)).collect(),
            );
            group_by_id(
                &mut grouped.rank,
                ballot.rank_result_ids.as_deref(),
                ballot.rank_result.as_deref(),
                Vec::clone,
            );
            group_by_id(
                &mut grouped.text,
                ballot.text_result_ids.as_deref(),
                ballot.text_result.as_deref(),
                Vec::clone,
            );
        }
        grouped
    }

    /// Does any ballot answer the given question?
    pub fn has(&self, id: &str) -> bool {
        self.select.contains_key(id) || self.rank.contains_key(id) || self.text.contains_key(id)
    }
}

fn group_by_id<A, T>(
    grouped: &mut HashMap<ElementId, Vec<T>>,
    ids: Option<&[ElementId]>,
    answers: Option<&[A]>,
    convert: impl Fn(&A) -> T,
) {
    let ids = ids.unwrap_or_default();
    let answers = answers.unwrap_or_default();
    if ids.len() != answers.len() {
        warn!(
            "Ballot lists {} questions but {} answers; extra entries ignored",
            ids.len(),
            answers.len()
        );
    }
    for (id, answer) in ids.iter().zip(answers) {
        grouped.entry(id.clone()).or_default().push(convert(answer));
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl Results {
        /// A ballot for [`crate::model::configuration::Configuration::example`].
        pub fn example(q1: [bool; 3], q2: [i64; 3], q4: [bool; 4], q3: [&str; 2]) -> Self {
            Self {
                select_result_ids: Some(vec!["q1".to_string(), "q4".to_string()]),
                select_result: Some(vec![q1.to_vec(), q4.to_vec()]),
                rank_result_ids: Some(vec!["q2".to_string()]),
                rank_result: Some(vec![q2.to_vec()]),
                text_result_ids: Some(vec!["q3".to_string()]),
                text_result: Some(vec![q3.iter().map(|s| s.to_string()).collect()]),
            }
        }

        /// A ballot for [`crate::model::configuration::Configuration::yes_no_example`].
        pub fn yes_no_example(yes: bool) -> Self {
            Self {
                select_result_ids: Some(vec!["yes_no".to_string()]),
                select_result: Some(vec![vec![yes, !yes]]),
                rank_result_ids: Some(vec![]),
                rank_result: Some(vec![]),
                text_result_ids: Some(vec![]),
                text_result: Some(vec![]),
            }
        }
    }
}
