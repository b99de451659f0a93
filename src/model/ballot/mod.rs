//! Plaintext ballot encoding.
//!
//! A ballot is encoded as one line per question, in display order:
//!
//! ```text
//! select:<id>:<0|1>,<0|1>,...
//! rank:<id>:<position of choice 0>,<position of choice 1>,...
//! text:<id>:<base64 answer>,<base64 answer>,...
//! ```
//!
//! The encoded ballot is then zero-padded and cut into the fixed-size chunks
//! the backend encrypts one by one.

use data_encoding::BASE64;

use crate::error::{Error, Result};
use crate::model::answers::Answers;
use crate::model::configuration::{Configuration, SubjectElement};
use crate::model::election::ElectionInfo;

/// Encode the answers to every question of the configuration. Questions
/// missing from the store are encoded as blank answers.
pub fn encode_ballot(configuration: &Configuration, answers: &Answers) -> String {
    let mut encoded = String::new();
    for question in configuration.questions() {
        let line = match question {
            SubjectElement::Select(q) => {
                let selected = answers.select_answers.get(&q.id);
                let values: Vec<&str> = (0..q.choices.len())
                    .map(|i| match selected.and_then(|s| s.get(i)) {
                        Some(true) => "1",
                        _ => "0",
                    })
                    .collect();
                format!("select:{}:{}", q.id, values.join(","))
            }
            SubjectElement::Rank(q) => {
                // The store lists choices best first; the ballot lists positions per choice.
                let mut positions: Vec<usize> = (0..q.choices.len()).collect();
                if let Some(ranking) = answers.rank_answers.get(&q.id) {
                    for (position, &choice) in ranking.iter().enumerate() {
                        if let Some(slot) = positions.get_mut(choice) {
                            *slot = position;
                        }
                    }
                }
                let values: Vec<String> = positions.iter().map(usize::to_string).collect();
                format!("rank:{}:{}", q.id, values.join(","))
            }
            SubjectElement::Text(q) => {
                let texts = answers.text_answers.get(&q.id);
                let values: Vec<String> = (0..q.choices.len())
                    .map(|i| {
                        let answer = texts.and_then(|t| t.get(i)).map_or("", String::as_str);
                        BASE64.encode(answer.as_bytes())
                    })
                    .collect();
                format!("text:{}:{}", q.id, values.join(","))
            }
            SubjectElement::Subject(_) => continue,
        };
        encoded.push_str(&line);
        encoded.push('\n');
    }
    trace!("Encoded ballot: {encoded:?}");
    encoded
}

/// Zero-pad an encoded ballot and cut it into `chunks_per_ballot` chunks of
/// `ceil(ballot_size / chunks_per_ballot)` bytes each.
pub fn chunk_ballot(
    encoded: &str,
    ballot_size: usize,
    chunks_per_ballot: usize,
) -> Result<Vec<Vec<u8>>> {
    if chunks_per_ballot == 0 {
        return Err(Error::malformed("election allows no ballot chunks"));
    }
    let bytes = encoded.as_bytes();
    if bytes.len() > ballot_size {
        return Err(Error::BallotTooLarge {
            size: bytes.len(),
            max: ballot_size,
        });
    }
    let chunk_size = (ballot_size + chunks_per_ballot - 1) / chunks_per_ballot;
    let mut padded = bytes.to_vec();
    padded.resize(chunk_size * chunks_per_ballot, 0);
    Ok(padded
        .chunks(chunk_size.max(1))
        .take(chunks_per_ballot)
        .map(<[u8]>::to_vec)
        .collect())
}

/// Check, encode and chunk a ballot for `POST /evoting/elections/{id}/vote`.
pub fn prepare_ballot(election: &ElectionInfo, answers: &Answers) -> Result<Vec<Vec<u8>>> {
    let mut checked = answers.clone();
    if !checked.validate(&election.configuration) {
        return Err(Error::InvalidBallot);
    }
    let encoded = encode_ballot(&election.configuration, &checked);
    chunk_ballot(&encoded, election.ballot_size, election.chunks_per_ballot)
}
