use crate::model::configuration::{
    Configuration, RankQuestion, SelectQuestion, Subject, SubjectElement, TextQuestion,
};

use super::{Answers, ValidationError};

/// Check a select answer: the number of ticked choices must lie within the bounds.
pub fn check_select(question: &SelectQuestion, selected: &[bool]) -> Option<ValidationError> {
    let count = selected.iter().filter(|s| **s).count();
    if count < question.min_n {
        Some(ValidationError::MinSelect {
            min: question.min_n,
        })
    } else if count > question.max_n {
        Some(ValidationError::MaxSelect {
            max: question.max_n,
        })
    } else {
        None
    }
}

/// Check free-text answers. Every rule overwrites the same slot, so the
/// failure found last is the one reported.
pub fn check_text(question: &TextQuestion, texts: &[String]) -> Option<ValidationError> {
    let mut error = None;
    for answer in texts {
        if answer.chars().count() > question.max_length {
            error = Some(ValidationError::MaxTextChars {
                max_length: question.max_length,
            });
        }
        if let Some(pattern) = &question.regex {
            // Empty fields are never checked against the pattern.
            if !answer.is_empty() && !pattern.is_match(answer) {
                error = Some(ValidationError::RegexCheck {
                    pattern: pattern.as_str().to_string(),
                });
            }
        }
    }
    let filled = texts.iter().filter(|t| !t.is_empty()).count();
    if filled < question.min_n {
        error = Some(ValidationError::MinText {
            min: question.min_n,
        });
    }
    error
}

/// Check a ranking. No ranking constraints are enforced yet beyond the
/// ranking being a permutation of the choice indices.
pub fn check_rank(question: &RankQuestion, ranking: &[usize]) -> Option<ValidationError> {
    let mut seen = vec![false; question.choices.len()];
    let is_permutation = ranking.len() == seen.len()
        && ranking
            .iter()
            .all(|&choice| choice < seen.len() && !std::mem::replace(&mut seen[choice], true));
    if is_permutation {
        None
    } else {
        Some(ValidationError::RankPermutation)
    }
}

/// Validate a copy of the answers, returning whether the whole ballot is
/// valid along with the refreshed error slots.
pub fn ballot_is_valid(configuration: &Configuration, answers: &Answers) -> (bool, Answers) {
    let mut answers = answers.clone();
    let valid = answers.validate(configuration);
    (valid, answers)
}

impl Answers {
    /// Validate every question of the configuration, at every depth,
    /// refreshing all error slots. Returns true iff every question is valid.
    pub fn validate(&mut self, configuration: &Configuration) -> bool {
        let mut valid = true;
        for subject in &configuration.scaffold {
            // No short-circuit: every slot must be refreshed.
            valid &= self.validate_subject(subject);
        }
        debug!("Ballot for {:?} valid: {valid}", configuration.main_title);
        valid
    }

    fn validate_subject(&mut self, subject: &Subject) -> bool {
        let mut valid = true;
        for element in subject.elements_in_order() {
            let error = match element {
                SubjectElement::Subject(nested) => {
                    valid &= self.validate_subject(nested);
                    continue;
                }
                SubjectElement::Select(q) => {
                    let selected = self.select_answers.get(&q.id).map(Vec::as_slice);
                    check_select(q, selected.unwrap_or_default())
                }
                SubjectElement::Rank(q) => {
                    let ranking = self.rank_answers.get(&q.id).map(Vec::as_slice);
                    check_rank(q, ranking.unwrap_or_default())
                }
                SubjectElement::Text(q) => {
                    let texts = self.text_answers.get(&q.id).map(Vec::as_slice);
                    check_text(q, texts.unwrap_or_default())
                }
            };
            if let Some(ref e) = error {
                trace!("Question {} rejected: {e:?}", element.id());
                valid = false;
            }
            self.errors.insert(element.id().to_string(), error);
        }
        valid
    }
}
