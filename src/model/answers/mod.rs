//! A voter's in-progress answers for one ballot-casting session.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::model::configuration::{
    Configuration, ElementId, RankQuestion, SelectQuestion, SubjectElement, TextQuestion,
};

mod messages;
mod validate;

pub use messages::{EnglishMessages, Translate, ValidationError};
pub use validate::{ballot_is_valid, check_rank, check_select, check_text};

/// Answers keyed by question, plus one error slot per question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Answers {
    /// One flag per choice.
    pub select_answers: HashMap<ElementId, Vec<bool>>,
    /// Choice indices, best ranked first.
    pub rank_answers: HashMap<ElementId, Vec<usize>>,
    /// One entry per text field.
    pub text_answers: HashMap<ElementId, Vec<String>>,
    /// Current error of each question, `None` when there is nothing to report.
    pub errors: HashMap<ElementId, Option<ValidationError>>,
}

impl Answers {
    /// Blank answers shaped after the given configuration.
    pub fn empty_for(configuration: &Configuration) -> Self {
        let mut answers = Self::default();
        for question in configuration.questions() {
            match question {
                SubjectElement::Select(q) => {
                    answers
                        .select_answers
                        .insert(q.id.clone(), vec![false; q.choices.len()]);
                }
                SubjectElement::Rank(q) => {
                    answers
                        .rank_answers
                        .insert(q.id.clone(), (0..q.choices.len()).collect());
                }
                SubjectElement::Text(q) => {
                    answers
                        .text_answers
                        .insert(q.id.clone(), vec![String::new(); q.choices.len()]);
                }
                SubjectElement::Subject(_) => continue,
            }
            answers.errors.insert(question.id().to_string(), None);
        }
        answers
    }

    /// Tick or untick one choice. Questions allowing a single choice behave
    /// like radio buttons.
    pub fn set_select(
        &mut self,
        question: &SelectQuestion,
        choice: usize,
        checked: bool,
    ) -> Result<()> {
        let selected = self
            .select_answers
            .get_mut(&question.id)
            .ok_or_else(|| Error::UnknownAnswer(question.id.clone()))?;
        if choice >= selected.len() {
            return Err(Error::UnknownAnswer(format!("{}[{choice}]", question.id)));
        }
        if checked && question.max_n == 1 {
            selected.iter_mut().for_each(|s| *s = false);
        }
        selected[choice] = checked;
        self.errors.insert(question.id.clone(), None);
        Ok(())
    }

    /// Replace the whole ranking of a question.
    pub fn set_rank(&mut self, question: &RankQuestion, ranking: Vec<usize>) -> Result<()> {
        if !self.rank_answers.contains_key(&question.id) {
            return Err(Error::UnknownAnswer(question.id.clone()));
        }
        self.rank_answers.insert(question.id.clone(), ranking);
        self.errors.insert(question.id.clone(), None);
        Ok(())
    }

    /// Move the choice ranked at `from` to rank `to`, shifting the others.
    pub fn move_rank(&mut self, question: &RankQuestion, from: usize, to: usize) -> Result<()> {
        let ranking = self
            .rank_answers
            .get_mut(&question.id)
            .ok_or_else(|| Error::UnknownAnswer(question.id.clone()))?;
        if from >= ranking.len() || to >= ranking.len() {
            return Err(Error::UnknownAnswer(format!(
                "{}[{from} -> {to}]",
                question.id
            )));
        }
        let choice = ranking.remove(from);
        ranking.insert(to, choice);
        self.errors.insert(question.id.clone(), None);
        Ok(())
    }

    /// Store one trimmed text field. The previous error is cleared and the
    /// pattern is checked again straight away.
    pub fn set_text(&mut self, question: &TextQuestion, field: usize, value: &str) -> Result<()> {
        let texts = self
            .text_answers
            .get_mut(&question.id)
            .ok_or_else(|| Error::UnknownAnswer(question.id.clone()))?;
        let slot = texts
            .get_mut(field)
            .ok_or_else(|| Error::UnknownAnswer(format!("{}[{field}]", question.id)))?;
        *slot = value.trim().to_string();

        let mut error = None;
        if let Some(pattern) = &question.regex {
            if texts.iter().any(|t| !t.is_empty() && !pattern.is_match(t)) {
                error = Some(ValidationError::RegexCheck {
                    pattern: pattern.as_str().to_string(),
                });
            }
        }
        self.errors.insert(question.id.clone(), error);
        Ok(())
    }

    /// Current error of a question, if any.
    pub fn error(&self, id: &str) -> Option<&ValidationError> {
        self.errors.get(id).and_then(Option::as_ref)
    }

    /// Current error message of a question, empty when there is no error.
    pub fn error_message(&self, id: &str, translate: &dyn Translate) -> String {
        self.error(id)
            .map(|e| e.message(translate))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select(configuration: &Configuration, id: &str) -> SelectQuestion {
        match configuration.element(id) {
            Some(SubjectElement::Select(q)) => q.clone(),
            other => panic!("expected a select question, got {other:?}"),
        }
    }

    fn text(configuration: &Configuration, id: &str) -> TextQuestion {
        match configuration.element(id) {
            Some(SubjectElement::Text(q)) => q.clone(),
            other => panic!("expected a text question, got {other:?}"),
        }
    }

    fn rank(configuration: &Configuration, id: &str) -> RankQuestion {
        match configuration.element(id) {
            Some(SubjectElement::Rank(q)) => q.clone(),
            other => panic!("expected a rank question, got {other:?}"),
        }
    }

    #[test]
    fn empty_answers_follow_the_configuration() {
        let answers = Answers::empty_for(&Configuration::example());
        assert_eq!(answers.select_answers["q1"], vec![false; 3]);
        assert_eq!(answers.select_answers["q4"], vec![false; 4]);
        assert_eq!(answers.rank_answers["q2"], vec![0, 1, 2]);
        assert_eq!(answers.text_answers["q3"], vec!["", ""]);
        assert_eq!(answers.errors.len(), 4);
        assert!(answers.errors.values().all(Option::is_none));
    }

    #[test]
    fn single_choice_select_is_a_radio() {
        let configuration = Configuration::example();
        let q1 = select(&configuration, "q1");
        let mut answers = Answers::empty_for(&configuration);

        answers.set_select(&q1, 0, true).unwrap();
        answers.set_select(&q1, 2, true).unwrap();
        assert_eq!(answers.select_answers["q1"], vec![false, false, true]);

        let q4 = select(&configuration, "q4");
        answers.set_select(&q4, 0, true).unwrap();
        answers.set_select(&q4, 3, true).unwrap();
        assert_eq!(answers.select_answers["q4"], vec![true, false, false, true]);
        answers.set_select(&q4, 0, false).unwrap();
        assert_eq!(answers.select_answers["q4"], vec![false, false, false, true]);

        assert!(matches!(
            answers.set_select(&q4, 4, true),
            Err(Error::UnknownAnswer(_))
        ));
    }

    #[test]
    fn text_input_rechecks_pattern() {
        let configuration = Configuration::example();
        let q3 = text(&configuration, "q3");
        let mut answers = Answers::empty_for(&configuration);

        answers.set_text(&q3, 0, "  more trees ").unwrap();
        assert_eq!(answers.text_answers["q3"][0], "more trees");
        assert_eq!(answers.error("q3"), None);

        answers.set_text(&q3, 1, "42 benches").unwrap();
        assert_eq!(
            answers.error("q3"),
            Some(&ValidationError::RegexCheck {
                pattern: "^[a-zA-Z ]*$".to_string()
            })
        );

        answers.set_text(&q3, 1, "").unwrap();
        assert_eq!(answers.error("q3"), None);
        assert_eq!(answers.error_message("q3", &EnglishMessages), "");

        assert!(matches!(
            answers.set_text(&q3, 2, "x"),
            Err(Error::UnknownAnswer(_))
        ));
    }

    #[test]
    fn move_rank_shifts_choices() {
        let configuration = Configuration::example();
        let q2 = rank(&configuration, "q2");
        let mut answers = Answers::empty_for(&configuration);

        answers.move_rank(&q2, 2, 0).unwrap();
        assert_eq!(answers.rank_answers["q2"], vec![2, 0, 1]);
        answers.move_rank(&q2, 0, 1).unwrap();
        assert_eq!(answers.rank_answers["q2"], vec![0, 2, 1]);
        assert!(answers.move_rank(&q2, 3, 0).is_err());
    }

    #[test]
    fn input_clears_error() {
        let configuration = Configuration::example();
        let q1 = select(&configuration, "q1");
        let mut answers = Answers::empty_for(&configuration);
        answers
            .errors
            .insert("q1".to_string(), Some(ValidationError::MinSelect { min: 1 }));

        answers.set_select(&q1, 1, true).unwrap();
        assert_eq!(answers.error("q1"), None);
    }
}
