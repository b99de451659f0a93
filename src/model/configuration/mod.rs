//! The ballot configuration tree.
//!
//! A configuration is only ever obtained by parsing the backend's JSON
//! description (see [`raw`]), which checks the structural invariants once.
//! After that the tree is treated as immutable: changing it means building
//! a new one.

use std::collections::HashMap;
use std::fmt::{Debug, Formatter};

use regex::Regex;

use crate::error::{Error, Result};

mod raw;

pub use raw::{RawConfiguration, RawRank, RawSelect, RawSubject, RawText};

/// Identifier of a subject or question, unique within a configuration.
pub type ElementId = String;

/// Subjects nested deeper than this are rejected as malformed.
pub const MAX_DEPTH: usize = 64;

/// A full ballot configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    /// Title of the whole ballot.
    pub main_title: String,
    /// Top-level subjects, in display order.
    pub scaffold: Vec<Subject>,
}

impl Configuration {
    /// Parse and check a configuration from its JSON description.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawConfiguration =
            serde_json::from_str(json).map_err(|e| Error::malformed(e.to_string()))?;
        raw.try_into()
    }

    /// Serialize back into the backend's JSON description.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_raw())?)
    }

    /// Find any element of the tree by its identifier.
    pub fn element(&self, id: &str) -> Option<&SubjectElement> {
        self.scaffold.iter().find_map(|subject| subject.find(id))
    }

    /// All questions of the tree, depth-first in display order.
    pub fn questions(&self) -> Vec<&SubjectElement> {
        let mut questions = Vec::new();
        for subject in &self.scaffold {
            subject.collect_questions(&mut questions);
        }
        questions
    }
}

/// A titled section of the ballot, possibly containing further subjects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub id: ElementId,
    pub title: String,
    /// Display order of the elements.
    pub order: Vec<ElementId>,
    pub elements: HashMap<ElementId, SubjectElement>,
}

impl Subject {
    /// The child elements in display order.
    pub fn elements_in_order(&self) -> impl Iterator<Item = &SubjectElement> + '_ {
        self.order.iter().filter_map(move |id| {
            let element = self.elements.get(id);
            if element.is_none() {
                warn!("Subject {} lists unknown element {id}", self.id);
            }
            element
        })
    }

    fn find(&self, id: &str) -> Option<&SubjectElement> {
        if let Some(element) = self.elements.get(id) {
            return Some(element);
        }
        self.elements.values().find_map(|element| match element {
            SubjectElement::Subject(subject) => subject.find(id),
            _ => None,
        })
    }

    fn collect_questions<'a>(&'a self, questions: &mut Vec<&'a SubjectElement>) {
        for element in self.elements_in_order() {
            match element {
                SubjectElement::Subject(subject) => subject.collect_questions(questions),
                question => questions.push(question),
            }
        }
    }
}

/// Any child of a subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubjectElement {
    Subject(Subject),
    Select(SelectQuestion),
    Rank(RankQuestion),
    Text(TextQuestion),
}

impl SubjectElement {
    pub fn id(&self) -> &str {
        match self {
            Self::Subject(s) => &s.id,
            Self::Select(q) => &q.id,
            Self::Rank(q) => &q.id,
            Self::Text(q) => &q.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Subject(s) => &s.title,
            Self::Select(q) => &q.title,
            Self::Rank(q) => &q.title,
            Self::Text(q) => &q.title,
        }
    }
}

/// Multiple-choice question: between `min_n` and `max_n` choices may be ticked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectQuestion {
    pub id: ElementId,
    pub title: String,
    pub choices: Vec<String>,
    pub min_n: usize,
    pub max_n: usize,
}

/// Ranking question: every choice gets a position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankQuestion {
    pub id: ElementId,
    pub title: String,
    pub choices: Vec<String>,
    pub min_n: usize,
    pub max_n: usize,
}

/// Free-text question. Each choice labels one input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextQuestion {
    pub id: ElementId,
    pub title: String,
    pub choices: Vec<String>,
    /// Bounds on the number of non-empty answers.
    pub min_n: usize,
    pub max_n: usize,
    /// Maximum number of characters per answer.
    pub max_length: usize,
    pub regex: Option<Pattern>,
}

/// A compiled answer pattern that compares by its source text.
#[derive(Clone)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(source: &str) -> Result<Self> {
        Regex::new(source)
            .map(Self)
            .map_err(|e| Error::malformed(format!("invalid regex {source:?}: {e}")))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Unanchored match, like the pattern test the voting UI performs.
    pub fn is_match(&self, answer: &str) -> bool {
        self.0.is_match(answer)
    }
}

impl Debug for Pattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Pattern({:?})", self.as_str())
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Pattern {}


#[cfg(test)]
mod tests {
    use super::*;

    fn ids(configuration: &Configuration) -> Vec<&str> {
        configuration.questions().into_iter().map(|q| q.id()).collect()
    }

    #[test]
    fn parse_example() {
        let configuration = Configuration::example();
        assert_eq!(configuration.main_title, "Life on the campus");
        assert_eq!(configuration.scaffold.len(), 1);
        assert_eq!(configuration.scaffold[0].order, vec!["q1", "s2", "q3"]);
        assert_eq!(ids(&configuration), vec!["q1", "q2", "q4", "q3"]);

        match configuration.element("q3") {
            Some(SubjectElement::Text(text)) => {
                assert_eq!(text.max_length, 20);
                assert_eq!(text.regex.as_ref().unwrap().as_str(), "^[a-zA-Z ]*$");
            }
            other => panic!("expected a text question, got {other:?}"),
        }
        match configuration.element("q4") {
            Some(SubjectElement::Select(select)) => {
                assert_eq!((select.min_n, select.max_n), (2, 3));
            }
            other => panic!("expected a select question, got {other:?}"),
        }
        assert!(matches!(
            configuration.element("s2"),
            Some(SubjectElement::Subject(_))
        ));
        assert!(configuration.element("nope").is_none());
    }

    #[test]
    fn round_trip() {
        let configuration = Configuration::example();
        let json = configuration.to_json().unwrap();
        let reparsed = Configuration::from_json(&json).unwrap();
        assert_eq!(configuration, reparsed);
        assert_eq!(ids(&configuration), ids(&reparsed));

        let configuration = Configuration::yes_no_example();
        let reparsed = Configuration::from_json(&configuration.to_json().unwrap()).unwrap();
        assert_eq!(configuration, reparsed);
    }

    #[test]
    fn empty_regex_means_no_pattern() {
        let json = r#"{"MainTitle": "t", "Scaffold": [{"ID": "s", "Title": "s", "Order": ["t"],
            "Texts": [{"ID": "t", "Title": "t", "MaxN": 1, "MinN": 0, "MaxLength": 5,
            "Regex": "", "Choices": ["a"]}]}]}"#;
        let configuration = Configuration::from_json(json).unwrap();
        match configuration.element("t") {
            Some(SubjectElement::Text(text)) => assert!(text.regex.is_none()),
            other => panic!("expected a text question, got {other:?}"),
        }
    }

    #[test]
    fn null_element_lists_are_empty() {
        let json = r#"{"MainTitle": "t", "Scaffold": [{"ID": "s", "Title": "s", "Order": [],
            "Subjects": null, "Selects": null, "Ranks": null, "Texts": null}]}"#;
        let configuration = Configuration::from_json(json).unwrap();
        assert!(configuration.scaffold[0].elements.is_empty());
    }

    fn assert_malformed(json: &str) {
        match Configuration::from_json(json) {
            Err(Error::MalformedConfiguration(_)) => {}
            other => panic!("expected a malformed configuration, got {other:?}"),
        }
    }

    #[test]
    fn reject_missing_field() {
        assert_malformed(r#"{"Scaffold": []}"#);
        assert_malformed(
            r#"{"MainTitle": "t", "Scaffold": [{"ID": "s", "Title": "s", "Order": ["q"],
            "Selects": [{"ID": "q", "Title": "q", "MaxN": 1, "Choices": ["a"]}]}]}"#,
        );
    }

    #[test]
    fn reject_duplicate_identifiers() {
        // Within one subject.
        assert_malformed(
            r#"{"MainTitle": "t", "Scaffold": [{"ID": "s", "Title": "s", "Order": ["q"],
            "Selects": [{"ID": "q", "Title": "q", "MaxN": 1, "MinN": 0, "Choices": ["a"]}],
            "Ranks": [{"ID": "q", "Title": "q", "MaxN": 1, "MinN": 0, "Choices": ["a"]}]}]}"#,
        );
        // Across nested subjects.
        assert_malformed(
            r#"{"MainTitle": "t", "Scaffold": [{"ID": "s", "Title": "s", "Order": ["q", "n"],
            "Selects": [{"ID": "q", "Title": "q", "MaxN": 1, "MinN": 0, "Choices": ["a"]}],
            "Subjects": [{"ID": "n", "Title": "n", "Order": ["q"],
                "Selects": [{"ID": "q", "Title": "q", "MaxN": 1, "MinN": 0, "Choices": ["a"]}]}]}]}"#,
        );
        // A question reusing a subject identifier.
        assert_malformed(
            r#"{"MainTitle": "t", "Scaffold": [{"ID": "s", "Title": "s", "Order": ["s"],
            "Selects": [{"ID": "s", "Title": "q", "MaxN": 1, "MinN": 0, "Choices": ["a"]}]}]}"#,
        );
    }

    #[test]
    fn reject_bad_order() {
        // Dangling reference.
        assert_malformed(
            r#"{"MainTitle": "t", "Scaffold": [{"ID": "s", "Title": "s", "Order": ["q", "x"],
            "Selects": [{"ID": "q", "Title": "q", "MaxN": 1, "MinN": 0, "Choices": ["a"]}]}]}"#,
        );
        // Element missing from the order.
        assert_malformed(
            r#"{"MainTitle": "t", "Scaffold": [{"ID": "s", "Title": "s", "Order": [],
            "Selects": [{"ID": "q", "Title": "q", "MaxN": 1, "MinN": 0, "Choices": ["a"]}]}]}"#,
        );
        // Listed twice.
        assert_malformed(
            r#"{"MainTitle": "t", "Scaffold": [{"ID": "s", "Title": "s", "Order": ["q", "q"],
            "Selects": [{"ID": "q", "Title": "q", "MaxN": 1, "MinN": 0, "Choices": ["a"]}]}]}"#,
        );
    }

    #[test]
    fn reject_inverted_bounds() {
        assert_malformed(
            r#"{"MainTitle": "t", "Scaffold": [{"ID": "s", "Title": "s", "Order": ["q"],
            "Selects": [{"ID": "q", "Title": "q", "MaxN": 1, "MinN": 2, "Choices": ["a", "b"]}]}]}"#,
        );
        assert_malformed(
            r#"{"MainTitle": "t", "Scaffold": [{"ID": "s", "Title": "s", "Order": ["q"],
            "Texts": [{"ID": "q", "Title": "q", "MaxN": 0, "MinN": 1, "MaxLength": 3,
            "Regex": "", "Choices": ["a"]}]}]}"#,
        );
    }

    #[test]
    fn reject_bad_regex() {
        assert_malformed(
            r#"{"MainTitle": "t", "Scaffold": [{"ID": "s", "Title": "s", "Order": ["q"],
            "Texts": [{"ID": "q", "Title": "q", "MaxN": 1, "MinN": 0, "MaxLength": 3,
            "Regex": "([a-z", "Choices": ["a"]}]}]}"#,
        );
    }

    #[test]
    fn reject_pathological_depth() {
        let mut subject = r#"{"ID": "leaf", "Title": "leaf", "Order": []}"#.to_string();
        for depth in 0..MAX_DEPTH {
            subject = format!(
                r#"{{"ID": "s{depth}", "Title": "t", "Order": ["{child}"], "Subjects": [{subject}]}}"#,
                child = if depth == 0 {
                    "leaf".to_string()
                } else {
                    format!("s{}", depth - 1)
                },
            );
        }
        let json = format!(r#"{{"MainTitle": "deep", "Scaffold": [{subject}]}}"#);
        // serde_json's own recursion limit may trip first; either way it is malformed.
        assert_malformed(&json);
    }
}
