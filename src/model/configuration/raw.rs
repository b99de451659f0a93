use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

use super::{
    Configuration, ElementId, Pattern, RankQuestion, SelectQuestion, Subject, SubjectElement,
    TextQuestion, MAX_DEPTH,
};

/// Configuration exactly as exchanged with the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawConfiguration {
    pub main_title: String,
    pub scaffold: Vec<RawSubject>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawSubject {
    #[serde(rename = "ID")]
    pub id: ElementId,
    pub title: String,
    pub order: Vec<ElementId>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub subjects: Vec<RawSubject>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub selects: Vec<RawSelect>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub ranks: Vec<RawRank>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub texts: Vec<RawText>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawSelect {
    #[serde(rename = "ID")]
    pub id: ElementId,
    pub title: String,
    pub max_n: usize,
    pub min_n: usize,
    pub choices: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawRank {
    #[serde(rename = "ID")]
    pub id: ElementId,
    pub title: String,
    pub max_n: usize,
    pub min_n: usize,
    pub choices: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawText {
    #[serde(rename = "ID")]
    pub id: ElementId,
    pub title: String,
    pub max_n: usize,
    pub min_n: usize,
    pub max_length: usize,
    /// Empty when answers are unconstrained.
    #[serde(default)]
    pub regex: String,
    pub choices: Vec<String>,
}

/// The backend sends `null` rather than `[]` for empty element lists.
fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl TryFrom<RawConfiguration> for Configuration {
    type Error = Error;

    fn try_from(raw: RawConfiguration) -> Result<Self> {
        let mut seen = HashSet::new();
        let scaffold = raw
            .scaffold
            .into_iter()
            .map(|subject| subject.into_subject(&mut seen, 1))
            .collect::<Result<Vec<_>>>()?;
        debug!(
            "Parsed configuration {:?} with {} identifiers",
            raw.main_title,
            seen.len()
        );
        Ok(Self {
            main_title: raw.main_title,
            scaffold,
        })
    }
}

/// Configurations embedded in other documents go through the same checks.
impl<'de> Deserialize<'de> for Configuration {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        RawConfiguration::deserialize(deserializer)?
            .try_into()
            .map_err(serde::de::Error::custom)
    }
}

impl Serialize for Configuration {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_raw().serialize(serializer)
    }
}

/// Record an identifier, failing if it was already used anywhere in the tree.
fn claim(seen: &mut HashSet<ElementId>, id: &str) -> Result<()> {
    if !seen.insert(id.to_string()) {
        return Err(Error::malformed(format!("duplicate identifier {id}")));
    }
    Ok(())
}

fn check_bounds(id: &str, min_n: usize, max_n: usize) -> Result<()> {
    if min_n > max_n {
        return Err(Error::malformed(format!(
            "question {id} has MinN {min_n} greater than MaxN {max_n}"
        )));
    }
    Ok(())
}

impl RawSubject {
    fn into_subject(self, seen: &mut HashSet<ElementId>, depth: usize) -> Result<Subject> {
        if depth > MAX_DEPTH {
            return Err(Error::malformed(format!(
                "subject {} is nested deeper than {MAX_DEPTH} levels",
                self.id
            )));
        }
        claim(seen, &self.id)?;

        let mut elements = HashMap::new();
        for subject in self.subjects {
            let subject = subject.into_subject(seen, depth + 1)?;
            elements.insert(subject.id.clone(), SubjectElement::Subject(subject));
        }
        for select in self.selects {
            claim(seen, &select.id)?;
            check_bounds(&select.id, select.min_n, select.max_n)?;
            elements.insert(
                select.id.clone(),
                SubjectElement::Select(SelectQuestion {
                    id: select.id,
                    title: select.title,
                    choices: select.choices,
                    min_n: select.min_n,
                    max_n: select.max_n,
                }),
            );
        }
        for rank in self.ranks {
            claim(seen, &rank.id)?;
            check_bounds(&rank.id, rank.min_n, rank.max_n)?;
            elements.insert(
                rank.id.clone(),
                SubjectElement::Rank(RankQuestion {
                    id: rank.id,
                    title: rank.title,
                    choices: rank.choices,
                    min_n: rank.min_n,
                    max_n: rank.max_n,
                }),
            );
        }
        for text in self.texts {
            claim(seen, &text.id)?;
            check_bounds(&text.id, text.min_n, text.max_n)?;
            let regex = if text.regex.is_empty() {
                None
            } else {
                Some(Pattern::new(&text.regex)?)
            };
            elements.insert(
                text.id.clone(),
                SubjectElement::Text(TextQuestion {
                    id: text.id,
                    title: text.title,
                    choices: text.choices,
                    min_n: text.min_n,
                    max_n: text.max_n,
                    max_length: text.max_length,
                    regex,
                }),
            );
        }

        // Every element is displayed exactly once.
        let mut listed = HashSet::with_capacity(self.order.len());
        for id in &self.order {
            if !elements.contains_key(id) {
                return Err(Error::malformed(format!(
                    "subject {} orders unknown element {id}",
                    self.id
                )));
            }
            if !listed.insert(id) {
                return Err(Error::malformed(format!(
                    "subject {} orders element {id} twice",
                    self.id
                )));
            }
        }
        if listed.len() != elements.len() {
            return Err(Error::malformed(format!(
                "subject {} has elements missing from its order",
                self.id
            )));
        }

        Ok(Subject {
            id: self.id,
            title: self.title,
            order: self.order,
            elements,
        })
    }
}

impl Configuration {
    /// Convert back into the wire representation.
    pub fn to_raw(&self) -> RawConfiguration {
        RawConfiguration {
            main_title: self.main_title.clone(),
            scaffold: self.scaffold.iter().map(Subject::to_raw).collect(),
        }
    }
}

impl Subject {
    fn to_raw(&self) -> RawSubject {
        let mut raw = RawSubject {
            id: self.id.clone(),
            title: self.title.clone(),
            order: self.order.clone(),
            subjects: Vec::new(),
            selects: Vec::new(),
            ranks: Vec::new(),
            texts: Vec::new(),
        };
        for element in self.elements_in_order() {
            match element {
                SubjectElement::Subject(subject) => raw.subjects.push(subject.to_raw()),
                SubjectElement::Select(q) => raw.selects.push(RawSelect {
                    id: q.id.clone(),
                    title: q.title.clone(),
                    max_n: q.max_n,
                    min_n: q.min_n,
                    choices: q.choices.clone(),
                }),
                SubjectElement::Rank(q) => raw.ranks.push(RawRank {
                    id: q.id.clone(),
                    title: q.title.clone(),
                    max_n: q.max_n,
                    min_n: q.min_n,
                    choices: q.choices.clone(),
                }),
                SubjectElement::Text(q) => raw.texts.push(RawText {
                    id: q.id.clone(),
                    title: q.title.clone(),
                    max_n: q.max_n,
                    min_n: q.min_n,
                    max_length: q.max_length,
                    regex: q
                        .regex
                        .as_ref()
                        .map(|p| p.as_str().to_string())
                        .unwrap_or_default(),
                    choices: q.choices.clone(),
                }),
            }
        }
        raw
    }
}
