use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::configuration::{Configuration, Subject, SubjectElement};

use super::{count_rank, count_select, count_text, GroupedResults};

/// Name of the downloaded results file.
pub const EXPORT_FILE_NAME: &str = "result.json";

/// Destination of exported files, e.g. a browser download or a directory.
pub trait ExportSink {
    fn save(&mut self, file_name: &str, bytes: &[u8]) -> std::io::Result<()>;
}

/// Writes exported files into a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ExportSink for DirectorySink {
    fn save(&mut self, file_name: &str, bytes: &[u8]) -> std::io::Result<()> {
        let path = self.dir.join(file_name);
        fs::write(&path, bytes)?;
        info!("Exported results to {}", path.display());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CandidateResult {
    pub candidate: String,
    /// Whole percentage followed by `%`.
    pub percentage: String,
}

impl CandidateResult {
    fn new(candidate: impl Into<String>, percentage: u32) -> Self {
        Self {
            candidate: candidate.into(),
            percentage: format!("{percentage}%"),
        }
    }
}

/// One line of the export: a subject title on its own, or a question with its results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QuestionResults {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<CandidateResult>>,
}

/// The downloadable results document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResultExport {
    pub title: String,
    pub number_of_votes: usize,
    pub results: Vec<QuestionResults>,
}

impl ResultExport {
    /// Walk the configuration in display order and attach each question's percentages.
    pub fn build(
        configuration: &Configuration,
        grouped: &GroupedResults,
        number_of_votes: usize,
    ) -> Self {
        let mut results = Vec::new();
        for subject in &configuration.scaffold {
            collect_subject(subject, grouped, &mut results);
        }
        Self {
            title: configuration.main_title.clone(),
            number_of_votes,
            results,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Hand the document to the sink as `result.json`.
    pub fn save(&self, sink: &mut dyn ExportSink) -> Result<()> {
        sink.save(EXPORT_FILE_NAME, self.to_json()?.as_bytes())?;
        Ok(())
    }
}

fn collect_subject(subject: &Subject, grouped: &GroupedResults, out: &mut Vec<QuestionResults>) {
    out.push(QuestionResults {
        title: subject.title.clone(),
        results: None,
    });
    for element in subject.elements_in_order() {
        let results: Vec<CandidateResult> = match element {
            SubjectElement::Subject(nested) => {
                collect_subject(nested, grouped, out);
                continue;
            }
            SubjectElement::Select(q) => match grouped.select.get(&q.id) {
                Some(ballots) => q
                    .choices
                    .iter()
                    .zip(count_select(ballots).percentages)
                    .map(|(choice, percent)| CandidateResult::new(choice, percent))
                    .collect(),
                None => continue,
            },
            SubjectElement::Rank(q) => match grouped.rank.get(&q.id) {
                Some(ballots) => q
                    .choices
                    .iter()
                    .zip(count_rank(ballots, q.choices.len()).percentages)
                    .map(|(choice, percent)| CandidateResult::new(choice, percent))
                    .collect(),
                None => continue,
            },
            SubjectElement::Text(q) => match grouped.text.get(&q.id) {
                Some(ballots) => {
                    let count = count_text(ballots);
                    count
                        .answers
                        .into_iter()
                        .zip(count.percentages)
                        .map(|((answer, _), percent)| CandidateResult::new(answer, percent))
                        .collect()
                }
                None => continue,
            },
        };
        out.push(QuestionResults {
            title: element.title().to_string(),
            results: Some(results),
        });
    }
}
