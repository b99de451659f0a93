use std::collections::HashMap;

/// `count` out of `total` as a whole percentage, rounded to the nearest
/// integer with halves rounded up. An empty total gives zero.
pub fn percentage(count: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    // floor(100 * count / total + 1/2), without going through floats.
    let rounded = (200 * count + total) / (2 * total);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

/// Indices of the entries equal to the extreme value picked by `better`.
fn extreme_indices<T: Copy + PartialEq>(values: &[T], better: impl Fn(T, T) -> bool) -> Vec<usize> {
    let mut indices = Vec::new();
    let mut best: Option<T> = None;
    for (index, &value) in values.iter().enumerate() {
        match best {
            Some(b) if value == b => indices.push(index),
            Some(b) if !better(value, b) => {}
            _ => {
                best = Some(value);
                indices.clear();
                indices.push(index);
            }
        }
    }
    indices
}

/// Tally of a select question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectCount {
    /// Number of ballots ticking each choice.
    pub totals: Vec<u64>,
    /// Share of ballots ticking each choice.
    pub percentages: Vec<u32>,
    /// The most ticked choices.
    pub max_indices: Vec<usize>,
}

/// Count 0/1 select answers, one vector per ballot.
pub fn count_select(ballots: &[Vec<u32>]) -> SelectCount {
    let width = ballots.iter().map(Vec::len).max().unwrap_or(0);
    let mut totals = vec![0u64; width];
    for ballot in ballots {
        for (total, &selected) in totals.iter_mut().zip(ballot) {
            *total += u64::from(selected);
        }
    }
    let number = ballots.len() as u64;
    SelectCount {
        percentages: totals.iter().map(|&t| percentage(t, number)).collect(),
        max_indices: extreme_indices(&totals, |a, b| a > b),
        totals,
    }
}

/// Tally of a rank question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankCount {
    /// Sum over ballots of each choice's position (0 is best).
    pub position_sums: Vec<u64>,
    /// Score of each choice: 100 if every ballot ranked it first, 0 if every
    /// ballot ranked it last.
    pub percentages: Vec<u32>,
    /// The best ranked choices.
    pub min_indices: Vec<usize>,
}

/// Count rank answers, one vector of per-choice positions per ballot.
pub fn count_rank(ballots: &[Vec<i64>], choices: usize) -> RankCount {
    let mut position_sums = vec![0u64; choices];
    for ballot in ballots {
        for (sum, &position) in position_sums.iter_mut().zip(ballot) {
            // Positions outside the valid range are clamped into it.
            let position = position.clamp(0, choices.saturating_sub(1) as i64);
            *sum += position as u64;
        }
    }
    let number = ballots.len() as u64;
    let worst = choices.saturating_sub(1) as u64 * number;
    let percentages = position_sums
        .iter()
        .map(|&sum| {
            if number == 0 {
                0
            } else if worst == 0 {
                // A single choice is always ranked first.
                100
            } else {
                percentage(worst - sum, worst)
            }
        })
        .collect();
    RankCount {
        min_indices: extreme_indices(&position_sums, |a, b| a < b),
        position_sums,
        percentages,
    }
}

/// Tally of a free-text question over distinct normalised answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextCount {
    /// Distinct answers with their number of occurrences, first seen first.
    pub answers: Vec<(String, u64)>,
    /// Occurrences of each answer relative to the number of ballots.
    pub percentages: Vec<u32>,
    /// The most frequent answers.
    pub max_indices: Vec<usize>,
}

/// Answers compare equal regardless of surrounding space and case.
fn normalise(answer: &str) -> String {
    answer.trim().to_lowercase()
}

/// Count free-text answers, one vector of fields per ballot. Empty fields
/// are not answers.
pub fn count_text(ballots: &[Vec<String>]) -> TextCount {
    let mut answers: Vec<(String, u64)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for answer in ballots.iter().flatten() {
        let answer = normalise(answer);
        if answer.is_empty() {
            continue;
        }
        match positions.get(&answer) {
            Some(&position) => answers[position].1 += 1,
            None => {
                positions.insert(answer.clone(), answers.len());
                answers.push((answer, 1));
            }
        }
    }
    let number = ballots.len() as u64;
    let counts: Vec<u64> = answers.iter().map(|(_, count)| *count).collect();
    TextCount {
        percentages: counts.iter().map(|&c| percentage(c, number)).collect(),
        max_indices: extreme_indices(&counts, |a, b| a > b),
        answers,
    }
}
