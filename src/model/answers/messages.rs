use std::fmt::{Display, Formatter};

/// Why a single question's answer is currently rejected.
///
/// Only one error is kept per question; when several rules fail the last
/// one checked wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Fewer choices ticked than the question requires.
    MinSelect { min: usize },
    /// More choices ticked than the question allows.
    MaxSelect { max: usize },
    /// A free-text answer is too long.
    MaxTextChars { max_length: usize },
    /// A non-empty free-text answer does not match the configured pattern.
    RegexCheck { pattern: String },
    /// Fewer non-empty free-text answers than required.
    MinText { min: usize },
    /// The ranking is not a permutation of the choices.
    RankPermutation,
}

/// Maps a message key and its named arguments to display text.
pub trait Translate {
    fn translate(&self, key: &str, args: &[(&str, String)]) -> String;
}

impl ValidationError {
    /// Render through the given translations.
    pub fn message(&self, translate: &dyn Translate) -> String {
        let answers = |n: usize| {
            let key = if n > 1 {
                "pluralAnswers"
            } else {
                "singularAnswer"
            };
            translate.translate(key, &[])
        };
        match self {
            Self::MinSelect { min } => translate.translate(
                "minSelectError",
                &[("min", min.to_string()), ("singularPlural", answers(*min))],
            ),
            Self::MaxSelect { max } => translate.translate(
                "maxSelectError",
                &[("max", max.to_string()), ("singularPlural", answers(*max))],
            ),
            Self::MaxTextChars { max_length } => {
                translate.translate("maxTextChars", &[("maxLength", max_length.to_string())])
            }
            Self::RegexCheck { pattern } => {
                translate.translate("regexpCheck", &[("regexp", pattern.clone())])
            }
            Self::MinText { min } => translate.translate(
                "minTextError",
                &[("minText", min.to_string()), ("singularPlural", answers(*min))],
            ),
            Self::RankPermutation => translate.translate("rankPermutation", &[]),
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message(&EnglishMessages))
    }
}

/// Built-in English messages, used when the front end supplies no translations.
#[derive(Debug, Copy, Clone, Default)]
pub struct EnglishMessages;

impl EnglishMessages {
    fn template(key: &str) -> Option<&'static str> {
        Some(match key {
            "minSelectError" => "Select at least {min} {singularPlural}.",
            "maxSelectError" => "Select at most {max} {singularPlural}.",
            "maxTextChars" => "Answers are limited to {maxLength} characters.",
            "regexpCheck" => "Answers must match the pattern {regexp}.",
            "minTextError" => "Fill in at least {minText} {singularPlural}.",
            "rankPermutation" => "Every choice must be given a distinct rank.",
            "singularAnswer" => "answer",
            "pluralAnswers" => "answers",
            _ => return None,
        })
    }
}

impl Translate for EnglishMessages {
    fn translate(&self, key: &str, args: &[(&str, String)]) -> String {
        let Some(template) = Self::template(key) else {
            warn!("No English message for key {key}");
            return key.to_string();
        };
        args.iter().fold(template.to_string(), |text, (name, value)| {
            text.replace(&format!("{{{name}}}"), value)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singular_and_plural() {
        assert_eq!(
            ValidationError::MinSelect { min: 1 }.to_string(),
            "Select at least 1 answer."
        );
        assert_eq!(
            ValidationError::MinSelect { min: 2 }.to_string(),
            "Select at least 2 answers."
        );
        assert_eq!(
            ValidationError::MinText { min: 3 }.to_string(),
            "Fill in at least 3 answers."
        );
    }

    #[test]
    fn arguments_are_substituted() {
        assert_eq!(
            ValidationError::RegexCheck {
                pattern: "^[0-9]+$".to_string()
            }
            .to_string(),
            "Answers must match the pattern ^[0-9]+$."
        );
        assert_eq!(
            ValidationError::MaxTextChars { max_length: 10 }.to_string(),
            "Answers are limited to 10 characters."
        );
    }

    struct Keys;

    impl Translate for Keys {
        fn translate(&self, key: &str, args: &[(&str, String)]) -> String {
            let args: Vec<String> = args.iter().map(|(k, v)| format!("{k}={v}")).collect();
            format!("{key}({})", args.join(","))
        }
    }

    #[test]
    fn custom_translations() {
        assert_eq!(
            ValidationError::MaxSelect { max: 1 }.message(&Keys),
            "maxSelectError(max=1,singularPlural=singularAnswer())"
        );
        assert_eq!(
            ValidationError::RankPermutation.message(&Keys),
            "rankPermutation()"
        );
    }
}
