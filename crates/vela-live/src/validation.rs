//! Validation outcomes for user input.
//!
//! A validator is nothing special: it is a `LiveExpression<ValidationResult>`
//! computed from the model's live values and refreshed through the usual
//! dependency hooks, so a dialog can bind one listener to it and always show
//! the current verdict.

use crate::expr::LiveExpression;

/// The outcome of validating a piece of user input, ordered by severity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValidationResult {
    /// The input is acceptable.
    Ok,
    Info(String),
    Warning(String),
    Error(String),
}

impl ValidationResult {
    pub fn info(message: impl Into<String>) -> Self {
        Self::Info(message.into())
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::Warning(message.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    /// The message carried by a non-`Ok` result.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Ok => None,
            Self::Info(message) | Self::Warning(message) | Self::Error(message) => Some(message),
        }
    }

    /// Picks the most severe result; the first wins among equals.
    pub fn worst_of(results: impl IntoIterator<Item = ValidationResult>) -> ValidationResult {
        results.into_iter().fold(Self::Ok, |worst, result| {
            if result.severity() > worst.severity() {
                result
            } else {
                worst
            }
        })
    }

    fn severity(&self) -> u8 {
        match self {
            Self::Ok => 0,
            Self::Info(_) => 1,
            Self::Warning(_) => 2,
            Self::Error(_) => 3,
        }
    }
}

/// A live validation node computed by `check`.
///
/// `check` runs once here to seed the value; chain
/// [`depends_on`](LiveExpression::depends_on) with the inputs it reads so
/// it re-runs when they change.
pub fn validator<F>(check: F) -> LiveExpression<ValidationResult>
where
    F: Fn() -> ValidationResult + Send + Sync + 'static,
{
    let initial = check();
    LiveExpression::computed(initial, check)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variable::LiveVariable;

    #[test]
    fn ok_is_ok_and_carries_no_message() {
        assert!(ValidationResult::Ok.is_ok());
        assert_eq!(ValidationResult::Ok.message(), None);
        assert!(!ValidationResult::error("bad").is_ok());
        assert_eq!(ValidationResult::error("bad").message(), Some("bad"));
    }

    #[test]
    fn worst_of_picks_the_most_severe() {
        let worst = ValidationResult::worst_of([
            ValidationResult::Ok,
            ValidationResult::warning("w"),
            ValidationResult::error("e"),
            ValidationResult::info("i"),
        ]);
        assert_eq!(worst, ValidationResult::error("e"));
    }

    #[test]
    fn worst_of_keeps_the_first_among_equals() {
        let worst = ValidationResult::worst_of([
            ValidationResult::error("first"),
            ValidationResult::error("second"),
        ]);
        assert_eq!(worst, ValidationResult::error("first"));
    }

    #[test]
    fn worst_of_nothing_is_ok() {
        assert!(ValidationResult::worst_of([]).is_ok());
    }

    #[test]
    fn a_validator_follows_its_input() {
        let name = LiveVariable::new(String::new());
        let input = name.clone();
        let check = validator(move || {
            if input.get().trim().is_empty() {
                ValidationResult::error("name must not be blank")
            } else {
                ValidationResult::Ok
            }
        })
        .depends_on(name.live());

        assert!(!check.get().is_ok());
        name.set("vela".to_owned());
        assert!(check.get().is_ok());
        name.set("   ".to_owned());
        assert_eq!(check.get(), ValidationResult::error("name must not be blank"));
    }
}
