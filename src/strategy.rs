// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Recognition strategies.
//!
//! A deployment answers every request with exactly one strategy: the
//! geometric rule engine, or the statistical classifier over normalized
//! landmark features.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// How a landmark set is turned into a sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Weighted finger-state rules from a gesture catalog.
    #[default]
    Rules,
    /// ONNX classifier over min-max normalized landmark coordinates.
    Classifier,
}

impl Strategy {
    /// Name used on the command line and in the health report.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Rules => "rules",
            Self::Classifier => "classifier",
        }
    }

    /// Pick the strategy for a deployment.
    ///
    /// An explicit choice wins. Otherwise the classifier is used whenever its
    /// model is loaded, and the rule engine otherwise.
    #[must_use]
    pub const fn select(requested: Option<Self>, classifier_loaded: bool) -> Self {
        match requested {
            Some(strategy) => strategy,
            None if classifier_loaded => Self::Classifier,
            None => Self::Rules,
        }
    }

    /// Whether this strategy needs the classifier model.
    #[must_use]
    pub const fn needs_classifier(&self) -> bool {
        matches!(self, Self::Classifier)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = StrategyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rules" | "rule" | "geometric" | "catalog" => Ok(Self::Rules),
            "classifier" | "model" | "ml" => Ok(Self::Classifier),
            _ => Err(StrategyParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid strategy string.
#[derive(Debug, Clone)]
pub struct StrategyParseError(String);

impl fmt::Display for StrategyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid strategy '{}', expected one of: rules, classifier",
            self.0
        )
    }
}

impl std::error::Error for StrategyParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("rules".parse::<Strategy>().unwrap(), Strategy::Rules);
        assert_eq!("Classifier".parse::<Strategy>().unwrap(), Strategy::Classifier);
        assert_eq!("geometric".parse::<Strategy>().unwrap(), Strategy::Rules);
        assert!("random".parse::<Strategy>().is_err());
    }

    #[test]
    fn test_strategy_display() {
        assert_eq!(Strategy::Rules.to_string(), "rules");
        assert_eq!(Strategy::Classifier.to_string(), "classifier");
    }

    #[test]
    fn test_strategy_select() {
        assert_eq!(Strategy::select(None, false), Strategy::Rules);
        assert_eq!(Strategy::select(None, true), Strategy::Classifier);
        assert_eq!(Strategy::select(Some(Strategy::Rules), true), Strategy::Rules);
        assert_eq!(
            Strategy::select(Some(Strategy::Classifier), false),
            Strategy::Classifier
        );
    }
}
