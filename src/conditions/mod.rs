//! Condition expressions for catalog entries.
//!
//! Entries may carry a condition such as `season("fall") && $day >= 15`.
//! The engine only needs a [`ConditionEvaluator`]; this module provides one
//! backed by a plain [`WorldState`] snapshot, used by the command line
//! simulator and by hosts that expose their world state as data.
//!
//! **Limits:**
//! - Expression length: 512 characters
//! - Nesting depth: 16

pub mod evaluator;
pub mod parser;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::augment::errors::ExpanderError;
use crate::augment::host::ConditionEvaluator;

pub use evaluator::{Evaluator, Value};
pub use parser::{parse_condition, BinaryOperator, Expr};

/// Maximum condition length in characters
pub const MAX_EXPRESSION_LENGTH: usize = 512;

/// Maximum nesting depth of parenthesized / negated sub-expressions
pub const MAX_NESTED_DEPTH: usize = 16;

/// Parse a catalog condition under the length and nesting limits.
pub fn compile_condition(expression: &str) -> Result<Expr, String> {
    if expression.chars().count() > MAX_EXPRESSION_LENGTH {
        return Err(format!(
            "expression longer than {} characters",
            MAX_EXPRESSION_LENGTH
        ));
    }
    parse_condition(expression, MAX_NESTED_DEPTH)
}

/// Snapshot of the world state conditions are checked against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldState {
    pub season: String,
    pub day: u32,
    pub year: u32,
    pub weather: String,
    pub location: String,
    pub flags: BTreeSet<String>,
}

impl Default for WorldState {
    fn default() -> Self {
        Self {
            season: "spring".to_string(),
            day: 1,
            year: 1,
            weather: "sun".to_string(),
            location: String::new(),
            flags: BTreeSet::new(),
        }
    }
}

impl WorldState {
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.flags.insert(flag.into());
        self
    }
}

/// [`ConditionEvaluator`] over a [`WorldState`] snapshot.
#[derive(Debug, Clone, Default)]
pub struct WorldConditions {
    world: WorldState,
}

impl WorldConditions {
    pub fn new(world: WorldState) -> Self {
        Self { world }
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    fn check(&self, expression: &str) -> Result<bool, String> {
        let ast = compile_condition(expression)?;
        let value = Evaluator::new(&self.world).evaluate(&ast)?;
        Ok(value.is_truthy())
    }
}

impl ConditionEvaluator for WorldConditions {
    fn evaluate(&self, expression: &str) -> Result<bool, ExpanderError> {
        self.check(expression)
            .map_err(|reason| ExpanderError::Condition {
                expression: expression.to_string(),
                reason,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluates_against_world() {
        let conditions = WorldConditions::new(WorldState {
            season: "fall".to_string(),
            day: 16,
            ..WorldState::default()
        });
        assert!(conditions.evaluate("season(\"fall\") && $day >= 15").unwrap());
        assert!(!conditions.evaluate("$season == \"winter\"").unwrap());
    }

    #[test]
    fn invalid_expressions_become_condition_errors() {
        let conditions = WorldConditions::default();
        let err = conditions.evaluate("$day >").unwrap_err();
        assert!(matches!(err, ExpanderError::Condition { ref expression, .. } if expression == "$day >"));
    }

    #[test]
    fn overlong_expressions_are_rejected() {
        let conditions = WorldConditions::default();
        let long = vec!["true"; 200].join(" && ");
        assert!(conditions.evaluate(&long).is_err());
        assert!(compile_condition(&long).is_err());
        assert!(compile_condition("true && true").is_ok());
    }

    #[test]
    fn world_state_deserializes_with_defaults() {
        let world: WorldState = toml::from_str("season = \"summer\"\nflags = [\"ccVault\"]").unwrap();
        assert_eq!(world.season, "summer");
        assert_eq!(world.day, 1);
        assert!(world.has_flag("ccVault"));
    }
}
