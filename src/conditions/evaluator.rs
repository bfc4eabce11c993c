//! Evaluator for condition expression trees
//!
//! Evaluates a parsed condition against a read-only world snapshot. The
//! evaluator never mutates anything; the only outcome is a value (or an
//! error string describing why the expression is invalid).

use super::parser::{BinaryOperator, Expr};
use super::WorldState;

/// Value type for evaluation results
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Number(i64),
    Boolean(bool),
}

impl Value {
    /// Convert value to boolean for condition evaluation
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0,
            Value::String(s) => !s.is_empty(),
        }
    }

    fn as_number(&self, what: &str) -> Result<i64, String> {
        match self {
            Value::Number(n) => Ok(*n),
            other => Err(format!("{} requires a number, got {:?}", what, other)),
        }
    }

    fn as_str(&self, what: &str) -> Result<&str, String> {
        match self {
            Value::String(s) => Ok(s.as_str()),
            other => Err(format!("{} requires a string, got {:?}", what, other)),
        }
    }
}

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Evaluator bound to one world snapshot
pub struct Evaluator<'a> {
    world: &'a WorldState,
}

impl<'a> Evaluator<'a> {
    pub fn new(world: &'a WorldState) -> Self {
        Self { world }
    }

    pub fn evaluate(&self, node: &Expr) -> Result<Value, String> {
        match node {
            Expr::Str(s) => Ok(Value::String(s.clone())),
            Expr::Int(n) => Ok(Value::Number(*n)),
            Expr::Bool(b) => Ok(Value::Boolean(*b)),
            Expr::Variable(name) => self.evaluate_variable(name),
            Expr::Call { name, args } => self.evaluate_call(name, args),
            Expr::Not(inner) => Ok(Value::Boolean(!self.evaluate(inner)?.is_truthy())),
            Expr::Binary { op, left, right } => self.evaluate_binary_op(*op, left, right),
            Expr::Ternary {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.evaluate(then_branch)
                } else {
                    self.evaluate(else_branch)
                }
            }
        }
    }

    /// Evaluate a variable reference ($season, $day, etc.)
    fn evaluate_variable(&self, name: &str) -> Result<Value, String> {
        let world = self.world;
        match name {
            "season" => Ok(Value::String(world.season.clone())),
            "day" => Ok(Value::Number(world.day as i64)),
            "year" => Ok(Value::Number(world.year as i64)),
            "weather" => Ok(Value::String(world.weather.clone())),
            "location" => Ok(Value::String(world.location.clone())),
            "weekday" => Ok(Value::String(self.weekday().to_string())),
            _ => Err(format!("Unknown variable: ${}", name)),
        }
    }

    fn weekday(&self) -> &'static str {
        let day = self.world.day.max(1);
        WEEKDAYS[((day - 1) % 7) as usize]
    }

    fn evaluate_binary_op(&self, op: BinaryOperator, left: &Expr, right: &Expr) -> Result<Value, String> {
        match op {
            BinaryOperator::And => {
                if !self.evaluate(left)?.is_truthy() {
                    return Ok(Value::Boolean(false));
                }
                Ok(Value::Boolean(self.evaluate(right)?.is_truthy()))
            }
            BinaryOperator::Or => {
                if self.evaluate(left)?.is_truthy() {
                    return Ok(Value::Boolean(true));
                }
                Ok(Value::Boolean(self.evaluate(right)?.is_truthy()))
            }
            BinaryOperator::Equal => Ok(Value::Boolean(self.evaluate(left)? == self.evaluate(right)?)),
            BinaryOperator::NotEqual => Ok(Value::Boolean(self.evaluate(left)? != self.evaluate(right)?)),
            ordering => {
                let what = format!("'{}' comparison", ordering);
                let l = self.evaluate(left)?.as_number(&what)?;
                let r = self.evaluate(right)?.as_number(&what)?;
                let result = match ordering {
                    BinaryOperator::Greater => l > r,
                    BinaryOperator::Less => l < r,
                    BinaryOperator::GreaterEqual => l >= r,
                    _ => l <= r,
                };
                Ok(Value::Boolean(result))
            }
        }
    }

    fn evaluate_call(&self, name: &str, args: &[Expr]) -> Result<Value, String> {
        match name {
            "has_flag" => {
                let [flag] = self.arguments::<1>(name, args)?;
                Ok(Value::Boolean(self.world.has_flag(flag.as_str("has_flag()")?)))
            }
            "season" => {
                let [season] = self.arguments::<1>(name, args)?;
                let season = season.as_str("season()")?;
                Ok(Value::Boolean(self.world.season.eq_ignore_ascii_case(season)))
            }
            "day_between" => {
                let [from, to] = self.arguments::<2>(name, args)?;
                let from = from.as_number("day_between()")?;
                let to = to.as_number("day_between()")?;
                let day = self.world.day as i64;
                Ok(Value::Boolean(from <= day && day <= to))
            }
            "not" => {
                let [value] = self.arguments::<1>(name, args)?;
                Ok(Value::Boolean(!value.is_truthy()))
            }
            // Bare identifiers are flag checks.
            flag if args.is_empty() => Ok(Value::Boolean(self.world.has_flag(flag))),
            _ => Err(format!("Unknown function: {}", name)),
        }
    }

    fn arguments<const N: usize>(&self, name: &str, args: &[Expr]) -> Result<[Value; N], String> {
        if args.len() != N {
            return Err(format!("{}() expects {} argument(s), got {}", name, N, args.len()));
        }
        let values = args
            .iter()
            .map(|arg| self.evaluate(arg))
            .collect::<Result<Vec<_>, _>>()?;
        values
            .try_into()
            .map_err(|_| format!("{}() argument count mismatch", name))
    }
}
