//! Textual matching criteria.
//!
//! Indicators and exclusions in the catalog are written as short expressions
//! that are parsed once at load time:
//!
//! ```text
//! V1 = negative
//! transition <= V3 & I = positive
//! qrs >= 160
//! mdi >= 0.55
//! bbb != RBBB
//! ```
//!
//! A criterion is a conjunction of clauses joined by `&`. Each clause is
//! `subject op value`. Subjects are the 12 lead names, `transition`, `qrs`,
//! `bbb`, `vertical`, `horizontal`, `v2_ratio` and `mdi`. Ordering operators
//! are only valid on `transition`, `qrs`, `v2_ratio` and `mdi`. A clause over
//! an optional value that was not recorded (no transition point, no
//! measurement) is false.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use vtloc_model::{
    BbbPattern, HorizontalAxis, Lead, Observation, Polarity, TransitionPoint, VerticalAxis,
};

static CLAUSE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z][A-Za-z0-9_]*)\s*(<=|>=|!=|=|<|>)\s*([A-Za-z0-9_.+\-]+)\s*$")
        .expect("Invalid criterion clause regex")
});

/// A criterion that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid criterion '{criterion}': {message}")]
pub struct CriterionError {
    pub criterion: String,
    pub message: String,
}

impl CriterionError {
    fn new(criterion: &str, message: impl Into<String>) -> Self {
        Self {
            criterion: criterion.to_string(),
            message: message.into(),
        }
    }
}

/// What a clause looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    Lead(Lead),
    Transition,
    QrsDuration,
    BbbPattern,
    VerticalAxis,
    HorizontalAxis,
    V2TransitionRatio,
    MaxDeflectionIndex,
}

impl Subject {
    fn parse(token: &str) -> Option<Self> {
        match token.to_lowercase().as_str() {
            "transition" => Some(Subject::Transition),
            "qrs" => Some(Subject::QrsDuration),
            "bbb" => Some(Subject::BbbPattern),
            "vertical" => Some(Subject::VerticalAxis),
            "horizontal" => Some(Subject::HorizontalAxis),
            "v2_ratio" => Some(Subject::V2TransitionRatio),
            "mdi" => Some(Subject::MaxDeflectionIndex),
            _ => token.parse::<Lead>().ok().map(Subject::Lead),
        }
    }

    fn is_ordered(&self) -> bool {
        matches!(
            self,
            Subject::Transition
                | Subject::QrsDuration
                | Subject::V2TransitionRatio
                | Subject::MaxDeflectionIndex
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Subject::Lead(lead) => lead.as_str(),
            Subject::Transition => "transition",
            Subject::QrsDuration => "qrs",
            Subject::BbbPattern => "bbb",
            Subject::VerticalAxis => "vertical",
            Subject::HorizontalAxis => "horizontal",
            Subject::V2TransitionRatio => "v2_ratio",
            Subject::MaxDeflectionIndex => "mdi",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparison {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "=" => Some(Comparison::Eq),
            "!=" => Some(Comparison::Ne),
            "<" => Some(Comparison::Lt),
            "<=" => Some(Comparison::Le),
            ">" => Some(Comparison::Gt),
            ">=" => Some(Comparison::Ge),
            _ => None,
        }
    }

    fn is_equality(&self) -> bool {
        matches!(self, Comparison::Eq | Comparison::Ne)
    }

    /// Equality-only comparison for unordered subjects.
    fn matches<T: PartialEq>(&self, left: &T, right: &T) -> bool {
        match self {
            Comparison::Eq => left == right,
            Comparison::Ne => left != right,
            _ => false,
        }
    }

    fn holds<T: PartialOrd>(&self, left: &T, right: &T) -> bool {
        match self {
            Comparison::Eq => left == right,
            Comparison::Ne => left != right,
            Comparison::Lt => left < right,
            Comparison::Le => left <= right,
            Comparison::Gt => left > right,
            Comparison::Ge => left >= right,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::Ne => "!=",
            Comparison::Lt => "<",
            Comparison::Le => "<=",
            Comparison::Gt => ">",
            Comparison::Ge => ">=",
        }
    }
}

/// Right-hand side of a clause, typed by its subject.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand {
    Polarity(Polarity),
    Transition(TransitionPoint),
    Number(f64),
    Bbb(BbbPattern),
    Vertical(VerticalAxis),
    Horizontal(HorizontalAxis),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Polarity(value) => write!(f, "{value}"),
            Operand::Transition(value) => write!(f, "{value}"),
            Operand::Number(value) => write!(f, "{value}"),
            Operand::Bbb(value) => write!(f, "{value}"),
            Operand::Vertical(value) => write!(f, "{value}"),
            Operand::Horizontal(value) => write!(f, "{value}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clause {
    pub subject: Subject,
    pub comparison: Comparison,
    pub operand: Operand,
}

impl Clause {
    fn parse(source: &str, text: &str) -> Result<Self, CriterionError> {
        let captures = CLAUSE_PATTERN
            .captures(text)
            .ok_or_else(|| CriterionError::new(source, format!("cannot parse clause '{}'", text.trim())))?;
        let subject_token = &captures[1];
        let subject = Subject::parse(subject_token).ok_or_else(|| {
            CriterionError::new(source, format!("unknown subject '{subject_token}'"))
        })?;
        let comparison = Comparison::parse(&captures[2])
            .ok_or_else(|| CriterionError::new(source, "unknown operator"))?;
        if !comparison.is_equality() && !subject.is_ordered() {
            return Err(CriterionError::new(
                source,
                format!(
                    "operator '{}' is not valid for '{}'",
                    comparison.as_str(),
                    subject.as_str()
                ),
            ));
        }
        let value = &captures[3];
        let operand = parse_operand(subject, value)
            .map_err(|message| CriterionError::new(source, message))?;
        Ok(Self {
            subject,
            comparison,
            operand,
        })
    }

    fn evaluate(&self, context: &EvalContext<'_>) -> bool {
        let observation = context.observation;
        match (self.subject, self.operand) {
            (Subject::Lead(lead), Operand::Polarity(expected)) => self
                .comparison
                .matches(&observation.polarity(lead), &expected),
            (Subject::Transition, Operand::Transition(expected)) => observation
                .transition_point()
                .is_some_and(|actual| self.comparison.holds(&actual, &expected)),
            (Subject::QrsDuration, Operand::Number(expected)) => self
                .comparison
                .holds(&observation.qrs_duration_ms(), &expected),
            (Subject::BbbPattern, Operand::Bbb(expected)) => self
                .comparison
                .matches(&observation.bbb_pattern(), &expected),
            (Subject::VerticalAxis, Operand::Vertical(expected)) => {
                self.comparison.matches(&context.vertical, &expected)
            }
            (Subject::HorizontalAxis, Operand::Horizontal(expected)) => {
                self.comparison.matches(&context.horizontal, &expected)
            }
            (Subject::V2TransitionRatio, Operand::Number(expected)) => observation
                .measurements()
                .v2_transition_ratio
                .is_some_and(|actual| self.comparison.holds(&actual, &expected)),
            (Subject::MaxDeflectionIndex, Operand::Number(expected)) => observation
                .measurements()
                .max_deflection_index
                .is_some_and(|actual| self.comparison.holds(&actual, &expected)),
            // Subject and operand types are paired by the parser.
            _ => false,
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.subject.as_str(),
            self.comparison.as_str(),
            self.operand
        )
    }
}

fn parse_operand(subject: Subject, value: &str) -> Result<Operand, String> {
    match subject {
        Subject::Lead(_) => value.parse().map(Operand::Polarity),
        Subject::Transition => value.parse().map(Operand::Transition),
        Subject::BbbPattern => value.parse().map(Operand::Bbb),
        Subject::VerticalAxis => value.parse().map(Operand::Vertical),
        Subject::HorizontalAxis => value.parse().map(Operand::Horizontal),
        Subject::QrsDuration | Subject::V2TransitionRatio | Subject::MaxDeflectionIndex => value
            .parse::<f64>()
            .ok()
            .filter(|number| number.is_finite())
            .map(Operand::Number)
            .ok_or_else(|| format!("'{value}' is not a number")),
    }
}

/// Values a criterion is evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    pub observation: &'a Observation,
    pub vertical: VerticalAxis,
    pub horizontal: HorizontalAxis,
}

/// A parsed conjunction of clauses.
#[derive(Debug, Clone, PartialEq)]
pub struct Criterion {
    clauses: Vec<Clause>,
}

impl Criterion {
    pub fn parse(source: &str) -> Result<Self, CriterionError> {
        if source.trim().is_empty() {
            return Err(CriterionError::new(source, "criterion is empty"));
        }
        let clauses = source
            .split('&')
            .map(|part| Clause::parse(source, part))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { clauses })
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// True when every clause holds.
    pub fn evaluate(&self, context: &EvalContext<'_>) -> bool {
        self.clauses.iter().all(|clause| clause.evaluate(context))
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.clauses.iter().map(ToString::to_string).collect();
        write!(f, "{}", rendered.join(" & "))
    }
}

impl serde::Serialize for Criterion {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl std::str::FromStr for Criterion {
    type Err = CriterionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Criterion::parse(s)
    }
}
