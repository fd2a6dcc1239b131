#![forbid(unsafe_code)]

pub mod error;
pub mod expressions;
pub mod parser;
pub mod planner;
pub mod types;
pub mod validate;

pub use crate::error::{DronError, ParseError, ValidationError, Violation};
pub use crate::expressions::{
    parse_reference, parse_template, Placeholder, Reference, Selector, Template, TemplateError,
};
pub use crate::parser::{
    export_history, export_sequence, parse_sequence_str, DocumentFormat, ParsedSequence,
};
pub use crate::planner::{
    plan_from_str, plan_sequence, DependencyGraph, Plan, PlanStep, PlanningOutcome,
    ValidationSummary,
};
pub use crate::types::{
    Header, HeaderPair, History, HistoryEntry, HttpMethod, Param, Sequence, Step, StepField,
};
pub use crate::validate::{validate_sequence, Validate};
