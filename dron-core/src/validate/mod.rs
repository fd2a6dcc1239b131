mod rules;
mod validator;

use crate::error::ValidationError;
use crate::types::Sequence;
use validator::Validator;

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

impl Validate for Sequence {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_sequence(self)
    }
}

/// Static checks a sequence should pass before it is run.
///
/// Ordering problems a run can still survive (placeholders pointing at steps that run
/// later) are not violations here; the planner reports them as warnings.
pub fn validate_sequence(sequence: &Sequence) -> Result<(), ValidationError> {
    let mut v = Validator::new();
    v.validate_sequence(sequence);
    v.finish()
}
