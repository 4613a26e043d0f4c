mod rules;
mod validator;

use crate::error::ValidationError;
use crate::types::PlaybookBundle;
use validator::Validator;

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

impl Validate for PlaybookBundle {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_bundle(self)
    }
}

pub fn validate_bundle(bundle: &PlaybookBundle) -> Result<(), ValidationError> {
    let mut v = Validator::new();
    v.validate_bundle(bundle);
    v.finish()
}
