#![forbid(unsafe_code)]

pub mod assign;
pub mod env;
pub mod error;
pub mod parser;
pub mod types;
pub mod validate;
pub mod variables;

pub use crate::assign::{assign_variables, http_status_category, MOCK_VARIABLE_VALUE};
pub use crate::env::{
    get_external_environment, make_env_env, resolve, AssignedVariable, EnvEnv, EnvStack,
    PlaybookEnv,
};
pub use crate::error::{AssignmentError, BundleError, ParseError, ValidationError, Violation};
pub use crate::parser::{parse_bundle_str, DocumentFormat, ParsedBundle};
pub use crate::types::PlaybookBundle;
pub use crate::validate::{validate_bundle, Validate};
pub use crate::variables::{
    missing_variable_names, replace_credential_variables, replace_environment_variables,
    replace_request_variables, FoundVariable, MissingVariable, Replacement,
};
