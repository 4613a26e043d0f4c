mod bundle;
mod common;
mod credential;
mod environment;
mod http;
mod request;
pub(crate) mod response;
mod stage;

pub use bundle::{Operation, PlaybookBundle, RuntimeConfiguration, Scenario};
pub use common::{AnyValue, Environment};
pub use credential::{
    Credential, CredentialMethod, SecurityScheme, SecuritySchemeKind, SecuritySchemeLocation,
};
pub use environment::{EnvData, EnvironmentVariable, PlaybookEnvironment};
pub use http::{HttpReply, HttpRequest, HttpResponse};
pub use request::{Request, RequestBody, RequestParameters, RequestTemplate};
pub use response::{
    AssignmentLocation, AssignmentSource, PathType, ResponseCode, ResponseProcessing, Responses,
    VariableAssignment,
};
pub use stage::{RefType, RequestRef, Stage};
