pub(crate) mod bundle;
pub(crate) mod credential;
pub(crate) mod request;
pub(crate) mod stage;
