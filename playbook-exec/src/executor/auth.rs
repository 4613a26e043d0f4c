use playbook_core::env::compose;
use playbook_core::{missing_variable_names, replace_credential_variables, EnvStack};

use crate::auth::{split_auth_ref, AuthResult, ResolvedCredential};
use crate::executor::events::{ExecutorStep, PlaybookError};
use crate::executor::playbook::Executor;
use crate::executor::result::Cancelled;

impl Executor<'_> {
    /// Resolves `auth_refs` in order. `Ok(None)` after the first failure, which
    /// is already reported as `auth-aborted`.
    pub(crate) async fn resolve_auth(
        &mut self,
        auth_refs: &[String],
        stack: &EnvStack,
        depth: usize,
    ) -> Result<Option<AuthResult>, Cancelled> {
        let ctx = self.ctx;
        let mut result = AuthResult::new();

        for auth_ref in auth_refs {
            self.emit(ExecutorStep::AuthStarted {
                name: auth_ref.clone(),
            })
            .await?;

            let (credential_name, explicit_method) = split_auth_ref(auth_ref);
            let Some(credential) = ctx.bundle.credential(credential_name) else {
                return self
                    .auth_aborted(PlaybookError::UnknownCredential(credential_name.to_string()))
                    .await;
            };

            let method_name = explicit_method.unwrap_or(credential.default.as_str());
            let Some(method) = credential.methods.get(method_name) else {
                return self
                    .auth_aborted(PlaybookError::UnknownMethod {
                        credential: credential_name.to_string(),
                        method: method_name.to_string(),
                    })
                    .await;
            };

            let cached = self
                .cache
                .get(credential_name, method_name)
                .map(str::to_string);
            let value = match cached {
                Some(cached) => {
                    tracing::debug!(credential = credential_name, method = method_name, "credential cache hit");
                    self.emit(ExecutorStep::CredentialRetrievedFromCache {
                        name: auth_ref.clone(),
                        result: cached.clone(),
                    })
                    .await?;
                    cached
                }
                None => {
                    let mut credential_stack = stack.clone();
                    if let Some(requests) = &method.requests {
                        tracing::info!(credential = credential_name, method = method_name, "acquiring credential");
                        match self
                            .execute_playbook(auth_ref, requests, stack.clone(), depth + 1)
                            .await?
                        {
                            Some(assigned) => {
                                credential_stack = compose(&[stack.as_slice(), assigned.as_slice()]);
                            }
                            None => {
                                return self
                                    .auth_aborted(PlaybookError::CredentialAcquisitionFailed(
                                        auth_ref.clone(),
                                    ))
                                    .await;
                            }
                        }
                    }

                    let replaced = replace_credential_variables(&method.credential, &credential_stack);
                    let missing = missing_variable_names(&replaced.missing);
                    self.emit(ExecutorStep::CredentialVariablesSubstituted {
                        name: auth_ref.clone(),
                        result: replaced.value.clone(),
                        stack: credential_stack,
                        found: replaced.found,
                        missing: replaced.missing,
                    })
                    .await?;

                    if !missing.is_empty() {
                        return self
                            .auth_aborted(PlaybookError::CredentialVariablesMissing {
                                name: auth_ref.clone(),
                                missing,
                            })
                            .await;
                    }

                    self.cache
                        .insert(credential_name, method_name, replaced.value.clone());
                    replaced.value
                }
            };

            let scheme = ctx
                .oas
                .security_scheme(credential_name)
                .or_else(|| credential.declared_scheme());
            result.insert(
                auth_ref.clone(),
                ResolvedCredential {
                    credential: credential_name.to_string(),
                    method: method_name.to_string(),
                    value,
                    scheme,
                },
            );

            self.emit(ExecutorStep::AuthFinished).await?;
        }

        Ok(Some(result))
    }

    async fn auth_aborted(&self, error: PlaybookError) -> Result<Option<AuthResult>, Cancelled> {
        tracing::warn!(%error, "auth aborted");
        self.emit(ExecutorStep::AuthAborted { error }).await?;
        Ok(None)
    }
}
