//! Credential providers, selected by a credential block's type tag.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use super::executor::{CredentialStep, OperationInvocation};
use crate::protocol::{CredentialError, DEFAULT_CREDENTIAL_TYPE, LiveTestCredentials};

/// Turns a translated credential block into a login step.
pub trait CredentialProvider: Send + Sync {
    /// Type tag this provider handles.
    fn name(&self) -> &str;

    fn apply(
        &self,
        credentials: &LiveTestCredentials,
        invocation: &mut OperationInvocation,
    ) -> Result<(), CredentialError>;
}

/// Service principal login: `tenantId`, `clientId` and `secret`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AzureCredentialProvider;

impl AzureCredentialProvider {
    const REQUIRED: [&'static str; 3] = ["tenantId", "clientId", "secret"];
}

impl CredentialProvider for AzureCredentialProvider {
    fn name(&self) -> &str {
        DEFAULT_CREDENTIAL_TYPE
    }

    fn apply(
        &self,
        credentials: &LiveTestCredentials,
        invocation: &mut OperationInvocation,
    ) -> Result<(), CredentialError> {
        let mut properties = IndexMap::new();
        for property in Self::REQUIRED {
            match credentials.property(property) {
                Some(Value::String(value)) if !value.is_empty() => {
                    properties.insert(property.to_string(), value.clone());
                }
                _ => {
                    return Err(CredentialError::MissingProperty {
                        provider: self.name().to_string(),
                        property: property.to_string(),
                    });
                }
            }
        }

        invocation.credentials.push(CredentialStep {
            provider: self.name().to_string(),
            properties,
        });
        Ok(())
    }
}

/// Providers keyed by lower-cased type tag.
#[derive(Clone)]
pub struct CredentialProviders {
    providers: HashMap<String, Arc<dyn CredentialProvider>>,
}

impl Default for CredentialProviders {
    /// The built-in providers.
    fn default() -> Self {
        Self::empty().with(AzureCredentialProvider)
    }
}

impl CredentialProviders {
    pub fn empty() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    pub fn with(mut self, provider: impl CredentialProvider + 'static) -> Self {
        self.register(Arc::new(provider));
        self
    }

    /// Register a provider, replacing any with the same tag.
    pub fn register(&mut self, provider: Arc<dyn CredentialProvider>) {
        self.providers
            .insert(provider.name().to_lowercase(), provider);
    }

    pub fn get(&self, type_tag: &str) -> Option<&Arc<dyn CredentialProvider>> {
        self.providers.get(&type_tag.to_lowercase())
    }

    /// Apply every credential block in order.
    pub fn apply_all(
        &self,
        credentials: &[LiveTestCredentials],
        invocation: &mut OperationInvocation,
    ) -> Result<(), CredentialError> {
        for block in credentials {
            let provider = self
                .get(&block.type_tag)
                .ok_or_else(|| CredentialError::UnknownProvider(block.type_tag.clone()))?;
            provider.apply(block, invocation)?;
        }
        Ok(())
    }
}
