//! LLM Router - tries providers in priority order

use std::sync::Arc;

use serde_json::Value;

use crate::extract::extract_json_object;
use crate::providers::*;
use crate::types::*;

/// A value produced by a specific provider
#[derive(Debug, Clone, PartialEq)]
pub struct Routed<T> {
    pub value: T,
    pub provider: ProviderKind,
}

/// Holds the configured providers in the order they should be tried
#[derive(Clone, Default)]
pub struct LLMRouter {
    providers: Vec<Arc<dyn LLMProvider>>,
}

impl LLMRouter {
    /// Create a router over providers already in priority order
    pub fn new(providers: Vec<Arc<dyn LLMProvider>>) -> Self {
        Self { providers }
    }

    /// A router with no providers; every call fails with
    /// [`LLMError::ProviderNotAvailable`]
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn builder() -> LLMRouterBuilder {
        LLMRouterBuilder::new()
    }

    /// Provider kinds in the order they are tried
    pub fn kinds(&self) -> Vec<ProviderKind> {
        self.providers.iter().map(|p| p.kind()).collect()
    }

    pub fn is_configured(&self) -> bool {
        !self.providers.is_empty()
    }

    /// Run `request` against each provider until one reply passes `accept`.
    ///
    /// Failures are logged and the next provider is tried. When every
    /// provider fails, the last error is returned.
    pub async fn route<T, F>(&self, request: CompletionRequest, accept: F) -> Result<Routed<T>>
    where
        F: Fn(ProviderKind, CompletionResponse) -> Result<T>,
    {
        let mut last_error = LLMError::ProviderNotAvailable {
            provider: "none configured".to_string(),
        };

        for provider in &self.providers {
            let kind = provider.kind();
            if !provider.is_available().await {
                tracing::debug!(provider = %kind, "Provider unavailable, skipping");
                continue;
            }

            match provider
                .complete(request.clone())
                .await
                .and_then(|response| accept(kind, response))
            {
                Ok(value) => {
                    return Ok(Routed {
                        value,
                        provider: kind,
                    })
                }
                Err(e) => {
                    tracing::warn!(provider = %kind, error = %e, "Provider failed");
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    /// Like [`route`](Self::route), but `accept` receives the JSON object
    /// extracted from the reply
    pub async fn complete_json<T, F>(&self, request: CompletionRequest, accept: F) -> Result<Routed<T>>
    where
        F: Fn(ProviderKind, Value) -> Result<T>,
    {
        self.route(request, |kind, response| {
            let value = extract_json_object(&response.content)?;
            accept(kind, value)
        })
        .await
    }
}

/// Builder for LLM router with explicit configuration
pub struct LLMRouterBuilder {
    order: Vec<ProviderKind>,
    openai_config: Option<OpenAIConfig>,
    gemini_config: Option<GeminiConfig>,
    extra: Vec<Arc<dyn LLMProvider>>,
}

impl LLMRouterBuilder {
    pub fn new() -> Self {
        Self {
            order: vec![ProviderKind::Gemini, ProviderKind::OpenAI],
            openai_config: None,
            gemini_config: None,
            extra: vec![],
        }
    }

    /// Priority order; kinds left out are never used
    pub fn with_order(mut self, order: Vec<ProviderKind>) -> Self {
        self.order = order;
        self
    }

    pub fn with_openai(mut self, config: OpenAIConfig) -> Self {
        self.openai_config = Some(config);
        self
    }

    pub fn with_gemini(mut self, config: GeminiConfig) -> Self {
        self.gemini_config = Some(config);
        self
    }

    /// Append a ready-made provider after the configured ones
    pub fn with_provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.extra.push(provider);
        self
    }

    pub fn build(self) -> LLMRouter {
        let mut providers: Vec<Arc<dyn LLMProvider>> = vec![];
        let mut openai = self.openai_config;
        let mut gemini = self.gemini_config;

        for kind in self.order {
            match kind {
                ProviderKind::OpenAI => {
                    if let Some(config) = openai.take() {
                        providers.push(Arc::new(OpenAIProvider::new(config)));
                    }
                }
                ProviderKind::Gemini => {
                    if let Some(config) = gemini.take() {
                        providers.push(Arc::new(GeminiProvider::new(config)));
                    }
                }
            }
        }

        providers.extend(self.extra);
        LLMRouter::new(providers)
    }
}

impl Default for LLMRouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
