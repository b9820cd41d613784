//! LLM-based query scope validation.
//!
//! Screens out greetings, chitchat and unrelated questions before the
//! retrieval pipeline runs. Disabled by default; when the classifier
//! itself fails the query is allowed through.

use std::sync::Arc;

use docsqa_core::config::{LlmSettings, ValidatorSettings};
use docsqa_core::{AppError, AppResult};
use docsqa_providers::{create_generator, GenerationClient};

const CLASSIFICATION_PROMPT: &str = "\
You are a query classifier for a technical documentation question-answering system.

Your job: Determine if a user query is IN-SCOPE (about technical documentation) or OUT-OF-SCOPE (greetings, chitchat, personal questions).

**IN-SCOPE examples:**
- \"Como executar testes no Jenkins?\"
- \"O que é o Robot Framework?\"
- \"Quais são os pré-requisitos?\"
- \"Como fazer deploy?\"

**OUT-OF-SCOPE examples:**
- \"olá\" / \"oi\" / \"como estás?\"
- \"quem és tu?\"
- \"obrigado\" / \"adeus\"
- \"conta-me uma piada\"
- \"qual é a capital de França?\"

Respond with ONLY ONE WORD:
- \"IN-SCOPE\" if the query is about technical documentation
- \"OUT-OF-SCOPE\" if it's a greeting, chitchat, or unrelated question

Query: {query}

Classification:";

const OUT_OF_SCOPE_MESSAGE: &str = "Não tenho informação suficiente para responder a essa \
pergunta. Por favor, faça perguntas sobre a documentação técnica interna.";

/// Optional scope gate in front of the pipeline.
pub struct QueryValidator {
    client: Option<Arc<dyn GenerationClient>>,
}

impl QueryValidator {
    /// Build from settings. When disabled the validator is a no-op.
    pub fn from_settings(settings: &ValidatorSettings) -> AppResult<Self> {
        if !settings.enabled {
            return Ok(Self { client: None });
        }

        let client = create_generator(&LlmSettings {
            provider: settings.provider.clone(),
            model: settings.model.clone(),
            base_url: settings.base_url.clone(),
            temperature: 0.0,
            max_tokens: 10,
        })?;

        tracing::info!(
            "Query scope validation enabled with {}:{}",
            client.provider_name(),
            client.model_name()
        );
        Ok(Self {
            client: Some(client),
        })
    }

    /// Reject out-of-scope queries with an insufficient-evidence error.
    ///
    /// Classifier failures are permissive; only a confident OUT-OF-SCOPE
    /// verdict short-circuits the query.
    pub async fn validate(&self, query: &str) -> AppResult<()> {
        let Some(client) = &self.client else {
            return Ok(());
        };

        let prompt = CLASSIFICATION_PROMPT.replace("{query}", query);
        let verdict = match client.generate("", &prompt).await {
            Ok(generation) => generation.text.trim().to_uppercase(),
            Err(e) => {
                tracing::warn!("Query classification failed, allowing query: {}", e);
                return Ok(());
            }
        };

        if verdict.contains("OUT-OF-SCOPE") || verdict.contains("OUT OF SCOPE") {
            tracing::info!("Query rejected as out-of-scope: {}", query);
            return Err(AppError::InsufficientEvidence(
                OUT_OF_SCOPE_MESSAGE.to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsqa_providers::Generation;

    #[tokio::test]
    async fn test_disabled_validator_is_noop() {
        let validator = QueryValidator::from_settings(&ValidatorSettings::default()).unwrap();
        validator.validate("olá, tudo bem?").await.unwrap();
    }

    struct FixedVerdict(&'static str);

    #[async_trait::async_trait]
    impl GenerationClient for FixedVerdict {
        fn provider_name(&self) -> &str {
            "test"
        }
        fn model_name(&self) -> &str {
            "fixed"
        }
        async fn generate(&self, _system: &str, _user: &str) -> AppResult<Generation> {
            Ok(Generation {
                text: self.0.to_string(),
                latency_ms: 1,
            })
        }
    }

    struct FailingClassifier;

    #[async_trait::async_trait]
    impl GenerationClient for FailingClassifier {
        fn provider_name(&self) -> &str {
            "test"
        }
        fn model_name(&self) -> &str {
            "failing"
        }
        async fn generate(&self, _system: &str, _user: &str) -> AppResult<Generation> {
            Err(AppError::Model("classifier offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_out_of_scope_is_rejected() {
        let validator = QueryValidator {
            client: Some(Arc::new(FixedVerdict("OUT-OF-SCOPE"))),
        };

        let err = validator.validate("conta-me uma piada").await.unwrap_err();
        assert!(err.is_insufficient_evidence());
    }

    #[tokio::test]
    async fn test_in_scope_passes() {
        let validator = QueryValidator {
            client: Some(Arc::new(FixedVerdict("IN-SCOPE"))),
        };
        validator
            .validate("Como executar testes no Jenkins?")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_classifier_failure_is_permissive() {
        let validator = QueryValidator {
            client: Some(Arc::new(FailingClassifier)),
        };
        validator.validate("qualquer pergunta").await.unwrap();
    }
}
