//! Retrieval orchestrator — one end-to-end attempt per call.
//!
//! BUILDING → SENDING → EXTRACTING → DONE_REAL | DONE_FALLBACK.
//! Only a missing credential surfaces as an error; every other failure ends
//! in DONE_FALLBACK with a diagnostic.

use std::fmt;

use schemefinder_config::AppConfig;
use schemefinder_core::error::{Error, Result, TransportError};
use schemefinder_core::transport::{CompletionRequest, Credential};
use schemefinder_core::{Profile, RetrievalOutcome};
use schemefinder_transport::TransportChain;
use tracing::{debug, info, warn};

use crate::extract::{ExtractError, extract};
use crate::prompt::project;
use crate::signals::ProfileSignals;
use crate::synth::synthesize;

/// Fixed parameters of every outbound completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub system_prompt: Option<String>,
}

impl From<&AppConfig> for RequestSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            system_prompt: Some(config.system_prompt.clone()).filter(|s| !s.trim().is_empty()),
        }
    }
}

impl Default for RequestSettings {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Building,
    Sending,
    Extracting,
    DoneReal,
    DoneFallback,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Building => "building",
            Stage::Sending => "sending",
            Stage::Extracting => "extracting",
            Stage::DoneReal => "done_real",
            Stage::DoneFallback => "done_fallback",
        })
    }
}

/// Why the real answer could not be used.
#[derive(Debug)]
enum FallbackReason {
    Transport(TransportError),
    Parse(ExtractError),
    Empty,
}

impl FallbackReason {
    fn diagnostic(&self) -> String {
        let detail = match self {
            FallbackReason::Transport(e) => {
                format!("the completion service could not be reached ({})", e.last_reason())
            }
            FallbackReason::Parse(e) => format!("the model response could not be parsed ({e})"),
            FallbackReason::Empty => "the model response contained no schemes".to_string(),
        };
        format!(
            "Could not fetch real schemes: {detail}. Showing illustrative sample schemes based on your profile instead."
        )
    }
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::Transport(e) => write!(f, "transport: {e}"),
            FallbackReason::Parse(e) => write!(f, "parse: {e}"),
            FallbackReason::Empty => f.write_str("empty result"),
        }
    }
}

/// Composes projection, transport, extraction and fallback synthesis.
///
/// Holds no per-call state, so one instance can serve concurrent calls.
pub struct RetrievalOrchestrator {
    chain: TransportChain,
    settings: RequestSettings,
}

impl RetrievalOrchestrator {
    pub fn new(chain: TransportChain, settings: RequestSettings) -> Self {
        Self { chain, settings }
    }

    /// Build the chain and request settings from configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let chain = schemefinder_transport::build_from_config(config)?;
        Ok(Self::new(chain, RequestSettings::from(config)))
    }

    pub fn chain(&self) -> &TransportChain {
        &self.chain
    }

    pub fn settings(&self) -> &RequestSettings {
        &self.settings
    }

    /// Run one retrieval for `profile`.
    ///
    /// Fails only with [`Error::MissingCredential`]; any transport or parse
    /// problem yields a fallback outcome instead.
    pub async fn retrieve(&self, profile: &Profile, credential: &str) -> Result<RetrievalOutcome> {
        let mut stage = Stage::Building;
        debug!(%stage, "Retrieval started");

        let credential = Credential::new(credential).ok_or(Error::MissingCredential)?;
        let request = CompletionRequest::for_prompt(
            self.settings.model.clone(),
            self.settings.max_tokens,
            self.settings.temperature,
            self.settings.system_prompt.clone(),
            project(profile),
        );

        stage = Stage::Sending;
        debug!(%stage, strategies = self.chain.len(), "Prompt projected");
        let sent = self.chain.send(&request, &credential).await;

        stage = Stage::Extracting;
        debug!(%stage, "Transport finished");
        let reason = match sent {
            Ok(raw) => match extract(&raw) {
                Ok(records) if !records.is_empty() => {
                    stage = Stage::DoneReal;
                    info!(%stage, records = records.len(), "Retrieved schemes from model");
                    return Ok(RetrievalOutcome::real(records));
                }
                Ok(_) => FallbackReason::Empty,
                Err(e) => FallbackReason::Parse(e),
            },
            Err(e) => FallbackReason::Transport(e),
        };

        let records = synthesize(&ProfileSignals::from(profile));
        stage = Stage::DoneFallback;
        warn!(%stage, reason = %reason, records = records.len(), "Using synthesized fallback schemes");

        Ok(RetrievalOutcome::fallback(records, reason.diagnostic()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use schemefinder_core::transport::Transport;
    use schemefinder_core::CancellationToken;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Returns a fixed body (or error) and counts calls.
    struct ScriptedTransport {
        name: &'static str,
        reply: std::result::Result<String, TransportError>,
        calls: Mutex<usize>,
        last_prompt: Mutex<Option<String>>,
    }

    impl ScriptedTransport {
        fn ok(body: &str) -> Arc<Self> {
            Self::new("scripted", Ok(body.to_string()))
        }

        fn failing(name: &'static str) -> Arc<Self> {
            Self::new(name, Err(TransportError::Network("connection refused".into())))
        }

        fn new(name: &'static str, reply: std::result::Result<String, TransportError>) -> Arc<Self> {
            Arc::new(Self {
                name,
                reply,
                calls: Mutex::new(0),
                last_prompt: Mutex::new(None),
            })
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        fn name(&self) -> &str {
            self.name
        }

        async fn send(
            &self,
            request: &CompletionRequest,
            _credential: &Credential,
            _cancel: &CancellationToken,
        ) -> std::result::Result<String, TransportError> {
            *self.calls.lock().unwrap() += 1;
            *self.last_prompt.lock().unwrap() = Some(request.prompt().to_string());
            self.reply.clone()
        }
    }

    fn orchestrator(transports: &[Arc<ScriptedTransport>]) -> RetrievalOrchestrator {
        let chain = transports.iter().fold(TransportChain::new(), |chain, t| {
            chain.add(t.clone(), Duration::from_secs(5))
        });
        RetrievalOrchestrator::new(chain, RequestSettings::default())
    }

    fn profile() -> Profile {
        Profile::new("Maharashtra", "Female", 250_000, 25).unwrap()
    }

    #[tokio::test]
    async fn real_answer_is_returned() {
        let transport = ScriptedTransport::ok(
            "```json\n{\"schemes\":[{\"id\":\"nsp\",\"name\":\"National Scholarship\"}]}\n```",
        );
        let outcome = orchestrator(&[transport.clone()])
            .retrieve(&profile(), "sk-test")
            .await
            .unwrap();

        assert!(!outcome.used_fallback);
        assert!(outcome.diagnostic.is_none());
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].id, "nsp");

        let prompt = transport.last_prompt.lock().unwrap().clone().unwrap();
        assert_eq!(prompt, project(&profile()));
    }

    #[tokio::test]
    async fn all_strategies_failing_falls_back() {
        let relay = ScriptedTransport::failing("relay");
        let direct = ScriptedTransport::failing("direct");
        let outcome = orchestrator(&[relay.clone(), direct.clone()])
            .retrieve(&profile(), "sk-test")
            .await
            .unwrap();

        assert!(outcome.used_fallback);
        assert!(!outcome.records.is_empty());
        let diagnostic = outcome.diagnostic.unwrap();
        assert!(diagnostic.contains("connection refused"));
        assert!(diagnostic.contains("illustrative"));
        assert_eq!(relay.calls(), 1);
        assert_eq!(direct.calls(), 1);
    }

    #[tokio::test]
    async fn loosely_typed_answer_is_still_real() {
        let transport = ScriptedTransport::ok(
            r#"{"schemes":[{"id":1,"name":"National Scholarship","link":null}]}"#,
        );
        let outcome = orchestrator(&[transport])
            .retrieve(&profile(), "sk-test")
            .await
            .unwrap();

        assert!(!outcome.used_fallback);
        assert_eq!(outcome.records[0].id, "1");
        assert!(outcome.records[0].link.is_empty());
    }

    #[tokio::test]
    async fn empty_scheme_list_falls_back() {
        let outcome = orchestrator(&[ScriptedTransport::ok(r#"{"schemes":[]}"#)])
            .retrieve(&profile(), "sk-test")
            .await
            .unwrap();

        assert!(outcome.used_fallback);
        assert_eq!(outcome.records, synthesize(&ProfileSignals::from(&profile())));
        assert!(outcome.diagnostic.unwrap().contains("no schemes"));
    }

    #[tokio::test]
    async fn unparsable_answer_falls_back() {
        let outcome = orchestrator(&[ScriptedTransport::ok("I cannot answer that.")])
            .retrieve(&profile(), "sk-test")
            .await
            .unwrap();

        assert!(outcome.used_fallback);
        assert!(outcome.diagnostic.unwrap().contains("could not be parsed"));
    }

    #[tokio::test]
    async fn empty_credential_is_a_configuration_error() {
        let transport = ScriptedTransport::ok(r#"{"schemes":[{"name":"x"}]}"#);
        let orchestrator = orchestrator(&[transport.clone()]);

        for key in ["", "   "] {
            let err = orchestrator.retrieve(&profile(), key).await.unwrap_err();
            assert!(matches!(err, Error::MissingCredential));
        }
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn second_strategy_answer_is_real() {
        let relay = ScriptedTransport::failing("relay");
        let direct = ScriptedTransport::new(
            "direct",
            Ok(r#"{"schemes":[{"name":"Stand-Up India"}]}"#.into()),
        );
        let outcome = orchestrator(&[relay, direct])
            .retrieve(&profile(), "sk-test")
            .await
            .unwrap();

        assert!(!outcome.used_fallback);
        assert_eq!(outcome.records[0].id, "stand-up-india");
    }

    #[test]
    fn settings_from_config() {
        let settings = RequestSettings::default();
        assert_eq!(settings.model, "claude-3-5-sonnet-20240620");
        assert_eq!(settings.max_tokens, 4000);
        assert!(settings.system_prompt.unwrap().contains("valid JSON"));
    }

    #[test]
    fn orchestrator_from_default_config() {
        let orchestrator = RetrievalOrchestrator::from_config(&AppConfig::default()).unwrap();
        assert_eq!(orchestrator.chain().names(), vec!["relay", "direct", "legacy"]);
    }
}
