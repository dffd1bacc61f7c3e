//! # Threat Classifier
//!
//! Orchestrates one classification:
//! 1. probe the local engine (bounded by [`LOCAL_PROBE_TIMEOUT`], failures are silent);
//! 2. otherwise call the cloud model once with the rule prompt and the
//!    payload chosen by the strategy selector;
//! 3. parse the answer, degrading to UNKNOWN on malformed output.

use std::sync::Arc;
use std::time::Duration;

use domains::{
    AnalysisResult, ClassifierError, FileHandle, FileMetadata, FileUpload, GenerationRequest,
    GenerativeModel, LocalAnalysisProbe,
};
use tracing::{debug, info, instrument};

use crate::prompt::{rule_prompt, verdict_schema};
use crate::strategy::{build_parts, select_strategy};
use crate::verdict::parse_verdict;

pub const LOCAL_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Marks summaries produced by the local engine.
pub const LOCAL_ENGINE_PREFIX: &str = "[Local Engine] ";

const DEFAULT_TEMPERATURE: f32 = 0.1;

pub struct ThreatAnalyzer {
    model: Arc<dyn GenerativeModel>,
    local: Option<Arc<dyn LocalAnalysisProbe>>,
    probe_timeout: Duration,
    temperature: f32,
}

impl ThreatAnalyzer {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self {
            model,
            local: None,
            probe_timeout: LOCAL_PROBE_TIMEOUT,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_local_probe(mut self, probe: Arc<dyn LocalAnalysisProbe>) -> Self {
        self.local = Some(probe);
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Classifies `file`. Errors are limited to [`ClassifierError`]; malformed
    /// model output is reported as an UNKNOWN verdict instead.
    #[instrument(skip_all, fields(file = %metadata.name))]
    pub async fn classify(
        &self,
        file: &dyn FileHandle,
        metadata: &FileMetadata,
    ) -> Result<AnalysisResult, ClassifierError> {
        if let Some(result) = self.try_local(file, metadata).await {
            info!(level = %result.threat_level, "verdict from local engine");
            return Ok(result);
        }

        let strategy = select_strategy(metadata);
        debug!(?strategy, "falling back to cloud classifier");

        let parts = build_parts(file, metadata, strategy)
            .await
            .map_err(|e| ClassifierError::Unavailable(e.to_string()))?;

        let request = GenerationRequest::new()
            .with_system(rule_prompt(metadata))
            .with_user_parts(parts)
            .with_schema(verdict_schema().clone())
            .with_temperature(self.temperature);

        let text = self.model.generate(request).await?;
        let result = parse_verdict(&text);
        info!(level = %result.threat_level, score = result.score, "verdict from cloud classifier");
        Ok(result)
    }

    async fn try_local(&self, file: &dyn FileHandle, metadata: &FileMetadata) -> Option<AnalysisResult> {
        let probe = self.local.as_ref()?;

        let body = match file.read_all().await {
            Ok(body) => body,
            Err(e) => {
                debug!(error = %e, "skipping local engine, file unreadable");
                return None;
            }
        };
        let upload = FileUpload {
            name: metadata.name.clone(),
            mime_type: metadata.mime_type.clone(),
            body,
        };

        match tokio::time::timeout(self.probe_timeout, probe.analyze(&upload)).await {
            Ok(Some(analysis)) => Some(parse_verdict(&analysis).with_summary_prefix(LOCAL_ENGINE_PREFIX)),
            Ok(None) => None,
            Err(_) => {
                debug!(timeout = ?self.probe_timeout, "local engine probe timed out");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::MemoryFile;
    use crate::triage::extract_metadata;
    use async_trait::async_trait;
    use domains::{MockGenerativeModel, MockLocalAnalysisProbe, Part, ThreatLevel};

    const SAFE_JSON: &str = r#"{"threatLevel":"SAFE","score":3,"summary":"Plain notes",
        "technicalDetails":["ASCII text"],"recommendation":"No action needed"}"#;

    /// Probe that never answers within any reasonable time.
    struct StalledProbe;

    #[async_trait]
    impl LocalAnalysisProbe for StalledProbe {
        async fn analyze(&self, _upload: &FileUpload) -> Option<String> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Some(SAFE_JSON.to_string())
        }
    }

    async fn text_file() -> (MemoryFile, FileMetadata) {
        let file = MemoryFile::new("notes.txt", Some("text/plain".into()), "buy milk");
        let metadata = extract_metadata(&file).await.unwrap();
        (file, metadata)
    }

    #[tokio::test]
    async fn local_engine_answer_wins() {
        let (file, metadata) = text_file().await;

        let mut probe = MockLocalAnalysisProbe::new();
        probe
            .expect_analyze()
            .withf(|upload| upload.name == "notes.txt" && &upload.body[..] == b"buy milk")
            .times(1)
            .returning(|_| Some(SAFE_JSON.to_string()));
        let mut model = MockGenerativeModel::new();
        model.expect_generate().times(0);

        let analyzer = ThreatAnalyzer::new(Arc::new(model)).with_local_probe(Arc::new(probe));
        let result = analyzer.classify(&file, &metadata).await.unwrap();

        assert_eq!(result.threat_level, ThreatLevel::Safe);
        assert_eq!(result.summary, "[Local Engine] Plain notes");
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_probe_falls_back_to_cloud_once() {
        let (file, metadata) = text_file().await;

        let mut model = MockGenerativeModel::new();
        model
            .expect_generate()
            .times(1)
            .returning(|_| Ok(SAFE_JSON.to_string()));

        let analyzer = ThreatAnalyzer::new(Arc::new(model)).with_local_probe(Arc::new(StalledProbe));
        let started = tokio::time::Instant::now();
        let result = analyzer.classify(&file, &metadata).await.unwrap();

        assert_eq!(result.summary, "Plain notes");
        assert!(started.elapsed() >= LOCAL_PROBE_TIMEOUT);
        assert!(started.elapsed() < Duration::from_secs(60));
    }

    #[tokio::test]
    async fn unreachable_probe_is_silent() {
        let (file, metadata) = text_file().await;

        let mut probe = MockLocalAnalysisProbe::new();
        probe.expect_analyze().returning(|_| None);
        let mut model = MockGenerativeModel::new();
        model
            .expect_generate()
            .times(1)
            .returning(|_| Ok(SAFE_JSON.to_string()));

        let analyzer = ThreatAnalyzer::new(Arc::new(model)).with_local_probe(Arc::new(probe));
        assert!(analyzer.classify(&file, &metadata).await.is_ok());
    }

    #[tokio::test]
    async fn unparsable_cloud_answer_is_unknown() {
        let (file, metadata) = text_file().await;

        let mut model = MockGenerativeModel::new();
        model
            .expect_generate()
            .times(1)
            .returning(|_| Ok("```json\n{ not json".to_string()));

        let result = ThreatAnalyzer::new(Arc::new(model))
            .classify(&file, &metadata)
            .await
            .unwrap();

        assert_eq!(result.threat_level, ThreatLevel::Unknown);
        assert_eq!(result.score, 0);
    }

    #[tokio::test]
    async fn transport_errors_surface_unchanged() {
        let (file, metadata) = text_file().await;

        let mut model = MockGenerativeModel::new();
        model
            .expect_generate()
            .returning(|_| Err(ClassifierError::PayloadTooLarge));

        let err = ThreatAnalyzer::new(Arc::new(model))
            .classify(&file, &metadata)
            .await
            .unwrap_err();
        assert_eq!(err, ClassifierError::PayloadTooLarge);
    }

    #[tokio::test]
    async fn cloud_request_carries_prompt_schema_and_payload() {
        let file = MemoryFile::new("pic.png", Some("image/png".into()), vec![0x89, b'P', b'N', b'G']);
        let metadata = extract_metadata(&file).await.unwrap();

        let mut model = MockGenerativeModel::new();
        model
            .expect_generate()
            .withf(|req| {
                let system = req.system_instruction.as_deref().unwrap_or_default();
                system.contains("89 50 4E 47")
                    && req.response_schema.is_some()
                    && req.temperature == Some(0.1)
                    && matches!(&req.contents[0].parts[0], Part::InlineData { mime_type, .. } if mime_type == "image/png")
            })
            .times(1)
            .returning(|_| Ok(SAFE_JSON.to_string()));

        ThreatAnalyzer::new(Arc::new(model))
            .classify(&file, &metadata)
            .await
            .unwrap();
    }
}
