//! Diagnostic workflow: one selected audio sample, one analysis at a time,
//! and an optional AI-generated report on the latest result.

use std::sync::Arc;

use tokio::sync::RwLock;

use voicelab_core::api::{InferenceApi, ReportApi};
use voicelab_core::prediction::{AnalysisRequest, ModelId, Prediction};
use voicelab_core::{Result, VoiceLabError};

use crate::auth::AuthController;

/// Shown when the inference service rejects the bearer token.
pub const SESSION_EXPIRED: &str = "Session expired. Please login again.";
/// Shown when the inference service fails for any other reason.
pub const ANALYSIS_FAILED: &str = "Analysis failed. Please try a different file.";
/// Shown when a report is requested before a successful analysis.
pub const REPORT_REQUIRES_DIAGNOSIS: &str = "Please run diagnosis before generating a report.";
/// Substituted when the report service answers without any text.
pub const REPORT_EMPTY_FALLBACK: &str = "AI report could not be generated at this time. \
     Please review the confidence score and consult a healthcare professional.";
/// Substituted when the report service call fails outright.
pub const REPORT_UNAVAILABLE_FALLBACK: &str = "AI report generation is temporarily unavailable. \
     This screening result is based on voice analysis and should be verified by a neurologist.";

const ANALYSIS_IN_PROGRESS: &str = "Analysis is already in progress.";
const REPORT_IN_PROGRESS: &str = "Report generation is already in progress.";
const NO_FILE_SELECTED: &str = "Please select an audio file first.";

/// The fixed question sent to the report service for every result.
const REPORT_QUESTION: &str = "Explain this Alzheimer's screening result for a caregiver. \
     Include the confidence level, what the result suggests, and recommended next steps.";

/// Where the workflow currently stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AnalysisPhase {
    #[default]
    Idle,
    Analyzing,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone)]
struct SelectedFile {
    name: String,
    bytes: Vec<u8>,
}

/// Mutable workflow state behind the controller's lock.
///
/// `cycle` increments whenever the displayed result could change (file
/// selection, analysis start, reset). A network response carrying an older
/// cycle number is stale and must not be applied.
#[derive(Default)]
struct DiagnosticState {
    phase: AnalysisPhase,
    selected_file: Option<SelectedFile>,
    model_id: ModelId,
    use_ensemble: bool,
    prediction: Option<Prediction>,
    report: Option<String>,
    error: Option<String>,
    report_in_flight: bool,
    cycle: u64,
}

/// Drives the analyze-then-report workflow against the inference and report
/// services, keyed to the authenticated session.
pub struct DiagnosticController {
    inference: Arc<dyn InferenceApi>,
    reports: Arc<dyn ReportApi>,
    auth: Arc<AuthController>,
    state: RwLock<DiagnosticState>,
}

impl DiagnosticController {
    pub fn new(
        inference: Arc<dyn InferenceApi>,
        reports: Arc<dyn ReportApi>,
        auth: Arc<AuthController>,
    ) -> Self {
        Self {
            inference,
            reports,
            auth,
            state: RwLock::new(DiagnosticState::default()),
        }
    }

    /// Selects the audio sample for the next analysis, discarding any previous
    /// result and report.
    pub async fn select_file(&self, name: impl Into<String>, bytes: Vec<u8>) {
        let mut st = self.state.write().await;
        st.selected_file = Some(SelectedFile {
            name: name.into(),
            bytes,
        });
        st.prediction = None;
        st.report = None;
        st.error = None;
        st.phase = AnalysisPhase::Idle;
        st.cycle += 1;
    }

    /// Submits the selected sample for classification.
    ///
    /// Only one analysis runs at a time; a second call while one is pending is
    /// rejected without touching the pending one. An `Unauthorized` response
    /// forces a logout and resets the workflow.
    pub async fn analyze(&self, model_id: ModelId, use_ensemble: bool) -> Result<Prediction> {
        let (request, cycle) = {
            let mut st = self.state.write().await;
            if st.phase == AnalysisPhase::Analyzing {
                return Err(VoiceLabError::validation(ANALYSIS_IN_PROGRESS));
            }
            let file = st
                .selected_file
                .as_ref()
                .ok_or_else(|| VoiceLabError::validation(NO_FILE_SELECTED))?;

            let request = AnalysisRequest {
                file_name: file.name.clone(),
                bytes: file.bytes.clone(),
                model_id,
                use_ensemble,
            };
            st.phase = AnalysisPhase::Analyzing;
            st.model_id = model_id;
            st.use_ensemble = use_ensemble;
            st.prediction = None;
            st.report = None;
            st.error = None;
            st.cycle += 1;
            (request, st.cycle)
        };

        // Unauthenticated analyze is allowed to reach the service; it comes
        // back as a 401 and takes the forced-logout path below.
        let token = self.auth.token().await;
        tracing::debug!(model = %model_id, use_ensemble, file = %request.file_name, "analyzing audio sample");

        match self.inference.predict(&request, &token).await {
            Ok(prediction) => {
                let mut st = self.state.write().await;
                if st.cycle != cycle {
                    tracing::debug!("discarding prediction from a superseded analysis");
                    return Ok(prediction);
                }
                st.prediction = Some(prediction.clone());
                st.phase = AnalysisPhase::Succeeded;
                Ok(prediction)
            }
            Err(VoiceLabError::Unauthorized) => {
                if let Err(err) = self.auth.logout().await {
                    tracing::warn!(error = %err, "failed to clear session after token rejection");
                }
                let mut st = self.state.write().await;
                let cycle = st.cycle + 1;
                *st = DiagnosticState {
                    phase: AnalysisPhase::Failed,
                    error: Some(SESSION_EXPIRED.to_string()),
                    cycle,
                    ..DiagnosticState::default()
                };
                Err(VoiceLabError::Unauthorized)
            }
            Err(err) => {
                let mut st = self.state.write().await;
                if st.cycle == cycle {
                    st.phase = AnalysisPhase::Failed;
                    st.error = Some(match &err {
                        VoiceLabError::Remote { .. } => ANALYSIS_FAILED.to_string(),
                        other => other.to_string(),
                    });
                }
                Err(err)
            }
        }
    }

    /// Generates an AI explanation of the latest successful result.
    ///
    /// Requires a completed analysis; that precondition is checked locally.
    /// Service failures never surface to the caller as errors, only as fixed
    /// fallback report text.
    pub async fn generate_report(&self) -> Result<String> {
        let (prediction, model_name, cycle) = {
            let mut st = self.state.write().await;
            let prediction = st
                .prediction
                .clone()
                .ok_or_else(|| VoiceLabError::validation(REPORT_REQUIRES_DIAGNOSIS))?;
            if st.report_in_flight {
                return Err(VoiceLabError::validation(REPORT_IN_PROGRESS));
            }
            st.report_in_flight = true;
            st.report = None;
            let model_name = prediction.attributed_model_name(st.use_ensemble);
            (prediction, model_name, st.cycle)
        };

        let token = self.auth.token().await;
        let outcome = self
            .reports
            .explain(REPORT_QUESTION, &prediction, &model_name, &token)
            .await;

        let mut st = self.state.write().await;
        st.report_in_flight = false;
        if st.cycle != cycle {
            tracing::debug!("discarding report from a superseded analysis");
            return Err(VoiceLabError::internal("report superseded by a new analysis"));
        }

        let text = match outcome {
            Ok(Some(answer)) => answer,
            Ok(None) => REPORT_EMPTY_FALLBACK.to_string(),
            Err(err) => {
                tracing::warn!(error = %err, "report generation failed, substituting fallback text");
                REPORT_UNAVAILABLE_FALLBACK.to_string()
            }
        };
        st.report = Some(text.clone());
        Ok(text)
    }

    /// Returns the workflow to its initial state, keeping the cycle counter
    /// monotonic so any still-pending response is discarded.
    pub async fn reset(&self) {
        let mut st = self.state.write().await;
        let cycle = st.cycle + 1;
        *st = DiagnosticState::default();
        st.cycle = cycle;
    }

    pub async fn phase(&self) -> AnalysisPhase {
        self.state.read().await.phase
    }

    pub async fn prediction(&self) -> Option<Prediction> {
        self.state.read().await.prediction.clone()
    }

    pub async fn report(&self) -> Option<String> {
        self.state.read().await.report.clone()
    }

    pub async fn last_error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    pub async fn selected_file_name(&self) -> Option<String> {
        self.state
            .read()
            .await
            .selected_file
            .as_ref()
            .map(|file| file.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::sync::Notify;

    use voicelab_core::api::LoginOutcome;

    use crate::auth::tests::{MemorySessionStore, MockAuthApi};

    fn sample_prediction() -> Prediction {
        Prediction {
            probability: 0.82,
            label: 1,
            class_name: "Likely Alzheimer's".to_string(),
            model_name: None,
            version: None,
        }
    }

    struct MockInference {
        results: Mutex<Vec<Result<Prediction>>>,
        calls: AtomicUsize,
        gate: Option<Arc<Notify>>,
    }

    impl MockInference {
        fn with(results: Vec<Result<Prediction>>) -> Self {
            Self {
                results: Mutex::new(results),
                calls: AtomicUsize::new(0),
                gate: None,
            }
        }

        fn gated(results: Vec<Result<Prediction>>, gate: Arc<Notify>) -> Self {
            Self {
                results: Mutex::new(results),
                calls: AtomicUsize::new(0),
                gate: Some(gate),
            }
        }
    }

    #[async_trait::async_trait]
    impl InferenceApi for MockInference {
        async fn predict(&self, _request: &AnalysisRequest, _token: &str) -> Result<Prediction> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.results.lock().unwrap().remove(0)
        }
    }

    struct MockReports {
        results: Mutex<Vec<Result<Option<String>>>>,
        calls: AtomicUsize,
        gate: Option<Arc<Notify>>,
    }

    impl MockReports {
        fn with(results: Vec<Result<Option<String>>>) -> Self {
            Self {
                results: Mutex::new(results),
                calls: AtomicUsize::new(0),
                gate: None,
            }
        }

        fn gated(results: Vec<Result<Option<String>>>, gate: Arc<Notify>) -> Self {
            Self {
                results: Mutex::new(results),
                calls: AtomicUsize::new(0),
                gate: Some(gate),
            }
        }
    }

    #[async_trait::async_trait]
    impl ReportApi for MockReports {
        async fn explain(
            &self,
            _question: &str,
            _prediction: &Prediction,
            _model_name: &str,
            _token: &str,
        ) -> Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.results.lock().unwrap().remove(0)
        }
    }

    async fn logged_in_auth() -> Arc<AuthController> {
        let api = Arc::new(MockAuthApi::with_login(Ok(LoginOutcome {
            access_token: "jwt-1".to_string(),
            name: Some("Ada".to_string()),
        })));
        let auth = Arc::new(AuthController::new(
            api,
            Arc::new(MemorySessionStore::default()),
        ));
        auth.login("ada@example.com", "secret").await.unwrap();
        auth
    }

    fn controller(
        inference: Arc<MockInference>,
        reports: Arc<MockReports>,
        auth: Arc<AuthController>,
    ) -> Arc<DiagnosticController> {
        Arc::new(DiagnosticController::new(inference, reports, auth))
    }

    #[tokio::test]
    async fn test_analyze_success_stores_prediction() {
        let inference = Arc::new(MockInference::with(vec![Ok(sample_prediction())]));
        let reports = Arc::new(MockReports::with(vec![]));
        let ctrl = controller(inference, reports, logged_in_auth().await);

        ctrl.select_file("sample.wav", vec![1, 2, 3]).await;
        let prediction = ctrl.analyze(ModelId::CnnLstm, false).await.unwrap();

        assert_eq!(prediction.class_name, "Likely Alzheimer's");
        assert_eq!(ctrl.phase().await, AnalysisPhase::Succeeded);
        assert_eq!(ctrl.prediction().await.unwrap().probability, 0.82);
        assert_eq!(ctrl.last_error().await, None);
    }

    #[tokio::test]
    async fn test_analyze_without_file_is_rejected_locally() {
        let inference = Arc::new(MockInference::with(vec![]));
        let reports = Arc::new(MockReports::with(vec![]));
        let ctrl = controller(inference.clone(), reports, logged_in_auth().await);

        let err = ctrl.analyze(ModelId::CnnLstm, false).await.unwrap_err();

        assert!(err.is_validation());
        assert_eq!(inference.calls.load(Ordering::SeqCst), 0);
        assert_eq!(ctrl.phase().await, AnalysisPhase::Idle);
    }

    #[tokio::test]
    async fn test_concurrent_analyze_is_rejected_without_touching_pending() {
        let gate = Arc::new(Notify::new());
        let inference = Arc::new(MockInference::gated(
            vec![Ok(sample_prediction())],
            gate.clone(),
        ));
        let reports = Arc::new(MockReports::with(vec![]));
        let ctrl = controller(inference.clone(), reports, logged_in_auth().await);

        ctrl.select_file("sample.wav", vec![1, 2, 3]).await;

        let pending = {
            let ctrl = ctrl.clone();
            tokio::spawn(async move { ctrl.analyze(ModelId::CnnLstm, false).await })
        };
        while inference.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        let err = ctrl.analyze(ModelId::GruAttn, true).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), ANALYSIS_IN_PROGRESS);

        gate.notify_one();
        let prediction = pending.await.unwrap().unwrap();
        assert_eq!(prediction.probability, 0.82);
        assert_eq!(ctrl.phase().await, AnalysisPhase::Succeeded);
        assert_eq!(inference.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_token_rejection_forces_logout_and_reset() {
        let inference = Arc::new(MockInference::with(vec![Err(VoiceLabError::Unauthorized)]));
        let reports = Arc::new(MockReports::with(vec![]));
        let auth = logged_in_auth().await;
        let ctrl = controller(inference, reports, auth.clone());

        ctrl.select_file("sample.wav", vec![1, 2, 3]).await;
        let err = ctrl.analyze(ModelId::CnnLstm, false).await.unwrap_err();

        assert!(err.is_unauthorized());
        assert!(!auth.is_authenticated().await);
        assert_eq!(ctrl.last_error().await.as_deref(), Some(SESSION_EXPIRED));
        assert_eq!(ctrl.phase().await, AnalysisPhase::Failed);
        assert_eq!(ctrl.prediction().await, None);
        assert_eq!(ctrl.selected_file_name().await, None);
    }

    #[tokio::test]
    async fn test_service_failure_sets_user_facing_error() {
        let inference = Arc::new(MockInference::with(vec![Err(VoiceLabError::remote(
            500,
            "Prediction request failed",
        ))]));
        let reports = Arc::new(MockReports::with(vec![]));
        let ctrl = controller(inference, reports, logged_in_auth().await);

        ctrl.select_file("sample.wav", vec![1, 2, 3]).await;
        ctrl.analyze(ModelId::CnnLstm, false).await.unwrap_err();

        assert_eq!(ctrl.phase().await, AnalysisPhase::Failed);
        assert_eq!(ctrl.last_error().await.as_deref(), Some(ANALYSIS_FAILED));
        // A failed analysis keeps the selected file so the user can retry.
        assert_eq!(ctrl.selected_file_name().await.as_deref(), Some("sample.wav"));
    }

    #[tokio::test]
    async fn test_report_requires_diagnosis_and_stays_local() {
        let inference = Arc::new(MockInference::with(vec![]));
        let reports = Arc::new(MockReports::with(vec![]));
        let ctrl = controller(inference, reports.clone(), logged_in_auth().await);

        let err = ctrl.generate_report().await.unwrap_err();

        assert!(err.is_validation());
        assert_eq!(err.to_string(), REPORT_REQUIRES_DIAGNOSIS);
        assert_eq!(reports.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_report_success_stores_answer() {
        let inference = Arc::new(MockInference::with(vec![Ok(sample_prediction())]));
        let reports = Arc::new(MockReports::with(vec![Ok(Some(
            "The screening suggests...".to_string(),
        ))]));
        let ctrl = controller(inference, reports, logged_in_auth().await);

        ctrl.select_file("sample.wav", vec![1, 2, 3]).await;
        ctrl.analyze(ModelId::CnnLstm, false).await.unwrap();
        let report = ctrl.generate_report().await.unwrap();

        assert_eq!(report, "The screening suggests...");
        assert_eq!(ctrl.report().await.as_deref(), Some("The screening suggests..."));
    }

    #[tokio::test]
    async fn test_report_empty_answer_uses_empty_fallback() {
        let inference = Arc::new(MockInference::with(vec![Ok(sample_prediction())]));
        let reports = Arc::new(MockReports::with(vec![Ok(None)]));
        let ctrl = controller(inference, reports, logged_in_auth().await);

        ctrl.select_file("sample.wav", vec![1, 2, 3]).await;
        ctrl.analyze(ModelId::CnnLstm, false).await.unwrap();
        let report = ctrl.generate_report().await.unwrap();

        assert_eq!(report, REPORT_EMPTY_FALLBACK);
    }

    #[tokio::test]
    async fn test_report_failure_uses_unavailable_fallback() {
        let inference = Arc::new(MockInference::with(vec![Ok(sample_prediction())]));
        let reports = Arc::new(MockReports::with(vec![Err(VoiceLabError::remote(
            503,
            "AI report service unavailable",
        ))]));
        let ctrl = controller(inference, reports, logged_in_auth().await);

        ctrl.select_file("sample.wav", vec![1, 2, 3]).await;
        ctrl.analyze(ModelId::CnnLstm, false).await.unwrap();
        let report = ctrl.generate_report().await.unwrap();

        assert_eq!(report, REPORT_UNAVAILABLE_FALLBACK);
    }

    #[tokio::test]
    async fn test_stale_report_is_discarded_after_new_file_selection() {
        let gate = Arc::new(Notify::new());
        let inference = Arc::new(MockInference::with(vec![Ok(sample_prediction())]));
        let reports = Arc::new(MockReports::gated(
            vec![Ok(Some("stale report".to_string()))],
            gate.clone(),
        ));
        let ctrl = controller(inference, reports.clone(), logged_in_auth().await);

        ctrl.select_file("sample.wav", vec![1, 2, 3]).await;
        ctrl.analyze(ModelId::CnnLstm, false).await.unwrap();

        let pending = {
            let ctrl = ctrl.clone();
            tokio::spawn(async move { ctrl.generate_report().await })
        };
        while reports.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        // A new file selection supersedes the in-flight report.
        ctrl.select_file("other.wav", vec![9, 9, 9]).await;
        gate.notify_one();

        assert!(pending.await.unwrap().is_err());
        assert_eq!(ctrl.report().await, None);
    }

    #[tokio::test]
    async fn test_logout_reset_clears_workflow() {
        let inference = Arc::new(MockInference::with(vec![Ok(sample_prediction())]));
        let reports = Arc::new(MockReports::with(vec![]));
        let auth = logged_in_auth().await;
        let ctrl = controller(inference, reports, auth.clone());

        ctrl.select_file("sample.wav", vec![1, 2, 3]).await;
        ctrl.analyze(ModelId::CnnLstm, false).await.unwrap();

        auth.logout().await.unwrap();
        ctrl.reset().await;

        assert_eq!(ctrl.phase().await, AnalysisPhase::Idle);
        assert_eq!(ctrl.prediction().await, None);
        assert_eq!(ctrl.selected_file_name().await, None);
        assert!(!auth.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_ensemble_attribution_reaches_report_service() {
        struct CapturingReports {
            model_name: Mutex<Option<String>>,
        }

        #[async_trait::async_trait]
        impl ReportApi for CapturingReports {
            async fn explain(
                &self,
                _question: &str,
                _prediction: &Prediction,
                model_name: &str,
                _token: &str,
            ) -> Result<Option<String>> {
                *self.model_name.lock().unwrap() = Some(model_name.to_string());
                Ok(Some("ok".to_string()))
            }
        }

        let inference = Arc::new(MockInference::with(vec![Ok(sample_prediction())]));
        let reports = Arc::new(CapturingReports {
            model_name: Mutex::new(None),
        });
        let ctrl = Arc::new(DiagnosticController::new(
            inference,
            reports.clone(),
            logged_in_auth().await,
        ));

        ctrl.select_file("sample.wav", vec![1, 2, 3]).await;
        ctrl.analyze(ModelId::CnnLstm, true).await.unwrap();
        ctrl.generate_report().await.unwrap();

        assert_eq!(reports.model_name.lock().unwrap().as_deref(), Some("Ensemble"));
    }
}
