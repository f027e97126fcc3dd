//! Text analyzer screen

use std::sync::Arc;

use tracing::debug;

use super::ViewError;
use crate::notify::{Notification, Notifier};
use crate::services::{AnalysisApi, AnalysisResult};

/// Texts must be strictly longer than this once trimmed
pub const MIN_TEXT_CHARS: usize = 10;

/// Scores at or above this are compliant
pub const COMPLIANT_THRESHOLD: f64 = 70.0;

pub const READY_MESSAGE: &str = "Ready for a new analysis";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Compliant,
    Partial,
}

impl Verdict {
    pub fn for_score(score: f64) -> Self {
        if score >= COMPLIANT_THRESHOLD {
            Verdict::Compliant
        } else {
            Verdict::Partial
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Verdict::Compliant => "Compliant document",
            Verdict::Partial => "Partial compliance",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Verdict::Compliant => "The text meets the analyzer's safety and integrity standards.",
            Verdict::Partial => "Some passages suggest a potential risk, or the content is too short.",
        }
    }
}

/// `82` -> `"82%"`
pub fn score_label(score: f64) -> String {
    format!("{}%", score)
}

fn is_long_enough(text: &str) -> bool {
    text.trim().chars().count() > MIN_TEXT_CHARS
}

pub struct AnalyzerView {
    api: Arc<dyn AnalysisApi>,
    notifier: Arc<dyn Notifier>,
    text: String,
    result: Option<AnalysisResult>,
}

impl AnalyzerView {
    pub fn new(api: Arc<dyn AnalysisApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notifier,
            text: String::new(),
            result: None,
        }
    }

    /// Replace the input text; ignored while a result is displayed
    pub fn set_text(&mut self, text: impl Into<String>) -> bool {
        if self.result.is_some() {
            return false;
        }
        self.text = text.into();
        true
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn can_submit(&self) -> bool {
        self.result.is_none() && is_long_enough(&self.text)
    }

    /// Send the text for analysis
    ///
    /// Short texts are rejected locally with an error notification and never
    /// reach the server. Server failures are already notified by the client.
    pub async fn submit(&mut self) -> Result<&AnalysisResult, ViewError> {
        debug!(len = self.text.len(), "submit: called");
        if !is_long_enough(&self.text) {
            let err = ViewError::TextTooShort { min: MIN_TEXT_CHARS };
            self.notifier.notify(Notification::error(err.to_string()));
            return Err(err);
        }

        let result = self.api.analyze(&self.text).await?;
        let stored = self.result.insert(result);
        Ok(&*stored)
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn verdict(&self) -> Option<Verdict> {
        self.result.as_ref().map(|r| Verdict::for_score(r.score))
    }

    /// Clear text and result
    pub fn reset(&mut self) {
        self.text.clear();
        self.result = None;
        self.notifier.notify(Notification::success(READY_MESSAGE));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpError;
    use crate::notify::{NotificationCenter, NotificationKind};
    use crate::services::analysis::mock::MockAnalysisApi;

    fn result(score: f64) -> AnalysisResult {
        AnalysisResult {
            score,
            status: "success".to_string(),
        }
    }

    fn view(responses: Vec<Result<AnalysisResult, HttpError>>) -> (AnalyzerView, Arc<MockAnalysisApi>, Arc<NotificationCenter>) {
        let api = Arc::new(MockAnalysisApi::new(responses));
        let center = Arc::new(NotificationCenter::new());
        (AnalyzerView::new(api.clone(), center.clone()), api, center)
    }

    #[test]
    fn test_verdict_threshold() {
        assert_eq!(Verdict::for_score(70.0), Verdict::Compliant);
        assert_eq!(Verdict::for_score(69.9), Verdict::Partial);
        assert_eq!(Verdict::for_score(100.0), Verdict::Compliant);
    }

    #[test]
    fn test_score_label() {
        assert_eq!(score_label(82.0), "82%");
        assert_eq!(score_label(64.5), "64.5%");
    }

    #[tokio::test]
    async fn test_short_text_never_calls_api() {
        let (mut view, api, center) = view(vec![]);
        view.set_text("   short      ");

        assert!(!view.can_submit());
        let err = view.submit().await.unwrap_err();
        assert!(matches!(err, ViewError::TextTooShort { min: 10 }));
        assert_eq!(api.call_count(), 0);

        let visible = center.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].kind, NotificationKind::Error);
        assert_eq!(visible[0].text, "The text must contain more than 10 characters.");
    }

    #[tokio::test]
    async fn test_exactly_ten_chars_is_rejected() {
        let (mut view, api, _) = view(vec![]);
        view.set_text("0123456789");
        assert!(view.submit().await.is_err());
        view.set_text("0123456789a");
        assert!(view.can_submit());
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn test_submit_then_reset() {
        let (mut view, api, center) = view(vec![Ok(result(82.0))]);
        view.set_text("The tenant shall pay the rent on the first day of each month.");

        let score = view.submit().await.unwrap().score;
        assert_eq!(score_label(score), "82%");
        assert_eq!(view.verdict(), Some(Verdict::Compliant));
        assert_eq!(api.call_count(), 1);

        assert!(!view.set_text("edited"));
        assert!(!view.can_submit());

        view.reset();
        assert!(view.result().is_none());
        assert!(view.text().is_empty());
        assert_eq!(center.visible()[0].text, READY_MESSAGE);
    }

    #[tokio::test]
    async fn test_server_failure_keeps_no_result() {
        let (mut view, _, center) = view(vec![Err(HttpError::NetworkUnreachable("refused".to_string()))]);
        view.set_text("A sufficiently long paragraph of text.");

        let err = view.submit().await.unwrap_err();
        assert!(matches!(err, ViewError::Http(HttpError::NetworkUnreachable(_))));
        assert!(view.result().is_none());
        // the client notifies server failures, not the view
        assert!(center.visible().is_empty());
    }
}
