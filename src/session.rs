//! Highlight session - the command boundary
//!
//! A session pairs the authoritative [`RuleStore`] with the engine for
//! one document. Every command mutates the store first and then brings
//! the engine in line with it. Errors are reported to the host here and
//! never escape as anything fatal.

use tracing::{info, warn};

use crate::error::{HighlightError, Result};
use crate::highlight::{
    Color, DocumentHost, EngineOptions, HighlightEngine, Rule, RuleStore, ViewMode,
};
use crate::protocol::{pair_rules, Command};

pub struct Session<H: DocumentHost> {
    rules: RuleStore,
    engine: HighlightEngine<H>,
    default_color: Color,
}

impl<H: DocumentHost> Session<H> {
    pub fn new(host: H, options: EngineOptions, default_color: Color) -> Self {
        Self {
            rules: RuleStore::new(),
            engine: HighlightEngine::new(host, options),
            default_color,
        }
    }

    /// The active rules, in the order they were added
    pub fn rules(&self) -> &RuleStore {
        &self.rules
    }

    pub fn engine(&self) -> &HighlightEngine<H> {
        &self.engine
    }

    pub fn host(&self) -> &H {
        self.engine.host()
    }

    pub fn host_mut(&mut self) -> &mut H {
        self.engine.host_mut()
    }

    pub fn view_mode(&self) -> ViewMode {
        self.engine.view_mode()
    }

    pub fn default_color(&self) -> Color {
        self.default_color
    }

    /// Run one command, reporting any failure through the host
    ///
    /// The error is also returned so callers can react to it; the session
    /// stays usable either way.
    pub async fn dispatch(&mut self, command: Command) -> Result<()> {
        info!(command = command.name(), "dispatch");
        let result = self.handle(command).await;
        if let Err(ref e) = result {
            self.report(e);
        }
        result
    }

    async fn handle(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Highlight { pattern, color } => {
                self.rules.add(&pattern, color)?;
                let rule = Rule::new(pattern, color);
                if let Err(e) = self.engine.apply_rule(&rule) {
                    // A rule that cannot match anything does not stay listed
                    self.rules.remove(&rule.pattern, rule.color);
                    return Err(e);
                }
                Ok(())
            }
            Command::RemoveHighlight { pattern, color } => {
                let rule = self
                    .rules
                    .remove(&pattern, color)
                    .unwrap_or_else(|| Rule::new(pattern, color));
                self.engine.retract_rule(&rule);
                Ok(())
            }
            Command::Clear => {
                self.rules.clear();
                self.engine.clear_all();
                Ok(())
            }
            Command::UpdateContent { patterns, colors } => {
                let rules = pair_rules(patterns, colors, self.default_color);
                self.rules.replace_all(rules)?;
                let rejected = self.engine.reconcile(self.rules.list());
                self.report_all(&rejected);
                Ok(())
            }
            Command::ToggleHighlighted { patterns, colors } => {
                // An empty payload means "use the rules as they stand"
                let mut previous = None;
                if !patterns.is_empty() {
                    let rules = pair_rules(patterns, colors, self.default_color);
                    if rules.as_slice() != self.rules.list() {
                        let old = self.rules.list().to_vec();
                        self.rules.replace_all(rules)?;
                        previous = Some(old);
                    }
                }
                match self.engine.toggle_view(self.rules.list()).await {
                    Ok(toggled) => {
                        self.report_all(&toggled.rejected);
                        Ok(())
                    }
                    Err(e) => {
                        if let Some(old) = previous {
                            if let Err(restore) = self.rules.replace_all(old) {
                                warn!(error = %restore, "could not restore previous rules");
                            }
                            // Decorations follow the store again
                            self.engine.reconcile(self.rules.list());
                        }
                        Err(e)
                    }
                }
            }
            Command::ReportError { message } => {
                self.engine.host_mut().report_error(&message);
                Ok(())
            }
        }
    }

    fn report(&mut self, error: &HighlightError) {
        if !error.is_reportable() {
            return;
        }
        warn!(error = %error, "command failed");
        self.engine.host_mut().report_error(&error.to_string());
    }

    fn report_all(&mut self, errors: &[HighlightError]) {
        for error in errors {
            self.report(error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::testing::RecordingHost;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    const LOG: &str = "INFO x\nERROR y\nWARN z\nERROR WARN\n";

    fn session() -> Session<RecordingHost> {
        Session::new(
            RecordingHost::with_text(LOG),
            EngineOptions::default(),
            Color::Rgb(255, 0, 0),
        )
    }

    fn highlight(pattern: &str, color: Color) -> Command {
        Command::Highlight {
            pattern: pattern.into(),
            color,
        }
    }

    fn patterns(session: &Session<RecordingHost>) -> Vec<&str> {
        session.rules().list().iter().map(|r| r.pattern.as_str()).collect()
    }

    #[tokio::test]
    async fn test_highlight_adds_and_applies() {
        let mut session = session();
        session.dispatch(highlight("ERROR", Color::Red)).await.unwrap();
        session.dispatch(highlight("WARN", Color::Yellow)).await.unwrap();

        assert_eq!(patterns(&session), vec!["ERROR", "WARN"]);
        assert_eq!(session.engine().highlighted_lines(), &BTreeSet::from([1, 2, 3]));
        assert!(session.host().errors.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_is_reported() {
        let mut session = session();
        session.dispatch(highlight("ERROR", Color::Red)).await.unwrap();
        let err = session.dispatch(highlight("ERROR", Color::Blue)).await.unwrap_err();

        assert!(matches!(err, HighlightError::Duplicate(_)));
        assert_eq!(
            session.host().errors,
            vec!["Duplicate text. Please add unique text to the list."]
        );
        assert_eq!(session.rules().get("ERROR").map(|r| r.color), Some(Color::Red));
        assert_eq!(session.host().live_handles(), 1);
    }

    #[tokio::test]
    async fn test_empty_pattern_is_reported() {
        let mut session = session();
        assert!(session.dispatch(highlight("", Color::Red)).await.is_err());
        assert!(session.rules().is_empty());
        assert_eq!(session.host().errors, vec!["Please specify the text to highlight."]);
    }

    #[tokio::test]
    async fn test_invalid_pattern_is_rolled_back() {
        let mut session = session();
        session.dispatch(highlight("WARN", Color::Yellow)).await.unwrap();
        let err = session.dispatch(highlight("ERROR(", Color::Red)).await.unwrap_err();

        assert!(matches!(err, HighlightError::InvalidPattern { .. }));
        assert_eq!(patterns(&session), vec!["WARN"]);
        assert_eq!(session.host().errors.len(), 1);

        // Still usable afterwards
        session.dispatch(highlight("ERROR", Color::Red)).await.unwrap();
        assert_eq!(patterns(&session), vec!["WARN", "ERROR"]);
    }

    #[tokio::test]
    async fn test_remove_highlight() {
        let mut session = session();
        session.dispatch(highlight("ERROR", Color::Red)).await.unwrap();
        session.dispatch(highlight("WARN", Color::Yellow)).await.unwrap();

        let remove = Command::RemoveHighlight {
            pattern: "ERROR".into(),
            color: Color::Red,
        };
        session.dispatch(remove.clone()).await.unwrap();
        assert_eq!(patterns(&session), vec!["WARN"]);
        assert_eq!(session.engine().highlighted_lines(), &BTreeSet::from([2, 3]));

        // Removing again is a quiet no-op
        session.dispatch(remove).await.unwrap();
        assert_eq!(patterns(&session), vec!["WARN"]);
        assert!(session.host().errors.is_empty());
    }

    #[tokio::test]
    async fn test_clear() {
        let mut session = session();
        session.dispatch(highlight("ERROR", Color::Red)).await.unwrap();
        session.dispatch(highlight("WARN", Color::Yellow)).await.unwrap();
        session.dispatch(Command::Clear).await.unwrap();

        assert!(session.rules().is_empty());
        assert!(session.engine().highlighted_lines().is_empty());
        assert_eq!(session.host().live_handles(), 0);
    }

    #[tokio::test]
    async fn test_update_content_resyncs() {
        let mut session = session();
        session.dispatch(highlight("INFO", Color::Green)).await.unwrap();

        let update = Command::UpdateContent {
            patterns: vec!["ERROR".into(), "(".into(), "WARN".into()],
            colors: vec![Color::Red],
        };
        session.dispatch(update).await.unwrap();

        // The store mirrors the payload; the bad pattern is kept but skipped
        assert_eq!(patterns(&session), vec!["ERROR", "(", "WARN"]);
        assert_eq!(session.rules().get("WARN").map(|r| r.color), Some(Color::Rgb(255, 0, 0)));
        assert_eq!(session.engine().applied_patterns(), vec!["ERROR", "WARN"]);
        assert_eq!(session.engine().highlighted_lines(), &BTreeSet::from([1, 2, 3]));
        assert_eq!(session.host().errors.len(), 1);
    }

    #[tokio::test]
    async fn test_update_content_rejects_duplicates() {
        let mut session = session();
        session.dispatch(highlight("INFO", Color::Green)).await.unwrap();
        let update = Command::UpdateContent {
            patterns: vec!["ERROR".into(), "ERROR".into()],
            colors: vec![],
        };
        assert!(session.dispatch(update).await.is_err());
        assert_eq!(patterns(&session), vec!["INFO"]);
        assert_eq!(session.engine().applied_patterns(), vec!["INFO"]);
    }

    #[tokio::test]
    async fn test_toggle_round_trip() {
        let mut session = session();
        session.dispatch(highlight("ERROR", Color::Red)).await.unwrap();
        session.dispatch(highlight("WARN", Color::Yellow)).await.unwrap();

        let toggle = Command::toggle_highlighted(session.rules().list());
        session.dispatch(toggle.clone()).await.unwrap();
        assert_eq!(session.view_mode(), ViewMode::HighlightedOnly);
        assert_eq!(
            session.host().text.as_deref(),
            Some("2: ERROR y\n3: WARN z\n4: ERROR WARN")
        );

        session.dispatch(toggle).await.unwrap();
        assert_eq!(session.view_mode(), ViewMode::Full);
        assert_eq!(session.host().text.as_deref(), Some(LOG));
    }

    #[tokio::test]
    async fn test_toggle_with_empty_payload_uses_store() {
        let mut session = session();
        session.dispatch(highlight("WARN", Color::Yellow)).await.unwrap();
        session
            .dispatch(Command::ToggleHighlighted {
                patterns: vec![],
                colors: vec![],
            })
            .await
            .unwrap();

        assert_eq!(patterns(&session), vec!["WARN"]);
        assert_eq!(session.host().text.as_deref(), Some("3: WARN z\n4: ERROR WARN"));
    }

    #[tokio::test]
    async fn test_toggle_failure_is_reported() {
        let mut session = session();
        session.dispatch(highlight("ERROR", Color::Red)).await.unwrap();
        session.host_mut().fail_replace = true;

        let toggle = Command::toggle_highlighted(session.rules().list());
        assert!(matches!(
            session.dispatch(toggle).await,
            Err(HighlightError::ViewSync(_))
        ));
        assert_eq!(session.view_mode(), ViewMode::Full);
        assert_eq!(session.host().errors.len(), 1);
        assert!(session.host().errors[0].starts_with("Could not switch view"));
    }

    #[tokio::test]
    async fn test_failed_toggle_keeps_previous_rules() {
        let mut session = session();
        session.dispatch(highlight("ERROR", Color::Red)).await.unwrap();
        session.host_mut().fail_replace = true;

        let toggle = Command::ToggleHighlighted {
            patterns: vec!["WARN".into()],
            colors: vec![Color::Yellow],
        };
        assert!(session.dispatch(toggle).await.is_err());

        assert_eq!(patterns(&session), vec!["ERROR"]);
        assert_eq!(session.engine().applied_patterns(), vec!["ERROR"]);
        assert_eq!(session.engine().highlighted_lines(), &BTreeSet::from([1, 3]));
        assert_eq!(session.view_mode(), ViewMode::Full);
        assert_eq!(session.host().text.as_deref(), Some(LOG));
    }

    #[tokio::test]
    async fn test_report_error_is_forwarded() {
        let mut session = session();
        session
            .dispatch(Command::ReportError {
                message: "from the UI".into(),
            })
            .await
            .unwrap();
        assert_eq!(session.host().errors, vec!["from the UI"]);
    }

    #[tokio::test]
    async fn test_no_document_is_silent() {
        let mut session = Session::new(
            RecordingHost::detached(),
            EngineOptions::default(),
            Color::Red,
        );
        session.dispatch(highlight("ERROR", Color::Red)).await.unwrap();
        session
            .dispatch(Command::toggle_highlighted(&[]))
            .await
            .unwrap();
        assert_eq!(session.view_mode(), ViewMode::Full);
        assert!(session.host().errors.is_empty());
        assert_eq!(session.host().live_handles(), 0);
    }
}
