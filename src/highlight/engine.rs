//! Highlight engine
//!
//! Applies and retracts rule decorations against the host document,
//! keeps the set of highlighted lines, and swaps the buffer between the
//! full text and the highlighted-only projection.
//!
//! One engine serves one document session. Every method takes
//! `&mut self`, so a view toggle that is waiting on the host cannot
//! interleave with a rule edit on the same document.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use super::host::{DecorationHandle, DocumentHost};
use super::matcher::{CompiledRule, MatchSet};
use super::rule::Rule;
use super::view::{LinePrefix, Snapshot, ViewMode};
use crate::error::{HighlightError, Result};

/// Engine settings taken from the config file and command line
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineOptions {
    /// Tag for lines in the highlighted-only projection
    pub line_prefix: LinePrefix,
}

/// A rule currently painted in the document
#[derive(Debug)]
struct AppliedRule {
    compiled: CompiledRule,
    handle: DecorationHandle,
}

/// Outcome of a view toggle
#[derive(Debug)]
pub struct Toggled {
    /// Mode the buffer is now in
    pub mode: ViewMode,
    /// Rules that could not be re-applied after the swap
    pub rejected: Vec<HighlightError>,
}

pub struct HighlightEngine<H: DocumentHost> {
    host: H,
    applied: Vec<AppliedRule>,
    highlighted: BTreeSet<usize>,
    view: ViewMode,
    snapshot: Option<Snapshot>,
    side_views_opened: u32,
    options: EngineOptions,
}

impl<H: DocumentHost> HighlightEngine<H> {
    pub fn new(host: H, options: EngineOptions) -> Self {
        Self {
            host,
            applied: Vec::new(),
            highlighted: BTreeSet::new(),
            view: ViewMode::Full,
            snapshot: None,
            side_views_opened: 0,
            options,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view
    }

    /// Lines currently matched by any applied rule
    pub fn highlighted_lines(&self) -> &BTreeSet<usize> {
        &self.highlighted
    }

    /// Patterns with a live decoration, in application order
    pub fn applied_patterns(&self) -> Vec<&str> {
        self.applied.iter().map(|a| a.compiled.pattern()).collect()
    }

    /// Highlight every match of `rule` in the document
    ///
    /// Returns `Ok(None)` when no document is attached. A rule whose
    /// pattern is already applied is retracted first.
    pub fn apply_rule(&mut self, rule: &Rule) -> Result<Option<MatchSet>> {
        let Some(text) = self.host.document_text() else {
            return Ok(None);
        };
        let compiled = CompiledRule::compile(rule)?;

        if self.applied.iter().any(|a| a.compiled.pattern() == rule.pattern) {
            self.retract_rule(rule);
        }

        let matches = compiled.scan(&text, &self.host);
        let handle = self.host.create_decoration(rule.color);
        self.host.apply_decoration(handle, &matches.ranges);
        self.applied.push(AppliedRule { compiled, handle });

        // The text may have changed since the last rule was applied
        self.highlighted = self.derive_index(&text);

        debug!(
            pattern = %rule.pattern,
            color = %rule.color,
            lines = matches.lines.len(),
            "applied rule"
        );
        Ok(Some(matches.lines))
    }

    /// Remove a rule's decoration and the lines only it matched
    ///
    /// Returns the lines the rule matched in the current text, or `None`
    /// if there is no document or the rule was not applied.
    pub fn retract_rule(&mut self, rule: &Rule) -> Option<MatchSet> {
        let text = self.host.document_text()?;
        let idx = self
            .applied
            .iter()
            .position(|a| a.compiled.pattern() == rule.pattern)?;
        let applied = self.applied.remove(idx);

        let matches = applied.compiled.scan(&text, &self.host);
        self.host.clear_decoration(applied.handle);
        self.host.release_decoration(applied.handle);

        // Lines shared with another rule must survive, so rebuild the union
        self.highlighted = self.derive_index(&text);

        debug!(pattern = %rule.pattern, lines = matches.lines.len(), "retracted rule");
        Some(matches.lines)
    }

    /// Retract every decoration and forget all highlighted lines
    pub fn clear_all(&mut self) {
        if self.host.document_text().is_none() {
            return;
        }
        for applied in self.applied.drain(..) {
            self.host.clear_decoration(applied.handle);
            self.host.release_decoration(applied.handle);
        }
        self.highlighted.clear();
    }

    /// Clear everything, then apply `rules` in order
    ///
    /// Rules whose pattern does not compile are skipped and returned.
    pub fn reconcile(&mut self, rules: &[Rule]) -> Vec<HighlightError> {
        if self.host.document_text().is_none() {
            return Vec::new();
        }
        self.clear_all();

        let mut rejected = Vec::new();
        for rule in rules {
            if let Err(e) = self.apply_rule(rule) {
                warn!(pattern = %rule.pattern, error = %e, "skipping rule");
                rejected.push(e);
            }
        }
        rejected
    }

    /// Switch between the full document and the highlighted-only projection
    ///
    /// Entering the projection also opens it in the numbered side view. On
    /// a host failure the buffer holds what it held before the call and the
    /// mode is unchanged. If the buffer cannot be put back, the mode follows
    /// the buffer and the snapshot is kept so a later toggle can restore it.
    pub async fn toggle_view(&mut self, rules: &[Rule]) -> Result<Toggled> {
        let Some(text) = self.host.document_text() else {
            return Ok(Toggled {
                mode: self.view,
                rejected: Vec::new(),
            });
        };

        let before = self.view;
        let switched = match before {
            ViewMode::Full => self.enter_highlighted_only(text).await,
            ViewMode::HighlightedOnly => self.restore_full().await,
        };
        if let Err(e) = switched {
            // Line numbers shifted if the buffer ended up in the other mode
            if self.view != before {
                self.reconcile(rules);
            }
            return Err(e);
        }

        info!(mode = %self.view, "switched view");
        let rejected = self.reconcile(rules);
        Ok(Toggled {
            mode: self.view,
            rejected,
        })
    }

    async fn enter_highlighted_only(&mut self, text: String) -> Result<()> {
        let snapshot = Snapshot::from_text(&text);
        let projection = snapshot
            .project(&self.highlighted, self.options.line_prefix)
            .join("\n");

        self.host
            .replace_buffer_content(projection.clone())
            .await
            .map_err(|e| HighlightError::ViewSync(e.to_string()))?;

        let title = format!(
            "{} [highlighted #{}]",
            self.host.file_name().unwrap_or_else(|| "untitled".to_string()),
            self.side_views_opened + 1
        );
        if let Err(e) = self.host.open_side_view(projection, title).await {
            if let Err(restore) = self.host.replace_buffer_content(text).await {
                warn!(error = %restore, "could not restore buffer after failed side view");
                self.snapshot = Some(snapshot);
                self.view = ViewMode::HighlightedOnly;
                return Err(HighlightError::ViewSync(format!(
                    "{}; restoring the document also failed: {}",
                    e, restore
                )));
            }
            return Err(HighlightError::ViewSync(e.to_string()));
        }
        self.side_views_opened += 1;

        self.snapshot = Some(snapshot);
        self.view = ViewMode::HighlightedOnly;
        Ok(())
    }

    async fn restore_full(&mut self) -> Result<()> {
        let original = self
            .snapshot
            .as_ref()
            .map(Snapshot::text)
            .ok_or_else(|| HighlightError::ViewSync("no snapshot to restore".into()))?;

        self.host
            .replace_buffer_content(original)
            .await
            .map_err(|e| HighlightError::ViewSync(e.to_string()))?;

        self.snapshot = None;
        self.view = ViewMode::Full;
        Ok(())
    }

    /// Union of every applied rule's matches, recomputed from `text`
    pub fn derive_index(&self, text: &str) -> BTreeSet<usize> {
        self.applied
            .iter()
            .flat_map(|a| a.compiled.scan(text, &self.host).lines)
            .collect()
    }
}
