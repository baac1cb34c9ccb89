//! Batch generation: the full roster in order, one token at a time.
//!
//! Sequential by design: generation order is a visible property of the
//! output (consumers sort by it), so nothing here is parallel. Progress,
//! incremental delivery, and cancellation all hang off the unit loop.

use log::error;

use crate::config::GenerationOptions;
use crate::generator::TokenRenderer;
use crate::models::{Character, ScriptMeta, Token, TokenKind};

use super::cancel::CancellationToken;
use super::progress::{NullProgress, ProgressEvent, ProgressReporter};

/// A unit the batch skipped, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedUnit {
    /// Unit label (character id, reminder slug, or meta tag)
    pub label: String,
    /// Failure description
    pub reason: String,
}

/// Outcome of a batch run.
///
/// `completed` can stop short of `total` (cancelled) and `tokens` can be
/// shorter than the roster implies (validation failures); both are
/// reported here rather than silently absorbed.
#[derive(Debug)]
pub struct BatchResult {
    /// Produced tokens, in generation order
    pub tokens: Vec<Token>,
    /// Units completed
    pub completed: usize,
    /// Units planned
    pub total: usize,
    /// Whether the run stopped on a cancellation signal
    pub cancelled: bool,
    /// Units skipped after failures
    pub skipped: Vec<SkippedUnit>,
}

/// Batch pipeline over a token renderer.
pub struct BatchPipeline<'a, R: TokenRenderer> {
    renderer: &'a R,
    options: &'a GenerationOptions,
    progress: &'a dyn ProgressReporter,
    cancel: CancellationToken,
}

impl<'a, R: TokenRenderer> BatchPipeline<'a, R> {
    /// Create a pipeline with no progress output and a private
    /// (never-signalled) cancellation token.
    pub fn new(renderer: &'a R, options: &'a GenerationOptions) -> Self {
        static NULL: NullProgress = NullProgress;
        Self { renderer, options, progress: &NULL, cancel: CancellationToken::new() }
    }

    /// Attach a progress reporter.
    pub fn with_progress(mut self, progress: &'a dyn ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    /// Attach an externally held cancellation token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Meta kinds the options and script enable, in generation order.
    fn meta_kinds(&self, script: Option<&ScriptMeta>) -> Vec<TokenKind> {
        let Some(script) = script else { return Vec::new() };
        let meta = &self.options.meta;
        let mut kinds = Vec::new();
        if meta.script_name {
            kinds.push(TokenKind::ScriptName);
        }
        if meta.almanac && script.almanac.as_deref().is_some_and(|u| !u.trim().is_empty()) {
            kinds.push(TokenKind::Almanac);
        }
        if meta.pandemonium {
            kinds.push(TokenKind::Pandemonium);
        }
        if meta.bootlegger {
            kinds.push(TokenKind::Bootlegger);
        }
        kinds
    }

    /// Run the batch.
    ///
    /// For each character in roster order: the character token(s), then
    /// one reminder token per reminder string. Enabled meta tokens follow
    /// once at the end. `on_token` fires immediately as each token is
    /// produced; the progress reporter is told after every unit; the
    /// cancellation token is polled between units.
    pub fn generate(
        &self,
        characters: &[Character],
        script: Option<&ScriptMeta>,
        mut on_token: Option<&mut dyn FnMut(&Token)>,
    ) -> BatchResult {
        let meta_kinds = self.meta_kinds(script);
        let total: usize = characters
            .iter()
            .map(|c| c.portrait.all().len() + c.reminders.len())
            .sum::<usize>()
            + meta_kinds.len();

        self.progress.report(ProgressEvent::GenerationStarted { total });

        let mut result = BatchResult {
            tokens: Vec::with_capacity(total),
            completed: 0,
            total,
            cancelled: false,
            skipped: Vec::new(),
        };

        'roster: for character in characters {
            if self.check_cancelled(&mut result) {
                break 'roster;
            }

            match self.renderer.character_tokens(character, result.tokens.len()) {
                Ok(tokens) => {
                    for token in tokens {
                        self.deliver(token, &mut result, &mut on_token);
                    }
                }
                Err(err) => {
                    // The whole character is unusable; its reminders
                    // would fail the same validation, so skip them too.
                    error!("character '{}' failed: {}", character.id, err);
                    result.skipped.push(SkippedUnit {
                        label: character.id.clone(),
                        reason: err.to_string(),
                    });
                    self.progress.report(ProgressEvent::UnitSkipped {
                        label: character.id.clone(),
                        reason: err.to_string(),
                    });
                    continue 'roster;
                }
            }

            for index in 0..character.reminders.len() {
                if self.check_cancelled(&mut result) {
                    break 'roster;
                }
                match self.renderer.reminder_token(character, index, result.tokens.len()) {
                    Ok(token) => self.deliver(token, &mut result, &mut on_token),
                    Err(err) => {
                        let label = format!("{}_reminder{}", character.id, index + 1);
                        error!("reminder '{}' failed: {}", label, err);
                        result.skipped.push(SkippedUnit { label: label.clone(), reason: err.to_string() });
                        self.progress.report(ProgressEvent::UnitSkipped {
                            label,
                            reason: err.to_string(),
                        });
                    }
                }
            }
        }

        if let Some(script) = script {
            for kind in meta_kinds {
                if result.cancelled || self.check_cancelled(&mut result) {
                    break;
                }
                match self.renderer.meta_token(kind, script, result.tokens.len()) {
                    Ok(token) => self.deliver(token, &mut result, &mut on_token),
                    Err(err) => {
                        error!("meta token '{}' failed: {}", kind.tag(), err);
                        result.skipped.push(SkippedUnit {
                            label: kind.tag().to_string(),
                            reason: err.to_string(),
                        });
                        self.progress.report(ProgressEvent::UnitSkipped {
                            label: kind.tag().to_string(),
                            reason: err.to_string(),
                        });
                    }
                }
            }
        }

        self.progress.report(ProgressEvent::GenerationFinished {
            produced: result.tokens.len(),
            total: result.total,
            cancelled: result.cancelled,
        });
        result
    }

    fn check_cancelled(&self, result: &mut BatchResult) -> bool {
        if self.cancel.is_cancelled() {
            result.cancelled = true;
            return true;
        }
        false
    }

    fn deliver(
        &self,
        token: Token,
        result: &mut BatchResult,
        on_token: &mut Option<&mut dyn FnMut(&Token)>,
    ) {
        result.completed += 1;
        self.progress.report(ProgressEvent::TokenCompleted {
            completed: result.completed,
            total: result.total,
            label: token.slug.clone(),
        });
        if let Some(sink) = on_token {
            sink(&token);
        }
        result.tokens.push(token);
    }
}
