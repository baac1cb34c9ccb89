//! Integration tests for the batch pipeline over the public API, using a
//! stub renderer so no font assets are required.

use image::RgbaImage;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use tokensmith::config::GenerationOptions;
use tokensmith::generator::{GenerateError, TokenRenderer};
use tokensmith::models::{Character, PortraitRef, ScriptMeta, Team, Token, TokenKind};
use tokensmith::pipeline::{BatchPipeline, CancellationToken, ProgressEvent, ProgressReporter};

struct StubRenderer;

impl StubRenderer {
    fn token(kind: TokenKind, character: Option<&Character>, order: usize, slug: String) -> Token {
        Token {
            kind,
            character: character.map(|c| c.uuid),
            surface: RgbaImage::new(2, 2),
            diameter_px: 2,
            team: character.map(|c| c.team),
            order,
            variant: None,
            official: None,
            decorated: false,
            slug,
        }
    }
}

impl TokenRenderer for StubRenderer {
    fn character_tokens(
        &self,
        character: &Character,
        base_order: usize,
    ) -> Result<Vec<Token>, GenerateError> {
        if character.name.trim().is_empty() {
            return Err(GenerateError::MissingName(character.id.clone()));
        }
        Ok(vec![Self::token(
            TokenKind::Character,
            Some(character),
            base_order,
            character.id.clone(),
        )])
    }

    fn reminder_token(
        &self,
        character: &Character,
        index: usize,
        order: usize,
    ) -> Result<Token, GenerateError> {
        Ok(Self::token(
            TokenKind::Reminder,
            Some(character),
            order,
            format!("{}_reminder{}", character.id, index + 1),
        ))
    }

    fn meta_token(
        &self,
        kind: TokenKind,
        _script: &ScriptMeta,
        order: usize,
    ) -> Result<Token, GenerateError> {
        Ok(Self::token(kind, None, order, kind.tag().to_string()))
    }
}

fn character(id: &str, name: &str, reminders: usize) -> Character {
    Character {
        id: id.to_string(),
        name: name.to_string(),
        team: Team::Minion,
        ability: Some("Does something nightly".to_string()),
        portrait: PortraitRef::Single(format!("{}.png", id)),
        reminders: (0..reminders).map(|i| format!("Mark {}", i + 1)).collect(),
        setup: false,
        official: None,
        uuid: Uuid::new_v4(),
    }
}

fn no_meta_options() -> GenerationOptions {
    let mut options = GenerationOptions::default();
    options.meta.script_name = false;
    options.meta.almanac = false;
    options
}

#[derive(Default)]
struct RecordingProgress {
    events: Mutex<Vec<ProgressEvent>>,
}

impl ProgressReporter for RecordingProgress {
    fn report(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[test]
fn test_batch_length_matches_roster_shape() {
    let roster =
        vec![character("a", "A", 2), character("b", "B", 0), character("c", "C", 3)];
    let options = no_meta_options();
    let renderer = StubRenderer;
    let result = BatchPipeline::new(&renderer, &options).generate(&roster, None, None);

    assert_eq!(result.tokens.len(), 3 + 2 + 3);
    assert_eq!(result.completed, result.total);
    // Roster order, with each character's units contiguous.
    let slugs: Vec<&str> = result.tokens.iter().map(|t| t.slug.as_str()).collect();
    assert_eq!(
        slugs,
        [
            "a",
            "a_reminder1",
            "a_reminder2",
            "b",
            "c",
            "c_reminder1",
            "c_reminder2",
            "c_reminder3"
        ]
    );
    for (i, token) in result.tokens.iter().enumerate() {
        assert_eq!(token.order, i);
    }
}

#[test]
fn test_cancellation_yields_exactly_k_tokens() {
    let roster: Vec<Character> =
        (0..20).map(|i| character(&format!("c{}", i), "Name", 1)).collect();
    let options = no_meta_options();
    let renderer = StubRenderer;

    for k in [1usize, 3, 8] {
        let cancel = CancellationToken::new();
        let handle = cancel.clone();
        let mut count = 0usize;
        let mut sink = |_: &Token| {
            count += 1;
            if count == k {
                handle.cancel();
            }
        };
        let result = BatchPipeline::new(&renderer, &options)
            .with_cancellation(cancel)
            .generate(&roster, None, Some(&mut sink));
        assert!(result.cancelled);
        assert_eq!(result.tokens.len(), k, "cancel after {} units", k);
    }
}

#[test]
fn test_progress_counter_is_monotonic_and_honest() {
    let roster = vec![
        character("ok", "Fine", 1),
        character("broken", "", 2),
        character("also-ok", "Fine", 0),
    ];
    let options = no_meta_options();
    let renderer = StubRenderer;
    let progress = RecordingProgress::default();
    let result = BatchPipeline::new(&renderer, &options)
        .with_progress(&progress)
        .generate(&roster, None, None);

    // "broken" and its two reminders never complete: 6 planned, 3 done.
    assert_eq!(result.total, 6);
    assert_eq!(result.completed, 3);
    assert_eq!(result.skipped.len(), 1);

    let events = progress.events.lock().unwrap();
    let mut last = 0usize;
    let mut finished = None;
    for event in events.iter() {
        match event {
            ProgressEvent::TokenCompleted { completed, total, .. } => {
                assert_eq!(*total, 6);
                assert_eq!(*completed, last + 1);
                last = *completed;
            }
            ProgressEvent::GenerationFinished { produced, total, cancelled } => {
                finished = Some((*produced, *total, *cancelled));
            }
            _ => {}
        }
    }
    // The final report shows fewer produced than planned, not a lie.
    assert_eq!(finished, Some((3, 6, false)));
}

#[test]
fn test_tokens_are_new_values_per_run() {
    let roster = vec![character("a", "A", 0)];
    let options = no_meta_options();
    let renderer = StubRenderer;
    let pipeline = BatchPipeline::new(&renderer, &options);

    let first = pipeline.generate(&roster, None, None);
    let kept: Arc<Token> = Arc::new(first.tokens.into_iter().next().unwrap());
    let second = pipeline.generate(&roster, None, None);
    // Regeneration produced a distinct token; the retained one is intact.
    assert_eq!(kept.slug, second.tokens[0].slug);
    assert_eq!(kept.order, 0);
}

#[test]
fn test_meta_tokens_only_with_script() {
    let roster = vec![character("a", "A", 0)];
    let mut options = GenerationOptions::default();
    options.meta.pandemonium = true;
    let renderer = StubRenderer;

    let without = BatchPipeline::new(&renderer, &options).generate(&roster, None, None);
    assert_eq!(without.tokens.len(), 1);

    let script = ScriptMeta {
        title: "Script".to_string(),
        almanac: Some("https://example.com/a".to_string()),
        ..Default::default()
    };
    let with =
        BatchPipeline::new(&renderer, &options).generate(&roster, Some(&script), None);
    let kinds: Vec<TokenKind> = with.tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        [
            TokenKind::Character,
            TokenKind::ScriptName,
            TokenKind::Almanac,
            TokenKind::Pandemonium
        ]
    );
}
