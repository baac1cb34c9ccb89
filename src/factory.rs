//! Token factory: wraps rendered surfaces into immutable [`Token`]
//! records.
//!
//! No pixel work happens here; the factory only stamps metadata and
//! enforces the diameter invariant (`base inches x DPI` per kind).

use image::RgbaImage;

use crate::config::GenerationOptions;
use crate::models::{Character, Token, TokenKind};

/// Builds [`Token`] records with consistent diameters and slugs.
#[derive(Debug, Clone, Copy)]
pub struct TokenFactory {
    dpi: u32,
    character_in: f32,
    reminder_in: f32,
}

impl TokenFactory {
    /// Snapshot the size-relevant options.
    pub fn new(options: &GenerationOptions) -> Self {
        Self {
            dpi: options.dpi,
            character_in: options.character.diameter_in,
            reminder_in: options.reminder.diameter_in,
        }
    }

    /// Surface diameter in pixels for a token kind.
    ///
    /// Character and meta tokens share the character base size; reminder
    /// tokens use the smaller reminder base.
    pub fn diameter_px(&self, kind: TokenKind) -> u32 {
        let inches = if kind.is_reminder_sized() { self.reminder_in } else { self.character_in };
        (inches * self.dpi as f32).round() as u32
    }

    /// Wrap a character token render.
    pub fn character(
        &self,
        surface: RgbaImage,
        character: &Character,
        order: usize,
        variant: Option<(usize, usize)>,
        decorated: bool,
    ) -> Token {
        let slug = match variant {
            Some((index, _)) => format!("{}_v{}", character.id, index + 1),
            None => character.id.clone(),
        };
        Token {
            kind: TokenKind::Character,
            character: Some(character.uuid),
            surface,
            diameter_px: self.diameter_px(TokenKind::Character),
            team: Some(character.team),
            order,
            variant,
            official: character.official,
            decorated,
            slug,
        }
    }

    /// Wrap a reminder token render; `index` is the reminder's position
    /// in the character's reminder list.
    pub fn reminder(
        &self,
        surface: RgbaImage,
        character: &Character,
        index: usize,
        order: usize,
        decorated: bool,
    ) -> Token {
        Token {
            kind: TokenKind::Reminder,
            character: Some(character.uuid),
            surface,
            diameter_px: self.diameter_px(TokenKind::Reminder),
            team: Some(character.team),
            order,
            variant: None,
            official: character.official,
            decorated,
            slug: format!("{}_reminder{}", character.id, index + 1),
        }
    }

    /// Wrap a meta token render.
    pub fn meta(&self, surface: RgbaImage, kind: TokenKind, order: usize) -> Token {
        Token {
            kind,
            character: None,
            surface,
            diameter_px: self.diameter_px(kind),
            team: None,
            order,
            variant: None,
            official: None,
            decorated: false,
            slug: kind.tag().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PortraitRef, Team};
    use uuid::Uuid;

    fn character() -> Character {
        Character {
            id: "monk".to_string(),
            name: "Monk".to_string(),
            team: Team::Townsfolk,
            ability: None,
            portrait: PortraitRef::Single("monk.png".to_string()),
            reminders: vec!["Safe".to_string()],
            setup: false,
            official: Some(true),
            uuid: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_diameter_invariant_across_kinds() {
        let mut options = GenerationOptions::default();
        options.dpi = 300;
        let factory = TokenFactory::new(&options);
        // 1.75in * 300dpi = 525px for character-sized kinds.
        for kind in [
            TokenKind::Character,
            TokenKind::ScriptName,
            TokenKind::Almanac,
            TokenKind::Pandemonium,
            TokenKind::Bootlegger,
        ] {
            assert_eq!(factory.diameter_px(kind), 525);
        }
        // 1.0in * 300dpi = 300px for reminders.
        assert_eq!(factory.diameter_px(TokenKind::Reminder), 300);
    }

    #[test]
    fn test_diameter_scales_with_dpi() {
        let mut options = GenerationOptions::default();
        options.dpi = 96;
        let factory = TokenFactory::new(&options);
        assert_eq!(factory.diameter_px(TokenKind::Character), 168);
        assert_eq!(factory.diameter_px(TokenKind::Reminder), 96);
    }

    #[test]
    fn test_character_token_metadata() {
        let options = GenerationOptions::default();
        let factory = TokenFactory::new(&options);
        let ch = character();
        let token =
            factory.character(RgbaImage::new(8, 8), &ch, 3, Some((1, 2)), true);
        assert_eq!(token.kind, TokenKind::Character);
        assert_eq!(token.character, Some(ch.uuid));
        assert_eq!(token.team, Some(Team::Townsfolk));
        assert_eq!(token.order, 3);
        assert_eq!(token.variant, Some((1, 2)));
        assert_eq!(token.official, Some(true));
        assert!(token.decorated);
        assert_eq!(token.slug, "monk_v2");
    }

    #[test]
    fn test_reminder_and_meta_slugs() {
        let options = GenerationOptions::default();
        let factory = TokenFactory::new(&options);
        let ch = character();
        let reminder = factory.reminder(RgbaImage::new(8, 8), &ch, 0, 4, false);
        assert_eq!(reminder.slug, "monk_reminder1");
        assert_eq!(reminder.kind, TokenKind::Reminder);

        let meta = factory.meta(RgbaImage::new(8, 8), TokenKind::Almanac, 9);
        assert_eq!(meta.slug, "almanac");
        assert!(meta.character.is_none() && meta.team.is_none());
    }
}
