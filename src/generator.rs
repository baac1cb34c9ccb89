//! Per-token rendering orchestration.
//!
//! A [`TokenGenerator`] holds only immutable borrows (options, fonts,
//! asset cache); every per-render intermediate lives on the call stack.
//! Validation runs before any drawing and fails only the unit at hand;
//! asset load failures merely skip the affected layer.

use image::{Rgba, RgbaImage};
use log::warn;
use thiserror::Error;
use uuid::Uuid;

use crate::accents::{AccentEngine, AccentKind};
use crate::assets::AssetCache;
use crate::badge::draw_count_badge;
use crate::color::parse_color;
use crate::config::{BackgroundKind, GenerationOptions, TokenClassOptions};
use crate::draw::{blit_rotated, blit_scaled, cover_crop, fill_rounded_rect, mask_circle};
use crate::factory::TokenFactory;
use crate::font::{FontStore, LoadedFont};
use crate::geometry::point_on_circle;
use crate::models::{Character, ScriptMeta, Token, TokenKind};
use crate::qr;
use crate::text::{
    draw_centered, draw_curved, draw_wrapped, icon_band, wrap, ArcPosition, TextLayout,
};

/// Error type for per-unit generation failures.
///
/// These are validation errors raised before drawing; they abort only the
/// unit they belong to, never the batch.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Character has an empty display name
    #[error("character '{0}' has no name")]
    MissingName(String),
    /// Reminder slot holds an empty string
    #[error("character '{0}' has an empty reminder text")]
    EmptyReminder(String),
    /// Options carry a non-positive DPI
    #[error("dpi must be positive")]
    InvalidDpi,
    /// A required font family is not loaded
    #[error("font '{0}' is not loaded")]
    FontUnavailable(String),
}

/// Renders the tokens the batch pipeline asks for.
///
/// The pipeline depends on this seam rather than the concrete generator,
/// so its ordering/cancellation behavior can be tested with a stub.
pub trait TokenRenderer {
    /// Render every character token for `character` (one per portrait
    /// variant), with orders starting at `base_order`.
    fn character_tokens(
        &self,
        character: &Character,
        base_order: usize,
    ) -> Result<Vec<Token>, GenerateError>;

    /// Render the reminder token at `index` of the character's list.
    fn reminder_token(
        &self,
        character: &Character,
        index: usize,
        order: usize,
    ) -> Result<Token, GenerateError>;

    /// Render one meta token.
    fn meta_token(
        &self,
        kind: TokenKind,
        script: &ScriptMeta,
        order: usize,
    ) -> Result<Token, GenerateError>;
}

/// The concrete token renderer.
pub struct TokenGenerator<'a> {
    options: &'a GenerationOptions,
    fonts: &'a FontStore,
    assets: &'a AssetCache,
    factory: TokenFactory,
}

impl<'a> TokenGenerator<'a> {
    /// Borrow the shared collaborators for a run of renders.
    pub fn new(
        options: &'a GenerationOptions,
        fonts: &'a FontStore,
        assets: &'a AssetCache,
    ) -> Self {
        Self { options, fonts, assets, factory: TokenFactory::new(options) }
    }

    fn font(&self, family: &str) -> Result<std::sync::Arc<LoadedFont>, GenerateError> {
        self.fonts.get(family).ok_or_else(|| GenerateError::FontUnavailable(family.to_string()))
    }

    fn color(&self, spec: &str, fallback: Rgba<u8>) -> Rgba<u8> {
        match parse_color(spec) {
            Ok(c) => c,
            Err(err) => {
                warn!("invalid color '{}': {}; using fallback", spec, err);
                fallback
            }
        }
    }

    /// Accent seed for one unit: explicit option seed when configured
    /// (reproducible sheets), otherwise wall-clock entropy mixed with the
    /// unit identity so every render draws fresh.
    fn accent_seed(&self, uuid: &Uuid, order: usize) -> u64 {
        let base = self.options.accents.seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.subsec_nanos() as u64 ^ d.as_secs())
                .unwrap_or(0)
        });
        let id = u64::from_le_bytes(uuid.as_bytes()[..8].try_into().unwrap_or([0; 8]));
        base.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ id ^ ((order as u64) << 32)
    }

    /// Allocate the square surface and paint the background for a class.
    ///
    /// A failed background image load falls back to the flat color; with
    /// `transparent_background` set nothing is painted at all.
    fn background(&self, diameter: u32, class: &TokenClassOptions) -> RgbaImage {
        let mut img = RgbaImage::new(diameter, diameter);
        if self.options.transparent_background {
            return img;
        }
        let fallback = self.color(&class.background_color, Rgba([244, 232, 208, 255]));
        let painted = if class.background == BackgroundKind::Image {
            match self.assets.get(&class.background_image) {
                Some(bg) => {
                    let cropped = cover_crop(&bg, diameter, diameter);
                    image::imageops::overlay(&mut img, &cropped, 0, 0);
                    true
                }
                None => false,
            }
        } else {
            false
        };
        if !painted {
            for px in img.pixels_mut() {
                *px = fallback;
            }
        }
        img
    }

    /// Draw an image inside a square box, preserving aspect ratio.
    fn blit_contained(&self, img: &mut RgbaImage, src: &RgbaImage, x: f32, y: f32, size: f32) {
        if size <= 0.0 {
            return;
        }
        let (sw, sh) = src.dimensions();
        if sw == 0 || sh == 0 {
            return;
        }
        let scale = (size / sw as f32).min(size / sh as f32);
        let w = (sw as f32 * scale).round().max(1.0) as u32;
        let h = (sh as f32 * scale).round().max(1.0) as u32;
        let ox = x + (size - w as f32) / 2.0;
        let oy = y + (size - h as f32) / 2.0;
        blit_scaled(img, src, ox.round() as i64, oy.round() as i64, w, h);
    }

    /// Place and draw accents; returns whether any were drawn.
    fn draw_accents(&self, img: &mut RgbaImage, diameter: f32, seed: u64) -> bool {
        let cfg = &self.options.accents;
        if !cfg.enabled {
            return false;
        }
        let spots = AccentEngine::new(cfg, seed).place(diameter);
        if spots.is_empty() {
            return false;
        }
        let arc_asset = self.assets.get(&cfg.asset);
        let side_asset = if cfg.side_asset.is_empty() {
            arc_asset.clone()
        } else {
            self.assets.get(&cfg.side_asset).or_else(|| arc_asset.clone())
        };
        let size = (diameter * cfg.scale).round().max(1.0) as u32;
        let mut drawn = false;
        for spot in &spots {
            let asset = match spot.kind {
                AccentKind::Arc => arc_asset.as_ref(),
                AccentKind::Side => side_asset.as_ref(),
            };
            let Some(asset) = asset else { continue };
            let scaled = cover_crop(asset, size, size);
            blit_rotated(img, &scaled, spot.x, spot.y, spot.rotation);
            drawn = true;
        }
        drawn
    }

    /// Lay out ability text when it should be shown.
    fn ability_layout(
        &self,
        character: &Character,
        diameter: f32,
        font: &LoadedFont,
    ) -> Option<TextLayout> {
        if !self.options.text.show_ability {
            return None;
        }
        let ability = character.ability.as_deref()?.trim();
        if ability.is_empty() {
            return None;
        }
        let px = diameter * self.options.text.ability_size;
        let start_y = diameter * self.options.character.top_margin + px / 2.0;
        let layout = wrap(
            ability,
            diameter,
            px,
            self.options.text.line_height,
            start_y,
            self.options.text.padding_ratio,
            font,
        );
        (!layout.lines.is_empty()).then_some(layout)
    }

    /// Render the full character token surface.
    fn render_character_surface(
        &self,
        character: &Character,
        portrait_ref: &str,
        seed: u64,
    ) -> Result<(RgbaImage, bool), GenerateError> {
        let text = &self.options.text;
        let class = &self.options.character;
        let name_font = self.font(&text.name_font)?;
        let ability_font = self.font(&text.ability_font)?;

        let diameter = self.factory.diameter_px(TokenKind::Character);
        let d = diameter as f32;
        let mut img = self.background(diameter, class);

        // Ability layout first: the icon is sized to the leftover band.
        let ability = self.ability_layout(character, d, &ability_font);
        let ability_px = d * text.ability_size;
        let band_top = ability
            .as_ref()
            .and_then(|l| l.bottom(ability_px * text.line_height))
            .unwrap_or(d * class.top_margin);
        let placement =
            icon_band(d, band_top, d * class.icon_bottom, class.icon_scale, class.icon_offset * d);

        if let Some(portrait) = self.assets.get(portrait_ref) {
            self.blit_contained(&mut img, &portrait, placement.x, placement.y, placement.size);
        }

        if character.setup {
            if let Some(overlay) =
                self.options.setup_overlay.as_deref().and_then(|name| self.assets.get(name))
            {
                self.blit_contained(&mut img, &overlay, placement.x, placement.y, placement.size);
            }
        }

        // Everything above respects the token boundary; accents and text
        // below may bleed past it.
        mask_circle(&mut img, d / 2.0, d / 2.0, d / 2.0);

        let decorated = self.draw_accents(&mut img, d, seed);

        if let Some(layout) = &ability {
            let color = self.color(&text.ability_color, Rgba([26, 18, 16, 255]));
            draw_wrapped(&mut img, layout, &ability_font, ability_px, color, d / 2.0);
        }

        let name_px = d * text.name_size;
        draw_curved(
            &mut img,
            &character.name.to_uppercase(),
            d / 2.0,
            d / 2.0,
            d / 2.0 * text.name_radius,
            &name_font,
            name_px,
            ArcPosition::Bottom,
            self.color(&text.name_color, Rgba([26, 18, 16, 255])),
            name_px * text.letter_spacing,
            text.shadow_blur,
        );

        let count_cfg = &self.options.reminder_count;
        if count_cfg.enabled && !character.reminders.is_empty() {
            let (bx, by) = point_on_circle(
                d / 2.0,
                d / 2.0,
                d / 2.0 * 0.78,
                3.0 * std::f32::consts::FRAC_PI_4,
            );
            draw_count_badge(
                &mut img,
                character.reminders.len(),
                count_cfg.style,
                bx,
                by,
                d * count_cfg.size,
                count_cfg.dot_growth,
                &name_font,
                self.color(&count_cfg.color, Rgba([255, 255, 255, 255])),
                self.color(&count_cfg.background, Rgba([122, 31, 31, 255])),
            );
        }

        Ok((img, decorated))
    }

    fn validate_character(&self, character: &Character) -> Result<(), GenerateError> {
        if self.options.dpi == 0 {
            return Err(GenerateError::InvalidDpi);
        }
        if character.name.trim().is_empty() {
            return Err(GenerateError::MissingName(character.id.clone()));
        }
        Ok(())
    }
}

impl TokenRenderer for TokenGenerator<'_> {
    fn character_tokens(
        &self,
        character: &Character,
        base_order: usize,
    ) -> Result<Vec<Token>, GenerateError> {
        self.validate_character(character)?;
        let portraits = character.portrait.all();
        let total = portraits.len();
        let mut tokens = Vec::with_capacity(total);
        for (index, portrait_ref) in portraits.into_iter().enumerate() {
            let order = base_order + index;
            let seed = self.accent_seed(&character.uuid, order);
            let (surface, decorated) =
                self.render_character_surface(character, portrait_ref, seed)?;
            let variant = (total > 1).then_some((index, total));
            tokens.push(self.factory.character(surface, character, order, variant, decorated));
        }
        Ok(tokens)
    }

    fn reminder_token(
        &self,
        character: &Character,
        index: usize,
        order: usize,
    ) -> Result<Token, GenerateError> {
        self.validate_character(character)?;
        let reminder = character
            .reminders
            .get(index)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| GenerateError::EmptyReminder(character.id.clone()))?;

        let text = &self.options.text;
        let class = &self.options.reminder;
        let reminder_font = self.font(&text.reminder_font)?;

        let diameter = self.factory.diameter_px(TokenKind::Reminder);
        let d = diameter as f32;
        let mut img = self.background(diameter, class);

        let placement = icon_band(
            d,
            d * class.top_margin,
            d * class.icon_bottom,
            class.icon_scale,
            class.icon_offset * d,
        );
        if let Some(portrait) = self.assets.get(character.portrait.primary()) {
            self.blit_contained(&mut img, &portrait, placement.x, placement.y, placement.size);
        }
        mask_circle(&mut img, d / 2.0, d / 2.0, d / 2.0);

        let px = d * text.reminder_size;
        draw_curved(
            &mut img,
            &reminder.to_uppercase(),
            d / 2.0,
            d / 2.0,
            d / 2.0 * text.name_radius,
            &reminder_font,
            px,
            ArcPosition::Bottom,
            self.color(&text.reminder_color, Rgba([26, 18, 16, 255])),
            px * text.letter_spacing,
            text.shadow_blur,
        );

        Ok(self.factory.reminder(img, character, index, order, false))
    }

    fn meta_token(
        &self,
        kind: TokenKind,
        script: &ScriptMeta,
        order: usize,
    ) -> Result<Token, GenerateError> {
        if self.options.dpi == 0 {
            return Err(GenerateError::InvalidDpi);
        }
        let text = &self.options.text;
        let meta_font = self.font(&text.meta_font)?;
        let ink = self.color(&text.meta_color, Rgba([26, 18, 16, 255]));

        let diameter = self.factory.diameter_px(kind);
        let d = diameter as f32;
        let mut img = self.background(diameter, &self.options.character);
        mask_circle(&mut img, d / 2.0, d / 2.0, d / 2.0);

        match kind {
            TokenKind::ScriptName => {
                self.render_script_name(&mut img, script, d, &meta_font, ink);
            }
            TokenKind::Almanac => {
                self.render_almanac(&mut img, script, d, &meta_font, ink);
            }
            TokenKind::Pandemonium => {
                let px = d * 0.085;
                draw_centered(&mut img, "PANDEMONIUM", d / 2.0, d * 0.44, &meta_font, px, ink, 0.0);
                draw_centered(&mut img, "INSTITUTE", d / 2.0, d * 0.56, &meta_font, px, ink, 0.0);
                let sub_px = d * 0.05;
                draw_curved(
                    &mut img,
                    &script.title.to_uppercase(),
                    d / 2.0,
                    d / 2.0,
                    d / 2.0 * text.name_radius,
                    &meta_font,
                    sub_px,
                    ArcPosition::Bottom,
                    ink,
                    sub_px * text.letter_spacing,
                    text.shadow_blur,
                );
            }
            TokenKind::Bootlegger => {
                let note = wrap(
                    "This script contains homebrew characters",
                    d,
                    d * 0.05,
                    text.line_height,
                    d * 0.36,
                    text.padding_ratio,
                    meta_font.as_ref(),
                );
                draw_wrapped(&mut img, &note, &meta_font, d * 0.05, ink, d / 2.0);
                let px = d * text.name_size;
                draw_curved(
                    &mut img,
                    "BOOTLEGGER",
                    d / 2.0,
                    d / 2.0,
                    d / 2.0 * text.name_radius,
                    &meta_font,
                    px,
                    ArcPosition::Bottom,
                    ink,
                    px * text.letter_spacing,
                    text.shadow_blur,
                );
            }
            TokenKind::Character | TokenKind::Reminder => {
                unreachable!("meta_token only renders meta kinds")
            }
        }

        Ok(self.factory.meta(img, kind, order))
    }
}

impl TokenGenerator<'_> {
    /// Script-name layout: logo when it resolves, wrapped title text
    /// otherwise, plus an optional curved author line.
    fn render_script_name(
        &self,
        img: &mut RgbaImage,
        script: &ScriptMeta,
        d: f32,
        font: &LoadedFont,
        ink: Rgba<u8>,
    ) {
        let logo = script.logo.as_deref().and_then(|name| self.assets.get(name));
        match logo {
            Some(logo) => {
                let size = d * 0.56;
                self.blit_contained(img, &logo, d / 2.0 - size / 2.0, d * 0.18, size);
            }
            None => {
                let px = d * 0.09;
                let layout = wrap(
                    &script.title,
                    d,
                    px,
                    self.options.text.line_height,
                    d * 0.40,
                    self.options.text.padding_ratio,
                    font,
                );
                draw_wrapped(img, &layout, font, px, ink, d / 2.0);
            }
        }
        if let Some(author) = script.author.as_deref().filter(|a| !a.trim().is_empty()) {
            let px = d * 0.05;
            draw_curved(
                img,
                &format!("BY {}", author.to_uppercase()),
                d / 2.0,
                d / 2.0,
                d / 2.0 * self.options.text.name_radius,
                font,
                px,
                ArcPosition::Bottom,
                ink,
                px * self.options.text.letter_spacing,
                self.options.text.shadow_blur,
            );
        }
    }

    /// Almanac layout: styled QR, optional curved label, and a text
    /// plate carrying the script name.
    fn render_almanac(
        &self,
        img: &mut RgbaImage,
        script: &ScriptMeta,
        d: f32,
        font: &LoadedFont,
        ink: Rgba<u8>,
    ) {
        let Some(url) = script.almanac.as_deref().filter(|u| !u.trim().is_empty()) else {
            return;
        };
        let center_image = self
            .options
            .qr
            .center
            .as_ref()
            .and_then(|c| self.assets.get(&c.source));
        let qr_size = (d * 0.58).round() as u32;
        match qr::render(url, qr_size, &self.options.qr, center_image.as_deref()) {
            Ok(code) => {
                let x = (d / 2.0 - qr_size as f32 / 2.0).round() as i64;
                let y = (d * 0.16).round() as i64;
                image::imageops::overlay(img, &code, x, y);
            }
            Err(err) => {
                warn!("almanac QR for '{}' failed: {}; drawing title only", url, err);
            }
        }

        if self.options.meta.almanac_label {
            let px = d * 0.055;
            draw_curved(
                img,
                "ALMANAC",
                d / 2.0,
                d / 2.0,
                d / 2.0 * 0.94,
                font,
                px,
                ArcPosition::Top,
                ink,
                px * self.options.text.letter_spacing,
                self.options.text.shadow_blur,
            );
        }

        // Text plate behind the script name so it stays readable over
        // the quiet zone.
        let plate_y = d * 0.84;
        fill_rounded_rect(
            img,
            d / 2.0,
            plate_y,
            d * 0.32,
            d * 0.05,
            d * 0.02,
            Rgba([255, 255, 255, 255]),
        );
        draw_centered(img, &script.title, d / 2.0, plate_y, font, d * 0.055, ink, 0.0);
    }
}
