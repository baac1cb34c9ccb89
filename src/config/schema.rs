//! Configuration schema for token generation options
//!
//! Every option has an explicit default resolved once at deserialization;
//! the rendering core never falls back at use sites.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// How a token class paints its background
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundKind {
    /// Flat color fill
    #[default]
    Color,
    /// Named background image, center-cropped to cover the token
    Image,
}

/// Reminder-count badge style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CountStyle {
    /// Plain digits
    #[default]
    Arabic,
    /// Roman numerals
    Roman,
    /// Circled digits
    Circled,
    /// One dot per reminder
    Dots,
}

/// QR module / finder shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModuleShape {
    /// Plain squares
    #[default]
    Square,
    /// Rounded corners
    Rounded,
    /// Full circles
    Dot,
    /// Opposite corners rounded
    Classy,
}

/// QR fill kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FillKind {
    /// Single color
    #[default]
    Solid,
    /// Linear gradient along a rotated axis
    Linear,
    /// Radial gradient from the center
    Radial,
}

/// Per-token-class options (character/meta vs reminder)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClassOptions {
    /// Background mode for this class
    #[serde(default)]
    pub background: BackgroundKind,
    /// Flat background color (hex)
    #[serde(default = "default_background_color")]
    pub background_color: String,
    /// Background image asset reference (used when `background = "image"`)
    #[serde(default)]
    pub background_image: String,
    /// Physical token diameter in inches
    #[serde(default = "default_character_diameter")]
    pub diameter_in: f32,
    /// Fraction of the available band the icon occupies
    #[serde(default = "default_icon_scale")]
    pub icon_scale: f32,
    /// Vertical icon offset as a fraction of the diameter
    #[serde(default)]
    pub icon_offset: f32,
    /// Top margin (fraction of diameter) when no ability text is shown
    #[serde(default = "default_top_margin")]
    pub top_margin: f32,
    /// Bottom of the icon band as a fraction of the diameter
    #[serde(default = "default_icon_bottom")]
    pub icon_bottom: f32,
}

fn default_background_color() -> String {
    "#F4E8D0".to_string()
}

fn default_character_diameter() -> f32 {
    1.75
}

fn default_reminder_diameter() -> f32 {
    1.0
}

fn default_icon_scale() -> f32 {
    0.92
}

fn default_top_margin() -> f32 {
    0.12
}

fn default_icon_bottom() -> f32 {
    0.70
}

impl Default for TokenClassOptions {
    fn default() -> Self {
        Self {
            background: BackgroundKind::Color,
            background_color: default_background_color(),
            background_image: String::new(),
            diameter_in: default_character_diameter(),
            icon_scale: default_icon_scale(),
            icon_offset: 0.0,
            top_margin: default_top_margin(),
            icon_bottom: default_icon_bottom(),
        }
    }
}

impl TokenClassOptions {
    /// Defaults for the smaller reminder class.
    pub fn reminder_defaults() -> Self {
        Self { diameter_in: default_reminder_diameter(), ..Self::default() }
    }
}

/// Fonts and text colors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextOptions {
    /// Font family for the curved character name
    #[serde(default = "default_display_font")]
    pub name_font: String,
    /// Font family for ability text
    #[serde(default = "default_body_font")]
    pub ability_font: String,
    /// Font family for curved reminder text
    #[serde(default = "default_display_font")]
    pub reminder_font: String,
    /// Font family for meta token text
    #[serde(default = "default_display_font")]
    pub meta_font: String,
    /// Curved name color (hex)
    #[serde(default = "default_ink")]
    pub name_color: String,
    /// Ability text color (hex)
    #[serde(default = "default_ink")]
    pub ability_color: String,
    /// Reminder text color (hex)
    #[serde(default = "default_ink")]
    pub reminder_color: String,
    /// Meta token text color (hex)
    #[serde(default = "default_ink")]
    pub meta_color: String,
    /// Whether ability text is drawn at all
    #[serde(default = "default_true")]
    pub show_ability: bool,
    /// Extra spacing between curved characters, fraction of font size
    #[serde(default = "default_letter_spacing")]
    pub letter_spacing: f32,
    /// Curved name font size, fraction of token diameter
    #[serde(default = "default_name_size")]
    pub name_size: f32,
    /// Ability font size, fraction of token diameter
    #[serde(default = "default_ability_size")]
    pub ability_size: f32,
    /// Reminder font size, fraction of token diameter
    #[serde(default = "default_reminder_size")]
    pub reminder_size: f32,
    /// Line height multiplier for wrapped text
    #[serde(default = "default_line_height")]
    pub line_height: f32,
    /// Chord padding ratio: wrapped lines use this fraction of the chord
    #[serde(default = "default_padding_ratio")]
    pub padding_ratio: f32,
    /// Curved text baseline radius, fraction of the token radius
    #[serde(default = "default_name_radius")]
    pub name_radius: f32,
    /// Blur radius for the curved-text shadow, 0 disables
    #[serde(default)]
    pub shadow_blur: u32,
}

fn default_display_font() -> String {
    "display".to_string()
}

fn default_body_font() -> String {
    "body".to_string()
}

fn default_ink() -> String {
    "#1A1210".to_string()
}

fn default_true() -> bool {
    true
}

fn default_letter_spacing() -> f32 {
    0.06
}

fn default_name_size() -> f32 {
    0.085
}

fn default_ability_size() -> f32 {
    0.055
}

fn default_reminder_size() -> f32 {
    0.11
}

fn default_line_height() -> f32 {
    1.25
}

fn default_padding_ratio() -> f32 {
    0.88
}

fn default_name_radius() -> f32 {
    0.82
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            name_font: default_display_font(),
            ability_font: default_body_font(),
            reminder_font: default_display_font(),
            meta_font: default_display_font(),
            name_color: default_ink(),
            ability_color: default_ink(),
            reminder_color: default_ink(),
            meta_color: default_ink(),
            show_ability: true,
            letter_spacing: default_letter_spacing(),
            name_size: default_name_size(),
            ability_size: default_ability_size(),
            reminder_size: default_reminder_size(),
            line_height: default_line_height(),
            padding_ratio: default_padding_ratio(),
            name_radius: default_name_radius(),
            shadow_blur: 0,
        }
    }
}

/// Reminder-count badge options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderCountOptions {
    /// Whether the badge is drawn
    #[serde(default)]
    pub enabled: bool,
    /// Badge style
    #[serde(default)]
    pub style: CountStyle,
    /// Glyph/dot color (hex)
    #[serde(default = "default_badge_ink")]
    pub color: String,
    /// Badge disc color (hex)
    #[serde(default = "default_badge_disc")]
    pub background: String,
    /// Badge radius, fraction of token diameter
    #[serde(default = "default_badge_size")]
    pub size: f32,
    /// Dots style: radius growth per extra dot (fraction of base radius)
    #[serde(default = "default_dot_growth")]
    pub dot_growth: f32,
}

fn default_badge_ink() -> String {
    "#FFFFFF".to_string()
}

fn default_badge_disc() -> String {
    "#7A1F1F".to_string()
}

fn default_badge_size() -> f32 {
    0.09
}

fn default_dot_growth() -> f32 {
    0.15
}

impl Default for ReminderCountOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            style: CountStyle::Arabic,
            color: default_badge_ink(),
            background: default_badge_disc(),
            size: default_badge_size(),
            dot_growth: default_dot_growth(),
        }
    }
}

/// Decorative accent options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccentOptions {
    /// Master switch
    #[serde(default)]
    pub enabled: bool,
    /// Arc accent image asset reference
    #[serde(default = "default_accent_asset")]
    pub asset: String,
    /// Side accent image asset reference; empty reuses `asset`
    #[serde(default)]
    pub side_asset: String,
    /// Cap on arc accents per token
    #[serde(default = "default_max_accents")]
    pub max_accents: u32,
    /// Per-slot fill probability
    #[serde(default = "default_population")]
    pub population: f64,
    /// Angular span of the arc slots, degrees, centered at twelve o'clock
    #[serde(default = "default_arc_span")]
    pub arc_span_deg: f32,
    /// Number of arc slots
    #[serde(default = "default_slots")]
    pub slots: u32,
    /// Whether a left side accent may appear
    #[serde(default)]
    pub side_left: bool,
    /// Whether a right side accent may appear
    #[serde(default)]
    pub side_right: bool,
    /// Side accent probability
    #[serde(default = "default_side_probability")]
    pub side_probability: f64,
    /// Arc accent distance from center, fraction of token radius
    #[serde(default = "default_radial_ratio")]
    pub radial_ratio: f32,
    /// Side accent distance from center, fraction of token radius
    #[serde(default = "default_side_radial_ratio")]
    pub side_radial_ratio: f32,
    /// Accent image size, fraction of token diameter
    #[serde(default = "default_accent_scale")]
    pub scale: f32,
    /// Fixed seed for reproducible placement; `None` derives per render
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_accent_asset() -> String {
    "leaf".to_string()
}

fn default_max_accents() -> u32 {
    5
}

fn default_population() -> f64 {
    0.5
}

fn default_arc_span() -> f32 {
    150.0
}

fn default_slots() -> u32 {
    7
}

fn default_side_probability() -> f64 {
    0.25
}

fn default_radial_ratio() -> f32 {
    0.92
}

fn default_side_radial_ratio() -> f32 {
    0.88
}

fn default_accent_scale() -> f32 {
    0.14
}

impl Default for AccentOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            asset: default_accent_asset(),
            side_asset: String::new(),
            max_accents: default_max_accents(),
            population: default_population(),
            arc_span_deg: default_arc_span(),
            slots: default_slots(),
            side_left: false,
            side_right: false,
            side_probability: default_side_probability(),
            radial_ratio: default_radial_ratio(),
            side_radial_ratio: default_side_radial_ratio(),
            scale: default_accent_scale(),
            seed: None,
        }
    }
}

/// QR gradient/solid fill
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillStyle {
    /// Solid, linear, or radial
    #[serde(default)]
    pub kind: FillKind,
    /// Start color (hex); the solid fill uses only this
    #[serde(default = "default_qr_ink")]
    pub start: String,
    /// End color (hex); empty repeats `start`
    #[serde(default)]
    pub end: String,
    /// Gradient axis rotation, degrees
    #[serde(default)]
    pub rotation_deg: f32,
}

fn default_qr_ink() -> String {
    "#000000".to_string()
}

impl Default for FillStyle {
    fn default() -> Self {
        Self {
            kind: FillKind::Solid,
            start: default_qr_ink(),
            end: String::new(),
            rotation_deg: 0.0,
        }
    }
}

/// Center image composited over the QR code
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CenterImageOptions {
    /// Asset reference for the center image
    pub source: String,
    /// Window size as a fraction of the matrix width
    #[serde(default = "default_center_ratio")]
    pub size_ratio: f32,
    /// Clear margin around the image, in modules
    #[serde(default = "default_center_margin")]
    pub margin_modules: f32,
}

fn default_center_ratio() -> f32 {
    0.2
}

fn default_center_margin() -> f32 {
    1.0
}

/// QR styling options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrStyleOptions {
    /// Data module shape
    #[serde(default)]
    pub data_shape: ModuleShape,
    /// Corner finder ring shape
    #[serde(default)]
    pub finder_shape: ModuleShape,
    /// Corner finder dot shape
    #[serde(default)]
    pub finder_dot_shape: ModuleShape,
    /// Module fill
    #[serde(default)]
    pub fill: FillStyle,
    /// Background plate color (hex)
    #[serde(default = "default_qr_background")]
    pub background_color: String,
    /// Background plate opacity, 0 disables the plate
    #[serde(default = "default_true_f32")]
    pub background_opacity: f32,
    /// Optional center image
    #[serde(default)]
    pub center: Option<CenterImageOptions>,
}

fn default_qr_background() -> String {
    "#FFFFFF".to_string()
}

fn default_true_f32() -> f32 {
    1.0
}

impl Default for QrStyleOptions {
    fn default() -> Self {
        Self {
            data_shape: ModuleShape::Square,
            finder_shape: ModuleShape::Square,
            finder_dot_shape: ModuleShape::Square,
            fill: FillStyle::default(),
            background_color: default_qr_background(),
            background_opacity: 1.0,
            center: None,
        }
    }
}

/// Which meta tokens the batch appends
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaOptions {
    /// Script-name token
    #[serde(default = "default_true")]
    pub script_name: bool,
    /// Almanac QR token (also requires an almanac URL)
    #[serde(default = "default_true")]
    pub almanac: bool,
    /// Curved "ALMANAC" label on the QR token
    #[serde(default = "default_true")]
    pub almanac_label: bool,
    /// Pandemonium token
    #[serde(default)]
    pub pandemonium: bool,
    /// Bootlegger token
    #[serde(default)]
    pub bootlegger: bool,
}

impl Default for MetaOptions {
    fn default() -> Self {
        Self {
            script_name: true,
            almanac: true,
            almanac_label: true,
            pandemonium: false,
            bootlegger: false,
        }
    }
}

/// The full generation option record.
///
/// An immutable snapshot passed into each generation call; the rendering
/// core never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Pixels per inch; token diameter in pixels is `diameter_in * dpi`
    #[serde(default = "default_dpi")]
    pub dpi: u32,
    /// Leave the area outside the token circle transparent and skip the
    /// background fill fallback
    #[serde(default)]
    pub transparent_background: bool,
    /// Character/meta token class options
    #[serde(default)]
    pub character: TokenClassOptions,
    /// Reminder token class options
    #[serde(default = "TokenClassOptions::reminder_defaults")]
    pub reminder: TokenClassOptions,
    /// Fonts and text colors
    #[serde(default)]
    pub text: TextOptions,
    /// Reminder-count badge
    #[serde(default)]
    pub reminder_count: ReminderCountOptions,
    /// Decorative accents
    #[serde(default)]
    pub accents: AccentOptions,
    /// QR styling
    #[serde(default)]
    pub qr: QrStyleOptions,
    /// Meta token switches
    #[serde(default)]
    pub meta: MetaOptions,
    /// Setup overlay asset, drawn over setup characters' icons
    #[serde(default)]
    pub setup_overlay: Option<String>,
    /// Font family name to font file path, consumed by the driver
    #[serde(default)]
    pub fonts: HashMap<String, PathBuf>,
}

fn default_dpi() -> u32 {
    300
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            dpi: default_dpi(),
            transparent_background: false,
            character: TokenClassOptions::default(),
            reminder: TokenClassOptions::reminder_defaults(),
            text: TextOptions::default(),
            reminder_count: ReminderCountOptions::default(),
            accents: AccentOptions::default(),
            qr: QrStyleOptions::default(),
            meta: MetaOptions::default(),
            setup_overlay: None,
            fonts: HashMap::new(),
        }
    }
}

impl GenerationOptions {
    /// Validate option ranges, returning every problem found.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.dpi == 0 {
            errors.push("dpi must be positive".to_string());
        }
        if self.character.diameter_in <= 0.0 {
            errors.push("character.diameter_in must be positive".to_string());
        }
        if self.reminder.diameter_in <= 0.0 {
            errors.push("reminder.diameter_in must be positive".to_string());
        }
        if !(0.0..=1.0).contains(&self.accents.population) {
            errors.push("accents.population must be within 0..=1".to_string());
        }
        if !(0.0..=1.0).contains(&self.accents.side_probability) {
            errors.push("accents.side_probability must be within 0..=1".to_string());
        }
        if self.text.padding_ratio <= 0.0 || self.text.padding_ratio > 1.0 {
            errors.push("text.padding_ratio must be within (0, 1]".to_string());
        }
        errors
    }
}
