//! Rendered token records.

use image::RgbaImage;
use uuid::Uuid;

use super::character::Team;

/// What kind of badge a token is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A character's main token
    Character,
    /// One reminder badge belonging to a character
    Reminder,
    /// Script title meta token
    ScriptName,
    /// QR-coded almanac link meta token
    Almanac,
    /// Pandemonium meta token
    Pandemonium,
    /// Custom-script notice meta token
    Bootlegger,
}

impl TokenKind {
    /// Whether this kind uses the smaller reminder base size.
    pub fn is_reminder_sized(self) -> bool {
        matches!(self, TokenKind::Reminder)
    }

    /// Short tag used in output file names and progress labels.
    pub fn tag(self) -> &'static str {
        match self {
            TokenKind::Character => "character",
            TokenKind::Reminder => "reminder",
            TokenKind::ScriptName => "script-name",
            TokenKind::Almanac => "almanac",
            TokenKind::Pandemonium => "pandemonium",
            TokenKind::Bootlegger => "bootlegger",
        }
    }
}

/// One rendered token.
///
/// Immutable once created: a re-render always produces a new `Token`, so
/// callers may keep references to previous results while regenerating.
#[derive(Debug, Clone)]
pub struct Token {
    /// Token kind tag
    pub kind: TokenKind,
    /// Owning character, `None` for meta tokens
    pub character: Option<Uuid>,
    /// The rendered raster surface
    pub surface: RgbaImage,
    /// Surface diameter in pixels (`base inches x DPI`)
    pub diameter_px: u32,
    /// Owning character's team, `None` for meta tokens
    pub team: Option<Team>,
    /// Position in the generation sequence; consumers sort by this
    pub order: usize,
    /// `(index, total)` when the character has portrait variants
    pub variant: Option<(usize, usize)>,
    /// Whether the character came from official reference data
    pub official: Option<bool>,
    /// Whether decorative accents were placed on this render
    pub decorated: bool,
    /// Filename-friendly identity (character id plus kind/index suffixes)
    pub slug: String,
}
