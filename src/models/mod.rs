//! Data model: characters, script metadata, and rendered tokens.

pub mod character;
pub mod script;
pub mod token;

pub use character::{Character, PortraitRef, Team};
pub use script::ScriptMeta;
pub use token::{Token, TokenKind};
