//! Generation options: schema, defaults, and loading.

pub mod loader;
pub mod schema;

pub use loader::{load_options, load_options_with, CliOverrides, ConfigError};
pub use schema::{
    AccentOptions, BackgroundKind, CenterImageOptions, CountStyle, FillKind, FillStyle,
    GenerationOptions, MetaOptions, ModuleShape, QrStyleOptions, ReminderCountOptions,
    TextOptions, TokenClassOptions,
};
