//! Command-line interface implementation

use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::assets::{AssetCache, DirResolver};
use crate::config::{load_options_with, CliOverrides, GenerationOptions};
use crate::font::FontStore;
use crate::generator::TokenGenerator;
use crate::models::{Character, ScriptMeta, Token};
use crate::output::{save_png, token_path};
use crate::pipeline::{BatchPipeline, ConsoleProgress};

/// Exit codes
const EXIT_SUCCESS: u8 = 0;
const EXIT_ERROR: u8 = 1;
const EXIT_INVALID_ARGS: u8 = 2;

/// Tokensmith - render circular game tokens from a character roster
#[derive(Parser)]
#[command(name = "tks")]
#[command(about = "Tokensmith - render circular game tokens from a character roster")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render every token for a script file to PNG
    Generate {
        /// Input JSON file: a character array, or an object with
        /// `characters` and optional `script` metadata
        input: PathBuf,

        /// Options TOML file
        #[arg(short = 'c', long)]
        options: Option<PathBuf>,

        /// Output directory (default: "tokens")
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Asset directory for portraits, backgrounds, accents
        /// (default: the input file's directory)
        #[arg(short, long)]
        assets: Option<PathBuf>,

        /// Override DPI
        #[arg(long)]
        dpi: Option<u32>,

        /// Render with transparent backgrounds
        #[arg(long)]
        transparent: bool,

        /// Fixed accent seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// Print one line per token
        #[arg(long)]
        verbose: bool,
    },
    /// Print the analytic accent-count probability table
    AccentOdds {
        /// Options TOML file
        #[arg(short = 'c', long)]
        options: Option<PathBuf>,
    },
}

/// Script input: either a bare roster array or an object with metadata.
#[derive(Deserialize)]
#[serde(untagged)]
enum ScriptFile {
    Roster(Vec<Character>),
    Full {
        characters: Vec<Character>,
        #[serde(default)]
        script: Option<ScriptMeta>,
    },
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            input,
            options,
            out,
            assets,
            dpi,
            transparent,
            seed,
            verbose,
        } => run_generate(
            &input,
            options.as_deref(),
            out.as_deref(),
            assets.as_deref(),
            dpi,
            transparent,
            seed,
            verbose,
        ),
        Commands::AccentOdds { options } => run_accent_odds(options.as_deref()),
    }
}

fn load_merged_options(
    path: Option<&Path>,
    overrides: &CliOverrides,
) -> Result<GenerationOptions, ExitCode> {
    load_options_with(path, overrides).map_err(|err| {
        eprintln!("error: {}", err);
        ExitCode::from(EXIT_INVALID_ARGS)
    })
}

fn run_generate(
    input: &Path,
    options_path: Option<&Path>,
    out: Option<&Path>,
    assets: Option<&Path>,
    dpi: Option<u32>,
    transparent: bool,
    seed: Option<u64>,
    verbose: bool,
) -> ExitCode {
    let overrides = CliOverrides {
        dpi,
        transparent: transparent.then_some(true),
        seed,
    };
    let options = match load_merged_options(options_path, &overrides) {
        Ok(o) => o,
        Err(code) => return code,
    };

    let content = match std::fs::read_to_string(input) {
        Ok(c) => c,
        Err(err) => {
            eprintln!("error: cannot read {}: {}", input.display(), err);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };
    let (characters, script) = match serde_json::from_str::<ScriptFile>(&content) {
        Ok(ScriptFile::Roster(characters)) => (characters, None),
        Ok(ScriptFile::Full { characters, script }) => (characters, script),
        Err(err) => {
            eprintln!("error: cannot parse {}: {}", input.display(), err);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let mut fonts = FontStore::new();
    for (family, path) in &options.fonts {
        if let Err(err) = fonts.load_file(family, path) {
            eprintln!("error: font '{}' ({}): {}", family, path.display(), err);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    }
    if fonts.is_empty() {
        eprintln!(
            "error: no fonts configured; add a [fonts] table mapping \
             family names to font files"
        );
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let asset_root = assets
        .map(Path::to_path_buf)
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));
    let cache = AssetCache::new(Box::new(DirResolver::new(asset_root)));

    let out_dir = out.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("tokens"));
    let generator = TokenGenerator::new(&options, &fonts, &cache);
    let progress = ConsoleProgress::new().with_verbose(verbose);

    // Save incrementally as tokens arrive rather than at batch end.
    let mut save_errors = 0usize;
    let mut sink = |token: &Token| {
        let path = token_path(&out_dir, token);
        if let Err(err) = save_png(&token.surface, &path) {
            eprintln!("error: saving {}: {}", path.display(), err);
            save_errors += 1;
        }
    };

    let result = BatchPipeline::new(&generator, &options)
        .with_progress(&progress)
        .generate(&characters, script.as_ref(), Some(&mut sink));

    for skipped in &result.skipped {
        eprintln!("warning: skipped {}: {}", skipped.label, skipped.reason);
    }
    if save_errors > 0 || !result.skipped.is_empty() {
        ExitCode::from(EXIT_ERROR)
    } else {
        ExitCode::from(EXIT_SUCCESS)
    }
}

fn run_accent_odds(options_path: Option<&Path>) -> ExitCode {
    let options = match load_merged_options(options_path, &CliOverrides::default()) {
        Ok(o) => o,
        Err(code) => return code,
    };
    let distribution = crate::accents::distribution(&options.accents);
    println!("accent count probabilities:");
    for (label, p) in distribution.buckets() {
        println!("  {:>3}: {:5.1}%", label, p * 100.0);
    }
    ExitCode::from(EXIT_SUCCESS)
}
