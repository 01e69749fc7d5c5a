//! distill CLI
//!
//! Distills one source file into a compact API view on stdout.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use distill_ast::LanguageId;
use distiller::{DistillConfig, Distiller, OutputFormat};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Distill a source file to its public API
#[derive(Parser, Debug)]
#[command(name = "distill")]
#[command(version = distiller::VERSION)]
#[command(after_help = "EXAMPLES:
  # Public API of a PHP class, rendered as Swift
  distill src/User.php

  # Everything, including private members and bodies
  distill src/User.php --private --protected --implementation

  # The filtered IR as JSON
  distill src/User.php --format json
")]
struct Cli {
    /// Source file to distill
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// JSON configuration file; flags override its filter settings
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Target language of the text projection
    #[arg(long = "target", value_name = "LANG")]
    target: Option<String>,

    /// Output format
    #[arg(long = "format", value_enum)]
    format: Option<FormatArg>,

    /// Include private members
    #[arg(long = "private")]
    include_private: bool,

    /// Include protected members
    #[arg(long = "protected")]
    include_protected: bool,

    /// Include internal members
    #[arg(long = "internal")]
    include_internal: bool,

    /// Include function bodies
    #[arg(long = "implementation")]
    include_implementation: bool,

    /// Include comments
    #[arg(long = "comments")]
    include_comments: bool,

    /// Omit imports
    #[arg(long = "no-imports")]
    no_imports: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

impl Cli {
    fn into_config(self) -> Result<(PathBuf, DistillConfig)> {
        let mut config = match &self.config {
            Some(path) => DistillConfig::load(path)?,
            None => DistillConfig::default(),
        };

        if let Some(tag) = &self.target {
            config.target = match LanguageId::from_tag(tag) {
                LanguageId::Unknown => anyhow::bail!("unknown target language '{}'", tag),
                language => language,
            };
        }
        if let Some(format) = self.format {
            config.filter.format = format.into();
        }

        let filter = &mut config.filter;
        filter.include_private |= self.include_private;
        filter.include_protected |= self.include_protected;
        filter.include_internal |= self.include_internal;
        filter.include_implementation |= self.include_implementation;
        filter.include_comments |= self.include_comments;
        if self.no_imports {
            filter.include_imports = false;
        }

        Ok((self.input, config))
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(filter),
        )
        .try_init();
}

fn main() -> Result<()> {
    init_logging();

    let (input, config) = Cli::parse().into_config()?;
    let source = std::fs::read(&input).with_context(|| format!("reading {}", input.display()))?;
    let filename = input.to_string_lossy();

    let output = Distiller::new(config)
        .distill(&source, &filename)
        .with_context(|| format!("distilling {}", input.display()))?;

    print!("{}", output);
    if !output.ends_with('\n') {
        println!();
    }
    Ok(())
}
