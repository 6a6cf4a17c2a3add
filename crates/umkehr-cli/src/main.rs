// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Umkehr: invert the colours of selected PDF pages.
//
// Entry point. Parses arguments, initialises logging, binds PDFium and runs
// the document pipeline once.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

use clap::Parser;
use tracing::{debug, error};
use umkehr_core::human_errors::humanize_error;
use umkehr_core::{ImageEncoding, PipelineConfig, UmkehrError};
use umkehr_document::{
    DocumentPipeline, InputSource, PdfProvider, PdfiumRenderer, PipelineRequest,
};

#[derive(Parser, Debug)]
#[command(
    name = "umkehr",
    about = "Invert the colours of selected PDF pages",
    version
)]
struct Cli {
    /// Input PDF file, or "-" to read it from standard input
    input: String,

    /// Pages to invert (e.g. "all", "3", "1-4,9")
    #[arg(short, long, default_value = "all")]
    pages: String,

    /// Pages to delete before inverting; numbering refers to the input
    #[arg(short, long)]
    remove: Option<String>,

    /// File name of the result
    #[arg(short, long)]
    output: String,

    /// Directory the result is written to
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Rendering resolution in dots per inch
    #[arg(long)]
    dpi: Option<f32>,

    /// Store inverted pages as JPEG with this quality (1-100) instead of losslessly
    #[arg(long)]
    jpeg_quality: Option<u8>,

    /// Stretch the inverted raster to fill the page box
    #[arg(long)]
    stretch: bool,

    /// Render pages with an alpha channel
    #[arg(long)]
    render_alpha: bool,

    /// Leave alpha samples untouched when inverting
    #[arg(long)]
    preserve_alpha: bool,

    /// JSON configuration file; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory containing the PDFium library
    #[arg(long)]
    pdfium_lib: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "umkehr failed");
            let human = humanize_error(&err);
            eprintln!("error: {}", human.message);
            eprintln!("  {}", human.suggestion);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<PathBuf, UmkehrError> {
    let config = build_config(&cli)?;
    debug!(?config, "Effective configuration");

    let input = if cli.input == "-" {
        let mut bytes = Vec::new();
        std::io::stdin().read_to_end(&mut bytes)?;
        InputSource::Bytes(bytes)
    } else {
        InputSource::Path(PathBuf::from(&cli.input))
    };

    let mut request = PipelineRequest::new(input, cli.pages.as_str(), cli.output.as_str());
    if let Some(expression) = &cli.remove {
        request = request.with_removal(expression.as_str());
    }

    let renderer = PdfiumRenderer::bind(cli.pdfium_lib.as_deref())?;
    let pipeline = DocumentPipeline::new(PdfProvider::new(Rc::new(renderer)));
    pipeline.run(&request, &config)
}

/// Start from the config file (or defaults) and apply command-line overrides.
fn build_config(cli: &Cli) -> Result<PipelineConfig, UmkehrError> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };

    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(dpi) = cli.dpi {
        config.render_dpi = dpi;
    }
    if let Some(quality) = cli.jpeg_quality {
        config.encoding = ImageEncoding::Jpeg { quality };
    }
    if cli.stretch {
        config.preserve_aspect_ratio = false;
    }
    if cli.render_alpha {
        config.render_alpha = true;
    }
    if cli.preserve_alpha {
        config.preserve_alpha = true;
    }

    config.validate()?;
    Ok(config)
}
