// docshift: convert HTML documentation sources to AsciiDoc, Markdown or
// sanitized HTML from the command line.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use docshift::{BatchInput, ConversionOptions, Substitutions, TargetFormat, convert_batch};

/// Attribute file written next to the converted documents
const VARIABLES_FILE: &str = "variables.adoc";

#[derive(Debug, Parser)]
#[command(name = "docshift", version, about = "Convert HTML documentation to AsciiDoc, Markdown or HTML")]
struct Args {
    /// HTML files to convert
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<PathBuf>,

    /// Target format: asciidoc, markdown or html
    #[arg(long, value_name = "FORMAT")]
    to: TargetFormat,

    /// Directory for converted files; a single input without it goes to stdout
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// JSON file with conversion options
    #[arg(long, value_name = "FILE")]
    options: Option<PathBuf>,

    /// Emit collapsible sections as foldable blocks
    #[arg(long)]
    collapsible: bool,

    /// Extract variables into an attributes file (AsciiDoc only)
    #[arg(long)]
    extract_variables: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let options = load_options(&args)?;

    let inputs = args
        .inputs
        .iter()
        .map(|path| {
            let html = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
            Ok(BatchInput::new(path.display().to_string(), html))
        })
        .collect::<Result<Vec<_>>>()?;

    let outcomes = convert_batch(&inputs, args.to, &options, &Substitutions::default())?;

    if let Some(dir) = &args.out_dir {
        std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let to_stdout = args.out_dir.is_none() && args.inputs.len() == 1;

    let mut variables: BTreeSet<String> = BTreeSet::new();
    let mut failed = 0usize;
    for (path, outcome) in args.inputs.iter().zip(outcomes) {
        let result = match outcome.result {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("{}: {}", outcome.name, e);
                failed += 1;
                continue;
            }
        };
        for warning in &result.metadata.warnings {
            tracing::warn!("{}: {}", outcome.name, warning);
        }
        if let Some(file) = &result.variables_file {
            variables.extend(file.lines().map(str::to_string));
        }

        if to_stdout {
            print!("{}", result.content);
        } else {
            let target = output_path(path, args.out_dir.as_deref(), args.to);
            std::fs::write(&target, &result.content)
                .with_context(|| format!("Failed to write {}", target.display()))?;
            tracing::info!("Wrote {}", target.display());
        }
    }

    if !variables.is_empty() {
        let dir = args.out_dir.clone().unwrap_or_else(|| PathBuf::from("."));
        let target = dir.join(VARIABLES_FILE);
        let body: String = variables.iter().map(|line| format!("{line}\n")).collect();
        std::fs::write(&target, body).with_context(|| format!("Failed to write {}", target.display()))?;
        tracing::info!("Wrote {} attributes to {}", variables.len(), target.display());
    }

    if failed > 0 {
        bail!("{failed} of {} documents failed to convert", args.inputs.len());
    }
    Ok(())
}

fn load_options(args: &Args) -> Result<ConversionOptions> {
    let mut options = match &args.options {
        Some(path) => ConversionOptions::from_json_file(path)
            .with_context(|| format!("Failed to load options from {}", path.display()))?,
        None => ConversionOptions::default(),
    };
    if args.collapsible {
        options.use_collapsible_blocks = true;
    }
    if args.extract_variables {
        options.extract_variables = true;
    }
    Ok(options)
}

/// `<stem>.<ext>` in the output directory, else beside the input
fn output_path(input: &Path, out_dir: Option<&Path>, format: TargetFormat) -> PathBuf {
    let file_name = input
        .with_extension(format.extension())
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(format!("output.{}", format.extension())));
    match out_dir {
        Some(dir) => dir.join(file_name),
        None => input.with_extension(format.extension()),
    }
}
