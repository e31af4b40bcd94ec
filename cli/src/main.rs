//! pageir CLI - build and check grid-layout documents

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pageir::render::{render_pages, to_json_value};
use pageir::{
    BuildOptions, BuildOutput, Diagnostic, DocumentBuilder, FsAssets, JsonFormat, Severity,
    SourceTree,
};

#[derive(Parser)]
#[command(name = "pageir")]
#[command(version)]
#[command(about = "Build grid-layout document IR from parsed node trees", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a document and print its IR as JSON
    Build {
        /// Parsed node tree (JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Emit merged, placed render contexts instead of the document
        #[arg(long)]
        render: bool,

        /// Treat missing assets as errors
        #[arg(long)]
        strict: bool,

        /// Base directory for relative asset paths
        #[arg(long, value_name = "DIR", env = "PAGEIR_ASSETS_DIR")]
        assets_dir: Option<PathBuf>,
    },

    /// Build a document and report diagnostics only
    Check {
        /// Parsed node tree (JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Treat missing assets as errors
        #[arg(long)]
        strict: bool,

        /// Print diagnostics as JSON
        #[arg(long)]
        json: bool,

        /// Base directory for relative asset paths
        #[arg(long, value_name = "DIR", env = "PAGEIR_ASSETS_DIR")]
        assets_dir: Option<PathBuf>,
    },

    /// Build several documents in parallel
    Batch {
        /// Parsed node trees (JSON)
        #[arg(value_name = "FILES", required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show document information
    Info {
        /// Parsed node tree (JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let result = match cli.command {
        Commands::Build {
            input,
            output,
            compact,
            render,
            strict,
            assets_dir,
        } => cmd_build(
            &input,
            output.as_deref(),
            compact,
            render,
            strict,
            assets_dir.as_deref(),
        ),
        Commands::Check {
            input,
            strict,
            json,
            assets_dir,
        } => cmd_check(&input, strict, json, assets_dir.as_deref()),
        Commands::Batch {
            inputs,
            output,
            compact,
        } => cmd_batch(&inputs, &output, compact),
        Commands::Info { input } => cmd_info(&input),
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Error,
        1 => log::LevelFilter::Warn,
        2 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn json_format(compact: bool) -> JsonFormat {
    if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    }
}

fn asset_base(input: &Path, assets_dir: Option<&Path>) -> PathBuf {
    assets_dir
        .map(Path::to_path_buf)
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn build_file(input: &Path, assets: FsAssets) -> Result<BuildOutput, Box<dyn std::error::Error>> {
    let tree = SourceTree::from_json_file(input)?;
    let builder = DocumentBuilder::new(BuildOptions::default().with_font_check(false))
        .with_assets(assets);
    Ok(builder.build(&tree))
}

fn print_diagnostics(output: &BuildOutput, strict: bool) {
    for d in output.diagnostics.iter() {
        eprintln!("{}", format_diagnostic(d, strict));
    }
}

fn format_diagnostic(d: &Diagnostic, strict: bool) -> String {
    let label = if d.is_blocking(strict) {
        "error".red().bold()
    } else {
        match d.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
        }
    };
    let location = match (&d.page, &d.element) {
        (Some(page), Some(element)) => format!(" [{}/{}]", page, element),
        (Some(page), None) => format!(" [{}]", page),
        _ => String::new(),
    };
    format!("{}: {}{}", label, d.message, location.dimmed())
}

fn blocking_summary(output: &BuildOutput, strict: bool) -> Result<(), Box<dyn std::error::Error>> {
    let blocking = output.blocking(strict).count();
    if blocking > 0 {
        return Err(format!("build failed with {} blocking diagnostic(s)", blocking).into());
    }
    Ok(())
}

fn cmd_build(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    render: bool,
    strict: bool,
    assets_dir: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let assets = FsAssets::new(asset_base(input, assets_dir));
    let result = build_file(input, assets.clone())?;
    print_diagnostics(&result, strict);
    blocking_summary(&result, strict)?;

    let format = json_format(compact);
    let json = if render {
        let pages = render_pages(&result.document, &assets);
        to_json_value(&pages, format)?
    } else {
        pageir::render::to_json(&result.document, format)?
    };

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_check(
    input: &Path,
    strict: bool,
    json: bool,
    assets_dir: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = build_file(input, FsAssets::new(asset_base(input, assets_dir)))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result.diagnostics)?);
    } else {
        print_diagnostics(&result, strict);
        let errors = result.diagnostics.errors().count();
        let warnings = result.diagnostics.warnings().count();
        println!(
            "{} {} error(s), {} warning(s)",
            "Checked".green().bold(),
            errors,
            warnings
        );
    }

    blocking_summary(&result, strict)
}

fn cmd_batch(
    inputs: &[PathBuf],
    output_dir: &Path,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    fs::create_dir_all(output_dir)?;

    let pb = ProgressBar::new(inputs.len() as u64 * 2);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")?
            .progress_chars("#>-"),
    );

    pb.set_message("Reading trees...");
    let mut trees = Vec::with_capacity(inputs.len());
    for input in inputs {
        trees.push(SourceTree::from_json_file(input)?);
        pb.inc(1);
    }

    pb.set_message("Building...");
    let options = BuildOptions::default().offline();
    let outputs = pageir::build_all(&trees, &options);

    let mut failed = 0;
    for (input, result) in inputs.iter().zip(&outputs) {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        let json = pageir::render::to_json(&result.document, json_format(compact))?;
        fs::write(output_dir.join(format!("{}.json", stem)), &json)?;
        if result.has_errors() {
            failed += 1;
        }
        pb.inc(1);
    }
    pb.finish_with_message("Done!");

    println!(
        "\n{} {} built, {} with errors",
        "Done!".green().bold(),
        outputs.len(),
        failed
    );
    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let tree = SourceTree::from_json_file(input)?;
    let result = DocumentBuilder::new(BuildOptions::default().offline()).build(&tree);
    let doc = &result.document;
    let (width, height) = doc.dimensions();

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!(
        "{}: {:.0} x {:.0} mm ({})",
        "Page size".bold(),
        width,
        height,
        doc.orientation
    );
    println!("{}: {}x{}", "Grid".bold(), doc.grid.cols, doc.grid.rows);
    if let Some(font) = &doc.font {
        println!("{}: {}", "Font".bold(), font);
    }
    if let Some(master) = &doc.default_master {
        println!("{}: {}", "Default master".bold(), master);
    }

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "Pages".bold(), doc.page_count());
    println!("{}: {}", "Masters".bold(), doc.masters.len());
    println!("{}: {}", "Elements".bold(), doc.element_count());
    println!("{}: {}", "Styles".bold(), doc.styles.names().join(", "));
    println!(
        "{}: {} error(s), {} warning(s)",
        "Diagnostics".bold(),
        result.diagnostics.errors().count(),
        result.diagnostics.warnings().count()
    );

    Ok(())
}
