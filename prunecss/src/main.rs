use clap::Parser;
use log::LevelFilter;
use prunecss_lib::config::{self, Config};
use prunecss_lib::prune::{self, RunSummary};
use prunecss_lib::{PruneError, PruneOptions};
use std::path::PathBuf;

const PRUNECSS_INTRO: &str = r#"
    PruneCSS - remove stylesheet rules nothing references
"#;

#[derive(Parser)]
#[command(name = "prunecss")]
#[command(about = "Remove unused CSS rules while leaving every other byte untouched")]
struct Args {
    /// Stylesheets to prune (paths or glob patterns).
    stylesheets: Vec<String>,

    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// HTML files scanned for class and id references.
    #[arg(short, long)]
    markup: Vec<String>,

    /// Script files scanned for selector references.
    #[arg(short, long)]
    script: Vec<String>,

    /// Extra tokens treated as used, e.g. `.js-only` or `#modal`.
    #[arg(short, long)]
    keep: Vec<String>,

    /// Report whether these tokens were found before pruning.
    #[arg(long)]
    verify: Vec<String>,

    /// Show what would be removed without writing files.
    #[arg(long)]
    dry_run: bool,

    /// Do not write `.backup` copies of changed stylesheets.
    #[arg(long)]
    no_backup: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    // parse the args given in terminal
    let args: Args = Args::parse();
    init_logger(args.verbose);

    println!("{}", PRUNECSS_INTRO);

    match load_config(&args).and_then(|(config, options)| prune::run(&config, &options)) {
        Ok(summary) => print_summary(&summary),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// Merges the optional config file with command-line arguments. Flags extend
/// the configured lists; `--no-backup` and `--dry-run` override.
fn load_config(args: &Args) -> Result<(Config, PruneOptions), PruneError> {
    let mut config = match &args.config {
        Some(path) => config::load(path)?,
        None => Config::default(),
    };

    config.stylesheets.extend(args.stylesheets.iter().cloned());
    config.markup.extend(args.markup.iter().cloned());
    config.scripts.extend(args.script.iter().cloned());
    config.always_keep.extend(args.keep.iter().cloned());
    config.verify.extend(args.verify.iter().cloned());
    if args.no_backup {
        config.backup = false;
    }

    let mut options = PruneOptions::from_config(&config);
    options.dry_run = args.dry_run;
    Ok((config, options))
}

fn print_summary(summary: &RunSummary) {
    println!("Found {} used selectors", summary.usage_tokens);

    if !summary.verified.is_empty() {
        println!("\nVerifying critical selectors:");
        for (token, found) in &summary.verified {
            let status = if *found { "✓" } else { "✗" };
            println!("  {} {}", status, token);
        }
    }

    for report in &summary.reports {
        match report {
            Ok(report) => {
                println!("\nProcessing {}...", report.path.display());
                if report.changed() {
                    println!("  Removed {} unused CSS rules", report.removed);
                    println!(
                        "  Size reduced by {:.1}% ({} -> {} bytes)",
                        report.reduction_percent(),
                        report.original_bytes,
                        report.new_bytes
                    );
                    if let Some(backup) = &report.backup {
                        println!("  Backup written to {}", backup.display());
                    }
                } else {
                    println!("  No unused CSS rules found");
                }
            }
            Err(e) => eprintln!("\nerror: {}", e),
        }
    }

    println!("\nTotal: Removed {} unused CSS rules", summary.total_removed());
}
