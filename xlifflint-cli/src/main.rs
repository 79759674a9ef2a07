use clap::Parser;
use xlifflint_cli::{OutputMode, path_glob::expand_input_globs, run_batch};
use xlifflint::FixOptions;

/// Check XLIFF translation files: every trans-unit id must be traceable to its source text.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Files to check (glob patterns are expanded)
    #[arg(required = true)]
    files: Vec<String>,

    /// Write the fixes directly into the files (the original is kept as `<file>~`)
    #[arg(short, long)]
    fix: bool,

    /// Redo the indentation of tags (4 spaces) in rewritten files
    #[arg(short = 'i', long)]
    reindent: bool,

    /// Stop after this many files with errors
    #[arg(long, value_name = "N")]
    max_error_files: Option<usize>,

    /// Output in JSON format (machine-readable)
    #[arg(long)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let files = match expand_input_globs(&args.files) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    let mode = if args.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };
    let options = FixOptions::new()
        .with_fix(args.fix)
        .with_reindent(args.reindent);

    let summary = run_batch(&files, &options, args.max_error_files, mode);
    std::process::exit(summary.exit_code());
}
