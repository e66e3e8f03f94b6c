use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use crossword_csp::{render_grid, save_svg, FileError, FillOptions, Filler, GridConfig, RequeueRule};
use tracing_subscriber::EnvFilter;

/// Fill a crossword structure with words from a word list.
#[derive(Parser)]
struct Cli {
    /// Path to the structure file: one line per row, `_` for a fillable cell and anything else for
    /// a blocked one.
    structure: PathBuf,

    /// Path to the word list, one word per line.
    words: PathBuf,

    /// Where to write an SVG image of the filled grid.
    output: Option<PathBuf>,

    /// Requeue every neighboring arc during arc consistency, instead of only those not shared
    /// with the slot just revised against.
    #[arg(long)]
    textbook_arc_consistency: bool,

    /// Log fill progress and propagation details. `RUST_LOG` takes precedence when set.
    #[arg(short, long)]
    verbose: bool,
}

/// Log level used when `RUST_LOG` isn't set. A plain run prints nothing but the grid.
fn default_level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "warn"
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load the puzzle, fill it, and write the image if one was asked for. Returns what to print.
fn fill_report(cli: &Cli) -> Result<String, FileError> {
    let config = GridConfig::load(&cli.structure, &cli.words)?;

    let options = FillOptions {
        requeue_rule: if cli.textbook_arc_consistency {
            RequeueRule::AllNeighbors
        } else {
            RequeueRule::ExcludeNeighborsOfOther
        },
    };

    let Ok(result) = Filler::with_options(&config, options).solve() else {
        return Ok("No solution.".to_string());
    };

    if let Some(output) = &cli.output {
        save_svg(&config, &result.assignment, output)?;
        tracing::info!(event = "image_written", path = %output.display());
    }

    Ok(render_grid(&config, &result.assignment))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match fill_report(&cli) {
        Ok(report) => {
            println!("{report}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn write_puzzle(dir: &Path, structure: &str, words: &str) -> (PathBuf, PathBuf) {
        let structure_path = dir.join("structure.txt");
        let words_path = dir.join("words.txt");
        fs::write(&structure_path, structure).unwrap();
        fs::write(&words_path, words).unwrap();
        (structure_path, words_path)
    }

    fn cli(args: &[&Path]) -> Cli {
        let args = std::iter::once(Path::new("generate")).chain(args.iter().copied());
        Cli::parse_from(args)
    }

    #[test]
    fn test_prints_filled_grid_and_writes_image() {
        let dir = tempfile::tempdir().unwrap();
        let (structure, words) = write_puzzle(dir.path(), "__\n_#\n", "ab\nac\nbd\n");
        let output = dir.path().join("out.svg");

        let report = fill_report(&cli(&[&structure, &words, &output])).unwrap();

        assert_eq!(report, "AB\nB█");
        assert!(fs::read_to_string(&output).unwrap().starts_with("<svg "));
    }

    #[test]
    fn test_reports_no_solution() {
        let dir = tempfile::tempdir().unwrap();
        let (structure, words) = write_puzzle(dir.path(), "_#\n__\n", "ab\ncd\n");
        let output = dir.path().join("out.svg");

        let report = fill_report(&cli(&[&structure, &words, &output])).unwrap();

        assert_eq!(report, "No solution.");
        assert!(!output.exists(), "no image without a fill");
    }

    #[test]
    fn test_textbook_flag_still_fills() {
        let dir = tempfile::tempdir().unwrap();
        let (structure, words) = write_puzzle(dir.path(), "__\n_#\n", "ab\nac\nbd\n");
        let flag = Path::new("--textbook-arc-consistency");

        let report = fill_report(&cli(&[&structure, &words, flag])).unwrap();

        assert_eq!(report, "AB\nB█");
    }

    #[test]
    fn test_quiet_unless_verbose() {
        assert_eq!(default_level(false), "warn");
        assert_eq!(default_level(true), "debug");
        assert!(cli(&[Path::new("s.txt"), Path::new("w.txt"), Path::new("-v")]).verbose);
    }

    #[test]
    fn test_missing_word_list_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let (structure, _) = write_puzzle(dir.path(), "__\n_#\n", "ab\n");
        let missing = dir.path().join("missing.txt");

        let err = fill_report(&cli(&[&structure, &missing])).unwrap_err();

        assert!(matches!(err, FileError::Io { ref path, .. } if path == &missing));
    }
}
