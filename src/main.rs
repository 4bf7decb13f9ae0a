use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use instant::Duration;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crossfill::clues::{match_clues, Clue};
use crossfill::export::Puzzle;
use crossfill::{find_fill, render_grid, FillConfig, Grid, Shape, WordList, MIN_SLOT_LENGTH};

/// Fill a crossword grid from a word list.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// The grid template, or a file containing it: `.` for open cells, `#` or `_` for blocks, and
    /// letters for pre-filled cells
    template: String,

    /// A word list file, or a directory of them (word, then optional tab-separated clues, per line)
    #[arg(short, long)]
    words: PathBuf,

    /// Seed for a reproducible fill
    #[arg(short, long)]
    seed: Option<u64>,

    /// Give up after this many seconds
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Runs of open cells shorter than this aren't filled
    #[arg(long, default_value_t = MIN_SLOT_LENGTH)]
    min_slot_length: usize,

    /// Write the finished puzzle to this file as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Author recorded in the exported puzzle
    #[arg(long, default_value = "crossfill")]
    author: String,
}

fn main() -> ExitCode {
    let debug_enabled = std::env::var("CROSSFILL_DEBUG").is_ok();
    crossfill::logging::init_logger(debug_enabled);

    if let Err(e) = try_main() {
        eprintln!("Error: {e}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn try_main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let word_list = WordList::load_from_path(&cli.words)?;
    log::info!("Loaded {} words from {}", word_list.len(), cli.words.display());

    // If the template names a file, read the grid from there.
    let template = if Path::new(&cli.template).is_file() {
        fs::read_to_string(&cli.template)
            .map_err(|e| crossfill::Error::Io { path: PathBuf::from(&cli.template), source: e })?
    } else {
        cli.template.clone()
    };
    let shape = Shape::from_template(&template)?;
    let grid = Grid::new(&word_list, &shape, cli.min_slot_length);

    let config = FillConfig {
        seed: cli.seed,
        timeout: cli.timeout.map(Duration::from_secs),
    };
    let result = find_fill(grid, &config)?;

    println!("{:?}", result.statistics);
    println!("{}", render_grid(&result.grid));

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let Some(clues) = match_clues(&result.grid, &mut rng) else {
        return Err("filled grid has undecided slots".into());
    };

    for (heading, list) in [("Across", &clues.across), ("Down", &clues.down)] {
        println!("\n{heading}");
        for clue in list {
            println!("{}", format_clue(clue));
        }
    }

    if let Some(output) = &cli.output {
        Puzzle::new(&result.grid, clues, &cli.author).write_to_path(output)?;
    }

    Ok(())
}

fn format_clue(clue: &Clue) -> String {
    format!("{:>3}. {} ({})", clue.number, clue.text.as_deref().unwrap_or("-"), clue.answer)
}
