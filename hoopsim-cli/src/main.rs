mod report;
mod roster;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use hoopsim_game::simulate_game;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Box score and period line
    Console,
    /// Full game result including the play-by-play
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "hoopsim", version)]
#[command(about = "Simulate one basketball game possession by possession")]
struct Args {
    /// Home team file (JSON); defaults to the bundled sample team
    #[arg(long)]
    home: Option<PathBuf>,

    /// Away team file (JSON); defaults to the bundled sample team
    #[arg(long)]
    away: Option<PathBuf>,

    /// Home tactics file (JSON); defaults to a ten-deep rotation
    #[arg(long)]
    home_tactics: Option<PathBuf>,

    /// Away tactics file (JSON); defaults to a ten-deep rotation
    #[arg(long)]
    away_tactics: Option<PathBuf>,

    /// Game seed
    #[arg(long, default_value_t = 1337)]
    seed: u64,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Include the play-by-play in the console report
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report to instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let (home, away) = roster::load_teams(args.home.as_deref(), args.away.as_deref())?;
    let home_tactics = roster::load_tactics(args.home_tactics.as_deref(), &home)?;
    let away_tactics = roster::load_tactics(args.away_tactics.as_deref(), &away)?;

    let start = Instant::now();
    let result = simulate_game(&home, &away, &home_tactics, &away_tactics, args.seed)
        .context("game setup rejected")?;
    log::info!("simulated seed {} in {:?}", args.seed, start.elapsed());

    let mut output = OutputTarget::new(args.output.clone())?;
    match args.report {
        ReportFormat::Json => report::write_json(&mut output, &result)?,
        ReportFormat::Console => {
            if args.output.is_none() {
                announce_banner();
            }
            report::write_console(&mut output, &result, args.verbose)?;
        }
    }
    output.flush().context("failed to flush report")?;
    Ok(())
}

fn announce_banner() {
    println!("{}", "🏀 HoopSim".bright_cyan().bold());
    println!("{}", "==========".cyan());
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.writer().flush()
    }
}
