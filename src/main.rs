use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use statsbomb_shots::export::{write_match_list, write_shots};
use statsbomb_shots::shots::{DEFAULT_BASE_DIR, DEFAULT_COMPETITION_ID, DEFAULT_SEASON_ID};
use statsbomb_shots::{AngleMethod, ShotQuery, load_matches, summarize_parquet, summarize_shots};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "statsbomb-shots", about = "Season shot tables from StatsBomb open data", version)]
struct Cli {
    /// Dataset root containing matches/ and events/
    #[arg(long = "base-dir", env = "STATSBOMB_DATA_DIR", default_value = DEFAULT_BASE_DIR, global = true)]
    base_dir: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the shot table for one season
    Shots {
        #[arg(long = "competition-id", default_value_t = DEFAULT_COMPETITION_ID)]
        competition_id: i64,

        #[arg(long = "season-id", default_value_t = DEFAULT_SEASON_ID)]
        season_id: i64,

        /// Only matches involving this exact team name
        #[arg(long)]
        team: Option<String>,

        #[arg(long = "include-penalties")]
        include_penalties: bool,

        #[arg(long, value_enum, default_value_t = AngleArg::Proxy)]
        angle: AngleArg,

        /// Output file (.parquet, anything else is written as CSV)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List a season's matches
    Matches {
        #[arg(long = "competition-id", default_value_t = DEFAULT_COMPETITION_ID)]
        competition_id: i64,

        #[arg(long = "season-id", default_value_t = DEFAULT_SEASON_ID)]
        season_id: i64,

        /// Write the list as CSV instead of printing it
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Per-team summary of an exported shots Parquet file
    Summary {
        parquet: PathBuf,

        #[arg(long = "max-rows")]
        max_rows: Option<usize>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum AngleArg {
    /// atan2(half goal width, distance)
    Proxy,
    /// Angle between the two posts
    Posts,
}

impl From<AngleArg> for AngleMethod {
    fn from(arg: AngleArg) -> Self {
        match arg {
            AngleArg::Proxy => AngleMethod::GoalProxy,
            AngleArg::Posts => AngleMethod::PostSubtended,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    if let Err(err) = run(cli) {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Shots {
            competition_id,
            season_id,
            team,
            include_penalties,
            angle,
            out,
        } => {
            let query = ShotQuery::new(&cli.base_dir, competition_id, season_id)
                .team(team)
                .include_penalties(include_penalties)
                .angle(angle.into());

            let mut shots = query
                .load()
                .with_context(|| format!("loading shots from {}", cli.base_dir.display()))?;

            println!("Shots: {}", shots.height());

            if let Some(out) = out {
                write_shots(&mut shots, &out)
                    .with_context(|| format!("writing {}", out.display()))?;
                println!("Wrote {}", out.display());
            }

            println!("{}", summarize_shots(shots)?);
        }
        Command::Matches {
            competition_id,
            season_id,
            out,
        } => {
            let matches = load_matches(&cli.base_dir, competition_id, season_id)?;

            match out {
                Some(out) => {
                    write_match_list(&matches, &out)
                        .with_context(|| format!("writing {}", out.display()))?;
                    println!("Wrote {} matches to {}", matches.len(), out.display());
                }
                None => {
                    for m in &matches {
                        let date = m
                            .match_date
                            .map(|d| d.to_string())
                            .unwrap_or_else(|| "----------".to_string());
                        println!("{:>10}  {}  {} v {}", m.match_id.0, date, m.home_team, m.away_team);
                    }
                }
            }
        }
        Command::Summary { parquet, max_rows } => {
            let summary = summarize_parquet(&parquet, max_rows)
                .with_context(|| format!("summarizing {}", parquet.display()))?;
            println!("{}", summary);
        }
    }

    Ok(())
}
