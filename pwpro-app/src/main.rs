use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use pwpro_schemas::{
    dilution::MixMode,
    estimate::{Contamination, SurfaceType},
};
use std::path::PathBuf;

mod config;
mod plotting;
mod workflow;

#[derive(Parser, Debug)]
#[command(name = "pwpro", version, about = "Pressure-washing field toolkit")]
struct Cli {
    /// Knowledge base directory (chemicals, advisory rules, presets).
    #[arg(long, global = true, default_value = "./data/knowledge_base")]
    kb: PathBuf,

    /// CSV file that calculation history is appended to.
    #[arg(long, global = true, default_value = "./data/history.csv")]
    log: PathBuf,

    /// Print results as JSON instead of a text report.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Area and perimeter of a traced polygon.
    Measure {
        /// Vertices as "lat,lon;lat,lon;...".
        #[arg(long, required_unless_present = "file", conflicts_with = "file")]
        points: Option<String>,
        /// YAML polygon file.
        #[arg(long)]
        file: Option<PathBuf>,
        /// Write a PNG outline of the polygon.
        #[arg(long)]
        plot: Option<PathBuf>,
    },
    /// Chemical dilution calculators.
    Mix {
        #[command(subcommand)]
        command: MixCommand,
    },
    /// Weather go/no-go advice for a job.
    Advise {
        #[arg(long)]
        scope: String,
        #[arg(long, allow_hyphen_values = true)]
        temp: f64,
        #[arg(long)]
        wind: f64,
        #[arg(long)]
        rain: Option<f64>,
    },
    /// Cleaning recommendation for a surface and contamination.
    Recommend {
        #[arg(long)]
        surface: SurfaceType,
        #[arg(long)]
        contamination: Contamination,
        #[arg(long, default_value_t = 0.0)]
        sqft: f64,
    },
    /// Surface guesses from a photo's average color.
    Surface {
        /// Average color as "r,g,b" with channels 0-255.
        #[arg(long)]
        rgb: String,
        /// Image size as "WIDTHxHEIGHT", enables the square footage guess.
        #[arg(long)]
        size: Option<String>,
    },
    /// Browse the chemical library.
    Chemicals {
        #[arg(long)]
        search: Option<String>,
    },
    /// Saved estimates.
    Estimates {
        #[arg(long, default_value = "./data/store")]
        store: PathBuf,
        #[command(subcommand)]
        command: EstimateCommand,
    },
    /// Scheduled jobs.
    Jobs {
        #[arg(long, default_value = "./data/store")]
        store: PathBuf,
        #[command(subcommand)]
        command: JobCommand,
    },
    /// Show logged calculations.
    History {
        /// Only the most recent N entries.
        #[arg(long)]
        last: Option<usize>,
    },
}

#[derive(Subcommand, Debug)]
enum MixCommand {
    /// Premix a tank to a target percentage.
    Batch {
        #[arg(long)]
        tank: f64,
        #[arg(long)]
        percent: f64,
    },
    /// Proportioned mix through a valve or injector at 1:X.
    Ratio {
        #[arg(long, value_enum)]
        mode: RatioMode,
        #[arg(long)]
        volume: f64,
        #[arg(long)]
        ratio: f64,
        /// Target percentage; adds a suggested ratio and nearest preset.
        #[arg(long)]
        percent: Option<f64>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum RatioMode {
    Manifold,
    Injector,
}

impl From<RatioMode> for MixMode {
    fn from(mode: RatioMode) -> Self {
        match mode {
            RatioMode::Manifold => MixMode::Manifold,
            RatioMode::Injector => MixMode::Injector,
        }
    }
}

#[derive(Subcommand, Debug)]
enum EstimateCommand {
    /// Create an estimate with a generated recommendation and save it.
    Add {
        #[arg(long)]
        owner: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        scope: String,
        #[arg(long, default_value = "unknown")]
        surface: SurfaceType,
        #[arg(long, default_value = "unknown")]
        contamination: Contamination,
        #[arg(long, default_value_t = 0.0)]
        sqft: f64,
        #[arg(long, default_value = "")]
        notes: String,
    },
    List,
}

#[derive(Subcommand, Debug)]
enum JobCommand {
    Add {
        #[arg(long)]
        owner: String,
        #[arg(long)]
        address: String,
        #[arg(long)]
        scope: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
    },
    List,
    Remove {
        id: uuid::Uuid,
    },
    /// Fill in coordinates from an offline address book.
    Geocode {
        #[arg(long, default_value = "./data/address_book.yaml")]
        address_book: PathBuf,
        /// Re-geocode jobs that already have coordinates.
        #[arg(long)]
        force: bool,
        #[arg(long, default_value_t = 200)]
        delay_ms: u64,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut session = workflow::Session::open(&cli.kb, &cli.log, cli.json)?;

    match cli.command {
        Command::Measure { points, file, plot } => {
            workflow::run_measure(&mut session, points.as_deref(), file.as_deref(), plot.as_deref())
        }
        Command::Mix { command } => match command {
            MixCommand::Batch { tank, percent } => workflow::run_batch_mix(&mut session, tank, percent),
            MixCommand::Ratio {
                mode,
                volume,
                ratio,
                percent,
            } => workflow::run_ratio_mix(&mut session, mode.into(), volume, ratio, percent),
        },
        Command::Advise {
            scope,
            temp,
            wind,
            rain,
        } => workflow::run_advise(&mut session, &scope, temp, wind, rain),
        Command::Recommend {
            surface,
            contamination,
            sqft,
        } => workflow::run_recommend(&mut session, surface, contamination, sqft),
        Command::Surface { rgb, size } => workflow::run_surface(&mut session, &rgb, size.as_deref()),
        Command::Chemicals { search } => workflow::run_chemicals(&session, search.as_deref()),
        Command::Estimates { store, command } => match command {
            EstimateCommand::Add {
                owner,
                address,
                scope,
                surface,
                contamination,
                sqft,
                notes,
            } => {
                let draft = workflow::EstimateDraft {
                    owner,
                    address,
                    scope,
                    surface,
                    contamination,
                    sqft,
                    notes,
                };
                workflow::run_estimate_add(&session, &store, draft)
            }
            EstimateCommand::List => workflow::run_estimate_list(&session, &store),
        },
        Command::Jobs { store, command } => match command {
            JobCommand::Add {
                owner,
                address,
                scope,
                date,
            } => workflow::run_job_add(&session, &store, &owner, &address, &scope, &date),
            JobCommand::List => workflow::run_job_list(&session, &store),
            JobCommand::Remove { id } => workflow::run_job_remove(&session, &store, id),
            JobCommand::Geocode {
                address_book,
                force,
                delay_ms,
            } => workflow::run_job_geocode(
                &session,
                &store,
                &address_book,
                force,
                std::time::Duration::from_millis(delay_ms),
            ),
        },
        Command::History { last } => workflow::run_history(&session, &cli.log, last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn measure_requires_points_or_file() {
        assert!(Cli::try_parse_from(["pwpro", "measure"]).is_err());
        assert!(Cli::try_parse_from(["pwpro", "measure", "--points", "1,2;3,4", "--file", "x.yaml"]).is_err());
        assert!(Cli::try_parse_from(["pwpro", "measure", "--points", "1,2;3,4;5,6"]).is_ok());
    }

    #[test]
    fn ratio_mode_and_surface_parse() {
        let cli = Cli::try_parse_from([
            "pwpro", "mix", "ratio", "--mode", "injector", "--volume", "10", "--ratio", "10",
        ])
        .unwrap();
        match cli.command {
            Command::Mix {
                command: MixCommand::Ratio { mode, percent, .. },
            } => {
                assert_eq!(MixMode::from(mode), MixMode::Injector);
                assert_eq!(percent, None);
            }
            other => panic!("unexpected command {:?}", other),
        }

        let cli = Cli::try_parse_from([
            "pwpro", "recommend", "--surface", "Brick", "--contamination", "oil",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::Recommend {
                surface: SurfaceType::Brick,
                contamination: Contamination::Oil,
                ..
            }
        ));
        assert!(Cli::try_parse_from(["pwpro", "recommend", "--surface", "glass", "--contamination", "oil"]).is_err());
    }
}
