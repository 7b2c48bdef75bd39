use clap::{Parser, Subcommand};
use rivlog_service::config;
use rivlog_service::history::{CsvHistoryStore, HistoryStore};
use rivlog_service::logging::{self, DataSource};
use rivlog_service::model::UNIT_LABEL;
use rivlog_service::{poll, verify};
use std::error::Error;

/// River level logger for USGS gauge sites
#[derive(Parser, Debug)]
#[command(name = "rivlog_service", version, about)]
struct Cli {
    /// Command to run (defaults to `poll`)
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Fetch current readings, append to the history log, print stats,
    /// render charts
    Poll,
    /// Print min/max/mean for every series in the history log
    Stats,
    /// Render one SVG chart per series
    Chart,
    /// Create an empty history log for the configured sites
    Init,
    /// Check every configured site against the live API
    Verify,
}

impl Cli {
    fn selected(&self) -> Command {
        self.command.unwrap_or(Command::Poll)
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli.selected()) {
        eprintln!("   ✗ {}", e);
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<(), Box<dyn Error>> {
    let config = config::load_from_env()?;
    logging::init_logger(
        config.log_level()?,
        config.logging.file.as_deref(),
        config.logging.timestamps,
    );

    logging::debug(
        DataSource::Config,
        None,
        &format!(
            "{} site(s), history {}, cap {} rows",
            config.sites().len(),
            config.history_file.display(),
            config.max_rows
        ),
    );

    let store = CsvHistoryStore::new(&config.history_file);

    match command {
        Command::Poll => {
            let client = poll::build_client(&config)?;
            let table = poll::poll_once(&config, &client, &store).map_err(|e| {
                if !store.path().exists() {
                    logging::warn(
                        DataSource::History,
                        None,
                        "history log not found; run `rivlog_service init` first",
                    );
                }
                e
            })?;
            print_stats(&store)?;
            if config.charts {
                let written = poll::render_charts(&table, &config.chart_dir)?;
                logging::info(
                    DataSource::Chart,
                    None,
                    &format!("wrote {} chart(s) to {}", written.len(), config.chart_dir.display()),
                );
            }
        }
        Command::Stats => print_stats(&store)?,
        Command::Chart => {
            let mut table = store.load()?;
            table.drop_index_artifact();
            let written = poll::render_charts(&table, &config.chart_dir)?;
            logging::info(
                DataSource::Chart,
                None,
                &format!("wrote {} chart(s) to {}", written.len(), config.chart_dir.display()),
            );
        }
        Command::Init => {
            if store.init_if_missing(&config.sites())? {
                logging::info(
                    DataSource::History,
                    None,
                    &format!("created {}", store.path().display()),
                );
            } else {
                logging::info(
                    DataSource::History,
                    None,
                    &format!("{} already exists; left untouched", store.path().display()),
                );
            }
        }
        Command::Verify => {
            let client = poll::build_client(&config)?;
            let report = verify::run_verification(&config, &client);
            verify::print_summary(&report);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn print_stats<S: HistoryStore>(store: &S) -> Result<(), Box<dyn Error>> {
    for (name, stats) in poll::summarize_all(store)? {
        match stats {
            Ok(s) => println!(
                "{:<32} min {:>10.1}  max {:>10.1}  mean {:>10.1}  {}",
                name, s.min, s.max, s.mean, UNIT_LABEL
            ),
            Err(e) => logging::warn(DataSource::History, Some(&name), &e.to_string()),
        }
    }
    Ok(())
}
