use std::{
    error::Error,
    fs::{self, File},
    io::{self, BufReader},
    path::PathBuf,
    time::Duration,
};

use clap::Parser;
use itertools::Itertools;
use tracing_subscriber::{fmt, EnvFilter};

use compsession::{
    config::{ConfigStore, FileConfigStore},
    manager::{CompManager, Outcome},
    runtime::{FixedTicker, LineEventSource, Runner, SessionEvent},
    session::{Identity, Session},
    submission::SubmissionForm,
    summary::{FileSummaryService, SummaryService},
    timer::RecordingClock,
    util::TimeFormat,
    SummaryError,
};

const TICK_RATE_MS: u64 = 100;

/// replay a competition session from its event definitions and a command script
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Loads the events of a competition, applies timer readings, penalties and FMC entries from a command script, then prints the summary and the submission payload."
)]
pub struct Cli {
    /// event definitions, a JSON object keyed by comp_event_id or a list of events
    #[clap(short = 'e', long)]
    events: PathBuf,

    /// command script, one command per line (reads stdin when omitted)
    #[clap(short = 's', long)]
    script: Option<PathBuf>,

    /// attribute the results to this user
    #[clap(short = 'u', long)]
    user: Option<String>,

    /// competition title shown on the summary
    #[clap(short = 't', long)]
    title: Option<String>,

    /// recorded event summaries response to answer summary requests with
    #[clap(long)]
    summaries: Option<PathBuf>,

    /// write the submission payload to this file instead of stdout
    #[clap(short = 'o', long)]
    out: Option<PathBuf>,

    /// how times are rendered (overrides the config file)
    #[clap(short = 'f', long, value_enum)]
    format: Option<TimeFormat>,

    /// config file to use instead of the per-user one
    #[clap(long)]
    config: Option<PathBuf>,

    /// store the effective settings in the config file
    #[clap(long)]
    save_config: bool,

    /// verbosity level (-v, -vv, -vvv)
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Answers summary requests when no recorded response was given. Only a batch with no
/// complete events can be answered.
struct OfflineSummaries;

impl SummaryService for OfflineSummaries {
    fn request_summaries(&self, _endpoint: &str, body: &str) -> Result<String, SummaryError> {
        if body == "[]" {
            Ok("{}".to_string())
        } else {
            Err(SummaryError::Transport(
                "no summary source given (use --summaries)".to_string(),
            ))
        }
    }
}

enum Summaries {
    File(FileSummaryService),
    Offline(OfflineSummaries),
}

impl SummaryService for Summaries {
    fn request_summaries(&self, endpoint: &str, body: &str) -> Result<String, SummaryError> {
        match self {
            Summaries::File(s) => s.request_summaries(endpoint, body),
            Summaries::Offline(s) => s.request_summaries(endpoint, body),
        }
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let store = match &cli.config {
        Some(path) => FileConfigStore::with_path(path),
        None => FileConfigStore::new(),
    };
    let mut config = store.load();
    if let Some(format) = cli.format {
        config.time_format = format;
    }
    if cli.save_config {
        store.save(&config)?;
        tracing::info!(path = %store.path().display(), "config saved");
    }

    let identity = cli
        .user
        .clone()
        .map_or(Identity::Anonymous, Identity::Authenticated);
    let session = Session::from_events_json(&fs::read_to_string(&cli.events)?)?
        .with_identity(identity)
        .with_title(cli.title.clone().unwrap_or_default())
        .with_time_format(config.time_format);

    let mut manager = CompManager::new(session, RecordingClock::default())
        .with_endpoints(config.summary_endpoint.as_str(), config.results_field.as_str());

    let summaries = match &cli.summaries {
        Some(path) => Summaries::File(FileSummaryService::with_path(path)),
        None => Summaries::Offline(OfflineSummaries),
    };

    let source = match &cli.script {
        Some(path) => LineEventSource::new(BufReader::new(File::open(path)?)),
        None => LineEventSource::new(BufReader::new(io::stdin())),
    };
    let runner = Runner::new(source, FixedTicker::new(Duration::from_millis(TICK_RATE_MS)));

    loop {
        match runner.step() {
            // The clock ticks on its own; only its readings touch the session.
            SessionEvent::Tick => {}
            SessionEvent::Eof => break,
            SessionEvent::Command(command) => match manager.handle(command, &summaries) {
                Ok(Outcome::Updated(_)) => {}
                Ok(Outcome::Summary(summary)) => print!("{summary}"),
                Ok(Outcome::Submission(form)) => write_submission(&cli, &form)?,
                Err(e) => eprintln!("error: {e}"),
            },
        }
    }

    print_events(manager.session());
    Ok(())
}

fn write_submission(cli: &Cli, form: &SubmissionForm) -> io::Result<()> {
    match &cli.out {
        Some(path) => {
            fs::write(path, &form.payload)?;
            tracing::info!(path = %path.display(), field = %form.field, "submission written");
        }
        None => println!("{}={}", form.field, form.payload),
    }
    Ok(())
}

fn print_events(session: &Session) {
    let format = session.time_format();
    for event in session.events() {
        let solves = event
            .scrambles
            .iter()
            .map(|s| match event.display_value(s, format) {
                v if v.is_empty() => "-".to_string(),
                v => v,
            })
            .join(", ");
        println!("{} [{}] {}", event.event_name, event.status(), solves);
    }
}
