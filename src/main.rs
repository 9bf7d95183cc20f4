use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::{self, OpenOptions};
use std::sync::Arc;
use std::process::ExitCode;
use std::{io, time::Duration};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use umbrella::app::{run_app, App};
use umbrella::cli::Args;
use umbrella::client::ForecastClient;
use umbrella::config::AppConfig;
use umbrella::errors::AppError;
use umbrella::preferences::{FileStore, MemoryStore, PreferenceStore};
use umbrella::report;
use umbrella::session::Session;

const LOG_FILE: &str = "umbrella.log";

/// The TUI owns stdout, so it logs to a file; `--plain` logs to stderr.
fn init_logging(config: &AppConfig, plain: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "umbrella=info".into());

    if plain {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(io::stderr))
            .init();
        return;
    }

    let path = config.log_dir.join(LOG_FILE);
    let file = fs::create_dir_all(&config.log_dir)
        .and_then(|_| OpenOptions::new().create(true).append(true).open(&path));
    // Without a log file there is nowhere safe to write, so logging stays off.
    if let Ok(file) = file {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_ansi(false).with_writer(Arc::new(file)))
            .init();
    }
}

fn print_report<S: PreferenceStore>(
    city: &str,
    session: &mut Session<S>,
    client: &ForecastClient,
) -> Result<(), AppError> {
    let ticket = session.begin_fetch();
    let response = client.forecast(city).inspect_err(|err| {
        if let Some(link) = err.suggestion() {
            eprintln!("Search for \"{}\" on OpenStreetMap: {}", city.trim(), link);
        }
    })?;
    if let Some(view) = session.accept(ticket, response) {
        print!("{}", report::render(city.trim(), &view));
    }
    Ok(())
}

fn run_tui<S: PreferenceStore>(
    session: Session<S>,
    client: ForecastClient,
    city: Option<String>,
) -> Result<(), AppError> {
    // setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // create app and run it
    let mut app = App::new(session, client, city);
    let res = run_app(&mut terminal, &mut app);

    // restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!("terminal loop failed: {}", err);
        println!("{:?}", err)
    }

    Ok(())
}

fn run<S: PreferenceStore>(args: Args, mut session: Session<S>, client: ForecastClient) -> Result<(), AppError> {
    if let Some(unit) = args.unit {
        session.set_unit(unit);
    }

    if args.plain {
        let city = args.city.unwrap_or_default();
        return print_report(&city, &mut session, &client);
    }

    run_tui(session, client, args.city)
}

fn try_main(args: Args) -> Result<(), AppError> {
    let mut config = AppConfig::from_env()?;
    if let Some(url) = &args.api_url {
        config.api_url = url.clone();
    }
    if let Some(secs) = args.timeout {
        config.timeout = Duration::from_secs(secs);
    }

    init_logging(&config, args.plain);
    tracing::debug!("using forecast service at {}", config.api_url);

    let client = ForecastClient::new(&config.api_url, config.timeout)?;
    if args.no_persist {
        run(args, Session::new(MemoryStore::default()), client)
    } else {
        run(args, Session::new(FileStore::open(&config.config_dir)), client)
    }
}

fn main() -> ExitCode {
    match try_main(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
