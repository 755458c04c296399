use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tracing_subscriber::fmt::MakeWriter;

mod app;
mod config;
mod error;
mod models;
mod news;
mod services;
mod tui;

use app::App;
use config::Config;
use error::Result;
use news::NewsFetcher;
use services::SystemBrowser;
use tui::card::ArticleCard;
use tui::{draw, handle_key_event};

/// Log sink: always the log file, plus stderr when no TUI owns the terminal.
#[derive(Clone)]
struct LogWriter {
    file: Option<Arc<Mutex<File>>>,
    echo_stderr: bool,
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = file.write_all(buf);
            }
        }
        if self.echo_stderr {
            io::stderr().write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = file.flush();
            }
        }
        io::stderr().flush()
    }
}

impl<'a> MakeWriter<'a> for LogWriter {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn init_logging(log_path: &Path, echo_stderr: bool) {
    let file = match OpenOptions::new().create(true).append(true).open(log_path) {
        Ok(file) => Some(Arc::new(Mutex::new(file))),
        Err(err) => {
            eprintln!("Warning: unable to open {}: {err}", log_path.display());
            None
        }
    };

    // Only warnings and errors unless RUST_LOG says otherwise
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_ansi(false)
        .with_writer(LogWriter { file, echo_stderr })
        .init();
}

struct CliArgs {
    country: Option<String>,
    /// `Some(None)` prints the configured default country.
    print: Option<Option<String>>,
}

fn parse_args(args: &[String]) -> CliArgs {
    let mut cli = CliArgs {
        country: None,
        print: None,
    };

    let mut iter = args.iter().skip(1).peekable();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--country" => cli.country = iter.next().cloned(),
            "--print" => {
                let code = iter.next_if(|next| !next.starts_with("--")).cloned();
                cli.print = Some(code);
            }
            other => eprintln!("Ignoring unknown argument {:?}", other),
        }
    }

    cli
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let cli = parse_args(&args);

    let config = Config::load()?;
    init_logging(&config.log_path(), cli.print.is_some());

    // Headless: fetch once, print, exit
    if let Some(code) = cli.print {
        let code = code.or(cli.country).unwrap_or_else(|| config.default_country.clone());
        return print_headlines(&config, &code).await;
    }

    let mut app = App::new(&config, Box::new(SystemBrowser))?;
    if let Some(code) = cli.country {
        app.set_country_code(code);
    }
    if config.fetch_on_start {
        app.trigger_fetch();
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    Ok(())
}

async fn print_headlines(config: &Config, country_code: &str) -> Result<()> {
    let fetcher = NewsFetcher::new(config)?;
    let articles = fetcher.fetch(country_code).await?;

    let mut stdout = io::stdout().lock();
    for article in &articles {
        writeln!(stdout, "{}", ArticleCard::from_article(article).to_plain_text())?;
    }
    writeln!(stdout, "{} headlines for {:?}", articles.len(), country_code)?;

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|frame| draw(frame, app))?;

        app.tick_spinner();

        // Apply any fetch that finished since the last frame
        app.poll_fetch_result();

        // Poll with a timeout so the spinner and fetch results keep moving
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if let Some(action) = handle_key_event(key, app.editing_country, app.show_help) {
                    if app.handle_action(action) {
                        return Ok(());
                    }
                }
            }
        }
    }
}
