//! logmark - mark log lines matching patterns and filter down to them
//!
//! Rules pair a case-insensitive regex with a background color. Matching
//! lines are painted from the match to the end of the line, and the view
//! can be switched to show only the highlighted lines.

mod app;
mod buffer;
mod config;
mod display;
mod error;
mod highlight;
mod host;
mod input;
mod line;
mod protocol;
mod session;
mod terminal;
mod window;

use std::fs;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use app::App;
use buffer::Buffer;
use config::Config;
use display::{print_document, Display};
use error::Result;
use highlight::{Color, DocumentHost, LinePrefix, Rule, ViewMode};
use host::TerminalHost;
use protocol::Command;
use session::Session;
use terminal::Terminal;

/// Highlight log lines by pattern and filter to the highlighted ones
///
/// Keys: a add rule, d remove rule, c clear rules, t toggle
/// highlighted-only, n line numbers, Tab switch window, j/k/arrows,
/// PageUp/PageDown, g/G scroll, C-l redraw, q quit.
#[derive(Parser, Debug)]
#[command(name = "logmark", version)]
struct Cli {
    /// Log file to open
    file: Option<PathBuf>,

    /// Highlight rule, PATTERN or PATTERN=COLOR (repeatable)
    #[arg(short, long = "rule", value_name = "PATTERN=COLOR")]
    rules: Vec<String>,

    /// Run the JSON commands in FILE (one per line) before showing the log
    #[arg(long, value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Start in the highlighted-only view
    #[arg(short = 'H', long)]
    highlighted_only: bool,

    /// Print the result to stdout instead of opening the viewer
    #[arg(short, long)]
    print: bool,

    /// How highlighted-only lines are tagged
    #[arg(long, value_enum)]
    line_prefix: Option<LinePrefix>,

    /// Show line numbers
    #[arg(short = 'n', long)]
    line_numbers: bool,

    /// Config file (default ~/.logmark.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log file (default ~/.logmark/logmark.log); filter with RUST_LOG
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    let guard = init_tracing(cli.log_file.as_deref());

    let result = run(cli).await;
    // Flush the log before a possible exit
    drop(guard);

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Send tracing output to a log file; the terminal belongs to the viewer
fn init_tracing(path: Option<&Path>) -> Option<WorkerGuard> {
    let path = path.map(Path::to_path_buf).or_else(Config::log_path)?;
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file_name = path.file_name()?.to_owned();

    if let Err(e) = fs::create_dir_all(&dir) {
        eprintln!("Warning: Could not initialize file logging: {}", e);
        return None;
    }

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .init();
    Some(guard)
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };
    if let Some(prefix) = cli.line_prefix {
        config.line_prefix = prefix;
    }
    config.show_line_numbers |= cli.line_numbers;

    let buffer = cli.file.as_deref().map(Buffer::from_file).transpose()?;
    info!(file = ?cli.file, "starting");

    let host = TerminalHost::new(buffer);
    let mut session = Session::new(host, config.engine_options(), config.default_color);

    // Failed commands have already been reported through the host
    if !cli.rules.is_empty() {
        let rules: Vec<Rule> = cli
            .rules
            .iter()
            .map(|arg| parse_rule(arg, config.default_color))
            .collect();
        let _ = session.dispatch(Command::update_content(&rules)).await;
    }
    if let Some(path) = &cli.replay {
        replay(&mut session, path).await?;
    }
    if cli.highlighted_only && session.view_mode() == ViewMode::Full {
        let _ = session.dispatch(Command::toggle_highlighted(&[])).await;
    }
    info!(
        rules = session.rules().len(),
        highlighted = session.engine().highlighted_lines().len(),
        mode = %session.view_mode(),
        "ready"
    );

    if cli.print {
        for msg in session.host_mut().take_messages() {
            eprintln!("{}", msg);
        }
        let mut stdout = io::stdout().lock();
        let color = stdout.is_terminal();
        return print_document(
            &mut stdout,
            session.host(),
            config.tab_width,
            config.show_line_numbers,
            color,
        );
    }

    let mut terminal = Terminal::new()?;
    let mut app = App::new(session, Display::new(config.show_line_numbers, config.tab_width));
    app.run(&mut terminal).await
}

/// Split `PATTERN=COLOR` on its last `=`
///
/// When what follows the `=` is not a color, the whole argument is the
/// pattern and the default color applies.
fn parse_rule(arg: &str, default_color: Color) -> Rule {
    match arg.rsplit_once('=') {
        Some((pattern, color)) => match color.parse() {
            Ok(color) => Rule::new(pattern, color),
            Err(_) => Rule::new(arg, default_color),
        },
        None => Rule::new(arg, default_color),
    }
}

/// Dispatch each JSON command in a file, skipping blank and `#` lines
async fn replay(session: &mut Session<TerminalHost>, path: &Path) -> Result<()> {
    let contents = fs::read_to_string(path)?;
    for (n, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match Command::parse(line) {
            Ok(command) => {
                let _ = session.dispatch(command).await;
            }
            Err(e) => {
                warn!(line = n + 1, error = %e, "skipping command");
                let msg = format!("{}:{}: {}", path.display(), n + 1, e);
                session.host_mut().report_error(&msg);
            }
        }
    }
    Ok(())
}
