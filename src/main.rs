use std::fs::{self, OpenOptions};
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use directories::ProjectDirs;
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use rplex::app::App;
use rplex::config::Config;
use rplex::input;
use rplex::ui::{self, colors::ColorScheme};

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Command-line arguments (parsed with lightweight lexopt)
#[derive(Debug, Default)]
struct Args {
    delay: Option<u64>,
    max_iterations: Option<u64>,
    no_ip: bool,
    no_color: bool,
    log_file: Option<PathBuf>,
    help: bool,
    version: bool,
}

fn parse_args() -> Result<Args, lexopt::Error> {
    use lexopt::prelude::*;

    let mut args = Args::default();
    let mut parser = lexopt::Parser::from_env();

    while let Some(arg) = parser.next()? {
        match arg {
            Short('d') | Long("delay") => {
                args.delay = Some(parser.value()?.parse()?);
            }
            Short('n') | Long("max-iterations") => {
                args.max_iterations = Some(parser.value()?.parse()?);
            }
            Long("no-ip") => {
                args.no_ip = true;
            }
            Long("no-color") => {
                args.no_color = true;
            }
            Long("log-file") => {
                args.log_file = Some(PathBuf::from(parser.value()?));
            }
            Short('h') | Long("help") => {
                args.help = true;
            }
            Short('V') | Long("version") => {
                args.version = true;
            }
            _ => return Err(arg.unexpected()),
        }
    }
    Ok(args)
}

fn print_help() {
    println!("rplex {}", env!("CARGO_PKG_VERSION"));
    println!("Live CPU, memory, process and network dashboard\n");
    println!("USAGE: rplex [OPTIONS]\n");
    println!("OPTIONS:");
    println!("  -d, --delay <MS>             Refresh rate in milliseconds (default: 1000)");
    println!("  -n, --max-iterations <N>     Exit after N updates");
    println!("      --no-ip                  Skip the public IP lookup");
    println!("      --no-color               Use monochrome mode");
    println!("      --log-file <PATH>        Write diagnostics to PATH (level from RUST_LOG)");
    println!("  -h, --help                   Print help");
    println!("  -V, --version                Print version");
    println!("\nKEYS: q, Esc or Ctrl-C to quit");
}

/// Send tracing output to a file; the terminal belongs to the dashboard.
fn init_logging(log_file: Option<PathBuf>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let path = log_file.or_else(|| {
        ProjectDirs::from("", "", "rplex").map(|dirs| dirs.cache_dir().join("rplex.log"))
    });
    let file = path.and_then(|path| {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        OpenOptions::new().create(true).append(true).open(path).ok()
    });

    match file {
        Some(file) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::sink)
                .try_init();
        }
    }
}

fn setup_terminal() -> io::Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    terminal.hide_cursor()?;

    // Drain any pending input events to prevent stray keypresses on startup
    while event::poll(Duration::from_millis(10))? {
        let _ = event::read();
    }
    Ok(terminal)
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen, crossterm::cursor::Show)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("rplex: {}", e);
            eprintln!("Try 'rplex --help' for more information.");
            std::process::exit(2);
        }
    };

    if args.help {
        print_help();
        return Ok(());
    }

    if args.version {
        println!("rplex {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    init_logging(args.log_file.clone());

    // Load configuration from file (or use defaults)
    let mut config = Config::load();

    // Apply command-line overrides
    if let Some(delay) = args.delay {
        config.refresh_rate_ms = delay;
    }
    if args.no_ip {
        config.ip_lookup_enabled = false;
    }
    if args.no_color {
        config.color_scheme = ColorScheme::Monochrome;
    }
    let config = config.validated();
    debug!("config: {:?}", config);

    let mut terminal = match setup_terminal() {
        Ok(terminal) => terminal,
        Err(e) => {
            let _ = restore_terminal();
            eprintln!("rplex: failed to initialize terminal: {}", e);
            std::process::exit(1);
        }
    };

    let mut app = App::new(config);
    app.max_iterations = args.max_iterations;
    info!("rplex {} started", env!("CARGO_PKG_VERSION"));

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    restore_terminal()?;

    loop_outcome(result)
}

/// Log a failed main loop and hand it back so the process exits non-zero.
fn loop_outcome(result: io::Result<()>) -> Result<(), Box<dyn std::error::Error>> {
    if let Err(err) = &result {
        warn!("main loop failed: {}", err);
    }
    Ok(result?)
}

/// One tick: sample, record, draw, then wait out the rest of the tick for a quit key.
fn run_app(terminal: &mut Tui, app: &mut App) -> io::Result<()> {
    while app.is_running() {
        let tick_start = Instant::now();

        let size = terminal.size()?;
        app.fit_to(Rect::new(0, 0, size.width, size.height));
        app.refresh_system();
        terminal.draw(|f| ui::draw(f, app))?;

        if app.iterations_exhausted() {
            app.quit();
            break;
        }

        let tick_rate = app.tick_rate();
        loop {
            let timeout = tick_rate.saturating_sub(tick_start.elapsed());
            if timeout.is_zero() || !event::poll(timeout)? {
                break;
            }
            match event::read()? {
                Event::Key(key) => {
                    if input::handle_key_event(app, key) {
                        return Ok(());
                    }
                }
                Event::Resize(width, height) => {
                    if app.resize(Rect::new(0, 0, width, height)) {
                        // Start the next tick now so the larger panel fills
                        break;
                    }
                    terminal.draw(|f| ui::draw(f, app))?;
                }
                _ => {}
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_error_is_returned() {
        let failed = loop_outcome(Err(io::Error::new(io::ErrorKind::BrokenPipe, "tty gone")));
        let err = failed.unwrap_err();
        assert!(err.to_string().contains("tty gone"));
        assert!(loop_outcome(Ok(())).is_ok());
    }
}
