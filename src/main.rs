mod app;
mod config;
mod fileio;
mod input;
mod mode;
mod style;
mod table;
mod ui;

use std::fs::File;
use std::io;
use std::panic;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::{error, info};

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use app::App;
use config::{parse_delimiter, AppConfig};
use fileio::{delimiter_name, FileIO};
use style::Theme;
use table::PageSize;

/// Command line options; anything left unset falls back to the config file
#[derive(Debug, Default)]
struct Options {
    file_path: Option<PathBuf>,
    delimiter: Option<u8>,
    page_size: Option<PageSize>,
    export_dir: Option<PathBuf>,
    config_path: Option<PathBuf>,
    theme: Option<String>,
    log_file: Option<PathBuf>,
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", msg);
    std::process::exit(1);
}

fn parse_args() -> Options {
    let args: Vec<String> = std::env::args().collect();
    let mut opts = Options::default();

    let mut i = 1;
    while i < args.len() {
        let arg = args[i].as_str();
        let value = || match args.get(i + 1) {
            Some(v) => v.clone(),
            None => fail(format!("{} requires an argument", arg)),
        };

        match arg {
            "-d" | "--delimiter" => {
                let v = value();
                opts.delimiter = Some(parse_delimiter(&v).unwrap_or_else(|| {
                    fail(format!("invalid delimiter '{}'. Use comma, tab, semicolon, pipe, or a single character.", v))
                }));
                i += 2;
            }
            "--page-size" => {
                let v = value();
                let size = v.parse::<usize>().ok().and_then(PageSize::from_count);
                opts.page_size = Some(size.unwrap_or_else(|| fail(format!("invalid page size '{}' (10, 25, 50 or 100)", v))));
                i += 2;
            }
            "--export-dir" => {
                opts.export_dir = Some(PathBuf::from(value()));
                i += 2;
            }
            "--config" => {
                opts.config_path = Some(PathBuf::from(value()));
                i += 2;
            }
            "--theme" => {
                opts.theme = Some(value());
                i += 2;
            }
            "--log-file" => {
                opts.log_file = Some(PathBuf::from(value()));
                i += 2;
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            a if a.starts_with('-') => fail(format!("unknown option: {}", a)),
            _ => {
                if opts.file_path.is_some() {
                    fail("only one file can be opened");
                }
                opts.file_path = Some(PathBuf::from(arg));
                i += 1;
            }
        }
    }

    opts
}

fn print_help() {
    eprintln!("tabscope - explore CSV files in the terminal: search, sort, paginate and export");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("    tabscope [OPTIONS] FILE");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("    -d, --delimiter <DELIM>  Field delimiter (comma, tab, semicolon, pipe, or char)");
    eprintln!("    --page-size <N>          Rows per page: 10, 25, 50 or 100");
    eprintln!("    --export-dir <DIR>       Directory exports are written to");
    eprintln!("    --config <PATH>          Config file (default: $XDG_CONFIG_HOME/tabscope/config.toml)");
    eprintln!("    --theme <NAME>           Color theme: {}", Theme::builtin_names().join(", "));
    eprintln!("    --log-file <PATH>        Write logs to PATH");
    eprintln!("    -h, --help               Print this help message");
    eprintln!();
    eprintln!("If no delimiter is given it is taken from the file extension, or detected from the content.");
}

/// The terminal is in raw mode while running, so logs only go to a file when asked for
fn init_logging(log_file: Option<&PathBuf>) -> io::Result<()> {
    let builder = tracing_subscriber::fmt().with_ansi(false).with_target(false);
    match log_file {
        Some(path) => {
            let file = File::create(path)?;
            builder.with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(io::sink).init(),
    }
    Ok(())
}

/// Restore the terminal before the default hook prints the panic
fn install_panic_hook() {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);

        if let Some(location) = info.location() {
            error!(file = location.file(), line = location.line(), "panic occurred");
        } else {
            error!("panic occurred");
        }

        if let Some(s) = info.payload().downcast_ref::<&str>() {
            error!(message = %s);
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            error!(message = %s);
        }

        default_hook(info);
    }));
}

/// Merge CLI options over the config file
fn resolve_config(opts: &Options) -> AppConfig {
    let mut config = AppConfig::load(opts.config_path.as_deref()).unwrap_or_else(|e| fail(e));

    if let Some(size) = opts.page_size {
        config.page_size = size;
    }
    if let Some(dir) = &opts.export_dir {
        config.export_dir = dir.clone();
    }
    if let Some(name) = &opts.theme {
        config.theme = Theme::by_name(name).unwrap_or_else(|| {
            fail(format!("unknown theme '{}' (built-in: {})", name, Theme::builtin_names().join(", ")))
        });
    }
    config
}

fn main() -> io::Result<()> {
    let opts = parse_args();
    init_logging(opts.log_file.as_ref())?;
    info!("tabscope started");

    install_panic_hook();

    let Some(file_path) = opts.file_path.clone() else {
        print_help();
        std::process::exit(1);
    };
    let config = resolve_config(&opts);

    let file_io = FileIO::new(file_path, opts.delimiter).unwrap_or_else(|e| fail(e));
    let load_result = file_io.load_table().unwrap_or_else(|e| {
        error!(error = %e, "Failed to load table");
        fail(e)
    });
    let detected = opts.delimiter.is_none().then(|| delimiter_name(load_result.delimiter));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(load_result, file_io, config);
    if app.message.is_none() {
        if let Some(name) = detected {
            app.info(format!("Delimiter: {}", name));
        }
    }

    let result = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        error!(error = %e, "Exited with error");
    }
    info!("tabscope exited");
    result
}
