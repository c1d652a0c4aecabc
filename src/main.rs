mod command;
mod password;

use std::path::PathBuf;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};

use food::application::FoodState;
use food::config::FoodConfig;
use food::message::Message;
use food::runtime::Runtime;
use food::sync::FoodClient;

use command::{Command, HELP};

#[derive(Parser)]
#[command(name = "food")]
#[command(about = "Order food from the MASTIGOU service", long_about = None)]
struct Cli {
    /// Service root, overrides the config file and FOOD_BASE_URL
    #[arg(long)]
    url: Option<String>,

    /// Config file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(FoodConfig::default_path);
    let mut config = FoodConfig::load(&config_path)?;
    config.apply_env();
    if let Some(url) = cli.url {
        config.base_url = url;
    }

    food::set_debug_logging(config.debug_logging || cli.debug);
    init_logging();
    log::info!("Starting with service at {}", config.base_url);

    let client = FoodClient::new(&config.base_url)?;
    let mut runtime = Runtime::new(client);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Welcome to\nMASTIGOU\n");

    // Login until it succeeds or stdin closes.
    while !runtime.state().is_authenticated() {
        let Some(username) = prompt(&mut lines, "Username: ").await? else {
            return Ok(());
        };
        let Some(password) = prompt_password(&mut lines).await? else {
            return Ok(());
        };
        runtime.send(Message::SubmitLogin { username, password });
        runtime.settle().await;
        render_status(runtime.state());
    }

    runtime.send(Message::DismissNotice);
    render(runtime.state());
    println!("{}", HELP);

    while let Some(line) = prompt(&mut lines, "> ").await? {
        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(usage) => {
                println!("{}", usage);
                continue;
            }
        };

        match command {
            Command::Quit => break,
            Command::Help => {
                println!("{}", HELP);
                continue;
            }
            other => {
                for message in other.messages() {
                    runtime.send(message);
                }
            }
        }

        runtime.settle().await;
        render(runtime.state());
        runtime.send(Message::DismissNotice);
    }

    Ok(())
}

async fn prompt(
    lines: &mut Lines<BufReader<Stdin>>,
    label: &str,
) -> Result<Option<String>, std::io::Error> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(label.as_bytes()).await?;
    stdout.flush().await?;
    lines.next_line().await
}

/// Hidden input on a terminal; a plain line when stdin is piped.
async fn prompt_password(
    lines: &mut Lines<BufReader<Stdin>>,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    if !password::stdin_is_terminal() {
        return Ok(prompt(lines, "Password: ").await?);
    }
    let mut stdout = tokio::io::stdout();
    stdout.write_all(b"Password: ").await?;
    stdout.flush().await?;
    Ok(tokio::task::spawn_blocking(password::read_hidden_line).await??)
}

fn render_status(state: &FoodState) {
    if let Some(error) = state.error() {
        println!("! {}", error);
    }
    if let Some(notice) = state.notice() {
        println!("* {}", notice);
    }
}

fn render(state: &FoodState) {
    render_status(state);
    if !state.query().trim().is_empty() {
        println!("Search: {}", state.query());
    }
    if state.filtered().is_empty() {
        println!("  (no orders)");
    }
    for item in state.filtered() {
        println!("  - {}", item.title);
    }
}

/// Log to the systemd user journal (`journalctl --user -t food -f`).
/// Our targets at info/debug (per config), everything else at warn.
fn init_logging() {
    struct FilteredJournal {
        inner: systemd_journal_logger::JournalLog,
    }

    impl log::Log for FilteredJournal {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            if metadata.target().starts_with("food") {
                let max = if food::debug_logging() {
                    log::LevelFilter::Debug
                } else {
                    log::LevelFilter::Info
                };
                metadata.level() <= max
            } else {
                metadata.level() <= log::LevelFilter::Warn
            }
        }
        fn log(&self, record: &log::Record) {
            if self.enabled(record.metadata()) {
                self.inner.log(record);
            }
        }
        fn flush(&self) {
            self.inner.flush();
        }
    }

    let journal = match systemd_journal_logger::JournalLog::new() {
        Ok(journal) => journal.with_syslog_identifier("food".to_string()),
        Err(e) => {
            eprintln!("Journal unavailable, logging disabled: {}", e);
            return;
        }
    };

    if let Err(e) = log::set_boxed_logger(Box::new(FilteredJournal { inner: journal })) {
        eprintln!("Failed to install logger: {}", e);
        return;
    }
    // Global max must be Debug so our debug logs can pass through when toggled
    log::set_max_level(log::LevelFilter::Debug);
}
