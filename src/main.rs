//! ledgerview main entry point

use anyhow::Context;
use clap::Parser;
use ledgerview_config::Config;
use ledgerview_core::{CoreResult, FilterMode, ViewController};
use ledgerview_fixture::{DatasetLoader, FixtureBackend, JsonDatasetLoader, Latency};
use ledgerview_utils::{employee_label, transaction_row};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser, Debug)]
#[command(name = "ledgerview")]
#[command(version = "0.1.0")]
#[command(about = "Browse a transaction ledger, paginated or filtered by employee", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "ledgerview.yaml")]
    config: PathBuf,

    /// Fixture file, overrides data.fixture_path
    #[arg(short, long)]
    fixture: Option<PathBuf>,

    /// Commands to run: all, employee <id>, clear, more, employees, show, quit.
    /// Read from stdin when omitted.
    commands: Vec<String>,
}

#[derive(Debug, PartialEq)]
enum Command {
    All,
    Employee(String),
    Clear,
    More,
    Employees,
    Show,
    Quit,
}

impl std::str::FromStr for Command {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some("all"), None) => Ok(Command::All),
            (Some("employee"), Some(id)) => Ok(Command::Employee(id.to_string())),
            (Some("clear"), None) => Ok(Command::Clear),
            (Some("more"), None) => Ok(Command::More),
            (Some("employees"), None) => Ok(Command::Employees),
            (Some("show"), None) => Ok(Command::Show),
            (Some("quit") | Some("exit"), None) => Ok(Command::Quit),
            _ => Err(format!("Unknown command: {}", s.trim())),
        }
    }
}

/// Group argv words into commands: `employee` takes the following word as its id
fn commands_from_args(args: &[String]) -> Vec<String> {
    let mut commands = Vec::new();
    let mut words = args.iter();
    while let Some(word) = words.next() {
        if word == "employee" {
            match words.next() {
                Some(id) => commands.push(format!("employee {}", id)),
                None => commands.push(word.clone()),
            }
        } else {
            commands.push(word.clone());
        }
    }
    commands
}

fn print_view(controller: &ViewController) {
    let label = match controller.current_filter() {
        FilterMode::Unfiltered => "All Employees".to_string(),
        FilterMode::FilteredByEmployee(id) => controller
            .employees()
            .and_then(|employees| employees.into_iter().find(|e| e.id == id))
            .map(|e| employee_label(&e))
            .unwrap_or(id),
    };

    match controller.transactions() {
        None => println!("-- {}: nothing loaded", label),
        Some(transactions) => {
            println!("-- {}: {} transactions", label, transactions.len());
            for transaction in &transactions {
                println!("{}", transaction_row(transaction));
            }
            if controller.view_more_visible() {
                println!("-- type `more` to view more");
            }
        }
    }
}

async fn run_command(controller: &ViewController, command: &Command) -> CoreResult<()> {
    match command {
        Command::All | Command::Clear => controller.select_employee("").await?,
        Command::Employee(id) => controller.select_employee(id).await?,
        Command::More => controller.view_more().await?,
        Command::Employees => {
            for employee in controller.employee_options() {
                let id = if employee.is_empty() { "\"\"" } else { employee.id.as_str() };
                println!("{:>6}  {}", id, employee_label(&employee));
            }
            return Ok(());
        }
        Command::Show | Command::Quit => {}
    }
    print_view(controller);
    Ok(())
}

/// Run one command line; returns false when the session should end
async fn dispatch(controller: &ViewController, line: &str) -> bool {
    if line.trim().is_empty() {
        return true;
    }
    match line.parse::<Command>() {
        Ok(Command::Quit) => false,
        Ok(command) => {
            if let Err(e) = run_command(controller, &command).await {
                eprintln!("{}", e.to_details());
            }
            true
        }
        Err(message) => {
            eprintln!("{}", message);
            true
        }
    }
}

fn load_config(path: &Path) -> anyhow::Result<Config> {
    if path.exists() {
        Config::load(path).map_err(|e| anyhow::anyhow!("{}", e.to_details()))
    } else {
        Ok(Config::default())
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut config = load_config(&args.config)?;
    if let Some(fixture) = args.fixture.clone() {
        config.data.fixture_path = fixture;
    }

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    if !args.config.exists() {
        warn!("Config file {} not found, using defaults", args.config.display());
    }

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;

    rt.block_on(async {
        let dataset = JsonDatasetLoader
            .load_file(config.fixture_path().to_path_buf())
            .await
            .with_context(|| format!("failed to load fixture {}", config.fixture_path().display()))?;

        let backend = Arc::new(FixtureBackend::new(
            dataset,
            config.pagination.transactions_per_page,
            Latency::from_millis(config.latency.employees_ms, config.latency.transactions_ms),
        ));
        let controller = ViewController::new(backend.clone(), backend.clone());
        info!(
            "Serving {} with {} transactions per page",
            config.fixture_path().display(),
            backend.page_size()
        );

        if config.session.auto_bootstrap {
            match controller.bootstrap().await {
                Ok(_) => print_view(&controller),
                Err(e) => eprintln!("{}", e.to_details()),
            }
        }

        if args.commands.is_empty() {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await? {
                if !dispatch(&controller, &line).await {
                    break;
                }
            }
        } else {
            for line in commands_from_args(&args.commands) {
                if !dispatch(&controller, &line).await {
                    break;
                }
            }
        }

        let (directory, pages, per_employee) = backend.request_counts();
        info!(
            "Session finished: {} directory, {} page and {} employee requests",
            directory, pages, per_employee
        );
        Ok::<(), anyhow::Error>(())
    })
}
