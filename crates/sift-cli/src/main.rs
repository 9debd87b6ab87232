//! sift - conversational web search from the terminal

mod config;
mod ui;

use clap::Parser;
use sift_ai::GeminiClient;
use sift_core::{ErrorClass, GeminiTransport, Role, SearchSession};
use std::sync::Arc;

/// sift - ask the web a question, get a cited answer
#[derive(Parser, Debug)]
#[command(name = "sift")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Query to answer; omit for interactive mode
    query: Option<String>,

    /// Model to use (default: gemini-2.5-flash)
    #[arg(short, long)]
    model: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Setup tracing
    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("sift=debug")
            .init();
    }

    // Initialize config and exit
    if args.init_config {
        match config::Config::init() {
            Ok(path) => {
                println!("Config file created at: {}", path.display());
                println!("\nExample config:\n{}", config::example_config());
            }
            Err(e) => {
                eprintln!("Error creating config: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    // Load config file
    let cfg = config::Config::load();

    // Merge config with CLI args (CLI takes precedence)
    let model = args
        .model
        .or(cfg.model.clone())
        .unwrap_or_else(|| sift_ai::gemini::DEFAULT_MODEL.to_string());

    // Resolve the credential before touching any conversation state:
    // config file first, then environment. A missing key is surfaced
    // through the same classification table as request failures.
    let client = match cfg.api_key.clone() {
        Some(api_key) => GeminiClient::new(api_key),
        None => match GeminiClient::from_env() {
            Ok(client) => client,
            Err(e) => {
                eprintln!("{}", ErrorClass::from_error_text(&e.to_string()).user_message());
                eprintln!();
                eprintln!("Set your API key with: export GEMINI_API_KEY=your-key");
                eprintln!("Or add it to the config file: sift --init-config");
                std::process::exit(1);
            }
        },
    };
    let client = client.with_model(model);
    let transport = Arc::new(GeminiTransport::new(client));
    let mut session = SearchSession::new(transport);

    // One-shot mode
    if let Some(query) = args.query {
        run_query(&mut session, &query).await;
        return Ok(());
    }

    run_interactive(&mut session).await
}

/// Stream one answer to the terminal, then show its sources.
async fn run_query(session: &mut SearchSession, query: &str) {
    let mut printer = ui::StreamPrinter::new();

    let Some(turn_id) = session
        .search_with(query, |turn| {
            if !turn.is_error {
                printer.update(&turn.content);
            }
        })
        .await
    else {
        return;
    };

    let Some(turn) = session.conversation().turn(turn_id) else {
        return;
    };

    if turn.is_error {
        if printer.has_output() {
            println!();
        }
        eprintln!("{}", turn.content);
    } else {
        println!();
        ui::print_sources(&turn.sources);
    }
}

async fn run_interactive(session: &mut SearchSession) -> anyhow::Result<()> {
    use std::io::{self, Write};

    if std::io::IsTerminal::is_terminal(&std::io::stderr()) {
        eprintln!("sift - ask anything, /new to start over, /quit to exit");
        eprintln!();
    }

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            // EOF
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        // Handle slash commands
        if let Some(command) = input.strip_prefix('/') {
            match command {
                "new" => {
                    session.reset();
                    println!("Started a new conversation.");
                }
                "quit" | "exit" => {
                    break;
                }
                "help" => {
                    println!("Commands:");
                    println!("  /new   Start a new conversation");
                    println!("  /quit  Exit");
                }
                _ => {
                    println!("Unknown command: /{}", command);
                    println!("Type /help for available commands.");
                }
            }
            println!();
            continue;
        }

        // One in-flight request at a time; the prompt only returns once
        // the previous turn has terminated.
        println!();
        run_query(session, input).await;
        println!();

        let answered = session
            .conversation()
            .turns()
            .iter()
            .filter(|t| t.role == Role::Assistant && !t.is_error)
            .count();
        tracing::debug!(turns = session.conversation().turns().len(), answered, "exchange complete");
    }

    Ok(())
}
