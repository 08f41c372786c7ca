use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use client_core::{ChatClient, ChatEvent, HttpChatTransport, Message, FALLBACK_REPLY};
use colored::Colorize;
use rustyline::{error::ReadlineError, DefaultEditor};
use shared::domain::Role;
use tokio::sync::broadcast;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod render;
mod repl;

use config::{load_settings, validate_api_base};
use repl::{parse_line, ReplCommand};

const INPUT_HINT: &str = "e.g., Need a lo-fi video editor for a 30s TikTok";

#[derive(Parser, Debug)]
#[command(name = "spacetwo-chat")]
#[command(about = "Chat with the collaborator recommendation assistant")]
#[command(version)]
struct Args {
    /// Chat backend base URL; overrides chat.toml and the environment
    #[arg(long)]
    api_base: Option<String>,
    /// Settings file
    #[arg(long, default_value = "chat.toml")]
    config: PathBuf,
    /// Send one message, print the reply and exit
    #[arg(short, long)]
    message: Option<String>,
    /// Enable debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut settings = load_settings(&args.config).context("failed to load chat settings")?;
    if let Some(api_base) = args.api_base {
        settings.api_base = api_base;
    }
    let api_base = validate_api_base(&settings.api_base)?;

    let transport = Arc::new(HttpChatTransport::new(&api_base));
    info!(endpoint = transport.endpoint(), "chat transport ready");
    let client = match settings.greeting {
        Some(greeting) => ChatClient::with_greeting(transport, greeting),
        None => ChatClient::new(transport),
    };
    let mut events = client.subscribe();

    if let Some(text) = args.message {
        client.send(&text).await;
        print_appended(&mut events);
        return Ok(());
    }

    run_repl(&client, &mut events).await
}

async fn run_repl(client: &ChatClient, events: &mut broadcast::Receiver<ChatEvent>) -> Result<()> {
    let mut rl = DefaultEditor::new().context("failed to start line editor")?;

    println!(
        "{}  {}",
        "SpacetwoChat".bright_magenta().bold(),
        "Personalized Recommendations".bright_black()
    );
    println!("{}", "Type /help for commands.".bright_black());
    println!();
    for message in client.messages().await {
        print_message(&message);
    }
    println!("{}", INPUT_HINT.bright_black());

    loop {
        match rl.readline(">> ") {
            Ok(line) => match parse_line(&line) {
                ReplCommand::Say(text) => {
                    if text.trim().is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(text.trim());
                    client.send(&text).await;
                    print_appended(events);
                }
                ReplCommand::Help => println!("{}", repl::HELP),
                ReplCommand::Thread => println!("{}", client.thread_id()),
                ReplCommand::History => {
                    for message in client.messages().await {
                        print_message(&message);
                    }
                }
                ReplCommand::View(n) => print_card_detail(client, n).await,
                ReplCommand::Quit => break,
                ReplCommand::Unknown(cmd) => {
                    println!("{}", format!("Unknown command {cmd}; try /help").yellow());
                }
            },
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type /quit to exit.".yellow());
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(anyhow!("failed to read input: {err}")),
        }
    }

    Ok(())
}

/// Drains the append events produced by the send that just completed.
fn print_appended(events: &mut broadcast::Receiver<ChatEvent>) {
    while let Ok(ChatEvent::MessageAppended { message, .. }) = events.try_recv() {
        print_message(&message);
    }
}

fn print_message(message: &Message) {
    let failed = message.role == Role::Assistant && message.content == FALLBACK_REPLY;
    for line in render::message_lines(message) {
        let line = match message.role {
            Role::User => line.green(),
            Role::Assistant if failed => line.red().dimmed(),
            Role::Assistant => line.bright_blue(),
        };
        println!("{line}");
    }
    println!();
}

async fn print_card_detail(client: &ChatClient, n: usize) {
    let Some(message) = client.latest_with_recommendations().await else {
        println!("{}", "No recommendations yet.".yellow());
        return;
    };
    match message
        .recommendations
        .as_ref()
        .and_then(|recs| recs.get(n - 1))
    {
        Some(rec) => {
            for line in render::detail_lines(rec) {
                println!("{line}");
            }
        }
        None => println!("{}", format!("No card [{n}] in the latest recommendations.").yellow()),
    }
}
