use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::PathBuf;

use anyhow::{Context as _, Result, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use kindroid_core::ChatMessage;
use kindroid_interaction::{KindroidClient, SendMessageOptions};
use rustyline::completion::Completer;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

const RESET_COMMANDS: [&str; 2] = ["/reset", "!reset"];

#[derive(Parser)]
#[command(name = "kindroid")]
#[command(about = "Talk to a Kindroid AI from the terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat (default)
    Chat,
    /// Print the most recent messages, newest first
    History {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Fetch (and if needed generate) the audio of an AI message
    Audio {
        /// Message to voice; defaults to the latest AI message
        #[arg(long)]
        message_id: Option<String>,
        /// Where to write the audio bytes
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Show subscription details
    Subscription,
}

/// Rustyline helper that hints and highlights the reset command.
struct ChatHelper;

impl Helper for ChatHelper {}

impl Completer for ChatHelper {
    type Candidate = String;
}

impl Highlighter for ChatHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if is_reset(line) {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, line: &str, _pos: usize, _forced: bool) -> bool {
        line.starts_with('/') || line.starts_with('!')
    }
}

impl Hinter for ChatHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        reset_hint(&line[..pos])
    }
}

impl Validator for ChatHelper {}

fn is_reset(line: &str) -> bool {
    RESET_COMMANDS.contains(&line.trim())
}

/// Remainder of the reset command the typed prefix starts.
fn reset_hint(prefix: &str) -> Option<String> {
    if prefix.len() < 2 {
        return None;
    }
    RESET_COMMANDS
        .iter()
        .find(|cmd| cmd.starts_with(prefix) && cmd.len() > prefix.len())
        .map(|cmd| cmd[prefix.len()..].to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let mut client =
        KindroidClient::try_from_env().context("Kindroid credentials are not configured")?;

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => chat(&client).await,
        Commands::History { limit } => {
            authenticate(&mut client).await?;
            let ai_id = client.ai_id().to_string();
            let messages = client.get_chat_history(&ai_id, limit).await?;
            println!("{}", "Chat History:".bright_magenta().bold());
            for message in &messages {
                print_message(message);
            }
            Ok(())
        }
        Commands::Audio { message_id, out } => {
            authenticate(&mut client).await?;
            audio(&client, message_id, out).await
        }
        Commands::Subscription => {
            let info = client.check_user_subscription().await?;
            println!("{}", serde_json::to_string_pretty(&info)?);
            Ok(())
        }
    }
}

async fn authenticate(client: &mut KindroidClient) -> Result<()> {
    let identity = client
        .setup_user_and_permissions()
        .await
        .context("Failed to set up user")?;
    println!(
        "{}",
        format!("Authenticated as UserID: {}", identity.user_id).bright_black()
    );
    Ok(())
}

async fn audio(
    client: &KindroidClient,
    message_id: Option<String>,
    out: Option<PathBuf>,
) -> Result<()> {
    let message_id = match message_id {
        Some(id) => id,
        None => {
            let ai_id = client.ai_id().to_string();
            let messages = client.get_chat_history(&ai_id, 10).await?;
            let Some(message) = messages.iter().find(|m| m.is_from_ai()) else {
                bail!("No AI message found in recent history");
            };
            print_message(message);
            message.id.clone()
        }
    };

    let bytes = client.audio_inference(&message_id).await?;
    println!(
        "{}",
        format!("Audio for {} ({} bytes)", message_id, bytes.len()).green()
    );

    if let Some(path) = out {
        std::fs::write(&path, &bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("{}", format!("Saved to {}", path.display()).bright_black());
    }
    Ok(())
}

async fn chat(client: &KindroidClient) -> Result<()> {
    let mut rl: Editor<ChatHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(ChatHelper));

    println!("{}", "=== Kindroid Chat ===".bright_magenta().bold());
    println!(
        "{}",
        "Type '/reset' (or '!reset') to start a new chat, 'quit' to exit.".bright_black()
    );
    println!();

    loop {
        match rl.readline(">> ") {
            Ok(line) => {
                let trimmed = line.trim();

                if trimmed == "quit" || trimmed == "exit" {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                if is_reset(trimmed) {
                    reset(client, &mut rl).await;
                    continue;
                }

                let options = SendMessageOptions::new(client.ai_id(), trimmed);
                match client.send_message_advanced(&options).await {
                    Ok(reply) => {
                        let text = match reply.text() {
                            Some(text) => text.to_string(),
                            None => format!("{:?}", reply),
                        };
                        for line in text.lines() {
                            println!("{}", line.bright_blue());
                        }
                    }
                    Err(e) => eprintln!("{}", format!("Error sending message: {}", e).red()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    Ok(())
}

/// Asks for the AI's opening line and breaks the chat with it.
async fn reset(client: &KindroidClient, rl: &mut Editor<ChatHelper, DefaultHistory>) {
    let greeting = match rl.readline("Enter the AI's greeting message to start a new chat: ") {
        Ok(greeting) => greeting.trim().to_string(),
        Err(e) => {
            eprintln!("{}", format!("Error reading greeting: {}", e).red());
            return;
        }
    };

    match client.chat_break(&greeting).await {
        Ok(()) => {
            println!("{}", "Chat has been reset.".bright_green());
            println!("{}", greeting.bright_blue());
        }
        Err(e) => eprintln!("{}", format!("Error resetting chat: {}", e).red()),
    }
}

fn print_message(message: &ChatMessage) {
    let time = message
        .timestamp
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());
    let line = format!("[{}] {}: {}", time, message.sender, message.message);
    if message.is_from_ai() {
        println!("{}", line.bright_blue());
    } else {
        println!("{}", line.green());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_commands() {
        assert!(is_reset("/reset"));
        assert!(is_reset(" !reset "));
        assert!(!is_reset("reset"));
        assert!(!is_reset("/reset now"));
    }

    #[test]
    fn test_reset_hint() {
        assert_eq!(reset_hint("/re").as_deref(), Some("set"));
        assert_eq!(reset_hint("!r").as_deref(), Some("eset"));
        assert_eq!(reset_hint("/"), None);
        assert_eq!(reset_hint("/reset"), None);
        assert_eq!(reset_hint("hello"), None);
    }
}
