use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cardvault::config::Config;
use cardvault::models::LifecycleState;
use cardvault::services::challenge::{CredentialChallenger, SharedLines};
use cardvault::ui::CardSession;

const HELP: &str = "\
Commands:
  list                 show the card screen
  add                  add a card
  edit <id>            edit a card
  remove <id>          remove cards with this id
  background|inactive  simulate leaving the app
  active               simulate returning to the app
  help                 show this help
  quit                 exit";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    List,
    Add,
    Edit(u64),
    Remove(u64),
    Lifecycle(LifecycleState),
    Help,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let command = match parts.next()? {
            "list" | "ls" => Command::List,
            "add" => Command::Add,
            "edit" => Command::Edit(parts.next()?.parse().ok()?),
            "remove" | "rm" => Command::Remove(parts.next()?.parse().ok()?),
            state @ ("active" | "inactive" | "background") => {
                Command::Lifecycle(state.parse().ok()?)
            }
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => return None,
        };
        Some(command)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cardvault=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting cardvault...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    let input: SharedLines<_> = Arc::new(Mutex::new(BufReader::new(tokio::io::stdin()).lines()));
    let challenger = Arc::new(CredentialChallenger::new(
        config.device_credential.as_ref(),
        input.clone(),
        tokio::io::stdout(),
    ));

    let (mut session, persistence) = cardvault::app::open_session(&config, challenger).await?;

    println!("{}", HELP);
    tokio::select! {
        result = run(&mut session, &input) => result?,
        _ = shutdown_signal() => {}
    }

    session.flush().await;
    drop(session);
    persistence.await?;
    tracing::info!("Card store flushed, exiting");

    Ok(())
}

async fn run<R>(session: &mut CardSession, input: &SharedLines<R>) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin + Send,
{
    loop {
        session.activate().await;
        print!("\n{}", session.screen());
        prompt("> ")?;

        let Some(line) = read_line(input).await? else {
            return Ok(());
        };
        if line.trim().is_empty() {
            continue;
        }

        match Command::parse(&line) {
            Some(Command::List) => {}
            Some(Command::Add) => {
                session.open_form();
                if fill_form(session, input).await? {
                    session.submit();
                } else {
                    session.form_mut().close();
                }
            }
            Some(Command::Edit(id)) => {
                if !session.begin_edit(id) {
                    println!("No card {} to edit", id);
                } else if fill_form(session, input).await? {
                    session.submit();
                } else {
                    session.form_mut().close();
                }
            }
            Some(Command::Remove(id)) => {
                if session.remove(id) == 0 {
                    println!("No card {} removed", id);
                }
            }
            Some(Command::Lifecycle(state)) => {
                session.on_lifecycle_change(state);
            }
            Some(Command::Help) => println!("{}", HELP),
            Some(Command::Quit) => return Ok(()),
            None => println!("Unknown command, type `help`"),
        }
    }
}

/// Prompts for each form field. An empty answer keeps the current value.
/// Returns false when input ends before the form is complete.
async fn fill_form<R>(session: &mut CardSession, input: &SharedLines<R>) -> anyhow::Result<bool>
where
    R: AsyncBufRead + Unpin + Send,
{
    for label in ["Bank", "Name", "Pin", "CVC"] {
        let current = match label {
            "Bank" => &session.form().bank,
            "Name" => &session.form().name,
            "Pin" => &session.form().pin,
            _ => &session.form().cvc,
        };
        if current.is_empty() {
            prompt(&format!("{}: ", label))?;
        } else {
            prompt(&format!("{} [{}]: ", label, current))?;
        }

        let Some(answer) = read_line(input).await? else {
            return Ok(false);
        };
        let answer = answer.trim().to_string();
        if answer.is_empty() {
            continue;
        }

        let form = session.form_mut();
        match label {
            "Bank" => form.bank = answer,
            "Name" => form.name = answer,
            "Pin" => form.pin = answer,
            _ => form.cvc = answer,
        }
    }
    Ok(true)
}

async fn read_line<R>(input: &SharedLines<R>) -> anyhow::Result<Option<String>>
where
    R: AsyncBufRead + Unpin + Send,
{
    Ok(input.lock().await.next_line().await?)
}

fn prompt(text: &str) -> anyhow::Result<()> {
    print!("{}", text);
    std::io::stdout().flush()?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for CTRL+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, cleaning up...");
}
