//! Herald - Entry Point
//!
//! Reads commands from stdin, prints replies to stdout and interleaves timer
//! and reminder notifications as they fire. Logs go to stderr.

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use herald::command::handlers::basic;
use herald::command::{Intent, ParsedCommand, Reply, Router};
use herald::core::error::Result;
use herald::llm::LlmClient;
use herald::scheduler::spawn_notifier;
use herald::session::{SessionContext, Storage};

#[derive(Parser, Debug)]
#[command(name = "herald", about = "Text-command assistant with timers and reminders")]
struct Args {
    /// Directory holding config, memory, reminders and custom commands
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Never call the generative backend
    #[arg(long)]
    no_llm: bool,

    /// Log filter directive (overrides RUST_LOG)
    #[arg(long)]
    log_filter: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = match &args.log_filter {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("herald=info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    info!("Herald starting...");

    let storage = match args.data_dir {
        Some(dir) => Storage::new(dir),
        None => Storage::new(Storage::default_dir()),
    };
    let mut ctx = SessionContext::open(storage)?;

    let budget = Duration::from_secs(ctx.config.generative.timeout_secs);
    let backend = if args.no_llm {
        None
    } else {
        match LlmClient::from_config(&ctx.config.generative) {
            Some(mut client) => {
                client.probe(budget).await;
                Some(client)
            }
            None => None,
        }
    };
    let router = Router::standard(backend, budget);

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let notifier = spawn_notifier(ctx.scheduler.clone(), event_tx);

    print_reply(&basic::greeting(&mut ctx, &ParsedCommand::new("", Intent::Greeting, 1.0)));
    if let Some(name) = ctx.profile.display_name() {
        println!("Welcome back, {}.", name);
    }
    prompt();

    // Split on raw bytes; invalid UTF-8 is replaced instead of ending input
    let mut lines = BufReader::new(tokio::io::stdin()).split(b'\n');
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            line = lines.next_segment() => {
                let bytes = match line {
                    Ok(Some(bytes)) => bytes,
                    Ok(None) => {
                        info!("End of input");
                        break;
                    }
                    Err(e) => {
                        warn!("Stopped reading input: {}", e);
                        break;
                    }
                };
                let line = String::from_utf8_lossy(&bytes);
                let input = line.trim();
                if input.is_empty() {
                    prompt();
                    continue;
                }
                let reply = router.dispatch(&mut ctx, input).await;
                print_reply(&reply);
                if reply.end_session {
                    break;
                }
                prompt();
            }
            Some(event) = event_rx.recv() => {
                println!();
                println!("{}", event.message());
                ctx.record_event(&event);
                ctx.persist_memory();
                prompt();
            }
            _ = &mut ctrl_c => {
                println!();
                info!("Interrupted");
                break;
            }
        }
    }

    notifier.abort();
    ctx.flush()?;
    info!("Herald stopped");
    Ok(())
}

fn print_reply(reply: &Reply) {
    for line in &reply.lines {
        println!("{}", line);
    }
}

fn prompt() {
    print!("> ");
    if let Err(e) = io::stdout().flush() {
        debug!("Could not flush the prompt: {}", e);
    }
}
