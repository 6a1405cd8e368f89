use anyhow::Context;
use clap::Parser;
use relay_cli::{interactive, TerminalView};
use relay_client::{ChatClient, ReplyStatus};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Chat with a typewriter relay server.
#[derive(Parser)]
#[command(name = "relay")]
struct Cli {
    /// Server root URL.
    #[arg(long, env = "RELAY_URL", default_value = "http://localhost:3000")]
    url: String,

    /// Milliseconds between two revealed characters.
    #[arg(long, default_value_t = 25)]
    reveal_ms: u64,

    /// Message to send. Starts an interactive session when omitted.
    message: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let one_shot = !cli.message.is_empty();
    let view = Arc::new(TerminalView::stdio().with_echo_user(one_shot));
    let client = ChatClient::new(&cli.url, view)
        .context("building HTTP client")?
        .with_reveal_interval(Duration::from_millis(cli.reveal_ms));

    if one_shot {
        let reply = client.send(&cli.message.join(" ")).await?;
        if reply.status != ReplyStatus::Completed {
            anyhow::bail!("reply did not complete ({:?})", reply.status);
        }
        return Ok(());
    }

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    interactive(&client, stdin, &mut std::io::stdout()).await?;
    Ok(())
}
