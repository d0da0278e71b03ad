//! Command handlers for the WAstring CLI

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};

use wastring_core::LuaValue;
use wastring_relay::{
    create_request_channel, create_response_channel, Relay, WaCodecProvider,
};

use crate::cli::{Cli, Commands};
use crate::config::AppConfig;
use crate::error::{CliError, Result};

/// Command dispatcher for handling CLI commands
pub struct CommandDispatcher;

impl CommandDispatcher {
    /// Execute a CLI command
    pub async fn execute(cli: Cli, config: AppConfig) -> Result<()> {
        match cli.command {
            Commands::Decode { input, compact } => Self::handle_decode_command(input, compact),
            Commands::Encode { input, legacy } => Self::handle_encode_command(input, legacy),
            Commands::Serve => Self::handle_serve_command(config).await,
        }
    }

    /// Handle the decode command
    fn handle_decode_command(input: Option<String>, compact: bool) -> Result<()> {
        let input = read_input(input)?;
        let mut values = wastring_core::decode(input.trim())?;

        // A single root is the common case; multiple roots come out as an
        // array so nothing is dropped.
        let json = if values.len() == 1 {
            serde_json::to_value(values.remove(0))?
        } else {
            serde_json::to_value(values)?
        };

        if compact {
            println!("{}", serde_json::to_string(&json)?);
        } else {
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        Ok(())
    }

    /// Handle the encode command
    fn handle_encode_command(input: Option<String>, legacy: bool) -> Result<()> {
        let input = read_input(input)?;
        let json: serde_json::Value = serde_json::from_str(&input)?;
        let value = LuaValue::from_json(&json);

        let encoded = if legacy {
            wastring_core::encode_legacy(&value)?
        } else {
            wastring_core::encode(&value)?
        };
        println!("{encoded}");
        Ok(())
    }

    /// Handle the serve command
    ///
    /// Requests are read from stdin one JSON object per line; responses are
    /// written to stdout the same way. The process exits when stdin closes.
    async fn handle_serve_command(config: AppConfig) -> Result<()> {
        let (request_tx, request_rx) = create_request_channel(&config.relay);
        let (response_tx, mut response_rx) = create_response_channel(&config.relay);

        let relay = Relay::new(WaCodecProvider, config.relay, request_rx, response_tx);
        let relay_handle = tokio::spawn(relay.run());

        let writer_handle = tokio::spawn(async move {
            let mut stdout = tokio::io::stdout();
            while let Some(response) = response_rx.recv().await {
                let mut line = serde_json::to_vec(&response)?;
                line.push(b'\n');
                stdout.write_all(&line).await?;
                stdout.flush().await?;
            }
            Ok::<(), CliError>(())
        });

        info!("Serving relay requests on stdin/stdout");
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(payload) => {
                    if request_tx.send(payload).await.is_err() {
                        break;
                    }
                }
                Err(e) => warn!("Ignoring unparseable request line: {}", e),
            }
        }

        // Closing the request channel winds the relay down, which in turn
        // closes the response channel and finishes the writer.
        drop(request_tx);
        relay_handle
            .await
            .map_err(|e| CliError::Task(e.to_string()))??;
        writer_handle
            .await
            .map_err(|e| CliError::Task(e.to_string()))??;
        Ok(())
    }
}

/// Returns the argument if given, otherwise reads all of stdin.
fn read_input(input: Option<String>) -> Result<String> {
    match input {
        Some(input) => Ok(input),
        None => Ok(std::io::read_to_string(std::io::stdin())?),
    }
}
