use anyhow::Result;
use radio_client::args::Args;
use radio_client::{ClientConfig, ConnectionManager, ConnectionState, LastKnownStatus};
use std::sync::Arc;
use tracing::{debug, info};

mod console;

fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    // stdout belongs to the console
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("radioremote={log_level},radio_client={log_level}").into()
            }),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    info!("Starting radioremote {}", env!("CARGO_PKG_VERSION"));

    let config = ClientConfig::from_args(&args)?;
    let manager = ConnectionManager::new(config)?;
    let status = Arc::new(LastKnownStatus::new());

    let stale = status.clone();
    manager.on_state_change(move |state| {
        println!("* {state}");
        // A fresh status is requested on every open.
        if state == ConnectionState::Disconnected {
            stale.clear();
        }
    });

    let sink = status.clone();
    manager.on_message(move |text| match sink.apply(text) {
        Ok(record) => println!("{}", console::describe(&record)),
        Err(e) if e.is_shape_mismatch() => debug!("JSON message is not a status update: {}", e),
        Err(e) => debug!("Ignoring non-JSON message: {}", e),
    });

    match manager.endpoint() {
        Some(endpoint) if !args.offline => {
            info!(
                host = endpoint.host(),
                tls = endpoint.is_secure(),
                "Connecting to {}",
                endpoint
            );
            manager.connect()?;
        }
        _ => println!("Not connected. Use 'endpoint <url>' and 'connect'."),
    }

    console::run(&manager, &status).await?;

    manager.disconnect();
    info!("Bye");
    Ok(())
}
