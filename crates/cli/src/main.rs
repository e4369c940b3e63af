use anyhow::Context;
use applysmart_cli::{execute, CliConfig, Command};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "applysmart_cli=info,applysmart_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = Command::parse(&args)?;
    let config = CliConfig::from_env().context("invalid configuration")?;

    let output = execute(command, &config).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
