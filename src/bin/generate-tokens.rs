//! Bulk generate enqueue tokens, one signed token per line.

use anyhow::Context;
use clap::Parser;
use queue_token::{EnqueueToken, EnqueueTokenPayload};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "generate-tokens", version, about = "Generate signed enqueue tokens in bulk")]
struct Cli {
    /// The number of tokens to generate
    token_count: usize,

    /// The customer the tokens are issued for
    customer_id: String,

    /// The secret key used to sign and encrypt the tokens
    secret_key: String,

    /// Attach a payload with a random relative quality to every token
    #[arg(short = 'r', long)]
    relative_quality: bool,

    /// The file to write the tokens to
    #[arg(short, long, default_value = "tokens.txt")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let file = File::create(&cli.output).with_context(|| format!("creating {}", cli.output.display()))?;
    let mut writer = BufWriter::new(file);

    for _ in 0..cli.token_count {
        let mut builder = EnqueueToken::builder(cli.customer_id.as_str());
        if cli.relative_quality {
            let payload = EnqueueTokenPayload::builder().relative_quality(rand::random::<f64>()).build();
            builder = builder.payload(payload);
        }
        let token = builder.generate(&cli.secret_key).context("generating token")?;
        writeln!(writer, "{token}")?;
    }
    writer.flush()?;

    tracing::info!("wrote {} tokens to {}", cli.token_count, cli.output.display());
    Ok(())
}
