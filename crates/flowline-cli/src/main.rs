mod cli;
mod load;
mod logging;
mod pipeline;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::cli::CliArgs;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    logging::init(&args.log_level)?;

    let token = CancellationToken::new();

    // Ctrl-C and the optional global deadline both cancel the run; teardown
    // still happens.
    {
        let token = token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received, cancelling run");
                token.cancel();
            }
        });
    }
    if let Some(secs) = args.timeout {
        let token = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_secs(secs)).await;
            warn!(seconds = secs, "global deadline reached, cancelling run");
            token.cancel();
        });
    }

    pipeline::run(args, token).await
}
