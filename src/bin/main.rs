use financial_support_assistant::repl::interrupt_signal;
use financial_support_assistant::{Assistant, AssistantError, Config};
use std::time::Duration;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they never interleave with the prompt
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(async {
        // Armed before setup so Ctrl+C at any point is a clean exit
        let interrupt = interrupt_signal()?;

        let config = Config::from_env()?;
        let mut assistant = Assistant::from_config(&config)?;
        info!(model = %config.model, "Financial support assistant starting");

        let mut stdout = std::io::stdout();
        let reason = assistant
            .run(BufReader::new(tokio::io::stdin()), &mut stdout, interrupt)
            .await?;

        info!(?reason, "Financial support assistant stopped");
        Ok::<(), AssistantError>(())
    });

    // A pending stdin read cannot be cancelled; do not wait for it.
    runtime.shutdown_timeout(Duration::from_millis(100));

    result.map_err(Into::into)
}
