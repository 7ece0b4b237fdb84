mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    match cli::run() {
        cli::RunOutcome::Serve(config, log_format) => {
            pushcast::telemetry::init_tracing(log_format)?;
            pushcast::serve(config).await
        }
        cli::RunOutcome::Schedule(config, log_format) => {
            pushcast::telemetry::init_tracing(log_format)?;
            pushcast::schedule(config).await
        }
        cli::RunOutcome::Exit(code) => std::process::exit(code),
    }
}
