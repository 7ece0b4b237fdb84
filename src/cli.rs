use clap::{Args, Parser, Subcommand};
use pushcast::config::{AppConfig, DeliveryLimits, LogFormat, ScheduleConfig};
use pushcast::types::notification::NotificationPayload;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[allow(clippy::large_enum_variant)]
pub(crate) enum RunOutcome {
    Serve(AppConfig, LogFormat),
    Schedule(ScheduleConfig, LogFormat),
    Exit(i32),
}

pub(crate) fn run() -> RunOutcome {
    let cli = Cli::parse();
    match cli.command {
        Some(Command::Init(ref args)) => RunOutcome::Exit(run_init(args)),
        Some(Command::TriggerSecret) => RunOutcome::Exit(run_trigger_secret()),
        Some(Command::Schedule(ref args)) => match resolve_schedule_config(&cli, args) {
            Ok(config) => RunOutcome::Schedule(config, cli.log_format),
            Err(err) => {
                eprintln!("error: {err}");
                RunOutcome::Exit(2)
            }
        },
        None => match resolve_app_config(&cli) {
            Ok(config) => RunOutcome::Serve(config, cli.log_format),
            Err(err) => {
                eprintln!("error: {err}");
                RunOutcome::Exit(2)
            }
        },
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "pushcast",
    version,
    about = "Web push fan-out server for subscribed browsers"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
    #[arg(long, env = "PUSHCAST_LISTEN", default_value = "127.0.0.1:3000")]
    listen: SocketAddr,
    #[arg(long, env = "PUSHCAST_VAPID_PRIVATE_KEY")]
    vapid_private_key: Option<String>,
    #[arg(long, env = "PUSHCAST_VAPID_PUBLIC_KEY")]
    vapid_public_key: Option<String>,
    #[arg(long, env = "PUSHCAST_VAPID_SUBJECT")]
    vapid_subject: Option<String>,
    #[arg(long, env = "PUSHCAST_TRIGGER_SECRET")]
    trigger_secret: Option<String>,
    #[arg(long, env = "PUSHCAST_SUBSCRIPTIONS_FILE")]
    subscriptions_file: Option<PathBuf>,
    #[arg(long, env = "PUSHCAST_CONCURRENCY", default_value_t = pushcast::config::DEFAULT_CONCURRENCY)]
    concurrency: usize,
    #[arg(
        long,
        env = "PUSHCAST_SEND_TIMEOUT_SECS",
        default_value_t = pushcast::config::DEFAULT_SEND_TIMEOUT.as_secs()
    )]
    send_timeout_secs: u64,
    #[arg(long, env = "PUSHCAST_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a fresh VAPID key pair.
    Init(InitArgs),
    /// Print a random secret for the send trigger.
    TriggerSecret,
    /// Fire a delivery round against a running server on a fixed interval.
    Schedule(ScheduleArgs),
}

#[derive(Args, Debug)]
struct InitArgs {
    #[arg(long)]
    subject: Option<String>,
}

#[derive(Args, Debug)]
struct ScheduleArgs {
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    target: String,
    #[arg(long, default_value_t = 10)]
    interval_secs: u64,
    #[arg(long)]
    max_rounds: Option<u64>,
    #[arg(long, default_value = "Test Notification")]
    title: String,
    #[arg(long, default_value = "This is a test notification")]
    body: String,
    #[arg(long, default_value = "test")]
    tag: String,
    /// Page the notification opens when clicked.
    #[arg(long, default_value = "/")]
    click_url: String,
    #[arg(
        long,
        env = "PUSHCAST_TRIGGER_TIMEOUT_SECS",
        default_value_t = pushcast::config::DEFAULT_TRIGGER_TIMEOUT.as_secs()
    )]
    request_timeout_secs: u64,
}

fn run_init(args: &InitArgs) -> i32 {
    let credentials = match pushcast::generate_vapid_credentials() {
        Ok(credentials) => credentials,
        Err(err) => {
            eprintln!("failed to generate VAPID credentials: {err}");
            return 1;
        }
    };
    let (subject, show_subject_note) = match args.subject.as_deref() {
        Some(subject) => (subject.to_string(), false),
        None => ("mailto:you@example.com".to_string(), true),
    };

    println!("VAPID credentials generated.");
    println!();
    println!("PUSHCAST_VAPID_PRIVATE_KEY=\"{}\"", credentials.private_key);
    println!("PUSHCAST_VAPID_PUBLIC_KEY=\"{}\"", credentials.public_key);
    println!("PUSHCAST_VAPID_SUBJECT=\"{subject}\"");
    if show_subject_note {
        println!();
        println!("Note: replace PUSHCAST_VAPID_SUBJECT with a contact URI you control.");
    }
    println!();
    println!(
        "--vapid-private-key \"{}\" --vapid-public-key \"{}\" --vapid-subject \"{subject}\"",
        credentials.private_key, credentials.public_key
    );
    0
}

fn run_trigger_secret() -> i32 {
    println!("{}", pushcast::generate_trigger_secret());
    0
}

fn resolve_app_config(cli: &Cli) -> Result<AppConfig, String> {
    if cli.concurrency == 0 {
        return Err("concurrency must be greater than 0".to_string());
    }
    if cli.send_timeout_secs == 0 {
        return Err("send timeout must be greater than 0".to_string());
    }

    Ok(AppConfig {
        listen: cli.listen,
        vapid_private_key: cli.vapid_private_key.clone(),
        vapid_public_key: cli.vapid_public_key.clone(),
        vapid_subject: cli.vapid_subject.clone(),
        trigger_secret: cli.trigger_secret.clone(),
        subscriptions_file: cli.subscriptions_file.clone(),
        delivery: DeliveryLimits {
            concurrency: cli.concurrency,
            send_timeout: Duration::from_secs(cli.send_timeout_secs),
        },
    })
}

fn resolve_schedule_config(cli: &Cli, args: &ScheduleArgs) -> Result<ScheduleConfig, String> {
    if args.interval_secs == 0 {
        return Err("interval must be greater than 0".to_string());
    }
    if args.request_timeout_secs == 0 {
        return Err("request timeout must be greater than 0".to_string());
    }
    let target = args.target.trim();
    if target.is_empty() {
        return Err("target cannot be empty".to_string());
    }

    let mut payload = NotificationPayload::new(args.title.clone(), args.body.clone());
    payload.tag = Some(args.tag.clone());
    payload.data = Some(serde_json::json!({ "url": args.click_url }));
    payload
        .validate()
        .map_err(|err| format!("invalid notification: {err}"))?;

    Ok(ScheduleConfig {
        target: target.to_string(),
        trigger_secret: cli.trigger_secret.clone(),
        interval: Duration::from_secs(args.interval_secs),
        request_timeout: Duration::from_secs(args.request_timeout_secs),
        max_rounds: args.max_rounds,
        payload,
    })
}
