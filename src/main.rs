use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use sparky_sched::configuration::{get_configuration, DEFAULT_SETTINGS_FILE};
use sparky_sched::recipient_list::InputMode;
use sparky_sched::startup::{Application, Job};
use sparky_sched::telemetry::{get_subscriber, init_subscriber};

/// Simple command-line tool to trigger bulk sends through SparkPost using a stored template.
#[derive(Parser, Debug)]
#[command(name = "sparky-sched", version)]
struct Cli {
    /// File containing the recipients: a .csv list with a header row drawn from
    /// email, name, return_path, metadata, substitution_data, tags; or a plain
    /// list of email addresses
    recipient_list: PathBuf,

    /// SparkPost stored template ID
    template_id: String,

    /// Sending time as YYYY-MM-DDTHH:MM:SS±HH:MM
    sending_time: String,

    /// Settings file holding the [SparkPost] section
    #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
    config: String,

    /// Treat the recipient list as one bare email address per line
    #[arg(long)]
    plain: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // Too few arguments is a request for help, not a failure
        Err(e) if e.kind() == ErrorKind::MissingRequiredArgument => {
            Cli::command().print_long_help()?;
            return Ok(());
        }
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        // Usage mistakes are fatal like any other input error
        Err(e) => {
            e.print()?;
            std::process::exit(1);
        }
    };

    let subscriber = get_subscriber("sparky-sched".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let settings = get_configuration(&cli.config)?.sparkpost.validate(&cli.config)?;

    let job = Job {
        recipient_list: cli.recipient_list,
        template: cli.template_id,
        start_time: cli.sending_time,
        mode: if cli.plain {
            InputMode::Plain
        } else {
            InputMode::Structured
        },
    };

    let application = Application::build(settings, job)?;
    let summary = application.run_until_complete().await?;

    tracing::info!(
        batches = summary.batches_submitted,
        submitted = summary.recipients_submitted,
        accepted = summary.recipients_accepted,
        anomalies = summary.anomalies,
        "Injection complete"
    );
    Ok(())
}
