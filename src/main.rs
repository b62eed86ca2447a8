use ping_watch::GenericError;
use std::process::ExitCode;

#[derive(argh::FromArgs)]
/// ping - send ICMP ECHO_REQUEST to a hostname or an IPv4 address until interrupted
struct Args {
    #[argh(option, short = 'w', default = "1000")]
    /// number of milliseconds to wait between sending pings
    wait: u64,

    #[argh(switch, short = 'v')]
    /// log socket activity
    verbose: bool,

    #[argh(positional)]
    /// hostname (google.com) or IPv4 address (1.1.1.1), optionally with :port
    destination: String,
}

fn main() -> Result<ExitCode, GenericError> {
    let args: Args = argh::from_env();

    let max_level = if args.verbose { tracing::Level::TRACE } else { tracing::Level::WARN };
    let subscriber = tracing_subscriber::FmtSubscriber::builder().with_max_level(max_level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Reported here only, the runner threads do not log the error that stops them.
    match ping_watch::start_pinging(&args.destination, args.wait) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            tracing::error!("{e}");
            Ok(ExitCode::FAILURE)
        }
    }
}
