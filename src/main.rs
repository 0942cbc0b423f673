use clap::Parser;
use pwvault::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

/// Log filter for diagnostics, e.g. `PWVAULT_LOG=pwvault=debug`.
const LOG_ENV: &str = "PWVAULT_LOG";

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(feature = "audit-log")]
fn run_audit(cli: &Cli, last: usize, since: Option<&str>) -> pwvault::errors::Result<()> {
    pwvault::cli::commands::audit_cmd::execute(cli, last, since)
}

#[cfg(not(feature = "audit-log"))]
fn run_audit(_cli: &Cli, _last: usize, _since: Option<&str>) -> pwvault::errors::Result<()> {
    Err(pwvault::errors::VaultError::CommandFailed(
        "built without the audit-log feature".into(),
    ))
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Add {
            ref fields,
            generate,
        } => pwvault::cli::commands::add::execute(&cli, fields, generate),
        Commands::Get { ref id, copy } => pwvault::cli::commands::get::execute(&cli, id, copy),
        Commands::List { ref search } => {
            pwvault::cli::commands::list::execute(&cli, search.as_deref())
        }
        Commands::Edit {
            ref id,
            ref fields,
            generate,
        } => pwvault::cli::commands::edit::execute(&cli, id, fields, generate),
        Commands::Delete { ref id, force } => {
            pwvault::cli::commands::delete::execute(&cli, id, force)
        }
        Commands::Generate { ref options } => pwvault::cli::commands::generate::execute(options),
        Commands::Rekey { new_password } => {
            pwvault::cli::commands::rekey::execute(&cli, new_password)
        }
        Commands::Token { ref action } => pwvault::cli::commands::token::execute(action),
        Commands::Audit { last, ref since } => run_audit(&cli, last, since.as_deref()),
        Commands::Version => pwvault::cli::commands::version::execute(),
        Commands::Completions { ref shell } => pwvault::cli::commands::completions::execute(shell),
    };

    if let Err(e) = result {
        pwvault::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
