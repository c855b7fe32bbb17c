use clap::Parser;
use ctf_recon::banner::print_banner;
use ctf_recon::cli::Cli;
use ctf_recon::error::CliError;
use ctf_recon::logging::init_logging;
use ctf_recon::output::print_error;
use std::process::ExitCode;

async fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = cli.context()?;
    init_logging(cli.verbose, cli.quiet, cli.log_file(&ctx).as_deref()).map_err(CliError::from)?;

    if ctx.chatty(cli.command.output_format(&ctx.settings)) {
        print_banner();
    }

    cli.command.execute(&ctx).await?;
    Ok(())
}

fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<CliError>()
        .map_or(1, |e| u8::try_from(e.exit_code()).unwrap_or(1))
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error(&format!("{:#}", e));
            ExitCode::from(exit_code(&e))
        }
    }
}
