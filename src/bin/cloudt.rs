use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use cloudt_cli::{
    args::{Args, Commands},
    config::Settings,
    create_sub, error,
    prompt::InquirePrompter,
    shell::SystemShell,
    trace,
};

fn app(args: &Args) -> Result<()> {
    let settings = Settings::load(args.config.as_deref())?;

    trace!("Template: {} ({})", settings.template_url, settings.template_branch);

    match args.command {
        Commands::CreateSub => create_sub::run(&mut InquirePrompter, &settings, &SystemShell),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    match app(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
