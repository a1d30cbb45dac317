use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::{
    config::Settings,
    error, fetch, info,
    prompt::{self, Prompter},
    provision::{self, actions, RemoveDir, Report, Workspace},
    request::ProvisioningRequest,
    shell::Shell,
    success, warn,
};

/// Provisions `request` under `cwd`: fetch, run every step, roll back on
/// failure and install dependencies when asked to.
pub fn provision(
    request: &ProvisioningRequest,
    settings: &Settings,
    shell: &dyn Shell,
    cwd: &Path,
) -> Report {
    let dir = cwd.join(request.project_name());

    if !fetch::fetch_template(shell, settings, &dir) {
        return Report::FetchFailed;
    }

    let ws = Workspace {
        dir: dir.clone(),
        request,
        settings,
        shell,
    };
    let steps = actions::steps(settings);
    let install = request
        .auto_install()
        .then(|| actions::install_step(settings));

    provision::execute(&steps, install.as_ref(), &ws, &dir, &mut RemoveDir)
}

/// The `create-sub` command: asks for the request, then provisions it in the
/// current directory.
///
/// # Errors
///
/// Returns an [`Err`] if input collection is aborted or the sub-project could
/// not be created
pub fn run(prompter: &mut dyn Prompter, settings: &Settings, shell: &dyn Shell) -> Result<()> {
    let request = prompt::collect(prompter)?;
    let cwd = std::env::current_dir().context("Failed to get current dir")?;

    info!(
        "Creating {} {} sub-project {} (domain {}, prefixCls {}, publicPath {}, port {})",
        request.kind(),
        request.mode(),
        request.project_name(),
        request.domain(),
        request.css_prefix(),
        request.public_path(),
        request.dev_port()
    );

    summarize(&provision(&request, settings, shell, &cwd), &request)
}

fn summarize(report: &Report, request: &ProvisioningRequest) -> Result<()> {
    match report {
        Report::FetchFailed => bail!("Could not download the template"),
        Report::StepFailed {
            step, rolled_back, ..
        } => {
            if !rolled_back {
                error!("{} was left behind", request.project_name());
            }
            bail!("{} was not created ({step} failed)", request.project_name())
        }
        Report::Created { installed } => {
            success!("Sub-project {} created", request.project_name());
            match installed {
                Some(true) => info!("Dependencies installed"),
                Some(false) => warn!(
                    "Dependency installation failed; run it yourself inside {}",
                    request.project_name()
                ),
                None => info!("Skipped dependency installation"),
            }
            Ok(())
        }
    }
}
