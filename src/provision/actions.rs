//! The concrete provisioning actions, in the order they must run.

use anyhow::{anyhow, Context, Result};
use serde_json::Value;

use super::{files, render, Outcome, Step, Workspace};
use crate::{config::LibrarySource, progress, trace};

/// Name the template ships under, in its title, chart dir and chart name.
pub const TEMPLATE_NAME: &str = "cloudt-web-ice2-template";

const INDEX_HTML: &str = "public/index.html";
const PROJECT_CONFIG: &str = "src/project.config.ts";
const PREFIX_CLS_PLACEHOLDER: &str = "const prefixCls = 'cloudt-tmpl';";
const BUILD_CONFIG: &str = "build.config.js";
const PUBLIC_PATH_PLACEHOLDER: &str = "publicPath: '/template/',";
const PACKAGE_JSON: &str = "package.json";
const CHART_DIR: &str = "chart";

const INIT_COMMIT: &str = "feat(init): init#0";

/// Every required step, in execution order.
#[must_use]
pub fn steps<'w>(settings: &crate::config::Settings) -> Vec<Step<'static, Workspace<'w>>> {
    vec![
        Step::required(
            "Initialize git (master branch, initial commit, dev branch)",
            init_git,
        ),
        Step::required(
            format!("Import library {}", settings.library_a.label),
            import_library_a,
        ),
        Step::required(
            format!("Import library {}", settings.library_b.label),
            import_library_b,
        ),
        Step::required(format!("Set page title ({INDEX_HTML})"), set_title),
        Step::required("Create demo page", create_demo_page),
        Step::required("Create route files", create_routes),
        Step::required(
            format!("Set antd css prefix ({PROJECT_CONFIG})"),
            set_css_prefix,
        ),
        Step::required(format!("Set public path ({BUILD_CONFIG})"), set_public_path),
        Step::required(
            format!("Update dev port, name and subtree scripts ({PACKAGE_JSON})"),
            update_package_json,
        ),
        Step::required("Update deployment chart", update_chart),
    ]
}

/// Dependency installation; its failure never rolls the project back.
#[must_use]
pub fn install_step<'w>(settings: &crate::config::Settings) -> Step<'static, Workspace<'w>> {
    let pm = &settings.package_manager;
    let mut line = pm.program.clone();
    for arg in &pm.install_args {
        line.push(' ');
        line.push_str(arg);
    }

    Step::optional(line, install)
}

fn init_git(ws: &Workspace<'_>) -> Result<Outcome> {
    ws.git(&["init"])?;
    ws.git(&["symbolic-ref", "HEAD", "refs/heads/master"])?;
    ws.git(&["add", "."])?;
    ws.git(&["commit", "-m", INIT_COMMIT])?;
    ws.git(&["checkout", "-b", "dev"])?;

    Ok(Outcome::Done)
}

fn import_library_a(ws: &Workspace<'_>) -> Result<Outcome> {
    import_library(ws, &ws.settings.library_a, ws.request.library_branch_a())
}

fn import_library_b(ws: &Workspace<'_>) -> Result<Outcome> {
    import_library(ws, &ws.settings.library_b, ws.request.library_branch_b())
}

fn import_library(
    ws: &Workspace<'_>,
    library: &LibrarySource,
    branch: Option<&str>,
) -> Result<Outcome> {
    let Some(branch) = branch else {
        return Ok(Outcome::Skipped("no branch given".into()));
    };

    let prefix = ws.path(&library.prefix);
    if library.clear_prefix && prefix.exists() {
        // subtree add refuses to write into an existing prefix
        fs_extra::dir::remove(&prefix)
            .with_context(|| format!("Failed to remove {}", prefix.display()))?;
        ws.git(&["add", "."])?;
        ws.git(&[
            "commit",
            "-m",
            &format!("feat({}): delete {}#0", library.script_key, library.script_key),
        ])?;
    }

    ws.git(&[
        "subtree",
        "add",
        &format!("--prefix={}", library.prefix),
        &library.url,
        branch,
        "--squash",
    ])?;

    Ok(Outcome::Done)
}

fn set_title(ws: &Workspace<'_>) -> Result<Outcome> {
    files::substitute(
        &ws.path(INDEX_HTML),
        &format!("<title>{TEMPLATE_NAME}</title>"),
        &format!("<title>{}</title>", ws.request.project_name()),
    )?;

    Ok(Outcome::Done)
}

fn create_demo_page(ws: &Workspace<'_>) -> Result<Outcome> {
    let file = ws
        .path(&render::demo_page_dir(ws.request))
        .join("index.tsx");

    files::write_creating_dirs(&file, &render::demo_page(ws.request)?)?;

    Ok(Outcome::Done)
}

fn create_routes(ws: &Workspace<'_>) -> Result<Outcome> {
    let root = ws.path(&render::route_root(ws.request));
    let route = root.join(ws.request.domain()).join("index.ts");

    files::write_creating_dirs(&route, &render::route_file(ws.request)?)?;
    files::write_creating_dirs(&root.join("index.ts"), &render::route_index(ws.request)?)?;

    Ok(Outcome::Done)
}

fn set_css_prefix(ws: &Workspace<'_>) -> Result<Outcome> {
    files::substitute(
        &ws.path(PROJECT_CONFIG),
        PREFIX_CLS_PLACEHOLDER,
        &format!("const prefixCls = '{}';", ws.request.css_prefix()),
    )?;

    Ok(Outcome::Done)
}

fn set_public_path(ws: &Workspace<'_>) -> Result<Outcome> {
    files::substitute(
        &ws.path(BUILD_CONFIG),
        PUBLIC_PATH_PLACEHOLDER,
        &format!("publicPath: '{}',", ws.request.public_path()),
    )?;

    Ok(Outcome::Done)
}

fn update_package_json(ws: &Workspace<'_>) -> Result<Outcome> {
    let file = ws.path(PACKAGE_JSON);
    let contents = std::fs::read_to_string(&file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let updated = rewrite_manifest(
        &contents,
        ws.request.project_name(),
        &ws.settings.template_dev_port,
        ws.request.dev_port(),
        [
            (&ws.settings.library_a, ws.request.library_branch_a()),
            (&ws.settings.library_b, ws.request.library_branch_b()),
        ],
    )
    .with_context(|| format!("Unexpected contents in {}", file.display()))?;

    std::fs::write(&file, updated)
        .with_context(|| format!("Failed to write {}", file.display()))?;

    Ok(Outcome::Done)
}

/// Sets the package name, swaps the template port in the `start` script and
/// adds `<key>-add`/`<key>-pull` scripts for every library with a branch.
///
/// # Errors
///
/// Returns an [`Err`] if `manifest` is not JSON or has no `scripts.start`
/// containing `template_port`
pub fn rewrite_manifest<'l>(
    manifest: &str,
    project_name: &str,
    template_port: &str,
    dev_port: &str,
    libraries: impl IntoIterator<Item = (&'l LibrarySource, Option<&'l str>)>,
) -> Result<String> {
    let mut json: Value = serde_json::from_str(manifest).context("Invalid JSON")?;

    let root = json
        .as_object_mut()
        .ok_or_else(|| anyhow!("package manifest is not an object"))?;
    root.insert("name".into(), Value::String(project_name.into()));

    let scripts = root
        .get_mut("scripts")
        .and_then(Value::as_object_mut)
        .ok_or_else(|| anyhow!("no `scripts` object"))?;

    let start = scripts
        .get("start")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("no `scripts.start` command"))?;
    let start = files::replace_first(start, template_port, dev_port)
        .context("`scripts.start` does not use the template port")?;
    scripts.insert("start".into(), Value::String(start));

    for (library, branch) in libraries {
        if let Some(branch) = branch {
            trace!("Adding {} subtree scripts for {branch}", library.script_key);

            for verb in ["add", "pull"] {
                scripts.insert(
                    format!("{}-{verb}", library.script_key),
                    Value::String(library.subtree_command(verb, branch)),
                );
            }
        }
    }

    Ok(serde_json::to_string_pretty(&json)?)
}

fn update_chart(ws: &Workspace<'_>) -> Result<Outcome> {
    let name = ws.request.project_name();
    let charts = ws.path(CHART_DIR);
    let chart = charts.join(name);

    files::rename_dir(&charts.join(TEMPLATE_NAME), &chart)?;
    files::substitute(
        &chart.join("Chart.yaml"),
        &format!("name: {TEMPLATE_NAME}"),
        &format!("name: {name}"),
    )?;

    Ok(Outcome::Done)
}

fn install(ws: &Workspace<'_>) -> Result<Outcome> {
    let pm = &ws.settings.package_manager;
    let args = pm.install_args.iter().map(String::as_str).collect::<Vec<_>>();

    let pb = progress::spinner("Installing dependencies");
    let res = ws.shell.run(&ws.dir, &pm.program, &args);
    pb.finish_and_clear();

    res.map(|()| Outcome::Done)
}
