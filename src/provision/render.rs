use anyhow::{Context as _, Result};
use tera::{Context, Tera};

use crate::request::{ProjectKind, ProvisioningRequest};

const DEMO_PAGE: &str = include_str!("../../embedded/demo_page.tsx.tera");
const ROUTE: &str = include_str!("../../embedded/route.ts.tera");
const ROUTE_INDEX: &str = include_str!("../../embedded/route_index.ts.tera");

/// `src/pages/<kind>/<domain>/Demo`
#[must_use]
pub fn demo_page_dir(request: &ProvisioningRequest) -> String {
    format!(
        "src/pages/{}/{}/Demo",
        request.kind().dir_name(),
        request.domain()
    )
}

/// `src/routeFiles/<kind>`
#[must_use]
pub fn route_root(request: &ProvisioningRequest) -> String {
    format!("src/routeFiles/{}", request.kind().dir_name())
}

fn context(request: &ProvisioningRequest) -> Context {
    let mut ctx = Context::new();
    ctx.insert("project_name", request.project_name());
    ctx.insert("domain", request.domain());
    ctx.insert("standard", &(request.kind() == ProjectKind::Standard));
    ctx.insert("page_import", &format!("@/{}", demo_page_dir(request).trim_start_matches("src/")));
    ctx
}

fn render(name: &str, template: &str, request: &ProvisioningRequest) -> Result<String> {
    Tera::one_off(template, &context(request), false)
        .with_context(|| format!("Failed to render {name}"))
}

/// # Errors
///
/// Returns an [`Err`] if rendering fails
pub fn demo_page(request: &ProvisioningRequest) -> Result<String> {
    render("demo page", DEMO_PAGE, request)
}

/// # Errors
///
/// Returns an [`Err`] if rendering fails
pub fn route_file(request: &ProvisioningRequest) -> Result<String> {
    render("route file", ROUTE, request)
}

/// The aggregate route list for the project kind.
///
/// # Errors
///
/// Returns an [`Err`] if rendering fails
pub fn route_index(request: &ProvisioningRequest) -> Result<String> {
    render("route index", ROUTE_INDEX, request)
}
