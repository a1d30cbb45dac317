use derive_builder::Builder;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectKind {
    Standard,
    Custom,
}

impl ProjectKind {
    /// Directory segment under `src/pages` and `src/routeFiles`
    #[must_use]
    pub fn dir_name(self) -> &'static str {
        match self {
            ProjectKind::Standard => "standard",
            ProjectKind::Custom => "project",
        }
    }
}

impl Display for ProjectKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectKind::Standard => write!(f, "standard"),
            ProjectKind::Custom => write!(f, "custom"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationMode {
    /// Domain token, css prefix and public path are parsed from the name
    Derived,
    /// Css prefix and public path are entered by the operator
    Explicit,
}

impl Display for CreationMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CreationMode::Derived => write!(f, "derived"),
            CreationMode::Explicit => write!(f, "explicit"),
        }
    }
}

/// Everything the provisioning steps need to know about the sub-project.
///
/// Built once after input collection and only ever read afterwards.
#[derive(Builder, Debug, Clone, PartialEq, Eq)]
#[builder(setter(into))]
pub struct ProvisioningRequest {
    kind: ProjectKind,
    mode: CreationMode,
    project_name: String,
    domain: String,
    css_prefix: String,
    public_path: String,
    dev_port: String,
    #[builder(default, setter(into, strip_option))]
    library_branch_a: Option<String>,
    #[builder(default, setter(into, strip_option))]
    library_branch_b: Option<String>,
    #[builder(default = "true")]
    auto_install: bool,
}

impl ProvisioningRequest {
    /// Create a new [`ProvisioningRequest`] builder
    #[must_use]
    pub fn builder() -> ProvisioningRequestBuilder {
        ProvisioningRequestBuilder::default()
    }

    #[must_use]
    pub fn kind(&self) -> ProjectKind {
        self.kind
    }

    #[must_use]
    pub fn mode(&self) -> CreationMode {
        self.mode
    }

    #[must_use]
    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// Business domain token, e.g. `support`
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    #[must_use]
    pub fn css_prefix(&self) -> &str {
        &self.css_prefix
    }

    #[must_use]
    pub fn public_path(&self) -> &str {
        &self.public_path
    }

    #[must_use]
    pub fn dev_port(&self) -> &str {
        &self.dev_port
    }

    #[must_use]
    pub fn library_branch_a(&self) -> Option<&str> {
        self.library_branch_a.as_deref()
    }

    #[must_use]
    pub fn library_branch_b(&self) -> Option<&str> {
        self.library_branch_b.as_deref()
    }

    #[must_use]
    pub fn auto_install(&self) -> bool {
        self.auto_install
    }
}
