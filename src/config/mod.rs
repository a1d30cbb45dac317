use anyhow::{anyhow, ensure, Context};
use directories::UserDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::trace;

pub const CONFIG_FILE: &str = "config.json";

/// Remote repositories and tools the provisioning pipeline talks to.
///
/// Every field may be overridden from a `config.json`; missing fields keep
/// their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub template_url: String,
    pub template_branch: String,
    /// Port hard-coded in the template's `start` script
    pub template_dev_port: String,
    pub library_a: LibrarySource,
    pub library_b: LibrarySource,
    pub package_manager: PackageManager,
}

/// A repository imported as a git subtree.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibrarySource {
    pub label: String,
    pub url: String,
    pub prefix: String,
    /// Key used for the `<key>-add` and `<key>-pull` package scripts
    pub script_key: String,
    /// Delete and commit away whatever the template ships at `prefix` first
    #[serde(default)]
    pub clear_prefix: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManager {
    pub program: String,
    pub install_args: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            template_url: "git@code.elitescloud.com:cloudt-web-suites/cloudt-web-ice2-template.git"
                .into(),
            template_branch: "develop".into(),
            template_dev_port: "3030".into(),
            library_a: LibrarySource {
                label: "cloudt".into(),
                url: "git@code.elitescloud.com:cloudt-web-suites/cloudt.git".into(),
                prefix: "src/cloudt".into(),
                script_key: "cloudt".into(),
                clear_prefix: true,
            },
            library_b: LibrarySource {
                label: "stdShare".into(),
                url: "git@code.elitescloud.com:el-yst-buzi-std/std-share.git".into(),
                prefix: "src/std-share".into(),
                script_key: "stdshare".into(),
                clear_prefix: false,
            },
            package_manager: PackageManager::default(),
        }
    }
}

impl Default for PackageManager {
    fn default() -> Self {
        Self {
            program: "npm".into(),
            install_args: vec!["i".into()],
        }
    }
}

impl LibrarySource {
    /// The `git subtree <verb>` command line for `branch`.
    #[must_use]
    pub fn subtree_command(&self, verb: &str, branch: &str) -> String {
        format!(
            "git subtree {verb} --prefix={} {} {branch} --squash",
            self.prefix, self.url
        )
    }
}

impl Settings {
    /// Parses settings from the contents of a config file.
    ///
    /// # Errors
    ///
    /// Returns an [`Err`] if the contents are not valid JSON for [`Settings`]
    pub fn from_json(contents: &str) -> anyhow::Result<Self> {
        let settings: Settings = serde_json::from_str(contents)?;

        ensure!(
            !settings.template_url.trim().is_empty(),
            anyhow!("templateUrl can not be empty")
        );
        ensure!(
            !settings.package_manager.program.trim().is_empty(),
            anyhow!("packageManager.program can not be empty")
        );

        Ok(settings)
    }

    /// Reads settings from `path`.
    ///
    /// # Errors
    ///
    /// Returns an [`Err`] if the file can not be read or parsed
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        trace!("Reading settings from {}", path.display());

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        Self::from_json(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Loads settings from `explicit` if given, else from the default config
    /// directory if it holds a config file, else the built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an [`Err`] if a config file exists but can not be read or parsed,
    /// or if `explicit` does not exist
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match ConfigDirs::default_paths() {
            Ok(dirs) => {
                let file = dirs.config_file();
                if file.is_file() {
                    Self::from_file(&file)
                } else {
                    trace!("No config file at {}, using defaults", file.display());
                    Ok(Self::default())
                }
            }
            Err(e) => {
                trace!("Config dir lookup failed ({e}), using defaults");
                Ok(Self::default())
            }
        }
    }
}

/// Where the global configuration lives.
pub struct ConfigDirs {
    config_dir: PathBuf,
}

impl ConfigDirs {
    /// Attempt to locate the config dir with the usual fallbacks
    ///
    /// # Errors
    ///
    /// Returns an [`Err`] if the user's home can not be determined
    pub fn default_paths() -> anyhow::Result<Self> {
        let home = Self::get_user_home()?;
        let xdg = std::env::var("XDG_CONFIG_HOME").ok().map(PathBuf::from);

        Ok(Self {
            config_dir: Self::get_config_dir(&home, xdg.as_deref()),
        })
    }

    /// Returns the path for the user home `~/`
    ///
    /// # Errors
    ///
    /// Returns an [`Err`] if a path for the users home can not
    /// be found
    pub fn get_user_home() -> anyhow::Result<PathBuf> {
        Ok(UserDirs::new()
            .context("Failed to get user's home directory")?
            .home_dir()
            .to_owned())
    }

    /// Looks for the configuration dir, in order:
    /// - `$XDG_CONFIG_HOME/cloudt`
    /// - `~/.config/cloudt`
    /// - `~/.cloudt`
    #[must_use]
    pub fn get_config_dir(home: &Path, xdg_config_home: Option<&Path>) -> PathBuf {
        xdg_config_home
            .map(Path::to_path_buf)
            .into_iter()
            .chain(std::iter::once(home.join(".config")))
            .find(|dir| dir.exists())
            .map_or_else(|| home.join(".cloudt"), |dir| dir.join("cloudt"))
    }

    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }
}
