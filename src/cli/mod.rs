//! Command-line interface for rolegraph.
//!
//! A single command: list the internal projects of a GitLab instance, build
//! the role/play inventory and write the reports.
//!
//! ```bash
//! # Inventory everything below ansible/ and include unresolved roles
//! rolegraph --token "$GITLAB_TOKEN" --gitlab-url https://gitlab.example.com \
//!     --filter ansible/roles/ --filter ansible/plays/ --show-unknown
//!
//! # Same, with defaults taken from a settings file
//! rolegraph -c rolegraph.toml -o public
//! ```
//!
//! # Exit codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0    | Reports written |
//! | 1    | Authentication failure or any other error |
//! | 2    | Invalid command-line usage |
//! | 255  | A repository tree could not be listed |

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;

use crate::config::{Overrides, Settings, SettingsFile};
use crate::gitlab::{GitlabClient, ProjectHost};
use crate::inventory::{Inventory, InventoryBuilder};
use crate::report;

/// Graph which Ansible plays use which roles on a GitLab instance.
#[derive(Debug, Parser)]
#[command(
    name = "rolegraph",
    version,
    about = "Inventory Ansible roles and plays on GitLab and graph their dependencies",
    long_about = "Lists the internal projects of a GitLab instance, reads meta/main.yml \
                  (roles) and roles/requirements.yml (plays) from every project matching \
                  a path filter, and writes an HTML overview plus a Graphviz diagram of \
                  which plays and roles use which roles."
)]
pub struct Cli {
    /// Personal access token, sent as PRIVATE-TOKEN.
    #[arg(short, long, env = "GITLAB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Base URL of the GitLab instance [default: https://gitlab.example.com]
    #[arg(short, long, env = "GITLAB_URL")]
    pub gitlab_url: Option<String>,

    /// Regex matched against the start of each project path; repeatable.
    ///
    /// A project matching any filter is processed. Without filters nothing
    /// is processed.
    #[arg(short, long = "filter", value_name = "REGEX")]
    pub filters: Vec<String>,

    /// List external and unknown roles in the default HTML report.
    ///
    /// `--show-unknown=false` overrides a settings file enabling it.
    #[arg(
        short = 'U',
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub show_unknown: Option<bool>,

    /// Directory receiving the reports [default: .]
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// File name prefix of the reports [default: ansible_roles]
    #[arg(long, value_name = "PREFIX")]
    pub dest_prefix: Option<String>,

    /// Tera template replacing the built-in HTML report.
    #[arg(long, value_name = "FILE")]
    pub template: Option<PathBuf>,

    /// Write the Graphviz source only; do not run `dot`.
    #[arg(long)]
    pub no_image: bool,

    /// TOML settings file; flags take precedence over its values.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print warnings and errors.
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Log filter used when `RUST_LOG` is not set.
    #[must_use]
    pub const fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        }
    }

    /// Resolve flags, environment and settings file into [`Settings`].
    pub async fn settings(&self) -> Result<Settings> {
        let file = match &self.config {
            Some(path) => SettingsFile::load_from(path).await?,
            None => SettingsFile::default(),
        };

        let mut settings = Settings::resolve(self.overrides(), file)?;
        settings.render_image = !self.no_image;
        settings.quiet = self.quiet;
        Ok(settings)
    }

    /// Values set on the command line.
    fn overrides(&self) -> Overrides {
        Overrides {
            gitlab_url: self.gitlab_url.clone(),
            token: self.token.clone(),
            filters: self.filters.clone(),
            show_unknown: self.show_unknown,
            output_dir: self.output_dir.clone(),
            dest_prefix: self.dest_prefix.clone(),
            template: self.template.clone(),
        }
    }

    /// Run against the configured GitLab instance.
    pub async fn execute(self) -> Result<()> {
        let settings = self.settings().await?;
        let client = GitlabClient::new(settings.gitlab_url(), settings.token.clone())?;

        let inventory = run(&client, &settings).await?;

        if !settings.quiet {
            println!("{} {}", "Inventory:".green().bold(), inventory.summary());
        }
        Ok(())
    }
}

/// Authenticate, build the inventory and write every report.
pub async fn run<H: ProjectHost>(host: &H, settings: &Settings) -> Result<Inventory> {
    host.authenticate().await?;
    tracing::info!(url = settings.gitlab_url(), "Authenticated");

    let inventory = InventoryBuilder::new(host, settings).build().await?;
    let written = report::write_reports(&inventory, settings).await?;
    for path in &written {
        tracing::info!(path = %path.display(), "Report written");
    }
    Ok(inventory)
}
