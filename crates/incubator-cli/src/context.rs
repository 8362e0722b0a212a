//! Settings resolved from the config file, environment and flags.

use std::path::PathBuf;

use anyhow::{Context, Result};
use time::{PrimitiveDateTime, UtcOffset};

use incubator_core::{Catalog, HttpNotifier, Lifecycle, Recovery};
use incubator_store::Store;

use crate::cli::Cli;
use crate::config::Config;
use crate::style;
use crate::util;

/// Everything a command needs besides its own arguments.
pub struct AppContext {
    pub config: Config,
    pub config_path: PathBuf,
    pub no_color: bool,
    pub quiet: bool,
    pub output: Option<PathBuf>,
    offset: UtcOffset,
}

impl AppContext {
    /// Load the config file and apply command-line overrides, then validate.
    pub fn from_cli(cli: &Cli, offset: UtcOffset) -> Result<Self> {
        let mut ctx = Self::without_file(cli, offset);
        let mut config = Config::load_or_default(&ctx.config_path)?;

        if let Some(db) = &cli.db {
            config.storage.path = db.clone();
        }
        if let Some(address) = &cli.controller {
            config.controller.address = address.clone();
        }
        if let Some(catalog) = &cli.catalog {
            config.catalog.path = catalog.clone();
        }
        config.validate()?;

        ctx.config = config;
        Ok(ctx)
    }

    /// Defaults only; the config file is not read.
    pub fn without_file(cli: &Cli, offset: UtcOffset) -> Self {
        Self {
            config: Config::default(),
            config_path: cli.config.clone().unwrap_or_else(Config::path),
            no_color: cli.no_color,
            quiet: cli.quiet,
            output: cli.output.clone(),
            offset,
        }
    }

    /// Current local time.
    pub fn now(&self) -> PrimitiveDateTime {
        util::now_in(self.offset)
    }

    pub fn open_store(&self) -> Result<Store> {
        let path = &self.config.storage.path;
        Store::open(path).with_context(|| format!("Failed to open database {}", path.display()))
    }

    /// Load the species catalog. A missing or unreadable file yields an
    /// empty catalog and a warning.
    pub fn load_catalog(&self) -> Catalog {
        Catalog::load_or_empty(&self.config.catalog.path)
    }

    pub fn notifier(&self) -> Result<HttpNotifier> {
        let controller = &self.config.controller;
        HttpNotifier::new(&controller.address, controller.timeout())
            .context("Failed to create HTTP client")
    }

    /// Build the lifecycle and repair any interrupted finalize.
    pub fn lifecycle(&self, catalog: Catalog) -> Result<Lifecycle<Store, HttpNotifier>> {
        let lifecycle = Lifecycle::new(self.open_store()?, self.notifier()?, catalog)
            .with_policy(self.config.lifecycle.policy());

        match lifecycle.recover()? {
            Recovery::Nothing => {}
            Recovery::ClearedDuplicate | Recovery::Archived => {
                if !self.quiet {
                    eprintln!(
                        "{}",
                        style::format_warning(
                            "Finished an incubation left over from an interrupted hatch",
                            self.no_color
                        )
                    );
                }
            }
        }

        Ok(lifecycle)
    }

    pub fn output(&self) -> Option<&PathBuf> {
        self.output.as_ref()
    }
}
