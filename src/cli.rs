use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::RuntimeOverride;
use crate::types::{Alignment, Opacity, ProfileTarget, Stretch};

#[derive(Parser, Debug)]
#[command(name = "backdrop-rotator", version, about = "Rotate terminal background images")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Option<Mode>,

    #[command(flatten)]
    pub opts: RunArgs,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Rotate backgrounds until 'q' is pressed (default).
    Run,
    /// Validate the config, count images and locate the settings file without writing anything.
    Check,
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Run config file (defaults to the platform config dir).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Terminal settings.json to patch (skips probing the install locations).
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Profile to patch: 'default', 'list-N' or N.
    #[arg(long, global = true)]
    pub profile: Option<ProfileTarget>,

    /// Minutes between rotations.
    #[arg(long, global = true, value_parser = clap::value_parser!(u32).range(1..))]
    pub interval: Option<u32>,

    /// Image alignment, overriding config and collection values.
    #[arg(long, global = true)]
    pub alignment: Option<Alignment>,

    /// Stretch mode, overriding config and collection values.
    #[arg(long, global = true)]
    pub stretch: Option<Stretch>,

    /// Opacity between 0 and 1, overriding config and collection values.
    #[arg(long, global = true)]
    pub opacity: Option<Opacity>,

    /// Shuffle collections and images at startup.
    #[arg(long, global = true)]
    pub random: bool,
}

impl RunArgs {
    pub fn overrides(&self) -> RuntimeOverride {
        RuntimeOverride {
            profile: self.profile,
            interval_minutes: self.interval,
            alignment: self.alignment,
            stretch: self.stretch,
            opacity: self.opacity,
        }
    }
}
