//! Settings for a run: the command line plus optional per-project settings.

use std::{
    fs,
    path::{Path, PathBuf},
};

use fluxplugins::arabic::Plausibility;
use log::{debug, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::Args;

/// Name of the settings file, looked for beside the project file.
pub const SETTINGS_FILE: &str = "flux.yml";

/// Per-project settings; anything missing takes its default.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Derived classes smaller than this are suspicious.
    pub min_class_size: usize,
    /// Derived classes covering more than this fraction of the font are
    /// suspicious.
    pub max_fraction: f64,
    pub glyph_name_filter: Option<String>,
    /// Install derivations with warnings without asking.
    pub accept_warnings: bool,
}

impl Default for Settings {
    fn default() -> Self {
        let plausibility = Plausibility::default();
        Settings {
            min_class_size: plausibility.min_class_size,
            max_fraction: plausibility.max_fraction,
            glyph_name_filter: None,
            accept_warnings: false,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    pub args: Args,
    pub settings: Settings,
}

impl Config {
    /// Combine the args with the settings file, if there is one.
    pub fn new(args: Args) -> Config {
        let mut config = Config {
            args,
            settings: Settings::default(),
        };
        let file = config.file();
        if file.is_file() {
            config.settings = read_settings(&file);
        } else {
            debug!("No {file:?}, using default settings");
        }
        config
    }

    /// The settings file for this project.
    fn file(&self) -> PathBuf {
        self.args
            .project
            .parent()
            .map(|dir| dir.join(SETTINGS_FILE))
            .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE))
    }

    pub fn plausibility(&self) -> Plausibility {
        Plausibility {
            min_class_size: self.settings.min_class_size,
            max_fraction: self.settings.max_fraction,
        }
    }

    /// The glyph name filter; the command line wins over the settings file.
    ///
    /// A malformed filter is ignored.
    pub fn glyph_name_filter(&self) -> Option<Regex> {
        let filter = self
            .args
            .glyph_name_filter
            .as_deref()
            .or(self.settings.glyph_name_filter.as_deref())?;
        match Regex::new(filter) {
            Ok(re) => Some(re),
            Err(e) => {
                warn!("Ignoring glyph name filter '{filter}': {e}");
                None
            }
        }
    }

    pub fn accept_warnings(&self) -> bool {
        self.args.accept_warnings || self.settings.accept_warnings
    }
}

fn read_settings(file: &Path) -> Settings {
    let yml = match fs::read_to_string(file) {
        Ok(yml) => yml,
        Err(e) => {
            warn!("Unable to read {file:?}, using default settings: {e}");
            return Settings::default();
        }
    };
    match serde_yaml::from_str(&yml) {
        Ok(settings) => settings,
        Err(e) => {
            warn!("Unable to parse {file:?}, using default settings: {e}");
            Settings::default()
        }
    }
}
