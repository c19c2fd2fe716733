//! Command line arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// Derive, inspect and freeze the layout routines of a flux project.
#[derive(Serialize, Deserialize, Parser, Debug, Clone, PartialEq)]
pub struct Args {
    /// The project file; .json is written as JSON, anything else as YAML
    #[arg(short, long)]
    pub project: PathBuf,

    /// Glyph names must match this regex to be seen by derivations
    #[arg(short, long)]
    #[clap(default_value = None)]
    pub glyph_name_filter: Option<String>,

    /// Install derivations even if they look implausible, without asking
    #[arg(short = 'y', long)]
    #[clap(default_value = "false")]
    pub accept_warnings: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Serialize, Deserialize, Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Create a project for a UFO
    New {
        /// The .ufo directory
        source: PathBuf,
        /// Don't turn the font's groups into glyph classes
        #[arg(long)]
        no_groups: bool,
    },
    /// Load the project and its font, reporting anything amiss
    Check,
    /// List glyph classes and their current members
    Classes,
    /// List routines with their rules, then features
    Routines,
    /// Add routines derived from glyph names
    Derive {
        #[arg(value_enum)]
        derivation: Derivation,
        /// Also add cursive attachment between entry and exit anchors
        #[arg(long)]
        cursive: bool,
    },
    /// Turn a computed routine into a manual one with its current rules
    Reify {
        /// Routine name
        routine: String,
    },
}

#[derive(Serialize, Deserialize, ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Derivation {
    /// Slashed zero, small caps and standard ligatures
    NameBased,
    /// Initial, medial and final forms
    Arabic,
}

impl Args {
    /// Manufacture some args, e.g. for tests.
    pub fn new(project: impl Into<PathBuf>, command: Command) -> Args {
        Args {
            project: project.into(),
            glyph_name_filter: None,
            accept_warnings: false,
            command,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(&["check"], Command::Check)]
    #[case(&["new", "Font.ufo"], Command::New { source: "Font.ufo".into(), no_groups: false })]
    #[case(&["derive", "name-based"], Command::Derive { derivation: Derivation::NameBased, cursive: false })]
    #[case(&["derive", "arabic", "--cursive"], Command::Derive { derivation: Derivation::Arabic, cursive: true })]
    #[case(&["reify", "SmallCaps"], Command::Reify { routine: "SmallCaps".to_string() })]
    fn parse_commands(#[case] command: &[&str], #[case] expected: Command) {
        let argv = ["fluxc", "--project", "font.yml"]
            .iter()
            .chain(command.iter())
            .copied();
        let args = Args::try_parse_from(argv).unwrap();
        assert_eq!(Args::new("font.yml", expected), args);
    }

    #[test]
    fn global_flags() {
        let args =
            Args::try_parse_from(["fluxc", "-p", "font.yml", "-y", "-g", "ar$", "routines"])
                .unwrap();
        assert!(args.accept_warnings);
        assert_eq!(Some("ar$"), args.glyph_name_filter.as_deref());
        assert_eq!(Command::Routines, args.command);
    }

    #[test]
    fn project_is_required() {
        assert!(Args::try_parse_from(["fluxc", "check"]).is_err());
    }
}
