//! Drives flux projects from the command line.

mod args;
mod config;
mod error;

pub use args::{Args, Command, Derivation};
pub use config::{Config, Settings, SETTINGS_FILE};
pub use error::Error;

use std::{
    ffi::OsStr,
    io::Write,
    path::{Path, PathBuf},
};

use fluxdrasil::{
    glyphs::{GlyphSet, GlyphSource},
    tags::feature_description,
};
use fluxir::{
    computed::{DerivationContext, ProcedureRegistry},
    project::Project,
    routine::{Routine, RoutineKind},
};
use fluxplugins::{
    arabic::{self, ArabicPlan, PlausibilityWarning},
    default_registry, name_based,
};
use log::{info, warn};
use regex::Regex;
use ufo2flux::source::UfoSource;

/// Asked whether to go ahead despite plausibility warnings.
pub type Confirm<'a> = &'a mut dyn FnMut(&[PlausibilityWarning]) -> bool;

/// Load the font a project is for, keeping only glyphs that match `filter`.
pub fn load_font(source: &Path, filter: Option<&Regex>) -> Result<UfoSource, Error> {
    if source.extension().and_then(OsStr::to_str) != Some("ufo") {
        return Err(Error::UnrecognizedSource(source.to_path_buf()));
    }
    if !source.exists() {
        return Err(Error::FileExpected(source.to_path_buf()));
    }
    let mut ufo = UfoSource::load(source)?;
    if let Some(filter) = filter {
        let mut kept = GlyphSet::new();
        for (name, info) in ufo.glyphs.iter() {
            if filter.is_match(name.as_str()) {
                kept.insert(name.clone(), info.clone());
            }
        }
        info!(
            "{} of {} glyphs match the glyph name filter",
            kept.len(),
            ufo.glyphs.len()
        );
        ufo.glyphs = kept;
    }
    Ok(ufo)
}

fn write_out(out: &mut dyn Write, line: std::fmt::Arguments) -> Result<(), Error> {
    out.write_fmt(line)
        .and_then(|_| out.write_all(b"\n"))
        .map_err(Error::StdioWriteFail)
}

macro_rules! outln {
    ($out:expr, $($arg:tt)*) => {
        write_out($out, format_args!($($arg)*))
    };
}

/// A loaded project and the font it describes.
pub struct Session {
    pub file: PathBuf,
    pub project: Project,
    pub font: GlyphSet,
    pub registry: ProcedureRegistry,
}

impl Session {
    /// Load the project named in the args and its font.
    pub fn load(config: &Config) -> Result<Session, Error> {
        let file = config.args.project.clone();
        if !file.is_file() {
            return Err(Error::FileExpected(file));
        }
        let (project, warnings) = Project::load(&file)?;
        if !warnings.is_empty() {
            warn!("{} problems loading {file:?}", warnings.len());
        }
        let font = load_font(&project.source, config.glyph_name_filter().as_ref())?.glyphs;
        Ok(Session {
            file,
            project,
            font,
            registry: default_registry(),
        })
    }

    pub fn save(&self) -> Result<(), Error> {
        self.project.save(&self.file)?;
        info!("Saved {:?}", self.file);
        Ok(())
    }
}

/// Run the command in `config`, writing any listing to `out`.
pub fn run(config: &Config, out: &mut dyn Write, confirm: Confirm) -> Result<(), Error> {
    match &config.args.command {
        Command::New { source, no_groups } => create(config, source, *no_groups, out),
        Command::Check => check(config, out),
        Command::Classes => {
            let session = Session::load(config)?;
            write_classes(&session, out)
        }
        Command::Routines => {
            let session = Session::load(config)?;
            write_routines(&session, out)
        }
        Command::Derive {
            derivation,
            cursive,
        } => {
            let mut session = Session::load(config)?;
            let changed = match derivation {
                Derivation::NameBased => derive_name_based(&mut session, out)?,
                Derivation::Arabic => derive_arabic(&mut session, config, *cursive, confirm, out)?,
            };
            if changed {
                session.save()?;
            }
            Ok(())
        }
        Command::Reify { routine } => {
            let mut session = Session::load(config)?;
            reify(&mut session, routine)?;
            session.save()
        }
    }
}

fn create(
    config: &Config,
    source: &Path,
    no_groups: bool,
    out: &mut dyn Write,
) -> Result<(), Error> {
    let file = &config.args.project;
    if file.exists() {
        return Err(Error::ProjectExists(file.clone()));
    }
    let ufo = load_font(source, None)?;
    let mut project = Project::new(source);
    if !no_groups {
        let added = project.classes.import_groups(ufo.groups);
        outln!(out, "Imported {added} glyph classes from groups")?;
    }
    project.save(file)?;
    outln!(out, "Created {file:?} for {} glyphs", ufo.glyphs.len())
}

fn check(config: &Config, out: &mut dyn Write) -> Result<(), Error> {
    let (project, warnings) = Project::load(&config.args.project)?;
    for warning in warnings.iter() {
        outln!(out, "warning: {warning}")?;
    }
    let font = load_font(&project.source, config.glyph_name_filter().as_ref())?.glyphs;
    let overlay = project.glyph_actions.apply(&font);
    for action in project.glyph_actions.iter() {
        if !action.has_effect(&font) {
            outln!(out, "warning: glyph action for {} changes nothing", action.glyph)?;
        }
    }
    let registry = default_registry();
    for (_, routine) in project.graph.routines() {
        if let RoutineKind::Computed(computed) = routine.kind() {
            if !registry.contains(computed.procedure()) {
                outln!(
                    out,
                    "warning: {} uses unknown procedure {}",
                    routine_label(routine),
                    computed.procedure()
                )?;
            }
        }
    }
    outln!(
        out,
        "{} glyphs, {} classes, {} routines, {} features",
        overlay.names().len(),
        project.classes.len(),
        project.graph.len(),
        project.graph.features().count()
    )
}

fn write_classes(session: &Session, out: &mut dyn Write) -> Result<(), Error> {
    let project = &session.project;
    let font = project.glyph_actions.apply(&session.font);
    let resolved = project.classes.resolve_all(&font);
    for (name, class) in project.classes.iter() {
        let kind = if class.is_automatic() {
            "automatic"
        } else {
            "manual"
        };
        let members = resolved
            .get(name)
            .map(|m| m.iter().map(|g| g.as_str()).collect::<Vec<_>>().join(" "))
            .unwrap_or_default();
        outln!(out, "@{name} ({kind}): {members}")?;
    }
    Ok(())
}

fn routine_label(routine: &Routine) -> String {
    routine.name().unwrap_or("<unnamed>").to_string()
}

fn write_routines(session: &Session, out: &mut dyn Write) -> Result<(), Error> {
    let project = &session.project;
    let font = project.glyph_actions.apply(&session.font);
    let context = DerivationContext::new(&font, &project.classes);
    for (_, routine) in project.graph.routines() {
        let mut header = match routine.kind() {
            RoutineKind::Divider { comment } => {
                outln!(out, "---- {comment}")?;
                continue;
            }
            RoutineKind::Manual(_) => routine_label(routine),
            RoutineKind::Computed(computed) => {
                format!("{} (computed: {})", routine_label(routine), computed.procedure())
            }
        };
        let flags: Vec<_> = routine.flags.iter_names().map(|(name, _)| name).collect();
        if !flags.is_empty() {
            header.push_str(&format!(" [{}]", flags.join(", ")));
        }
        outln!(out, "{header}")?;
        for rule in routine.rules(&session.registry, &context) {
            // chaining rules refer to routines by id; show their names instead
            let rule = rule.clone().map_routines(|id| {
                project.graph.routine(id).map(routine_label)
            });
            outln!(out, "    {rule}")?;
        }
    }
    for (tag, ids) in project.graph.features() {
        let names: Vec<_> = ids
            .iter()
            .filter_map(|id| project.graph.routine(*id))
            .map(routine_label)
            .collect();
        match feature_description(tag) {
            Some(description) => outln!(out, "{tag} ({description}): {}", names.join(" "))?,
            None => outln!(out, "{tag}: {}", names.join(" "))?,
        }
    }
    Ok(())
}

/// Returns whether anything was added.
fn derive_name_based(session: &mut Session, out: &mut dyn Write) -> Result<bool, Error> {
    let font = session.project.glyph_actions.apply(&session.font);
    let installed = name_based::install_presets(&mut session.project.graph, &font)?;
    for id in installed.iter() {
        if let Some(routine) = session.project.graph.routine(*id) {
            outln!(out, "Added {}", routine_label(routine))?;
        }
    }
    if installed.is_empty() {
        outln!(out, "No name based features apply to this font")?;
    }
    Ok(!installed.is_empty())
}

/// Returns whether anything was added.
fn derive_arabic(
    session: &mut Session,
    config: &Config,
    cursive: bool,
    confirm: Confirm,
    out: &mut dyn Write,
) -> Result<bool, Error> {
    let project = &mut session.project;
    let font = project.glyph_actions.apply(&session.font);
    let (scheme, patterns) = arabic::detect_naming_scheme(&font).ok_or(Error::NoNamingScheme)?;
    outln!(out, "Using {scheme} glyph names")?;

    let Some(plan) = ArabicPlan::prepare(&font, patterns, config.plausibility()) else {
        return Err(Error::NoNamingScheme);
    };
    for warning in plan.warnings.iter() {
        outln!(out, "warning: {warning}")?;
    }
    if !plan.warnings.is_empty() && !config.accept_warnings() && !confirm(&plan.warnings) {
        outln!(out, "Nothing added")?;
        return Ok(false);
    }
    let installed = plan.install(&mut project.graph, &mut project.classes, cursive)?;
    for id in installed.routines.iter().chain(installed.cursive.iter()) {
        if let Some(routine) = project.graph.routine(*id) {
            outln!(out, "Added {}", routine_label(routine))?;
        }
    }
    for class in installed.classes.iter() {
        outln!(out, "Added @{class}")?;
    }
    Ok(true)
}

fn reify(session: &mut Session, name: &str) -> Result<(), Error> {
    let project = &mut session.project;
    let id = project
        .graph
        .find_routine(name)
        .ok_or_else(|| Error::UnknownRoutine(name.to_string()))?;
    let font = project.glyph_actions.apply(&session.font);
    let context = DerivationContext::new(&font, &project.classes);
    project.graph.reify_routine(id, &session.registry, &context)?;
    info!("{name} is now a manual routine");
    Ok(())
}
