//! Routines whose rules are derived from the font by a named procedure.

use std::{cell::OnceCell, fmt::Debug};

use fluxdrasil::glyphs::GlyphSource;
use indexmap::IndexMap;
use log::{debug, warn};

use crate::{classes::GlyphClassStore, rule::Rule};

/// Parameters of a computed routine, in the order the user gave them.
pub type Parameters = IndexMap<String, String>;

/// What a derivation procedure may look at.
#[derive(Clone, Copy)]
pub struct DerivationContext<'a> {
    pub font: &'a dyn GlyphSource,
    pub classes: &'a GlyphClassStore,
}

impl<'a> DerivationContext<'a> {
    pub fn new(font: &'a dyn GlyphSource, classes: &'a GlyphClassStore) -> Self {
        DerivationContext { font, classes }
    }
}

/// Turns a font plus parameters into an ordered list of rules.
///
/// Implementations must be deterministic: the same font and parameters
/// always produce the same rules in the same order.
pub trait Procedure {
    fn derive(&self, context: &DerivationContext, parameters: &Parameters) -> Vec<Rule>;
}

impl<F> Procedure for F
where
    F: Fn(&DerivationContext, &Parameters) -> Vec<Rule>,
{
    fn derive(&self, context: &DerivationContext, parameters: &Parameters) -> Vec<Rule> {
        self(context, parameters)
    }
}

/// The procedures available to computed routines, by identifier.
#[derive(Default)]
pub struct ProcedureRegistry {
    procedures: IndexMap<String, Box<dyn Procedure>>,
}

impl Debug for ProcedureRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.procedures.keys()).finish()
    }
}

impl ProcedureRegistry {
    pub fn new() -> Self {
        Default::default()
    }

    /// Register a procedure, replacing any previous one of the same identifier.
    pub fn register(&mut self, id: impl Into<String>, procedure: impl Procedure + 'static) {
        let id = id.into();
        if self.procedures.contains_key(&id) {
            debug!("Replacing procedure {id}");
        }
        self.procedures.insert(id, Box::new(procedure));
    }

    pub fn get(&self, id: &str) -> Option<&dyn Procedure> {
        self.procedures.get(id).map(|p| p.as_ref())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.procedures.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.procedures.keys().map(String::as_str)
    }
}

/// A routine that derives its rules on first access and caches them.
///
/// The cache is dropped whenever a parameter changes or [`invalidate`] is
/// called; it is not part of the routine's identity or its persisted form.
///
/// [`invalidate`]: ComputedRoutine::invalidate
#[derive(Debug, Clone)]
pub struct ComputedRoutine {
    procedure: String,
    parameters: Parameters,
    cache: OnceCell<Vec<Rule>>,
}

impl PartialEq for ComputedRoutine {
    fn eq(&self, other: &Self) -> bool {
        self.procedure == other.procedure && self.parameters == other.parameters
    }
}

impl ComputedRoutine {
    pub fn new(procedure: impl Into<String>, parameters: Parameters) -> Self {
        ComputedRoutine {
            procedure: procedure.into(),
            parameters,
            cache: OnceCell::new(),
        }
    }

    pub fn procedure(&self) -> &str {
        &self.procedure
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }

    pub fn set_parameter(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.parameters.insert(key.into(), value.into());
        self.invalidate();
    }

    pub fn remove_parameter(&mut self, key: &str) -> Option<String> {
        let removed = self.parameters.shift_remove(key);
        if removed.is_some() {
            self.invalidate();
        }
        removed
    }

    /// True if rules have been derived and not invalidated since.
    pub fn is_cached(&self) -> bool {
        self.cache.get().is_some()
    }

    pub fn invalidate(&mut self) {
        self.cache.take();
    }

    /// The derived rules, computing them if need be.
    ///
    /// If no procedure is registered under this routine's identifier the
    /// result is empty, and nothing is cached so that a later registration
    /// is picked up.
    pub fn rules(&self, registry: &ProcedureRegistry, context: &DerivationContext) -> &[Rule] {
        if let Some(rules) = self.cache.get() {
            return rules;
        }
        let Some(procedure) = registry.get(&self.procedure) else {
            warn!("No procedure named '{}' is registered", self.procedure);
            return &[];
        };
        self.cache
            .get_or_init(|| procedure.derive(context, &self.parameters))
    }
}
