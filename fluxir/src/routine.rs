//! Routines: ordered rule lists plus lookup flags.

use bitflags::bitflags;

use crate::{
    computed::{ComputedRoutine, DerivationContext, ProcedureRegistry},
    rule::Rule,
};

bitflags! {
    /// The lookup flags a routine compiles to.
    ///
    /// Bit values are those of the OpenType LookupFlag field.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct RoutineFlags: u16 {
        /// Cursive attachment runs right to left.
        const RIGHT_TO_LEFT = 0x0001;
        const IGNORE_BASE_GLYPHS = 0x0002;
        const IGNORE_LIGATURES = 0x0004;
        const IGNORE_MARKS = 0x0008;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RoutineKind {
    /// Rules stored directly and edited by hand.
    Manual(Vec<Rule>),
    Computed(ComputedRoutine),
    /// A visual separator in the routine list. Has no rules.
    Divider { comment: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Routine {
    name: Option<String>,
    pub flags: RoutineFlags,
    kind: RoutineKind,
}

impl Routine {
    pub fn manual(name: impl Into<String>, rules: Vec<Rule>) -> Self {
        Routine {
            name: Some(name.into()),
            flags: RoutineFlags::empty(),
            kind: RoutineKind::Manual(rules),
        }
    }

    /// A manual routine with no name, e.g. one only reached through chaining.
    pub fn anonymous(rules: Vec<Rule>) -> Self {
        Routine {
            name: None,
            flags: RoutineFlags::empty(),
            kind: RoutineKind::Manual(rules),
        }
    }

    pub fn computed(name: impl Into<String>, computed: ComputedRoutine) -> Self {
        Routine {
            name: Some(name.into()),
            flags: RoutineFlags::empty(),
            kind: RoutineKind::Computed(computed),
        }
    }

    pub fn divider(comment: impl Into<String>) -> Self {
        Routine {
            name: None,
            flags: RoutineFlags::empty(),
            kind: RoutineKind::Divider {
                comment: comment.into(),
            },
        }
    }

    pub fn with_flags(mut self, flags: RoutineFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Only the graph renames routines, so it can keep names unique.
    pub(crate) fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    pub fn kind(&self) -> &RoutineKind {
        &self.kind
    }

    /// Dividers are not addressable; everything else may be named and
    /// placed in features.
    pub fn is_addressable(&self) -> bool {
        !matches!(self.kind, RoutineKind::Divider { .. })
    }

    pub fn is_computed(&self) -> bool {
        matches!(self.kind, RoutineKind::Computed(_))
    }

    pub fn computed_mut(&mut self) -> Option<&mut ComputedRoutine> {
        match &mut self.kind {
            RoutineKind::Computed(computed) => Some(computed),
            _ => None,
        }
    }

    /// The editable rule list of a manual routine.
    pub fn rules_mut(&mut self) -> Option<&mut Vec<Rule>> {
        match &mut self.kind {
            RoutineKind::Manual(rules) => Some(rules),
            _ => None,
        }
    }

    /// The routine's rules; computed routines derive theirs on first access.
    pub fn rules(&self, registry: &ProcedureRegistry, context: &DerivationContext) -> &[Rule] {
        match &self.kind {
            RoutineKind::Manual(rules) => rules,
            RoutineKind::Computed(computed) => computed.rules(registry, context),
            RoutineKind::Divider { .. } => &[],
        }
    }

    /// Freeze a computed routine's current rules into a manual routine.
    ///
    /// The procedure and parameters are discarded, so nothing done to them
    /// afterwards can change the rules. Returns false for routines that
    /// aren't computed.
    pub fn reify(&mut self, registry: &ProcedureRegistry, context: &DerivationContext) -> bool {
        let RoutineKind::Computed(computed) = &self.kind else {
            return false;
        };
        let rules = computed.rules(registry, context).to_vec();
        self.kind = RoutineKind::Manual(rules);
        true
    }

    pub(crate) fn invalidate(&mut self) {
        if let Some(computed) = self.computed_mut() {
            computed.invalidate();
        }
    }
}

#[cfg(test)]
mod tests {
    use fluxdrasil::glyphs::GlyphSet;
    use pretty_assertions::assert_eq;

    use crate::{
        classes::GlyphClassStore,
        computed::Parameters,
        rule::{glyph_slots, Substitution},
    };

    use super::*;

    fn suffix_registry() -> ProcedureRegistry {
        fn add_suffix(context: &DerivationContext, params: &Parameters) -> Vec<Rule> {
            let Some(suffix) = params.get("suffix") else {
                return Vec::new();
            };
            context
                .font
                .names()
                .iter()
                .filter_map(|g| {
                    let target = format!("{g}{suffix}");
                    context
                        .font
                        .contains(&target)
                        .then(|| Substitution::single(g.clone(), target.as_str()).into())
                })
                .collect()
        }
        let mut registry = ProcedureRegistry::new();
        registry.register("AddSuffix", add_suffix);
        registry
    }

    #[test]
    fn flags_use_lookup_flag_bits() {
        let flags = RoutineFlags::IGNORE_MARKS | RoutineFlags::RIGHT_TO_LEFT;
        assert_eq!(0x0009, flags.bits());
        assert_eq!(flags, RoutineFlags::from_bits_truncate(0x8009));
    }

    #[test]
    fn reified_routine_stops_following_parameters() {
        let registry = suffix_registry();
        let font = GlyphSet::from_names(["a", "b", "a.sc", "b.alt"]);
        let classes = GlyphClassStore::new();
        let context = DerivationContext::new(&font, &classes);

        let params: Parameters = [("suffix".to_string(), ".sc".to_string())].into();
        let mut routine = Routine::computed("SmallCaps", ComputedRoutine::new("AddSuffix", params));
        assert!(routine.reify(&registry, &context));
        assert!(!routine.is_computed());
        assert!(routine.computed_mut().is_none());

        let expected = vec![Rule::from(Substitution::new(
            glyph_slots(["a"]),
            glyph_slots(["a.sc"]),
        ))];
        assert_eq!(expected, routine.rules(&registry, &context));

        // the derivation link is gone, a second reify does nothing
        assert!(!routine.reify(&registry, &context));
        routine
            .rules_mut()
            .unwrap()
            .push(Substitution::single("b", "b.alt").into());
        assert_eq!(2, routine.rules(&registry, &context).len());
    }

    #[test]
    fn dividers_have_no_rules_and_no_name() {
        let registry = ProcedureRegistry::new();
        let font = GlyphSet::new();
        let classes = GlyphClassStore::new();
        let context = DerivationContext::new(&font, &classes);
        let divider = Routine::divider("Arabic");
        assert!(!divider.is_addressable());
        assert_eq!(None, divider.name());
        assert!(divider.rules(&registry, &context).is_empty());
    }
}
