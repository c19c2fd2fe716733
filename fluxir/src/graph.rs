//! The routines of a project and the features that reference them.
//!
//! Routines live in an arena keyed by [`RoutineId`]. Features hold ordered
//! lists of ids, so one routine can be shared by several features and
//! renaming it is a property change rather than a graph edit.
//!
//! Every structural operation either succeeds completely or returns an error
//! having changed nothing.

use std::{
    collections::{HashMap, HashSet},
    fmt::{self, Display},
};

use fluxdrasil::tags::Tag;
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    computed::{DerivationContext, ProcedureRegistry},
    routine::{Routine, RoutineFlags},
};

/// Identifies a routine for as long as it is in its graph.
///
/// Ids are never reused within a graph.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RoutineId(u32);

impl Display for RoutineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "routine#{}", self.0)
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GraphError {
    #[error("No such routine: {0}")]
    RoutineNotFound(RoutineId),
    #[error("No feature '{0}'")]
    FeatureNotFound(Tag),
    #[error("Feature '{0}' already exists")]
    FeatureExists(Tag),
    #[error("Index {index} out of bounds, length is {len}")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("A routine named '{0}' already exists")]
    NameCollision(String),
    #[error("Routine names can't be empty")]
    EmptyName,
    #[error("{0} is a divider, it can't be named or used in a feature")]
    NotAddressable(RoutineId),
    #[error("{routine} is already part of feature '{feature}'")]
    AlreadyInFeature { routine: RoutineId, feature: Tag },
    #[error("{0} is not a computed routine")]
    NotComputed(RoutineId),
}

fn check_index(index: usize, len: usize) -> Result<(), GraphError> {
    if index >= len {
        return Err(GraphError::IndexOutOfBounds { index, len });
    }
    Ok(())
}

/// `base` if it isn't taken, otherwise `base_2`, `base_3`, ...
pub(crate) fn unique_name(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }
    (2..)
        .map(|i| format!("{base}_{i}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| base.to_string())
}

/// Remove at `from` and reinsert at `to`.
fn move_entry<T>(items: &mut Vec<T>, from: usize, to: usize) -> Result<(), GraphError> {
    check_index(from, items.len())?;
    check_index(to, items.len())?;
    let item = items.remove(from);
    items.insert(to, item);
    Ok(())
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct RoutineFeatureGraph {
    next_id: u32,
    order: Vec<RoutineId>,
    routines: HashMap<RoutineId, Routine>,
    features: IndexMap<Tag, Vec<RoutineId>>,
}

impl RoutineFeatureGraph {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: RoutineId) -> bool {
        self.routines.contains_key(&id)
    }

    pub fn routine(&self, id: RoutineId) -> Option<&Routine> {
        self.routines.get(&id)
    }

    /// Mutable access for rule and parameter edits.
    ///
    /// Names and kinds can't be changed through this; use
    /// [`rename_routine`](Self::rename_routine) and
    /// [`reify_routine`](Self::reify_routine).
    pub fn routine_mut(&mut self, id: RoutineId) -> Option<&mut Routine> {
        self.routines.get_mut(&id)
    }

    /// Routines in list order.
    pub fn routines(&self) -> impl Iterator<Item = (RoutineId, &Routine)> {
        self.order.iter().map(|id| (*id, &self.routines[id]))
    }

    pub fn routine_ids(&self) -> &[RoutineId] {
        &self.order
    }

    pub fn position(&self, id: RoutineId) -> Option<usize> {
        self.order.iter().position(|r| *r == id)
    }

    pub fn find_routine(&self, name: &str) -> Option<RoutineId> {
        self.routines()
            .find(|(_, r)| r.is_addressable() && r.name() == Some(name))
            .map(|(id, _)| id)
    }

    /// A routine name must be non-empty and not used by another routine.
    fn check_name_free(&self, name: &str, except: Option<RoutineId>) -> Result<(), GraphError> {
        if name.is_empty() {
            return Err(GraphError::EmptyName);
        }
        match self.find_routine(name) {
            Some(existing) if Some(existing) != except => {
                Err(GraphError::NameCollision(name.to_string()))
            }
            _ => Ok(()),
        }
    }

    /// Append a routine to the routine list.
    pub fn add_routine(&mut self, routine: Routine) -> Result<RoutineId, GraphError> {
        self.insert_routine(self.order.len(), routine)
    }

    /// Insert a routine at `index` in the routine list.
    pub fn insert_routine(
        &mut self,
        index: usize,
        mut routine: Routine,
    ) -> Result<RoutineId, GraphError> {
        if index > self.order.len() {
            return Err(GraphError::IndexOutOfBounds {
                index,
                len: self.order.len(),
            });
        }
        if !routine.is_addressable() {
            routine.set_name(None);
        }
        if let Some(name) = routine.name().filter(|_| routine.is_addressable()) {
            self.check_name_free(name, None)?;
        }
        let id = RoutineId(self.next_id);
        self.next_id += 1;
        self.order.insert(index, id);
        self.routines.insert(id, routine);
        Ok(id)
    }

    /// Remove a routine along with every reference to it, from features and
    /// from chaining rules alike.
    pub fn remove_routine(&mut self, id: RoutineId) -> Result<Routine, GraphError> {
        let routine = self
            .routines
            .remove(&id)
            .ok_or(GraphError::RoutineNotFound(id))?;
        self.order.retain(|r| *r != id);
        for (tag, entries) in self.features.iter_mut() {
            let before = entries.len();
            entries.retain(|r| *r != id);
            if entries.len() != before {
                debug!("Removed {id} from feature '{tag}'");
            }
        }
        for other in self.routines.values_mut() {
            if let Some(rules) = other.rules_mut() {
                rules.iter_mut().for_each(|rule| rule.forget_routine(id));
            }
        }
        Ok(routine)
    }

    /// Rename a routine. Features reference routines by id so they follow.
    pub fn rename_routine(
        &mut self,
        id: RoutineId,
        name: impl Into<String>,
    ) -> Result<(), GraphError> {
        let name = name.into();
        let routine = self.routine(id).ok_or(GraphError::RoutineNotFound(id))?;
        if !routine.is_addressable() {
            return Err(GraphError::NotAddressable(id));
        }
        self.check_name_free(&name, Some(id))?;
        if let Some(routine) = self.routines.get_mut(&id) {
            routine.set_name(Some(name));
        }
        Ok(())
    }

    /// Move the routine at `from` so it ends up at `to` in the routine list.
    pub fn move_routine(&mut self, from: usize, to: usize) -> Result<(), GraphError> {
        move_entry(&mut self.order, from, to)
    }

    pub fn set_routine_flags(
        &mut self,
        id: RoutineId,
        flags: RoutineFlags,
    ) -> Result<(), GraphError> {
        let routine = self
            .routines
            .get_mut(&id)
            .ok_or(GraphError::RoutineNotFound(id))?;
        routine.flags = flags;
        Ok(())
    }

    /// `base` if no routine has that name, otherwise `base_2`, `base_3`, ...
    pub fn unique_routine_name(&self, base: &str) -> String {
        let taken: HashSet<&str> = self.routines.values().filter_map(|r| r.name()).collect();
        unique_name(base, |name| taken.contains(name))
    }

    /// Drop every cached computed rule list, e.g. after the font changed.
    pub fn invalidate_computed(&mut self) {
        self.routines.values_mut().for_each(Routine::invalidate);
    }

    /// Turn a computed routine into a manual one holding its current rules.
    pub fn reify_routine(
        &mut self,
        id: RoutineId,
        registry: &ProcedureRegistry,
        context: &DerivationContext,
    ) -> Result<(), GraphError> {
        let routine = self
            .routines
            .get_mut(&id)
            .ok_or(GraphError::RoutineNotFound(id))?;
        if !routine.reify(registry, context) {
            return Err(GraphError::NotComputed(id));
        }
        Ok(())
    }

    /// Features in order.
    pub fn features(&self) -> impl Iterator<Item = (Tag, &[RoutineId])> {
        self.features.iter().map(|(tag, ids)| (*tag, ids.as_slice()))
    }

    pub fn feature(&self, tag: Tag) -> Option<&[RoutineId]> {
        self.features.get(&tag).map(Vec::as_slice)
    }

    /// The features that reference a routine, in feature order.
    pub fn features_of(&self, id: RoutineId) -> Vec<Tag> {
        self.features
            .iter()
            .filter(|(_, ids)| ids.contains(&id))
            .map(|(tag, _)| *tag)
            .collect()
    }

    pub fn add_feature(&mut self, tag: Tag) -> Result<(), GraphError> {
        if self.features.contains_key(&tag) {
            return Err(GraphError::FeatureExists(tag));
        }
        self.features.insert(tag, Vec::new());
        Ok(())
    }

    /// Remove a feature. The routines it referenced stay in the graph.
    pub fn remove_feature(&mut self, tag: Tag) -> Result<Vec<RoutineId>, GraphError> {
        self.features
            .shift_remove(&tag)
            .ok_or(GraphError::FeatureNotFound(tag))
    }

    /// Change a feature's tag, keeping its place in the feature list.
    pub fn rename_feature(&mut self, old: Tag, new: Tag) -> Result<(), GraphError> {
        let Some(idx) = self.features.get_index_of(&old) else {
            return Err(GraphError::FeatureNotFound(old));
        };
        if old == new {
            return Ok(());
        }
        if self.features.contains_key(&new) {
            return Err(GraphError::FeatureExists(new));
        }
        self.features = std::mem::take(&mut self.features)
            .into_iter()
            .enumerate()
            .map(|(i, (tag, ids))| if i == idx { (new, ids) } else { (tag, ids) })
            .collect();
        Ok(())
    }

    fn check_can_join(&self, tag: Tag, id: RoutineId) -> Result<(), GraphError> {
        let routine = self.routine(id).ok_or(GraphError::RoutineNotFound(id))?;
        if !routine.is_addressable() {
            return Err(GraphError::NotAddressable(id));
        }
        if self.features.get(&tag).is_some_and(|ids| ids.contains(&id)) {
            return Err(GraphError::AlreadyInFeature {
                routine: id,
                feature: tag,
            });
        }
        Ok(())
    }

    /// Append a routine to a feature, creating the feature if need be.
    pub fn add_to_feature(&mut self, tag: Tag, id: RoutineId) -> Result<(), GraphError> {
        self.check_can_join(tag, id)?;
        self.features.entry(tag).or_default().push(id);
        Ok(())
    }

    /// Insert a routine into an existing feature at `index`.
    pub fn insert_into_feature(
        &mut self,
        tag: Tag,
        index: usize,
        id: RoutineId,
    ) -> Result<(), GraphError> {
        let len = self
            .feature(tag)
            .ok_or(GraphError::FeatureNotFound(tag))?
            .len();
        if index > len {
            return Err(GraphError::IndexOutOfBounds { index, len });
        }
        self.check_can_join(tag, id)?;
        if let Some(ids) = self.features.get_mut(&tag) {
            ids.insert(index, id);
        }
        Ok(())
    }

    /// Remove the entry at `index` of a feature. The routine stays in the graph.
    pub fn remove_from_feature(&mut self, tag: Tag, index: usize) -> Result<RoutineId, GraphError> {
        let ids = self
            .features
            .get_mut(&tag)
            .ok_or(GraphError::FeatureNotFound(tag))?;
        check_index(index, ids.len())?;
        Ok(ids.remove(index))
    }

    pub fn move_feature_entry(&mut self, tag: Tag, from: usize, to: usize) -> Result<(), GraphError> {
        let ids = self
            .features
            .get_mut(&tag)
            .ok_or(GraphError::FeatureNotFound(tag))?;
        move_entry(ids, from, to)
    }
}

#[cfg(test)]
mod tests {
    use fluxdrasil::glyphs::GlyphSet;
    use pretty_assertions::assert_eq;

    use crate::{
        classes::GlyphClassStore,
        computed::{ComputedRoutine, Parameters},
        rule::{glyph_slots, Chaining, Rule, Substitution},
    };

    use super::*;

    fn tag(s: &str) -> Tag {
        Tag::new_checked(s.as_bytes()).unwrap()
    }

    fn manual(name: &str) -> Routine {
        Routine::manual(name, vec![Substitution::single("a", "b").into()])
    }

    /// Routines One, Two, Three; liga = [One, Two], dlig = [Two, Three].
    fn sample() -> (RoutineFeatureGraph, Vec<RoutineId>) {
        let mut graph = RoutineFeatureGraph::new();
        let ids: Vec<_> = ["One", "Two", "Three"]
            .into_iter()
            .map(|n| graph.add_routine(manual(n)).unwrap())
            .collect();
        graph.add_to_feature(tag("liga"), ids[0]).unwrap();
        graph.add_to_feature(tag("liga"), ids[1]).unwrap();
        graph.add_to_feature(tag("dlig"), ids[1]).unwrap();
        graph.add_to_feature(tag("dlig"), ids[2]).unwrap();
        (graph, ids)
    }

    fn names(graph: &RoutineFeatureGraph) -> Vec<&str> {
        graph.routines().filter_map(|(_, r)| r.name()).collect()
    }

    #[test]
    fn remove_cascades_to_every_feature() {
        let (mut graph, ids) = sample();
        graph.add_to_feature(tag("kern"), ids[0]).unwrap();

        let removed = graph.remove_routine(ids[1]).unwrap();
        assert_eq!(Some("Two"), removed.name());
        assert_eq!(Some(&[ids[0]][..]), graph.feature(tag("liga")));
        assert_eq!(Some(&[ids[2]][..]), graph.feature(tag("dlig")));
        assert_eq!(Some(&[ids[0]][..]), graph.feature(tag("kern")));
        assert_eq!(vec!["One", "Three"], names(&graph));
        assert!(graph.features_of(ids[1]).is_empty());
    }

    #[test]
    fn remove_cascades_to_chaining_rules() {
        let (mut graph, ids) = sample();
        let chain = Routine::manual(
            "Context",
            vec![Rule::Chaining(Chaining {
                input: glyph_slots(["a", "b"]),
                lookups: vec![vec![ids[0], ids[1]], vec![ids[1]]],
                ..Default::default()
            })],
        );
        let chain = graph.add_routine(chain).unwrap();
        graph.remove_routine(ids[1]).unwrap();

        let rules = graph.routine_mut(chain).unwrap().rules_mut().unwrap();
        let Rule::Chaining(chaining) = &rules[0] else {
            panic!("expected chaining");
        };
        assert_eq!(vec![vec![ids[0]], vec![]], chaining.lookups);
    }

    #[test]
    fn missing_routine_changes_nothing() {
        let (mut graph, ids) = sample();
        graph.remove_routine(ids[2]).unwrap();
        let before = graph.clone();

        assert_eq!(
            Err(GraphError::RoutineNotFound(ids[2])),
            graph.remove_routine(ids[2]).map(|_| ())
        );
        assert_eq!(
            Err(GraphError::RoutineNotFound(ids[2])),
            graph.add_to_feature(tag("liga"), ids[2])
        );
        assert_eq!(
            Err(GraphError::RoutineNotFound(ids[2])),
            graph.rename_routine(ids[2], "Gone")
        );
        assert_eq!(
            Err(GraphError::RoutineNotFound(ids[2])),
            graph.set_routine_flags(ids[2], RoutineFlags::IGNORE_MARKS)
        );
        assert_eq!(
            Err(GraphError::FeatureNotFound(tag("smcp"))),
            graph.remove_from_feature(tag("smcp"), 0)
        );
        assert_eq!(before, graph);
    }

    #[test]
    fn ids_are_not_reused() {
        let (mut graph, ids) = sample();
        graph.remove_routine(ids[2]).unwrap();
        let new = graph.add_routine(manual("Four")).unwrap();
        assert!(!ids.contains(&new));
    }

    #[test]
    fn rename_rejects_collisions() {
        let (mut graph, ids) = sample();
        assert_eq!(
            Err(GraphError::NameCollision("Three".to_string())),
            graph.rename_routine(ids[0], "Three")
        );
        assert_eq!(
            Err(GraphError::NameCollision("One".to_string())),
            graph.add_routine(manual("One")).map(|_| ())
        );
        graph.rename_routine(ids[0], "One").unwrap();
        graph.rename_routine(ids[0], "First").unwrap();
        assert_eq!(Some(ids[0]), graph.find_routine("First"));
        // features hold ids, so they see the new name with no further work
        let first = graph.feature(tag("liga")).unwrap()[0];
        assert_eq!(Some("First"), graph.routine(first).and_then(Routine::name));
    }

    #[test]
    fn names_cannot_be_empty() {
        let (mut graph, ids) = sample();
        let before = graph.clone();
        assert_eq!(Err(GraphError::EmptyName), graph.rename_routine(ids[0], ""));
        assert_eq!(
            Err(GraphError::EmptyName),
            graph.add_routine(manual("")).map(|_| ())
        );
        assert_eq!(before, graph);
        // unnamed is not the same as empty
        graph.add_routine(Routine::anonymous(Vec::new())).unwrap();
    }

    #[test]
    fn set_flags() {
        let (mut graph, ids) = sample();
        let flags = RoutineFlags::IGNORE_MARKS | RoutineFlags::RIGHT_TO_LEFT;
        graph.set_routine_flags(ids[1], flags).unwrap();
        assert_eq!(flags, graph.routine(ids[1]).unwrap().flags);
        assert_eq!(RoutineFlags::empty(), graph.routine(ids[0]).unwrap().flags);

        graph.set_routine_flags(ids[1], RoutineFlags::empty()).unwrap();
        assert_eq!(RoutineFlags::empty(), graph.routine(ids[1]).unwrap().flags);
    }

    #[test]
    fn move_keeps_every_id_once() {
        let (mut graph, ids) = sample();
        graph.move_routine(0, 2).unwrap();
        assert_eq!(&[ids[1], ids[2], ids[0]], graph.routine_ids());
        graph.move_routine(2, 0).unwrap();
        assert_eq!(&ids[..], graph.routine_ids());

        graph.move_feature_entry(tag("dlig"), 1, 0).unwrap();
        assert_eq!(Some(&[ids[2], ids[1]][..]), graph.feature(tag("dlig")));

        assert_eq!(
            Err(GraphError::IndexOutOfBounds { index: 3, len: 3 }),
            graph.move_routine(0, 3)
        );
        assert_eq!(&ids[..], graph.routine_ids());
    }

    #[test]
    fn feature_entries() {
        let (mut graph, ids) = sample();
        assert_eq!(
            Err(GraphError::AlreadyInFeature {
                routine: ids[0],
                feature: tag("liga")
            }),
            graph.add_to_feature(tag("liga"), ids[0])
        );
        graph.insert_into_feature(tag("liga"), 0, ids[2]).unwrap();
        assert_eq!(
            Some(&[ids[2], ids[0], ids[1]][..]),
            graph.feature(tag("liga"))
        );
        assert_eq!(Ok(ids[0]), graph.remove_from_feature(tag("liga"), 1));
        // the routine itself is untouched
        assert!(graph.contains(ids[0]));
        assert_eq!(vec![tag("liga"), tag("dlig")], graph.features_of(ids[2]));
    }

    #[test]
    fn dividers_stay_out_of_features() {
        let mut graph = RoutineFeatureGraph::new();
        let divider = graph.add_routine(Routine::divider("Latin")).unwrap();
        let other = graph.add_routine(Routine::divider("Arabic")).unwrap();
        assert_ne!(divider, other);
        assert_eq!(
            Err(GraphError::NotAddressable(divider)),
            graph.add_to_feature(tag("liga"), divider)
        );
        assert_eq!(
            Err(GraphError::NotAddressable(divider)),
            graph.rename_routine(divider, "Named")
        );
        assert_eq!(None, graph.feature(tag("liga")));
    }

    #[test]
    fn feature_rename_keeps_position() {
        let (mut graph, ids) = sample();
        graph.add_feature(tag("kern")).unwrap();
        graph.rename_feature(tag("liga"), tag("rlig")).unwrap();
        let tags: Vec<_> = graph.features().map(|(t, _)| t).collect();
        assert_eq!(vec![tag("rlig"), tag("dlig"), tag("kern")], tags);
        assert_eq!(Some(&ids[..2]), graph.feature(tag("rlig")));
        assert_eq!(
            Err(GraphError::FeatureExists(tag("kern"))),
            graph.rename_feature(tag("rlig"), tag("kern"))
        );
        assert_eq!(Ok(ids[1..].to_vec()), graph.remove_feature(tag("dlig")));
        assert_eq!(3, graph.len());
    }

    #[test]
    fn unique_names() {
        let (mut graph, _) = sample();
        assert_eq!("Four", graph.unique_routine_name("Four"));
        assert_eq!("One_2", graph.unique_routine_name("One"));
        graph.add_routine(manual("One_2")).unwrap();
        assert_eq!("One_3", graph.unique_routine_name("One"));
    }

    #[test]
    fn reify_through_graph() {
        fn zero(_: &DerivationContext, _: &Parameters) -> Vec<Rule> {
            vec![Substitution::single("zero", "zero.zero").into()]
        }
        let mut registry = ProcedureRegistry::new();
        registry.register("Zero", zero);
        let font = GlyphSet::from_names(["zero", "zero.zero"]);
        let classes = GlyphClassStore::new();
        let context = DerivationContext::new(&font, &classes);

        let (mut graph, ids) = sample();
        let computed = graph
            .add_routine(Routine::computed(
                "SlashZero",
                ComputedRoutine::new("Zero", Parameters::new()),
            ))
            .unwrap();
        graph.add_to_feature(tag("zero"), computed).unwrap();

        assert_eq!(
            Err(GraphError::NotComputed(ids[0])),
            graph.reify_routine(ids[0], &registry, &context)
        );
        graph.reify_routine(computed, &registry, &context).unwrap();
        let routine = graph.routine(computed).unwrap();
        assert!(!routine.is_computed());
        assert_eq!(1, routine.rules(&registry, &context).len());
        // reification doesn't change identity, the feature still points at it
        assert_eq!(Some(&[computed][..]), graph.feature(tag("zero")));
    }

    #[test]
    fn invalidate_all_computed() {
        fn one(_: &DerivationContext, _: &Parameters) -> Vec<Rule> {
            vec![Substitution::single("a", "b").into()]
        }
        let mut registry = ProcedureRegistry::new();
        registry.register("One", one);
        let font = GlyphSet::from_names(["a", "b"]);
        let classes = GlyphClassStore::new();
        let context = DerivationContext::new(&font, &classes);

        let mut graph = RoutineFeatureGraph::new();
        let id = graph
            .add_routine(Routine::computed(
                "Computed",
                ComputedRoutine::new("One", Parameters::new()),
            ))
            .unwrap();
        graph
            .routine(id)
            .unwrap()
            .rules(&registry, &context);
        assert!(graph.routine_mut(id).unwrap().computed_mut().unwrap().is_cached());
        graph.invalidate_computed();
        assert!(!graph.routine_mut(id).unwrap().computed_mut().unwrap().is_cached());
    }
}
