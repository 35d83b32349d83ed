//! Core identifiers and canonical type signatures.
//!
//! This module defines the **fundamental identifiers** shared by every
//! subsystem of the storage core: entity handles, component identifiers,
//! relationship terms, and the canonical [`TableType`] signature that
//! determines which table an entity lives in.
//!
//! ## Entity representation
//!
//! Entities are plain 64-bit handles. Identity is the full value; the core
//! attaches no generation or shard structure to it because callers may supply
//! their own identifiers and those are authoritative.
//!
//! ## Terms and canonical types
//!
//! A table signature is a set of [`TypeTerm`] values. A term is a plain
//! data-bearing component, a dataless tag, or a relationship to another
//! entity (`ChildOf`, `InstanceOf`). Tags and relationships carry no per-row
//! data but still participate in type identity, so two entities with the same
//! components but different tags or parents land in different tables.
//!
//! Canonicalization sorts and deduplicates the term list. Two inputs with the
//! same term set, in any order, always produce an equal [`TableType`] and
//! therefore resolve to the same table.

use std::fmt;

use smallvec::SmallVec;

/// Globally unique entity identifier.
pub type EntityID = u64;

/// Dense identifier for a registered component type.
pub type ComponentID = u32;

/// Index of a table within the registry. Stable for the life of the world.
pub type TableID = u32;

/// A stable handle to a logical object stored in the world.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Entity(pub EntityID);

impl Entity {
    /// Returns the raw 64-bit identifier.
    #[inline]
    pub fn id(self) -> EntityID {
        self.0
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One element of a table signature.
///
/// ## Design
/// Relationship terms are modeled as enum variants rather than flag bits
/// folded into the component identifier space. This keeps canonicalization
/// and hierarchy resolution type-safe: a `ChildOf` can never be mistaken for
/// a component id, and the derived ordering (variant, then payload) gives a
/// total order over the full encoded value, so term position in the input
/// never affects the canonical result.
///
/// Tag and relationship terms carry no per-row data; they occupy a slot in
/// the type but get no column in the table.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum TypeTerm {
    /// A registered, data-bearing component.
    Component(ComponentID),
    /// A dataless marker named by an entity; participates in type identity
    /// but never receives a column.
    Tag(Entity),
    /// Marks the entity as a child of the target entity.
    ChildOf(Entity),
    /// Marks the entity as an instance of the target (a prefab or base);
    /// component lookup falls back to the target for missing components.
    InstanceOf(Entity),
}

impl TypeTerm {
    /// Returns the relationship target, if this term is a relationship.
    #[inline]
    pub fn relationship_target(self) -> Option<Entity> {
        match self {
            TypeTerm::ChildOf(target) | TypeTerm::InstanceOf(target) => Some(target),
            _ => None,
        }
    }

    /// Returns the entity named by a dataless term (tag or relationship).
    #[inline]
    pub fn dataless_target(self) -> Option<Entity> {
        match self {
            TypeTerm::Component(_) => None,
            TypeTerm::Tag(target)
            | TypeTerm::ChildOf(target)
            | TypeTerm::InstanceOf(target) => Some(target),
        }
    }

    /// Returns the component id for data-bearing terms.
    #[inline]
    pub fn component(self) -> Option<ComponentID> {
        match self {
            TypeTerm::Component(id) => Some(id),
            _ => None,
        }
    }
}

/// Canonical signature of a set of component and relationship terms.
///
/// ## Invariants
/// - Terms are sorted and deduplicated.
/// - Equal `TableType` values always resolve to the same table object.
///
/// The empty type is valid; its table is the home of entities that have been
/// realized (e.g. as a relationship target) but carry no components yet.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct TableType {
    terms: SmallVec<[TypeTerm; 8]>,
}

impl TableType {
    /// Builds a canonical type from an arbitrary term list.
    ///
    /// Sorts and deduplicates; input order is irrelevant to the result.
    pub fn from_terms(terms: &[TypeTerm]) -> Self {
        let mut terms: SmallVec<[TypeTerm; 8]> = terms.iter().copied().collect();
        terms.sort_unstable();
        terms.dedup();
        Self { terms }
    }

    /// Number of terms in the signature.
    #[inline]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Returns `true` if the signature has no terms.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Iterates all terms in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = TypeTerm> + '_ {
        self.terms.iter().copied()
    }

    /// Iterates the data-bearing component ids in canonical order.
    pub fn components(&self) -> impl Iterator<Item = ComponentID> + '_ {
        self.terms.iter().filter_map(|term| term.component())
    }

    /// Iterates the relationship terms in canonical order.
    pub fn relationships(&self) -> impl Iterator<Item = TypeTerm> + '_ {
        self.terms
            .iter()
            .copied()
            .filter(|term| term.relationship_target().is_some())
    }

    /// Returns `true` if the signature contains `term`.
    #[inline]
    pub fn contains(&self, term: TypeTerm) -> bool {
        self.terms.binary_search(&term).is_ok()
    }

    /// Returns `true` if the signature contains the component id.
    #[inline]
    pub fn has_component(&self, component_id: ComponentID) -> bool {
        self.contains(TypeTerm::Component(component_id))
    }

    /// Returns `true` if every term of `other` is present in `self`.
    ///
    /// Used by the enumeration surface to match tables against a requested
    /// term set.
    pub fn is_superset_of(&self, other: &TableType) -> bool {
        other.iter().all(|term| self.contains(term))
    }
}
