//! The pad type algebra: which electrical signals a pad can emit or accept.
//!
//! A [`PadTypes`] value is a set of signal/power kinds plus, optionally, a
//! set of exact pad identities for pad-exact matching, scoped by a connector
//! id. A [`PadTypesSet`] pairs an emit set with a receive set; two pads may
//! be wired together iff neither side emits something the other does not
//! declare itself able to receive.

use crate::types::{FullPadId, Uid};
use bitflags::bitflags;
use std::collections::HashSet;
use std::ops::{BitAnd, BitOr};

bitflags! {
    /// One bit per electrical signal/power kind a Proffieboard setup uses.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct PadTypeSet: u16 {
        const BATT_NEG   = 1 << 0;
        const BATT_POS   = 1 << 1;
        const V3_3       = 1 << 2;
        const V5         = 1 << 3;
        const NPXL_DATA  = 1 << 4;
        const NPXL_CLOCK = 1 << 5;
        /// Low-side LED drive pad (board sinks the LED current).
        const LED_NEG    = 1 << 6;
        const GPIO       = 1 << 7;
        const BUTTON     = 1 << 8;
        const SER_TX     = 1 << 9;
        const SER_RX     = 1 << 10;
        const I2C_SDA    = 1 << 11;
        const I2C_SCL    = 1 << 12;
    }
}

// ---------------------------------------------------------------------------
// Connector scoping
// ---------------------------------------------------------------------------

/// Merge two connector scope ids.
///
/// [`Uid::NULL`] means "any scope accepted". Two non-null, unequal ids are
/// incompatible: pads mediated through different physical connector
/// instances are never electrically fungible, so every binary [`PadTypes`]
/// operation short-circuits to an empty result when this returns `None`.
fn mix_ids(a: Uid, b: Uid) -> Option<Uid> {
    if a.is_null() {
        Some(b)
    } else if b.is_null() || a == b {
        Some(a)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// PadTypes
// ---------------------------------------------------------------------------

/// A set of signal kinds, optionally narrowed to exact pad identities and
/// scoped to one connector instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PadTypes {
    /// Signal/power kinds, membership only.
    pub types: PadTypeSet,
    /// Exact pad identities, used when compatibility must be evaluated
    /// pad-exact rather than by type class.
    pub pads: HashSet<FullPadId>,
    /// Connector scope; [`Uid::NULL`] accepts any scope.
    pub connector_id: Uid,
}

impl PadTypes {
    pub fn from_types(types: PadTypeSet) -> Self {
        PadTypes {
            types,
            ..PadTypes::default()
        }
    }

    pub fn from_pad(pad: FullPadId) -> Self {
        PadTypes {
            pads: HashSet::from([pad]),
            ..PadTypes::default()
        }
    }

    /// Every enumerated type, no pad narrowing, any connector scope.
    pub fn all() -> Self {
        PadTypes::from_types(PadTypeSet::all())
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.pads.is_empty()
    }

    /// Intersection, keeping elements present in both sets.
    pub fn intersect(&self, other: &PadTypes) -> PadTypes {
        let Some(connector_id) = mix_ids(self.connector_id, other.connector_id) else {
            return PadTypes::default();
        };
        PadTypes {
            types: self.types & other.types,
            pads: self.pads.intersection(&other.pads).cloned().collect(),
            connector_id,
        }
    }

    /// Union of both sets.
    pub fn union(&self, other: &PadTypes) -> PadTypes {
        let Some(connector_id) = mix_ids(self.connector_id, other.connector_id) else {
            return PadTypes::default();
        };
        PadTypes {
            types: self.types | other.types,
            pads: self.pads.union(&other.pads).cloned().collect(),
            connector_id,
        }
    }

    /// What this set still carries after everything `other` covers is
    /// removed.
    ///
    /// Pad-exact matching applies only when the *mask* side names pads: if
    /// `other.pads` is non-empty the result is this set's leftover pads,
    /// otherwise it degrades to a types-only comparison even when our own
    /// `pads` is non-empty.
    pub fn mask(&self, other: &PadTypes) -> PadTypes {
        let Some(connector_id) = mix_ids(self.connector_id, other.connector_id) else {
            return PadTypes::default();
        };
        if !other.pads.is_empty() {
            PadTypes {
                types: PadTypeSet::empty(),
                pads: self.pads.difference(&other.pads).cloned().collect(),
                connector_id,
            }
        } else {
            PadTypes {
                types: self.types - other.types,
                pads: HashSet::new(),
                connector_id,
            }
        }
    }
}

impl BitAnd for &PadTypes {
    type Output = PadTypes;

    fn bitand(self, rhs: &PadTypes) -> PadTypes {
        self.intersect(rhs)
    }
}

impl BitOr for &PadTypes {
    type Output = PadTypes;

    fn bitor(self, rhs: &PadTypes) -> PadTypes {
        self.union(rhs)
    }
}

// ---------------------------------------------------------------------------
// PadTypesSet
// ---------------------------------------------------------------------------

/// What a pad outputs onto a net (`emit`) and what it accepts arriving from
/// the net (`receive`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PadTypesSet {
    pub emit: PadTypes,
    pub receive: PadTypes,
}

impl PadTypesSet {
    /// The all-permissive set: emits nothing, accepts everything. Used both
    /// as the fold seed for net type computation and as the result of a
    /// cycle-breaking re-entrant pad calculation.
    pub fn permissive() -> Self {
        PadTypesSet {
            emit: PadTypes::default(),
            receive: PadTypes::all(),
        }
    }

    /// Fold another pad's contribution into this one: the net now carries
    /// everything either side emits, and only accepts what every side
    /// accepts.
    pub fn mix(&mut self, other: &PadTypesSet) {
        self.emit = self.emit.union(&other.emit);
        self.receive = self.receive.intersect(&other.receive);
    }

    /// Unconditionally inherit another pad's full type set, both directions.
    /// Used by generators that pass signals straight through (a resistor leg
    /// inheriting the other leg's deep types).
    pub fn absorb(&mut self, other: &PadTypesSet) {
        self.emit = self.emit.union(&other.emit);
        self.receive = self.receive.union(&other.receive);
    }

    /// Two sides are electrically compatible iff neither emits anything the
    /// other does not declare itself able to receive. Symmetric by
    /// construction.
    pub fn compatible(a: &PadTypesSet, b: &PadTypesSet) -> bool {
        a.emit.mask(&b.receive).is_empty() && b.emit.mask(&a.receive).is_empty()
    }
}
