//! Pads: the named electrical terminals of a component.
//!
//! A pad's electrical behavior comes from an owner-supplied type generator
//! closure. Generators may recurse into sibling pads' deep types (a resistor
//! leg asks the other leg), so every type calculation threads a [`TypeCalc`]
//! context whose visited set breaks pad-to-pad cycles.

use crate::padtypes::{PadTypes, PadTypesSet};
use crate::types::{FullPadId, Point};
use crate::wiring::Wiring;
use std::collections::HashSet;

/// Per-pad electrical behavior, registered by the component constructor.
///
/// Receives the wiring, the pad's own fully-qualified id, and the calculation
/// context to thread through any recursive type queries.
pub type PadTypeGenerator = Box<dyn Fn(&Wiring, &FullPadId, &mut TypeCalc) -> PadTypesSet>;

/// Cycle guard for one outermost type calculation.
///
/// Callers construct a fresh context per top-level query; pads stay in the
/// set for the lifetime of the context, so a re-entrant calculation for a pad
/// already in progress short-circuits to the all-permissive set instead of
/// recursing forever.
#[derive(Default)]
pub struct TypeCalc {
    in_progress: HashSet<FullPadId>,
}

impl TypeCalc {
    pub fn new() -> Self {
        TypeCalc::default()
    }
}

/// One electrical terminal on a component.
pub struct Pad {
    name: String,
    required: bool,
    position: Point,
    generator: Option<PadTypeGenerator>,
}

impl Pad {
    pub(crate) fn new(name: impl Into<String>, required: bool, position: Point) -> Self {
        Pad {
            name: name.into(),
            required,
            position,
            generator: None,
        }
    }

    pub(crate) fn set_generator(&mut self, generator: PadTypeGenerator) {
        self.generator = Some(generator);
    }

    pub(crate) fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the parent component is invalid while this pad is unwired.
    pub fn required(&self) -> bool {
        self.required
    }

    /// Component-local grid position, before orientation is applied.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Shallow type calculation: this pad's intrinsic behavior only.
    ///
    /// Invokes the registered generator, or falls back to the trivial
    /// self-referencing set (emits its own identity, accepts anything) when
    /// none was registered. Insufficient for validity checks on its own; use
    /// [`Pad::calc_deep_types`] for those.
    pub fn calc_types(&self, wiring: &Wiring, id: &FullPadId, calc: &mut TypeCalc) -> PadTypesSet {
        if !calc.in_progress.insert(id.clone()) {
            // Already being calculated further up the stack: break the cycle.
            return PadTypesSet::permissive();
        }
        match &self.generator {
            Some(generator) => generator(wiring, id, calc),
            None => PadTypesSet {
                emit: PadTypes::from_pad(id.clone()),
                receive: PadTypes::all(),
            },
        }
    }

    /// Net-aware type calculation: the shallow set folded with the effective
    /// types of every net currently connected to this pad. This is the entry
    /// point compatibility checks use.
    pub fn calc_deep_types(
        &self,
        wiring: &Wiring,
        id: &FullPadId,
        calc: &mut TypeCalc,
    ) -> PadTypesSet {
        let mut types = self.calc_types(wiring, id, calc);
        for net_uid in wiring.nets_connected_to_pad(id) {
            if let Some(net) = wiring.net(net_uid) {
                types.mix(&net.calculate_effective_net_types(wiring, calc));
            }
        }
        types
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ComponentClass, ComponentId, ComponentType, Uid};

    fn pad_id(uid: u32, pad: usize) -> FullPadId {
        FullPadId {
            component: ComponentId {
                kind: ComponentType::new(ComponentClass::Custom),
                uid: Uid(uid),
            },
            pad,
        }
    }

    #[test]
    fn unregistered_pad_yields_trivial_self_set() {
        let wiring = Wiring::default();
        let pad = Pad::new("free", false, Point::default());
        let id = pad_id(1, 0);
        let types = pad.calc_types(&wiring, &id, &mut TypeCalc::new());
        assert!(types.emit.pads.contains(&id));
        assert!(types.emit.types.is_empty());
        assert_eq!(types.receive, PadTypes::all());
    }

    #[test]
    fn reentry_returns_permissive() {
        let wiring = Wiring::default();
        let pad = Pad::new("loop", false, Point::default());
        let id = pad_id(2, 0);
        let mut calc = TypeCalc::new();
        // First call claims the pad for this context.
        let first = pad.calc_types(&wiring, &id, &mut calc);
        assert!(first.emit.pads.contains(&id));
        // Re-entry within the same context must break the cycle.
        let second = pad.calc_types(&wiring, &id, &mut calc);
        assert_eq!(second, PadTypesSet::permissive());
    }
}
