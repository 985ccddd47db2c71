//! Components: catalog entries (board, LED strip, button, resistor, …) that
//! own an ordered set of pads plus a grid position and orientation.
//!
//! Concrete component behavior lives in [`crate::catalog`]; constructors
//! there append pads in a fixed order and register per-pad type generators.
//! Pad lists are append-only: the numeric pad constants the catalog exports
//! must match declaration order exactly.

use crate::pad::{Pad, PadTypeGenerator};
use crate::types::{ComponentId, ComponentType, FullPadId, Orientation, PadId, Point, Uid};
use crate::wiring::Wiring;
use std::collections::HashSet;

/// One physical component instance.
///
/// A component is only valid once it has been added to exactly one
/// [`Wiring`], which assigns its [`Uid`] and owns it from then on.
pub struct Component {
    kind: ComponentType,
    uid: Uid,
    pads: Vec<Pad>,
    position: Point,
    orientation: Orientation,
}

impl Component {
    pub(crate) fn new(kind: ComponentType) -> Self {
        Component {
            kind,
            uid: Uid::NULL,
            pads: Vec::new(),
            position: Point::default(),
            orientation: Orientation::default(),
        }
    }

    /// Append a pad; returns its index. Construction-time only.
    pub(crate) fn push_pad(
        &mut self,
        name: impl Into<String>,
        required: bool,
        position: Point,
    ) -> PadId {
        self.pads.push(Pad::new(name, required, position));
        self.pads.len() - 1
    }

    /// Register the electrical behavior of one pad. Construction-time hook
    /// for catalog constructors.
    pub(crate) fn set_pad_type_generator(&mut self, pad: PadId, generator: PadTypeGenerator) {
        if let Some(pad) = self.pads.get_mut(pad) {
            pad.set_generator(generator);
        }
    }

    pub(crate) fn set_pad_position(&mut self, pad: PadId, position: Point) {
        if let Some(pad) = self.pads.get_mut(pad) {
            pad.set_position(position);
        }
    }

    pub(crate) fn set_uid(&mut self, uid: Uid) {
        self.uid = uid;
    }

    pub(crate) fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    pub(crate) fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    pub fn id(&self) -> ComponentId {
        ComponentId {
            kind: self.kind.clone(),
            uid: self.uid,
        }
    }

    pub fn kind(&self) -> &ComponentType {
        &self.kind
    }

    pub fn uid(&self) -> Uid {
        self.uid
    }

    pub fn pads(&self) -> &[Pad] {
        &self.pads
    }

    pub fn pad(&self, pad: PadId) -> Option<&Pad> {
        self.pads.get(pad)
    }

    /// Index of the first pad with the given name.
    pub fn pad_named(&self, name: &str) -> Option<PadId> {
        self.pads.iter().position(|pad| pad.name() == name)
    }

    /// Fully-qualified id of one of this component's pads.
    pub fn pad_id(&self, pad: PadId) -> FullPadId {
        FullPadId {
            component: self.id(),
            pad,
        }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Absolute grid position of a pad: component position plus the pad's
    /// local position rotated by the current orientation.
    pub fn pad_position(&self, pad: PadId) -> Option<Point> {
        let pad = self.pads.get(pad)?;
        Some(self.position + self.orientation.rotate(pad.position()))
    }

    /// Uids of every net wired to any pad of this component.
    pub fn connected_nets(&self, wiring: &Wiring) -> HashSet<Uid> {
        let mut nets = HashSet::new();
        for pad in 0..self.pads.len() {
            nets.extend(wiring.nets_connected_to_pad(&self.pad_id(pad)));
        }
        nets
    }
}
