//! The wiring aggregate: sole owner of every component and net.
//!
//! All mutation goes through this type so the pad→net reverse index stays
//! exactly in sync with net connections — there is no garbage-collection
//! pass, any divergence is a correctness bug. One component is always the
//! proffieboard; it can be swapped for another version but never removed.
//!
//! A single `Wiring` must be confined to one logical thread; separate
//! instances share no state.

use crate::catalog;
use crate::component::Component;
use crate::error::WiringError;
use crate::net::{Connection, Net, WireEnd, WireSpan};
use crate::pad::{Pad, TypeCalc};
use crate::padtypes::PadTypesSet;
use crate::types::{
    ComponentClass, ComponentId, ComponentType, Direction, FullPadId, Orientation, Point, Uid,
    WireN,
};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// ---------------------------------------------------------------------------
// NetSave snapshot
// ---------------------------------------------------------------------------

/// Saved wire-chain geometry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireArchive {
    pub offset: i32,
    pub start_dir: Direction,
    pub wires: Vec<WireSpan>,
}

/// Verbatim snapshot of one net's connection and geometry state, for an
/// external undo/redo or serialization layer. Reloading bypasses
/// compatibility re-validation; round-trip fidelity is only guaranteed for a
/// previously valid net.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetSave {
    pub net_id: Uid,
    pub connections: (Connection, Connection),
    pub archive: WireArchive,
}

impl NetSave {
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).expect("net snapshot serialization should not fail")
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

/// The aggregate root of a wiring diagram.
pub struct Wiring {
    /// Two-level map: class, then instance uid. The per-class grouping backs
    /// [`Wiring::components_by_class`] and the whole-bucket purge on board
    /// version changes.
    components: HashMap<ComponentClass, HashMap<Uid, Component>>,
    nets: HashMap<Uid, Net>,
    /// Pad → connected nets reverse index. Multimap semantics: a net wired
    /// to the same pad at both ends appears twice.
    pad_net_lookup: HashMap<FullPadId, Vec<Uid>>,
    proffieboard: ComponentId,
    next_uid: u32,
}

impl Default for Wiring {
    fn default() -> Self {
        Wiring::new()
    }
}

impl Wiring {
    /// An empty wiring holding the one mandatory component: a Proffieboard
    /// (latest version). Use [`Wiring::set_proffieboard_version`] to swap it.
    pub fn new() -> Self {
        let mut wiring = Wiring {
            components: HashMap::new(),
            nets: HashMap::new(),
            pad_net_lookup: HashMap::new(),
            proffieboard: ComponentId {
                kind: ComponentType::new(ComponentClass::ProffieboardV3),
                uid: Uid::NULL,
            },
            next_uid: 0,
        };
        let board = catalog::proffieboard(ComponentClass::ProffieboardV3);
        wiring.proffieboard = wiring.add_component(board);
        wiring
    }

    fn gen_uid(&mut self) -> Uid {
        loop {
            self.next_uid += 1;
            let uid = Uid(self.next_uid);
            let taken = self.nets.contains_key(&uid)
                || self.components.values().any(|bucket| bucket.contains_key(&uid));
            if !taken {
                return uid;
            }
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn component(&self, id: &ComponentId) -> Option<&Component> {
        let component = self.components.get(&id.kind.class)?.get(&id.uid)?;
        (component.kind() == &id.kind).then_some(component)
    }

    fn component_mut(&mut self, id: &ComponentId) -> Option<&mut Component> {
        let component = self.components.get_mut(&id.kind.class)?.get_mut(&id.uid)?;
        (component.kind() == &id.kind).then_some(component)
    }

    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.values().flat_map(|bucket| bucket.values())
    }

    pub fn components_by_class(&self, class: ComponentClass) -> Vec<&Component> {
        self.components
            .get(&class)
            .map(|bucket| bucket.values().collect())
            .unwrap_or_default()
    }

    pub fn pad(&self, id: &FullPadId) -> Option<&Pad> {
        self.component(&id.component)?.pad(id.pad)
    }

    /// Absolute grid position of a pad.
    pub fn pad_position(&self, id: &FullPadId) -> Option<Point> {
        self.component(&id.component)?.pad_position(id.pad)
    }

    pub fn net(&self, uid: Uid) -> Option<&Net> {
        self.nets.get(&uid)
    }

    pub fn nets(&self) -> impl Iterator<Item = &Net> {
        self.nets.values()
    }

    /// Deduplicated uids of every net with an endpoint on this pad.
    pub fn nets_connected_to_pad(&self, id: &FullPadId) -> HashSet<Uid> {
        self.pad_net_lookup
            .get(id)
            .map(|nets| nets.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn proffieboard_id(&self) -> &ComponentId {
        &self.proffieboard
    }

    /// Pads flagged as required that have no net connected — the parent
    /// component is not valid until these are wired.
    pub fn validate(&self) -> Vec<FullPadId> {
        let mut unwired = Vec::new();
        for component in self.components() {
            for (pad_n, pad) in component.pads().iter().enumerate() {
                let id = component.pad_id(pad_n);
                if pad.required() && self.nets_connected_to_pad(&id).is_empty() {
                    unwired.push(id);
                }
            }
        }
        unwired
    }

    // -----------------------------------------------------------------------
    // Component mutation
    // -----------------------------------------------------------------------

    /// Take ownership of a component, assigning a fresh uid if it has none.
    pub fn add_component(&mut self, mut component: Component) -> ComponentId {
        if component.uid().is_null() {
            component.set_uid(self.gen_uid());
        }
        let id = component.id();
        debug!("adding component {id}");
        self.components
            .entry(id.kind.class)
            .or_default()
            .insert(id.uid, component);
        id
    }

    /// Factory overload: construct a default instance of a catalog class and
    /// add it. Returns `None` for board classes (managed through
    /// [`Wiring::set_proffieboard_version`]) and unknown custom kinds.
    pub fn add_component_of(&mut self, kind: &ComponentType) -> Option<ComponentId> {
        let component = catalog::build(kind)?;
        Some(self.add_component(component))
    }

    /// Remove a component and every net wired to any of its pads. A net must
    /// never be left dangling at a pad that no longer exists. Refuses to
    /// remove the active proffieboard.
    pub fn remove_component(&mut self, id: &ComponentId) -> Result<(), WiringError> {
        if *id == self.proffieboard {
            return Err(WiringError::BoardRemoval);
        }
        let pad_count = self
            .component(id)
            .ok_or_else(|| WiringError::UnknownComponent(id.clone()))?
            .pads()
            .len();
        for pad in 0..pad_count {
            let pad_id = FullPadId {
                component: id.clone(),
                pad,
            };
            for net_uid in self.nets_connected_to_pad(&pad_id) {
                // A net between two pads of this component is already gone
                // when the second pad reaches it.
                let _ = self.remove_net(net_uid);
            }
        }
        if let Some(bucket) = self.components.get_mut(&id.kind.class) {
            bucket.remove(&id.uid);
        }
        debug!("removed component {id}");
        Ok(())
    }

    /// Swap the proffieboard for another version. No-op when the class is
    /// already active. The old board's whole class bucket is purged along
    /// with every net wired to it.
    // TODO: attempt to remap nets onto same-named pads of the new board
    // instead of dropping them.
    pub fn set_proffieboard_version(
        &mut self,
        class: ComponentClass,
    ) -> Result<ComponentId, WiringError> {
        if !class.is_board() {
            return Err(WiringError::NotABoard(class));
        }
        if self.proffieboard.kind.class == class {
            return Ok(self.proffieboard.clone());
        }
        let new_id = self.add_component(catalog::proffieboard(class));
        let old = std::mem::replace(&mut self.proffieboard, new_id.clone());
        debug!("proffieboard {old} replaced by {new_id}");

        let stale: Vec<ComponentId> = self
            .components
            .get(&old.kind.class)
            .map(|bucket| bucket.values().map(Component::id).collect())
            .unwrap_or_default();
        for id in stale {
            let _ = self.remove_component(&id);
        }
        self.components.remove(&old.kind.class);
        Ok(new_id)
    }

    /// Move a component by a grid delta, dragging the boundary wires of
    /// every connected net along with its pads.
    pub fn move_component(&mut self, id: &ComponentId, delta: Point) -> Result<(), WiringError> {
        let old_positions = self.record_pad_positions(id)?;
        if let Some(component) = self.component_mut(id) {
            let position = component.position();
            component.set_position(position + delta);
        }
        self.reanchor_component(id, &old_positions);
        Ok(())
    }

    /// Rotate a component, re-anchoring connected nets onto the pads' new
    /// positions.
    pub fn set_component_orientation(
        &mut self,
        id: &ComponentId,
        orientation: Orientation,
    ) -> Result<(), WiringError> {
        let old_positions = self.record_pad_positions(id)?;
        if let Some(component) = self.component_mut(id) {
            component.set_orientation(orientation);
        }
        self.reanchor_component(id, &old_positions);
        Ok(())
    }

    fn record_pad_positions(&self, id: &ComponentId) -> Result<Vec<Point>, WiringError> {
        let component = self
            .component(id)
            .ok_or_else(|| WiringError::UnknownComponent(id.clone()))?;
        Ok((0..component.pads().len())
            .filter_map(|pad| component.pad_position(pad))
            .collect())
    }

    fn reanchor_component(&mut self, id: &ComponentId, old_positions: &[Point]) {
        for (pad, &old_pos) in old_positions.iter().enumerate() {
            let pad_id = FullPadId {
                component: id.clone(),
                pad,
            };
            let Some(new_pos) = self.pad_position(&pad_id) else {
                continue;
            };
            let delta = new_pos - old_pos;
            if delta == Point::default() {
                continue;
            }
            for net_uid in self.nets_connected_to_pad(&pad_id) {
                let ends: Vec<WireEnd> = match self.net(net_uid) {
                    Some(net) => [WireEnd::Start, WireEnd::End]
                        .into_iter()
                        .filter(|&end| net.connection(end).pad() == Some(&pad_id))
                        .collect(),
                    None => continue,
                };
                if let Some(net) = self.nets.get_mut(&net_uid) {
                    for end in ends {
                        net.shift_anchor(end, delta);
                    }
                }
                let _ = self.prune_net(net_uid, &mut None);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Net mutation
    // -----------------------------------------------------------------------

    /// Create a net between two endpoints, at least one of which must be a
    /// real pad. Both connections go through the full compatibility check;
    /// failure of either rolls the net back out entirely.
    pub fn add_net(&mut self, start: Connection, end: Connection) -> Result<Uid, WiringError> {
        if start.is_disconnected() && end.is_disconnected() {
            return Err(WiringError::BothEndsDisconnected);
        }
        let uid = self.gen_uid();
        // The net must be discoverable before the connections are attempted;
        // the compatibility path walks the net maps.
        self.nets.insert(uid, Net::new(uid));
        for (wire_end, connection) in [(WireEnd::Start, start), (WireEnd::End, end)] {
            if let Err(err) = self.set_connection(uid, wire_end, connection) {
                self.remove_net_raw(uid);
                return Err(err);
            }
        }
        debug!("added net {uid}");
        Ok(uid)
    }

    /// Disconnect both ends (keeping the reverse index coherent) and drop
    /// the net.
    pub fn remove_net(&mut self, uid: Uid) -> Result<(), WiringError> {
        if !self.nets.contains_key(&uid) {
            return Err(WiringError::UnknownNet(uid));
        }
        self.set_connection(uid, WireEnd::Start, Connection::Disconnected)?;
        if self.nets.contains_key(&uid) {
            self.set_connection(uid, WireEnd::End, Connection::Disconnected)?;
        }
        // Still present only if it was already unbound (no-op disconnects).
        if self.nets.contains_key(&uid) {
            self.remove_net_raw(uid);
        }
        Ok(())
    }

    /// Rebind one end of a net.
    ///
    /// Connecting a real pad is gated on [`PadTypesSet::compatible`] between
    /// the net's effective types and the pad's deep types; on failure
    /// nothing mutates. The reverse index is updated remove-then-add, never
    /// partially. A net whose ends both become disconnected removes itself.
    pub fn set_connection(
        &mut self,
        net_uid: Uid,
        end: WireEnd,
        connection: Connection,
    ) -> Result<(), WiringError> {
        let net = self
            .nets
            .get(&net_uid)
            .ok_or(WiringError::UnknownNet(net_uid))?;
        let old = net.connection(end).clone();
        if old == connection {
            return Ok(());
        }

        if let Connection::Pad(pad_id) = &connection {
            let component = self
                .component(&pad_id.component)
                .ok_or_else(|| WiringError::UnknownComponent(pad_id.component.clone()))?;
            let pad = component
                .pad(pad_id.pad)
                .ok_or_else(|| WiringError::UnknownPad(pad_id.clone()))?;
            let net_types = net.calculate_effective_net_types(self, &mut TypeCalc::new());
            let pad_types = pad.calc_deep_types(self, pad_id, &mut TypeCalc::new());
            if !PadTypesSet::compatible(&net_types, &pad_types) {
                return Err(WiringError::Incompatible);
            }
        }

        trace!("net {net_uid} {end:?} -> {connection:?}");
        if let Some(old_pad) = old.pad() {
            let old_pad = old_pad.clone();
            self.remove_lookup(&old_pad, net_uid);
        }
        if let Some(new_pad) = connection.pad() {
            self.pad_net_lookup
                .entry(new_pad.clone())
                .or_default()
                .push(net_uid);
        }
        if let Some(net) = self.nets.get_mut(&net_uid) {
            net.set_connection_raw(end, connection);
        }
        if self.nets.get(&net_uid).is_some_and(Net::is_unbound) {
            debug!("net {net_uid} fully disconnected, removing");
            self.nets.remove(&net_uid);
        }
        Ok(())
    }

    /// Append a wire segment at either end of a net's chain. See
    /// [`Net::add_wire`] for the geometry rules; the first wire is anchored
    /// at the opposite end's pad position.
    pub fn add_wire(
        &mut self,
        net_uid: Uid,
        end: WireEnd,
        length: i32,
        dir: Option<Direction>,
        ignore_zero_length: bool,
    ) -> Result<(), WiringError> {
        let net = self
            .nets
            .get(&net_uid)
            .ok_or(WiringError::UnknownNet(net_uid))?;
        // Degenerate no-op: must succeed even when no anchor could be
        // resolved.
        if length == 0 && ignore_zero_length {
            return Ok(());
        }
        let anchor = if net.is_routed() {
            None
        } else {
            let opposite = net
                .connection(end.opposite())
                .pad()
                .ok_or(WiringError::NoAnchor)?
                .clone();
            Some(
                self.pad_position(&opposite)
                    .ok_or(WiringError::UnknownPad(opposite))?,
            )
        };
        match self.nets.get_mut(&net_uid) {
            Some(net) => net.add_wire(end, length, dir, ignore_zero_length, anchor),
            None => Err(WiringError::UnknownNet(net_uid)),
        }
    }

    /// Lengthen or shorten the boundary wire at one end of a net.
    pub fn extend_wire(
        &mut self,
        net_uid: Uid,
        end: WireEnd,
        distance: i32,
        prune: bool,
    ) -> Result<(), WiringError> {
        self.nets
            .get_mut(&net_uid)
            .ok_or(WiringError::UnknownNet(net_uid))?
            .extend_wire(end, distance)?;
        if prune {
            self.prune_net(net_uid, &mut None)?;
        }
        Ok(())
    }

    /// Shift wire `n` perpendicular to its own direction.
    pub fn move_wire(
        &mut self,
        net_uid: Uid,
        n: WireN,
        distance: i32,
        prune: bool,
    ) -> Result<(), WiringError> {
        self.nets
            .get_mut(&net_uid)
            .ok_or(WiringError::UnknownNet(net_uid))?
            .move_wire(n, distance)?;
        if prune {
            let mut tracker = Some(n);
            self.prune_net(net_uid, &mut tracker)?;
        }
        Ok(())
    }

    /// Prune a net's zero-length wires, destroying the net when the whole
    /// chain collapses. Returns whether the net was destroyed; `tracker` is
    /// remapped across the prune.
    pub fn prune_net(
        &mut self,
        net_uid: Uid,
        tracker: &mut Option<WireN>,
    ) -> Result<bool, WiringError> {
        let net = self
            .nets
            .get_mut(&net_uid)
            .ok_or(WiringError::UnknownNet(net_uid))?;
        let destroyed = net.prune_wires(tracker);
        if destroyed {
            debug!("net {net_uid} pruned away");
            self.remove_net_raw(net_uid);
        }
        Ok(destroyed)
    }

    /// Remove one wire from a net's chain.
    ///
    /// Deleting a boundary wire disconnects that end (destroying the net
    /// when both ends are gone). Deleting an interior wire splits the net:
    /// the tail spans move to a new net that inherits the old End
    /// connection, and the new net's uid is returned.
    pub fn delete_wire(
        &mut self,
        net_uid: Uid,
        n: WireN,
    ) -> Result<Option<Uid>, WiringError> {
        let net = self
            .nets
            .get(&net_uid)
            .ok_or(WiringError::UnknownNet(net_uid))?;
        let len = net.wires().len();
        if n >= len {
            return Err(WiringError::WireOutOfRange);
        }

        // A sole wire counts as the Start boundary; only that end is
        // disconnected, so a bound net survives dangling and unrouted.
        if n == 0 || n == len - 1 {
            let end = if n == 0 { WireEnd::Start } else { WireEnd::End };
            if let Some(net) = self.nets.get_mut(&net_uid) {
                net.remove_boundary_wire(end);
            }
            self.set_connection(net_uid, end, Connection::Disconnected)?;
            return Ok(None);
        }

        // Interior wire: split the chain.
        let end_connection = net.connection(WireEnd::End).clone();
        let (tail_dir, tail_offset, tail_spans) = match self.nets.get_mut(&net_uid) {
            Some(net) => net.split_off_after(n),
            None => return Err(WiringError::UnknownNet(net_uid)),
        };

        if end_connection.is_disconnected() {
            // The tail would be a net with no endpoints; drop it.
            return Ok(None);
        }

        let new_uid = self.gen_uid();
        let mut tail = Net::new(new_uid);
        tail.restore_geometry(tail_dir, tail_offset, tail_spans);
        tail.set_connection_raw(WireEnd::End, end_connection.clone());
        self.nets.insert(new_uid, tail);
        if let Some(pad) = end_connection.pad() {
            self.remove_lookup(pad, net_uid);
            self.pad_net_lookup
                .entry(pad.clone())
                .or_default()
                .push(new_uid);
        }
        if let Some(net) = self.nets.get_mut(&net_uid) {
            net.set_connection_raw(WireEnd::End, Connection::Disconnected);
        }
        if self.nets.get(&net_uid).is_some_and(Net::is_unbound) {
            self.remove_net_raw(net_uid);
        }
        debug!("net {net_uid} split, tail is {new_uid}");
        Ok(Some(new_uid))
    }

    // -----------------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------------

    /// Snapshot one net's connection and geometry state.
    pub fn gen_net_save(&self, net_uid: Uid) -> Option<NetSave> {
        let net = self.net(net_uid)?;
        let (start, end) = net.connections();
        Some(NetSave {
            net_id: net_uid,
            connections: (start.clone(), end.clone()),
            archive: WireArchive {
                offset: net.offset(),
                start_dir: net.start_dir(),
                wires: net.wires().to_vec(),
            },
        })
    }

    /// Reconstruct a net from a snapshot, bypassing compatibility
    /// re-validation. Any existing net with the same uid is replaced.
    pub fn load_net_save(&mut self, save: &NetSave) -> Result<(), WiringError> {
        let (start, end) = &save.connections;
        if start.is_disconnected() && end.is_disconnected() {
            return Err(WiringError::BothEndsDisconnected);
        }
        for connection in [start, end] {
            if let Some(pad_id) = connection.pad() {
                self.component(&pad_id.component)
                    .ok_or_else(|| WiringError::UnknownComponent(pad_id.component.clone()))?
                    .pad(pad_id.pad)
                    .ok_or_else(|| WiringError::UnknownPad(pad_id.clone()))?;
            }
        }

        if self.nets.contains_key(&save.net_id) {
            self.remove_net_raw(save.net_id);
        }
        let mut net = Net::new(save.net_id);
        net.restore_geometry(
            save.archive.start_dir,
            save.archive.offset,
            save.archive.wires.clone(),
        );
        net.set_connection_raw(WireEnd::Start, start.clone());
        net.set_connection_raw(WireEnd::End, end.clone());
        self.nets.insert(save.net_id, net);
        for connection in [start, end] {
            if let Some(pad_id) = connection.pad() {
                self.pad_net_lookup
                    .entry(pad_id.clone())
                    .or_default()
                    .push(save.net_id);
            }
        }
        debug!("restored net {} from snapshot", save.net_id);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Internal bookkeeping
    // -----------------------------------------------------------------------

    /// Drop a net and purge its reverse-index entries, without routing
    /// through connection checks.
    fn remove_net_raw(&mut self, uid: Uid) {
        if let Some(net) = self.nets.remove(&uid) {
            let (start, end) = net.connections();
            let pads: Vec<FullPadId> = [start, end]
                .into_iter()
                .filter_map(Connection::pad)
                .cloned()
                .collect();
            for pad in pads {
                self.remove_lookup(&pad, uid);
            }
        }
    }

    /// Remove one occurrence of `net` from a pad's reverse-index entry.
    fn remove_lookup(&mut self, pad: &FullPadId, net: Uid) {
        if let Some(nets) = self.pad_net_lookup.get_mut(pad) {
            if let Some(i) = nets.iter().position(|&uid| uid == net) {
                nets.remove(i);
            }
            if nets.is_empty() {
                self.pad_net_lookup.remove(pad);
            }
        }
    }
}
