//! Nets: routed wire chains connecting at most two pad endpoints.
//!
//! A net's geometry is an alternating horizontal/vertical chain of wire
//! segments. Each [`WireSpan`] stores only its interval along its own axis;
//! the perpendicular coordinate of wire `n` is the previous wire's `end`
//! (`offset` for the first wire). That single invariant drives all the
//! editing operations here.
//!
//! Net states: *Unbound* (both ends disconnected — invalid, removed by the
//! aggregate on entry), *Dangling* (one real pad — legal mid-edit state),
//! *Bound* (two real pads), and orthogonally *Unrouted* (no wires yet) vs
//! *Routed*.

use crate::padtypes::PadTypesSet;
use crate::types::{Direction, FullPadId, Point, Uid, WireN};
use crate::wiring::Wiring;
use crate::{error::WiringError, pad::TypeCalc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ---------------------------------------------------------------------------
// Endpoints and spans
// ---------------------------------------------------------------------------

/// One endpoint of a net.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Connection {
    Disconnected,
    Pad(FullPadId),
}

impl Connection {
    pub fn pad(&self) -> Option<&FullPadId> {
        match self {
            Connection::Disconnected => None,
            Connection::Pad(id) => Some(id),
        }
    }

    pub fn is_disconnected(&self) -> bool {
        matches!(self, Connection::Disconnected)
    }
}

/// Which end of the wire chain an edit addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireEnd {
    Start,
    End,
}

impl WireEnd {
    pub fn opposite(self) -> Self {
        match self {
            WireEnd::Start => WireEnd::End,
            WireEnd::End => WireEnd::Start,
        }
    }
}

/// Interval of one wire segment along its own axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireSpan {
    pub start: i32,
    pub end: i32,
}

impl WireSpan {
    pub fn new(start: i32, end: i32) -> Self {
        WireSpan { start, end }
    }

    /// Signed length; negative spans run against their axis.
    pub fn length(self) -> i32 {
        self.end - self.start
    }

    pub fn is_zero(&self) -> bool {
        self.start == self.end
    }
}

// ---------------------------------------------------------------------------
// Net
// ---------------------------------------------------------------------------

/// A routed wire chain between two (possibly disconnected) endpoints.
pub struct Net {
    uid: Uid,
    start: Connection,
    end: Connection,
    wires: Vec<WireSpan>,
    start_dir: Direction,
    offset: i32,
}

impl Net {
    pub(crate) fn new(uid: Uid) -> Self {
        Net {
            uid,
            start: Connection::Disconnected,
            end: Connection::Disconnected,
            wires: Vec::new(),
            start_dir: Direction::Horizontal,
            offset: 0,
        }
    }

    pub fn uid(&self) -> Uid {
        self.uid
    }

    pub fn connections(&self) -> (&Connection, &Connection) {
        (&self.start, &self.end)
    }

    pub fn connection(&self, end: WireEnd) -> &Connection {
        match end {
            WireEnd::Start => &self.start,
            WireEnd::End => &self.end,
        }
    }

    pub fn wires(&self) -> &[WireSpan] {
        &self.wires
    }

    pub fn start_dir(&self) -> Direction {
        self.start_dir
    }

    /// Perpendicular coordinate of the first wire.
    pub fn offset(&self) -> i32 {
        self.offset
    }

    /// Axis of wire `n`; alternates from `start_dir`.
    pub fn wire_dir(&self, n: WireN) -> Direction {
        if n % 2 == 0 {
            self.start_dir
        } else {
            self.start_dir.flip()
        }
    }

    pub fn is_bound(&self) -> bool {
        self.start.pad().is_some() && self.end.pad().is_some()
    }

    pub fn is_dangling(&self) -> bool {
        self.start.pad().is_some() != self.end.pad().is_some()
    }

    pub fn is_unbound(&self) -> bool {
        self.start.is_disconnected() && self.end.is_disconnected()
    }

    pub fn is_routed(&self) -> bool {
        !self.wires.is_empty()
    }

    /// Normalize a wire index to the chain end it sits on, if any. A sole
    /// wire resolves to `Start`.
    pub fn wire_end_of(&self, n: WireN) -> Option<WireEnd> {
        if self.wires.is_empty() || n >= self.wires.len() {
            None
        } else if n == 0 {
            Some(WireEnd::Start)
        } else if n == self.wires.len() - 1 {
            Some(WireEnd::End)
        } else {
            None
        }
    }

    /// Perpendicular coordinate of wire `n`.
    fn across_of(&self, n: WireN) -> i32 {
        if n == 0 {
            self.offset
        } else {
            self.wires[n - 1].end
        }
    }

    /// Absolute grid coordinates of the chain's two tips, when routed.
    pub fn endpoints(&self) -> Option<(Point, Point)> {
        let first = self.wires.first()?;
        let last_n = self.wires.len() - 1;
        let start = self.start_dir.point(first.start, self.offset);
        let end = self
            .wire_dir(last_n)
            .point(self.wires[last_n].end, self.across_of(last_n));
        Some((start, end))
    }

    // -----------------------------------------------------------------------
    // Geometry editing (called through the owning Wiring)
    // -----------------------------------------------------------------------

    pub(crate) fn set_connection_raw(&mut self, end: WireEnd, connection: Connection) {
        match end {
            WireEnd::Start => self.start = connection,
            WireEnd::End => self.end = connection,
        }
    }

    /// Append a wire segment at either end of the chain.
    ///
    /// The first wire needs an explicit direction and an `anchor` point (the
    /// opposite end's pad position) to fix absolute coordinates. Later wires
    /// alternate direction automatically; an explicit direction that matches
    /// the adjacent wire instead of the expected alternation degrades to an
    /// extension of that wire.
    pub(crate) fn add_wire(
        &mut self,
        end: WireEnd,
        length: i32,
        dir: Option<Direction>,
        ignore_zero_length: bool,
        anchor: Option<Point>,
    ) -> Result<(), WiringError> {
        if length == 0 && ignore_zero_length {
            return Ok(());
        }

        if self.wires.is_empty() {
            let anchor = anchor.ok_or(WiringError::NoAnchor)?;
            let dir = dir.ok_or(WiringError::DirectionRequired)?;
            let along = dir.along(anchor);
            let span = match end {
                WireEnd::End => WireSpan::new(along, along + length),
                WireEnd::Start => WireSpan::new(along - length, along),
            };
            self.wires.push(span);
            self.start_dir = dir;
            self.offset = dir.across(anchor);
            return Ok(());
        }

        let expected = match end {
            WireEnd::End => self.wire_dir(self.wires.len() - 1).flip(),
            WireEnd::Start => self.start_dir.flip(),
        };
        if let Some(dir) = dir {
            if dir != expected {
                return self.extend_wire(end, length);
            }
        }

        match end {
            WireEnd::End => {
                let across = self.across_of(self.wires.len() - 1);
                self.wires.push(WireSpan::new(across, across + length));
            }
            WireEnd::Start => {
                let old_first_start = self.wires[0].start;
                self.wires
                    .insert(0, WireSpan::new(self.offset - length, self.offset));
                self.offset = old_first_start;
                self.start_dir = expected;
            }
        }
        Ok(())
    }

    /// Lengthen (or shorten, for negative `distance`) the boundary wire at
    /// the given end.
    pub(crate) fn extend_wire(&mut self, end: WireEnd, distance: i32) -> Result<(), WiringError> {
        if self.wires.is_empty() {
            return Err(WiringError::WireOutOfRange);
        }
        match end {
            WireEnd::End => {
                let last = self.wires.len() - 1;
                self.wires[last].end += distance;
            }
            WireEnd::Start => {
                self.wires[0].start -= distance;
            }
        }
        Ok(())
    }

    /// Shift wire `n` perpendicular to its own axis, stretching the adjacent
    /// wires (or adjusting `offset` for the first wire) to keep the chain
    /// continuous.
    pub(crate) fn move_wire(&mut self, n: WireN, distance: i32) -> Result<(), WiringError> {
        if n >= self.wires.len() {
            return Err(WiringError::WireOutOfRange);
        }
        if n == 0 {
            self.offset += distance;
        } else {
            self.wires[n - 1].end += distance;
        }
        if n + 1 < self.wires.len() {
            self.wires[n + 1].start += distance;
        }
        Ok(())
    }

    /// Remove zero-length wire segments, merging the neighbors they
    /// separated. Returns true when the whole chain was pruned away and the
    /// net should be destroyed.
    ///
    /// A sole remaining wire survives, even at zero length, while either
    /// endpoint still names a real pad. `tracker`, when set, is remapped to
    /// the tracked wire's post-prune index, or cleared if that wire was
    /// itself removed.
    pub(crate) fn prune_wires(&mut self, tracker: &mut Option<WireN>) -> bool {
        fn remap(tracker: &mut Option<WireN>, f: impl FnOnce(WireN) -> Option<WireN>) {
            if let Some(t) = *tracker {
                *tracker = f(t);
            }
        }

        let was_routed = self.is_routed();
        loop {
            let Some(i) = self.wires.iter().position(WireSpan::is_zero) else {
                break;
            };
            if self.wires.len() == 1 {
                if self.start.pad().is_some() || self.end.pad().is_some() {
                    break;
                }
                self.wires.clear();
                *tracker = None;
                break;
            }
            if i == 0 {
                let removed = self.wires.remove(0);
                self.start_dir = self.start_dir.flip();
                self.offset = removed.end;
                remap(tracker, |t| t.checked_sub(1));
            } else if i == self.wires.len() - 1 {
                self.wires.pop();
                remap(tracker, |t| (t != i).then_some(t));
            } else {
                // Interior zero: the flanking wires share a direction; merge
                // them across the gap.
                self.wires[i - 1].end = self.wires[i + 1].end;
                self.wires.drain(i..=i + 1);
                remap(tracker, |t| match t {
                    t if t < i => Some(t),
                    t if t == i => None,
                    t if t == i + 1 => Some(i - 1),
                    t => Some(t - 2),
                });
            }
        }
        was_routed && self.wires.is_empty()
    }

    /// Remove the chain's first or last wire. When the first wire goes while
    /// others remain, the bookkeeping rotates forward: the old second wire
    /// becomes the first, so `start_dir` flips and `offset` becomes the
    /// removed wire's far coordinate.
    pub(crate) fn remove_boundary_wire(&mut self, end: WireEnd) {
        if self.wires.is_empty() {
            return;
        }
        match end {
            WireEnd::Start => {
                let removed = self.wires.remove(0);
                if !self.wires.is_empty() {
                    self.start_dir = self.start_dir.flip();
                    self.offset = removed.end;
                }
            }
            WireEnd::End => {
                self.wires.pop();
            }
        }
    }

    /// Remove interior wire `n` and detach everything after it. Returns the
    /// tail's re-anchoring data: its first wire's direction, the new offset
    /// (the removed wire's end coordinate), and the tail spans.
    pub(crate) fn split_off_after(&mut self, n: WireN) -> (Direction, i32, Vec<WireSpan>) {
        let tail_dir = self.wire_dir(n + 1);
        let spans: Vec<WireSpan> = self.wires.drain(n + 1..).collect();
        let removed = self.wires.remove(n);
        (tail_dir, removed.end, spans)
    }

    /// Install saved or split-off geometry verbatim.
    pub(crate) fn restore_geometry(
        &mut self,
        start_dir: Direction,
        offset: i32,
        wires: Vec<WireSpan>,
    ) {
        self.start_dir = start_dir;
        self.offset = offset;
        self.wires = wires;
    }

    /// Shift the chain tip at `end` by `delta`, stretching the boundary wire
    /// and its neighbor so the rest of the chain stays put. Used when a
    /// connected component moves or rotates.
    pub(crate) fn shift_anchor(&mut self, end: WireEnd, delta: Point) {
        if self.wires.is_empty() {
            return;
        }
        let last = self.wires.len() - 1;
        match end {
            WireEnd::Start => {
                let dir = self.start_dir;
                self.wires[0].start += dir.along(delta);
                self.offset += dir.across(delta);
                if last >= 1 {
                    self.wires[1].start += dir.across(delta);
                }
            }
            WireEnd::End => {
                let dir = self.wire_dir(last);
                self.wires[last].end += dir.along(delta);
                if last == 0 {
                    self.offset += dir.across(delta);
                } else {
                    self.wires[last - 1].end += dir.across(delta);
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Type propagation
    // -----------------------------------------------------------------------

    /// The effective type set of everything electrically reachable from this
    /// net: the transitive closure of pads reachable through chains of nets
    /// sharing a pad, folded together from each pad's *shallow* types (deep
    /// types would recurse straight back through this net).
    ///
    /// Starts from the all-permissive seed, so a net with no endpoints is
    /// fully permissive.
    pub fn calculate_effective_net_types(&self, wiring: &Wiring, calc: &mut TypeCalc) -> PadTypesSet {
        let mut checked_nets: HashSet<Uid> = HashSet::from([self.uid]);
        let mut checked_pads: HashSet<FullPadId> = HashSet::new();
        let mut pending: Vec<FullPadId> = [&self.start, &self.end]
            .into_iter()
            .filter_map(Connection::pad)
            .cloned()
            .collect();

        let mut result = PadTypesSet::permissive();
        while let Some(pad_id) = pending.pop() {
            if !checked_pads.insert(pad_id.clone()) {
                continue;
            }
            for net_uid in wiring.nets_connected_to_pad(&pad_id) {
                if !checked_nets.insert(net_uid) {
                    continue;
                }
                if let Some(net) = wiring.net(net_uid) {
                    let (start, end) = net.connections();
                    pending.extend([start, end].into_iter().filter_map(Connection::pad).cloned());
                }
            }
            if let Some(pad) = wiring.pad(&pad_id) {
                result.mix(&pad.calc_types(wiring, &pad_id, calc));
            }
        }
        result
    }
}
