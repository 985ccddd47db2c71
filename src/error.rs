//! Error taxonomy for the wiring model.
//!
//! Every failure is local and recoverable; callers are expected to check the
//! result and present feedback. Multi-step operations either complete fully
//! or leave the wiring untouched.

use crate::types::{ComponentClass, ComponentId, FullPadId, Uid};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WiringError {
    #[error("no component {0} in this wiring")]
    UnknownComponent(ComponentId),

    #[error("no net {0} in this wiring")]
    UnknownNet(Uid),

    #[error("no pad {0}")]
    UnknownPad(FullPadId),

    #[error("pads are electrically incompatible")]
    Incompatible,

    #[error("the active proffieboard cannot be removed")]
    BoardRemoval,

    #[error("wire index out of range")]
    WireOutOfRange,

    #[error("a first wire needs the opposite end anchored to a pad")]
    NoAnchor,

    #[error("a first wire needs an explicit direction")]
    DirectionRequired,

    #[error("a net needs at least one connected end")]
    BothEndsDisconnected,

    #[error("{0:?} is not a proffieboard class")]
    NotABoard(ComponentClass),
}
