//! ProffieWire — electrical wiring model and pad-type compatibility engine
//! for Proffieboard saber controllers.
//!
//! # Modules
//!
//! - [`types`] — identity and geometry primitives (uids, pad ids, points)
//! - [`padtypes`] — the emit/receive pad type algebra behind compatibility
//! - [`pad`] — pads and their type generator closures
//! - [`component`] — component instances: pads plus position and orientation
//! - [`net`] — routed wire chains between two pad endpoints
//! - [`wiring`] — the aggregate owning all components and nets
//! - [`catalog`] — constructors for every known component class
//! - [`error`] — the failure taxonomy shared by all mutating operations
//!
//! The entry point is [`Wiring`]: create one (it always holds a
//! Proffieboard), add components through [`Wiring::add_component_of`], and
//! wire pads together with [`Wiring::add_net`]. Connections are refused when
//! the pad type algebra proves them electrically unsound.

pub mod catalog;
pub mod component;
pub mod error;
pub mod net;
pub mod pad;
pub mod padtypes;
pub mod types;
pub mod wiring;

pub use component::Component;
pub use error::WiringError;
pub use net::{Connection, Net, WireEnd, WireSpan};
pub use pad::{Pad, PadTypeGenerator, TypeCalc};
pub use padtypes::{PadTypeSet, PadTypes, PadTypesSet};
pub use types::{
    ComponentClass, ComponentId, ComponentType, Direction, FullPadId, Orientation, PadId, Point,
    Uid, WireN,
};
pub use wiring::{NetSave, WireArchive, Wiring};
