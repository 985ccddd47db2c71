//! Identity and geometry primitives shared by the whole wiring model.
//!
//! Everything that can end up inside a [`crate::wiring::NetSave`] snapshot
//! derives [`serde::Serialize`] / [`serde::Deserialize`].

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Unique identifiers
// ---------------------------------------------------------------------------

/// Opaque unique id for components and nets, unique within the owning map.
///
/// [`Uid::NULL`] is the reserved "no id" value; a freshly constructed
/// component carries it until the [`crate::wiring::Wiring`] aggregate assigns
/// a real one.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Uid(pub u32);

impl Uid {
    pub const NULL: Uid = Uid(0);

    pub fn is_null(self) -> bool {
        self == Uid::NULL
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "#null")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

// ---------------------------------------------------------------------------
// Component identity
// ---------------------------------------------------------------------------

/// Catalog class of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentClass {
    ProffieboardV1,
    ProffieboardV2,
    ProffieboardV3,
    LedStrip,
    Button,
    Resistor,
    BladeConnector,
    /// User-defined component; the concrete kind lives in
    /// [`ComponentType::custom_id`].
    Custom,
}

impl ComponentClass {
    /// Board classes are managed through
    /// [`crate::wiring::Wiring::set_proffieboard_version`], never the factory.
    pub fn is_board(self) -> bool {
        matches!(
            self,
            ComponentClass::ProffieboardV1
                | ComponentClass::ProffieboardV2
                | ComponentClass::ProffieboardV3
        )
    }
}

/// Full component type: a catalog class plus an optional custom-component id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentType {
    pub class: ComponentClass,
    pub custom_id: Option<String>,
}

impl ComponentType {
    pub fn new(class: ComponentClass) -> Self {
        ComponentType {
            class,
            custom_id: None,
        }
    }

    pub fn custom(id: impl Into<String>) -> Self {
        ComponentType {
            class: ComponentClass::Custom,
            custom_id: Some(id.into()),
        }
    }
}

/// Identity of one component instance inside a wiring.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentId {
    pub kind: ComponentType,
    pub uid: Uid,
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind.custom_id {
            Some(custom) => write!(f, "{:?}[{custom}]{}", self.kind.class, self.uid),
            None => write!(f, "{:?}{}", self.kind.class, self.uid),
        }
    }
}

/// Index of a pad within its component, sequential from 0 in declaration
/// order.
pub type PadId = usize;

/// Fully-qualified pad identity: component instance plus pad index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FullPadId {
    pub component: ComponentId,
    pub pad: PadId,
}

impl fmt::Display for FullPadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.component, self.pad)
    }
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Point on the wiring grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }
}

impl std::ops::Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Component rotation in 90° steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Orientation {
    /// Rotate a component-local point around the component origin.
    pub fn rotate(self, p: Point) -> Point {
        match self {
            Orientation::Deg0 => p,
            Orientation::Deg90 => Point::new(-p.y, p.x),
            Orientation::Deg180 => Point::new(-p.x, -p.y),
            Orientation::Deg270 => Point::new(p.y, -p.x),
        }
    }
}

/// Axis of a wire segment. Consecutive wires in a chain always alternate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Horizontal,
    Vertical,
}

impl Direction {
    pub fn flip(self) -> Self {
        match self {
            Direction::Horizontal => Direction::Vertical,
            Direction::Vertical => Direction::Horizontal,
        }
    }

    /// Coordinate of `p` along this axis.
    pub fn along(self, p: Point) -> i32 {
        match self {
            Direction::Horizontal => p.x,
            Direction::Vertical => p.y,
        }
    }

    /// Coordinate of `p` perpendicular to this axis.
    pub fn across(self, p: Point) -> i32 {
        self.flip().along(p)
    }

    /// Assemble a point from an along/across coordinate pair.
    pub fn point(self, along: i32, across: i32) -> Point {
        match self {
            Direction::Horizontal => Point::new(along, across),
            Direction::Vertical => Point::new(across, along),
        }
    }
}

/// Index of a wire segment within a net's chain.
pub type WireN = usize;
