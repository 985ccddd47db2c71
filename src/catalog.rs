//! The component catalog: constructors for every known component class.
//!
//! Each constructor appends pads in a fixed order (the index constants in
//! the per-component submodules must match) and registers a type generator
//! describing the pad's electrical behavior:
//!
//! * driving pads emit their signal type and accept the same type back,
//!   so two drivers of the same bus can share a net;
//! * passive pads emit nothing and accept the set of types they tolerate;
//! * pass-through pads (resistor legs, blade connector pins) compute their
//!   types from the partner pad's deep types at query time.

use crate::component::Component;
use crate::pad::PadTypeGenerator;
use crate::padtypes::{PadTypeSet, PadTypes, PadTypesSet};
use crate::types::{ComponentClass, ComponentType, FullPadId, PadId, Point};

/// Pad indices of [`led_strip`](build) components.
pub mod led_strip {
    use crate::types::PadId;

    pub const POS: PadId = 0;
    pub const NEG: PadId = 1;
    pub const DATA_IN: PadId = 2;
    pub const DATA_OUT: PadId = 3;
}

/// Pad indices of button components.
pub mod button {
    use crate::types::PadId;

    pub const LEG_A: PadId = 0;
    pub const LEG_B: PadId = 1;
}

/// Pad indices of resistor components.
pub mod resistor {
    use crate::types::PadId;

    pub const LEG_A: PadId = 0;
    pub const LEG_B: PadId = 1;
}

/// Pad indices of blade connector components. Hilt-side pins pair with the
/// blade-side pin of the same number.
pub mod blade_connector {
    use crate::types::PadId;

    pub const PIN1_HILT: PadId = 0;
    pub const PIN1_BLADE: PadId = 1;
    pub const PIN2_HILT: PadId = 2;
    pub const PIN2_BLADE: PadId = 3;
    pub const PIN3_HILT: PadId = 4;
    pub const PIN3_BLADE: PadId = 5;
    pub const PIN4_HILT: PadId = 6;
    pub const PIN4_BLADE: PadId = 7;
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Context-free pad behavior: a constant emit/receive pair.
fn fixed(emit: PadTypeSet, receive: PadTypeSet) -> PadTypeGenerator {
    Box::new(move |_, _, _| PadTypesSet {
        emit: PadTypes::from_types(emit),
        receive: PadTypes::from_types(receive),
    })
}

/// Passive pad: emits nothing, tolerates `receive`.
fn passive(receive: PadTypeSet) -> PadTypeGenerator {
    fixed(PadTypeSet::empty(), receive)
}

/// Pass-through pad: inherits whatever the partner pad on the same component
/// carries, looked up through the partner's nets at query time. An unwired
/// partner contributes nothing, leaving the all-permissive set.
fn pass_through(partner: PadId) -> PadTypeGenerator {
    Box::new(move |wiring, id, calc| {
        let partner_id = FullPadId {
            component: id.component.clone(),
            pad: partner,
        };
        let mut types = PadTypesSet::permissive();
        if let Some(pad) = wiring.pad(&partner_id) {
            if !wiring.nets_connected_to_pad(&partner_id).is_empty() {
                types.absorb(&pad.calc_deep_types(wiring, &partner_id, calc));
            }
        }
        types
    })
}

/// Blade connector pin: a pass-through whose types are scoped to this
/// connector instance, so pads mated through different connectors never
/// alias each other in pad-exact checks.
fn connector_pin(partner: PadId) -> PadTypeGenerator {
    let inner = pass_through(partner);
    Box::new(move |wiring, id, calc| {
        let mut types = inner(wiring, id, calc);
        types.emit.connector_id = id.component.uid;
        types.receive.connector_id = id.component.uid;
        types
    })
}

// ---------------------------------------------------------------------------
// Proffieboards
// ---------------------------------------------------------------------------

/// One row of a board pad table: name, required, emit set, receive set.
type BoardPad = (&'static str, bool, PadTypeSet, PadTypeSet);

/// Assemble a board from its pad table. Pads run down two columns of the
/// board outline, left column first.
fn board(class: ComponentClass, table: &[BoardPad]) -> Component {
    let mut component = Component::new(ComponentType::new(class));
    let half = table.len().div_ceil(2);
    for (i, &(name, required, emit, receive)) in table.iter().enumerate() {
        let position = if i < half {
            Point::new(0, i as i32)
        } else {
            Point::new(4, (i - half) as i32)
        };
        let pad = component.push_pad(name, required, position);
        component.set_pad_type_generator(pad, fixed(emit, receive));
    }
    component
}

/// A board pad that drives one bus and accepts peers on the same bus.
const fn bus(types: PadTypeSet) -> (PadTypeSet, PadTypeSet) {
    (types, types)
}

/// Construct the given Proffieboard version. Callers guard with
/// [`ComponentClass::is_board`]; anything else resolves to the latest board.
pub(crate) fn proffieboard(class: ComponentClass) -> Component {
    use PadTypeSet as T;
    let power = [
        ("BATT-", true, T::BATT_NEG, T::BATT_NEG),
        ("BATT+", true, T::BATT_POS, T::BATT_POS),
        ("3.3v", false, T::V3_3, T::V3_3),
    ];
    let serial = [
        ("TX", false, T::SER_TX, T::SER_RX),
        ("RX", false, T::SER_RX, T::SER_TX),
        ("SDA", false, T::I2C_SDA, T::I2C_SDA),
        ("SCL", false, T::I2C_SCL, T::I2C_SCL),
    ];
    let led = |n: usize| {
        let (e, r) = bus(T::LED_NEG);
        (["LED1", "LED2", "LED3", "LED4", "LED5", "LED6"][n], false, e, r)
    };
    let data = |n: usize| {
        let (e, r) = bus(T::NPXL_DATA);
        (["Data1", "Data2", "Data3", "Data4"][n], false, e, r)
    };
    let button = |n: usize| {
        let (e, r) = bus(T::BUTTON);
        (["Button1", "Button2", "Button3"][n], false, e, r)
    };
    let free = |n: usize| {
        let (e, r) = bus(T::GPIO);
        (["Free1", "Free2", "Free3"][n], false, e, r)
    };

    let mut table: Vec<BoardPad> = power.to_vec();
    match class {
        ComponentClass::ProffieboardV1 => {
            table.extend((0..6).map(led));
            table.push(data(0));
            table.extend((0..3).map(button));
            table.extend(serial);
        }
        ComponentClass::ProffieboardV2 => {
            table.push(("5v", false, T::V5, T::V5));
            table.extend((0..6).map(led));
            table.extend((0..4).map(data));
            table.extend((0..3).map(button));
            table.extend(serial);
        }
        _ => {
            table.push(("5v", false, T::V5, T::V5));
            table.extend((0..6).map(led));
            table.extend((0..2).map(data));
            table.extend((0..3).map(button));
            table.extend((0..3).map(free));
            table.extend(serial);
        }
    }
    board(
        if class.is_board() {
            class
        } else {
            ComponentClass::ProffieboardV3
        },
        &table,
    )
}

// ---------------------------------------------------------------------------
// Peripherals
// ---------------------------------------------------------------------------

fn led_strip_component() -> Component {
    use PadTypeSet as T;
    let mut c = Component::new(ComponentType::new(ComponentClass::LedStrip));
    let pos = c.push_pad("POS", true, Point::new(0, 0));
    let neg = c.push_pad("NEG", true, Point::new(0, 1));
    let data_in = c.push_pad("DATA_IN", true, Point::new(0, 2));
    let data_out = c.push_pad("DATA_OUT", false, Point::new(2, 2));
    c.set_pad_type_generator(pos, passive(T::BATT_POS | T::V5 | T::V3_3));
    c.set_pad_type_generator(neg, passive(T::BATT_NEG | T::LED_NEG));
    c.set_pad_type_generator(data_in, passive(T::NPXL_DATA | T::GPIO));
    c.set_pad_type_generator(data_out, fixed(T::NPXL_DATA, T::NPXL_DATA));
    c
}

fn button_component() -> Component {
    use PadTypeSet as T;
    let mut c = Component::new(ComponentType::new(ComponentClass::Button));
    let leg_a = c.push_pad("LEG_A", true, Point::new(0, 0));
    let leg_b = c.push_pad("LEG_B", true, Point::new(2, 0));
    c.set_pad_type_generator(leg_a, passive(T::BUTTON | T::GPIO));
    c.set_pad_type_generator(leg_b, passive(T::BATT_NEG));
    c
}

fn resistor_component() -> Component {
    let mut c = Component::new(ComponentType::new(ComponentClass::Resistor));
    let leg_a = c.push_pad("LEG_A", true, Point::new(0, 0));
    let leg_b = c.push_pad("LEG_B", true, Point::new(2, 0));
    c.set_pad_type_generator(leg_a, pass_through(resistor::LEG_B));
    c.set_pad_type_generator(leg_b, pass_through(resistor::LEG_A));
    c
}

fn blade_connector_component() -> Component {
    let mut c = Component::new(ComponentType::new(ComponentClass::BladeConnector));
    for pin in 0..4 {
        let hilt = c.push_pad(format!("PIN{}_HILT", pin + 1), false, Point::new(0, pin));
        let blade = c.push_pad(format!("PIN{}_BLADE", pin + 1), false, Point::new(2, pin));
        c.set_pad_type_generator(hilt, connector_pin(blade));
        c.set_pad_type_generator(blade, connector_pin(hilt));
    }
    c
}

/// Construct a default instance of a catalog class.
///
/// Returns `None` for board classes (those are managed through
/// [`crate::wiring::Wiring::set_proffieboard_version`]) and for custom kinds
/// the catalog does not know.
pub fn build(kind: &ComponentType) -> Option<Component> {
    match kind.class {
        ComponentClass::LedStrip => Some(led_strip_component()),
        ComponentClass::Button => Some(button_component()),
        ComponentClass::Resistor => Some(resistor_component()),
        ComponentClass::BladeConnector => Some(blade_connector_component()),
        _ => None,
    }
}
