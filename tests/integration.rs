//! Integration tests for the wiring model.
//!
//! Exercises the full pipeline: build a wiring, add catalog components,
//! connect nets with compatibility checking, route and edit wire chains,
//! and snapshot/restore net state.

use proffiewire::catalog::{button, led_strip, resistor};
use proffiewire::{
    ComponentClass, ComponentId, ComponentType, Connection, Direction, FullPadId, NetSave, Point,
    TypeCalc, WireEnd, WireSpan, Wiring, WiringError,
};

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Pad id of a board pad, looked up by its printed name.
fn board_pad(wiring: &Wiring, name: &str) -> FullPadId {
    let board = wiring
        .component(wiring.proffieboard_id())
        .expect("wiring always holds a board");
    let pad = board.pad_named(name).expect("board pad name");
    board.pad_id(pad)
}

fn add(wiring: &mut Wiring, class: ComponentClass) -> ComponentId {
    wiring
        .add_component_of(&ComponentType::new(class))
        .expect("catalog builds this class")
}

fn pad_of(id: &ComponentId, pad: usize) -> FullPadId {
    FullPadId {
        component: id.clone(),
        pad,
    }
}

// ---------------------------------------------------------------------------
// Components and compatibility
// ---------------------------------------------------------------------------

#[test]
fn new_wiring_holds_a_v3_board_with_unwired_power_pads() {
    let wiring = Wiring::new();
    assert_eq!(
        wiring.proffieboard_id().kind.class,
        ComponentClass::ProffieboardV3
    );
    let unwired = wiring.validate();
    assert!(unwired.contains(&board_pad(&wiring, "BATT-")));
    assert!(unwired.contains(&board_pad(&wiring, "BATT+")));
}

#[test]
fn compatible_pads_connect_and_incompatible_pads_roll_back() {
    init_logs();
    let mut wiring = Wiring::new();
    let strip = add(&mut wiring, ComponentClass::LedStrip);
    let pos = pad_of(&strip, led_strip::POS);

    // Battery negative cannot feed the strip's positive rail.
    let err = wiring.add_net(
        Connection::Pad(board_pad(&wiring, "BATT-")),
        Connection::Pad(pos.clone()),
    );
    assert_eq!(err, Err(WiringError::Incompatible));
    // A failed add leaves no trace: no net, clean reverse index.
    assert_eq!(wiring.nets().count(), 0);
    assert!(wiring.nets_connected_to_pad(&pos).is_empty());

    let uid = wiring
        .add_net(
            Connection::Pad(board_pad(&wiring, "BATT+")),
            Connection::Pad(pos.clone()),
        )
        .expect("positive rail feeds the strip");
    assert_eq!(wiring.nets_connected_to_pad(&pos).len(), 1);
    assert!(wiring.net(uid).expect("net exists").is_bound());
}

#[test]
fn button_wires_between_button_pad_and_ground() {
    let mut wiring = Wiring::new();
    let btn = add(&mut wiring, ComponentClass::Button);
    wiring
        .add_net(
            Connection::Pad(board_pad(&wiring, "Button1")),
            Connection::Pad(pad_of(&btn, button::LEG_A)),
        )
        .expect("button leg accepts the button pad");
    wiring
        .add_net(
            Connection::Pad(board_pad(&wiring, "BATT-")),
            Connection::Pad(pad_of(&btn, button::LEG_B)),
        )
        .expect("other leg goes to ground");
    // Both required legs wired: the button no longer shows up unwired.
    assert!(!wiring
        .validate()
        .iter()
        .any(|pad| pad.component == btn));
}

#[test]
fn resistor_leg_inherits_the_other_legs_types() {
    init_logs();
    let mut wiring = Wiring::new();
    let res = add(&mut wiring, ComponentClass::Resistor);
    let strip = add(&mut wiring, ComponentClass::LedStrip);
    wiring
        .add_net(
            Connection::Pad(board_pad(&wiring, "BATT+")),
            Connection::Pad(pad_of(&res, resistor::LEG_A)),
        )
        .expect("resistors connect to anything");

    // The free leg now carries battery positive through the resistor, so it
    // cannot reach the strip's negative pad...
    assert_eq!(
        wiring.add_net(
            Connection::Pad(pad_of(&res, resistor::LEG_B)),
            Connection::Pad(pad_of(&strip, led_strip::NEG)),
        ),
        Err(WiringError::Incompatible)
    );
    // ...but feeds the positive rail fine.
    wiring
        .add_net(
            Connection::Pad(pad_of(&res, resistor::LEG_B)),
            Connection::Pad(pad_of(&strip, led_strip::POS)),
        )
        .expect("inherited positive reaches the positive rail");
}

#[test]
fn mutually_wired_resistors_terminate_type_calculation() {
    let mut wiring = Wiring::new();
    let r1 = add(&mut wiring, ComponentClass::Resistor);
    let r2 = add(&mut wiring, ComponentClass::Resistor);
    // A resistor loop: every deep type query would recurse forever without
    // the cycle guard.
    wiring
        .add_net(
            Connection::Pad(pad_of(&r1, resistor::LEG_A)),
            Connection::Pad(pad_of(&r2, resistor::LEG_A)),
        )
        .expect("first loop edge");
    wiring
        .add_net(
            Connection::Pad(pad_of(&r1, resistor::LEG_B)),
            Connection::Pad(pad_of(&r2, resistor::LEG_B)),
        )
        .expect("second loop edge");

    let leg = pad_of(&r1, resistor::LEG_A);
    let pad = wiring.pad(&leg).expect("leg exists");
    // Termination is the property under test.
    let _ = pad.calc_deep_types(&wiring, &leg, &mut TypeCalc::new());
}

#[test]
fn removing_a_component_cascades_to_its_nets() {
    let mut wiring = Wiring::new();
    let strip = add(&mut wiring, ComponentClass::LedStrip);
    let batt = board_pad(&wiring, "BATT+");
    wiring
        .add_net(
            Connection::Pad(batt.clone()),
            Connection::Pad(pad_of(&strip, led_strip::POS)),
        )
        .expect("strip power");

    wiring.remove_component(&strip).expect("strip removal");
    assert!(wiring.component(&strip).is_none());
    assert_eq!(wiring.nets().count(), 0);
    assert!(wiring.nets_connected_to_pad(&batt).is_empty());

    let board = wiring.proffieboard_id().clone();
    assert_eq!(
        wiring.remove_component(&board),
        Err(WiringError::BoardRemoval)
    );
}

#[test]
fn board_version_swap_drops_board_wiring_only() {
    let mut wiring = Wiring::new();
    let strip = add(&mut wiring, ComponentClass::LedStrip);
    wiring
        .add_net(
            Connection::Pad(board_pad(&wiring, "BATT+")),
            Connection::Pad(pad_of(&strip, led_strip::POS)),
        )
        .expect("strip power");

    let old_board = wiring.proffieboard_id().clone();
    let same = wiring
        .set_proffieboard_version(ComponentClass::ProffieboardV3)
        .expect("same class is a no-op");
    assert_eq!(same, old_board);

    let new_board = wiring
        .set_proffieboard_version(ComponentClass::ProffieboardV2)
        .expect("downgrade");
    assert_ne!(new_board, old_board);
    assert!(wiring.component(&old_board).is_none());
    assert!(wiring.component(&strip).is_some());
    assert_eq!(wiring.nets().count(), 0);

    assert_eq!(
        wiring.set_proffieboard_version(ComponentClass::Button),
        Err(WiringError::NotABoard(ComponentClass::Button))
    );
}

// ---------------------------------------------------------------------------
// Net lifecycle and routing
// ---------------------------------------------------------------------------

/// Bound net between battery negative and the strip's negative pad, with a
/// three-wire chain routed from the board side.
fn routed_fixture() -> (Wiring, proffiewire::Uid, FullPadId, FullPadId) {
    let mut wiring = Wiring::new();
    let strip = add(&mut wiring, ComponentClass::LedStrip);
    let start = board_pad(&wiring, "BATT-");
    let end = pad_of(&strip, led_strip::NEG);
    let uid = wiring
        .add_net(Connection::Pad(start.clone()), Connection::Pad(end.clone()))
        .expect("ground net");
    wiring
        .add_wire(uid, WireEnd::End, 5, Some(Direction::Horizontal), false)
        .expect("first wire");
    wiring
        .add_wire(uid, WireEnd::End, 4, None, false)
        .expect("second wire");
    wiring
        .add_wire(uid, WireEnd::End, 3, None, false)
        .expect("third wire");
    (wiring, uid, start, end)
}

#[test]
fn disconnecting_both_ends_removes_the_net() {
    let mut wiring = Wiring::new();
    let strip = add(&mut wiring, ComponentClass::LedStrip);
    let start = board_pad(&wiring, "BATT+");
    let end = pad_of(&strip, led_strip::POS);
    let uid = wiring
        .add_net(Connection::Pad(start.clone()), Connection::Pad(end.clone()))
        .expect("strip power");

    wiring
        .set_connection(uid, WireEnd::Start, Connection::Disconnected)
        .expect("dangling is legal");
    assert!(wiring.net(uid).expect("still present").is_dangling());
    assert!(wiring.nets_connected_to_pad(&start).is_empty());

    wiring
        .set_connection(uid, WireEnd::End, Connection::Disconnected)
        .expect("second disconnect");
    assert!(wiring.net(uid).is_none());
    assert!(wiring.nets_connected_to_pad(&end).is_empty());

    assert_eq!(
        wiring.add_net(Connection::Disconnected, Connection::Disconnected),
        Err(WiringError::BothEndsDisconnected)
    );
}

#[test]
fn wire_chain_anchors_at_the_opposite_pad() {
    let (wiring, uid, start, _) = routed_fixture();
    let net = wiring.net(uid).expect("routed net");
    let anchor = wiring.pad_position(&start).expect("board pad position");
    let (chain_start, chain_end) = net.endpoints().expect("routed");
    assert_eq!(chain_start, anchor);
    assert_eq!(chain_end, anchor + Point::new(8, 4));
    assert_eq!(net.wires().len(), 3);
}

#[test]
fn shrinking_a_wire_to_zero_prunes_it() {
    let (mut wiring, uid, ..) = routed_fixture();
    // Third wire has length 3; shrinking by 3 zeroes it out.
    wiring
        .extend_wire(uid, WireEnd::End, -3, true)
        .expect("shrink");
    assert_eq!(wiring.net(uid).expect("net survives").wires().len(), 2);

    // Moving the middle wire is fine too; tracked pruning keeps indices
    // valid.
    wiring.move_wire(uid, 1, 2, true).expect("move");
    assert_eq!(wiring.net(uid).expect("net survives").wires().len(), 2);
}

#[test]
fn deleting_an_interior_wire_splits_the_net() {
    init_logs();
    let (mut wiring, uid, start, end) = routed_fixture();
    let tail_uid = wiring
        .delete_wire(uid, 1)
        .expect("interior delete")
        .expect("split produces a tail net");

    let head = wiring.net(uid).expect("head net");
    assert_eq!(head.connection(WireEnd::Start).pad(), Some(&start));
    assert!(head.connection(WireEnd::End).is_disconnected());
    assert_eq!(head.wires(), &[WireSpan::new(0, 5)]);

    let tail = wiring.net(tail_uid).expect("tail net");
    assert!(tail.connection(WireEnd::Start).is_disconnected());
    assert_eq!(tail.connection(WireEnd::End).pad(), Some(&end));
    assert_eq!(tail.wires().len(), 1);
    assert_eq!(tail.start_dir(), head.start_dir());

    // Reverse index followed the End connection to the tail.
    assert_eq!(
        wiring.nets_connected_to_pad(&end),
        std::collections::HashSet::from([tail_uid])
    );
    assert_eq!(
        wiring.nets_connected_to_pad(&start),
        std::collections::HashSet::from([uid])
    );
}

#[test]
fn deleting_a_boundary_wire_disconnects_that_end() {
    let (mut wiring, uid, start, end) = routed_fixture();
    assert_eq!(wiring.delete_wire(uid, 2), Ok(None));
    let net = wiring.net(uid).expect("net survives");
    assert!(net.connection(WireEnd::End).is_disconnected());
    assert_eq!(net.wires().len(), 2);
    assert!(wiring.nets_connected_to_pad(&end).is_empty());

    assert_eq!(wiring.delete_wire(uid, 9), Err(WiringError::WireOutOfRange));
    // Start is the only remaining connection; losing its boundary wire
    // disconnects it and the net goes with it.
    assert_eq!(wiring.delete_wire(uid, 0), Ok(None));
    assert!(wiring.net(uid).is_none());
    assert!(wiring.nets_connected_to_pad(&start).is_empty());
}

#[test]
fn deleting_the_sole_wire_of_a_bound_net_leaves_it_dangling() {
    let mut wiring = Wiring::new();
    let strip = add(&mut wiring, ComponentClass::LedStrip);
    let start = board_pad(&wiring, "BATT+");
    let end = pad_of(&strip, led_strip::POS);
    let uid = wiring
        .add_net(Connection::Pad(start.clone()), Connection::Pad(end.clone()))
        .expect("strip power");
    wiring
        .add_wire(uid, WireEnd::End, 5, Some(Direction::Horizontal), false)
        .expect("sole wire");

    // A sole wire counts as the Start boundary: only that end disconnects,
    // and the still-bound End keeps the net alive.
    assert_eq!(wiring.delete_wire(uid, 0), Ok(None));
    let net = wiring.net(uid).expect("net survives dangling");
    assert!(net.connection(WireEnd::Start).is_disconnected());
    assert_eq!(net.connection(WireEnd::End).pad(), Some(&end));
    assert!(net.is_dangling());
    assert!(!net.is_routed());
    assert!(wiring.nets_connected_to_pad(&start).is_empty());
    assert_eq!(wiring.nets_connected_to_pad(&end).len(), 1);
}

#[test]
fn zero_length_wire_is_a_no_op_even_without_an_anchor() {
    let mut wiring = Wiring::new();
    let strip = add(&mut wiring, ComponentClass::LedStrip);
    let uid = wiring
        .add_net(
            Connection::Pad(board_pad(&wiring, "BATT+")),
            Connection::Pad(pad_of(&strip, led_strip::POS)),
        )
        .expect("strip power");
    wiring
        .set_connection(uid, WireEnd::End, Connection::Disconnected)
        .expect("dangling is legal");

    // Unrouted, and the opposite end of Start is Disconnected: a first wire
    // could not be anchored, but the tolerated zero-length call still
    // succeeds without touching the chain.
    wiring
        .add_wire(uid, WireEnd::Start, 0, None, true)
        .expect("zero length is a no-op");
    assert!(!wiring.net(uid).expect("net unchanged").is_routed());
    assert_eq!(
        wiring.add_wire(uid, WireEnd::Start, 4, None, true),
        Err(WiringError::NoAnchor)
    );
}

#[test]
fn moving_a_component_drags_its_wire_anchors() {
    let mut wiring = Wiring::new();
    let strip = add(&mut wiring, ComponentClass::LedStrip);
    let pos = pad_of(&strip, led_strip::POS);
    let uid = wiring
        .add_net(Connection::Pad(pos.clone()), Connection::Pad(board_pad(&wiring, "BATT+")))
        .expect("strip power");
    wiring
        .add_wire(uid, WireEnd::End, 6, Some(Direction::Horizontal), false)
        .expect("anchored at the strip pad");
    wiring
        .add_wire(uid, WireEnd::End, 2, None, false)
        .expect("second wire");

    wiring
        .move_component(&strip, Point::new(3, 1))
        .expect("move");
    let net = wiring.net(uid).expect("net survives the move");
    let (chain_start, _) = net.endpoints().expect("routed");
    assert_eq!(
        chain_start,
        wiring.pad_position(&pos).expect("pad position")
    );
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

#[test]
fn net_save_round_trips_through_json() {
    let (mut wiring, uid, start, end) = routed_fixture();
    let save = wiring.gen_net_save(uid).expect("snapshot");
    let json = save.to_json();
    let parsed = NetSave::from_json(&json).expect("parse back");
    assert_eq!(parsed, save);

    wiring.remove_net(uid).expect("drop the net");
    assert!(wiring.net(uid).is_none());

    wiring.load_net_save(&parsed).expect("restore");
    let net = wiring.net(uid).expect("restored under its old uid");
    assert_eq!(net.connection(WireEnd::Start).pad(), Some(&start));
    assert_eq!(net.connection(WireEnd::End).pad(), Some(&end));
    assert_eq!(net.wires(), save.archive.wires.as_slice());
    assert_eq!(net.offset(), save.archive.offset);
    assert_eq!(net.start_dir(), save.archive.start_dir);
    assert_eq!(wiring.nets_connected_to_pad(&end).len(), 1);
}
