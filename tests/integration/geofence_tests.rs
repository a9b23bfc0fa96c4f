//! Car-role geofence driven through the agent's 1 s tick.

use opensesame::app::events::AppEvent;
use opensesame::app::service::Agent;
use opensesame::config::DeviceConfig;
use opensesame::geofence::Position;
use opensesame::link::codec::MessageKind;
use opensesame::link::dispatch::Role;

use crate::mock_hw::{ManualClock, MockHw, MockRadio, RecordingSink, ScriptedGps};

const HOME: Position = Position::new(29.888130, -90.193034);
/// ~300 m due north of HOME.
const FAR: Position = Position::new(29.888130 + 0.002_697_964_8, -90.193034);
/// ~10 m due north of HOME.
const NEAR: Position = Position::new(29.888130 + 0.000_089_93, -90.193034);

struct Rig {
    radio: MockRadio,
    gps: ScriptedGps,
    hw: MockHw,
    sink: RecordingSink,
}

impl Rig {
    fn new() -> Self {
        Self {
            radio: MockRadio::new(),
            gps: ScriptedGps::new(),
            hw: MockHw::new(),
            sink: RecordingSink::new(),
        }
    }

    /// Advance one second and run one loop iteration.
    fn second(&mut self, agent: &mut Agent<&ManualClock>, clock: &ManualClock) {
        clock.advance(1000);
        agent.run_once(&mut self.radio, &mut self.gps, &mut self.hw, &mut self.sink);
    }

    fn triggers(&self) -> Vec<u16> {
        self.radio
            .sent_messages()
            .iter()
            .filter(|m| m.kind == MessageKind::Trigger)
            .map(|m| m.id)
            .collect()
    }
}

#[test]
fn leave_then_return_fires_exactly_one_broadcast_trigger() {
    let clock = ManualClock::at(10_000);
    let mut car = Agent::new(&DeviceConfig::default(), &clock);
    let mut rig = Rig::new();

    // Parked at home: never arms.
    rig.gps.move_to(HOME);
    for _ in 0..3 {
        rig.second(&mut car, &clock);
    }
    let fence = car.geofence().expect("car has a geofence");
    assert!(!fence.is_armed());

    // Drive away.
    rig.gps.move_to(FAR);
    rig.second(&mut car, &clock);
    let fence = car.geofence().expect("car has a geofence");
    assert!(fence.is_armed());
    assert!(!fence.has_fired());
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::ZoneArmed { .. })), 1);
    assert!(rig.radio.sent.is_empty());

    // Come back.
    rig.gps.move_to(NEAR);
    rig.second(&mut car, &clock);
    assert!(car.geofence().is_some_and(|g| g.has_fired()));
    let sent = rig.radio.sent_messages();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].kind, MessageKind::Trigger);
    assert_eq!(sent[0].target, 0, "trigger is a broadcast");
    assert_eq!(car.tracker().len(), 1, "trigger awaits an ack");

    // Idling in the driveway sends no new trigger (retries keep the id).
    for _ in 0..12 {
        rig.second(&mut car, &clock);
    }
    let ids = rig.triggers();
    assert!(ids.len() > 1, "unacked trigger is retried");
    assert!(ids.iter().all(|&id| id == ids[0]));
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::TriggerSent { .. })), 1);
}

#[test]
fn garage_ack_stops_trigger_retries() {
    let clock = ManualClock::at(20_000);
    let mut car = Agent::new(&DeviceConfig::default(), &clock);
    let mut garage = Agent::new(
        &DeviceConfig {
            mode: Role::Garage,
            ..DeviceConfig::default()
        },
        &clock,
    );
    let mut rig = Rig::new();
    let (mut garage_radio, mut garage_hw, mut garage_sink) =
        (MockRadio::new(), MockHw::new(), RecordingSink::new());

    rig.gps.move_to(FAR);
    rig.second(&mut car, &clock);
    rig.gps.move_to(NEAR);
    rig.second(&mut car, &clock);

    for packet in rig.radio.take_sent() {
        garage.handle_packet(&packet, &mut garage_radio, &mut garage_hw, &mut garage_sink);
    }
    assert_eq!(garage_hw.pulses.len(), 1);

    for packet in garage_radio.take_sent() {
        rig.radio.deliver_raw(&packet);
    }
    rig.second(&mut car, &clock);
    assert!(car.tracker().is_empty());

    for _ in 0..10 {
        rig.second(&mut car, &clock);
    }
    assert!(rig.radio.sent.is_empty());
}

#[test]
fn no_fix_means_no_evaluation() {
    let clock = ManualClock::at(0);
    let mut car = Agent::new(&DeviceConfig::default(), &clock);
    let mut rig = Rig::new();

    for _ in 0..5 {
        rig.second(&mut car, &clock);
    }
    assert!(rig.gps.updates >= 5, "GPS is polled every iteration");
    assert!(car.geofence().is_some_and(|g| !g.is_armed()));

    // Losing the fix mid-drive freezes the state machine.
    rig.gps.move_to(FAR);
    rig.second(&mut car, &clock);
    rig.gps.lose_fix();
    for _ in 0..5 {
        rig.second(&mut car, &clock);
    }
    assert!(car.geofence().is_some_and(|g| g.is_armed() && !g.has_fired()));
    assert!(rig.radio.sent.is_empty());
}

#[test]
fn garage_never_polls_gps() {
    let clock = ManualClock::at(0);
    let mut garage = Agent::new(
        &DeviceConfig {
            mode: Role::Garage,
            ..DeviceConfig::default()
        },
        &clock,
    );
    let mut rig = Rig::new();
    rig.gps.move_to(NEAR);
    for _ in 0..5 {
        rig.second(&mut garage, &clock);
    }
    assert_eq!(rig.gps.updates, 0);
    assert!(garage.geofence().is_none());
    assert!(rig.radio.sent.is_empty());
}
