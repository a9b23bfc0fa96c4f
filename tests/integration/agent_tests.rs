//! Agent-level flows: request/reply, acknowledgement, retransmission and
//! the failure paths that must never stop the loop.

use std::time::Duration;

use opensesame::app::events::AppEvent;
use opensesame::app::service::Agent;
use opensesame::config::DeviceConfig;
use opensesame::error::{Error, RadioError};
use opensesame::link::codec::{DecodeError, Message, MessageKind};
use opensesame::link::dispatch::{Reaction, Role};

use crate::mock_hw::{ManualClock, MockHw, MockRadio, RecordingSink, ScriptedGps};

fn config(mode: Role, channel: u16) -> DeviceConfig {
    DeviceConfig {
        mode,
        channel,
        ..DeviceConfig::default()
    }
}

fn msg(id: u16, kind: MessageKind, target: u16) -> Message {
    Message {
        id,
        channel: 1,
        kind,
        target,
    }
}

// ── Two-node round trip ───────────────────────────────────────

#[test]
fn ping_pong_ack_round_trip_clears_both_trackers() {
    let clock = ManualClock::at(4242);
    let mut car = Agent::new(&config(Role::Car, 1), &clock);
    let mut garage = Agent::new(&config(Role::Garage, 1), &clock);
    let (mut car_radio, mut garage_radio) = (MockRadio::new(), MockRadio::new());
    let (mut car_hw, mut garage_hw) = (MockHw::new(), MockHw::new());
    let mut sink = RecordingSink::new();

    let ping = car.send_command(&mut car_radio, MessageKind::Ping, &mut sink);
    assert_eq!(ping, msg(4242, MessageKind::Ping, 0));
    assert!(car.tracker().get(4242).is_some());

    // Garage answers the ping with a Pong aimed at 4242.
    clock.set(4300);
    for packet in car_radio.take_sent() {
        garage.handle_packet(&packet, &mut garage_radio, &mut garage_hw, &mut sink);
    }
    let pong = garage_radio.sent_messages()[0];
    assert_eq!(pong, msg(4300, MessageKind::Pong, 4242));
    assert_eq!(garage.tracker().len(), 1, "pong awaits its ack");

    // Car drops 4242 and acks the pong.
    clock.set(4400);
    for packet in garage_radio.take_sent() {
        let reaction = car.handle_packet(&packet, &mut car_radio, &mut car_hw, &mut sink);
        assert_eq!(reaction, Some(Reaction::Reply(MessageKind::Ack)));
    }
    assert!(car.tracker().is_empty());
    let ack = car_radio.sent_messages()[0];
    assert_eq!(ack, msg(4400, MessageKind::Ack, 4300));
    assert!(car.tracker().is_empty(), "acks are never tracked");

    // Garage drops the pong on the ack.
    for packet in car_radio.take_sent() {
        let reaction = garage.handle_packet(&packet, &mut garage_radio, &mut garage_hw, &mut sink);
        assert_eq!(reaction, Some(Reaction::Acknowledged));
    }
    assert!(garage.tracker().is_empty());
    assert!(garage_radio.sent.is_empty(), "nothing answers an ack");

    assert_eq!(car_hw.blinks, 1);
    assert_eq!(garage_hw.blinks, 2);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::Acknowledged { .. })),
        2
    );
}

// ── Role dispatch ─────────────────────────────────────────────

#[test]
fn garage_trigger_pulses_relay_once_and_acks() {
    let clock = ManualClock::at(7000);
    let mut garage = Agent::new(&config(Role::Garage, 1), &clock);
    let (mut radio, mut hw, mut sink) = (MockRadio::new(), MockHw::new(), RecordingSink::new());

    let reaction = garage.handle_packet(
        &opensesame::link::codec::encode(&msg(99, MessageKind::Trigger, 0)),
        &mut radio,
        &mut hw,
        &mut sink,
    );

    assert_eq!(reaction, Some(Reaction::OpenDoor));
    assert_eq!(hw.pulses, vec![Duration::from_millis(100)]);
    assert_eq!(radio.sent_messages(), vec![msg(7000, MessageKind::Ack, 99)]);
    assert_eq!(hw.blinks, 1);
    assert!(garage.tracker().is_empty());
    assert!(sink.events.contains(&AppEvent::RelayPulsed { duration_ms: 100 }));
}

#[test]
fn car_ignores_trigger_without_reply_or_blink() {
    let clock = ManualClock::at(7000);
    let mut car = Agent::new(&config(Role::Car, 1), &clock);
    let (mut radio, mut hw, mut sink) = (MockRadio::new(), MockHw::new(), RecordingSink::new());

    radio.deliver(&msg(99, MessageKind::Trigger, 0));
    car.poll_radio(&mut radio, &mut hw, &mut sink);

    assert!(hw.pulses.is_empty());
    assert!(radio.sent.is_empty());
    assert_eq!(hw.blinks, 0);
    assert_eq!(
        sink.events,
        vec![AppEvent::UnhandledCommand {
            kind: MessageKind::Trigger,
            role: Role::Car,
        }]
    );
}

#[test]
fn any_reply_kind_acknowledges_its_target() {
    let clock = ManualClock::at(1000);
    let mut car = Agent::new(&config(Role::Car, 1), &clock);
    let (mut radio, mut hw, mut sink) = (MockRadio::new(), MockHw::new(), RecordingSink::new());

    car.send_command(&mut radio, MessageKind::Ping, &mut sink);
    assert_eq!(car.tracker().len(), 1);

    // A Ping that happens to target our id still clears it.
    clock.set(1500);
    radio.deliver(&msg(555, MessageKind::Ping, 1000));
    car.poll_radio(&mut radio, &mut hw, &mut sink);

    assert!(car.tracker().get(1000).is_none());
    assert!(sink.events.contains(&AppEvent::Acknowledged {
        id: 1000,
        by: MessageKind::Ping,
    }));
    // ... and is itself answered with a tracked Pong.
    assert_eq!(radio.sent_messages()[1], msg(1500, MessageKind::Pong, 555));
    assert_eq!(car.tracker().len(), 1);
}

// ── Filtering and malformed input ─────────────────────────────

#[test]
fn foreign_channel_traffic_is_invisible() {
    let clock = ManualClock::at(4242);
    let mut car = Agent::new(&config(Role::Car, 1), &clock);
    let (mut radio, mut hw, mut sink) = (MockRadio::new(), MockHw::new(), RecordingSink::new());

    car.send_command(&mut radio, MessageKind::Ping, &mut sink);
    sink.clear();

    let foreign = Message {
        channel: 2,
        ..msg(1, MessageKind::Pong, 4242)
    };
    radio.deliver(&foreign);
    car.poll_radio(&mut radio, &mut hw, &mut sink);

    assert!(car.tracker().get(4242).is_some(), "other channel cannot ack us");
    assert_eq!(radio.sent.len(), 1);
    assert_eq!(hw.blinks, 0);
    assert!(sink.events.is_empty());
}

#[test]
fn malformed_packets_are_dropped_and_reported() {
    let clock = ManualClock::at(0);
    let mut garage = Agent::new(&config(Role::Garage, 1), &clock);
    let (mut radio, mut hw, mut sink) = (MockRadio::new(), MockHw::new(), RecordingSink::new());

    radio.deliver_raw(&[0; 7]);
    radio.deliver_raw(&[0; 9]);
    radio.deliver_raw(&[1, 0, 1, 0, 7, 0, 0, 0]);
    for _ in 0..3 {
        garage.poll_radio(&mut radio, &mut hw, &mut sink);
    }

    assert_eq!(
        sink.events,
        vec![
            AppEvent::PacketRejected(DecodeError::BadLength(7)),
            AppEvent::PacketRejected(DecodeError::BadLength(9)),
            AppEvent::PacketRejected(DecodeError::BadKind(7)),
        ]
    );
    assert!(radio.sent.is_empty());
    assert!(hw.pulses.is_empty());
    assert_eq!(hw.blinks, 0);
}

// ── Retransmission ────────────────────────────────────────────

#[test]
fn unacked_ping_is_resent_with_same_id_until_acked() {
    let clock = ManualClock::at(1000);
    let mut car = Agent::new(&config(Role::Car, 1), &clock);
    let (mut radio, mut gps, mut hw, mut sink) = (
        MockRadio::new(),
        ScriptedGps::new(),
        MockHw::new(),
        RecordingSink::new(),
    );

    car.send_command(&mut radio, MessageKind::Ping, &mut sink);

    // Ticks before the ack timeout leave it alone.
    for _ in 0..4 {
        clock.advance(1000);
        car.run_once(&mut radio, &mut gps, &mut hw, &mut sink);
    }
    assert_eq!(radio.sent.len(), 1);

    clock.advance(1000);
    car.run_once(&mut radio, &mut gps, &mut hw, &mut sink);
    let sent = radio.sent_messages();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1], sent[0], "retransmit is byte-identical");
    assert_eq!(car.tracker().get(1000).map(|e| e.created_at_ms), Some(6000));
    assert!(sink.events.contains(&AppEvent::Retransmitted(sent[0])));

    // The timestamp was reset, so the next retry is a full timeout later.
    clock.advance(4000);
    car.run_once(&mut radio, &mut gps, &mut hw, &mut sink);
    assert_eq!(radio.sent.len(), 2);
    clock.advance(1000);
    car.run_once(&mut radio, &mut gps, &mut hw, &mut sink);
    assert_eq!(radio.sent.len(), 3);

    // Ack arrives; no more retries.
    radio.deliver(&msg(8, MessageKind::Ack, 1000));
    clock.advance(1000);
    car.run_once(&mut radio, &mut gps, &mut hw, &mut sink);
    assert!(car.tracker().is_empty());
    for _ in 0..20 {
        clock.advance(1000);
        car.run_once(&mut radio, &mut gps, &mut hw, &mut sink);
    }
    assert_eq!(radio.sent.len(), 3);
}

#[test]
fn unanswered_replies_never_push_out_older_entries() {
    let clock = ManualClock::at(100);
    let mut garage = Agent::new(&config(Role::Garage, 1), &clock);
    let (mut radio, mut gps, mut hw, mut sink) = (
        MockRadio::new(),
        ScriptedGps::new(),
        MockHw::new(),
        RecordingSink::new(),
    );

    // The car keeps pinging but never hears a pong back.
    for i in 0..20u64 {
        clock.set(100 + i * 7);
        radio.deliver(&msg(500 + i as u16, MessageKind::Ping, 0));
        garage.poll_radio(&mut radio, &mut hw, &mut sink);
    }
    assert_eq!(garage.tracker().len(), 20);
    assert!(garage.tracker().get(100).is_some(), "first pong still outstanding");

    radio.take_sent();
    clock.set(1_000_000);
    garage.run_once(&mut radio, &mut gps, &mut hw, &mut sink);
    let resent = radio.sent_messages();
    assert_eq!(resent.len(), 20);
    assert!(resent.contains(&msg(100, MessageKind::Pong, 500)));
}

// ── Port failures never stop the loop ─────────────────────────

#[test]
fn failed_send_is_reported_and_retried_later() {
    let clock = ManualClock::at(2000);
    let mut car = Agent::new(&config(Role::Car, 1), &clock);
    let (mut radio, mut gps, mut hw, mut sink) = (
        MockRadio::new(),
        ScriptedGps::new(),
        MockHw::new(),
        RecordingSink::new(),
    );

    radio.fail_sends = true;
    car.send_command(&mut radio, MessageKind::Ping, &mut sink);
    assert_eq!(
        sink.events,
        vec![AppEvent::PortFailure(Error::Radio(RadioError::SendFailed))]
    );
    assert_eq!(car.tracker().len(), 1);

    radio.fail_sends = false;
    clock.advance(5000);
    car.run_once(&mut radio, &mut gps, &mut hw, &mut sink);
    assert_eq!(radio.sent_messages(), vec![msg(2000, MessageKind::Ping, 0)]);
}

#[test]
fn receive_failure_is_reported_and_loop_continues() {
    let clock = ManualClock::at(0);
    let mut garage = Agent::new(&config(Role::Garage, 1), &clock);
    let (mut radio, mut gps, mut hw, mut sink) = (
        MockRadio::new(),
        ScriptedGps::new(),
        MockHw::new(),
        RecordingSink::new(),
    );

    radio.fail_receives = true;
    garage.run_once(&mut radio, &mut gps, &mut hw, &mut sink);
    assert_eq!(
        sink.events,
        vec![AppEvent::PortFailure(Error::Radio(RadioError::ReceiveFailed))]
    );

    radio.fail_receives = false;
    radio.deliver(&msg(31, MessageKind::Ping, 0));
    garage.run_once(&mut radio, &mut gps, &mut hw, &mut sink);
    assert_eq!(radio.sent_messages(), vec![msg(1, MessageKind::Pong, 31)]);
}

#[test]
fn start_announces_role_and_channel() {
    let clock = ManualClock::at(0);
    let mut garage = Agent::new(&config(Role::Garage, 9), &clock);
    let mut sink = RecordingSink::new();
    garage.start(&mut sink);
    assert_eq!(
        sink.events,
        vec![AppEvent::Started {
            role: Role::Garage,
            channel: 9,
        }]
    );
    assert_eq!(garage.role(), Role::Garage);
}
