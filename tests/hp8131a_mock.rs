//! Mock-backed integration tests for the HP 8131A driver.
//!
//! Exercises the full accessor path (command table → rendering → transport
//! → reply coercion → cached parameter refresh) and the health state
//! machine against the simulated instrument.

use pulse_daq::commands::{PulseProperty, TriggerMode, TriggerSlope};
use pulse_daq::core::{HealthState, Instrument};
use pulse_daq::instruments::Hp8131a;
use pulse_daq::transport::MockPulseGen;
use pulse_daq::value::PropertyValue;

fn connected_device() -> (Hp8131a, MockPulseGen) {
    let mock = MockPulseGen::new();
    let device = Hp8131a::with_transport("pulsegen", Box::new(mock.clone()));
    (device, mock)
}

#[tokio::test]
async fn numeric_write_read_round_trip() {
    let (mut device, _mock) = connected_device();

    let cases = [
        (PulseProperty::Period, 2e-9),
        (PulseProperty::Period, 99.9e-3),
        (PulseProperty::Delay1, 0.0),
        (PulseProperty::Low1, -5.0),
        (PulseProperty::High1, 4.9),
        (PulseProperty::Width2, 5e-7),
    ];

    for (property, value) in cases {
        device
            .write(property, PropertyValue::Float(value))
            .await
            .unwrap();
        let read_back = device.read(property).await.unwrap();
        assert_eq!(
            read_back,
            PropertyValue::Float(value),
            "{} did not round-trip",
            property.name()
        );
    }
}

#[tokio::test]
async fn boolean_write_read_round_trip() {
    let (mut device, mock) = connected_device();

    device
        .write(PulseProperty::Enabled1, PropertyValue::Bool(true))
        .await
        .unwrap();
    // The wire carries 0/1 on writes, ON/OFF on reads.
    assert_eq!(
        mock.register(":OUTP1:PULS:STAT").as_deref(),
        Some("1")
    );
    assert_eq!(
        device.read(PulseProperty::Enabled1).await.unwrap(),
        PropertyValue::Bool(true)
    );

    device
        .write(PulseProperty::Enabled1, PropertyValue::Bool(false))
        .await
        .unwrap();
    assert_eq!(
        device.read(PulseProperty::Enabled1).await.unwrap(),
        PropertyValue::Bool(false)
    );
}

#[tokio::test]
async fn enumerated_write_read_round_trip() {
    let (mut device, mock) = connected_device();

    for mode in TriggerMode::ALL {
        device
            .write(PulseProperty::TriggerMode, PropertyValue::TriggerMode(mode))
            .await
            .unwrap();
        assert_eq!(
            device.read(PulseProperty::TriggerMode).await.unwrap(),
            PropertyValue::TriggerMode(mode)
        );
    }

    device
        .write(
            PulseProperty::TriggerSlope,
            PropertyValue::TriggerSlope(TriggerSlope::Negative),
        )
        .await
        .unwrap();
    assert_eq!(
        mock.register(":INP:TRIG:SLOP").as_deref(),
        Some("NEGATIVE")
    );
    assert_eq!(
        device.read(PulseProperty::TriggerSlope).await.unwrap(),
        PropertyValue::TriggerSlope(TriggerSlope::Negative)
    );
}

#[tokio::test]
async fn accessors_use_declared_command_forms() {
    let (mut device, mock) = connected_device();

    device
        .write(PulseProperty::Width1, PropertyValue::Float(5e-7))
        .await
        .unwrap();
    device.read(PulseProperty::Width1).await.unwrap();

    let traffic = mock.traffic();
    assert_eq!(traffic[0], ":PULS1:TIM:WIDT 5E-7");
    assert_eq!(traffic[1], ":PULS1:TIM:WIDT?");
}

#[tokio::test]
async fn out_of_range_write_is_rejected_before_sending() {
    let (mut device, mock) = connected_device();

    assert!(device
        .write(PulseProperty::Period, PropertyValue::Float(1.0))
        .await
        .is_err());
    assert!(device
        .write(PulseProperty::Low1, PropertyValue::Float(5.0))
        .await
        .is_err());
    assert!(mock.traffic().is_empty());

    // Bound edges are valid.
    device
        .write(PulseProperty::Low1, PropertyValue::Float(4.9))
        .await
        .unwrap();
    assert_eq!(mock.traffic().len(), 1);
}

#[tokio::test]
async fn initialization_success_and_failure() {
    let (mut device, _mock) = connected_device();
    assert_eq!(device.health(), HealthState::Uninitialized);

    device.initialize().await.unwrap();
    assert_eq!(device.health(), HealthState::Connected);
    assert!(device.identity().unwrap().contains("8131A"));

    let (mut device, mock) = connected_device();
    mock.set_offline(true);
    assert!(device.initialize().await.is_err());
    assert_eq!(device.health(), HealthState::Faulted);
}

#[tokio::test]
async fn self_test_transitions_from_every_prior_state() {
    // Uninitialized → Connected on pass
    let (mut device, _mock) = connected_device();
    device.self_test().await.unwrap();
    assert_eq!(device.health(), HealthState::Connected);

    // Uninitialized → Faulted on fail
    let (mut device, mock) = connected_device();
    mock.set_self_test_reply("1");
    device.self_test().await.unwrap();
    assert_eq!(device.health(), HealthState::Faulted);

    // Connected → Faulted on fail, Faulted → Connected on pass
    let (mut device, mock) = connected_device();
    device.initialize().await.unwrap();
    mock.set_self_test_reply("1");
    device.self_test().await.unwrap();
    assert_eq!(device.health(), HealthState::Faulted);

    mock.set_self_test_reply("0");
    device.self_test().await.unwrap();
    assert_eq!(device.health(), HealthState::Connected);

    // Connected stays Connected on pass
    device.self_test().await.unwrap();
    assert_eq!(device.health(), HealthState::Connected);
}

#[tokio::test]
async fn transport_failure_mid_operation_faults_health() {
    let (mut device, mock) = connected_device();
    device.initialize().await.unwrap();
    assert_eq!(device.health(), HealthState::Connected);

    mock.set_offline(true);
    assert!(device.read(PulseProperty::Period).await.is_err());
    assert_eq!(device.health(), HealthState::Faulted);

    // Once the link is back, a passing self-test recovers the state.
    mock.set_offline(false);
    device.self_test().await.unwrap();
    assert_eq!(device.health(), HealthState::Connected);
}

#[tokio::test]
async fn shutdown_releases_connection_and_resets_health() {
    let (mut device, _mock) = connected_device();
    device.initialize().await.unwrap();

    device.shutdown().await.unwrap();
    assert_eq!(device.health(), HealthState::Uninitialized);

    // Accessors after shutdown report a connection error.
    assert!(device.read(PulseProperty::Period).await.is_err());
}

#[tokio::test]
async fn passthrough_commands_reach_the_instrument() {
    let (mut device, mock) = connected_device();
    device.initialize().await.unwrap();

    device.manual_trigger().await.unwrap();
    device.manual_trigger().await.unwrap();
    assert_eq!(mock.trigger_count(), 2);

    let identity = device.send_and_receive("*IDN?").await.unwrap();
    assert!(identity.contains("HEWLETT-PACKARD"));

    device.send(":PULS:TIM:PER 1E-6").await.unwrap();
    assert_eq!(mock.register(":PULS:TIM:PER").as_deref(), Some("1E-6"));
}

#[tokio::test]
async fn reads_refresh_the_host_parameter_surface() {
    let (mut device, _mock) = connected_device();

    device
        .write(PulseProperty::TriggerMode, PropertyValue::TriggerMode(TriggerMode::Burst))
        .await
        .unwrap();
    device.read(PulseProperty::TriggerMode).await.unwrap();
    assert_eq!(
        device.parameters()["trigger_mode"].value_json(),
        serde_json::json!("BURST")
    );

    device
        .write(PulseProperty::Period, PropertyValue::Float(1e-6))
        .await
        .unwrap();
    assert_eq!(
        device.parameters()["period"].value_json(),
        serde_json::json!(1e-6)
    );
}
