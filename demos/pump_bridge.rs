// SPDX-License-Identifier: MPL-2.0

//! Demo program: expose a simulated pump controller to Home Assistant.
//!
//! Connects to the broker, announces the device and then publishes simulated
//! sensor readings. Switches toggled in Home Assistant are reflected in the
//! published state; pressing the reboot button resets the simulation.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example pump_bridge -- <broker_url> <device_id> [<username> <password>]
//! ```
//!
//! # Example
//!
//! ```bash
//! cargo run --example pump_bridge -- mqtt://192.168.1.50:1883 wpc01 mqtt_user mqtt_pass
//! ```

use std::env;
use std::time::Duration;

use pumpbridge::{Bridge, DeviceIdentity, MqttTransport, ProcessState, RuntimeSettings};
use tokio::time::Instant;

/// Total runtime of the demo.
const RUN_FOR: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() != 3 && args.len() != 5 {
        eprintln!(
            "Usage: {} <broker_url> <device_id> [<username> <password>]",
            args[0]
        );
        eprintln!();
        eprintln!("Example:");
        eprintln!("  cargo run --example pump_bridge -- mqtt://192.168.1.50:1883 wpc01 user pass");
        std::process::exit(1);
    }

    let broker_url = &args[1];
    let device_id = &args[2];

    let identity = DeviceIdentity::new(
        device_id.as_str(),
        "Water Pump Controller",
        "PumpBridge",
        "Demo",
        env!("CARGO_PKG_VERSION"),
    )?;

    let mut builder = MqttTransport::builder()
        .broker_url(broker_url.as_str())
        .client_id(device_id.as_str());
    if args.len() == 5 {
        builder = builder.credentials(args[3].as_str(), args[4].as_str());
    }
    let transport = builder.build()?;

    println!("Bridging {device_id} via {broker_url} for {RUN_FOR:?}...");

    let settings = RuntimeSettings::default();
    let mut bridge = Bridge::new(identity, transport);
    let deadline = Instant::now() + RUN_FOR;
    let mut tick: u32 = 0;

    while Instant::now() < deadline {
        // Runs one state interval, then hands control back for the simulation.
        bridge
            .run_until(settings, tokio::time::sleep(settings.state_interval()))
            .await;

        if bridge.state_mut().take_reboot_request() {
            println!("Reboot requested, resetting simulation");
            *bridge.state_mut() = ProcessState::new();
            tick = 0;
        }

        simulate(bridge.state_mut(), tick);
        tick = tick.wrapping_add(1);
    }

    if let Err(e) = bridge.transport_mut().disconnect().await {
        eprintln!("Disconnect failed: {e}");
    }

    println!("Done!");
    Ok(())
}

/// Advances the simulated process by one step.
fn simulate(state: &mut ProcessState, tick: u32) {
    let running = state.main_switch_on()
        && !state.error_flag()
        && (!state.manual_override() || state.manual_motor_request());
    state.set_motor_on(running);

    #[allow(clippy::cast_precision_loss)]
    let wave = ((tick % 20) as f32 / 20.0 * std::f32::consts::TAU).sin();

    if running {
        state.set_pressure(2.5 + 0.3 * wave);
        state.set_flow(12.0 + 1.5 * wave);
    } else {
        state.set_pressure(0.0);
        state.set_flow(0.0);
    }
    state.set_temperature(18.0 + 0.5 * wave);
}
