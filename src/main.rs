//! ProtoEl - circuit propagation playground
//!
//! Builds a small demonstration circuit (or loads a saved layout), runs the
//! clocks for a few half periods and prints every component's summary.
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=protoel_core=debug protoel --ticks 6
//! protoel --layout circuit.json --toggle-switches --export > out.json
//! ```

use std::path::PathBuf;

use clap::Parser;
use protoel_core::{
    circuit::CircuitConfig, components::ComponentKind, error::Result, Circuit, Component,
    LayoutDocument, Point, SwitchState,
};
use tracing::info;

/// Circuit connection graph and voltage propagation demo
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Layout file to load instead of the built-in demo circuit
    #[arg(short, long, value_name = "FILE")]
    layout: Option<PathBuf>,

    /// Number of clock half periods to run
    #[arg(short, long, default_value_t = 4)]
    ticks: u32,

    /// Flip every switch once before running the clocks
    #[arg(long)]
    toggle_switches: bool,

    /// Print the final layout as JSON instead of component summaries
    #[arg(long)]
    export: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut circuit = match &args.layout {
        Some(path) => {
            let doc = LayoutDocument::from_file(path)?;
            Circuit::from_layout(&doc, CircuitConfig::default())?
        }
        None => demo_circuit()?,
    };
    info!(components = circuit.len(), nodes = circuit.registry().len(), "circuit ready");

    if args.toggle_switches {
        for id in ids_of(&circuit, ComponentKind::Switch) {
            let state = circuit.toggle_switch(id)?;
            info!(switch = circuit.name(id).unwrap_or("?"), ?state, "toggled");
        }
    }

    let clocks = ids_of(&circuit, ComponentKind::Clock);
    for tick in 1..=args.ticks {
        for &clock in &clocks {
            circuit.tick_clock(clock)?;
        }
        for lcd in ids_of(&circuit, ComponentKind::Display) {
            if let Some(Component::Display(d)) = circuit.component(lcd) {
                let digit = d.digit().map_or_else(|| "-".to_string(), |v| format!("{v:X}"));
                let name = circuit.name(lcd).unwrap_or("?");
                info!(tick, lcd = name, %digit, "display");
            }
        }
    }

    if args.export {
        println!("{}", circuit.to_layout().to_json()?);
        return Ok(());
    }

    for id in circuit.ids() {
        if let Some(text) = circuit.summary(id) {
            println!("{text}");
        }
    }
    Ok(())
}

fn ids_of(circuit: &Circuit, kind: ComponentKind) -> Vec<protoel_core::ComponentId> {
    circuit
        .ids()
        .into_iter()
        .filter(|&id| circuit.kind(id) == Some(kind))
        .collect()
}

/// A supply feeding a resistor through a wire and a switch, and a clocked
/// JK flip-flop toggling digit 0/1 on a seven-segment display.
fn demo_circuit() -> Result<Circuit> {
    let p = Point::new;
    let mut c = Circuit::new();

    let u1 = c.add(Component::dc_voltage(5.0)?);
    let w1 = c.add(Component::wire());
    let s1 = c.add(Component::switch(SwitchState::Closed));
    let r1 = c.add(Component::resistor(1000.0)?);
    let gnd1 = c.add(Component::ground());
    c.connect(u1, &[p(0, 0)])?;
    c.connect(w1, &[p(0, 0), p(100, 0)])?;
    c.connect(s1, &[p(100, 0), p(200, 0)])?;
    c.connect(r1, &[p(200, 100), p(200, 0)])?;
    c.connect(gnd1, &[p(200, 100)])?;

    // J and K both high: the flip-flop toggles on every rising edge
    let u2 = c.add(Component::dc_voltage(5.0)?);
    let w2 = c.add(Component::wire());
    let w3 = c.add(Component::wire());
    let clk = c.add(Component::clock(5.0, 500)?);
    let jk = c.add(Component::flip_flop());
    c.connect(u2, &[p(0, 200)])?;
    c.connect(w2, &[p(0, 200), p(100, 200)])?;
    c.connect(w3, &[p(100, 200), p(100, 220)])?;
    c.connect(clk, &[p(0, 300)])?;
    c.connect(jk, &[p(100, 200), p(0, 300), p(100, 220), p(200, 200), p(200, 220)])?;

    // Upper three decoder inputs grounded, I0 follows Q
    let gnd2 = c.add(Component::ground());
    let dec = c.add(Component::decoder());
    let lcd = c.add(Component::display());
    let segments: Vec<Point> = (0..7).map(|i| p(400, 100 + 10 * i)).collect();
    let mut dec_pins = vec![p(300, 140), p(300, 140), p(300, 140), p(200, 200)];
    dec_pins.extend_from_slice(&segments);
    c.connect(gnd2, &[p(300, 140)])?;
    c.connect(dec, &dec_pins)?;
    c.connect(lcd, &segments)?;

    Ok(c)
}
