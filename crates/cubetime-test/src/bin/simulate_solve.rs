//! Solve Timer Simulation
//!
//! Runs simulated solves through the timer and compares the reconciled
//! final time with what a host-clock stopwatch and the raw device counter
//! would have reported.
//!
//! Usage: simulate-solve [seed] [--verbose]

use cubetime_runtime::logging::{self, LoggingConfig};
use cubetime_test::time_simulator::{
    move_sequence, scenarios, ClockDriftModel, SimulatedCube, SolveSimulator, TransportModel,
};

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let verbose = args.iter().any(|a| a == "--verbose");
    let seed = args
        .iter()
        .find_map(|a| a.parse::<u64>().ok())
        .unwrap_or(7);

    let config = if verbose {
        LoggingConfig::verbose()
    } else {
        LoggingConfig::default()
    };
    if let Err(e) = logging::init(&config) {
        eprintln!("logging disabled: {e}");
    }

    println!("=== Solve Timer Simulation (seed {seed}) ===\n");

    let runs: Vec<(&str, SolveSimulator)> = vec![
        ("perfect clock, instant link", scenarios::perfect()),
        ("device 2% fast", scenarios::drifting()),
        ("jittery link", scenarios::jittery(seed)),
        ("16-bit counter wrap", scenarios::wrapping()),
        ("slow clock, congested, gaps", scenarios::hostile(seed)),
        (
            "half-speed device",
            SolveSimulator::new(
                SimulatedCube::new(ClockDriftModel::half_speed(), TransportModel::typical(), seed),
                seed,
            ),
        ),
    ];

    let moves = move_sequence(60);
    for (name, mut sim) in runs {
        println!("{name}");
        let Some(outcome) = sim.run_solve(&moves) else {
            println!("   timer did not stop\n");
            continue;
        };

        let display = sim.controller().display().snapshot();
        println!("   display:     {} ({})", display.elapsed_text(), display.timer_state);
        println!("   true:        {}ms", outcome.true_ms);
        println!(
            "   reconciled:  {}ms (error {}ms)",
            outcome.record.final_ms,
            outcome.fitted_error_ms()
        );
        println!(
            "   host only:   {}ms (error {}ms)",
            outcome.record.raw_ms,
            outcome.raw_error_ms()
        );
        println!(
            "   device only: {}ms (error {}ms)",
            outcome.device_ms,
            outcome.device_error_ms()
        );
        match sim.skew() {
            Some(skew) => println!("   skew:        {skew}\n"),
            None => println!("   skew:        n/a\n"),
        }
    }
}
