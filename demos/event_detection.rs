//! Event detection: periapsis and apoapsis finding in an elliptical CR3BP orbit.
//!
//! Demonstrates a terminal event (halt at the third periapsis) and a
//! non-terminal one that keeps recording every apse until the span ends.
//!
//! Run with:
//!   cargo run --example event_detection

use event_integrator::{
    Cr3bp, Event, EventDirection, EventIntegrator, Occurrences, Rkf78, TimeSpan, Tolerances,
};

const MU: f64 = 0.0121505856;

/// Apses about the larger primary: `g = (r - r1) · v`.
///
/// Rising through zero is periapsis, falling is apoapsis. Function 0 tracks
/// periapses, function 1 apoapses.
struct Apses {
    terminal: bool,
    occurrences: Occurrences,
}

impl Apses {
    fn new(max_periapses: u32, terminal: bool) -> Self {
        Self {
            terminal,
            occurrences: Occurrences::new(vec![max_periapses, u32::MAX]),
        }
    }
}

impl Event<6> for Apses {
    fn occurrences(&self) -> &Occurrences {
        &self.occurrences
    }

    fn occurrences_mut(&mut self) -> &mut Occurrences {
        &mut self.occurrences
    }

    fn event_fcn(&self, _t: f64, x: &[f64; 6], g: &mut [f64]) {
        // the distance to the primary is frame independent, so its rate can be
        // taken in the rotating frame
        let radial = (x[0] + MU) * x[3] + x[1] * x[4] + x[2] * x[5];
        g[0] = radial;
        g[1] = radial;
    }

    fn terminate_fcn(&self, _t: f64, _x: &[f64; 6], terminate: &mut [bool]) {
        terminate[0] = self.terminal && self.occurrences.is_saturated(0);
        terminate[1] = false;
    }

    fn direction_fcn(&self, direction: &mut [EventDirection]) {
        direction[0] = EventDirection::Rising;
        direction[1] = EventDirection::Falling;
    }
}

fn radius(x: &[f64; 6]) -> f64 {
    ((x[0] + MU).powi(2) + x[1] * x[1] + x[2] * x[2]).sqrt()
}

fn main() {
    let sys = Cr3bp::new(MU);

    // periapsis at r = 0.15 with 10% more than circular speed
    let r_peri: f64 = 0.15;
    let v_circ = ((1.0 - MU) / r_peri).sqrt();
    let x0 = [r_peri - MU, 0.0, 0.0, 0.0, 1.1 * v_circ - r_peri, 0.0];

    println!("Event Detection: Apses in the Earth-Moon CR3BP");
    println!("  Initial radius: {:.3}, Jacobi constant: {:.9}", r_peri, sys.jacobi_constant(&x0));
    println!();

    let span = TimeSpan::new(0.0, 20.0).unwrap();

    // --- Part 1: stop at the third periapsis after t = 0 ---
    let mut event = Apses::new(3, true);
    let mut integrator = EventIntegrator::new(Rkf78::new(), Tolerances::new(1e-12, 1e-12), 1e-3);
    let solution = integrator
        .integrate_adaptive(&sys, &mut event, &x0, span)
        .unwrap();

    println!("Part 1: terminal periapsis event");
    println!("  Status: {:?}", solution.status);
    for (t, x, i) in solution.events.iter() {
        let kind = if i == 0 { "periapsis" } else { "apoapsis" };
        println!("    {:9} t = {:8.5}  r = {:.9}", kind, t, radius(x));
    }
    println!("  Counters: {:?}", event.occurrences().current());
    println!();

    // --- Part 2: record every apse until the end of the span ---
    let mut event = Apses::new(3, false);
    let solution = integrator
        .integrate_adaptive(&sys, &mut event, &x0, span)
        .unwrap();

    println!("Part 2: non-terminal (span of {:.1})", span.end());
    println!("  Status: {:?}", solution.status);
    println!(
        "  {} periapses and {} apoapses recorded",
        event.occurrences().current()[0],
        event.occurrences().current()[1]
    );
    println!(
        "  {} accepted steps, {} rejected, {} derivative evaluations",
        solution.stats.accepted_steps, solution.stats.rejected_steps, solution.stats.fn_evals
    );
}
