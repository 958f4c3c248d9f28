//! Fare allocation over runs of same-mode legs.
//!
//! A run is a maximal sequence of consecutive legs sharing one mode. Each run
//! is charged exactly once, the way a rider taps in and out once per
//! continuous use of a service:
//!
//! | run mode     | fare                                   | charged on |
//! |--------------|----------------------------------------|------------|
//! | MRT          | matrix fare, first to last station     | last leg   |
//! | LRT          | distance fare over the run's total km  | last leg   |
//! | TransJakarta | flat fare                              | first leg  |
//! | other        | free                                   | nothing    |

use std::ops::Range;

use crate::fares::{lrt_fare, mrt_fare, transjakarta_fare};
use crate::graph::round_to;
use crate::mode::Mode;

use super::Leg;

/// Index ranges of consecutive legs sharing a mode.
pub fn mode_runs(legs: &[Leg]) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut start = 0;
    for index in 1..=legs.len() {
        if index == legs.len() || legs[index].mode != legs[start].mode {
            if start < index {
                runs.push(start..index);
            }
            start = index;
        }
    }
    runs
}

/// Overwrite every leg's `cost_idr` with its share of the run fares.
pub fn allocate_fares(legs: &mut [Leg]) {
    for leg in legs.iter_mut() {
        leg.cost_idr = 0;
    }

    for run in mode_runs(legs) {
        let run = &mut legs[run];
        let Some(mode) = run.first().map(|leg| leg.mode) else {
            continue;
        };
        let last = run.len() - 1;
        match mode {
            Mode::Mrt => {
                run[last].cost_idr = mrt_fare(&run[0].from_name, &run[last].to_name);
            }
            Mode::Lrt => {
                // Legs carry metres; summing them can drift past a whole km.
                let distance: f64 = run.iter().map(|leg| leg.distance_km).sum();
                run[last].cost_idr = lrt_fare(round_to(distance, 3));
            }
            Mode::TransJakarta => {
                run[0].cost_idr = transjakarta_fare();
            }
            Mode::Transfer | Mode::Walk => {}
        }
    }
}
