//! Intermittent-unit selection.
//!
//! Wind output is free, so every unit runs at its candidate output unless the
//! fleet would overshoot the load. In that case the subset of units whose
//! outputs sum closest to the load without exceeding it is kept, and the rest
//! are disconnected. Units are never derated below their candidate output.

use itertools::Itertools;
use tracing::{debug, instrument};

use super::types::{IntermittentUnit, POWER_TOLERANCE_MW, fits_within};

/// Tuning for the curtailment search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSettings {
    /// Largest fleet searched exhaustively; bigger fleets use the
    /// reachable-sum search.
    pub exhaustive_limit: usize,
    /// Spacing (MW) the reachable-sum search thins to once it holds too many
    /// distinct sums.
    pub resolution_mw: f64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            exhaustive_limit: 20,
            resolution_mw: 0.1,
        }
    }
}

/// Outcome of the selection step, indexed like the input units.
#[derive(Debug, Clone, PartialEq)]
pub struct IntermittentSelection {
    /// Candidate output of each unit (MW).
    pub candidate_mw: Vec<f64>,
    /// Whether each unit is connected.
    pub selected: Vec<bool>,
    /// Sum of the outputs of the connected units (MW).
    pub total_mw: f64,
}

impl IntermittentSelection {
    /// Assigned output of unit `index`: its candidate output if connected, else 0.
    pub fn output_mw(&self, index: usize) -> f64 {
        if self.selected[index] {
            self.candidate_mw[index]
        } else {
            0.0
        }
    }

    /// Candidate output left unused by the selection (MW).
    pub fn curtailed_mw(&self) -> f64 {
        self.candidate_mw.iter().sum::<f64>() - self.total_mw
    }
}

/// Chooses which intermittent units to connect for the given load.
///
/// Never fails; in the worst case no unit is connected.
#[instrument(skip_all, fields(units = units.len(), load_mw = load_mw))]
pub fn select(
    units: &[IntermittentUnit],
    wind_percent: f64,
    load_mw: f64,
    settings: &SearchSettings,
) -> IntermittentSelection {
    let candidate_mw: Vec<f64> = units
        .iter()
        .map(|u| u.candidate_output_mw(wind_percent))
        .collect();
    let available_mw: f64 = candidate_mw.iter().sum();

    if fits_within(available_mw, load_mw) {
        return IntermittentSelection {
            selected: vec![true; units.len()],
            total_mw: available_mw,
            candidate_mw,
        };
    }

    let chosen = if units.len() <= settings.exhaustive_limit {
        exhaustive_subset(&candidate_mw, load_mw)
    } else {
        sparse_subset(&candidate_mw, load_mw, settings.resolution_mw)
    };

    let mut selected = vec![false; units.len()];
    for &i in &chosen {
        selected[i] = true;
    }
    let total_mw: f64 = chosen.iter().map(|&i| candidate_mw[i]).sum();
    debug!(
        available_mw,
        total_mw,
        connected = chosen.len(),
        "curtailing intermittent output"
    );

    IntermittentSelection {
        candidate_mw,
        selected,
        total_mw,
    }
}

/// Brute-force search for the largest subset sum not exceeding `capacity_mw`.
///
/// Subsets are visited by size, then in lexicographic index order; only a
/// strictly larger sum replaces the incumbent, so ties keep the first subset
/// visited.
fn exhaustive_subset(weights_mw: &[f64], capacity_mw: f64) -> Vec<usize> {
    let mut best = Vec::new();
    let mut best_mw = 0.0;

    for size in 1..=weights_mw.len() {
        for combo in (0..weights_mw.len()).combinations(size) {
            let sum_mw: f64 = combo.iter().map(|&i| weights_mw[i]).sum();
            if fits_within(sum_mw, capacity_mw) && sum_mw > best_mw {
                best_mw = sum_mw;
                best = combo;
            }
        }
    }

    best
}

/// Upper bound on the number of reachable sums kept between items.
const MAX_REACHABLE_SUMS: usize = 10_000;

/// Back-pointer of a reachable sum: the item added and the link it extends.
#[derive(Debug, Clone, Copy)]
struct Link {
    item: usize,
    from: Option<usize>,
}

/// A reachable subset sum and the head of its back-pointer chain.
#[derive(Debug, Clone, Copy)]
struct Reach {
    sum_mw: f64,
    link: Option<usize>,
}

/// 0/1 subset-sum over the exact sums reachable without exceeding `capacity_mw`.
///
/// Sums closer than `POWER_TOLERANCE_MW` are merged, keeping the one found
/// first. Only when more than `MAX_REACHABLE_SUMS` remain after an item are
/// they thinned to a spacing of `resolution_mw` (widened so the bound holds
/// for any load). The returned subset never exceeds `capacity_mw`.
fn sparse_subset(weights_mw: &[f64], capacity_mw: f64, resolution_mw: f64) -> Vec<usize> {
    let coarse_gap_mw = resolution_mw.max(capacity_mw / MAX_REACHABLE_SUMS as f64);
    let mut links: Vec<Link> = Vec::new();
    let mut reachable = vec![Reach {
        sum_mw: 0.0,
        link: None,
    }];

    for (item, &weight_mw) in weights_mw.iter().enumerate() {
        if weight_mw <= 0.0 {
            continue;
        }
        let mut extended = Vec::new();
        for reach in &reachable {
            let sum_mw = reach.sum_mw + weight_mw;
            if !fits_within(sum_mw, capacity_mw) {
                // ascending, so every later sum overshoots too
                break;
            }
            links.push(Link {
                item,
                from: reach.link,
            });
            extended.push(Reach {
                sum_mw,
                link: Some(links.len() - 1),
            });
        }

        let merged = reachable
            .into_iter()
            .merge_by(extended, |a, b| a.sum_mw <= b.sum_mw)
            .collect();
        reachable = thin(merged, POWER_TOLERANCE_MW);
        if reachable.len() > MAX_REACHABLE_SUMS {
            reachable = thin(reachable, coarse_gap_mw);
        }
    }

    let mut chosen = Vec::new();
    let mut cursor = reachable.last().and_then(|r| r.link);
    while let Some(index) = cursor {
        let link = links[index];
        chosen.push(link.item);
        cursor = link.from;
    }
    chosen.sort_unstable();
    chosen
}

/// Drops every sum within `gap_mw` above the last one kept. Input is ascending.
fn thin(sums: Vec<Reach>, gap_mw: f64) -> Vec<Reach> {
    let mut kept: Vec<Reach> = Vec::with_capacity(sums.len());
    for reach in sums {
        match kept.last() {
            Some(last) if reach.sum_mw - last.sum_mw <= gap_mw => {}
            _ => kept.push(reach),
        }
    }
    kept
}
