// navguard_sim/src/arbiter.rs

//! Chooses the primary lane from the per-lane summaries of each cycle.

use navguard_core::prelude::TimeMs;
use navguard_core::scoring::LaneSummary;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneSwitch {
    pub at_ms: TimeMs,
    pub from: Option<usize>,
    pub to: usize,
}

#[derive(Debug, Clone)]
pub struct LaneArbiter {
    primary: Option<usize>,
    switch_margin: f32,
}

impl LaneArbiter {
    pub fn new(switch_margin: f32) -> Self {
        Self {
            primary: None,
            switch_margin,
        }
    }

    pub fn primary(&self) -> Option<usize> {
        self.primary
    }

    /// Feeds one cycle of summaries, indexed by lane. Returns the switch if
    /// the primary changed.
    ///
    /// Only healthy, aligned lanes are candidates; an unaligned lane scores 0
    /// and would otherwise always win. With no candidates the primary is kept.
    pub fn update(&mut self, now_ms: TimeMs, summaries: &[LaneSummary]) -> Option<LaneSwitch> {
        let (best, best_score) = summaries
            .iter()
            .enumerate()
            .filter(|(_, summary)| summary.is_candidate())
            .map(|(index, summary)| (index, summary.error_score))
            .min_by(|a, b| a.1.total_cmp(&b.1))?;

        let switch = match self.primary {
            None => true,
            Some(current) => match summaries.get(current).filter(|s| s.is_candidate()) {
                None => true,
                Some(summary) => best_score + self.switch_margin < summary.error_score,
            },
        };
        if !switch || self.primary == Some(best) {
            return None;
        }

        let event = LaneSwitch {
            at_ms: now_ms,
            from: self.primary,
            to: best,
        };
        info!(at_ms = now_ms, from = ?event.from, to = best, score = best_score, "primary lane switched");
        self.primary = Some(best);
        Some(event)
    }
}
