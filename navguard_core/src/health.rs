// navguard_core/src/health.rs

//! The trust decision over a single snapshot.

use tracing::debug;

use crate::error::UnhealthyReason;
use crate::reporting::faults::filter_faults;
use crate::snapshot::EstimatorSnapshot;
use crate::types::{AidingMode, TimeMs};

/// The filter output is not used until it has run this long.
pub const STARTUP_SETTLE_MS: TimeMs = 1000;

/// Limit on the squared horizontal position innovation while static on ground (m^2).
const STATIC_HORIZ_INNOV_SQ_LIMIT: f32 = 1.0;
/// Limit on the filtered height innovation while static on ground (m).
const STATIC_HEIGHT_INNOV_LIMIT: f32 = 1.0;

/// Runs the health checks in order and reports the first one that fails.
///
/// Order matters: each check assumes the earlier ones passed.
pub fn check_health(snapshot: &EstimatorSnapshot) -> Result<(), UnhealthyReason> {
    let faults = filter_faults(snapshot);
    if faults.any() {
        return Err(UnhealthyReason::Faults(faults.to_bits()));
    }

    // Any single ratio can spike; all three at once means the filter has diverged.
    let ratios = &snapshot.test_ratios;
    if ratios.velocity > 1.0 && ratios.position > 1.0 && ratios.height > 1.0 {
        return Err(UnhealthyReason::CompoundDivergence {
            vel: ratios.velocity,
            pos: ratios.position,
            hgt: ratios.height,
        });
    }

    let elapsed_ms = snapshot.elapsed_since_start_ms();
    if elapsed_ms < STARTUP_SETTLE_MS {
        return Err(UnhealthyReason::Settling { elapsed_ms });
    }

    // A static vehicle without aiding should see near-zero innovations.
    if snapshot.on_ground && snapshot.aiding_mode == AidingMode::None {
        let innov = &snapshot.innovations;
        let horiz_sq = innov.vel_pos[3].powi(2) + innov.vel_pos[4].powi(2);
        let height = innov.filtered_height;
        if horiz_sq > STATIC_HORIZ_INNOV_SQ_LIMIT || height.abs() > STATIC_HEIGHT_INNOV_LIMIT {
            return Err(UnhealthyReason::StaticInnovations { horiz_sq, height });
        }
    }

    Ok(())
}

/// Whether downstream consumers may trust this snapshot.
pub fn healthy(snapshot: &EstimatorSnapshot) -> bool {
    match check_health(snapshot) {
        Ok(()) => true,
        Err(reason) => {
            debug!(%reason, "estimator unhealthy");
            false
        }
    }
}
