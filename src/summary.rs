//! Route summary adaptation.
//!
//! The routing provider already computes distance and elevation gain/loss
//! for the routed path, so the primary policy is pass-through: adapt the
//! provider's shape into [`RouteSummary`] without arithmetic. The local
//! computation exists only as a fallback for provider variants that ship
//! geometry without a summary; provider values win whenever present.

use crate::geo_utils::polyline_length;
use crate::providers::RawRouteSummary;
use crate::{HikePoint, RouteSummary};

/// Pass-through mapping of the provider summary.
pub fn from_provider(raw: &RawRouteSummary) -> RouteSummary {
    RouteSummary {
        distance: raw.distance,
        ascent: raw.ascent,
        descent: raw.descent,
    }
}

/// Compute a summary locally from decoded points.
///
/// Distance is the summed haversine length. Ascent sums only positive
/// consecutive elevation deltas; descent sums the negative ones as a
/// positive magnitude.
pub fn compute_from_points(points: &[HikePoint]) -> RouteSummary {
    let mut ascent = 0.0;
    let mut descent = 0.0;

    for pair in points.windows(2) {
        let delta = pair[1].elevation - pair[0].elevation;
        if delta > 0.0 {
            ascent += delta;
        } else {
            descent -= delta;
        }
    }

    RouteSummary {
        distance: polyline_length(points),
        ascent,
        descent,
    }
}
