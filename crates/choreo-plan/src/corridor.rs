//! Lateral corridor constraints for straight moves.
//!
//! Lateral offsets are measured in centimeters along the right-hand
//! perpendicular of the move heading. A change of corridor between two moves
//! becomes a linear sideways drift across the second move.

use choreo_core::CorridorAnchor;
use choreo_ir::Corridor;

const EPS: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorridorBounds {
    pub left: f64,
    pub right: f64,
}

impl CorridorBounds {
    pub fn new(left: f64, right: f64) -> Self {
        Self {
            left: left.min(right),
            right: left.max(right),
        }
    }

    pub fn from_corridor(corridor: &Corridor) -> Self {
        Self::new(corridor.left.to_internal(), corridor.right.to_internal())
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn midpoint(&self) -> f64 {
        (self.left + self.right) / 2.0
    }

    fn same_as(&self, other: &CorridorBounds) -> bool {
        (self.left - other.left).abs() <= EPS && (self.right - other.right).abs() <= EPS
    }
}

/// Bounds after making room for the actor's radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorridorFit {
    pub bounds: CorridorBounds,
    /// Set when the declared corridor was too narrow and got widened.
    pub widened: bool,
}

/// Widen `bounds` symmetrically when narrower than the actor's diameter.
pub fn fit_to_radius(bounds: CorridorBounds, radius: f64) -> CorridorFit {
    let diameter = 2.0 * radius.max(0.0);
    if bounds.width() + EPS >= diameter {
        return CorridorFit {
            bounds,
            widened: false,
        };
    }
    let mid = bounds.midpoint();
    CorridorFit {
        bounds: CorridorBounds::new(mid - diameter / 2.0, mid + diameter / 2.0),
        widened: true,
    }
}

/// The corridor an actor currently runs in, and its offset within it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LateralState {
    pub bounds: CorridorBounds,
    pub offset: f64,
}

/// Linear drift of the lateral offset over one move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LateralShift {
    pub from: f64,
    pub to: f64,
}

impl LateralShift {
    /// Offset after `fraction` (0..=1) of the move.
    pub fn offset_at(&self, fraction: f64) -> f64 {
        self.from + (self.to - self.from) * fraction.clamp(0.0, 1.0)
    }

    /// Sideways displacement relative to where the move started.
    pub fn delta_at(&self, fraction: f64) -> f64 {
        self.offset_at(fraction) - self.from
    }

    pub fn is_drift(&self) -> bool {
        (self.to - self.from).abs() > EPS
    }

    pub fn end_state(&self, bounds: CorridorBounds) -> LateralState {
        LateralState {
            bounds,
            offset: self.to,
        }
    }
}

/// Plan the lateral offset for a move entering `bounds`.
///
/// The first corridor an actor meets anchors its current position at the
/// corridor midpoint, so it never drifts. An unchanged corridor keeps the
/// offset. A new corridor drifts toward the anchor chosen by `anchor`.
pub fn plan_shift(
    previous: Option<&LateralState>,
    bounds: CorridorBounds,
    radius: f64,
    anchor: CorridorAnchor,
) -> LateralShift {
    let Some(previous) = previous else {
        let mid = bounds.midpoint();
        return LateralShift { from: mid, to: mid };
    };
    if previous.bounds.same_as(&bounds) {
        return LateralShift {
            from: previous.offset,
            to: previous.offset,
        };
    }
    let target = match anchor {
        CorridorAnchor::Midpoint => bounds.midpoint(),
        CorridorAnchor::NearestEdge => {
            let lo = bounds.left + radius;
            let hi = bounds.right - radius;
            if lo > hi {
                bounds.midpoint()
            } else {
                previous.offset.clamp(lo, hi)
            }
        }
    };
    LateralShift {
        from: previous.offset,
        to: target,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lane(left_m: f64, right_m: f64) -> CorridorBounds {
        CorridorBounds::from_corridor(&Corridor::meters(left_m, right_m))
    }

    #[test]
    fn test_first_corridor_does_not_drift() {
        let shift = plan_shift(None, lane(0.0, 1.22), 35.0, CorridorAnchor::Midpoint);
        assert!(!shift.is_drift());
        assert!((shift.from - 61.0).abs() < 1e-9);
    }

    #[test]
    fn test_lane_change_midpoint() {
        let first = plan_shift(None, lane(0.0, 1.22), 35.0, CorridorAnchor::Midpoint);
        let state = first.end_state(lane(0.0, 1.22));
        let shift = plan_shift(Some(&state), lane(6.10, 7.32), 35.0, CorridorAnchor::Midpoint);
        assert!((shift.offset_at(0.5) - 366.0).abs() < 1e-9);
        assert!((shift.delta_at(1.0) - 610.0).abs() < 1e-9);
    }

    #[test]
    fn test_nearest_edge_keeps_inside_position() {
        let state = LateralState {
            bounds: lane(0.0, 3.0),
            offset: 150.0,
        };
        let shift = plan_shift(Some(&state), lane(1.0, 4.0), 35.0, CorridorAnchor::NearestEdge);
        assert!(!shift.is_drift());

        let shift = plan_shift(Some(&state), lane(2.5, 4.0), 35.0, CorridorAnchor::NearestEdge);
        assert!((shift.to - 285.0).abs() < 1e-9);
    }

    #[test]
    fn test_same_corridor_keeps_offset() {
        let state = LateralState {
            bounds: lane(0.0, 1.22),
            offset: 40.0,
        };
        let shift = plan_shift(Some(&state), lane(0.0, 1.22), 35.0, CorridorAnchor::Midpoint);
        assert!((shift.to - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_narrow_corridor_widened() {
        let fit = fit_to_radius(lane(1.0, 1.2), 35.0);
        assert!(fit.widened);
        assert!((fit.bounds.width() - 70.0).abs() < 1e-9);
        assert!((fit.bounds.midpoint() - 110.0).abs() < 1e-9);

        let ok = fit_to_radius(lane(0.0, 1.22), 35.0);
        assert!(!ok.widened);
    }
}
