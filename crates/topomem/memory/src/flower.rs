use serde::{Deserialize, Serialize};
use topomem_types::PhasePoint;

/// Closed trail of recent `(risk, phase)` points and the area it encloses.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Flower {
    pub petal_area: f64,
    pub points: Vec<[f64; 2]>,
}

impl Flower {
    /// `None` below three points.
    pub fn from_points(points: &[PhasePoint]) -> Option<Self> {
        if points.len() < 3 {
            return None;
        }
        Some(Self {
            petal_area: shoelace_area(points),
            points: points.iter().map(|p| [p.risk, p.phase]).collect(),
        })
    }
}

/// Absolute polygon area, points taken in order and closed implicitly.
pub fn shoelace_area(points: &[PhasePoint]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f64 = (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            a.risk * b.phase - b.risk * a.phase
        })
        .sum();
    let area = twice.abs() * 0.5;
    if area.is_finite() {
        area
    } else {
        0.0
    }
}
