use topomem_types::{Thresholds, Verdict};

/// Verdict for a risk value. Equality at a threshold does not escalate.
pub fn gate(risk: f64, thresholds: Thresholds) -> Verdict {
    if risk > thresholds.block {
        Verdict::Block
    } else if risk > thresholds.warn {
        Verdict::Warn
    } else {
        Verdict::Allow
    }
}

/// Energy band of a risk: 1 for `R = 1` up to 7 for `R = 0`.
pub fn band(risk: f64) -> u8 {
    let r = if risk.is_finite() { risk.clamp(0.0, 1.0) } else { 0.0 };
    let b = 7 - (r * 6.0 + 1e-9).floor() as i64;
    b.clamp(1, 7) as u8
}
