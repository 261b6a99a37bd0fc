//! Metric thread designations and the undercut groove table used when cutting
//! a thread runout. Only the lookup lives here; building the groove profile is
//! left to the host CAD layer.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ThreadError {
    #[error("thread designation `{0}` has no pitch separator")]
    MissingPitch(String),
    #[error("thread designation `{designation}` has an invalid {part}")]
    InvalidNumber {
        designation: String,
        part: &'static str,
    },
}

/// Nominal diameter and pitch in millimetres, e.g. `M10x1.5`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThreadDesignation {
    pub diameter: f64,
    pub pitch: f64,
}

impl ThreadDesignation {
    /// Accepts Latin, Cyrillic or `×` separators, a Latin or Cyrillic `M`
    /// prefix and either decimal mark.
    pub fn parse(designation: &str) -> Result<Self, ThreadError> {
        let trimmed = designation.trim();
        let (diameter, pitch) = trimmed
            .split_once(['x', 'X', '×', 'х'])
            .ok_or_else(|| ThreadError::MissingPitch(trimmed.to_string()))?;

        let diameter = diameter.trim().trim_start_matches(['M', 'М']);
        Ok(Self {
            diameter: parse_millimetres(trimmed, diameter, "diameter")?,
            pitch: parse_millimetres(trimmed, pitch, "pitch")?,
        })
    }

    pub fn undercut(&self) -> Option<Undercut> {
        undercut_for_pitch(self.pitch)
    }
}

fn parse_millimetres(
    designation: &str,
    raw: &str,
    part: &'static str,
) -> Result<f64, ThreadError> {
    raw.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value > 0.0)
        .ok_or_else(|| ThreadError::InvalidNumber {
            designation: designation.to_string(),
            part,
        })
}

/// Groove profile for a thread runout, all values in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Undercut {
    /// Depth subtracted from the nominal diameter at the groove bottom.
    pub bore_diameter: f64,
    pub groove_width: f64,
    pub large_radius: f64,
    pub small_radius: f64,
}

impl Undercut {
    const fn new(bore_diameter: f64, groove_width: f64, large_radius: f64, small_radius: f64) -> Self {
        Self {
            bore_diameter,
            groove_width,
            large_radius,
            small_radius,
        }
    }

    /// Groove bottom diameter for the given nominal diameter.
    #[inline]
    pub fn inner_diameter(&self, nominal: f64) -> f64 {
        nominal - self.bore_diameter
    }
}

const FINE_LIMIT: f64 = 0.4;
const COARSE_LIMIT: f64 = 6.0;
const FINE: Undercut = Undercut::new(0.6, 1.0, 0.3, 0.2);
const COARSE: Undercut = Undercut::new(9.0, 8.0, 2.0, 1.0);

const UNDERCUTS: [(f64, Undercut); 18] = [
    (0.45, Undercut::new(0.7, 1.0, 0.3, 0.2)),
    (0.5, Undercut::new(0.8, 1.0, 0.3, 0.2)),
    (0.6, Undercut::new(0.9, 1.0, 0.3, 0.2)),
    (0.7, Undercut::new(1.0, 1.6, 0.5, 0.3)),
    (0.75, Undercut::new(1.2, 1.6, 0.5, 0.3)),
    (0.8, Undercut::new(1.2, 1.6, 0.5, 0.3)),
    (1.0, Undercut::new(1.5, 2.0, 0.5, 0.3)),
    (1.25, Undercut::new(1.8, 2.5, 1.0, 0.5)),
    (1.5, Undercut::new(2.2, 2.5, 1.0, 0.5)),
    (1.75, Undercut::new(2.5, 2.5, 1.0, 0.5)),
    (2.0, Undercut::new(3.0, 3.0, 1.0, 0.5)),
    (2.5, Undercut::new(3.5, 4.0, 1.0, 0.5)),
    (3.0, Undercut::new(4.5, 4.0, 1.0, 0.5)),
    (3.5, Undercut::new(5.0, 5.0, 1.6, 0.5)),
    (4.0, Undercut::new(6.0, 5.0, 1.6, 0.5)),
    (4.5, Undercut::new(6.5, 6.0, 1.6, 1.0)),
    (5.0, Undercut::new(7.0, 6.0, 1.6, 1.0)),
    (5.5, Undercut::new(8.0, 8.0, 2.0, 1.0)),
];

/// Fine pitches share the first row and coarse pitches the last; anything in
/// between must be a standard pitch.
pub fn undercut_for_pitch(pitch: f64) -> Option<Undercut> {
    if pitch <= FINE_LIMIT {
        return Some(FINE);
    }
    if pitch >= COARSE_LIMIT {
        return Some(COARSE);
    }
    UNDERCUTS
        .iter()
        .find(|(standard, _)| (standard - pitch).abs() < 1e-9)
        .map(|(_, undercut)| *undercut)
}
