// src/field.rs

/// Geometry of the driving field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldMode {
    /// B(ψ) = (0, b0·cos ψ, 0): a field of fixed direction whose strength oscillates.
    #[default]
    Oscillating,
    /// B(ψ) = b0·(−sin ψ, cos ψ, 0): a field of fixed strength rotating in the plane.
    Rotating,
}

impl FieldMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "oscillating" | "osc" => Some(Self::Oscillating),
            "rotating" | "rot" => Some(Self::Rotating),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Oscillating => "oscillating",
            Self::Rotating => "rotating",
        }
    }
}

/// External driving field with the phase ψ advanced at constant ω.
///
/// The oscillator is the only owner of ψ. Physics code receives `vector()` by value, so a
/// snapshot handed to a step or a frame can never alias the live state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExternalField {
    psi: f64,
    omega: f64,
    b0: f64,
    mode: FieldMode,
}

impl ExternalField {
    pub fn new(psi0: f64, omega: f64, b0: f64) -> Self {
        Self {
            psi: psi0,
            omega,
            b0,
            mode: FieldMode::Oscillating,
        }
    }

    pub fn with_mode(mut self, mode: FieldMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> FieldMode {
        self.mode
    }

    /// Current phase ψ (not wrapped).
    pub fn phase(&self) -> f64 {
        self.psi
    }

    pub fn omega(&self) -> f64 {
        self.omega
    }

    /// Field component along ŷ, the scalar f used by the triad energy.
    pub fn amplitude(&self) -> f64 {
        self.b0 * self.psi.cos()
    }

    pub fn vector(&self) -> [f64; 3] {
        match self.mode {
            FieldMode::Oscillating => [0.0, self.amplitude(), 0.0],
            FieldMode::Rotating => {
                let (s, c) = self.psi.sin_cos();
                [-self.b0 * s, self.b0 * c, 0.0]
            }
        }
    }

    /// ψ ← ψ + ω·dt
    pub fn advance(&mut self, dt: f64) {
        self.psi += self.omega * dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec3::norm;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, TAU};

    #[test]
    fn phase_after_hundred_steps() {
        let mut b = ExternalField::new(0.0, TAU, 1.0);
        for _ in 0..100 {
            b.advance(0.01);
        }
        assert_relative_eq!(b.phase(), 100.0 * TAU * 0.01, epsilon = 1e-12);
        // One full period: field back to +ŷ.
        assert_relative_eq!(b.amplitude(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn snapshot_is_independent_of_later_updates() {
        let mut b = ExternalField::new(0.0, TAU, 2.0);
        let snap = b.vector();
        b.advance(0.25);
        assert_eq!(snap, [0.0, 2.0, 0.0]);
        assert!(b.vector()[1].abs() < 1e-12);
    }

    #[test]
    fn rotating_field_keeps_strength_and_turns_counterclockwise() {
        let mut b = ExternalField::new(0.0, TAU, 1.5).with_mode(FieldMode::Rotating);
        assert_eq!(b.vector(), [0.0, 1.5, 0.0]);
        for _ in 0..25 {
            b.advance(0.01);
            assert_relative_eq!(norm(b.vector()), 1.5, epsilon = 1e-12);
        }
        // Quarter turn: +ŷ has rotated onto −x̂.
        assert_relative_eq!(b.phase(), FRAC_PI_2, epsilon = 1e-12);
        let v = b.vector();
        assert_relative_eq!(v[0], -1.5, epsilon = 1e-12);
        assert_relative_eq!(v[1], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn mode_names_round_trip() {
        for m in [FieldMode::Oscillating, FieldMode::Rotating] {
            assert_eq!(FieldMode::from_str(m.as_str()), Some(m));
        }
        assert_eq!(FieldMode::from_str("pulsed"), None);
    }
}
