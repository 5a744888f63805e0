// src/analysis.rs
//
// Closed-form pole estimates: minima of the static and of the field-driven parts of the
// landscape taken separately. Their offset indicates how far the field must tilt the swimmer
// away from its rest orientation.
//
//   static part  E_d + E_pd = const + A′ cos 2θ + B′ sin 2θ
//                dE/dθ ∝ A sin 2θ + B cos 2θ,  A = 2 − γ/α,  B = 15√3 γ/α
//   driven part  E_f + E_pf = f (−(kα + 5γ) cos θ + 3√3 γ sin θ)

use crate::params::SwimmerParams;

const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Minimum of the field-independent terms (self-consistent model): −½·atan2(15√3γ, 2α − γ).
pub fn characteristic_pole(params: &SwimmerParams) -> f64 {
    -0.5 * (15.0 * SQRT_3 * params.gamma).atan2(2.0 * params.alpha - params.gamma)
}

/// Minimum of the field-driven terms for a positive field: −atan2(3√3γ, kα + 5γ).
pub fn external_field_pole(params: &SwimmerParams) -> f64 {
    let k = params.field_energy_factor;
    -(3.0 * SQRT_3 * params.gamma).atan2(k * params.alpha + 5.0 * params.gamma)
}

/// External-field pole minus characteristic pole.
pub fn pole_offset(params: &SwimmerParams) -> f64 {
    external_field_pole(params) - characteristic_pole(params)
}
