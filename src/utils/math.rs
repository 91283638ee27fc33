//! Small numeric helpers shared by the dynamics model and the controller

use std::f64::consts::PI;

use rand::Rng;
use rand_distr::{Distribution, Uniform};

/// Normalize angle to `(-pi, pi]`.
///
/// `%` is exact for floats, so after it at most one `2 pi` correction is
/// left for the loops. Non-finite input comes back as NaN.
pub fn normalize_angle(angle: f64) -> f64 {
    let mut angle = angle % (2.0 * PI);
    while angle > PI {
        angle -= 2.0 * PI;
    }
    while angle <= -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Toroidal wrap of `value` into `[0, extent)`.
pub fn wrap_into(value: f64, extent: f64) -> f64 {
    let wrapped = value.rem_euclid(extent);
    // rem_euclid rounds tiny negative values up to `extent`
    if wrapped >= extent {
        0.0
    } else {
        wrapped
    }
}

/// Draw uniformly from `[min, max]`. A degenerate range returns `min`.
pub fn random_in_range<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    if max <= min {
        return min;
    }
    Uniform::new_inclusive(min, max).sample(rng)
}

/// Two decimals with an explicit sign, e.g. `+1.50` or `-0.25`
pub fn fmt_signed(num: f64) -> String {
    let rounded = (num * 100.0).round() / 100.0;
    // avoid printing "-0.00"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{:+.2}", rounded)
}
