// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time iteration.
//!
//! A point `c` is iterated through `z = z * z + c`, starting with `z =
//! c`.  The number of steps taken before `|z|^2` exceeds the bailout
//! radius is the point's "velocity," and is what gets colored.  Points
//! that never leave within the iteration cap are reported as the cap
//! itself, which we treat as inside the set.

use num::Complex;

/// The square of the bailout radius.
pub const BAILOUT: f64 = 4.0;

/// Returns the 0-based step at which `point` escapes, or
/// `max_iterations` if it never does.  The result always lies in
/// `0..=max_iterations`.
pub fn escape(point: &Complex<f64>, max_iterations: usize) -> usize {
    let (mut z_real, mut z_imag) = (point.re, point.im);
    for iteration in 0..max_iterations {
        let r2 = z_real * z_real;
        let i2 = z_imag * z_imag;
        if r2 + i2 > BAILOUT {
            return iteration;
        }
        z_imag = 2.0 * z_real * z_imag + point.im;
        z_real = r2 - i2 + point.re;
    }
    max_iterations
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    // The magnitude of the orbit at each step, computed the long way.
    fn orbit(point: Complex<f64>, steps: usize) -> Vec<f64> {
        let mut z = point;
        let mut norms = vec![];
        for _ in 0..steps {
            norms.push(z.norm_sqr());
            z = z * z + point;
        }
        norms
    }

    #[test]
    fn main_cardioid_never_escapes() {
        assert_eq!(escape(&Complex::new(-0.7, 0.0), 1000), 1000);
        assert_eq!(escape(&Complex::new(0.0, 0.0), 1000), 1000);
        assert_eq!(escape(&Complex::new(-1.0, 0.0), 1000), 1000);
    }

    #[test]
    fn far_points_escape_quickly() {
        let n = escape(&Complex::new(-3.26, -1.44), 1000);
        assert!(n < 16, "escaped at {}", n);
        assert_eq!(n, 0);
        assert_eq!(escape(&Complex::new(1.0, 1.0), 1000), 1);
    }

    #[test]
    fn zero_cap_returns_zero() {
        assert_eq!(escape(&Complex::new(-0.7, 0.0), 0), 0);
        assert_eq!(escape(&Complex::new(5.0, 5.0), 0), 0);
    }

    #[test]
    fn escape_step_is_the_first_step_past_the_bailout() {
        let mut rng = rand::thread_rng();
        for _ in 0..2000 {
            let point = Complex::new(rng.gen_range(-2.5, 1.0), rng.gen_range(-1.5, 1.5));
            let cap = 200;
            let n = escape(&point, cap);
            assert!(n <= cap);
            if n < cap {
                let norms = orbit(point, n + 1);
                assert!(norms[n] > BAILOUT, "{:?} did not escape at {}", point, n);
                assert!(norms[..n].iter().all(|&r| r <= BAILOUT), "{:?} escaped before {}", point, n);
            }
        }
    }
}
