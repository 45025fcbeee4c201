//! Runge-Kutta-Nystrom integrator
//!
//! Fourth-order step for second-order systems `y'' = f(x, y, y')`. Generic
//! over the scalar so the convergence tests can run in `f64`.

use std::ops::{Add, Mul};

use num_traits::Float;

/// Advance `y'' = derive(x, y, y')` by one step of `dx`
///
/// Returns `(delta_y, new_dy)`: the change in `y` over the step and the
/// derivative at its end. `derive` is called exactly four times.
pub fn integrate_rkn<S, T, F>(x0: S, y0: T, dy0: T, dx: S, mut derive: F) -> (T, T)
where
    S: Float,
    T: Copy + Add<Output = T> + Mul<S, Output = T>,
    F: FnMut(S, T, T) -> T,
{
    let one = S::one();
    let two = one + one;
    let half = one / two;
    let third = one / (two + one);
    let h = half * dx;

    let k1 = derive(x0, y0, dy0) * h;
    let l = (dy0 + k1 * half) * h;
    let k2 = derive(x0 + h, y0 + l, dy0 + k1) * h;
    let k3 = derive(x0 + h, y0 + l, dy0 + k2) * h;
    let l = (dy0 + k3) * dx;
    let k4 = derive(x0 + dx, y0 + l, dy0 + k3 * two) * h;

    let delta = (dy0 + (k1 + k2 + k3) * third) * dx;
    let new_dy = dy0 + (k1 + k2 * two + k3 * two + k4) * third;
    (delta, new_dy)
}
