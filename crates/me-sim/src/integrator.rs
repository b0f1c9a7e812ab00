//! Fixed-step explicit integration.

/// Advance `states` by one explicit (forward) Euler step of length `dt`.
///
/// `states[i] += dt * derivatives[i]`.  No error estimate, no step-size
/// control.
///
/// # Panics
/// Panics in debug mode if the two slices differ in length.
#[inline]
pub fn forward_euler(states: &mut [f64], derivatives: &[f64], dt: f64) {
    debug_assert_eq!(states.len(), derivatives.len(), "state/derivative length mismatch");
    for (x, dx) in states.iter_mut().zip(derivatives) {
        *x += dt * dx;
    }
}
