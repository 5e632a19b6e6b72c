//! Allocation-free vector primitives shared by the fingerprint and scoring code.
//!
//! - `norm`: Euclidean (L2) norm
//! - `dot`: inner product of equal-length slices
//! - `normalise`: in-place scaling to unit length, zero vectors left untouched
//! - `cosine`: dot over product of norms, 0.0 when either norm is zero

/// Computes the Euclidean norm (L2) without allocating.
#[inline]
pub fn norm(a: &[f64]) -> f64 {
    a.iter().map(|&x| x * x).sum::<f64>().sqrt()
}

/// Inner product.
///
/// # Panics
///
/// Panics if the lengths differ.
#[inline]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(a.len(), b.len(), "Dimension mismatch");
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Scales `a` to unit length. A zero vector stays all zeros.
#[inline]
pub fn normalise(a: &mut [f64]) {
    let n = norm(a);
    if n > 0.0 {
        for x in a.iter_mut() {
            *x /= n;
        }
    }
}

/// Cosine similarity, guarding against zero vectors.
///
/// Returns 0.0 if either vector has zero norm. The result is clamped to
/// `[-1, 1]` to absorb rounding on (anti)parallel inputs.
///
/// # Panics
///
/// Panics if the lengths differ.
///
/// # Examples
///
/// ```
/// use graphsim::operators::cosine;
/// assert_eq!(cosine(&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0]), 0.0);
/// assert!((cosine(&[1.0, 1.0], &[1.0, 1.0]) - 1.0).abs() < 1e-12);
/// assert_eq!(cosine(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
/// ```
#[inline]
pub fn cosine(a: &[f64], b: &[f64]) -> f64 {
    let d = dot(a, b);
    let denom = norm(a) * norm(b);
    if denom > 0.0 {
        (d / denom).clamp(-1.0, 1.0)
    } else {
        0.0
    }
}
