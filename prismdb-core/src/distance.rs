//! Distance and similarity computations.
//!
//! The index ranks by squared Euclidean distance. Callers outside the core
//! usually want a bounded similarity instead, which [`distance_to_score`]
//! derives from the distance.

/// Computes squared Euclidean distance between two vectors.
///
/// Formula: sum((a[i] - b[i])^2)
#[inline]
pub fn euclidean_distance_squared(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");

    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let diff = x - y;
            diff * diff
        })
        .sum()
}

/// Computes Euclidean (L2) distance between two vectors.
#[inline]
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    euclidean_distance_squared(a, b).sqrt()
}

/// Converts a distance into a similarity score.
///
/// Formula: 1 / (1 + distance)
/// Range: (0, 1] for non-negative distances, strictly decreasing in distance.
#[inline]
pub fn distance_to_score(distance: f32) -> f32 {
    1.0 / (1.0 + distance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_euclidean_distance_squared() {
        let a = [0.0, 0.0];
        let b = [3.0, 4.0];
        assert!((euclidean_distance_squared(&a, &b) - 25.0).abs() < 1e-6);
    }

    #[test]
    fn test_euclidean_distance() {
        let a = [0.0, 0.0];
        let b = [3.0, 4.0];
        assert!((euclidean_distance(&a, &b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_same_vector() {
        let a = [1.0, 2.0, 3.0];
        assert_eq!(euclidean_distance_squared(&a, &a), 0.0);
    }

    #[test]
    fn test_unit_axes() {
        // [1,0,0,0] vs [0,1,0,0]: 1 + 1
        let a = [1.0, 0.0, 0.0, 0.0];
        let b = [0.0, 1.0, 0.0, 0.0];
        assert_eq!(euclidean_distance_squared(&a, &b), 2.0);
    }

    #[test]
    fn test_distance_to_score() {
        assert_eq!(distance_to_score(0.0), 1.0);
        assert!((distance_to_score(1.0) - 0.5).abs() < 1e-6);
        assert!(distance_to_score(2.0) < distance_to_score(1.0));
        assert!(distance_to_score(1e30) > 0.0);
    }
}
