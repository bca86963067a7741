/// Index of the sample nearest to `x` in ascending `xs`.
///
/// Uses binary search; when `x` is equidistant from two samples the later
/// one wins.
pub fn nearest_index(xs: &[f64], x: f64) -> Option<usize> {
    if xs.is_empty() || !x.is_finite() {
        return None;
    }
    let i = xs.partition_point(|&v| v < x);
    if i == 0 {
        return Some(0);
    }
    if i == xs.len() {
        return Some(xs.len() - 1);
    }
    let before = x - xs[i - 1];
    let after = xs[i] - x;
    if before < after {
        Some(i - 1)
    } else {
        Some(i)
    }
}
