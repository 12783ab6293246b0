//! Gap filling within a single entity's series.
//!
//! All functions operate on one entity's values in ascending date order and never
//! see another entity's data. Each returns the indices it filled so callers can
//! record coverage.

/// Linearly interpolate nulls that lie between two known values.
///
/// `positions` are the x coordinates (month indices) of `values`; they must be
/// strictly increasing and the same length as `values`. Leading and trailing nulls
/// are left untouched.
pub fn interpolate_interior(positions: &[i32], values: &mut [Option<f64>]) -> Vec<usize> {
    debug_assert_eq!(positions.len(), values.len());
    let mut filled = Vec::new();
    let mut last_known: Option<(usize, f64)> = None;

    for i in 0..values.len() {
        let Some(right) = values[i] else { continue };
        if let Some((left_idx, left)) = last_known {
            if i > left_idx + 1 {
                let x0 = f64::from(positions[left_idx]);
                let span = f64::from(positions[i]) - x0;
                for j in (left_idx + 1)..i {
                    let t = (f64::from(positions[j]) - x0) / span;
                    values[j] = Some(left + (right - left) * t);
                    filled.push(j);
                }
            }
        }
        last_known = Some((i, right));
    }
    filled
}

/// Carry the last known value forward over trailing and interior nulls.
pub fn forward_fill(values: &mut [Option<f64>]) -> Vec<usize> {
    let mut filled = Vec::new();
    let mut carry = None;
    for (i, value) in values.iter_mut().enumerate() {
        match value {
            Some(v) => carry = Some(*v),
            None => {
                if let Some(c) = carry {
                    *value = Some(c);
                    filled.push(i);
                }
            }
        }
    }
    filled
}

/// Carry the first known value backward over leading nulls.
pub fn back_fill(values: &mut [Option<f64>]) -> Vec<usize> {
    let Some(first) = values.iter().position(Option::is_some) else {
        return Vec::new();
    };
    let seed = values[first];
    let mut filled = Vec::with_capacity(first);
    for (i, value) in values.iter_mut().enumerate().take(first) {
        *value = seed;
        filled.push(i);
    }
    filled
}
