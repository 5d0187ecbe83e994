/*
 * Vector primitives shared by the network code: one-hot conversion, softmax
 * normalization, outer-product accumulation and element-wise pairing.
 *
 * Everything operates on plain f64 slices so the network can run these over
 * rows of its weight matrices without copying.
 */

use crate::error::RnnError;

#[inline]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    let mut sum: f64 = 0.0;
    for idx in 0..a.len() {
        sum += a[idx] * b[idx];
    }
    sum
}

/// Derivative of tanh expressed through the activation value: if y = tanh(x)
/// then dy/dx = 1 - y^2.
#[inline]
pub fn tanh_derivative(y: f64) -> f64 {
    1.0 - y * y
}

/// In-place softmax. Subtracts the maximum before exponentiating so large
/// inputs do not overflow to NaN.
pub fn softmax(vec: &mut [f64]) {
    if vec.is_empty() {
        return;
    }
    let mut max_value: f64 = vec[0];
    for idx in 1..vec.len() {
        if vec[idx] > max_value {
            max_value = vec[idx];
        }
    }

    let mut denominator = 0.0;
    for value in vec.iter_mut() {
        let v = ((*value) - max_value).exp();
        denominator += v;
        *value = v;
    }

    for idx in 0..vec.len() {
        vec[idx] /= denominator;
    }
}

/// Encodes each index as a one-hot vector of the given dimension.
pub fn one_hot_encode(indices: &[usize], dimension: usize) -> Result<Vec<Vec<f64>>, RnnError> {
    let mut vectors = Vec::with_capacity(indices.len());
    for &index in indices.iter() {
        if index >= dimension {
            return Err(RnnError::IndexOutOfRange {
                index,
                len: dimension,
            });
        }
        let mut vector = vec![0.0; dimension];
        vector[index] = 1.0;
        vectors.push(vector);
    }
    Ok(vectors)
}

/// Arg-max decode of each vector. Ties resolve to the first occurrence.
/// An empty vector decodes to index 0.
pub fn one_hot_decode(vectors: &[Vec<f64>]) -> Vec<usize> {
    let mut indices = Vec::with_capacity(vectors.len());
    for vector in vectors.iter() {
        let mut max_index: usize = 0;
        for idx in 1..vector.len() {
            if vector[idx] > vector[max_index] {
                max_index = idx;
            }
        }
        indices.push(max_index);
    }
    indices
}

/// Accumulates the outer product of two vectors into a row matrix:
/// m[i][j] += a[i] * b[j]. The caller zeroes the matrix if accumulation
/// should not carry over from an earlier call.
pub fn outer_product_acc(a: &[f64], b: &[f64], m: &mut [Vec<f64>]) {
    debug_assert_eq!(a.len(), m.len());
    for i in 0..a.len() {
        let a_value = a[i];
        let row = &mut m[i];
        debug_assert_eq!(b.len(), row.len());
        for j in 0..b.len() {
            row[j] += a_value * b[j];
        }
    }
}

/// Applies f element-wise across two equal-length slices, writing the result
/// back into dst: dst[i] = f(dst[i], src[i]).
pub fn pairwise_apply<F>(dst: &mut [f64], src: &[f64], f: F) -> Result<(), RnnError>
where
    F: Fn(f64, f64) -> f64,
{
    if dst.len() != src.len() {
        return Err(RnnError::DimensionMismatch {
            what: "pairwise_apply operands",
            expected: dst.len(),
            got: src.len(),
        });
    }
    for idx in 0..dst.len() {
        dst[idx] = f(dst[idx], src[idx]);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn softmax_is_a_distribution() {
        let mut v = vec![0.1, 2.0, -1.5, 0.0, 3.3];
        softmax(&mut v);
        let mut sum = 0.0;
        for x in v.iter() {
            assert!(*x >= 0.0);
            sum += *x;
        }
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn softmax_survives_large_inputs() {
        let mut v = vec![1000.0, 1001.0, 999.0];
        softmax(&mut v);
        let sum: f64 = v.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        for x in v.iter() {
            assert!(x.is_finite());
        }
        assert!(v[1] > v[0] && v[0] > v[2]);
    }

    #[test]
    fn softmax_on_empty_slice_is_noop() {
        let mut v: Vec<f64> = vec![];
        softmax(&mut v);
        assert!(v.is_empty());
    }

    #[test]
    fn one_hot_rejects_out_of_range() {
        let err = one_hot_encode(&[2, 7], 5).unwrap_err();
        assert_eq!(err, RnnError::IndexOutOfRange { index: 7, len: 5 });
    }

    #[test]
    fn one_hot_decode_prefers_first_maximum() {
        let decoded = one_hot_decode(&[vec![0.5, 0.5, 0.1]]);
        assert_eq!(decoded, vec![0]);
    }

    #[test]
    fn outer_product_accumulates() {
        let mut m = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        outer_product_acc(&[2.0, 3.0], &[10.0, 100.0], &mut m);
        assert_eq!(m, vec![vec![21.0, 200.0], vec![30.0, 301.0]]);
    }

    #[test]
    fn pairwise_apply_checks_lengths() {
        let mut a = vec![1.0, 2.0];
        let err = pairwise_apply(&mut a, &[1.0], |x, y| x + y).unwrap_err();
        assert_eq!(
            err,
            RnnError::DimensionMismatch {
                what: "pairwise_apply operands",
                expected: 2,
                got: 1,
            }
        );

        pairwise_apply(&mut a, &[10.0, 20.0], |x, y| x + y).unwrap();
        assert_eq!(a, vec![11.0, 22.0]);
    }

    quickcheck! {
        fn one_hot_round_trips(indices: Vec<usize>) -> bool {
            let indices: Vec<usize> = indices.into_iter().map(|i| i % 11).collect();
            let vectors = one_hot_encode(&indices, 11).unwrap();
            one_hot_decode(&vectors) == indices
        }

        fn softmax_sums_to_one(values: Vec<f64>) -> bool {
            let mut values: Vec<f64> = values
                .into_iter()
                .filter(|v| v.is_finite())
                .collect();
            if values.is_empty() {
                return true;
            }
            softmax(&mut values);
            let sum: f64 = values.iter().sum();
            (sum - 1.0).abs() < 1e-9
        }
    }
}
