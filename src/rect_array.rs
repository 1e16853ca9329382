//! Rectangular arrays of fixed rank with per-dimension lower bounds.
//!
//! Storage is a single `Vec` in row-major order: the last index varies
//! fastest. An array is never equal to a jagged array of the same contents,
//! nor to one of the same contents in a different shape.

use crate::descriptor::{Dimension, Dimensions, TypeDescriptor};
use crate::error::{Result, StructuralError};
use crate::value::{ArrayAccess, Structural};

#[derive(Clone, Debug, PartialEq)]
pub struct RectArray<T, const R: usize> {
    lower: [isize; R],
    lengths: [usize; R],
    data: Vec<T>,
}

impl<T, const R: usize> RectArray<T, R> {
    /// Zero-based array of the given lengths over row-major `data`.
    pub fn new(lengths: [usize; R], data: Vec<T>) -> Result<Self> {
        Self::with_lower_bounds([0; R], lengths, data)
    }

    /// Array over row-major `data` whose first index in dimension `d` is
    /// `lower[d]`. Fails when `data` does not hold exactly the number of
    /// elements the lengths describe, or when an index would overflow.
    pub fn with_lower_bounds(lower: [isize; R], lengths: [usize; R], data: Vec<T>) -> Result<Self> {
        let expected = lengths
            .iter()
            .try_fold(1usize, |n, &len| n.checked_mul(len))
            .ok_or(StructuralError::ShapeOverflow)?;
        for (&lo, &len) in lower.iter().zip(&lengths) {
            let last = isize::try_from(len.saturating_sub(1))
                .ok()
                .and_then(|span| lo.checked_add(span));
            if last.is_none() {
                return Err(StructuralError::ShapeOverflow);
            }
        }
        if data.len() != expected {
            return Err(StructuralError::InvalidShape {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            lower,
            lengths,
            data,
        })
    }

    /// Zero-based array whose element at each position is `f(position)`.
    pub fn from_fn<F>(lengths: [usize; R], mut f: F) -> Self
    where
        F: FnMut([usize; R]) -> T,
    {
        let data = RowMajor::new(lengths).map(&mut f).collect();
        Self {
            lower: [0; R],
            lengths,
            data,
        }
    }

    pub fn rank(&self) -> usize {
        R
    }

    pub fn lengths(&self) -> [usize; R] {
        self.lengths
    }

    pub fn lower_bounds(&self) -> [isize; R] {
        self.lower
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, index: [isize; R]) -> Option<&T> {
        let mut offset = 0usize;
        for dim in 0..R {
            let rel = index[dim].checked_sub(self.lower[dim])?;
            let rel = usize::try_from(rel).ok()?;
            if rel >= self.lengths[dim] {
                return None;
            }
            offset = offset * self.lengths[dim] + rel;
        }
        self.data.get(offset)
    }

    /// Same elements, same row-major order, new shape. Lower bounds reset
    /// to zero.
    pub fn reshape<const S: usize>(self, lengths: [usize; S]) -> Result<RectArray<T, S>> {
        RectArray::new(lengths, self.data)
    }

    /// Elements in row-major order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Every valid index, in row-major order, lower bounds applied. Cannot
    /// overflow: construction checks the last index of every dimension.
    pub fn indices(&self) -> impl Iterator<Item = [isize; R]> + '_ {
        RowMajor::new(self.lengths).map(move |pos| {
            let mut index = self.lower;
            for (i, p) in index.iter_mut().zip(pos) {
                *i += p as isize;
            }
            index
        })
    }
}

/// Zero-based positions of a shape, last dimension fastest.
struct RowMajor<const R: usize> {
    lengths: [usize; R],
    next: Option<[usize; R]>,
}

impl<const R: usize> RowMajor<R> {
    fn new(lengths: [usize; R]) -> Self {
        let next = if lengths.iter().any(|&n| n == 0) {
            None
        } else {
            Some([0; R])
        };
        Self { lengths, next }
    }
}

impl<const R: usize> Iterator for RowMajor<R> {
    type Item = [usize; R];

    fn next(&mut self) -> Option<[usize; R]> {
        let current = self.next?;
        let mut following = current;
        self.next = None;
        for dim in (0..R).rev() {
            following[dim] += 1;
            if following[dim] < self.lengths[dim] {
                self.next = Some(following);
                break;
            }
            following[dim] = 0;
        }
        Some(current)
    }
}

impl<T: Structural, const R: usize> Structural for RectArray<T, R> {
    fn descriptor(&self) -> TypeDescriptor {
        let d = TypeDescriptor::rectangular(R);
        if T::is_raw_address_type() {
            d.with_pointer_elements()
        } else {
            d
        }
    }

    fn as_array(&self) -> Option<&dyn ArrayAccess> {
        Some(self)
    }

    fn pointer_slots(&self) -> Option<Vec<usize>> {
        self.data.iter().map(Structural::raw_address).collect()
    }
}

impl<T: Structural, const R: usize> ArrayAccess for RectArray<T, R> {
    fn dimensions(&self) -> Dimensions {
        self.lower
            .iter()
            .zip(self.lengths)
            .map(|(&lower, len)| Dimension { lower, len })
            .collect()
    }

    fn item(&self, offset: usize) -> &dyn Structural {
        &self.data[offset]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_checks_the_element_count() {
        let err = RectArray::new([2, 3], vec![0u8; 5]).unwrap_err();
        assert!(matches!(
            err,
            StructuralError::InvalidShape {
                expected: 6,
                actual: 5
            }
        ));
        assert!(RectArray::new([2, 3], vec![0u8; 6]).is_ok());
    }

    #[test]
    fn oversized_shapes_are_rejected() {
        assert!(matches!(
            RectArray::new([usize::MAX, 2], Vec::<u8>::new()),
            Err(StructuralError::ShapeOverflow)
        ));
        assert!(matches!(
            RectArray::with_lower_bounds([isize::MAX, 0], [2, 1], vec![1u8, 2]),
            Err(StructuralError::ShapeOverflow)
        ));
        let top = RectArray::with_lower_bounds([isize::MAX - 1], [2], vec![1u8, 2]).unwrap();
        assert_eq!(top.indices().last(), Some([isize::MAX]));
        // An empty dimension holds no index at all.
        assert!(RectArray::with_lower_bounds([isize::MAX], [0], Vec::<u8>::new()).is_ok());
    }

    #[test]
    fn get_honours_lower_bounds() {
        let a = RectArray::with_lower_bounds([1, -1], [2, 3], (0..6).collect()).unwrap();
        assert_eq!(a.get([1, -1]), Some(&0));
        assert_eq!(a.get([1, 1]), Some(&2));
        assert_eq!(a.get([2, 0]), Some(&4));
        assert_eq!(a.get([0, 0]), None);
        assert_eq!(a.get([2, 2]), None);
    }

    #[test]
    fn from_fn_fills_row_major() {
        let a = RectArray::from_fn([2, 2, 2], |[i, j, k]| i * 100 + j * 10 + k);
        let flat: Vec<usize> = a.iter().copied().collect();
        assert_eq!(flat, vec![0, 1, 10, 11, 100, 101, 110, 111]);
        assert_eq!(a.rank(), 3);
    }

    #[test]
    fn indices_cover_the_shape_in_order() {
        let a = RectArray::with_lower_bounds([5, 0], [2, 2], vec!['a', 'b', 'c', 'd']).unwrap();
        let idx: Vec<[isize; 2]> = a.indices().collect();
        assert_eq!(idx, vec![[5, 0], [5, 1], [6, 0], [6, 1]]);
        for (i, v) in a.indices().zip(a.iter()) {
            assert_eq!(a.get(i), Some(v));
        }

        let empty: RectArray<u8, 2> = RectArray::new([3, 0], vec![]).unwrap();
        assert_eq!(empty.indices().count(), 0);
        assert!(empty.is_empty());
    }

    #[test]
    fn reshape_keeps_the_data() {
        let a = RectArray::new([6], (0..6).collect::<Vec<i32>>()).unwrap();
        let b = a.clone().reshape([2, 3]).unwrap();
        assert_eq!(b.lengths(), [2, 3]);
        assert_eq!(b.as_slice(), a.as_slice());
        assert!(b.reshape([4, 2]).is_err());
    }

    #[test]
    fn dimensions_report_bounds_and_lengths() {
        let a = RectArray::with_lower_bounds([-2], [3], vec![1, 2, 3]).unwrap();
        let dims = a.dimensions();
        assert_eq!(dims.as_slice(), &[Dimension { lower: -2, len: 3 }]);
        assert_eq!(a.len(), 3);
    }
}
