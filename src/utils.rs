//! Utility functions used across the library
#[cfg(test)]
use crate::Scalar;

/// Restrict value to a certain interval
#[inline]
pub fn clamp<T>(val: T, min: T, max: T) -> T
where
    T: PartialOrd,
{
    if val < min {
        min
    } else if val > max {
        max
    } else {
        val
    }
}

/// Check if value is equal to default
/// useful for skipping serialization if value is equal to default value
/// by adding `#[serde(default, skip_serializing_if = "is_default")]`
#[cfg(feature = "serde")]
pub(crate) fn is_default<T: Default + PartialEq>(val: &T) -> bool {
    val == &T::default()
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[macro_export]
    macro_rules! assert_approx_eq {
        ( $v0:expr, $v1: expr ) => {{
            let (v0, v1) = ($v0, $v1);
            assert!((v0 - v1).abs() < $crate::EPSILON, "{} != {}", v0, v1);
        }};
        ( $v0:expr, $v1: expr, $e: expr ) => {{
            let (v0, v1) = ($v0, $v1);
            assert!((v0 - v1).abs() < $e, "{} != {}", v0, v1);
        }};
    }

    #[macro_export]
    macro_rules! assert_approx_eq_iter {
        ( $v0:expr, $v1: expr ) => {{
            assert_approx_eq_iter!($v0, $v1, $crate::EPSILON);
        }};
        ( $v0:expr, $v1: expr, $e: expr ) => {{
            let mut i0 = $v0.into_iter();
            let mut i1 = $v1.into_iter();
            for (v0, v1) in i0.by_ref().zip(i1.by_ref()) {
                assert_approx_eq!(v0, v1, $e);
            }
            assert!(i0.next().is_none(), "left iterator is longer");
            assert!(i1.next().is_none(), "right iterator is longer");
        }};
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(2.0 as Scalar, 0.0, 1.0), 1.0);
        assert_eq!(clamp(-2.0 as Scalar, 0.0, 1.0), 0.0);
        assert_eq!(clamp(0.5 as Scalar, 0.0, 1.0), 0.5);
    }
}
