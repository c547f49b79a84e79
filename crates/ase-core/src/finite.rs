//! # Numerical Fault Detection
//!
//! A change value containing NaN or an infinity is never admissible. The
//! engine checks every proposed change and every internally produced
//! candidate through [`Finite`] before consulting the admissibility
//! predicate, so a predicate that forgets the check cannot let a
//! non-finite change through.

/// Whether a value is free of NaN and infinities.
pub trait Finite {
    /// `true` iff every numeric component is finite.
    fn is_finite(&self) -> bool;
}

impl Finite for f64 {
    fn is_finite(&self) -> bool {
        f64::is_finite(*self)
    }
}

impl Finite for f32 {
    fn is_finite(&self) -> bool {
        f32::is_finite(*self)
    }
}

macro_rules! always_finite {
    ($($t:ty),* $(,)?) => {
        $(
            impl Finite for $t {
                fn is_finite(&self) -> bool {
                    true
                }
            }
        )*
    };
}

always_finite!(bool, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl<T: Finite> Finite for [T] {
    fn is_finite(&self) -> bool {
        self.iter().all(Finite::is_finite)
    }
}

impl<T: Finite, const N: usize> Finite for [T; N] {
    fn is_finite(&self) -> bool {
        self.as_slice().is_finite()
    }
}

impl<T: Finite> Finite for Vec<T> {
    fn is_finite(&self) -> bool {
        self.as_slice().is_finite()
    }
}

impl<A: Finite, B: Finite> Finite for (A, B) {
    fn is_finite(&self) -> bool {
        self.0.is_finite() && self.1.is_finite()
    }
}
