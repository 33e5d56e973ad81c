//! Concrete design definitions.

mod simd;

pub use simd::SimdDotProduct;
