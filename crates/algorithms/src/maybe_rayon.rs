//! Switch between rayon and sequential iteration over segments.
//!
//! With the `parallel` feature this re-exports rayon's prelude. Without it
//! a sequential `par_iter_mut` stands in, so call sites read the same and
//! chain onto the standard `Iterator` methods.

#[cfg(feature = "parallel")]
pub use rayon::prelude::*;

#[cfg(not(feature = "parallel"))]
mod sequential {
    /// Sequential stand-in for `rayon::slice::ParallelSliceMut`.
    pub trait ParallelSliceMut<T> {
        fn par_iter_mut(&mut self) -> std::slice::IterMut<'_, T>;
    }

    impl<T> ParallelSliceMut<T> for [T] {
        fn par_iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
            self.iter_mut()
        }
    }
}

#[cfg(not(feature = "parallel"))]
pub use sequential::*;
