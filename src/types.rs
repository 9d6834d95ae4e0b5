use ndarray::{ArrayRef, Ix1, Ix2};

pub type ArrayRef1<T> = ArrayRef<T, Ix1>;
pub type ArrayRef2<T> = ArrayRef<T, Ix2>;
