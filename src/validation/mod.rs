//! Client-side form validation

mod field;
mod forms;

pub use field::*;
pub use forms::*;
