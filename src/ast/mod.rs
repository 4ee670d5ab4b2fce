//! The predicate syntax tree, runtime values and evaluation traces.

pub mod expression;
pub mod trace;
pub mod value;

pub use expression::*;
pub use trace::*;
pub use value::*;
