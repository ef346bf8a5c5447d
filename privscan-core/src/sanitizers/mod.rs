//! Rule compilation.
//!
//! Turns the rules of a `RuleSet` into compiled matchers and validates
//! patterns at edit time. Rules that cannot be compiled are reported back to
//! the caller instead of failing the whole set.

pub mod compiler;
