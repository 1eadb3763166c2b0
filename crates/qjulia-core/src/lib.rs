//! Core abstractions for qjulia.
//!
//! This crate provides the foundations shared by the whole pipeline:
//! - [`QjuliaError`] and the crate-wide [`Result`] alias
//! - [`Quaternion`] arithmetic for the iterated dynamical system
//! - The iterative-equation language ([`Equation`]) and its escape test
//! - The batched [`ScalarField`] capability and its reference
//!   implementation, [`EquationField`]

pub mod equation;
pub mod error;
pub mod field;
pub mod quaternion;

pub use equation::Equation;
pub use error::{QjuliaError, Result};
pub use field::{EquationField, ScalarField};
pub use quaternion::Quaternion;
