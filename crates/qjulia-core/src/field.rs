//! The batched scalar-field capability.
//!
//! Both the volume sampler and the polygoniser's vertex refinement consume
//! the field through this trait, so an accelerated back-end can be swapped
//! in without either stage knowing. Any implementation must return, per
//! sample, exactly the value the reference evaluator would return for the
//! same input, and must be drained before the next pipeline stage starts.

use crate::equation::Equation;
use crate::quaternion::Quaternion;

/// A scalar field evaluated in batches.
pub trait ScalarField {
    /// Evaluates the escape value for each sample, in input order.
    ///
    /// Each query is independent; implementations are free to process the
    /// batch in parallel as long as results are numerically identical to
    /// evaluating query-by-query.
    fn evaluate(&self, samples: &[Quaternion]) -> Vec<f32>;

    /// Evaluates a single sample.
    fn evaluate_one(&self, sample: Quaternion) -> f32 {
        self.evaluate(std::slice::from_ref(&sample))[0]
    }
}

/// The reference (single-threaded) field: a compiled equation plus the
/// fixed iteration parameters of the run.
#[derive(Debug, Clone)]
pub struct EquationField {
    equation: Equation,
    c: Quaternion,
    max_iterations: u32,
    threshold: f32,
}

impl EquationField {
    /// Creates the reference field for one pipeline run.
    #[must_use]
    pub fn new(equation: Equation, c: Quaternion, max_iterations: u32, threshold: f32) -> Self {
        Self {
            equation,
            c,
            max_iterations,
            threshold,
        }
    }
}

impl ScalarField for EquationField {
    fn evaluate(&self, samples: &[Quaternion]) -> Vec<f32> {
        samples
            .iter()
            .map(|&z0| {
                self.equation
                    .iterate(z0, self.c, self.max_iterations, self.threshold)
            })
            .collect()
    }
}
