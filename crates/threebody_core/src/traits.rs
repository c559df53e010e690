use num_traits::{Float, FromPrimitive};
use std::fmt::Debug;

/// Numeric type the vector field and stepper are written against.
/// `f64` is the only instantiation the solve pipeline uses.
pub trait Scalar: Float + FromPrimitive + Debug + 'static {}

impl<T: Float + FromPrimitive + Debug + 'static> Scalar for T {}

/// A first-order ODE system dx/dt = f(t, x).
pub trait DynamicalSystem<T: Scalar> {
    /// Returns the dimension of the state space.
    fn dimension(&self) -> usize;

    /// Evaluates the vector field at (t, x) into `out`.
    /// Must not panic on singular inputs; non-finite values are written through.
    fn apply(&self, t: T, x: &[T], out: &mut [T]);
}

/// One trial step of an embedded Runge-Kutta pair.
///
/// The stepper owns its stage buffers. After `attempt` the proposed state,
/// the derivative at the proposed state and the local error estimate can be
/// read back; nothing is committed until the caller copies them out.
pub trait EmbeddedStepper<T: Scalar> {
    /// Order of the error estimator; the controller exponent is -1/(order + 1).
    fn error_order(&self) -> usize;

    /// Attempts a step of size `h` from `(t, y)`, where `f0 = f(t, y)`.
    fn attempt(&mut self, system: &impl DynamicalSystem<T>, t: T, y: &[T], f0: &[T], h: T);

    /// State proposed by the last attempt.
    fn proposed(&self) -> &[T];

    /// f(t + h, proposed), available for first-same-as-last reuse.
    fn proposed_derivative(&self) -> &[T];

    /// Unscaled local error estimate of the last attempt.
    fn error_estimate(&self) -> &[T];
}
