use crate::traits::{DynamicalSystem, EmbeddedStepper, Scalar};

/// Dormand-Prince 5(4) pair with first-same-as-last stage reuse.
///
/// Propagates the 5th order solution and estimates the error against the
/// embedded 4th order one.
pub struct DormandPrince45<T: Scalar> {
    k2: Vec<T>,
    k3: Vec<T>,
    k4: Vec<T>,
    k5: Vec<T>,
    k6: Vec<T>,
    k7: Vec<T>,
    tmp: Vec<T>,
    y_new: Vec<T>,
    err: Vec<T>,
}

impl<T: Scalar> DormandPrince45<T> {
    pub fn new(dim: usize) -> Self {
        let z = T::zero();
        Self {
            k2: vec![z; dim],
            k3: vec![z; dim],
            k4: vec![z; dim],
            k5: vec![z; dim],
            k6: vec![z; dim],
            k7: vec![z; dim],
            tmp: vec![z; dim],
            y_new: vec![z; dim],
            err: vec![z; dim],
        }
    }

    pub fn dimension(&self) -> usize {
        self.tmp.len()
    }
}

fn coeff<T: Scalar>(num: f64, den: f64) -> T {
    // Every tableau entry is a small rational, representable in any Float.
    T::from_f64(num / den).unwrap_or_else(T::nan)
}

impl<T: Scalar> EmbeddedStepper<T> for DormandPrince45<T> {
    fn error_order(&self) -> usize {
        4
    }

    fn attempt(&mut self, system: &impl DynamicalSystem<T>, t: T, y: &[T], f0: &[T], h: T) {
        let c2: T = coeff(1.0, 5.0);
        let c3: T = coeff(3.0, 10.0);
        let c4: T = coeff(4.0, 5.0);
        let c5: T = coeff(8.0, 9.0);

        let a21: T = coeff(1.0, 5.0);

        let a31: T = coeff(3.0, 40.0);
        let a32: T = coeff(9.0, 40.0);

        let a41: T = coeff(44.0, 45.0);
        let a42: T = coeff(-56.0, 15.0);
        let a43: T = coeff(32.0, 9.0);

        let a51: T = coeff(19372.0, 6561.0);
        let a52: T = coeff(-25360.0, 2187.0);
        let a53: T = coeff(64448.0, 6561.0);
        let a54: T = coeff(-212.0, 729.0);

        let a61: T = coeff(9017.0, 3168.0);
        let a62: T = coeff(-355.0, 33.0);
        let a63: T = coeff(46732.0, 5247.0);
        let a64: T = coeff(49.0, 176.0);
        let a65: T = coeff(-5103.0, 18656.0);

        // 5th order weights; b2 = 0
        let b1: T = coeff(35.0, 384.0);
        let b3: T = coeff(500.0, 1113.0);
        let b4: T = coeff(125.0, 192.0);
        let b5: T = coeff(-2187.0, 6784.0);
        let b6: T = coeff(11.0, 84.0);

        // b - b_hat; e2 = 0
        let e1: T = coeff(-71.0, 57600.0);
        let e3: T = coeff(71.0, 16695.0);
        let e4: T = coeff(-71.0, 1920.0);
        let e5: T = coeff(17253.0, 339200.0);
        let e6: T = coeff(-22.0, 525.0);
        let e7: T = coeff(1.0, 40.0);

        let n = y.len();

        // k2
        for i in 0..n {
            self.tmp[i] = y[i] + h * (a21 * f0[i]);
        }
        system.apply(t + c2 * h, &self.tmp, &mut self.k2);

        // k3
        for i in 0..n {
            self.tmp[i] = y[i] + h * (a31 * f0[i] + a32 * self.k2[i]);
        }
        system.apply(t + c3 * h, &self.tmp, &mut self.k3);

        // k4
        for i in 0..n {
            self.tmp[i] = y[i] + h * (a41 * f0[i] + a42 * self.k2[i] + a43 * self.k3[i]);
        }
        system.apply(t + c4 * h, &self.tmp, &mut self.k4);

        // k5
        for i in 0..n {
            self.tmp[i] = y[i]
                + h * (a51 * f0[i] + a52 * self.k2[i] + a53 * self.k3[i] + a54 * self.k4[i]);
        }
        system.apply(t + c5 * h, &self.tmp, &mut self.k5);

        // k6
        for i in 0..n {
            self.tmp[i] = y[i]
                + h * (a61 * f0[i]
                    + a62 * self.k2[i]
                    + a63 * self.k3[i]
                    + a64 * self.k4[i]
                    + a65 * self.k5[i]);
        }
        system.apply(t + h, &self.tmp, &mut self.k6);

        for i in 0..n {
            self.y_new[i] = y[i]
                + h * (b1 * f0[i]
                    + b3 * self.k3[i]
                    + b4 * self.k4[i]
                    + b5 * self.k5[i]
                    + b6 * self.k6[i]);
        }

        // k7 = f(t + h, y_new), reused as k1 of the next step
        system.apply(t + h, &self.y_new, &mut self.k7);

        for i in 0..n {
            self.err[i] = h
                * (e1 * f0[i]
                    + e3 * self.k3[i]
                    + e4 * self.k4[i]
                    + e5 * self.k5[i]
                    + e6 * self.k6[i]
                    + e7 * self.k7[i]);
        }
    }

    fn proposed(&self) -> &[T] {
        &self.y_new
    }

    fn proposed_derivative(&self) -> &[T] {
        &self.k7
    }

    fn error_estimate(&self) -> &[T] {
        &self.err
    }
}

#[cfg(test)]
mod tests {
    use super::DormandPrince45;
    use crate::traits::{DynamicalSystem, EmbeddedStepper};

    struct Decay;

    impl DynamicalSystem<f64> for Decay {
        fn dimension(&self) -> usize {
            1
        }

        fn apply(&self, _t: f64, x: &[f64], out: &mut [f64]) {
            out[0] = -x[0];
        }
    }

    struct Polynomial;

    impl DynamicalSystem<f64> for Polynomial {
        fn dimension(&self) -> usize {
            1
        }

        // dx/dt = 4 t^3 has the exact solution t^4, within reach of the 4th order estimate.
        fn apply(&self, t: f64, _x: &[f64], out: &mut [f64]) {
            out[0] = 4.0 * t * t * t;
        }
    }

    #[test]
    fn dormand_prince_matches_exponential_decay() {
        let mut stepper = DormandPrince45::<f64>::new(1);
        let y = [1.0];
        let f0 = [-1.0];
        stepper.attempt(&Decay, 0.0, &y, &f0, 0.1);

        let expected = (-0.1_f64).exp();
        assert!((stepper.proposed()[0] - expected).abs() < 1e-8);
        assert!((stepper.proposed_derivative()[0] + stepper.proposed()[0]).abs() < 1e-15);
        assert!(stepper.error_estimate()[0].abs() < 1e-6);
    }

    #[test]
    fn dormand_prince_error_vanishes_for_low_degree_polynomials() {
        let mut stepper = DormandPrince45::<f64>::new(1);
        let y = [0.0];
        let f0 = [0.0];
        stepper.attempt(&Polynomial, 0.0, &y, &f0, 0.5);

        assert!((stepper.proposed()[0] - 0.0625).abs() < 1e-14);
        assert!(stepper.error_estimate()[0].abs() < 1e-14);
    }

    #[test]
    fn dormand_prince_reports_error_order() {
        let stepper = DormandPrince45::<f64>::new(3);
        assert_eq!(stepper.error_order(), 4);
        assert_eq!(stepper.dimension(), 3);
    }
}
