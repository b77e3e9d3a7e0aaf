use rand::Rng;

use crate::activation::sigmoid;
use crate::error::{Error, Result};
use crate::loss::SquaredError;
use crate::network::buffer::ParameterBuffer;
use crate::network::spec::NetworkSpec;

/// A one-hidden-layer regression network: sigmoid hidden units, one linear
/// output unit, trained with single-example SGD on squared error.
///
/// `forward` caches hidden activations in the parameter buffer's scratch
/// region and primes the network; `backward` consumes that priming and fails
/// with [`Error::NotPrimed`] unless the immediately preceding `forward` ran on
/// the same input. [`Network::train_step`] does both in one call.
#[derive(Debug, Clone)]
pub struct Network {
    learning_rate: f64,
    params: ParameterBuffer,
    output_bias: f64,
    output_activation: f64,
    // Copy of the input of the last forward pass; valid while `primed`.
    last_input: Vec<f64>,
    primed: bool,
}

impl Network {
    /// Builds a network with every weight and bias drawn uniformly from `[0, 1)`.
    pub fn new<R: Rng + ?Sized>(spec: &NetworkSpec, rng: &mut R) -> Result<Network> {
        spec.validate()?;
        let params = ParameterBuffer::zeros(spec.input_size, spec.hidden_size)?;
        let mut net = Network::from_parts(spec.learning_rate, params, 0.0)?;
        net.randomize(rng);
        Ok(net)
    }

    /// Assembles a network from already-initialized parameters.
    pub fn from_parts(
        learning_rate: f64,
        params: ParameterBuffer,
        output_bias: f64,
    ) -> Result<Network> {
        NetworkSpec::new(params.input_size(), params.hidden_size(), learning_rate).validate()?;
        let input_size = params.input_size();
        let mut net = Network {
            learning_rate,
            params,
            output_bias,
            output_activation: 0.0,
            last_input: vec![0.0; input_size],
            primed: false,
        };
        net.params.clear_scratch();
        Ok(net)
    }

    fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let hidden = self.hidden_size();
        let inputs = self.input_size();
        let r = self.params.regions_mut();
        for i in 0..hidden {
            for j in 0..inputs {
                r.w_in[j * hidden + i] = rng.gen::<f64>();
            }
            r.b_hidden[i] = rng.gen::<f64>();
            r.w_out[i] = rng.gen::<f64>();
        }
        self.output_bias = rng.gen::<f64>();
    }

    #[inline]
    pub fn input_size(&self) -> usize {
        self.params.input_size()
    }

    #[inline]
    pub fn hidden_size(&self) -> usize {
        self.params.hidden_size()
    }

    #[inline]
    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    #[inline]
    pub fn output_bias(&self) -> f64 {
        self.output_bias
    }

    pub fn set_output_bias(&mut self, bias: f64) {
        self.output_bias = bias;
        self.primed = false;
    }

    /// Output of the most recent forward pass.
    #[inline]
    pub fn output_activation(&self) -> f64 {
        self.output_activation
    }

    #[inline]
    pub fn params(&self) -> &ParameterBuffer {
        &self.params
    }

    /// Mutable access to the packed parameters. Drops any pending priming.
    pub fn params_mut(&mut self) -> &mut ParameterBuffer {
        self.primed = false;
        &mut self.params
    }

    pub fn spec(&self) -> NetworkSpec {
        NetworkSpec::new(self.input_size(), self.hidden_size(), self.learning_rate)
    }

    /// Whether a `backward` call is currently allowed.
    #[inline]
    pub fn is_primed(&self) -> bool {
        self.primed
    }

    pub(crate) fn unprime(&mut self) {
        self.primed = false;
    }

    fn check_input(&self, x: &[f64]) -> Result<()> {
        if x.len() != self.input_size() {
            return Err(Error::DimensionMismatch {
                expected: self.input_size(),
                actual: x.len(),
            });
        }
        Ok(())
    }

    /// Runs `x` through the network and returns the output activation.
    ///
    /// Overwrites the hidden activation cache and primes the network for one
    /// `backward` call on the same `x`.
    pub fn forward(&mut self, x: &[f64]) -> Result<f64> {
        self.check_input(x)?;
        let out = self.forward_unchecked(x);
        self.last_input.copy_from_slice(x);
        self.primed = true;
        Ok(out)
    }

    fn forward_unchecked(&mut self, x: &[f64]) -> f64 {
        let hidden = self.hidden_size();
        let r = self.params.regions_mut();

        r.a_hidden.fill(0.0);
        self.output_activation = 0.0;

        for (&xj, row) in x.iter().zip(r.w_in.chunks_exact(hidden)) {
            for (a, &w) in r.a_hidden.iter_mut().zip(row) {
                *a += xj * w;
            }
        }
        for (a, &b) in r.a_hidden.iter_mut().zip(r.b_hidden.iter()) {
            *a = sigmoid(*a + b);
        }
        for (&a, &w) in r.a_hidden.iter().zip(r.w_out.iter()) {
            self.output_activation += a * w;
        }
        self.output_activation += self.output_bias;
        self.output_activation
    }

    /// One SGD update on squared error against label `y`.
    ///
    /// Must directly follow `forward(x)` with a bitwise-identical `x`; anything
    /// else returns [`Error::NotPrimed`] and leaves the parameters untouched.
    pub fn backward(&mut self, x: &[f64], y: i32) -> Result<()> {
        self.check_input(x)?;
        let same_input = self
            .last_input
            .iter()
            .zip(x)
            .all(|(a, b)| a.to_bits() == b.to_bits());
        if !self.primed || !same_input {
            return Err(Error::NotPrimed);
        }
        self.primed = false;
        self.apply_gradients(x, y);
        Ok(())
    }

    // Every gradient below reads A_hidden, W_out[i] and output_activation
    // before the corresponding parameter is written.
    fn apply_gradients(&mut self, x: &[f64], y: i32) {
        let lr = self.learning_rate;
        let hidden = self.hidden_size();

        let grad_output = SquaredError::derivative(self.output_activation, y);
        self.output_bias -= lr * grad_output;

        let r = self.params.regions_mut();
        for i in 0..hidden {
            let a = r.a_hidden[i];
            let grad_w_out = grad_output * a;
            let grad_b_hidden = grad_output * r.w_out[i] * a * (1.0 - a);
            r.w_out[i] -= lr * grad_w_out;
            r.b_hidden[i] -= lr * grad_b_hidden;
            for (j, &xj) in x.iter().enumerate() {
                r.w_in[j * hidden + i] -= lr * (xj * grad_b_hidden);
            }
        }
    }

    /// Forward followed by backward on one labeled example.
    ///
    /// Returns the prediction made before the update.
    pub fn train_step(&mut self, x: &[f64], y: i32) -> Result<f64> {
        self.check_input(x)?;
        let out = self.forward_unchecked(x);
        self.primed = false;
        self.apply_gradients(x, y);
        Ok(out)
    }

    /// Forward pass rounded to the nearest integer label. Does not prime.
    ///
    /// The unrounded value stays readable through [`Network::output_activation`].
    pub fn predict_label(&mut self, x: &[f64]) -> Result<i32> {
        self.check_input(x)?;
        let out = self.forward_unchecked(x);
        self.primed = false;
        Ok(out.round() as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn tiny() -> Network {
        // input_size=2, hidden_size=1, W_in=[1,1], B_hidden=[0], W_out=[1]
        let params = ParameterBuffer::from_vec(2, 1, vec![1.0, 1.0, 0.0, 0.0, 1.0]).unwrap();
        Network::from_parts(0.05, params, 0.0).unwrap()
    }

    #[test]
    fn zero_input_gives_half() {
        let mut net = tiny();
        assert_eq!(net.forward(&[0.0, 0.0]).unwrap(), 0.5);
        assert_eq!(net.params().a_hidden(), &[0.5]);
        assert_eq!(net.output_activation(), 0.5);
    }

    #[test]
    fn forward_is_deterministic() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut net = Network::new(&NetworkSpec::new(3, 4, 0.05), &mut rng).unwrap();
        let x = [0.3, -1.2, 2.5];
        let a = net.forward(&x).unwrap();
        let b = net.forward(&x).unwrap();
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn seeded_init_is_reproducible_and_in_unit_interval() {
        let spec = NetworkSpec::new(4, 3, 0.05);
        let a = Network::new(&spec, &mut StdRng::seed_from_u64(11)).unwrap();
        let b = Network::new(&spec, &mut StdRng::seed_from_u64(11)).unwrap();
        assert!(a.params().same_parameters(b.params()));
        assert_eq!(a.output_bias(), b.output_bias());

        let p = a.params();
        for &v in p.w_in().iter().chain(p.b_hidden()).chain(p.w_out()) {
            assert!((0.0..1.0).contains(&v));
        }
        assert!(p.a_hidden().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn backward_applies_hand_computed_update() {
        let mut net = tiny();
        let x = [0.0, 0.0];
        net.forward(&x).unwrap();
        net.backward(&x, 1).unwrap();

        // grad_output = 2 * (0.5 - 1) = -1
        let lr = 0.05;
        assert_eq!(net.output_bias(), lr);
        // W_out -= lr * (-1 * 0.5)
        assert_eq!(net.params().w_out(), &[1.0 + lr * 0.5]);
        // B_hidden -= lr * (-1 * 1 * 0.5 * 0.5)
        assert_eq!(net.params().b_hidden(), &[lr * 0.25]);
        // x is zero, so W_in is unchanged
        assert_eq!(net.params().w_in(), &[1.0, 1.0]);
    }

    #[test]
    fn backward_matches_numeric_gradient() {
        let mut rng = StdRng::seed_from_u64(3);
        let spec = NetworkSpec::new(3, 2, 1e-3);
        let base = Network::new(&spec, &mut rng).unwrap();
        let x = [0.4, -0.3, 0.9];
        let y = 2;

        let loss_at = |net: &Network| {
            let mut probe = net.clone();
            SquaredError::loss(probe.forward(&x).unwrap(), y)
        };

        let mut trained = base.clone();
        trained.forward(&x).unwrap();
        trained.backward(&x, y).unwrap();

        // Each step moves a parameter by -lr * dL/dp.
        let eps = 1e-6;
        for p in 0..base.params().w_in().len() {
            let mut plus = base.clone();
            plus.params_mut().w_in_mut()[p] += eps;
            let mut minus = base.clone();
            minus.params_mut().w_in_mut()[p] -= eps;
            let numeric = (loss_at(&plus) - loss_at(&minus)) / (2.0 * eps);
            let analytic =
                (base.params().w_in()[p] - trained.params().w_in()[p]) / spec.learning_rate;
            assert!(
                (numeric - analytic).abs() < 1e-5,
                "w_in[{p}]: numeric={numeric} analytic={analytic}"
            );
        }
        for i in 0..base.hidden_size() {
            let mut plus = base.clone();
            plus.params_mut().w_out_mut()[i] += eps;
            let mut minus = base.clone();
            minus.params_mut().w_out_mut()[i] -= eps;
            let numeric = (loss_at(&plus) - loss_at(&minus)) / (2.0 * eps);
            let analytic =
                (base.params().w_out()[i] - trained.params().w_out()[i]) / spec.learning_rate;
            assert!((numeric - analytic).abs() < 1e-5, "w_out[{i}]");
        }
    }

    #[test]
    fn backward_without_forward_fails() {
        let mut net = tiny();
        assert!(matches!(net.backward(&[0.0, 0.0], 1), Err(Error::NotPrimed)));
    }

    #[test]
    fn backward_on_different_input_fails() {
        let mut net = tiny();
        net.forward(&[0.0, 0.0]).unwrap();
        let before = net.params().clone();
        assert!(matches!(net.backward(&[1.0, 0.0], 1), Err(Error::NotPrimed)));
        assert_eq!(net.params(), &before);
    }

    #[test]
    fn backward_twice_fails() {
        let mut net = tiny();
        net.forward(&[0.0, 0.0]).unwrap();
        net.backward(&[0.0, 0.0], 1).unwrap();
        assert!(matches!(net.backward(&[0.0, 0.0], 1), Err(Error::NotPrimed)));
    }

    #[test]
    fn train_step_equals_forward_then_backward() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut a = Network::new(&NetworkSpec::new(2, 3, 0.05), &mut rng).unwrap();
        let mut b = a.clone();
        let x = [0.25, -0.75];

        let pred_a = a.train_step(&x, 1).unwrap();
        let pred_b = b.forward(&x).unwrap();
        b.backward(&x, 1).unwrap();

        assert_eq!(pred_a.to_bits(), pred_b.to_bits());
        assert!(a.params().same_parameters(b.params()));
        assert_eq!(a.output_bias().to_bits(), b.output_bias().to_bits());
        assert!(!a.is_primed());
    }

    #[test]
    fn input_length_is_checked() {
        let mut net = tiny();
        assert!(matches!(
            net.forward(&[0.0]),
            Err(Error::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        ));
        assert!(net.train_step(&[0.0, 0.0, 0.0], 0).is_err());
    }

    #[test]
    fn predict_label_rounds_and_does_not_prime() {
        let mut net = tiny();
        net.set_output_bias(1.2);
        // 0.5 + 1.2 = 1.7
        assert_eq!(net.predict_label(&[0.0, 0.0]).unwrap(), 2);
        assert_eq!(net.output_activation(), 1.7);
        assert!(!net.is_primed());
    }
}
