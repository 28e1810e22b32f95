use rand::Rng;
use std::f32::consts::PI;

use crate::activation::activation::ActivationFunction;
use crate::math::tensor::Tensor;

/// How the parameters of a layer are drawn at construction time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Initializer {
    /// Uniform on [-1, 1).
    Uniform,
    /// He: N(0, sqrt(2 / fan_in)). Suited to ReLU.
    He,
    /// Xavier (Glorot): N(0, sqrt(1 / fan_in)). Suited to Sigmoid/Tanh.
    Xavier,
    Zeros,
}

impl Initializer {
    /// Picks He for ReLU and Xavier for everything else.
    pub fn for_activation(activation: Option<ActivationFunction>) -> Initializer {
        match activation {
            Some(ActivationFunction::ReLU) => Initializer::He,
            _ => Initializer::Xavier,
        }
    }

    /// Fills `tensor` in place. `fan_in` is the number of inputs feeding one
    /// output unit.
    pub fn fill<R: Rng + ?Sized>(self, tensor: &mut Tensor, fan_in: usize, rng: &mut R) {
        match self {
            Initializer::Uniform => {
                for x in tensor.as_mut_slice() {
                    *x = rng.gen::<f32>() * 2.0 - 1.0;
                }
            }
            Initializer::He => normal(tensor, (2.0 / fan_in.max(1) as f32).sqrt(), rng),
            Initializer::Xavier => normal(tensor, (1.0 / fan_in.max(1) as f32).sqrt(), rng),
            Initializer::Zeros => tensor.fill(0.0),
        }
    }
}

fn normal<R: Rng + ?Sized>(tensor: &mut Tensor, std_dev: f32, rng: &mut R) {
    for x in tensor.as_mut_slice() {
        *x = sample_standard_normal(rng) * std_dev;
    }
}

/// Samples a single value from N(0, 1) using the Box-Muller transform.
fn sample_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    // Both uniforms in (0, 1] to avoid log(0).
    let u1: f32 = 1.0 - rng.gen::<f32>();
    let u2: f32 = 1.0 - rng.gen::<f32>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}
