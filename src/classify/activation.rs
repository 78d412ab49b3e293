use serde::{Serialize, Deserialize};
use std::f64::consts::E;

/// Output activation of a dense layer.
///
/// `Softmax` normalizes the whole output vector and is therefore applied by
/// [`Activation::apply`] rather than element by element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Activation {
    Sigmoid,
    ReLU,
    Identity,
    Softmax,
    Tanh,
    LeakyReLU { alpha: f64 },
}

impl Activation {
    /// Applies the activation in place to a layer's pre-activation values.
    pub fn apply(&self, z: &mut [f64]) {
        match self {
            Activation::Softmax => softmax(z),
            other => z.iter_mut().for_each(|x| *x = other.scalar(*x)),
        }
    }

    fn scalar(&self, x: f64) -> f64 {
        match self {
            Activation::Sigmoid => 1.0 / (1.0 + E.powf(-x)),
            Activation::ReLU => if x > 0.0 { x } else { 0.0 },
            Activation::Identity => x,
            Activation::Tanh => x.tanh(),
            Activation::LeakyReLU { alpha } => if x > 0.0 { x } else { alpha * x },
            // handled as a vector op in apply()
            Activation::Softmax => x,
        }
    }
}

/// Numerically stable softmax (shifted by the max).
fn softmax(z: &mut [f64]) {
    let max = z.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let mut sum = 0.0;
    for x in z.iter_mut() {
        *x = (*x - max).exp();
        sum += *x;
    }
    if sum > 0.0 {
        z.iter_mut().for_each(|x| *x /= sum);
    }
}
