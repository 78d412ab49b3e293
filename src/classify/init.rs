use rand::prelude::*;
use std::f64::consts::PI;

use crate::classify::activation::Activation;
use crate::classify::model::{DenseLayer, InputType, Model};

/// Builds an untrained model with Xavier-initialized weights.
///
/// Useful for exercising the classification pipeline before a trained model
/// is available. With `hidden` set, a ReLU hidden layer of that width sits
/// in front of the softmax output.
pub fn scaffold_model(input: InputType, labels: Vec<String>, hidden: Option<usize>) -> Model {
    let mut rng = rand::thread_rng();
    let mut layers = Vec::new();
    let mut fan_in = input.input_len();

    if let Some(width) = hidden.filter(|&w| w > 0) {
        layers.push(xavier_layer(&mut rng, fan_in, width, Activation::ReLU));
        fan_in = width;
    }
    layers.push(xavier_layer(&mut rng, fan_in, labels.len(), Activation::Softmax));

    Model { input, labels: Some(labels), layers }
}

/// Weights from N(0, sqrt(1 / fan_in)), zero biases.
fn xavier_layer(rng: &mut ThreadRng, fan_in: usize, size: usize, activation: Activation) -> DenseLayer {
    let std_dev = (1.0 / fan_in.max(1) as f64).sqrt();
    let weights = (0..size)
        .map(|_| (0..fan_in).map(|_| sample_standard_normal(rng) * std_dev).collect())
        .collect();
    DenseLayer { weights, biases: vec![0.0; size], activation }
}

/// Box-Muller; both uniforms are drawn from (0, 1] to avoid log(0).
fn sample_standard_normal(rng: &mut ThreadRng) -> f64 {
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = 1.0 - rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaffolded_model_has_consistent_shapes() {
        let labels = vec!["a".to_owned(), "b".to_owned(), "c".to_owned()];
        let model = scaffold_model(InputType::ImageRgb { width: 4, height: 4 }, labels, Some(8));
        assert!(model.check_shapes().is_ok());
        assert_eq!(model.layers.len(), 2);
        assert_eq!(model.layers[0].input_len(), 48);
        assert_eq!(model.output_len(), 3);

        let out = model.forward(vec![0.5; 48]);
        assert!((out.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn zero_hidden_width_means_single_layer() {
        let model = scaffold_model(
            InputType::ImageGrayscale { width: 2, height: 2 },
            vec!["x".into(), "y".into()],
            Some(0),
        );
        assert_eq!(model.layers.len(), 1);
    }
}
