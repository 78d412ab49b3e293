use serde::{Serialize, Deserialize};

use crate::classify::activation::Activation;

/// How an image is turned into the network's input vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InputType {
    /// Grayscale image resized to width×height, normalized to [0, 1].
    ImageGrayscale { width: u32, height: u32 },
    /// RGB image resized to width×height, normalized to [0, 1], flattened as R,G,B,...
    ImageRgb { width: u32, height: u32 },
}

impl InputType {
    /// Length of the input vector this input type produces.
    pub fn input_len(&self) -> usize {
        match *self {
            InputType::ImageGrayscale { width, height } => width as usize * height as usize,
            InputType::ImageRgb { width, height } => width as usize * height as usize * 3,
        }
    }
}

/// One fully connected layer: `a = act(W·x + b)`.
///
/// `weights` holds one row per output neuron; every row is as long as the
/// layer's input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseLayer {
    pub weights: Vec<Vec<f64>>,
    pub biases: Vec<f64>,
    pub activation: Activation,
}

impl DenseLayer {
    pub fn input_len(&self) -> usize {
        self.weights.first().map(|r| r.len()).unwrap_or(0)
    }

    pub fn output_len(&self) -> usize {
        self.weights.len()
    }

    fn forward(&self, input: &[f64]) -> Vec<f64> {
        let mut z: Vec<f64> = self.weights.iter()
            .zip(self.biases.iter())
            .map(|(row, b)| row.iter().zip(input).map(|(w, x)| w * x).sum::<f64>() + b)
            .collect();
        self.activation.apply(&mut z);
        z
    }
}

/// A feed-forward image classifier as stored in `<model_dir>/<id>.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    pub input: InputType,
    /// Class labels for the output neurons; "0".."n-1" when absent.
    #[serde(default)]
    pub labels: Option<Vec<String>>,
    pub layers: Vec<DenseLayer>,
}

impl Model {
    /// Deserializes a model file and checks that its shapes line up.
    pub fn load_json(path: &std::path::Path) -> Result<Model, String> {
        let file = std::fs::File::open(path)
            .map_err(|e| format!("could not open model '{}': {}", path.display(), e))?;
        let reader = std::io::BufReader::new(file);
        let model: Model = serde_json::from_reader(reader)
            .map_err(|e| format!("invalid model '{}': {}", path.display(), e))?;
        model.check_shapes()?;
        Ok(model)
    }

    /// Serializes the model to a pretty-printed JSON file.
    pub fn save_json(&self, path: &std::path::Path) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }

    /// Verifies layer chaining, bias lengths and the label count.
    pub fn check_shapes(&self) -> Result<(), String> {
        if self.layers.is_empty() {
            return Err("model has no layers".into());
        }
        let mut expected = self.input.input_len();
        for (i, layer) in self.layers.iter().enumerate() {
            if layer.output_len() == 0 {
                return Err(format!("layer {} has no neurons", i));
            }
            if let Some(row) = layer.weights.iter().position(|r| r.len() != expected) {
                return Err(format!(
                    "layer {} row {} has {} weights, expected {}",
                    i, row, layer.weights[row].len(), expected
                ));
            }
            if layer.biases.len() != layer.output_len() {
                return Err(format!(
                    "layer {} has {} biases for {} neurons",
                    i, layer.biases.len(), layer.output_len()
                ));
            }
            expected = layer.output_len();
        }
        if let Some(labels) = &self.labels {
            if labels.len() != expected {
                return Err(format!("{} labels for {} outputs", labels.len(), expected));
            }
        }
        Ok(())
    }

    /// Runs the input through every layer.
    pub fn forward(&self, input: Vec<f64>) -> Vec<f64> {
        self.layers.iter().fold(input, |current, layer| layer.forward(&current))
    }

    pub fn output_len(&self) -> usize {
        self.layers.last().map(|l| l.output_len()).unwrap_or(0)
    }

    pub fn label_for(&self, i: usize) -> String {
        self.labels.as_ref()
            .and_then(|l| l.get(i))
            .cloned()
            .unwrap_or_else(|| i.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_model() -> Model {
        Model {
            input: InputType::ImageGrayscale { width: 2, height: 1 },
            labels: Some(vec!["dark".into(), "light".into()]),
            layers: vec![DenseLayer {
                weights: vec![vec![-1.0, -1.0], vec![1.0, 1.0]],
                biases: vec![0.0, 0.0],
                activation: Activation::Softmax,
            }],
        }
    }

    #[test]
    fn forward_prefers_matching_class() {
        let model = tiny_model();
        let out = model.forward(vec![1.0, 1.0]);
        assert!(out[1] > out[0]);
        let out = model.forward(vec![0.0, 0.0]);
        assert!((out[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn shape_mismatch_is_reported() {
        let mut model = tiny_model();
        model.layers[0].weights[1].push(0.0);
        assert!(model.check_shapes().unwrap_err().contains("row 1"));

        let mut model = tiny_model();
        model.labels = Some(vec!["only".into()]);
        assert!(model.check_shapes().is_err());

        let mut model = tiny_model();
        model.layers.clear();
        assert!(model.check_shapes().is_err());
    }

    #[test]
    fn json_uses_tagged_input_type() {
        let json = r#"{
            "input": { "type": "ImageRgb", "width": 1, "height": 1 },
            "layers": [ { "weights": [[0.1, 0.2, 0.3]], "biases": [0.0], "activation": "Sigmoid" } ]
        }"#;
        let model: Model = serde_json::from_str(json).unwrap();
        assert_eq!(model.input.input_len(), 3);
        assert!(model.check_shapes().is_ok());
        assert_eq!(model.label_for(0), "0");
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.json");
        tiny_model().save_json(&path).unwrap();
        let loaded = Model::load_json(&path).unwrap();
        assert_eq!(loaded.label_for(1), "light");
    }
}
