use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::loss::loss_type::LossType;
use crate::math::Shape;

/// Shape of the data fed to the network. Must be the first layer description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDesc {
    pub channels: usize,
    pub rows: usize,
    pub cols: usize,
}

impl InputDesc {
    pub fn shape(&self) -> Shape {
        Shape::new(self.channels, self.rows, self.cols)
    }
}

/// Dense layer producing a `(1, num_outputs, 1)` column vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullyConnectedDesc {
    pub num_outputs: usize,
    #[serde(default)]
    pub activation: Option<ActivationFunction>,
}

/// Stride-1 valid convolution with `num_kernels` kernels of
/// `kernel_height × kernel_width`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvolutionalDesc {
    pub num_kernels: usize,
    pub kernel_width: usize,
    pub kernel_height: usize,
    pub activation: Option<ActivationFunction>,
}

impl Default for ConvolutionalDesc {
    fn default() -> Self {
        ConvolutionalDesc {
            num_kernels: 8,
            kernel_width: 3,
            kernel_height: 3,
            activation: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolingFunction {
    #[default]
    Max,
}

/// Non-overlapping pooling over `tile_height × tile_width` tiles.
///
/// `tile_height` spans rows and `tile_width` spans columns. Descriptions
/// written for MaxML, which steps rows by the tile width, come out
/// transposed here unless the tile is square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolingDesc {
    pub tile_width: usize,
    pub tile_height: usize,
    pub function: PoolingFunction,
}

impl Default for PoolingDesc {
    fn default() -> Self {
        PoolingDesc {
            tile_width: 2,
            tile_height: 2,
            function: PoolingFunction::Max,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FlattenDesc {}

/// Describes one entry of a network architecture.
///
/// Serialized as `{"kind": "...", "description": {...}}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "description")]
pub enum LayerDesc {
    Input(InputDesc),
    FullyConnected(FullyConnectedDesc),
    Convolutional(ConvolutionalDesc),
    Pooling(PoolingDesc),
    Flatten(FlattenDesc),
}

/// A fully serializable description of a network architecture plus its
/// loss function and learning rate.
///
/// Only the architecture is described; trained parameters are never stored.
/// Build one in code with the chained helpers or load it from JSON:
///
/// ```
/// use ferrite_cnn::{SequentialDesc, LossType, ActivationFunction};
///
/// let desc = SequentialDesc::new("regression", LossType::Mse, 0.1)
///     .input(1, 1, 1)
///     .fully_connected(16, Some(ActivationFunction::Sigmoid))
///     .fully_connected(1, Some(ActivationFunction::Sigmoid));
/// assert_eq!(desc.layers.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequentialDesc {
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Loss function the network is trained against.
    #[serde(default)]
    pub loss: LossType,
    pub learning_rate: f32,
    /// Ordered layer descriptions; the first must be `Input`.
    pub layers: Vec<LayerDesc>,
}

impl SequentialDesc {
    pub fn new(name: &str, loss: LossType, learning_rate: f32) -> SequentialDesc {
        SequentialDesc {
            name: name.to_string(),
            loss,
            learning_rate,
            layers: Vec::new(),
        }
    }

    pub fn layer(mut self, layer: LayerDesc) -> SequentialDesc {
        self.layers.push(layer);
        self
    }

    pub fn input(self, channels: usize, rows: usize, cols: usize) -> SequentialDesc {
        self.layer(LayerDesc::Input(InputDesc { channels, rows, cols }))
    }

    pub fn fully_connected(
        self,
        num_outputs: usize,
        activation: Option<ActivationFunction>,
    ) -> SequentialDesc {
        self.layer(LayerDesc::FullyConnected(FullyConnectedDesc { num_outputs, activation }))
    }

    pub fn convolutional(
        self,
        num_kernels: usize,
        kernel_width: usize,
        kernel_height: usize,
        activation: Option<ActivationFunction>,
    ) -> SequentialDesc {
        self.layer(LayerDesc::Convolutional(ConvolutionalDesc {
            num_kernels,
            kernel_width,
            kernel_height,
            activation,
        }))
    }

    pub fn pooling(self, tile_width: usize, tile_height: usize) -> SequentialDesc {
        self.layer(LayerDesc::Pooling(PoolingDesc {
            tile_width,
            tile_height,
            function: PoolingFunction::Max,
        }))
    }

    pub fn flatten(self) -> SequentialDesc {
        self.layer(LayerDesc::Flatten(FlattenDesc {}))
    }

    /// Serializes the description to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }

    /// Deserializes a `SequentialDesc` from a JSON file.
    pub fn load_json(path: &str) -> std::io::Result<SequentialDesc> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }
}
