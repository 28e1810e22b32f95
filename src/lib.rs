//! # ferrite-cnn
//!
//! A from-scratch feed-forward network engine: aligned SIMD tensors, a closed
//! set of layers (fully-connected, convolutional, max pooling, flatten,
//! activation) and a `Sequential` orchestrator trained by online gradient
//! descent.
//!
//! ```
//! use ferrite_cnn::{ActivationFunction, LossType, Sequential, SequentialDesc, Tensor};
//!
//! let desc = SequentialDesc::new("tiny", LossType::Mse, 0.1)
//!     .input(1, 2, 1)
//!     .fully_connected(1, Some(ActivationFunction::Sigmoid));
//! let mut net = Sequential::new(desc);
//!
//! let x = Tensor::from(vec![1.0, 0.0]);
//! let y = Tensor::from(vec![1.0]);
//! net.feed_forward(&x);
//! let loss = net.feed_backward(&y);
//! assert!(loss.is_finite());
//! ```

pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod loss;
pub mod optim;
pub mod train;

// Convenience re-exports
pub use math::{Initializer, Shape, Tensor};
pub use activation::activation::ActivationFunction;
pub use layers::Layer;
pub use network::{Sequential, SequentialDesc, LayerDesc};
pub use loss::LossType;
pub use optim::sgd::Sgd;
pub use train::{train_loop, train_network, TrainConfig, TrainStats};
