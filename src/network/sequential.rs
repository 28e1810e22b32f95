use rand::Rng;

use crate::activation::activation::ActivationFunction;
use crate::layers::{Activation, Convolutional, Flatten, FullyConnected, Layer, MaxPooling};
use crate::loss::loss_type::LossType;
use crate::math::{Initializer, Shape, Tensor};
use crate::network::desc::{LayerDesc, SequentialDesc};
use crate::optim::sgd::Sgd;

/// A chain of layers trained one example at a time.
///
/// Boundary `i` of the `data` chain is both the input of layer `i` and the
/// output of layer `i - 1`; the network owns one tensor per boundary and
/// hands neighbouring layers the same tensor. The `delta` chain mirrors it
/// with gradients flowing the other way.
///
/// A training step is `feed_forward` followed by `feed_backward`, which
/// computes the loss, runs the backward pass and applies the update before
/// returning.
pub struct Sequential {
    layers: Vec<Layer>,
    data: Vec<Tensor>,
    delta: Vec<Tensor>,
    loss: LossType,
    optimizer: Sgd,
    desc: SequentialDesc,
}

impl Sequential {
    /// Builds the network with parameters drawn from the thread RNG.
    pub fn new(desc: SequentialDesc) -> Sequential {
        Sequential::with_rng(desc, &mut rand::thread_rng())
    }

    /// Builds the network with parameters drawn from `rng`.
    ///
    /// # Panics
    /// If the first description is not `Input`, if `Input` appears again
    /// later, or if a layer does not fit the shape produced before it.
    pub fn with_rng<R: Rng + ?Sized>(desc: SequentialDesc, rng: &mut R) -> Sequential {
        let mut descs = desc.layers.iter();
        let mut shape = match descs.next() {
            Some(LayerDesc::Input(input)) => input.shape(),
            other => panic!("a network description must start with an Input layer, found {other:?}"),
        };
        assert!(shape.size() > 0, "input shape {shape} is empty");

        let mut layers = Vec::new();
        for layer_desc in descs {
            match layer_desc {
                LayerDesc::Input(_) => panic!("Input may only appear as the first layer"),
                LayerDesc::FullyConnected(fc) => {
                    assert!(
                        shape.channels == 1 && shape.cols == 1,
                        "a fully-connected layer needs a (1, n, 1) input, got {shape}; add a Flatten layer first"
                    );
                    let init = Initializer::for_activation(fc.activation);
                    let layer = FullyConnected::with_init(shape.rows, fc.num_outputs, init, rng);
                    push_with_activation(&mut layers, Layer::FullyConnected(layer), fc.activation);
                }
                LayerDesc::Convolutional(conv) => {
                    let init = Initializer::for_activation(conv.activation);
                    let layer = Convolutional::with_init(
                        shape,
                        conv.num_kernels,
                        conv.kernel_height,
                        conv.kernel_width,
                        init,
                        rng,
                    );
                    push_with_activation(&mut layers, Layer::Convolutional(layer), conv.activation);
                }
                LayerDesc::Pooling(pool) => {
                    layers.push(Layer::MaxPooling(MaxPooling::new(shape, pool.tile_height, pool.tile_width)));
                }
                LayerDesc::Flatten(_) => layers.push(Layer::Flatten(Flatten::new(shape))),
            }
            shape = layers.last().map_or(shape, Layer::output_shape);
        }

        let mut boundaries = Vec::with_capacity(layers.len() + 1);
        boundaries.push(layers.first().map_or(shape, Layer::input_shape));
        boundaries.extend(layers.iter().map(Layer::output_shape));

        Sequential {
            data: boundaries.iter().map(|&s| Tensor::zeros(s)).collect(),
            delta: boundaries.iter().map(|&s| Tensor::zeros(s)).collect(),
            layers,
            loss: desc.loss,
            optimizer: Sgd::new(desc.learning_rate),
            desc,
        }
    }

    /// Runs every layer in order and returns the final output.
    ///
    /// The returned tensor belongs to the network and is overwritten by the
    /// next call.
    ///
    /// # Panics
    /// If `input` does not have the declared input shape.
    pub fn feed_forward(&mut self, input: &Tensor) -> &Tensor {
        assert_eq!(
            input.shape(),
            self.input_shape(),
            "network input must be {}, got {}",
            self.input_shape(),
            input.shape()
        );
        self.data[0].copy_from(input);

        for (i, layer) in self.layers.iter_mut().enumerate() {
            let (before, after) = self.data.split_at_mut(i + 1);
            layer.forward(&before[i], &mut after[0]);
        }

        self.output()
    }

    /// Loss of the last forward pass against `expected`, followed by the
    /// backward pass through every layer and one SGD update. Returns the loss.
    ///
    /// Must follow a `feed_forward` on the same example.
    pub fn feed_backward(&mut self, expected: &Tensor) -> f32 {
        let last = self.layers.len();
        let loss = self.loss.loss(&self.data[last], expected);
        self.loss.derivative_into(&self.data[last], expected, &mut self.delta[last]);

        for i in (0..last).rev() {
            let (delta_in, delta_out) = self.delta.split_at_mut(i + 1);
            self.layers[i].backward(
                &self.data[i],
                &self.data[i + 1],
                &mut delta_in[i],
                &delta_out[0],
            );
        }

        for layer in &mut self.layers {
            self.optimizer.step(layer);
        }

        loss
    }

    /// Loss of the cached output against `expected`, without training.
    pub fn loss(&self, expected: &Tensor) -> f32 {
        self.loss.loss(self.output(), expected)
    }

    /// Output of the most recent forward pass.
    pub fn output(&self) -> &Tensor {
        &self.data[self.layers.len()]
    }

    pub fn input_shape(&self) -> Shape {
        self.data[0].shape()
    }

    pub fn output_shape(&self) -> Shape {
        self.output().shape()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn loss_type(&self) -> LossType {
        self.loss
    }

    pub fn learning_rate(&self) -> f32 {
        self.optimizer.learning_rate
    }

    pub fn desc(&self) -> &SequentialDesc {
        &self.desc
    }
}

fn push_with_activation(layers: &mut Vec<Layer>, layer: Layer, activation: Option<ActivationFunction>) {
    let shape = layer.output_shape();
    layers.push(layer);
    if let Some(function) = activation {
        layers.push(Layer::Activation(Activation::new(shape, function)));
    }
}
