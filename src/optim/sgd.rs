use crate::layers::Layer;

/// Plain stochastic gradient descent with a fixed learning rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sgd {
    pub learning_rate: f32,
}

impl Sgd {
    pub fn new(learning_rate: f32) -> Sgd {
        Sgd { learning_rate }
    }

    /// Applies the gradients stored by the layer's last backward pass.
    pub fn step(&self, layer: &mut Layer) {
        layer.update(self.learning_rate);
    }
}
