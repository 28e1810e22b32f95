use crate::{math::Tensor, network::sequential::Sequential};

/// One online pass over `samples` in order: a forward, backward and update
/// per example. Returns the mean loss of the pass.
pub fn train_network(network: &mut Sequential, samples: &[(Tensor, Tensor)]) -> f32 {
    let mut total_loss = 0.0;

    for (input, expected) in samples {
        network.feed_forward(input);
        total_loss += network.feed_backward(expected);
    }

    total_loss / samples.len().max(1) as f32
}
