//! Flatten: `(C, H, W)` → `(1, C·H·W, 1)`.
//!
//! The data keeps its order; only the shape changes. Forward and backward are
//! plain copies between the differently shaped boundary tensors.

use crate::math::{Shape, Tensor};

#[derive(Debug, Clone)]
pub struct Flatten {
    input: Shape,
}

impl Flatten {
    pub fn new(input: Shape) -> Flatten {
        Flatten { input }
    }

    pub fn input_shape(&self) -> Shape {
        self.input
    }

    pub fn output_shape(&self) -> Shape {
        Shape::new(1, self.input.size(), 1)
    }

    pub fn forward(&mut self, input: &Tensor, output: &mut Tensor) {
        output.copy_from(input);
    }

    pub fn backward(&mut self, input_delta: &mut Tensor, output_delta: &Tensor) {
        input_delta.copy_from(output_delta);
    }
}
