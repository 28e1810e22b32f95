//! Max pooling over non-overlapping tiles. No learnable parameters.

use crate::math::{Shape, Tensor};

/// Reduces `(C, H, W)` to `(C, H / tile_rows, W / tile_cols)` by taking the
/// maximum of each tile. Trailing rows/columns that do not fill a whole tile
/// are ignored and receive zero gradient.
#[derive(Debug, Clone)]
pub struct MaxPooling {
    input: Shape,
    tile_rows: usize,
    tile_cols: usize,
}

impl MaxPooling {
    pub fn new(input: Shape, tile_rows: usize, tile_cols: usize) -> MaxPooling {
        assert!(tile_rows > 0 && tile_cols > 0, "pooling tile must be at least 1x1");
        assert!(
            tile_rows <= input.rows && tile_cols <= input.cols,
            "pooling tile {tile_rows}x{tile_cols} does not fit input {input}"
        );
        MaxPooling { input, tile_rows, tile_cols }
    }

    pub fn input_shape(&self) -> Shape {
        self.input
    }

    pub fn output_shape(&self) -> Shape {
        Shape::new(
            self.input.channels,
            self.input.rows / self.tile_rows,
            self.input.cols / self.tile_cols,
        )
    }

    pub fn forward(&mut self, input: &Tensor, output: &mut Tensor) {
        for chan in 0..output.channels() {
            for row in 0..output.rows() {
                for col in 0..output.cols() {
                    let mut max = f32::NEG_INFINITY;
                    for t_row in 0..self.tile_rows {
                        for t_col in 0..self.tile_cols {
                            let val = input[(chan, row * self.tile_rows + t_row, col * self.tile_cols + t_col)];
                            if val > max {
                                max = val;
                            }
                        }
                    }
                    output[(chan, row, col)] = max;
                }
            }
        }
    }

    /// Routes each output gradient to the first tile position, in row-major
    /// scan order, holding the recorded maximum.
    pub fn backward(
        &mut self,
        input: &Tensor,
        output: &Tensor,
        input_delta: &mut Tensor,
        output_delta: &Tensor,
    ) {
        input_delta.fill(0.0);

        for chan in 0..output.channels() {
            for row in 0..output.rows() {
                for col in 0..output.cols() {
                    let max = output[(chan, row, col)];
                    'tile: for t_row in 0..self.tile_rows {
                        for t_col in 0..self.tile_cols {
                            let pos = (chan, row * self.tile_rows + t_row, col * self.tile_cols + t_col);
                            if input[pos] >= max {
                                input_delta[pos] = output_delta[(chan, row, col)];
                                break 'tile;
                            }
                        }
                    }
                }
            }
        }
    }
}
