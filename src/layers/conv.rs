use rand::Rng;

use crate::math::{Initializer, Shape, Tensor};

/// Valid, stride-1 convolution computed as one batched matrix product.
///
/// Every input channel is convolved with each of the `K` kernels, giving
/// `in_channels * K` output channels ordered channel-major
/// (`c * K + k`). Each input channel keeps its own copy of the kernels, so
/// after the first update the copies evolve independently.
///
/// Windowing: the input is gathered into `(in_channels, kr * kc, out_rows *
/// out_cols)` where row `a * kc + b` is kernel offset `(a, b)` and column
/// `oc * out_rows + or` is output position `(or, oc)` in column-major order.
/// The product with the `(in_channels, K, kr * kc)` kernel matrix therefore
/// holds each output plane transposed, which a per-channel transpose undoes.
#[derive(Debug, Clone)]
pub struct Convolutional {
    input: Shape,
    num_kernels: usize,
    kernel_cols: usize,
    out_rows: usize,
    out_cols: usize,
    /// `(in_channels, K, kr * kc)`.
    pub kernel: Tensor,
    delta_kernel: Tensor,
    input_windowed: Tensor,
    delta_input_windowed: Tensor,
}

impl Convolutional {
    /// `kernel` has shape `(K, kernel_rows, kernel_cols)` and is replicated
    /// into every input channel.
    pub fn new(input: Shape, kernel: &Tensor) -> Convolutional {
        let (num_kernels, kernel_rows, kernel_cols) = (kernel.channels(), kernel.rows(), kernel.cols());
        assert!(
            num_kernels > 0 && kernel_rows > 0 && kernel_cols > 0,
            "empty convolution kernel {}",
            kernel.shape()
        );
        assert!(
            kernel_rows <= input.rows && kernel_cols <= input.cols,
            "kernel {}x{} does not fit input {}",
            kernel_rows,
            kernel_cols,
            input
        );

        let out_rows = input.rows - kernel_rows + 1;
        let out_cols = input.cols - kernel_cols + 1;
        let window = kernel_rows * kernel_cols;

        let mut windowed = Tensor::new(input.channels, num_kernels, window);
        let flat = kernel.resized(1, num_kernels, window);
        for c in 0..input.channels {
            windowed.fill_channel(c, &flat);
        }

        Convolutional {
            input,
            num_kernels,
            kernel_cols,
            out_rows,
            out_cols,
            delta_kernel: Tensor::zeros(windowed.shape()),
            kernel: windowed,
            input_windowed: Tensor::new(input.channels, window, out_rows * out_cols),
            delta_input_windowed: Tensor::new(input.channels, window, out_rows * out_cols),
        }
    }

    pub fn with_init<R: Rng + ?Sized>(
        input: Shape,
        num_kernels: usize,
        kernel_rows: usize,
        kernel_cols: usize,
        init: Initializer,
        rng: &mut R,
    ) -> Convolutional {
        let mut kernel = Tensor::new(num_kernels, kernel_rows, kernel_cols);
        init.fill(&mut kernel, kernel_rows * kernel_cols, rng);
        Convolutional::new(input, &kernel)
    }

    pub fn input_shape(&self) -> Shape {
        self.input
    }

    pub fn output_shape(&self) -> Shape {
        Shape::new(self.input.channels * self.num_kernels, self.out_rows, self.out_cols)
    }

    pub fn kernel_gradient(&self) -> &Tensor {
        &self.delta_kernel
    }

    /// Input coordinate covered by window row `win_row` (kernel offset) at
    /// window column `win_col` (output position).
    #[inline]
    fn window_origin(&self, win_row: usize, win_col: usize) -> (usize, usize) {
        let out_col = win_col / self.out_rows;
        let out_row = win_col % self.out_rows;
        (out_row + win_row / self.kernel_cols, out_col + win_row % self.kernel_cols)
    }

    pub fn forward(&mut self, input: &Tensor, output: &mut Tensor) {
        for win_row in 0..self.input_windowed.rows() {
            for win_col in 0..self.input_windowed.cols() {
                let (row, col) = self.window_origin(win_row, win_col);
                for chan in 0..input.channels() {
                    self.input_windowed[(chan, win_row, win_col)] = input[(chan, row, col)];
                }
            }
        }

        let mut result = self.kernel.mat_mul(&self.input_windowed);
        result.resize(output.channels(), self.out_cols, self.out_rows);
        result.transpose();

        output.copy_from(&result);
    }

    /// Overlapping windows are scattered back by overwriting: each input
    /// position keeps the contribution of the last window that visited it.
    pub fn backward(
        &mut self,
        _input: &Tensor,
        _output: &Tensor,
        input_delta: &mut Tensor,
        output_delta: &Tensor,
    ) {
        let mut delta_output_windowed = output_delta.transposed();
        delta_output_windowed.resize(
            self.input.channels,
            self.num_kernels,
            self.out_rows * self.out_cols,
        );

        delta_output_windowed.mat_mul_into(&self.input_windowed.transposed(), &mut self.delta_kernel);
        self.kernel
            .transposed()
            .mat_mul_into(&delta_output_windowed, &mut self.delta_input_windowed);

        for win_row in 0..self.delta_input_windowed.rows() {
            for win_col in 0..self.delta_input_windowed.cols() {
                let (row, col) = self.window_origin(win_row, win_col);
                for chan in 0..input_delta.channels() {
                    input_delta[(chan, row, col)] = self.delta_input_windowed[(chan, win_row, win_col)];
                }
            }
        }
    }

    pub fn update(&mut self, learning_rate: f32) {
        self.kernel.sub_scaled_assign(&self.delta_kernel, learning_rate);
    }
}
