use serde::{Deserialize, Serialize};
use std::alloc::{self, Layout};
use std::fmt;
use std::ops::{Add, AddAssign, Index, IndexMut, Mul, MulAssign, Sub, SubAssign};
use std::ptr::{self, NonNull};

use crate::math::simd::{self, BinaryOp, UnaryOp, ALIGNMENT};

/// Dimensions of a tensor: channels × rows × cols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Shape {
    pub channels: usize,
    pub rows: usize,
    pub cols: usize,
}

impl Shape {
    pub const fn new(channels: usize, rows: usize, cols: usize) -> Shape {
        Shape { channels, rows, cols }
    }

    pub const fn size(&self) -> usize {
        self.channels * self.rows * self.cols
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.channels, self.rows, self.cols)
    }
}

/// A contiguous channels × rows × cols buffer of `f32` with 32-byte aligned,
/// exclusively owned storage.
///
/// Element `(c, r, k)` lives at flat index `c * rows * cols + r * cols + k`.
///
/// Every shape or alignment violation is a programming error and panics; no
/// operation returns a recoverable error.
pub struct Tensor {
    channels: usize,
    rows: usize,
    cols: usize,
    size: usize,
    // Dangling (never dereferenced or freed) while `size == 0`.
    data: NonNull<f32>,
}

// The tensor owns its block outright; nothing else holds the pointer.
unsafe impl Send for Tensor {}
unsafe impl Sync for Tensor {}

fn layout_for(size: usize) -> Layout {
    Layout::from_size_align(size * std::mem::size_of::<f32>(), ALIGNMENT)
        .unwrap_or_else(|_| panic!("tensor of {size} elements exceeds the address space"))
}

/// Allocates a zero-filled aligned block; aborts through the global handler
/// on allocation failure.
fn allocate_zeroed(size: usize) -> NonNull<f32> {
    if size == 0 {
        return NonNull::dangling();
    }
    let layout = layout_for(size);
    let raw = unsafe { alloc::alloc_zeroed(layout) } as *mut f32;
    match NonNull::new(raw) {
        Some(data) => data,
        None => alloc::handle_alloc_error(layout),
    }
}

fn release(data: NonNull<f32>, size: usize) {
    if size > 0 {
        unsafe { alloc::dealloc(data.as_ptr() as *mut u8, layout_for(size)) };
    }
}

impl Tensor {
    /// Zero-filled tensor of the given shape.
    pub fn new(channels: usize, rows: usize, cols: usize) -> Tensor {
        let size = channels * rows * cols;
        Tensor {
            channels,
            rows,
            cols,
            size,
            data: allocate_zeroed(size),
        }
    }

    pub fn zeros(shape: Shape) -> Tensor {
        Tensor::new(shape.channels, shape.rows, shape.cols)
    }

    /// The empty tensor: zero shape, no storage.
    pub fn empty() -> Tensor {
        Tensor::new(0, 0, 0)
    }

    /// Builds a tensor of the given shape from flat row-major data.
    pub fn from_vec(channels: usize, rows: usize, cols: usize, values: &[f32]) -> Tensor {
        let mut t = Tensor::new(channels, rows, cols);
        assert_eq!(
            values.len(),
            t.size,
            "{} values cannot fill a {} tensor",
            values.len(),
            t.shape()
        );
        t.as_mut_slice().copy_from_slice(values);
        t
    }

    /// Moves the contents out, leaving `self` as the empty tensor.
    pub fn take(&mut self) -> Tensor {
        std::mem::take(self)
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of elements.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn shape(&self) -> Shape {
        Shape::new(self.channels, self.rows, self.cols)
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn as_ptr(&self) -> *const f32 {
        self.data.as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut f32 {
        self.data.as_ptr()
    }

    pub fn as_slice(&self) -> &[f32] {
        unsafe { std::slice::from_raw_parts(self.data.as_ptr(), self.size) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        unsafe { std::slice::from_raw_parts_mut(self.data.as_ptr(), self.size) }
    }

    /// The `rows × cols` slice of one channel.
    pub fn channel(&self, channel: usize) -> &[f32] {
        assert!(channel < self.channels, "channel {channel} out of range for {}", self.shape());
        let plane = self.rows * self.cols;
        &self.as_slice()[channel * plane..(channel + 1) * plane]
    }

    pub fn channel_mut(&mut self, channel: usize) -> &mut [f32] {
        assert!(channel < self.channels, "channel {channel} out of range for {}", self.shape());
        let plane = self.rows * self.cols;
        &mut self.as_mut_slice()[channel * plane..(channel + 1) * plane]
    }

    pub fn fill(&mut self, value: f32) {
        self.as_mut_slice().fill(value);
    }

    /// Overwrites one channel with a single-channel tensor of matching plane.
    pub fn fill_channel(&mut self, channel: usize, values: &Tensor) {
        assert!(
            values.channels == 1 && values.rows == self.rows && values.cols == self.cols,
            "cannot fill a channel of {} with {}",
            self.shape(),
            values.shape()
        );
        self.channel_mut(channel).copy_from_slice(values.as_slice());
    }

    /// Copies every element of `src`; only the total sizes must agree.
    pub fn copy_from(&mut self, src: &Tensor) {
        assert_eq!(
            self.size, src.size,
            "cannot copy {} into {}",
            src.shape(),
            self.shape()
        );
        self.as_mut_slice().copy_from_slice(src.as_slice());
    }

    // ---------------------------------------------------------------------
    // Reshaping
    // ---------------------------------------------------------------------

    /// Changes the declared shape. Storage is only reallocated when the total
    /// size changes, in which case the overlapping prefix is kept and any new
    /// tail is zero.
    pub fn resize(&mut self, channels: usize, rows: usize, cols: usize) {
        let size = channels * rows * cols;
        assert!(size > 0, "tensor cannot be resized to zero elements");

        if size != self.size {
            let data = allocate_zeroed(size);
            let keep = self.size.min(size);
            unsafe { ptr::copy_nonoverlapping(self.data.as_ptr(), data.as_ptr(), keep) };
            release(self.data, self.size);
            self.data = data;
            self.size = size;
        }

        self.channels = channels;
        self.rows = rows;
        self.cols = cols;
    }

    /// A new tensor of the given shape holding this tensor's leading elements
    /// (zero padded when it grows).
    pub fn resized(&self, channels: usize, rows: usize, cols: usize) -> Tensor {
        let mut y = Tensor::new(channels, rows, cols);
        assert!(y.size > 0, "tensor cannot be resized to zero elements");
        let keep = self.size.min(y.size);
        y.as_mut_slice()[..keep].copy_from_slice(&self.as_slice()[..keep]);
        y
    }

    /// Swaps rows and columns of every channel independently.
    pub fn transpose(&mut self) {
        let mut y = Tensor::new(self.channels, self.cols, self.rows);
        self.transpose_into(&mut y);
        *self = y;
    }

    pub fn transposed(&self) -> Tensor {
        let mut y = Tensor::new(self.channels, self.cols, self.rows);
        self.transpose_into(&mut y);
        y
    }

    pub fn transpose_into(&self, y: &mut Tensor) {
        assert!(
            y.channels == self.channels && y.rows == self.cols && y.cols == self.rows,
            "cannot transpose {} into {}",
            self.shape(),
            y.shape()
        );
        let (rows, cols) = (self.rows, self.cols);
        for c in 0..self.channels {
            let src = self.channel(c);
            let dst = y.channel_mut(c);
            for r in 0..rows {
                for k in 0..cols {
                    dst[k * rows + r] = src[r * cols + k];
                }
            }
        }
    }

    // ---------------------------------------------------------------------
    // Elementwise arithmetic
    // ---------------------------------------------------------------------

    fn assert_same_shape(&self, other: &Tensor, op: &str) {
        assert!(
            self.shape() == other.shape(),
            "{op}: shape mismatch {} vs {}",
            self.shape(),
            other.shape()
        );
    }

    fn binary_into(&self, other: &Tensor, op: BinaryOp, y: &mut Tensor) {
        self.assert_same_shape(other, "elementwise operand");
        self.assert_same_shape(y, "elementwise output");
        unsafe { simd::binary(op, self.as_ptr(), other.as_ptr(), y.as_mut_ptr(), y.size) };
    }

    fn binary_assign(&mut self, other: &Tensor, op: BinaryOp) {
        self.assert_same_shape(other, "elementwise operand");
        let p = self.as_mut_ptr();
        unsafe { simd::binary(op, p, other.as_ptr(), p, self.size) };
    }

    fn binary_alloc(&self, other: &Tensor, op: BinaryOp) -> Tensor {
        let mut y = Tensor::zeros(self.shape());
        self.binary_into(other, op, &mut y);
        y
    }

    fn unary_into(&self, op: UnaryOp, y: &mut Tensor) {
        self.assert_same_shape(y, "elementwise output");
        unsafe { simd::unary(op, self.as_ptr(), y.as_mut_ptr(), y.size) };
    }

    fn unary_assign(&mut self, op: UnaryOp) {
        let p = self.as_mut_ptr();
        unsafe { simd::unary(op, p, p, self.size) };
    }

    fn unary_alloc(&self, op: UnaryOp) -> Tensor {
        let mut y = Tensor::zeros(self.shape());
        self.unary_into(op, &mut y);
        y
    }

    /// Allocating and in-place addition are the `+` and `+=` operators.
    pub fn add_into(&self, other: &Tensor, y: &mut Tensor) {
        self.binary_into(other, BinaryOp::Add, y);
    }

    pub fn sub_into(&self, other: &Tensor, y: &mut Tensor) {
        self.binary_into(other, BinaryOp::Sub, y);
    }

    /// Elementwise (Hadamard) product.
    pub fn hadamard(&self, other: &Tensor) -> Tensor {
        self.binary_alloc(other, BinaryOp::Mul)
    }

    pub fn hadamard_into(&self, other: &Tensor, y: &mut Tensor) {
        self.binary_into(other, BinaryOp::Mul, y);
    }

    pub fn hadamard_assign(&mut self, other: &Tensor) {
        self.binary_assign(other, BinaryOp::Mul);
    }

    pub fn scale(&self, s: f32) -> Tensor {
        self.unary_alloc(UnaryOp::Scale(s))
    }

    pub fn scale_into(&self, s: f32, y: &mut Tensor) {
        self.unary_into(UnaryOp::Scale(s), y);
    }

    pub fn scale_assign(&mut self, s: f32) {
        self.unary_assign(UnaryOp::Scale(s));
    }

    /// `self - x * b`.
    pub fn sub_scaled(&self, b: &Tensor, x: f32) -> Tensor {
        self.binary_alloc(b, BinaryOp::SubScaled(x))
    }

    pub fn sub_scaled_into(&self, b: &Tensor, x: f32, y: &mut Tensor) {
        self.binary_into(b, BinaryOp::SubScaled(x), y);
    }

    /// `self -= x * b`; the gradient-descent step.
    pub fn sub_scaled_assign(&mut self, b: &Tensor, x: f32) {
        self.binary_assign(b, BinaryOp::SubScaled(x));
    }

    // ---------------------------------------------------------------------
    // Matrix product
    // ---------------------------------------------------------------------

    /// Per-channel matrix product: `(c, m, n) · (c, n, p) -> (c, m, p)`.
    pub fn mat_mul(&self, b: &Tensor) -> Tensor {
        let mut y = Tensor::new(self.channels, self.rows, b.cols);
        self.mat_mul_into(b, &mut y);
        y
    }

    pub fn mat_mul_into(&self, b: &Tensor, y: &mut Tensor) {
        assert!(
            self.channels == b.channels && self.cols == b.rows,
            "cannot multiply {} by {}",
            self.shape(),
            b.shape()
        );
        assert!(
            y.channels == self.channels && y.rows == self.rows && y.cols == b.cols,
            "product of {} and {} does not fit {}",
            self.shape(),
            b.shape(),
            y.shape()
        );

        let inner = self.cols;
        // One column of the right operand, gathered contiguously.
        let mut column = Tensor::new(1, 1, inner);

        for c in 0..y.channels {
            let a_c = self.channel(c);
            let b_c = b.channel(c);
            let y_cols = y.cols;
            let y_c = y.channel_mut(c);

            for j in 0..y_cols {
                let col = column.as_mut_slice();
                for k in 0..inner {
                    col[k] = b_c[k * b.cols + j];
                }

                for i in 0..self.rows {
                    let row = &a_c[i * inner..(i + 1) * inner];
                    let sum: f32 = row.iter().zip(col.iter()).map(|(x, w)| x * w).sum();
                    y_c[i * y_cols + j] = sum;
                }
            }
        }
    }

    // ---------------------------------------------------------------------
    // Functional transforms and reductions
    // ---------------------------------------------------------------------

    pub fn map<F>(&self, f: F) -> Tensor
    where
        F: Fn(f32) -> f32,
    {
        let mut y = Tensor::zeros(self.shape());
        self.map_into(f, &mut y);
        y
    }

    pub fn map_into<F>(&self, f: F, y: &mut Tensor)
    where
        F: Fn(f32) -> f32,
    {
        assert_eq!(self.size, y.size, "map_into: {} into {}", self.shape(), y.shape());
        for (out, &x) in y.as_mut_slice().iter_mut().zip(self.as_slice()) {
            *out = f(x);
        }
    }

    pub fn zip_with<F>(&self, other: &Tensor, f: F) -> Tensor
    where
        F: Fn(f32, f32) -> f32,
    {
        let mut y = Tensor::zeros(self.shape());
        self.zip_with_into(other, f, &mut y);
        y
    }

    pub fn zip_with_into<F>(&self, other: &Tensor, f: F, y: &mut Tensor)
    where
        F: Fn(f32, f32) -> f32,
    {
        self.assert_same_shape(other, "zip_with operand");
        self.assert_same_shape(y, "zip_with output");
        let pairs = self.as_slice().iter().zip(other.as_slice());
        for (out, (&a, &b)) in y.as_mut_slice().iter_mut().zip(pairs) {
            *out = f(a, b);
        }
    }

    pub fn sum(&self) -> f32 {
        self.as_slice().iter().sum()
    }

    /// Sum of `f(x)` over every element.
    pub fn sum_with<F>(&self, f: F) -> f32
    where
        F: Fn(f32) -> f32,
    {
        self.as_slice().iter().map(|&x| f(x)).sum()
    }

    /// Flat index of the first maximal element.
    pub fn argmax(&self) -> usize {
        let mut best = 0;
        for (i, &x) in self.as_slice().iter().enumerate() {
            if x > self[best] {
                best = i;
            }
        }
        best
    }

    // ---------------------------------------------------------------------
    // Activation kernels
    // ---------------------------------------------------------------------

    /// Rational approximation of the logistic sigmoid,
    /// `0.5 * x / (1 + |x|) + 0.5`, with range (0, 1).
    pub fn fast_sig(&self) -> Tensor {
        self.unary_alloc(UnaryOp::FastSig)
    }

    pub fn fast_sig_into(&self, y: &mut Tensor) {
        self.unary_into(UnaryOp::FastSig, y);
    }

    /// `a * (1 - a)` where `self` already holds sigmoid outputs.
    pub fn fast_sig_deriv_into(&self, y: &mut Tensor) {
        self.unary_into(UnaryOp::FastSigDeriv, y);
    }

    pub fn fast_relu_into(&self, y: &mut Tensor) {
        self.unary_into(UnaryOp::Relu, y);
    }

    /// 0/1 mask: zero where the input is negative.
    pub fn fast_relu_deriv_into(&self, y: &mut Tensor) {
        self.assert_same_shape(y, "relu derivative output");
        for (out, &x) in y.as_mut_slice().iter_mut().zip(self.as_slice()) {
            *out = if x < 0.0 { 0.0 } else { 1.0 };
        }
    }
}

impl Default for Tensor {
    fn default() -> Self {
        Tensor::empty()
    }
}

impl Drop for Tensor {
    fn drop(&mut self) {
        release(self.data, self.size);
    }
}

impl Clone for Tensor {
    fn clone(&self) -> Self {
        let mut y = Tensor::zeros(self.shape());
        y.as_mut_slice().copy_from_slice(self.as_slice());
        y
    }
}

impl PartialEq for Tensor {
    fn eq(&self, other: &Self) -> bool {
        self.shape() == other.shape() && self.as_slice() == other.as_slice()
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.shape())
            .field("data", &self.as_slice())
            .finish()
    }
}

impl Index<(usize, usize, usize)> for Tensor {
    type Output = f32;

    fn index(&self, (c, r, k): (usize, usize, usize)) -> &f32 {
        assert!(
            c < self.channels && r < self.rows && k < self.cols,
            "index ({c}, {r}, {k}) out of bounds for {}",
            self.shape()
        );
        &self.as_slice()[c * self.rows * self.cols + r * self.cols + k]
    }
}

impl IndexMut<(usize, usize, usize)> for Tensor {
    fn index_mut(&mut self, (c, r, k): (usize, usize, usize)) -> &mut f32 {
        assert!(
            c < self.channels && r < self.rows && k < self.cols,
            "index ({c}, {r}, {k}) out of bounds for {}",
            self.shape()
        );
        let i = c * self.rows * self.cols + r * self.cols + k;
        &mut self.as_mut_slice()[i]
    }
}

impl Index<usize> for Tensor {
    type Output = f32;

    fn index(&self, i: usize) -> &f32 {
        assert!(i < self.size, "index {i} out of bounds for {} elements", self.size);
        &self.as_slice()[i]
    }
}

impl IndexMut<usize> for Tensor {
    fn index_mut(&mut self, i: usize) -> &mut f32 {
        assert!(i < self.size, "index {i} out of bounds for {} elements", self.size);
        &mut self.as_mut_slice()[i]
    }
}

// ---------------------------------------------------------------------------
// Literal construction
// ---------------------------------------------------------------------------

/// A column vector `(1, n, 1)`, the layout consumed by fully-connected layers.
impl From<&[f32]> for Tensor {
    fn from(values: &[f32]) -> Self {
        Tensor::from_vec(1, values.len(), 1, values)
    }
}

impl From<Vec<f32>> for Tensor {
    fn from(values: Vec<f32>) -> Self {
        Tensor::from(values.as_slice())
    }
}

/// A single-channel matrix; every row must have the same length.
impl From<Vec<Vec<f32>>> for Tensor {
    fn from(rows: Vec<Vec<f32>>) -> Self {
        let cols = rows.first().map_or(0, Vec::len);
        let mut t = Tensor::new(1, rows.len(), cols);
        for (r, row) in rows.iter().enumerate() {
            assert_eq!(row.len(), cols, "row {r} has {} values, expected {cols}", row.len());
            t.as_mut_slice()[r * cols..(r + 1) * cols].copy_from_slice(row);
        }
        t
    }
}

impl From<Vec<Vec<Vec<f32>>>> for Tensor {
    fn from(channels: Vec<Vec<Vec<f32>>>) -> Self {
        let rows = channels.first().map_or(0, Vec::len);
        let cols = channels
            .first()
            .and_then(|c| c.first())
            .map_or(0, Vec::len);
        let mut t = Tensor::new(channels.len(), rows, cols);
        for (c, channel) in channels.into_iter().enumerate() {
            let plane = Tensor::from(channel);
            assert!(
                plane.rows == rows && plane.cols == cols,
                "channel {c} is {}x{}, expected {rows}x{cols}",
                plane.rows,
                plane.cols
            );
            t.fill_channel(c, &plane);
        }
        t
    }
}

// ---------------------------------------------------------------------------
// Operator sugar for the allocating and in-place forms
// ---------------------------------------------------------------------------

impl Add for &Tensor {
    type Output = Tensor;

    fn add(self, rhs: &Tensor) -> Tensor {
        self.binary_alloc(rhs, BinaryOp::Add)
    }
}

impl Sub for &Tensor {
    type Output = Tensor;

    fn sub(self, rhs: &Tensor) -> Tensor {
        self.binary_alloc(rhs, BinaryOp::Sub)
    }
}

impl Mul<f32> for &Tensor {
    type Output = Tensor;

    fn mul(self, rhs: f32) -> Tensor {
        self.scale(rhs)
    }
}

impl AddAssign<&Tensor> for Tensor {
    fn add_assign(&mut self, rhs: &Tensor) {
        self.binary_assign(rhs, BinaryOp::Add);
    }
}

impl SubAssign<&Tensor> for Tensor {
    fn sub_assign(&mut self, rhs: &Tensor) {
        self.binary_assign(rhs, BinaryOp::Sub);
    }
}

impl MulAssign<f32> for Tensor {
    fn mul_assign(&mut self, rhs: f32) {
        self.scale_assign(rhs);
    }
}
