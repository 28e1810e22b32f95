//! Eight-lane kernels over raw `f32` buffers.
//!
//! Every kernel follows the same layout: buffers shorter than [`LANES`] are
//! handled by a plain scalar loop; otherwise all operands must be
//! [`ALIGNMENT`]-byte aligned, the largest multiple of [`LANES`] is processed
//! with aligned vector loads/stores and the remainder by the scalar tail.
//!
//! On x86-64 the vector body uses AVX when the CPU reports it at runtime.
//! Everywhere else the body is a fixed-width lane loop that the compiler
//! vectorises on its own.
//!
//! The kernels take raw pointers so that the output may be the same buffer
//! as the first operand (in-place updates such as `W -= lr * dW`).

/// Number of `f32` elements processed per vector group.
pub const LANES: usize = 8;

/// Byte alignment guaranteed for every tensor allocation.
pub const ALIGNMENT: usize = 32;

/// Elementwise operation over two operands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    /// `a - x * b`, the gradient-descent update.
    SubScaled(f32),
}

impl BinaryOp {
    #[inline(always)]
    fn scalar(self, a: f32, b: f32) -> f32 {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::SubScaled(x) => a - x * b,
        }
    }
}

/// Elementwise operation over one operand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOp {
    Scale(f32),
    /// Rational sigmoid approximation `0.5 * x / (1 + |x|) + 0.5`.
    FastSig,
    /// `a * (1 - a)` for an already activated `a`.
    FastSigDeriv,
    Relu,
}

impl UnaryOp {
    #[inline(always)]
    fn scalar(self, a: f32) -> f32 {
        match self {
            UnaryOp::Scale(s) => a * s,
            UnaryOp::FastSig => (0.5 * a) / (1.0 + a.abs()) + 0.5,
            UnaryOp::FastSigDeriv => a * (1.0 - a),
            UnaryOp::Relu => {
                if a < 0.0 {
                    0.0
                } else {
                    a
                }
            }
        }
    }
}

/// Returns true when `ptr` sits on an [`ALIGNMENT`] boundary.
#[inline]
pub fn is_aligned(ptr: *const f32) -> bool {
    (ptr as usize) % ALIGNMENT == 0
}

#[inline]
fn assert_aligned(ptr: *const f32, operand: &str) {
    assert!(
        is_aligned(ptr),
        "{operand} buffer is not {ALIGNMENT}-byte aligned"
    );
}

/// `y[i] = op(a[i], b[i])` for `i < n`.
///
/// # Safety
/// `a` and `b` must be valid for `n` reads and `y` for `n` writes. `y` may be
/// equal to `a` or `b`, but must not partially overlap either.
pub unsafe fn binary(op: BinaryOp, a: *const f32, b: *const f32, y: *mut f32, n: usize) {
    if n < LANES {
        scalar_binary(op, a, b, y, 0, n);
        return;
    }

    assert_aligned(a, "left operand");
    assert_aligned(b, "right operand");
    assert_aligned(y, "output");

    let body = n - n % LANES;

    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx") {
            avx::binary(op, a, b, y, body);
        } else {
            lanes_binary(op, a, b, y, body);
        }
    }
    #[cfg(not(target_arch = "x86_64"))]
    lanes_binary(op, a, b, y, body);

    scalar_binary(op, a, b, y, body, n);
}

/// `y[i] = op(a[i])` for `i < n`.
///
/// # Safety
/// `a` must be valid for `n` reads and `y` for `n` writes; `y` may equal `a`.
pub unsafe fn unary(op: UnaryOp, a: *const f32, y: *mut f32, n: usize) {
    if n < LANES {
        scalar_unary(op, a, y, 0, n);
        return;
    }

    assert_aligned(a, "operand");
    assert_aligned(y, "output");

    let body = n - n % LANES;

    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx") {
            avx::unary(op, a, y, body);
        } else {
            lanes_unary(op, a, y, body);
        }
    }
    #[cfg(not(target_arch = "x86_64"))]
    lanes_unary(op, a, y, body);

    scalar_unary(op, a, y, body, n);
}

#[inline(always)]
unsafe fn scalar_binary(op: BinaryOp, a: *const f32, b: *const f32, y: *mut f32, from: usize, to: usize) {
    for i in from..to {
        *y.add(i) = op.scalar(*a.add(i), *b.add(i));
    }
}

#[inline(always)]
unsafe fn scalar_unary(op: UnaryOp, a: *const f32, y: *mut f32, from: usize, to: usize) {
    for i in from..to {
        *y.add(i) = op.scalar(*a.add(i));
    }
}

// Portable body: load a full group into registers before storing so that the
// in-place case reads every lane before any lane is written.
unsafe fn lanes_binary(op: BinaryOp, a: *const f32, b: *const f32, y: *mut f32, body: usize) {
    for i in (0..body).step_by(LANES) {
        let av = *(a.add(i) as *const [f32; LANES]);
        let bv = *(b.add(i) as *const [f32; LANES]);
        let mut out = [0.0f32; LANES];
        for lane in 0..LANES {
            out[lane] = op.scalar(av[lane], bv[lane]);
        }
        *(y.add(i) as *mut [f32; LANES]) = out;
    }
}

unsafe fn lanes_unary(op: UnaryOp, a: *const f32, y: *mut f32, body: usize) {
    for i in (0..body).step_by(LANES) {
        let av = *(a.add(i) as *const [f32; LANES]);
        let mut out = [0.0f32; LANES];
        for lane in 0..LANES {
            out[lane] = op.scalar(av[lane]);
        }
        *(y.add(i) as *mut [f32; LANES]) = out;
    }
}

#[cfg(target_arch = "x86_64")]
mod avx {
    use std::arch::x86_64::*;

    use super::{BinaryOp, UnaryOp, LANES};

    #[target_feature(enable = "avx")]
    pub unsafe fn binary(op: BinaryOp, a: *const f32, b: *const f32, y: *mut f32, body: usize) {
        match op {
            BinaryOp::Add => {
                for i in (0..body).step_by(LANES) {
                    let av = _mm256_load_ps(a.add(i));
                    let bv = _mm256_load_ps(b.add(i));
                    _mm256_store_ps(y.add(i), _mm256_add_ps(av, bv));
                }
            }
            BinaryOp::Sub => {
                for i in (0..body).step_by(LANES) {
                    let av = _mm256_load_ps(a.add(i));
                    let bv = _mm256_load_ps(b.add(i));
                    _mm256_store_ps(y.add(i), _mm256_sub_ps(av, bv));
                }
            }
            BinaryOp::Mul => {
                for i in (0..body).step_by(LANES) {
                    let av = _mm256_load_ps(a.add(i));
                    let bv = _mm256_load_ps(b.add(i));
                    _mm256_store_ps(y.add(i), _mm256_mul_ps(av, bv));
                }
            }
            BinaryOp::SubScaled(x) => {
                let xv = _mm256_set1_ps(x);
                for i in (0..body).step_by(LANES) {
                    let av = _mm256_load_ps(a.add(i));
                    let bv = _mm256_load_ps(b.add(i));
                    let xbv = _mm256_mul_ps(xv, bv);
                    _mm256_store_ps(y.add(i), _mm256_sub_ps(av, xbv));
                }
            }
        }
    }

    #[target_feature(enable = "avx")]
    pub unsafe fn unary(op: UnaryOp, a: *const f32, y: *mut f32, body: usize) {
        match op {
            UnaryOp::Scale(s) => {
                let sv = _mm256_set1_ps(s);
                for i in (0..body).step_by(LANES) {
                    let av = _mm256_load_ps(a.add(i));
                    _mm256_store_ps(y.add(i), _mm256_mul_ps(av, sv));
                }
            }
            UnaryOp::FastSig => {
                let onev = _mm256_set1_ps(1.0);
                let halfv = _mm256_set1_ps(0.5);
                let sign_mask = _mm256_set1_ps(-0.0);
                for i in (0..body).step_by(LANES) {
                    let av = _mm256_load_ps(a.add(i));
                    let half_av = _mm256_mul_ps(av, halfv);
                    let abs_av = _mm256_andnot_ps(sign_mask, av);
                    let denom = _mm256_add_ps(onev, abs_av);
                    let quotient = _mm256_div_ps(half_av, denom);
                    _mm256_store_ps(y.add(i), _mm256_add_ps(quotient, halfv));
                }
            }
            UnaryOp::FastSigDeriv => {
                let onev = _mm256_set1_ps(1.0);
                for i in (0..body).step_by(LANES) {
                    let av = _mm256_load_ps(a.add(i));
                    let one_minus = _mm256_sub_ps(onev, av);
                    _mm256_store_ps(y.add(i), _mm256_mul_ps(av, one_minus));
                }
            }
            UnaryOp::Relu => {
                let zerov = _mm256_setzero_ps();
                for i in (0..body).step_by(LANES) {
                    let av = _mm256_load_ps(a.add(i));
                    _mm256_store_ps(y.add(i), _mm256_max_ps(av, zerov));
                }
            }
        }
    }
}
