pub mod init;
pub mod simd;
pub mod tensor;

pub use init::Initializer;
pub use tensor::{Shape, Tensor};
