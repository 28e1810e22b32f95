pub mod sequential;
pub mod desc;

pub use sequential::Sequential;
pub use desc::{
    ConvolutionalDesc, FlattenDesc, FullyConnectedDesc, InputDesc, LayerDesc, PoolingDesc,
    PoolingFunction, SequentialDesc,
};
