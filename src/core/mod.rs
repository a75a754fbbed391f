pub mod engine;
pub mod export;
pub mod interleave;
pub mod pipeline;
pub mod registry;
pub mod sanitizer;

pub use crate::domain::model::{
    MixOutcome, Pool, PoolId, PoolRole, PoolSource, PoolSummary,
};
pub use crate::domain::ports::{ConfigProvider, OutputFilenames, Pipeline, PoolSpec, Storage};
pub use crate::utils::error::Result;
