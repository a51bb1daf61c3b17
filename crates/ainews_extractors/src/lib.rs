pub mod export;
pub mod extractor;
pub mod fetch;
pub mod pipeline;
pub mod strategies;

pub use extractor::NewsExtractor;
pub use pipeline::Pipeline;
pub use strategies::{ImageStrategy, StrategyRegistry};

pub mod prelude {
    pub use super::pipeline::Pipeline;
    pub use super::strategies::{ImageStrategy, StrategyRegistry};
    pub use ainews_core::types::{ArticleRecord, PipelineArgs};
    pub use ainews_core::{Error, Result};
}
