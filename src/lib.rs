pub mod audio;
pub mod catalog;
pub mod config;
pub mod error;
pub mod processor;
pub mod sanitize;
pub mod storage;

pub use config::Config;
pub use error::{PrepError, Result};
pub use processor::{AudioProcessor, ProcessorConfig};
