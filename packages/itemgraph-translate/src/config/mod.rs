//! Run configuration
//!
//! YAML files carry `version: 1` at the top and reject unknown fields.
//!
//! ```yaml
//! version: 1
//! target_namespace: "http://www.flymine.org/model/genomic#"
//! parallel:
//!   num_workers: 0      # 0 = one per CPU
//!   batch_size: 1000    # items per phase-1 window
//! writer:
//!   batch_size: 1000
//!   batch_char_size: 10000000
//!   pipe_length: 1
//! ```

pub mod error;
pub mod translation_config;

pub use error::{ConfigError, ConfigResult};
pub use translation_config::{ParallelConfig, TranslationConfig, DEFAULT_TARGET_NAMESPACE};
