pub mod corpus;
pub mod error;
pub mod eval_log;
pub mod postprocessing;
pub mod report;
pub mod schema;
pub mod stats;
pub mod tokenization;
pub mod utils;
