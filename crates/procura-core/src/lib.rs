pub mod config;
pub mod error;
pub mod types;

pub use config::ProcuraConfig;
pub use error::{ProcuraError, Result};
pub use types::*;
