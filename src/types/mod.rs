pub mod errors;
pub mod ids;
pub mod record;
pub mod report;

pub use errors::*;
pub use ids::*;
pub use record::*;
pub use report::*;
