pub mod convert;
pub mod load;
pub mod schema;

pub use convert::*;
pub use load::*;
pub use schema::*;
