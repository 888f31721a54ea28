//! Rule evaluation core. Keep this crate free of IO and platform concerns.

pub mod cards;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod engine;
pub mod events;
pub mod host;
pub mod policy;
pub mod prepare;
pub mod rng;
pub mod rules;
pub mod session;
pub mod table;
pub mod tags;

pub use cards::*;
pub use config::*;
pub use context::*;
pub use diagnostics::*;
pub use engine::*;
pub use events::*;
pub use host::*;
pub use policy::*;
pub use prepare::*;
pub use rng::*;
pub use rules::*;
pub use session::*;
pub use table::*;
pub use tags::*;
