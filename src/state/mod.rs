pub mod path;
pub mod store;
pub mod value;

pub use path::*;
pub use store::*;
pub use value::*;
