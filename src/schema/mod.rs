pub mod chat;
pub mod loader;
pub mod node;
pub mod parsing;
pub mod rule;

pub use chat::*;
pub use loader::*;
pub use node::*;
pub use rule::*;
