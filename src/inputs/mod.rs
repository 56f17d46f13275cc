//! CLI argument types
pub mod descriptor;

pub mod prelude {
    pub use super::descriptor::*;
}
