//! Ambient helpers shared by every crate in the workspace.

pub mod types;

pub mod utils {
    pub mod logging;
}
