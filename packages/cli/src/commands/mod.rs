pub mod apply;
pub mod blocks;
pub mod init;
pub mod inspect;

pub use apply::{apply, ApplyArgs};
pub use blocks::{blocks, BlocksArgs};
pub use init::{init, InitArgs};
pub use inspect::{inspect, InspectArgs};
