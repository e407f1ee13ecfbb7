//! CLI command handlers, one file per command.

mod checksum;
mod list;
mod resolve;
mod verify;

pub use checksum::run_checksum;
pub use list::run_list;
pub use resolve::{run_resolve, ResolveArgs};
pub use verify::run_verify;
