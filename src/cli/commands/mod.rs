mod cache;
mod common;
mod config;
mod list;
mod show;

pub use self::cache::cache;
pub use self::common::{build_client, build_sync};
pub use self::config::config;
pub use self::list::list;
pub use self::show::show;
