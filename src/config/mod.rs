mod paths;
mod settings;

pub use paths::Paths;
pub use settings::{ApiConfig, CacheConfig, Config, HttpConfig, DEFAULT_BASE_URL};
