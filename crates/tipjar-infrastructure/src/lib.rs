pub mod config_service;
pub mod image_resizer;
pub mod in_memory_ledger;
pub mod paths;
pub mod secret_service;

pub use crate::config_service::ConfigService;
pub use crate::image_resizer::{ImageResizer, load_image_file};
pub use crate::in_memory_ledger::InMemoryLedger;
pub use crate::paths::TipjarPaths;
pub use crate::secret_service::SecretServiceImpl;
