pub mod identity;
pub mod repository;
pub mod store;
pub mod types;


pub use identity::{IdentityProvider, LocalIdentityProvider};
pub use repository::{
    ProviderConfigRepository, TemplateRepository, clear_guest_data, has_guest_data,
    migrate_guest_data,
};
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use types::*;
