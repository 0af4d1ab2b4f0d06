pub mod config;
pub mod dump;
pub mod error;
pub mod records;
pub mod save;
pub mod storage;
pub mod testing;

pub mod prelude {
    pub use crate::config::{Config, ConfigStack, ScopedConfig};
    pub use crate::dump::{Location, dump_objects, load_objects};
    pub use crate::error::{AdminError, Result};
    pub use crate::records::{AnyRecord, ObjectMap, Record, RecordKind};
    pub use crate::save::{ConsoleReporter, SaveObserver, save_object_map};
    pub use crate::storage::{PersistContext, Storage, open_storage};
}
