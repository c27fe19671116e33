mod binary;
mod entry;
mod handle;
pub mod locator;
mod project;
mod registry;
mod table;
mod text;
mod traits;
mod yaml;

pub use binary::BinaryFormat;
pub use entry::{Entry, SaveJob};
pub use handle::{EntryHandle, EntryId};
pub use project::ProjectFormat;
pub use registry::EntryRegistry;
pub use table::CsvFormat;
pub use text::TextFormat;
pub use traits::{EntryError, EntryFormat, EntryResult, FormatInfo};
pub use yaml::YamlFormat;
