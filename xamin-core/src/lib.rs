mod dialect;
mod hint;
mod project;
mod table;
mod tree;
mod types;

pub use dialect::{sniff_delimiter, DEFAULT_DELIMITERS};
pub use hint::{Hint, DEFAULT_HINT_SIZE};
pub use project::{decode_project, encode_project, ProjectManifest, ProjectRecord, PROJECT_TAG};
pub use table::{decode_table, encode_table};
pub use tree::{decode_tree, encode_tree, looks_like_tree};
pub use types::{CodecError, Dialect, EntryData, FormatKind, Table};
