pub mod catalog;
pub mod compile;
pub mod compile_error;
pub mod disasm;
pub mod entry;
pub mod pack;
pub mod table;

pub use compile::{CompilerState, ResolveOrder};
pub use entry::{DictionaryEntry, DictionaryTables};
