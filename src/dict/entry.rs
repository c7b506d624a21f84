use serde::{Deserialize, Serialize};

use crate::dict::catalog::Bootstrap;

/// Flag bits carried in unit 0 of every compiled word's code array.
pub mod flags {
    pub const IMMEDIATE: u16 = 1;
    pub const HIDDEN: u16 = 2;
    pub const COMPILE_ONLY: u16 = 4;
}

/// One word of the dictionary, native or compiled.
///
/// The dictionary-global index of a word is its position in the
/// concatenation of native entries then compiled entries, both in
/// declaration order. Indices are dense and never reassigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DictionaryEntry {
    /// Display name; may contain arbitrary symbol characters
    pub name: String,

    /// Identifier labelling this word's index in generated code.
    /// `None` means it was never declared and defaults to the name.
    pub constant: Option<String>,

    /// Flag bitset; always 0 for native words
    pub flags: u16,

    /// Resolved code array (unit 0 is the flags bitset). `None` for
    /// native words, whose body is opaque source text held by the catalog.
    pub code: Option<Vec<u16>>,

    pub doc: Option<String>,
}

impl DictionaryEntry {
    /// The constant identifier this entry answers to.
    pub fn constant_id(&self) -> &str {
        self.constant.as_deref().unwrap_or(&self.name)
    }
}

/// The handover object for the emitter and the binary dictionary output:
/// everything the interpreter side needs, in dictionary-global order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DictionaryTables {
    /// index -> display name, natives first then compiled words
    pub names: Vec<String>,

    /// Code arrays of the compiled words only; `code[i]` belongs to
    /// global index `native_count + i`
    pub code: Vec<Vec<u16>>,

    pub native_count: usize,

    pub var_count: usize,

    /// The word indices the compiler itself depended on; the interpreter
    /// side needs the same ones
    pub bootstrap: Bootstrap,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_defaults_to_name() {
        let entry = DictionaryEntry {
            name: "dup".to_string(),
            constant: None,
            flags: 0,
            code: None,
            doc: None,
        };
        assert_eq!(entry.constant_id(), "dup");

        let entry = DictionaryEntry {
            constant: Some("DUP2".to_string()),
            ..entry
        };
        assert_eq!(entry.constant_id(), "DUP2");
    }
}
