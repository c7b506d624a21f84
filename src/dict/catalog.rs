use serde::{Deserialize, Serialize};

use crate::dict::compile_error::CompileError;

/// One built-in word: its body is opaque source text passed through to the
/// emitter, never code units.
#[derive(Debug, Clone)]
pub struct NativeWord {
    pub name: String,
    pub constant: String,
    pub doc: Option<String>,
    pub body: String,
}

/// The built-in words, in declaration order. Their indices are the low end
/// of the dictionary-global index space.
#[derive(Debug, Default)]
pub struct NativeCatalog {
    words: Vec<NativeWord>,
}

impl NativeCatalog {
    pub fn new() -> Self {
        NativeCatalog { words: Vec::new() }
    }

    /// Register one native word; the index equals its declaration position.
    /// The constant identifier defaults to the name. Constant uniqueness is
    /// validated later by the table builder, not here.
    pub fn register(
        &mut self,
        name: &str,
        constant: Option<&str>,
        doc: Option<&str>,
        body: String,
    ) -> u16 {
        let index = self.words.len() as u16;
        self.words.push(NativeWord {
            name: name.to_string(),
            constant: constant.unwrap_or(name).to_string(),
            doc: doc.map(str::to_string),
            body,
        });
        index
    }

    /// Load the native-word section: a line starting at column 0 opens a
    /// new word (`name [constant [doc text...]]`), indented lines are its
    /// body. A doc comment needs the constant field in front of it.
    pub fn load_section(text: &str) -> Self {
        let mut catalog = NativeCatalog::new();
        let mut header: Option<(String, Option<String>, Option<String>)> = None;
        let mut body = String::new();

        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let first = line.chars().next().unwrap();
            if first != ' ' && first != '\t' {
                if let Some((name, constant, doc)) = header.take() {
                    catalog.register(&name, constant.as_deref(), doc.as_deref(), body.clone());
                    body.clear();
                }
                let mut fields = line.split_whitespace();
                let name = fields.next().unwrap().to_string();
                let constant = fields.next().map(str::to_string);
                let doc = fields.collect::<Vec<_>>().join(" ");
                let doc = if doc.is_empty() { None } else { Some(doc) };
                header = Some((name, constant, doc));
            } else {
                body.push('\t');
                body.push_str(line.trim_start());
                body.push('\n');
            }
        }
        if let Some((name, constant, doc)) = header {
            catalog.register(&name, constant.as_deref(), doc.as_deref(), body);
        }
        catalog
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn words(&self) -> &[NativeWord] {
        &self.words
    }

    pub fn find_by_constant(&self, constant: &str) -> Option<u16> {
        self.words
            .iter()
            .position(|w| w.constant == constant)
            .map(|i| i as u16)
    }

    pub fn find_by_name(&self, name: &str) -> Option<u16> {
        self.words.iter().position(|w| w.name == name).map(|i| i as u16)
    }

    pub fn find_by_name_rev(&self, name: &str) -> Option<u16> {
        self.words.iter().rposition(|w| w.name == name).map(|i| i as u16)
    }
}

/// Ordered variable slots; index = declaration position. Duplicate names
/// shadow silently, the later index winning lookups.
#[derive(Debug, Default)]
pub struct VariableTable {
    names: Vec<String>,
}

impl VariableTable {
    pub fn new() -> Self {
        VariableTable { names: Vec::new() }
    }

    pub fn load_section(text: &str) -> Self {
        let mut table = VariableTable::new();
        for line in text.lines() {
            let name = line.trim();
            if !name.is_empty() {
                table.register(name);
            }
        }
        table
    }

    pub fn register(&mut self, name: &str) -> u16 {
        let index = self.names.len() as u16;
        self.names.push(name.to_string());
        index
    }

    pub fn find(&self, name: &str) -> Option<u16> {
        self.names.iter().rposition(|n| n == name).map(|i| i as u16)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Constant names of the native words the compiler itself leans on.
#[derive(Debug, Clone)]
pub struct BootstrapNames {
    pub lit_string: String,
    pub push_var: String,
    pub lit_false: String,
    pub lit_one: String,
    pub lit_short: String,
    pub wide_int: String,
}

impl Default for BootstrapNames {
    fn default() -> Self {
        BootstrapNames {
            lit_string: "str".to_string(),
            push_var: "vars".to_string(),
            lit_false: "false".to_string(),
            lit_one: "'1".to_string(),
            lit_short: "short".to_string(),
            wide_int: "int".to_string(),
        }
    }
}

/// The resolved indices. Looked up once, before any definition compiles;
/// a missing one is fatal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bootstrap {
    /// string-literal packer pseudo-word
    pub lit_string: u16,
    /// pushes a variable slot address
    pub push_var: u16,
    /// pushes constant 0
    pub lit_false: u16,
    /// pushes constant 1
    pub lit_one: u16,
    /// pushes the following unit as a literal
    pub lit_short: u16,
    /// consumes the following two units as a 32-bit literal
    pub wide_int: u16,
}

impl Bootstrap {
    pub fn resolve(catalog: &NativeCatalog, names: &BootstrapNames) -> Result<Self, CompileError> {
        let find = |constant: &str| {
            catalog
                .find_by_constant(constant)
                .ok_or_else(|| CompileError::missing_bootstrap(constant))
        };
        Ok(Bootstrap {
            lit_string: find(&names.lit_string)?,
            push_var: find(&names.push_var)?,
            lit_false: find(&names.lit_false)?,
            lit_one: find(&names.lit_one)?,
            lit_short: find(&names.lit_short)?,
            wide_int: find(&names.wide_int)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_catalog() -> NativeCatalog {
        let mut catalog = NativeCatalog::new();
        catalog.register("int", None, None, String::new());
        catalog.register("false", None, None, String::new());
        catalog.register("'1", Some("one"), None, String::new());
        catalog.register("vars", None, None, String::new());
        catalog
    }

    #[test]
    fn test_indices_are_dense_and_in_order() {
        let mut catalog = NativeCatalog::new();
        assert_eq!(catalog.register("a", None, None, String::new()), 0);
        assert_eq!(catalog.register("b", None, None, String::new()), 1);
        assert_eq!(catalog.register("c", None, None, String::new()), 2);
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn test_find_by_constant_honors_default() {
        let catalog = small_catalog();
        assert_eq!(catalog.find_by_constant("int"), Some(0));
        assert_eq!(catalog.find_by_constant("one"), Some(2));
        // the display name of a word with a declared constant is not a constant
        assert_eq!(catalog.find_by_constant("'1"), None);
    }

    #[test]
    fn test_load_section_splits_header_and_body() {
        let text =
            "dup\n\tpush(tos());\nswap SWAP_W exchange the top two\n\tint a = pop();\n\tint b = pop();\n";
        let catalog = NativeCatalog::load_section(text);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.words()[0].name, "dup");
        assert_eq!(catalog.words()[0].constant, "dup");
        assert_eq!(catalog.words()[0].doc, None);
        assert_eq!(catalog.words()[0].body, "\tpush(tos());\n");
        assert_eq!(catalog.words()[1].name, "swap");
        assert_eq!(catalog.words()[1].constant, "SWAP_W");
        assert_eq!(
            catalog.words()[1].doc.as_deref(),
            Some("exchange the top two")
        );
        assert!(catalog.words()[1].body.contains("int b = pop();"));
    }

    #[test]
    fn test_variable_lookup_and_shadowing() {
        let table = VariableTable::load_section("x\ny\n\nz\ny\n");
        assert_eq!(table.len(), 4);
        assert_eq!(table.find("x"), Some(0));
        assert_eq!(table.find("z"), Some(2));
        // the later registration wins
        assert_eq!(table.find("y"), Some(3));
        assert_eq!(table.find("w"), None);
    }

    #[test]
    fn test_bootstrap_resolution() {
        let mut catalog = NativeCatalog::new();
        for c in ["str", "vars", "false", "'1", "short", "int"] {
            catalog.register(c, None, None, String::new());
        }
        let boot = Bootstrap::resolve(&catalog, &BootstrapNames::default()).unwrap();
        assert_eq!(boot.lit_string, 0);
        assert_eq!(boot.push_var, 1);
        assert_eq!(boot.lit_false, 2);
        assert_eq!(boot.lit_one, 3);
        assert_eq!(boot.lit_short, 4);
        assert_eq!(boot.wide_int, 5);
    }

    #[test]
    fn test_bootstrap_missing_word_is_fatal() {
        let catalog = small_catalog();
        let err = Bootstrap::resolve(&catalog, &BootstrapNames::default());
        assert!(matches!(
            err,
            Err(CompileError::MissingBootstrapWord { .. })
        ));
    }
}
