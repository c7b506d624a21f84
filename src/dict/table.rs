use std::collections::HashMap;

use crate::dict::catalog::{Bootstrap, NativeCatalog, VariableTable};
use crate::dict::compile_error::CompileError;
use crate::dict::entry::{DictionaryEntry, DictionaryTables};

/// Assemble the final handover tables: the combined name table in
/// dictionary-global order and the code table of the compiled entries.
///
/// Constant identifiers must be unique across the whole generated
/// namespace; this is the one place that checks. Nothing is dropped -
/// an entry nobody references is still emitted.
pub fn build_tables(
    catalog: &NativeCatalog,
    variables: &VariableTable,
    compiled: &[DictionaryEntry],
    bootstrap: Bootstrap,
) -> Result<DictionaryTables, CompileError> {
    let mut seen: HashMap<String, String> = HashMap::new();
    for word in catalog.words() {
        if let Some(first) = seen.insert(word.constant.clone(), word.name.clone()) {
            return Err(CompileError::duplicate_constant(
                &word.constant,
                first,
                &word.name,
            ));
        }
    }
    for entry in compiled {
        let constant = entry.constant_id().to_string();
        if let Some(first) = seen.insert(constant.clone(), entry.name.clone()) {
            return Err(CompileError::duplicate_constant(
                constant,
                first,
                &entry.name,
            ));
        }
    }

    let mut names = Vec::with_capacity(catalog.len() + compiled.len());
    names.extend(catalog.words().iter().map(|w| w.name.clone()));
    names.extend(compiled.iter().map(|e| e.name.clone()));

    let code = compiled
        .iter()
        .map(|e| e.code.clone().unwrap_or_default())
        .collect();

    Ok(DictionaryTables {
        names,
        code,
        native_count: catalog.len(),
        var_count: variables.len(),
        bootstrap,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zero_bootstrap() -> Bootstrap {
        Bootstrap {
            lit_string: 0,
            push_var: 0,
            lit_false: 0,
            lit_one: 0,
            lit_short: 0,
            wide_int: 0,
        }
    }

    fn compiled_entry(name: &str, constant: Option<&str>, code: Vec<u16>) -> DictionaryEntry {
        DictionaryEntry {
            name: name.to_string(),
            constant: constant.map(str::to_string),
            flags: 0,
            code: Some(code),
            doc: None,
        }
    }

    #[test]
    fn test_global_order_is_natives_then_compiled() {
        let mut catalog = NativeCatalog::new();
        catalog.register("dup", None, None, String::new());
        catalog.register("swap", None, None, String::new());
        let variables = VariableTable::load_section("a\nb\n");
        let compiled = vec![
            compiled_entry("double", None, vec![0, 0, 0]),
            compiled_entry("quad", None, vec![0, 2]),
        ];

        let tables = build_tables(&catalog, &variables, &compiled, zero_bootstrap()).unwrap();
        assert_eq!(tables.names, vec!["dup", "swap", "double", "quad"]);
        assert_eq!(tables.native_count, 2);
        assert_eq!(tables.var_count, 2);
        assert_eq!(tables.code.len(), 2);
        assert_eq!(tables.code[1], vec![0, 2]);
    }

    #[test]
    fn test_duplicate_constant_across_spaces_is_fatal() {
        let mut catalog = NativeCatalog::new();
        catalog.register("dup", None, None, String::new());
        let variables = VariableTable::new();
        // display names differ but the constant collides with the native
        let compiled = vec![compiled_entry("2dup", Some("dup"), vec![0])];

        let err = build_tables(&catalog, &variables, &compiled, zero_bootstrap());
        assert!(matches!(err, Err(CompileError::DuplicateConstant { .. })));
    }

    #[test]
    fn test_same_display_name_with_distinct_constants_is_fine() {
        let mut catalog = NativeCatalog::new();
        catalog.register("dup", None, None, String::new());
        let variables = VariableTable::new();
        let compiled = vec![compiled_entry("dup", Some("DUP2"), vec![0])];

        assert!(build_tables(&catalog, &variables, &compiled, zero_bootstrap()).is_ok());
    }

    #[test]
    fn test_tables_survive_postcard_round_trip() {
        let mut catalog = NativeCatalog::new();
        catalog.register("dup", None, None, String::new());
        let variables = VariableTable::load_section("x\n");
        let compiled = vec![compiled_entry("w", None, vec![1, 0, 0xFFFF])];

        let tables = build_tables(&catalog, &variables, &compiled, zero_bootstrap()).unwrap();
        let bytes = postcard::to_allocvec(&tables).unwrap();
        let back: DictionaryTables = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(back.names, tables.names);
        assert_eq!(back.code, tables.code);
        assert_eq!(back.native_count, 1);
        assert_eq!(back.var_count, 1);
    }
}
