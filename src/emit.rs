use crate::dict::catalog::{NativeCatalog, VariableTable};
use crate::dict::entry::DictionaryEntry;
use crate::sections::Sections;

/// Stitch the generated source: the three verbatim templates from the
/// input, with the constant declarations, name/code tables, variable
/// slots, native bodies and the dispatch function filled in between.
pub fn emit_source(
    sections: &Sections,
    catalog: &NativeCatalog,
    variables: &VariableTable,
    compiled: &[DictionaryEntry],
) -> String {
    let mut out = String::new();
    let native_count = catalog.len();

    out.push_str(&sections.prefix);

    out.push_str(&format!(
        "const INTERNAL_SIZE: usize = {};\n\n",
        native_count
    ));
    for (i, word) in catalog.words().iter().enumerate() {
        out.push_str(&format!(
            "const WORD_{}: u16 = {};\n",
            const_name(&word.constant),
            i
        ));
    }
    for (i, entry) in compiled.iter().enumerate() {
        if let Some(constant) = &entry.constant {
            let mangled = const_name(constant);
            if is_referenced(&mangled, sections, catalog) {
                out.push_str(&format!(
                    "const WORD_{}: u16 = {};\n",
                    mangled,
                    native_count + i
                ));
            }
        }
    }

    out.push_str("\nstatic WORD_NAMES: &[&str] = &[\n");
    for (i, word) in catalog.words().iter().enumerate() {
        out.push_str(&format!("    \"{}\" /*{}*/,\n", escape(&word.name), i));
    }
    for (i, entry) in compiled.iter().enumerate() {
        out.push_str(&format!(
            "    \"{}\" /*{}*/,\n",
            escape(&entry.name),
            native_count + i
        ));
    }
    out.push_str("];\n\nstatic WORD_CODE: &[&[u16]] = &[\n");
    for entry in compiled {
        if let Some(doc) = &entry.doc {
            out.push_str(&format!("    // {}\n", doc));
        }
        let units: Vec<String> = entry
            .code
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|u| u.to_string())
            .collect();
        out.push_str(&format!(
            "    &[/*{}*/ {}],\n",
            escape(&entry.name),
            units.join(", ")
        ));
    }
    out.push_str("];\n\n");

    for (i, name) in variables.names().iter().enumerate() {
        out.push_str(&format!("const {}: usize = {};\n", name, i));
    }
    out.push_str(&format!(
        "const INITIAL_VAR_TOP: usize = {};\n\n",
        variables.len()
    ));

    out.push_str(&sections.infix);

    for word in catalog.words() {
        out.push('\n');
        if let Some(doc) = &word.doc {
            out.push_str(&format!("/// {}\n", doc));
        }
        out.push_str(&format!("fn {}() {{\n", fn_name(&word.constant)));
        out.push_str(&word.body);
        out.push_str("}\n");
    }

    out.push_str("\nfn do_word(pc: u32) {\n    match (pc >> 16) as u16 {\n");
    for word in catalog.words() {
        out.push_str(&format!(
            "        WORD_{} => {}(),\n",
            const_name(&word.constant),
            fn_name(&word.constant)
        ));
    }
    out.push_str("        _ => {\n            docol();\n            return;\n        }\n    }\n    next();\n}\n");

    out.push_str(&sections.postfix);
    out
}

/// A compiled word's constant only earns a declaration if the templates or
/// a native body mention it; otherwise the generated source would be full
/// of unused constants.
fn is_referenced(mangled: &str, sections: &Sections, catalog: &NativeCatalog) -> bool {
    let needle = format!("WORD_{}", mangled);
    if sections.prefix.contains(&needle)
        || sections.infix.contains(&needle)
        || sections.postfix.contains(&needle)
    {
        return true;
    }
    catalog.words().iter().any(|w| w.body.contains(&needle))
}

/// Constant identifiers may carry arbitrary symbol characters; the
/// generated names may not.
fn const_name(constant: &str) -> String {
    constant
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

fn fn_name(constant: &str) -> String {
    let mut name: String = constant
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    if name.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
