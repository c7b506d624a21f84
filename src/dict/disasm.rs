use crate::dict::entry::{flags, DictionaryTables};

/// Print a human-readable listing of every compiled word.
pub fn print_dict(tables: &DictionaryTables) {
    println!("=== DICTIONARY ===\n");
    println!(
        "{} native words, {} compiled words, {} variables\n",
        tables.native_count,
        tables.code.len(),
        tables.var_count
    );

    for (i, code) in tables.code.iter().enumerate() {
        let index = tables.native_count + i;
        print_word(&tables.names[index], index, code, &tables.names);
    }
}

fn print_word(name: &str, index: usize, code: &[u16], names: &[String]) {
    println!("========================================");
    println!(" {} /*{}*/", name, index);
    println!(" {} units", code.len());
    println!("========================================");

    for (pos, &unit) in code.iter().enumerate() {
        if pos == 0 {
            println!("{:04}   FLAGS       {}", pos, format_flags(unit));
        } else if (unit as usize) < names.len() {
            println!("{:04}   {:<5}       {}", pos, unit, names[unit as usize]);
        } else {
            println!("{:04}   {:<5}       #{:#06x}", pos, unit, unit);
        }
    }
    println!();
}

fn format_flags(bits: u16) -> String {
    if bits == 0 {
        return "-".to_string();
    }
    let mut parts = Vec::new();
    if bits & flags::IMMEDIATE != 0 {
        parts.push("IMMEDIATE");
    }
    if bits & flags::HIDDEN != 0 {
        parts.push("HIDDEN");
    }
    if bits & flags::COMPILE_ONLY != 0 {
        parts.push("COMPILE-ONLY");
    }
    parts.join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_flags() {
        assert_eq!(format_flags(0), "-");
        assert_eq!(format_flags(1), "IMMEDIATE");
        assert_eq!(format_flags(3), "IMMEDIATE | HIDDEN");
        assert_eq!(format_flags(4), "COMPILE-ONLY");
    }
}
