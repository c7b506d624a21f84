mod dict;
mod emit;
mod lexer;
mod sections;
mod token;

use std::{env, fs, path::Path, process};

use crate::dict::catalog::{BootstrapNames, NativeCatalog, VariableTable};
use crate::dict::{disasm, table, CompilerState, ResolveOrder};
use crate::lexer::Lexer;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.contains(&"--help".to_string()) || args.contains(&"-h".to_string()) {
        print_usage();
        return;
    }

    let tokens_only = args.contains(&"--tokens".to_string());
    let dump = args.contains(&"--disasm".to_string());
    let dict = args.contains(&"--dict".to_string());
    let shadow = args.contains(&"--shadow".to_string());

    // non-flag arguments: input file, then optional output file
    let mut files = args.iter().skip(1).filter(|a| !a.starts_with('-'));
    let input = match files.next() {
        Some(f) => f.clone(),
        None => {
            print_usage();
            process::exit(1);
        }
    };
    let output = files.next().cloned().unwrap_or_else(|| default_output(&input));

    let source = match fs::read_to_string(&input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to read '{}': {}", input, e);
            process::exit(1);
        }
    };

    let order = if shadow {
        ResolveOrder::LastDeclared
    } else {
        ResolveOrder::FirstDeclared
    };

    run(&source, &output, order, tokens_only, dump, dict);
}

fn print_usage() {
    println!("stosc - threaded-code dictionary compiler");
    println!();
    println!("Usage:");
    println!("  stosc <input> [output]    Compile and write generated source");
    println!("  stosc --dict <input>      Also write the binary dictionary (output.dict)");
    println!("  stosc --disasm <input>    Print the compiled words");
    println!("  stosc --tokens <input>    Show the classified token stream only");
    println!("  stosc --shadow <input>    Redefinitions shadow earlier words");
    println!("  stosc --help, -h          Show this help");
}

fn default_output(input: &str) -> String {
    let path = Path::new(input);
    path.with_extension("rs").to_string_lossy().into_owned()
}

fn run(source: &str, output: &str, order: ResolveOrder, tokens_only: bool, dump: bool, dict: bool) {
    println!("compiling dictionary...");
    let sections = match sections::split(source) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Input error: {}", e);
            process::exit(1);
        }
    };

    if tokens_only {
        dump_tokens(&sections.definitions);
        return;
    }

    println!("Compiling variables");
    let variables = VariableTable::load_section(&sections.variables);
    println!("Compiling internals");
    let catalog = NativeCatalog::load_section(&sections.natives);

    let mut state = match CompilerState::new(catalog, variables, &BootstrapNames::default(), order)
    {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Compile error: {}", e);
            process::exit(1);
        }
    };

    println!("Compiling definitions");
    if let Err(e) = state.compile_section(&sections.definitions) {
        eprintln!("Compile error: {}", e);
        process::exit(1);
    }

    for diagnostic in state.diagnostics() {
        eprintln!("{}", diagnostic);
    }
    let warnings = state.diagnostics().len();

    let bootstrap = *state.bootstrap();
    let (catalog, variables, compiled, _) = state.into_parts();
    let tables = match table::build_tables(&catalog, &variables, &compiled, bootstrap) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Compile error: {}", e);
            process::exit(1);
        }
    };

    if dump {
        disasm::print_dict(&tables);
    }

    let generated = emit::emit_source(&sections, &catalog, &variables, &compiled);
    if let Err(e) = fs::write(output, generated) {
        eprintln!("Failed to write '{}': {}", output, e);
        process::exit(1);
    }

    if dict {
        let dict_path = format!("{}.dict", output);
        let bytes = match postcard::to_allocvec(&tables) {
            Ok(b) => b,
            Err(e) => {
                eprintln!("Failed to serialize dictionary: {}", e);
                process::exit(1);
            }
        };
        if let Err(e) = fs::write(&dict_path, bytes) {
            eprintln!("Failed to write '{}': {}", dict_path, e);
            process::exit(1);
        }
    }

    if warnings > 0 {
        eprintln!("done with {} warning(s).", warnings);
    } else {
        println!("done.");
    }
}

fn dump_tokens(definitions: &[String]) {
    for def in definitions {
        let tokens = Lexer::new(def).tokenize();
        for (i, token) in tokens.iter().enumerate() {
            println!("{:3}  {:?}  {}", i, token, token);
        }
        println!();
    }
}
