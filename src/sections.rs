/// The literal line separating sections of the input file.
const SEPARATOR: &str = "========";

/// Structural problems with the input file. These are fatal: without all
/// six sections there is nothing sensible to compile.
#[derive(Debug)]
pub struct SectionError {
    pub message: String,
}

impl SectionError {
    fn new(message: impl Into<String>) -> Self {
        SectionError {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SectionError {}

/// The six raw chunks of the input, in fixed order.
#[derive(Debug)]
pub struct Sections {
    /// verbatim text copied to the head of the generated source
    pub prefix: String,
    /// verbatim text copied between the tables and the native bodies
    pub infix: String,
    /// verbatim text copied to the tail
    pub postfix: String,
    /// raw variable-name section, one name per line
    pub variables: String,
    /// raw native-word section
    pub natives: String,
    /// one string per logical definition, multi-line joined
    pub definitions: Vec<String>,
}

/// Split raw input on the `========` separator line into the six
/// sections. Anything other than exactly six is a structural error.
pub fn split(source: &str) -> Result<Sections, SectionError> {
    let mut chunks: Vec<String> = vec![String::new()];
    for line in source.lines() {
        if line.trim_end() == SEPARATOR {
            chunks.push(String::new());
        } else {
            let chunk = chunks.last_mut().unwrap();
            chunk.push_str(line);
            chunk.push('\n');
        }
    }

    if chunks.len() != 6 {
        return Err(SectionError::new(format!(
            "expected 6 sections ({} separator lines), found {}",
            SEPARATOR,
            chunks.len()
        )));
    }

    let mut chunks = chunks.into_iter();
    Ok(Sections {
        prefix: chunks.next().unwrap(),
        infix: chunks.next().unwrap(),
        postfix: chunks.next().unwrap(),
        variables: chunks.next().unwrap(),
        natives: chunks.next().unwrap(),
        definitions: join_definitions(&chunks.next().unwrap()),
    })
}

/// A definition logically ends at a line whose trimmed text ends in `;`;
/// until then physical lines are concatenated with a single space.
fn join_definitions(text: &str) -> Vec<String> {
    let mut definitions = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(line);
        if current.ends_with(';') {
            definitions.push(std::mem::take(&mut current));
        }
    }
    // an unterminated trailer still reaches the compiler, which will
    // warn about it
    if !current.is_empty() {
        definitions.push(current);
    }
    definitions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> String {
        [
            "// prefix",
            "========",
            "// infix",
            "========",
            "// postfix",
            "========",
            "x",
            "y",
            "========",
            "dup",
            "\tpush(tos());",
            "========",
            ": double dup + ;",
            ": longer dup",
            "  dup + ;",
            "",
        ]
        .join("\n")
    }

    #[test]
    fn test_split_yields_six_sections() {
        let sections = split(&sample()).unwrap();
        assert_eq!(sections.prefix, "// prefix\n");
        assert_eq!(sections.infix, "// infix\n");
        assert_eq!(sections.postfix, "// postfix\n");
        assert_eq!(sections.variables, "x\ny\n");
        assert!(sections.natives.starts_with("dup\n"));
        assert_eq!(sections.definitions.len(), 2);
    }

    #[test]
    fn test_multi_line_definition_is_joined_with_spaces() {
        let sections = split(&sample()).unwrap();
        assert_eq!(sections.definitions[1], ": longer dup dup + ;");
    }

    #[test]
    fn test_too_few_sections_is_fatal() {
        let err = split("just one section\n");
        assert!(err.is_err());
        assert!(err.unwrap_err().to_string().contains("expected 6"));
    }

    #[test]
    fn test_unterminated_definition_is_kept() {
        let src = "\n========\n\n========\n\n========\n\n========\n\n========\n: broken dup\n";
        let sections = split(src).unwrap();
        assert_eq!(sections.definitions, vec![": broken dup"]);
    }
}
