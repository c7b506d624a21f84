use crate::dict::entry::flags;

/// One classified unit of a definition's token stream.
///
/// Classification is purely syntactic: it looks only at the shape of the
/// raw token text, never at the symbol tables. Resolution happens later,
/// in the word compiler.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `IMMEDIATE`, `HIDDEN` or `COMPILE-ONLY`; carries the flag bit
    Flag(u16),

    /// `recurse` - the word calls itself
    Recurse,

    /// `%NAME` - reference by constant identifier, possibly forward
    ForwardRef(String),

    /// `$NAME` - reference to a declared variable slot
    VariableRef(String),

    /// `:NAME` - marks the current code position with a label
    LabelDef(String),

    /// `NAME:` - use of a label as a relative jump target
    LabelUse(String),

    /// `." text"` - the raw text between the intro and the closing quote
    StringLit(String),

    /// `(`
    CommentOpen,

    /// `)`
    CommentClose,

    /// Anything else: a word name or an integer literal
    WordOrLiteral(String),
}

impl Token {
    /// The surface text this token was classified from.
    pub fn text(&self) -> String {
        match self {
            Token::Flag(bit) => match *bit {
                flags::IMMEDIATE => "IMMEDIATE".to_string(),
                flags::HIDDEN => "HIDDEN".to_string(),
                flags::COMPILE_ONLY => "COMPILE-ONLY".to_string(),
                other => format!("FLAG({})", other),
            },
            Token::Recurse => "recurse".to_string(),
            Token::ForwardRef(name) => format!("%{}", name),
            Token::VariableRef(name) => format!("${}", name),
            Token::LabelDef(name) => format!(":{}", name),
            Token::LabelUse(name) => format!("{}:", name),
            Token::StringLit(text) => format!(".\" {}\"", text),
            Token::CommentOpen => "(".to_string(),
            Token::CommentClose => ")".to_string(),
            Token::WordOrLiteral(text) => text.clone(),
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_round_trips_surface_form() {
        assert_eq!(Token::ForwardRef("EXEC".to_string()).text(), "%EXEC");
        assert_eq!(Token::VariableRef("state".to_string()).text(), "$state");
        assert_eq!(Token::LabelDef("LOOP".to_string()).text(), ":LOOP");
        assert_eq!(Token::LabelUse("LOOP".to_string()).text(), "LOOP:");
        assert_eq!(Token::Flag(flags::IMMEDIATE).text(), "IMMEDIATE");
        assert_eq!(Token::WordOrLiteral("dup".to_string()).text(), "dup");
    }
}
