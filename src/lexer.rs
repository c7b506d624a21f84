use crate::dict::entry::flags;
use crate::token::Token;

/// Tokenizer for one word definition.
///
/// Tokens are separated by runs of whitespace, with one exception: after a
/// `."` token the raw text up to the next `"` is captured verbatim, spaces
/// included (one separator space after the intro is dropped, Forth-style).
/// The lexer is infallible; an unterminated string simply runs to the end
/// of the definition, where the swallowed `;` terminator will make the
/// authoring bug visible.
pub struct Lexer {
    source: Vec<char>,
    pos: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            source: source.chars().collect(),
            pos: 0,
        }
    }

    fn current(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.current();
        self.pos += 1;
        ch
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_word(&mut self) -> String {
        let mut word = String::new();
        while let Some(ch) = self.current() {
            if ch.is_whitespace() {
                break;
            }
            word.push(ch);
            self.advance();
        }
        word
    }

    /// Raw text up to the closing `"` (or end of input), one leading
    /// separator space dropped.
    fn read_string_body(&mut self) -> String {
        if self.current() == Some(' ') {
            self.advance();
        }
        let mut text = String::new();
        while let Some(ch) = self.current() {
            self.advance();
            if ch == '"' {
                break;
            }
            text.push(ch);
        }
        text
    }

    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace();
            if self.current().is_none() {
                break;
            }
            let word = self.read_word();
            if word == ".\"" {
                tokens.push(Token::StringLit(self.read_string_body()));
            } else {
                tokens.push(classify(&word));
            }
        }
        tokens
    }
}

fn is_label_name(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

/// Map one whitespace-delimited word to its token kind.
fn classify(word: &str) -> Token {
    match word {
        "(" => return Token::CommentOpen,
        ")" => return Token::CommentClose,
        "IMMEDIATE" => return Token::Flag(flags::IMMEDIATE),
        "HIDDEN" => return Token::Flag(flags::HIDDEN),
        "COMPILE-ONLY" => return Token::Flag(flags::COMPILE_ONLY),
        "recurse" => return Token::Recurse,
        _ => {}
    }

    if let Some(name) = word.strip_prefix('%') {
        if !name.is_empty() {
            return Token::ForwardRef(name.to_string());
        }
    }
    if let Some(name) = word.strip_prefix('$') {
        if !name.is_empty() {
            return Token::VariableRef(name.to_string());
        }
    }
    if let Some(name) = word.strip_prefix(':') {
        if is_label_name(name) {
            return Token::LabelDef(name.to_string());
        }
    }
    if let Some(name) = word.strip_suffix(':') {
        if is_label_name(name) {
            return Token::LabelUse(name.to_string());
        }
    }

    Token::WordOrLiteral(word.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(src: &str) -> Vec<Token> {
        Lexer::new(src).tokenize()
    }

    #[test]
    fn test_plain_words_and_terminator() {
        let tokens = lex(": double dup + ;");
        assert_eq!(
            tokens,
            vec![
                Token::WordOrLiteral(":".to_string()),
                Token::WordOrLiteral("double".to_string()),
                Token::WordOrLiteral("dup".to_string()),
                Token::WordOrLiteral("+".to_string()),
                Token::WordOrLiteral(";".to_string()),
            ]
        );
    }

    #[test]
    fn test_classification_kinds() {
        let tokens = lex("%EXEC $state :LOOP LOOP: recurse IMMEDIATE ( )");
        assert_eq!(
            tokens,
            vec![
                Token::ForwardRef("EXEC".to_string()),
                Token::VariableRef("state".to_string()),
                Token::LabelDef("LOOP".to_string()),
                Token::LabelUse("LOOP".to_string()),
                Token::Recurse,
                Token::Flag(flags::IMMEDIATE),
                Token::CommentOpen,
                Token::CommentClose,
            ]
        );
    }

    #[test]
    fn test_label_shapes_need_upper_alnum() {
        // lowercase or empty label names fall back to plain words
        assert_eq!(lex(":loop"), vec![Token::WordOrLiteral(":loop".to_string())]);
        assert_eq!(lex(":"), vec![Token::WordOrLiteral(":".to_string())]);
        assert_eq!(lex("a:"), vec![Token::WordOrLiteral("a:".to_string())]);
        assert_eq!(lex("2X:"), vec![Token::LabelUse("2X".to_string())]);
    }

    #[test]
    fn test_string_literal_keeps_spaces() {
        let tokens = lex(".\" hello world\" drop");
        assert_eq!(
            tokens,
            vec![
                Token::StringLit("hello world".to_string()),
                Token::WordOrLiteral("drop".to_string()),
            ]
        );
    }

    #[test]
    fn test_string_literal_drops_single_separator_space() {
        // only the first space after ." is a separator; the rest is payload
        assert_eq!(
            lex(".\"  padded\""),
            vec![Token::StringLit(" padded".to_string())]
        );
    }

    #[test]
    fn test_unterminated_string_runs_to_end() {
        let tokens = lex(".\" oops ;");
        assert_eq!(tokens, vec![Token::StringLit("oops ;".to_string())]);
    }

    #[test]
    fn test_bare_sigils_are_plain_words() {
        assert_eq!(lex("%"), vec![Token::WordOrLiteral("%".to_string())]);
        assert_eq!(lex("$"), vec![Token::WordOrLiteral("$".to_string())]);
    }

    #[test]
    fn test_flag_keywords() {
        assert_eq!(
            lex("IMMEDIATE HIDDEN COMPILE-ONLY"),
            vec![
                Token::Flag(flags::IMMEDIATE),
                Token::Flag(flags::HIDDEN),
                Token::Flag(flags::COMPILE_ONLY),
            ]
        );
    }
}
