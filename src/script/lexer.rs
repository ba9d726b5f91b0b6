//! Tokenizer for watched scripts

use super::error::ParseError;

pub(crate) const KEYWORDS: &[&str] = &[
    "and", "as", "break", "continue", "else", "false", "fn", "for", "from", "if", "import", "in",
    "nil", "not", "or", "raise", "return", "true", "while",
];

// Longest symbols first so `==` wins over `=`.
const SYMBOLS: &[&str] = &[
    "==", "!=", "<=", ">=", "(", ")", "[", "]", "{", "}", ",", ".", ";", "=", "<", ">", "+", "-",
    "*", "/", "%",
];

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Ident(String),
    Int(i64),
    Float(f64),
    Str(String),
    Kw(&'static str),
    Sym(&'static str),
    Newline,
    Eof,
}

#[derive(Debug, Clone)]
pub(crate) struct Spanned {
    pub token: Token,
    pub line: usize,
    pub column: usize,
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_cont(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Split source text into tokens.
///
/// Newlines are significant statement terminators except inside `(...)` and
/// `[...]`, where they are skipped.
pub(crate) fn tokenize(source: &str) -> Result<Vec<Spanned>, ParseError> {
    Lexer::new(source).run()
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    depth: usize,
    tokens: Vec<Spanned>,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            depth: 0,
            tokens: Vec::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn push(&mut self, token: Token, line: usize, column: usize) {
        self.tokens.push(Spanned {
            token,
            line,
            column,
        });
    }

    fn run(mut self) -> Result<Vec<Spanned>, ParseError> {
        while let Some(c) = self.peek() {
            let (line, column) = (self.line, self.column);
            match c {
                ' ' | '\t' | '\r' => {
                    self.bump();
                }
                '#' => {
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.bump();
                    }
                }
                '\\' if self.peek_at(1) == Some('\n') => {
                    self.bump();
                    self.bump();
                }
                '\n' => {
                    self.bump();
                    if self.depth == 0 {
                        self.push(Token::Newline, line, column);
                    }
                }
                '"' | '\'' => {
                    let s = self.string(c)?;
                    self.push(Token::Str(s), line, column);
                }
                c if c.is_ascii_digit() => {
                    let token = self.number()?;
                    self.push(token, line, column);
                }
                c if is_ident_start(c) => {
                    let mut word = String::new();
                    while let Some(c) = self.peek().filter(|&c| is_ident_cont(c)) {
                        word.push(c);
                        self.bump();
                    }
                    let token = match KEYWORDS.iter().copied().find(|&kw| kw == word) {
                        Some(kw) => Token::Kw(kw),
                        None => Token::Ident(word),
                    };
                    self.push(token, line, column);
                }
                _ => {
                    let sym = self.symbol().ok_or_else(|| {
                        ParseError::new(line, column, format!("unexpected character '{c}'"))
                    })?;
                    match sym {
                        "(" | "[" => self.depth += 1,
                        ")" | "]" => self.depth = self.depth.saturating_sub(1),
                        _ => {}
                    }
                    self.push(Token::Sym(sym), line, column);
                }
            }
        }
        let (line, column) = (self.line, self.column);
        self.push(Token::Newline, line, column);
        self.push(Token::Eof, line, column);
        Ok(self.tokens)
    }

    fn symbol(&mut self) -> Option<&'static str> {
        let sym = SYMBOLS.iter().copied().find(|sym| {
            sym.chars()
                .enumerate()
                .all(|(i, c)| self.peek_at(i) == Some(c))
        })?;
        for _ in 0..sym.len() {
            self.bump();
        }
        Some(sym)
    }

    fn number(&mut self) -> Result<Token, ParseError> {
        let (line, column) = (self.line, self.column);
        let mut text = String::new();
        while let Some(c) = self.peek().filter(|c| c.is_ascii_digit() || *c == '_') {
            if c != '_' {
                text.push(c);
            }
            self.bump();
        }

        let is_float =
            self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit());
        if !is_float {
            return text.parse().map(Token::Int).map_err(|_| {
                ParseError::new(line, column, format!("integer literal {text} is too large"))
            });
        }

        text.push('.');
        self.bump();
        while let Some(c) = self.peek().filter(|c| c.is_ascii_digit()) {
            text.push(c);
            self.bump();
        }
        text.parse()
            .map(Token::Float)
            .map_err(|_| ParseError::new(line, column, format!("invalid float literal {text}")))
    }

    fn string(&mut self, quote: char) -> Result<String, ParseError> {
        let (line, column) = (self.line, self.column);
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => {
                    return Err(ParseError::new(line, column, "unterminated string literal"))
                }
                Some(c) if c == quote => return Ok(out),
                Some('\\') => {
                    let escaped = match self.bump() {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some('0') => '\0',
                        Some(c @ ('\\' | '"' | '\'')) => c,
                        Some(c) => {
                            return Err(ParseError::new(
                                self.line,
                                self.column,
                                format!("unknown escape sequence '\\{c}'"),
                            ))
                        }
                        None => {
                            return Err(ParseError::new(line, column, "unterminated string literal"))
                        }
                    };
                    out.push(escaped);
                }
                Some(c) => out.push(c),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn newlines_inside_brackets_are_skipped() {
        let toks = tokens("f(1,\n2)\n");
        assert_eq!(
            toks,
            vec![
                Token::Ident("f".into()),
                Token::Sym("("),
                Token::Int(1),
                Token::Sym(","),
                Token::Int(2),
                Token::Sym(")"),
                Token::Newline,
                Token::Newline,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn longest_symbol_wins() {
        assert_eq!(
            tokens("a == b"),
            vec![
                Token::Ident("a".into()),
                Token::Sym("=="),
                Token::Ident("b".into()),
                Token::Newline,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn comments_are_ignored() {
        assert_eq!(
            tokens("x # set x"),
            vec![Token::Ident("x".into()), Token::Newline, Token::Eof]
        );
    }

    #[test]
    fn floats_and_method_like_dots() {
        assert_eq!(tokens("1.5")[0], Token::Float(1.5));
        assert_eq!(
            tokens("m.x")[..3],
            [
                Token::Ident("m".into()),
                Token::Sym("."),
                Token::Ident("x".into())
            ]
        );
    }

    #[test]
    fn string_escapes() {
        assert_eq!(tokens(r#""a\n\"b""#)[0], Token::Str("a\n\"b".into()));
    }

    #[test]
    fn unterminated_string_reports_position() {
        let err = tokenize("x = 1\ny = \"oops").unwrap_err();
        assert_eq!((err.line, err.column), (2, 5));
    }

    #[test]
    fn unexpected_character_is_an_error() {
        let err = tokenize("x = $").unwrap_err();
        assert!(err.message.contains("unexpected character '$'"));
    }
}
