//! Formula compilation boundary and a reference-only tokenizer.
//!
//! Adapting formula text only needs to know which slices of the text are
//! range references. The surrounding application usually owns a full formula
//! compiler and plugs it in through [`FormulaCompiler`]; [`ReferenceTokenizer`]
//! is the built-in fallback that splits text into tokens whose values
//! concatenate back to the exact input.

use std::fmt::{self, Display};

use rangewise_common::is_reference;

const TOKEN_ENDERS: &str = ",;{}() +-*/^&=><%\"";

const fn build_token_enders() -> [bool; 256] {
    let mut tbl = [false; 256];
    let bytes = TOKEN_ENDERS.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        tbl[bytes[i] as usize] = true;
        i += 1;
    }
    tbl
}
static TOKEN_ENDERS_TABLE: [bool; 256] = build_token_enders();

#[inline(always)]
fn is_token_ender(c: u8) -> bool {
    TOKEN_ENDERS_TABLE[c as usize] || c.is_ascii_whitespace()
}

/// The type of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    Literal,
    Operand,
    Func,
    Paren,
    Sep,
    Operator,
    Whitespace,
}

impl Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// The subtype of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenSubType {
    None,
    Text,
    Number,
    Error,
    Range,
    Open,
    Close,
}

/// A slice of formula text. `start..end` are byte offsets into the source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub value: String,
    pub token_type: TokenType,
    pub subtype: TokenSubType,
    pub start: usize,
    pub end: usize,
}

impl Token {
    #[inline]
    pub fn is_reference(&self) -> bool {
        self.token_type == TokenType::Operand && self.subtype == TokenSubType::Range
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{} subtype: {:?} value: {}>",
            self.token_type, self.subtype, self.value
        )
    }
}

/// What the range engine needs from a compiled formula.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledFormula {
    /// Tokens covering the whole formula text, in order.
    pub tokens: Vec<Token>,
    /// Reference texts, in order of appearance.
    pub dependencies: Vec<String>,
}

impl CompiledFormula {
    /// Rebuild formula text, letting `map` rewrite each reference token.
    pub fn render(&self, mut map: impl FnMut(&str) -> String) -> String {
        let mut out = String::new();
        for token in &self.tokens {
            if token.is_reference() {
                out.push_str(&map(&token.value));
            } else {
                out.push_str(&token.value);
            }
        }
        out
    }
}

/// Formula compiler boundary.
pub trait FormulaCompiler {
    fn compile(&self, formula: &str) -> CompiledFormula;
}

/// Tokenizer that recognises just enough syntax to find references.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceTokenizer;

impl ReferenceTokenizer {
    pub fn new() -> Self {
        ReferenceTokenizer
    }

    pub fn tokenize(&self, formula: &str) -> Vec<Token> {
        Lexer::new(formula).run()
    }
}

impl FormulaCompiler for ReferenceTokenizer {
    fn compile(&self, formula: &str) -> CompiledFormula {
        let tokens = self.tokenize(formula);
        let dependencies = tokens
            .iter()
            .filter(|t| t.is_reference())
            .map(|t| t.value.clone())
            .collect();
        CompiledFormula {
            tokens,
            dependencies,
        }
    }
}

struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<Token> {
        while let Some(&c) = self.bytes.get(self.pos) {
            let start = self.pos;
            match c {
                b'"' => {
                    self.pos = self.quoted_end(b'"');
                    self.push(start, TokenType::Literal, TokenSubType::Text);
                }
                b'\'' => {
                    // Quoted sheet name: the reference continues after `!`.
                    self.pos = self.quoted_end(b'\'');
                    self.operand(start);
                }
                b'#' => {
                    self.pos += 1;
                    self.advance_while(|b| !is_token_ender(b));
                    self.push(start, TokenType::Literal, TokenSubType::Error);
                }
                b'(' | b'{' => {
                    self.pos += 1;
                    self.push(start, TokenType::Paren, TokenSubType::Open);
                }
                b')' | b'}' => {
                    self.pos += 1;
                    self.push(start, TokenType::Paren, TokenSubType::Close);
                }
                b',' | b';' => {
                    self.pos += 1;
                    self.push(start, TokenType::Sep, TokenSubType::None);
                }
                b'<' | b'>' => {
                    self.pos += 1;
                    if matches!(self.bytes.get(self.pos), Some(b'=') | Some(b'>')) {
                        self.pos += 1;
                    }
                    self.push(start, TokenType::Operator, TokenSubType::None);
                }
                b'+' | b'-' | b'*' | b'/' | b'^' | b'&' | b'=' | b'%' => {
                    self.pos += 1;
                    self.push(start, TokenType::Operator, TokenSubType::None);
                }
                c if c.is_ascii_whitespace() => {
                    self.advance_while(|b| b.is_ascii_whitespace());
                    self.push(start, TokenType::Whitespace, TokenSubType::None);
                }
                _ => self.operand(start),
            }
        }
        self.tokens
    }

    /// Consume an operand run that began at `start` and classify it.
    fn operand(&mut self, start: usize) {
        self.advance_while(|b| !is_token_ender(b));
        if self.bytes.get(self.pos) == Some(&b'(') {
            self.push(start, TokenType::Func, TokenSubType::None);
            return;
        }
        let text = &self.src[start..self.pos];
        let subtype = if is_reference(text) {
            TokenSubType::Range
        } else if text.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
            TokenSubType::Number
        } else {
            TokenSubType::None
        };
        self.push(start, TokenType::Operand, subtype);
    }

    /// Position just past the closing `quote`, honouring doubled quotes.
    fn quoted_end(&self, quote: u8) -> usize {
        let mut i = self.pos + 1;
        while i < self.bytes.len() {
            if self.bytes[i] == quote {
                if self.bytes.get(i + 1) == Some(&quote) {
                    i += 2;
                    continue;
                }
                return i + 1;
            }
            i += 1;
        }
        self.bytes.len()
    }

    fn advance_while(&mut self, pred: impl Fn(u8) -> bool) {
        while self.bytes.get(self.pos).is_some_and(|&b| pred(b)) {
            self.pos += 1;
        }
    }

    fn push(&mut self, start: usize, token_type: TokenType, subtype: TokenSubType) {
        self.tokens.push(Token {
            value: self.src[start..self.pos].to_string(),
            token_type,
            subtype,
            start,
            end: self.pos,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn references(formula: &str) -> Vec<String> {
        ReferenceTokenizer.compile(formula).dependencies
    }

    #[test]
    fn tokens_cover_the_whole_formula() {
        let formula = "=SUM(A1:B2, 'My Sheet'!$C$3) & \"A1\" <> #REF!";
        let tokens = ReferenceTokenizer.tokenize(formula);
        let rebuilt: String = tokens.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(rebuilt, formula);
        assert_eq!(tokens[1].token_type, TokenType::Func);
        assert_eq!(tokens[1].value, "SUM");
    }

    #[test]
    fn finds_only_references() {
        assert_eq!(
            references("=SUM(A1:B2, 'My Sheet'!$C$3) + \"D4\" + 12 + LOG(E5)"),
            vec!["A1:B2", "'My Sheet'!$C$3", "E5"]
        );
        assert_eq!(references("=Sheet2!A:A*2+3:4"), vec!["Sheet2!A:A", "3:4"]);
        assert!(references("=TRUE+name_1").is_empty());
    }

    #[test]
    fn render_rewrites_references() {
        let compiled = ReferenceTokenizer.compile("=A1+B1");
        let out = compiled.render(|r| format!("[{r}]"));
        assert_eq!(out, "=[A1]+[B1]");
    }

    #[test]
    fn unterminated_strings_run_to_the_end() {
        let tokens = ReferenceTokenizer.tokenize("=\"abc");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].subtype, TokenSubType::Text);
        assert_eq!(tokens[1].end, 5);
    }
}
