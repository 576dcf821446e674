//! Token definitions for the Tagl language
//!
//! Raw tokenization is done with the logos derive macro; the [`RawToken`]
//! enum below is what logos produces directly from source text. The
//! [`Token`] enum is the kind the rest of the crate works with: it adds the
//! string kinds that only the scanner can produce (a plain string literal
//! versus a template-literal segment terminated by `\{`) plus `Eof` and
//! `Illegal`, none of which logos can emit on its own.
//!
//! The markup sub-grammar has five distinguished kinds: `<`, `</`, `@`, `=`
//! and `>`. Everything else is the ordinary surface of a small C-family
//! language.

use logos::Logos;
use std::fmt;

/// Tokens as produced directly by the logos lexer.
///
/// String literals are not scanned here: the lexer stops at the opening
/// quote (`Quote`) and the [scanner](super::scanning) takes over, because a
/// literal may be split into template segments at each `\{`.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum RawToken {
    // Markup
    #[token("</")]
    EndTagOpen,
    #[token("<=")]
    Leq,
    #[token("<")]
    Lss,
    #[token(">=")]
    Geq,
    #[token(">")]
    Gtr,
    #[token("@")]
    At,

    // Operators and punctuation
    #[token("==")]
    EqEq,
    #[token("!=")]
    Neq,
    #[token("=")]
    Assign,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("!")]
    Not,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBrack,
    #[token("]")]
    RBrack,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token("->")]
    Arrow,

    // Keywords
    #[token("fn")]
    Fn,
    #[token("let")]
    Let,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("for")]
    For,
    #[token("switch")]
    Switch,
    #[token("case")]
    Case,
    #[token("default")]
    Default,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("goto")]
    Goto,
    #[token("return")]
    Return,

    // Literal starts
    #[token("\"")]
    Quote,
    #[regex(r"[0-9][0-9a-zA-Z_]*")]
    Int,
    #[regex(r"'(\\.|[^'\\\n])'")]
    Char,
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    // Comments are tokens, not skips: the scanner collects them into a
    // side table for the printer's layout decisions.
    #[regex(r"//[^\n]*")]
    LineComment,
    #[regex(r"/\*[^*]*\*+([^/*][^*]*\*+)*/")]
    BlockComment,
}

/// Token kinds as seen by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    // Markup
    EndTagOpen,
    Lss,
    Gtr,
    At,

    // Operators and punctuation
    Assign,
    EqEq,
    Neq,
    Leq,
    Geq,
    AndAnd,
    OrOr,
    Not,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBrack,
    RBrack,
    Comma,
    Dot,
    Colon,
    Semicolon,
    Arrow,

    // Keywords
    Fn,
    Let,
    If,
    Else,
    For,
    Switch,
    Case,
    Default,
    Break,
    Continue,
    Goto,
    Return,

    // Literals
    Int,
    Char,
    Ident,
    /// A complete plain string literal, or the final segment of a template
    /// literal (terminated by the closing quote).
    Str,
    /// A template-literal segment terminated by `\{` (more parts follow).
    TemplateStr,

    Eof,
    Illegal,
}

impl Token {
    /// Whether a statement starting with this token is one of the four
    /// markup statement forms.
    pub fn starts_tag_construct(&self) -> bool {
        matches!(
            self,
            Token::Lss | Token::EndTagOpen | Token::At | Token::Str | Token::TemplateStr
        )
    }

    /// Tokens that terminate a tag's attribute body (`<name ... >`).
    pub fn ends_tag_body(&self) -> bool {
        matches!(
            self,
            Token::Case | Token::Default | Token::Gtr | Token::RBrace | Token::Eof
        )
    }

    /// Binary operator precedence; 0 means "not a binary operator".
    pub fn precedence(&self) -> u8 {
        match self {
            Token::OrOr => 1,
            Token::AndAnd => 2,
            Token::EqEq | Token::Neq | Token::Lss | Token::Leq | Token::Gtr | Token::Geq => 3,
            Token::Plus | Token::Minus => 4,
            Token::Star | Token::Slash | Token::Percent => 5,
            _ => 0,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Token::EndTagOpen => "'</'",
            Token::Lss => "'<'",
            Token::Gtr => "'>'",
            Token::At => "'@'",
            Token::Assign => "'='",
            Token::EqEq => "'=='",
            Token::Neq => "'!='",
            Token::Leq => "'<='",
            Token::Geq => "'>='",
            Token::AndAnd => "'&&'",
            Token::OrOr => "'||'",
            Token::Not => "'!'",
            Token::Plus => "'+'",
            Token::Minus => "'-'",
            Token::Star => "'*'",
            Token::Slash => "'/'",
            Token::Percent => "'%'",
            Token::LParen => "'('",
            Token::RParen => "')'",
            Token::LBrace => "'{'",
            Token::RBrace => "'}'",
            Token::LBrack => "'['",
            Token::RBrack => "']'",
            Token::Comma => "','",
            Token::Dot => "'.'",
            Token::Colon => "':'",
            Token::Semicolon => "';'",
            Token::Arrow => "'->'",
            Token::Fn => "'fn'",
            Token::Let => "'let'",
            Token::If => "'if'",
            Token::Else => "'else'",
            Token::For => "'for'",
            Token::Switch => "'switch'",
            Token::Case => "'case'",
            Token::Default => "'default'",
            Token::Break => "'break'",
            Token::Continue => "'continue'",
            Token::Goto => "'goto'",
            Token::Return => "'return'",
            Token::Int => "integer literal",
            Token::Char => "char literal",
            Token::Ident => "identifier",
            Token::Str => "string literal",
            Token::TemplateStr => "template literal",
            Token::Eof => "end of file",
            Token::Illegal => "illegal token",
        };
        f.write_str(s)
    }
}

impl From<RawToken> for Token {
    fn from(raw: RawToken) -> Self {
        match raw {
            RawToken::EndTagOpen => Token::EndTagOpen,
            RawToken::Lss => Token::Lss,
            RawToken::Gtr => Token::Gtr,
            RawToken::At => Token::At,
            RawToken::Assign => Token::Assign,
            RawToken::EqEq => Token::EqEq,
            RawToken::Neq => Token::Neq,
            RawToken::Leq => Token::Leq,
            RawToken::Geq => Token::Geq,
            RawToken::AndAnd => Token::AndAnd,
            RawToken::OrOr => Token::OrOr,
            RawToken::Not => Token::Not,
            RawToken::Plus => Token::Plus,
            RawToken::Minus => Token::Minus,
            RawToken::Star => Token::Star,
            RawToken::Slash => Token::Slash,
            RawToken::Percent => Token::Percent,
            RawToken::LParen => Token::LParen,
            RawToken::RParen => Token::RParen,
            RawToken::LBrace => Token::LBrace,
            RawToken::RBrace => Token::RBrace,
            RawToken::LBrack => Token::LBrack,
            RawToken::RBrack => Token::RBrack,
            RawToken::Comma => Token::Comma,
            RawToken::Dot => Token::Dot,
            RawToken::Colon => Token::Colon,
            RawToken::Semicolon => Token::Semicolon,
            RawToken::Arrow => Token::Arrow,
            RawToken::Fn => Token::Fn,
            RawToken::Let => Token::Let,
            RawToken::If => Token::If,
            RawToken::Else => Token::Else,
            RawToken::For => Token::For,
            RawToken::Switch => Token::Switch,
            RawToken::Case => Token::Case,
            RawToken::Default => Token::Default,
            RawToken::Break => Token::Break,
            RawToken::Continue => Token::Continue,
            RawToken::Goto => Token::Goto,
            RawToken::Return => Token::Return,
            RawToken::Int => Token::Int,
            RawToken::Char => Token::Char,
            RawToken::Ident => Token::Ident,
            // Quote and comments never reach the parser: the scanner
            // resolves quotes into Str/TemplateStr and files comments away.
            RawToken::Quote => Token::Illegal,
            RawToken::LineComment | RawToken::BlockComment => Token::Illegal,
        }
    }
}
