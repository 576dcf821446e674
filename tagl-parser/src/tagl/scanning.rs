//! Streaming scanner over the logos lexer
//!
//! The scanner owns the two jobs logos cannot do alone:
//!
//! 1. String and template-literal scanning. A literal may be split into
//!    segments at each `\{`; the scanner stops at each split and hands the
//!    parser a `TemplateStr` segment. After the parser has consumed the
//!    embedded expression and its closing `}`, it calls
//!    [`Scanner::template_continue`] to resume the literal from the byte
//!    after the brace. The final segment (terminated by the closing quote)
//!    comes back as `Str`.
//!
//! 2. Comment collection. Comments are filtered out of the token stream
//!    and filed into a side table ordered by position; the layout printer
//!    consults it when deciding whether a tag can render on one line.
//!
//! Scan errors are recorded, never thrown: an unterminated literal yields
//! the partial segment plus a diagnostic, and scanning continues on the
//! next line.

use super::ast::nodes::Comment;
use super::ast::span::{Pos, Span};
use super::diagnostics::Diagnostics;
use super::token::{RawToken, Token};
use logos::Logos;

/// One token as delivered to the parser.
#[derive(Debug, Clone, PartialEq)]
pub struct Scanned {
    pub tok: Token,
    pub span: Span,
    /// Literal text for identifier/literal tokens; empty otherwise. String
    /// segments keep their delimiters (opening/closing quote), escapes
    /// undecoded, so the printer can reproduce them verbatim.
    pub lit: String,
}

pub struct Scanner<'a> {
    src: &'a str,
    lex: logos::Lexer<'a, RawToken>,
    comments: Vec<Comment>,
    diags: Diagnostics,
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            lex: RawToken::lexer(src),
            comments: Vec::new(),
            diags: Diagnostics::new(),
        }
    }

    /// Produce the next token, filtering comments and resolving quotes into
    /// string/template-segment tokens.
    pub fn next(&mut self) -> Scanned {
        loop {
            let Some(result) = self.lex.next() else {
                let eof = Pos::new(self.src.len());
                return Scanned { tok: Token::Eof, span: Span::new(eof, eof), lit: String::new() };
            };
            let span = Span::from_range(&self.lex.span());
            match result {
                Ok(RawToken::LineComment) | Ok(RawToken::BlockComment) => {
                    self.comments.push(Comment { span, text: self.lex.slice().to_string() });
                }
                Ok(RawToken::Quote) => {
                    return self.scan_segment(span.start.offset(), true);
                }
                Ok(raw) => {
                    let tok = Token::from(raw);
                    let lit = match tok {
                        Token::Ident | Token::Int | Token::Char => self.lex.slice().to_string(),
                        _ => String::new(),
                    };
                    return Scanned { tok, span, lit };
                }
                Err(()) => {
                    self.diags.error(span.start, "illegal character");
                }
            }
        }
    }

    /// Resume a template literal after an interpolation's closing `}`.
    ///
    /// Must be called when the most recently scanned token is that `}`;
    /// scanning restarts at the byte just after it.
    pub fn template_continue(&mut self) -> Scanned {
        let seg_start = self.lex.span().end;
        self.scan_segment(seg_start, false)
    }

    /// Scan one string segment starting at `seg_start`. When `opening`,
    /// the segment begins at the opening quote (already consumed by
    /// logos); otherwise it begins at raw literal text.
    ///
    /// Terminators: an unescaped `"` ends the literal (`Str`); `\{` ends
    /// the segment with more parts to come (`TemplateStr`); a newline or
    /// end of file is an unterminated-literal error, recovered by closing
    /// the literal at that point.
    fn scan_segment(&mut self, seg_start: usize, opening: bool) -> Scanned {
        let rest = self.lex.remainder();
        let bytes = rest.as_bytes();
        let mut i = 0;

        loop {
            if i >= bytes.len() {
                self.diags.error(Pos::new(seg_start), "string literal not terminated");
                self.lex.bump(i);
                return self.segment_token(Token::Str, seg_start, opening, i);
            }
            match bytes[i] {
                b'"' => {
                    i += 1;
                    self.lex.bump(i);
                    return self.segment_token(Token::Str, seg_start, opening, i);
                }
                b'\n' => {
                    self.diags.error(Pos::new(seg_start), "string literal not terminated");
                    self.lex.bump(i);
                    return self.segment_token(Token::Str, seg_start, opening, i);
                }
                b'\\' => {
                    match bytes.get(i + 1) {
                        Some(b'{') => {
                            // The segment excludes the `\{` itself.
                            let seg_len = i;
                            self.lex.bump(i + 2);
                            return self.segment_token(Token::TemplateStr, seg_start, opening, seg_len);
                        }
                        Some(b'n') | Some(b't') | Some(b'r') | Some(b'\\') | Some(b'"')
                        | Some(b'\'') | Some(b'0') => i += 2,
                        Some(_) => {
                            let at = if opening { seg_start + 1 } else { seg_start };
                            self.diags.error(Pos::new(at + i), "unknown escape sequence");
                            i += 2;
                        }
                        None => i += 1,
                    }
                }
                b => i += utf8_len(b),
            }
        }
    }

    fn segment_token(&self, tok: Token, seg_start: usize, opening: bool, consumed: usize) -> Scanned {
        // The opening segment started one byte before the remainder (at
        // the quote logos already consumed).
        let text_start = if opening { seg_start + 1 } else { seg_start };
        let end = text_start + consumed;
        Scanned {
            tok,
            span: Span::new(Pos::new(seg_start), Pos::new(end)),
            lit: self.src[seg_start..end].to_string(),
        }
    }

    /// Comments collected so far, in source order.
    pub fn into_parts(self) -> (Vec<Comment>, Diagnostics) {
        (self.comments, self.diags)
    }
}

fn utf8_len(first_byte: u8) -> usize {
    match first_byte {
        b if b < 0x80 => 1,
        b if b < 0xE0 => 2,
        b if b < 0xF0 => 3,
        _ => 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_all(src: &str) -> Vec<Scanned> {
        let mut scanner = Scanner::new(src);
        let mut out = Vec::new();
        loop {
            let s = scanner.next();
            let done = s.tok == Token::Eof;
            out.push(s);
            if done {
                break;
            }
        }
        out
    }

    #[test]
    fn test_plain_string() {
        let tokens = scan_all(r#""test""#);
        assert_eq!(tokens[0].tok, Token::Str);
        assert_eq!(tokens[0].lit, r#""test""#);
        assert_eq!(tokens[0].span, Span::new(Pos(0), Pos(6)));
    }

    #[test]
    fn test_template_first_segment() {
        let mut scanner = Scanner::new(r#""test \{sth}""#);
        let first = scanner.next();
        assert_eq!(first.tok, Token::TemplateStr);
        assert_eq!(first.lit, r#""test "#);

        // The embedded expression comes out as ordinary tokens.
        let ident = scanner.next();
        assert_eq!(ident.tok, Token::Ident);
        assert_eq!(ident.lit, "sth");
        let rbrace = scanner.next();
        assert_eq!(rbrace.tok, Token::RBrace);

        let last = scanner.template_continue();
        assert_eq!(last.tok, Token::Str);
        assert_eq!(last.lit, r#"""#);
    }

    #[test]
    fn test_template_two_parts() {
        let mut scanner = Scanner::new(r#""a \{x} b \{y} c""#);
        assert_eq!(scanner.next().lit, r#""a "#);
        scanner.next(); // x
        scanner.next(); // }
        let mid = scanner.template_continue();
        assert_eq!(mid.tok, Token::TemplateStr);
        assert_eq!(mid.lit, " b ");
        scanner.next(); // y
        scanner.next(); // }
        let last = scanner.template_continue();
        assert_eq!(last.tok, Token::Str);
        assert_eq!(last.lit, r#" c""#);
    }

    #[test]
    fn test_escapes_stay_raw() {
        let tokens = scan_all(r#""a\nb\"c""#);
        assert_eq!(tokens[0].tok, Token::Str);
        assert_eq!(tokens[0].lit, r#""a\nb\"c""#);
    }

    #[test]
    fn test_unterminated_string() {
        let mut scanner = Scanner::new("\"oops\nx");
        let s = scanner.next();
        assert_eq!(s.tok, Token::Str);
        assert_eq!(s.lit, "\"oops");
        let next = scanner.next();
        assert_eq!(next.tok, Token::Ident);
        let (_, diags) = scanner.into_parts();
        assert!(diags.iter().any(|d| d.message == "string literal not terminated"));
    }

    #[test]
    fn test_comments_filtered_and_collected() {
        let mut scanner = Scanner::new("a // one\n/* two */ b");
        assert_eq!(scanner.next().lit, "a");
        assert_eq!(scanner.next().lit, "b");
        assert_eq!(scanner.next().tok, Token::Eof);
        let (comments, diags) = scanner.into_parts();
        assert!(diags.is_empty());
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].text, "// one");
        assert!(comments[0].is_line());
        assert_eq!(comments[1].text, "/* two */");
        assert!(!comments[1].is_line());
        assert!(!comments[1].is_multiline());
    }

    #[test]
    fn test_markup_stream() {
        let kinds: Vec<Token> = scan_all("<div @a=\"x\"></div>")
            .into_iter()
            .map(|s| s.tok)
            .collect();
        assert_eq!(
            kinds,
            vec![
                Token::Lss,
                Token::Ident,
                Token::At,
                Token::Ident,
                Token::Assign,
                Token::Str,
                Token::Gtr,
                Token::EndTagOpen,
                Token::Ident,
                Token::Gtr,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_illegal_character_recovery() {
        let mut scanner = Scanner::new("a # b");
        assert_eq!(scanner.next().lit, "a");
        assert_eq!(scanner.next().lit, "b");
        let (_, diags) = scanner.into_parts();
        assert_eq!(diags.len(), 1);
    }
}
