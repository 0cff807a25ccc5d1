//! Reader for clause text.
//!
//! Syntax is standard Edinburgh-style:
//! - `head.` and `head :- body.` clauses, `:- goal.` directives
//! - atoms: `foo`, `'quoted atom'`, symbol runs like `=..`, and `!`, `;`, `[]`, `{}`
//! - variables: `X`, `_Tail`, and `_` (each occurrence is a new variable)
//! - integers, including `-3` written without a space
//! - lists `[a, b | T]`, which read as `'.'(a, '.'(b, T))`, and `{X}` as `'{}'(X)`
//! - operators from a fixed table, parsed by precedence
//! - `% line` and `/* block */` comments
//!
//! Each clause gets its own variable scope; variables are numbered from 0 in
//! order of first occurrence.

use std::collections::HashMap;

use smallvec::SmallVec;

use crate::symbol::{Builtins, SymbolStore};
use crate::term::{Term, TermId, TermStore, SYMBOL_CHARS};

/// A term read from text, with its variable scope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedTerm {
    pub term: TermId,
    /// Number of distinct variables, named or anonymous.
    pub var_count: u32,
    /// Named variables in order of first occurrence.
    pub var_names: Vec<(String, u32)>,
}

/// Parse error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    /// Byte offset into the input.
    pub position: usize,
}

impl ParseError {
    fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error at position {}: {}", self.position, self.message)
    }
}

impl std::error::Error for ParseError {}

// ========== OPERATORS ==========

/// Infix operator: (priority, max left priority, max right priority).
fn infix_op(name: &str) -> Option<(u32, u32, u32)> {
    let xfx = |p: u32| Some((p, p - 1, p - 1));
    let xfy = |p: u32| Some((p, p - 1, p));
    let yfx = |p: u32| Some((p, p, p - 1));
    match name {
        ":-" | "-->" => xfx(1200),
        ";" | "|" => xfy(1100),
        "->" => xfy(1050),
        "," => xfy(1000),
        "=" | "\\=" | "==" | "\\==" | "is" | "<" | ">" | "=<" | ">=" | "=:=" | "=\\=" | "=.." => {
            xfx(700)
        }
        "+" | "-" => yfx(500),
        "*" | "/" | "//" | "mod" => yfx(400),
        _ => None,
    }
}

/// Prefix operator: (priority, max argument priority).
fn prefix_op(name: &str) -> Option<(u32, u32)> {
    match name {
        ":-" | "?-" => Some((1200, 1199)),
        "\\+" => Some((900, 900)),
        "-" => Some((200, 200)),
        _ => None,
    }
}

// ========== LEXER ==========

#[derive(Clone, Debug, PartialEq, Eq)]
enum TokenKind {
    /// Unquoted name: identifier, symbol run, or solo `!` / `;`.
    Name(String),
    /// Quoted name. Never read as an operator.
    Quoted(String),
    Var(String),
    Int(i64),
    /// One of `( ) [ ] { } , |`.
    Punct(char),
    /// Clause-terminating `.`.
    End,
    Eof,
}

#[derive(Clone, Debug)]
struct Token {
    kind: TokenKind,
    position: usize,
    /// Whitespace or a comment came right before this token.
    layout_before: bool,
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    /// Skip whitespace and comments. Returns whether anything was skipped.
    fn skip_layout(&mut self) -> Result<bool, ParseError> {
        let start = self.pos;
        loop {
            match self.peek_char() {
                Some(ch) if ch.is_whitespace() => {
                    self.bump();
                }
                Some('%') => {
                    while let Some(ch) = self.bump() {
                        if ch == '\n' {
                            break;
                        }
                    }
                }
                Some('/') if self.peek_char_at(1) == Some('*') => {
                    let open = self.pos;
                    self.pos += 2;
                    match self.input[self.pos..].find("*/") {
                        Some(end) => self.pos += end + 2,
                        None => return Err(ParseError::new("Unterminated block comment", open)),
                    }
                }
                _ => return Ok(self.pos > start),
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        let layout_before = self.skip_layout()?;
        let position = self.pos;
        let token = |kind| Token {
            kind,
            position,
            layout_before,
        };

        let Some(ch) = self.peek_char() else {
            return Ok(token(TokenKind::Eof));
        };

        let kind = if ch.is_ascii_digit() {
            let digits = self.take_while(|c| c.is_ascii_digit());
            let value = digits
                .parse::<i64>()
                .map_err(|_| ParseError::new(format!("Integer out of range: {}", digits), position))?;
            TokenKind::Int(value)
        } else if ch.is_ascii_lowercase() {
            TokenKind::Name(self.take_while(is_alnum).to_string())
        } else if ch.is_ascii_uppercase() || ch == '_' {
            TokenKind::Var(self.take_while(is_alnum).to_string())
        } else if ch == '\'' {
            TokenKind::Quoted(self.quoted()?)
        } else if ch == '"' {
            return Err(ParseError::new("Double-quoted strings are not supported", position));
        } else if matches!(ch, '(' | ')' | '[' | ']' | '{' | '}' | ',' | '|') {
            self.bump();
            TokenKind::Punct(ch)
        } else if ch == '!' || ch == ';' {
            self.bump();
            TokenKind::Name(ch.to_string())
        } else if SYMBOL_CHARS.contains(ch) {
            let run = self.take_while(|c| SYMBOL_CHARS.contains(c));
            if run == "." && self.at_end_boundary() {
                TokenKind::End
            } else {
                TokenKind::Name(run.to_string())
            }
        } else {
            return Err(ParseError::new(format!("Unexpected character: '{}'", ch), position));
        };
        Ok(token(kind))
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(ch) = self.peek_char() {
            if !pred(ch) {
                break;
            }
            self.pos += ch.len_utf8();
        }
        &self.input[start..self.pos]
    }

    /// A `.` ends a clause when followed by layout, `%`, or end of input.
    fn at_end_boundary(&self) -> bool {
        match self.peek_char() {
            None => true,
            Some(ch) => ch.is_whitespace() || ch == '%',
        }
    }

    fn quoted(&mut self) -> Result<String, ParseError> {
        let open = self.pos;
        self.bump();
        let mut name = String::new();
        loop {
            match self.bump() {
                None => return Err(ParseError::new("Unterminated quoted atom", open)),
                Some('\'') => {
                    if self.peek_char() == Some('\'') {
                        self.bump();
                        name.push('\'');
                    } else {
                        return Ok(name);
                    }
                }
                Some('\\') => {
                    let escaped = match self.bump() {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('\\') => '\\',
                        Some('\'') => '\'',
                        Some('"') => '"',
                        Some(other) => {
                            return Err(ParseError::new(
                                format!("Unknown escape: \\{}", other),
                                self.pos - other.len_utf8() - 1,
                            ))
                        }
                        None => return Err(ParseError::new("Unterminated quoted atom", open)),
                    };
                    name.push(escaped);
                }
                Some(ch) => name.push(ch),
            }
        }
    }
}

fn is_alnum(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

// ========== PARSER ==========

/// Variable scope of one clause.
#[derive(Default)]
struct VarScope {
    by_name: HashMap<String, u32>,
    names: Vec<(String, u32)>,
    count: u32,
}

impl VarScope {
    fn lookup(&mut self, name: &str) -> u32 {
        if name == "_" {
            return self.fresh();
        }
        if let Some(&index) = self.by_name.get(name) {
            return index;
        }
        let index = self.fresh();
        self.by_name.insert(name.to_string(), index);
        self.names.push((name.to_string(), index));
        index
    }

    fn fresh(&mut self) -> u32 {
        let index = self.count;
        self.count += 1;
        index
    }
}

/// Streaming reader over clause text.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    symbols: &'a SymbolStore,
    terms: &'a TermStore,
    builtins: Builtins,
    peeked: Option<Token>,
    scope: VarScope,
}

impl<'a> Parser<'a> {
    /// Create a parser over `input` that interns into the given stores.
    pub fn new(input: &'a str, symbols: &'a SymbolStore, terms: &'a TermStore) -> Self {
        Self {
            lexer: Lexer::new(input),
            symbols,
            terms,
            builtins: Builtins::intern(symbols),
            peeked: None,
            scope: VarScope::default(),
        }
    }

    /// Read the next `.`-terminated term. `None` at end of input.
    pub fn next_clause(&mut self) -> Result<Option<ParsedTerm>, ParseError> {
        if self.peek()?.kind == TokenKind::Eof {
            return Ok(None);
        }
        self.scope = VarScope::default();
        let (term, _) = self.parse_expr(1200)?;
        let token = self.advance()?;
        match token.kind {
            TokenKind::End => Ok(Some(self.finish(term))),
            TokenKind::Eof => Err(ParseError::new("Missing '.' at end of clause", token.position)),
            other => Err(unexpected(&other, token.position)),
        }
    }

    fn finish(&mut self, term: TermId) -> ParsedTerm {
        let scope = std::mem::take(&mut self.scope);
        ParsedTerm {
            term,
            var_count: scope.count,
            var_names: scope.names,
        }
    }

    fn peek(&mut self) -> Result<&Token, ParseError> {
        let token = match self.peeked.take() {
            Some(token) => token,
            None => self.lexer.next_token()?,
        };
        Ok(self.peeked.insert(token))
    }

    fn advance(&mut self) -> Result<Token, ParseError> {
        match self.peeked.take() {
            Some(token) => Ok(token),
            None => self.lexer.next_token(),
        }
    }

    fn expect_punct(&mut self, punct: char) -> Result<(), ParseError> {
        let token = self.advance()?;
        if token.kind == TokenKind::Punct(punct) {
            Ok(())
        } else {
            Err(ParseError::new(
                format!("Expected '{}', found {}", punct, describe(&token.kind)),
                token.position,
            ))
        }
    }

    /// Parse a term whose priority is at most `max`. Returns the term and its
    /// priority.
    fn parse_expr(&mut self, max: u32) -> Result<(TermId, u32), ParseError> {
        let (mut left, mut left_prec) = self.parse_primary(max)?;
        loop {
            let name = match &self.peek()?.kind {
                TokenKind::Name(name) => name.clone(),
                TokenKind::Punct(',') => ",".to_string(),
                TokenKind::Punct('|') => "|".to_string(),
                _ => break,
            };
            let Some((prec, left_max, right_max)) = infix_op(&name) else {
                break;
            };
            if prec > max || left_prec > left_max {
                break;
            }
            self.advance()?;
            let (right, _) = self.parse_expr(right_max)?;
            let functor = if name == "|" { ";" } else { name.as_str() };
            left = self.terms.app2(self.symbols.intern(functor), left, right);
            left_prec = prec;
        }
        Ok((left, left_prec))
    }

    fn parse_primary(&mut self, max: u32) -> Result<(TermId, u32), ParseError> {
        let token = self.advance()?;
        match token.kind {
            TokenKind::Int(value) => Ok((self.terms.int(value), 0)),
            TokenKind::Var(name) => {
                let index = self.scope.lookup(&name);
                Ok((self.terms.var(index), 0))
            }
            TokenKind::Punct('(') => {
                let (inner, _) = self.parse_expr(1200)?;
                self.expect_punct(')')?;
                Ok((inner, 0))
            }
            TokenKind::Punct('[') => self.parse_list().map(|t| (t, 0)),
            TokenKind::Punct('{') => {
                if self.peek()?.kind == TokenKind::Punct('}') {
                    self.advance()?;
                    return Ok((self.terms.atom(self.builtins.curly), 0));
                }
                let (inner, _) = self.parse_expr(1200)?;
                self.expect_punct('}')?;
                Ok((self.terms.app1(self.builtins.curly, inner), 0))
            }
            TokenKind::Quoted(name) => self.parse_name(&name, false, max),
            TokenKind::Name(name) => self.parse_name(&name, true, max),
            other => Err(unexpected(&other, token.position)),
        }
    }

    /// A name: functional notation, negative literal, prefix operator, or atom.
    fn parse_name(
        &mut self,
        name: &str,
        operator: bool,
        max: u32,
    ) -> Result<(TermId, u32), ParseError> {
        let functor = self.symbols.intern(name);
        let next = self.peek()?.clone();

        if next.kind == TokenKind::Punct('(') && !next.layout_before {
            self.advance()?;
            let args = self.parse_args()?;
            return Ok((self.terms.app(functor, args), 0));
        }

        if !operator {
            return Ok((self.terms.atom(functor), 0));
        }

        if name == "-" && !next.layout_before {
            if let TokenKind::Int(value) = next.kind {
                self.advance()?;
                return Ok((self.terms.int(-value), 0));
            }
        }

        if let Some((prec, arg_max)) = prefix_op(name) {
            if !starts_operand(&next.kind) {
                return Ok((self.terms.atom(functor), 0));
            }
            if prec > max {
                return Err(ParseError::new(
                    format!("Operator priority clash: {} ({} > {})", name, prec, max),
                    next.position,
                ));
            }
            let (arg, _) = self.parse_expr(arg_max)?;
            return Ok((self.terms.app1(functor, arg), prec));
        }

        Ok((self.terms.atom(functor), 0))
    }

    /// Arguments after `name(`, through the closing `)`.
    fn parse_args(&mut self) -> Result<SmallVec<[TermId; 4]>, ParseError> {
        let mut args: SmallVec<[TermId; 4]> = SmallVec::new();
        loop {
            let (arg, _) = self.parse_expr(999)?;
            args.push(arg);
            let token = self.advance()?;
            match token.kind {
                TokenKind::Punct(',') => continue,
                TokenKind::Punct(')') => return Ok(args),
                other => {
                    return Err(ParseError::new(
                        format!("Expected ',' or ')' in arguments, found {}", describe(&other)),
                        token.position,
                    ))
                }
            }
        }
    }

    /// List contents after `[`, through the closing `]`.
    fn parse_list(&mut self) -> Result<TermId, ParseError> {
        if self.peek()?.kind == TokenKind::Punct(']') {
            self.advance()?;
            return Ok(self.terms.atom(self.builtins.nil));
        }
        let mut items: Vec<TermId> = Vec::new();
        loop {
            let (item, _) = self.parse_expr(999)?;
            items.push(item);
            let token = self.advance()?;
            match token.kind {
                TokenKind::Punct(',') => continue,
                TokenKind::Punct('|') => {
                    let (tail, _) = self.parse_expr(999)?;
                    self.expect_punct(']')?;
                    return Ok(self.terms.list(self.builtins.dot, &items, tail));
                }
                TokenKind::Punct(']') => {
                    let nil = self.terms.atom(self.builtins.nil);
                    return Ok(self.terms.list(self.builtins.dot, &items, nil));
                }
                other => {
                    return Err(ParseError::new(
                        format!("Expected ',', '|' or ']' in list, found {}", describe(&other)),
                        token.position,
                    ))
                }
            }
        }
    }
}

/// Whether a token can begin the operand of a prefix operator.
fn starts_operand(kind: &TokenKind) -> bool {
    match kind {
        TokenKind::Name(name) => infix_op(name).is_none() || prefix_op(name).is_some(),
        TokenKind::Punct(c) => matches!(c, '(' | '[' | '{'),
        TokenKind::Quoted(_) | TokenKind::Var(_) | TokenKind::Int(_) => true,
        TokenKind::End | TokenKind::Eof => false,
    }
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Name(name) | TokenKind::Quoted(name) => format!("'{}'", name),
        TokenKind::Var(name) => format!("variable {}", name),
        TokenKind::Int(value) => format!("integer {}", value),
        TokenKind::Punct(c) => format!("'{}'", c),
        TokenKind::End => "end of clause".to_string(),
        TokenKind::Eof => "end of input".to_string(),
    }
}

fn unexpected(kind: &TokenKind, position: usize) -> ParseError {
    ParseError::new(format!("Unexpected {}", describe(kind)), position)
}

// ========== ENTRY POINTS ==========

/// Read every clause in `input`.
pub fn parse_clauses(
    input: &str,
    symbols: &SymbolStore,
    terms: &TermStore,
) -> Result<Vec<ParsedTerm>, ParseError> {
    let mut parser = Parser::new(input, symbols, terms);
    let mut clauses = Vec::new();
    while let Some(clause) = parser.next_clause()? {
        clauses.push(clause);
    }
    Ok(clauses)
}

/// Read a single term. A trailing `.` is optional.
pub fn parse_term(
    input: &str,
    symbols: &SymbolStore,
    terms: &TermStore,
) -> Result<ParsedTerm, ParseError> {
    let mut parser = Parser::new(input, symbols, terms);
    let (term, _) = parser.parse_expr(1200)?;
    let token = parser.advance()?;
    match token.kind {
        TokenKind::End => {
            let rest = parser.advance()?;
            if rest.kind != TokenKind::Eof {
                return Err(ParseError::new(
                    "Unexpected characters after term",
                    rest.position,
                ));
            }
        }
        TokenKind::Eof => {}
        other => return Err(unexpected(&other, token.position)),
    }
    Ok(parser.finish(term))
}

/// Read a query. A leading `?-` and a trailing `.` are both optional.
pub fn parse_query(
    input: &str,
    symbols: &SymbolStore,
    terms: &TermStore,
) -> Result<ParsedTerm, ParseError> {
    let mut parsed = parse_term(input, symbols, terms)?;
    let query = symbols.intern("?-");
    if let Some(Term::App(f, args)) = terms.resolve(parsed.term) {
        if f == query && args.len() == 1 {
            parsed.term = args[0];
        }
    }
    Ok(parsed)
}

#[cfg(test)]
#[path = "tests/parser.rs"]
mod tests;
