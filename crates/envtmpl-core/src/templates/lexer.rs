//! Tokenizer for template source.
//!
//! Alternates between text mode, which scans for the left delimiter, and
//! action mode, which produces tokens until the matching right delimiter.
//! Trim markers (`{{- ` / ` -}}`) and comments (`{{/* ... */}}`) are resolved
//! here, so the parser only ever sees text and action tokens.
//!
//! Text mode works on raw bytes and copies them through untouched, whatever
//! their encoding. Only the inside of an action has to be UTF-8.

use crate::error::ParseError;

const TRIM_MARKER: u8 = b'-';
const COMMENT_OPEN: &[u8] = b"/*";
const COMMENT_CLOSE: &[u8] = b"*/";

/// Control keywords the engine rejects.
const UNSUPPORTED_KEYWORDS: &[&str] = &[
    "block", "break", "continue", "define", "range", "template",
];

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Text(Vec<u8>),
    LeftDelim,
    RightDelim,
    Ident(String),
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Nil,
    /// The bare `.`, the current `with` value.
    Dot,
    If,
    Else,
    End,
    With,
    LeftParen,
    RightParen,
    Pipe,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Item {
    pub token: Token,
    pub line: usize,
}

pub(crate) struct Lexer<'a> {
    name: &'a str,
    src: &'a [u8],
    left: &'a str,
    right: &'a str,
    pos: usize,
    line: usize,
    /// Set by ` -}}`: strip leading whitespace from the next text run.
    trim_next_text: bool,
    /// A run of valid UTF-8 starting at `window_start`, used in action mode.
    window: &'a str,
    window_start: usize,
    items: Vec<Item>,
}

impl<'a> Lexer<'a> {
    /// `left` and `right` must be non-empty.
    pub(crate) fn new(name: &'a str, src: &'a [u8], left: &'a str, right: &'a str) -> Self {
        Self {
            name,
            src,
            left,
            right,
            pos: 0,
            line: 1,
            trim_next_text: false,
            window: "",
            window_start: 0,
            items: Vec::new(),
        }
    }

    pub(crate) fn tokenize(mut self) -> Result<Vec<Item>, ParseError> {
        if self.left.is_empty() || self.right.is_empty() {
            return Err(self.error(1, "delimiters must not be empty"));
        }
        while self.pos < self.src.len() {
            self.lex_text();
            if self.pos < self.src.len() {
                self.lex_action()?;
            }
        }
        Ok(self.items)
    }

    fn push(&mut self, token: Token, line: usize) {
        self.items.push(Item { token, line });
    }

    fn error(&self, line: usize, message: impl Into<String>) -> ParseError {
        ParseError {
            name: self.name.to_owned(),
            line,
            message: message.into(),
        }
    }

    /// Advance over `len` bytes, keeping the line count in step.
    fn advance(&mut self, len: usize) {
        self.line += count_newlines(&self.src[self.pos..self.pos + len]);
        self.pos += len;
    }

    /// `{{- ` at byte offset `at` (just past the left delimiter).
    fn has_left_trim(&self, at: usize) -> bool {
        self.src.get(at) == Some(&TRIM_MARKER) && self.src.get(at + 1).is_some_and(|&b| is_space(b))
    }

    fn lex_text(&mut self) {
        let rest = &self.src[self.pos..];
        let found = find(rest, self.left.as_bytes());
        let end = found.unwrap_or(rest.len());
        let mut text = &rest[..end];
        let mut line = self.line;

        if std::mem::take(&mut self.trim_next_text) {
            let trimmed = trim_start(text);
            line += count_newlines(&text[..text.len() - trimmed.len()]);
            text = trimmed;
        }
        if found.is_some() && self.has_left_trim(self.pos + end + self.left.len()) {
            text = trim_end(text);
        }
        if !text.is_empty() {
            self.push(Token::Text(text.to_vec()), line);
        }
        self.advance(end);
    }

    /// Make sure `window` covers `pos`. Each byte is validated at most once.
    fn refresh_window(&mut self) {
        let window_end = self.window_start + self.window.len();
        if (self.window_start..window_end).contains(&self.pos) {
            return;
        }
        let bytes = &self.src[self.pos..];
        self.window = match std::str::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => std::str::from_utf8(&bytes[..e.valid_up_to()]).unwrap_or_default(),
        };
        self.window_start = self.pos;
    }

    /// Whether the window stops at an invalid byte rather than at the end.
    fn window_truncated(&self) -> bool {
        self.window_start + self.window.len() < self.src.len()
    }

    fn invalid_utf8(&self) -> ParseError {
        self.error(self.line, "invalid UTF-8 in action")
    }

    /// The UTF-8 text from `pos` to the end of the current window.
    fn rest(&self) -> &'a str {
        self.pos
            .checked_sub(self.window_start)
            .and_then(|at| self.window.get(at..))
            .unwrap_or_default()
    }

    fn lex_action(&mut self) -> Result<(), ParseError> {
        let start_line = self.line;
        self.advance(self.left.len());
        if self.has_left_trim(self.pos) {
            self.advance(1);
        }

        let rest = &self.src[self.pos..];
        let lead = rest.len() - trim_start(rest).len();
        if rest[lead..].starts_with(COMMENT_OPEN) {
            self.advance(lead);
            return self.lex_comment(start_line);
        }

        self.refresh_window();
        self.push(Token::LeftDelim, start_line);
        loop {
            let had_space = self.skip_space();
            let rest = self.rest();
            let Some(c) = rest.chars().next() else {
                if self.pos < self.src.len() {
                    return Err(self.invalid_utf8());
                }
                return Err(self.error(start_line, "unclosed action"));
            };

            if had_space && c == '-' && rest[1..].starts_with(self.right) {
                self.advance(1 + self.right.len());
                self.trim_next_text = true;
                self.push(Token::RightDelim, self.line);
                return Ok(());
            }
            if rest.starts_with(self.right) {
                self.advance(self.right.len());
                self.push(Token::RightDelim, self.line);
                return Ok(());
            }

            match c {
                '(' => self.lex_punct(Token::LeftParen),
                ')' => self.lex_punct(Token::RightParen),
                '|' => self.lex_punct(Token::Pipe),
                '"' => self.lex_quote()?,
                '`' => self.lex_raw_quote()?,
                '\'' => self.lex_char()?,
                _ if starts_number(rest) => self.lex_number()?,
                c if c.is_alphabetic() || c == '_' => self.lex_identifier()?,
                '.' if rest[1..].starts_with(|c: char| c.is_alphanumeric() || c == '_') => {
                    return Err(self.error(
                        self.line,
                        "field access is not supported: templates render without data",
                    ))
                }
                '.' => self.lex_punct(Token::Dot),
                '$' => return Err(self.error(self.line, "variables are not supported")),
                other => {
                    return Err(self.error(
                        self.line,
                        format!("unrecognized character in action: {other:?}"),
                    ))
                }
            }
        }
    }

    fn lex_comment(&mut self, start_line: usize) -> Result<(), ParseError> {
        let Some(end) = find(&self.src[self.pos..], COMMENT_CLOSE) else {
            return Err(self.error(start_line, "unclosed comment"));
        };
        self.advance(end + COMMENT_CLOSE.len());

        let right = self.right.as_bytes();
        let rest = &self.src[self.pos..];
        if rest.starts_with(right) {
            self.advance(right.len());
            return Ok(());
        }
        let lead = rest.len() - trim_start(rest).len();
        let after = &rest[lead..];
        if lead > 0 && after.first() == Some(&TRIM_MARKER) && after[1..].starts_with(right) {
            self.advance(lead + 1 + right.len());
            self.trim_next_text = true;
            return Ok(());
        }
        Err(self.error(self.line, "comment ends before closing delimiter"))
    }

    /// Returns whether any whitespace was skipped.
    fn skip_space(&mut self) -> bool {
        let rest = self.rest();
        let len = rest.len() - rest.trim_start_matches(is_space_char).len();
        self.advance(len);
        len > 0
    }

    fn lex_punct(&mut self, token: Token) {
        let line = self.line;
        self.advance(1);
        self.push(token, line);
    }

    /// Length of the quoted literal at `pos`, closing quote included.
    fn quoted_len(&self, quote: char, what: &str) -> Result<usize, ParseError> {
        let mut chars = self.rest().char_indices().skip(1);
        loop {
            match chars.next() {
                None if self.window_truncated() => return Err(self.invalid_utf8()),
                None | Some((_, '\n')) => {
                    return Err(self.error(self.line, format!("unterminated {what}")));
                }
                Some((_, '\\')) => {
                    chars.next();
                }
                Some((i, c)) if c == quote => return Ok(i + 1),
                Some(_) => {}
            }
        }
    }

    fn lex_quote(&mut self) -> Result<(), ParseError> {
        let line = self.line;
        let len = self.quoted_len('"', "quoted string")?;
        let value = unescape(&self.rest()[1..len - 1], '"').map_err(|msg| self.error(line, msg))?;
        self.advance(len);
        self.push(Token::String(value), line);
        Ok(())
    }

    /// A character constant such as `'a'` or `'\n'`, which is an integer.
    fn lex_char(&mut self) -> Result<(), ParseError> {
        let line = self.line;
        let len = self.quoted_len('\'', "character constant")?;
        let value = unescape(&self.rest()[1..len - 1], '\'').map_err(|msg| self.error(line, msg))?;
        let mut chars = value.chars();
        let (Some(c), None) = (chars.next(), chars.next()) else {
            return Err(self.error(line, format!("malformed character constant: {value:?}")));
        };
        self.advance(len);
        self.push(Token::Int(i64::from(u32::from(c))), line);
        Ok(())
    }

    fn lex_raw_quote(&mut self) -> Result<(), ParseError> {
        let line = self.line;
        let Some(len) = self.rest()[1..].find('`') else {
            if self.window_truncated() {
                return Err(self.invalid_utf8());
            }
            return Err(self.error(line, "unterminated raw quoted string"));
        };
        let value = self.rest()[1..1 + len].to_owned();
        self.advance(len + 2);
        self.push(Token::String(value), line);
        Ok(())
    }

    fn lex_number(&mut self) -> Result<(), ParseError> {
        let line = self.line;
        let rest = self.rest();
        let mut prev = '\0';
        let len = rest
            .char_indices()
            .take_while(|&(i, c)| {
                let ok = i == 0
                    || c.is_ascii_alphanumeric()
                    || c == '.'
                    || c == '_'
                    || (matches!(c, '+' | '-') && matches!(prev, 'e' | 'E' | 'p' | 'P'));
                prev = c;
                ok
            })
            .count();
        // Every accepted char is ASCII, so the count is also a byte length.
        let literal = &rest[..len];

        let Some(token) = parse_number(literal) else {
            return Err(self.error(line, format!("bad number syntax: {literal:?}")));
        };
        self.advance(len);
        self.push(token, line);
        Ok(())
    }

    fn lex_identifier(&mut self) -> Result<(), ParseError> {
        let line = self.line;
        let rest = self.rest();
        let len = rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        let word = &rest[..len];

        let token = match word {
            "true" => Token::Bool(true),
            "false" => Token::Bool(false),
            "nil" => Token::Nil,
            "if" => Token::If,
            "else" => Token::Else,
            "end" => Token::End,
            "with" => Token::With,
            kw if UNSUPPORTED_KEYWORDS.contains(&kw) => {
                return Err(self.error(line, format!("{kw:?} actions are not supported")));
            }
            ident => Token::Ident(ident.to_owned()),
        };
        self.advance(len);
        self.push(token, line);
        Ok(())
    }
}

/// Decode the backslash escapes of a quoted literal delimited by `quote`.
///
/// Byte escapes (`\x41`, `\101`) must stay within ASCII; use `\u` for
/// anything else.
fn unescape(body: &str, quote: char) -> Result<String, String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(escape) = chars.next() else {
            return Err("unterminated escape sequence".into());
        };
        let decoded = match escape {
            'a' => '\u{07}',
            'b' => '\u{08}',
            'f' => '\u{0C}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'v' => '\u{0B}',
            '\\' => '\\',
            c if c == quote => c,
            'x' => ascii_byte(take_digits(&mut chars, 2, 16)?)?,
            'u' => code_point(take_digits(&mut chars, 4, 16)?)?,
            'U' => code_point(take_digits(&mut chars, 8, 16)?)?,
            '0'..='7' => {
                let high = escape.to_digit(8).unwrap_or_default();
                ascii_byte(high * 64 + take_digits(&mut chars, 2, 8)?)?
            }
            other => return Err(format!("unknown escape sequence: \\{other}")),
        };
        out.push(decoded);
    }
    Ok(out)
}

fn take_digits(chars: &mut std::str::Chars<'_>, count: usize, radix: u32) -> Result<u32, String> {
    let mut value = 0;
    for _ in 0..count {
        let digit = chars
            .next()
            .and_then(|c| c.to_digit(radix))
            .ok_or_else(|| "invalid escape sequence".to_string())?;
        value = value * radix + digit;
    }
    Ok(value)
}

fn ascii_byte(value: u32) -> Result<char, String> {
    match u8::try_from(value) {
        Ok(byte) if byte.is_ascii() => Ok(char::from(byte)),
        _ => Err(format!(
            "byte escape {value:#x} is outside ASCII; use \\u{value:04x}"
        )),
    }
}

fn code_point(value: u32) -> Result<char, String> {
    char::from_u32(value).ok_or_else(|| format!("escape sequence is invalid Unicode: {value:#x}"))
}

/// Integers in decimal, `0x`, `0o`, `0b` or leading-zero octal, with `_`
/// separators; decimal floats.
fn parse_number(literal: &str) -> Option<Token> {
    let (negative, unsigned) = match literal.as_bytes().first() {
        Some(b'-') => (true, &literal[1..]),
        Some(b'+') => (false, &literal[1..]),
        _ => (false, literal),
    };
    if unsigned.starts_with('_') || unsigned.ends_with('_') || unsigned.contains("__") {
        return None;
    }
    let digits = unsigned.replace('_', "").to_ascii_lowercase();

    let radix_body = if let Some(body) = digits.strip_prefix("0x") {
        Some((16, body))
    } else if let Some(body) = digits.strip_prefix("0o") {
        Some((8, body))
    } else if let Some(body) = digits.strip_prefix("0b") {
        Some((2, body))
    } else if digits.len() > 1 && digits.starts_with('0') && digits.bytes().all(|b| b.is_ascii_digit()) {
        Some((8, &digits[1..]))
    } else {
        None
    };

    if let Some((radix, body)) = radix_body {
        if body.starts_with(['+', '-']) {
            return None;
        }
        let magnitude = i128::from_str_radix(body, radix).ok()?;
        let value = if negative { -magnitude } else { magnitude };
        return i64::try_from(value).ok().map(Token::Int);
    }

    let signed = if negative { format!("-{digits}") } else { digits };
    if let Ok(int) = signed.parse::<i64>() {
        Some(Token::Int(int))
    } else {
        signed.parse::<f64>().ok().map(Token::Float)
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}

fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

fn is_space_char(c: char) -> bool {
    u8::try_from(c).is_ok_and(is_space)
}

fn trim_start(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&b| !is_space(b)).unwrap_or(bytes.len());
    &bytes[start..]
}

fn trim_end(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().rposition(|&b| !is_space(b)).map_or(0, |i| i + 1);
    &bytes[..end]
}

fn count_newlines(bytes: &[u8]) -> usize {
    bytes.iter().filter(|&&b| b == b'\n').count()
}

fn starts_number(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some('+' | '-') => match chars.next() {
            Some(c) if c.is_ascii_digit() => true,
            Some('.') => chars.next().is_some_and(|c| c.is_ascii_digit()),
            _ => false,
        },
        Some('.') => chars.next().is_some_and(|c| c.is_ascii_digit()),
        _ => false,
    }
}
