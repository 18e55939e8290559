//! Lexer (tokenizer) for command-language source text
//!
//! Converts raw source text into a stream of typed tokens consumed directly by
//! the evaluator. There is no AST: a command is assembled word by word from
//! adjacent tokens, so the lexer is the whole parser.
//!
//! The scanner is byte oriented. All syntactically significant bytes are
//! ASCII, so multi-byte UTF-8 content passes through tokens untouched.

use std::fmt;

/// All token kinds produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Literal text that needs escape decoding before use.
    Esc,
    /// Literal text used verbatim; brace groups land here.
    Str,
    /// The inside of a `[ ... ]` command substitution.
    Cmd,
    /// A `$name` variable reference; the slice excludes the `$`.
    Var,
    /// A run of inline whitespace separating words.
    Sep,
    /// A run of newlines and/or semicolons terminating a command.
    Eol,
    /// End of input.
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Esc => write!(f, "escaped string"),
            TokenKind::Str => write!(f, "string"),
            TokenKind::Cmd => write!(f, "command substitution"),
            TokenKind::Var => write!(f, "variable reference"),
            TokenKind::Sep => write!(f, "separator"),
            TokenKind::Eol => write!(f, "end of command"),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}

/// Source tokenizer state. One instance lives for one evaluation.
pub struct Lexer<'a> {
    src: &'a [u8],
    pos: usize,
    /// Token slice bounds, `[start, end)` into `src`.
    start: usize,
    end: usize,
    /// Kind of the most recently produced token. Starts as [`TokenKind::Eol`]
    /// so that a `#` on the first line is a comment.
    kind: TokenKind,
    inside_quote: bool,
    line: usize,
}

impl<'a> Lexer<'a> {
    /// Create a lexer over `src`. Line numbering starts at 1.
    pub fn new(src: &'a str) -> Self {
        Lexer {
            src: src.as_bytes(),
            pos: 0,
            start: 0,
            end: 0,
            kind: TokenKind::Eol,
            inside_quote: false,
            line: 1,
        }
    }

    /// The slice of the last token produced by [`Lexer::next_token`].
    ///
    /// Token boundaries always fall on ASCII bytes, so for valid UTF-8 input
    /// the slice is itself valid UTF-8.
    pub fn token(&self) -> &'a [u8] {
        &self.src[self.start..self.end]
    }

    /// Current line number (1-based, advanced by every `\n` consumed).
    pub fn line(&self) -> usize {
        self.line
    }

    /// Scan the next token, returning its kind. The token text is available
    /// through [`Lexer::token`] until the next call.
    pub fn next_token(&mut self) -> TokenKind {
        while let Some(b) = self.peek() {
            match b {
                b' ' | b'\t' | b'\r' => {
                    if self.inside_quote {
                        return self.scan_string();
                    }
                    return self.scan_separator();
                }
                b'\n' | b';' => {
                    if self.inside_quote {
                        return self.scan_string();
                    }
                    return self.scan_eol();
                }
                b'[' => return self.scan_command(),
                b'$' => return self.scan_variable(),
                b'#' if self.kind == TokenKind::Eol => {
                    self.skip_comment();
                    continue;
                }
                _ => return self.scan_string(),
            }
        }
        // One trailing EOL is emitted so the evaluator dispatches the final
        // command even without a newline at end of input.
        if self.kind != TokenKind::Eol && self.kind != TokenKind::Eof {
            self.start = self.pos;
            self.end = self.pos;
            self.kind = TokenKind::Eol;
        } else {
            self.kind = TokenKind::Eof;
        }
        self.kind
    }

    /// Run of space/tab/CR between words.
    fn scan_separator(&mut self) -> TokenKind {
        self.start = self.pos;
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r')) {
            self.advance();
        }
        self.finish(TokenKind::Sep)
    }

    /// Run of whitespace and semicolons terminating a command.
    fn scan_eol(&mut self) -> TokenKind {
        self.start = self.pos;
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n' | b';')) {
            self.advance();
        }
        self.finish(TokenKind::Eol)
    }

    /// The inside of `[ ... ]`. Brackets nest; brace groups inside the
    /// brackets shield their contents from bracket counting; a backslash
    /// shields the following byte.
    fn scan_command(&mut self) -> TokenKind {
        self.advance(); // opening [
        self.start = self.pos;
        let mut level = 1;
        let mut blevel = 0;
        while let Some(b) = self.peek() {
            if b == b'\\' {
                self.advance();
                self.advance();
                continue;
            }
            if blevel > 0 {
                match b {
                    b'{' => blevel += 1,
                    b'}' => blevel -= 1,
                    _ => {}
                }
            } else {
                match b {
                    b'{' => blevel += 1,
                    b'[' => level += 1,
                    b']' => {
                        level -= 1;
                        if level == 0 {
                            break;
                        }
                    }
                    _ => {}
                }
            }
            self.advance();
        }
        self.end = self.pos;
        self.kind = TokenKind::Cmd;
        if self.peek() == Some(b']') {
            self.advance();
        }
        self.kind
    }

    /// `$` followed by an identifier. A lone `$` degrades to a one-byte
    /// string token.
    fn scan_variable(&mut self) -> TokenKind {
        self.advance(); // the $
        self.start = self.pos;
        while matches!(self.peek(), Some(b) if b.is_ascii_alphanumeric() || b == b'_') {
            self.advance();
        }
        if self.start == self.pos {
            self.start = self.pos - 1;
            self.end = self.pos;
            self.kind = TokenKind::Str;
        } else {
            self.end = self.pos;
            self.kind = TokenKind::Var;
        }
        self.kind
    }

    /// `{ ... }` with nesting; backslash shields the next byte. The contents
    /// are taken verbatim (no escape decoding), hence kind `Str`.
    fn scan_brace_group(&mut self) -> TokenKind {
        self.advance(); // opening {
        self.start = self.pos;
        let mut level = 1;
        while let Some(b) = self.peek() {
            match b {
                b'\\' => {
                    self.advance();
                    self.advance();
                    continue;
                }
                b'{' => level += 1,
                b'}' => {
                    level -= 1;
                    if level == 0 {
                        self.end = self.pos;
                        self.kind = TokenKind::Str;
                        self.advance(); // closing }
                        return self.kind;
                    }
                }
                _ => {}
            }
            self.advance();
        }
        // An unterminated group runs to end of input.
        self.finish(TokenKind::Str)
    }

    /// Bare words and the pieces of quoted strings. Stops at `$` and `[` so
    /// the evaluator can substitute, at word/command boundaries outside
    /// quotes, and at the closing `"` inside quotes.
    fn scan_string(&mut self) -> TokenKind {
        let new_word = matches!(self.kind, TokenKind::Sep | TokenKind::Eol | TokenKind::Str);
        if new_word && self.peek() == Some(b'{') {
            return self.scan_brace_group();
        }
        if new_word && self.peek() == Some(b'"') {
            self.inside_quote = true;
            self.advance();
        }
        self.start = self.pos;
        while let Some(b) = self.peek() {
            match b {
                b'\\' => {
                    self.advance();
                    self.advance();
                    continue;
                }
                b'$' | b'[' => return self.finish(TokenKind::Esc),
                b' ' | b'\t' | b'\r' | b'\n' | b';' => {
                    if !self.inside_quote {
                        return self.finish(TokenKind::Esc);
                    }
                }
                b'"' => {
                    if self.inside_quote {
                        self.end = self.pos;
                        self.kind = TokenKind::Esc;
                        self.advance(); // closing "
                        self.inside_quote = false;
                        return self.kind;
                    }
                }
                _ => {}
            }
            self.advance();
        }
        self.finish(TokenKind::Esc)
    }

    /// `#` after an end-of-line: skip to the next newline (not consumed).
    fn skip_comment(&mut self) {
        while matches!(self.peek(), Some(b) if b != b'\n') {
            self.advance();
        }
    }

    fn finish(&mut self, kind: TokenKind) -> TokenKind {
        self.end = self.pos;
        self.kind = kind;
        kind
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn advance(&mut self) {
        if let Some(&b) = self.src.get(self.pos) {
            if b == b'\n' {
                self.line += 1;
            }
            self.pos += 1;
        }
    }
}
