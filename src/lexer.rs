use std::{iter::Peekable, str::CharIndices};

use crate::token::{Span, Token, TokenKind};

mod error;

pub use error::LexError;

/// Converts raw source text into a token stream.
///
/// The lexer is a forward-only cursor over the input and never backtracks.
/// Whitespace separates tokens and carries no meaning of its own.
pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
            line: 1,
            column: 1,
        }
    }

    pub fn next_token(&mut self) -> Result<Token<'a>, LexError> {
        self.skip_whitespace();

        let (start_idx, ch) = match self.chars.peek() {
            Some(&(idx, c)) => (idx, c),
            None => {
                let index = self.input.len();
                return Ok(Token::new(
                    TokenKind::Eof,
                    Span {
                        start: index,
                        end: index,
                        line: self.line,
                        column: self.column,
                    },
                ));
            }
        };

        let start_line = self.line;
        let start_column = self.column;

        match ch {
            '{' => Ok(self.single(TokenKind::LBrace, start_idx, start_line, start_column)),
            '}' => Ok(self.single(TokenKind::RBrace, start_idx, start_line, start_column)),
            '[' => Ok(self.single(TokenKind::LBracket, start_idx, start_line, start_column)),
            ']' => Ok(self.single(TokenKind::RBracket, start_idx, start_line, start_column)),
            ';' => Ok(self.single(TokenKind::Semicolon, start_idx, start_line, start_column)),
            '*' => Ok(self.single(TokenKind::Star, start_idx, start_line, start_column)),
            '/' => Ok(self.single(TokenKind::Slash, start_idx, start_line, start_column)),
            '=' => Ok(self.with_optional_equal(
                TokenKind::Equal,
                TokenKind::EqualEqual,
                start_idx,
                start_line,
                start_column,
            )),
            '+' => Ok(self.with_optional_equal(
                TokenKind::Plus,
                TokenKind::PlusEqual,
                start_idx,
                start_line,
                start_column,
            )),
            '-' => Ok(self.with_optional_equal(
                TokenKind::Minus,
                TokenKind::MinusEqual,
                start_idx,
                start_line,
                start_column,
            )),
            '>' => Ok(self.with_optional_equal(
                TokenKind::Greater,
                TokenKind::GreaterEqual,
                start_idx,
                start_line,
                start_column,
            )),
            '<' => Ok(self.with_optional_equal(
                TokenKind::Less,
                TokenKind::LessEqual,
                start_idx,
                start_line,
                start_column,
            )),
            c if c.is_alphabetic() => {
                Ok(self.read_identifier(start_idx, start_line, start_column))
            }
            c if c.is_ascii_digit() => self.read_integer(start_idx, start_line, start_column),
            _ => Err(LexError::UnexpectedCharacter {
                character: ch,
                line: start_line,
                column: start_column,
            }),
        }
    }

    fn single(&mut self, kind: TokenKind<'a>, start: usize, line: usize, column: usize) -> Token<'a> {
        self.advance_char();
        Token::new(
            kind,
            Span {
                start,
                end: start + 1,
                line,
                column,
            },
        )
    }

    fn with_optional_equal(
        &mut self,
        plain: TokenKind<'a>,
        with_equal: TokenKind<'a>,
        start: usize,
        line: usize,
        column: usize,
    ) -> Token<'a> {
        self.advance_char();
        if let Some(&(_, '=')) = self.chars.peek() {
            self.advance_char();
            return Token::new(
                with_equal,
                Span {
                    start,
                    end: start + 2,
                    line,
                    column,
                },
            );
        }
        Token::new(
            plain,
            Span {
                start,
                end: start + 1,
                line,
                column,
            },
        )
    }

    fn skip_whitespace(&mut self) {
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_whitespace() {
                self.advance_char();
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self, start: usize, line: usize, column: usize) -> Token<'a> {
        self.advance_char(); // Consume first letter
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_alphanumeric() {
                self.advance_char();
            } else {
                break;
            }
        }

        let end_idx = self.current_index();
        let ident = &self.input[start..end_idx];
        let kind = match ident {
            "begin" => TokenKind::Begin,
            "end" => TokenKind::End,
            "print" => TokenKind::Print,
            _ => TokenKind::Identifier(ident),
        };
        Token::new(
            kind,
            Span {
                start,
                end: end_idx,
                line,
                column,
            },
        )
    }

    fn read_integer(
        &mut self,
        start: usize,
        line: usize,
        column: usize,
    ) -> Result<Token<'a>, LexError> {
        self.advance_char(); // Consume first digit
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_ascii_digit() {
                self.advance_char();
            } else {
                break;
            }
        }

        let end_idx = self.current_index();
        let num_str = &self.input[start..end_idx];
        let num = num_str
            .parse::<i64>()
            .map_err(|_| LexError::InvalidIntegerLiteral {
                literal: num_str.to_string(),
                line,
                column,
            })?;
        Ok(Token::new(
            TokenKind::Integer(num),
            Span {
                start,
                end: end_idx,
                line,
                column,
            },
        ))
    }

    fn advance_char(&mut self) -> Option<(usize, char)> {
        let next = self.chars.next();
        if let Some((_, c)) = next {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        next
    }

    fn current_index(&mut self) -> usize {
        self.chars
            .peek()
            .map(|(idx, _)| *idx)
            .unwrap_or(self.input.len())
    }
}

pub fn tokenize(input: &str) -> Result<Vec<Token<'_>>, LexError> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let is_eof = matches!(token.kind, TokenKind::Eof);
        tokens.push(token);
        if is_eof {
            break;
        }
    }
    Ok(tokens)
}
