use thiserror::Error;

use crate::ast::{Action, BinaryOperator, Expression, Identifier, Program, Routine, Statement};
use crate::token::{Token, TokenKind};

/// Structural errors report what the parser expected, what it actually
/// found, and the 1-based position of the offending token.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Expected {expected}, found {found} at line {line}, column {column}")]
pub struct SyntaxError {
    pub expected: String,
    pub found: String,
    pub line: usize,
    pub column: usize,
}

/// Recursive-descent parser over a lexed token stream.
///
/// Expressions are parsed by precedence climbing: `*` and `/` bind tighter
/// than `+` and `-`, which bind tighter than the comparisons, and every
/// operator is left-associative. Parsing stops at the first structural
/// error; there is no recovery.
struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    position: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: Vec<Token<'a>>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    fn parse_program(mut self) -> Result<Program, SyntaxError> {
        let mut routines = Vec::new();
        while !matches!(self.current_kind(), TokenKind::Eof) {
            routines.push(self.parse_routine()?);
        }
        Ok(Program { routines })
    }

    fn parse_routine(&mut self) -> Result<Routine, SyntaxError> {
        match self.current_kind() {
            TokenKind::Begin => {
                self.advance();
                self.expect(TokenKind::LBrace, "'{'")?;
                Ok(Routine::Begin(self.parse_action()?))
            }
            TokenKind::End => {
                self.advance();
                self.expect(TokenKind::LBrace, "'{'")?;
                Ok(Routine::End(self.parse_action()?))
            }
            TokenKind::LBrace => {
                self.advance();
                Ok(Routine::Conditional {
                    condition: None,
                    action: Some(self.parse_action()?),
                })
            }
            _ => {
                let condition = self.parse_expression(0)?;
                let action = if matches!(self.current_kind(), TokenKind::LBrace) {
                    self.advance();
                    Some(self.parse_action()?)
                } else {
                    None
                };
                Ok(Routine::Conditional {
                    condition: Some(condition),
                    action,
                })
            }
        }
    }

    /// Parses the statement list of an action whose `{` is already consumed.
    /// Empty statements between consecutive semicolons are legal no-ops.
    fn parse_action(&mut self) -> Result<Action, SyntaxError> {
        let mut statements = Vec::new();
        loop {
            while matches!(self.current_kind(), TokenKind::Semicolon) {
                self.advance();
            }
            if matches!(self.current_kind(), TokenKind::RBrace) {
                self.advance();
                break;
            }
            statements.push(self.parse_statement()?);
            match self.current_kind() {
                TokenKind::Semicolon => self.advance(),
                TokenKind::RBrace => {
                    self.advance();
                    break;
                }
                _ => return Err(self.error("';' or '}'")),
            }
        }
        Ok(Action { statements })
    }

    fn parse_statement(&mut self) -> Result<Statement, SyntaxError> {
        match self.current_kind() {
            TokenKind::Print => {
                self.advance();
                Ok(Statement::Print(self.parse_expression(0)?))
            }
            TokenKind::Identifier(_) => {
                let target = self.parse_identifier()?;
                match self.current_kind() {
                    TokenKind::Equal => {
                        self.advance();
                        let value = self.parse_expression(0)?;
                        Ok(Statement::Assign { target, value })
                    }
                    TokenKind::PlusEqual => self.parse_compound_assignment(target, BinaryOperator::Add),
                    TokenKind::MinusEqual => self.parse_compound_assignment(target, BinaryOperator::Sub),
                    _ => Err(self.error("'=', '+=' or '-='")),
                }
            }
            _ => Err(self.error("statement")),
        }
    }

    /// `x += e` is sugar for `x = x + e` (and `-=` for subtraction).
    fn parse_compound_assignment(
        &mut self,
        target: Identifier,
        op: BinaryOperator,
    ) -> Result<Statement, SyntaxError> {
        self.advance();
        let rhs = self.parse_expression(0)?;
        let value = Expression::BinOp {
            op,
            left: Box::new(Expression::Var(target.clone())),
            right: Box::new(rhs),
        };
        Ok(Statement::Assign { target, value })
    }

    fn parse_identifier(&mut self) -> Result<Identifier, SyntaxError> {
        let name = match self.current_kind() {
            TokenKind::Identifier(name) => name.to_string(),
            _ => return Err(self.error("identifier")),
        };
        self.advance();
        if matches!(self.current_kind(), TokenKind::LBracket) {
            self.advance();
            let index = self.parse_expression(0)?;
            self.expect(TokenKind::RBracket, "']'")?;
            return Ok(Identifier::Array(name, Box::new(index)));
        }
        Ok(Identifier::Scalar(name))
    }

    fn parse_expression(&mut self, min_precedence: u8) -> Result<Expression, SyntaxError> {
        let mut left = self.parse_operand()?;
        while let Some(op) = binary_operator(self.current_kind()) {
            let precedence = operator_precedence(op);
            if precedence < min_precedence {
                break;
            }
            self.advance();
            let right = self.parse_expression(precedence + 1)?;
            left = Expression::BinOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_operand(&mut self) -> Result<Expression, SyntaxError> {
        match self.current_kind() {
            TokenKind::Integer(value) => {
                self.advance();
                Ok(Expression::Literal(value))
            }
            TokenKind::Identifier(_) => Ok(Expression::Var(self.parse_identifier()?)),
            _ => Err(self.error("expression")),
        }
    }

    fn current_kind(&self) -> TokenKind<'a> {
        self.tokens[self.position].kind
    }

    fn advance(&mut self) {
        if self.position + 1 < self.tokens.len() {
            self.position += 1;
        }
    }

    fn expect(&mut self, kind: TokenKind<'a>, expected: &str) -> Result<(), SyntaxError> {
        if self.current_kind() == kind {
            self.advance();
            Ok(())
        } else {
            Err(self.error(expected))
        }
    }

    fn error(&self, expected: &str) -> SyntaxError {
        let token = &self.tokens[self.position];
        SyntaxError {
            expected: expected.to_string(),
            found: token.kind.describe(),
            line: token.span.line,
            column: token.span.column,
        }
    }
}

fn binary_operator(kind: TokenKind<'_>) -> Option<BinaryOperator> {
    match kind {
        TokenKind::Plus => Some(BinaryOperator::Add),
        TokenKind::Minus => Some(BinaryOperator::Sub),
        TokenKind::Star => Some(BinaryOperator::Mul),
        TokenKind::Slash => Some(BinaryOperator::Div),
        TokenKind::Greater => Some(BinaryOperator::Greater),
        TokenKind::GreaterEqual => Some(BinaryOperator::GreaterEqual),
        TokenKind::Less => Some(BinaryOperator::Less),
        TokenKind::LessEqual => Some(BinaryOperator::LessEqual),
        TokenKind::EqualEqual => Some(BinaryOperator::EqualEqual),
        _ => None,
    }
}

fn operator_precedence(op: BinaryOperator) -> u8 {
    match op {
        BinaryOperator::Mul | BinaryOperator::Div => 3,
        BinaryOperator::Add | BinaryOperator::Sub => 2,
        BinaryOperator::Greater
        | BinaryOperator::GreaterEqual
        | BinaryOperator::Less
        | BinaryOperator::LessEqual
        | BinaryOperator::EqualEqual => 1,
    }
}

pub fn parse_tokens(tokens: Vec<Token<'_>>) -> Result<Program, SyntaxError> {
    Parser::new(tokens).parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use indoc::indoc;

    fn parse(input: &str) -> Result<Program, SyntaxError> {
        parse_tokens(tokenize(input).expect("tokenize failed"))
    }

    fn scalar(name: &str) -> Identifier {
        Identifier::Scalar(name.to_string())
    }

    fn var(name: &str) -> Expression {
        Expression::Var(scalar(name))
    }

    fn binop(op: BinaryOperator, left: Expression, right: Expression) -> Expression {
        Expression::BinOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[test]
    fn parses_begin_conditional_and_end_routines() {
        let input = indoc! {"
            begin { x = 5; print x }
            x > 3 { print x * 2 }
            end { print x + 1 }
        "};
        let program = parse(input).expect("parse failed");

        let expected = Program {
            routines: vec![
                Routine::Begin(Action {
                    statements: vec![
                        Statement::Assign {
                            target: scalar("x"),
                            value: Expression::Literal(5),
                        },
                        Statement::Print(var("x")),
                    ],
                }),
                Routine::Conditional {
                    condition: Some(binop(
                        BinaryOperator::Greater,
                        var("x"),
                        Expression::Literal(3),
                    )),
                    action: Some(Action {
                        statements: vec![Statement::Print(binop(
                            BinaryOperator::Mul,
                            var("x"),
                            Expression::Literal(2),
                        ))],
                    }),
                },
                Routine::End(Action {
                    statements: vec![Statement::Print(binop(
                        BinaryOperator::Add,
                        var("x"),
                        Expression::Literal(1),
                    ))],
                }),
            ],
        };

        assert_eq!(program, expected);
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let program = parse("{ print 2 + 3 * 4 }").expect("parse failed");
        let expected = binop(
            BinaryOperator::Add,
            Expression::Literal(2),
            binop(
                BinaryOperator::Mul,
                Expression::Literal(3),
                Expression::Literal(4),
            ),
        );
        assert_eq!(
            program.routines,
            vec![Routine::Conditional {
                condition: None,
                action: Some(Action {
                    statements: vec![Statement::Print(expected)],
                }),
            }]
        );
    }

    #[test]
    fn subtraction_is_left_associative() {
        let program = parse("{ print 10 - 3 - 2 }").expect("parse failed");
        let expected = binop(
            BinaryOperator::Sub,
            binop(
                BinaryOperator::Sub,
                Expression::Literal(10),
                Expression::Literal(3),
            ),
            Expression::Literal(2),
        );
        assert_eq!(
            program.routines,
            vec![Routine::Conditional {
                condition: None,
                action: Some(Action {
                    statements: vec![Statement::Print(expected)],
                }),
            }]
        );
    }

    #[test]
    fn comparison_binds_looser_than_addition() {
        let program = parse("{ print 1 + 1 == 2 }").expect("parse failed");
        let expected = binop(
            BinaryOperator::EqualEqual,
            binop(
                BinaryOperator::Add,
                Expression::Literal(1),
                Expression::Literal(1),
            ),
            Expression::Literal(2),
        );
        assert_eq!(
            program.routines,
            vec![Routine::Conditional {
                condition: None,
                action: Some(Action {
                    statements: vec![Statement::Print(expected)],
                }),
            }]
        );
    }

    #[test]
    fn empty_statements_between_semicolons_are_no_ops() {
        let program = parse("begin { print 1;;print 2; }").expect("parse failed");
        assert_eq!(
            program.routines,
            vec![Routine::Begin(Action {
                statements: vec![
                    Statement::Print(Expression::Literal(1)),
                    Statement::Print(Expression::Literal(2)),
                ],
            })]
        );
    }

    #[test]
    fn parses_condition_only_routine() {
        let program = parse("x > 3").expect("parse failed");
        assert_eq!(
            program.routines,
            vec![Routine::Conditional {
                condition: Some(binop(
                    BinaryOperator::Greater,
                    var("x"),
                    Expression::Literal(3),
                )),
                action: None,
            }]
        );
    }

    #[test]
    fn parses_array_subscript_targets_and_reads() {
        let program = parse("{ tally[i + 1] = tally[0] }").expect("parse failed");
        let target = Identifier::Array(
            "tally".to_string(),
            Box::new(binop(BinaryOperator::Add, var("i"), Expression::Literal(1))),
        );
        let value = Expression::Var(Identifier::Array(
            "tally".to_string(),
            Box::new(Expression::Literal(0)),
        ));
        assert_eq!(
            program.routines,
            vec![Routine::Conditional {
                condition: None,
                action: Some(Action {
                    statements: vec![Statement::Assign { target, value }],
                }),
            }]
        );
    }

    #[test]
    fn desugars_compound_assignment() {
        let program = parse("{ total += 7 }").expect("parse failed");
        assert_eq!(
            program.routines,
            vec![Routine::Conditional {
                condition: None,
                action: Some(Action {
                    statements: vec![Statement::Assign {
                        target: scalar("total"),
                        value: binop(BinaryOperator::Add, var("total"), Expression::Literal(7)),
                    }],
                }),
            }]
        );
    }

    #[test]
    fn errors_when_begin_lacks_an_action() {
        let err = parse("begin print 1 }").expect_err("expected syntax error");
        assert_eq!(err.expected, "'{'");
        assert_eq!(err.found, "'print'");
        assert_eq!((err.line, err.column), (1, 7));
    }

    #[test]
    fn errors_on_unterminated_action() {
        let err = parse("begin { print 1").expect_err("expected syntax error");
        assert_eq!(err.expected, "';' or '}'");
        assert_eq!(err.found, "end of input");
    }

    #[test]
    fn errors_on_missing_assignment_operator() {
        let err = parse("{ x 1 }").expect_err("expected syntax error");
        assert_eq!(err.expected, "'=', '+=' or '-='");
        assert_eq!(err.found, "integer 1");
    }

    #[test]
    fn errors_on_statement_keyword_in_expression_position() {
        let err = parse("{ print print }").expect_err("expected syntax error");
        assert_eq!(err.expected, "expression");
        assert_eq!(err.found, "'print'");
    }
}
