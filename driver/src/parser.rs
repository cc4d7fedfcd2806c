//! # The parser
//!
//! A recursive-descent parser for the line-based concrete syntax.  Statements
//! are dispatched on their leading keyword; everything else is an expression
//! statement.  Within expressions, `:` binds loosest, the arrows `->` and
//! `=>` bind right-associatively, and application binds tightest and
//! left-associatively, so `f a b -> c` reads as `((f a) b) -> c`.
//!
//! A parenthesized binder, `(x : T)`, is only meaningful when followed by an
//! arrow, and is indistinguishable from a parenthesized expression until the
//! colon is seen.  The parser resolves this by speculation: it attempts to
//! parse a binder, commits if an arrow follows, and otherwise rewinds and
//! re-parses the same tokens as an expression.
//!
//! # Authors
//!
//! The Cumulus Development Team.
//!
//! # Copyright
//!
//! Copyright (c) The Cumulus Development Team, 2021.  All rights reserved (r).
//! Please see the `LICENSE.markdown` file in the *Cumulus* root directory for
//! licensing information.

use crate::{
    error::ParsingError,
    lexer::{tokenize, Token},
    syntax::{ParseStatement, ParseTerm},
};

////////////////////////////////////////////////////////////////////////////////
// The parser, proper.
////////////////////////////////////////////////////////////////////////////////

/// A cursor over the token vector of a single input line.
struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

/// Parses one line of input into a statement.
///
/// # Errors
///
/// Returns `Err(ParsingError)` on any lexical or syntactic failure,
/// including trailing tokens after a complete statement.
pub fn parse_statement(line: &str) -> Result<ParseStatement, ParsingError> {
    let tokens = tokenize(line)?;
    let mut parser = Parser {
        tokens,
        position: 0,
    };

    let statement = parser.statement()?;
    parser.finish()?;

    Ok(statement)
}

impl Parser {
    /// Returns the token at the cursor without consuming it.
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    /// Consumes and returns the token at the cursor.
    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();

        if token.is_some() {
            self.position += 1;
        }

        token
    }

    /// Consumes the token at the cursor, requiring it to equal `expected`.
    fn expect(&mut self, expected: Token) -> Result<(), ParsingError> {
        match self.next() {
            Some(token) if token == expected => Ok(()),
            Some(token) => Err(ParsingError::at(&token.render())),
            None => Err(ParsingError::at_end()),
        }
    }

    /// Consumes the token at the cursor, requiring it to be a name.
    fn expect_name(&mut self) -> Result<String, ParsingError> {
        match self.next() {
            Some(Token::Name(name)) => Ok(name),
            Some(token) => Err(ParsingError::at(&token.render())),
            None => Err(ParsingError::at_end()),
        }
    }

    /// Requires the cursor to have consumed the whole line.
    fn finish(&mut self) -> Result<(), ParsingError> {
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(ParsingError::at(&token.render())),
        }
    }

    /// Parses a statement.
    fn statement(&mut self) -> Result<ParseStatement, ParsingError> {
        match self.peek() {
            None => Ok(ParseStatement::Empty),
            Some(Token::Parameter) => {
                self.next();
                let (name, tau) = self.binder()?;

                Ok(ParseStatement::Parameter { name, tau })
            }
            Some(Token::Definition) => {
                self.next();
                self.definition()
            }
            Some(Token::Check) => {
                self.next();
                Ok(ParseStatement::Check(self.expression()?))
            }
            Some(Token::Evaluate) => {
                self.next();
                Ok(ParseStatement::Evaluate(self.expression()?))
            }
            Some(Token::Context) => {
                self.next();
                Ok(ParseStatement::Context)
            }
            Some(Token::Quit) => {
                self.next();
                Ok(ParseStatement::Quit)
            }
            Some(Token::Silently) => {
                self.next();
                let inner = self.statement()?;

                Ok(ParseStatement::Silently(Box::new(inner)))
            }
            Some(_expression) => {
                Ok(ParseStatement::Expression(self.expression()?))
            }
        }
    }

    /// Parses the tail of a `definition` statement: either `id := e` or a
    /// binder form `id : T := e` (optionally parenthesized).
    fn definition(&mut self) -> Result<ParseStatement, ParsingError> {
        let saved = self.position;

        if let Ok(name) = self.expect_name() {
            if self.peek() == Some(&Token::ColonEqual) {
                self.next();
                let body = self.expression()?;

                return Ok(ParseStatement::Definition { name, body });
            }
        }

        self.position = saved;
        let (name, tau) = self.binder()?;
        self.expect(Token::ColonEqual)?;
        let body = self.expression()?;

        Ok(ParseStatement::TypedDefinition { name, tau, body })
    }

    /// Parses a binder: `name : expression`, possibly wrapped in
    /// parentheses.  The type annotation extends as far right as possible, so
    /// in a binder position `x : A -> B` annotates `x` with the whole of
    /// `A -> B`.
    fn binder(&mut self) -> Result<(String, ParseTerm), ParsingError> {
        if self.peek() == Some(&Token::LParen) {
            self.next();
            let binder = self.binder()?;
            self.expect(Token::RParen)?;

            return Ok(binder);
        }

        let name = self.expect_name()?;
        self.expect(Token::Colon)?;
        let tau = self.expression()?;

        Ok((name, tau))
    }

    /// Parses an expression.
    fn expression(&mut self) -> Result<ParseTerm, ParsingError> {
        let saved = self.position;

        // Speculatively parse a binder; commit only if an arrow follows.
        if let Ok((name, tau)) = self.binder() {
            match self.peek() {
                Some(&Token::Arrow) => {
                    self.next();
                    let body = self.expression()?;

                    return Ok(ParseTerm::Product {
                        name,
                        tau: Box::new(tau),
                        body: Box::new(body),
                    });
                }
                Some(&Token::DArrow) => {
                    self.next();
                    let body = self.expression()?;

                    return Ok(ParseTerm::Lambda {
                        name,
                        tau: Box::new(tau),
                        body: Box::new(body),
                    });
                }
                _otherwise => {}
            }
        }

        self.position = saved;
        let left = self.application()?;

        if self.peek() == Some(&Token::Arrow) {
            self.next();
            let body = self.expression()?;

            Ok(ParseTerm::Product {
                name: String::new(),
                tau: Box::new(left),
                body: Box::new(body),
            })
        } else {
            Ok(left)
        }
    }

    /// Parses a left-associative chain of applications.
    fn application(&mut self) -> Result<ParseTerm, ParsingError> {
        let mut left = self.simple()?;

        while let Some(token) = self.peek() {
            match token {
                Token::Name(_) | Token::Type | Token::LParen => {
                    let right = self.simple()?;

                    left = ParseTerm::Application {
                        left: Box::new(left),
                        right: Box::new(right),
                    };
                }
                _otherwise => break,
            }
        }

        Ok(left)
    }

    /// Parses a simple expression: a universe literal, a name, or a
    /// parenthesized expression.
    fn simple(&mut self) -> Result<ParseTerm, ParsingError> {
        match self.next() {
            Some(Token::Type) => {
                self.expect(Token::LBracket)?;
                let level = match self.next() {
                    Some(Token::Numeral(level)) => level,
                    Some(token) => {
                        return Err(ParsingError::at(&token.render()))
                    }
                    None => return Err(ParsingError::at_end()),
                };
                self.expect(Token::RBracket)?;

                Ok(ParseTerm::Universe(level))
            }
            Some(Token::Name(name)) => Ok(ParseTerm::Name(name)),
            Some(Token::LParen) => {
                let expression = self.expression()?;
                self.expect(Token::RParen)?;

                Ok(expression)
            }
            Some(token) => Err(ParsingError::at(&token.render())),
            None => Err(ParsingError::at_end()),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests.
////////////////////////////////////////////////////////////////////////////////
