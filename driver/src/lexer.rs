//! # The lexer
//!
//! Splits a line of concrete syntax into tokens.  The token set is small:
//! identifiers (some of which are keywords), numerals, and a handful of
//! punctuation marks.  A `#` starts a comment running to the end of the line,
//! which the lexer discards.
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

use crate::error::ParsingError;

////////////////////////////////////////////////////////////////////////////////
// Tokens.
////////////////////////////////////////////////////////////////////////////////

/// The tokens of the concrete syntax.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Token {
    /// An identifier that is not a keyword.
    Name(String),
    /// An unsigned numeral, as appears in a universe literal.
    Numeral(usize),
    /// The `type` keyword.
    Type,
    /// The `parameter` keyword.
    Parameter,
    /// The `definition` keyword.
    Definition,
    /// The `check` keyword.
    Check,
    /// The `evaluate` keyword.
    Evaluate,
    /// The `context` keyword.
    Context,
    /// The `quit` keyword.
    Quit,
    /// The `silently` keyword.
    Silently,
    /// A left parenthesis.
    LParen,
    /// A right parenthesis.
    RParen,
    /// A colon, as appears in a binder.
    Colon,
    /// The `:=` sign of a definition.
    ColonEqual,
    /// The `->` arrow of a product.
    Arrow,
    /// The `=>` arrow of a lambda-abstraction.
    DArrow,
    /// A left bracket, as appears in a universe literal.
    LBracket,
    /// A right bracket, as appears in a universe literal.
    RBracket,
}

impl Token {
    /// Renders the token the way it appears in the concrete syntax, for
    /// diagnostics.
    pub fn render(&self) -> String {
        match self {
            Token::Name(name) => name.clone(),
            Token::Numeral(numeral) => numeral.to_string(),
            Token::Type => String::from("type"),
            Token::Parameter => String::from("parameter"),
            Token::Definition => String::from("definition"),
            Token::Check => String::from("check"),
            Token::Evaluate => String::from("evaluate"),
            Token::Context => String::from("context"),
            Token::Quit => String::from("quit"),
            Token::Silently => String::from("silently"),
            Token::LParen => String::from("("),
            Token::RParen => String::from(")"),
            Token::Colon => String::from(":"),
            Token::ColonEqual => String::from(":="),
            Token::Arrow => String::from("->"),
            Token::DArrow => String::from("=>"),
            Token::LBracket => String::from("["),
            Token::RBracket => String::from("]"),
        }
    }
}

/// Classifies an identifier as a keyword token, or as a plain name.
fn classify(identifier: String) -> Token {
    match identifier.as_str() {
        "type" => Token::Type,
        "parameter" => Token::Parameter,
        "definition" => Token::Definition,
        "check" => Token::Check,
        "evaluate" => Token::Evaluate,
        "context" => Token::Context,
        "quit" => Token::Quit,
        "silently" => Token::Silently,
        _name => Token::Name(identifier),
    }
}

////////////////////////////////////////////////////////////////////////////////
// The lexer, proper.
////////////////////////////////////////////////////////////////////////////////

/// Tokenizes a line of input.  Comments and whitespace are discarded, so a
/// blank or comment-only line produces an empty token vector.
///
/// # Errors
///
/// Returns `Err(ParsingError)` on any character that cannot start a token,
/// including a `-` or `=` that is not followed by `>`.
pub fn tokenize(line: &str) -> Result<Vec<Token>, ParsingError> {
    let mut tokens = Vec::new();
    let mut characters = line.chars().peekable();

    while let Some(character) = characters.next() {
        match character {
            '#' => break,
            character if character.is_whitespace() => continue,
            '(' => tokens.push(Token::LParen),
            ')' => tokens.push(Token::RParen),
            '[' => tokens.push(Token::LBracket),
            ']' => tokens.push(Token::RBracket),
            ':' => {
                if characters.peek() == Some(&'=') {
                    characters.next();
                    tokens.push(Token::ColonEqual);
                } else {
                    tokens.push(Token::Colon);
                }
            }
            '-' => {
                if characters.next() == Some('>') {
                    tokens.push(Token::Arrow);
                } else {
                    return Err(ParsingError::at("-"));
                }
            }
            '=' => {
                if characters.next() == Some('>') {
                    tokens.push(Token::DArrow);
                } else {
                    return Err(ParsingError::at("="));
                }
            }
            character if character.is_ascii_alphabetic() => {
                let mut identifier = String::new();
                identifier.push(character);

                while let Some(next) = characters.peek() {
                    if next.is_ascii_alphanumeric() {
                        identifier.push(*next);
                        characters.next();
                    } else {
                        break;
                    }
                }

                tokens.push(classify(identifier));
            }
            character if character.is_ascii_digit() => {
                let mut numeral = String::new();
                numeral.push(character);

                while let Some(next) = characters.peek() {
                    if next.is_ascii_digit() {
                        numeral.push(*next);
                        characters.next();
                    } else {
                        break;
                    }
                }

                match numeral.parse::<usize>() {
                    Ok(numeral) => tokens.push(Token::Numeral(numeral)),
                    Err(_overflow) => {
                        return Err(ParsingError::at(&numeral))
                    }
                }
            }
            unexpected => {
                return Err(ParsingError::at(&unexpected.to_string()))
            }
        }
    }

    Ok(tokens)
}

////////////////////////////////////////////////////////////////////////////////
// Tests.
////////////////////////////////////////////////////////////////////////////////

/// Tests for the lexer.
#[cfg(test)]
mod test {
    use crate::lexer::{tokenize, Token};

    /// Tests tokenization of a parameter statement with a universe literal.
    #[test]
    pub fn lexer_test0() {
        let tokens = tokenize("parameter N : type[0]").unwrap();

        assert_eq!(
            tokens,
            vec![
                Token::Parameter,
                Token::Name(String::from("N")),
                Token::Colon,
                Token::Type,
                Token::LBracket,
                Token::Numeral(0),
                Token::RBracket,
            ]
        );
    }

    /// Tests that `:=`, `->`, and `=>` are single tokens.
    #[test]
    pub fn lexer_test1() {
        let tokens = tokenize(":= -> => :").unwrap();

        assert_eq!(
            tokens,
            vec![
                Token::ColonEqual,
                Token::Arrow,
                Token::DArrow,
                Token::Colon,
            ]
        );
    }

    /// Tests that comments and blank lines tokenize to nothing.
    #[test]
    pub fn lexer_test2() {
        assert_eq!(tokenize("# a comment").unwrap(), Vec::new());
        assert_eq!(tokenize("   ").unwrap(), Vec::new());
        assert_eq!(
            tokenize("quit # trailing comment").unwrap(),
            vec![Token::Quit]
        );
    }

    /// Tests that a stray `=` is a lexical error.
    #[test]
    pub fn lexer_test3() {
        assert!(tokenize("x = y").is_err());
    }
}
