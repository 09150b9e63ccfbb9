//! Infix to postfix conversion.
//!
//! A shunting-yard pass over the token stream. Operands go straight to the
//! output; operators wait on a stack until something with lower precedence
//! arrives. Parentheses never compete on precedence: only an operator can pop an
//! operator.
//!
//! ```text
//! [a, AND, (, b, OR, c, )]  =>  [a, b, c, OR, AND]
//! ```

use tracing::debug;

use crate::{
    error::QueryError,
    token::{Operator, Token, stringify},
};

/// An entry on the shunting-yard stack.
#[derive(Clone, Copy)]
enum Pending {
    /// A connective waiting for its right operand.
    Operator(Operator),
    /// An open parenthesis.
    Open,
}

/// Converts an infix token stream to postfix order.
///
/// The returned tokens borrow from `tokens`; the input is never modified.
/// Fails with a syntax error if the parentheses are unbalanced.
pub fn to_postfix(tokens: &[Token]) -> Result<Vec<&Token>, QueryError> {
    debug!(tokens = %stringify(tokens), "infix tokens");

    let mut output: Vec<&Token> = Vec::with_capacity(tokens.len());
    let mut stack: Vec<(Pending, &Token)> = Vec::new();

    for token in tokens {
        match token {
            Token::Operand(_) => output.push(token),
            Token::Operator(incoming) => {
                while let Some((Pending::Operator(top), top_token)) = stack.last().copied() {
                    if top.connective.precedence() < incoming.connective.precedence() {
                        break;
                    }
                    output.push(top_token);
                    stack.pop();
                }
                stack.push((Pending::Operator(*incoming), token));
            }
            Token::Open => stack.push((Pending::Open, token)),
            Token::Close => loop {
                match stack.pop() {
                    Some((Pending::Operator(_), op_token)) => output.push(op_token),
                    Some((Pending::Open, _)) => break,
                    None => return Err(QueryError::mismatched_parentheses()),
                }
            },
        }
    }

    while let Some((pending, token)) = stack.pop() {
        match pending {
            Pending::Operator(_) => output.push(token),
            Pending::Open => return Err(QueryError::mismatched_parentheses()),
        }
    }

    debug!(
        tokens = %output.iter().map(ToString::to_string).collect::<Vec<_>>().join(" "),
        "postfix tokens"
    );
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Comparison, Connective, Operand};

    fn leaf(field: &str) -> Token {
        Token::operand(Operand::new(field, Comparison::Equal, 1))
    }

    fn render(tokens: &[Token]) -> String {
        to_postfix(tokens)
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn single_operand() {
        assert_eq!(render(&[leaf("a")]), "a");
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let tokens = [leaf("a"), Token::or(), leaf("b"), Token::and(), leaf("c")];
        assert_eq!(render(&tokens), "a b c AND OR");
    }

    #[test]
    fn equal_precedence_is_left_associative() {
        let tokens = [leaf("a"), Token::and(), leaf("b"), Token::and(), leaf("c")];
        assert_eq!(render(&tokens), "a b AND c AND");
    }

    #[test]
    fn parentheses_override_precedence() {
        let tokens = [
            leaf("a"),
            Token::and(),
            Token::Open,
            leaf("b"),
            Token::or(),
            leaf("c"),
            Token::Close,
        ];
        assert_eq!(render(&tokens), "a b c OR AND");
    }

    #[test]
    fn operator_does_not_pop_past_open_parenthesis() {
        let tokens = [
            leaf("a"),
            Token::and(),
            Token::Open,
            leaf("b"),
            Token::and(),
            leaf("c"),
            Token::Close,
        ];
        assert_eq!(render(&tokens), "a b c AND AND");
    }

    #[test]
    fn separate_flag_is_preserved() {
        let tokens = [
            leaf("a"),
            Token::Operator(Operator::separate(Connective::Or)),
            leaf("b"),
        ];
        let postfix = to_postfix(&tokens).unwrap();
        assert_eq!(
            *postfix[2],
            Token::Operator(Operator::separate(Connective::Or))
        );
    }

    #[test]
    fn unmatched_close_is_syntax_error() {
        let tokens = [leaf("a"), Token::Close];
        assert_eq!(
            to_postfix(&tokens).unwrap_err(),
            QueryError::mismatched_parentheses()
        );
    }

    #[test]
    fn unmatched_open_is_syntax_error() {
        let tokens = [Token::Open, leaf("a"), Token::and(), leaf("b")];
        assert!(matches!(
            to_postfix(&tokens),
            Err(QueryError::Syntax { .. })
        ));
    }

    #[test]
    fn close_before_open_is_syntax_error() {
        let tokens = [Token::Close, leaf("a"), Token::Open];
        assert!(matches!(
            to_postfix(&tokens),
            Err(QueryError::Syntax { .. })
        ));
    }

    #[test]
    fn input_is_left_untouched() {
        let tokens = vec![Token::Open, leaf("a"), Token::Close];
        let before = tokens.clone();
        let _postfix = to_postfix(&tokens).unwrap();
        assert_eq!(tokens, before);
    }
}
