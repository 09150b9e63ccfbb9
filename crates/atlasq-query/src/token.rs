//! Search tokens.
//!
//! A token stream is the infix form of a search expression: operands (one field
//! comparison each), AND/OR connectives, and explicit parentheses. Tokens are plain
//! values; nothing in this crate mutates a stream it is handed.

use std::{convert::Infallible, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Expression strings for every comparison kind.
const EXPRESSIONS: [(Comparison, &str); 25] = [
    (Comparison::LessThan, "<"),
    (Comparison::LessThanOrEqual, "<="),
    (Comparison::GreaterThan, ">"),
    (Comparison::GreaterThanOrEqual, ">="),
    (Comparison::Equal, "="),
    (Comparison::NotEqual, "!="),
    (Comparison::Between, "IS_BETWEEN"),
    (Comparison::NotBetween, "IS_NOT_BETWEEN"),
    (Comparison::In, "IN"),
    (Comparison::NotIn, "NOT_IN"),
    (Comparison::StartsWith, "STARTS_WITH"),
    (Comparison::EndsWith, "ENDS_WITH"),
    (Comparison::Contains, "CONTAINS"),
    (Comparison::Regex, "~"),
    (Comparison::NotNull, "NOT_NULL"),
    (Comparison::IsNull, "IS_NULL"),
    (Comparison::Exists, "EXIST"),
    (Comparison::Search, "SEARCH"),
    (Comparison::StartsWithNot, "STARTS_WITH_NOT"),
    (Comparison::EndsWithNot, "ENDS_WITH_NOT"),
    (Comparison::ContainsNot, "CONTAINS_NOT"),
    (Comparison::RegexNot, "REGEX_NOT"),
    (Comparison::Autocomplete, "AUTOCOMPLETE"),
    (Comparison::Phrase, "PHRASE"),
    (Comparison::NotDefined, "NOT_DEFINED"),
];

/// The comparison an operand applies to its field.
///
/// Serialized as its expression string (`"<"`, `"IS_BETWEEN"`, ...). Unknown
/// expressions decode to [`Comparison::NotDefined`] rather than failing, so a
/// stream with an unrecognised comparison is rejected at lowering time with a
/// precise error instead of at decode time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Comparison {
    /// `<`
    LessThan,
    /// `<=`
    LessThanOrEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanOrEqual,
    /// `=`
    Equal,
    /// `!=`
    NotEqual,
    /// Inclusive range over a two-element value.
    Between,
    /// Negated inclusive range.
    NotBetween,
    /// Membership in a list of values.
    In,
    /// Negated membership.
    NotIn,
    /// Prefix wildcard.
    StartsWith,
    /// Suffix wildcard.
    EndsWith,
    /// Infix wildcard.
    Contains,
    /// `~`, lowered like [`Comparison::Contains`].
    Regex,
    /// Field is present and holds a non-default value.
    NotNull,
    /// Field is missing, null, or holds its type's default value.
    IsNull,
    /// Field is present.
    Exists,
    /// Free-text search.
    Search,
    /// Negated prefix wildcard.
    StartsWithNot,
    /// Negated suffix wildcard.
    EndsWithNot,
    /// Negated infix wildcard.
    ContainsNot,
    /// Negated regular expression.
    RegexNot,
    /// Autocomplete over an n-gram indexed field.
    Autocomplete,
    /// Exact phrase with optional slop.
    Phrase,
    /// Placeholder for expressions this crate does not know.
    NotDefined,
}

impl Comparison {
    /// Returns the expression string for this comparison.
    pub fn expression(self) -> &'static str {
        EXPRESSIONS
            .iter()
            .find(|(c, _)| *c == self)
            .map_or("NOT_DEFINED", |(_, e)| *e)
    }

    /// Looks up a comparison by expression, falling back to `NotDefined`.
    pub fn from_expression(expression: &str) -> Self {
        EXPRESSIONS
            .iter()
            .find(|(_, e)| *e == expression)
            .map_or(Self::NotDefined, |(c, _)| *c)
    }
}

impl FromStr for Comparison {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_expression(s))
    }
}

impl From<String> for Comparison {
    fn from(s: String) -> Self {
        Self::from_expression(&s)
    }
}

impl From<Comparison> for String {
    fn from(c: Comparison) -> Self {
        c.expression().to_string()
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.expression())
    }
}

/// Optional knobs for the text-oriented comparisons (autocomplete, phrase).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextModifiers {
    /// Autocomplete token order (`"any"` or `"sequential"`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_order: Option<String>,
    /// Autocomplete fuzzy options, passed through verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuzzy: Option<Value>,
    /// Score modifier, passed through verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<Value>,
    /// Minimum n-gram length.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_grams: Option<u32>,
    /// Maximum n-gram length.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_grams: Option<u32>,
    /// Allowed distance between phrase words.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slop: Option<u32>,
}

/// One leaf comparison: a field, what to compare, and the value to compare against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operand {
    /// Dotted field path as the caller wrote it.
    pub field: String,
    /// Comparison kind. `None` asks only that the field holds a value.
    #[serde(default, rename = "op", alias = "comparison")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<Comparison>,
    /// Comparison value.
    #[serde(default)]
    pub value: Value,
    /// Also match documents where the field is null or missing.
    #[serde(default, skip_serializing_if = "is_false")]
    pub include_blanks: bool,
    /// Text comparison modifiers.
    #[serde(flatten)]
    pub modifiers: TextModifiers,
}

/// Serde helper for skipping `false` flags.
fn is_false(b: &bool) -> bool {
    !*b
}

impl Operand {
    /// Creates an operand comparing `field` against `value`.
    pub fn new(field: impl Into<String>, comparison: Comparison, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            comparison: Some(comparison),
            value: value.into(),
            include_blanks: false,
            modifiers: TextModifiers::default(),
        }
    }

    /// Creates an operand that only requires `field` to hold a value.
    pub fn present(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            comparison: None,
            value: Value::Null,
            include_blanks: false,
            modifiers: TextModifiers::default(),
        }
    }

    /// Also matches documents where the field is blank.
    pub fn with_blanks(mut self) -> Self {
        self.include_blanks = true;
        self
    }

    /// Replaces the text modifiers.
    pub fn with_modifiers(mut self, modifiers: TextModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Boolean connective between operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connective {
    /// All children must match.
    And,
    /// At least one child should match.
    Or,
}

impl Connective {
    /// Binding strength; AND binds tighter than OR.
    pub fn precedence(self) -> u8 {
        match self {
            Self::And => 2,
            Self::Or => 1,
        }
    }

    /// Key used for this connective inside a compound document.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::And => "must",
            Self::Or => "should",
        }
    }
}

impl fmt::Display for Connective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => f.write_str("AND"),
            Self::Or => f.write_str("OR"),
        }
    }
}

/// A connective token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Operator {
    /// The connective.
    pub connective: Connective,
    /// Keep same-connective operands in their own group instead of flattening.
    #[serde(default)]
    pub separate: bool,
}

impl Operator {
    /// A merge-eligible operator.
    pub fn new(connective: Connective) -> Self {
        Self {
            connective,
            separate: false,
        }
    }

    /// An operator whose group is never flattened into a same-connective parent.
    pub fn separate(connective: Connective) -> Self {
        Self {
            connective,
            separate: true,
        }
    }
}

/// One lexical unit of a search expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Token {
    /// A leaf comparison.
    Operand(Operand),
    /// AND / OR.
    Operator(Operator),
    /// `(`
    Open,
    /// `)`
    Close,
}

impl Token {
    /// Wraps an operand.
    pub fn operand(operand: Operand) -> Self {
        Self::Operand(operand)
    }

    /// A merge-eligible AND.
    pub fn and() -> Self {
        Self::Operator(Operator::new(Connective::And))
    }

    /// A merge-eligible OR.
    pub fn or() -> Self {
        Self::Operator(Operator::new(Connective::Or))
    }
}

impl From<Operand> for Token {
    fn from(operand: Operand) -> Self {
        Self::Operand(operand)
    }
}

impl From<Operator> for Token {
    fn from(operator: Operator) -> Self {
        Self::Operator(operator)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operand(operand) => f.write_str(&operand.field),
            Self::Operator(op) => write!(f, "{}", op.connective),
            Self::Open => f.write_str("("),
            Self::Close => f.write_str(")"),
        }
    }
}

/// Renders a token stream on one line, separated by spaces.
pub fn stringify(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn comparison_expressions_round_trip() {
        for (comparison, expression) in EXPRESSIONS {
            assert_eq!(comparison.expression(), expression);
            assert_eq!(Comparison::from_expression(expression), comparison);
        }
    }

    #[test]
    fn unknown_expression_is_not_defined() {
        assert_eq!(Comparison::from_expression("LIKE"), Comparison::NotDefined);
        assert_eq!("=".parse::<Comparison>(), Ok(Comparison::Equal));
    }

    #[test]
    fn decodes_token_stream_from_json() {
        let tokens: Vec<Token> = serde_json::from_value(json!([
            "open",
            {"operand": {"field": "name", "op": "=", "value": "Laptop"}},
            {"operator": {"connective": "and"}},
            {"operand": {"field": "price", "op": "<", "value": 1200}},
            "close",
            {"operator": {"connective": "or", "separate": true}},
            {"operand": {"field": "title", "op": "AUTOCOMPLETE", "value": "lap",
                         "token_order": "sequential", "max_grams": 7}}
        ]))
        .unwrap();

        assert_eq!(tokens.len(), 7);
        assert_eq!(tokens[0], Token::Open);
        assert_eq!(
            tokens[1],
            Token::operand(Operand::new("name", Comparison::Equal, "Laptop"))
        );
        assert_eq!(tokens[2], Token::and());
        assert_eq!(
            tokens[5],
            Token::Operator(Operator::separate(Connective::Or))
        );
        let Token::Operand(auto) = &tokens[6] else {
            panic!("expected operand");
        };
        assert_eq!(auto.comparison, Some(Comparison::Autocomplete));
        assert_eq!(auto.modifiers.token_order.as_deref(), Some("sequential"));
        assert_eq!(auto.modifiers.max_grams, Some(7));
    }

    #[test]
    fn operand_without_comparison_decodes_as_presence_check() {
        let token: Token =
            serde_json::from_value(json!({"operand": {"field": "email", "include_blanks": true}}))
                .unwrap();
        assert_eq!(token, Token::operand(Operand::present("email").with_blanks()));
    }

    #[test]
    fn stringify_shows_fields_and_connectives() {
        let tokens = vec![
            Token::Open,
            Token::operand(Operand::new("a", Comparison::Equal, 1)),
            Token::or(),
            Token::operand(Operand::new("b", Comparison::Equal, 2)),
            Token::Close,
        ];
        assert_eq!(stringify(&tokens), "( a OR b )");
    }

    #[test]
    fn and_binds_tighter_than_or() {
        assert!(Connective::And.precedence() > Connective::Or.precedence());
        assert_eq!(Connective::And.keyword(), "must");
        assert_eq!(Connective::Or.keyword(), "should");
    }
}
