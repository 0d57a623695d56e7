/*!
# CPath Parser

Parser for converting CPath strings into [`Query`] objects. CPath is the
textual front end of the query model: every expression parses into the same
structure the fluent builder produces, so the two surfaces evaluate
identically.

## Examples

```rust
use ctrlsearch::query::{Query, parser};
let parsed: Query = parser::parse_cpath("//Pane[@Name='Left']/Button[2]")
    .expect("Invalid query");
assert_eq!("//Pane[@Name='Left']/Button[2]", parsed.to_string());
```

## Grammar

```text
path       := separator? step (separator step)*
separator  := "//" | "/"
step       := ".." | "." | (axis "::")? node_test predicate*
axis       := axis_name ("{" depth "}")?
node_test  := "*" | ControlType
predicate  := "[" (position | slice | or_expr) "]"
or_expr    := and_expr ("or" and_expr)*
and_expr   := unary ("and" unary)*
unary      := "(" or_expr ")" | "@" Property op literal "i"?
            | "relative" "(" ("~"|"-"|"+")? n "," ("*" | or_expr) ")"
            | ("." | "..") (separator step)*
op         := "=" | "!=" | "*=" | "!*=" | "~=" | "!~="
```

Axis names are `self`, `child`, `parent`, `descendant`,
`descendant-or-self`, `ancestor` and `ancestor-or-self`. Without an axis,
`/X` selects children and `//X` all descendants; with one, `//` prefixes an
unbounded descendant stage. `[n]` is 1-based and `[s:e]` is a half-open
slice; either applies after every condition of its step.

## Errors

If the input is invalid, [`parse_cpath`] returns a [`ParseError`] carrying
the byte offset of the offending text:

```rust
use ctrlsearch::query::parser::{self, ParseError};

let result = parser::parse_cpath("//Button[@Colour='red']");
assert!(matches!(result, Err(ParseError::UnknownProperty { position: 10, .. })));
```
*/

use pest::Parser;
use pest::error::InputLocation;
use pest::iterators::{Pair, Pairs};
use pest_derive::Parser;
use std::error::Error;
use std::fmt;

use crate::query::condition::{
    Condition, Distance, PropertyCondition, PropertyOptions,
};
use crate::query::part::{ElementPart, SearchPart};
use crate::query::property::{PropertyId, PropertyValue};
use crate::query::Query;

/// Parser for turning raw CPath strings into [`Query`] objects.
#[derive(Parser)]
#[grammar = "query/grammar/cpath.pest"]
pub struct CPathParser;

/// Represents errors that can occur while parsing a CPath expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The input does not follow the grammar.
    Syntax {
        position: usize,
        fragment: String,
        message: String,
    },
    /// A property name outside the known set.
    UnknownProperty { position: usize, name: String },
    /// An axis name outside the known set.
    UnknownAxis { position: usize, name: String },
    /// A number that is out of range or meaningless where it appears.
    InvalidNumber {
        position: usize,
        fragment: String,
        reason: &'static str,
    },
    /// A `~=` pattern that does not compile.
    InvalidRegex {
        position: usize,
        pattern: String,
        message: String,
    },
    /// A second positional predicate on the same step.
    DuplicatePosition { position: usize, fragment: String },
}

impl ParseError {
    /// Byte offset of the offending text in the input.
    #[must_use]
    pub const fn position(&self) -> usize {
        match self {
            Self::Syntax { position, .. }
            | Self::UnknownProperty { position, .. }
            | Self::UnknownAxis { position, .. }
            | Self::InvalidNumber { position, .. }
            | Self::InvalidRegex { position, .. }
            | Self::DuplicatePosition { position, .. } => *position,
        }
    }

    fn from_pest(err: &pest::error::Error<Rule>, input: &str) -> Self {
        let position = match err.location {
            InputLocation::Pos(pos) => pos,
            InputLocation::Span((start, _)) => start,
        };
        let fragment = input
            .get(position..)
            .unwrap_or_default()
            .chars()
            .take_while(|c| !c.is_whitespace())
            .take(24)
            .collect();
        Self::Syntax {
            position,
            fragment,
            message: err.variant.message().into_owned(),
        }
    }

    fn unexpected(pair: &Pair<'_, Rule>) -> Self {
        Self::Syntax {
            position: pair.as_span().start(),
            fragment: pair.as_str().to_string(),
            message: format!("unexpected {:?}", pair.as_rule()),
        }
    }

    fn invalid_number(pair: &Pair<'_, Rule>, reason: &'static str) -> Self {
        Self::InvalidNumber {
            position: pair.as_span().start(),
            fragment: pair.as_str().to_string(),
            reason,
        }
    }
}

impl Error for ParseError {}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax { position, fragment, message } => {
                write!(
                    f,
                    "Syntax error at offset {position} near `{fragment}`: {message}"
                )
            }
            Self::UnknownProperty { position, name } => {
                write!(f, "Unknown property `{name}` at offset {position}")
            }
            Self::UnknownAxis { position, name } => {
                write!(f, "Unknown axis `{name}` at offset {position}")
            }
            Self::InvalidNumber { position, fragment, reason } => {
                write!(f, "Invalid number `{fragment}` at offset {position}: {reason}")
            }
            Self::InvalidRegex { position, pattern, message } => {
                write!(f, "Invalid pattern `{pattern}` at offset {position}: {message}")
            }
            Self::DuplicatePosition { position, fragment } => {
                write!(f, "Second positional predicate `{fragment}` at offset {position}")
            }
        }
    }
}

/// How a step is attached to the step before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Separator {
    /// `/`, or no separator at all
    Child,
    /// `//`
    Descendant,
}

impl Separator {
    fn from_token(token: &str) -> Self {
        if token == "//" { Self::Descendant } else { Self::Child }
    }

    /// The stages `//` contributes in front of an explicit axis.
    fn prefix(self) -> Vec<SearchPart> {
        match self {
            Self::Child => Vec::new(),
            Self::Descendant => vec![SearchPart::descendants(None)],
        }
    }
}

/// Parse an input CPath string into a [`Query`]
///
/// # Errors
///
/// Returns a [`ParseError`] describing how the parsing failed.
pub fn parse_cpath(input: &str) -> Result<Query, ParseError> {
    let mut pairs = CPathParser::parse(Rule::cpath, input)
        .map_err(|err| ParseError::from_pest(&err, input))?;

    let cpath = pairs.next().ok_or_else(|| ParseError::Syntax {
        position: 0,
        fragment: String::new(),
        message: "empty query".to_string(),
    })?;
    let path = cpath
        .into_inner()
        .find(|pair| pair.as_rule() == Rule::path)
        .ok_or_else(|| ParseError::Syntax {
            position: 0,
            fragment: input.to_string(),
            message: "expected a path".to_string(),
        })?;

    let mut steps = Vec::new();
    parse_steps(path.into_inner(), &mut steps)?;
    let query = assemble(steps);

    log::trace!("parsed `{input}` into {query:?}");

    Ok(query)
}

/// Turns a list of steps into a query: the last step becomes the element
/// part and the others become context stages. No steps at all (a bare `.`)
/// means the context control itself.
fn assemble(mut steps: Vec<ElementPart>) -> Query {
    let element = steps.pop().unwrap_or_default();
    let path = steps.into_iter().map(SearchPart::Composite).collect();
    Query::from_parts(path, element)
}

/// Parse the children of a `path`, `leading_step` or `sub_path` rule.
fn parse_steps(
    pairs: Pairs<'_, Rule>,
    steps: &mut Vec<ElementPart>,
) -> Result<(), ParseError> {
    let mut separator = Separator::Child;
    for pair in pairs {
        match pair.as_rule() {
            Rule::leading_step => parse_steps(pair.into_inner(), steps)?,
            Rule::separator => separator = Separator::from_token(pair.as_str()),
            Rule::step => {
                steps.push(parse_step(pair, separator)?);
                separator = Separator::Child;
            }
            // Leading `.` of a sub-path: the candidate itself, no stage.
            Rule::self_step => {}
            Rule::parent_step => {
                steps.push(ElementPart::scoped(vec![SearchPart::parent()]));
            }
            _ => return Err(ParseError::unexpected(&pair)),
        }
    }
    Ok(())
}

/// Parse a step rule into an [`ElementPart`].
fn parse_step(
    pair: Pair<'_, Rule>,
    separator: Separator,
) -> Result<ElementPart, ParseError> {
    let span_pair = pair.clone();
    let inner =
        pair.into_inner().next().ok_or_else(|| ParseError::unexpected(&span_pair))?;
    match inner.as_rule() {
        Rule::self_step => Ok(ElementPart::scoped(separator.prefix())),
        Rule::parent_step => {
            let mut parts = separator.prefix();
            parts.push(SearchPart::parent());
            Ok(ElementPart::scoped(parts))
        }
        Rule::axis_step => parse_axis_step(inner, separator),
        _ => Err(ParseError::unexpected(&inner)),
    }
}

/// Parse an axis step: optional axis, node test, predicates.
fn parse_axis_step(
    pair: Pair<'_, Rule>,
    separator: Separator,
) -> Result<ElementPart, ParseError> {
    let mut inner = pair.into_inner().peekable();

    let parts = match inner.next_if(|p| p.as_rule() == Rule::axis) {
        Some(axis) => {
            let mut parts = separator.prefix();
            parts.push(parse_axis(axis)?);
            parts
        }
        None => match separator {
            Separator::Child => vec![SearchPart::children()],
            Separator::Descendant => vec![SearchPart::descendants(None)],
        },
    };
    let mut element = ElementPart::scoped(parts);

    for pair in inner {
        match pair.as_rule() {
            Rule::wildcard => {}
            Rule::identifier => {
                element.append_condition(
                    PropertyCondition::equals(
                        PropertyId::CONTROL_TYPE,
                        pair.as_str(),
                        PropertyOptions::default(),
                    )
                    .into(),
                );
            }
            Rule::predicate => parse_predicate(pair, &mut element)?,
            _ => return Err(ParseError::unexpected(&pair)),
        }
    }

    Ok(element)
}

/// Parse an axis rule into the [`SearchPart`] it names.
fn parse_axis(pair: Pair<'_, Rule>) -> Result<SearchPart, ParseError> {
    let mut inner = pair.into_inner();
    let name = inner
        .next()
        .filter(|p| p.as_rule() == Rule::axis_name)
        .ok_or_else(|| ParseError::Syntax {
            position: 0,
            fragment: String::new(),
            message: "expected axis name".to_string(),
        })?;

    let mut part = match name.as_str() {
        "self" => SearchPart::Identity,
        "child" => SearchPart::children(),
        "parent" => SearchPart::parent(),
        "descendant" => SearchPart::descendants(None),
        "descendant-or-self" => SearchPart::Descendants {
            max_depth: None,
            include_self: true,
        },
        "ancestor" => SearchPart::ancestors(None),
        "ancestor-or-self" => SearchPart::Ancestors {
            max_depth: None,
            include_self: true,
        },
        other => {
            return Err(ParseError::UnknownAxis {
                position: name.as_span().start(),
                name: other.to_string(),
            });
        }
    };

    // Optional `{n}` depth bound
    if let Some(depth) = inner.next() {
        let number = depth
            .into_inner()
            .next()
            .ok_or_else(|| ParseError::unexpected(&name))?;
        let max_depth = parse_usize(&number)?;
        if !part.set_max_depth(Some(max_depth)) {
            return Err(ParseError::invalid_number(
                &number,
                "the self axis takes no depth",
            ));
        }
    }

    Ok(part)
}

/// Parse a predicate, folding conditions into the element's condition and
/// positions into its pagination.
fn parse_predicate(
    pair: Pair<'_, Rule>,
    element: &mut ElementPart,
) -> Result<(), ParseError> {
    let span_pair = pair.clone();
    let inner =
        pair.into_inner().next().ok_or_else(|| ParseError::unexpected(&span_pair))?;

    let (skip, take) = match inner.as_rule() {
        Rule::or_expr => {
            element.append_condition(parse_or(inner)?);
            return Ok(());
        }
        Rule::position => {
            let index = parse_usize(&inner)?;
            if index == 0 {
                return Err(ParseError::invalid_number(
                    &inner,
                    "positions start at 1",
                ));
            }
            (index - 1, Some(1))
        }
        Rule::slice => {
            let mut start = 0;
            let mut end = None;
            for bound in inner.clone().into_inner() {
                match bound.as_rule() {
                    Rule::slice_start => start = parse_usize(&bound)?,
                    Rule::slice_end => end = Some(parse_usize(&bound)?),
                    _ => return Err(ParseError::unexpected(&bound)),
                }
            }
            let take = end
                .map(|end: usize| {
                    end.checked_sub(start).ok_or_else(|| {
                        ParseError::invalid_number(
                            &inner,
                            "slice end precedes its start",
                        )
                    })
                })
                .transpose()?;
            (start, take)
        }
        _ => return Err(ParseError::unexpected(&inner)),
    };

    if element.skip.is_some() || element.take.is_some() {
        return Err(ParseError::DuplicatePosition {
            position: span_pair.as_span().start(),
            fragment: span_pair.as_str().to_string(),
        });
    }
    element.skip = (skip > 0).then_some(skip);
    element.take = take;
    Ok(())
}

/// Parse an `or_expr` rule into a left-associative `or` chain.
fn parse_or(pair: Pair<'_, Rule>) -> Result<Condition, ParseError> {
    let span_pair = pair.clone();
    let mut condition: Option<Condition> = None;
    for operand in pair.into_inner() {
        match operand.as_rule() {
            Rule::and_expr => {
                let rhs = parse_and(operand)?;
                condition = Some(match condition {
                    Some(lhs) => lhs.or(rhs),
                    None => rhs,
                });
            }
            Rule::or_kw => {}
            _ => return Err(ParseError::unexpected(&operand)),
        }
    }
    condition.ok_or_else(|| ParseError::unexpected(&span_pair))
}

/// Parse an `and_expr` rule into a left-associative `and` chain.
fn parse_and(pair: Pair<'_, Rule>) -> Result<Condition, ParseError> {
    let span_pair = pair.clone();
    let mut condition: Option<Condition> = None;
    for operand in pair.into_inner() {
        let rhs = match operand.as_rule() {
            Rule::and_kw => continue,
            Rule::group => {
                let group = operand.clone();
                let inner = operand
                    .into_inner()
                    .next()
                    .ok_or_else(|| ParseError::unexpected(&group))?;
                parse_or(inner)?
            }
            Rule::comparison => parse_comparison(operand)?,
            Rule::relative => parse_relative(operand)?,
            Rule::sub_path => {
                let mut steps = Vec::new();
                parse_steps(operand.into_inner(), &mut steps)?;
                Condition::HasElement(Box::new(assemble(steps)))
            }
            _ => return Err(ParseError::unexpected(&operand)),
        };
        condition = Some(Condition::append(condition, rhs));
    }
    condition.ok_or_else(|| ParseError::unexpected(&span_pair))
}

/// Parse a comparison rule into a [`Condition::Property`].
fn parse_comparison(pair: Pair<'_, Rule>) -> Result<Condition, ParseError> {
    let span_pair = pair.clone();
    let mut inner = pair.into_inner();
    let mut next = || inner.next().ok_or_else(|| ParseError::unexpected(&span_pair));

    let property = next()?;
    let name = property
        .into_inner()
        .next()
        .ok_or_else(|| ParseError::unexpected(&span_pair))?;
    let id: PropertyId = name.as_str().parse().map_err(|_| {
        ParseError::UnknownProperty {
            position: name.as_span().start(),
            name: name.as_str().to_string(),
        }
    })?;

    let operator = next()?;
    let literal = next()?;
    let value = parse_literal(&literal)?;
    let ignore_case = next().is_ok();

    let options = PropertyOptions {
        ignore_case,
        unequal: operator.as_str().starts_with('!'),
    };
    let condition = match operator.as_str().trim_start_matches('!') {
        "=" => PropertyCondition::equals(id, value, options),
        "*=" => PropertyCondition::contains(id, value.to_string(), options),
        "~=" => PropertyCondition::regex(id, &value.to_string(), options)
            .map_err(|err| ParseError::InvalidRegex {
                position: literal.as_span().start(),
                pattern: value.to_string(),
                message: err.to_string(),
            })?,
        _ => return Err(ParseError::unexpected(&operator)),
    };
    Ok(condition.into())
}

/// Parse a literal (`string`, `boolean` or `number`) into a [`PropertyValue`].
fn parse_literal(pair: &Pair<'_, Rule>) -> Result<PropertyValue, ParseError> {
    match pair.as_rule() {
        Rule::string => {
            let body = pair.clone().into_inner().next().map_or("", |p| p.as_str());
            Ok(PropertyValue::Str(unescape(body)))
        }
        Rule::boolean => Ok(PropertyValue::Bool(pair.as_str() == "true")),
        Rule::number => pair
            .as_str()
            .parse::<i64>()
            .map(PropertyValue::Int)
            .map_err(|_| ParseError::invalid_number(pair, "out of range")),
        _ => Err(ParseError::unexpected(pair)),
    }
}

/// Parse a relative rule into a [`Condition::RelativeTo`].
fn parse_relative(pair: Pair<'_, Rule>) -> Result<Condition, ParseError> {
    let span_pair = pair.clone();
    let mut inner = pair.into_inner();
    let distance = inner.next().ok_or_else(|| ParseError::unexpected(&span_pair))?;
    let text = distance.as_str();
    let steps = |digits: &str| {
        digits
            .parse::<usize>()
            .map_err(|_| ParseError::invalid_number(&distance, "out of range"))
    };
    let distance = match text.as_bytes().first() {
        Some(b'~') => Distance::Any(steps(&text[1..])?),
        Some(b'-') => Distance::Ancestors(steps(&text[1..])?),
        Some(b'+') => Distance::Descendants(steps(&text[1..])?),
        _ => Distance::Descendants(steps(text)?),
    };

    let target = inner.next().ok_or_else(|| ParseError::unexpected(&span_pair))?;
    let condition = match target.as_rule() {
        Rule::any_node => None,
        Rule::or_expr => Some(Box::new(parse_or(target)?)),
        _ => return Err(ParseError::unexpected(&target)),
    };
    Ok(Condition::RelativeTo { distance, condition })
}

fn parse_usize(pair: &Pair<'_, Rule>) -> Result<usize, ParseError> {
    pair.as_str()
        .parse::<usize>()
        .map_err(|_| ParseError::invalid_number(pair, "out of range"))
}

/// Resolve backslash escapes inside a quoted string: `\x` becomes `x`.
fn unescape(body: &str) -> String {
    let mut result = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                result.push(escaped);
            }
        } else {
            result.push(c);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::condition::LogicalOp;

    fn round_trip(text: &str) {
        let parsed = parse_cpath(text).unwrap();
        assert_eq!(text, parsed.to_string());
    }

    #[test]
    fn parse_descendant_wildcard() {
        assert_eq!(parse_cpath("//*").unwrap(), Query::new());
    }

    #[test]
    fn parse_node_test_and_predicate() {
        let expected = Query::new().and_control_type("Button").and_name("OK");
        assert_eq!(parse_cpath("//Button[@Name='OK']").unwrap(), expected);
        assert_eq!(parse_cpath(" // Button [ @Name = \"OK\" ] ").unwrap(), expected);
    }

    #[test]
    fn parse_child_steps() {
        let query = parse_cpath("Window/Pane").unwrap();
        assert_eq!(query.path().len(), 1);
        assert_eq!(query.element().parts, vec![SearchPart::children()]);
        assert_eq!(query.to_string(), "/Window/Pane");
    }

    #[test]
    fn parse_explicit_axes() {
        round_trip("/ancestor::Window");
        round_trip("/descendant{2}::Button");
        round_trip("/ancestor-or-self{3}::*");
        round_trip("/descendant-or-self::Edit");
        round_trip("/parent::*");
        round_trip("/self::Button");
    }

    #[test]
    fn double_slash_prefixes_explicit_axis() {
        let query = parse_cpath("//parent::Pane").unwrap();
        assert_eq!(
            query.element().parts,
            vec![SearchPart::descendants(None), SearchPart::parent()]
        );
    }

    #[test]
    fn parse_operators() {
        round_trip("//*[@Name!='OK']");
        round_trip("//*[@Name*='o' i]");
        round_trip("//*[@Name!*='x']");
        round_trip("//*[@Name~='^O.$']");
        round_trip("//*[@Name!~='^O.$' i]");
        round_trip("//*[@IsEnabled=false]");
        round_trip("//*[@ProcessId=-42]");
        round_trip("//*[@IsInvokePatternAvailable=true]");
    }

    #[test]
    fn parse_escaped_strings() {
        let query = parse_cpath(r"//*[@Name='it\'s']").unwrap();
        assert_eq!(query, Query::new().and_name("it's"));
        round_trip(r"//*[@Name='it\'s']");
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let query = parse_cpath("//*[@Name='a' or @Name='b' and @Name='c']").unwrap();
        match &query.element().condition {
            Some(Condition::Composite { op: LogicalOp::Or, right, .. }) => {
                assert!(matches!(
                    **right,
                    Condition::Composite { op: LogicalOp::And, .. }
                ));
            }
            other => panic!("expected or at the root, got {other:?}"),
        }
        round_trip("//*[(@Name='a' or @Name='b') and @Name='c']");
    }

    #[test]
    fn parse_positions_and_slices() {
        let query = parse_cpath("//Button[2]").unwrap();
        assert_eq!((query.element().skip, query.element().take), (Some(1), Some(1)));
        round_trip("//Button[2]");
        round_trip("//Button[1]");
        round_trip("//Button[1:4]");
        round_trip("//Button[3:]");
        round_trip("//Button[:2]");
    }

    #[test]
    fn position_applies_after_conditions() {
        let a = parse_cpath("//Button[2][@Name='x']").unwrap();
        let b = parse_cpath("//Button[@Name='x'][2]").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn parse_sub_paths() {
        round_trip("//List[./ListItem]");
        round_trip("//Pane[.//Text[@Name='Hi']]");
        round_trip("//Button[./parent::Pane]");
        let query = parse_cpath("//Button[..]").unwrap();
        assert_eq!(query.to_string(), "//Button[./parent::*]");
    }

    #[test]
    fn parse_relative() {
        round_trip("//Edit[relative(~2, @ControlType='Text' and @Name='User')]");
        round_trip("//Edit[relative(-1, *)]");
        round_trip("//Edit[relative(3, @Name='x')]");
        let query = parse_cpath("//Edit[relative(+3, @Name='x')]").unwrap();
        assert_eq!(query.to_string(), "//Edit[relative(3, @Name='x')]");
    }

    #[test]
    fn parse_self_and_parent_steps() {
        let query = parse_cpath(".").unwrap();
        assert!(query.element().parts.is_empty());
        let query = parse_cpath("//Button/..").unwrap();
        assert_eq!(query.element().parts, vec![SearchPart::parent()]);
    }

    #[test]
    fn parse_unbalanced_brackets() {
        let result = parse_cpath("//Button[@Name='OK'");
        assert!(matches!(result, Err(ParseError::Syntax { .. })));
    }

    #[test]
    fn parse_unknown_axis() {
        let result = parse_cpath("/sibling::Button");
        assert_eq!(
            result,
            Err(ParseError::UnknownAxis { position: 1, name: "sibling".to_string() })
        );
    }

    #[test]
    fn parse_unknown_property() {
        let err = parse_cpath("//Button[@Colour='red']").unwrap_err();
        assert_eq!(err.position(), 10);
        assert!(err.to_string().contains("Colour"));
    }

    #[test]
    fn parse_invalid_positions() {
        assert!(matches!(
            parse_cpath("//Button[0]"),
            Err(ParseError::InvalidNumber { position: 9, .. })
        ));
        assert!(matches!(
            parse_cpath("//Button[4:2]"),
            Err(ParseError::InvalidNumber { .. })
        ));
        assert!(matches!(
            parse_cpath("//Button[1][2]"),
            Err(ParseError::DuplicatePosition { position: 11, .. })
        ));
        assert!(matches!(
            parse_cpath("/self{2}::Button"),
            Err(ParseError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn parse_invalid_regex() {
        assert!(matches!(
            parse_cpath("//*[@Name~='(']"),
            Err(ParseError::InvalidRegex { position: 11, .. })
        ));
    }

    #[test]
    fn parse_empty_input() {
        assert!(parse_cpath("").is_err());
        assert!(parse_cpath("//").is_err());
    }
}
