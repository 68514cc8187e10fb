use tracing::debug;

use crate::{
    ast::{
        ast::TopLevel,
        statements::{FunctionDef, Prototype, PrototypeKind},
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    parser::{
        expr::{is_unary_capable, parse_expr},
        lookups::{DEFAULT_BINARY_PRECEDENCE, MAX_PRECEDENCE, MIN_PRECEDENCE},
    },
    Span,
};

use super::parser::Parser;

/// Parses one definition, extern or bare expression.
pub fn parse_top_level(parser: &mut Parser) -> Result<TopLevel, Error> {
    let item = match parser.current_token_kind() {
        TokenKind::Def => TopLevel::Definition(parse_definition(parser)?),
        TokenKind::Extern => TopLevel::Extern(parse_extern(parser)?),
        _ => TopLevel::Expression(parse_top_level_expr(parser)?),
    };

    debug!(name = item.name(), "parsed top-level item");
    Ok(item)
}

pub fn parse_definition(parser: &mut Parser) -> Result<FunctionDef, Error> {
    parser.expect(TokenKind::Def)?;
    let prototype = parse_prototype(parser)?;
    let body = parse_expr(parser)?;

    Ok(FunctionDef { prototype, body })
}

pub fn parse_extern(parser: &mut Parser) -> Result<Prototype, Error> {
    parser.expect(TokenKind::Extern)?;
    parse_prototype(parser)
}

/// Wraps a bare expression in a zero-parameter function with a fresh name.
pub fn parse_top_level_expr(parser: &mut Parser) -> Result<FunctionDef, Error> {
    let start = parser.get_position();
    let body = parse_expr(parser)?;

    let prototype = Prototype {
        name: format!("__anon_expr{}", parser.advance_id()),
        params: vec![],
        kind: PrototypeKind::Function,
        span: Span {
            start,
            end: body.get_span().end.clone(),
        },
    };

    Ok(FunctionDef { prototype, body })
}

// name(a b)
// unary!(v)
// binary| 5 (lhs, rhs)
pub fn parse_prototype(parser: &mut Parser) -> Result<Prototype, Error> {
    let start = parser.get_position();

    let (name, kind) = match parser.current_token_kind() {
        TokenKind::Identifier => {
            let name = parser.advance().value;
            (name, PrototypeKind::Function)
        }
        TokenKind::Unary => {
            parser.advance();
            let symbol = parse_operator_symbol(parser, "unary")?;
            (format!("unary{}", symbol), PrototypeKind::Unary(symbol))
        }
        TokenKind::Binary => {
            parser.advance();
            let symbol = parse_operator_symbol(parser, "binary")?;

            let precedence = if parser.current_token_kind() == TokenKind::Number {
                parse_precedence(parser)?
            } else {
                DEFAULT_BINARY_PRECEDENCE
            };

            (format!("binary{}", symbol), PrototypeKind::Binary(symbol, precedence))
        }
        _ => return Err(parser.detailed_error("expected function name in prototype")),
    };

    parser.expect_detailed(TokenKind::Punct('('), "`(` in prototype")?;

    let mut params = vec![];
    loop {
        match parser.current_token_kind() {
            TokenKind::Identifier => params.push(parser.advance().value),
            TokenKind::Punct(',') => {
                parser.advance();
            }
            _ => break,
        }
    }

    let end = parser.expect_detailed(TokenKind::Punct(')'), "`)` in prototype")?.span.end;

    let expected = match kind {
        PrototypeKind::Function => None,
        PrototypeKind::Unary(_) => Some(1),
        PrototypeKind::Binary(..) => Some(2),
    };

    if let Some(expected) = expected {
        if params.len() != expected {
            return Err(Error::new(
                ErrorImpl::InvalidOperandCount {
                    operator: name,
                    expected,
                    received: params.len(),
                },
                start,
            ));
        }
    }

    Ok(Prototype {
        name,
        params,
        kind,
        span: Span { start, end },
    })
}

fn parse_operator_symbol(parser: &mut Parser, keyword: &str) -> Result<char, Error> {
    match parser.current_token_kind() {
        TokenKind::Punct(c) if is_unary_capable(c) => {
            parser.advance();
            Ok(c)
        }
        _ => Err(parser.detailed_error(&format!("expected operator after `{}`", keyword))),
    }
}

fn parse_precedence(parser: &mut Parser) -> Result<u32, Error> {
    let token = parser.current_token().clone();

    let Ok(value) = token.value.parse::<f64>() else {
        return Err(Error::new(
            ErrorImpl::NumberParseError { token: token.value },
            token.span.start,
        ));
    };

    if value < MIN_PRECEDENCE as f64 || value > MAX_PRECEDENCE as f64 {
        return Err(Error::new(ErrorImpl::InvalidPrecedence { value }, token.span.start));
    }

    parser.advance();
    Ok(value as u32)
}
