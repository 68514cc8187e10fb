use crate::{
    ast::{
        ast::Expr,
        expressions::{
            BinaryExpr, CallExpr, ForExpr, IfExpr, NumberExpr, UnaryExpr, VarExpr, VariableExpr,
        },
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    Span,
};

use super::parser::Parser;

pub fn parse_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let lhs = parse_unary(parser)?;
    parse_binary_rhs(parser, 0, lhs)
}

/// Characters that may start a unary operator application.
pub fn is_unary_capable(c: char) -> bool {
    c.is_ascii() && c != '(' && c != ','
}

pub fn parse_unary(parser: &mut Parser) -> Result<Expr, Error> {
    let opcode = match parser.current_token_kind() {
        TokenKind::Punct(c) if is_unary_capable(c) => c,
        _ => return parse_primary_expr(parser),
    };

    let start = parser.advance().span.start;
    let operand = parse_unary(parser)?;

    Ok(Expr::Unary(UnaryExpr {
        span: Span {
            start,
            end: operand.get_span().end.clone(),
        },
        opcode,
        operand: Box::new(operand),
    }))
}

/// Precedence climbing. Folds operators binding at least as tightly as
/// `min_precedence` onto `lhs`. Equal precedence associates left.
pub fn parse_binary_rhs(parser: &mut Parser, min_precedence: u32, mut lhs: Expr) -> Result<Expr, Error> {
    loop {
        let Some(precedence) = parser.current_precedence() else {
            return Ok(lhs);
        };
        if precedence < min_precedence {
            return Ok(lhs);
        }

        let operator = parser.advance();
        let opcode = operator.kind.punct().unwrap_or_default();
        let mut rhs = parse_unary(parser)?;

        if let Some(next) = parser.current_precedence() {
            if precedence < next {
                rhs = parse_binary_rhs(parser, precedence + 1, rhs)?;
            }
        }

        lhs = Expr::Binary(BinaryExpr {
            span: Span {
                start: lhs.get_span().start.clone(),
                end: rhs.get_span().end.clone(),
            },
            opcode,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        });
    }
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<Expr, Error> {
    match parser.current_token_kind() {
        TokenKind::Identifier => parse_identifier_expr(parser),
        TokenKind::Number => parse_number_expr(parser),
        TokenKind::Punct('(') => parse_paren_expr(parser),
        TokenKind::If => parse_if_expr(parser),
        TokenKind::For => parse_for_expr(parser),
        TokenKind::Var => parse_var_expr(parser),
        _ => Err(Error::new(
            ErrorImpl::UnexpectedToken {
                token: parser.current_token().value.clone(),
            },
            parser.get_position(),
        )),
    }
}

pub fn parse_number_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let result = parser.current_token().value.parse::<f64>();

    match result {
        Ok(value) => Ok(Expr::Number(NumberExpr {
            value,
            span: parser.advance().span,
        })),
        Err(_) => Err(Error::new(
            ErrorImpl::NumberParseError {
                token: parser.current_token().value.clone(),
            },
            parser.get_position(),
        )),
    }
}

pub fn parse_paren_expr(parser: &mut Parser) -> Result<Expr, Error> {
    parser.advance();
    let expr = parse_expr(parser)?;
    parser.expect_detailed(TokenKind::Punct(')'), "`)`")?;

    Ok(expr)
}

pub fn parse_identifier_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let name_token = parser.advance();

    if parser.current_token_kind() != TokenKind::Punct('(') {
        return Ok(Expr::Variable(VariableExpr {
            name: name_token.value,
            span: name_token.span,
        }));
    }

    parser.advance();
    let mut args = vec![];

    if parser.current_token_kind() != TokenKind::Punct(')') {
        loop {
            args.push(parse_expr(parser)?);

            if parser.current_token_kind() == TokenKind::Punct(')') {
                break;
            }

            let error = parser.detailed_error("expected `)` or `,` in argument list");
            parser.expect_error(TokenKind::Punct(','), Some(error))?;
        }
    }

    let end = parser.advance().span.end;

    Ok(Expr::Call(CallExpr {
        span: Span {
            start: name_token.span.start,
            end,
        },
        callee: name_token.value,
        args,
    }))
}

pub fn parse_if_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.advance().span.start;

    let cond = parse_expr(parser)?;
    parser.expect_detailed(TokenKind::Then, "`then`")?;
    let then_branch = parse_expr(parser)?;
    parser.expect_detailed(TokenKind::Else, "`else`")?;
    let else_branch = parse_expr(parser)?;

    Ok(Expr::If(IfExpr {
        span: Span {
            start,
            end: else_branch.get_span().end.clone(),
        },
        cond: Box::new(cond),
        then_branch: Box::new(then_branch),
        else_branch: Box::new(else_branch),
    }))
}

// for i = start, end[, step] in body
pub fn parse_for_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start_pos = parser.advance().span.start;

    let var_name = parser
        .expect_detailed(TokenKind::Identifier, "identifier after `for`")?
        .value;
    parser.expect_detailed(TokenKind::Punct('='), "`=` after for")?;

    let start = parse_expr(parser)?;
    parser.expect_detailed(TokenKind::Punct(','), "`,` after for start value")?;
    let end = parse_expr(parser)?;

    let step = if parser.current_token_kind() == TokenKind::Punct(',') {
        parser.advance();
        Some(Box::new(parse_expr(parser)?))
    } else {
        None
    };

    parser.expect_detailed(TokenKind::In, "`in` after for")?;
    let body = parse_expr(parser)?;

    Ok(Expr::For(ForExpr {
        span: Span {
            start: start_pos,
            end: body.get_span().end.clone(),
        },
        var_name,
        start: Box::new(start),
        end: Box::new(end),
        step,
        body: Box::new(body),
    }))
}

// var a = 1, b in body
pub fn parse_var_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.advance().span.start;
    let mut bindings = vec![];

    loop {
        let name = parser
            .expect_detailed(TokenKind::Identifier, "identifier after `var`")?
            .value;

        let init = if parser.current_token_kind() == TokenKind::Punct('=') {
            parser.advance();
            Some(parse_expr(parser)?)
        } else {
            None
        };

        bindings.push((name, init));

        if parser.current_token_kind() != TokenKind::Punct(',') {
            break;
        }
        parser.advance();
    }

    parser.expect_detailed(TokenKind::In, "`in` after var")?;
    let body = parse_expr(parser)?;

    Ok(Expr::Var(VarExpr {
        span: Span {
            start,
            end: body.get_span().end.clone(),
        },
        bindings,
        body: Box::new(body),
    }))
}
