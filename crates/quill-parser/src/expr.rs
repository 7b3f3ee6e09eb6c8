//! Expression parsing over sections.
//!
//! Implements the precedence cascade for all expression types:
//! - Binary operations (logical, equality, comparison, arithmetic)
//! - Unary operations (negation, not)
//! - Literals, variable references, parenthesized expressions
//! - Function literals `[x: Int]: Int -> x + 1` and calls `f[args]`
//! - If-expressions
//!
//! Equality and comparison are non-associative: at most one operator
//! per chain. All other binary levels fold left. Primaries bind
//! tighter than any operator; chained calls compose left-to-right.

use crate::combinator::{
    alt, catch_unbound, ensure_bound, next_if, run_to_end, seq, zero_or_more, zero_or_one, Cursor,
    Outcome, Step,
};
use crate::section::{Delim, Section};
use crate::stmt::parse_block;
use crate::ParseDiagnostic;
use quill_ast::{BinOp, Expr, FuncBody, Param, Span, Spanned, Type, UnOp};
use quill_lexer::Token;

pub(crate) type SCursor<'a> = Cursor<'a, Section>;
pub(crate) type ExprStep<'a> = Step<'a, Section, Spanned<Expr>>;

/// Classifier for a single keyword or punctuation atom, for `next_if`.
pub(crate) fn token_span(token: Token) -> impl Fn(&Section) -> Option<Span> {
    move |section| {
        section
            .as_atom()
            .filter(|t| t.token == token)
            .map(|t| t.span)
    }
}

/// Identifier atom with its span.
pub(crate) fn ident(section: &Section) -> Option<Spanned<String>> {
    let token = section.as_atom()?;
    match &token.token {
        Token::Ident(name) => Some(Spanned::new(name.clone(), token.span)),
        _ => None,
    }
}

// === Operator recognition ===
//
// One pure classifier per precedence level; anything that is not an
// atom in the level's operator set is rejected without consuming,
// which terminates the level's repetition.

fn logical_op(section: &Section) -> Option<BinOp> {
    match &section.as_atom()?.token {
        Token::And => Some(BinOp::And),
        Token::Or => Some(BinOp::Or),
        _ => None,
    }
}

fn equality_op(section: &Section) -> Option<BinOp> {
    match &section.as_atom()?.token {
        Token::EqEq => Some(BinOp::Eq),
        Token::Neq => Some(BinOp::Ne),
        _ => None,
    }
}

fn comparison_op(section: &Section) -> Option<BinOp> {
    match &section.as_atom()?.token {
        Token::Lt => Some(BinOp::Lt),
        Token::Lte => Some(BinOp::Le),
        Token::Gt => Some(BinOp::Gt),
        Token::Gte => Some(BinOp::Ge),
        _ => None,
    }
}

fn additive_op(section: &Section) -> Option<BinOp> {
    match &section.as_atom()?.token {
        Token::Plus => Some(BinOp::Add),
        Token::Minus => Some(BinOp::Sub),
        _ => None,
    }
}

fn multiplicative_op(section: &Section) -> Option<BinOp> {
    match &section.as_atom()?.token {
        Token::Star => Some(BinOp::Mul),
        Token::Slash => Some(BinOp::Div),
        Token::Percent => Some(BinOp::Rem),
        _ => None,
    }
}

fn unary_op(section: &Section) -> Option<(UnOp, Span)> {
    let token = section.as_atom()?;
    match token.token {
        Token::Minus => Some((UnOp::Neg, token.span)),
        Token::Bang => Some((UnOp::Not, token.span)),
        _ => None,
    }
}

fn binary(op: BinOp, lhs: Spanned<Expr>, rhs: Spanned<Expr>) -> Spanned<Expr> {
    let span = lhs.span.merge(rhs.span);
    Spanned::new(
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        },
        span,
    )
}

// === Precedence cascade ===

/// The full expression grammar.
pub(crate) fn expression(input: SCursor) -> ExprStep {
    alt(if_expression, logical)(input)
}

/// `if cond then e1 else e2`; in expression position both branches are
/// required.
fn if_expression(input: SCursor) -> ExprStep {
    let (rest, keyword) = next_if(token_span(Token::If))(input);
    let if_span = match keyword {
        Outcome::Ok(span) => span,
        _ => return (input, Outcome::Unbound),
    };

    // Committed: misses below carry consumption and are named by the
    // enclosing context.
    let (rest, cond_out) = expression(rest);
    let cond = match cond_out {
        Outcome::Ok(cond) => cond,
        Outcome::Unbound => return (rest, Outcome::Unbound),
        Outcome::Err(errs) => return (rest, Outcome::Err(errs)),
    };

    let (rest, then_kw) = next_if(token_span(Token::Then))(rest);
    if !then_kw.is_ok() {
        return (rest, Outcome::Unbound);
    }
    let (rest, then_out) = expression(rest);
    let then = match then_out {
        Outcome::Ok(then) => then,
        Outcome::Unbound => return (rest, Outcome::Unbound),
        Outcome::Err(errs) => return (rest, Outcome::Err(errs)),
    };

    let (rest, else_kw) = next_if(token_span(Token::Else))(rest);
    if !else_kw.is_ok() {
        return (rest, Outcome::Unbound);
    }
    let (rest, else_out) = expression(rest);
    match else_out {
        Outcome::Ok(else_) => {
            let span = if_span.merge(else_.span);
            (
                rest,
                Outcome::Ok(Spanned::new(
                    Expr::If {
                        cond: Box::new(cond),
                        then: Box::new(then),
                        else_: Box::new(else_),
                    },
                    span,
                )),
            )
        }
        Outcome::Unbound => (rest, Outcome::Unbound),
        Outcome::Err(errs) => (rest, Outcome::Err(errs)),
    }
}

fn logical(input: SCursor) -> ExprStep {
    left_assoc(input, equality, logical_op)
}

fn equality(input: SCursor) -> ExprStep {
    non_assoc(input, comparison, equality_op)
}

fn comparison(input: SCursor) -> ExprStep {
    non_assoc(input, additive, comparison_op)
}

fn additive(input: SCursor) -> ExprStep {
    left_assoc(input, multiplicative, additive_op)
}

fn multiplicative(input: SCursor) -> ExprStep {
    left_assoc(input, unary, multiplicative_op)
}

/// Left fold over greedily consumed `(op, rhs)` pairs. An operator
/// with no right operand is a committed failure: the repetition
/// consumed the operator, so it does not fall back.
fn left_assoc<'a>(
    input: SCursor<'a>,
    operand: fn(SCursor<'a>) -> ExprStep<'a>,
    classify: fn(&Section) -> Option<BinOp>,
) -> ExprStep<'a> {
    let (rest, first) = operand(input);
    let lhs = match first {
        Outcome::Ok(lhs) => lhs,
        other => return (rest, other),
    };
    let (rest, pairs) = zero_or_more(seq(next_if(classify), operand))(rest);
    match pairs {
        Outcome::Ok(pairs) => {
            let folded = pairs
                .into_iter()
                .fold(lhs, |acc, (op, rhs)| binary(op, acc, rhs));
            (rest, Outcome::Ok(folded))
        }
        Outcome::Unbound => (rest, Outcome::Unbound),
        Outcome::Err(errs) => (rest, Outcome::Err(errs)),
    }
}

/// At most one `(op, rhs)` pair; `a == b == c` does not parse.
fn non_assoc<'a>(
    input: SCursor<'a>,
    operand: fn(SCursor<'a>) -> ExprStep<'a>,
    classify: fn(&Section) -> Option<BinOp>,
) -> ExprStep<'a> {
    let (rest, first) = operand(input);
    let lhs = match first {
        Outcome::Ok(lhs) => lhs,
        other => return (rest, other),
    };
    let (rest, pair) = zero_or_one(seq(next_if(classify), operand))(rest);
    match pair {
        Outcome::Ok(Some((op, rhs))) => (rest, Outcome::Ok(binary(op, lhs, rhs))),
        Outcome::Ok(None) => (rest, Outcome::Ok(lhs)),
        Outcome::Unbound => (rest, Outcome::Unbound),
        Outcome::Err(errs) => (rest, Outcome::Err(errs)),
    }
}

/// Prefix operators, right-nested: the textually leftmost operator is
/// outermost.
fn unary(input: SCursor) -> ExprStep {
    let (rest, ops_out) = zero_or_more(next_if(unary_op))(input);
    let ops = match ops_out {
        Outcome::Ok(ops) => ops,
        Outcome::Unbound => return (rest, Outcome::Unbound),
        Outcome::Err(errs) => return (rest, Outcome::Err(errs)),
    };
    let (rest, primary_out) = primary(rest);
    match primary_out {
        Outcome::Ok(mut operand) => {
            for (op, op_span) in ops.into_iter().rev() {
                let span = op_span.merge(operand.span);
                operand = Spanned::new(
                    Expr::Unary {
                        op,
                        operand: Box::new(operand),
                    },
                    span,
                );
            }
            (rest, Outcome::Ok(operand))
        }
        other => (rest, other),
    }
}

// === Primaries ===

fn literal_or_var(section: &Section) -> Option<Spanned<Expr>> {
    let token = section.as_atom()?;
    let node = match &token.token {
        Token::Int(n) => Expr::Int(*n),
        Token::Double(n) => Expr::Double(*n),
        Token::True => Expr::Bool(true),
        Token::False => Expr::Bool(false),
        Token::Char(c) => Expr::Char(*c),
        Token::Str(s) => Expr::Str(s.clone()),
        Token::Ident(name) => Expr::Var(name.clone()),
        _ => return None,
    };
    Some(Spanned::new(node, token.span))
}

fn primary(input: SCursor) -> ExprStep {
    let (mut rest, base_out) = alt(
        alt(next_if(literal_or_var), paren_expression),
        function_literal,
    )(input);
    let mut base = match base_out {
        Outcome::Ok(base) => base,
        other => return (rest, other),
    };

    // Postfix: a bracket group after any primary is a call.
    while let Some((
        Section::Group {
            delim: Delim::Bracket,
            span: args_span,
            children,
        },
        tail,
    )) = rest.split_first()
    {
        match call_arguments(children, *args_span) {
            Ok(args) => {
                let span = base.span.merge(*args_span);
                base = Spanned::new(
                    Expr::Call {
                        callee: Box::new(base),
                        args,
                    },
                    span,
                );
                rest = tail;
            }
            Err(errs) => return (tail, Outcome::Err(errs)),
        }
    }

    (rest, Outcome::Ok(base))
}

/// A paren group parsed as a single expression. No dedicated AST node:
/// the inner expression is re-spanned to the group.
fn paren_expression(input: SCursor) -> ExprStep {
    let Some((
        Section::Group {
            delim: Delim::Paren,
            span,
            children,
        },
        rest,
    )) = input.split_first()
    else {
        return (input, Outcome::Unbound);
    };
    let outcome = catch_unbound(run_to_end(expression, children), || {
        ParseDiagnostic::ExpectedExpressionInParens { parens: *span }
    });
    (rest, outcome.map(|inner| Spanned::new(inner.node, *span)))
}

/// `[params]: RetType -> expr` or `[params]: RetType { stmts }`.
///
/// A leading bracket group commits to a function literal; shape
/// violations past that point are hard errors.
pub(crate) fn function_literal(input: SCursor) -> ExprStep {
    let Some((
        Section::Group {
            delim: Delim::Bracket,
            span: params_span,
            children,
        },
        rest,
    )) = input.split_first()
    else {
        return (input, Outcome::Unbound);
    };
    let params = match parameters(children, *params_span) {
        Ok(params) => params,
        Err(errs) => return (rest, Outcome::Err(errs)),
    };

    let (rest, colon) = next_if(token_span(Token::Colon))(rest);
    if !colon.is_ok() {
        return (
            rest,
            Outcome::Err(vec![ParseDiagnostic::FuncLiteralMalformed {
                literal: *params_span,
            }]),
        );
    }
    let (rest, ret_out) = type_expr(rest);
    let ret = match ret_out {
        Outcome::Ok(ret) => ret,
        Outcome::Err(errs) => return (rest, Outcome::Err(errs)),
        Outcome::Unbound => {
            return (
                rest,
                Outcome::Err(vec![ParseDiagnostic::FuncLiteralMalformed {
                    literal: *params_span,
                }]),
            )
        }
    };

    // `-> expr` body
    let (after_arrow, arrow) = next_if(token_span(Token::Arrow))(rest);
    if arrow.is_ok() {
        let (after_body, body_out) = expression(after_arrow);
        return match body_out {
            Outcome::Ok(body) => {
                let span = params_span.merge(body.span);
                (
                    after_body,
                    Outcome::Ok(Spanned::new(
                        Expr::Func {
                            params,
                            ret,
                            body: FuncBody::Expr(Box::new(body)),
                        },
                        span,
                    )),
                )
            }
            Outcome::Unbound => (
                after_body,
                Outcome::Err(vec![ParseDiagnostic::FuncLiteralMalformed {
                    literal: params_span.merge(ret.span),
                }]),
            ),
            Outcome::Err(errs) => (after_body, Outcome::Err(errs)),
        };
    }

    // `{ stmts }` body
    if let Some((
        Section::Group {
            delim: Delim::Brace,
            span: body_span,
            children,
        },
        tail,
    )) = rest.split_first()
    {
        let (stmts, diagnostics) = parse_block(children);
        if !diagnostics.is_empty() {
            return (tail, Outcome::Err(diagnostics));
        }
        let span = params_span.merge(*body_span);
        return (
            tail,
            Outcome::Ok(Spanned::new(
                Expr::Func {
                    params,
                    ret,
                    body: FuncBody::Block(stmts),
                },
                span,
            )),
        );
    }

    (
        rest,
        Outcome::Err(vec![ParseDiagnostic::FuncLiteralMalformed {
            literal: params_span.merge(ret.span),
        }]),
    )
}

fn parameters(children: &[Section], params_span: Span) -> Result<Vec<Param>, Vec<ParseDiagnostic>> {
    if children.is_empty() {
        return Ok(Vec::new());
    }
    ensure_bound(
        catch_unbound(run_to_end(comma_separated(parameter), children), || {
            ParseDiagnostic::InvalidFunctionParameters {
                params: params_span,
            }
        }),
        params_span,
    )
}

/// One `name : type` entry.
fn parameter(input: SCursor) -> Step<'_, Section, Param> {
    let (rest, name_out) = next_if(ident)(input);
    let name = match name_out {
        Outcome::Ok(name) => name,
        _ => return (input, Outcome::Unbound),
    };
    let (rest, colon) = next_if(token_span(Token::Colon))(rest);
    if !colon.is_ok() {
        return (rest, Outcome::Unbound);
    }
    let (rest, ty_out) = type_expr(rest);
    match ty_out {
        Outcome::Ok(ty) => (rest, Outcome::Ok(Param { name, ty })),
        Outcome::Unbound => (rest, Outcome::Unbound),
        Outcome::Err(errs) => (rest, Outcome::Err(errs)),
    }
}

fn call_arguments(
    children: &[Section],
    args_span: Span,
) -> Result<Vec<Spanned<Expr>>, Vec<ParseDiagnostic>> {
    if children.is_empty() {
        return Ok(Vec::new());
    }
    ensure_bound(
        catch_unbound(run_to_end(comma_separated(expression), children), || {
            ParseDiagnostic::InvalidCallArguments { args: args_span }
        }),
        args_span,
    )
}

/// `item (, item)*`, at least one item; a miss after a comma is a
/// committed failure.
fn comma_separated<'a, V>(
    item: fn(SCursor<'a>) -> Step<'a, Section, V>,
) -> impl Fn(SCursor<'a>) -> Step<'a, Section, Vec<V>> {
    move |input| {
        let (mut rest, first) = item(input);
        let first = match first {
            Outcome::Ok(first) => first,
            Outcome::Unbound => return (rest, Outcome::Unbound),
            Outcome::Err(errs) => return (rest, Outcome::Err(errs)),
        };
        let mut items = vec![first];
        loop {
            let (after_comma, comma) = next_if(token_span(Token::Comma))(rest);
            if !comma.is_ok() {
                break;
            }
            let (after_item, out) = item(after_comma);
            match out {
                Outcome::Ok(value) => {
                    items.push(value);
                    rest = after_item;
                }
                Outcome::Unbound => return (after_item, Outcome::Unbound),
                Outcome::Err(errs) => return (after_item, Outcome::Err(errs)),
            }
        }
        (rest, Outcome::Ok(items))
    }
}

/// A type: a named type, or a function type `[T1, T2] -> T`.
pub(crate) fn type_expr(input: SCursor) -> Step<'_, Section, Spanned<Type>> {
    let (rest, named) = next_if(type_name)(input);
    if let Outcome::Ok(ty) = named {
        return (rest, Outcome::Ok(ty));
    }

    let Some((
        Section::Group {
            delim: Delim::Bracket,
            span,
            children,
        },
        rest,
    )) = input.split_first()
    else {
        return (input, Outcome::Unbound);
    };
    let params = if children.is_empty() {
        Vec::new()
    } else {
        match run_to_end(comma_separated(type_expr), children) {
            Outcome::Ok(params) => params,
            Outcome::Unbound => return (rest, Outcome::Unbound),
            Outcome::Err(errs) => return (rest, Outcome::Err(errs)),
        }
    };
    let (rest, arrow) = next_if(token_span(Token::Arrow))(rest);
    if !arrow.is_ok() {
        return (rest, Outcome::Unbound);
    }
    let (rest, ret_out) = type_expr(rest);
    match ret_out {
        Outcome::Ok(ret) => {
            let full = span.merge(ret.span);
            (
                rest,
                Outcome::Ok(Spanned::new(
                    Type::Func {
                        params,
                        ret: Box::new(ret),
                    },
                    full,
                )),
            )
        }
        Outcome::Unbound => (rest, Outcome::Unbound),
        Outcome::Err(errs) => (rest, Outcome::Err(errs)),
    }
}

fn type_name(section: &Section) -> Option<Spanned<Type>> {
    let token = section.as_atom()?;
    match &token.token {
        Token::Ident(name) => Some(Spanned::new(Type::Named(name.clone()), token.span)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::section;
    use pretty_assertions::assert_eq;
    use quill_lexer::tokenize;

    fn parse_expression(source: &str) -> Spanned<Expr> {
        let (sections, diagnostics) = section(tokenize(source).expect("lexes"));
        assert!(diagnostics.is_empty(), "sectioning: {diagnostics:?}");
        match run_to_end(expression, &sections) {
            Outcome::Ok(expr) => expr,
            other => unreachable!("expected a full parse of {source:?}, got {other:?}"),
        }
    }

    fn expression_outcome(source: &str) -> Outcome<Spanned<Expr>> {
        let (sections, diagnostics) = section(tokenize(source).expect("lexes"));
        assert!(diagnostics.is_empty(), "sectioning: {diagnostics:?}");
        run_to_end(expression, &sections)
    }

    /// Structural equality ignoring spans.
    fn same_shape(a: &Expr, b: &Expr) -> bool {
        match (a, b) {
            (
                Expr::Binary {
                    op: ao,
                    lhs: al,
                    rhs: ar,
                },
                Expr::Binary {
                    op: bo,
                    lhs: bl,
                    rhs: br,
                },
            ) => ao == bo && same_shape(&al.node, &bl.node) && same_shape(&ar.node, &br.node),
            (
                Expr::Unary {
                    op: ao,
                    operand: aa,
                },
                Expr::Unary {
                    op: bo,
                    operand: ba,
                },
            ) => ao == bo && same_shape(&aa.node, &ba.node),
            (
                Expr::Call {
                    callee: ac,
                    args: aa,
                },
                Expr::Call {
                    callee: bc,
                    args: ba,
                },
            ) => {
                same_shape(&ac.node, &bc.node)
                    && aa.len() == ba.len()
                    && aa
                        .iter()
                        .zip(ba)
                        .all(|(x, y)| same_shape(&x.node, &y.node))
            }
            _ => a == b,
        }
    }

    #[test]
    fn test_multiplication_binds_tighter_than_addition() {
        let expr = parse_expression("a + b * c");
        let Expr::Binary {
            op: BinOp::Add,
            lhs,
            rhs,
        } = &expr.node
        else {
            unreachable!("expected addition at the root, got {:?}", expr.node);
        };
        assert_eq!(lhs.node, Expr::Var("a".to_string()));
        assert!(matches!(
            rhs.node,
            Expr::Binary {
                op: BinOp::Mul,
                ..
            }
        ));

        let expr = parse_expression("a * b + c");
        let Expr::Binary {
            op: BinOp::Add,
            lhs,
            rhs,
        } = &expr.node
        else {
            unreachable!("expected addition at the root, got {:?}", expr.node);
        };
        assert!(matches!(
            lhs.node,
            Expr::Binary {
                op: BinOp::Mul,
                ..
            }
        ));
        assert_eq!(rhs.node, Expr::Var("c".to_string()));
    }

    #[test]
    fn test_logical_operators_fold_left() {
        let expr = parse_expression("a and b or c");
        let Expr::Binary {
            op: BinOp::Or,
            lhs,
            rhs,
        } = &expr.node
        else {
            unreachable!("expected `or` at the root, got {:?}", expr.node);
        };
        assert!(matches!(
            lhs.node,
            Expr::Binary {
                op: BinOp::And,
                ..
            }
        ));
        assert_eq!(rhs.node, Expr::Var("c".to_string()));
    }

    #[test]
    fn test_subtraction_folds_left() {
        let expr = parse_expression("a - b - c");
        let Expr::Binary {
            op: BinOp::Sub,
            lhs,
            ..
        } = &expr.node
        else {
            unreachable!("expected subtraction at the root, got {:?}", expr.node);
        };
        assert!(matches!(
            lhs.node,
            Expr::Binary {
                op: BinOp::Sub,
                ..
            }
        ));
    }

    #[test]
    fn test_unary_operators_nest_right() {
        let expr = parse_expression("-!x");
        let Expr::Unary {
            op: UnOp::Neg,
            operand,
        } = &expr.node
        else {
            unreachable!("expected negation outermost, got {:?}", expr.node);
        };
        let Expr::Unary {
            op: UnOp::Not,
            operand,
        } = &operand.node
        else {
            unreachable!("expected `!` inside `-`");
        };
        assert_eq!(operand.node, Expr::Var("x".to_string()));
    }

    #[test]
    fn test_equality_is_non_associative() {
        assert_eq!(expression_outcome("a == b == c"), Outcome::Unbound);
        assert_eq!(expression_outcome("a < b < c"), Outcome::Unbound);
        assert!(expression_outcome("a == b").is_ok());
    }

    #[test]
    fn test_comparison_mixes_with_equality_once_each() {
        let expr = parse_expression("a + 1 == b * 2");
        assert!(matches!(
            expr.node,
            Expr::Binary {
                op: BinOp::Eq,
                ..
            }
        ));
    }

    #[test]
    fn test_parenthesization_identity() {
        let plain = parse_expression("1 + 2 * 3");
        let wrapped = parse_expression("(1 + 2 * 3)");
        assert!(same_shape(&plain.node, &wrapped.node));
        assert_eq!(wrapped.span.start.offset, 0);
        assert_eq!(wrapped.span.end.offset, 11);
    }

    #[test]
    fn test_parens_override_precedence() {
        let expr = parse_expression("(a + b) * c");
        let Expr::Binary {
            op: BinOp::Mul,
            lhs,
            ..
        } = &expr.node
        else {
            unreachable!("expected multiplication at the root, got {:?}", expr.node);
        };
        assert!(matches!(
            lhs.node,
            Expr::Binary {
                op: BinOp::Add,
                ..
            }
        ));
    }

    #[test]
    fn test_binary_span_covers_operands() {
        let expr = parse_expression("ab + cd");
        assert_eq!(expr.span.start.offset, 0);
        assert_eq!(expr.span.end.offset, 7);
    }

    #[test]
    fn test_literals() {
        assert_eq!(parse_expression("42").node, Expr::Int(42));
        assert_eq!(parse_expression("2.5").node, Expr::Double(2.5));
        assert_eq!(parse_expression("true").node, Expr::Bool(true));
        assert_eq!(parse_expression("'q'").node, Expr::Char('q'));
        assert_eq!(
            parse_expression("\"hi\"").node,
            Expr::Str("hi".to_string())
        );
    }

    #[test]
    fn test_empty_parens_need_an_expression() {
        let errs = match expression_outcome("()") {
            Outcome::Err(errs) => errs,
            other => unreachable!("expected a diagnostic, got {other:?}"),
        };
        assert!(matches!(
            errs[0],
            ParseDiagnostic::ExpectedExpressionInParens { .. }
        ));
    }

    #[test]
    fn test_dangling_operator_in_parens() {
        let errs = match expression_outcome("(1 + )") {
            Outcome::Err(errs) => errs,
            other => unreachable!("expected a diagnostic, got {other:?}"),
        };
        assert_eq!(errs.len(), 1);
        let ParseDiagnostic::ExpectedExpressionInParens { parens } = &errs[0] else {
            unreachable!("expected the paren diagnostic, got {:?}", errs[0]);
        };
        assert_eq!(parens.start.offset, 0);
        assert_eq!(parens.end.offset, 6);
    }

    #[test]
    fn test_call_with_no_arguments() {
        let expr = parse_expression("foo[]");
        let Expr::Call { callee, args } = &expr.node else {
            unreachable!("expected a call, got {:?}", expr.node);
        };
        assert_eq!(callee.node, Expr::Var("foo".to_string()));
        assert!(args.is_empty());
    }

    #[test]
    fn test_call_arguments_and_chaining() {
        let expr = parse_expression("f[1, x + 2][3]");
        let Expr::Call { callee, args } = &expr.node else {
            unreachable!("expected the outer call, got {:?}", expr.node);
        };
        assert_eq!(args.len(), 1);
        let Expr::Call { callee, args } = &callee.node else {
            unreachable!("expected the inner call, got {:?}", callee.node);
        };
        assert_eq!(callee.node, Expr::Var("f".to_string()));
        assert_eq!(args.len(), 2);
        assert!(matches!(
            args[1].node,
            Expr::Binary {
                op: BinOp::Add,
                ..
            }
        ));
    }

    #[test]
    fn test_calls_bind_tighter_than_operators() {
        let expr = parse_expression("f[1] + g[2]");
        let Expr::Binary {
            op: BinOp::Add,
            lhs,
            rhs,
        } = &expr.node
        else {
            unreachable!("expected addition at the root, got {:?}", expr.node);
        };
        assert!(matches!(lhs.node, Expr::Call { .. }));
        assert!(matches!(rhs.node, Expr::Call { .. }));
    }

    #[test]
    fn test_function_literal_with_expression_body() {
        let expr = parse_expression("[x: Int, y: Int]: Int -> x - y * z");
        let Expr::Func { params, ret, body } = &expr.node else {
            unreachable!("expected a function literal, got {:?}", expr.node);
        };
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].name.node, "x");
        assert_eq!(params[1].name.node, "y");
        assert_eq!(ret.node, Type::Named("Int".to_string()));
        let FuncBody::Expr(body) = body else {
            unreachable!("expected an expression body");
        };
        let Expr::Binary {
            op: BinOp::Sub,
            rhs,
            ..
        } = &body.node
        else {
            unreachable!("expected subtraction at the body root, got {:?}", body.node);
        };
        assert!(matches!(
            rhs.node,
            Expr::Binary {
                op: BinOp::Mul,
                ..
            }
        ));
    }

    #[test]
    fn test_function_literal_with_no_parameters() {
        let expr = parse_expression("[]: Int -> 5");
        let Expr::Func { params, body, .. } = &expr.node else {
            unreachable!("expected a function literal, got {:?}", expr.node);
        };
        assert!(params.is_empty());
        let FuncBody::Expr(body) = body else {
            unreachable!("expected an expression body");
        };
        assert_eq!(body.node, Expr::Int(5));
    }

    #[test]
    fn test_function_literal_with_block_body() {
        let expr = parse_expression("[n: Int]: Int { return n + 1; }");
        let Expr::Func { body, .. } = &expr.node else {
            unreachable!("expected a function literal, got {:?}", expr.node);
        };
        let FuncBody::Block(stmts) = body else {
            unreachable!("expected a block body");
        };
        assert_eq!(stmts.len(), 1);
        assert!(matches!(stmts[0].node, quill_ast::Stmt::Return(Some(_))));
    }

    #[test]
    fn test_function_literal_missing_return_type() {
        let errs = match expression_outcome("[x: Int] -> x") {
            Outcome::Err(errs) => errs,
            other => unreachable!("expected a diagnostic, got {other:?}"),
        };
        assert!(matches!(
            errs[0],
            ParseDiagnostic::FuncLiteralMalformed { .. }
        ));
    }

    #[test]
    fn test_function_literal_bad_parameters() {
        let errs = match expression_outcome("[1 + 2]: Int -> 0") {
            Outcome::Err(errs) => errs,
            other => unreachable!("expected a diagnostic, got {other:?}"),
        };
        assert!(matches!(
            errs[0],
            ParseDiagnostic::InvalidFunctionParameters { .. }
        ));
    }

    #[test]
    fn test_function_type_annotation() {
        let expr = parse_expression("[f: [Int] -> Int, x: Int]: Int -> f[x]");
        let Expr::Func { params, .. } = &expr.node else {
            unreachable!("expected a function literal, got {:?}", expr.node);
        };
        let Type::Func {
            params: arg_types,
            ret,
        } = &params[0].ty.node
        else {
            unreachable!("expected a function type, got {:?}", params[0].ty.node);
        };
        assert_eq!(arg_types.len(), 1);
        assert_eq!(ret.node, Type::Named("Int".to_string()));
    }

    #[test]
    fn test_if_expression() {
        let expr = parse_expression("if a < b then a else b");
        let Expr::If { cond, then, else_ } = &expr.node else {
            unreachable!("expected an if-expression, got {:?}", expr.node);
        };
        assert!(matches!(
            cond.node,
            Expr::Binary {
                op: BinOp::Lt,
                ..
            }
        ));
        assert_eq!(then.node, Expr::Var("a".to_string()));
        assert_eq!(else_.node, Expr::Var("b".to_string()));
    }

    #[test]
    fn test_if_expression_requires_else() {
        assert!(!expression_outcome("if a then b").is_ok());
    }

    #[test]
    fn test_call_on_parenthesized_literal() {
        let expr = parse_expression("([n: Int]: Int -> n * 2)[21]");
        let Expr::Call { callee, args } = &expr.node else {
            unreachable!("expected a call, got {:?}", expr.node);
        };
        assert!(matches!(callee.node, Expr::Func { .. }));
        assert_eq!(args.len(), 1);
    }
}
