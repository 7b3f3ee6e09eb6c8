//! Statement parsing: section runs → statements.
//!
//! A run of sibling sections is split at top-level `;` atoms into
//! statement groups; the first section of each group selects the form.
//! Groups parse independently so a file with several malformed
//! statements reports all of them in one pass.

use crate::combinator::{catch_unbound, ensure_bound, next_if, run_to_end, Outcome};
use crate::expr::{expression, function_literal, ident, token_span, type_expr};
use crate::section::{group_span, Delim, Section};
use crate::ParseDiagnostic;
use quill_ast::{Module, Span, Spanned, Stmt};
use quill_lexer::Token;

/// Parse a sectioned file into a module plus accumulated diagnostics.
///
/// The module is best-effort: statements that parsed survive even when
/// siblings did not. Check the diagnostics before trusting semantics.
pub fn parse_sections(sections: &[Section]) -> (Module, Vec<ParseDiagnostic>) {
    let (stmts, diagnostics) = parse_block(sections);
    (Module { stmts }, diagnostics)
}

/// Split at top-level `;` atoms and parse each group, accumulating
/// sibling errors instead of halting at the first.
pub(crate) fn parse_block(sections: &[Section]) -> (Vec<Spanned<Stmt>>, Vec<ParseDiagnostic>) {
    let mut stmts = Vec::new();
    let mut diagnostics = Vec::new();
    let mut start = 0;

    for (i, s) in sections.iter().enumerate() {
        if !matches!(s.as_atom().map(|t| &t.token), Some(Token::Semi)) {
            continue;
        }
        let group = &sections[start..i];
        if group.is_empty() {
            diagnostics.push(ParseDiagnostic::EmptyStatement { semi: s.span() });
        } else {
            match statement(group) {
                Ok(stmt) => stmts.push(stmt),
                Err(errs) => diagnostics.extend(errs),
            }
        }
        start = i + 1;
    }

    // A non-empty trailing group is missing its `;` but still
    // contributes a best-effort statement.
    let trailing = &sections[start..];
    if !trailing.is_empty() {
        diagnostics.push(ParseDiagnostic::ExpectedSemicolon {
            stmt: group_span(trailing),
        });
        match statement(trailing) {
            Ok(stmt) => stmts.push(stmt),
            Err(errs) => diagnostics.extend(errs),
        }
    }

    (stmts, diagnostics)
}

/// Parse one non-empty statement group.
fn statement(group: &[Section]) -> Result<Spanned<Stmt>, Vec<ParseDiagnostic>> {
    let span = group_span(group);
    ensure_bound(statement_body(group), span)
}

fn statement_body(group: &[Section]) -> Outcome<Spanned<Stmt>> {
    let span = group_span(group);
    let Some((first, tail)) = group.split_first() else {
        // Callers never pass an empty group.
        return Outcome::Unbound;
    };

    if let Some(token) = first.as_atom() {
        match token.token {
            Token::Print => return print_statement(token.span, tail, span),
            Token::Let => return let_statement(tail, span),
            Token::Mut => return assign_statement(tail, span),
            Token::Func => return func_statement(tail, span),
            Token::Return => return return_statement(tail, span),
            Token::If => return if_statement(tail, span),
            _ => {}
        }
    }

    // A lone brace group is a nested scope.
    if tail.is_empty() {
        if let Section::Group {
            delim: Delim::Brace,
            children,
            ..
        } = first
        {
            let (stmts, diagnostics) = parse_block(children);
            if !diagnostics.is_empty() {
                return Outcome::Err(diagnostics);
            }
            return Outcome::Ok(Spanned::new(Stmt::Block(stmts), span));
        }
    }

    // Bare expression evaluated for effect.
    let value = catch_unbound(run_to_end(expression, group), || {
        ParseDiagnostic::UnrecognizedStatement { stmt: span }
    });
    value.map(|expr| Spanned::new(Stmt::Expr(Box::new(expr)), span))
}

fn print_statement(keyword: Span, tail: &[Section], span: Span) -> Outcome<Spanned<Stmt>> {
    if tail.is_empty() {
        return Outcome::Err(vec![ParseDiagnostic::PrintMissingExpression { keyword }]);
    }
    let value = catch_unbound(run_to_end(expression, tail), || {
        ParseDiagnostic::PrintInvalidExpression {
            expr: group_span(tail),
        }
    });
    value.map(|expr| Spanned::new(Stmt::Print(Box::new(expr)), span))
}

/// `let IDENT = EXPR` or `let IDENT : TYPE = EXPR`.
fn let_statement(tail: &[Section], span: Span) -> Outcome<Spanned<Stmt>> {
    let (rest, name_out) = next_if(ident)(tail);
    let name = match name_out {
        Outcome::Ok(name) => name,
        _ => return Outcome::Err(vec![ParseDiagnostic::LetMalformed { stmt: span }]),
    };

    let (rest, colon) = next_if(token_span(Token::Colon))(rest);
    let (rest, ty) = if colon.is_ok() {
        let (rest, ty_out) = type_expr(rest);
        match ty_out {
            Outcome::Ok(ty) => (rest, Some(ty)),
            Outcome::Err(errs) => return Outcome::Err(errs),
            Outcome::Unbound => {
                return Outcome::Err(vec![ParseDiagnostic::LetMalformed { stmt: span }])
            }
        }
    } else {
        (rest, None)
    };

    let (rest, eq) = next_if(token_span(Token::Eq))(rest);
    let eq_span = match eq {
        Outcome::Ok(eq_span) => eq_span,
        _ => return Outcome::Err(vec![ParseDiagnostic::LetMalformed { stmt: span }]),
    };

    if rest.is_empty() {
        return Outcome::Err(vec![ParseDiagnostic::LetMissingExpression {
            decl: Span::new(span.start, eq_span.end),
        }]);
    }
    let value = catch_unbound(run_to_end(expression, rest), || {
        ParseDiagnostic::LetInvalidExpression {
            expr: group_span(rest),
        }
    });
    value.map(|value| {
        Spanned::new(
            Stmt::Let {
                name,
                ty,
                value: Box::new(value),
            },
            span,
        )
    })
}

/// `mut IDENT = EXPR`.
fn assign_statement(tail: &[Section], span: Span) -> Outcome<Spanned<Stmt>> {
    let (rest, name_out) = next_if(ident)(tail);
    let name = match name_out {
        Outcome::Ok(name) => name,
        _ => return Outcome::Err(vec![ParseDiagnostic::AssignMalformed { stmt: span }]),
    };
    let (rest, eq) = next_if(token_span(Token::Eq))(rest);
    let eq_span = match eq {
        Outcome::Ok(eq_span) => eq_span,
        _ => return Outcome::Err(vec![ParseDiagnostic::AssignMalformed { stmt: span }]),
    };
    if rest.is_empty() {
        return Outcome::Err(vec![ParseDiagnostic::AssignMissingExpression {
            decl: Span::new(span.start, eq_span.end),
        }]);
    }
    let value = catch_unbound(run_to_end(expression, rest), || {
        ParseDiagnostic::AssignInvalidExpression {
            expr: group_span(rest),
        }
    });
    value.map(|value| {
        Spanned::new(
            Stmt::Assign {
                name,
                value: Box::new(value),
            },
            span,
        )
    })
}

/// `func IDENT = FUNC_LITERAL`.
fn func_statement(tail: &[Section], span: Span) -> Outcome<Spanned<Stmt>> {
    let (rest, name_out) = next_if(ident)(tail);
    let name = match name_out {
        Outcome::Ok(name) => name,
        _ => return Outcome::Err(vec![ParseDiagnostic::FuncMalformed { stmt: span }]),
    };
    let (rest, eq) = next_if(token_span(Token::Eq))(rest);
    let eq_span = match eq {
        Outcome::Ok(eq_span) => eq_span,
        _ => return Outcome::Err(vec![ParseDiagnostic::FuncMalformed { stmt: span }]),
    };
    if rest.is_empty() {
        return Outcome::Err(vec![ParseDiagnostic::FuncInvalidLiteral {
            expr: Span::new(span.start, eq_span.end),
        }]);
    }
    let literal = catch_unbound(run_to_end(function_literal, rest), || {
        ParseDiagnostic::FuncInvalidLiteral {
            expr: group_span(rest),
        }
    });
    literal.map(|literal| {
        Spanned::new(
            Stmt::Func {
                name,
                literal: Box::new(literal),
            },
            span,
        )
    })
}

fn return_statement(tail: &[Section], span: Span) -> Outcome<Spanned<Stmt>> {
    if tail.is_empty() {
        return Outcome::Ok(Spanned::new(Stmt::Return(None), span));
    }
    let value = catch_unbound(run_to_end(expression, tail), || {
        ParseDiagnostic::ReturnInvalidExpression {
            expr: group_span(tail),
        }
    });
    value.map(|expr| Spanned::new(Stmt::Return(Some(Box::new(expr))), span))
}

/// `if EXPR then BRANCH` with an optional `else BRANCH`.
///
/// The branch runs to this `if`'s own `else`: an `else` atom pairs
/// with the innermost unmatched `if` before it, so nested ifs in a
/// branch keep their `else` without needing braces.
fn if_statement(tail: &[Section], span: Span) -> Outcome<Spanned<Stmt>> {
    if tail.is_empty() {
        return Outcome::Err(vec![ParseDiagnostic::IfMalformed { stmt: span }]);
    }
    let (rest, cond_out) = expression(tail);
    let cond = match cond_out {
        Outcome::Ok(cond) => cond,
        Outcome::Err(errs) => return Outcome::Err(errs),
        Outcome::Unbound => {
            return Outcome::Err(vec![ParseDiagnostic::IfInvalidCondition {
                expr: condition_region(tail),
            }])
        }
    };

    let (rest, then_kw) = next_if(token_span(Token::Then))(rest);
    if !then_kw.is_ok() {
        return Outcome::Err(vec![ParseDiagnostic::IfMalformed { stmt: span }]);
    }

    let (then_sections, else_sections) = match branch_else(rest) {
        Some(i) => (&rest[..i], Some(&rest[i + 1..])),
        None => (rest, None),
    };

    if then_sections.is_empty() {
        return Outcome::Err(vec![ParseDiagnostic::IfMalformed { stmt: span }]);
    }
    let then = match statement(then_sections) {
        Ok(then) => then,
        Err(errs) => return Outcome::Err(errs),
    };

    let else_ = match else_sections {
        Some(sections) => {
            if sections.is_empty() {
                return Outcome::Err(vec![ParseDiagnostic::IfMalformed { stmt: span }]);
            }
            match statement(sections) {
                Ok(stmt) => Some(Box::new(stmt)),
                Err(errs) => return Outcome::Err(errs),
            }
        }
        None => None,
    };

    Outcome::Ok(Spanned::new(
        Stmt::If {
            cond: Box::new(cond),
            then: Box::new(then),
            else_,
        },
        span,
    ))
}

/// Index of the `else` belonging to the branch's own `if`, skipping
/// the ones consumed by nested `if`s at the top level of the branch.
fn branch_else(sections: &[Section]) -> Option<usize> {
    let mut pending = 0usize;
    for (i, s) in sections.iter().enumerate() {
        match s.as_atom().map(|t| &t.token) {
            Some(Token::If) => pending += 1,
            Some(Token::Else) => {
                if pending == 0 {
                    return Some(i);
                }
                pending -= 1;
            }
            _ => {}
        }
    }
    None
}

/// Everything between `if` and its `then` (or the whole tail when the
/// `then` is missing too).
fn condition_region(tail: &[Section]) -> Span {
    let upto = tail
        .iter()
        .position(|s| matches!(s.as_atom().map(|t| &t.token), Some(Token::Then)))
        .unwrap_or(tail.len());
    if upto == 0 {
        group_span(tail)
    } else {
        group_span(&tail[..upto])
    }
}
