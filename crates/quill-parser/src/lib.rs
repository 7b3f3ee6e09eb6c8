//! Quill Parser
//!
//! The front-end pipeline from source text to a parsed module:
//! tokens are promoted into a tree of bracket-matched sections, and a
//! recursive descent parser over sections produces statements and
//! expressions. Both layers share the combinator substrate in
//! [`combinator`], which threads a cursor through composable parsers
//! while collecting structured diagnostics instead of aborting at the
//! first failure: a file with several independent syntax errors
//! reports all of them in one pass, alongside a best-effort tree.

pub mod combinator;
mod expr;
pub mod section;
mod stmt;

use quill_ast::{Module, Span};
use quill_lexer::{LexError, SpannedToken};
use std::fmt;
use thiserror::Error;

pub use section::{section, Delim, Section};
pub use stmt::parse_sections;

/// Structured parse error.
///
/// Every kind carries the spans needed to highlight the offending
/// region. Diagnostics are delivered alongside (not instead of) a
/// best-effort parse tree; downstream passes must check the batch
/// before trusting tree semantics.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseDiagnostic {
    #[error("mismatched bracket: closer does not match the most recent opener")]
    MismatchedBracket { opener: Span, closer: Span },
    #[error("unclosed bracket")]
    UnclosedBracket { opener: Span },
    #[error("closing bracket with no matching opener")]
    UnmatchedCloser { closer: Span },
    #[error("expected statement to end with `;`")]
    ExpectedSemicolon { stmt: Span },
    #[error("empty statement")]
    EmptyStatement { semi: Span },
    #[error("`print` requires an expression")]
    PrintMissingExpression { keyword: Span },
    #[error("invalid expression after `print`")]
    PrintInvalidExpression { expr: Span },
    #[error("malformed variable declaration, expected `let <name> = <expression>`")]
    LetMalformed { stmt: Span },
    #[error("variable declaration requires an expression")]
    LetMissingExpression { decl: Span },
    #[error("invalid expression in variable declaration")]
    LetInvalidExpression { expr: Span },
    #[error("malformed assignment, expected `mut <name> = <expression>`")]
    AssignMalformed { stmt: Span },
    #[error("assignment requires an expression")]
    AssignMissingExpression { decl: Span },
    #[error("invalid expression in assignment")]
    AssignInvalidExpression { expr: Span },
    #[error("malformed function declaration, expected `func <name> = <function literal>`")]
    FuncMalformed { stmt: Span },
    #[error("expected a function literal in function declaration")]
    FuncInvalidLiteral { expr: Span },
    #[error("invalid expression after `return`")]
    ReturnInvalidExpression { expr: Span },
    #[error("malformed `if`, expected `if <condition> then <statement>`")]
    IfMalformed { stmt: Span },
    #[error("invalid condition in `if`")]
    IfInvalidCondition { expr: Span },
    #[error("expected an expression inside parentheses")]
    ExpectedExpressionInParens { parens: Span },
    #[error("malformed function literal, expected `[<params>]: <type> -> <expression>`")]
    FuncLiteralMalformed { literal: Span },
    #[error("invalid function literal parameters, expected `<name>: <type>` entries")]
    InvalidFunctionParameters { params: Span },
    #[error("invalid call arguments")]
    InvalidCallArguments { args: Span },
    #[error("unrecognized statement")]
    UnrecognizedStatement { stmt: Span },
    #[error("internal parser error: {message}")]
    Internal { span: Span, message: String },
}

impl ParseDiagnostic {
    /// Stable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            ParseDiagnostic::MismatchedBracket { .. } => "P001",
            ParseDiagnostic::UnclosedBracket { .. } => "P002",
            ParseDiagnostic::UnmatchedCloser { .. } => "P003",
            ParseDiagnostic::ExpectedSemicolon { .. } => "P004",
            ParseDiagnostic::EmptyStatement { .. } => "P005",
            ParseDiagnostic::PrintMissingExpression { .. } => "P006",
            ParseDiagnostic::PrintInvalidExpression { .. } => "P007",
            ParseDiagnostic::LetMalformed { .. } => "P008",
            ParseDiagnostic::LetMissingExpression { .. } => "P009",
            ParseDiagnostic::LetInvalidExpression { .. } => "P010",
            ParseDiagnostic::AssignMalformed { .. } => "P011",
            ParseDiagnostic::AssignMissingExpression { .. } => "P012",
            ParseDiagnostic::AssignInvalidExpression { .. } => "P013",
            ParseDiagnostic::FuncMalformed { .. } => "P014",
            ParseDiagnostic::FuncInvalidLiteral { .. } => "P015",
            ParseDiagnostic::ReturnInvalidExpression { .. } => "P016",
            ParseDiagnostic::IfMalformed { .. } => "P017",
            ParseDiagnostic::IfInvalidCondition { .. } => "P018",
            ParseDiagnostic::ExpectedExpressionInParens { .. } => "P019",
            ParseDiagnostic::FuncLiteralMalformed { .. } => "P020",
            ParseDiagnostic::InvalidFunctionParameters { .. } => "P021",
            ParseDiagnostic::InvalidCallArguments { .. } => "P022",
            ParseDiagnostic::UnrecognizedStatement { .. } => "P023",
            ParseDiagnostic::Internal { .. } => "P024",
        }
    }

    /// The span a renderer should point at first.
    pub fn primary_span(&self) -> Span {
        match self {
            ParseDiagnostic::MismatchedBracket { closer, .. } => *closer,
            ParseDiagnostic::UnclosedBracket { opener } => *opener,
            ParseDiagnostic::UnmatchedCloser { closer } => *closer,
            ParseDiagnostic::ExpectedSemicolon { stmt } => *stmt,
            ParseDiagnostic::EmptyStatement { semi } => *semi,
            ParseDiagnostic::PrintMissingExpression { keyword } => *keyword,
            ParseDiagnostic::PrintInvalidExpression { expr } => *expr,
            ParseDiagnostic::LetMalformed { stmt } => *stmt,
            ParseDiagnostic::LetMissingExpression { decl } => *decl,
            ParseDiagnostic::LetInvalidExpression { expr } => *expr,
            ParseDiagnostic::AssignMalformed { stmt } => *stmt,
            ParseDiagnostic::AssignMissingExpression { decl } => *decl,
            ParseDiagnostic::AssignInvalidExpression { expr } => *expr,
            ParseDiagnostic::FuncMalformed { stmt } => *stmt,
            ParseDiagnostic::FuncInvalidLiteral { expr } => *expr,
            ParseDiagnostic::ReturnInvalidExpression { expr } => *expr,
            ParseDiagnostic::IfMalformed { stmt } => *stmt,
            ParseDiagnostic::IfInvalidCondition { expr } => *expr,
            ParseDiagnostic::ExpectedExpressionInParens { parens } => *parens,
            ParseDiagnostic::FuncLiteralMalformed { literal } => *literal,
            ParseDiagnostic::InvalidFunctionParameters { params } => *params,
            ParseDiagnostic::InvalidCallArguments { args } => *args,
            ParseDiagnostic::UnrecognizedStatement { stmt } => *stmt,
            ParseDiagnostic::Internal { span, .. } => *span,
        }
    }

    fn labeled_spans(&self) -> Vec<(Span, &'static str)> {
        match self {
            ParseDiagnostic::MismatchedBracket { opener, closer } => {
                vec![(*opener, "opened here"), (*closer, "closed here")]
            }
            ParseDiagnostic::UnclosedBracket { opener } => vec![(*opener, "opened here")],
            ParseDiagnostic::UnmatchedCloser { closer } => {
                vec![(*closer, "no matching opener")]
            }
            ParseDiagnostic::ExpectedSemicolon { stmt } => {
                vec![(*stmt, "expected `;` after this statement")]
            }
            ParseDiagnostic::EmptyStatement { semi } => vec![(*semi, "stray `;`")],
            ParseDiagnostic::PrintMissingExpression { keyword } => {
                vec![(*keyword, "expression required after this")]
            }
            ParseDiagnostic::PrintInvalidExpression { expr }
            | ParseDiagnostic::LetInvalidExpression { expr }
            | ParseDiagnostic::AssignInvalidExpression { expr }
            | ParseDiagnostic::ReturnInvalidExpression { expr } => {
                vec![(*expr, "not a valid expression")]
            }
            ParseDiagnostic::LetMissingExpression { decl }
            | ParseDiagnostic::AssignMissingExpression { decl } => {
                vec![(*decl, "expression required after this")]
            }
            ParseDiagnostic::LetMalformed { stmt }
            | ParseDiagnostic::AssignMalformed { stmt }
            | ParseDiagnostic::FuncMalformed { stmt }
            | ParseDiagnostic::IfMalformed { stmt }
            | ParseDiagnostic::UnrecognizedStatement { stmt } => {
                vec![(*stmt, "in this statement")]
            }
            ParseDiagnostic::FuncInvalidLiteral { expr } => {
                vec![(*expr, "expected a function literal")]
            }
            ParseDiagnostic::IfInvalidCondition { expr } => {
                vec![(*expr, "not a valid condition")]
            }
            ParseDiagnostic::ExpectedExpressionInParens { parens } => {
                vec![(*parens, "nothing to parse in here")]
            }
            ParseDiagnostic::FuncLiteralMalformed { literal } => {
                vec![(*literal, "in this function literal")]
            }
            ParseDiagnostic::InvalidFunctionParameters { params } => {
                vec![(*params, "in this parameter list")]
            }
            ParseDiagnostic::InvalidCallArguments { args } => {
                vec![(*args, "in this argument list")]
            }
            ParseDiagnostic::Internal { span, .. } => vec![(*span, "here")],
        }
    }
}

fn source_span(span: Span) -> miette::SourceSpan {
    (span.start.offset..span.end.offset).into()
}

impl miette::Diagnostic for ParseDiagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.error_code()))
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = miette::LabeledSpan> + '_>> {
        let labels: Vec<miette::LabeledSpan> = self
            .labeled_spans()
            .into_iter()
            .map(|(span, text)| {
                miette::LabeledSpan::new_with_span(Some(text.to_string()), source_span(span))
            })
            .collect();
        Some(Box::new(labels.into_iter()))
    }
}

/// A best-effort module plus every diagnostic gathered along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutput {
    pub module: Module,
    pub diagnostics: Vec<ParseDiagnostic>,
}

impl ParseOutput {
    /// True when the module can be handed to downstream passes as-is.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Section and parse an already-lexed token stream.
pub fn parse_tokens(tokens: Vec<SpannedToken>) -> ParseOutput {
    let (sections, mut diagnostics) = section::section(tokens);
    let (module, parse_diags) = stmt::parse_sections(&sections);
    diagnostics.extend(parse_diags);
    ParseOutput {
        module,
        diagnostics,
    }
}

/// Parse Quill source code.
///
/// Lexes, sections, and parses in one step. Lex errors abort (there is
/// no token stream to recover on); everything after that accumulates
/// into the returned batch.
///
/// # Examples
///
/// ```
/// use quill_parser::parse;
///
/// let output = parse("print 1 + 2;").unwrap();
/// assert!(output.is_clean());
/// assert_eq!(output.module.stmts.len(), 1);
/// ```
pub fn parse(source: &str) -> Result<ParseOutput, LexError> {
    let tokens = quill_lexer::tokenize(source)?;
    Ok(parse_tokens(tokens))
}
