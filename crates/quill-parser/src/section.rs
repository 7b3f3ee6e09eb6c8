//! Bracket matching: flat token sequence → nested section tree.
//!
//! Sections are the intermediate representation between the lexer and
//! the parser: a token, or a balanced `()`/`{}`/`[]` group over tokens.
//! The returned tree is well-nested even when the input has bracket
//! errors; those are reported in the accompanying batch.

use crate::ParseDiagnostic;
use quill_ast::Span;
use quill_lexer::{SpannedToken, Token};

/// Bracket family of a group section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delim {
    /// `( … )`
    Paren,
    /// `{ … }`
    Brace,
    /// `[ … ]`
    Bracket,
}

/// A token or a balanced bracket group over tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    Atom(SpannedToken),
    /// The group's span runs from the opener through the closer; the
    /// bracket tokens themselves are consumed, not present as child
    /// atoms.
    Group {
        delim: Delim,
        span: Span,
        children: Vec<Section>,
    },
}

impl Section {
    pub fn span(&self) -> Span {
        match self {
            Section::Atom(token) => token.span,
            Section::Group { span, .. } => *span,
        }
    }

    /// The token if this section is an atom.
    pub fn as_atom(&self) -> Option<&SpannedToken> {
        match self {
            Section::Atom(token) => Some(token),
            Section::Group { .. } => None,
        }
    }
}

/// Span covering a run of sibling sections. Empty runs get a default
/// span; callers only ask about non-empty ones.
pub(crate) fn group_span(sections: &[Section]) -> Span {
    match (sections.first(), sections.last()) {
        (Some(first), Some(last)) => first.span().merge(last.span()),
        _ => Span::default(),
    }
}

fn opener(token: &Token) -> Option<Delim> {
    match token {
        Token::LParen => Some(Delim::Paren),
        Token::LBrace => Some(Delim::Brace),
        Token::LBracket => Some(Delim::Bracket),
        _ => None,
    }
}

fn closer(token: &Token) -> Option<Delim> {
    match token {
        Token::RParen => Some(Delim::Paren),
        Token::RBrace => Some(Delim::Brace),
        Token::RBracket => Some(Delim::Bracket),
        _ => None,
    }
}

struct Frame {
    delim: Delim,
    opener: Span,
    children: Vec<Section>,
}

fn push_child(stack: &mut Vec<Frame>, root: &mut Vec<Section>, section: Section) {
    match stack.last_mut() {
        Some(frame) => frame.children.push(section),
        None => root.push(section),
    }
}

/// Promote a flat token sequence into a section tree.
///
/// A closer that does not match the most recent opener still closes the
/// frame, so processing continues on a well-nested structure; unclosed
/// frames at end of input are closed against the last consumed span.
pub fn section(tokens: Vec<SpannedToken>) -> (Vec<Section>, Vec<ParseDiagnostic>) {
    let mut diagnostics = Vec::new();
    let mut root = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();
    let mut last_span = Span::default();

    for token in tokens {
        last_span = token.span;
        if let Some(delim) = opener(&token.token) {
            stack.push(Frame {
                delim,
                opener: token.span,
                children: Vec::new(),
            });
        } else if let Some(kind) = closer(&token.token) {
            match stack.pop() {
                Some(frame) => {
                    if frame.delim != kind {
                        diagnostics.push(ParseDiagnostic::MismatchedBracket {
                            opener: frame.opener,
                            closer: token.span,
                        });
                    }
                    let group = Section::Group {
                        delim: frame.delim,
                        span: frame.opener.merge(token.span),
                        children: frame.children,
                    };
                    push_child(&mut stack, &mut root, group);
                }
                None => {
                    diagnostics.push(ParseDiagnostic::UnmatchedCloser { closer: token.span });
                }
            }
        } else {
            push_child(&mut stack, &mut root, Section::Atom(token));
        }
    }

    // Unclosed frames: report in document order, close innermost-first
    // so nesting is preserved.
    let mut unclosed = Vec::new();
    while let Some(frame) = stack.pop() {
        unclosed.push(ParseDiagnostic::UnclosedBracket {
            opener: frame.opener,
        });
        let group = Section::Group {
            delim: frame.delim,
            span: frame.opener.merge(last_span),
            children: frame.children,
        };
        push_child(&mut stack, &mut root, group);
    }
    unclosed.reverse();
    diagnostics.extend(unclosed);

    (root, diagnostics)
}
