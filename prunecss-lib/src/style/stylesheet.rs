//! Structural parsing of stylesheet text into rule nodes.
//!
//! This is not a CSS grammar. The parser only finds where each rule starts and
//! where its block closes, counting braces while stepping over comments and
//! quoted strings, so that every node carries the exact byte span it occupies
//! in the source. Gap text between nodes (whitespace, comments, skipped empty
//! rules) is never represented as a node; it is recovered from the spans.

use log::trace;

/// At-rules whose block holds nested rules that are parsed and classified
/// individually. Every other at-rule is kept as an opaque construct.
pub const CONTAINER_AT_RULES: &[&str] = &["@media"];

/// A half-open `[start, end)` byte range into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// Creates a span.
    ///
    /// # Panics
    ///
    /// Panics when `end < start`. Such a span can only come from a parser bug.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(
            start <= end,
            "span end {} precedes span start {}",
            end,
            start
        );
        Span { start, end }
    }

    /// True if `other` lies entirely inside this span.
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

/// A style rule: `selectors { declarations }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlainRule<'a> {
    /// Comma-separated selectors, each trimmed, in source order.
    pub selectors: Vec<&'a str>,
    /// Trimmed text between the braces.
    pub declarations: &'a str,
    pub span: Span,
    /// Exact source text of `span`.
    pub text: &'a str,
}

/// The block of a container at-rule such as `@media`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtRuleBlock<'a> {
    /// Text strictly between the outer braces.
    pub inner: Span,
    pub children: Vec<RuleNode<'a>>,
    /// Inner text the parser could not split into rules.
    pub unparsed: Option<Span>,
}

/// An at-rule, either opaque (`@font-face {..}`, `@import ..;`) or a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtRule<'a> {
    /// Name including the `@`, e.g. `@media`.
    pub name: &'a str,
    pub span: Span,
    pub text: &'a str,
    /// Present only for container at-rules.
    pub block: Option<AtRuleBlock<'a>>,
}

impl AtRule<'_> {
    pub fn is_container(&self) -> bool {
        self.block.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleNode<'a> {
    Plain(PlainRule<'a>),
    At(AtRule<'a>),
}

impl<'a> RuleNode<'a> {
    pub fn span(&self) -> Span {
        match self {
            RuleNode::Plain(rule) => rule.span,
            RuleNode::At(rule) => rule.span,
        }
    }

    pub fn text(&self) -> &'a str {
        match self {
            RuleNode::Plain(rule) => rule.text,
            RuleNode::At(rule) => rule.text,
        }
    }
}

/// A parsed stylesheet borrowing its source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stylesheet<'a> {
    source: &'a str,
    rules: Vec<RuleNode<'a>>,
    unparsed: Option<Span>,
}

impl<'a> Stylesheet<'a> {
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Top-level rule nodes ordered by span start.
    pub fn rules(&self) -> &[RuleNode<'a>] {
        &self.rules
    }

    /// Trailing text after the point where parsing stopped (unterminated
    /// comment or string, unmatched brace). It is always kept verbatim.
    pub fn unparsed(&self) -> Option<Span> {
        self.unparsed
    }

    /// The text between top-level nodes, including the leading and trailing
    /// text. Gaps and node texts interleaved in order rebuild the source.
    pub fn gaps(&self) -> Vec<Span> {
        let mut gaps = Vec::with_capacity(self.rules.len() + 1);
        let mut cursor = 0;
        for rule in &self.rules {
            let span = rule.span();
            gaps.push(Span::new(cursor, span.start));
            cursor = span.end;
        }
        gaps.push(Span::new(cursor, self.source.len()));
        gaps
    }
}

/// Parses stylesheet text into rule nodes. Never fails: parsing stops at the
/// first unrecoverable point and the rest is reported by
/// [`Stylesheet::unparsed`].
pub fn parse(source: &str) -> Stylesheet<'_> {
    let (rules, unparsed) = parse_range(source, 0, source.len());
    Stylesheet {
        source,
        rules,
        unparsed,
    }
}

/// Parses `source[start..end]`, producing spans absolute to `source`.
fn parse_range(source: &str, start: usize, end: usize) -> (Vec<RuleNode<'_>>, Option<Span>) {
    let bytes = &source.as_bytes()[..end];
    let mut rules = Vec::new();
    let mut pos = start;

    loop {
        while pos < end && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos >= end {
            return (rules, None);
        }

        if bytes[pos..].starts_with(b"/*") {
            match skip_comment(bytes, pos + 2) {
                Some(next) => {
                    pos = next;
                    continue;
                }
                None => {
                    trace!("unterminated comment at byte {}", pos);
                    return (rules, Some(Span::new(pos, end)));
                }
            }
        }

        let parsed = if bytes[pos] == b'@' {
            parse_at_rule(source, pos, end)
        } else {
            parse_plain_rule(source, pos, end)
        };

        match parsed {
            Some((node, next)) => {
                if let Some(node) = node {
                    rules.push(node);
                }
                pos = next;
            }
            None => {
                trace!("stopped parsing at byte {}", pos);
                return (rules, Some(Span::new(pos, end)));
            }
        }
    }
}

/// Returns the node (if any) and the offset to continue from, or `None` when
/// the construct is not terminated before `end`.
fn parse_at_rule(source: &str, start: usize, end: usize) -> Option<(Option<RuleNode<'_>>, usize)> {
    let text = &source[..end];
    let bytes = text.as_bytes();

    let mut name_end = start + 1;
    while name_end < end && !matches!(bytes[name_end], b'{' | b';') && !bytes[name_end].is_ascii_whitespace()
    {
        name_end += 1;
    }
    let name = &source[start..name_end];

    let node = match find_prelude_end(bytes, name_end)? {
        PreludeEnd::Statement(semicolon) => {
            let span = Span::new(start, semicolon + 1);
            AtRule {
                name,
                span,
                text: span.slice(source),
                block: None,
            }
        }
        PreludeEnd::Block(open) => {
            let close = find_matching_brace(text, open)?;
            let span = Span::new(start, close + 1);
            let block = if CONTAINER_AT_RULES.contains(&name) {
                let (children, unparsed) = parse_range(source, open + 1, close);
                Some(AtRuleBlock {
                    inner: Span::new(open + 1, close),
                    children,
                    unparsed,
                })
            } else {
                None
            };
            AtRule {
                name,
                span,
                text: span.slice(source),
                block,
            }
        }
    };

    let next = node.span.end;
    Some((Some(RuleNode::At(node)), next))
}

fn parse_plain_rule(source: &str, start: usize, end: usize) -> Option<(Option<RuleNode<'_>>, usize)> {
    let text = &source[..end];
    let open = start + text[start..].find('{')?;
    let close = find_matching_brace(text, open)?;
    let next = close + 1;

    let selector_text = text[start..open].trim();
    let declarations = text[open + 1..close].trim();
    if selector_text.is_empty() || declarations.is_empty() {
        return Some((None, next));
    }

    let span = Span::new(start, next);
    let rule = PlainRule {
        selectors: selector_text.split(',').map(str::trim).collect(),
        declarations,
        span,
        text: span.slice(source),
    };
    Some((Some(RuleNode::Plain(rule)), next))
}

enum PreludeEnd {
    /// Offset of the `;` closing a block-less at-rule.
    Statement(usize),
    /// Offset of the `{` opening the at-rule's block.
    Block(usize),
}

fn find_prelude_end(bytes: &[u8], mut pos: usize) -> Option<PreludeEnd> {
    while pos < bytes.len() {
        match bytes[pos] {
            b'{' => return Some(PreludeEnd::Block(pos)),
            b';' => return Some(PreludeEnd::Statement(pos)),
            quote @ (b'"' | b'\'') => {
                pos = skip_string(bytes, pos + 1, quote)?;
                continue;
            }
            b'/' if bytes.get(pos + 1) == Some(&b'*') => {
                pos = skip_comment(bytes, pos + 2)?;
                continue;
            }
            _ => {}
        }
        pos += 1;
    }
    None
}

/// Finds the `}` balancing the `{` at `open`.
///
/// Braces inside quoted strings (backslash escapes honoured) and inside
/// comments are not counted. Returns `None` when the text ends first, or a
/// string or comment is left open.
pub fn find_matching_brace(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    debug_assert_eq!(bytes.get(open), Some(&b'{'));

    let mut depth = 0usize;
    let mut pos = open;
    while pos < bytes.len() {
        match bytes[pos] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(pos);
                }
            }
            quote @ (b'"' | b'\'') => {
                pos = skip_string(bytes, pos + 1, quote)?;
                continue;
            }
            b'/' if bytes.get(pos + 1) == Some(&b'*') => {
                pos = skip_comment(bytes, pos + 2)?;
                continue;
            }
            _ => {}
        }
        pos += 1;
    }
    None
}

/// `pos` is just past the opening quote; returns the offset past the closing one.
fn skip_string(bytes: &[u8], mut pos: usize, quote: u8) -> Option<usize> {
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => pos += 2,
            b if b == quote => return Some(pos + 1),
            _ => pos += 1,
        }
    }
    None
}

/// `pos` is just past `/*`; returns the offset past `*/`.
fn skip_comment(bytes: &[u8], pos: usize) -> Option<usize> {
    bytes
        .get(pos..)?
        .windows(2)
        .position(|pair| pair == b"*/")
        .map(|idx| pos + idx + 2)
}
