//! Position-exact reconstruction of a stylesheet with unused rules cut out.

use crate::style::css_matcher::PrunePlan;
use crate::style::stylesheet::{Span, Stylesheet};
use once_cell::sync::Lazy;
use regex::Regex;

static BLANK_LINE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n\s*\n+").expect("blank line pattern is valid"));

/// Outcome of rewriting one stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite {
    /// Nothing was removed; the source should be left alone.
    Unchanged,
    Changed { text: String, removed: usize },
}

impl Rewrite {
    pub fn removed(&self) -> usize {
        match self {
            Rewrite::Unchanged => 0,
            Rewrite::Changed { removed, .. } => *removed,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Rewrite::Unchanged => None,
            Rewrite::Changed { text, .. } => Some(text),
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            Rewrite::Unchanged => None,
            Rewrite::Changed { text, .. } => Some(text),
        }
    }
}

/// Rebuilds the stylesheet without the planned spans.
///
/// Kept rules, the text between them and the kept part of a partially removed
/// `@media` block (its header, surviving children and closing brace) are
/// copied byte for byte. Removed spans are merged into sorted disjoint
/// intervals and skipped. Afterwards every run of three or more newlines
/// (whitespace between them included) becomes exactly two.
pub fn rewrite(sheet: &Stylesheet<'_>, plan: &PrunePlan) -> Rewrite {
    if plan.is_empty() {
        return Rewrite::Unchanged;
    }

    let source = sheet.source();
    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    for span in merge_spans(&plan.removed) {
        out.push_str(&source[cursor..span.start]);
        cursor = span.end;
    }
    out.push_str(&source[cursor..]);

    Rewrite::Changed {
        text: collapse_blank_lines(&out),
        removed: plan.removed_count,
    }
}

/// Sorts spans and merges overlapping or touching ones.
pub fn merge_spans(spans: &[Span]) -> Vec<Span> {
    let mut sorted = spans.to_vec();
    sorted.sort();

    let mut merged: Vec<Span> = Vec::with_capacity(sorted.len());
    for span in sorted {
        match merged.last_mut() {
            Some(last) if span.start <= last.end => last.end = last.end.max(span.end),
            _ => merged.push(span),
        }
    }
    merged
}

pub fn collapse_blank_lines(text: &str) -> String {
    BLANK_LINE_RUN.replace_all(text, "\n\n").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::css_matcher::plan;
    use crate::style::stylesheet::parse;
    use crate::usage::UsageSet;
    use pretty_assertions::assert_eq;

    fn run(css: &str, used: &[&str]) -> Rewrite {
        let usage: UsageSet = used.iter().copied().collect();
        let sheet = parse(css);
        rewrite(&sheet, &plan(&sheet, &usage))
    }

    #[test]
    fn removes_the_middle_rule() {
        let result = run(".a{x:1}\n.b{y:2}\n.c{z:3}", &[".a", ".c"]);
        assert_eq!(
            result,
            Rewrite::Changed {
                text: ".a{x:1}\n\n.c{z:3}".to_string(),
                removed: 1,
            }
        );
    }

    #[test]
    fn nothing_removed_is_unchanged() {
        assert_eq!(run(".a{x:1}\np{y:2}", &[".a"]), Rewrite::Unchanged);
    }

    #[test]
    fn keeps_surviving_media_children_verbatim() {
        let css = "@media (min-width:600px){ .used{color:red} .unused{color:blue} }";
        let result = run(css, &[".used"]);
        assert_eq!(result.removed(), 1);
        assert_eq!(
            result.text(),
            Some("@media (min-width:600px){ .used{color:red}  }")
        );
    }

    #[test]
    fn removes_media_with_no_survivors() {
        let css = ".keep { a: 1 }\n\n@media print {\n  .gone { b: 2 }\n}\n\n\n.also { c: 3 }\n";
        let result = run(css, &[".keep", ".also"]);
        assert_eq!(result.removed(), 2);
        assert_eq!(result.text(), Some(".keep { a: 1 }\n\n.also { c: 3 }\n"));
    }

    #[test]
    fn kept_rule_formatting_is_untouched() {
        let css = "/* header */\n.keep   {\n    color : red ;  /* note */\n}\n.drop{x:1}\n";
        let result = run(css, &[".keep"]);
        assert_eq!(
            result.text(),
            Some("/* header */\n.keep   {\n    color : red ;  /* note */\n}\n\n")
        );
    }

    #[test]
    fn unparsed_tail_is_kept() {
        let css = ".drop{x:1}\n.keep{y:2}\n.broken{ z: 3";
        let result = run(css, &[".keep"]);
        assert_eq!(result.text(), Some("\n.keep{y:2}\n.broken{ z: 3"));
    }

    #[test]
    fn merges_overlapping_and_touching_spans() {
        let spans = [Span::new(10, 20), Span::new(0, 5), Span::new(5, 8), Span::new(15, 25)];
        assert_eq!(merge_spans(&spans), vec![Span::new(0, 8), Span::new(10, 25)]);
    }

    #[test]
    fn collapses_long_blank_runs_only() {
        assert_eq!(collapse_blank_lines("a\n\nb"), "a\n\nb");
        assert_eq!(collapse_blank_lines("a\n \n\t\n\nb"), "a\n\nb");
        assert_eq!(collapse_blank_lines("a\nb"), "a\nb");
    }
}
