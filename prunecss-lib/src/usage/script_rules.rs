//! Pattern rules that pull selector references out of source text.
//!
//! Each rule pairs a pattern with how its first capture group is turned into
//! usage tokens. The rules are independent of each other and of the
//! stylesheet parser; adding a new reference style means adding a row.

use crate::usage::UsageSetBuilder;
use once_cell::sync::Lazy;
use regex::Regex;

/// Where a rule applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    /// Raw HTML text.
    Markup,
    /// Script source, including inline `<script>` bodies.
    Script,
}

/// How a captured string becomes usage tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    /// A selector such as `.menu #nav`: the whole string and each `.class` /
    /// `#id` part.
    Selector,
    /// A selector only if it starts with `.` or `#`, otherwise ignored.
    PrefixedSelector,
    /// Bare class names (`"open active"`), or a selector if prefixed.
    ClassNames,
    /// A bare element id.
    Id,
    /// Only the `.class` / `#id` parts, not the whole string.
    Parts,
}

#[derive(Debug)]
pub struct ExtractionRule {
    pub name: &'static str,
    pub context: Context,
    pub pattern: Regex,
    pub capture: Capture,
}

impl ExtractionRule {
    fn new(name: &'static str, context: Context, pattern: &str, capture: Capture) -> Self {
        ExtractionRule {
            name,
            context,
            pattern: Regex::new(pattern).expect("extraction pattern is valid"),
            capture,
        }
    }

    /// Feeds every match in `text` to the builder.
    pub fn apply(&self, text: &str, builder: &mut UsageSetBuilder) -> usize {
        let mut matches = 0;
        for captures in self.pattern.captures_iter(text) {
            let Some(value) = captures.get(1) else {
                continue;
            };
            matches += 1;
            let value = value.as_str();
            match self.capture {
                Capture::Selector => builder.add_selector(value),
                Capture::PrefixedSelector => {
                    if value.starts_with(['.', '#']) {
                        builder.add_selector(value);
                    }
                }
                Capture::ClassNames => builder.add_class_names(value),
                Capture::Id => builder.add_id(value),
                Capture::Parts => builder.add_selector_parts(value),
            }
        }
        matches
    }
}

/// All rules, markup and script.
pub static RULES: Lazy<Vec<ExtractionRule>> = Lazy::new(|| {
    use Capture::*;
    use Context::*;

    vec![
        // Dotted words anywhere in markup: inline handlers, inline styles.
        ExtractionRule::new("dotted-word", Markup, r"\.([a-zA-Z0-9_-]+)", ClassNames),
        // class="..." and id="..." anywhere in the raw text, so markup held in
        // script strings or comments still counts.
        ExtractionRule::new("class-attribute", Markup, r#"class=["']([^"']+)["']"#, ClassNames),
        ExtractionRule::new("id-attribute", Markup, r#"id=["']([^"']+)["']"#, Id),
        // $('.class'), $('#id'), $('.class #id')
        ExtractionRule::new("jquery", Script, r#"\$\(["']([.#][^"']+)["']"#, Selector),
        // .find('.x'), .closest('#y') and friends
        ExtractionRule::new(
            "traversal",
            Script,
            r#"\.(?:find|filter|closest|parent|children|siblings|next|prev)\(["']([.#][^"']+)["']"#,
            Selector,
        ),
        // classList.add('x'), addClass('x'), className = 'x'
        ExtractionRule::new(
            "class-toggle",
            Script,
            r#"(?:class(?:List)?\.(?:add|remove|toggle|contains)|(?:add|remove|toggle|has)Class|className\s*[=:])\(?\s*["']([^"']+)["']"#,
            ClassNames,
        ),
        ExtractionRule::new(
            "query-selector",
            Script,
            r#"querySelector(?:All)?\(\s*["']([^"']+)["']"#,
            Selector,
        ),
        ExtractionRule::new("element-by-id", Script, r#"getElementById\(\s*["']([^"']+)["']"#, Id),
        ExtractionRule::new(
            "elements-by-class",
            Script,
            r#"getElementsByClassName\(\s*["']([^"']+)["']"#,
            ClassNames,
        ),
        // { itemSelector: '.grid-item', filter: '.web' }
        ExtractionRule::new(
            "config-key",
            Script,
            r#"(?:itemSelector|selector|filter|class)\s*:\s*["']([.#][^"']+)["']"#,
            Selector,
        ),
        ExtractionRule::new(
            "data-filter",
            Script,
            r#"data-filter=["']([^"']+)["']"#,
            PrefixedSelector,
        ),
        // Any selector-looking string literal: '.card .title'
        ExtractionRule::new(
            "selector-literal",
            Script,
            r#"["']\s*([.#][a-zA-Z0-9_-]+(?:\s*[.#][a-zA-Z0-9_-]+)*)\s*["']"#,
            Parts,
        ),
    ]
});

/// Applies every rule registered for `context`; returns the number of matches.
pub fn apply_rules(context: Context, text: &str, builder: &mut UsageSetBuilder) -> usize {
    RULES
        .iter()
        .filter(|rule| rule.context == context)
        .map(|rule| rule.apply(text, builder))
        .sum()
}
