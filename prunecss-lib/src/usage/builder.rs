use crate::parser::dom_indices::MarkupIndex;
use crate::parser::markup;
use crate::style::css_matcher::class_id_tokens;
use crate::usage::script_rules::{apply_rules, Context};
use crate::usage::UsageSet;
use log::trace;
use std::collections::HashSet;

/// Accumulates usage tokens from markup and scripts, then freezes them into a
/// [`UsageSet`].
#[derive(Debug, Default)]
pub struct UsageSetBuilder {
    tokens: HashSet<String>,
}

impl UsageSetBuilder {
    /// Starts from the always-keep element list.
    pub fn new<I, S>(always_keep: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = Self::empty();
        for token in always_keep {
            builder.add_token(token.as_ref());
        }
        builder
    }

    pub fn empty() -> Self {
        UsageSetBuilder::default()
    }

    pub fn add_token(&mut self, token: &str) {
        let token = token.trim();
        if !token.is_empty() {
            self.tokens.insert(token.to_string());
        }
    }

    /// Adds a selector string as-is together with each class and id part.
    pub fn add_selector(&mut self, selector: &str) {
        self.add_token(selector);
        self.add_selector_parts(selector);
    }

    pub fn add_selector_parts(&mut self, selector: &str) {
        for part in class_id_tokens(selector) {
            self.add_token(part);
        }
    }

    /// Adds whitespace-separated class names as `.name`. Values that already
    /// start with `.` or `#` are treated as selectors.
    pub fn add_class_names(&mut self, value: &str) {
        let value = value.trim();
        if value.starts_with(['.', '#']) {
            self.add_selector(value);
            return;
        }
        for class in value.split_whitespace() {
            self.add_token(&format!(".{}", class));
        }
    }

    pub fn add_id(&mut self, id: &str) {
        let id = id.trim();
        if !id.is_empty() {
            self.add_token(&format!("#{}", id));
        }
    }

    /// Collects references from an HTML document: `class`, `id` and
    /// `data-filter` attributes, inline script bodies, then `class=`, `id=`
    /// and dotted words anywhere in the raw text.
    pub fn add_markup(&mut self, html: &str) {
        let before = self.tokens.len();
        let document = markup::create_dom_tree(html);
        let index = MarkupIndex::build(&document);

        for class in &index.classes {
            self.add_class_names(class);
        }
        for id in &index.ids {
            self.add_id(id);
        }
        for filter in &index.filters {
            if filter.starts_with(['.', '#']) {
                self.add_selector(filter);
            }
        }
        for script in &index.scripts {
            self.add_script(script);
        }
        for template in &index.templates {
            self.add_markup(template);
        }
        apply_rules(Context::Markup, html, self);

        trace!("markup added {} usage tokens", self.tokens.len() - before);
    }

    pub fn add_script(&mut self, source: &str) {
        let matches = apply_rules(Context::Script, source, self);
        trace!("script rules matched {} times", matches);
    }

    pub fn build(self) -> UsageSet {
        UsageSet::from_tokens(self.tokens)
    }
}
