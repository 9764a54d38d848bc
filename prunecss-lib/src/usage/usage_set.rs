use std::collections::HashSet;

/// Selector tokens known to be referenced: `.class`, `#id` or a bare tag name.
///
/// Built once by [`UsageSetBuilder`](super::UsageSetBuilder) and read-only
/// afterwards, so one set can be shared by every stylesheet worker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageSet {
    tokens: HashSet<String>,
}

impl UsageSet {
    pub(crate) fn from_tokens(tokens: HashSet<String>) -> Self {
        UsageSet { tokens }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    /// True if any of `tokens` is in the set.
    pub fn contains_any<'t, I>(&self, tokens: I) -> bool
    where
        I: IntoIterator<Item = &'t str>,
    {
        tokens.into_iter().any(|token| self.contains(token))
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for UsageSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        UsageSet {
            tokens: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::UsageSet;

    #[test]
    fn membership_is_exact() {
        let usage: UsageSet = [".btn", "#main", "body"].into_iter().collect();
        assert!(usage.contains(".btn"));
        assert!(!usage.contains(".btn-primary"));
        assert!(!usage.contains("btn"));
        assert!(usage.contains_any([".nope", "#main"]));
        assert!(!usage.contains_any([".nope"]));
        assert_eq!(usage.len(), 3);
        assert!(!usage.is_empty());
        assert!(UsageSet::default().is_empty());
    }
}
