use crate::style::stylesheet::{AtRuleBlock, PlainRule, RuleNode, Span, Stylesheet};
use crate::usage::UsageSet;
use log::debug;

/// ------------------------------
/// 1. Selector Tokens
/// ------------------------------

/// Supported combinators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Descendant combinator (whitespace).
    Descendant,
    /// Child combinator (`>`).
    Child,
    /// Adjacent sibling combinator (`+`).
    AdjacentSibling,
    /// General sibling combinator (`~`).
    GeneralSibling,
}

/// Returns every `.class` and `#id` token of a selector, prefix included, in
/// source order. Names are `[A-Za-z0-9_-]+`; the contents of attribute
/// brackets are skipped on purpose, so `a[href$=".pdf"]` has no tokens and
/// such a rule is always kept.
pub fn class_id_tokens(selector: &str) -> Vec<&str> {
    let bytes = selector.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        match bytes[pos] {
            b'[' => pos = skip_attribute(bytes, pos + 1),
            b'.' | b'#' => {
                let mut name_end = pos + 1;
                while name_end < bytes.len() && is_name_byte(bytes[name_end]) {
                    name_end += 1;
                }
                if name_end > pos + 1 {
                    tokens.push(&selector[pos..name_end]);
                }
                pos = name_end;
            }
            _ => pos += 1,
        }
    }

    tokens
}

/// True if the selector has at least one class or id token.
pub fn has_class_or_id(selector: &str) -> bool {
    !class_id_tokens(selector).is_empty()
}

/// Splits a complex selector into compound selectors, e.g. `".a > .b c"` into
/// `[(None, ".a"), (Some(Child), ".b"), (Some(Descendant), "c")]`.
///
/// Combinators inside brackets or parentheses (`[a~="b"]`, `:nth-child(2n+1)`)
/// do not split.
pub fn split_compounds(selector: &str) -> Vec<(Option<Combinator>, &str)> {
    let bytes = selector.as_bytes();
    let mut compounds = Vec::new();
    let mut pending: Option<Combinator> = None;
    let mut start: Option<usize> = None;
    let mut paren_depth = 0usize;
    let mut pos = 0;

    while pos < bytes.len() {
        let byte = bytes[pos];
        if byte == b'[' {
            start.get_or_insert(pos);
            pos = skip_attribute(bytes, pos + 1);
            continue;
        }
        match byte {
            b'(' => paren_depth += 1,
            b')' => paren_depth = paren_depth.saturating_sub(1),
            _ => {}
        }

        let separator = paren_depth == 0
            && (byte.is_ascii_whitespace() || matches!(byte, b'>' | b'+' | b'~'));
        if separator {
            if let Some(begin) = start.take() {
                compounds.push((pending.take(), &selector[begin..pos]));
                pending = Some(Combinator::Descendant);
            }
            let combinator = match byte {
                b'>' => Some(Combinator::Child),
                b'+' => Some(Combinator::AdjacentSibling),
                b'~' => Some(Combinator::GeneralSibling),
                _ => None,
            };
            if combinator.is_some() && !compounds.is_empty() {
                pending = combinator;
            }
        } else {
            start.get_or_insert(pos);
        }
        pos += 1;
    }

    if let Some(begin) = start {
        compounds.push((pending, &selector[begin..]));
    }
    compounds
}

fn is_name_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-'
}

/// `pos` is just past `[`; returns the offset past the matching `]`.
fn skip_attribute(bytes: &[u8], mut pos: usize) -> usize {
    let mut quote: Option<u8> = None;
    while pos < bytes.len() {
        let byte = bytes[pos];
        match quote {
            Some(_) if byte == b'\\' => pos += 1,
            Some(q) if byte == q => quote = None,
            Some(_) => {}
            None if byte == b'"' || byte == b'\'' => quote = Some(byte),
            None if byte == b']' => return pos + 1,
            None => {}
        }
        pos += 1;
    }
    bytes.len()
}

/// ------------------------------
/// 2. Usage Matching
/// ------------------------------

/// Whether a selector is referenced by the usage set.
///
/// A selector without class or id tokens always counts as used. Otherwise it
/// is used when any token group intersects the set: all of its tokens, the
/// tokens of its first whitespace-delimited part (the ancestor of a descendant
/// chain), or the tokens of each compound of a child/sibling chain.
pub fn selector_is_used(selector: &str, usage: &UsageSet) -> bool {
    let tokens = class_id_tokens(selector);
    if tokens.is_empty() {
        return true;
    }
    if usage.contains_any(tokens.iter().copied()) {
        return true;
    }

    let mut words = selector.split_whitespace();
    if let (Some(head), Some(_)) = (words.next(), words.next()) {
        if usage.contains_any(class_id_tokens(head)) {
            return true;
        }
    }

    let compounds = split_compounds(selector);
    let has_structural_combinator = compounds.iter().any(|(combinator, _)| {
        matches!(
            combinator,
            Some(Combinator::Child | Combinator::AdjacentSibling | Combinator::GeneralSibling)
        )
    });
    has_structural_combinator
        && compounds
            .iter()
            .any(|(_, compound)| usage.contains_any(class_id_tokens(compound)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Keep,
    Remove,
}

/// Decides a style rule. Rules are atomic: one used selector keeps all of them,
/// and a rule with no class or id token anywhere is always kept.
pub fn classify_rule(rule: &PlainRule<'_>, usage: &UsageSet) -> Decision {
    if !rule.selectors.iter().any(|selector| has_class_or_id(selector)) {
        return Decision::Keep;
    }
    if rule
        .selectors
        .iter()
        .any(|selector| selector_is_used(selector, usage))
    {
        Decision::Keep
    } else {
        Decision::Remove
    }
}

/// Decides any node. Opaque at-rules are kept; a container is removed only
/// when it was fully parsed, has children, and none of them survive.
pub fn classify(node: &RuleNode<'_>, usage: &UsageSet) -> Decision {
    match node {
        RuleNode::Plain(rule) => classify_rule(rule, usage),
        RuleNode::At(rule) => match &rule.block {
            Some(block) if container_is_unused(block, usage) => Decision::Remove,
            _ => Decision::Keep,
        },
    }
}

/// A container with no children at all counts as unused too; one that
/// stopped parsing part-way never does.
fn container_is_unused(block: &AtRuleBlock<'_>, usage: &UsageSet) -> bool {
    block.unparsed.is_none()
        && block
            .children
            .iter()
            .all(|child| classify(child, usage) == Decision::Remove)
}

/// ------------------------------
/// 3. Removal Plan
/// ------------------------------

/// The spans to cut out of a stylesheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrunePlan {
    /// Removed node spans, outermost only, in source order.
    pub removed: Vec<Span>,
    /// Removed style rules, plus one for every container removed whole.
    pub removed_count: usize,
}

impl PrunePlan {
    pub fn is_empty(&self) -> bool {
        self.removed_count == 0
    }
}

/// Classifies every node of a stylesheet, descending into containers that
/// partially survive.
pub fn plan(sheet: &Stylesheet<'_>, usage: &UsageSet) -> PrunePlan {
    let mut plan = PrunePlan::default();
    collect_removals(sheet.rules(), usage, &mut plan);
    debug!(
        "{} of {} top-level rules planned for removal",
        plan.removed_count,
        sheet.rules().len()
    );
    plan
}

fn collect_removals(nodes: &[RuleNode<'_>], usage: &UsageSet, plan: &mut PrunePlan) {
    for node in nodes {
        match node {
            RuleNode::Plain(rule) => {
                if classify_rule(rule, usage) == Decision::Remove {
                    debug!("removing unused rule {}", rule.selectors.join(", "));
                    plan.removed.push(rule.span);
                    plan.removed_count += 1;
                }
            }
            RuleNode::At(rule) => {
                let Some(block) = &rule.block else {
                    continue;
                };
                if container_is_unused(block, usage) {
                    debug!("removing {} block with no used rules", rule.name);
                    plan.removed.push(rule.span);
                    plan.removed_count += removal_weight(node);
                } else {
                    collect_removals(&block.children, usage, plan);
                }
            }
        }
    }
}

/// Count contributed by a node removed together with its enclosing container.
fn removal_weight(node: &RuleNode<'_>) -> usize {
    match node {
        RuleNode::Plain(_) => 1,
        RuleNode::At(rule) => match &rule.block {
            Some(block) => 1 + block.children.iter().map(removal_weight).sum::<usize>(),
            None => 0,
        },
    }
}
