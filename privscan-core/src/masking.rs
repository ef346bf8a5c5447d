//! The masking engine.
//!
//! Turns a matched substring into its redacted form according to the rule's
//! `MaskingPolicy`. Direct-text masking works on the whole span; variable
//! masking replaces a `name = "value"` match with `name = "***"`. Masking never
//! looks at the rule type, only at the policy.
//!
//! Character counts (`preserveStart`, `preserveEnd`, lengths) are in
//! `char`s, not bytes.
//!
//! License: MIT OR Apache-2.0

use log::debug;
use regex::Regex;

use crate::config::{MaskingMode, MaskingPolicy, Rule, RuleSet, DEFAULT_MASK_WIDTH};
use crate::errors::PrivscanError;
use crate::redaction_match::{log_masking_action_debug, Assignment, Match, Span};
use crate::sanitizers::compiler::assignment_groups;

/// Masks a matched substring given only its text.
///
/// For `variable_value` policies the rule's pattern is run again over the
/// text to find the name and value; prefer [`mask_match`] when the `Match`
/// from the scan is at hand.
pub fn mask_text(matched_text: &str, rule: &Rule) -> Result<String, PrivscanError> {
    let Some(policy) = rule.active_masking() else {
        return Ok(matched_text.to_string());
    };
    let masked = match policy.mode {
        MaskingMode::DirectText => mask_direct_text(matched_text, policy),
        MaskingMode::VariableValue => {
            let (whole, assignment) = rederive_assignment(matched_text, rule)?;
            let matched = &matched_text[whole.start..whole.end];
            let masked = mask_variable_value(matched, &assignment, policy, &rule.name)?;
            format!("{}{}{}", &matched_text[..whole.start], masked, &matched_text[whole.end..])
        }
    };
    log_masking_action_debug(module_path!(), matched_text, &masked, &rule.name);
    Ok(masked)
}

/// Masks a match using the captures recorded by the matcher.
pub fn mask_match(m: &Match, rule: &Rule) -> Result<String, PrivscanError> {
    let Some(policy) = rule.active_masking() else {
        return Ok(m.matched_text.clone());
    };
    let masked = match policy.mode {
        MaskingMode::DirectText => mask_direct_text(&m.matched_text, policy),
        MaskingMode::VariableValue => {
            let assignment = m.assignment.ok_or_else(|| PrivscanError::StructuralMismatch {
                rule: rule.name.clone(),
                reason: "the pattern exposes no name/value captures".to_string(),
            })?;
            mask_variable_value(&m.matched_text, &assignment, policy, &rule.name)?
        }
    };
    log_masking_action_debug(module_path!(), &m.matched_text, &masked, &rule.name);
    Ok(masked)
}

/// Applies direct-text masking. Precedence: `preserve_format`, then
/// `preserve_start`/`preserve_end`, then `preserve_length`, then the fixed
/// three-token mask.
pub fn mask_direct_text(text: &str, policy: &MaskingPolicy) -> String {
    let token = policy.mask_token();

    if policy.preserve_format {
        let mut out = String::with_capacity(text.len() * token.len());
        for c in text.chars() {
            if c.is_whitespace() {
                out.push(c);
            } else {
                out.push_str(token);
            }
        }
        return out;
    }

    let len = text.chars().count();
    if policy.preserve_start > 0 || policy.preserve_end > 0 {
        let keep_start = policy.preserve_start.min(len);
        let keep_end = policy.preserve_end.min(len - keep_start);
        let middle = len - keep_start - keep_end;

        let prefix: String = text.chars().take(keep_start).collect();
        let suffix: String = text.chars().skip(len - keep_end).collect();
        if middle == 0 {
            return prefix + &suffix;
        }
        let width = if policy.preserve_length { middle } else { DEFAULT_MASK_WIDTH };
        return format!("{}{}{}", prefix, token.repeat(width), suffix);
    }

    if policy.preserve_length {
        token.repeat(len)
    } else {
        token.repeat(DEFAULT_MASK_WIDTH)
    }
}

fn mismatch(rule_name: &str, reason: &str) -> PrivscanError {
    PrivscanError::StructuralMismatch {
        rule: rule_name.to_string(),
        reason: reason.to_string(),
    }
}

fn span_fits(text: &str, span: Span) -> bool {
    span.start <= span.end
        && span.end <= text.len()
        && text.is_char_boundary(span.start)
        && text.is_char_boundary(span.end)
}

fn is_quote(c: char) -> bool {
    c == '"' || c == '\''
}

/// Rewrites a whole `name = "value"` match as `name = <q>***<q>`.
///
/// `text` is exactly the matched span and the assignment spans are relative
/// to it. Nothing of the match survives except the name: a prefix matched
/// before the name and a mismatched closing quote are both dropped. `<q>` is
/// the first quote character in the match.
pub fn mask_variable_value(
    text: &str,
    assignment: &Assignment,
    policy: &MaskingPolicy,
    rule_name: &str,
) -> Result<String, PrivscanError> {
    let (name, value) = (assignment.name, assignment.value);
    if !span_fits(text, name) || !span_fits(text, value) || name.end > value.start {
        return Err(mismatch(rule_name, "capture spans do not fit the matched text"));
    }

    let quote = text
        .chars()
        .find(|c| is_quote(*c))
        .ok_or_else(|| mismatch(rule_name, "no quote character in the match"))?;

    Ok(format!(
        "{} = {q}{}{q}",
        &text[name.start..name.end],
        policy.mask_token().repeat(policy.value_width()),
        q = quote
    ))
}

/// Runs the rule's pattern over `text` again. Returns the span of the whole
/// match in `text` and the name/value spans relative to that match.
fn rederive_assignment(text: &str, rule: &Rule) -> Result<(Span, Assignment), PrivscanError> {
    let regex = Regex::new(&rule.pattern)
        .map_err(|e| PrivscanError::InvalidPattern(rule.name.clone(), e))?;
    let groups = assignment_groups(&regex)
        .ok_or_else(|| mismatch(&rule.name, "the pattern exposes no name/value captures"))?;
    let caps = regex
        .captures(text)
        .ok_or_else(|| mismatch(&rule.name, "the pattern does not match the text"))?;
    let (Some(whole), Some(name), Some(value)) = (caps.get(0), caps.get(groups.name), caps.get(groups.value)) else {
        return Err(mismatch(&rule.name, "a name or value capture did not participate"));
    };
    let base = whole.start();
    Ok((
        Span::new(whole.start(), whole.end()),
        Assignment {
            name: Span::new(name.start() - base, name.end() - base),
            value: Span::new(value.start() - base, value.end() - base),
        },
    ))
}

/// Produces the export form of `text`: every match whose rule has an active
/// masking policy is replaced by its masked form.
///
/// Matches are applied in index order; one that overlaps an already applied
/// match is left out. Each match is checked against `text` first, so a match
/// from an older version of the text is rejected instead of corrupting the
/// output.
pub fn redact_text(text: &str, matches: &[Match], rule_set: &RuleSet) -> Result<String, PrivscanError> {
    redact_with_applied(text, matches, rule_set).map(|(out, _)| out)
}

/// Same as [`redact_text`], also returning the matches that were actually
/// rewritten, in index order.
pub fn redact_with_applied(
    text: &str,
    matches: &[Match],
    rule_set: &RuleSet,
) -> Result<(String, Vec<Match>), PrivscanError> {
    let mut ordered: Vec<&Match> = matches.iter().collect();
    ordered.sort_by_key(|m| m.index);

    let mut out = String::with_capacity(text.len());
    let mut applied = Vec::new();
    let mut last_end = 0usize;

    for m in ordered {
        m.verify_in(text)?;
        let rule = rule_set
            .get(m.rule_id)
            .ok_or(PrivscanError::RuleNotFound(m.rule_id))?;
        if rule.active_masking().is_none() || m.length == 0 {
            continue;
        }
        if m.index < last_end {
            debug!(
                "Skipping match of rule '{}' at {}: overlaps an earlier redaction.",
                m.rule_name, m.index
            );
            continue;
        }
        out.push_str(&text[last_end..m.index]);
        out.push_str(&mask_match(m, rule)?);
        last_end = m.end();
        applied.push(m.clone());
    }
    out.push_str(&text[last_end..]);
    Ok((out, applied))
}
