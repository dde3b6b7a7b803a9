use std::collections::HashSet;

/// Lowercase and trim a skill before any comparison
#[inline]
pub fn normalize_skill(skill: &str) -> String {
    skill.trim().to_lowercase()
}

/// Normalize a skill list, dropping blank entries
pub fn normalize_skill_set(skills: &[String]) -> HashSet<String> {
    skills
        .iter()
        .map(|s| normalize_skill(s))
        .filter(|s| !s.is_empty())
        .collect()
}

/// Decides whether a candidate skill satisfies a required skill
///
/// Both arguments are already normalized.
pub trait SkillMatcher: Send + Sync {
    fn matches(&self, candidate: &str, required: &str) -> bool;
}

/// Equality or substring containment in either direction
///
/// Deliberately loose: "plumb" satisfies "plumbing" and "painting"
/// satisfies "wall painting".
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainmentMatcher;

impl SkillMatcher for ContainmentMatcher {
    #[inline]
    fn matches(&self, candidate: &str, required: &str) -> bool {
        candidate == required || candidate.contains(required) || required.contains(candidate)
    }
}

/// Exact equality only
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatcher;

impl SkillMatcher for ExactMatcher {
    #[inline]
    fn matches(&self, candidate: &str, required: &str) -> bool {
        candidate == required
    }
}

/// Fraction of `required` skills satisfied by `candidate` skills (0-1)
///
/// Nothing required is a perfect match; nothing offered against a
/// non-empty requirement scores zero.
pub fn skill_match_score(candidate: &[String], required: &[String]) -> f64 {
    skill_match_score_with(&ContainmentMatcher, candidate, required)
}

/// [`skill_match_score`] with an explicit matching strategy
pub fn skill_match_score_with(
    matcher: &dyn SkillMatcher,
    candidate: &[String],
    required: &[String],
) -> f64 {
    let required = normalize_skill_set(required);
    if required.is_empty() {
        return 1.0;
    }

    let candidate = normalize_skill_set(candidate);
    if candidate.is_empty() {
        return 0.0;
    }

    let matched = required
        .iter()
        .filter(|req| candidate.iter().any(|have| matcher.matches(have, req)))
        .count();

    matched as f64 / required.len() as f64
}

/// Whether any of the `wanted` skills is present in `skills`
///
/// Exact membership after normalization. An empty `wanted` list matches.
pub fn has_any_skill(skills: &[String], wanted: &[String]) -> bool {
    let wanted = normalize_skill_set(wanted);
    if wanted.is_empty() {
        return true;
    }

    let skills = normalize_skill_set(skills);
    wanted.iter().any(|skill| skills.contains(skill))
}
