//! Tool name generation and tolerant name resolution.
//!
//! Generated names are long, so callers rarely reproduce them exactly.
//! Resolution compares names after lower-casing and dropping every
//! non-alphanumeric character, then tries three tiers in order: exact
//! equality, candidate containing the query, and query containing the
//! candidate. The first catalog entry matching the earliest tier wins.

use super::{NaturalKey, OperationDescriptor, OperationKind, ToolDescriptor};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::hash::BuildHasher;

const GRAPHQL_PREFIX: &str = "graphql";
const DISAMBIGUATION_BYTES: usize = 4;

/// Generates the deterministic tool name of an operation.
///
/// HTTP operations become `<verb>_<path slug>_<handler>`, for example
/// `get_api_users_id_getUser`. GraphQL operations become
/// `graphql_<operation>_<field slug>`, followed by the handler when it
/// differs from the field name.
#[must_use]
pub fn generate_tool_name(operation: &OperationDescriptor) -> String {
    let handler = slugify(operation.handler());
    match operation.kind() {
        OperationKind::Http { method, .. } => {
            let verb = method.as_str().to_ascii_lowercase();
            let path = slugify(&operation.kind().locator());
            join_segments(&[verb.as_str(), path.as_str(), handler.as_str()])
        }
        OperationKind::GraphQl {
            operation: operation_type,
            field_name,
        } => {
            let kind = operation_type.as_str().to_ascii_lowercase();
            let field = slugify(field_name);
            let suffix = if field == handler { "" } else { handler.as_str() };
            join_segments(&[GRAPHQL_PREFIX, kind.as_str(), field.as_str(), suffix])
        }
    }
}

/// Collapses every run of non-alphanumeric characters into one underscore
/// and trims underscores from both ends.
#[must_use]
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    for character in value.chars() {
        if character.is_ascii_alphanumeric() {
            slug.push(character);
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    while slug.ends_with('_') {
        slug.pop();
    }
    slug
}

fn join_segments(segments: &[&str]) -> String {
    segments
        .iter()
        .filter(|segment| !segment.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("_")
}

/// Appends a short, key-derived token to a colliding name.
#[must_use]
pub fn disambiguate(name: &str, key: &NaturalKey) -> String {
    let digest = Sha256::digest(key.as_str().as_bytes());
    let mut disambiguated = String::with_capacity(name.len() + 1 + DISAMBIGUATION_BYTES * 2);
    disambiguated.push_str(name);
    disambiguated.push('_');
    for byte in digest.iter().take(DISAMBIGUATION_BYTES) {
        disambiguated.push_str(&format!("{byte:02x}"));
    }
    disambiguated
}

/// Assigns catalog-unique names to `(generated name, natural key)` pairs.
///
/// A key keeps the name it held in `previous` whenever that name still
/// derives from its generated name, so a newcomer never takes a name away
/// from an existing operation. Remaining keys take their generated name
/// when free, otherwise a [`disambiguate`]d one, otherwise that name with a
/// numeric suffix. Names are returned in input order.
#[must_use]
pub fn assign_unique_names<S: BuildHasher>(
    candidates: &[(&str, &NaturalKey)],
    previous: &HashMap<NaturalKey, String, S>,
) -> Vec<String> {
    let mut claimed: HashSet<String> = HashSet::with_capacity(candidates.len());
    let held: Vec<Option<String>> = candidates
        .iter()
        .map(|&(generated, key)| {
            let name = previous.get(key)?;
            let derived = name == generated
                || name
                    .strip_prefix(generated)
                    .is_some_and(|rest| rest.starts_with('_'));
            (derived && claimed.insert(name.clone())).then(|| name.clone())
        })
        .collect();

    candidates
        .iter()
        .zip(held)
        .map(|(&(generated, key), kept)| {
            kept.unwrap_or_else(|| {
                let name = free_name(generated, key, &claimed);
                claimed.insert(name.clone());
                name
            })
        })
        .collect()
}

fn free_name(generated: &str, key: &NaturalKey, claimed: &HashSet<String>) -> String {
    if !claimed.contains(generated) {
        return generated.to_owned();
    }
    let unique = disambiguate(generated, key);
    if !claimed.contains(&unique) {
        return unique;
    }
    (2_u32..)
        .map(|attempt| format!("{unique}_{attempt}"))
        .find(|name| !claimed.contains(name))
        .unwrap_or_else(|| unique.clone())
}

/// Lower-cases a name and removes all non-alphanumeric characters.
#[must_use]
pub fn normalize_tool_name(value: &str) -> String {
    value
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|character| character.to_ascii_lowercase())
        .collect()
}

/// Resolves a caller-supplied query against named candidates.
///
/// A missing query, or one that normalizes to nothing, never matches.
pub fn resolve_by<'a, T>(
    query: Option<&str>,
    candidates: &'a [T],
    name_of: impl Fn(&T) -> &str,
) -> Option<&'a T> {
    let normalized_query = normalize_tool_name(query?);
    if normalized_query.is_empty() {
        return None;
    }

    let normalized: Vec<(String, &T)> = candidates
        .iter()
        .map(|candidate| (normalize_tool_name(name_of(candidate)), candidate))
        .filter(|(name, _)| !name.is_empty())
        .collect();

    let tiers: [&dyn Fn(&str) -> bool; 3] = [
        &|candidate: &str| candidate == normalized_query,
        &|candidate: &str| candidate.contains(normalized_query.as_str()),
        &|candidate: &str| normalized_query.contains(candidate),
    ];

    tiers.iter().find_map(|matches| {
        normalized
            .iter()
            .find(|(name, _)| matches(name))
            .map(|(_, candidate)| *candidate)
    })
}

/// Resolves a caller-supplied query against a list of tools.
pub fn resolve<'a>(
    query: Option<&str>,
    tools: &'a [ToolDescriptor],
) -> Option<&'a ToolDescriptor> {
    resolve_by(query, tools, ToolDescriptor::name)
}
