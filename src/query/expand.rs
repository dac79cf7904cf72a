//! List parameter expansion.
//!
//! `IN (?)` bound to a three-element list becomes `IN (?, ?, ?)` with the
//! list flattened into the parameter set. Named lists become
//! `:ids_0, :ids_1, :ids_2`, skipping any suffix the caller already bound.
//! An empty list becomes `NULL` so the statement stays well-formed.

use std::borrow::Cow;

use compact_str::{CompactString, format_compact};
use indexmap::IndexMap;
use tracing::debug;

use super::{
    locate::locate_placeholders,
    types::{
        ParamType, ParamValue, ParameterSet, PlaceholderStyle, PlaceholderToken, StringEscapes,
        TypeHints
    }
};
use crate::error::RenderError;

/// Statement after list expansion
#[derive(Debug, Clone)]
pub struct Expanded<'a> {
    pub sql:    Cow<'a, str>,
    pub params: Cow<'a, ParameterSet>,
    pub types:  Cow<'a, TypeHints>
}

/// How a single parameter takes part in expansion
enum Expansion {
    Scalar,
    /// Expand, with the element type each item inherits (if declared)
    List(Option<ParamType>)
}

fn classify(value: &ParamValue, hint: Option<ParamType>) -> Expansion {
    match (value, hint) {
        (ParamValue::List(_), None) => Expansion::List(None),
        (ParamValue::List(_), Some(t)) if t.is_list() => Expansion::List(t.element_type()),
        _ => Expansion::Scalar
    }
}

fn check_elements(key: &str, items: &[ParamValue]) -> Result<(), RenderError> {
    for (index, item) in items.iter().enumerate() {
        let reason = match item {
            ParamValue::List(_) => "nested list",
            ParamValue::Object(_) => "object",
            _ => continue
        };
        return Err(RenderError::UnsupportedListElement {
            key: key.into(),
            index,
            reason
        });
    }
    Ok(())
}

/// Expand list-valued parameters into individual placeholders.
///
/// The k-th placeholder of the returned SQL binds the k-th (or same-named)
/// entry of the returned parameter set. When nothing needs expanding the
/// inputs are returned borrowed.
pub fn expand_list_parameters<'a>(
    sql: &'a str,
    params: &'a ParameterSet,
    types: &'a TypeHints,
    escapes: StringEscapes
) -> Result<Expanded<'a>, RenderError> {
    let needs_expansion = match params {
        ParameterSet::Positional(values) => values.iter().enumerate().any(|(i, v)| {
            matches!(
                classify(v, types.get(&PlaceholderToken::Positional(i))),
                Expansion::List(_)
            )
        }),
        ParameterSet::Named(values) => values.iter().any(|(name, v)| {
            matches!(
                classify(v, types.get(&PlaceholderToken::Named(name.clone()))),
                Expansion::List(_)
            )
        })
    };
    if !needs_expansion {
        return Ok(Expanded {
            sql:    Cow::Borrowed(sql),
            params: Cow::Borrowed(params),
            types:  Cow::Borrowed(types)
        });
    }

    match params {
        ParameterSet::Positional(values) => expand_positional(sql, values, types, escapes),
        ParameterSet::Named(values) => expand_named(sql, values, types, escapes)
    }
}

fn expand_positional<'a>(
    sql: &'a str,
    values: &[ParamValue],
    types: &TypeHints,
    escapes: StringEscapes
) -> Result<Expanded<'a>, RenderError> {
    let occurrences = locate_placeholders(sql, PlaceholderStyle::Positional, escapes)?;
    let mut out = String::with_capacity(sql.len() + values.len() * 3);
    let mut new_values = Vec::with_capacity(values.len());
    let mut new_types = Vec::with_capacity(values.len());
    let mut cursor = 0;

    for occurrence in &occurrences {
        let PlaceholderToken::Positional(index) = occurrence.token else {
            continue;
        };
        out.push_str(&sql[cursor..occurrence.offset]);
        cursor = occurrence.end();

        let Some(value) = values.get(index) else {
            // Left for the renderer to report as unresolved
            out.push('?');
            continue;
        };
        let hint = types.get(&occurrence.token);
        match (classify(value, hint), value) {
            (Expansion::List(element), ParamValue::List(items)) => {
                check_elements(&format_compact!("{}", index), items)?;
                debug!(index, count = items.len(), "expanding positional list parameter");
                if items.is_empty() {
                    out.push_str("NULL");
                }
                for (n, item) in items.iter().enumerate() {
                    if n > 0 {
                        out.push_str(", ");
                    }
                    out.push('?');
                    new_values.push(item.clone());
                    new_types.push(element);
                }
            }
            _ => {
                out.push('?');
                new_values.push(value.clone());
                new_types.push(hint);
            }
        }
    }
    out.push_str(&sql[cursor..]);

    // Surplus values are kept so unused parameters behave as before expansion
    for (index, value) in values.iter().enumerate().skip(occurrences.len()) {
        new_values.push(value.clone());
        new_types.push(types.get(&PlaceholderToken::Positional(index)));
    }

    Ok(Expanded {
        sql:    Cow::Owned(out),
        params: Cow::Owned(ParameterSet::Positional(new_values)),
        types:  Cow::Owned(TypeHints::Positional(new_types))
    })
}

fn expand_named<'a>(
    sql: &'a str,
    values: &IndexMap<CompactString, ParamValue>,
    types: &TypeHints,
    escapes: StringEscapes
) -> Result<Expanded<'a>, RenderError> {
    let mut new_values = IndexMap::with_capacity(values.len());
    let mut new_types = IndexMap::new();
    // name -> replacement text for every occurrence of `:name`
    let mut replacements: IndexMap<&str, String> = IndexMap::new();

    for (name, value) in values {
        let token = PlaceholderToken::Named(name.clone());
        let hint = types.get(&token);
        match (classify(value, hint), value) {
            (Expansion::List(element), ParamValue::List(items)) => {
                check_elements(name, items)?;
                debug!(%name, count = items.len(), "expanding named list parameter");
                let mut text = String::new();
                for (n, item) in items.iter().enumerate() {
                    let suffixed = element_name(name, n, values, &new_values);
                    if n > 0 {
                        text.push_str(", ");
                    }
                    text.push(':');
                    text.push_str(&suffixed);
                    if let Some(t) = element {
                        new_types.insert(suffixed.clone(), t);
                    }
                    new_values.insert(suffixed, item.clone());
                }
                if text.is_empty() {
                    text.push_str("NULL");
                }
                replacements.insert(name.as_str(), text);
            }
            _ => {
                if let Some(t) = hint {
                    new_types.insert(name.clone(), t);
                }
                new_values.insert(name.clone(), value.clone());
            }
        }
    }

    let occurrences = locate_placeholders(sql, PlaceholderStyle::Named, escapes)?;
    let mut out = String::with_capacity(sql.len() * 2);
    let mut cursor = 0;
    for occurrence in &occurrences {
        let PlaceholderToken::Named(name) = &occurrence.token else {
            continue;
        };
        if let Some(text) = replacements.get(name.as_str()) {
            out.push_str(&sql[cursor..occurrence.offset]);
            out.push_str(text);
            cursor = occurrence.end();
        }
    }
    out.push_str(&sql[cursor..]);

    Ok(Expanded {
        sql:    Cow::Owned(out),
        params: Cow::Owned(ParameterSet::Named(new_values)),
        types:  Cow::Owned(TypeHints::Named(new_types))
    })
}

/// Name for the n-th element of list `name` that neither the caller nor an
/// earlier expansion has bound
fn element_name(
    name: &str,
    n: usize,
    bound: &IndexMap<CompactString, ParamValue>,
    generated: &IndexMap<CompactString, ParamValue>
) -> CompactString {
    let mut candidate = format_compact!("{}_{}", name, n);
    let mut k = 0;
    while bound.contains_key(&candidate) || generated.contains_key(&candidate) {
        k += 1;
        candidate = format_compact!("{}_{}_{}", name, n, k);
    }
    candidate
}
