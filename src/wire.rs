//! Query-parameter encoding of typed flags and positional args.
//!
//! This is the only place flag values cross between typed and string form.
//! Encoding is canonical; decoding is lenient and never fails: a missing or
//! malformed value resolves to the flag type's zero value.

use std::collections::HashMap;

use crate::models::context::QueryParams;
use crate::models::flag::{FlagKind, FlagSpec, FlagValue, FlagValues};

/// Reserved query key carrying the comma-joined positional args.
pub const QUERY_ARGS_KEY: &str = "queryArgs";

/// Separator joining positional args under [`QUERY_ARGS_KEY`].
pub const ARGS_SEPARATOR: char = ',';

/// Canonical text form of a flag value.
#[must_use]
pub fn encode_value(value: &FlagValue) -> String {
    match value {
        FlagValue::String(text) => text.clone(),
        FlagValue::Bool(flag) => flag.to_string(),
        FlagValue::Int(number) => number.to_string(),
        FlagValue::Float(number) => number.to_string(),
    }
}

/// Best-effort typed parse of `raw` as `kind`.
///
/// Booleans accept `true`, `1`, `t`, `yes` and `on` in any case; everything
/// else, including an empty or missing value, is `false`.
#[must_use]
pub fn decode_value(kind: FlagKind, raw: Option<&str>) -> FlagValue {
    let Some(raw) = raw else {
        return kind.zero();
    };
    let trimmed = raw.trim();
    match kind {
        FlagKind::String => FlagValue::String(raw.to_owned()),
        FlagKind::Bool => FlagValue::Bool(matches!(
            trimmed.to_ascii_lowercase().as_str(),
            "true" | "1" | "t" | "yes" | "on"
        )),
        FlagKind::Int => FlagValue::Int(trimmed.parse().unwrap_or(0)),
        FlagKind::Float => FlagValue::Float(trimmed.parse().unwrap_or(0.0)),
    }
}

/// Build the query parameters for one dispatch.
///
/// One entry per flag keyed by flag name, plus [`QUERY_ARGS_KEY`] when
/// `args` is non-empty. Entry order carries no meaning.
#[must_use]
pub fn encode_query(values: &FlagValues, args: &[String]) -> HashMap<String, String> {
    let mut params: HashMap<String, String> = values
        .iter()
        .map(|(name, value)| (name.to_owned(), encode_value(value)))
        .collect();

    if !args.is_empty() {
        let separator = ARGS_SEPARATOR.to_string();
        params.insert(QUERY_ARGS_KEY.to_owned(), args.join(&separator));
    }

    params
}

/// Rebuild typed flags and args for `specs` from inbound query parameters.
///
/// Parameters that match no declared flag are ignored. Args containing the
/// separator come back split.
#[must_use]
pub fn decode_query(specs: &[FlagSpec], params: &HashMap<String, String>) -> QueryParams {
    let values: FlagValues = specs
        .iter()
        .map(|spec| {
            let raw = params.get(spec.name()).map(String::as_str);
            (spec.name().to_owned(), decode_value(spec.kind(), raw))
        })
        .collect();

    let args = params
        .get(QUERY_ARGS_KEY)
        .filter(|joined| !joined.is_empty())
        .map(|joined| joined.split(ARGS_SEPARATOR).map(str::to_owned).collect())
        .unwrap_or_default();

    QueryParams::new(values, args)
}
