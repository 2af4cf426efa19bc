//! Unit tests for query encoding and lenient decoding of typed flags.

use std::collections::{HashMap, HashSet};

use ktrl::wire::{decode_query, decode_value, encode_query, QUERY_ARGS_KEY};
use ktrl::{Dispatcher, FlagKind, FlagSource, FlagSpec, FlagValue, FlagValues, TransportConfig};

fn specs() -> Vec<FlagSpec> {
    vec![
        FlagSpec::string("version", "v0.0.1"),
        FlagSpec::bool("enable", false),
        FlagSpec::int("count", 0),
        FlagSpec::float("ratio", 0.0),
    ]
}

fn values(version: &str, enable: bool, count: i64, ratio: f64) -> FlagValues {
    let mut values = FlagValues::new();
    values.insert("version", version);
    values.insert("enable", enable);
    values.insert("count", count);
    values.insert("ratio", ratio);
    values
}

#[test]
fn encode_query_has_one_entry_per_flag() {
    let params = encode_query(&values("v1", true, 7, 2.5), &[]);
    let pairs: HashSet<(&str, &str)> = params
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    let expected: HashSet<(&str, &str)> = [
        ("version", "v1"),
        ("enable", "true"),
        ("count", "7"),
        ("ratio", "2.5"),
    ]
    .into_iter()
    .collect();
    assert_eq!(pairs, expected);
}

#[test]
fn round_trip_reproduces_typed_values() {
    let cases = [
        values("v0.0.1", false, 0, 0.0),
        values("with space, comma & ampersand", true, i64::MAX, 0.1),
        values("ünïcødé", false, i64::MIN, -2.5e-10),
        values("", true, -1, 1e300),
        values("=?#", true, 42, f64::MIN_POSITIVE),
    ];

    for original in cases {
        let params = encode_query(&original, &[]);
        let decoded = decode_query(&specs(), &params);
        assert_eq!(decoded.values(), &original);
    }
}

#[test]
fn round_trip_through_request_url() {
    let dispatcher =
        Dispatcher::from_config(&TransportConfig::tcp("127.0.0.1", 6666)).expect("transport");
    let original = values("a&b=c d", true, -17, 3.25);
    let args = vec!["first".to_owned(), "second arg".to_owned()];

    let url = dispatcher
        .url_for("/show/", &original, &args)
        .expect("url");
    let params: HashMap<String, String> = url.query_pairs().into_owned().collect();
    let decoded = decode_query(&specs(), &params);

    assert_eq!(decoded.values(), &original);
    assert_eq!(decoded.args(), args.as_slice());
}

#[test]
fn malformed_values_decode_to_zero() {
    for raw in ["", "abc", "  ", "1e", "--"] {
        assert_eq!(decode_value(FlagKind::Int, Some(raw)), FlagValue::Int(0), "int {raw:?}");
        assert_eq!(
            decode_value(FlagKind::Float, Some(raw)),
            FlagValue::Float(0.0),
            "float {raw:?}"
        );
        assert_eq!(
            decode_value(FlagKind::Bool, Some(raw)),
            FlagValue::Bool(false),
            "bool {raw:?}"
        );
    }
}

#[test]
fn missing_values_decode_to_zero() {
    let decoded = decode_query(&specs(), &HashMap::new());
    assert_eq!(decoded.get_string("version"), "");
    assert!(!decoded.get_bool("enable"));
    assert_eq!(decoded.get_int("count"), 0);
    assert!(decoded.get_float("ratio").abs() < f64::EPSILON);
    assert!(decoded.args().is_empty());
}

#[test]
fn undeclared_params_are_ignored() {
    let mut params = HashMap::new();
    params.insert("unknown".to_owned(), "1".to_owned());
    let decoded = decode_query(&specs(), &params);
    assert!(decoded.values().get("unknown").is_none());
    assert_eq!(decoded.values().len(), 4);
}

#[test]
fn args_split_on_comma() {
    let mut params = HashMap::new();
    params.insert(QUERY_ARGS_KEY.to_owned(), "a,b,,c".to_owned());
    let decoded = decode_query(&[], &params);
    assert_eq!(decoded.args(), ["a", "b", "", "c"].map(str::to_owned).as_slice());
}

#[test]
fn args_with_commas_do_not_survive_the_trip() {
    let params = encode_query(&FlagValues::new(), &["a,b".to_owned()]);
    let decoded = decode_query(&[], &params);
    assert_eq!(decoded.args().len(), 2);
}
