//! Conversion between [`SearchParams`] and the flat string pairs that live in
//! a query string or a persisted snapshot.
//!
//! Decoding never fails. Unknown enum values, empty search text and
//! unparsable numbers fall back to their defaults; numbers that parse but sit
//! outside their range are clamped (`page` to at least 1, `per_page` to
//! 1..=100).

use crate::types::{
    Language, Order, SearchParams, Sort, DEFAULT_PAGE, DEFAULT_PER_PAGE, DEFAULT_QUERY,
    MAX_PER_PAGE,
};
use std::collections::{BTreeMap, HashMap};

pub const KEY_PAGE: &str = "page";
pub const KEY_PER_PAGE: &str = "per_page";
pub const KEY_SORT: &str = "sort";
pub const KEY_ORDER: &str = "order";
pub const KEY_LANG: &str = "lang";
pub const KEY_Q: &str = "q";

pub fn decode(raw: &HashMap<String, String>) -> SearchParams {
    let field = |key: &str| raw.get(key).map(|value| value.as_str());

    SearchParams {
        page: decode_number(field(KEY_PAGE), DEFAULT_PAGE, 1, u32::MAX),
        per_page: decode_number(field(KEY_PER_PAGE), DEFAULT_PER_PAGE, 1, MAX_PER_PAGE),
        sort: field(KEY_SORT).and_then(Sort::from_param).unwrap_or_default(),
        order: field(KEY_ORDER).and_then(Order::from_param).unwrap_or_default(),
        lang: field(KEY_LANG).and_then(Language::from_param).unwrap_or_default(),
        q: field(KEY_Q)
            .filter(|q| !q.trim().is_empty())
            .unwrap_or(DEFAULT_QUERY)
            .to_string(),
    }
}

/// Keys come out sorted, so the same state always produces the same string.
pub fn encode(state: &SearchParams) -> BTreeMap<String, String> {
    BTreeMap::from([
        (KEY_PAGE.to_string(), state.page.to_string()),
        (KEY_PER_PAGE.to_string(), state.per_page.to_string()),
        (KEY_SORT.to_string(), state.sort.as_str().to_string()),
        (KEY_ORDER.to_string(), state.order.as_str().to_string()),
        (KEY_LANG.to_string(), state.lang.as_str().to_string()),
        (KEY_Q.to_string(), state.q.clone()),
    ])
}

/// Coerces any state into a valid one by pushing it through the codec.
pub fn sanitize(state: &SearchParams) -> SearchParams {
    decode(&encode(state).into_iter().collect())
}

fn decode_number(raw: Option<&str>, default: u32, min: u32, max: u32) -> u32 {
    match raw.map(str::trim).and_then(|value| value.parse::<i64>().ok()) {
        Some(n) => n.clamp(i64::from(min), i64::from(max)) as u32,
        None => default,
    }
}

/// Parses `?a=1&b=two` (leading `?` optional). `+` is read as a space and the
/// first occurrence of a repeated key wins.
pub fn parse_query_string(query: &str) -> HashMap<String, String> {
    let mut pairs = HashMap::new();
    for part in query.trim_start_matches('?').split('&') {
        if part.is_empty() {
            continue;
        }
        let (key, value) = part.split_once('=').unwrap_or((part, ""));
        let (Some(key), Some(value)) = (decode_component(key), decode_component(value)) else {
            continue;
        };
        pairs.entry(key).or_insert(value);
    }
    pairs
}

pub fn stringify(pairs: &BTreeMap<String, String>) -> String {
    pairs
        .iter()
        .map(|(key, value)| {
            format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
        })
        .collect::<Vec<_>>()
        .join("&")
}

pub fn to_query_string(state: &SearchParams) -> String {
    stringify(&encode(state))
}

pub fn from_query_string(query: &str) -> SearchParams {
    decode(&parse_query_string(query))
}

fn decode_component(raw: &str) -> Option<String> {
    urlencoding::decode(&raw.replace('+', " "))
        .ok()
        .map(|decoded| decoded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_input_decodes_to_defaults() {
        let state = decode(&HashMap::new());
        assert_eq!(state, SearchParams::default());
        assert_eq!(state.q, "react");
        assert_eq!(state.lang, Language::Javascript);
        assert_eq!(state.sort, Sort::Stars);
        assert_eq!(state.order, Order::Desc);
        assert_eq!((state.page, state.per_page), (1, 10));
    }

    #[test]
    fn bogus_enum_values_fall_back() {
        assert_eq!(decode(&raw(&[("sort", "bogus")])).sort, Sort::Stars);
        assert_eq!(decode(&raw(&[("order", "sideways")])).order, Order::Desc);
        assert_eq!(decode(&raw(&[("lang", "scalla")])).lang, Language::Javascript);
        assert_eq!(decode(&raw(&[("lang", "Python")])).lang, Language::Javascript);
    }

    #[test]
    fn valid_fields_are_kept() {
        let state = decode(&raw(&[
            ("page", "4"),
            ("per_page", "25"),
            ("sort", "updated"),
            ("order", "asc"),
            ("lang", "scala"),
            ("q", "akka streams"),
        ]));
        assert_eq!(
            state,
            SearchParams {
                page: 4,
                per_page: 25,
                sort: Sort::Updated,
                order: Order::Asc,
                lang: Language::Scala,
                q: "akka streams".to_string(),
            }
        );
    }

    #[test]
    fn out_of_range_numbers_are_clamped() {
        let state = decode(&raw(&[("page", "0"), ("per_page", "500")]));
        assert_eq!((state.page, state.per_page), (1, 100));

        let state = decode(&raw(&[("page", "-7"), ("per_page", "0")]));
        assert_eq!((state.page, state.per_page), (1, 1));
    }

    #[test]
    fn malformed_numbers_use_defaults() {
        let state = decode(&raw(&[("page", "two"), ("per_page", "2.5")]));
        assert_eq!((state.page, state.per_page), (1, 10));
    }

    #[test]
    fn blank_query_uses_seed_term() {
        assert_eq!(decode(&raw(&[("q", "   ")])).q, "react");
        assert_eq!(decode(&raw(&[("q", "")])).q, "react");
    }

    #[test]
    fn round_trip_through_query_string() {
        let state = SearchParams {
            page: 7,
            per_page: 50,
            sort: Sort::Forks,
            order: Order::Asc,
            lang: Language::Python,
            q: "web framework & more=yes?".to_string(),
        };
        assert_eq!(decode(&encode(&state).into_iter().collect()), state);
        assert_eq!(from_query_string(&to_query_string(&state)), state);
    }

    #[test]
    fn every_valid_state_round_trips() {
        let queries = [
            "c++",
            "100% rust",
            "日本語 ライブラリ",
            "  padded  ",
            "a+b=c&d",
        ];
        let orders = [Order::Desc, Order::Asc];
        for sort in Sort::ALL {
            for order in orders {
                for lang in Language::ALL {
                    for page in [1, 100, u32::MAX] {
                        for per_page in [1, 100] {
                            for q in queries {
                                let state = SearchParams {
                                    page,
                                    per_page,
                                    sort,
                                    order,
                                    lang,
                                    q: q.to_string(),
                                };
                                assert_eq!(decode(&encode(&state).into_iter().collect()), state);
                                assert_eq!(from_query_string(&to_query_string(&state)), state);
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn oversized_per_page_is_clamped_not_kept() {
        let state = SearchParams {
            per_page: u32::MAX,
            ..SearchParams::default()
        };
        assert_eq!(from_query_string(&to_query_string(&state)).per_page, 100);
    }

    #[test]
    fn query_string_is_stable_and_sorted() {
        assert_eq!(
            to_query_string(&SearchParams::default()),
            "lang=javascript&order=desc&page=1&per_page=10&q=react&sort=stars"
        );
    }

    #[test]
    fn parse_handles_prefix_plus_and_duplicates() {
        let pairs = parse_query_string("?q=hello+world&q=ignored&flag&page=%32");
        assert_eq!(pairs.get("q").map(String::as_str), Some("hello world"));
        assert_eq!(pairs.get("flag").map(String::as_str), Some(""));
        assert_eq!(pairs.get("page").map(String::as_str), Some("2"));
    }

    #[test]
    fn sanitize_repairs_invalid_state() {
        let state = SearchParams {
            page: 0,
            per_page: 1000,
            q: String::new(),
            ..SearchParams::default()
        };
        let fixed = sanitize(&state);
        assert_eq!((fixed.page, fixed.per_page), (1, 100));
        assert_eq!(fixed.q, "react");
    }
}
