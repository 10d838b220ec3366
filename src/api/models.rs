use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
    pub req_count: Option<u64>,
}

/// Body of `GET /api`. `req_count` echoes the request parameter so the
/// caller can match responses to requests.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SearchResponse {
    pub result: String,
    #[serde(default, deserialize_with = "lenient_counter")]
    pub req_count: Option<u64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCounter {
    Number(u64),
    Text(String),
}

/// Accepts the echoed counter both as a JSON number and as a numeric string.
fn lenient_counter<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawCounter>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawCounter::Number(n)) => Ok(Some(n)),
        Some(RawCounter::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

#[test]
fn test_counter_number_or_string() {
    let r: SearchResponse = serde_json::from_str(r#"{"result":"x","req_count":3}"#).unwrap();
    assert_eq!(r.req_count, Some(3));

    let r: SearchResponse = serde_json::from_str(r#"{"result":"x","req_count":"7"}"#).unwrap();
    assert_eq!(r.req_count, Some(7));

    let r: SearchResponse = serde_json::from_str(r#"{"result":"x"}"#).unwrap();
    assert_eq!(r.req_count, None);

    assert!(serde_json::from_str::<SearchResponse>(r#"{"result":"x","req_count":"-1"}"#).is_err());
}
