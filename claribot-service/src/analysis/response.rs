//! Pulling the analysis object out of a model reply.

use serde_json::{Map, Value, json};
use tracing::debug;

/// Extract the JSON analysis object from free-form model output.
///
/// The candidate span runs from the first `{` to the last `}`. When there is
/// no span, it does not parse, or it is not an object, the whole reply is
/// wrapped in the fallback analysis.
pub fn parse_analysis(reply: &str) -> Value {
    match json_span(reply).and_then(|span| serde_json::from_str::<Map<String, Value>>(span).ok()) {
        Some(object) => Value::Object(object),
        None => {
            debug!(reply_len = reply.len(), "No JSON object in reply, using fallback analysis");
            fallback_analysis(reply)
        }
    }
}

fn json_span(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (start < end).then(|| &reply[start..=end])
}

/// Analysis returned when the reply carries no usable JSON.
pub fn fallback_analysis(reply: &str) -> Value {
    json!({
        "response": reply,
        "risk": "MEDIUM",
        "percentage": "50",
        "diversification_score": "60",
    })
}
