//! Prompt construction and response parsing for the two intake nodes.

use super::profile::{ChangeSet, CollectedRecord};

/// Build the collection system prompt.
///
/// Carries the full record contract: value domains, the conditional-field
/// rules, and the never-fabricate instruction. The completeness flag is the
/// model's call — nothing local re-checks it.
pub fn collection_system_prompt() -> String {
    "You are an intake agent collecting a housing applicant's information.\n\
     Normalize whatever the user provides into the record below.\n\n\
     Rules:\n\
     - All monetary amounts are in KRW (South Korean won).\n\
     - age is the applicant's Korean legal age (만 나이), 19-99.\n\
     - gender must be \"male\" or \"female\" — nothing else.\n\
     - rent_type must be \"전세\", \"월세\" or \"전체\".\n\
     - ** Never invent information the user has not given. ** Leave any \
     field you have not heard as null.\n\n\
     Required fields:\n\
     - age\n\
     - gender\n\
     - district (registered city/district, e.g. \"서울특별시 강남구\")\n\
     - married\n\
       - marriage_date (e.g. \"2022-01-01\"): only needed when married is true\n\
     - income\n\
     - asset\n\
     - has_car\n\
       - car_value: only needed when has_car is true\n\
     - budget\n\
     - house_size (desired size in square meters, 0-999)\n\
     - price_limit\n\
     - rent_type\n\n\
     Respond with ONLY a JSON object with exactly these keys:\n\
     {\"age\": null, \"gender\": null, \"district\": null, \"married\": null, \
     \"marriage_date\": null, \"income\": null, \"asset\": null, \
     \"has_car\": null, \"car_value\": null, \"budget\": null, \
     \"house_size\": null, \"price_limit\": null, \"rent_type\": null, \
     \"is_data_collected\": false}\n\n\
     Set is_data_collected to true ONLY when every required field has been \
     collected."
        .to_string()
}

/// Build the collection user prompt from the latest raw input.
pub fn collection_user_prompt(input: &str) -> String {
    format!("Here is the user's message:\n{input}")
}

/// Build the review system prompt.
pub fn review_system_prompt() -> String {
    "You are an intake agent confirming and correcting a housing \
     applicant's information.\n\
     Turn the user's corrections into a change list.\n\
     ** Never invent information the user has not given. **\n\n\
     Field names that may be changed:\n\
     age, gender, district, married, marriage_date (only when married), \
     income, asset, has_car, car_value (only when has_car), budget, \
     house_size, price_limit, rent_type\n\n\
     Respond with ONLY a JSON object:\n\
     {\"change_column_list\": [{\"field_name\": new_value}], \"is_done\": false}\n\n\
     Each entry maps one field name to its new value; return an empty list \
     if the user asked for no changes. If the user indicates they are \
     finished reviewing, set is_done to true."
        .to_string()
}

/// Build the review user prompt from the latest correction text.
pub fn review_user_prompt(input: &str) -> String {
    format!("Here is the user's message:\n{input}")
}

/// Parse a collection response into a `CollectedRecord`.
pub fn parse_collection_response(raw: &str) -> Result<CollectedRecord, String> {
    let json_str = extract_json_object(raw);
    serde_json::from_str(&json_str).map_err(|e| format!("JSON parse error: {e}"))
}

/// Parse a review response into a `ChangeSet`.
pub fn parse_review_response(raw: &str) -> Result<ChangeSet, String> {
    let json_str = extract_json_object(raw);
    serde_json::from_str(&json_str).map_err(|e| format!("JSON parse error: {e}"))
}

/// Extract a JSON object from LLM output (handles markdown wrapping).
fn extract_json_object(text: &str) -> String {
    let trimmed = text.trim();

    // Already a JSON object
    if trimmed.starts_with('{') {
        return trimmed.to_string();
    }

    // Wrapped in a markdown code block
    if let Some(start) = trimmed.find("```json") {
        let after = &trimmed[start + 7..];
        if let Some(end) = after.find("```") {
            return after[..end].trim().to_string();
        }
    }

    if let Some(start) = trimmed.find("```") {
        let after = &trimmed[start + 3..];
        if let Some(end) = after.find("```") {
            let inner = after[..end].trim();
            if inner.starts_with('{') {
                return inner.to_string();
            }
        }
    }

    // Try to find object bounds in surrounding prose
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}'))
        && end > start
    {
        return trimmed[start..=end].to_string();
    }

    trimmed.to_string()
}
