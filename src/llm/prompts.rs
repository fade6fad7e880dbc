//! Prompt catalogue for query validation, field extraction, advisory
//! messages, and result summarization

use serde_json::json;
use serde_json::Value;

/// Yes/no gate: is the input a natural-language real estate question at all?
pub const FORMAT_GATE: &str = "Evaluate the following query and determine if it is a valid \
     natural-language question about real estate or property listings. Respond with 'true' if it \
     is valid, or 'false' if it is invalid.";

/// Structured verdict on ambiguity, relevance, and complexity.
pub const SEMANTIC_GATE: &str = "Evaluate the following query for three things: \
     1. Is it ambiguous or unclear? \
     2. Is it related to real estate? \
     3. Does it ask for investor-specific insights, property comparisons, or involve unsupported \
     complexity? \
     Respond strictly with a valid JSON object that adheres to the schema.";

/// Field extraction into the property schema.
pub const EXTRACTION: &str = "Extract property details into JSON data with operators (e.g., 'at \
     least' -> gte, 'up to' -> lte, 'more than' -> gt, 'less than' -> lt).";

/// Advisory for input that is not a natural-language question.
pub const INVALID_FORMAT_ADVISORY: &str = "The user query provided is not in a valid format. \
     Analyze the input and generate a helpful response explaining why the format is invalid. \
     Provide specific feedback on how to correct the query and examples of valid queries such \
     as: 'Show me properties listed in San Francisco under $700,000.' or 'Find 3-bedroom homes \
     in Austin.'";

/// Advisory for ambiguous or overly broad queries.
pub const AMBIGUOUS_ADVISORY: &str = "The user's query is ambiguous or too broad. Generate a \
     helpful response explaining why their query needs refinement and provide an example of a \
     more specific query based on their input, such as: 'Can you give me properties in x \
     location with x bedrooms and x bathrooms?'";

/// Advisory for queries outside the real estate domain.
pub const NON_REAL_ESTATE_ADVISORY: &str = "The user's query is not related to real estate. \
     Generate a helpful response explaining why their query cannot be processed. Provide an \
     example of valid real-estate-related queries, such as listing properties by location, \
     price range, or property type.";

/// Advisory for unsupported or overly complex queries.
pub const COMPLEXITY_ADVISORY: &str = "The user's query is unsupported or too complex for this \
     system to handle. Generate a helpful response explaining why their query cannot be \
     processed and provide an example of a simpler query that this system can handle, such as \
     listing properties by location or price range.";

/// Static fallbacks when the advisory-message call itself fails.
pub const INVALID_FORMAT_FALLBACK: &str = "Your query is not in a valid format. Please ensure \
     your question is written in natural language, such as: 'Show me properties listed in San \
     Francisco under $700,000.' or 'Find 3-bedroom homes in Austin.'";

pub const AMBIGUOUS_FALLBACK: &str = "Your query is too broad or ambiguous. Please specify \
     additional details, such as location, price range, or property type, and try again.";

pub const NON_REAL_ESTATE_FALLBACK: &str = "Your query does not appear to be related to real \
     estate. Please ask a question about properties, such as listing properties by location, \
     price range, or property type.";

pub const COMPLEXITY_FALLBACK: &str = "Your query is too complex or unsupported by this system. \
     Please simplify your query. For example, you can ask for a list of properties by location \
     or price range.";

pub const NOT_ENGLISH_FALLBACK: &str = "This service only supports questions written in \
     English. Please rephrase your query in English, for example: 'Show me properties listed in \
     San Francisco under $700,000.'";

/// Canned digest for a query that matched nothing. Zero matches is a valid
/// result, not a failure.
pub const NO_MATCHES_SUMMARY: &str = r"### No Properties Found

Your query did not match any properties in our database. Try refining your search with:
- A different city or location.
- Adjusting the price range.
- Specifying the number of bedrooms or bathrooms.

**Example queries:**
- `Show me properties listed in San Francisco under $700,000.`
- `Find homes with 3 bedrooms in Austin.`";

/// Instructions for summarizing a retrieved property set. Markdown-oriented:
/// the digest is rendered directly in the consuming UI.
pub const SUMMARY_INSTRUCTIONS: &str = r"PLEASE PROVIDE A HIGH-LEVEL SUMMARY OF THE FOLLOWING REAL ESTATE PROPERTY DATA.
ALSO PLEASE BE SURE TO ANSWER THE USERS QUESTION IN THE SUMMARY.

PAY ATTENTION TO THE DATA AND CONFIRM THE VALUE OF homestatus AND THEN PROCEED WITH THE FOLLOWING STEPS:

FORMAT THE SUMMARY AS FOLLOWS:
1. START WITH AN OVERVIEW:
   - Describe the real estate market, including the total number of properties and location. Mention if there is a variety of property types and any notable price ranges.

2. ORGANIZE BY PROPERTY TYPE (e.g., 'Single-Family Homes', 'Condos', 'Lots for Sale'):
   - For each property type, summarize:
     - The price range of properties within that type.
     - Any notable properties (e.g., the most expensive, highest engagement).
     - Key features (e.g., number of bedrooms, age of construction).
     - Include trends such as average view count or favorites if applicable.

3. PROVIDE AN ENDING INSIGHT:
   - Comment on the overall interest level, indicated by metrics like page views and favorites.

MAKE SURE TO:
- Keep the language concise and easy to understand.
- Use bold text for headings like property types and notable details.
- Avoid listing out every property individually unless they are significant.
- Maintain readability with short, informative sentences.

IMPORTANT:
- When summarizing price ranges, escape dollar signs as \$ so they render properly in the UI.
- Avoid placing numbers directly next to each other without spacing or punctuation.
- Use Markdown format properly, ensuring no words or numbers get concatenated together.
- Ensure that each property detail is clearly separated, and bullet points do not merge text.";

/// JSON schema response format for the semantic gate verdict.
pub fn verdict_response_format() -> Value {
    json!({
        "type": "json_schema",
        "json_schema": {
            "name": "query_verdict",
            "schema": {
                "type": "object",
                "properties": {
                    "ambiguous": {"type": "boolean"},
                    "real_estate_related": {"type": "boolean"},
                    "unsupported_complexity": {"type": "boolean"}
                },
                "additionalProperties": false,
                "required": ["ambiguous", "real_estate_related", "unsupported_complexity"]
            }
        }
    })
}

fn scalar_property(description: &str) -> Value {
    json!({
        "type": "string",
        "description": format!(
            "{description} Put 'none' if the value isn't picked up from the user's request."
        )
    })
}

fn range_property(description: &str, value_type: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "value": {
                "type": value_type,
                "description": format!(
                    "{description} Put 'none' if the value isn't picked up from the user's request."
                )
            },
            "operator": {
                "type": "string",
                "enum": ["lte", "gte", "lt", "gt", "eq"],
                "description": "Comparison operator. Put 'none' if the value isn't picked up from the user's request."
            }
        },
        "required": ["value"]
    })
}

/// JSON schema response format for property field extraction, one entry per
/// schema field. The `"none"` sentinel convention matches what the store's
/// rows were ingested under.
pub fn property_response_format() -> Value {
    json!({
        "type": "json_schema",
        "json_schema": {
            "name": "property_schema",
            "schema": {
                "type": "object",
                "properties": {
                    "city": scalar_property("City of the property."),
                    "state": scalar_property("State of the property (abbreviated)."),
                    "county": scalar_property("County of the property."),
                    "zipcode": scalar_property("Zip code of the property."),
                    "datePosted": range_property(
                        "Date when the property was listed for sale, in YYYY-MM-DD format.",
                        "string"
                    ),
                    "datesold": range_property(
                        "Date when the property was sold, in YYYY-MM-DD format.",
                        "string"
                    ),
                    "hometype": scalar_property(
                        "Type of the home (e.g., Single Family, Lot)."
                    ),
                    "homestatus": scalar_property(
                        "Status of the home (values available: For Sale, Recently Sold, Pending, \
                         For Rent, Pre Foreclosure, Foreclosed, Other)."
                    ),
                    "price": range_property("Price value.", "number"),
                    "yearbuilt": range_property("Year built value.", "number"),
                    "livingarea": range_property("Living area in sqft.", "number"),
                    "bathrooms": range_property("Number of bathrooms.", "number"),
                    "bedrooms": range_property("Number of bedrooms.", "number"),
                    "pageviewcount": range_property("Page view count.", "number"),
                    "favoritecount": range_property("Favorite count.", "number")
                },
                "additionalProperties": false,
                "required": ["city", "state", "hometype", "homestatus"]
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::EMBED_FIELDS;

    #[test]
    fn test_property_format_covers_schema() {
        let format = property_response_format();
        let properties = &format["json_schema"]["schema"]["properties"];
        for field in EMBED_FIELDS {
            assert!(
                properties.get(field).is_some(),
                "extraction schema missing field {field}"
            );
        }
    }

    #[test]
    fn test_extraction_operators_match_allow_list() {
        let format = property_response_format();
        let ops = format["json_schema"]["schema"]["properties"]["price"]["properties"]["operator"]
            ["enum"]
            .as_array()
            .unwrap();
        assert_eq!(ops.len(), 5);
        for op in ops {
            assert!(crate::models::RangeOp::parse(op.as_str().unwrap()).is_ok());
        }
    }
}
