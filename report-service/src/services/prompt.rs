//! Instruction prompt for the report reviewer.

const TEXT_DELIMITER: &str = "\"\"\"";
const ESCAPED_DELIMITER: &str = "\\\"\\\"\\\"";

const INSTRUCTIONS: &str = r#"You are an academic report reviewer.

You MUST return valid JSON.
You MUST include ALL keys.
If nothing is found, return empty arrays or empty strings.

Return JSON EXACTLY like this:
{
  "issues": [],
  "recommendation": "",
  "guidance": []
}

TEXT:
"#;

/// Build the review prompt with `text` inside a `"""` block.
///
/// A `"""` inside the report is written as `\"\"\"` so it cannot close the
/// block; everything else is embedded verbatim.
pub fn build_review_prompt(text: &str) -> String {
    let body = text.replace(TEXT_DELIMITER, ESCAPED_DELIMITER);

    let mut prompt =
        String::with_capacity(INSTRUCTIONS.len() + body.len() + 2 * TEXT_DELIMITER.len() + 1);
    prompt.push_str(INSTRUCTIONS);
    prompt.push_str(TEXT_DELIMITER);
    prompt.push_str(&body);
    prompt.push_str(TEXT_DELIMITER);
    prompt.push('\n');
    prompt
}
