// Directive construction for cover letter generation.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::{
    CONTACT_GROUNDING_INSTRUCTION, ONE_PAGE_INSTRUCTION, PLAIN_TEXT_INSTRUCTION,
};

/// Cover letter directive template.
/// Replace: {company}, {cv_text}, {custom_block}, {language}, {today},
///          {contact_rule}, {plain_text_rule}, {length_rule}
pub const COVER_LETTER_TEMPLATE: &str = r#"Act as a professional resume writer. I need a cover letter for a job application to {company}.

Here is my CV content:
{cv_text}
{custom_block}
Requirements:
1. Professional and engaging tone.
2. Language: Write the cover letter in {language}.
3. Highlight relevant skills from the CV that match a typical role at {company}.
4. Structure:
   - Header: Include Name, Email, Phone, LinkedIn/Portfolio only if present in CV. **DO NOT include placeholders like [Your Address] or [City, State]. If address is missing, skip it.**
   - Date: Use today's date ({today}).
   - Salutation: Dear Hiring Manager (or specific name if found).
   - Opening: Strong hook about interest in {company}.
   - Body: aligned with CV skills. Keep paragraphs concise.
   - Closing: Call to action.
   - Sign-off: Sincerely, [Name from CV].
5. {contact_rule}
6. {plain_text_rule}
7. {length_rule}"#;

/// Custom instruction block. Replace `{custom_prompt}`.
pub const CUSTOM_INSTRUCTIONS_TEMPLATE: &str = r#"
Additional Custom Instructions from User:
"{custom_prompt}"
(Please prioritize these instructions while maintaining a professional structure.)
"#;

pub const DEFAULT_LANGUAGE: &str = "English";

/// Inputs for one directive.
#[derive(Debug, Clone)]
pub struct DirectiveInput<'a> {
    pub company_name: &'a str,
    pub cv_text: &'a str,
    pub language: Option<&'a str>,
    pub custom_prompt: Option<&'a str>,
    /// Human-readable date, e.g. "October 17, 2026".
    pub today: &'a str,
}

/// Builds the natural-language directive sent to the generation backend.
///
/// The custom block is only included when the user typed something other
/// than whitespace; a blank language falls back to English.
pub fn build_directive(input: &DirectiveInput<'_>) -> String {
    let custom_block = match input.custom_prompt.map(str::trim) {
        Some(custom) if !custom.is_empty() => {
            CUSTOM_INSTRUCTIONS_TEMPLATE.replace("{custom_prompt}", custom)
        }
        _ => String::new(),
    };
    let language = input
        .language
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or(DEFAULT_LANGUAGE);

    // User-supplied text goes in last so braces inside it are left alone.
    COVER_LETTER_TEMPLATE
        .replace("{company}", input.company_name.trim())
        .replace("{language}", language)
        .replace("{today}", input.today)
        .replace("{contact_rule}", CONTACT_GROUNDING_INSTRUCTION)
        .replace("{plain_text_rule}", PLAIN_TEXT_INSTRUCTION)
        .replace("{length_rule}", ONE_PAGE_INSTRUCTION)
        .replace("{custom_block}", &custom_block)
        .replace("{cv_text}", input.cv_text)
}
