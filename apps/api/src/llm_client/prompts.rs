// Shared prompt fragments.
// The letter directive itself lives in generation/prompts.rs.

/// Output must survive a plain-text PDF renderer.
pub const PLAIN_TEXT_INSTRUCTION: &str = "\
    Do not include markdown formatting like **bold** or *italic* in the output, \
    just plain text suitable for a PDF.";

/// Contact details are copied from the CV or left out, never made up.
pub const CONTACT_GROUNDING_INSTRUCTION: &str = "\
    **CRITICAL**: If specific contact details (Address, Phone, Email, etc.) are NOT in the CV, \
    DO NOT invent them and DO NOT use brackets/placeholders like \"[Your Address]\". \
    Just omit that line entirely.";

/// Keeps the letter on a single rendered page.
pub const ONE_PAGE_INSTRUCTION: &str = "\
    **Strict Length Limit**: Keep it concise (under 300 words) to ensure it fits perfectly \
    on a single page. Avoid lengthy paragraphs.";
