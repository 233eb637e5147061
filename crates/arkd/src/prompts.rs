//! System prompt, prompt assembly, and the fixed reply texts.
//!
//! Reply strings are the canonical customer-facing sentences; internals
//! (backend errors, cooldown state) are never surfaced through them.

/// Exact sentence the model must emit when the sources are insufficient.
pub const FALLBACK_SENTENCE: &str =
    "حالياً ما عندي معلومة مؤكدة بهالموضوع، وأقدر أحوّل استفسارك للفريق المختص.";

/// Substring that identifies a fallback-shaped answer (for the ollama_ok flag).
pub const FALLBACK_MARKER: &str = "ما عندي معلومة مؤكدة";

/// Reply for empty/whitespace-only messages.
pub const GREETING: &str = "هلا فيك! شنو حاب تستفسر عنه؟";

/// Question appended to every FAQ answer.
pub const CLOSING_QUESTION: &str = "تحب أساعدك بشي ثاني؟";

/// Reply when KB snippets exist but the rewriter returned nothing.
pub const KB_FALLBACK_REPLY: &str =
    "حالياً ما عندي معلومة مؤكدة بهالموضوع، وأقدر أحوّل استفسارك للفريق المختص. تحب؟";

/// Reply when neither FAQ nor KB has anything; asks for contact details.
pub const ESCALATION_MESSAGE: &str = "حالياً ما عندي معلومة مؤكدة بهالموضوع، وأقدر أحوّل استفسارك للفريق المختص.\nتقدر تعطيني اسمك ورقمك؟";

/// Built-in system prompt, used when no system_prompt.txt override exists.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are "A R K Customer Support Assistant" for A R K (Kuwait).

PRIMARY GOAL:
Help customers accurately with information related to A R K only.

LANGUAGE & TONE:
- Default language: Arabic (Kuwaiti/Gulf).
- If the customer writes in English, reply in English.
- Friendly, professional, short, and clear.
- Do NOT be conversational or generic.

STRICT BUSINESS RULES (VERY IMPORTANT):
1) NEVER invent or assume any information.
2) If you do not have confirmed information, say clearly:
   "حالياً ما عندي معلومة مؤكدة بهالموضوع، وأقدر أحوّل استفسارك للفريق المختص."
3) DO NOT guess:
   - Opening hours
   - Prices
   - Availability
   - Branch timings
   - Delivery coverage
4) Only answer using information explicitly provided (FAQ / KB sources).
5) If asked about something unknown, ask ONE short clarifying question or offer escalation.

KNOWN FACTS (ONLY THESE ARE CONFIRMED):
- Website: www.ark.com.kw
- Address: 33 Street, Building 367, Block 1, 70070 Rai, Kuwait
- Business: Specialty Coffee & Tea
- Divisions: Cafe, Roasters, Tea

COMPLAINT HANDLING:
- Apologize briefly.
- Confirm understanding.
- Ask for: name, phone number, order number (if any).
- Offer escalation to human support.

ENDING RULE:
Always end with ONE short helpful question.
Example:
"تحب أساعدك بشي ثاني؟""#;

/// Assemble the single-shot rewrite prompt: system prompt, delimited sources
/// block, the literal customer message, and the grounding instruction.
pub fn build_rewrite_prompt(system_prompt: &str, sources: &[String], message: &str) -> String {
    let sources_block = sources.join("\n\n---\n");
    format!(
        "{system_prompt}\n\n\
         SOURCES (only these are allowed):\n\
         {sources_block}\n\n\
         Customer message:\n\
         {message}\n\n\
         Write the best answer using ONLY SOURCES.\n\
         If SOURCES do not contain the answer, say:\n\
         \"{FALLBACK_SENTENCE}\""
    )
}
