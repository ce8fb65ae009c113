//! Prompt builder for selection proofreading.
//!
//! [`PromptBuilder`] produces a `(system_msg, user_msg)` pair.  The system
//! message fixes the model's role; the user message restates the rules and
//! ends with the text to correct, so nothing after the text can be mistaken
//! for part of it.
//!
//! English (`"en"`) and Polish (`"pl"`) have dedicated wording.  Any other
//! language code falls back to English.

// ---------------------------------------------------------------------------
// System instructions
// ---------------------------------------------------------------------------

const SYSTEM_INSTRUCTION_EN: &str = "\
You are a proofreader. You fix spelling, grammar and punctuation mistakes \
without changing the content, tone or style of the text.";

const SYSTEM_INSTRUCTION_PL: &str = "\
Jesteś korektorem tekstu. Poprawiasz błędy ortograficzne, gramatyczne i \
interpunkcyjne, nie zmieniając treści, tonu ani stylu tekstu.";

// ---------------------------------------------------------------------------
// User-message preambles
// ---------------------------------------------------------------------------

const USER_PREAMBLE_EN: &str = "\
Correct only spelling, grammar and punctuation in the text below.
Do not change its content, tone, formatting or structure.
Return ONLY the corrected text, with no comments or explanations.
If the text is already correct, return it unchanged.

Text to correct:
";

const USER_PREAMBLE_PL: &str = "\
Popraw wyłącznie błędy ortograficzne, gramatyczne i interpunkcyjne w poniższym tekście.
Nie zmieniaj treści, tonu, formatowania ani struktury tekstu.
Zwróć TYLKO poprawiony tekst, bez komentarzy i wyjaśnień.
Jeśli tekst jest poprawny, zwróć go bez zmian.

Tekst do korekty:
";

// ---------------------------------------------------------------------------
// PromptBuilder
// ---------------------------------------------------------------------------

/// Builds proofreading prompts in chat-message format.
///
/// # Example
/// ```rust
/// use spellfix_hotkey::llm::PromptBuilder;
///
/// let builder = PromptBuilder::new("en");
/// let (system, user) = builder.build_chat("Helo wrold");
/// assert!(system.contains("proofreader"));
/// assert!(user.ends_with("Helo wrold"));
/// ```
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    language: String,
}

impl PromptBuilder {
    /// Create a builder for the given ISO-639-1 language code.
    pub fn new(language: &str) -> Self {
        Self {
            language: language.to_string(),
        }
    }

    /// Build a **(system_msg, user_msg)** pair for `text`.
    pub fn build_chat(&self, text: &str) -> (String, String) {
        let system_msg = self.system_instruction().to_string();

        let preamble = self.user_preamble();
        let mut user_msg = String::with_capacity(preamble.len() + text.len());
        user_msg.push_str(preamble);
        user_msg.push_str(text);

        (system_msg, user_msg)
    }

    fn system_instruction(&self) -> &'static str {
        match self.language.as_str() {
            "pl" => SYSTEM_INSTRUCTION_PL,
            _ => SYSTEM_INSTRUCTION_EN,
        }
    }

    fn user_preamble(&self) -> &'static str {
        match self.language.as_str() {
            "pl" => USER_PREAMBLE_PL,
            _ => USER_PREAMBLE_EN,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
