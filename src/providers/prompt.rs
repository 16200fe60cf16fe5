//! Prompt construction and response extraction shared by all adapters.

use crate::content::ContentNode;
use crate::i18n::LanguageDescriptor;

const SYSTEM_PROMPT: &str = "You are a professional content localizer. You write native \
content for the target audience and return only the requested content.";

/// A provider-neutral prompt: optional system instructions plus the user turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: Option<String>,
    pub user: String,
}

/// Cultural guidance for languages where a literal translation reads poorly.
fn cultural_notes(code: &str) -> &'static str {
    match code {
        "zh" => "- Use engaging, natural marketing language\n- Emphasize photo-worthy spots\n- Mention practical details such as WeChat Pay and Alipay where relevant",
        "ja" => "- Use the formal/polite register (です・ます調)\n- Emphasize cleanliness, safety and efficiency\n- Keep timing information precise",
        "ko" => "- Use formal polite speech (합니다체)\n- Emphasize trendy spots and photo-worthy locations\n- Keep an inviting, family-friendly tone",
        _ => "- Adapt to local reading habits and preferences",
    }
}

fn audience_rules(target: &LanguageDescriptor) -> String {
    let mut rules = format!(
        "1. Create NATIVE content for {name} ({native}) speakers using expressions they actually use\n\
         2. This is NOT a literal translation: adapt to the cultural context\n\
         3. Keep proper nouns, brand names, URLs, HTML tags and placeholders such as {{name}} unchanged\n\
         4. Preserve formatting exactly",
        name = target.name,
        native = target.native_name,
    );
    if target.is_rtl() {
        rules.push_str("\n5. This is a RIGHT-TO-LEFT language: ensure natural right-to-left text flow");
    }
    rules
}

/// Prompt for localizing one leaf string.
pub fn leaf_prompt(text: &str, target: &LanguageDescriptor) -> Prompt {
    let user = format!(
        "Localize the following text for {name} speakers.\n\n\
         RULES:\n{rules}\n\n\
         CULTURAL ADAPTATION FOR {upper}:\n{notes}\n\n\
         Source text:\n{text}\n\n\
         Return ONLY the {name} text. No explanations, no quotes, no commentary.",
        name = target.name,
        rules = audience_rules(target),
        upper = target.name.to_uppercase(),
        notes = cultural_notes(target.code),
        text = text,
    );

    Prompt {
        system: Some(SYSTEM_PROMPT.to_string()),
        user,
    }
}

/// Prompt for localizing a whole section returned as a JSON object.
pub fn section_prompt(section: &str, subtree: &ContentNode, target: &LanguageDescriptor) -> Prompt {
    let content = serde_json::to_string_pretty(subtree).unwrap_or_else(|_| "{}".to_string());
    let user = format!(
        "Localize every string value of the \"{section}\" section below for {name} speakers.\n\n\
         RULES:\n{rules}\n\
         - Keep every key exactly as given, in the same order\n\
         - Keep list lengths and all numbers, booleans and nulls unchanged\n\
         - Text direction: {direction}\n\n\
         SECTION CONTENT:\n{content}\n\n\
         Return ONLY the localized JSON object. No explanations, no markdown.",
        section = section,
        name = target.name,
        rules = audience_rules(target),
        direction = target.direction.as_str().to_uppercase(),
        content = content,
    );

    Prompt {
        system: Some(SYSTEM_PROMPT.to_string()),
        user,
    }
}

/// Strip whitespace and a surrounding markdown code fence from a text reply.
pub fn clean_text_response(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Some(inner) = trimmed
        .strip_prefix("```")
        .and_then(|rest| rest.strip_suffix("```"))
    {
        // Drop an optional language tag on the opening fence line.
        let body = match inner.split_once('\n') {
            Some((first, rest)) if !first.trim().contains(' ') => rest,
            _ => inner,
        };
        return body.trim().to_string();
    }
    trimmed.to_string()
}

/// Find the first well-formed JSON object embedded in `raw`.
///
/// Providers sometimes wrap structured output in prose or code fences, so
/// every `{` is tried as a start position until one parses as an object.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    raw.char_indices()
        .filter(|(_, c)| *c == '{')
        .find_map(|(start, _)| {
            let rest = &raw[start..];
            let mut stream =
                serde_json::Deserializer::from_str(rest).into_iter::<serde_json::Value>();
            match stream.next() {
                Some(Ok(value)) if value.is_object() => Some(&rest[..stream.byte_offset()]),
                _ => None,
            }
        })
}
