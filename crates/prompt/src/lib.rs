//! # Prompt
//!
//! Formats retrieved memories and the user's message into a single augmented prompt for LLMs.
//!
//! ## Format
//!
//! Framing depends on two inputs:
//!
//! - **Language**: codes starting with `zh` get Chinese framing; every other code gets English framing.
//! - **Model type** ([`ModelType`]):
//!   - `default`: intro, numbered memory list, then the user message section
//!   - `qwen`: explicit rule list before the memories (Qwen follows directive instructions better)
//!   - `gemini`: XML-style tagged sections (`<memories>`, `<instructions>`, `<user_message>`)
//!
//! The user message is always appended unmodified as the last section, and memories with a
//! `created_at` are prefixed with their UTC date.
//!
//! ## External interactions
//!
//! - **AI models**: output replaces the prompt of the outgoing LLM request.
//! - No I/O; every function here is pure.

use memos_core::Memory;

/// Configured language value that enables detection from the message text.
pub const LANGUAGE_AUTO: &str = "auto";

pub const LANGUAGE_ZH: &str = "zh";

pub const LANGUAGE_EN: &str = "en";

/// Model family, used to pick the framing structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelType {
    #[default]
    Default,
    Qwen,
    Gemini,
}

impl ModelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::Default => "default",
            ModelType::Qwen => "qwen",
            ModelType::Gemini => "gemini",
        }
    }
}

impl std::fmt::Display for ModelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detects the model family from the target model name: `qwen` is checked before `gemini`,
/// case-insensitively; no name or no match gives [`ModelType::Default`].
pub fn detect_model_type(model: Option<&str>) -> ModelType {
    let Some(model) = model else {
        return ModelType::Default;
    };
    let model = model.to_lowercase();
    if model.contains("qwen") {
        ModelType::Qwen
    } else if model.contains("gemini") {
        ModelType::Gemini
    } else {
        ModelType::Default
    }
}

fn is_cjk_ideograph(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

/// Detects the prompt language of a message.
///
/// Returns `en` only when the message has no CJK unified ideograph (U+4E00..=U+9FFF) and at least
/// one ASCII letter; anything else (CJK present, or no letters at all) is `zh`.
pub fn detect_language(message: &str) -> &'static str {
    let has_cjk = message.chars().any(is_cjk_ideograph);
    if !has_cjk && message.chars().any(|c| c.is_ascii_alphabetic()) {
        LANGUAGE_EN
    } else {
        LANGUAGE_ZH
    }
}

/// Resolves the configured language: [`LANGUAGE_AUTO`] detects from `message`, any other value is used verbatim.
pub fn resolve_language(configured: &str, message: &str) -> String {
    if configured == LANGUAGE_AUTO {
        detect_language(message).to_string()
    } else {
        configured.to_string()
    }
}

fn is_chinese(language: &str) -> bool {
    language.to_ascii_lowercase().starts_with(LANGUAGE_ZH)
}

/// Renders one memory line body: `[YYYY-MM-DD] content` or just `content`.
fn memory_text(memory: &Memory) -> String {
    match memory.created_at {
        Some(at) => format!("[{}] {}", at.format("%Y-%m-%d"), memory.content),
        None => memory.content.clone(),
    }
}

/// Memories with non-blank content, rendered in store order.
fn memory_lines(memories: &[Memory]) -> Vec<String> {
    memories
        .iter()
        .filter(|m| !m.content.trim().is_empty())
        .map(memory_text)
        .collect()
}

struct Framing {
    intro: &'static str,
    memories_title: &'static str,
    rules: &'static [&'static str],
    message_title: &'static str,
}

/// Plain-text framing for `default` and `qwen`.
fn framing(chinese: bool, directive: bool) -> Framing {
    match (chinese, directive) {
        (false, true) => Framing {
            intro: "You have long-term memories about this user. Follow these rules strictly:",
            memories_title: "Memories:",
            rules: &[
                "Treat the memories below as things the user told you earlier.",
                "Use a memory only when it is relevant to the current message; ignore the rest.",
                "Do not mention that memories were provided unless the user asks.",
                "If a memory conflicts with the current message, trust the current message.",
            ],
            message_title: "Current user message:",
        },
        (true, true) => Framing {
            intro: "你拥有关于该用户的长期记忆。请严格遵守以下规则：",
            memories_title: "记忆：",
            rules: &[
                "将下面的记忆视为用户之前告诉过你的内容。",
                "仅在与当前消息相关时使用记忆，忽略无关的记忆。",
                "除非用户询问，不要提及你获得了记忆。",
                "如果记忆与当前消息冲突，以当前消息为准。",
            ],
            message_title: "当前用户消息：",
        },
        (false, false) => Framing {
            intro: "Below are memories about the user retrieved from earlier conversations. Use them when they help answer the message, and ignore any that are unrelated.",
            memories_title: "Relevant memories:",
            rules: &[],
            message_title: "User message:",
        },
        (true, false) => Framing {
            intro: "以下是从之前的对话中检索到的关于用户的记忆。在有助于回答时使用它们，忽略无关的记忆。",
            memories_title: "相关记忆：",
            rules: &[],
            message_title: "用户消息：",
        },
    }
}

fn format_plain(
    framing: &Framing,
    lines: &[String],
    original_message: &str,
    numbered: bool,
) -> String {
    let mut out = String::new();
    out.push_str(framing.intro);
    out.push('\n');
    for (i, rule) in framing.rules.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, rule));
    }
    out.push('\n');
    out.push_str(framing.memories_title);
    out.push('\n');
    for (i, line) in lines.iter().enumerate() {
        if numbered {
            out.push_str(&format!("{}. {}\n", i + 1, line));
        } else {
            out.push_str("- ");
            out.push_str(line);
            out.push('\n');
        }
    }
    out.push('\n');
    out.push_str(framing.message_title);
    out.push('\n');
    out.push_str(original_message);
    out
}

fn tagged_instructions(chinese: bool) -> &'static [&'static str] {
    if chinese {
        &[
            "以上记忆来自与该用户之前的对话。",
            "请结合相关记忆回答 <user_message> 中的消息，不要逐字引用记忆。",
        ]
    } else {
        &[
            "The memories above were recalled from earlier conversations with this user.",
            "Use the relevant ones to answer the message in <user_message> and do not quote them verbatim.",
        ]
    }
}

fn format_tagged(instructions: &[&str], lines: &[String], original_message: &str) -> String {
    let mut out = String::from("<memories>\n");
    for (i, line) in lines.iter().enumerate() {
        out.push_str(&format!("<memory index=\"{}\">{}</memory>\n", i + 1, line));
    }
    out.push_str("</memories>\n\n<instructions>\n");
    for line in instructions {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str("</instructions>\n\n<user_message>\n");
    out.push_str(original_message);
    out.push_str("\n</user_message>");
    out
}

/// Builds the memory-augmented prompt.
///
/// # Arguments
///
/// * `original_message` - The user's prompt; included unmodified as one contiguous block
/// * `memories` - Retrieved memories in store order; blank contents are skipped
/// * `language` - Resolved language code (`zh`, `en`, ...); `zh*` selects Chinese framing
/// * `model_type` - Selects the framing structure
///
/// # Returns
///
/// The augmented prompt. Deterministic for identical inputs. When `memories` has no
/// non-blank content the original message is returned unchanged.
pub fn format_memory_prompt(
    original_message: &str,
    memories: &[Memory],
    language: &str,
    model_type: ModelType,
) -> String {
    let lines = memory_lines(memories);
    if lines.is_empty() {
        return original_message.to_string();
    }
    let chinese = is_chinese(language);
    match model_type {
        ModelType::Gemini => format_tagged(tagged_instructions(chinese), &lines, original_message),
        ModelType::Qwen => format_plain(&framing(chinese, true), &lines, original_message, false),
        ModelType::Default => {
            format_plain(&framing(chinese, false), &lines, original_message, true)
        }
    }
}
