//! Unit tests for `prompt` language/model detection and `format_memory_prompt`.
//!
//! External interactions: none (pure function tests).

use chrono::{TimeZone, Utc};
use memos_core::Memory;
use prompt::{
    detect_language, detect_model_type, format_memory_prompt, resolve_language, ModelType,
    LANGUAGE_AUTO,
};

fn sample_memories() -> Vec<Memory> {
    vec![
        Memory::new("User's cat is named Mochi."),
        Memory::new("User prefers answers in bullet points."),
    ]
}

const ALL_MODEL_TYPES: [ModelType; 3] = [ModelType::Default, ModelType::Qwen, ModelType::Gemini];

/// **Test: Mixed CJK and ASCII text is Chinese.**
#[test]
fn detect_language_mixed_is_zh() {
    assert_eq!(detect_language("你好 hello"), "zh");
}

/// **Test: Pure ASCII letters are English.**
#[test]
fn detect_language_ascii_is_en() {
    assert_eq!(detect_language("hello there"), "en");
}

/// **Test: No letters and no CJK falls back to Chinese.**
#[test]
fn detect_language_digits_default_to_zh() {
    assert_eq!(detect_language("12345"), "zh");
    assert_eq!(detect_language(""), "zh");
}

/// **Test: Non-ASCII letters without CJK (e.g. accented only) do not count as English letters.**
#[test]
fn detect_language_non_ascii_letters_only_is_zh() {
    assert_eq!(detect_language("éè"), "zh");
    assert_eq!(detect_language("café"), "en");
}

/// **Test: Configured language is used verbatim unless it is "auto".**
#[test]
fn resolve_language_respects_configuration() {
    assert_eq!(resolve_language(LANGUAGE_AUTO, "hello"), "en");
    assert_eq!(resolve_language("zh", "hello"), "zh");
    assert_eq!(resolve_language("ja", "你好"), "ja");
}

/// **Test: Model detection is case-insensitive and qwen wins over gemini.**
#[test]
fn detect_model_type_cases() {
    assert_eq!(detect_model_type(Some("Qwen-Max")), ModelType::Qwen);
    assert_eq!(detect_model_type(Some("gemini-1.5-pro")), ModelType::Gemini);
    assert_eq!(detect_model_type(Some("gpt-4o")), ModelType::Default);
    assert_eq!(detect_model_type(Some("qwen-gemini-merge")), ModelType::Qwen);
    assert_eq!(detect_model_type(Some("")), ModelType::Default);
    assert_eq!(detect_model_type(None), ModelType::Default);
}

/// **Test: The original message is a contiguous substring for every (language, model_type).**
#[test]
fn format_contains_original_for_all_combinations() {
    let original = "What should I feed my cat?\nShe is 3 years old.";
    for language in ["zh", "en", "ja"] {
        for model_type in ALL_MODEL_TYPES {
            let out = format_memory_prompt(original, &sample_memories(), language, model_type);
            assert!(
                out.contains(original),
                "missing original for {language}/{model_type}: {out}"
            );
        }
    }
}

/// **Test: Every memory's content appears in the output.**
#[test]
fn format_contains_all_memories() {
    for model_type in ALL_MODEL_TYPES {
        let out = format_memory_prompt("hi", &sample_memories(), "en", model_type);
        assert!(out.contains("User's cat is named Mochi."));
        assert!(out.contains("User prefers answers in bullet points."));
    }
}

/// **Test: Identical inputs give identical output.**
#[test]
fn format_is_deterministic() {
    let memories = sample_memories();
    for model_type in ALL_MODEL_TYPES {
        let a = format_memory_prompt("你好", &memories, "zh", model_type);
        let b = format_memory_prompt("你好", &memories, "zh", model_type);
        assert_eq!(a, b);
    }
}

/// **Test: Framing text follows the language.**
#[test]
fn format_uses_language_specific_framing() {
    let en = format_memory_prompt("hi", &sample_memories(), "en", ModelType::Default);
    assert!(en.contains("Relevant memories:"));
    assert!(en.contains("User message:"));

    let zh = format_memory_prompt("你好", &sample_memories(), "zh", ModelType::Default);
    assert!(zh.contains("相关记忆："));
    assert!(zh.contains("用户消息："));

    let zh_cn = format_memory_prompt("你好", &sample_memories(), "zh-CN", ModelType::Default);
    assert!(zh_cn.contains("相关记忆："));

    let other = format_memory_prompt("hola", &sample_memories(), "es", ModelType::Default);
    assert!(other.contains("Relevant memories:"));
}

/// **Test: Framing structure follows the model type.**
#[test]
fn format_varies_structure_by_model_type() {
    let default = format_memory_prompt("hi", &sample_memories(), "en", ModelType::Default);
    assert!(default.contains("1. User's cat is named Mochi."));
    assert!(default.ends_with("User message:\nhi"));

    let qwen = format_memory_prompt("hi", &sample_memories(), "en", ModelType::Qwen);
    assert!(qwen.contains("Follow these rules strictly"));
    assert!(qwen.contains("- User's cat is named Mochi."));
    assert!(qwen.ends_with("Current user message:\nhi"));

    let gemini = format_memory_prompt("hi", &sample_memories(), "en", ModelType::Gemini);
    assert!(gemini.starts_with("<memories>"));
    assert!(gemini.contains("<memory index=\"2\">User prefers answers in bullet points.</memory>"));
    assert!(gemini.ends_with("<user_message>\nhi\n</user_message>"));

    assert_ne!(default, qwen);
    assert_ne!(qwen, gemini);
}

/// **Test: Memories with a timestamp are prefixed with their date.**
#[test]
fn format_prefixes_dated_memories() {
    let at = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();
    let memories = vec![Memory::new("Moved to Berlin.").with_created_at(at)];
    let out = format_memory_prompt("where do I live?", &memories, "en", ModelType::Default);
    assert!(out.contains("1. [2024-05-01] Moved to Berlin."));
}

/// **Test: Blank memories are skipped and numbering stays contiguous.**
#[test]
fn format_skips_blank_memories() {
    let memories = vec![
        Memory::new("first"),
        Memory::new("   "),
        Memory::new("second"),
    ];
    let out = format_memory_prompt("q", &memories, "en", ModelType::Default);
    assert!(out.contains("1. first\n2. second\n"));
    assert!(!out.contains("3."));
}

/// **Test: Only blank memories leave the message untouched.**
#[test]
fn format_with_only_blank_memories_returns_original() {
    let memories = vec![Memory::new(""), Memory::new("\n")];
    assert_eq!(
        format_memory_prompt("unchanged", &memories, "en", ModelType::Qwen),
        "unchanged"
    );
}
