// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Language steering and system prompt policy.
//!
//! Small models code-switch back to their training-majority language when
//! given a single instruction, so the non-default prompt repeats the
//! directive at the start, the middle, and the end, and the last user
//! message additionally carries an inline instruction. Treat the wording as
//! tunable policy, not a contract.

use vidya_core::{ChatTurn, Role};

/// Language the providers answer in when nothing else is requested.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Display name for a supported language code; unknown codes read as the
/// default.
pub fn language_name(code: &str) -> &'static str {
    match code {
        "en" => "English",
        "hi" => "Hindi",
        "ta" => "Tamil",
        "te" => "Telugu",
        "kn" => "Kannada",
        "ml" => "Malayalam",
        "bn" => "Bengali",
        "mr" => "Marathi",
        "gu" => "Gujarati",
        "pa" => "Punjabi",
        _ => "English",
    }
}

/// Build the tutor system prompt for the direct LLM path.
pub fn system_prompt(language: &str) -> String {
    if language == DEFAULT_LANGUAGE {
        return "You are a patient school tutor helping students learn.\n\
                \n\
                For math and science questions, work through the solution in \
                numbered steps, show every calculation, and explain the reasoning \
                behind each step in plain words. For concept questions, open with a \
                short definition, then build it up with examples and analogies a \
                student would recognize.\n\
                \n\
                Keep answers organized with headings and bullet points where they \
                help, define any technical term you introduce, and stay \
                encouraging. Clarity matters more than brevity."
            .to_string();
    }

    let name = language_name(language);
    let upper = name.to_uppercase();
    format!(
        "MANDATORY: WRITE YOUR ENTIRE REPLY IN {upper}.\n\
         \n\
         You are a patient school tutor helping students learn in {name}. Even \
         when the question arrives in English, answer in {name}. Translate any \
         English source material into {name} before using it.\n\
         \n\
         Work through math and science step by step with numbered steps in \
         {name}, explain ideas with examples familiar to {name} speakers, and \
         stay encouraging. REMEMBER WHILE WRITING: every sentence must be in \
         {name}, not English.\n\
         \n\
         FINAL RULE: the reply, from the first word to the last, must be \
         written in {upper}."
    )
}

/// For non-default languages, prepend an inline directive to the last user
/// turn -- the single place the model reads most closely.
pub fn steer_last_user_turn(history: &mut [ChatTurn], language: &str) {
    if language == DEFAULT_LANGUAGE {
        return;
    }
    if let Some(last) = history.last_mut() {
        if last.role == Role::User {
            let name = language_name(language);
            last.content = format!("[Answer ONLY in {name}] {}", last.content);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_prompt_has_no_language_directives() {
        let prompt = system_prompt("en");
        assert!(!prompt.contains("MANDATORY"));
        assert!(prompt.contains("tutor"));
    }

    #[test]
    fn non_default_prompt_repeats_the_directive() {
        let prompt = system_prompt("hi");
        // Stated at the start, the middle, and the end.
        assert!(prompt.starts_with("MANDATORY: WRITE YOUR ENTIRE REPLY IN HINDI."));
        assert!(prompt.contains("REMEMBER WHILE WRITING"));
        assert!(prompt.contains("FINAL RULE"));
        assert_eq!(prompt.matches("HINDI").count(), 2);
    }

    #[test]
    fn unknown_codes_fall_back_to_english() {
        assert_eq!(language_name("xx"), "English");
    }

    #[test]
    fn steering_rewrites_only_the_last_user_turn() {
        let mut history = vec![
            ChatTurn {
                role: Role::User,
                content: "first".to_string(),
            },
            ChatTurn {
                role: Role::Assistant,
                content: "reply".to_string(),
            },
            ChatTurn {
                role: Role::User,
                content: "what is light?".to_string(),
            },
        ];
        steer_last_user_turn(&mut history, "ta");
        assert_eq!(history[0].content, "first");
        assert_eq!(history[2].content, "[Answer ONLY in Tamil] what is light?");
    }

    #[test]
    fn steering_is_a_no_op_for_the_default_language() {
        let mut history = vec![ChatTurn {
            role: Role::User,
            content: "hello".to_string(),
        }];
        steer_last_user_turn(&mut history, "en");
        assert_eq!(history[0].content, "hello");
    }

    #[test]
    fn steering_skips_when_last_turn_is_assistant() {
        let mut history = vec![ChatTurn {
            role: Role::Assistant,
            content: "reply".to_string(),
        }];
        steer_last_user_turn(&mut history, "hi");
        assert_eq!(history[0].content, "reply");
    }
}
