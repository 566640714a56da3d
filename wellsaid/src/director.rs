//! AI-director tag helpers.
//!
//! WellSaid delivery markup wraps text in partial-XML tags that the
//! synthesis models interpret: `<pitch>`, `<tempo>`, `<loudness>` and
//! `<respell>`. These helpers build well-formed tags; range and grammar
//! enforcement lives in `voxkit_compose::validate`.

use once_cell::sync::Lazy;
use regex::Regex;

use voxkit_compose::{Respelling, VoiceParameters};

/// Wraps text with a pitch adjustment tag. Valid range -250 to +500.
pub fn wrap_pitch(text: &str, value: i32) -> String {
    format!(r#"<pitch value="{}">{}</pitch>"#, value, text)
}

/// Wraps text with a tempo adjustment tag. Valid range 0.5 to 2.5.
pub fn wrap_tempo(text: &str, value: f64) -> String {
    format!(r#"<tempo value="{}">{}</tempo>"#, value, text)
}

/// Wraps text with a loudness adjustment tag. Valid range -20 to +10.
pub fn wrap_loudness(text: &str, value: i32) -> String {
    format!(r#"<loudness value="{}">{}</loudness>"#, value, text)
}

/// Wraps a word with a respell tag carrying its phonetic override.
pub fn respell(word: &str, phonetic: &str) -> String {
    format!(r#"<respell value="{}">{}</respell>"#, phonetic, word)
}

/// Applies every voice parameter override as nested tags, innermost
/// pitch, then tempo, then loudness.
pub fn apply_voice(text: &str, voice: &VoiceParameters) -> String {
    let mut text = text.to_string();
    if let Some(pitch) = voice.pitch {
        text = wrap_pitch(&text, pitch);
    }
    if let Some(tempo) = voice.tempo {
        text = wrap_tempo(&text, tempo);
    }
    if let Some(loudness) = voice.loudness {
        text = wrap_loudness(&text, loudness);
    }
    text
}

/// Rewrites each respelled word in the text as a respell tag. Matching
/// is case-insensitive and whole-word; the original spelling is kept
/// as the tag body.
pub fn apply_respellings(text: &str, respellings: &[Respelling]) -> String {
    let mut out = text.to_string();
    for r in respellings {
        let pattern = format!(r"(?i)\b{}\b", regex::escape(&r.word));
        if let Ok(re) = Regex::new(&pattern) {
            out = re
                .replace_all(&out, |caps: &regex::Captures| {
                    respell(&caps[0], &r.phonetic)
                })
                .into_owned();
        }
    }
    out
}

static TAG_BODY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<([a-z]+)[^>]*?>(.*?)</([a-z]+)>").unwrap());

/// Returns the inner text of every occurrence of the given tag.
pub fn extract_tagged(text: &str, tag: &str) -> Vec<String> {
    TAG_BODY_RE
        .captures_iter(text)
        .filter(|caps| &caps[1] == tag && &caps[3] == tag)
        .map(|caps| caps[2].to_string())
        .collect()
}

#[cfg(test)]
mod director_tests {
    use super::*;

    #[test]
    fn test_wrappers() {
        assert_eq!(
            wrap_pitch("Hello", 150),
            r#"<pitch value="150">Hello</pitch>"#
        );
        assert_eq!(
            respell("Wendy", "WEHN-dee"),
            r#"<respell value="WEHN-dee">Wendy</respell>"#
        );
    }

    #[test]
    fn test_apply_voice_nesting_order() {
        let voice = VoiceParameters {
            pitch: Some(100),
            tempo: Some(1.2),
            loudness: Some(-3),
        };
        let tagged = apply_voice("Hi", &voice);
        assert_eq!(
            tagged,
            r#"<loudness value="-3"><tempo value="1.2"><pitch value="100">Hi</pitch></tempo></loudness>"#
        );
    }

    #[test]
    fn test_apply_respellings_whole_word() {
        let respellings = vec![Respelling {
            word: "cat".to_string(),
            phonetic: "KAT".to_string(),
        }];
        let out = apply_respellings("The cat sat near the cathedral", &respellings);
        assert_eq!(
            out,
            r#"The <respell value="KAT">cat</respell> sat near the cathedral"#
        );
    }

    #[test]
    fn test_extract_tagged() {
        let text = r#"<pitch value="1">one</pitch> plain <pitch value="2">two</pitch>"#;
        assert_eq!(extract_tagged(text, "pitch"), vec!["one", "two"]);
        assert!(extract_tagged(text, "tempo").is_empty());
    }
}
