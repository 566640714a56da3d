//! Pre-flight script validation.
//!
//! Every check here is local and pure: numeric voice parameters against
//! their legal ranges, delivery markup against the provider's tag
//! grammar, and respellings against the segment text. A script that
//! fails validation never costs a network round trip.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::script::{
    Script, Segment, LOUDNESS_MAX, LOUDNESS_MIN, PITCH_MAX, PITCH_MIN, TEMPO_MAX, TEMPO_MIN,
};

/// Delivery tag names understood by the provider.
pub const KNOWN_TAGS: &[&str] = &["pitch", "tempo", "loudness", "respell"];

/// A single validation failure within one segment.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub enum ValidationError {
    /// A numeric voice parameter lies outside its closed interval.
    #[error("{field} value {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// The delivery markup is not well-formed.
    #[error("malformed markup at byte {position}: {tag}")]
    MalformedMarkup { position: usize, tag: String },

    /// A respelling does not apply to the segment text.
    #[error("invalid respelling for word {word:?}")]
    InvalidRespelling { word: String },
}

/// All validation failures for one segment.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentErrors {
    /// Index of the offending segment.
    pub index: usize,
    /// Every failure found in that segment.
    pub errors: Vec<ValidationError>,
}

/// Validates every segment of a script.
///
/// All segments are checked, and all fields of each segment, so a
/// caller sees the full set of problems in one pass rather than the
/// first one found.
pub fn validate_script(script: &Script) -> Result<(), Vec<SegmentErrors>> {
    let mut failures = Vec::new();

    for segment in &script.segments {
        let errors = validate_segment(segment);
        if !errors.is_empty() {
            failures.push(SegmentErrors {
                index: segment.index,
                errors,
            });
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(failures)
    }
}

/// Validates a single segment, returning every failure found.
pub fn validate_segment(segment: &Segment) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(voice) = &segment.voice {
        check_ranges(voice, &mut errors);
    }

    if !segment.director_tags.is_empty() {
        check_markup(&segment.director_tags, &mut errors);
    }

    for respelling in &segment.respellings {
        if !respelling_applies(&segment.text, &respelling.word, &respelling.phonetic) {
            errors.push(ValidationError::InvalidRespelling {
                word: respelling.word.clone(),
            });
        }
    }

    errors
}

fn check_ranges(voice: &crate::script::VoiceParameters, errors: &mut Vec<ValidationError>) {
    if let Some(pitch) = voice.pitch {
        if !(PITCH_MIN..=PITCH_MAX).contains(&pitch) {
            errors.push(ValidationError::OutOfRange {
                field: "pitch",
                value: pitch as f64,
                min: PITCH_MIN as f64,
                max: PITCH_MAX as f64,
            });
        }
    }
    if let Some(tempo) = voice.tempo {
        if !(TEMPO_MIN..=TEMPO_MAX).contains(&tempo) {
            errors.push(ValidationError::OutOfRange {
                field: "tempo",
                value: tempo,
                min: TEMPO_MIN,
                max: TEMPO_MAX,
            });
        }
    }
    if let Some(loudness) = voice.loudness {
        if !(LOUDNESS_MIN..=LOUDNESS_MAX).contains(&loudness) {
            errors.push(ValidationError::OutOfRange {
                field: "loudness",
                value: loudness as f64,
                min: LOUDNESS_MIN as f64,
                max: LOUDNESS_MAX as f64,
            });
        }
    }
}

static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<(/?)([A-Za-z][A-Za-z0-9_]*)(\s+value="[^"]*")?\s*>"#).unwrap()
});

/// Checks the delivery markup grammar: balanced delimiters, recognized
/// tag names only, no nesting of the same tag kind.
fn check_markup(markup: &str, errors: &mut Vec<ValidationError>) {
    let mut stack: Vec<(usize, &str)> = Vec::new();
    let mut covered = 0usize;
    let mut balanced = true;

    for caps in TAG_RE.captures_iter(markup) {
        let whole = caps.get(0).unwrap();
        let closing = !caps[1].is_empty();
        let name_match = caps.get(2).unwrap();
        let position = whole.start();

        // A bare '<' or '>' between tags means the delimiters are
        // unbalanced.
        if markup[covered..position].contains(['<', '>']) {
            balanced = false;
        }
        covered = whole.end();

        let name = name_match.as_str();
        let known = KNOWN_TAGS.contains(&name);
        if !known {
            errors.push(ValidationError::MalformedMarkup {
                position,
                tag: name.to_string(),
            });
        }

        if closing {
            match stack.pop() {
                Some((_, open)) if open.eq_ignore_ascii_case(name) => {}
                _ => {
                    errors.push(ValidationError::MalformedMarkup {
                        position,
                        tag: format!("</{}>", name),
                    });
                    // Resync so later errors stay meaningful.
                    stack.clear();
                }
            }
        } else if known {
            if stack.iter().any(|(_, open)| open.eq_ignore_ascii_case(name)) {
                errors.push(ValidationError::MalformedMarkup {
                    position,
                    tag: format!("nested <{}>", name),
                });
            }
            if caps.get(3).is_none() {
                errors.push(ValidationError::MalformedMarkup {
                    position,
                    tag: format!("<{}> missing value", name),
                });
            }
            stack.push((position, name));
        }
    }

    if markup[covered..].contains(['<', '>']) {
        balanced = false;
    }
    if !balanced {
        errors.push(ValidationError::MalformedMarkup {
            position: 0,
            tag: "unbalanced tag delimiters".to_string(),
        });
    }

    for (position, name) in stack {
        errors.push(ValidationError::MalformedMarkup {
            position,
            tag: format!("unclosed <{}>", name),
        });
    }
}

/// Checks that a respelling names a word present in the text and
/// supplies a well-formed phonetic replacement.
fn respelling_applies(text: &str, word: &str, phonetic: &str) -> bool {
    if word.is_empty() || phonetic.is_empty() {
        return false;
    }
    contains_word(text, word) && phonetic_well_formed(phonetic)
}

/// Case-insensitive whole-word search.
fn contains_word(text: &str, word: &str) -> bool {
    let text = text.to_lowercase();
    let word = word.to_lowercase();
    let mut start = 0;

    while let Some(pos) = text[start..].find(&word) {
        let begin = start + pos;
        let end = begin + word.len();
        let before_ok = text[..begin]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = text[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        if before_ok && after_ok {
            return true;
        }
        start = begin + 1;
    }
    false
}

/// Phonetic respellings are hyphen-delimited ASCII sections; a section
/// may not mix upper and lower case (capitals mark emphasis).
fn phonetic_well_formed(phonetic: &str) -> bool {
    phonetic.split('-').all(|section| {
        !section.is_empty()
            && section.chars().all(|c| c.is_ascii_alphabetic())
            && (section.chars().all(|c| c.is_ascii_uppercase())
                || section.chars().all(|c| c.is_ascii_lowercase()))
    })
}

#[cfg(test)]
mod validate_tests {
    use super::*;
    use crate::script::{Respelling, VoiceParameters};

    fn segment(text: &str) -> Segment {
        Segment {
            speaker_id: "3".to_string(),
            text: text.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_pitch_out_of_range() {
        let mut seg = segment("Hello");
        seg.voice = Some(VoiceParameters {
            pitch: Some(600),
            ..Default::default()
        });
        let errors = validate_segment(&seg);
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0],
            ValidationError::OutOfRange { field: "pitch", .. }
        ));
    }

    #[test]
    fn test_all_range_violations_reported() {
        let mut seg = segment("Hello");
        seg.voice = Some(VoiceParameters {
            pitch: Some(-300),
            tempo: Some(3.0),
            loudness: Some(11),
        });
        let errors = validate_segment(&seg);
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_boundary_values_accepted() {
        let mut seg = segment("Hello");
        seg.voice = Some(VoiceParameters {
            pitch: Some(500),
            tempo: Some(0.5),
            loudness: Some(-20),
        });
        assert!(validate_segment(&seg).is_empty());
    }

    #[test]
    fn test_well_formed_markup() {
        let mut seg = segment("Hello");
        seg.director_tags =
            r#"<pitch value="100"><tempo value="1.2">Hello</tempo></pitch>"#.to_string();
        assert!(validate_segment(&seg).is_empty());
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let mut seg = segment("Hello");
        seg.director_tags = r#"<shout value="1">Hello</shout>"#.to_string();
        let errors = validate_segment(&seg);
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::MalformedMarkup { tag, .. } if tag == "shout")));
    }

    #[test]
    fn test_unclosed_tag_rejected() {
        let mut seg = segment("Hello");
        seg.director_tags = r#"<pitch value="100">Hello"#.to_string();
        let errors = validate_segment(&seg);
        assert!(errors.iter().any(|e| matches!(
            e,
            ValidationError::MalformedMarkup { tag, .. } if tag.contains("unclosed")
        )));
    }

    #[test]
    fn test_same_kind_nesting_rejected() {
        let mut seg = segment("Hello");
        seg.director_tags =
            r#"<pitch value="1"><pitch value="2">Hi</pitch></pitch>"#.to_string();
        let errors = validate_segment(&seg);
        assert!(errors.iter().any(|e| matches!(
            e,
            ValidationError::MalformedMarkup { tag, .. } if tag.contains("nested")
        )));
    }

    #[test]
    fn test_stray_bracket_rejected() {
        let mut seg = segment("Hello");
        seg.director_tags = r#"2 < 3 and <pitch value="1">x</pitch>"#.to_string();
        let errors = validate_segment(&seg);
        assert!(errors.iter().any(|e| matches!(
            e,
            ValidationError::MalformedMarkup { tag, .. } if tag.contains("unbalanced")
        )));
    }

    #[test]
    fn test_respelling_word_must_appear() {
        let mut seg = segment("Say hello to Wendy");
        seg.respellings = vec![Respelling {
            word: "wendy".to_string(),
            phonetic: "WEHN-dee".to_string(),
        }];
        assert!(validate_segment(&seg).is_empty());

        seg.respellings = vec![Respelling {
            word: "nigel".to_string(),
            phonetic: "NY-juhl".to_string(),
        }];
        let errors = validate_segment(&seg);
        assert!(matches!(
            errors[0],
            ValidationError::InvalidRespelling { ref word } if word == "nigel"
        ));
    }

    #[test]
    fn test_respelling_substring_is_not_a_word() {
        let mut seg = segment("The cathedral is tall");
        seg.respellings = vec![Respelling {
            word: "cat".to_string(),
            phonetic: "KAT".to_string(),
        }];
        assert_eq!(validate_segment(&seg).len(), 1);
    }

    #[test]
    fn test_mixed_case_phonetic_section_rejected() {
        let mut seg = segment("Hello Wendy");
        seg.respellings = vec![Respelling {
            word: "Wendy".to_string(),
            phonetic: "Wehn-dee".to_string(),
        }];
        assert_eq!(validate_segment(&seg).len(), 1);
    }

    #[test]
    fn test_script_reports_every_failing_segment() {
        let mut bad_a = segment("a");
        bad_a.voice = Some(VoiceParameters {
            pitch: Some(999),
            ..Default::default()
        });
        let mut bad_b = segment("b");
        bad_b.director_tags = "<bogus value=\"1\">b</bogus>".to_string();

        let script = Script::new(vec![bad_a, segment("fine"), bad_b]);
        let failures = validate_script(&script).unwrap_err();
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].index, 0);
        assert_eq!(failures[1].index, 2);
    }
}
