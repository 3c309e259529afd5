//! Segment reconstruction: diarized word lists to readable transcript segments.

use crate::defaults;
use crate::pipeline::types::{RecognitionResult, TranscriptSegment};

/// Formats a chunk-relative offset as `MM:SS` (e.g. 75s becomes "01:15").
pub fn format_timestamp(secs: f64) -> String {
    let total = secs.max(0.0).floor() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Renders a speaker tag as a display label.
fn speaker_label(tag: u32) -> String {
    format!("{} {}", defaults::SPEAKER_LABEL_PREFIX, tag)
}

/// Converts one chunk's recognition result into ordered transcript segments.
///
/// A deterministic, pure transformation: segment boundaries occur exactly
/// where the speaker tag changes, words of a run are joined by single
/// spaces, and each segment is stamped with the chunk-relative timestamp of
/// its first word.
///
/// When the service returned no per-word speaker tags but a flat transcript,
/// the whole chunk collapses to one placeholder-speaker segment whose start
/// is estimated from the word count at an assumed speaking rate — lower
/// fidelity is preferred over dropping content. An empty result yields zero
/// segments; silence is a valid outcome, not an error.
pub fn reconstruct(
    result: &RecognitionResult,
    chunk_duration_secs: f64,
    session_id: &str,
) -> Vec<TranscriptSegment> {
    if !result.words.is_empty() {
        return reconstruct_words(result, session_id);
    }

    let transcript = result.transcript.trim();
    if transcript.is_empty() {
        return Vec::new();
    }

    // Fallback: no diarization. Assume the speech filled the tail of the
    // chunk and estimate its start from the word count.
    let word_count = transcript.split_whitespace().count();
    let spoken_secs = word_count as f64 / defaults::FALLBACK_WORDS_PER_SEC;
    let start_secs = (chunk_duration_secs - spoken_secs).max(0.0);

    vec![TranscriptSegment {
        speaker: defaults::FALLBACK_SPEAKER.to_string(),
        text: transcript.to_string(),
        timestamp: format_timestamp(start_secs),
        session_id: session_id.to_string(),
    }]
}

fn reconstruct_words(result: &RecognitionResult, session_id: &str) -> Vec<TranscriptSegment> {
    let mut segments = Vec::new();
    let mut current_speaker: Option<u32> = None;
    let mut current_text = String::new();
    let mut segment_start = 0.0f64;

    for word in &result.words {
        match current_speaker {
            Some(speaker) if speaker == word.speaker_tag => {
                current_text.push(' ');
                current_text.push_str(&word.text);
            }
            _ => {
                if let Some(speaker) = current_speaker {
                    push_segment(
                        &mut segments,
                        speaker,
                        &current_text,
                        segment_start,
                        session_id,
                    );
                }
                current_speaker = Some(word.speaker_tag);
                current_text = word.text.clone();
                segment_start = word.start_secs;
            }
        }
    }

    if let Some(speaker) = current_speaker {
        push_segment(
            &mut segments,
            speaker,
            &current_text,
            segment_start,
            session_id,
        );
    }

    segments
}

fn push_segment(
    segments: &mut Vec<TranscriptSegment>,
    speaker: u32,
    text: &str,
    start_secs: f64,
    session_id: &str,
) {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return;
    }
    segments.push(TranscriptSegment {
        speaker: speaker_label(speaker),
        text: trimmed.to_string(),
        timestamp: format_timestamp(start_secs),
        session_id: session_id.to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::RecognitionWord;

    fn words(entries: &[(&str, u32, f64)]) -> RecognitionResult {
        RecognitionResult::from_words(
            entries.iter()
                .map(|(text, tag, start)| RecognitionWord::new(text, *tag, *start))
                .collect(),
        )
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "00:00");
        assert_eq!(format_timestamp(1.1), "00:01");
        assert_eq!(format_timestamp(59.9), "00:59");
        assert_eq!(format_timestamp(60.0), "01:00");
        assert_eq!(format_timestamp(75.0), "01:15");
        assert_eq!(format_timestamp(3600.0), "60:00");
    }

    #[test]
    fn test_format_timestamp_clamps_negative() {
        assert_eq!(format_timestamp(-3.0), "00:00");
    }

    #[test]
    fn test_speaker_change_creates_segments() {
        let result = words(&[("hi", 1, 0.0), ("there", 1, 0.4), ("hello", 2, 1.1)]);
        let segments = reconstruct(&result, 5.0, "s1");

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].speaker, "Speaker 1");
        assert_eq!(segments[0].text, "hi there");
        assert_eq!(segments[0].timestamp, "00:00");
        assert_eq!(segments[1].speaker, "Speaker 2");
        assert_eq!(segments[1].text, "hello");
        assert_eq!(segments[1].timestamp, "00:01");
    }

    #[test]
    fn test_single_speaker_yields_one_segment() {
        let result = words(&[("one", 3, 0.0), ("two", 3, 0.5), ("three", 3, 1.0)]);
        let segments = reconstruct(&result, 5.0, "s1");

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].speaker, "Speaker 3");
        assert_eq!(segments[0].text, "one two three");
    }

    #[test]
    fn test_alternating_speakers() {
        let result = words(&[("a", 1, 0.0), ("b", 2, 1.0), ("c", 1, 2.0)]);
        let segments = reconstruct(&result, 5.0, "s1");

        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].speaker, "Speaker 1");
        assert_eq!(segments[1].speaker, "Speaker 2");
        assert_eq!(segments[2].speaker, "Speaker 1");
        assert_eq!(segments[2].timestamp, "00:02");
    }

    #[test]
    fn test_empty_word_list_yields_zero_segments() {
        let segments = reconstruct(&RecognitionResult::default(), 5.0, "s1");
        assert!(segments.is_empty());
    }

    #[test]
    fn test_reconstruction_is_deterministic() {
        let result = words(&[("hi", 1, 0.0), ("there", 1, 0.4), ("hello", 2, 1.1)]);
        let first = reconstruct(&result, 5.0, "s1");
        let second = reconstruct(&result, 5.0, "s1");
        assert_eq!(first, second);
    }

    #[test]
    fn test_flat_transcript_falls_back_to_placeholder_speaker() {
        let result = RecognitionResult::from_transcript("we should ship on friday");
        let segments = reconstruct(&result, 5.0, "s1");

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].speaker, "Speaker");
        assert_eq!(segments[0].text, "we should ship on friday");
        // 5 words at 2.5 words/sec = 2s of speech, estimated to start at 3s
        assert_eq!(segments[0].timestamp, "00:03");
    }

    #[test]
    fn test_flat_transcript_longer_than_chunk_starts_at_zero() {
        let many_words = vec!["word"; 100].join(" ");
        let result = RecognitionResult::from_transcript(&many_words);
        let segments = reconstruct(&result, 5.0, "s1");

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].timestamp, "00:00");
    }

    #[test]
    fn test_segments_carry_session_id() {
        let result = words(&[("hi", 1, 0.0)]);
        let segments = reconstruct(&result, 5.0, "meeting-42");
        assert_eq!(segments[0].session_id, "meeting-42");
    }

    #[test]
    fn test_whitespace_only_run_is_dropped() {
        let result = words(&[("  ", 1, 0.0), ("hello", 2, 1.0)]);
        let segments = reconstruct(&result, 5.0, "s1");

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].speaker, "Speaker 2");
    }

    #[test]
    fn test_timestamps_from_late_chunk_offsets() {
        // Words deep into a long chunk keep chunk-relative stamps
        let result = words(&[("late", 1, 130.2)]);
        let segments = reconstruct(&result, 180.0, "s1");
        assert_eq!(segments[0].timestamp, "02:10");
    }
}
