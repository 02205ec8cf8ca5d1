use serde::Serialize;

/// Words per minute used for the reading-time estimate.
pub const READING_SPEED_WPM: f64 = 200.0;

/// Text statistics for a document body. Always recomputed from scratch.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub word_count: usize,
    /// Unicode scalar values in the trimmed text
    pub character_count: usize,
    pub sentence_count: usize,
    pub paragraph_count: usize,
    pub average_words_per_sentence: f64,
    pub reading_time_minutes: f64,
}

pub fn calculate_statistics(text: &str) -> Statistics {
    let text = text.trim();

    let word_count = text.split_whitespace().count();
    // UTF-16 code units, so astral characters count twice
    let character_count = text.encode_utf16().count();
    let paragraph_count = count_paragraphs(text);

    let sentence_count = text
        .split(['.', '!', '?'])
        .filter(|sentence| !sentence.trim().is_empty())
        .count();

    let average_words_per_sentence = if sentence_count > 0 {
        word_count as f64 / sentence_count as f64
    } else {
        0.0
    };

    Statistics {
        word_count,
        character_count,
        sentence_count,
        paragraph_count,
        average_words_per_sentence: round_one_decimal(average_words_per_sentence),
        reading_time_minutes: round_one_decimal(word_count as f64 / READING_SPEED_WPM),
    }
}

/// Human-readable reading time, e.g. `"3 minutes"`.
pub fn format_reading_time(minutes: f64) -> String {
    if minutes < 1.0 {
        return "Less than a minute".to_string();
    }

    let rounded = minutes.round() as u64;
    format!("{} minute{}", rounded, if rounded != 1 { "s" } else { "" })
}

/// Paragraphs are runs of non-blank lines separated by one or more blank lines.
fn count_paragraphs(text: &str) -> usize {
    let mut count = 0;
    let mut in_paragraph = false;

    for line in text.lines() {
        if line.trim().is_empty() {
            in_paragraph = false;
        } else if !in_paragraph {
            in_paragraph = true;
            count += 1;
        }
    }

    count
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_all_zero() {
        let stats = calculate_statistics("");
        assert_eq!(stats, Statistics::default());

        let stats = calculate_statistics("   \n\n\t ");
        assert_eq!(stats.word_count, 0);
        assert_eq!(stats.paragraph_count, 0);
        assert_eq!(stats.sentence_count, 0);
        assert_eq!(stats.average_words_per_sentence, 0.0);
    }

    #[test]
    fn counts_words_sentences_and_paragraphs() {
        let text = "  The quick fox jumps. It runs away!\n\nDoes it return? Never...  ";
        let stats = calculate_statistics(text);

        assert_eq!(stats.word_count, 11);
        assert_eq!(stats.sentence_count, 4);
        assert_eq!(stats.paragraph_count, 2);
        assert_eq!(stats.character_count, text.trim().chars().count());
        assert_eq!(stats.average_words_per_sentence, 2.8);
    }

    #[test]
    fn characters_are_counted_in_utf16_units() {
        assert_eq!(calculate_statistics("😀").character_count, 2);
        assert_eq!(calculate_statistics(" café 😀 ").character_count, 7);
    }

    #[test]
    fn blank_lines_with_whitespace_split_paragraphs() {
        let stats = calculate_statistics("one\n   \ntwo\nstill two\n\n\n\nthree");
        assert_eq!(stats.paragraph_count, 3);
    }

    #[test]
    fn sentence_without_terminator_still_counts() {
        let stats = calculate_statistics("no punctuation here");
        assert_eq!(stats.sentence_count, 1);
        assert_eq!(stats.average_words_per_sentence, 3.0);
    }

    #[test]
    fn punctuation_only_is_not_a_sentence() {
        let stats = calculate_statistics("?!... ...");
        assert_eq!(stats.sentence_count, 0);
        assert_eq!(stats.word_count, 2);
    }

    #[test]
    fn reading_time_rounds_to_one_decimal() {
        let text = vec!["word"; 250].join(" ");
        let stats = calculate_statistics(&text);
        assert_eq!(stats.word_count, 250);
        assert_eq!(stats.reading_time_minutes, 1.3);
    }

    #[test]
    fn average_rounds_to_one_decimal() {
        let stats = calculate_statistics("one two. three four five. six seven.");
        // 7 words / 3 sentences
        assert_eq!(stats.average_words_per_sentence, 2.3);
    }

    #[test]
    fn format_reading_time_thresholds() {
        assert_eq!(format_reading_time(0.0), "Less than a minute");
        assert_eq!(format_reading_time(0.5), "Less than a minute");
        assert_eq!(format_reading_time(1.0), "1 minute");
        assert_eq!(format_reading_time(1.4), "1 minute");
        assert_eq!(format_reading_time(2.0), "2 minutes");
        assert_eq!(format_reading_time(12.6), "13 minutes");
    }
}
