//! Vietnamese-aware string ordering.
//!
//! Letters compare by base letter first (`a < ă < â < b < … < d < đ < e < ê …`),
//! then by tone mark, then by case. Tones order as in Vietnamese dictionaries:
//! level, grave, hook, tilde, acute, dot below.

use std::cmp::Ordering;

const ALPHABET: &str = "aăâbcdđeêfghijklmnoôơpqrstuưvwxyz";

/// Each row is a base vowel followed by its toned forms in tone order.
const TONED_VOWELS: [&str; 12] = [
    "aàảãáạ", "ăằẳẵắặ", "âầẩẫấậ", "eèẻẽéẹ", "êềểễếệ", "iìỉĩíị", "oòỏõóọ", "ôồổỗốộ",
    "ơờởỡớợ", "uùủũúụ", "ưừửữứự", "yỳỷỹýỵ",
];

/// Combining tone marks in the same tone order (index + 1).
const COMBINING_TONES: [char; 5] = ['\u{0300}', '\u{0309}', '\u{0303}', '\u{0301}', '\u{0323}'];

const LETTER_BASE: u32 = 0x1_0000;
const DIGIT_BASE: u32 = 0x100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Element {
    primary: u32,
    tone: u8,
    upper: bool,
}

fn letter_rank(c: char) -> Option<u32> {
    ALPHABET.chars().position(|a| a == c).map(|p| p as u32)
}

/// Split a lowercase char into its base letter and tone index.
fn decompose(c: char) -> (char, u8) {
    for row in TONED_VOWELS {
        if let Some(tone) = row.chars().position(|v| v == c) {
            let base = row.chars().next().unwrap_or(c);
            return (base, tone as u8);
        }
    }
    (c, 0)
}

fn elements(s: &str) -> Vec<Element> {
    let mut out: Vec<Element> = Vec::with_capacity(s.len());
    for c in s.chars() {
        if let Some(tone) = COMBINING_TONES.iter().position(|&m| m == c) {
            if let Some(last) = out.last_mut() {
                last.tone = tone as u8 + 1;
            }
            continue;
        }
        let lower = c.to_lowercase().next().unwrap_or(c);
        let upper = lower != c;
        let (base, tone) = decompose(lower);
        let primary = if let Some(rank) = letter_rank(base) {
            LETTER_BASE + rank
        } else if base.is_ascii_digit() {
            DIGIT_BASE + base as u32
        } else if base.is_alphabetic() {
            LETTER_BASE + 0x100 + base as u32
        } else {
            // whitespace and punctuation sort ahead of everything else
            base as u32 % DIGIT_BASE
        };
        out.push(Element {
            primary,
            tone,
            upper,
        });
    }
    out
}

/// Compare two strings in Vietnamese dictionary order.
pub fn compare(a: &str, b: &str) -> Ordering {
    let ka = elements(a);
    let kb = elements(b);
    ka.iter()
        .map(|e| e.primary)
        .cmp(kb.iter().map(|e| e.primary))
        .then_with(|| ka.iter().map(|e| e.tone).cmp(kb.iter().map(|e| e.tone)))
        .then_with(|| ka.iter().map(|e| e.upper).cmp(kb.iter().map(|e| e.upper)))
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::compare;
    use std::cmp::Ordering;

    fn sorted(words: &[&str]) -> Vec<String> {
        let mut v: Vec<String> = words.iter().map(|s| s.to_string()).collect();
        v.sort_by(|a, b| compare(a, b));
        v
    }

    #[test]
    fn d_stroke_follows_d() {
        assert_eq!(sorted(&["Đông", "Dương", "Eo"]), vec!["Dương", "Đông", "Eo"]);
    }

    #[test]
    fn base_letter_outranks_tone() {
        assert_eq!(sorted(&["Ân", "Ăn", "Án", "An"]), vec!["An", "Án", "Ăn", "Ân"]);
        assert_eq!(compare("Bà", "Ba Đình"), Ordering::Less);
    }

    #[test]
    fn tones_follow_dictionary_order() {
        assert_eq!(
            sorted(&["ma", "mạ", "má", "mã", "mả", "mà"]),
            vec!["ma", "mà", "mả", "mã", "má", "mạ"]
        );
    }

    #[test]
    fn case_only_breaks_ties() {
        assert_eq!(compare("an", "An"), Ordering::Less);
        assert_eq!(compare("An", "ba"), Ordering::Less);
    }

    #[test]
    fn combining_marks_match_precomposed() {
        assert_eq!(compare("Ha\u{0300}", "Ha"), Ordering::Greater);
        assert_eq!(compare("Ha\u{0300}", "Hả"), Ordering::Less);
        assert_eq!(compare("Ha\u{0300}", "Há"), Ordering::Less);
    }

    #[test]
    fn digits_sort_before_letters() {
        assert_eq!(
            sorted(&["Phường 2", "Phường 10", "Phường A"]),
            vec!["Phường 10", "Phường 2", "Phường A"]
        );
    }
}
