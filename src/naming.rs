//! Photo filename convention.
//!
//! The photo directory holds one file per calendar slot. A file's stem
//! says which slot it fills:
//!
//! | Stem | Slot |
//! |---|---|
//! | `00-lighthouse`, `0`, `title`, `cover` | 0 (title page) |
//! | `01-snowy-fields`, `1`, `january`, `jan` | 1 |
//! | `12-harbor`, `december` | 12 |
//!
//! A numeric prefix wins over a name. Dashes in the name part become
//! spaces in the caption shown by `cuckoo-calendar check`.

use crate::dates::month_name;

/// Highest slot index (December).
pub const LAST_SLOT: u32 = 12;

/// Result of parsing a photo stem like `03-cherry-blossom`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedStem {
    /// Calendar slot, 0 = title, 1..=12 = months. `None` if the stem names
    /// no slot.
    pub slot: Option<u32>,
    /// Raw name part after `NN-`, dashes preserved.
    pub name: String,
    /// Caption: name with dashes converted to spaces.
    pub caption: String,
}

fn slot_from_word(word: &str) -> Option<u32> {
    let word = word.to_ascii_lowercase();
    if word == "title" || word == "cover" {
        return Some(0);
    }
    (1..=LAST_SLOT).find(|&m| {
        month_name(m).is_some_and(|name| {
            let name = name.to_ascii_lowercase();
            name == word || (word.len() == 3 && name.starts_with(&word))
        })
    })
}

/// Parse a photo file stem.
///
/// - `"03-cherry-blossom"` → slot=Some(3), name="cherry-blossom", caption="cherry blossom"
/// - `"07"` → slot=Some(7), name="", caption=""
/// - `"march"` → slot=Some(3), name="march", caption="march"
/// - `"42-answer"` → slot=None (out of range), name="answer"
/// - `"holiday-snaps"` → slot=None, name="holiday-snaps"
pub fn parse_photo_stem(stem: &str) -> ParsedStem {
    if let Some((prefix, rest)) = stem.split_once('-')
        && let Ok(num) = prefix.parse::<u32>()
    {
        return ParsedStem {
            slot: (num <= LAST_SLOT).then_some(num),
            name: rest.to_string(),
            caption: rest.replace('-', " "),
        };
    }
    if let Ok(num) = stem.parse::<u32>() {
        return ParsedStem {
            slot: (num <= LAST_SLOT).then_some(num),
            name: String::new(),
            caption: String::new(),
        };
    }
    ParsedStem {
        slot: slot_from_word(stem),
        name: stem.to_string(),
        caption: stem.replace('-', " "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_with_multi_word_name() {
        let p = parse_photo_stem("03-cherry-blossom");
        assert_eq!(p.slot, Some(3));
        assert_eq!(p.name, "cherry-blossom");
        assert_eq!(p.caption, "cherry blossom");
    }

    #[test]
    fn title_slot_from_zero_prefix() {
        let p = parse_photo_stem("00-lighthouse");
        assert_eq!(p.slot, Some(0));
        assert_eq!(p.caption, "lighthouse");
    }

    #[test]
    fn number_only() {
        let p = parse_photo_stem("7");
        assert_eq!(p.slot, Some(7));
        assert_eq!(p.name, "");
    }

    #[test]
    fn number_with_trailing_dash() {
        let p = parse_photo_stem("12-");
        assert_eq!(p.slot, Some(12));
        assert_eq!(p.caption, "");
    }

    #[test]
    fn out_of_range_number_has_no_slot() {
        assert_eq!(parse_photo_stem("13-extra").slot, None);
        assert_eq!(parse_photo_stem("42").slot, None);
    }

    #[test]
    fn month_and_title_words() {
        assert_eq!(parse_photo_stem("march").slot, Some(3));
        assert_eq!(parse_photo_stem("Dec").slot, Some(12));
        assert_eq!(parse_photo_stem("title").slot, Some(0));
        assert_eq!(parse_photo_stem("cover").slot, Some(0));
    }

    #[test]
    fn unnumbered_free_name_has_no_slot() {
        let p = parse_photo_stem("holiday-snaps");
        assert_eq!(p.slot, None);
        assert_eq!(p.caption, "holiday snaps");
    }
}
