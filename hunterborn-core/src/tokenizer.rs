use std::collections::BTreeSet;

pub type TokenSet = BTreeSet<String>;

/// Fragments that show up in nearly every record name and carry no signal.
const STOP_WORDS: &[&str] = &[
    "the", "of", "and", "enc", "lvl", "npc", "race", "creature", "death", "item", "dlc",
];

/// Splits every present string into lower-case word tokens and returns their union.
///
/// Words break on non-alphanumeric characters, on lower-to-upper case changes,
/// at the end of an upper-case run (`NPCWolf` gives `npc`, `wolf`) and between
/// letters and digits. Single characters, pure numbers and stop words are dropped.
pub fn tokenize<'a, I>(strings: I) -> TokenSet
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut tokens = TokenSet::new();
    for s in strings.into_iter().flatten() {
        for word in split_words(s) {
            if is_informative(&word) {
                tokens.insert(word);
            }
        }
    }
    tokens
}

fn split_words(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if !current.is_empty() {
            let prev = chars[i - 1];
            let next = chars.get(i + 1).copied();
            if is_word_boundary(prev, c, next) {
                words.push(std::mem::take(&mut current));
            }
        }

        current.extend(c.to_lowercase());
    }

    if !current.is_empty() {
        words.push(current);
    }

    words
}

fn is_word_boundary(prev: char, c: char, next: Option<char>) -> bool {
    (prev.is_lowercase() && c.is_uppercase())
        || (prev.is_alphabetic() && c.is_numeric())
        || (prev.is_numeric() && c.is_alphabetic())
        || (prev.is_uppercase() && c.is_uppercase() && next.map_or(false, char::is_lowercase))
}

fn is_informative(word: &str) -> bool {
    word.chars().count() > 1
        && !word.chars().all(char::is_numeric)
        && !STOP_WORDS.contains(&word)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> TokenSet {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn splits_camel_case_and_drops_single_letters() {
        assert_eq!(tokenize([Some("wolfSnowA")]), tokens(&["wolf", "snow"]));
    }

    #[test]
    fn splits_acronyms_and_digits() {
        assert_eq!(tokenize([Some("NPCWolf")]), tokens(&["wolf"]));
        assert_eq!(tokenize([Some("EncBear02Cave")]), tokens(&["bear", "cave"]));
        assert_eq!(tokenize([Some("DLC1Deathhound")]), tokens(&["deathhound"]));
    }

    #[test]
    fn splits_on_punctuation_and_whitespace() {
        assert_eq!(
            tokenize([Some("Sabre Cat (Snowy)"), Some("ice_wraith-boss")]),
            tokens(&["sabre", "cat", "snowy", "ice", "wraith", "boss"])
        );
    }

    #[test]
    fn drops_stop_words_and_numbers() {
        assert_eq!(
            tokenize([Some("WolfDeathItem"), Some("CreatureWolf"), Some("1234")]),
            tokens(&["wolf"])
        );
    }

    #[test]
    fn skips_absent_strings() {
        assert_eq!(tokenize([None, Some("Mudcrab"), None]), tokens(&["mudcrab"]));
        assert!(tokenize([None, None]).is_empty());
        assert!(tokenize(Vec::<Option<&str>>::new()).is_empty());
    }

    #[test]
    fn duplicates_collapse() {
        assert_eq!(
            tokenize([Some("Skeever"), Some("skeever"), Some("SKEEVER")]),
            tokens(&["skeever"])
        );
    }
}
