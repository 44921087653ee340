// Static word table used for base words and as the shadow-word fallback.

use serde::{Deserialize, Serialize};

/// Secret words dealt for one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordPair {
    pub category: String,
    pub base: String,
    pub shadow: Option<String>,
}

#[derive(Debug)]
pub struct WordEntry {
    pub word: &'static str,
    // Close-but-distinct words, first one is the preferred fallback.
    pub similar: &'static [&'static str],
}

#[derive(Debug)]
pub struct WordDomain {
    pub name: &'static str,
    pub words: &'static [WordEntry],
}

impl WordEntry {
    const fn new(word: &'static str, similar: &'static [&'static str]) -> Self {
        Self { word, similar }
    }

    pub fn fallback_shadow(&self) -> &'static str {
        self.similar.first().copied().unwrap_or(self.word)
    }
}

pub static WORD_DOMAINS: &[WordDomain] = &[
    WordDomain {
        name: "Food",
        words: &[
            WordEntry::new("Pizza", &["Flatbread", "Calzone"]),
            WordEntry::new("Coffee", &["Tea", "Espresso"]),
            WordEntry::new("Burger", &["Sandwich", "Hot Dog"]),
            WordEntry::new("Sushi", &["Sashimi", "Poke"]),
            WordEntry::new("Pancake", &["Waffle", "Crepe"]),
        ],
    },
    WordDomain {
        name: "Animals",
        words: &[
            WordEntry::new("Lion", &["Tiger", "Leopard"]),
            WordEntry::new("Dolphin", &["Shark", "Whale"]),
            WordEntry::new("Eagle", &["Hawk", "Falcon"]),
            WordEntry::new("Horse", &["Donkey", "Zebra"]),
            WordEntry::new("Frog", &["Toad", "Lizard"]),
        ],
    },
    WordDomain {
        name: "Places",
        words: &[
            WordEntry::new("Beach", &["Lake", "Island"]),
            WordEntry::new("Library", &["Bookstore", "Museum"]),
            WordEntry::new("Hospital", &["Clinic", "Pharmacy"]),
            WordEntry::new("Airport", &["Train Station", "Harbor"]),
            WordEntry::new("Castle", &["Palace", "Fortress"]),
        ],
    },
    WordDomain {
        name: "Objects",
        words: &[
            WordEntry::new("Guitar", &["Violin", "Ukulele"]),
            WordEntry::new("Umbrella", &["Raincoat", "Parasol"]),
            WordEntry::new("Laptop", &["Tablet", "Desktop"]),
            WordEntry::new("Candle", &["Lantern", "Torch"]),
            WordEntry::new("Backpack", &["Suitcase", "Handbag"]),
        ],
    },
    WordDomain {
        name: "Sports",
        words: &[
            WordEntry::new("Football", &["Rugby", "Basketball"]),
            WordEntry::new("Tennis", &["Badminton", "Squash"]),
            WordEntry::new("Skiing", &["Snowboarding", "Skating"]),
            WordEntry::new("Boxing", &["Wrestling", "Karate"]),
            WordEntry::new("Swimming", &["Diving", "Surfing"]),
        ],
    },
];

/// Picks the base entry for a game from two random draws.
pub fn pick_entry(
    domain_roll: usize,
    word_roll: usize,
) -> (&'static WordDomain, &'static WordEntry) {
    let domain = &WORD_DOMAINS[domain_roll % WORD_DOMAINS.len()];
    let entry = &domain.words[word_roll % domain.words.len()];
    (domain, entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_table_is_loaded_then_every_entry_has_a_distinct_fallback() {
        for domain in WORD_DOMAINS {
            assert!(!domain.words.is_empty(), "{} has no words", domain.name);
            for entry in domain.words {
                assert_ne!(entry.fallback_shadow(), entry.word);
            }
        }
    }

    #[test]
    fn when_rolls_exceed_table_size_then_pick_wraps() {
        let (domain, entry) = pick_entry(WORD_DOMAINS.len(), 0);

        assert_eq!(domain.name, WORD_DOMAINS[0].name);
        assert_eq!(entry.word, WORD_DOMAINS[0].words[0].word);
    }
}
