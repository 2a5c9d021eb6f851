//! Caption text sources.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use reel_core::{ReelError, ReelResult};

/// Motivational quotes shipped with the deck.
pub const MOTIVATIONAL_QUOTES: [&str; 20] = [
    "Believe you can and you're halfway there.",
    "The only way to do great work is to love what you do.",
    "Success is not final, failure is not fatal: it is the courage to continue that counts.",
    "Don't watch the clock; do what it does. Keep going.",
    "The future belongs to those who believe in the beauty of their dreams.",
    "It is during our darkest moments that we must focus to see the light.",
    "The only impossible journey is the one you never begin.",
    "In the middle of difficulty lies opportunity.",
    "Life is what happens to you while you're busy making other plans.",
    "The way to get started is to quit talking and begin doing.",
    "Your limitation\u{2014}it's only your imagination.",
    "Push yourself, because no one else is going to do it for you.",
    "Great things never come from comfort zones.",
    "Dream it. Wish it. Do it.",
    "Success doesn't just find you. You have to go out and get it.",
    "The harder you work for something, the greater you'll feel when you achieve it.",
    "Dream bigger. Do bigger.",
    "Don't stop when you're tired. Stop when you're done.",
    "Wake up with determination. Go to bed with satisfaction.",
    "Do something today that your future self will thank you for.",
];

/// Call-to-action prompts shipped with the deck.
pub const CTA_PROMPTS: [&str; 20] = [
    "What do you believe in most? Share in comments! \u{1F4AA}",
    "What work do you love to do? Answer in comments! \u{2764}\u{FE0F}",
    "What keeps you going? Tell us below! \u{1F680}",
    "What motivates you daily? Comment below! \u{23F0}",
    "What's your biggest dream? Share it! \u{2728}",
    "How do you find light in darkness? Comment! \u{1F4A1}",
    "What journey are you starting? Tell us! \u{1F31F}",
    "What opportunity do you see? Share below! \u{1F3AF}",
    "What are your plans? Comment them! \u{1F4DD}",
    "What are you doing today? Share it! \u{1F525}",
    "What's your biggest limitation? Comment! \u{1F9E0}",
    "How do you push yourself? Tell us! \u{1F4AF}",
    "What's your comfort zone? Share below! \u{1F331}",
    "What are you dreaming of? Comment! \u{1F4AD}",
    "How do you find success? Share your way! \u{1F3C6}",
    "What are you working hard for? Tell us! \u{1F4AA}",
    "What's your next big move? Comment! \u{1F3AF}",
    "What keeps you going? Share below! \u{1F50B}",
    "What determines your day? Comment! \u{1F305}",
    "What will you do today? Share it! \u{2705}",
];

/// Supplies quote and call-to-action text for a reel.
pub trait CaptionSource: Send {
    fn next_quote(&mut self) -> String;
    fn next_cta(&mut self) -> String;
}

/// Random picks from fixed quote and CTA lists, independently of each other.
pub struct CaptionDeck {
    quotes: Vec<String>,
    ctas: Vec<String>,
    rng: StdRng,
}

impl CaptionDeck {
    /// The built-in lists with an entropy-seeded generator.
    pub fn new() -> Self {
        Self::build(builtin(&MOTIVATIONAL_QUOTES), builtin(&CTA_PROMPTS), StdRng::from_entropy())
    }

    /// The built-in lists with a reproducible sequence.
    pub fn seeded(seed: u64) -> Self {
        Self::build(
            builtin(&MOTIVATIONAL_QUOTES),
            builtin(&CTA_PROMPTS),
            StdRng::seed_from_u64(seed),
        )
    }

    /// Custom lists. Both must be non-empty.
    pub fn with_lists(quotes: Vec<String>, ctas: Vec<String>, seed: u64) -> ReelResult<Self> {
        if quotes.is_empty() || ctas.is_empty() {
            return Err(ReelError::InvalidArgument(
                "caption deck needs at least one quote and one call to action".into(),
            ));
        }
        Ok(Self::build(quotes, ctas, StdRng::seed_from_u64(seed)))
    }

    fn build(quotes: Vec<String>, ctas: Vec<String>, rng: StdRng) -> Self {
        Self { quotes, ctas, rng }
    }

    pub fn quotes(&self) -> &[String] {
        &self.quotes
    }

    pub fn ctas(&self) -> &[String] {
        &self.ctas
    }
}

impl Default for CaptionDeck {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptionSource for CaptionDeck {
    fn next_quote(&mut self) -> String {
        self.quotes.choose(&mut self.rng).cloned().unwrap_or_default()
    }

    fn next_cta(&mut self) -> String {
        self.ctas.choose(&mut self.rng).cloned().unwrap_or_default()
    }
}

fn builtin(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Cycles through given captions in order. Useful for scripted runs.
#[derive(Debug, Clone)]
pub struct FixedCaptions {
    quotes: Vec<String>,
    ctas: Vec<String>,
    next_quote: usize,
    next_cta: usize,
}

impl FixedCaptions {
    pub fn new(quotes: Vec<String>, ctas: Vec<String>) -> Self {
        Self {
            quotes,
            ctas,
            next_quote: 0,
            next_cta: 0,
        }
    }

    /// Always the same pair.
    pub fn single(quote: impl Into<String>, cta: impl Into<String>) -> Self {
        Self::new(vec![quote.into()], vec![cta.into()])
    }
}

fn cycle(list: &[String], cursor: &mut usize) -> String {
    if list.is_empty() {
        return String::new();
    }
    let item = list[*cursor % list.len()].clone();
    *cursor += 1;
    item
}

impl CaptionSource for FixedCaptions {
    fn next_quote(&mut self) -> String {
        cycle(&self.quotes, &mut self.next_quote)
    }

    fn next_cta(&mut self) -> String {
        cycle(&self.ctas, &mut self.next_cta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deck_picks_from_builtin_lists() {
        let mut deck = CaptionDeck::new();
        for _ in 0..50 {
            let quote = deck.next_quote();
            let cta = deck.next_cta();
            assert!(MOTIVATIONAL_QUOTES.iter().any(|q| *q == quote));
            assert!(CTA_PROMPTS.iter().any(|c| *c == cta));
        }
    }

    #[test]
    fn test_seeded_decks_agree() {
        let mut a = CaptionDeck::seeded(7);
        let mut b = CaptionDeck::seeded(7);
        for _ in 0..10 {
            assert_eq!(a.next_quote(), b.next_quote());
            assert_eq!(a.next_cta(), b.next_cta());
        }
    }

    #[test]
    fn test_deck_rejects_empty_lists() {
        let err = CaptionDeck::with_lists(vec![], vec!["cta".into()], 1).err().unwrap();
        assert_eq!(err.kind(), reel_core::ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_fixed_captions_cycle() {
        let mut fixed = FixedCaptions::new(
            vec!["q1".into(), "q2".into()],
            vec!["c1".into()],
        );
        assert_eq!(fixed.next_quote(), "q1");
        assert_eq!(fixed.next_quote(), "q2");
        assert_eq!(fixed.next_quote(), "q1");
        assert_eq!(fixed.next_cta(), "c1");
        assert_eq!(fixed.next_cta(), "c1");
    }

    #[test]
    fn test_empty_fixed_captions_yield_empty_text() {
        let mut fixed = FixedCaptions::new(vec![], vec![]);
        assert_eq!(fixed.next_quote(), "");
        assert_eq!(fixed.next_cta(), "");
    }
}
