//! Deterministic demo catalog.
//!
//! Produces readable, repeatable items so the simulator has something to
//! serve. The same `(count, seed)` always yields the same catalog.

use chrono::{Duration, NaiveDate};

use super::{Item, WarningSet};

const WORDS: &[&str] = &[
    "orbit", "signal", "harbor", "meadow", "copper", "lantern", "glacier", "thunder", "velvet",
    "quartz", "ember", "falcon", "willow", "summit", "canyon", "pepper", "marble", "comet",
    "river", "cobalt", "saddle", "timber", "beacon", "prairie", "anchor", "crystal", "nectar",
    "ripple", "tundra", "orchid", "basalt", "zephyr", "mosaic", "pillar", "lagoon", "cinder",
    "rocket", "galaxy", "engine", "station",
];

/// Small xorshift generator; good enough for demo data, not for anything else.
struct XorShift(u64);

impl XorShift {
    fn new(seed: u64) -> Self {
        // Zero is a fixed point of xorshift.
        Self(seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1)
    }

    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next() % n
    }

    fn word(&mut self) -> &'static str {
        WORDS[self.below(WORDS.len() as u64) as usize]
    }

    fn sentence(&mut self) -> String {
        let len = 4 + self.below(6) as usize;
        let words: Vec<&str> = (0..len).map(|_| self.word()).collect();
        let mut sentence = words.join(" ");
        if let Some(first) = sentence.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        sentence.push('.');
        sentence
    }

    fn paragraph(&mut self) -> String {
        let len = 2 + self.below(3) as usize;
        (0..len).map(|_| self.sentence()).collect::<Vec<_>>().join(" ")
    }
}

/// Generates `count` items from `seed`.
///
/// Roughly one item in eight mentions NASA as a standalone word in its
/// transcript, and one in eight contains it only glued to another word.
pub fn seed_catalog(count: usize, seed: u64) -> Vec<Item> {
    let mut rng = XorShift::new(seed);
    let epoch = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default();

    (0..count)
        .map(|index| {
            let id = format!("{}-{:04}", rng.word(), index);
            let title = rng.sentence();
            let description = rng.paragraph();
            let mut paragraphs: Vec<String> = (0..5).map(|_| rng.paragraph()).collect();

            match rng.below(8) {
                0 => paragraphs[2].push_str(" Then NASA confirmed the launch window."),
                1 => paragraphs[2].push_str(" The nasarocket replica sat in the hangar."),
                _ => {}
            }

            Item {
                id,
                title,
                description,
                transcript: paragraphs.join("\n\n"),
                upload_date: epoch + Duration::days(rng.below(1800) as i64),
                views: rng.below(1_000_001),
                warnings: WarningSet::new(),
            }
        })
        .collect()
}
