//! # relay-pacing
//!
//! Artificial typing cadence for the relay.
//!
//! Supports:
//! - A fixed per-character delay table ([`delay_for`])
//! - Lazy, restartable `(unit, delay)` schedules over a reply ([`PacedText`])
//! - Grapheme-cluster units, so combining marks and emoji sequences are never split
//! - Injected clocks ([`Clock`]) so schedules run without real timers in tests

mod clock;

pub use clock::{Clock, TokioClock, VirtualClock};

use std::time::Duration;
use unicode_segmentation::{Graphemes, UnicodeSegmentation};

/// Pause after `.`, `!` and `?`.
pub const SENTENCE_END_MS: u64 = 200;
/// Pause after `,` and the CJK comma/colon variants.
pub const CLAUSE_BREAK_MS: u64 = 100;
/// Pause after a space.
pub const SPACE_MS: u64 = 50;
/// Pause after a CJK ideograph.
pub const IDEOGRAPH_MS: u64 = 60;
/// Pause after anything else.
pub const DEFAULT_MS: u64 = 30;

/// Delay class of a single character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaceClass {
    SentenceEnd,
    ClauseBreak,
    Space,
    Ideograph,
    Other,
}

impl PaceClass {
    /// Classify one character. Checked in table order; the classes are disjoint.
    pub fn of(ch: char) -> Self {
        match ch {
            '.' | '!' | '?' => PaceClass::SentenceEnd,
            ',' | '；' | 'ー' | '：' => PaceClass::ClauseBreak,
            ' ' => PaceClass::Space,
            '\u{4E00}'..='\u{9FA5}' => PaceClass::Ideograph,
            _ => PaceClass::Other,
        }
    }

    pub fn delay_ms(self) -> u64 {
        match self {
            PaceClass::SentenceEnd => SENTENCE_END_MS,
            PaceClass::ClauseBreak => CLAUSE_BREAK_MS,
            PaceClass::Space => SPACE_MS,
            PaceClass::Ideograph => IDEOGRAPH_MS,
            PaceClass::Other => DEFAULT_MS,
        }
    }
}

/// Milliseconds to wait after emitting `ch`. Pure and total.
pub fn delay_for(ch: char) -> u64 {
    PaceClass::of(ch).delay_ms()
}

/// Delay for a grapheme cluster: the delay of its first code point.
pub fn delay_for_unit(unit: &str) -> u64 {
    unit.chars().next().map_or(DEFAULT_MS, delay_for)
}

/// One scheduled unit of a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paced<'a> {
    /// A single extended grapheme cluster.
    pub unit: &'a str,
    /// How long to wait after emitting `unit`.
    pub delay: Duration,
}

/// A reply prepared for paced emission.
///
/// Cheap to construct; every call to [`PacedText::iter`] starts a fresh,
/// finite schedule over the same text.
#[derive(Debug, Clone, Copy)]
pub struct PacedText<'a> {
    text: &'a str,
}

impl<'a> PacedText<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }

    /// Start the schedule from the first unit.
    pub fn iter(&self) -> PacedChars<'a> {
        PacedChars {
            graphemes: self.text.graphemes(true),
        }
    }

    /// Number of units the schedule will yield.
    pub fn unit_count(&self) -> usize {
        self.text.graphemes(true).count()
    }

    /// Sum of all delays in the schedule.
    pub fn total_delay(&self) -> Duration {
        self.iter().map(|p| p.delay).sum()
    }
}

impl<'a> IntoIterator for &PacedText<'a> {
    type Item = Paced<'a>;
    type IntoIter = PacedChars<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy iterator over `(unit, delay)` pairs, in text order.
#[derive(Debug, Clone)]
pub struct PacedChars<'a> {
    graphemes: Graphemes<'a>,
}

impl<'a> Iterator for PacedChars<'a> {
    type Item = Paced<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.graphemes.next().map(|unit| Paced {
            unit,
            delay: Duration::from_millis(delay_for_unit(unit)),
        })
    }
}
