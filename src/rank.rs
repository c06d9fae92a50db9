//! Rank classification: trauma score to tier

use crate::score::TraumaScore;
use serde::Serialize;

/// One classification band of the rank table
///
/// Stat values (coping, rug resistance, hopium addiction) are fixed per
/// tier by content design; they are not derived from individual answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankTier {
    /// Default title: one leading emoji plus a short phrase
    pub title: &'static str,
    /// Tier quote, rendered italicized on the card
    pub quote: &'static str,
    /// Three short descriptive traits, order preserved
    pub traits: [&'static str; 3],
    /// Coping level, 0-100
    pub coping_level: u32,
    /// Rug resistance, 0-100
    pub rug_resistance: u32,
    /// Hopium addiction, 0-100
    pub hopium_addiction: u32,
}

/// Inclusive lower score bound per band, scanned highest-first. The final
/// band is the catch-all default and has no bound.
static TIERS: [(TraumaScore, RankTier); 5] = [
    (
        40,
        RankTier {
            title: "\u{1F9E0} Delusional Degen",
            quote: "Your portfolio is 99% down but you're still calling it a 'buying opportunity'",
            traits: ["Buys every dip", "Thinks bottoms are in", "Still believes in NFTs"],
            coping_level: 95,
            rug_resistance: 20,
            hopium_addiction: 100,
        },
    ),
    (
        30,
        RankTier {
            title: "\u{1F480} Rug PTSD Survivor",
            quote: "You've seen more rugs than a carpet store",
            traits: ["Trust issues", "Sells too early", "Paranoid about devs"],
            coping_level: 60,
            rug_resistance: 80,
            hopium_addiction: 40,
        },
    ),
    (
        20,
        RankTier {
            title: "\u{1F6AC} Diamond-Handed Masochist",
            quote: "Pain is temporary, losses are forever",
            traits: ["Never sells", "Loves pain", "Stake & forget"],
            coping_level: 75,
            rug_resistance: 50,
            hopium_addiction: 70,
        },
    ),
    (
        10,
        RankTier {
            title: "\u{1F476} Baby Bull \u{2013} Still Innocent",
            quote: "Sweet summer child, winter is coming",
            traits: ["FOMO buyer", "Believes in roadmaps", "Telegram expert"],
            coping_level: 30,
            rug_resistance: 10,
            hopium_addiction: 50,
        },
    ),
    (
        0,
        RankTier {
            title: "\u{1F9D8} Enlightened Exit Liquidity",
            quote: "You're not losing money, you're gaining experience",
            traits: ["Buys tops", "Perfect exit timing (for others)", "Chart pattern believer"],
            coping_level: 40,
            rug_resistance: 30,
            hopium_addiction: 60,
        },
    ),
];

/// Map a trauma score to its rank tier.
///
/// Pure, total, deterministic: every score matches exactly one band. Bands
/// are evaluated highest lower-bound first; a boundary score resolves to
/// the higher-threshold tier. The lowest band is the catch-all, so this
/// never panics.
pub fn classify(score: TraumaScore) -> &'static RankTier {
    for (bound, tier) in &TIERS {
        if score >= *bound {
            return tier;
        }
    }
    // The last band's bound is 0 and scores are unsigned.
    &TIERS[TIERS.len() - 1].1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers_partition_scores() {
        // Every score matches exactly one band when checked independently.
        for score in 0..=200u32 {
            let matching = TIERS
                .iter()
                .enumerate()
                .filter(|(i, (bound, _))| {
                    let upper = if *i == 0 { u32::MAX } else { TIERS[i - 1].0 };
                    score >= *bound && score < upper
                })
                .count();
            assert_eq!(matching, 1, "score {} matched {} bands", score, matching);
        }
    }

    #[test]
    fn test_boundaries_resolve_upward() {
        assert_eq!(classify(40).title, "\u{1F9E0} Delusional Degen");
        assert_eq!(classify(39).title, "\u{1F480} Rug PTSD Survivor");
        assert_eq!(classify(30).title, "\u{1F480} Rug PTSD Survivor");
        assert_eq!(classify(29).title, "\u{1F6AC} Diamond-Handed Masochist");
        assert_eq!(classify(20).title, "\u{1F6AC} Diamond-Handed Masochist");
        assert_eq!(classify(10).title, "\u{1F476} Baby Bull \u{2013} Still Innocent");
        assert_eq!(classify(9).title, "\u{1F9D8} Enlightened Exit Liquidity");
        assert_eq!(classify(0).title, "\u{1F9D8} Enlightened Exit Liquidity");
    }

    #[test]
    fn test_classify_is_idempotent() {
        for score in [0, 5, 10, 25, 40, 99] {
            let a = classify(score);
            let b = classify(score);
            assert_eq!(a, b);
            assert_eq!(a.traits, b.traits);
        }
    }

    #[test]
    fn test_top_band_unbounded() {
        assert_eq!(classify(u32::MAX).title, classify(40).title);
    }

    #[test]
    fn test_stat_values_in_range() {
        for (_, tier) in &TIERS {
            assert!(tier.coping_level <= 100);
            assert!(tier.rug_resistance <= 100);
            assert!(tier.hopium_addiction <= 100);
            assert_eq!(tier.traits.len(), 3);
        }
    }
}
