//! Adaptive session selection.
//!
//! Picks a bounded batch of cards weighted toward weak concepts:
//! 60% weak (mastery < 40), 20% medium (40-70), 20% strong (> 70).
//! Cards without a concept, or whose concept has no record yet, count as
//! mastery 0.
//!
//! Selection is two-tier. When the learner's mastery map is available the
//! weighted strategy runs; when it could not be fetched the unweighted
//! fallback pulls cards in review-date order instead. Neither tier fails.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::mastery::MasteryBand;
use crate::model::{Card, MasteryMap};

/// Default number of cards in a review session.
pub const DEFAULT_SESSION_SIZE: usize = 10;

/// Which selection tier produced a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionStrategy {
    Weighted,
    Unweighted,
}

/// Cards chosen for a session, in presentation order.
#[derive(Debug, Clone)]
pub struct SessionSelection {
    pub cards: Vec<Card>,
    pub strategy: SelectionStrategy,
}

/// Per-band card counts for a session of a given size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandTargets {
    pub weak: usize,
    pub medium: usize,
    pub strong: usize,
}

impl BandTargets {
    /// ceil(60%) weak, ceil(20%) medium, strong takes the remainder.
    pub fn for_size(size: usize) -> Self {
        let weak = (size * 3).div_ceil(5);
        let medium = size.div_ceil(5).min(size - weak);
        Self {
            weak,
            medium,
            strong: size - weak - medium,
        }
    }

    pub fn total(&self) -> usize {
        self.weak + self.medium + self.strong
    }
}

/// Mastery of the concept a card is tagged with, 0 when unknown.
pub fn card_mastery(card: &Card, mastery: &MasteryMap) -> u8 {
    card.concept
        .as_deref()
        .and_then(|concept| mastery.get(concept))
        .map(|m| m.mastery)
        .unwrap_or(0)
}

/// Select a session, falling back to unweighted selection when the mastery
/// map could not be fetched.
pub fn select_session<R: Rng + ?Sized>(
    cards: &[Card],
    mastery: Result<&MasteryMap, &StoreError>,
    size: usize,
    rng: &mut R,
) -> SessionSelection {
    match mastery {
        Ok(mastery) => SessionSelection {
            cards: select_weighted(cards, mastery, size, rng),
            strategy: SelectionStrategy::Weighted,
        },
        Err(e) => {
            tracing::warn!("mastery unavailable, using unweighted selection: {e}");
            SessionSelection {
                cards: select_unweighted(cards, size),
                strategy: SelectionStrategy::Unweighted,
            }
        }
    }
}

/// Band-weighted random selection.
pub fn select_weighted<R: Rng + ?Sized>(
    cards: &[Card],
    mastery: &MasteryMap,
    size: usize,
    rng: &mut R,
) -> Vec<Card> {
    if cards.is_empty() || size == 0 {
        return Vec::new();
    }

    let mut weak = Vec::new();
    let mut medium = Vec::new();
    let mut strong = Vec::new();
    for card in cards {
        match MasteryBand::of(card_mastery(card, mastery)) {
            MasteryBand::Weak => weak.push(card),
            MasteryBand::Medium => medium.push(card),
            MasteryBand::Strong => strong.push(card),
        }
    }
    weak.shuffle(rng);
    medium.shuffle(rng);
    strong.shuffle(rng);

    let targets = BandTargets::for_size(size);
    let mut selected: Vec<&Card> = Vec::with_capacity(size);
    let mut leftovers: Vec<&Card> = Vec::new();

    for (band, target) in [
        (weak, targets.weak),
        (medium, targets.medium),
        (strong, targets.strong),
    ] {
        let take = target.min(band.len());
        let mut band = band.into_iter();
        selected.extend(band.by_ref().take(take));
        leftovers.extend(band);
    }

    // Shortfall: leftovers are already ordered weak, then medium, then strong.
    let shortfall = size.saturating_sub(selected.len());
    selected.extend(leftovers.into_iter().take(shortfall));

    selected.shuffle(rng);
    selected.truncate(size);
    selected.into_iter().cloned().collect()
}

/// Plain pull of up to `size` cards, never-reviewed and most overdue first.
pub fn select_unweighted(cards: &[Card], size: usize) -> Vec<Card> {
    let mut pool: Vec<&Card> = cards.iter().collect();
    // `None` sorts before `Some`, so never-reviewed cards come first.
    pool.sort_by_key(|c| c.schedule.next_review_at);
    pool.into_iter().take(size).cloned().collect()
}

/// Cards due for review at `now`, in the same order as [`select_unweighted`].
pub fn due_cards(cards: &[Card], now: DateTime<Utc>) -> Vec<Card> {
    let due: Vec<Card> = cards
        .iter()
        .filter(|c| c.schedule.is_due(now))
        .cloned()
        .collect();
    select_unweighted(&due, due.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CardKind, ConceptMastery, Schedule};
    use chrono::{Duration, Utc};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn card(id: usize, concept: Option<&str>) -> Card {
        Card {
            id: format!("card-{id}"),
            deck_id: "deck".into(),
            question: format!("Q{id}"),
            answer: format!("A{id}"),
            kind: CardKind::Flashcard,
            options: vec![],
            concept: concept.map(String::from),
            schedule: Schedule::default(),
        }
    }

    fn mastery_map(entries: &[(&str, u8)]) -> MasteryMap {
        entries
            .iter()
            .map(|(concept, mastery)| {
                (
                    concept.to_string(),
                    ConceptMastery {
                        learner_id: "learner".into(),
                        deck_id: "deck".into(),
                        concept: concept.to_string(),
                        mastery: *mastery,
                        seen_count: 1,
                        correct_count: 1,
                        last_seen_at: Utc::now(),
                    },
                )
            })
            .collect()
    }

    /// 50 weak, 30 medium, 20 strong cards.
    fn banded_deck() -> (Vec<Card>, MasteryMap) {
        let mut cards = Vec::new();
        for i in 0..50 {
            cards.push(card(i, Some("weak")));
        }
        for i in 50..80 {
            cards.push(card(i, Some("medium")));
        }
        for i in 80..100 {
            cards.push(card(i, Some("strong")));
        }
        (
            cards,
            mastery_map(&[("weak", 10), ("medium", 55), ("strong", 90)]),
        )
    }

    #[test]
    fn band_targets_for_ten() {
        let t = BandTargets::for_size(10);
        assert_eq!((t.weak, t.medium, t.strong), (6, 2, 2));
    }

    #[test]
    fn band_targets_always_sum_to_size() {
        for size in 0..50 {
            assert_eq!(BandTargets::for_size(size).total(), size, "size {size}");
        }
        let one = BandTargets::for_size(1);
        assert_eq!((one.weak, one.medium, one.strong), (1, 0, 0));
        let eight = BandTargets::for_size(8);
        assert_eq!((eight.weak, eight.medium, eight.strong), (5, 2, 1));
    }

    #[test]
    fn untagged_and_unknown_concepts_are_weak() {
        let mastery = mastery_map(&[("known", 80)]);
        assert_eq!(card_mastery(&card(0, None), &mastery), 0);
        assert_eq!(card_mastery(&card(1, Some("unknown")), &mastery), 0);
        assert_eq!(card_mastery(&card(2, Some("known")), &mastery), 80);
    }

    #[test]
    fn band_proportions_average_out() {
        let (cards, mastery) = banded_deck();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let runs = 200;
        let (mut weak, mut medium, mut strong) = (0usize, 0usize, 0usize);

        for _ in 0..runs {
            let selected = select_weighted(&cards, &mastery, 10, &mut rng);
            assert_eq!(selected.len(), 10);
            for c in &selected {
                match c.concept.as_deref() {
                    Some("weak") => weak += 1,
                    Some("medium") => medium += 1,
                    Some("strong") => strong += 1,
                    other => panic!("unexpected concept {other:?}"),
                }
            }
        }

        let avg = |n: usize| n as f64 / runs as f64;
        assert!((avg(weak) - 6.0).abs() <= 1.0, "weak avg {}", avg(weak));
        assert!((avg(medium) - 2.0).abs() <= 1.0, "medium avg {}", avg(medium));
        assert!((avg(strong) - 2.0).abs() <= 1.0, "strong avg {}", avg(strong));
    }

    #[test]
    fn selection_has_no_duplicates() {
        let (cards, mastery) = banded_deck();
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let selected = select_weighted(&cards, &mastery, 10, &mut rng);
        let mut ids: Vec<_> = selected.iter().map(|c| c.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 10);
    }

    #[test]
    fn short_weak_band_falls_back_to_medium_first() {
        // 2 weak, 10 medium, 10 strong: the 4-card weak shortfall is covered
        // by medium leftovers before any extra strong card is used.
        let mut cards = Vec::new();
        for i in 0..2 {
            cards.push(card(i, Some("weak")));
        }
        for i in 2..12 {
            cards.push(card(i, Some("medium")));
        }
        for i in 12..22 {
            cards.push(card(i, Some("strong")));
        }
        let mastery = mastery_map(&[("weak", 0), ("medium", 50), ("strong", 100)]);
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let selected = select_weighted(&cards, &mastery, 10, &mut rng);
        let count = |name: &str| {
            selected
                .iter()
                .filter(|c| c.concept.as_deref() == Some(name))
                .count()
        };
        assert_eq!(selected.len(), 10);
        assert_eq!(count("weak"), 2);
        assert_eq!(count("medium"), 6);
        assert_eq!(count("strong"), 2);
    }

    #[test]
    fn small_deck_returns_every_card() {
        let cards: Vec<Card> = (0..4).map(|i| card(i, None)).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let selected = select_weighted(&cards, &MasteryMap::new(), 10, &mut rng);
        assert_eq!(selected.len(), 4);
    }

    #[test]
    fn empty_deck_returns_empty() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let selection = select_session(&[], Ok(&MasteryMap::new()), 10, &mut rng);
        assert!(selection.cards.is_empty());
        assert_eq!(selection.strategy, SelectionStrategy::Weighted);
    }

    #[test]
    fn same_seed_same_selection() {
        let (cards, mastery) = banded_deck();
        let a = select_weighted(&cards, &mastery, 10, &mut ChaCha8Rng::seed_from_u64(42));
        let b = select_weighted(&cards, &mastery, 10, &mut ChaCha8Rng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn mastery_failure_degrades_to_unweighted() {
        let (cards, _) = banded_deck();
        let err = StoreError::Unavailable("connection reset".into());
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let selection = select_session(&cards, Err(&err), 10, &mut rng);
        assert_eq!(selection.strategy, SelectionStrategy::Unweighted);
        assert_eq!(selection.cards.len(), 10);
    }

    #[test]
    fn unweighted_prefers_unreviewed_then_overdue() {
        let now = Utc::now();
        let mut reviewed_late = card(0, None);
        reviewed_late.schedule.next_review_at = Some(now + Duration::days(5));
        let mut reviewed_early = card(1, None);
        reviewed_early.schedule.next_review_at = Some(now - Duration::days(1));
        let fresh = card(2, None);

        let picked = select_unweighted(&[reviewed_late, reviewed_early, fresh], 2);
        let ids: Vec<_> = picked.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["card-2", "card-1"]);
    }

    #[test]
    fn due_cards_skip_future_reviews() {
        let now = Utc::now();
        let mut later = card(0, None);
        later.schedule.next_review_at = Some(now + Duration::days(3));
        let mut overdue = card(1, None);
        overdue.schedule.next_review_at = Some(now - Duration::days(2));
        let fresh = card(2, None);

        let due = due_cards(&[later, overdue, fresh], now);
        let ids: Vec<_> = due.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["card-2", "card-1"]);
    }
}
