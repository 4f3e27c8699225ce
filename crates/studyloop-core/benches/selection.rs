use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use studyloop_core::model::{Card, CardKind, ConceptMastery, MasteryMap, Schedule};
use studyloop_core::selector::{select_session, select_unweighted};

fn make_deck(size: usize) -> (Vec<Card>, MasteryMap) {
    let cards: Vec<Card> = (0..size)
        .map(|i| Card {
            id: format!("card-{i}"),
            deck_id: "bench".into(),
            question: format!("Question {i}"),
            answer: format!("Answer {i}"),
            kind: CardKind::Flashcard,
            options: vec![],
            concept: Some(format!("concept-{}", i % 20)),
            schedule: Schedule::default(),
        })
        .collect();

    let mastery = (0..20)
        .map(|c| {
            let concept = format!("concept-{c}");
            let record = ConceptMastery {
                learner_id: "bench".into(),
                deck_id: "bench".into(),
                concept: concept.clone(),
                mastery: (c * 5) as u8,
                seen_count: 10,
                correct_count: 5,
                last_seen_at: Utc::now(),
            };
            (concept, record)
        })
        .collect();

    (cards, mastery)
}

fn bench_weighted(c: &mut Criterion) {
    let mut group = c.benchmark_group("select_weighted");

    for size in [20, 200, 2000] {
        let (cards, mastery) = make_deck(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            let mut rng = ChaCha8Rng::seed_from_u64(7);
            b.iter(|| select_session(black_box(&cards), Ok(&mastery), 10, &mut rng))
        });
    }

    group.finish();
}

fn bench_unweighted(c: &mut Criterion) {
    let (cards, _) = make_deck(2000);
    c.bench_function("select_unweighted/2000", |b| {
        b.iter(|| select_unweighted(black_box(&cards), 10))
    });
}

criterion_group!(benches, bench_weighted, bench_unweighted);
criterion_main!(benches);
