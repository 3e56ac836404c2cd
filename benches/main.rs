use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use num_bigint::BigUint;

use fuzzy_ibe::bn::{BnCurve, BnCurveParams};
use fuzzy_ibe::fuzzy;

fn curve32() -> BnCurve {
    BnCurve::from_params(BnCurveParams {
        p: BigUint::from(4_675_038_223u64),
        n: BigUint::from(4_674_969_529u64),
        b: 29,
        y: BigUint::from(1_270_807_500u64),
    })
}

fn bench_curve(criterion: &mut Criterion) {
    criterion.bench_function("bn generate 32-bit", |b| {
        b.iter(|| BnCurve::generate(black_box(32)).unwrap())
    });

    let curve = curve32();
    criterion.bench_function("weil pairing", |b| {
        b.iter(|| curve.pairing(black_box(curve.g0_lifted()), black_box(curve.g1())))
    });
}

fn bench_fuzzy(criterion: &mut Criterion) {
    let curve = curve32();
    let mut rng = rand::thread_rng();

    let (pp, msk) = fuzzy::setup(&curve, &[1, 2, 3, 4, 5, 6], &mut rng).unwrap();
    let key = fuzzy::keygen(&curve, &msk, &[3, 5, 2, 6], 2, &mut rng).unwrap();
    let message = curve.embed_message(&BigUint::from(39u32));
    let ct = fuzzy::encrypt(&curve, &pp, &[3, 5], &message, &mut rng).unwrap();

    criterion.bench_function("fuzzy encrypt", |b| {
        let mut rng = rand::thread_rng();
        b.iter(|| fuzzy::encrypt(&curve, black_box(&pp), black_box(&[3, 5]), &message, &mut rng))
    });
    criterion.bench_function("fuzzy decrypt", |b| {
        b.iter(|| fuzzy::decrypt(&curve, black_box(&key), black_box(&ct)))
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default().warm_up_time(Duration::new(0, 500));
    targets = bench_curve, bench_fuzzy,
);

criterion_main!(benches);
