use criterion::{black_box, criterion_group, criterion_main, Criterion};

use skygeom::distance_calc_helper::{DistCalcHelper, DistCalcParams};
use skygeom::skygeom::SkyGeom;

/// Builtin analytic ephemeris: no kernel on disk is needed.
fn bench_helper(c: &mut Criterion) {
    let ctx = SkyGeom::new("builtin").unwrap();

    c.bench_function("dist_calc_helper/default", |b| {
        b.iter(|| DistCalcHelper::new(black_box(&ctx), DistCalcParams::default()).unwrap())
    });

    c.bench_function("dist_calc_helper/far_object", |b| {
        b.iter(|| {
            let params = DistCalcParams {
                ra: 215.3,
                dec: -62.8,
                distance: 80.0,
                ..Default::default()
            };
            DistCalcHelper::new(black_box(&ctx), params).unwrap()
        })
    });
}

criterion_group!(benches, bench_helper);
criterion_main!(benches);
