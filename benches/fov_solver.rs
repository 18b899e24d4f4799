use criterion::{black_box, criterion_group, criterion_main, Criterion};

use skygeom::coordinates::SkyCoord;
use skygeom::wcs::{calc_actual_image_fov, construct_wcs_tangent_projection};

fn bench_solve(c: &mut Criterion) {
    let reference = SkyCoord::icrs(150.0, 2.2).unwrap();
    let mut group = c.benchmark_group("fov_solver");

    for (shape, fov) in [([16, 16], 3.5), ([64, 32], 30.0), ([4096, 2048], 2.0)] {
        group.bench_function(format!("solve/{}x{}@{fov}", shape[0], shape[1]), |b| {
            b.iter(|| {
                construct_wcs_tangent_projection(
                    black_box(&reference),
                    black_box(shape),
                    black_box(fov),
                    true,
                )
                .unwrap()
            })
        });
    }

    let proj = construct_wcs_tangent_projection(&reference, [64, 32], 30.0, true).unwrap();
    group.bench_function("measure/64x32", |b| {
        b.iter(|| calc_actual_image_fov(black_box(&proj), black_box([64, 32])).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_solve);
criterion_main!(benches);
