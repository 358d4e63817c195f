use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use strided_gufuncs::{
    matmul_into, pdist_ratio, row_major_strides, Numerics, StridedView, StridedViewMut,
};

fn randn(rng: &mut StdRng, n: usize) -> Vec<f64> {
    (0..n).map(|_| rng.sample::<f64, _>(StandardNormal)).collect()
}

fn bench_matmul(c: &mut Criterion) {
    let nc = Numerics::new();
    let mut rng = StdRng::seed_from_u64(42);
    let n = 64usize;
    let x = randn(&mut rng, n * n);
    let y = randn(&mut rng, n * n);
    let mut z = vec![0.0; n * n];
    let dims = [n, n];
    let strides = row_major_strides(&dims);

    let mut group = c.benchmark_group("matmul_64");
    group.bench_function("contiguous", |b| {
        let xv = StridedView::new(&x, &dims, &strides, 0).unwrap();
        let yv = StridedView::new(&y, &dims, &strides, 0).unwrap();
        b.iter(|| {
            let mut zv = StridedViewMut::new(&mut z, &dims, &strides, 0).unwrap();
            matmul_into(&mut zv, black_box(&xv), black_box(&yv), &nc).unwrap();
        })
    });
    group.bench_function("transposed_rhs", |b| {
        let xv = StridedView::new(&x, &dims, &strides, 0).unwrap();
        let yv = StridedView::new(&y, &dims, &strides, 0)
            .unwrap()
            .permute(&[1, 0])
            .unwrap();
        b.iter(|| {
            let mut zv = StridedViewMut::new(&mut z, &dims, &strides, 0).unwrap();
            matmul_into(&mut zv, black_box(&xv), black_box(&yv), &nc).unwrap();
        })
    });
    group.finish();
}

fn bench_pdist_ratio(c: &mut Criterion) {
    let nc = Numerics::new();
    let mut rng = StdRng::seed_from_u64(42);
    let (d, m, n) = (128usize, 8usize, 16usize);
    let num = randn(&mut rng, d * m);
    let den = randn(&mut rng, d * n);

    c.bench_function("pdist_ratio_128", |b| {
        let numv = StridedView::new(&num, &[d, m], &row_major_strides(&[d, m]), 0).unwrap();
        let denv = StridedView::new(&den, &[d, n], &row_major_strides(&[d, n]), 0).unwrap();
        b.iter(|| pdist_ratio(black_box(&numv), black_box(&denv), &nc).unwrap())
    });
}

criterion_group!(benches, bench_matmul, bench_pdist_ratio);
criterion_main!(benches);
