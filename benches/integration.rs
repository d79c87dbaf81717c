use criterion::{black_box, criterion_group, criterion_main, Criterion};
use event_integrator::{
    AxisCrossing, Cr3bp, EventIntegrator, Interpolation, LocalizationConfig, NoEvent, Rkf78,
    TimeSpan, Tolerances,
};

const EARTH_MOON_MU: f64 = 0.0121505856;

/// Near-circular orbit of radius 0.2 about the larger primary.
fn low_orbit() -> [f64; 6] {
    let r: f64 = 0.2;
    let omega = ((1.0 - EARTH_MOON_MU) / r.powi(3)).sqrt();
    [r - EARTH_MOON_MU, 0.0, 0.0, 0.0, r * (omega - 1.0), 0.0]
}

fn bench_cr3bp_no_events(c: &mut Criterion) {
    let sys = Cr3bp::new(EARTH_MOON_MU);
    let x0 = low_orbit();
    let span = TimeSpan::new(0.0, 10.0).unwrap();

    c.bench_function("cr3bp_6_state_no_events", |b| {
        b.iter(|| {
            let mut integrator =
                EventIntegrator::new(Rkf78::new(), Tolerances::new(1e-12, 1e-12), 1e-3);
            integrator
                .integrate_adaptive(&sys, &mut NoEvent::default(), black_box(&x0), span)
                .unwrap()
        })
    });
}

fn bench_cr3bp_xz_crossings(c: &mut Criterion) {
    let sys = Cr3bp::new(EARTH_MOON_MU);
    let x0 = low_orbit();
    let span = TimeSpan::new(0.0, 10.0).unwrap();

    let mut group = c.benchmark_group("cr3bp_xz_crossings");
    for interpolation in [Interpolation::Substep, Interpolation::Hermite] {
        group.bench_function(format!("{:?}", interpolation), |b| {
            b.iter(|| {
                let mut event = AxisCrossing::xz_plane(20);
                let mut integrator =
                    EventIntegrator::new(Rkf78::new(), Tolerances::new(1e-12, 1e-12), 1e-3)
                        .with_localization(LocalizationConfig {
                            interpolation,
                            ..Default::default()
                        });
                integrator
                    .integrate_adaptive(&sys, &mut event, black_box(&x0), span)
                    .unwrap()
            })
        });
    }
    group.finish();
}

fn bench_cr3bp_stm(c: &mut Criterion) {
    let sys = Cr3bp::new(EARTH_MOON_MU);
    let x0 = Cr3bp::augment(&low_orbit());
    let span = TimeSpan::new(0.0, 2.0).unwrap();

    c.bench_function("cr3bp_42_state_xz_crossings", |b| {
        b.iter(|| {
            let mut event = AxisCrossing::xz_plane(4);
            let mut integrator =
                EventIntegrator::new(Rkf78::new(), Tolerances::new(1e-12, 1e-12), 1e-3);
            integrator
                .integrate_adaptive(&sys, &mut event, black_box(&x0), span)
                .unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_cr3bp_no_events,
    bench_cr3bp_xz_crossings,
    bench_cr3bp_stm
);
criterion_main!(benches);
