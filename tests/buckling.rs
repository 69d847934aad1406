use std::f64::consts::PI;

use approx::assert_relative_eq;
use georod::{
    config::{Elasticity, LoadSchedule, Location, PointLoad, RodConfig},
    prelude::*,
    solver::{buckling::critical_load_multiplier, Solver},
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Clamped-free column under a dead compressive tip force of `p_ref`
fn column(p_ref: f64) -> Solver {
    Solver::new(RodConfig {
        length: 1.,
        num_elements: 20,
        nodes_per_element: 2,
        gauss_points: 1,
        elasticity: Elasticity::from_diagonals([1e4, 1e4, 1e4], [2., 2., 1.]),
        loads: vec![PointLoad::force(
            Location::FreeEnd,
            Vector3::new(0., 0., -1.),
        )],
        schedule: LoadSchedule::linear(p_ref, 2),
        buckling: true,
        ..Default::default()
    })
    .unwrap()
}

#[test]
fn test_euler_cantilever_load() {
    init_logger();
    let p_ref = 0.1;
    let euler = PI * PI * 2. / 4.;

    let mut solver = column(p_ref);
    solver.step(0).unwrap();
    let report = solver.step(1).unwrap();
    assert!(report.converged);

    // Eigenvalues are reported sorted
    let mu = report.eigenvalues.unwrap();
    assert!(mu.windows(2).all(|w| w[0] <= w[1]));

    let critical = critical_load_multiplier(&mu).unwrap();
    assert_relative_eq!(critical * p_ref, euler, max_relative = 3e-2);

    // Clamped DOFs contribute the trivial multiplier -1
    assert_eq!(
        mu.iter().filter(|&&m| (m + 1.).abs() < 1e-9).count(),
        DOF
    );
}

#[test]
fn test_lateral_torsional_buckling() {
    init_logger();
    let (ei2, gj) = (2., 1.);
    let mut solver = Solver::new(RodConfig {
        elasticity: Elasticity::from_diagonals([100.; 3], [1e5, ei2, gj]),
        loads: vec![PointLoad::force(Location::FreeEnd, Vector3::y())],
        schedule: LoadSchedule::linear(7., 51),
        residual_tolerance: 1e-3,
        ..Default::default()
    })
    .unwrap();

    // Transverse tip load on a cantilever stiff in the load plane
    let step = 40;
    for i in 0..=step {
        assert!(solver.step(i).unwrap().converged);
    }
    let p = solver.config().schedule.magnitude(step).unwrap();
    assert_relative_eq!(p, 5.6, epsilon = 1e-12);

    let critical = critical_load_multiplier(&solver.buckling_analysis().unwrap()).unwrap();
    let reference = 4.013 * (ei2 * gj).sqrt();
    assert_relative_eq!(critical * p, reference, max_relative = 1e-2);
}

#[test]
fn test_one_shot_analysis_matches_step_report() {
    init_logger();
    let mut solver = column(0.1);
    let report = solver.step(1).unwrap();
    let mu = solver.buckling_analysis().unwrap();
    let critical = critical_load_multiplier(&mu).unwrap();
    let reported = critical_load_multiplier(report.eigenvalues.as_ref().unwrap()).unwrap();
    assert_relative_eq!(critical, reported, max_relative = 1e-6);

    // Critical load does not depend on the reference load level
    let mut solver = column(0.2);
    solver.step(1).unwrap();
    let critical_2 = critical_load_multiplier(&solver.buckling_analysis().unwrap()).unwrap();
    assert_relative_eq!(critical * 0.1, critical_2 * 0.2, max_relative = 1e-3);
}

#[test]
fn test_compressed_tangent_is_symmetric() {
    init_logger();
    let mut solver = column(0.1);
    solver.step(1).unwrap();
    let k = solver.tangent_system().stiffness;
    assert!((&k - k.transpose()).amax() <= 1e-6 * k.amax());

    // Buckling split sums to the tangent
    let sys = solver.tangent_system();
    assert_relative_eq!(
        sys.material + sys.geometric,
        sys.stiffness,
        epsilon = 1e-9
    );
}
