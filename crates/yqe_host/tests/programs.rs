use std::fs;

use yqe_core::host_io::HostValue;
use yqe_core::programs::ProgramKind;
use yqe_host::config::{DeviceConfig, QubitConfig};
use yqe_host::runner::{run_program, simulate};
use yqe_io::params::rb_params;

fn words(values: &[HostValue]) -> Vec<i32> {
    values
        .iter()
        .map(|v| match v {
            HostValue::Word(w) => *w,
            HostValue::Double(d) => panic!("expected word, got {d}"),
        })
        .collect()
}

#[test]
fn rb_on_noiseless_device_reports_zero_failures() {
    let out = simulate(
        ProgramKind::Rb,
        DeviceConfig::noiseless(1),
        rb_params(42, 2, &[3]),
    )
    .unwrap();
    assert_eq!(out, [HostValue::Word(3), HostValue::Word(0)]);
}

#[test]
fn rb_sweep_keeps_length_order() {
    let out = simulate(
        ProgramKind::Rb,
        DeviceConfig::noiseless(1),
        rb_params(7, 3, &[10, 1, 5]),
    )
    .unwrap();
    assert_eq!(words(&out), [10, 0, 1, 0, 5, 0]);
}

#[test]
fn rb_failures_grow_with_gate_error() {
    let mut config = DeviceConfig::noiseless(1);
    config.qubits[0].gate_error = 0.02;
    let out = simulate(ProgramKind::Rb, config, rb_params(3, 5, &[1, 60])).unwrap();
    let w = words(&out);
    assert_eq!((w[0], w[2]), (1, 60));
    assert!(w[3] > w[1], "failures at L=60 ({}) vs L=1 ({})", w[3], w[1]);
}

#[test]
fn t1_survival_recovers_with_delay() {
    let mut config = DeviceConfig::noiseless(1);
    config.qubits[0] = QubitConfig {
        t1: Some(1000.0),
        ..QubitConfig::NOISELESS
    };
    let out = simulate(ProgramKind::T1, config, vec![4000.0, 3000.0, 1000.0]).unwrap();
    let w = words(&out);
    assert_eq!((w[0], w[2]), (0, 3000));
    assert!(w[1] < 200, "early survival {}", w[1]);
    assert!(w[3] > 850, "late survival {}", w[3]);
}

#[test]
fn ramsey_without_fringe_flips_qubit() {
    let out = simulate(
        ProgramKind::T2,
        DeviceConfig::noiseless(1),
        vec![0.0, 300.0, 100.0, 200.0],
    )
    .unwrap();
    assert_eq!(words(&out), [0, 0, 100, 0, 200, 0]);
}

fn purity_records(values: &[HostValue]) -> Vec<(i32, f64)> {
    values
        .chunks(2)
        .map(|pair| match pair {
            [HostValue::Word(delay), HostValue::Double(purity)] => (*delay, *purity),
            other => panic!("unexpected record {other:?}"),
        })
        .collect()
}

#[test]
fn ramsey_both_bases_keep_full_purity_when_noiseless() {
    let out = simulate(
        ProgramKind::T2NoFringe,
        DeviceConfig::noiseless(1),
        vec![100.0, 100.0, 1000.0],
    )
    .unwrap();
    let records = purity_records(&out);
    assert_eq!(records.len(), 2);
    for (i, (delay, purity)) in records.into_iter().enumerate() {
        assert_eq!(delay, 100 * i as i32);
        assert!((purity - 0.5).abs() < 0.01, "purity {purity} at {delay}");
    }
}

#[test]
fn ramsey_both_bases_lose_purity_with_dephasing() {
    let mut config = DeviceConfig::noiseless(1);
    config.qubits[0] = QubitConfig {
        t1: Some(1000.0),
        t2: Some(1000.0),
        ..QubitConfig::NOISELESS
    };
    let out = simulate(ProgramKind::T2NoFringe, config, vec![5000.0, 5000.0, 1000.0]).unwrap();
    let records = purity_records(&out);
    assert_eq!(records[1].0, 5000);
    assert!(records[0].1 > 0.3, "early purity {}", records[0].1);
    assert!(records[1].1 < 0.1, "late purity {}", records[1].1);
}

#[test]
fn rabi_amp_full_amplitude_is_pi_pulse() {
    let out = simulate(
        ProgramKind::RabiAmp,
        DeviceConfig::noiseless(1),
        vec![0.0, 1.0, 4.0, 3.0],
    )
    .unwrap();
    let w = words(&out);
    assert_eq!(w.len(), 6);
    assert_eq!(&w[3..], [0, 4, 0]);
}

#[test]
fn rabi_pulse_records_cover_grid() {
    let out = simulate(
        ProgramKind::RabiPulse,
        DeviceConfig::noiseless(1),
        vec![100.0, 100.0, 3.0, 1.0],
    )
    .unwrap();
    let w = words(&out);
    assert_eq!(w.len(), 3 * 3 * 3);
    for record in w.chunks(3) {
        assert!((-100..=100).contains(&record[0]));
        assert!((1..=3).contains(&record[1]));
        assert!((0..=1000).contains(&record[2]));
    }
}

#[test]
fn transmission_with_unbiased_z_flips_qubit() {
    let out = simulate(
        ProgramKind::Transmission,
        DeviceConfig::noiseless(1),
        vec![0.5, 0.0, 0.0, 1.0, 0.0, 300.0],
    )
    .unwrap();
    assert_eq!(out, [HostValue::Word(0)]);
}

#[test]
fn vector_t1_measures_five_qubits() {
    let out = simulate(
        ProgramKind::VectorT1,
        DeviceConfig::noiseless(5),
        vec![1.0, 1.0, 50.0],
    )
    .unwrap();
    assert_eq!(words(&out), [0, 0, 0, 0, 0, 0]);
}

#[test]
fn t1_iq_reports_excited_fraction() {
    let out = simulate(
        ProgramKind::T1Iq,
        DeviceConfig::noiseless(1),
        vec![1.0, 1.0, 50.0],
    )
    .unwrap();
    assert_eq!(out, [HostValue::Word(0), HostValue::Double(1.0)]);
}

#[test]
fn missing_parameters_fail_fast() {
    let err = simulate(ProgramKind::T1, DeviceConfig::default(), vec![100.0]).unwrap_err();
    assert!(format!("{err:#}").contains("delay_step"), "{err:#}");
}

#[test]
fn run_program_writes_record_file() {
    let dir = tempfile::tempdir().unwrap();
    let params = dir.path().join("t2.txt");
    let device = dir.path().join("device.json");
    let out = dir.path().join("t2.out");
    fs::write(&params, "# fringe, max, step, repeat\n0.0, 200, 100, 100\n").unwrap();
    fs::write(&device, r#"{"qubits": [{"t1": null, "t2": null}], "shot_seed": 5}"#).unwrap();

    run_program(ProgramKind::T2, &params, Some(&device), Some(&out)).unwrap();

    let text = fs::read_to_string(&out).unwrap();
    assert_eq!(text, "# t2\n# delay count\n0 0\n100 0\n");
}

#[test]
fn run_program_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = run_program(ProgramKind::T1, &dir.path().join("nope.txt"), None, None).unwrap_err();
    assert!(err.to_string().contains("nope.txt"));
}
