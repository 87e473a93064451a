use anyhow::{Result, ensure};
use std::io::Write;
use yqe_core::calibration::VECTOR_QUBITS;
use yqe_core::host_io::HostValue;
use yqe_core::programs::ProgramKind;

/// Column names of one record of `kind`.
pub fn columns(kind: ProgramKind) -> Vec<String> {
    let fixed: &[&str] = match kind {
        ProgramKind::Rb => &["length", "failures"],
        ProgramKind::T1 | ProgramKind::T2 => &["delay", "count"],
        ProgramKind::T1Iq => &["delay", "i"],
        ProgramKind::T2NoFringe => &["delay", "purity"],
        ProgramKind::RabiAmp => &["freq", "amp", "count"],
        ProgramKind::RabiPulse => &["freq", "len", "count"],
        ProgramKind::RabiZ => &["z", "len", "count"],
        ProgramKind::Transmission => &["count"],
        ProgramKind::VectorT1 => {
            let mut cols = vec!["delay".to_string()];
            cols.extend((0..VECTOR_QUBITS).map(|q| format!("count_q{q}")));
            return cols;
        }
    };
    fixed.iter().map(|c| c.to_string()).collect()
}

/// Splits the emitted stream into records of `kind`.
pub fn records(kind: ProgramKind, values: &[HostValue]) -> Result<Vec<&[HostValue]>> {
    let arity = kind.record_arity();
    ensure!(
        values.len() % arity == 0,
        "{} emitted {} values, not a multiple of its {}-value record",
        kind,
        values.len(),
        arity
    );
    Ok(values.chunks(arity).collect())
}

/// Writes the result stream of `kind` as text, one record per line.
pub fn write_records<W: Write>(mut out: W, kind: ProgramKind, values: &[HostValue]) -> Result<()> {
    let records = records(kind, values)?;
    writeln!(out, "# {kind}")?;
    writeln!(out, "# {}", columns(kind).join(" "))?;
    for record in records {
        let line: Vec<String> = record.iter().map(HostValue::to_string).collect();
        writeln!(out, "{}", line.join(" "))?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_match_record_arity() {
        for kind in ProgramKind::ALL {
            assert_eq!(columns(kind).len(), kind.record_arity(), "{kind}");
        }
    }

    #[test]
    fn writes_header_and_rows() {
        let values = [
            HostValue::Word(0),
            HostValue::Double(0.5),
            HostValue::Word(100),
            HostValue::Double(-0.25),
        ];
        let mut out = Vec::new();
        write_records(&mut out, ProgramKind::T1Iq, &values).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "# t1-iq\n# delay i\n0 0.5\n100 -0.25\n"
        );
    }

    #[test]
    fn rejects_partial_record() {
        let values = [HostValue::Word(1), HostValue::Word(2), HostValue::Word(3)];
        assert!(records(ProgramKind::Rb, &values).is_err());
        assert_eq!(records(ProgramKind::RabiZ, &values).unwrap().len(), 1);
    }
}
