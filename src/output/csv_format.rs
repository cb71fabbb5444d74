//! CSV output formatting.

use crate::scanner::ScanReport;
use std::io::Write;

/// Write one row per open port.
pub fn write_csv<W: Write>(out: W, report: &ScanReport) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    wtr.write_record(["host", "address", "port", "state"])?;

    let address = report.address.map(|ip| ip.to_string()).unwrap_or_default();
    for port in &report.open_ports {
        let port = port.to_string();
        wtr.write_record([report.host.as_str(), address.as_str(), port.as_str(), "open"])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_rows() {
        let report = ScanReport {
            host: "example.lan".into(),
            address: Some("10.0.0.2".parse().unwrap()),
            ports_scanned: 3,
            open_ports: vec![22, 80],
            elapsed_ms: 5,
        };
        let mut buf = Vec::new();
        write_csv(&mut buf, &report).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "host,address,port,state\nexample.lan,10.0.0.2,22,open\nexample.lan,10.0.0.2,80,open\n"
        );
    }
}
