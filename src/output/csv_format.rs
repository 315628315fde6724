//! CSV output formatting.

use crate::scanner::ScanReport;
use std::io::{self, Write};

/// Write one CSV row per open port.
pub fn write_csv<W: Write>(out: &mut W, report: &ScanReport) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    wtr.write_record(["port", "state", "service", "banner", "response_time_ms"])?;

    for result in &report.results {
        let port = result.port.to_string();
        let state = result.status.to_string();
        let response_time = result
            .response_time_ms
            .map_or(String::new(), |t| t.to_string());

        wtr.write_record([
            port.as_str(),
            state.as_str(),
            result.service.as_str(),
            result.banner.as_deref().unwrap_or(""),
            response_time.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::test_support::report;
    use crate::scanner::PortResult;

    #[test]
    fn test_csv_rows() {
        let mut buf = Vec::new();
        let results = vec![
            PortResult::open(22, "SSH").with_response_time(3),
            PortResult::open(9999, "custom-service").with_banner(Some("hi, there".to_string())),
        ];
        write_csv(&mut buf, &report(results)).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "port,state,service,banner,response_time_ms");
        assert_eq!(lines[1], "22,open,SSH,,3");
        assert_eq!(lines[2], "9999,open,custom-service,\"hi, there\",");
    }
}
