use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use super::reader::OrdinationRow;
use crate::cohort::{CohortSummary, ReferencePoint, SummaryValue};
use crate::error::Result;
use crate::figure::Figure;
use crate::view::DashboardView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Aligned, human-readable tables
    Text,
    /// Tab-separated, one `# Section` header per table
    Tsv,
    /// Pretty-printed JSON
    Json,
}

/// File at `path`, or stdout when none is given
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout()),
    })
}

/// Members a value was computed over
fn denominator(value: &SummaryValue) -> usize {
    match *value {
        SummaryValue::Count { of, .. } => of,
        SummaryValue::Mean { n, .. } => n,
    }
}

fn format_value(value: &SummaryValue) -> String {
    match (value.count(), value.percent(), value.mean()) {
        (Some(count), Some(pct), _) => {
            format!("{}/{} ({:.1}%)", count, denominator(value), pct)
        }
        (None, _, Some(mean)) => format!("{:.1}", mean),
        _ => "no data".to_string(),
    }
}

fn write_summary_text<W: Write + ?Sized>(writer: &mut W, summary: &CohortSummary) -> Result<()> {
    writeln!(
        writer,
        "Cohort summary ({} of {} with metadata)",
        summary.with_metadata, summary.cohort_size
    )?;
    writeln!(writer, "{:<40}\t{:<16}\t{}", "Attribute", "Icon", "Value")?;
    writeln!(writer, "{}", "-".repeat(75))?;
    for entry in &summary.entries {
        writeln!(
            writer,
            "{:<40}\t{:<16}\t{}",
            entry.label,
            entry.icon,
            format_value(&entry.value)
        )?;
    }
    Ok(())
}

fn write_summary_tsv<W: Write + ?Sized>(writer: &mut W, summary: &CohortSummary) -> Result<()> {
    writeln!(writer, "# Cohort Summary")?;
    writeln!(writer, "attribute\ticon\tkind\tvalue\tof\tpercent")?;
    for entry in &summary.entries {
        let kind = if entry.attribute.is_mean() { "mean" } else { "count" };
        let value = match (entry.value.count(), entry.value.mean()) {
            (Some(count), _) => count.to_string(),
            (None, Some(mean)) => format!("{:.4}", mean),
            (None, None) => String::new(),
        };
        let percent = entry
            .value
            .percent()
            .map(|p| format!("{:.2}", p))
            .unwrap_or_default();
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}",
            entry.attribute,
            entry.icon,
            kind,
            value,
            denominator(&entry.value),
            percent
        )?;
    }
    Ok(())
}

fn write_reference_text<W: Write + ?Sized>(
    writer: &mut W,
    reference: &ReferencePoint,
) -> Result<()> {
    writeln!(writer, "Healthy reference ({} samples)", reference.n)?;
    writeln!(writer, "{:<30}\t{}", "Metric", "Value")?;
    writeln!(writer, "{}", "-".repeat(50))?;
    writeln!(writer, "{:<30}\t{:.2}%", "Bacteroidetes", reference.bacteroidetes * 100.0)?;
    writeln!(writer, "{:<30}\t{:.2}%", "Firmicutes", reference.firmicutes * 100.0)?;
    writeln!(writer, "{:<30}\t{:.6}", "PC1", reference.pc1)?;
    writeln!(writer, "{:<30}\t{:.6}", "PC2", reference.pc2)?;
    Ok(())
}

fn write_reference_tsv<W: Write + ?Sized>(
    writer: &mut W,
    reference: &ReferencePoint,
) -> Result<()> {
    writeln!(writer, "# Healthy Reference")?;
    writeln!(writer, "metric\tvalue")?;
    writeln!(writer, "n\t{}", reference.n)?;
    writeln!(writer, "bacteroidetes\t{:.6}", reference.bacteroidetes)?;
    writeln!(writer, "firmicutes\t{:.6}", reference.firmicutes)?;
    writeln!(writer, "pc1\t{:.6}", reference.pc1)?;
    writeln!(writer, "pc2\t{:.6}", reference.pc2)?;
    Ok(())
}

fn write_figure_tsv<W: Write + ?Sized>(writer: &mut W, figure: &Figure) -> Result<()> {
    writeln!(writer, "# {}", figure.title)?;
    writeln!(writer, "id\tpc1\tpc2\tcolor\tsize\thighlighted")?;
    for point in &figure.points {
        writeln!(
            writer,
            "{}\t{:.6}\t{:.6}\t{:.4}\t{:.2}\t{}",
            point.id, point.pc1, point.pc2, point.color, point.size, point.highlighted
        )?;
    }
    Ok(())
}

/// Write one dashboard recomputation
pub fn write_view<W: Write + ?Sized>(
    writer: &mut W,
    view: &DashboardView,
    format: ReportFormat,
) -> Result<()> {
    match format {
        ReportFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, view)?;
            writeln!(writer)?;
        }
        ReportFormat::Tsv => {
            writeln!(writer, "# Query")?;
            writeln!(writer, "bacteroidetes\tfirmicutes")?;
            writeln!(
                writer,
                "{:.6}\t{:.6}",
                view.query.bacteroidetes(),
                view.query.firmicutes()
            )?;
            writeln!(writer)?;

            writeln!(writer, "# Nearest Samples")?;
            writeln!(writer, "rank\tid\tdistance")?;
            for (rank, neighbor) in view.neighbors.neighbors().iter().enumerate() {
                writeln!(writer, "{}\t{}\t{:.6}", rank + 1, neighbor.id, neighbor.distance)?;
            }
            writeln!(writer)?;

            write_summary_tsv(writer, &view.summary)?;
            if let Some(reference) = &view.reference {
                writeln!(writer)?;
                write_reference_tsv(writer, reference)?;
            }
            if let Some(figure) = &view.figure {
                writeln!(writer)?;
                write_figure_tsv(writer, figure)?;
            }
        }
        ReportFormat::Text => {
            writeln!(writer, "{:<30}\t{}", "Query", "Value")?;
            writeln!(writer, "{}", "-".repeat(50))?;
            let query = &view.query;
            writeln!(writer, "{:<30}\t{:.2}%", "Bacteroidetes", query.bacteroidetes() * 100.0)?;
            writeln!(writer, "{:<30}\t{:.2}%", "Firmicutes", query.firmicutes() * 100.0)?;
            writeln!(writer)?;

            if view.neighbors.is_empty() {
                writeln!(writer, "No neighbours requested")?;
            }
            writeln!(writer, "{:<6}\t{:<30}\t{:>10}", "Rank", "Sample", "Distance")?;
            writeln!(writer, "{}", "-".repeat(50))?;
            for (rank, neighbor) in view.neighbors.neighbors().iter().enumerate() {
                writeln!(
                    writer,
                    "{:<6}\t{:<30}\t{:>10.4}",
                    rank + 1,
                    neighbor.id,
                    neighbor.distance
                )?;
            }
            writeln!(writer)?;

            write_summary_text(writer, &view.summary)?;
            writeln!(writer)?;
            match &view.reference {
                Some(reference) => write_reference_text(writer, reference)?,
                None => writeln!(
                    writer,
                    "Healthy reference: no healthy samples in the population"
                )?,
            }
            if let Some(figure) = &view.figure {
                writeln!(writer)?;
                writeln!(
                    writer,
                    "{}: {} points, {} highlighted",
                    figure.title,
                    figure.points.len(),
                    figure.highlighted().count()
                )?;
            }
        }
    }
    Ok(())
}

pub fn write_reference<W: Write + ?Sized>(
    writer: &mut W,
    reference: &ReferencePoint,
    format: ReportFormat,
) -> Result<()> {
    match format {
        ReportFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, reference)?;
            writeln!(writer)?;
            Ok(())
        }
        ReportFormat::Tsv => write_reference_tsv(writer, reference),
        ReportFormat::Text => write_reference_text(writer, reference),
    }
}

/// Compact JSON followed by a newline, for line-oriented consumers
pub fn write_json_line<W: Write + ?Sized, T: Serialize>(writer: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer(&mut *writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

pub fn write_error_line<W: Write + ?Sized>(writer: &mut W, message: &str) -> Result<()> {
    write_json_line(writer, &serde_json::json!({ "error": message }))
}

/// Write `id,PC1,PC2`, the layout the ordination reader expects
pub fn write_ordination<P: AsRef<Path>>(path: P, rows: &[OrdinationRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["id", "PC1", "PC2"])?;
    for row in rows {
        writer.write_record([row.id.clone(), row.pc1.to_string(), row.pc2.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cohort::types::SummaryEntry;
    use crate::cohort::Attribute;
    use crate::io::reader::read_ordination;
    use crate::neighbors::types::Neighbor;
    use crate::neighbors::{NeighborSet, QueryPoint};
    use tempfile::tempdir;

    fn view() -> DashboardView {
        DashboardView {
            query: QueryPoint::new(0.4, 0.5).unwrap(),
            neighbors: NeighborSet::new(vec![Neighbor {
                id: "s1".to_string(),
                distance: 0.125,
            }]),
            summary: CohortSummary {
                cohort_size: 1,
                with_metadata: 1,
                entries: vec![
                    SummaryEntry {
                        attribute: Attribute::Dog,
                        icon: Attribute::Dog.icon(),
                        label: Attribute::Dog.label(),
                        value: SummaryValue::Count { count: 1, of: 1 },
                    },
                    SummaryEntry {
                        attribute: Attribute::Bmi,
                        icon: Attribute::Bmi.icon(),
                        label: Attribute::Bmi.label(),
                        value: SummaryValue::Mean { mean: None, n: 0 },
                    },
                ],
            },
            reference: None,
            figure: None,
        }
    }

    fn render(format: ReportFormat) -> String {
        let mut out = Vec::new();
        write_view(&mut out, &view(), format).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&SummaryValue::Count { count: 1, of: 4 }), "1/4 (25.0%)");
        assert_eq!(format_value(&SummaryValue::Count { count: 0, of: 0 }), "no data");
        assert_eq!(format_value(&SummaryValue::Mean { mean: Some(41.96), n: 3 }), "42.0");
    }

    #[test]
    fn test_tsv_sections() {
        let tsv = render(ReportFormat::Tsv);
        assert!(tsv.contains("# Nearest Samples\nrank\tid\tdistance\n1\ts1\t0.125000\n"));
        assert!(tsv.contains("dog\tdog\tcount\t1\t1\t100.00"));
        assert!(tsv.contains("bmi\tweight\tmean\t\t0\t"));
        assert!(!tsv.contains("# Healthy Reference"));
    }

    #[test]
    fn test_text_without_reference() {
        let text = render(ReportFormat::Text);
        assert!(text.contains("s1"));
        assert!(text.contains("no healthy samples"));
    }

    #[test]
    fn test_json_view() {
        let json: serde_json::Value = serde_json::from_str(&render(ReportFormat::Json)).unwrap();
        assert_eq!(json["neighbors"][0]["id"], "s1");
        assert!(json["reference"].is_null());
    }

    #[test]
    fn test_json_lines() {
        let mut out = Vec::new();
        write_json_line(&mut out, &view().neighbors).unwrap();
        write_error_line(&mut out, "bad input").unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], r#"{"error":"bad input"}"#);
    }

    #[test]
    fn test_ordination_written_is_readable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pcoa.csv");
        let rows = vec![
            OrdinationRow { id: "a".to_string(), pc1: 0.25, pc2: -0.5 },
            OrdinationRow { id: "b".to_string(), pc1: -0.25, pc2: 0.5 },
        ];
        write_ordination(&path, &rows).unwrap();
        assert_eq!(read_ordination(&path).unwrap(), rows);
    }
}
