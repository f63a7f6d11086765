//! Plain-text rendering of an assessment.

use std::fmt::{self, Write};

use liftrank_core::domain::{Attribute, FilterCriteria, Lift, Outcome};
use liftrank_core::engine::{Distribution, Standing};
use liftrank_core::{Assessment, Report};

use crate::labels::Labels;

/// Width of the longest histogram bar, in characters.
const BAR_WIDTH: usize = 40;

pub fn write_assessment(
    out: &mut impl Write,
    assessment: &Assessment,
    labels: &Labels,
) -> fmt::Result {
    writeln!(out, "=== {} ===", labels.get("title"))?;
    match assessment {
        Assessment::IncompleteInput { invalid } => {
            let names: Vec<&str> = invalid.iter().map(|lift| labels.lift(*lift)).collect();
            writeln!(out, "{}", labels.get("incomplete_input"))?;
            writeln!(out, "{}", labels.format("invalid_lifts", &[("lifts", &names.join(", "))]))
        }
        Assessment::Ranked(report) => write_report(out, report, labels),
    }
}

fn write_report(out: &mut impl Write, report: &Report, labels: &Labels) -> fmt::Result {
    write_criteria(out, &report.criteria, labels)?;
    writeln!(
        out,
        "{:<20}{:.1} kg",
        format!("{}:", labels.get("total")),
        report.total
    )?;
    writeln!(
        out,
        "{}",
        labels.format("sample_size", &[("count", &report.sample_size.to_string())])
    )?;
    if report.criteria.is_empty() {
        writeln!(out, "{}", labels.get("missing_data"))?;
    }
    writeln!(out)?;

    if report.sample_size == 0 {
        return writeln!(out, "{}", labels.get("insufficient_data"));
    }

    writeln!(out, "--- {} ---", labels.get("percentile_generic"))?;
    for (lift, outcome) in report.percentiles.iter() {
        if let Outcome::Ready(p) = outcome {
            let text = labels.format(
                "percentile_specific",
                &[("lift", labels.lift(lift)), ("percentile", &format!("{p:.2}"))],
            );
            writeln!(out, "{text}")?;
        }
    }
    writeln!(out)?;

    for lift in Lift::ALL {
        if let Outcome::Ready(dist) = report.distributions.get(lift) {
            write_histogram(out, dist, labels.lift(lift), report.input.get(lift), labels)?;
        }
    }
    if let Outcome::Ready(dist) = &report.total_distribution {
        write_histogram(out, dist, labels.get("total"), report.total, labels)?;
    }

    if let Outcome::Ready(comparison) = &report.comparison {
        let standing = match comparison.standing {
            Standing::Above => labels.get("above"),
            Standing::Below => labels.get("below"),
        };
        writeln!(out, "--- {}: {} ---", labels.get("comparison"), standing)?;
        let percentile = format!("{:.0}", comparison.group_percentile * 100.0);
        let threshold = format!("{:.1}", comparison.threshold);
        writeln!(
            out,
            "{}",
            labels.format(
                "threshold",
                &[("percentile", &percentile), ("threshold", &threshold)]
            )
        )?;
        writeln!(out)?;
    }

    if let Outcome::Ready(extremes) = &report.extremes {
        writeln!(out, "--- {} ---", labels.get("weakest_strongest"))?;
        writeln!(out, "{} {}", labels.get("weakest"), labels.lift(extremes.weakest))?;
        writeln!(out, "{} {}", labels.get("strongest"), labels.lift(extremes.strongest))?;
    }
    Ok(())
}

fn write_criteria(out: &mut impl Write, criteria: &FilterCriteria, labels: &Labels) -> fmt::Result {
    for attribute in Attribute::ALL {
        let value = criteria
            .get(attribute)
            .unwrap_or_else(|| labels.get("filter_all"));
        writeln!(out, "{:<20}{value}", format!("{}:", labels.attribute(attribute)))?;
    }
    Ok(())
}

/// One row per bucket, bar length proportional to the bucket count. The
/// bucket holding `value` is marked.
pub fn write_histogram(
    out: &mut impl Write,
    dist: &Distribution,
    name: &str,
    value: f64,
    labels: &Labels,
) -> fmt::Result {
    writeln!(out, "--- {} ---", labels.format("distribution", &[("lift", name)]))?;
    writeln!(out, "{:>21} | {}", "kg", labels.get("y_axis_label"))?;

    let marked = dist.bucket_of(value);
    let peak = dist.iter().map(|b| b.count).max().unwrap_or(0).max(1);

    for (i, bucket) in dist.iter().enumerate() {
        let bar = "#".repeat(bucket.count * BAR_WIDTH / peak);
        let marker = if marked == Some(i) {
            format!("  <- {}", labels.get("you"))
        } else {
            String::new()
        };
        writeln!(
            out,
            "{:>9.1} - {:>9.1} | {:<width$} {}{}",
            bucket.start,
            bucket.end,
            bar,
            bucket.count,
            marker,
            width = BAR_WIDTH
        )?;
    }

    if value < dist.min() {
        writeln!(out, "{:>21}   <- {} ({value:.1})", "", labels.get("you"))?;
    } else if value > dist.max() {
        writeln!(out, "{:>21}   -> {} ({value:.1})", "", labels.get("you"))?;
    }
    writeln!(out)
}
