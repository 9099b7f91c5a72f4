//! Export aggregated ads to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::AppError;
use crate::metrics::{AdGroup, ad_status};

const HEADER: &str = "ad_id,ad_name,campaign,campaign_id,adset_id,status,spend,purchases,revenue,cpa,roas,average_order_value,merged_rows,thumbnail_url";

/// Write one line per aggregated ad to a CSV file.
pub fn write_ads_csv(path: &Path, groups: &[AdGroup]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut out = BufWriter::new(file);
    write_ads(&mut out, groups)?;
    out.flush()
        .map_err(|e| AppError::io(format!("Failed to write export CSV '{}': {e}", path.display())))
}

/// Write the CSV to any writer.
pub fn write_ads<W: Write>(out: &mut W, groups: &[AdGroup]) -> Result<(), AppError> {
    writeln!(out, "{HEADER}").map_err(|e| AppError::io(format!("Failed to write export CSV header: {e}")))?;

    for g in groups {
        let m = g.metrics();
        let opt = |v: Option<f64>| v.map(|x| format!("{x:.4}")).unwrap_or_default();
        writeln!(
            out,
            "{},{},{},{},{},{},{:.2},{},{:.2},{},{},{},{},{}",
            csv_field(&g.key.ad_id),
            csv_field(&g.key.ad_name),
            csv_field(&g.row.campaign().unwrap_or_default()),
            csv_field(&g.key.campaign_id),
            csv_field(&g.key.adset_id),
            ad_status(&g.row).label(),
            m.spend,
            m.purchases,
            m.revenue,
            opt(m.cpa()),
            opt(m.roas()),
            opt(m.average_order_value()),
            g.merged,
            csv_field(&g.row.thumbnail_url().unwrap_or_default()),
        )
        .map_err(|e| AppError::io(format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

/// Quote a field when it contains a delimiter, quote, or newline.
fn csv_field(raw: &str) -> String {
    if raw.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}
