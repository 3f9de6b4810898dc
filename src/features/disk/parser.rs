use crate::shared::error::CollectionError;

/// Capacity figures from the last row of a `df -k` table, in KiB.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiskUsage {
    pub total: f64,
    pub free: f64,
}

impl DiskUsage {
    pub fn load(&self) -> f64 {
        1.0 - self.free / self.total
    }
}

/// Reads the last line of `df -k` output: column 1 is the size of the
/// filesystem and column 3 the space still available.
pub fn parse_disk_usage(output: &str) -> Result<DiskUsage, CollectionError> {
    let last = output
        .trim()
        .lines()
        .last()
        .filter(|line| !line.trim().is_empty())
        .ok_or_else(|| CollectionError::MalformedOutput("df printed nothing".to_string()))?;

    // A continuation line keeps an empty leading column, so the figures stay
    // at the same positions as on a single-line row.
    let mut columns: Vec<&str> = last.split_whitespace().collect();
    if last.starts_with(char::is_whitespace) {
        columns.insert(0, "");
    }
    let column = |index: usize, label: &str| -> Result<f64, CollectionError> {
        columns
            .get(index)
            .and_then(|value| value.parse::<f64>().ok())
            .ok_or_else(|| {
                CollectionError::MalformedOutput(format!("no {} column in df line {:?}", label, last))
            })
    };

    let total = column(1, "total")?;
    let free = column(3, "free")?;
    if total <= 0.0 {
        return Err(CollectionError::MalformedOutput(format!(
            "df reports zero capacity in {:?}",
            last
        )));
    }

    Ok(DiskUsage { total, free })
}

/// Wraps `value` in single quotes so `sh` passes it through verbatim.
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
