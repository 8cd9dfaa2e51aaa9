const UNITS: [&str; 5] = ["KB", "MB", "GB", "TB", "PB"];

/// Renders a byte count with binary units, e.g. `2048` as `2.00 KB`.
pub fn human_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut size = bytes as f64 / 1024.0;
    let mut unit = UNITS[0];
    for next in &UNITS[1..] {
        if size < 1024.0 {
            break;
        }
        size /= 1024.0;
        unit = *next;
    }
    format!("{:.2} {}", size, unit)
}
