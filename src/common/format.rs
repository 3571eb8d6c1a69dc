use colored::*;
use std::path::Path;

const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

/// Binary-unit size: `512 B`, `1.5 KB`, `2.00 GB`
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    // kilobytes get one decimal, everything larger two
    if unit == 0 {
        format!("{:.1} {}", value, UNITS[unit])
    } else {
        format!("{:.2} {}", value, UNITS[unit])
    }
}

/// Size highlighted by how much a cleanup would free
pub fn format_size_colored(bytes: u64) -> ColoredString {
    const GB: u64 = 1 << 30;
    const HUNDRED_MB: u64 = 100 << 20;

    let s = format_size(bytes);
    match bytes {
        0 => s.dimmed(),
        b if b >= GB => s.red().bold(),
        b if b >= HUNDRED_MB => s.yellow(),
        _ => s.normal(),
    }
}

/// `1 item`, `3 items`
pub fn format_count(count: u64) -> String {
    let noun = if count == 1 { "item" } else { "items" };
    format!("{} {}", count, noun)
}

/// Describe an age filter for report headers
pub fn format_age_filter(min_age_days: u32) -> String {
    match min_age_days {
        0 => "all files".to_string(),
        1 => "older than 1 day".to_string(),
        n => format!("older than {} days", n),
    }
}

/// Path relative to the user's home, written with `~`
pub fn format_path(path: &Path) -> String {
    match dirs::home_dir() {
        Some(home) => tilde(path, &home),
        None => path.display().to_string(),
    }
}

fn tilde(path: &Path, home: &Path) -> String {
    match path.strip_prefix(home) {
        Ok(rest) if rest.as_os_str().is_empty() => "~".to_string(),
        Ok(rest) => format!("~/{}", rest.display()),
        Err(_) => path.display().to_string(),
    }
}

/// Elapsed scan time: `850ms`, `4.2s`, `2m 5s`
pub fn format_duration(secs: f64) -> String {
    if secs < 1.0 {
        return format!("{:.0}ms", secs * 1000.0);
    }
    if secs < 60.0 {
        return format!("{:.1}s", secs);
    }
    let whole = secs.round() as u64;
    format!("{}m {}s", whole / 60, whole % 60)
}

/// Bold underlined section title with spacing
pub fn print_header(title: &str) {
    println!();
    println!("{}", title.bold().underline());
    println!();
}

/// Indented `key: value` line
pub fn print_kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Shorten to `max_len` characters, ending in `...` when cut
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    if max_len <= 3 {
        return ".".repeat(max_len);
    }
    let head: String = s.chars().take(max_len - 3).collect();
    format!("{}...", head)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size_units() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 << 20), "5.00 MB");
        assert_eq!(format_size(3 << 30), "3.00 GB");
        assert_eq!(format_size(1 << 40), "1.00 TB");
        assert_eq!(format_size(2048 << 30), "2.00 TB");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0 items");
        assert_eq!(format_count(1), "1 item");
        assert_eq!(format_count(2), "2 items");
    }

    #[test]
    fn test_format_age_filter() {
        assert_eq!(format_age_filter(0), "all files");
        assert_eq!(format_age_filter(1), "older than 1 day");
        assert_eq!(format_age_filter(30), "older than 30 days");
    }

    #[test]
    fn test_tilde() {
        let home = Path::new("/home/alice");
        assert_eq!(tilde(Path::new("/home/alice/.cache"), home), "~/.cache");
        assert_eq!(tilde(home, home), "~");
        assert_eq!(tilde(Path::new("/var/log"), home), "/var/log");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.25), "250ms");
        assert_eq!(format_duration(4.2), "4.2s");
        assert_eq!(format_duration(125.0), "2m 5s");
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("caches", 10), "caches");
        assert_eq!(truncate("Application Support", 10), "Applica...");
        assert_eq!(truncate("Ünïcödé names", 6), "Ünï...");
        assert_eq!(truncate("abcd", 2), "..");
    }
}
