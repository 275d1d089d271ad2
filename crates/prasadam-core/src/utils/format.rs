/// Format an amount as rupees with two decimals, e.g. `₹130.00`
pub fn format_rupees(amount: f64) -> String {
    format!("₹{:.2}", amount)
}

/// Format a unit price the short way: whole amounts without decimals (`₹50`),
/// others with trailing zeros dropped (`₹12.5`)
pub fn format_price(amount: f64) -> String {
    let fixed = format!("{:.2}", amount);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("₹{}", trimmed)
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}
