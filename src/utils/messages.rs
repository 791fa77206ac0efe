/// Pure functions for formatting CLI status lines

/// Format an error message with emoji
pub fn format_error(message: &str) -> String {
    format!("❌ {}", message)
}

/// Format a success message with emoji
pub fn format_success(message: &str) -> String {
    format!("✅ {}", message)
}

/// Format a warning message with emoji
pub fn format_warning(message: &str) -> String {
    format!("⚠️ {}", message)
}

/// Format an info message with emoji
pub fn format_info(message: &str) -> String {
    format!("ℹ️ {}", message)
}
