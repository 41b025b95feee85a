use std::time::Duration;

/// Formats a duration the way `w:OperationTimeout` expects it, e.g. `PT60.000S`.
pub fn iso8601_duration(duration: Duration) -> String {
    format!("PT{:.3}S", duration.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_seconds_with_millis() {
        assert_eq!(iso8601_duration(Duration::from_secs(60)), "PT60.000S");
        assert_eq!(iso8601_duration(Duration::from_millis(1500)), "PT1.500S");
    }
}
