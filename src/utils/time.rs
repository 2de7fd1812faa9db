/// Human-readable course duration for certificate display.
/// Below one hour only minutes are shown.
pub fn format_duration_minutes(total_minutes: i64) -> String {
    let total_minutes = total_minutes.max(0);
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    if hours == 0 {
        format!("{}m", minutes)
    } else {
        format!("{}h {}m", hours, minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_hours_and_minutes() {
        assert_eq!(format_duration_minutes(200), "3h 20m");
        assert_eq!(format_duration_minutes(60), "1h 0m");
    }

    #[test]
    fn sub_hour_shows_minutes_only() {
        assert_eq!(format_duration_minutes(45), "45m");
        assert_eq!(format_duration_minutes(0), "0m");
    }

    #[test]
    fn negative_input_clamps_to_zero() {
        assert_eq!(format_duration_minutes(-5), "0m");
    }
}
