/// Display sentinel for a formula that failed to evaluate.
pub const ERROR_SENTINEL: &str = "#ERROR";

/// Format a number for display.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "#NAN!".to_string()
    } else if n.is_infinite() {
        "#INF!".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e10 {
        format!("{:.0}", n)
    } else {
        format!("{:.2}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::format_number;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(300.0), "300");
        assert_eq!(format_number(-2.0), "-2");
        assert_eq!(format_number(1.005), "1.00");
        assert_eq!(format_number(2.5), "2.50");
        assert_eq!(format_number(1e12), "1000000000000.00");
        assert_eq!(format_number(f64::INFINITY), "#INF!");
    }
}
