use garmin_status_types::DailyValues;

/// Renders the short status line shown in the chat profile, always in the
/// order battery, stress, heart rate.
pub fn format_status(values: &DailyValues) -> String {
    format!(
        "🔋{} 🧠{} 💗{}",
        format_value(values.body_battery.latest()),
        format_value(values.stress.latest()),
        format_value(values.heart_rate.latest()),
    )
}

fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) if v.fract() == 0.0 => format!("{}", v as i64),
        Some(v) => format!("{v}"),
        None => "-".to_owned(),
    }
}
