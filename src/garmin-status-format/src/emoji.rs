/// Fallback palette, ordered from empty to fully charged.
const DEFAULT_PALETTE: [&str; 10] = [
    "skull",
    "dizzy_face",
    "tired_face",
    "weary",
    "sleepy",
    "neutral_face",
    "slightly_smiling_face",
    "blush",
    "muscle",
    "zap",
];

/// Ordered emoji names partitioned into equal-width buckets over the body
/// battery range [0, 100].
#[derive(Debug, Clone, PartialEq)]
pub struct EmojiPalette {
    names: Vec<String>,
}

impl EmojiPalette {
    /// Builds the palette from the configured string, split on colons and
    /// whitespace. An absent or empty configuration yields the default.
    pub fn from_config(config: Option<&str>) -> Self {
        let names: Vec<String> = config
            .map(|raw| {
                raw.split(|c: char| c == ':' || c.is_whitespace())
                    .filter(|name| !name.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .filter(|names: &Vec<String>| !names.is_empty())
            .unwrap_or_else(|| DEFAULT_PALETTE.iter().map(|&name| name.to_owned()).collect());

        Self { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Selects the bucket containing the given body battery level and renders
    /// it as a `:name:` emoji code. 100 lands in the last bucket; a missing
    /// level falls back to the first name.
    pub fn pick(&self, body_battery: Option<f64>) -> String {
        let level = body_battery.unwrap_or(0.0).clamp(0.0, 100.0);
        let index = ((level / 100.0) * self.names.len() as f64) as usize;
        let index = index.min(self.names.len() - 1);
        format!(":{}:", self.names[index])
    }
}
