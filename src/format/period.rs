//! Fixed-width period formatting

/// Display modulus for one clock field (60 for minutes/seconds, 24 for hours)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Period {
    top: u32,
    width: usize,
}

impl Period {
    pub const SECONDS: Period = Period::new(60);
    pub const MINUTES: Period = Period::new(60);
    pub const HOURS: Period = Period::new(24);

    /// Create a period with modulus `top`
    pub const fn new(top: u32) -> Self {
        Self {
            top,
            width: digit_count(top.saturating_sub(1)),
        }
    }

    /// The modulus
    pub fn top(&self) -> u32 {
        self.top
    }

    /// Number of digits in `top - 1`
    pub fn width(&self) -> usize {
        self.width
    }

    /// Zero-padded value; values outside the period collapse to zero
    pub fn format(&self, value: u32) -> String {
        let value = if value < self.top { value } else { 0 };
        self.pad(&value.to_string())
    }

    /// Like [`Period::format`], but an out-of-range value keeps only its last digit.
    ///
    /// Used while a field is being typed into: an extra keystroke rolls the
    /// display over to the newest digit instead of being rejected, so
    /// `75` in a 60-period reads `05`.
    pub fn format_or_tail(&self, value: u32) -> String {
        if value < self.top {
            return self.pad(&value.to_string());
        }
        let digits = value.to_string();
        let tail = &digits[digits.len() - 1..];
        self.pad(tail)
    }

    /// Value committed by an input field holding `text`
    ///
    /// Non-numeric text reads as zero.
    pub fn parse_entry(&self, text: &str) -> u32 {
        let typed = text.trim().parse::<u32>().unwrap_or(0);
        // format_or_tail only ever yields ASCII digits
        self.format_or_tail(typed).parse().unwrap_or(0)
    }

    // Left-pad with zeros, then keep the last `width` characters
    fn pad(&self, digits: &str) -> String {
        let padded = format!("{}{}", "0".repeat(self.width), digits);
        padded[padded.len() - self.width..].to_string()
    }
}

const fn digit_count(mut n: u32) -> usize {
    let mut count = 1;
    while n >= 10 {
        n /= 10;
        count += 1;
    }
    count
}
