//! 未读徽章类型

use serde::Serialize;

/// Marker shown when something is unread but no count is known
pub const ATTENTION_MARKER: &str = "•";

/// Per-entry unread state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Badge {
    /// Nothing unread
    #[default]
    None,
    /// Unread with a reported count; a reported `0` still counts as unread
    Count(u32),
    /// Unread without a count
    Attention,
}

impl Badge {
    /// Interpret a raw value reported by hosted content.
    ///
    /// Leading-integer parsing mirrors what the bridge script sends: `"3"`
    /// and `"3+"` both count as 3, any other non-empty text is an attention
    /// flag, and only an empty or absent value clears the entry. Negative
    /// counts clamp to zero.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::None;
        };

        match leading_integer(raw) {
            Some(n) => Self::Count(u32::try_from(n.max(0)).unwrap_or(u32::MAX)),
            None => Self::Attention,
        }
    }

    #[must_use]
    pub fn is_unread(self) -> bool {
        !matches!(self, Self::None)
    }

    #[must_use]
    pub fn count(self) -> Option<u32> {
        match self {
            Self::Count(n) => Some(n),
            _ => None,
        }
    }

    /// Text rendered inside the entry's badge element.
    #[must_use]
    pub fn label(self) -> String {
        match self {
            Self::Count(n) => n.to_string(),
            Self::None | Self::Attention => String::new(),
        }
    }
}

fn leading_integer(raw: &str) -> Option<i64> {
    let (sign, digits) = match raw.as_bytes().first() {
        Some(b'-') => (-1, &raw[1..]),
        Some(b'+') => (1, &raw[1..]),
        _ => (1, raw),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    digits[..end]
        .parse::<i64>()
        .ok()
        .map(|n| n * sign)
        .or(Some(i64::MAX))
}

/// Aggregated badge for the tray, dock and window title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum GlobalBadge {
    #[default]
    Empty,
    Attention,
    Count(u64),
}

impl GlobalBadge {
    /// Sum numeric badges; fall back to the attention marker when the sum is
    /// zero but some entry is unread (flagged or a reported zero).
    pub fn aggregate<'a>(badges: impl IntoIterator<Item = &'a Badge>) -> Self {
        let mut total: u64 = 0;
        let mut flagged = false;
        for badge in badges {
            match badge {
                Badge::Count(n) => {
                    total += u64::from(*n);
                    flagged = true;
                }
                Badge::Attention => flagged = true,
                Badge::None => {}
            }
        }

        if total > 0 {
            Self::Count(total)
        } else if flagged {
            Self::Attention
        } else {
            Self::Empty
        }
    }

    /// Tray icon switches to its alert variant only for a positive count.
    #[must_use]
    pub fn tray_alert(self) -> bool {
        matches!(self, Self::Count(n) if n > 0)
    }
}

impl std::fmt::Display for GlobalBadge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Attention => f.write_str(ATTENTION_MARKER),
            Self::Count(n) => write!(f, "{n}"),
        }
    }
}
