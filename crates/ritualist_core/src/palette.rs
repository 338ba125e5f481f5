//! Fixed colour palette for habits.
//!
//! New habits take palette entries in creation order; recolouring steps to the
//! next entry and wraps after the last one.

pub const PALETTE: [&str; 8] = [
    "#6366f1", "#10b981", "#f59e0b", "#ef4444", "#3b82f6", "#ec4899", "#8b5cf6", "#14b8a6",
];

pub fn initial_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// Colours outside the palette restart the cycle at the first entry.
pub fn next_color(current: &str) -> &'static str {
    match PALETTE
        .iter()
        .position(|color| color.eq_ignore_ascii_case(current))
    {
        Some(idx) => PALETTE[(idx + 1) % PALETTE.len()],
        None => PALETTE[0],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_colors_follow_creation_order() {
        assert_eq!(initial_color(0), PALETTE[0]);
        assert_eq!(initial_color(3), PALETTE[3]);
        assert_eq!(initial_color(PALETTE.len() + 1), PALETTE[1]);
    }

    #[test]
    fn next_color_wraps() {
        assert_eq!(next_color(PALETTE[0]), PALETTE[1]);
        assert_eq!(next_color(PALETTE[PALETTE.len() - 1]), PALETTE[0]);
        assert_eq!(next_color("#6366F1"), PALETTE[1]);
    }

    #[test]
    fn unknown_color_restarts_cycle() {
        assert_eq!(next_color("tomato"), PALETTE[0]);
    }
}
