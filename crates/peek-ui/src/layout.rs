use peek_capture::Bounds;
use peek_config::overlay::OverlayConfig;

/// Window geometry for one piece of text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayLayout {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    /// Wrapped line count used for the height
    pub lines: usize,
}

impl OverlayLayout {
    /// Size from estimated glyph metrics, bounded by the configured min/max
    pub fn compute(text: &str, config: &OverlayConfig) -> Self {
        let padding = config.padding * 2;
        let chars_per_line = chars_per_line(config);
        let wrapped = wrap_lines(text, chars_per_line);

        let widest = text
            .lines()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0) as u32;
        let lines = wrapped.len().max(1);

        let width = bound(
            widest * config.char_width + padding,
            config.min_width,
            config.max_width,
        );
        let height = bound(
            lines as u32 * config.line_height + padding,
            config.min_height,
            config.max_height,
        );

        Self {
            x: config.position.x,
            y: config.position.y,
            width,
            height,
            lines,
        }
    }
}

/// Characters that fit on one line of the widest allowed window
pub fn chars_per_line(config: &OverlayConfig) -> usize {
    let usable = config.max_width.saturating_sub(config.padding * 2);
    (usable / config.char_width.max(1)).max(1) as usize
}

/// Word wrap at `limit` characters
///
/// Breaks at the last space inside the limit, or hard-breaks a word that
/// does not fit. Whitespace at the start of a continuation is dropped.
pub fn wrap_lines(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut out = Vec::new();

    for line in text.lines() {
        let mut rest: Vec<char> = line.chars().collect();
        let mut broke = false;

        while rest.len() > limit {
            let split = rest[..limit]
                .iter()
                .rposition(|c| *c == ' ')
                .filter(|&idx| idx > 0)
                .unwrap_or(limit);

            out.push(rest[..split].iter().collect());

            let next = rest[split..]
                .iter()
                .position(|c| !c.is_whitespace())
                .map_or(rest.len(), |skip| split + skip);
            rest.drain(..next);
            broke = true;
        }

        if !rest.is_empty() || !broke {
            out.push(rest.into_iter().collect());
        }
    }

    out
}

/// Move by one Alt+Arrow step, keeping the whole window on `screen`
///
/// Without a known screen only the top-left edges are enforced.
pub fn nudge(
    position: (i32, i32),
    direction: (i32, i32),
    step: i32,
    size: (u32, u32),
    screen: Option<Bounds>,
) -> (i32, i32) {
    let x = position.0 + direction.0 * step;
    let y = position.1 + direction.1 * step;

    match screen {
        Some(s) => (
            x.min(s.right() - size.0 as i32).max(s.x),
            y.min(s.bottom() - size.1 as i32).max(s.y),
        ),
        None => (x.max(0), y.max(0)),
    }
}

fn bound(value: u32, min: u32, max: u32) -> u32 {
    value.min(max).max(min)
}
