use ratatui::layout::{Constraint, Layout, Rect};

const INPUT_HEIGHT: u16 = 3;
const ALERT_HEIGHT: u16 = 7;
const ALERT_MIN_WIDTH: u16 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionLayout {
    pub input: Rect,
    pub results: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub header: Rect,
    pub enhance: SectionLayout,
    pub images: SectionLayout,
    pub removal: SectionLayout,
    pub footer: Rect,
}

/// Header, three stacked feature sections and a one-line footer.
pub fn screen(area: Rect) -> ScreenLayout {
    let rows = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .split(area);

    ScreenLayout {
        header: rows[0],
        enhance: section(rows[1]),
        images: section(rows[2]),
        removal: section(rows[3]),
        footer: rows[4],
    }
}

fn section(area: Rect) -> SectionLayout {
    let parts = Layout::vertical([Constraint::Length(INPUT_HEIGHT), Constraint::Min(1)]).split(area);
    SectionLayout {
        input: parts[0],
        results: parts[1],
    }
}

/// Centered box for the modal alert, clamped to `area`.
pub fn alert_area(area: Rect) -> Rect {
    let width = (area.width * 3 / 5).max(ALERT_MIN_WIDTH).min(area.width);
    let height = ALERT_HEIGHT.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
