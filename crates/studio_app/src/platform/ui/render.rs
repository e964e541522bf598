use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;
use studio_core::{Alert, AlertSeverity, AppViewModel, PanelContent, PanelView};

use super::constants::*;
use super::layout::{self, SectionLayout};
use super::{Focus, ScreenState};

struct Section<'a> {
    title: &'static str,
    input: &'a str,
    hint: String,
    panel: &'a PanelView,
    focused: bool,
}

pub fn draw(frame: &mut Frame, view: &AppViewModel, screen: &ScreenState) {
    let area = layout::screen(frame.area());

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            APP_TITLE,
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ))),
        area.header,
    );

    let sections = [
        (
            area.enhance,
            Section {
                title: TITLE_ENHANCE,
                input: &view.prompt_input,
                hint: trigger_hint(&view.enhance, HINT_ENHANCE),
                panel: &view.enhance,
                focused: screen.focus == Focus::EnhanceInput,
            },
        ),
        (
            area.images,
            Section {
                title: TITLE_IMAGES,
                input: &view.image_prompt_input,
                hint: trigger_hint(&view.images, HINT_GENERATE),
                panel: &view.images,
                focused: screen.focus == Focus::ImageInput,
            },
        ),
        (
            area.removal,
            Section {
                title: TITLE_REMOVAL,
                input: &screen.file_input,
                hint: format!("{} | {}", view.file_label, trigger_hint(&view.removal, HINT_REMOVE)),
                panel: &view.removal,
                focused: screen.focus == Focus::FileInput,
            },
        ),
    ];

    let results_focused = screen.focus == Focus::Results;
    let selected = screen.selected_url.as_deref();
    for (rect, section) in &sections {
        draw_section(frame, *rect, section, selected, results_focused);
    }

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(HELP_LINE, Style::default().fg(MUTED)))),
        area.footer,
    );

    match &view.alert {
        Some(alert) => draw_alert(frame, alert),
        None => {
            if let Some((rect, section)) = sections.iter().find(|(_, section)| section.focused) {
                frame.set_cursor_position((
                    cursor_x(rect.input, section.input),
                    rect.input.y.saturating_add(1),
                ));
            }
        }
    }
}

/// Column after the last character, kept inside the input's borders.
fn cursor_x(input: Rect, text: &str) -> u16 {
    let width = u16::try_from(text.chars().count()).unwrap_or(u16::MAX);
    let max_x = input.x.saturating_add(input.width.saturating_sub(2));
    input.x.saturating_add(1).saturating_add(width).min(max_x)
}

fn trigger_hint(panel: &PanelView, idle: &str) -> String {
    if panel.trigger_enabled {
        idle.to_string()
    } else {
        HINT_BUSY.to_string()
    }
}

fn draw_section(
    frame: &mut Frame,
    rect: SectionLayout,
    section: &Section<'_>,
    selected_url: Option<&str>,
    results_focused: bool,
) {
    let border = if section.focused { ACCENT } else { MUTED };
    let input = Paragraph::new(section.input.to_string()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(section.title)
            .title(Line::from(section.hint.clone()).right_aligned()),
    );
    frame.render_widget(input, rect.input);

    if !section.panel.visible {
        return;
    }
    let mut block = Block::default().borders(Borders::LEFT | Borders::BOTTOM | Borders::RIGHT);
    if let Some(timer) = &section.panel.timer_text {
        block = block.title(Line::from(Span::styled(timer.clone(), Style::default().fg(LOADING))));
    }
    let results = Paragraph::new(panel_lines(section.panel, selected_url, results_focused))
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(results, rect.results);
}

/// Text lines for one results container.
pub fn panel_lines(
    panel: &PanelView,
    selected_url: Option<&str>,
    results_focused: bool,
) -> Vec<Line<'static>> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    match &panel.content {
        PanelContent::Empty => Vec::new(),
        PanelContent::Loading(text) => vec![Line::from(Span::styled(
            text.clone(),
            Style::default().fg(LOADING).add_modifier(Modifier::ITALIC),
        ))],
        PanelContent::Comparison {
            original,
            enhanced,
            copy_label,
        } => vec![
            Line::from(Span::styled("Original:", bold)),
            Line::from(original.clone()),
            Line::from(Span::styled("Enhanced:", bold)),
            Line::from(enhanced.clone()),
            Line::from(vec![
                Span::styled(format!("{HINT_COPY} "), Style::default().fg(ACCENT)),
                Span::raw(copy_label.clone()),
            ]),
        ],
        PanelContent::Images(images) => images
            .iter()
            .map(|image| {
                let selected = results_focused && selected_url == Some(image.url.as_str());
                let marker = if selected { "> " } else { "  " };
                let label_style = if image.download.enabled {
                    Style::default().fg(ACCENT)
                } else {
                    Style::default().fg(MUTED)
                };
                let line = Line::from(vec![
                    Span::raw(format!("{marker}{}: {} ", image.alt, image.url)),
                    Span::styled(format!("[{}]", image.download.label), label_style),
                ]);
                if selected {
                    line.style(Style::default().add_modifier(Modifier::REVERSED))
                } else {
                    line
                }
            })
            .collect(),
        PanelContent::Info(text) => vec![Line::from(text.clone())],
        PanelContent::Error(text) => vec![Line::from(Span::styled(
            text.clone(),
            Style::default().fg(ERROR),
        ))],
    }
}

fn draw_alert(frame: &mut Frame, alert: &Alert) {
    let area: Rect = layout::alert_area(frame.area());
    let color = match alert.severity {
        AlertSeverity::Success => SUCCESS,
        AlertSeverity::Info => ACCENT,
        AlertSeverity::Warning => LOADING,
        AlertSeverity::Error => ERROR,
    };
    let body = vec![
        Line::from(alert.text.clone()),
        Line::from(""),
        Line::from(Span::styled("[Esc] OK", Style::default().fg(MUTED))),
    ];
    let dialog = Paragraph::new(body)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(Span::styled(
                    format!(" {} ", alert.title),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                )),
        );
    frame.render_widget(Clear, area);
    frame.render_widget(dialog, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use studio_core::{DownloadView, ImageView};

    fn image(url: &str, enabled: bool) -> ImageView {
        ImageView {
            url: url.to_string(),
            alt: "Generated image 1".to_string(),
            download: DownloadView {
                label: if enabled { "Download Image" } else { "Downloading..." }.to_string(),
                enabled,
            },
        }
    }

    fn text_of(line: &Line<'_>) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn selected_image_is_marked_only_when_results_focused() {
        let panel = PanelView {
            visible: true,
            trigger_enabled: true,
            timer_text: None,
            content: PanelContent::Images(vec![image("u1", true), image("u2", false)]),
        };

        let focused = panel_lines(&panel, Some("u2"), true);
        assert_eq!(text_of(&focused[0]), "  Generated image 1: u1 [Download Image]");
        assert_eq!(text_of(&focused[1]), "> Generated image 1: u2 [Downloading...]");

        let unfocused = panel_lines(&panel, Some("u2"), false);
        assert!(text_of(&unfocused[1]).starts_with("  "));
    }

    #[test]
    fn comparison_shows_both_prompts_and_copy_label() {
        let panel = PanelView {
            visible: true,
            trigger_enabled: true,
            timer_text: None,
            content: PanelContent::Comparison {
                original: "a cat".to_string(),
                enhanced: "a fluffy cat".to_string(),
                copy_label: "Copied!".to_string(),
            },
        };
        let lines: Vec<String> = panel_lines(&panel, None, false).iter().map(text_of).collect();
        assert_eq!(
            lines,
            vec!["Original:", "a cat", "Enhanced:", "a fluffy cat", "[y] Copied!"]
        );
    }

    #[test]
    fn cursor_follows_text_and_stops_at_border() {
        let input = Rect::new(2, 0, 20, 3);
        assert_eq!(cursor_x(input, ""), 3);
        assert_eq!(cursor_x(input, "abc"), 6);
        assert_eq!(cursor_x(input, &"x".repeat(70_000)), 20);

        let far_right = Rect::new(u16::MAX - 10, 0, 10, 3);
        assert_eq!(cursor_x(far_right, &"x".repeat(70_000)), u16::MAX - 2);
    }

    #[test]
    fn empty_panel_has_no_lines() {
        assert!(panel_lines(&PanelView::default(), None, true).is_empty());
    }
}
