use ratatui::layout::{Alignment, Constraint, Direction, Layout as RatLayout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::models::TaskStatus;
use crate::tui::app::{TaskField, TaskForm};
use crate::tui::theme::Palette;
use crate::tui::widgets::editor::Editor;
use crate::tui::widgets::popup_area;

fn field_block<'a>(title: &'a str, active: bool, palette: &Palette) -> Block<'a> {
    let border = if active { palette.accent() } else { palette.muted() };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(title)
        .style(palette.base())
}

/// Draw an editor inside `block`; places the terminal cursor when active
fn render_editor(
    f: &mut Frame,
    area: Rect,
    editor: &mut Editor,
    block: Block,
    placeholder: &str,
    active: bool,
    palette: &Palette,
) {
    let inner = block.inner(area);
    editor.update_scroll(inner.height as usize, inner.width as usize);

    let paragraph = if editor.is_blank() && !active {
        Paragraph::new(Span::styled(placeholder.to_string(), palette.muted()))
    } else {
        let (_, visible) = editor.get_visible_lines(inner.height as usize, inner.width as usize);
        Paragraph::new(visible.into_iter().map(Line::from).collect::<Vec<_>>())
    };
    f.render_widget(paragraph.block(block), area);

    if active {
        if let Some(position) = editor.get_cursor_screen_pos(inner) {
            f.set_cursor_position(position);
        }
    }
}

pub fn render_task_form(f: &mut Frame, area: Rect, form: &mut TaskForm, palette: &Palette) {
    let popup_area = popup_area(area, 70, 85);
    f.render_widget(Clear, popup_area);

    let title = if form.editing_task_id.is_some() { " Edit Task " } else { " New Task " };
    let outer = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_alignment(Alignment::Center)
        .style(palette.base());
    let inner = outer.inner(popup_area);
    f.render_widget(outer, popup_area);

    let link_rows = form.links.len().max(1) as u16 + 2;
    let input_rows = if form.link_input.is_some() { 6 } else { 0 };
    let chunks = RatLayout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                    // Title
            Constraint::Length(3),                    // Status
            Constraint::Min(4),                       // Notes
            Constraint::Length(link_rows.min(8)),     // Links
            Constraint::Length(input_rows),           // Add-link inputs
        ])
        .split(inner);

    let field = form.current_field;
    let in_link_input = form.link_input.is_some();

    let title_active = field == TaskField::Title && !in_link_input;
    render_editor(
        f,
        chunks[0],
        &mut form.title,
        field_block("Task Title", title_active, palette),
        "What needs to be done?",
        title_active,
        palette,
    );

    render_status_selector(f, chunks[1], form.status, field == TaskField::Status, palette);

    let notes_active = field == TaskField::Notes && !in_link_input;
    render_editor(
        f,
        chunks[2],
        &mut form.notes,
        field_block("Notes", notes_active, palette),
        "Add details, observations, or thoughts...",
        notes_active,
        palette,
    );

    render_links(f, chunks[3], form, palette);

    if let Some(input) = form.link_input.as_mut() {
        let rows = RatLayout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Length(3)])
            .split(chunks[4]);
        let on_url = input.on_url;
        render_editor(
            f,
            rows[0],
            &mut input.label,
            field_block("Label (optional)", !on_url, palette),
            "Label (optional)",
            !on_url,
            palette,
        );
        render_editor(
            f,
            rows[1],
            &mut input.url,
            field_block("URL", on_url, palette),
            "https://...",
            on_url,
            palette,
        );
    }
}

fn render_status_selector(f: &mut Frame, area: Rect, current: TaskStatus, active: bool, palette: &Palette) {
    let mut spans = Vec::new();
    for status in TaskStatus::ALL {
        let style = if status == current {
            if active { palette.highlight() } else { palette.status(status) }
        } else {
            palette.muted()
        };
        spans.push(Span::styled(format!("  {}  ", status.label()), style));
        spans.push(Span::raw(" "));
    }
    let paragraph = Paragraph::new(Line::from(spans))
        .block(field_block("Status", active, palette))
        .alignment(Alignment::Center);
    f.render_widget(paragraph, area);
}

fn render_links(f: &mut Frame, area: Rect, form: &TaskForm, palette: &Palette) {
    let active = form.current_field == TaskField::Links && form.link_input.is_none();
    let block = field_block("References & Links", active, palette);

    let lines: Vec<Line> = if form.links.is_empty() {
        vec![Line::from(Span::styled("No links attached.", palette.muted()))]
    } else {
        form.links
            .iter()
            .enumerate()
            .map(|(i, link)| {
                let style = if active && i == form.link_selected { palette.highlight() } else { palette.base() };
                let text = if link.label == link.url {
                    format!("🔗 {}", link.url)
                } else {
                    format!("🔗 {}  <{}>", link.label, link.url)
                };
                Line::from(Span::styled(text, style))
            })
            .collect()
    };

    f.render_widget(Paragraph::new(lines).block(block), area);
}
