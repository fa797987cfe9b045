use crate::{
    app::{App, DialogChoice, LogLevel, ToastLevel, UiMode, EDITOR_ROWS},
    filters::{self, Filters, FILTER_IDS},
    game::MessageKind,
    settings::{SettingsDraft, SETTINGS_ROWS},
};
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    text::{Line, Span},
    widgets::{
        Block, BorderType, Borders, Clear, List, ListItem, ListState, Padding, Paragraph, Wrap,
    },
};
use std::{io, time::Duration};

const SIDE_PANEL_WIDTH: u16 = 40;

#[derive(Clone)]
struct Theme {
    accent: Color,
    border: Color,
    text: Color,
    muted: Color,
    success: Color,
    warning: Color,
    error: Color,
    highlight: Color,
}

impl Theme {
    fn new() -> Self {
        Self {
            accent: Color::Rgb(120, 190, 255),
            border: Color::Rgb(65, 75, 90),
            text: Color::Rgb(220, 230, 240),
            muted: Color::Rgb(135, 145, 155),
            success: Color::Rgb(120, 220, 140),
            warning: Color::Rgb(230, 200, 120),
            error: Color::Rgb(235, 100, 95),
            highlight: Color::Rgb(70, 110, 160),
        }
    }

    fn block(&self, title: &'static str) -> Block<'static> {
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(self.border))
            .title(Span::styled(
                title,
                Style::default().fg(self.accent).add_modifier(Modifier::BOLD),
            ))
    }

    fn panel(&self, title: &'static str) -> Block<'static> {
        self.block(title).padding(Padding {
            left: 1,
            right: 1,
            top: 0,
            bottom: 0,
        })
    }

    fn message_style(&self, kind: MessageKind) -> Style {
        match kind {
            MessageKind::Info => Style::default().fg(self.muted),
            MessageKind::Warning => Style::default().fg(self.warning),
            MessageKind::Error => Style::default().fg(self.error),
        }
    }
}

pub fn run(app: &mut App) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_loop(terminal: &mut Terminal<impl Backend>, app: &mut App) -> Result<()> {
    loop {
        app.tick();
        app.clamp_selection();
        terminal.draw(|frame| draw(frame, app))?;

        if app.should_quit {
            break;
        }

        if event::poll(Duration::from_millis(200))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == event::KeyEventKind::Press {
                    handle_key(app, key);
                }
            }
        }
    }

    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if app.dialog.is_some() {
        handle_dialog_key(app, key);
        return;
    }
    if app.settings_draft.is_some() {
        handle_settings_key(app, key);
        return;
    }
    if app.search.open {
        handle_search_key(app, key);
        return;
    }
    if let UiMode::Editor(_) = app.mode {
        handle_editor_key(app, key);
        return;
    }
    if app.show_filter_panel {
        handle_filter_panel_key(app, key);
        return;
    }
    handle_browse_key(app, key);
}

fn handle_dialog_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Left | KeyCode::Right | KeyCode::Tab => app.dialog_toggle_choice(),
        KeyCode::Enter => app.dialog_confirm(),
        KeyCode::Esc => app.dialog_cancel(),
        KeyCode::Char('y') => {
            if let Some(dialog) = &mut app.dialog {
                dialog.choice = DialogChoice::Yes;
            }
            app.dialog_confirm();
        }
        KeyCode::Char('n') => app.dialog_cancel(),
        _ => {}
    }
}

fn handle_settings_key(app: &mut App, key: KeyEvent) {
    let Some(draft) = app.settings_draft.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => draft.select_previous(),
        KeyCode::Down | KeyCode::Char('j') => draft.select_next(),
        KeyCode::Enter | KeyCode::Char(' ') => draft.cycle_selected(),
        KeyCode::Char('a') => {
            let result = app.close_settings(true);
            app.finish("Apply settings", result);
        }
        KeyCode::Esc => {
            let result = app.close_settings(false);
            app.finish("Close settings", result);
        }
        _ => {}
    }
}

fn handle_search_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.end_search(),
        KeyCode::Enter => {
            app.search.select_next();
            focus_search_result(app);
        }
        KeyCode::Tab => {
            // Pin the needle as the content filter, hiding non-matches.
            let needle = app.search.needle.clone();
            app.end_search();
            app.set_content_filter(&needle);
        }
        KeyCode::Backspace => {
            let mut needle = app.search.needle.clone();
            needle.pop();
            app.begin_search(&needle);
            focus_search_result(app);
        }
        KeyCode::Char(ch) => {
            let mut needle = app.search.needle.clone();
            needle.push(ch);
            app.begin_search(&needle);
            focus_search_result(app);
        }
        _ => {}
    }
}

fn focus_search_result(app: &mut App) {
    if let Some(plugin_index) = app.search.current_result() {
        if let Some(position) = app.visible.iter().position(|&index| index == plugin_index) {
            app.selected = position;
        }
    }
}

fn handle_editor_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            if let UiMode::Editor(session) = &mut app.mode {
                session.select_previous();
            }
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if let UiMode::Editor(session) = &mut app.mode {
                session.select_next();
            }
        }
        KeyCode::Left | KeyCode::Char('h') => {
            if let UiMode::Editor(session) = &mut app.mode {
                session.adjust_selected(-1);
            }
        }
        KeyCode::Right | KeyCode::Char('l') => {
            if let UiMode::Editor(session) = &mut app.mode {
                session.adjust_selected(1);
            }
        }
        KeyCode::Enter => {
            let result = app.close_editor(true);
            app.finish("Save metadata", result);
        }
        KeyCode::Esc => {
            let result = app.close_editor(false);
            app.finish("Close editor", result);
        }
        _ => {}
    }
}

fn handle_filter_panel_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            app.filter_panel_selected = app
                .filter_panel_selected
                .checked_sub(1)
                .unwrap_or(FILTER_IDS.len() - 1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.filter_panel_selected = (app.filter_panel_selected + 1) % FILTER_IDS.len();
        }
        KeyCode::Enter | KeyCode::Char(' ') => {
            let id = FILTER_IDS[app.filter_panel_selected];
            let result = app.toggle_filter(id);
            app.finish("Toggle filter", result);
        }
        KeyCode::Esc | KeyCode::Char('f') => app.show_filter_panel = false,
        _ => {}
    }
}

fn handle_browse_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('f') {
        app.search.open = true;
        return;
    }
    match key.code {
        KeyCode::Char('q') => app.try_quit(),
        KeyCode::Esc => {
            if !app.filters.content_search_string.is_empty() {
                app.set_content_filter("");
            }
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.selected = app.selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if !app.visible.is_empty() && app.selected + 1 < app.visible.len() {
                app.selected += 1;
            }
        }
        KeyCode::Home => app.selected = 0,
        KeyCode::End => {
            if !app.visible.is_empty() {
                app.selected = app.visible.len() - 1;
            }
        }
        KeyCode::Char('s') => {
            let result = app.sort_plugins();
            app.finish("Sort", result);
        }
        KeyCode::Char('u') => {
            let result = app.update_masterlist();
            app.finish("Update masterlist", result);
        }
        KeyCode::Char('a') => {
            let result = app.apply_sort();
            app.finish("Apply sort", result);
        }
        KeyCode::Char('c') => {
            let result = app.cancel_sort();
            app.finish("Cancel sort", result);
        }
        KeyCode::Char('C') => {
            let result = app.toggle_conflicts_filter();
            app.finish("Conflicts filter", result);
        }
        KeyCode::Char('g') => {
            let result = app.change_to_next_game();
            app.finish("Change game", result);
        }
        KeyCode::Char('r') => {
            let result = app.refresh_content();
            app.finish("Refresh", result);
        }
        KeyCode::Char('e') | KeyCode::Enter => {
            let result = app.open_editor();
            app.finish("Open editor", result);
        }
        KeyCode::Char('x') => app.prompt_clear_plugin_metadata(),
        KeyCode::Char('X') => app.prompt_clear_all_metadata(),
        KeyCode::Char('d') => app.prompt_redate_plugins(),
        KeyCode::Char('o') => app.open_settings(),
        KeyCode::Char('R') => {
            let result = app.open_readme();
            app.finish("Open readme", result);
        }
        KeyCode::Char('L') => {
            let result = app.open_log_location();
            app.finish("Open log location", result);
        }
        KeyCode::Char('f') => app.show_filter_panel = true,
        KeyCode::Char('/') => app.search.open = true,
        KeyCode::Char('n') => {
            app.search.select_next();
            focus_search_result(app);
        }
        KeyCode::Char('N') => {
            app.search.select_previous();
            focus_search_result(app);
        }
        KeyCode::Char('y') => {
            let result = app.copy_content();
            app.finish("Copy content", result);
        }
        KeyCode::Char('Y') => {
            let result = app.copy_load_order();
            app.finish("Copy load order", result);
        }
        KeyCode::Char('m') => {
            let result = app.copy_metadata();
            app.finish("Copy metadata", result);
        }
        _ => {}
    }
}

fn draw(frame: &mut Frame<'_>, app: &App) {
    let theme = Theme::new();
    let area = frame.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(8),
            Constraint::Length(6),
            Constraint::Length(1),
        ])
        .split(area);

    draw_header(frame, app, &theme, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDE_PANEL_WIDTH), Constraint::Min(30)])
        .split(chunks[1]);
    draw_sidebar(frame, app, &theme, body[0]);
    draw_main(frame, app, &theme, body[1]);

    draw_log(frame, app, &theme, chunks[2]);
    draw_footer(frame, app, &theme, chunks[3]);

    if app.show_filter_panel {
        draw_filter_panel(frame, app, &theme);
    }
    if let Some(draft) = &app.settings_draft {
        draw_settings(frame, draft, &theme, area);
    }
    if app.dialog.is_some() {
        draw_dialog(frame, app, &theme);
    }
    draw_toast(frame, app, &theme, chunks[1]);
}

fn draw_header(frame: &mut Frame<'_>, app: &App, theme: &Theme, area: Rect) {
    let mode_badge = match &app.mode {
        UiMode::Normal => Span::styled("BROWSE", Style::default().fg(theme.muted)),
        UiMode::Sorting => Span::styled(
            "SORT PENDING",
            Style::default().fg(theme.warning).add_modifier(Modifier::BOLD),
        ),
        UiMode::Editor(session) => Span::styled(
            format!("EDITING {}", session.plugin),
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        ),
    };
    let revision = if app.game.masterlist.revision.is_empty() {
        "unknown".to_string()
    } else {
        app.game.masterlist.revision.clone()
    };
    let line = Line::from(vec![
        Span::styled(
            " loadwright ",
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("{} ", app.settings.game_name(&app.game.folder)),
            Style::default().fg(theme.text),
        ),
        Span::styled(
            format!("(masterlist {revision}) "),
            Style::default().fg(theme.muted),
        ),
        mode_badge,
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_sidebar(frame: &mut Frame<'_>, app: &App, theme: &Theme, area: Rect) {
    let draggable = app.sidebar_draggable();
    let items: Vec<ListItem> = app
        .visible
        .iter()
        .map(|&index| {
            let plugin = &app.game.plugins[index];
            let mut spans = vec![Span::styled(
                format!("{index:>4} "),
                Style::default().fg(theme.muted),
            )];
            if draggable {
                spans.push(Span::styled("≡ ", Style::default().fg(theme.muted)));
            }
            let mut name_style = Style::default().fg(theme.text);
            if plugin.is_conflict_filter_target {
                name_style = Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD);
            } else if plugin.is_search_result {
                name_style = Style::default().fg(theme.highlight);
            } else if !plugin.is_active {
                name_style = Style::default().fg(theme.muted);
            }
            spans.push(Span::styled(plugin.name.clone(), name_style));
            if plugin.is_active {
                spans.push(Span::styled(" ●", Style::default().fg(theme.success)));
            }
            if plugin.is_dirty {
                spans.push(Span::styled(" ✗", Style::default().fg(theme.warning)));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(theme.panel("Load Order"))
        .highlight_style(
            Style::default()
                .bg(theme.highlight)
                .add_modifier(Modifier::BOLD),
        );
    let mut state = ListState::default();
    if !app.visible.is_empty() {
        state.select(Some(app.selected));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_main(frame: &mut Frame<'_>, app: &App, theme: &Theme, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(7)])
        .split(area);

    if let UiMode::Editor(session) = &app.mode {
        let mut lines = vec![Line::from(Span::styled(
            format!("Metadata editor: {}", session.plugin),
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        ))];
        for (index, row) in EDITOR_ROWS.iter().enumerate() {
            let marker = if index == session.selected { "▸ " } else { "  " };
            lines.push(Line::from(vec![
                Span::styled(marker, Style::default().fg(theme.accent)),
                Span::styled(
                    format!("{:<18}", crate::app::EditorSession::row_label(*row)),
                    Style::default().fg(theme.text),
                ),
                Span::styled(session.row_value(*row), Style::default().fg(theme.accent)),
            ]));
        }
        lines.push(Line::from(Span::styled(
            "←/→ adjust · Enter apply · Esc cancel",
            Style::default().fg(theme.muted),
        )));
        frame.render_widget(
            Paragraph::new(lines).block(theme.panel("Editor")),
            chunks[0],
        );
    } else {
        draw_card(frame, app, theme, chunks[0]);
    }

    let messages: Vec<Line> = app
        .game
        .global_messages
        .iter()
        .map(|message| {
            Line::from(vec![
                Span::styled(
                    format!("{:<8}", message.kind.label()),
                    theme.message_style(message.kind),
                ),
                Span::styled(message.text.clone(), Style::default().fg(theme.text)),
            ])
        })
        .collect();
    let messages = if messages.is_empty() {
        vec![Line::from(Span::styled(
            "No general messages.",
            Style::default().fg(theme.muted),
        ))]
    } else {
        messages
    };
    frame.render_widget(
        Paragraph::new(messages)
            .block(theme.panel("General Messages"))
            .wrap(Wrap { trim: true }),
        chunks[1],
    );
}

fn draw_card(frame: &mut Frame<'_>, app: &App, theme: &Theme, area: Rect) {
    let Some(index) = app.selected_plugin_index() else {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "No plugins match the active filters.",
                Style::default().fg(theme.muted),
            ))
            .block(theme.panel("Plugin")),
            area,
        );
        return;
    };
    let plugin = &app.game.plugins[index];
    let filters = &app.filters;

    let mut lines = vec![Line::from(Span::styled(
        plugin.name.clone(),
        Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
    ))];
    let mut facts: Vec<Span> = Vec::new();
    if !filters.hide_version_numbers && !plugin.version.is_empty() {
        facts.push(Span::styled(
            format!("v{} ", plugin.version),
            Style::default().fg(theme.text),
        ));
    }
    if !filters.hide_crcs && plugin.crc != 0 {
        facts.push(Span::styled(
            format!("CRC {} ", plugin.crc_label()),
            Style::default().fg(theme.muted),
        ));
    }
    if plugin.is_active {
        facts.push(Span::styled("active ", Style::default().fg(theme.success)));
    }
    if plugin.is_empty {
        facts.push(Span::styled("empty ", Style::default().fg(theme.muted)));
    }
    if plugin.loads_archive {
        facts.push(Span::styled(
            "loads archive ",
            Style::default().fg(theme.muted),
        ));
    }
    if plugin.is_dirty {
        facts.push(Span::styled("dirty ", Style::default().fg(theme.warning)));
    }
    if !facts.is_empty() {
        lines.push(Line::from(facts));
    }

    let priority_scope = if plugin.is_priority_global {
        "global"
    } else {
        "local"
    };
    lines.push(Line::from(Span::styled(
        format!("Priority {} ({priority_scope})", plugin.priority),
        Style::default().fg(theme.muted),
    )));

    if !filters.hide_bash_tags && !plugin.tags.is_empty() {
        let tags = plugin
            .tags
            .iter()
            .map(|tag| {
                if tag.is_added {
                    format!("+{}", tag.name)
                } else {
                    format!("-{}", tag.name)
                }
            })
            .collect::<Vec<_>>()
            .join(" ");
        lines.push(Line::from(Span::styled(
            format!("Tags: {tags}"),
            Style::default().fg(theme.text),
        )));
    }
    if plugin.userlist.is_some() {
        lines.push(Line::from(Span::styled(
            "Has user metadata",
            Style::default().fg(theme.accent),
        )));
    }

    for message in filters::visible_messages(&plugin.messages, filters) {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{:<8}", message.kind.label()),
                theme.message_style(message.kind),
            ),
            Span::styled(message.text.clone(), Style::default().fg(theme.text)),
        ]));
    }

    frame.render_widget(
        Paragraph::new(lines)
            .block(theme.panel("Plugin"))
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn draw_log(frame: &mut Frame<'_>, app: &App, theme: &Theme, area: Rect) {
    let height = area.height.saturating_sub(2) as usize;
    let lines: Vec<Line> = app
        .log
        .iter()
        .rev()
        .take(height.max(1))
        .rev()
        .map(|entry| {
            let style = match entry.level {
                LogLevel::Info => Style::default().fg(theme.muted),
                LogLevel::Error => Style::default().fg(theme.error),
            };
            Line::from(Span::styled(entry.message.clone(), style))
        })
        .collect();
    frame.render_widget(Paragraph::new(lines).block(theme.panel("Log")), area);
}

fn draw_footer(frame: &mut Frame<'_>, app: &App, theme: &Theme, area: Rect) {
    let toolbar = app.toolbar();
    let mut hints: Vec<&str> = Vec::new();
    if app.search.open {
        hints.push("type to search");
        hints.push("Enter next");
        hints.push("Tab keep as filter");
        hints.push("Esc close");
    } else {
        match &app.mode {
            UiMode::Normal => {
                if toolbar.show_sort {
                    hints.push("s sort");
                }
                if toolbar.show_update_masterlist {
                    hints.push("u update masterlist");
                }
                hints.push("e edit");
                hints.push("f filters");
                hints.push("/ search");
                if toolbar.game_menu_enabled {
                    hints.push("g game");
                }
                hints.push("o settings");
                hints.push("q quit");
            }
            UiMode::Sorting => {
                if toolbar.show_apply_sort {
                    hints.push("a apply");
                }
                if toolbar.show_cancel_sort {
                    hints.push("c cancel");
                }
                hints.push("q quit");
            }
            UiMode::Editor(_) => {
                hints.push("Enter apply");
                hints.push("Esc cancel");
            }
        }
    }
    let search_suffix = if app.search.open || !app.search.needle.is_empty() {
        format!(
            "  search: {} ({} matches)",
            app.search.needle,
            app.search.results.len()
        )
    } else {
        String::new()
    };
    let line = Line::from(vec![
        Span::styled(hints.join(" · "), Style::default().fg(theme.muted)),
        Span::styled(search_suffix, Style::default().fg(theme.accent)),
        Span::styled(
            format!("  {}", app.status),
            Style::default().fg(theme.text),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_filter_panel(frame: &mut Frame<'_>, app: &App, theme: &Theme) {
    let area = centered_rect(frame.size(), 46, (FILTER_IDS.len() + 4) as u16);
    frame.render_widget(Clear, area);
    let mut lines = Vec::new();
    for (index, id) in FILTER_IDS.iter().copied().enumerate() {
        let marker = if index == app.filter_panel_selected {
            "▸ "
        } else {
            "  "
        };
        let checked = if app.filters.get(id).unwrap_or(false) {
            "[x] "
        } else {
            "[ ] "
        };
        lines.push(Line::from(vec![
            Span::styled(marker, Style::default().fg(theme.accent)),
            Span::styled(checked, Style::default().fg(theme.text)),
            Span::styled(Filters::label(id), Style::default().fg(theme.text)),
        ]));
    }
    lines.push(Line::from(Span::styled(
        "Space toggle · Esc close",
        Style::default().fg(theme.muted),
    )));
    frame.render_widget(
        Paragraph::new(lines).block(theme.panel("Filters")),
        area,
    );
}

fn draw_settings(frame: &mut Frame<'_>, draft: &SettingsDraft, theme: &Theme, area: Rect) {
    let popup = centered_rect(area, 56, (SETTINGS_ROWS.len() + 4) as u16);
    frame.render_widget(Clear, popup);
    let mut lines = Vec::new();
    for (index, row) in SETTINGS_ROWS.iter().enumerate() {
        let marker = if index == draft.selected { "▸ " } else { "  " };
        lines.push(Line::from(vec![
            Span::styled(marker, Style::default().fg(theme.accent)),
            Span::styled(
                format!("{:<34}", SettingsDraft::row_label(*row)),
                Style::default().fg(theme.text),
            ),
            Span::styled(draft.row_value(*row), Style::default().fg(theme.accent)),
        ]));
    }
    lines.push(Line::from(Span::styled(
        "Space cycle · a apply · Esc cancel",
        Style::default().fg(theme.muted),
    )));
    frame.render_widget(
        Paragraph::new(lines).block(theme.panel("Settings")),
        popup,
    );
}

fn draw_dialog(frame: &mut Frame<'_>, app: &App, theme: &Theme) {
    let Some(dialog) = &app.dialog else {
        return;
    };
    let area = centered_rect(frame.size(), 60, 8);
    frame.render_widget(Clear, area);

    let yes_style = if dialog.choice == DialogChoice::Yes {
        Style::default()
            .bg(theme.highlight)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.muted)
    };
    let no_style = if dialog.choice == DialogChoice::No {
        Style::default()
            .bg(theme.highlight)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.muted)
    };

    let lines = vec![
        Line::from(Span::styled(
            dialog.title.clone(),
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            dialog.message.clone(),
            Style::default().fg(theme.text),
        )),
        Line::default(),
        Line::from(vec![
            Span::styled(format!("  {}  ", dialog.yes_label), yes_style),
            Span::raw("   "),
            Span::styled(format!("  {}  ", dialog.no_label), no_style),
        ]),
    ];
    frame.render_widget(
        Paragraph::new(lines)
            .block(theme.panel("Confirm"))
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn draw_toast(frame: &mut Frame<'_>, app: &App, theme: &Theme, body_area: Rect) {
    let Some(toast) = &app.toast else {
        return;
    };
    let width = (toast.message.len() as u16 + 4).min(body_area.width.saturating_sub(2));
    let toast_area = Rect {
        x: body_area.right().saturating_sub(width + 1),
        y: body_area.y + 1,
        width,
        height: 3,
    };
    let style = match toast.level {
        ToastLevel::Info => Style::default().fg(theme.success),
        ToastLevel::Error => Style::default().fg(theme.error),
    };
    frame.render_widget(Clear, toast_area);
    frame.render_widget(
        Paragraph::new(Span::styled(toast.message.clone(), style)).block(theme.block("")),
        toast_area,
    );
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}
