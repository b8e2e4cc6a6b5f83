use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Row, Table, Tabs, Wrap};

use crate::core::api::types::{MAX_POST_LEN, Tone, Tweet, TweetStatus};

use super::{Banner, BannerKind, DeckApp, Screen, SettingsTab, Tab};

const ACCENT: Color = Color::Magenta;

pub(super) fn draw(f: &mut Frame, app: &DeckApp) {
    match app.screen {
        Screen::Auth => draw_auth(f, app),
        Screen::Deck => draw_deck(f, app),
    }
}

fn status_color(status: TweetStatus) -> Color {
    match status {
        TweetStatus::Pending => Color::Yellow,
        TweetStatus::Approved => Color::Green,
        TweetStatus::Rejected => Color::Red,
        TweetStatus::Posted => Color::Blue,
    }
}

fn banner_line(banner: &Banner) -> Line<'_> {
    let style = match banner.kind {
        BannerKind::Info => Style::default().fg(Color::Cyan),
        BannerKind::Success => Style::default().fg(Color::Green),
        BannerKind::Error => Style::default().fg(Color::Red),
    };
    Line::from(Span::styled(banner.text.as_str(), style))
}

fn field_line<'a>(label: &'a str, value: String, focused: bool, badge: Option<bool>) -> Line<'a> {
    let label_style = if focused {
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    let mut spans = vec![
        Span::styled(format!("{label:>28}: "), label_style),
        Span::raw(value),
    ];
    if focused {
        spans.push(Span::styled("▏", Style::default().fg(ACCENT)));
    }
    if let Some(set) = badge {
        spans.push(Span::styled(
            if set { "  [set]" } else { "  [not set]" },
            Style::default().fg(if set { Color::Green } else { Color::DarkGray }),
        ));
    }
    Line::from(spans)
}

// Auth screen

fn draw_auth(f: &mut Frame, app: &DeckApp) {
    let area = f.area();
    let box_width = 64.min(area.width.saturating_sub(2));
    let box_height = 14.min(area.height);
    let popup = Rect {
        x: area.x + (area.width.saturating_sub(box_width)) / 2,
        y: area.y + (area.height.saturating_sub(box_height)) / 2,
        width: box_width,
        height: box_height,
    };

    let title = if app.auth.register_mode { " Create account " } else { " Sign in " };
    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(
            "draftdeck",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        field_line("Email", app.auth.email.display(), app.auth.focus == 0, None),
        field_line("Password", app.auth.password.display(), app.auth.focus == 1, None),
    ];
    if app.auth.register_mode {
        lines.push(field_line(
            "Telegram chat ID (optional)",
            app.auth.telegram_chat_id.display(),
            app.auth.focus == 2,
            None,
        ));
    }
    lines.push(Line::from(""));
    if app.auth.busy {
        lines.push(Line::from(Span::styled(
            "Contacting backend...",
            Style::default().fg(Color::Cyan),
        )));
    } else if let Some(error) = &app.auth.error {
        lines.push(Line::from(Span::styled(
            error.as_str(),
            Style::default().fg(Color::Red),
        )));
    } else {
        lines.push(Line::from(""));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        if app.auth.register_mode {
            "enter submit · ctrl+r sign in instead · esc quit"
        } else {
            "enter submit · ctrl+r create account · esc quit"
        },
        Style::default().fg(Color::DarkGray),
    )));

    let widget = Paragraph::new(lines)
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(ACCENT))
                .title(title),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(widget, popup);
}

// Deck chrome

fn draw_deck(f: &mut Frame, app: &DeckApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(1)])
        .split(f.area());

    let titles: Vec<Line> = Tab::ALL.iter().map(|t| Line::from(t.title())).collect();
    let tabs = Tabs::new(titles)
        .select(Tab::ALL.iter().position(|t| *t == app.tab).unwrap_or(0))
        .style(Style::default().fg(Color::Gray))
        .highlight_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL).title(" draftdeck "));
    f.render_widget(tabs, chunks[0]);

    match app.tab {
        Tab::Dashboard => draw_dashboard(f, app, chunks[1]),
        Tab::Topics => draw_topics(f, app, chunks[1]),
        Tab::History => draw_history(f, app, chunks[1]),
        Tab::Settings => draw_settings(f, app, chunks[1]),
    }

    let hint = match app.tab {
        Tab::Dashboard => {
            if app.edit.is_some() {
                "enter save · esc cancel edit"
            } else {
                "↑↓ select · a approve · x reject · e edit · s scrape · g generate · R reload · tab next · ctrl+l logout · q quit"
            }
        }
        Tab::Topics => match app.topic_form.focus {
            Some(2) => "←→ pick tone · ↑↓ move · enter add topic · esc to list",
            Some(_) => "type to fill · ↑↓ move · enter add topic · esc to list",
            None => "↑↓ select · x remove · i form · r reload · tab next · q quit",
        },
        Tab::History => "↑↓ scroll · tab next · ctrl+l logout · q quit",
        Tab::Settings => "type to fill · ↑↓ move · enter save · tab next tab · ctrl+l logout",
    };
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray)))),
        chunks[2],
    );
}

// Dashboard tab

fn draw_dashboard(f: &mut Frame, app: &DeckApp, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(4),
            Constraint::Length(8),
        ])
        .split(area);

    draw_stat_tiles(f, app, chunks[0]);

    // Status banner: scrape/generate progress and outcomes.
    let banner = if let Some(banner) = &app.banner {
        let mut line = banner_line(banner);
        if app.poller.is_active() {
            line.spans.insert(0, Span::styled("⟳ ", Style::default().fg(Color::Cyan)));
        }
        line
    } else if app.poller.is_active() {
        Line::from(Span::styled("⟳ Scraping...", Style::default().fg(Color::Cyan)))
    } else if app.generating {
        Line::from(Span::styled("⟳ Generating...", Style::default().fg(Color::Cyan)))
    } else {
        Line::from("")
    };
    f.render_widget(Paragraph::new(banner), chunks[1]);

    draw_pending_list(f, app, chunks[2]);
    draw_detail_panel(f, app, chunks[3]);
}

fn draw_stat_tiles(f: &mut Frame, app: &DeckApp, area: Rect) {
    let tiles = [
        ("Pending", app.stats.pending, Color::Yellow),
        ("Posted", app.stats.posted, Color::Green),
        ("Generated", app.stats.total_generated, Color::Blue),
        ("Topics", app.topics_count, ACCENT),
    ];
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);
    for ((label, value, color), rect) in tiles.into_iter().zip(cols.iter()) {
        let tile = Paragraph::new(Line::from(vec![
            Span::styled(
                format!("{value}"),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("  {label}")),
        ]))
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(tile, *rect);
    }
}

fn summary_line(tweet: &Tweet, busy: bool) -> Line<'_> {
    let preview: String = tweet.content.chars().take(60).collect();
    let truncated = tweet.content.chars().count() > 60;
    let mut spans = vec![
        Span::styled(
            format!("[{}] ", tweet.topic),
            Style::default().fg(ACCENT),
        ),
        Span::raw(preview),
    ];
    if truncated {
        spans.push(Span::styled("…", Style::default().fg(Color::DarkGray)));
    }
    if busy {
        spans.push(Span::styled("  ⟳", Style::default().fg(Color::Cyan)));
    }
    Line::from(spans)
}

fn draw_pending_list(f: &mut Frame, app: &DeckApp, area: Rect) {
    let title = format!(" Pending review ({}) ", app.tweets.len());
    if app.tweets.is_empty() {
        let empty = Paragraph::new(
            "No pending tweets.\nAdd topics, scrape trending content, then generate drafts to review here.",
        )
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = app
        .tweets
        .iter()
        .map(|t| ListItem::new(summary_line(t, app.busy_item == Some(t.id))))
        .collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("▸ ");
    let mut state = ListState::default();
    state.select(Some(app.selected.min(app.tweets.len().saturating_sub(1))));
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_detail_panel(f: &mut Frame, app: &DeckApp, area: Rect) {
    let Some(tweet) = app.tweets.get(app.selected) else {
        f.render_widget(Block::default().borders(Borders::ALL).title(" Draft "), area);
        return;
    };

    let editing = app.edit.as_ref().filter(|d| d.tweet_id == tweet.id);
    let (content, chars) = match editing {
        Some(draft) => (draft.field.value.clone(), draft.field.value.chars().count()),
        None => (tweet.content.clone(), tweet.content.chars().count()),
    };

    let mut lines: Vec<Line> = vec![Line::from(vec![
        Span::styled(format!("#{} ", tweet.id), Style::default().fg(Color::DarkGray)),
        Span::styled(tweet.topic.as_str(), Style::default().fg(ACCENT)),
        Span::raw("  "),
        Span::styled(
            tweet.status.as_str(),
            Style::default().fg(status_color(tweet.status)),
        ),
        Span::raw("  "),
        Span::styled(
            tweet.created_at.as_deref().unwrap_or(""),
            Style::default().fg(Color::DarkGray),
        ),
    ])];
    lines.push(Line::from(""));
    lines.push(Line::from(content));
    lines.push(Line::from(Span::styled(
        format!("{chars}/{MAX_POST_LEN}"),
        if chars > MAX_POST_LEN {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::DarkGray)
        },
    )));
    if let Some(error) = app.item_errors.get(&tweet.id) {
        lines.push(Line::from(Span::styled(
            error.as_str(),
            Style::default().fg(Color::Red),
        )));
    }

    let title = if editing.is_some() { " Draft (editing) " } else { " Draft " };
    let border = if editing.is_some() {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Gray)
    };
    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).border_style(border).title(title));
    f.render_widget(widget, area);
}

// Topics tab

fn draw_topics(f: &mut Frame, app: &DeckApp, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(4)])
        .split(area);

    let form = &app.topic_form;
    let tone_spans: Vec<Span> = Tone::ALL
        .iter()
        .enumerate()
        .flat_map(|(i, tone)| {
            let style = if i == form.tone_idx % Tone::ALL.len() {
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            [Span::styled(tone.as_str(), style), Span::raw("  ")]
        })
        .collect();

    let mut lines = vec![
        field_line("Topic name", form.name.display(), form.focus == Some(0), None),
        field_line("Subreddits (comma-sep)", form.subreddits.display(), form.focus == Some(1), None),
        Line::from(
            [
                vec![Span::styled(
                    format!("{:>28}: ", "Tone"),
                    if form.focus == Some(2) {
                        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(Color::Gray)
                    },
                )],
                tone_spans,
            ]
            .concat(),
        ),
        field_line("Hashtags (comma-sep)", form.hashtags.display(), form.focus == Some(3), None),
    ];
    if form.busy {
        lines.push(Line::from(Span::styled("Adding...", Style::default().fg(Color::Cyan))));
    } else if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(error.as_str(), Style::default().fg(Color::Red))));
    }

    let form_widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Add topic "));
    f.render_widget(form_widget, chunks[0]);

    let items: Vec<ListItem> = app
        .topics
        .iter()
        .map(|t| {
            let mut spans = vec![
                Span::styled(t.name.as_str(), Style::default().add_modifier(Modifier::BOLD)),
                Span::styled(format!("  {}", t.tone.as_str()), Style::default().fg(Color::DarkGray)),
            ];
            if !t.subreddits.is_empty() {
                let subs = t
                    .subreddits
                    .iter()
                    .map(|s| format!("r/{s}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                spans.push(Span::styled(format!("  · {subs}"), Style::default().fg(Color::DarkGray)));
            }
            if !t.hashtags.is_empty() {
                spans.push(Span::styled(
                    format!("  · {}", t.hashtags.join(", ")),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let title = format!(" Your topics ({}) ", app.topics.len());
    if items.is_empty() {
        let empty = Paragraph::new("No topics yet. Add one above to start generating drafts.")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(empty, chunks[1]);
        return;
    }
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("▸ ");
    let mut state = ListState::default();
    if form.focus.is_none() {
        state.select(Some(app.topic_selected.min(app.topics.len().saturating_sub(1))));
    }
    f.render_stateful_widget(list, chunks[1], &mut state);
}

// History tab

fn draw_history(f: &mut Frame, app: &DeckApp, area: Rect) {
    let rows: Vec<Row> = app
        .history
        .iter()
        .skip(app.history_offset)
        .map(|t| {
            let date: String = t.created_at.as_deref().unwrap_or("").chars().take(10).collect();
            Row::new(vec![
                Span::styled(date, Style::default().fg(Color::DarkGray)),
                Span::styled(t.topic.clone(), Style::default().fg(ACCENT)),
                Span::styled(
                    t.status.as_str(),
                    Style::default().fg(status_color(t.status)),
                ),
                Span::raw(t.content.clone()),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Length(16),
            Constraint::Length(9),
            Constraint::Min(20),
        ],
    )
    .header(
        Row::new(vec!["Date", "Topic", "Status", "Content"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" History ({}) ", app.history.len())),
    );
    f.render_widget(table, area);
}

// Settings tab

fn draw_settings(f: &mut Frame, app: &DeckApp, area: Rect) {
    let settings = &app.settings;
    let mut lines: Vec<Line> = Vec::with_capacity(settings.fields.len() + 3);
    for (i, label) in super::SETTINGS_FIELDS.iter().enumerate() {
        let badge = if SettingsTab::is_secret(i) { settings.flag_for(i) } else { None };
        lines.push(field_line(label, settings.fields[i].display(), settings.focus == i, badge));
    }
    lines.push(Line::from(""));
    if settings.busy {
        lines.push(Line::from(Span::styled("Saving...", Style::default().fg(Color::Cyan))));
    } else if let Some(banner) = &settings.banner {
        lines.push(banner_line(banner));
    }
    lines.push(Line::from(Span::styled(
        "Secrets are write-only: stored values are shown as a [set] flag, never echoed.",
        Style::default().fg(Color::DarkGray),
    )));

    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Credentials "))
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}
