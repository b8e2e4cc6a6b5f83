use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyModifiers,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::Backend};

use crate::core::poller::PollerUpdate;

use super::{Banner, DeckApp, Screen, Tab, ui};

impl DeckApp {
    pub(crate) async fn run_tui(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
        let backend = ratatui::backend::CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let res = self.run_app(&mut terminal).await;

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableBracketedPaste)?;
        terminal.show_cursor()?;

        res
    }

    async fn run_app<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()>
    where
        <B as Backend>::Error: std::error::Error + Send + Sync + 'static,
    {
        loop {
            if self.should_quit {
                self.poller.cancel();
                return Ok(());
            }

            if !self.mounted {
                self.mounted = true;
                if self.screen == Screen::Deck {
                    self.enter_deck().await;
                }
            }

            // A 401 on any request queues a return to the login screen.
            if self.take_session_expired() && self.screen == Screen::Deck {
                self.expire_to_login();
            }

            self.pump_poller().await;

            terminal.draw(|f| ui::draw(f, self))?;

            if event::poll(Duration::from_millis(80))? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(key).await,
                    Event::Paste(data) => self.handle_paste(&data),
                    _ => {}
                }
            }
        }
    }

    async fn pump_poller(&mut self) {
        for update in self.poller.pump() {
            match update {
                PollerUpdate::Progress { message } => {
                    self.banner = Some(Banner::info(message));
                }
                PollerUpdate::Settled { message, scraped } => {
                    self.banner = Some(if scraped > 0 {
                        Banner::success(message)
                    } else {
                        Banner::error(message)
                    });
                    // The one reconciliation pass for this job.
                    self.reload_dashboard().await;
                    self.poller.reconciled();
                }
                PollerUpdate::Aborted => {
                    self.banner = Some(Banner::error(
                        "Lost contact with the scrape job. Trigger it again to retry.",
                    ));
                }
            }
        }
    }

    async fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Auth => self.handle_auth_key(key).await,
            Screen::Deck => self.handle_deck_key(key).await,
        }
    }

    fn handle_paste(&mut self, data: &str) {
        match self.screen {
            Screen::Auth => self.auth.focused_field().insert_str(data),
            Screen::Deck => match self.tab {
                Tab::Dashboard => {
                    if let Some(draft) = self.edit.as_mut() {
                        draft.field.insert_str(data);
                    }
                }
                Tab::Topics => {
                    if let Some(focus) = self.topic_form.focus
                        && let Some(field) = self.topic_text_field(focus)
                    {
                        field.insert_str(data);
                    }
                }
                Tab::Settings => {
                    let focus = self.settings.focus;
                    self.settings.fields[focus].insert_str(data);
                }
                Tab::History => {}
            },
        }
    }

    async fn handle_auth_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('r') {
            self.auth.register_mode = !self.auth.register_mode;
            self.auth.focus = 0;
            self.auth.error = None;
            return;
        }
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Enter => self.submit_auth().await,
            KeyCode::Tab | KeyCode::Down => {
                self.auth.focus = (self.auth.focus + 1) % self.auth.field_count();
            }
            KeyCode::BackTab | KeyCode::Up => {
                let count = self.auth.field_count();
                self.auth.focus = (self.auth.focus + count - 1) % count;
            }
            _ => {
                self.auth.focused_field().handle_key(key);
            }
        }
    }

    async fn handle_deck_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('l') {
            self.logout();
            return;
        }

        // Tab bar navigation works from every tab.
        match key.code {
            KeyCode::Tab => {
                self.switch_tab(self.tab.next()).await;
                return;
            }
            KeyCode::BackTab => {
                self.switch_tab(self.tab.prev()).await;
                return;
            }
            _ => {}
        }

        match self.tab {
            Tab::Dashboard => self.handle_dashboard_key(key).await,
            Tab::Topics => self.handle_topics_key(key).await,
            Tab::History => self.handle_history_key(key).await,
            Tab::Settings => self.handle_settings_key(key).await,
        }
    }

    async fn handle_dashboard_key(&mut self, key: KeyEvent) {
        // Inline editor captures everything while open.
        if self.edit.is_some() {
            match key.code {
                KeyCode::Enter => self.toggle_edit().await,
                KeyCode::Esc => self.cancel_edit(),
                _ => {
                    if let Some(draft) = self.edit.as_mut() {
                        draft.field.handle_key(key);
                    }
                }
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') => self.switch_tab(Tab::Dashboard).await,
            KeyCode::Char('2') => self.switch_tab(Tab::Topics).await,
            KeyCode::Char('3') => self.switch_tab(Tab::History).await,
            KeyCode::Char('4') => self.switch_tab(Tab::Settings).await,
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => {
                if self.selected + 1 < self.tweets.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Char('a') => self.approve_selected().await,
            KeyCode::Char('x') => self.reject_selected().await,
            KeyCode::Char('e') => self.toggle_edit().await,
            KeyCode::Char('s') => self.trigger_scrape().await,
            KeyCode::Char('g') => self.trigger_generate().await,
            KeyCode::Char('R') => self.reload_dashboard().await,
            KeyCode::Esc => self.banner = None,
            _ => {}
        }
    }

    fn topic_text_field(&mut self, focus: usize) -> Option<&mut super::forms::TextField> {
        match focus {
            0 => Some(&mut self.topic_form.name),
            1 => Some(&mut self.topic_form.subreddits),
            3 => Some(&mut self.topic_form.hashtags),
            _ => None, // 2 is the tone picker
        }
    }

    async fn handle_topics_key(&mut self, key: KeyEvent) {
        match self.topic_form.focus {
            Some(focus) => match key.code {
                KeyCode::Enter => self.submit_topic().await,
                KeyCode::Esc => self.topic_form.focus = None,
                KeyCode::Down => {
                    if focus >= 3 {
                        self.topic_form.focus = None;
                    } else {
                        self.topic_form.focus = Some(focus + 1);
                    }
                }
                KeyCode::Up => {
                    self.topic_form.focus = Some(focus.saturating_sub(1));
                }
                KeyCode::Left if focus == 2 => {
                    let len = crate::core::api::types::Tone::ALL.len();
                    self.topic_form.tone_idx = (self.topic_form.tone_idx + len - 1) % len;
                }
                KeyCode::Right if focus == 2 => {
                    let len = crate::core::api::types::Tone::ALL.len();
                    self.topic_form.tone_idx = (self.topic_form.tone_idx + 1) % len;
                }
                _ => {
                    if let Some(field) = self.topic_text_field(focus) {
                        field.handle_key(key);
                    }
                }
            },
            None => match key.code {
                KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Char('1') => self.switch_tab(Tab::Dashboard).await,
                KeyCode::Char('3') => self.switch_tab(Tab::History).await,
                KeyCode::Char('4') => self.switch_tab(Tab::Settings).await,
                KeyCode::Char('i') | KeyCode::Enter => self.topic_form.focus = Some(0),
                KeyCode::Up => {
                    if self.topic_selected == 0 {
                        self.topic_form.focus = Some(3);
                    } else {
                        self.topic_selected -= 1;
                    }
                }
                KeyCode::Down => {
                    if self.topic_selected + 1 < self.topics.len() {
                        self.topic_selected += 1;
                    }
                }
                KeyCode::Char('x') | KeyCode::Delete => self.remove_selected_topic().await,
                KeyCode::Char('r') => self.load_topics().await,
                _ => {}
            },
        }
    }

    async fn handle_history_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') => self.switch_tab(Tab::Dashboard).await,
            KeyCode::Char('2') => self.switch_tab(Tab::Topics).await,
            KeyCode::Char('4') => self.switch_tab(Tab::Settings).await,
            KeyCode::Char('r') => self.load_history().await,
            KeyCode::Up => self.history_offset = self.history_offset.saturating_sub(1),
            KeyCode::Down => {
                if self.history_offset + 1 < self.history.len() {
                    self.history_offset += 1;
                }
            }
            _ => {}
        }
    }

    async fn handle_settings_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s') {
            self.save_settings().await;
            return;
        }
        match key.code {
            KeyCode::Enter => self.save_settings().await,
            KeyCode::Down => {
                self.settings.focus = (self.settings.focus + 1) % self.settings.fields.len();
            }
            KeyCode::Up => {
                let count = self.settings.fields.len();
                self.settings.focus = (self.settings.focus + count - 1) % count;
            }
            KeyCode::Esc => self.settings.banner = None,
            _ => {
                let focus = self.settings.focus;
                self.settings.fields[focus].handle_key(key);
            }
        }
    }
}
