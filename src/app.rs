use crate::{
    action::Action,
    components::{
        logs::Logs,
        stage::AgentStage,
        tile::LocalTile,
        transcript::{
            TranscriptAction,
            TranscriptPanel,
        },
        Component,
    },
    layout::{
        chrome_and_main,
        session_areas,
        CHAT_PANEL_WIDTH,
        TILE_SPLIT_FRACTION,
    },
    motion::Motion,
    theme::Theme,
    tui::{
        Event,
        Tui,
    },
};
use color_eyre::Result;
use crossterm::event::{
    KeyCode,
    KeyEvent,
    KeyModifiers,
};
use pitch_tank_config::{
    Args,
    Config,
};
use pitch_tank_session::{
    events::Subscription,
    feed::ScriptedFeed,
    presence::{
        RoomObserver,
        SharedObserver,
    },
    reconciler::{
        reconcile,
        LayoutMode,
    },
    room::Room,
    transcript::Transcript,
};
use ratatui::{
    prelude::Rect,
    text::Line,
    widgets::{
        Block,
        Paragraph,
    },
};
use std::time::{
    Duration,
    Instant,
};
use tokio::sync::mpsc;

type ActionSender = mpsc::UnboundedSender<Action>;
type ActionReceiver = mpsc::UnboundedReceiver<Action>;

/// The compositor: owns the session, feeds events to the components, and
/// turns the reconciled layout into animated slot geometry each frame.
pub struct App {
    config: Config,
    theme: Theme,
    should_quit: bool,
    should_suspend: bool,
    chat_open: bool,
    room: Room,
    feed: ScriptedFeed,
    observer: SharedObserver,
    _subscriptions: Vec<Subscription>,
    stage: AgentStage,
    tile: LocalTile,
    panel: TranscriptPanel,
    logs: Logs,
    chat_width: Motion,
    tile_split: Motion,
}

impl App {
    pub fn new(args: Args) -> Result<Self> {
        let config = Config::new(args)?;
        let chat_open = config.chat_open;

        let room = Room::new(config.display_name.clone());
        let feed = ScriptedFeed::investor_session(room.events().clone());
        let (observer, observer_sub) = RoomObserver::attach(room.events());
        let (transcript, transcript_sub) = Transcript::attach(room.events());

        let now = Instant::now();
        Ok(Self {
            theme: Theme::from_preference(config.theme),
            should_quit: false,
            should_suspend: false,
            chat_open,
            stage: AgentStage::new(observer.clone(), chat_open),
            tile: LocalTile::new(observer.clone(), chat_open),
            panel: TranscriptPanel::new(transcript, chat_open),
            logs: Logs::new(),
            observer,
            _subscriptions: vec![observer_sub, transcript_sub],
            room,
            feed,
            chat_width: Motion::settled(if chat_open { f64::from(CHAT_PANEL_WIDTH) } else { 0.0 }, now),
            tile_split: Motion::settled(0.0, now),
            config,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?.tick_rate(1.0).frame_rate(30.0);
        tui.enter()?;

        let (action_tx, mut action_rx) = mpsc::unbounded_channel();

        loop {
            self.handle_events(&mut tui, action_tx.clone()).await?;
            self.handle_actions(&mut tui, action_tx.clone(), &mut action_rx)?;
            if self.should_suspend {
                tui.suspend()?;
                action_tx.send(Action::Resume)?;
                action_tx.send(Action::ClearScreen)?;
                tui.enter()?;
            } else if self.should_quit {
                tui.stop()?;
                break;
            }
        }
        tui.exit()?;

        Ok(())
    }

    async fn handle_events(&mut self, tui: &mut Tui, action_tx: ActionSender) -> Result<()> {
        let Some(event) = tui.next_event().await else {
            return Ok(());
        };
        match event {
            Event::Init => {
                action_tx.send(Action::ThemeChanged(self.config.theme))?;
                action_tx.send(Action::ChatOpenChanged(self.chat_open))?;
            }
            Event::Quit => action_tx.send(Action::Quit)?,
            Event::Tick => action_tx.send(Action::Tick)?,
            Event::Render => action_tx.send(Action::Render)?,
            Event::Resize(x, y) => action_tx.send(Action::Resize(x, y))?,
            Event::Key(key) => self.handle_key_event(key, action_tx)?,
            _ => {}
        }
        Ok(())
    }

    /// Key routing: Ctrl-C always quits; an overlay or the chat panel takes
    /// everything else while focused; otherwise single-key controls apply.
    fn handle_key_event(&mut self, key: KeyEvent, action_tx: ActionSender) -> Result<()> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            action_tx.send(Action::Quit)?;
            return Ok(());
        }

        if self.logs.is_focused() {
            if let Some(action) = self.logs.handle_key_event(key)? {
                action_tx.send(action)?;
            }
            return Ok(());
        }
        if self.panel.is_focused() {
            if let Some(action) = self.panel.handle_key_event(key)? {
                action_tx.send(action)?;
            }
            return Ok(());
        }

        let action = match key.code {
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Char('z') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Suspend,
            KeyCode::Char('l') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::ClearScreen,
            KeyCode::Char('c') => Action::ToggleChat,
            KeyCode::Char('v') => Action::ToggleCamera,
            KeyCode::Char('s') => Action::ToggleScreenShare,
            KeyCode::Char('t') => Action::ToggleTheme,
            KeyCode::Char('l') => Action::ToggleLogs,
            _ => return Ok(()),
        };
        action_tx.send(action)?;
        Ok(())
    }

    fn handle_actions(&mut self, tui: &mut Tui, action_tx: ActionSender, action_rx: &mut ActionReceiver) -> Result<()> {
        while let Ok(action) = action_rx.try_recv() {
            match &action {
                Action::ClearScreen => tui.terminal.clear()?,
                Action::Resize(w, h) => self.handle_resize(tui, *w, *h)?,
                Action::Render => self.render(tui)?,
                _ => {}
            }
            self.dispatch(action, action_tx.clone())?;
        }
        Ok(())
    }

    /// The terminal-independent half of action handling, split out so tests
    /// can drive the application without a terminal.
    fn dispatch(&mut self, action: Action, action_tx: ActionSender) -> Result<()> {
        if !matches!(action, Action::Tick | Action::Render) {
            debug!("Got action: {action:?}");
        }

        match &action {
            Action::Quit => self.should_quit = true,
            Action::Suspend => self.should_suspend = true,
            Action::Resume => self.should_suspend = false,
            Action::Error(message) => error!("{message}"),
            Action::Tick => {
                if !self.feed.is_finished() {
                    self.feed.advance();
                }
            }
            Action::ToggleChat => {
                self.chat_open = !self.chat_open;
                action_tx.send(Action::ChatOpenChanged(self.chat_open))?;
            }
            Action::ToggleCamera => {
                self.room.toggle_camera();
            }
            Action::ToggleScreenShare => {
                self.room.toggle_screen_share();
            }
            Action::ToggleTheme => {
                let next = self.config.theme.toggle();
                if let Err(err) = self.config.set_theme(next) {
                    error!("Failed to persist the theme preference: {err}");
                }
                action_tx.send(Action::ThemeChanged(next))?;
            }
            Action::ThemeChanged(preference) => self.theme = Theme::from_preference(*preference),
            Action::Transcript(TranscriptAction::Submit(text)) => self.room.send_message(text.clone()),
            _ => {}
        }

        self.update_components(action, action_tx)
    }

    fn update_components(&mut self, action: Action, action_tx: ActionSender) -> Result<()> {
        for follow_up in [
            self.stage.update(action.clone())?,
            self.tile.update(action.clone())?,
            self.panel.update(action.clone())?,
            self.logs.update(action)?,
        ]
        .into_iter()
        .flatten()
        {
            action_tx.send(follow_up)?;
        }
        Ok(())
    }

    fn handle_resize(&mut self, tui: &mut Tui, w: u16, h: u16) -> Result<()> {
        tui.resize(Rect::new(0, 0, w, h))?;
        self.render(tui)?;
        Ok(())
    }

    fn render(&mut self, tui: &mut Tui) -> Result<()> {
        let now = Instant::now();
        let (reconciled, agent_name) = {
            let observer = self.observer.lock().unwrap();
            (
                reconcile(&observer.agent_presence(), &observer.local_presence(), self.chat_open),
                observer.agent_display_name(),
            )
        };

        // The mode only supplies animation targets; the geometry below is
        // computed from the interpolated values.
        let chat_target = if reconciled.mode.chat_panel_open() {
            f64::from(CHAT_PANEL_WIDTH)
        } else {
            0.0
        };
        self.chat_width.retarget(chat_target, now, Duration::ZERO);
        let split_target = if reconciled.mode == LayoutMode::SidePanelSplit {
            TILE_SPLIT_FRACTION
        } else {
            0.0
        };
        self.tile_split.retarget(split_target, now, Duration::ZERO);
        let anchored_tile = reconciled.tile.is_some() && split_target == 0.0;

        let chat_width = self.chat_width.value_at(now).round() as u16;
        let tile_split = self.tile_split.value_at(now);

        tui.draw(|frame| {
            frame.render_widget(Block::default().style(self.theme.default), frame.area());

            let [header, main, footer] = match chrome_and_main(frame.area()) {
                Ok(areas) => areas,
                Err(err) => {
                    error!("Failed to lay out the screen: {err}");
                    return;
                }
            };

            frame.render_widget(Paragraph::new(Line::styled(" Pitch Tank", self.theme.agent_accent)), header);
            frame.render_widget(
                Paragraph::new(Line::styled(format!("{agent_name} "), self.theme.text_dim)).right_aligned(),
                header,
            );
            frame.render_widget(Paragraph::new(Line::styled(self.key_hints(), self.theme.text_dim)), footer);

            if self.logs.is_visible() {
                if let Err(err) = self.logs.draw(frame, main) {
                    error!("Failed to render the log overlay: {err}");
                }
                return;
            }

            let areas = match session_areas(main, chat_width, tile_split, anchored_tile) {
                Ok(areas) => areas,
                Err(err) => {
                    error!("Failed to lay out the session: {err}");
                    return;
                }
            };

            if let Err(err) = self.stage.draw(frame, areas.stage) {
                error!("Failed to render the agent stage: {err}");
            }
            if self.tile.is_visible() {
                if let Some(tile_area) = areas.tile {
                    if let Err(err) = self.tile.draw(frame, tile_area) {
                        error!("Failed to render the local tile: {err}");
                    }
                }
            }
            if self.panel.is_visible() {
                if let Some(chat_area) = areas.chat {
                    if let Err(err) = self.panel.draw(frame, chat_area) {
                        error!("Failed to render the transcript panel: {err}");
                    }
                }
            }
        })?;
        Ok(())
    }

    fn key_hints(&self) -> &'static str {
        if self.logs.is_focused() {
            " esc close · ↑/↓ select · space freeze · +/- level"
        } else if self.chat_open {
            " esc close chat · enter send · ↑/↓ scroll"
        } else {
            " q quit · c chat · v camera · s share · t theme · l logs"
        }
    }
}
