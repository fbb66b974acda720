use super::{
    waveform::Waveform,
    Component,
};
use crate::{
    action::Action,
    motion::{
        Motion,
        CLOSED_PANEL_ENTRANCE_DELAY,
        SLOT_TRANSITION,
    },
    theme::Theme,
};
use color_eyre::Result;
use pitch_tank_session::{
    presence::SharedObserver,
    reconciler::{
        StageView,
        StageViewKind,
    },
    track::TrackDimensions,
};
use ratatui::{
    layout::Rect,
    symbols,
    text::Line,
    widgets::{
        canvas::{
            Canvas,
            Circle,
        },
        Block,
        BorderType,
        Borders,
        Paragraph,
    },
    Frame,
};
use std::time::{
    Duration,
    Instant,
};

/// Reveal mask radius targets for the avatar, as a fraction of the full
/// stage extent.
const MASK_RADIUS_CHAT_OPEN: f64 = 1.0;
const MASK_RADIUS_CHAT_CLOSED: f64 = 0.65;

/// Waveform amplitude factor while the chat panel shrinks the stage.
const COMPACT_WAVEFORM_SCALE: f64 = 0.7;

/// The agent stage slot: an idle placeholder, the audio waveform, or the
/// avatar video surface, with animated transitions between them.
///
/// Which sub-rendering shows is recomputed from presence on every render
/// tick; the only state beyond the three inputs is the in-flight motion
/// values, which never feed back into the decision.
pub struct AgentStage {
    observer: SharedObserver,
    theme: Theme,
    chat_open: bool,
    current: StageView,
    agent_name: String,
    video_dimensions: Option<TrackDimensions>,
    waveform: Waveform,
    enter: Motion,
    exit: Option<Motion>,
    mask_radius: Motion,
    corner: Motion,
}

impl AgentStage {
    pub fn new(observer: SharedObserver, chat_open: bool) -> Self {
        let now = Instant::now();
        Self {
            observer,
            theme: Theme::default(),
            chat_open,
            current: StageView::Idle,
            agent_name: String::new(),
            video_dimensions: None,
            waveform: Waveform::new(),
            enter: Motion::settled(1.0, now),
            exit: None,
            mask_radius: Motion::settled(0.0, now),
            corner: Motion::settled(1.0, now),
        }
    }

    fn mask_target(chat_open: bool) -> f64 {
        if chat_open {
            MASK_RADIUS_CHAT_OPEN
        } else {
            MASK_RADIUS_CHAT_CLOSED
        }
    }

    /// One pass of the reconciliation + animation step.
    fn render_tick(&mut self, now: Instant) {
        let (presence, name) = {
            let observer = self.observer.lock().unwrap();
            (observer.agent_presence(), observer.agent_display_name())
        };
        self.agent_name = name;
        self.video_dimensions = presence.video_dimensions;

        let view = StageView::select(&presence);
        if view.kind() != self.current.kind() {
            debug!(from = %self.current.kind(), to = %view.kind(), "agent stage transition");
            // Exit and entrance run concurrently on the same timing, so the
            // vacated slot resizes in lockstep with the incoming one. The
            // extra delay only applies while the chat panel is closed.
            let delay = if self.chat_open {
                Duration::ZERO
            } else {
                CLOSED_PANEL_ENTRANCE_DELAY
            };
            self.exit = Some(Motion::new(self.enter.value_at(now), 0.0, now, delay, SLOT_TRANSITION));
            self.enter = Motion::new(0.0, 1.0, now, delay, SLOT_TRANSITION);
            if view.kind() == StageViewKind::Avatar {
                // First reveal always grows from zero.
                self.mask_radius = Motion::new(0.0, Self::mask_target(self.chat_open), now, delay, SLOT_TRANSITION);
            }
        }
        self.current = view;

        if self.exit.is_some_and(|motion| motion.is_settled_at(now)) {
            self.exit = None;
        }
        self.mask_radius.retarget(Self::mask_target(self.chat_open), now, Duration::ZERO);
        self.corner.retarget(if self.chat_open { 0.0 } else { 1.0 }, now, Duration::ZERO);

        self.waveform.bind(self.current.audio_handle());
        self.waveform.render_tick();
    }

    fn border_type(&self, now: Instant) -> BorderType {
        // Terminals cannot interpolate a corner radius; quantize the motion
        // to the nearest border shape instead.
        if self.corner.value_at(now) < 0.5 {
            BorderType::Rounded
        } else {
            BorderType::Plain
        }
    }

    fn draw_avatar(&self, frame: &mut Frame<'_>, area: Rect, radius: f64) {
        let color = self.theme.avatar;
        let canvas = Canvas::default()
            .x_bounds([-1.0, 1.0])
            .y_bounds([-1.0, 1.0])
            .marker(symbols::Marker::HalfBlock)
            .paint(move |ctx| {
                // Filled circular reveal, radius 1.0 covering the surface.
                let mut r = radius.clamp(0.0, 1.5) * 1.5;
                while r > 0.0 {
                    ctx.draw(&Circle {
                        x: 0.0,
                        y: 0.0,
                        radius: r,
                        color,
                    });
                    r -= 0.04;
                }
            });
        frame.render_widget(canvas, area);
    }

    fn caption(&self) -> Line<'_> {
        match self.current.kind() {
            StageViewKind::Idle => Line::styled("waiting for the tank to pick up...", self.theme.text_dim),
            StageViewKind::Waveform if !self.waveform.is_live() => Line::styled("line open, no audio yet", self.theme.text_dim),
            StageViewKind::Waveform => Line::styled("on the line", self.theme.text_default),
            StageViewKind::Avatar => {
                let dimensions = self
                    .video_dimensions
                    .map(|d| format!("live · {d}"))
                    .unwrap_or_else(|| "live".to_string());
                Line::styled(dimensions, self.theme.text_default)
            }
        }
    }
}

impl Component for AgentStage {
    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::Render => self.render_tick(Instant::now()),
            Action::ChatOpenChanged(open) => self.chat_open = open,
            Action::ThemeChanged(preference) => self.theme = Theme::from_preference(preference),
            _ => {}
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame<'_>, area: Rect) -> Result<()> {
        let now = Instant::now();

        let title = if self.agent_name.is_empty() {
            " Agent stage ".to_string()
        } else {
            format!(" {} ", self.agent_name)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(self.border_type(now))
            .border_style(self.theme.border(!self.chat_open))
            .title(title)
            .title_bottom(self.caption().right_aligned());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if inner.width == 0 || inner.height == 0 {
            return Ok(());
        }

        // The vacated rendering collapses while the incoming one grows.
        if let Some(exit) = self.exit {
            let remaining = exit.value_at(now);
            let ghost_height = (f64::from(inner.height) * remaining).round() as u16;
            if ghost_height > 0 {
                let ghost = Rect {
                    y: inner.y + (inner.height - ghost_height) / 2,
                    height: ghost_height,
                    ..inner
                };
                frame.render_widget(Block::default().style(self.theme.fade), ghost);
            }
        }

        let enter = self.enter.value_at(now);
        match self.current.kind() {
            StageViewKind::Avatar => {
                let radius = self.mask_radius.value_at(now) * enter;
                self.draw_avatar(frame, inner, radius);
            }
            StageViewKind::Waveform | StageViewKind::Idle => {
                let scale = if self.chat_open { COMPACT_WAVEFORM_SCALE } else { 1.0 };
                self.waveform.draw(frame, inner, &self.theme, enter * scale);
                if self.current.kind() == StageViewKind::Idle {
                    let placeholder = Paragraph::new(Line::styled("···", self.theme.text_dim)).centered();
                    let middle = Rect {
                        y: inner.y + inner.height / 2,
                        height: 1.min(inner.height),
                        ..inner
                    };
                    frame.render_widget(placeholder, middle);
                }
            }
        }

        Ok(())
    }
}
