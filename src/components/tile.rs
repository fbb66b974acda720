use super::Component;
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
    reconciler::SecondaryTile,
};
use ratatui::{
    layout::Rect,
    text::Line,
    widgets::{
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

/// The local media tile: camera preview or screen share, one at a time.
///
/// What occupies the tile is recomputed from presence every render tick; the
/// screen share outranks the camera while both are live. The compositor
/// decides where (and whether) the tile gets an area.
pub struct LocalTile {
    observer: SharedObserver,
    theme: Theme,
    chat_open: bool,
    current: Option<SecondaryTile>,
    enter: Motion,
}

impl LocalTile {
    pub fn new(observer: SharedObserver, chat_open: bool) -> Self {
        Self {
            observer,
            theme: Theme::default(),
            chat_open,
            current: None,
            enter: Motion::settled(0.0, Instant::now()),
        }
    }

    fn render_tick(&mut self, now: Instant) {
        let local = self.observer.lock().unwrap().local_presence();
        let tile = SecondaryTile::select(&local);

        let was = self.current.as_ref().map(SecondaryTile::label);
        let is = tile.as_ref().map(SecondaryTile::label);
        if was != is {
            debug!(from = ?was, to = ?is, "local tile change");
            if is.is_some() {
                let delay = if self.chat_open {
                    Duration::ZERO
                } else {
                    CLOSED_PANEL_ENTRANCE_DELAY
                };
                self.enter = Motion::new(0.0, 1.0, now, delay, SLOT_TRANSITION);
            } else {
                self.enter.retarget(0.0, now, Duration::ZERO);
            }
        }
        self.current = tile;
    }
}

impl Component for LocalTile {
    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::Render => self.render_tick(Instant::now()),
            Action::ChatOpenChanged(open) => self.chat_open = open,
            Action::ThemeChanged(preference) => self.theme = Theme::from_preference(preference),
            _ => {}
        }
        Ok(None)
    }

    fn is_visible(&self) -> bool {
        self.current.is_some()
    }

    fn draw(&mut self, frame: &mut Frame<'_>, area: Rect) -> Result<()> {
        let Some(tile) = &self.current else {
            return Ok(());
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(self.theme.local_accent)
            .title(format!(" {} ", tile.label()));
        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.width == 0 || inner.height == 0 {
            return Ok(());
        }

        // There is no real frame to show in a terminal; render a patterned
        // surface that grows with the entrance animation instead.
        let grown = self.enter.value_at(Instant::now());
        let rows = (f64::from(inner.height) * grown).round() as u16;
        let pattern = match tile {
            SecondaryTile::Camera(_) => "· ",
            SecondaryTile::ScreenShare(_) => "▚▞",
        };
        let fill = pattern.repeat(usize::from(inner.width));
        let lines: Vec<Line<'_>> = (0..rows).map(|_| Line::styled(fill.clone(), self.theme.fade)).collect();
        let surface = Rect {
            y: inner.y + (inner.height - rows) / 2,
            height: rows,
            ..inner
        };
        frame.render_widget(Paragraph::new(lines), surface);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitch_tank_session::{
        events::{
            RoomEvent,
            RoomEvents,
        },
        presence::RoomObserver,
        track::{
            Publication,
            TrackDimensions,
            TrackSource,
            VideoTrackHandle,
        },
    };
    use pretty_assertions::assert_eq;

    fn tile_with_events() -> (LocalTile, RoomEvents) {
        let events = RoomEvents::default();
        let (observer, subscription) = RoomObserver::attach(&events);
        std::mem::forget(subscription);
        (LocalTile::new(observer, true), events)
    }

    fn publish(events: &RoomEvents, source: TrackSource) {
        events.emit(&RoomEvent::TrackPublished {
            source,
            publication: Publication::video(VideoTrackHandle::new(), TrackDimensions { width: 1280, height: 720 }),
        });
    }

    #[test]
    fn tile_is_hidden_until_local_media_starts() {
        let (mut tile, events) = tile_with_events();
        tile.render_tick(Instant::now());
        assert!(!tile.is_visible());

        publish(&events, TrackSource::LocalCamera);
        tile.render_tick(Instant::now());
        assert!(tile.is_visible());
        assert_eq!(tile.current.as_ref().map(SecondaryTile::label), Some("Camera"));
    }

    #[test]
    fn screen_share_replaces_the_camera_preview() {
        let (mut tile, events) = tile_with_events();
        publish(&events, TrackSource::LocalCamera);
        publish(&events, TrackSource::LocalScreenShare);
        tile.render_tick(Instant::now());
        assert_eq!(tile.current.as_ref().map(SecondaryTile::label), Some("Screen share"));

        events.emit(&RoomEvent::TrackUnpublished {
            source: TrackSource::LocalScreenShare,
        });
        tile.render_tick(Instant::now());
        assert_eq!(tile.current.as_ref().map(SecondaryTile::label), Some("Camera"));
    }

    #[test]
    fn appearing_with_chat_closed_delays_the_entrance() {
        let (mut tile, events) = tile_with_events();
        tile.chat_open = false;
        let now = Instant::now();
        tile.render_tick(now);

        publish(&events, TrackSource::LocalCamera);
        let appeared = now + Duration::from_millis(10);
        tile.render_tick(appeared);

        assert_eq!(tile.enter.value_at(appeared + Duration::from_millis(100)), 0.0);
        assert_eq!(tile.enter.value_at(appeared + CLOSED_PANEL_ENTRANCE_DELAY + SLOT_TRANSITION), 1.0);
    }
}
