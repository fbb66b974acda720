use crate::{
    action::Action,
    tui::Event,
};
use color_eyre::Result;
use crossterm::event::{
    KeyEvent,
    MouseEvent,
};
use pitch_tank_config::Config;
use ratatui::{
    layout::{
        Rect,
        Size,
    },
    Frame,
};
use tokio::sync::mpsc::UnboundedSender;

/// `Component` is a trait that represents a visual and interactive element of
/// the user interface. Implementors can handle events, update state, and be
/// rendered on the screen.
pub trait Component {
    /// Register an action handler that can send actions for processing if
    /// necessary.
    fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
        let _ = tx;
        Ok(())
    }

    /// Register a configuration handler that provides configuration settings
    /// if necessary.
    fn register_config_handler(&mut self, config: Config) -> Result<()> {
        let _ = config;
        Ok(())
    }

    /// Initialize the component with a specified area if necessary.
    fn init(&mut self, area: Size) -> Result<()> {
        let _ = area;
        Ok(())
    }

    /// Handle incoming events and produce actions if necessary.
    fn handle_events(&mut self, event: Option<Event>) -> Result<Option<Action>> {
        let action = match event {
            Some(Event::Key(key_event)) => self.handle_key_event(key_event)?,
            Some(Event::Mouse(mouse_event)) => self.handle_mouse_event(mouse_event)?,
            _ => None,
        };
        Ok(action)
    }

    /// Handle key events and produce actions if necessary.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let _ = key;
        Ok(None)
    }

    /// Handle mouse events and produce actions if necessary.
    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        let _ = mouse;
        Ok(None)
    }

    /// Update the state of the component based on a received action.
    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        let _ = action;
        Ok(None)
    }

    /// Whether the component currently draws anything.
    fn is_visible(&self) -> bool {
        true
    }

    /// Whether the component should receive input events.
    fn is_focused(&self) -> bool {
        false
    }

    /// Render the component on the screen.
    fn draw(&mut self, frame: &mut Frame<'_>, area: Rect) -> Result<()>;
}
