use eyre::{
    bail,
    Result,
};
use ratatui::layout::{
    Constraint,
    Direction,
    Flex,
    Layout,
    Rect,
};

/// Width of the fully open chat panel, in cells.
pub(crate) const CHAT_PANEL_WIDTH: u16 = 42;

/// Fraction of the main row the secondary tile claims in the split layout.
pub(crate) const TILE_SPLIT_FRACTION: f64 = 0.5;

/// Split the screen: status header, main area, key hints footer.
pub(crate) fn chrome_and_main(area: Rect) -> Result<[Rect; 3]> {
    let [header, main, footer] = *Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Max(1), Constraint::Min(0), Constraint::Max(1)])
        .split(area)
    else {
        bail!("Failed to split the area");
    };

    Ok([header, main, footer])
}

/// Where each visual slot of the session goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SessionAreas {
    pub(crate) stage: Rect,
    pub(crate) tile: Option<Rect>,
    pub(crate) chat: Option<Rect>,
}

/// Compute the slot geometry from the *animated* panel width and tile split,
/// not from the layout mode directly: the mode only supplies the animation
/// targets, so mid-transition frames land between the discrete arrangements.
///
/// `anchored_tile` requests the small bottom-right tile that is used while no
/// column is split off for it.
pub(crate) fn session_areas(area: Rect, chat_width: u16, tile_split: f64, anchored_tile: bool) -> Result<SessionAreas> {
    // Never let the panel squeeze the stage out entirely.
    let chat_width = chat_width.min(area.width.saturating_sub(20));

    let [main, chat] = *Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(chat_width)])
        .split(area)
    else {
        bail!("Failed to split the area");
    };
    let chat = (chat.width > 0).then_some(chat);

    let tile_width = (f64::from(main.width) * tile_split.clamp(0.0, TILE_SPLIT_FRACTION)).round() as u16;
    if tile_width >= 4 {
        let [stage, tile] = *Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(tile_width)])
            .split(main)
        else {
            bail!("Failed to split the area");
        };
        return Ok(SessionAreas {
            stage,
            tile: Some(tile),
            chat,
        });
    }

    Ok(SessionAreas {
        stage: main,
        tile: anchored_tile.then(|| anchored_corner(main)),
        chat,
    })
}

/// Small bottom-right anchor for the secondary tile in the full layout.
fn anchored_corner(area: Rect) -> Rect {
    let [column] = Layout::horizontal([Constraint::Length(26.min(area.width / 3))])
        .flex(Flex::End)
        .horizontal_margin(2)
        .areas(area);
    let [tile] = Layout::vertical([Constraint::Length(7.min(area.height / 3))])
        .flex(Flex::End)
        .vertical_margin(1)
        .areas(column);
    tile
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const AREA: Rect = Rect {
        x: 0,
        y: 0,
        width: 120,
        height: 40,
    };

    #[test]
    fn closed_panel_gives_the_stage_everything() {
        let areas = session_areas(AREA, 0, 0.0, false).unwrap();
        assert_eq!(areas.stage, AREA);
        assert_eq!(areas.tile, None);
        assert_eq!(areas.chat, None);
    }

    #[test]
    fn open_panel_takes_its_width_from_the_right() {
        let areas = session_areas(AREA, CHAT_PANEL_WIDTH, 0.0, false).unwrap();
        let chat = areas.chat.unwrap();
        assert_eq!(chat.width, CHAT_PANEL_WIDTH);
        assert_eq!(chat.x, AREA.width - CHAT_PANEL_WIDTH);
        assert_eq!(areas.stage.width, AREA.width - CHAT_PANEL_WIDTH);
    }

    #[test]
    fn split_puts_stage_and_tile_on_the_same_row() {
        let areas = session_areas(AREA, CHAT_PANEL_WIDTH, TILE_SPLIT_FRACTION, false).unwrap();
        let tile = areas.tile.unwrap();
        assert_eq!(areas.stage.y, tile.y);
        assert_eq!(areas.stage.height, tile.height);
        assert_eq!(areas.stage.right(), tile.left());
    }

    #[test]
    fn anchored_tile_sits_inside_the_stage_bottom_right() {
        let areas = session_areas(AREA, 0, 0.0, true).unwrap();
        let tile = areas.tile.unwrap();
        assert_eq!(areas.stage, AREA);
        assert!(tile.right() <= AREA.right());
        assert!(tile.bottom() <= AREA.bottom());
        assert!(tile.x > AREA.width / 2);
        assert!(tile.y > AREA.height / 2);
    }

    #[test]
    fn mid_transition_widths_interpolate() {
        let half_open = session_areas(AREA, CHAT_PANEL_WIDTH / 2, 0.0, false).unwrap();
        assert_eq!(half_open.chat.unwrap().width, CHAT_PANEL_WIDTH / 2);

        let quarter_split = session_areas(AREA, 0, TILE_SPLIT_FRACTION / 2.0, false).unwrap();
        let tile = quarter_split.tile.unwrap();
        assert_eq!(tile.width, (f64::from(AREA.width) * TILE_SPLIT_FRACTION / 2.0).round() as u16);
    }

    #[test]
    fn tiny_areas_still_keep_a_stage() {
        let tiny = Rect {
            x: 0,
            y: 0,
            width: 30,
            height: 10,
        };
        let areas = session_areas(tiny, CHAT_PANEL_WIDTH, 0.0, false).unwrap();
        assert!(areas.stage.width >= 20);
    }
}
