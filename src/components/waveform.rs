use crate::theme::Theme;
use pitch_tank_session::{
    analysis::{
        waveform_points,
        AnalysisTap,
        WAVEFORM_SAMPLES,
    },
    track::AudioTrackHandle,
};
use ratatui::{
    layout::Rect,
    symbols,
    widgets::canvas::{
        Canvas,
        Line as CanvasLine,
    },
    Frame,
};

/// Scrolling waveform bound to at most one audio handle at a time.
///
/// Not a [`Component`](super::Component): the agent stage owns it and drives
/// it from its own render tick, because binding follows presence rather than
/// actions.
#[derive(Debug)]
pub(crate) struct Waveform {
    bound: Option<AudioTrackHandle>,
    tap: Option<AnalysisTap>,
    samples: Vec<u8>,
    live: bool,
}

impl Waveform {
    pub(crate) fn new() -> Self {
        Self {
            bound: None,
            tap: None,
            // 128 is the center line, so a fresh buffer renders flat.
            samples: vec![128; WAVEFORM_SAMPLES],
            live: false,
        }
    }

    /// Follow the current audio handle. The analysis tap is opened once per
    /// handle instance and released exactly once when the handle changes or
    /// goes away; a failed open stays idle without retrying every tick.
    pub(crate) fn bind(&mut self, handle: Option<&AudioTrackHandle>) {
        if self.bound.as_ref() == handle {
            return;
        }

        if let Some(tap) = self.tap.take() {
            tap.release();
        }
        self.samples.fill(128);
        self.live = false;
        self.bound = handle.cloned();
        self.tap = handle.cloned().and_then(AnalysisTap::open);
    }

    /// One iteration of the draw loop. Does nothing once unbound.
    pub(crate) fn render_tick(&mut self) {
        match &self.tap {
            Some(tap) => {
                self.live = tap.read(&mut self.samples);
                if !self.live {
                    // Video-only or not yet negotiated: idle frame.
                    self.samples.fill(128);
                }
            }
            None => self.live = false,
        }
    }

    pub(crate) fn is_live(&self) -> bool {
        self.live
    }

    /// Plot the current frame. `amplitude` in `0..=1` scales the vertical
    /// offsets, which is how slot enter/exit transitions are rendered.
    pub(crate) fn draw(&self, frame: &mut Frame<'_>, area: Rect, theme: &Theme, amplitude: f64) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let width = f64::from(area.width);
        // Braille cells give four vertical dots per row.
        let height = f64::from(area.height) * 4.0;
        let points = waveform_points(&self.samples, width, height);

        let canvas = Canvas::default()
            .x_bounds([0.0, width])
            .y_bounds([-height / 2.0, height / 2.0])
            .marker(symbols::Marker::Braille)
            .paint(|ctx| {
                for pair in points.windows(2) {
                    let (x1, y1) = pair[0];
                    let (x2, y2) = pair[1];
                    ctx.draw(&CanvasLine {
                        x1,
                        y1: y1 * amplitude,
                        x2,
                        y2: y2 * amplitude,
                        color: theme.waveform,
                    });
                }
            });
        frame.render_widget(canvas, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitch_tank_session::track::AudioSampleSource;
    use pretty_assertions::assert_eq;
    use std::sync::{
        atomic::{
            AtomicBool,
            AtomicUsize,
            Ordering,
        },
        Arc,
    };

    #[derive(Default)]
    struct CountingSource {
        attached: AtomicUsize,
        detached: AtomicUsize,
        reads: AtomicUsize,
        refuse: AtomicBool,
    }

    impl AudioSampleSource for CountingSource {
        fn attach(&self) -> bool {
            if self.refuse.load(Ordering::SeqCst) {
                return false;
            }
            self.attached.fetch_add(1, Ordering::SeqCst);
            true
        }

        fn detach(&self) {
            self.detached.fetch_add(1, Ordering::SeqCst);
        }

        fn fill_waveform(&self, buf: &mut [u8]) -> bool {
            self.reads.fetch_add(1, Ordering::SeqCst);
            buf.fill(192);
            true
        }
    }

    fn counting_handle() -> (Arc<CountingSource>, AudioTrackHandle) {
        let source = Arc::new(CountingSource::default());
        (source.clone(), AudioTrackHandle::new(source))
    }

    #[test]
    fn binding_opens_the_tap_once_and_unbinding_releases_it_once() {
        let (source, handle) = counting_handle();
        let mut waveform = Waveform::new();

        waveform.bind(Some(&handle));
        waveform.bind(Some(&handle));
        assert_eq!(source.attached.load(Ordering::SeqCst), 1);

        waveform.render_tick();
        assert!(waveform.is_live());
        assert_eq!(source.reads.load(Ordering::SeqCst), 1);

        waveform.bind(None);
        waveform.bind(None);
        assert_eq!(source.detached.load(Ordering::SeqCst), 1);

        // The draw loop keeps ticking but never touches the released tap.
        waveform.render_tick();
        waveform.render_tick();
        assert!(!waveform.is_live());
        assert_eq!(source.reads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn handle_change_swaps_taps_with_one_release_each() {
        let (first_source, first) = counting_handle();
        let (second_source, second) = counting_handle();
        let mut waveform = Waveform::new();

        waveform.bind(Some(&first));
        waveform.bind(Some(&second));

        assert_eq!(first_source.detached.load(Ordering::SeqCst), 1);
        assert_eq!(second_source.attached.load(Ordering::SeqCst), 1);
        assert_eq!(second_source.detached.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn dropping_the_waveform_releases_an_open_tap() {
        let (source, handle) = counting_handle();
        {
            let mut waveform = Waveform::new();
            waveform.bind(Some(&handle));
        }
        assert_eq!(source.detached.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn refused_taps_degrade_to_idle_without_retrying() {
        let (source, handle) = counting_handle();
        source.refuse.store(true, Ordering::SeqCst);

        let mut waveform = Waveform::new();
        waveform.bind(Some(&handle));
        waveform.render_tick();
        waveform.render_tick();

        assert!(!waveform.is_live());
        assert_eq!(source.attached.load(Ordering::SeqCst), 0);
        assert_eq!(source.reads.load(Ordering::SeqCst), 0);
        assert_eq!(source.detached.load(Ordering::SeqCst), 0);
    }
}
