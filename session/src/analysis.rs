use crate::track::AudioTrackHandle;

/// Number of samples a waveform frame carries by default.
pub const WAVEFORM_SAMPLES: usize = 64;

/// An open analysis tap on a live audio track.
///
/// Opened at most once per handle instance and released exactly once, either
/// explicitly or on drop, whichever comes first. Every exit path releases.
#[derive(Debug)]
pub struct AnalysisTap {
    handle: AudioTrackHandle,
    released: bool,
}

impl AnalysisTap {
    /// Open a tap on `handle`. Returns `None` when the platform cannot
    /// provide analysis data for this track; the caller degrades to an idle
    /// frame in that case.
    pub fn open(handle: AudioTrackHandle) -> Option<Self> {
        if !handle.source().attach() {
            debug!(sid = %handle.sid(), "audio analysis unavailable for track");
            return None;
        }
        Some(Self { handle, released: false })
    }

    pub fn handle(&self) -> &AudioTrackHandle {
        &self.handle
    }

    /// Fill `buf` with the latest time-domain samples. Returns `false` when
    /// the media has produced no audio yet; the frame should render idle.
    pub fn read(&self, buf: &mut [u8]) -> bool {
        self.handle.source().fill_waveform(buf)
    }

    pub fn release(mut self) {
        self.release_once();
    }

    fn release_once(&mut self) {
        if !self.released {
            self.released = true;
            self.handle.source().detach();
        }
    }
}

impl Drop for AnalysisTap {
    fn drop(&mut self) {
        self.release_once();
    }
}

/// Vertical offset of one 8-bit sample relative to the center line:
/// `(sample/128 − 1) * height/2`, so 128 plots on the axis.
pub fn sample_offset(sample: u8, height: f64) -> f64 {
    (f64::from(sample) / 128.0 - 1.0) * height / 2.0
}

/// Horizontal distance between consecutive samples across a draw surface.
pub fn sample_step(width: f64, sample_count: usize) -> f64 {
    width / sample_count as f64
}

/// Map one frame of samples to `(x, offset)` plot points, left to right.
/// Consecutive points are meant to be joined by straight segments.
pub fn waveform_points(samples: &[u8], width: f64, height: f64) -> Vec<(f64, f64)> {
    let step = sample_step(width, samples.len());
    samples
        .iter()
        .enumerate()
        .map(|(index, sample)| (step * index as f64, sample_offset(*sample, height)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::AudioSampleSource;
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
            buf.fill(128);
            true
        }
    }

    #[test]
    fn tap_releases_exactly_once_on_explicit_release_and_drop() {
        let source = Arc::new(CountingSource::default());
        let handle = AudioTrackHandle::new(source.clone());

        let tap = AnalysisTap::open(handle.clone()).unwrap();
        assert_eq!(source.attached.load(Ordering::SeqCst), 1);
        tap.release();
        assert_eq!(source.detached.load(Ordering::SeqCst), 1);

        // Drop path.
        drop(AnalysisTap::open(handle).unwrap());
        assert_eq!(source.attached.load(Ordering::SeqCst), 2);
        assert_eq!(source.detached.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn refused_attach_creates_no_tap_and_no_release() {
        let source = Arc::new(CountingSource::default());
        source.refuse.store(true, Ordering::SeqCst);
        let handle = AudioTrackHandle::new(source.clone());

        assert!(AnalysisTap::open(handle).is_none());
        assert_eq!(source.attached.load(Ordering::SeqCst), 0);
        assert_eq!(source.detached.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn sample_to_pixel_mapping_matches_the_center_line_convention() {
        let height = 40.0;
        let points = waveform_points(&[128, 192, 64, 128], 100.0, height);

        let xs: Vec<f64> = points.iter().map(|(x, _)| *x).collect();
        let offsets: Vec<f64> = points.iter().map(|(_, y)| *y).collect();

        assert_eq!(xs, vec![0.0, 25.0, 50.0, 75.0]);
        assert_eq!(offsets, vec![0.0, height / 4.0, -(height / 4.0), 0.0]);
    }

    #[test]
    fn extreme_samples_span_half_the_height_each_way() {
        let height = 10.0;
        assert_eq!(sample_offset(0, height), -5.0);
        assert_eq!(sample_offset(128, height), 0.0);
        // 255 undershoots +height/2 by one quantization step.
        assert!(sample_offset(255, height) > 4.9 && sample_offset(255, height) < 5.0);
    }
}
