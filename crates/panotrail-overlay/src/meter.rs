use crate::{OverlayPainter, Point2, Rect, Rgb};

const PEAK_MARK_WIDTH: f32 = 2.0;

pub trait Visualizer {
    fn redraw(&mut self, buffer: &[f32], painter: &mut dyn OverlayPainter);
}

#[derive(Clone, Debug)]
pub struct Histogram {
    bounds: Rect,
    bins: usize,
    color: Rgb,
}

impl Histogram {
    pub fn new(bounds: Rect, bins: usize, color: Rgb) -> Self {
        Self {
            bounds,
            bins: bins.max(1),
            color,
        }
    }
}

impl Visualizer for Histogram {
    fn redraw(&mut self, buffer: &[f32], painter: &mut dyn OverlayPainter) {
        if buffer.is_empty() {
            return;
        }
        let chunk = buffer.len().div_ceil(self.bins);
        let bar_width = self.bounds.width() / self.bins as f32;
        for (i, slice) in buffer.chunks(chunk).enumerate() {
            let level = slice.iter().map(|s| s.abs()).sum::<f32>() / slice.len() as f32;
            let height = level.clamp(0.0, 1.0) * self.bounds.height();
            let left = self.bounds.min.x + i as f32 * bar_width;
            let rect = Rect::from_min_max(
                Point2::new(left, self.bounds.max.y - height),
                Point2::new(left + bar_width, self.bounds.max.y),
            );
            painter.rect_filled(rect, self.color);
        }
    }
}

#[derive(Clone, Debug)]
pub struct RmsMeter {
    bounds: Rect,
    color: Rgb,
    peak_color: Rgb,
    decay: f32,
    level: f32,
    peak: f32,
}

impl RmsMeter {
    pub fn new(bounds: Rect, color: Rgb, peak_color: Rgb) -> Self {
        Self {
            bounds,
            color,
            peak_color,
            decay: 0.95,
            level: 0.0,
            peak: 0.0,
        }
    }

    pub fn with_decay(mut self, decay: f32) -> Self {
        self.decay = decay.clamp(0.0, 1.0);
        self
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn peak(&self) -> f32 {
        self.peak
    }
}

impl Visualizer for RmsMeter {
    fn redraw(&mut self, buffer: &[f32], painter: &mut dyn OverlayPainter) {
        self.level = if buffer.is_empty() {
            0.0
        } else {
            let power = buffer.iter().map(|s| s * s).sum::<f32>() / buffer.len() as f32;
            power.sqrt().min(1.0)
        };
        self.peak = self.level.max(self.peak * self.decay);

        let Rect { min, max } = self.bounds;
        let width = self.bounds.width();
        painter.rect_filled(
            Rect::from_min_max(min, Point2::new(min.x + self.level * width, max.y)),
            self.color,
        );
        let peak_x = min.x + self.peak * width;
        painter.rect_filled(
            Rect::from_min_max(
                Point2::new(peak_x - PEAK_MARK_WIDTH, min.y),
                Point2::new(peak_x, max.y),
            ),
            self.peak_color,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{OverlayCollector, OverlayShape};
    use approx::assert_relative_eq;

    fn bounds() -> Rect {
        Rect::from_min_max(Point2::new(0.0, 0.0), Point2::new(100.0, 50.0))
    }

    fn rects(collector: &OverlayCollector) -> Vec<Rect> {
        collector
            .shapes
            .iter()
            .filter_map(|shape| match shape {
                OverlayShape::Rect { rect, .. } => Some(*rect),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn histogram_bars_follow_amplitude() {
        let mut histogram = Histogram::new(bounds(), 4, Rgb::WHITE);
        let mut collector = OverlayCollector::default();
        histogram.redraw(&[0.0, 0.0, 0.5, -0.5, 1.0, -1.0, 0.25, 0.25], &mut collector);
        let bars = rects(&collector);
        assert_eq!(bars.len(), 4);
        let heights: Vec<f32> = bars.iter().map(Rect::height).collect();
        assert_eq!(heights, vec![0.0, 25.0, 50.0, 12.5]);
        assert_eq!(bars[1].min.x, 25.0);
        assert_eq!(bars[3].max.x, 100.0);
    }

    #[test]
    fn empty_buffer_draws_nothing() {
        let mut histogram = Histogram::new(bounds(), 8, Rgb::WHITE);
        let mut collector = OverlayCollector::default();
        histogram.redraw(&[], &mut collector);
        assert!(collector.shapes.is_empty());
    }

    #[test]
    fn rms_peak_holds_then_decays() {
        let mut meter = RmsMeter::new(bounds(), Rgb::WHITE, Rgb::new(255, 0, 0)).with_decay(0.5);
        let mut collector = OverlayCollector::default();
        meter.redraw(&[0.5, -0.5, 0.5, -0.5], &mut collector);
        assert_relative_eq!(meter.level(), 0.5);
        assert_relative_eq!(meter.peak(), 0.5);
        assert_eq!(rects(&collector)[0].width(), 50.0);

        meter.redraw(&[0.0; 4], &mut collector);
        assert_relative_eq!(meter.level(), 0.0);
        assert_relative_eq!(meter.peak(), 0.25);
    }
}
