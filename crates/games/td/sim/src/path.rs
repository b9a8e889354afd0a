//! Path geometry: a Catmull-Rom curve through sparse control points, resampled by
//! arc length so that equal steps in `t` cover equal distance on screen.

use glam::Vec2;

/// Minimum number of samples emitted per spline segment.
const MIN_SEGMENT_SAMPLES: usize = 8;

/// Cumulative distance along a polyline, one entry per point.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ArcLengthTable {
    cumulative: Vec<f32>,
    total: f32,
}

impl ArcLengthTable {
    pub fn cumulative(&self) -> &[f32] {
        &self.cumulative
    }

    /// Length of the polyline, never below 1.
    pub fn total(&self) -> f32 {
        self.total
    }
}

/// Dense sample points of the path plus their arc-length table.
///
/// Built once per run and only read afterwards.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathCurve {
    points: Vec<Vec2>,
    table: ArcLengthTable,
}

impl PathCurve {
    pub fn build(control: &[Vec2], sample_density: usize) -> Self {
        Self::from_points(catmull_rom(control, sample_density))
    }

    pub fn from_points(points: Vec<Vec2>) -> Self {
        let table = arc_length_table(&points);
        Self { points, table }
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn table(&self) -> &ArcLengthTable {
        &self.table
    }

    pub fn total_length(&self) -> f32 {
        self.table.total
    }

    pub fn start(&self) -> Vec2 {
        self.points.first().copied().unwrap_or(Vec2::ZERO)
    }

    pub fn end(&self) -> Vec2 {
        self.points.last().copied().unwrap_or(Vec2::ZERO)
    }

    /// Position at normalized progress `t`, measured by arc length.
    pub fn sample_at(&self, t: f32) -> Vec2 {
        let points = &self.points;
        let cumulative = &self.table.cumulative;
        match points.len() {
            0 => return Vec2::ZERO,
            1 => return points[0],
            _ => {}
        }

        let s = t * self.table.total;
        // First segment whose far end reaches `s`; the table is non-decreasing.
        let i = cumulative[1..]
            .partition_point(|&c| c < s)
            .min(points.len() - 1);

        let a = points[i];
        let Some(&b) = points.get(i + 1) else {
            return a;
        };
        let mut seg = cumulative[i + 1] - cumulative[i];
        if seg == 0.0 {
            seg = 1.0;
        }
        let local = (s - cumulative[i]) / seg;
        a.lerp(b, local)
    }

    /// Whether `point` lies within `radius` of the curve, checking every `stride`-th
    /// sample segment.
    pub fn is_near(&self, point: Vec2, radius: f32, stride: usize) -> bool {
        (1..self.points.len())
            .step_by(stride.max(1))
            .any(|i| distance_to_segment(point, self.points[i - 1], self.points[i]) < radius)
    }
}

/// Samples a Catmull-Rom spline through `control`.
///
/// The first and last control points are duplicated so the curve starts on the first
/// one, and the last control point is appended so it ends exactly on the last one.
/// With fewer than two control points the input is returned unchanged.
pub fn catmull_rom(control: &[Vec2], samples: usize) -> Vec<Vec2> {
    let (Some(&first), Some(&last)) = (control.first(), control.last()) else {
        return Vec::new();
    };
    if control.len() < 2 {
        return control.to_vec();
    }

    let mut padded = Vec::with_capacity(control.len() + 2);
    padded.push(first);
    padded.extend_from_slice(control);
    padded.push(last);

    let segments = padded.len() - 3;
    let per_segment = (samples / segments).max(MIN_SEGMENT_SAMPLES);

    let mut out = Vec::with_capacity(segments * per_segment + 1);
    for w in padded.windows(4) {
        for j in 0..per_segment {
            let t = j as f32 / per_segment as f32;
            out.push(catmull_rom_point(w[0], w[1], w[2], w[3], t));
        }
    }
    out.push(last);
    out
}

fn catmull_rom_point(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, t: f32) -> Vec2 {
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * (2.0 * p1
        + (p2 - p0) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (3.0 * p1 - p0 - 3.0 * p2 + p3) * t3)
}

pub fn arc_length_table(points: &[Vec2]) -> ArcLengthTable {
    let mut cumulative = Vec::with_capacity(points.len());
    let mut acc = 0.0;
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            acc += p.distance(points[i - 1]);
        }
        cumulative.push(acc);
    }
    ArcLengthTable {
        cumulative,
        total: acc.max(1.0),
    }
}

fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let mut len_sq = ab.length_squared();
    if len_sq == 0.0 {
        len_sq = 1.0;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}
