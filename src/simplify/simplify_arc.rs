use crate::geom::Point;

/// The result of simplifying one arc at one tolerance.
#[derive(Clone, Debug)]
pub struct SimplifiedArc {
    pub points: Box<[Point]>,

    /// The largest deviation of any Point we dropped. Zero means nothing
    /// worth keeping was dropped: lowering the tolerance won't add Points.
    pub max_rejected: f64,

    /// The tolerance `points` were computed with.
    pub tolerance: f64,
}

/// Distance from `p` to the line through `start` and `end`.
///
/// When `start == end` (a closed arc) there is no line, so this is the
/// distance from `p` to `start`.
pub fn deviation(p: Point, start: Point, end: Point) -> f64 {
    let (dx, dy) = (end.0 - start.0, end.1 - start.1);
    let (px, py) = (p.0 - start.0, p.1 - start.1);

    if start == end {
        px.hypot(py)
    } else {
        (dx * py - dy * px).abs() / dx.hypot(dy)
    }
}

/// Returns a simpler version of the given arc (Douglas-Peucker).
///
/// The first and last Points always stay. A Point stays if its deviation
/// from the chord of the range it sits in is strictly greater than
/// `tolerance`; then both halves are simplified the same way. At tolerance 0
/// only exactly collinear Points go.
pub fn simplify_arc(points: &[Point], tolerance: f64) -> SimplifiedArc {
    let len = points.len();

    if len <= 2 {
        return SimplifiedArc { points: points.into(), max_rejected: 0.0, tolerance };
    }

    let mut keep = vec![false; len];
    keep[0] = true;
    keep[len - 1] = true;
    let mut max_rejected: f64 = 0.0;

    // Ranges left to look at, inclusive. A stack keeps us off the call stack.
    let mut ranges = vec![ (0, len - 1) ];

    while let Some((start, end)) = ranges.pop() {
        if end <= start + 1 {
            continue;
        }

        let (index, distance) = (start + 1 .. end)
            .map(|i| (i, deviation(points[i], points[start], points[end])))
            .fold((start, -1.0), |best, candidate| if candidate.1 > best.1 { candidate } else { best });

        if distance > tolerance {
            keep[index] = true;
            ranges.push((index, end));
            ranges.push((start, index));
        } else {
            max_rejected = max_rejected.max(distance);
        }
    }

    let kept: Vec<Point> = points.iter()
        .zip(keep)
        .filter(|&(_, k)| k)
        .map(|(&p, _)| p)
        .collect();

    SimplifiedArc { points: kept.into_boxed_slice(), max_rejected, tolerance }
}

#[cfg(test)]
mod test {
    use crate::geom::Point;
    use super::{deviation, simplify_arc};

    fn p(x: f64, y: f64) -> Point { Point(x, y) }

    fn go(points: &[Point], tolerance: f64) -> Vec<Point> {
        simplify_arc(points, tolerance).points.into_vec()
    }

    #[test]
    fn two_points_not_changed() {
        assert_eq!(vec![ p(1.0, 1.0), p(2.0, 2.0) ], go(&[ p(1.0, 1.0), p(2.0, 2.0) ], 100.0));
    }

    #[test]
    fn collinear_points_collapse() {
        let points = [ p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0), p(3.0, 0.0), p(4.0, 0.0) ];
        assert_eq!(vec![ p(0.0, 0.0), p(4.0, 0.0) ], go(&points, 0.5));
    }

    #[test]
    fn zero_tolerance_drops_only_collinear_points() {
        let points = [ p(0.0, 0.0), p(1.0, 0.0), p(2.0, 1.0), p(3.0, 2.0), p(4.0, 0.0) ];
        assert_eq!(
            vec![ p(0.0, 0.0), p(1.0, 0.0), p(3.0, 2.0), p(4.0, 0.0) ],
            go(&points, 0.0)
        );
    }

    #[test]
    fn small_tolerance_keeps_everything() {
        let points = [ p(0.0, 0.0), p(1.0, 0.1), p(2.0, -0.1), p(3.0, 0.2), p(4.0, 0.0) ];
        assert_eq!(points.to_vec(), go(&points, 0.01));
    }

    #[test]
    fn zigzag_keeps_peaks() {
        let points = [ p(0.0, 0.0), p(1.0, 0.1), p(2.0, 5.0), p(3.0, 0.1), p(4.0, 0.0) ];
        assert_eq!(vec![ p(0.0, 0.0), p(2.0, 5.0), p(4.0, 0.0) ], go(&points, 1.0));
    }

    #[test]
    fn reports_largest_rejected_deviation() {
        let points = [ p(0.0, 0.0), p(1.0, 0.5), p(2.0, -0.25), p(4.0, 0.0) ];
        let arc = simplify_arc(&points, 1.0);
        assert_eq!(2, arc.points.len());
        assert_eq!(0.5, arc.max_rejected);
        assert_eq!(1.0, arc.tolerance);
    }

    #[test]
    fn nothing_rejected_when_nothing_dropped() {
        let points = [ p(0.0, 0.0), p(1.0, 3.0), p(2.0, 0.0) ];
        let arc = simplify_arc(&points, 1.0);
        assert_eq!(3, arc.points.len());
        assert_eq!(0.0, arc.max_rejected);
    }

    #[test]
    fn closed_arc_measures_from_start() {
        // A loop with no junctions: the chord is a single Point.
        let points = [ p(0.0, 0.0), p(0.0, 1.0), p(3.0, 1.0), p(1.0, 0.0), p(0.0, 0.0) ];
        assert_eq!(
            vec![ p(0.0, 0.0), p(3.0, 1.0), p(0.0, 0.0) ],
            go(&points, 1.5)
        );
    }

    #[test]
    fn deviation_of_degenerate_chord() {
        assert_eq!(5.0, deviation(p(3.0, 4.0), p(0.0, 0.0), p(0.0, 0.0)));
    }

    #[test]
    fn deviation_is_perpendicular() {
        assert_eq!(2.0, deviation(p(7.0, 2.0), p(0.0, 0.0), p(4.0, 0.0)));
        assert_eq!(2.0, deviation(p(7.0, -2.0), p(4.0, 0.0), p(0.0, 0.0)));
    }
}
