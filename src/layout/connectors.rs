// Connection points along node box sides.
//
// A count `n` for a side pair splits each side into `n` equal segments and
// puts one point in the middle of each segment, i.e. at fraction
// (2i - 1) / (2n) along the side for i in 1..=n.
//
// - vertical count: left and right sides (y varies)
// - horizontal count: bottom and top sides (x varies)
//
// Points come out per index, first side then opposite side, vertical pairs
// before horizontal pairs. "Bottom" is the side with the smaller y.

use serde::Serialize;

use super::RectF;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
    Bottom,
    Top,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct ConnectionPoint {
    pub side: Side,
    pub x: f64,
    pub y: f64,
}

/// Fractions along a side for `count` points.
fn subdivisions(count: u32) -> impl Iterator<Item = f64> {
    let denom = 2.0 * f64::from(count);
    (1..=count).map(move |i| (2.0 * f64::from(i) - 1.0) / denom)
}

pub fn connection_points(bounds: &RectF, horizontal: u32, vertical: u32) -> Vec<ConnectionPoint> {
    let mut points = Vec::with_capacity(2 * (horizontal + vertical) as usize);

    for t in subdivisions(vertical) {
        let y = bounds.y + t * bounds.h;
        points.push(ConnectionPoint { side: Side::Left, x: bounds.x, y });
        points.push(ConnectionPoint { side: Side::Right, x: bounds.right(), y });
    }

    for t in subdivisions(horizontal) {
        let x = bounds.x + t * bounds.w;
        points.push(ConnectionPoint { side: Side::Bottom, x, y: bounds.y });
        points.push(ConnectionPoint { side: Side::Top, x, y: bounds.top() });
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> RectF {
        RectF { x: 0.0, y: 0.0, w: 4.0, h: 2.0 }
    }

    #[test]
    fn test_single_point_per_side_is_midpoint() {
        let pts = connection_points(&unit_box(), 1, 1);
        assert_eq!(
            pts,
            vec![
                ConnectionPoint { side: Side::Left, x: 0.0, y: 1.0 },
                ConnectionPoint { side: Side::Right, x: 4.0, y: 1.0 },
                ConnectionPoint { side: Side::Bottom, x: 2.0, y: 0.0 },
                ConnectionPoint { side: Side::Top, x: 2.0, y: 2.0 },
            ]
        );
    }

    #[test]
    fn test_subdivision_fractions() {
        let pts = connection_points(&unit_box(), 4, 0);
        let bottom: Vec<f64> = pts.iter().filter(|p| p.side == Side::Bottom).map(|p| p.x).collect();
        assert_eq!(bottom, vec![0.5, 1.5, 2.5, 3.5]);
        assert_eq!(pts.len(), 8);
    }

    #[test]
    fn test_counts_and_offsets() {
        let r = RectF { x: 10.0, y: 20.0, w: 1.5, h: 0.75 };
        let pts = connection_points(&r, 5, 3);
        assert_eq!(pts.len(), 16);
        assert!(pts[..6].iter().all(|p| matches!(p.side, Side::Left | Side::Right)));
        assert!(pts[6..].iter().all(|p| matches!(p.side, Side::Bottom | Side::Top)));
        assert!(pts.iter().all(|p| p.x >= r.x && p.x <= r.right() && p.y >= r.y && p.y <= r.top()));
    }

    #[test]
    fn test_zero_counts_yield_nothing() {
        assert!(connection_points(&unit_box(), 0, 0).is_empty());
    }
}
