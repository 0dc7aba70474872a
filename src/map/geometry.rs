use glam::DVec2;

/// Closed ring of (lon, lat) vertices
pub type Ring = Vec<DVec2>;

/// Geographic bounding box in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: DVec2,
    pub max: DVec2,
}

impl Bounds {
    /// Bounds of all vertices, `None` when there are none
    pub fn of_rings<'a>(rings: impl IntoIterator<Item = &'a Ring>) -> Option<Self> {
        let mut points = rings.into_iter().flatten();
        let first = *points.next()?;
        let (min, max) = points.fold((first, first), |(min, max), p| (min.min(*p), max.max(*p)));
        Some(Self { min, max })
    }

    #[inline(always)]
    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// Even-odd test over every ring, so holes and multi-part shapes need no
/// special casing.
pub fn rings_contain(rings: &[Ring], p: DVec2) -> bool {
    let mut inside = false;
    for ring in rings {
        let n = ring.len();
        if n < 3 {
            continue;
        }
        let mut j = n - 1;
        for i in 0..n {
            let (a, b) = (ring[i], ring[j]);
            if (a.y > p.y) != (b.y > p.y) {
                let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
                if p.x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, size: f64) -> Ring {
        vec![
            DVec2::new(x0, y0),
            DVec2::new(x0 + size, y0),
            DVec2::new(x0 + size, y0 + size),
            DVec2::new(x0, y0 + size),
            DVec2::new(x0, y0),
        ]
    }

    #[test]
    fn test_point_in_square() {
        let rings = vec![square(0.0, 0.0, 10.0)];
        assert!(rings_contain(&rings, DVec2::new(5.0, 5.0)));
        assert!(!rings_contain(&rings, DVec2::new(15.0, 5.0)));
        assert!(!rings_contain(&rings, DVec2::new(5.0, -1.0)));
    }

    #[test]
    fn test_hole_is_outside() {
        let rings = vec![square(0.0, 0.0, 10.0), square(4.0, 4.0, 2.0)];
        assert!(!rings_contain(&rings, DVec2::new(5.0, 5.0)));
        assert!(rings_contain(&rings, DVec2::new(1.0, 1.0)));
    }

    #[test]
    fn test_bounds() {
        let rings = vec![square(-3.0, 2.0, 4.0)];
        let bounds = Bounds::of_rings(&rings).unwrap();
        assert_eq!(bounds.min, DVec2::new(-3.0, 2.0));
        assert_eq!(bounds.max, DVec2::new(1.0, 6.0));
        assert!(bounds.contains(DVec2::new(0.0, 3.0)));
        assert!(Bounds::of_rings(&Vec::<Ring>::new()).is_none());
    }
}
