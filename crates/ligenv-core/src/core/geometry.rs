use nalgebra::{Point2, Vector2};

pub type Point = Point2<f64>;

/// Axis-aligned rectangle in diagram coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

impl BoundingBox {
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point>,
    {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        Some(iter.fold(
            Self {
                min: first,
                max: first,
            },
            |mut acc, p| {
                acc.min.x = acc.min.x.min(p.x);
                acc.min.y = acc.min.y.min(p.y);
                acc.max.x = acc.max.x.max(p.x);
                acc.max.y = acc.max.y.max(p.y);
                acc
            },
        ))
    }

    pub fn padded(&self, padding: f64) -> Self {
        Self {
            min: Point::new(self.min.x - padding, self.min.y - padding),
            max: Point::new(self.max.x + padding, self.max.y + padding),
        }
    }

    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: Point::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn extent(&self) -> Vector2<f64> {
        self.max - self.min
    }
}

/// Mean position of a set of points, `None` for an empty set.
pub fn centroid<'a, I>(points: I) -> Option<Point>
where
    I: IntoIterator<Item = &'a Point>,
{
    let (sum, count) = points
        .into_iter()
        .fold((Vector2::zeros(), 0usize), |(sum, n), p| (sum + p.coords, n + 1));
    (count > 0).then(|| Point::from(sum / count as f64))
}
