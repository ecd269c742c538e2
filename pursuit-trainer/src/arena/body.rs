use rand::Rng;

use std::f32::consts::{FRAC_1_SQRT_2, TAU};

/// A square entity, positioned by its top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    pub x: f32,
    pub y: f32,
}

impl Body {
    pub fn new(x: f32, y: f32) -> Body {
        Body { x, y }
    }
}

/// One of the eight moves available to an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

impl Direction {
    /// Every direction, in the order monster
    /// networks vote for them.
    pub const ALL: [Direction; 8] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
        Direction::UpLeft,
        Direction::UpRight,
        Direction::DownLeft,
        Direction::DownRight,
    ];

    /// Returns the displacement of a unit-speed move.
    /// Diagonal moves cover the same distance as straight ones.
    pub fn offset(self) -> (f32, f32) {
        let d = FRAC_1_SQRT_2;
        match self {
            Direction::Up => (0.0, -1.0),
            Direction::Down => (0.0, 1.0),
            Direction::Left => (-1.0, 0.0),
            Direction::Right => (1.0, 0.0),
            Direction::UpLeft => (-d, -d),
            Direction::UpRight => (d, -d),
            Direction::DownLeft => (-d, d),
            Direction::DownRight => (d, d),
        }
    }

    /// Returns the direction voted for by the highest of
    /// `outputs`, the first one winning ties. Outputs past
    /// the eighth are ignored.
    pub fn strongest(outputs: &[f32]) -> Option<Direction> {
        let mut best: Option<(f32, Direction)> = None;
        for (&output, direction) in outputs.iter().zip(Direction::ALL) {
            if output.is_nan() {
                continue;
            }
            if best.map_or(true, |(highest, _)| output > highest) {
                best = Some((output, direction));
            }
        }
        best.map(|(_, direction)| direction)
    }

    /// Reads a two-axis command: the first output moves
    /// up when at least 0.6 and down when at most 0.4, the
    /// second moves right and left under the same thresholds.
    /// Anything in between holds that axis still.
    pub fn from_axes(outputs: &[f32]) -> Option<Direction> {
        let axis = |value: Option<&f32>| match value {
            Some(&v) if v >= 0.6 => 1,
            Some(&v) if v <= 0.4 => -1,
            _ => 0,
        };
        let vertical = -axis(outputs.first());
        let horizontal = axis(outputs.get(1));
        Direction::from_signs(horizontal, vertical)
    }

    /// Returns the direction bringing `from` closer to `to`.
    pub fn towards(from: &Body, to: &Body) -> Option<Direction> {
        let sign = |delta: f32| {
            if delta > f32::EPSILON {
                1
            } else if delta < -f32::EPSILON {
                -1
            } else {
                0
            }
        };
        Direction::from_signs(sign(to.x - from.x), sign(to.y - from.y))
    }

    /// Screen coordinates: positive `vertical` points down.
    fn from_signs(horizontal: i8, vertical: i8) -> Option<Direction> {
        match (horizontal, vertical) {
            (0, -1) => Some(Direction::Up),
            (0, 1) => Some(Direction::Down),
            (-1, 0) => Some(Direction::Left),
            (1, 0) => Some(Direction::Right),
            (-1, -1) => Some(Direction::UpLeft),
            (1, -1) => Some(Direction::UpRight),
            (-1, 1) => Some(Direction::DownLeft),
            (1, 1) => Some(Direction::DownRight),
            _ => None,
        }
    }
}

/// The playable area below the stats band, and the
/// size of the entities moving in it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Field {
    pub width: f32,
    pub height: f32,
    /// Height of the band at the top of the screen
    /// entities can't enter.
    pub top: f32,
    pub entity_size: f32,
}

impl Field {
    /// Moves `body` `speed` units in `direction`,
    /// stopping at the edges.
    pub fn step(&self, body: &mut Body, direction: Direction, speed: f32) {
        let (dx, dy) = direction.offset();
        body.x += dx * speed;
        body.y += dy * speed;
        self.clamp(body);
    }

    /// Brings `body` back inside the field.
    pub fn clamp(&self, body: &mut Body) {
        body.x = body.x.min(self.width - self.entity_size).max(0.0);
        body.y = body.y.min(self.height - self.entity_size).max(self.top);
    }

    /// Whether `body` is against any edge of the field.
    pub fn touches_wall(&self, body: &Body) -> bool {
        body.x <= 0.0
            || body.y <= self.top
            || body.x + self.entity_size >= self.width
            || body.y + self.entity_size >= self.height
    }

    pub fn overlaps(&self, a: &Body, b: &Body) -> bool {
        (a.x - b.x).abs() < self.entity_size && (a.y - b.y).abs() < self.entity_size
    }
}

/// Scripted random walk for players without a network:
/// a heading that drifts a little every step and bounces
/// off the edges, slowing to a halt on impact.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Wander {
    vx: f32,
    vy: f32,
    speed: f32,
}

impl Wander {
    pub fn new<R: Rng + ?Sized>(speed: f32, rng: &mut R) -> Wander {
        let angle = rng.gen_range(0.0..TAU);
        Wander {
            vx: angle.cos() * speed,
            vy: angle.sin() * speed,
            speed,
        }
    }

    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        body: &mut Body,
        field: &Field,
        max_speed: f32,
        rng: &mut R,
    ) {
        body.x += self.vx;
        body.y += self.vy;

        self.speed = (self.speed + max_speed / 500.0).min(max_speed);
        let jitter = 0.05 * self.speed;
        self.vx += rng.gen_range(-jitter..=jitter);
        self.vy += rng.gen_range(-jitter..=jitter);
        let norm = self.vx.hypot(self.vy);
        if norm > 0.0 {
            self.vx *= self.speed / norm;
            self.vy *= self.speed / norm;
        }

        let inside = *body;
        field.clamp(body);
        if body.x != inside.x {
            self.vx = -self.vx;
            self.speed = 0.0;
        }
        if body.y != inside.y {
            self.vy = -self.vy;
            self.speed = 0.0;
        }
    }
}
