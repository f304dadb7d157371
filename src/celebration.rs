use rand::seq::SliceRandom;
use rand::Rng;

const SPARKS: [char; 6] = ['*', '+', '✦', '✧', '·', '◆'];
const BANNERS: [&str; 4] = ["NEW BEST!", "RECORD!", "UNSTOPPABLE!", "TOP SCORE!"];

/// Gravity applied to loose sparks, in cells per second squared
const GRAVITY: f64 = 12.0;

/// A single glyph in the new-best burst
#[derive(Debug, Clone)]
pub struct Spark {
    pub x: f64,
    pub y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub symbol: char,
    pub color_index: usize,
    pub age: f64,
    pub max_age: f64,
    /// Letter of the banner; flies to `home` and stays there
    pub home: Option<(f64, f64)>,
}

impl Spark {
    fn loose<R: Rng + ?Sized>(x: f64, y: f64, rng: &mut R) -> Self {
        Self {
            x,
            y,
            vel_x: rng.gen_range(-3.0..3.0),
            vel_y: rng.gen_range(-4.0..-1.0),
            symbol: *SPARKS.choose(rng).unwrap_or(&'*'),
            color_index: rng.gen_range(0..6),
            age: 0.0,
            max_age: rng.gen_range(1.5..3.0),
            home: None,
        }
    }

    fn letter<R: Rng + ?Sized>(
        from: (f64, f64),
        home: (f64, f64),
        symbol: char,
        rng: &mut R,
    ) -> Self {
        Self {
            x: from.0,
            y: from.1,
            vel_x: home.0 - from.0,
            vel_y: home.1 - from.1,
            symbol,
            color_index: rng.gen_range(0..6),
            age: 0.0,
            max_age: rng.gen_range(3.0..4.0),
            home: Some(home),
        }
    }

    /// Returns false once the spark has burnt out
    fn update(&mut self, dt: f64) -> bool {
        match self.home {
            Some((hx, hy)) => {
                let dist = ((hx - self.x).powi(2) + (hy - self.y).powi(2)).sqrt();
                if dist > 0.5 {
                    self.x += self.vel_x * dt;
                    self.y += self.vel_y * dt;
                    self.vel_x *= 0.95;
                    self.vel_y *= 0.95;
                } else {
                    self.x = hx;
                    self.y = hy;
                    self.vel_x = 0.0;
                    self.vel_y = 0.0;
                }
            }
            None => {
                self.x += self.vel_x * dt;
                self.y += self.vel_y * dt;
                self.vel_y += GRAVITY * dt;
            }
        }

        self.age += dt;
        self.age < self.max_age
    }

    pub fn is_letter(&self) -> bool {
        self.home.is_some()
    }
}

/// Short burst shown on the game-over screen when the best score falls
#[derive(Debug)]
pub struct Celebration {
    pub sparks: Vec<Spark>,
    pub is_active: bool,
    elapsed: f64,
    duration: f64,
    width: f64,
    height: f64,
}

impl Celebration {
    pub fn new() -> Self {
        Self {
            sparks: Vec::new(),
            is_active: false,
            elapsed: 0.0,
            duration: 3.0,
            width: 80.0,
            height: 24.0,
        }
    }

    /// Start a burst centred in a `width` x `height` cell area
    pub fn start(&mut self, width: u16, height: u16) {
        let mut rng = rand::thread_rng();

        self.sparks.clear();
        self.is_active = true;
        self.elapsed = 0.0;
        self.width = width as f64;
        self.height = height as f64;

        let cx = self.width / 2.0;
        let cy = self.height / 2.0;

        let banner = BANNERS.choose(&mut rng).unwrap_or(&"NEW BEST!");
        let spacing = 2.0;
        let left = cx - (banner.chars().count() as f64 - 1.0) * spacing / 2.0;
        for (i, ch) in banner.chars().enumerate() {
            if ch == ' ' {
                continue;
            }
            let home = (left + i as f64 * spacing, cy - 2.0);
            let from = (cx + rng.gen_range(-10.0..10.0), cy + rng.gen_range(-5.0..5.0));
            self.sparks.push(Spark::letter(from, home, ch, &mut rng));
        }

        for _ in 0..25 {
            let x = cx + rng.gen_range(-15.0..15.0);
            let y = cy + rng.gen_range(-8.0..8.0);
            self.sparks.push(Spark::loose(x, y, &mut rng));
        }
    }

    /// Step the animation by `dt` seconds
    pub fn update(&mut self, dt: f64) {
        if !self.is_active {
            return;
        }

        self.elapsed += dt;
        if self.elapsed >= self.duration {
            self.stop();
            return;
        }

        let margin = 5.0;
        let (w, h) = (self.width, self.height);
        self.sparks.retain_mut(|spark| {
            let alive = spark.update(dt);
            if spark.is_letter() {
                return alive;
            }
            let off_screen = spark.y > h + margin || spark.x < -margin || spark.x > w + margin;
            alive && !off_screen
        });
    }

    pub fn stop(&mut self) {
        self.is_active = false;
        self.sparks.clear();
    }
}

impl Default for Celebration {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loose_spark_falls() {
        let mut rng = rand::thread_rng();
        let mut spark = Spark::loose(10.0, 10.0, &mut rng);
        let vel_y = spark.vel_y;

        assert!(spark.update(0.1));
        assert!(spark.vel_y > vel_y);
    }

    #[test]
    fn letter_settles_at_home() {
        let mut rng = rand::thread_rng();
        let mut spark = Spark::letter((0.0, 0.0), (10.0, 5.0), 'N', &mut rng);
        assert!(spark.is_letter());

        for _ in 0..10 {
            spark.update(0.1);
        }
        let dist = ((10.0 - spark.x).powi(2) + (5.0 - spark.y).powi(2)).sqrt();
        assert!(dist < 5.0);
    }

    #[test]
    fn starts_inactive() {
        let c = Celebration::new();
        assert!(!c.is_active);
        assert!(c.sparks.is_empty());
    }

    #[test]
    fn burst_has_letters_and_sparks() {
        let mut c = Celebration::new();
        c.start(80, 24);
        assert!(c.is_active);
        assert!(c.sparks.iter().any(|s| s.is_letter()));
        assert!(c.sparks.iter().any(|s| !s.is_letter()));
    }

    #[test]
    fn burst_ends_after_duration() {
        let mut c = Celebration::new();
        c.start(80, 24);
        for _ in 0..10 {
            c.update(0.1);
        }
        assert!(c.is_active);

        for _ in 0..25 {
            c.update(0.1);
        }
        assert!(!c.is_active);
        assert!(c.sparks.is_empty());
    }

    #[test]
    fn off_screen_sparks_are_dropped() {
        let mut c = Celebration::new();
        c.start(20, 10);
        c.sparks.push(Spark {
            x: 100.0,
            y: 100.0,
            vel_x: 0.0,
            vel_y: 0.0,
            symbol: '*',
            color_index: 0,
            age: 0.0,
            max_age: 10.0,
            home: None,
        });

        c.update(0.1);
        assert!(c
            .sparks
            .iter()
            .filter(|s| !s.is_letter())
            .all(|s| s.y <= 15.0 && s.x >= -5.0 && s.x <= 25.0));
    }
}
