use palette::Srgb;

use crate::options::FlameOptions;
use crate::pixels::PixelOutput;
use crate::random::RandomSource;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    /// About to start dimming
    Bright,
    /// Fading between `index_start` and `index_end`, in either direction
    Down,
    /// About to start brightening
    Dim,
    /// Pausing at a peak before dimming again
    BrightHold,
    /// Pausing at a trough before brightening again
    DimHold,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Dimming,
    Brightening,
}

/// One candle on one pixel.
pub struct Flame {
    id: usize,
    lit: bool,
    options: FlameOptions,
    brightness_index: i32,
    state: State,
    transition: Transition,
    index_start: i32,
    index_end: i32,
    transition_start: f64,
    transition_msecs: i32,
}

impl Flame {
    pub fn new(id: usize, pixel_count: usize, options: &FlameOptions) -> Flame {
        assert!(
            id < pixel_count,
            "flame {} does not fit on a strip of {} pixels",
            id,
            pixel_count
        );

        Flame {
            id,
            lit: false,
            options: options.clone(),
            brightness_index: options.index_max,
            state: State::Bright,
            transition: Transition::Dimming,
            index_start: options.index_max,
            index_end: options.index_max,
            transition_start: 0.0,
            transition_msecs: 0,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }

    /// Marks the flame for updates and shows its starting color.
    pub fn light(&mut self, pixels: &mut dyn PixelOutput) {
        self.lit = true;
        self.set_color(self.brightness_index, pixels);
    }

    #[cfg(test)]
    pub fn brightness_index(&self) -> i32 {
        self.brightness_index
    }

    #[cfg(test)]
    pub fn state(&self) -> State {
        self.state
    }

    /// Clamps `index` into the flame's range and writes the matching color.
    pub fn set_color(&mut self, index: i32, pixels: &mut dyn PixelOutput) {
        let index = index.clamp(self.options.index_bottom, self.options.index_max);
        pixels.set(self.id, self.color_for(index));
        self.brightness_index = index;
    }

    fn color_for(&self, index: i32) -> Srgb<u8> {
        // Dimmer flames get a bit more green, so they fade to a warmer red
        let green = if index >= self.options.index_min {
            index * 3 / 8
        } else {
            index * 13 / 32
        };

        Srgb::new(index as u8, green as u8, 0)
    }

    /// Advances the flicker by one tick.
    pub fn update(&mut self, now: f64, random: &mut dyn RandomSource, pixels: &mut dyn PixelOutput) {
        match self.state {
            State::Bright => {
                self.start_dimming(now, random);
                self.state = State::Down;
            }
            State::Dim => {
                self.start_brightening(now, random);
                self.state = State::Down;
            }
            State::Down => self.fade(now, random, pixels),
            State::DimHold => {
                if self.transition_over(now) {
                    self.state = State::Dim;
                }
            }
            State::BrightHold => {
                if self.transition_over(now) {
                    self.state = State::Bright;
                }
            }
        }
    }

    fn start_dimming(&mut self, now: f64, random: &mut dyn RandomSource) {
        let o = &self.options;
        self.transition_msecs = random.randint(o.down_min_msecs, o.down_max_msecs);
        self.transition_start = now;
        self.index_start = self.index_end;

        let dramatic = self.index_start > o.index_bottom && random.chance(o.index_bottom_percent);
        self.index_end = if dramatic {
            random.randint(o.index_bottom, self.index_start)
        } else {
            random.randint(o.index_min, self.index_start.max(o.index_min))
        };
        self.transition = Transition::Dimming;
    }

    fn start_brightening(&mut self, now: f64, random: &mut dyn RandomSource) {
        let o = &self.options;
        self.transition_msecs = random.randint(o.up_min_msecs, o.up_max_msecs);
        self.transition_start = now;
        self.index_start = self.index_end;

        let offset = random.randint(0, o.index_max - self.index_start);
        self.index_end = (o.index_min + offset).clamp(self.index_start, o.index_max);
        self.transition = Transition::Brightening;
    }

    fn fade(&mut self, now: f64, random: &mut dyn RandomSource, pixels: &mut dyn PixelOutput) {
        if !self.transition_over(now) {
            let duration = self.transition_msecs as f64 / 1000.0;
            let progress = (now - self.transition_start) / duration;
            let index_range = (self.index_end - self.index_start) as f64;
            self.set_color(self.index_start + (index_range * progress) as i32, pixels);
            return;
        }

        self.set_color(self.index_end, pixels);

        let o = &self.options;
        match self.transition {
            Transition::Dimming => {
                if random.chance(o.dim_hold_percent) {
                    let msecs = random.randint(o.dim_hold_min_msecs, o.dim_hold_max_msecs);
                    self.hold(now, msecs, State::DimHold);
                } else {
                    self.state = State::Dim;
                }
            }
            Transition::Brightening => {
                if random.chance(o.bright_hold_percent) {
                    let msecs = random.randint(o.bright_hold_min_msecs, o.bright_hold_max_msecs);
                    self.hold(now, msecs, State::BrightHold);
                } else {
                    self.state = State::Bright;
                }
            }
        }
    }

    fn hold(&mut self, now: f64, msecs: i32, state: State) {
        self.transition_start = now;
        self.transition_msecs = msecs;
        self.state = state;
    }

    fn transition_over(&self, now: f64) -> bool {
        now >= self.transition_start + self.transition_msecs as f64 / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::pixels::PixelBuffer;
    use crate::random::tests::{Midpoint, Scripted};
    use crate::random::SeededRandom;

    fn flame() -> (Flame, PixelBuffer) {
        (Flame::new(0, 8, &FlameOptions::default()), PixelBuffer::new(8, 1.0))
    }

    fn without_holds() -> FlameOptions {
        FlameOptions {
            bright_hold_percent: 0,
            dim_hold_percent: 0,
            ..FlameOptions::default()
        }
    }

    #[test]
    fn starts_bright_and_dark() {
        let (flame, pixels) = flame();
        assert!(!flame.is_lit());
        assert_eq!(flame.state(), State::Bright);
        assert_eq!(flame.brightness_index(), 255);
        assert_eq!(flame.index_start, 255);
        assert_eq!(flame.index_end, 255);
        assert_eq!(pixels.get(0), Srgb::new(0, 0, 0));
    }

    #[test]
    fn lighting_shows_the_starting_color() {
        let (mut flame, mut pixels) = flame();
        flame.light(&mut pixels);
        assert!(flame.is_lit());
        assert_eq!(pixels.get(0), Srgb::new(255, 95, 0));

        flame.update(0.0, &mut Midpoint, &mut pixels);
        assert_eq!(flame.state(), State::Down);
        assert_eq!(pixels.get(0).red as i32, flame.brightness_index());
    }

    #[test]
    #[should_panic]
    fn id_must_fit_on_the_strip() {
        Flame::new(8, 8, &FlameOptions::default());
    }

    #[test]
    fn color_mapping_normal_range() {
        let (mut flame, mut pixels) = flame();
        flame.set_color(255, &mut pixels);
        assert_eq!(pixels.get(0), Srgb::new(255, 95, 0));
        flame.set_color(192, &mut pixels);
        assert_eq!(pixels.get(0), Srgb::new(192, 72, 0));
    }

    #[test]
    fn color_mapping_dim_range_is_greener() {
        let (mut flame, mut pixels) = flame();
        flame.set_color(191, &mut pixels);
        // floor(191 * 3.25 / 8) = floor(77.59)
        assert_eq!(pixels.get(0), Srgb::new(191, 77, 0));
        flame.set_color(128, &mut pixels);
        assert_eq!(pixels.get(0), Srgb::new(128, 52, 0));
    }

    #[test]
    fn color_mapping_clamps_every_input() {
        let (mut flame, mut pixels) = flame();
        for index in -300..600 {
            flame.set_color(index, &mut pixels);
            let color = pixels.get(0);
            let clamped = index.clamp(128, 255);
            assert_eq!(flame.brightness_index(), clamped);
            assert_eq!(color.red as i32, clamped);
            let green = if clamped >= 192 {
                clamped * 3 / 8
            } else {
                (clamped as f64 * 3.25 / 8.0).floor() as i32
            };
            assert_eq!(color.green as i32, green);
            assert_eq!(color.blue, 0);
        }
    }

    #[test]
    fn set_color_is_idempotent() {
        let (mut flame, mut pixels) = flame();
        flame.set_color(400, &mut pixels);
        let first = pixels.get(0);
        flame.set_color(400, &mut pixels);
        assert_eq!(pixels.get(0), first);
        assert_eq!(flame.brightness_index(), 255);
    }

    #[test]
    fn writes_only_its_own_pixel() {
        let mut pixels = PixelBuffer::new(8, 1.0);
        let mut flame = Flame::new(5, 8, &FlameOptions::default());
        flame.set_color(200, &mut pixels);
        for i in 0..8 {
            if i == 5 {
                assert_eq!(pixels.get(i), Srgb::new(200, 75, 0));
            } else {
                assert_eq!(pixels.get(i), Srgb::new(0, 0, 0));
            }
        }
    }

    #[test]
    fn fade_interpolates_linearly() {
        let (mut flame, mut pixels) = flame();
        flame.state = State::Down;
        flame.transition = Transition::Brightening;
        flame.index_start = 200;
        flame.index_end = 220;
        flame.transition_start = 10.0;
        flame.transition_msecs = 100;

        flame.update(10.05, &mut Midpoint, &mut pixels);
        assert!((flame.brightness_index() - 210).abs() <= 1);
        assert_eq!(flame.state(), State::Down);

        flame.update(10.2, &mut Midpoint, &mut pixels);
        assert_eq!(flame.brightness_index(), 220);
        assert_eq!(pixels.get(0), Srgb::new(220, 82, 0));
        assert_ne!(flame.state(), State::Down);
    }

    #[test]
    fn midpoint_draws_cycle_without_holds() {
        let mut flame = Flame::new(0, 8, &without_holds());
        let mut pixels = PixelBuffer::new(8, 1.0);
        let mut random = Midpoint;

        let expected = [
            State::Down,
            State::Dim,
            State::Down,
            State::Bright,
            State::Down,
            State::Dim,
            State::Down,
            State::Bright,
        ];
        let mut now = 0.0;
        for state in expected {
            flame.update(now, &mut random, &mut pixels);
            assert_eq!(flame.state(), state);
            // Longer than any transition
            now += 0.3;
        }
    }

    #[test]
    fn midpoint_targets() {
        let mut flame = Flame::new(0, 8, &without_holds());
        let mut pixels = PixelBuffer::new(8, 1.0);
        let mut random = Midpoint;

        flame.update(0.0, &mut random, &mut pixels);
        assert_eq!(flame.transition, Transition::Dimming);
        assert_eq!(flame.transition_msecs, 135);
        assert_eq!((flame.index_start, flame.index_end), (255, 223));

        flame.update(1.0, &mut random, &mut pixels);
        assert_eq!(flame.brightness_index(), 223);
        flame.update(1.0, &mut random, &mut pixels);
        assert_eq!(flame.transition, Transition::Brightening);
        assert!(flame.index_end >= flame.index_start);
    }

    #[test]
    fn dramatic_dip_can_go_below_normal_minimum() {
        let mut flame = Flame::new(0, 8, &FlameOptions::default());
        let mut pixels = PixelBuffer::new(8, 1.0);
        // duration, dip roll (< 10), dip target
        let mut random = Scripted::new(&[100, 0, 130]);

        flame.update(0.0, &mut random, &mut pixels);
        assert_eq!(flame.index_end, 130);

        flame.update(0.1, &mut random, &mut pixels);
        assert_eq!(flame.brightness_index(), 130);
        assert_eq!(pixels.get(0), Srgb::new(130, 52, 0));
    }

    #[test]
    fn brightening_from_a_dip_never_exceeds_max() {
        let mut flame = Flame::new(0, 8, &without_holds());
        let mut pixels = PixelBuffer::new(8, 1.0);
        flame.state = State::Dim;
        flame.index_end = 128;
        // duration, then the largest offset the draw allows
        let mut random = Scripted::new(&[100, 1000]);

        flame.update(0.0, &mut random, &mut pixels);
        assert_eq!(flame.index_start, 128);
        assert_eq!(flame.index_end, 255);
    }

    #[test]
    fn dim_hold_then_brightens() {
        let mut flame = Flame::new(0, 8, &FlameOptions::default());
        let mut pixels = PixelBuffer::new(8, 1.0);
        flame.state = State::Down;
        flame.transition = Transition::Dimming;
        flame.index_start = 240;
        flame.index_end = 200;
        flame.transition_msecs = 50;
        // hold roll (< 5), hold length
        let mut random = Scripted::new(&[0, 40]);

        flame.update(1.0, &mut random, &mut pixels);
        assert_eq!(flame.state(), State::DimHold);
        assert_eq!(flame.brightness_index(), 200);

        flame.update(1.02, &mut random, &mut pixels);
        assert_eq!(flame.state(), State::DimHold);
        flame.update(1.05, &mut random, &mut pixels);
        assert_eq!(flame.state(), State::Dim);
        assert_eq!(flame.brightness_index(), 200);
    }

    #[test]
    fn bright_hold_then_dims() {
        let mut flame = Flame::new(0, 8, &FlameOptions::default());
        let mut pixels = PixelBuffer::new(8, 1.0);
        flame.state = State::Down;
        flame.transition = Transition::Brightening;
        flame.index_start = 200;
        flame.index_end = 250;
        flame.transition_msecs = 50;
        // hold roll (< 20), hold length
        let mut random = Scripted::new(&[10, 100]);

        flame.update(1.0, &mut random, &mut pixels);
        assert_eq!(flame.state(), State::BrightHold);

        flame.update(1.05, &mut random, &mut pixels);
        assert_eq!(flame.state(), State::BrightHold);
        flame.update(1.15, &mut random, &mut pixels);
        assert_eq!(flame.state(), State::Bright);
        assert_eq!(flame.brightness_index(), 250);
    }

    #[test]
    fn transitions_move_in_their_direction() {
        let mut flame = Flame::new(0, 8, &FlameOptions::default());
        let mut pixels = PixelBuffer::new(8, 1.0);
        let mut random = SeededRandom::new(10028);

        let mut now = 0.0;
        for _ in 0..100_000 {
            flame.update(now, &mut random, &mut pixels);
            if flame.state() == State::Down {
                match flame.transition {
                    Transition::Dimming => assert!(flame.index_end <= flame.index_start),
                    Transition::Brightening => assert!(flame.index_end >= flame.index_start),
                }
            }
            now += 0.003;
        }
    }

    #[test]
    fn brightness_stays_in_bounds() {
        let options = FlameOptions::default();
        let mut flame = Flame::new(3, 8, &options);
        let mut pixels = PixelBuffer::new(8, 1.0);
        let mut random = SeededRandom::new(42);
        flame.light(&mut pixels);

        let mut now = 0.0;
        let mut visited = Vec::new();
        for _ in 0..200_000 {
            flame.update(now, &mut random, &mut pixels);
            let index = flame.brightness_index();
            assert!(options.index_bottom <= index && index <= options.index_max);
            assert_eq!(pixels.get(3).red as i32, index);
            if !visited.contains(&flame.state()) {
                visited.push(flame.state());
            }
            now += 0.001;
        }

        assert_eq!(visited.len(), 5, "visited only {:?}", visited);
    }
}
