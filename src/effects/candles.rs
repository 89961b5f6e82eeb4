use crate::effects::flame::Flame;
use crate::options::CandleOptions;
use crate::pixels::PixelOutput;
use crate::random::RandomSource;

/// A row of flames that catch fire one after another.
pub struct Candles {
    flames: Vec<Flame>,
    ignition_interval: f64,
    next_ignition: f64,
    next_unlit: usize,
}

impl Candles {
    pub fn new(options: &CandleOptions, pixel_count: usize, now: f64) -> Candles {
        let flames = (0..options.flame_count)
            .map(|id| Flame::new(id, pixel_count, &options.flame))
            .collect();

        Candles {
            flames,
            ignition_interval: options.ignition_interval_secs,
            next_ignition: now + options.ignition_interval_secs,
            next_unlit: 0,
        }
    }

    pub fn step(&mut self, now: f64, random: &mut dyn RandomSource, pixels: &mut dyn PixelOutput) {
        if now >= self.next_ignition && self.next_unlit < self.flames.len() {
            let flame = &mut self.flames[self.next_unlit];
            flame.light(pixels);
            log::debug!("Lit flame {} at {:.3}s", flame.id(), now);

            self.next_unlit += 1;
            self.next_ignition = now + self.ignition_interval;
            if self.next_unlit == self.flames.len() {
                log::info!("All {} flames lit", self.flames.len());
            }
        }

        for flame in self.flames.iter_mut().filter(|flame| flame.is_lit()) {
            flame.update(now, random, pixels);
        }
    }

    pub fn lit_count(&self) -> usize {
        self.next_unlit
    }

    #[cfg(test)]
    pub fn flames(&self) -> &[Flame] {
        &self.flames
    }
}
