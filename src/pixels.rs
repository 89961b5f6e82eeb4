use palette::Srgb;

/// A fixed-length row of RGB pixels.
///
/// Writes take effect on assignment as far as the effects are concerned; an
/// implementation may buffer them until `flush`. Global brightness scaling
/// is the output's business, never the effect's.
pub trait PixelOutput {
    fn len(&self) -> usize;
    fn set(&mut self, index: usize, color: Srgb<u8>);
    fn flush(&mut self) {}

    fn blackout(&mut self) {
        for i in 0..self.len() {
            self.set(i, Srgb::new(0, 0, 0));
        }
    }
}

pub fn scale(color: Srgb<u8>, brightness: f32) -> Srgb<u8> {
    let brightness = brightness.clamp(0.0, 1.0);
    let (r, g, b) = color.into_components();
    Srgb::new(
        (r as f32 * brightness) as u8,
        (g as f32 * brightness) as u8,
        (b as f32 * brightness) as u8,
    )
}

pub struct PixelBuffer {
    pixels: Vec<Srgb<u8>>,
    brightness: f32,
}

impl PixelBuffer {
    pub fn new(pixel_count: usize, brightness: f32) -> PixelBuffer {
        PixelBuffer {
            pixels: vec![Srgb::new(0, 0, 0); pixel_count],
            brightness,
        }
    }

    #[cfg(test)]
    pub fn get(&self, index: usize) -> Srgb<u8> {
        self.pixels[index]
    }

    /// The row as it would appear on the strip.
    pub fn scaled(&self) -> Vec<Srgb<u8>> {
        self.pixels
            .iter()
            .map(|&color| scale(color, self.brightness))
            .collect()
    }
}

impl PixelOutput for PixelBuffer {
    fn len(&self) -> usize {
        self.pixels.len()
    }

    fn set(&mut self, index: usize, color: Srgb<u8>) {
        self.pixels[index] = color;
    }

    fn flush(&mut self) {
        if log::log_enabled!(log::Level::Trace) {
            let row: Vec<String> = self
                .scaled()
                .iter()
                .map(|c| format!("#{:02x}{:02x}{:02x}", c.red, c.green, c.blue))
                .collect();
            log::trace!("{}", row.join(" "));
        }
    }
}
