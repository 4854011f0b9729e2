use std::io::Write;

#[inline]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    // BGRA8 in little-endian memory
    (b as u32) | ((g as u32) << 8) | ((r as u32) << 16)
    // Alpha at 0
}

#[inline]
pub fn unpack_rgb(color: u32) -> (u8, u8, u8) {
    ((color >> 16) as u8, (color >> 8) as u8, color as u8)
}

/// Scales the color channels of a packed texel; drops its alpha.
#[inline]
pub fn shade(texel: u32, brightness: f32) -> u32 {
    if brightness >= 1.0 {
        return texel & 0x00FF_FFFF;
    }
    let (r, g, b) = unpack_rgb(texel);
    pack_rgb(
        (r as f32 * brightness) as u8,
        (g as f32 * brightness) as u8,
        (b as f32 * brightness) as u8,
    )
}

/// Color grid with a parallel depth grid, both row-major, row 0 at the top.
#[derive(Clone, Debug)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
    depth: Vec<f32>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height],
            depth: vec![f32::INFINITY; width * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Resets color to black and depth to +infinity.
    pub fn clear(&mut self) {
        self.pixels.fill(0);
        self.depth.fill(f32::INFINITY);
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> u32 {
        self.pixels[y * self.width + x]
    }

    #[inline]
    pub fn depth(&self, x: usize, y: usize) -> f32 {
        self.depth[y * self.width + x]
    }

    /// Depth-tested write. Accepted only when `z` is strictly nearer than
    /// what the pixel holds; color and depth then change together.
    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, z: f32, color: u32) -> bool {
        let idx = y * self.width + x;
        if z < self.depth[idx] {
            self.depth[idx] = z;
            self.pixels[idx] = color;
            true
        } else {
            false
        }
    }

    /// Encodes the color grid as an 8-bit RGB PNG.
    pub fn write_png<W: Write>(&self, writer: W) -> Result<(), png::EncodingError> {
        let mut encoder = png::Encoder::new(writer, self.width as u32, self.height as u32);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;

        let mut data = Vec::with_capacity(self.pixels.len() * 3);
        for &color in &self.pixels {
            let (r, g, b) = unpack_rgb(color);
            data.extend_from_slice(&[r, g, b]);
        }
        writer.write_image_data(&data)?;
        writer.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_test_keeps_nearest() {
        let mut fb = FrameBuffer::new(4, 3);
        assert!(fb.set_pixel(1, 2, 3.0, pack_rgb(1, 2, 3)));
        assert!(!fb.set_pixel(1, 2, 3.0, pack_rgb(9, 9, 9)));
        assert!(!fb.set_pixel(1, 2, 4.0, pack_rgb(9, 9, 9)));
        assert!(fb.set_pixel(1, 2, 1.5, pack_rgb(4, 5, 6)));
        assert_eq!(fb.pixel(1, 2), pack_rgb(4, 5, 6));
        assert_eq!(fb.depth(1, 2), 1.5);

        fb.clear();
        assert_eq!(fb.pixel(1, 2), 0);
        assert_eq!(fb.depth(1, 2), f32::INFINITY);
    }

    #[test]
    fn shading_is_linear() {
        let texel = 0xFF00_0000 | pack_rgb(200, 100, 50);
        assert_eq!(shade(texel, 1.0), pack_rgb(200, 100, 50));
        assert_eq!(shade(texel, 0.5), pack_rgb(100, 50, 25));
        assert_eq!(shade(texel, 0.0), 0);
    }

    #[test]
    fn png_snapshot_round_trips_dimensions() {
        let mut fb = FrameBuffer::new(5, 2);
        fb.set_pixel(4, 1, 1.0, pack_rgb(10, 20, 30));
        let mut bytes = Vec::new();
        fb.write_png(&mut bytes).unwrap();

        let decoder = png::Decoder::new(bytes.as_slice());
        let mut reader = decoder.read_info().unwrap();
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).unwrap();
        assert_eq!((info.width, info.height), (5, 2));
        let last = &buf[info.buffer_size() - 3..info.buffer_size()];
        assert_eq!(last, &[10, 20, 30]);
    }
}
