use image::{DynamicImage, GrayImage, Luma};
use qrcode::{Color, QrCode};

/// Modules of light border around the symbol
const QUIET_ZONE: u32 = 4;
/// Pixels per module; keeps edges sharp when the image is scaled onto the page
const MODULE_PIXELS: u32 = 4;

/// Render `data` as a black-on-white QR code raster
pub fn qr_image(data: &str) -> Result<DynamicImage, qrcode::types::QrError> {
    let code = QrCode::new(data.as_bytes())?;
    let modules = code.width() as u32;
    let colours = code.to_colors();

    let side = (modules + QUIET_ZONE * 2) * MODULE_PIXELS;
    let image = GrayImage::from_fn(side, side, |x, y| {
        let mx = (x / MODULE_PIXELS).checked_sub(QUIET_ZONE);
        let my = (y / MODULE_PIXELS).checked_sub(QUIET_ZONE);
        let dark = match (mx, my) {
            (Some(mx), Some(my)) if mx < modules && my < modules => {
                colours[(my * modules + mx) as usize] == Color::Dark
            }
            _ => false,
        };
        if dark {
            Luma([0u8])
        } else {
            Luma([255u8])
        }
    });

    Ok(DynamicImage::ImageLuma8(image))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_is_square_with_a_light_border() {
        let image = qr_image("https://clubs.example.org/verify-letter/abc").unwrap();
        let grey = image.to_luma8();
        assert_eq!(grey.width(), grey.height());
        assert_eq!(grey.get_pixel(0, 0).0[0], 255);
        // the top-left finder pattern starts right after the quiet zone
        let edge = QUIET_ZONE * MODULE_PIXELS;
        assert_eq!(grey.get_pixel(edge, edge).0[0], 0);
    }
}
