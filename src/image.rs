use crate::refs::{ObjectReferences, RefType};
use crate::PDFError;
use image::{ColorType, DynamicImage};
use miniz_oxide::deflate::{compress_to_vec_zlib, CompressionLevel};
use pdf_writer::{Filter, Finish, Pdf};

/// A raster image, embedded once per document and placed by reference
pub struct Image {
    pub image: DynamicImage,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

struct EncodeOutput {
    bytes: Vec<u8>,
    grey: bool,
    mask: Option<Vec<u8>>,
}

impl Image {
    pub fn new_raster(image: DynamicImage) -> Image {
        let width = image.width();
        let height = image.height();
        Image {
            image,
            width,
            height,
        }
    }

    fn encode_raster(&self) -> EncodeOutput {
        let level = CompressionLevel::DefaultLevel as u8;
        let image = &self.image;

        let mask = image.color().has_alpha().then(|| {
            let alphas: Vec<u8> = image
                .to_rgba8()
                .pixels()
                .map(|p| p.0[3])
                .collect();
            compress_to_vec_zlib(&alphas, level)
        });

        // 1-bit style rasters such as QR codes stay in DeviceGray
        let grey = matches!(image.color(), ColorType::L8 | ColorType::La8);
        let bytes = if grey {
            compress_to_vec_zlib(image.to_luma8().as_raw(), level)
        } else {
            compress_to_vec_zlib(image.to_rgb8().as_raw(), level)
        };

        EncodeOutput { bytes, grey, mask }
    }

    pub(crate) fn write(
        &self,
        refs: &mut ObjectReferences,
        image_index: usize,
        writer: &mut Pdf,
    ) -> Result<(), PDFError> {
        let id = refs.gen(RefType::Image(image_index));

        let encoded = self.encode_raster();

        let mut image = writer.image_xobject(id, encoded.bytes.as_slice());
        image.filter(Filter::FlateDecode);
        image.width(self.width as i32);
        image.height(self.height as i32);
        if encoded.grey {
            image.color_space().device_gray();
        } else {
            image.color_space().device_rgb();
        }
        image.bits_per_component(8);

        let mask_id = encoded
            .mask
            .as_ref()
            .map(|_| refs.gen(RefType::ImageMask(image_index)));
        if let Some(mask_id) = mask_id {
            image.s_mask(mask_id);
        }

        image.finish();

        // add a transparency mask if we have one
        if let (Some(mask_id), Some(mask)) = (mask_id, encoded.mask.as_ref()) {
            let mut s_mask = writer.image_xobject(mask_id, mask.as_slice());
            s_mask.filter(Filter::FlateDecode);
            s_mask.width(self.width as i32);
            s_mask.height(self.height as i32);
            s_mask.color_space().device_gray();
            s_mask.bits_per_component(8);
        }

        Ok(())
    }
}
