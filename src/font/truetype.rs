use crate::{
    refs::{ObjectReferences, RefType},
    PDFError, Pt,
};
use owned_ttf_parser::{AsFaceRef, OwnedFace};
use pdf_writer::{
    types::{FontFlags, SystemInfo},
    Finish, Name, Pdf, Ref, Str,
};
use std::collections::HashMap;

/// A parsed TrueType / OpenType face. The face is embedded in its entirety as a CID
/// font with an `Identity-H` encoding, so characters are addressed by glyph id.
pub struct TrueTypeFont {
    pub face: OwnedFace,
}

impl TrueTypeFont {
    /// Load a font from raw bytes, parsing the font and returning an error if the font
    /// could not be parsed
    pub fn load(bytes: Vec<u8>) -> Result<TrueTypeFont, PDFError> {
        let face = OwnedFace::from_vec(bytes, 0)?;
        Ok(TrueTypeFont { face })
    }

    fn name_entry(&self, id: u16) -> Option<String> {
        self.face
            .as_face_ref()
            .names()
            .into_iter()
            .find(|name| name.name_id == id && name.is_unicode())
            .and_then(|name| name.to_string())
    }

    /// The full name of the font, or a generic name if the font does not carry one
    pub fn name(&self) -> String {
        self.name_entry(owned_ttf_parser::name_id::FULL_NAME)
            .unwrap_or_else(|| "EmbeddedFont".to_string())
    }

    /// The family name of the font, falling back to the full name
    pub fn family(&self) -> String {
        self.name_entry(owned_ttf_parser::name_id::FAMILY)
            .unwrap_or_else(|| self.name())
    }

    pub(crate) fn units_per_em(&self) -> f32 {
        self.face.as_face_ref().units_per_em() as f32
    }

    pub(crate) fn ascender(&self) -> f32 {
        self.face.as_face_ref().ascender() as f32
    }

    pub(crate) fn descender(&self) -> f32 {
        self.face.as_face_ref().descender() as f32
    }

    pub(crate) fn line_gap(&self) -> f32 {
        self.face.as_face_ref().line_gap() as f32
    }

    pub fn glyph_id(&self, ch: char) -> Option<u16> {
        self.face
            .as_face_ref()
            .glyph_index(ch)
            .map(|i| i.0)
            .filter(|&gid| gid > 0)
    }

    pub fn replacement_glyph_id(&self) -> Option<u16> {
        self.glyph_id('\u{FFFD}').or_else(|| self.glyph_id('?'))
    }

    /// Horizontal advance in font units, [None] if the face has no glyph for `ch`
    pub(crate) fn advance(&self, ch: char) -> Option<f32> {
        let gid = self.glyph_id(ch)?;
        self.face
            .as_face_ref()
            .glyph_hor_advance(owned_ttf_parser::GlyphId(gid))
            .map(|adv| adv as f32)
    }

    pub(crate) fn ascent(&self, size: Pt) -> Pt {
        size / self.units_per_em() * self.ascender()
    }

    fn write_cid(&self, refs: &mut ObjectReferences, font_index: usize, writer: &mut Pdf) -> Ref {
        let font_descriptor_id = self.write_descriptor(refs, font_index, writer);

        let id = refs.gen(RefType::CidFont(font_index));

        let mut cid_font = writer.cid_font(id);
        cid_font.subtype(pdf_writer::types::CidFontType::Type2);
        cid_font.base_font(Name(format!("F{font_index}").as_bytes()));
        cid_font.system_info(SystemInfo {
            registry: Str(b"Adobe"),
            ordering: Str(b"Identity"),
            supplement: 0,
        });
        cid_font.font_descriptor(font_descriptor_id);

        let ids = self.glyph_ids();
        let ids_augmented = self.glyphs_sizing(&ids);

        let scaling = 1000.0 / self.units_per_em();

        // find the most popular width to use as the default
        let mut widths_counts: HashMap<u16, usize> = HashMap::new();
        for (_, (_, (width, _))) in ids_augmented.iter() {
            *widths_counts.entry(*width).or_insert(0) += 1;
        }
        let most_common_width = widths_counts
            .iter()
            .max_by_key(|(_, &count)| count)
            .map(|(&sz, _)| sz as f32 * scaling)
            .unwrap_or(1000.0);

        let mut id_widths: Vec<(u16, f32)> = ids_augmented
            .iter()
            .map(|(&cid, &(_, (width, _)))| (cid, width as f32 * scaling))
            .collect();
        id_widths.sort_by_key(|(id, _)| *id);

        let mut widths = cid_font.widths();
        let mut runs: Vec<(u16, Vec<f32>)> = Vec::new();
        for (cid, width) in id_widths {
            match runs.last_mut() {
                Some((start, run)) if (cid - *start) as usize == run.len() => run.push(width),
                _ => runs.push((cid, vec![width])),
            }
        }
        for (start, run) in runs {
            widths.consecutive(start, run);
        }
        widths.finish();

        cid_font.default_width(most_common_width);
        cid_font.cid_to_gid_map_predefined(Name(b"Identity"));

        id
    }

    fn write_font_data(
        &self,
        refs: &mut ObjectReferences,
        font_index: usize,
        writer: &mut Pdf,
    ) -> Ref {
        let id = refs.gen(RefType::FontData(font_index));

        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(
            self.face.as_slice(),
            miniz_oxide::deflate::CompressionLevel::DefaultCompression as u8,
        );
        let mut stream = writer.stream(id, compressed.as_slice());
        stream.filter(pdf_writer::Filter::FlateDecode);
        stream.pair(Name(b"Length1"), self.face.as_slice().len() as i32);

        id
    }

    fn write_descriptor(
        &self,
        refs: &mut ObjectReferences,
        font_index: usize,
        writer: &mut Pdf,
    ) -> Ref {
        let font_data_stream_id = self.write_font_data(refs, font_index, writer);

        let gids = self.glyph_ids();
        let gids_augmented = self.glyphs_sizing(&gids);

        let max_width = gids_augmented
            .values()
            .map(|&(_, (w, _))| w)
            .max()
            .unwrap_or_default();
        let max_height = gids_augmented
            .values()
            .map(|&(_, (_, h))| h)
            .max()
            .unwrap_or_default();
        let sum_width: usize = gids_augmented.values().map(|&(_, (w, _))| w as usize).sum();
        let avg_width = sum_width as f32 / gids_augmented.len().max(1) as f32;

        let id = refs.gen(RefType::FontDescriptor(font_index));
        let face = self.face.as_face_ref();

        let mut descriptor = writer.font_descriptor(id);
        descriptor.name(Name(self.name().replace(' ', "").as_bytes()));
        descriptor.family(Str(self.family().as_bytes()));
        descriptor.weight(face.weight().to_number());

        let mut flags: FontFlags = FontFlags::NON_SYMBOLIC;
        if face.is_monospaced() {
            flags.set(FontFlags::FIXED_PITCH, true);
        }
        if face.is_italic() {
            flags.set(FontFlags::ITALIC, true);
        }
        descriptor.flags(flags);

        let scaling = 1000.0 / self.units_per_em();
        descriptor.bbox(pdf_writer::Rect {
            x1: 0.0,
            y1: self.descender() * scaling,
            x2: max_width as f32 * scaling,
            y2: max_height as f32 * scaling,
        });
        descriptor.italic_angle(face.italic_angle());
        descriptor.ascent(self.ascender() * scaling);
        descriptor.descent(self.descender() * scaling);
        descriptor.leading(self.line_gap() * scaling);
        descriptor.cap_height(
            face.capital_height()
                .map(|h| h as f32 * scaling)
                .unwrap_or(1000.0),
        );
        descriptor.x_height(
            face.x_height()
                .unwrap_or_else(|| face.capital_height().unwrap_or_default()) as f32
                * scaling,
        );
        // TODO: derive the stem width from the OS/2 weight class instead of a fixed value
        descriptor.stem_v(80.0);
        descriptor.avg_width(avg_width * scaling);
        descriptor.max_width(max_width as f32 * scaling);
        descriptor.missing_width(max_width as f32 * scaling);

        descriptor.font_file2(font_data_stream_id);

        id
    }

    fn glyph_ids(&self) -> HashMap<u16, char> {
        let mut map: HashMap<u16, char> = HashMap::new();

        let Some(cmap) = self.face.as_face_ref().tables().cmap else {
            return map;
        };

        for subtable in cmap.subtables.into_iter().filter(|table| table.is_unicode()) {
            subtable.codepoints(|codepoint: u32| {
                if let Ok(ch) = char::try_from(codepoint) {
                    if let Some(index) = subtable.glyph_index(codepoint).filter(|index| index.0 > 0)
                    {
                        map.entry(index.0).or_insert(ch);
                    }
                }
            });
        }

        map
    }

    fn glyphs_sizing(&self, ids: &HashMap<u16, char>) -> HashMap<u16, (char, (u16, i16))> {
        let face = self.face.as_face_ref();
        let mut ids_augmented: HashMap<u16, (char, (u16, i16))> = HashMap::new();
        for (&id, &ch) in ids.iter() {
            if let Some(gid) = face.glyph_index(ch) {
                if let Some(h_advance) = face.glyph_hor_advance(gid) {
                    let height = face
                        .glyph_bounding_box(gid)
                        .map(|bbox| bbox.y_max - bbox.y_min - face.descender())
                        .unwrap_or(1000);
                    ids_augmented.insert(id, (ch, (h_advance, height)));
                }
            }
        }
        ids_augmented
    }

    fn write_to_unicode(
        &self,
        refs: &mut ObjectReferences,
        font_index: usize,
        writer: &mut Pdf,
    ) -> Ref {
        let id = refs.gen(RefType::ToUnicode(font_index));

        let mut map: String = r#"/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
/CIDSystemInfo
<< /Registry (Adobe)
/Ordering (UCS) /Supplement 0 >> def
/CMapName /Adobe-Identity-UCS def
/CMapType 2 def
1 begincodespacerange
<0000> <FFFF>
endcodespacerange
"#
        .replace("\r\n", "\n");

        let mut ids: Vec<(u16, char)> = self.glyph_ids().into_iter().collect();
        ids.sort_by_key(|&(id, _)| id);

        // each bfchar block holds at most 100 entries sharing a high byte
        let mut cmap_blocks: Vec<Vec<(u16, char)>> = Vec::new();
        let mut current_block: Vec<(u16, char)> = Vec::new();
        let mut high_byte: u8 = 0;
        for &(id, ch) in ids.iter() {
            if (id >> 8) as u8 != high_byte || current_block.len() >= 100 {
                if !current_block.is_empty() {
                    cmap_blocks.push(std::mem::take(&mut current_block));
                }
                high_byte = (id >> 8) as u8;
            }
            current_block.push((id, ch));
        }
        if !current_block.is_empty() {
            cmap_blocks.push(current_block);
        }

        for block in cmap_blocks.into_iter() {
            map.push_str(&format!("{} beginbfchar\n", block.len()));
            for (id, ch) in block.into_iter() {
                let mut utf16 = [0u16; 2];
                let units: String = ch
                    .encode_utf16(&mut utf16)
                    .iter()
                    .map(|unit| format!("{unit:04x}"))
                    .collect();
                map.push_str(&format!("<{id:04x}> <{units}>\n"));
            }
            map.push_str("endbfchar\n");
        }

        map.push_str("endcmap CMapName currentdict /CMap defineresource pop end end\n");

        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(
            map.as_bytes(),
            miniz_oxide::deflate::CompressionLevel::DefaultCompression as u8,
        );
        let mut stream = writer.stream(id, compressed.as_slice());
        stream.filter(pdf_writer::Filter::FlateDecode);

        id
    }

    pub(crate) fn write(&self, refs: &mut ObjectReferences, font_index: usize, writer: &mut Pdf) {
        let font_id = refs.gen(RefType::Font(font_index));
        let cid_font_id = self.write_cid(refs, font_index, writer);
        let to_unicode_id = self.write_to_unicode(refs, font_index, writer);

        let mut font = writer.type0_font(font_id);
        font.base_font(Name(format!("F{font_index}").as_bytes()));
        font.encoding_predefined(Name(b"Identity-H"));
        font.descendant_font(cid_font_id);
        font.to_unicode(to_unicode_id);
    }
}
