//! The parse-state machine (§4.3): drives the lexer, maintains the
//! [`StateStack`], consults the color table / stylesheet side tables, and
//! dispatches semantic events to an [`RtfEventSink`].
//!
//! Destinations (GroupSkip, Field, Pict, Stylesheet, ColorTable) are not
//! modeled as a separate state-machine stack; the private flags on
//! [`StateStack`] already tell us which destination we're in (they merge
//! across frames the same way public attributes do), so entering and
//! leaving a destination falls naturally out of brace push/pop.

use super::color::ColorEntryBuilder;
use super::dom::RtfEventSink;
use super::error::{RtfError, RtfResult};
use super::field::split_fldinst;
use super::lexer::{split_control_word, ControlWord, Lexer, Token};
use super::picture::{detect_image_type_by_signature, ImageSource, PictureAttributes};
use super::state::{Alignment, Frame, PublicState, StateStack};
use super::stylesheet::{Style, StyleProperties, StyleType, Stylesheet};
use crate::common::encoding::codepage_to_encoding;
use bumpalo::collections::Vec as BumpVec;
use bumpalo::Bump;
use encoding_rs::Encoding;

/// Which destination (if any) braces opened one level up belong to. Used
/// only to pick the right nested-entry keyword set; the actual "are we in
/// this destination" question is answered by the state stack's private
/// flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DestinationContext {
    Main,
    Field,
    Pict,
    Stylesheet,
    /// GroupSkip or ColorTable: no nested-entry rules of their own.
    Opaque,
}

/// Lookahead after an open brace: have we seen nothing yet, or a `\*`
/// control symbol (which several destinations require as a prefix)?
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingEntry {
    None,
    AfterBrace(DestinationContext),
    AfterBraceStar(DestinationContext),
}

/// Supplies the wall-clock value for `\chdate`/`\chdpl`/`\chdpa`/`\chtime`.
/// Default is [`SystemClock`]; inject a fixed clock in tests for
/// determinism (§9).
pub trait Clock {
    /// (year, month 1-12, day 1-31, hour 0-23, minute, second).
    fn now_parts(&self) -> (i32, u8, u8, u8, u8, u8);
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_parts(&self) -> (i32, u8, u8, u8, u8, u8) {
        let secs = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let days = (secs / 86_400) as i64;
        let time_of_day = secs % 86_400;
        let (year, month, day) = civil_from_days(days);
        (
            year,
            month,
            day,
            (time_of_day / 3600) as u8,
            ((time_of_day % 3600) / 60) as u8,
            (time_of_day % 60) as u8,
        )
    }
}

/// Howard Hinnant's days-from-civil inverse: converts a day count since the
/// Unix epoch to a proleptic-Gregorian (year, month, day).
fn civil_from_days(z: i64) -> (i32, u8, u8) {
    let z = z + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = (z - era * 146_097) as u64;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146_096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let m = if mp < 10 { mp + 3 } else { mp - 9 } as u8;
    let year = if m <= 2 { y + 1 } else { y };
    (year as i32, m, d)
}

const WEEKDAYS: [&str; 7] = [
    "Thursday", "Friday", "Saturday", "Sunday", "Monday", "Tuesday", "Wednesday",
];
const MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

struct FieldAccumulator {
    fldinst: String,
    fldrslt: String,
}

struct StylesheetEntry {
    style_type: StyleType,
    index: u16,
    properties: StyleProperties,
    name: String,
}

/// Streaming RTF parser. Drives an [`RtfEventSink`] to build a DOM, or any
/// other sink implementing the same contract.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    state: StateStack,
    color_table: super::color::ColorTable,
    stylesheet: Stylesheet,
    encoding: &'static Encoding,
    clock: Box<dyn Clock>,

    paragraph_open: bool,
    pending_entry: PendingEntry,
    suppress_next_hex_escape: bool,

    field: Option<FieldAccumulator>,
    pict: Option<PictureAttributes>,
    pict_hex: BumpVec<'a, u8>,
    blip_uid_hex: String,
    color_entry: ColorEntryBuilder,
    stylesheet_entry: Option<StylesheetEntry>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a [u8], arena: &'a Bump) -> Self {
        Self {
            lexer: Lexer::new(input),
            state: StateStack::new(),
            color_table: super::color::ColorTable::default(),
            stylesheet: Stylesheet::default(),
            encoding: encoding_rs::WINDOWS_1252,
            clock: Box::new(SystemClock),
            paragraph_open: false,
            pending_entry: PendingEntry::None,
            suppress_next_hex_escape: false,
            field: None,
            pict: None,
            pict_hex: BumpVec::new_in(arena),
            blip_uid_hex: String::new(),
            color_entry: ColorEntryBuilder::default(),
            stylesheet_entry: None,
        }
    }

    /// Inject a deterministic clock for `\chdate`/`\chtime` (§9).
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn run<S: RtfEventSink>(&mut self, sink: &mut S) -> RtfResult<()> {
        loop {
            match self.lexer.next_token() {
                Token::Eof => {
                    if self.state.depth() != 1 {
                        return Err(RtfError::UnexpectedEof);
                    }
                    break;
                }
                Token::OpenBrace => self.handle_open_brace(),
                Token::CloseBrace => self.handle_close_brace(sink)?,
                Token::ControlWordOrSymbol(raw) => self.handle_control(raw, sink)?,
                Token::Character(byte) => self.handle_character(byte, sink),
            }
        }
        Ok(())
    }

    fn ensure_paragraph_open<S: RtfEventSink>(&mut self, sink: &mut S) {
        if !self.paragraph_open {
            self.paragraph_open = true;
            sink.on_open_paragraph(&self.state.effective());
        }
    }

    fn destination_context(&self) -> DestinationContext {
        if self.state.in_field() {
            DestinationContext::Field
        } else if self.state.in_pict() {
            DestinationContext::Pict
        } else if self.state.in_stylesheet() {
            DestinationContext::Stylesheet
        } else if self.state.in_group_skip() || self.state.in_color_table() {
            DestinationContext::Opaque
        } else {
            DestinationContext::Main
        }
    }

    fn handle_open_brace(&mut self) {
        self.state.push();
        self.pending_entry = PendingEntry::AfterBrace(self.destination_context());
    }

    fn handle_close_brace<S: RtfEventSink>(&mut self, sink: &mut S) -> RtfResult<()> {
        self.pending_entry = PendingEntry::None;

        let was_fieldrslt = self.state.in_fieldrslt();
        let was_group_skip = self.state.in_group_skip();
        let was_fieldinst = self.state.in_fieldinst();
        let was_blip_uid = self.state.in_blip_uid();
        let was_color_table = self.state.in_color_table();
        let was_stylesheet = self.state.in_stylesheet();
        let was_pict = self.state.in_pict();
        let was_field = self.state.in_field();
        let old_public = self.state.effective();

        if !self.state.pop() {
            return Err(RtfError::InvalidStructure("unbalanced closing brace".to_string()));
        }

        let is_fieldrslt = self.state.in_fieldrslt();
        if was_fieldrslt && is_fieldrslt {
            if let Some(field) = &mut self.field {
                field.fldrslt.push('}');
            }
            return Ok(());
        }
        if was_group_skip && self.state.in_group_skip() {
            return Ok(());
        }

        if was_blip_uid && !self.state.in_blip_uid() {
            self.finish_blip_uid();
        }
        if was_color_table && !self.state.in_color_table() {
            self.finish_color_table();
        }
        if was_stylesheet {
            if self.state.in_stylesheet() {
                self.finish_stylesheet_entry();
            } else {
                self.finish_stylesheet_outermost();
            }
        }
        if was_pict && !self.state.in_pict() {
            self.finish_pict(sink);
        }
        if was_field && !self.state.in_field() {
            self.finish_field(sink);
        }
        let _ = was_fieldinst;

        if !was_fieldrslt && !was_group_skip {
            let new_public = self.state.effective();
            if old_public != new_public && self.paragraph_open {
                sink.on_state_change(&old_public, &new_public);
            }
        }
        Ok(())
    }

    fn handle_control<S: RtfEventSink>(&mut self, raw: &'a str, sink: &mut S) -> RtfResult<()> {
        let cw = split_control_word(raw);

        if let PendingEntry::AfterBrace(ctx) = self.pending_entry {
            if cw.word == "*" {
                self.pending_entry = PendingEntry::AfterBraceStar(ctx);
                return Ok(());
            }
            self.pending_entry = PendingEntry::None;
            if self.try_enter_destination(ctx, false, &cw) {
                return Ok(());
            }
        } else if let PendingEntry::AfterBraceStar(ctx) = self.pending_entry {
            self.pending_entry = PendingEntry::None;
            if self.try_enter_destination(ctx, true, &cw) {
                return Ok(());
            }
        }

        if self.state.in_pict() && !self.state.in_blip_uid() {
            self.handle_pict_control(&cw);
            return Ok(());
        }
        if self.state.in_blip_uid() {
            return Ok(());
        }
        if self.state.in_color_table() {
            self.handle_color_control(&cw);
            return Ok(());
        }
        if self.state.in_stylesheet() {
            self.handle_stylesheet_control(&cw);
            return Ok(());
        }
        if self.state.in_fieldinst() {
            if cw.word == "*" {
                self.state.set_local(|f| f.private.in_fieldinst = false);
            }
            return Ok(());
        }
        if self.state.in_fieldrslt() {
            if let Some(field) = &mut self.field {
                field.fldrslt.push('\\');
                field.fldrslt.push_str(raw);
            }
            return Ok(());
        }
        if self.state.in_group_skip() {
            return Ok(());
        }

        self.handle_main_control(&cw, sink);
        Ok(())
    }

    fn try_enter_destination(&mut self, ctx: DestinationContext, star: bool, cw: &ControlWord<'_>) -> bool {
        match (ctx, star, cw.word) {
            (DestinationContext::Main, false, "fonttbl" | "filetbl" | "stylerestrictions" | "info") => {
                self.state.set_local(|f| f.private.group_skip = true);
                true
            }
            (DestinationContext::Main, true, "generator" | "pgdsctbl" | "mmathPr" | "userprops" | "revtbl" | "rsidtbl" | "listtable" | "listoverridetable") => {
                self.state.set_local(|f| f.private.group_skip = true);
                true
            }
            (DestinationContext::Main, false, "stylesheet") => {
                self.state.set_local(|f| f.private.in_stylesheet = true);
                true
            }
            (DestinationContext::Main, false, "colortbl") => {
                self.state.set_local(|f| f.private.in_color_table = true);
                self.color_entry = ColorEntryBuilder::default();
                self.color_table = super::color::ColorTable::default();
                true
            }
            (DestinationContext::Main, false, "field") => {
                self.state.set_local(|f| f.private.in_field = true);
                self.field = Some(FieldAccumulator {
                    fldinst: String::new(),
                    fldrslt: String::new(),
                });
                true
            }
            (DestinationContext::Main, false, "pict") => {
                self.state.set_local(|f| f.private.in_pict = true);
                self.pict = Some(PictureAttributes::default());
                self.pict_hex.clear();
                true
            }
            (DestinationContext::Field, true, "fldinst") => {
                self.state.set_local(|f| f.private.in_fieldinst = true);
                true
            }
            (DestinationContext::Field, false, "fldrslt") => {
                self.state.set_local(|f| f.private.in_fieldrslt = true);
                true
            }
            (DestinationContext::Pict, true, "blipuid") => {
                self.state.set_local(|f| f.private.in_blip_uid = true);
                self.blip_uid_hex.clear();
                true
            }
            (DestinationContext::Stylesheet, false, "s") => {
                self.begin_stylesheet_entry(StyleType::Paragraph, cw.param.unwrap_or(0) as u16);
                true
            }
            (DestinationContext::Stylesheet, true, "ds") => {
                self.begin_stylesheet_entry(StyleType::Section, cw.param.unwrap_or(0) as u16);
                true
            }
            (DestinationContext::Stylesheet, true, "ts") => {
                self.begin_stylesheet_entry(StyleType::Table, cw.param.unwrap_or(0) as u16);
                true
            }
            (DestinationContext::Stylesheet, true, "cs") => {
                self.begin_stylesheet_entry(StyleType::Character, cw.param.unwrap_or(0) as u16);
                true
            }
            _ => false,
        }
    }

    fn begin_stylesheet_entry(&mut self, style_type: StyleType, index: u16) {
        self.stylesheet_entry = Some(StylesheetEntry {
            style_type,
            index,
            properties: StyleProperties::default(),
            name: String::new(),
        });
    }

    fn handle_character<S: RtfEventSink>(&mut self, byte: u8, sink: &mut S) {
        if self.state.in_group_skip() {
            return;
        }
        if self.state.in_fieldinst() {
            if let Some(field) = &mut self.field {
                field.fldinst.push(byte as char);
            }
            return;
        }
        if self.state.in_fieldrslt() {
            if let Some(field) = &mut self.field {
                field.fldrslt.push(byte as char);
            }
            return;
        }
        if self.state.in_blip_uid() {
            if !byte.is_ascii_whitespace() {
                self.blip_uid_hex.push(byte as char);
            }
            return;
        }
        if self.state.in_pict() {
            if !byte.is_ascii_whitespace() {
                self.pict_hex.push(byte);
            }
            return;
        }
        if self.state.in_stylesheet() {
            if self.stylesheet_entry.is_some() {
                if byte == b';' {
                    self.finish_stylesheet_name();
                } else if byte != b'\n' && byte != b'\r' {
                    if let Some(entry) = &mut self.stylesheet_entry {
                        entry.name.push(byte as char);
                    }
                }
            }
            return;
        }
        if self.state.in_color_table() {
            if byte == b';' {
                let value = self.color_entry.finish();
                self.color_table.push(value);
            }
            return;
        }
        if byte == b'\n' || byte == b'\r' {
            return;
        }
        self.suppress_next_hex_escape = false;
        self.ensure_paragraph_open(sink);
        let (decoded, _, _) = self.encoding.decode(&[byte]);
        sink.on_append_paragraph(&decoded);
    }

    fn handle_pict_control(&mut self, cw: &ControlWord<'_>) {
        let Some(pict) = &mut self.pict else { return };
        match cw.word {
            "picscalex" => pict.scale_x = cw.param,
            "picscaley" => pict.scale_y = cw.param,
            "piccropl" => pict.crop_left = cw.param,
            "piccropr" => pict.crop_right = cw.param,
            "piccropt" => pict.crop_top = cw.param,
            "piccropb" => pict.crop_bottom = cw.param,
            "picw" => pict.width = cw.param,
            "pich" => pict.height = cw.param,
            "picwgoal" => pict.goal_width = cw.param,
            "pichgoal" => pict.goal_height = cw.param,
            "picbpp" => pict.bits_per_pixel = cw.param,
            "wbmbitspixel" => pict.wbm_bits_per_pixel = cw.param,
            "wbmplanes" => pict.wbm_planes = cw.param,
            "wbmwidthbytes" => pict.wbm_width_bytes = cw.param,
            "jpegblip" => pict.source = Some(ImageSource::Jpeg),
            "pngblip" => pict.source = Some(ImageSource::Png),
            "emfblip" => pict.source = Some(ImageSource::Emf),
            "pmmetafile" => pict.source = Some(ImageSource::MacMetafile { metafile_type: cw.param }),
            "wmetafile" => pict.source = Some(ImageSource::WindowsMetafile { mapping_mode: cw.param }),
            "dibitmap" => pict.source = Some(ImageSource::Dib { bitmap_type: cw.param }),
            "wbitmap" => pict.source = Some(ImageSource::WindowsBitmap { bitmap_type: cw.param }),
            "bliptag" => {
                if pict.blip_tag.is_none() && pict.blip_uid.is_none() {
                    pict.blip_tag = cw.param;
                }
            }
            _ => {}
        }
    }

    fn handle_color_control(&mut self, cw: &ControlWord<'_>) {
        let value = cw.param.unwrap_or(0).clamp(0, 255) as u8;
        match cw.word {
            "red" => self.color_entry.set_red(value),
            "green" => self.color_entry.set_green(value),
            "blue" => self.color_entry.set_blue(value),
            "tint" => self.color_entry.set_tint(value),
            "shade" => self.color_entry.set_shade(value),
            _ => {}
        }
    }

    fn handle_stylesheet_control(&mut self, cw: &ControlWord<'_>) {
        let Some(entry) = &mut self.stylesheet_entry else { return };
        let on = cw.param != Some(0);
        match entry.style_type {
            StyleType::Paragraph | StyleType::Section => match cw.word {
                "pagebb" => entry.properties.pagebreak_before = Some(on),
                "ql" => entry.properties.alignment = Some(Alignment::Left),
                "qr" => entry.properties.alignment = Some(Alignment::Right),
                "qc" => entry.properties.alignment = Some(Alignment::Center),
                "qd" => entry.properties.alignment = Some(Alignment::Distributed),
                "qj" => entry.properties.alignment = Some(Alignment::Justified),
                "qt" => entry.properties.alignment = Some(Alignment::ThaiDistributed),
                _ => {}
            },
            StyleType::Character => match cw.word {
                "i" => entry.properties.italic = Some(on),
                "b" => entry.properties.bold = Some(on),
                "ul" => entry.properties.underline = Some(on),
                "strike" => entry.properties.strikethrough = Some(on),
                "cf" => {
                    if let Some(color) = cw.param.and_then(|i| self.color_table.get(i as usize)) {
                        entry.properties.f_color = Some(color);
                    }
                }
                "cb" => {
                    if let Some(color) = cw.param.and_then(|i| self.color_table.get(i as usize)) {
                        entry.properties.b_color = Some(color);
                    }
                }
                _ => {}
            },
            StyleType::Table => {}
        }
    }

    fn finish_stylesheet_name(&mut self) {
        // Names are accumulated char-by-char up to `;`; nothing further to
        // do here beyond letting the `}` handler insert the entry.
    }

    fn finish_stylesheet_entry(&mut self) {
        if let Some(entry) = self.stylesheet_entry.take() {
            self.stylesheet.insert(Style {
                name: entry.name,
                style_type: entry.style_type,
                index: entry.index,
                properties: entry.properties,
            });
        }
    }

    fn finish_stylesheet_outermost(&mut self) {
        if let Some(default_style) = self.stylesheet.default_paragraph_style() {
            self.state.rewrite_root_paragraph_defaults(
                default_style.properties.alignment,
                default_style.properties.pagebreak_before,
            );
        }
    }

    fn finish_color_table(&mut self) {
        // The trailing entry (if the table doesn't end on a `;`) has
        // already been captured by the `;`-triggered pushes; nothing more
        // to flush here, matching the real-world convention that a
        // well-formed `\colortbl` always ends each entry with `;`.
    }

    fn finish_blip_uid(&mut self) {
        if let Some(pict) = &mut self.pict {
            if pict.blip_uid.is_none() && pict.blip_tag.is_none() {
                pict.blip_uid = Some(std::mem::take(&mut self.blip_uid_hex));
            }
        }
        self.blip_uid_hex.clear();
    }

    fn finish_pict<S: RtfEventSink>(&mut self, sink: &mut S) {
        let Some(mut attrs) = self.pict.take() else { return };
        let hex: String = self.pict_hex.iter().map(|&b| b as char).collect();
        self.pict_hex.clear();
        match crate::common::encoding::decode_hex_data(&hex) {
            Ok(bytes) => {
                if attrs.source.is_none() {
                    attrs.source = detect_image_type_by_signature(&bytes);
                }
                self.ensure_paragraph_open(sink);
                sink.on_image(&attrs, &bytes);
            }
            Err(_) => {
                // Truncated or odd-digit-count hex: fatal for this image
                // only (§4.7); drop it and keep parsing the rest of the
                // document.
            }
        }
    }

    fn finish_field<S: RtfEventSink>(&mut self, sink: &mut S) {
        if let Some(field) = self.field.take() {
            self.ensure_paragraph_open(sink);
            sink.on_field(&field.fldinst, &field.fldrslt);
        }
    }

    fn apply_and_notify<S: RtfEventSink>(&mut self, sink: &mut S, mutate: impl FnOnce(&mut Frame)) {
        self.ensure_paragraph_open(sink);
        let old = self.state.effective();
        self.state.set_local(mutate);
        let new = self.state.effective();
        sink.on_state_change(&old, &new);
    }

    fn handle_main_control<S: RtfEventSink>(&mut self, cw: &ControlWord<'_>, sink: &mut S) {
        let suppress = self.suppress_next_hex_escape;
        self.suppress_next_hex_escape = false;

        match cw.word {
            "\\" | "{" | "}" => {
                self.ensure_paragraph_open(sink);
                sink.on_append_paragraph(cw.word);
            }
            "~" => self.append_literal(sink, '\u{00A0}'),
            "_" => self.append_literal(sink, '\u{2011}'),
            "emspace" => self.append_literal(sink, '\u{2003}'),
            "enspace" => self.append_literal(sink, '\u{2002}'),
            "emdash" => self.append_literal(sink, '\u{2014}'),
            "endash" => self.append_literal(sink, '\u{2013}'),
            "lquote" => self.append_literal(sink, '\u{2018}'),
            "rquote" => self.append_literal(sink, '\u{2019}'),
            "ldblquote" => self.append_literal(sink, '\u{201C}'),
            "rdblquote" => self.append_literal(sink, '\u{201D}'),
            "bullet" => self.append_literal(sink, '\u{2022}'),
            "line" => self.append_literal(sink, '\n'),
            "tab" => self.append_literal(sink, '\t'),
            "chdate" | "chdpl" => {
                let (y, m, d, ..) = self.clock.now_parts();
                let weekday = weekday_name(y, m, d);
                let text = format!("{}, {} {}, {}", weekday, MONTHS[(m - 1) as usize], d, y);
                self.ensure_paragraph_open(sink);
                sink.on_append_paragraph(&text);
            }
            "chdpa" => {
                let (y, m, d, ..) = self.clock.now_parts();
                self.ensure_paragraph_open(sink);
                sink.on_append_paragraph(&format!("{:02}/{:02}/{:04}", m, d, y));
            }
            "chtime" => {
                let (_, _, _, hh, mm, ss) = self.clock.now_parts();
                let (hour12, meridiem) = to_12_hour(hh);
                self.ensure_paragraph_open(sink);
                sink.on_append_paragraph(&format!("{:02}:{:02}:{:02} {}", hour12, mm, ss, meridiem));
            }
            "u" => {
                if let Some(param) = cw.param {
                    if let Some(ch) = char::from_u32(param as u32) {
                        self.append_literal(sink, ch);
                    }
                }
                self.suppress_next_hex_escape = true;
            }
            "'" => {
                if !suppress {
                    if let Some(param) = cw.param {
                        if (0..=0xFF).contains(&param) {
                            let (decoded, _, _) = self.encoding.decode(&[param as u8]);
                            self.ensure_paragraph_open(sink);
                            sink.on_append_paragraph(&decoded);
                        }
                    }
                }
            }
            "page" => {
                self.ensure_paragraph_open(sink);
                sink.on_page_break(&self.state.effective());
            }
            "pagebb" => self.apply_and_notify(sink, |f| f.pagebreak_before = Some(true)),
            "par" => {
                self.ensure_paragraph_open(sink);
                sink.on_close_paragraph();
                sink.on_open_paragraph(&self.state.effective());
            }
            "plain" => {
                self.ensure_paragraph_open(sink);
                let old = self.state.effective();
                self.state.reset_character_defaults();
                let new = self.state.effective();
                sink.on_state_change(&old, &new);
            }
            "ql" => self.apply_and_notify(sink, |f| f.alignment = Some(Alignment::Left)),
            "qr" => self.apply_and_notify(sink, |f| f.alignment = Some(Alignment::Right)),
            "qc" => self.apply_and_notify(sink, |f| f.alignment = Some(Alignment::Center)),
            "qd" => self.apply_and_notify(sink, |f| f.alignment = Some(Alignment::Distributed)),
            "qj" => self.apply_and_notify(sink, |f| f.alignment = Some(Alignment::Justified)),
            "qt" => self.apply_and_notify(sink, |f| f.alignment = Some(Alignment::ThaiDistributed)),
            "i" => {
                let on = cw.param != Some(0);
                self.apply_and_notify(sink, |f| f.italic = Some(on));
            }
            "b" => {
                let on = cw.param != Some(0);
                self.apply_and_notify(sink, |f| f.bold = Some(on));
            }
            "ul" => {
                let on = cw.param != Some(0);
                self.apply_and_notify(sink, |f| f.underline = Some(on));
            }
            "strike" => {
                let on = cw.param != Some(0);
                self.apply_and_notify(sink, |f| f.strikethrough = Some(on));
            }
            "s" | "ds" | "ts" | "cs" => self.apply_style(cw, sink),
            "cf" => {
                if let Some(color) = cw.param.and_then(|i| self.color_table.get(i as usize)) {
                    self.apply_and_notify(sink, |f| f.f_color = Some(color));
                }
            }
            "cb" => {
                if let Some(color) = cw.param.and_then(|i| self.color_table.get(i as usize)) {
                    self.apply_and_notify(sink, |f| f.b_color = Some(color));
                }
            }
            "ansicpg" => {
                if let Some(cp) = cw.param {
                    if let Some(enc) = codepage_to_encoding(cp as u32) {
                        self.encoding = enc;
                    }
                }
            }
            _ => {} // unknown control word: silently ignored (§4.4)
        }
    }

    fn append_literal<S: RtfEventSink>(&mut self, sink: &mut S, ch: char) {
        self.ensure_paragraph_open(sink);
        let mut buf = [0u8; 4];
        sink.on_append_paragraph(ch.encode_utf8(&mut buf));
    }

    fn apply_style<S: RtfEventSink>(&mut self, cw: &ControlWord<'_>, sink: &mut S) {
        let style_type = match cw.word {
            "s" => StyleType::Paragraph,
            "ds" => StyleType::Section,
            "ts" => StyleType::Table,
            "cs" => StyleType::Character,
            _ => return,
        };
        let Some(index) = cw.param else { return };
        let Some(style) = self.stylesheet.get(style_type, index as u16) else {
            return;
        };
        let properties = style.properties.clone();
        let name = style.name.clone();
        self.apply_and_notify(sink, move |f| {
            if matches!(style_type, StyleType::Paragraph | StyleType::Section) {
                f.style = Some(name);
                if let Some(a) = properties.alignment {
                    f.alignment = Some(a);
                }
                if let Some(p) = properties.pagebreak_before {
                    f.pagebreak_before = Some(p);
                }
            } else {
                if let Some(b) = properties.bold {
                    f.bold = Some(b);
                }
                if let Some(i) = properties.italic {
                    f.italic = Some(i);
                }
                if let Some(u) = properties.underline {
                    f.underline = Some(u);
                }
                if let Some(s) = properties.strikethrough {
                    f.strikethrough = Some(s);
                }
                if let Some(c) = properties.f_color {
                    f.f_color = Some(c);
                }
                if let Some(c) = properties.b_color {
                    f.b_color = Some(c);
                }
            }
        });
    }
}

fn to_12_hour(hour24: u8) -> (u8, &'static str) {
    match hour24 {
        0 => (12, "AM"),
        1..=11 => (hour24, "AM"),
        12 => (12, "PM"),
        _ => (hour24 - 12, "PM"),
    }
}

fn weekday_name(year: i32, month: u8, day: u8) -> &'static str {
    // Days-since-epoch for this date, reusing the inverse of civil_from_days
    // via a small forward conversion (Zeller-free, Hinnant's days_from_civil).
    let y = if month <= 2 { year as i64 - 1 } else { year as i64 };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = (y - era * 400) as u64;
    let mp = if month > 2 { month - 3 } else { month + 9 } as u64;
    let doy = (153 * mp + 2) / 5 + day as u64 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    let days = era * 146_097 + doe as i64 - 719_468;
    WEEKDAYS[(days.rem_euclid(7)) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtf::dom::DomBuilder;

    fn parse(input: &str) -> crate::rtf::dom::Tree {
        let arena = Bump::new();
        let mut parser = Parser::new(input.as_bytes(), &arena);
        let mut builder = DomBuilder::new();
        parser.run(&mut builder).unwrap();
        builder.into_tree()
    }

    #[test]
    fn two_paragraphs_split_on_par() {
        let tree = parse(r"{\rtf1 hello\par world}");
        let root = crate::rtf::dom::NodeId(0);
        let paras = &tree.node(root).children;
        assert_eq!(paras.len(), 2);
        let first_text = tree.node(paras[0]).children[0];
        assert_eq!(
            tree.node(first_text).value,
            crate::rtf::dom::NodeValue::Text("hello".into())
        );
        let second_text = tree.node(paras[1]).children[0];
        assert_eq!(
            tree.node(second_text).value,
            crate::rtf::dom::NodeValue::Text("world".into())
        );
    }

    #[test]
    fn bold_then_plain_produces_two_siblings() {
        let tree = parse(r"{\rtf1 \b bold\b0 plain}");
        let root = crate::rtf::dom::NodeId(0);
        let para = tree.node(root).children[0];
        let children = &tree.node(para).children;
        assert_eq!(children.len(), 2);
        assert_eq!(tree.node(children[0]).node_type, crate::rtf::dom::NodeType::Bold);
    }

    #[test]
    fn unbalanced_closing_brace_is_fatal() {
        let arena = Bump::new();
        let mut parser = Parser::new(b"{\\rtf1 hi}}", &arena);
        let mut builder = DomBuilder::new();
        assert!(parser.run(&mut builder).is_err());
    }

    #[test]
    fn truncated_stylesheet_destination_is_unexpected_eof() {
        let arena = Bump::new();
        let mut parser = Parser::new(br"{\rtf1{\stylesheet{\s0 Normal", &arena);
        let mut builder = DomBuilder::new();
        assert!(matches!(
            parser.run(&mut builder),
            Err(RtfError::UnexpectedEof)
        ));
    }

    #[test]
    fn line_breaks_embed_a_newline_in_one_run() {
        let tree = parse(r"{\rtf1 line1\line line2\par}");
        let root = crate::rtf::dom::NodeId(0);
        let para = tree.node(root).children[0];
        let text = tree.node(para).children[0];
        assert_eq!(
            tree.node(text).value,
            crate::rtf::dom::NodeValue::Text("line1\nline2".into())
        );
    }

    #[test]
    fn hex_escape_after_unicode_escape_is_suppressed() {
        let tree = parse(r"{\rtf1 \u233\'e9}");
        let root = crate::rtf::dom::NodeId(0);
        let para = tree.node(root).children[0];
        let text = tree.node(para).children[0];
        assert_eq!(tree.node(text).value, crate::rtf::dom::NodeValue::Text("\u{e9}".into()));
    }
}
