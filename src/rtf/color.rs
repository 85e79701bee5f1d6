//! The color table side table (§4.3 ColorTable, §3 Color Table): an ordered
//! sequence where index 0 is the sentinel "auto" color and other entries
//! are RGB records with optional tint/shade.

/// One populated color table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorRecord {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub tint: u8,
    pub shade: u8,
}

/// A resolved color value, as stored on a formatting frame or paragraph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorValue {
    Auto,
    Rgb(ColorRecord),
}

/// Accumulates one in-progress color table entry between `;` terminators.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorEntryBuilder {
    red: u8,
    green: u8,
    blue: u8,
    tint: u8,
    shade: u8,
    touched: bool,
}

impl ColorEntryBuilder {
    pub fn set_red(&mut self, v: u8) {
        self.red = v;
        self.touched = true;
    }

    pub fn set_green(&mut self, v: u8) {
        self.green = v;
        self.touched = true;
    }

    pub fn set_blue(&mut self, v: u8) {
        self.blue = v;
        self.touched = true;
    }

    pub fn set_tint(&mut self, v: u8) {
        self.tint = v;
        self.touched = true;
    }

    pub fn set_shade(&mut self, v: u8) {
        self.shade = v;
        self.touched = true;
    }

    /// Finish this entry on `;` and reset for the next one. An entry with
    /// no color words seen since the last `;` resolves to the sentinel
    /// "auto" color.
    pub fn finish(&mut self) -> ColorValue {
        let value = if self.touched {
            ColorValue::Rgb(ColorRecord {
                red: self.red,
                green: self.green,
                blue: self.blue,
                tint: if self.tint == 0 { 255 } else { self.tint },
                shade: if self.shade == 0 { 255 } else { self.shade },
            })
        } else {
            ColorValue::Auto
        };
        *self = Self::default();
        value
    }
}

/// Index-addressable table built by [`ColorEntryBuilder`] and consulted by
/// `\cfN` / `\cbN`.
#[derive(Debug, Clone, Default)]
pub struct ColorTable {
    entries: Vec<ColorValue>,
}

impl ColorTable {
    pub fn push(&mut self, value: ColorValue) {
        self.entries.push(value);
    }

    pub fn get(&self, index: usize) -> Option<ColorValue> {
        self.entries.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_entry_resolves_to_auto() {
        let mut builder = ColorEntryBuilder::default();
        assert_eq!(builder.finish(), ColorValue::Auto);
    }

    #[test]
    fn touched_entry_resolves_to_rgb_with_default_tint_shade() {
        let mut builder = ColorEntryBuilder::default();
        builder.set_red(0xff);
        builder.set_green(0);
        builder.set_blue(0);
        assert_eq!(
            builder.finish(),
            ColorValue::Rgb(ColorRecord {
                red: 0xff,
                green: 0,
                blue: 0,
                tint: 255,
                shade: 255,
            })
        );
    }

    #[test]
    fn table_indexing() {
        let mut table = ColorTable::default();
        table.push(ColorValue::Auto);
        table.push(ColorValue::Rgb(ColorRecord {
            red: 1,
            green: 2,
            blue: 3,
            tint: 255,
            shade: 255,
        }));
        assert_eq!(table.get(0), Some(ColorValue::Auto));
        assert!(table.get(1).is_some());
        assert_eq!(table.get(2), None);
    }
}
