//! The stylesheet side table (§4.3 Stylesheet): entries of the form
//! `{\sN | \*\dsN | \*\tsN | \*\csN  <format controls…>  <name>;}`, indexed
//! by `(styleType, index)` and consulted when `\sN/\dsN/\tsN/\csN` appear
//! in the body.

use crate::rtf::color::ColorValue;
use crate::rtf::state::Alignment;
use std::collections::HashMap;

/// Which of the four style destinations an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StyleType {
    #[default]
    Paragraph,
    Character,
    Section,
    Table,
}

/// Attributes accumulated while parsing one stylesheet entry. Which fields
/// are populated depends on `style_type`: paragraph entries accept
/// `\pagebb` and the alignment controls; character entries accept
/// `\i/\b/\ul/\strike` and `\cf/\cb`.
#[derive(Debug, Clone, Default)]
pub struct StyleProperties {
    pub pagebreak_before: Option<bool>,
    pub alignment: Option<Alignment>,
    pub italic: Option<bool>,
    pub bold: Option<bool>,
    pub underline: Option<bool>,
    pub strikethrough: Option<bool>,
    pub f_color: Option<ColorValue>,
    pub b_color: Option<ColorValue>,
}

#[derive(Debug, Clone)]
pub struct Style {
    pub name: String,
    pub style_type: StyleType,
    pub index: u16,
    pub properties: StyleProperties,
}

/// Mapping `styleType → (index → {name, attributes})`.
#[derive(Debug, Clone, Default)]
pub struct Stylesheet {
    section: HashMap<u16, Style>,
    table: HashMap<u16, Style>,
    paragraph: HashMap<u16, Style>,
    character: HashMap<u16, Style>,
}

impl Stylesheet {
    fn map_for(&self, style_type: StyleType) -> &HashMap<u16, Style> {
        match style_type {
            StyleType::Section => &self.section,
            StyleType::Table => &self.table,
            StyleType::Paragraph => &self.paragraph,
            StyleType::Character => &self.character,
        }
    }

    fn map_for_mut(&mut self, style_type: StyleType) -> &mut HashMap<u16, Style> {
        match style_type {
            StyleType::Section => &mut self.section,
            StyleType::Table => &mut self.table,
            StyleType::Paragraph => &mut self.paragraph,
            StyleType::Character => &mut self.character,
        }
    }

    /// Insert a completed entry. The caller is responsible for the
    /// "insert only when {name, type, index, properties} are all present"
    /// rule (§4.3): a malformed entry is simply never constructed.
    pub fn insert(&mut self, style: Style) {
        let style_type = style.style_type;
        let index = style.index;
        self.map_for_mut(style_type).insert(index, style);
    }

    pub fn get(&self, style_type: StyleType, index: u16) -> Option<&Style> {
        self.map_for(style_type).get(&index)
    }

    /// The paragraph style at index 0, if the stylesheet defined one. Per
    /// §4.3, on the outermost stylesheet close this becomes the document's
    /// new built-in paragraph default.
    pub fn default_paragraph_style(&self) -> Option<&Style> {
        self.paragraph.get(&0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_scoped_by_style_type_and_index() {
        let mut sheet = Stylesheet::default();
        sheet.insert(Style {
            name: "Heading".into(),
            style_type: StyleType::Paragraph,
            index: 1,
            properties: StyleProperties::default(),
        });
        sheet.insert(Style {
            name: "Strong".into(),
            style_type: StyleType::Character,
            index: 1,
            properties: StyleProperties::default(),
        });
        assert_eq!(sheet.get(StyleType::Paragraph, 1).unwrap().name, "Heading");
        assert_eq!(sheet.get(StyleType::Character, 1).unwrap().name, "Strong");
        assert!(sheet.get(StyleType::Table, 1).is_none());
    }

    #[test]
    fn default_paragraph_style_is_index_zero() {
        let mut sheet = Stylesheet::default();
        assert!(sheet.default_paragraph_style().is_none());
        sheet.insert(Style {
            name: "Normal".into(),
            style_type: StyleType::Paragraph,
            index: 0,
            properties: StyleProperties {
                alignment: Some(Alignment::Justified),
                ..Default::default()
            },
        });
        let default_style = sheet.default_paragraph_style().unwrap();
        assert_eq!(default_style.properties.alignment, Some(Alignment::Justified));
    }
}
