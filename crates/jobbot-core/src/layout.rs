//! Fixed-width text layout for paginated documents.
//!
//! Coordinates are PDF points with the origin at the bottom-left corner.

/// Page size, margins and type metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageGeometry {
    pub width: i64,
    pub height: i64,
    pub margin_left: i64,
    /// Distance from the top edge to the first baseline.
    pub margin_top: i64,
    /// Lowest baseline allowed on a page.
    pub margin_bottom: i64,
    pub line_height: i64,
    pub font_size: i64,
    /// Maximum characters per line.
    pub wrap_width: usize,
}

impl PageGeometry {
    /// A4 portrait, Helvetica 10pt.
    pub const A4: PageGeometry = PageGeometry {
        width: 595,
        height: 842,
        margin_left: 40,
        margin_top: 50,
        margin_bottom: 60,
        line_height: 12,
        font_size: 10,
        wrap_width: 95,
    };

    pub fn first_baseline(&self) -> i64 {
        self.height - self.margin_top
    }

    pub fn lines_per_page(&self) -> usize {
        let span = (self.first_baseline() - self.margin_bottom).max(0);
        (span / self.line_height.max(1)) as usize + 1
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::A4
    }
}

/// A line of text at its baseline position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedLine {
    pub x: i64,
    pub y: i64,
    pub text: String,
}

/// Greedy word wrap. Words longer than `width` are split; an empty
/// paragraph yields a single empty line.
pub fn wrap_paragraph(paragraph: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in paragraph.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();

        while word.len() > width {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        let needed = if current_len == 0 {
            word.len()
        } else {
            current_len + 1 + word.len()
        };
        if needed > width && current_len > 0 {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(word.iter());
        current_len += word.len();
    }

    if current_len > 0 {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Wrap every paragraph of `text` and flow the lines onto pages.
///
/// Always returns at least one page.
pub fn layout(text: &str, geometry: &PageGeometry) -> Vec<Vec<PlacedLine>> {
    let per_page = geometry.lines_per_page();
    let lines: Vec<String> = text
        .split('\n')
        .flat_map(|p| wrap_paragraph(p, geometry.wrap_width))
        .collect();

    let mut pages: Vec<Vec<PlacedLine>> = lines
        .chunks(per_page)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .map(|(i, line)| PlacedLine {
                    x: geometry.margin_left,
                    y: geometry.first_baseline() - geometry.line_height * i as i64,
                    text: line.clone(),
                })
                .collect()
        })
        .collect();

    if pages.is_empty() {
        pages.push(Vec::new());
    }
    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_geometry() {
        let g = PageGeometry::A4;
        assert_eq!(g.first_baseline(), 792);
        assert_eq!(g.lines_per_page(), 62);
    }

    #[test]
    fn wrap_fills_greedily() {
        assert_eq!(
            wrap_paragraph("the quick brown fox jumps", 10),
            vec!["the quick", "brown fox", "jumps"]
        );
    }

    #[test]
    fn wrap_splits_long_words() {
        assert_eq!(
            wrap_paragraph("ab abcdefghij c", 4),
            vec!["ab", "abcd", "efgh", "ij c"]
        );
    }

    #[test]
    fn wrap_empty_paragraph_is_blank_line() {
        assert_eq!(wrap_paragraph("", 95), vec![String::new()]);
        assert_eq!(wrap_paragraph("   ", 95), vec![String::new()]);
    }

    #[test]
    fn wrap_counts_chars_not_bytes() {
        assert_eq!(wrap_paragraph("ééé ééé", 7), vec!["ééé ééé"]);
    }

    #[test]
    fn layout_flows_onto_new_pages() {
        let text = (0..130).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let pages = layout(&text, &PageGeometry::A4);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].len(), 62);
        assert_eq!(pages[1].len(), 62);
        assert_eq!(pages[2].len(), 6);

        assert_eq!(pages[0][0].y, 792);
        assert_eq!(pages[0][61].y, 60);
        assert_eq!(pages[1][0].text, "line 62");
        assert_eq!(pages[1][0].y, 792);
        assert!(pages.iter().flatten().all(|l| l.x == 40));
    }

    #[test]
    fn layout_keeps_blank_lines() {
        let pages = layout("a\n\nb", &PageGeometry::A4);
        let texts: Vec<_> = pages[0].iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "", "b"]);
    }
}
