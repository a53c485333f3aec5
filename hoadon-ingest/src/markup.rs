//! Row and cell handling for the HTML-table files the POS exports.
//!
//! The exports are not well-formed documents; rows are keyed off bare `<tr>`
//! openers and cells off `<td...>` spans, with any inner tags stripped. Nothing
//! here attempts general markup parsing.

use anyhow::Result;
use regex::Regex;

/// Split export text into row chunks. The chunk before the first `<tr>` is the
/// header junk; callers scan every chunk and simply find no cells in it.
pub fn split_rows(content: &str) -> impl Iterator<Item = &str> {
    content.split("<tr>")
}

/// Extracts ordered, tag-stripped cell text from a row chunk.
pub struct CellExtractor {
    cell_re: Regex,
    tag_re: Regex,
}

impl CellExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            cell_re: Regex::new(r"<td[^>]*>(.*?)</td>")?,
            tag_re: Regex::new(r"<[^>]+>")?,
        })
    }

    pub fn cells(&self, row: &str) -> Vec<String> {
        self.cell_re
            .captures_iter(row)
            .map(|caps| self.tag_re.replace_all(&caps[1], "").trim().to_string())
            .collect()
    }
}

/// Merge two single-method exports row-wise into one ledger: header and footer
/// come from the first file, data rows from both in order.
pub fn combine_ledgers(first: &str, second: &str) -> String {
    let mut parts = first.split("<tr>");
    let header = parts.next().unwrap_or("");
    let mut rows: Vec<String> = parts
        .filter(|p| !p.trim().is_empty())
        .map(|p| format!("<tr>{p}"))
        .collect();
    rows.extend(
        second
            .split("<tr>")
            .skip(1)
            .filter(|p| !p.trim().is_empty())
            .map(|p| format!("<tr>{p}")),
    );

    let footer = ["</table>", "</tbody>", "</html>"]
        .iter()
        .filter_map(|tag| first.rfind(tag))
        .max()
        .and_then(|pos| {
            first[pos..]
                .find('>')
                .map(|rel| &first[pos + rel + 1..])
        })
        .unwrap_or("");

    format!("{header}{}{footer}", rows.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cells_strip_inner_tags() {
        let ex = CellExtractor::new().unwrap();
        let row = r#"<td rowspan="2">240001</td><td><b>Taco Gà</b> </td><td style="text-align:right">55,000</td>"#;
        assert_eq!(ex.cells(row), vec!["240001", "Taco Gà", "55,000"]);
    }

    #[test]
    fn test_combine_keeps_rows_from_both() {
        let first = "<html><table><tr><td>a</td><tr><td>b</td></table></html>";
        let second = "<html><table><tr><td>c</td></table></html>";
        let combined = combine_ledgers(first, second);
        let rows: Vec<_> = split_rows(&combined).collect();
        // header chunk + three data rows
        assert_eq!(rows.len(), 4);
        assert!(combined.contains("<td>c</td>"));
        assert!(combined.starts_with("<html><table>"));
    }
}
