//! Pharmacy record extraction from the duty listing page.
//!
//! The listing markup is a third-party contract: a `table.table` whose
//! rows carry Bootstrap column divs with the pharmacy name, address and
//! phone. Structure changes on the remote side degrade to empty results
//! rather than errors.

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::models::Pharmacy;

/// Prefix marking an auxiliary note line inside the address block.
pub const NOTE_MARKER: char = '»';

/// Result of extracting one page.
#[derive(Debug, Default)]
pub struct Extraction {
    /// Records in document order.
    pub pharmacies: Vec<Pharmacy>,
    /// Rows present in the table but missing a required field.
    pub skipped_rows: usize,
}

/// Outcome of parsing a single row container.
enum RowOutcome {
    Parsed(Box<Pharmacy>),
    Skipped(&'static str),
}

/// Fixed selector set for the listing markup.
struct Selectors {
    table: Selector,
    row: Selector,
    narrow_col: Selector,
    wide_col: Selector,
    name: Selector,
    active_tab: Selector,
}

impl Selectors {
    fn new() -> Option<Self> {
        Some(Self {
            table: Selector::parse("table.table").ok()?,
            row: Selector::parse("tr").ok()?,
            narrow_col: Selector::parse("div.col-lg-3").ok()?,
            wide_col: Selector::parse("div.col-lg-6").ok()?,
            name: Selector::parse("span.isim").ok()?,
            active_tab: Selector::parse("ul.nav-tabs a.active").ok()?,
        })
    }
}

/// Extract pharmacy records from a duty listing page.
///
/// A missing table yields an empty extraction; rows missing a required
/// field are skipped and counted, never fatal.
pub fn duty_pharmacies(html: &str, source_url: Option<&str>) -> Extraction {
    let Some(selectors) = Selectors::new() else {
        return Extraction::default();
    };

    let document = Html::parse_document(html);

    let Some(table) = document.select(&selectors.table).next() else {
        debug!("duty table not found in page");
        return Extraction::default();
    };

    let duty_date = document
        .select(&selectors.active_tab)
        .next()
        .map(|el| collapsed_text(&el))
        .filter(|s| !s.is_empty());

    let mut extraction = Extraction::default();

    // First row is the column header.
    for row in table.select(&selectors.row).skip(1) {
        match parse_row(&row, &selectors) {
            RowOutcome::Parsed(mut record) => {
                record.duty_date = duty_date.clone();
                record.source_url = source_url.map(|s| s.to_string());
                extraction.pharmacies.push(*record);
            }
            RowOutcome::Skipped(reason) => {
                debug!("skipping row: {}", reason);
                extraction.skipped_rows += 1;
            }
        }
    }

    extraction
}

/// Parse one table row into a record, or report why it was skipped.
fn parse_row(row: &ElementRef, selectors: &Selectors) -> RowOutcome {
    let narrow: Vec<ElementRef> = row.select(&selectors.narrow_col).collect();
    let wide: Vec<ElementRef> = row.select(&selectors.wide_col).collect();

    if narrow.len() + wide.len() < 3 {
        return RowOutcome::Skipped("missing column cells");
    }

    let Some(name_el) = narrow
        .first()
        .and_then(|cell| cell.select(&selectors.name).next())
    else {
        return RowOutcome::Skipped("missing name element");
    };
    let name = collapsed_text(&name_el);
    if name.is_empty() {
        return RowOutcome::Skipped("empty name");
    }

    let Some(address_cell) = wide.first() else {
        return RowOutcome::Skipped("missing address cell");
    };
    let (address, notes) = split_address(address_cell);
    if address.is_empty() {
        return RowOutcome::Skipped("empty address");
    }

    let phone = match narrow.get(1) {
        Some(cell) => collapsed_text(cell),
        None => return RowOutcome::Skipped("missing phone cell"),
    };
    if phone.is_empty() {
        return RowOutcome::Skipped("empty phone");
    }

    let mut record = Pharmacy::new(name, address, phone);
    record.notes = notes;
    RowOutcome::Parsed(Box::new(record))
}

/// Split an address cell into the primary address and note lines.
///
/// Text node boundaries (e.g. `<br>`) and embedded newlines both act as
/// line breaks. Lines prefixed with the note marker become notes with the
/// marker stripped; the remaining lines are joined into the address.
fn split_address(cell: &ElementRef) -> (String, Vec<String>) {
    let mut address_parts: Vec<String> = Vec::new();
    let mut notes = Vec::new();

    for segment in cell.text() {
        for line in segment.split('\n') {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(stripped) = line.strip_prefix(NOTE_MARKER) {
                let note = stripped.trim();
                if !note.is_empty() {
                    notes.push(note.to_string());
                }
            } else {
                address_parts.push(line.to_string());
            }
        }
    }

    (address_parts.join(" "), notes)
}

/// Element text with whitespace collapsed to single spaces.
fn collapsed_text(el: &ElementRef) -> String {
    el.text()
        .flat_map(|t| t.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, address: &str, phone: &str) -> String {
        format!(
            r#"<tr>
                <td><div class="col-lg-3"><span class="isim">{}</span></div></td>
                <td><div class="col-lg-6">{}</div></td>
                <td><div class="col-lg-3">{}</div></td>
            </tr>"#,
            name, address, phone
        )
    }

    fn page(rows: &[String]) -> String {
        format!(
            r#"<html><body>
            <ul class="nav-tabs"><li><a class="active">26 Ağustos Çarşamba</a></li></ul>
            <table class="table">
                <tr><th>Eczane</th><th>Adres</th><th>Telefon</th></tr>
                {}
            </table>
            </body></html>"#,
            rows.join("\n")
        )
    }

    #[test]
    fn test_extracts_all_well_formed_rows() {
        let html = page(&[
            row("Merkez Eczanesi", "Atatürk Cad. No:1 Kadıköy", "0216 555 00 00"),
            row("Sağlık Eczanesi", "Bağdat Cad. No:42", "0216 555 11 11"),
            row("Deva Eczanesi", "Moda Cad. No:7", "0216 555 22 22"),
        ]);

        let extraction = duty_pharmacies(&html, Some("https://example.com/nobetci"));
        assert_eq!(extraction.pharmacies.len(), 3);
        assert_eq!(extraction.skipped_rows, 0);

        let first = &extraction.pharmacies[0];
        assert_eq!(first.name, "Merkez Eczanesi");
        assert_eq!(first.address, "Atatürk Cad. No:1 Kadıköy");
        assert_eq!(first.phone, "0216 555 00 00");
        assert_eq!(first.source_url.as_deref(), Some("https://example.com/nobetci"));
        assert_eq!(first.duty_date.as_deref(), Some("26 Ağustos Çarşamba"));

        assert_eq!(extraction.pharmacies[2].name, "Deva Eczanesi");
    }

    #[test]
    fn test_trims_whitespace() {
        let html = page(&[row(
            "  Merkez   Eczanesi  ",
            "  Atatürk Cad. No:1  ",
            "\n 0216 555 00 00 \n",
        )]);

        let extraction = duty_pharmacies(&html, None);
        let record = &extraction.pharmacies[0];
        assert_eq!(record.name, "Merkez Eczanesi");
        assert_eq!(record.address, "Atatürk Cad. No:1");
        assert_eq!(record.phone, "0216 555 00 00");
    }

    #[test]
    fn test_row_missing_name_is_skipped() {
        let valid = row("Deva Eczanesi", "Moda Cad. No:7", "0216 555 22 22");
        let nameless = r#"<tr>
            <td><div class="col-lg-3">no name marker here</div></td>
            <td><div class="col-lg-6">Bağdat Cad. No:42</div></td>
            <td><div class="col-lg-3">0216 555 11 11</div></td>
        </tr>"#
            .to_string();
        let html = page(&[nameless, valid]);

        let extraction = duty_pharmacies(&html, None);
        assert_eq!(extraction.pharmacies.len(), 1);
        assert_eq!(extraction.skipped_rows, 1);
        assert_eq!(extraction.pharmacies[0].name, "Deva Eczanesi");
    }

    #[test]
    fn test_note_marker_split() {
        let html = page(&[row(
            "Merkez Eczanesi",
            "Atatürk Cad. No:1<br>» Hastane karşısı<br>» Gece girişi arkadan",
            "0216 555 00 00",
        )]);

        let extraction = duty_pharmacies(&html, None);
        let record = &extraction.pharmacies[0];
        assert_eq!(record.address, "Atatürk Cad. No:1");
        assert_eq!(
            record.notes,
            vec!["Hastane karşısı".to_string(), "Gece girişi arkadan".to_string()]
        );
    }

    #[test]
    fn test_bare_marker_line_dropped() {
        let html = page(&[row(
            "Merkez Eczanesi",
            "Atatürk Cad. No:1<br>»",
            "0216 555 00 00",
        )]);

        let extraction = duty_pharmacies(&html, None);
        let record = &extraction.pharmacies[0];
        assert_eq!(record.address, "Atatürk Cad. No:1");
        assert!(record.notes.is_empty());
    }

    #[test]
    fn test_missing_table_yields_empty() {
        let html = "<html><body><p>Sonuç bulunamadı</p></body></html>";
        let extraction = duty_pharmacies(html, None);
        assert!(extraction.pharmacies.is_empty());
        assert_eq!(extraction.skipped_rows, 0);
    }

    #[test]
    fn test_empty_input_yields_empty() {
        let extraction = duty_pharmacies("", None);
        assert!(extraction.pharmacies.is_empty());
    }

    #[test]
    fn test_no_duty_date_without_active_tab() {
        let html = format!(
            r#"<table class="table"><tr><th>h</th></tr>{}</table>"#,
            row("Merkez Eczanesi", "Atatürk Cad. No:1", "0216 555 00 00")
        );
        let extraction = duty_pharmacies(&html, None);
        assert_eq!(extraction.pharmacies[0].duty_date, None);
    }
}
