//! PDF metadata management.
//!
//! This module fills in the document Info dictionary of a merged PDF:
//! - Title
//! - Creator, Producer
//! - Creation and modification dates

use crate::error::Result;
use crate::merge::{decode_text_string, text_string};
use lopdf::{Dictionary, Document, Object};
use std::time::{SystemTime, UNIX_EPOCH};

/// Manager for PDF metadata.
pub struct MetadataManager;

impl MetadataManager {
    /// Create a new metadata manager.
    pub fn new() -> Self {
        Self
    }

    /// Set metadata on a document.
    ///
    /// Writes `Title`, `Creator`, `Producer` (`pagemerge {version}`),
    /// `CreationDate` and `ModDate`, creating the Info dictionary if needed.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pagemerge::merge::metadata::MetadataManager;
    /// # use lopdf::Document;
    /// # fn example(mut doc: Document) -> Result<(), Box<dyn std::error::Error>> {
    /// MetadataManager::new().set_metadata(&mut doc, "Quarterly report")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn set_metadata(&self, doc: &mut Document, title: &str) -> Result<()> {
        // Get or create Info dictionary
        let info_id = match doc.trailer.get(b"Info").and_then(Object::as_reference) {
            Ok(info_ref) => info_ref,
            Err(_) => {
                let new_info_id = doc.add_object(Dictionary::new());
                doc.trailer.set("Info", Object::Reference(new_info_id));
                new_info_id
            }
        };

        if !matches!(doc.get_object(info_id), Ok(Object::Dictionary(_))) {
            doc.objects
                .insert(info_id, Object::Dictionary(Dictionary::new()));
        }
        let info_dict = doc.get_dictionary_mut(info_id)?;

        let producer = format!("{} {}", crate::NAME, crate::VERSION);
        let date_str = format_pdf_date(SystemTime::now());

        info_dict.set("Title", text_string(title));
        info_dict.set("Creator", text_string(crate::NAME));
        info_dict.set("Producer", text_string(&producer));
        info_dict.set("CreationDate", text_string(&date_str));
        info_dict.set("ModDate", text_string(&date_str));

        Ok(())
    }

    /// Read the document title, if any.
    pub fn get_title(&self, doc: &Document) -> Option<String> {
        let info_ref = doc.trailer.get(b"Info").and_then(Object::as_reference).ok()?;
        let info_dict = doc.get_dictionary(info_ref).ok()?;
        match info_dict.get(b"Title").ok()? {
            Object::String(bytes, _) => decode_text_string(bytes),
            _ => None,
        }
    }

    /// Check if a document has metadata.
    pub fn has_metadata(&self, doc: &Document) -> bool {
        doc.trailer.has(b"Info")
    }
}

impl Default for MetadataManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a SystemTime as a PDF date string in UTC.
///
/// PDF date format: `D:YYYYMMDDHHmmSSZ`
fn format_pdf_date(time: SystemTime) -> String {
    let secs = time.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();

    let (year, month, day) = civil_from_days((secs / 86_400) as i64);
    let time_of_day = secs % 86_400;
    let hour = time_of_day / 3_600;
    let min = (time_of_day % 3_600) / 60;
    let sec = time_of_day % 60;

    format!("D:{year:04}{month:02}{day:02}{hour:02}{min:02}{sec:02}Z")
}

/// Convert days since 1970-01-01 into a proleptic Gregorian date.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}
