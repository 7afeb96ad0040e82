#![no_main]
use libfuzzer_sys::fuzz_target;
use odsmap::{group_by, rows_to_records, Document, OdsOptions};
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    for clone in [false, true] {
        let options = OdsOptions::new().with_clone_spanned_columns(clone);
        let doc = match Document::from_reader(Cursor::new(data), &options) {
            Ok(doc) => doc,
            Err(_) => return,
        };
        for sheet in doc.sheets() {
            let _ = sheet.width() * sheet.height();
            if let Ok(records) = rows_to_records(sheet) {
                if let Some(Some(first)) = sheet.rows().first().and_then(|h| h.first().cloned()) {
                    let _ = group_by(&records, &[first]);
                }
            }
            let _ = doc.key_values(sheet.name());
        }
    }
});
