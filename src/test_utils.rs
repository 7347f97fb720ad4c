use crate::models::{Document, Folder, Tender};
use crate::services::currency::parse_currency;

/// Build a listing tender with just the fields the filters look at.
pub fn tender(id: &str, title: &str, category: &str, value: Option<f64>) -> Tender {
    Tender {
        id: id.to_string(),
        title: title.to_string(),
        authority: "National Highways Authority".to_string(),
        category: category.to_string(),
        location: "Maharashtra".to_string(),
        value,
        ..Default::default()
    }
}

/// Tender whose value comes from a scraped amount string such as `₹10 Cr`.
pub fn tender_with_value(id: &str, raw_value: &str) -> Tender {
    tender(id, &format!("Tender {}", id), "Civil", parse_currency(raw_value).amount())
}

pub fn document(id: &str, name: &str, size: u64, modified_at: &str) -> Document {
    Document {
        id: id.to_string(),
        name: name.to_string(),
        file_type: "application/pdf".to_string(),
        size,
        modified_at: modified_at.to_string(),
        ..Default::default()
    }
}

pub fn folder(id: &str, name: &str, parent_id: Option<&str>) -> Folder {
    Folder {
        id: id.to_string(),
        name: name.to_string(),
        parent_id: parent_id.map(str::to_string),
        path: format!("/{}", name),
        ..Default::default()
    }
}
