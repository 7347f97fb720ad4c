pub mod api_client;
pub mod currency;
pub mod dms;
pub mod document_view;
pub mod folder_tree;
pub mod tender_filter;
pub mod tenderiq;

pub use api_client::*;
pub use currency::*;
pub use dms::*;
pub use document_view::*;
pub use folder_tree::*;
pub use tender_filter::*;
pub use tenderiq::*;
