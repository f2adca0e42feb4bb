// Tender records: CRUD handlers and the spreadsheet importer.

pub mod handlers;
pub mod importer;
