//! Domain models and request/response types.

pub mod audit;
pub mod image;
pub mod item;
pub mod listing;
pub mod ocr;
pub mod scrape;
pub mod user;

pub use audit::NewAuditEntry;
pub use image::Image;
pub use item::{
    CreateItemInput, Item, ItemDetail, ItemFilter, ItemPage, Pagination, UpdateItemInput,
};
pub use listing::Listing;
pub use ocr::OcrResult;
pub use scrape::{ScrapeResult, ScrapedFields};
pub use user::{CurrentUser, LoginInput, RegisterInput, UpdateUserInput, User};
