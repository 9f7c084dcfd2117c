mod hotel_invoice;

pub use hotel_invoice::{HotelInvoice, UploadRecord};
