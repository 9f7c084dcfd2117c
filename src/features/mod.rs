pub mod hotel_uploads;
