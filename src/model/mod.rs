mod booking;
mod listing;
mod review;
mod user;

pub use booking::{
    create_booking, delete_booking, get_booking, list_bookings_for_listing, Booking, NewBooking,
};
pub use listing::{
    create_listing, delete_listing, get_listing, list_listings, update_listing, Listing,
    ListingUpdate, NewListing,
};
pub use review::{
    create_review, delete_review, get_review, list_reviews_for_listing, NewReview, Review,
};
pub use user::{create_user, delete_user, User};
