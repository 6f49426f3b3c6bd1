pub mod invoice;
pub mod line_item;
pub mod payment;
pub mod retailer;
