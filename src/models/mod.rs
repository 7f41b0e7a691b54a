pub mod item;
pub mod order_book;
pub mod pagination;
