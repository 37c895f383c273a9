mod admin;
mod notification;
mod page;
mod product;

pub use admin::*;
pub use notification::*;
pub use page::*;
pub use product::*;
