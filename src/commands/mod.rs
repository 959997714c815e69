pub mod calendars;
pub mod select;
pub mod sync;
pub mod view;
