pub mod encode;
pub mod font_info;
pub mod subsetter;
