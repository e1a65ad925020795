pub mod pixel_info;
pub mod selection_panel;
