pub mod menu;
pub mod progress_bar;
pub mod stats_sidebar;
pub mod summary;
pub mod typing_area;
